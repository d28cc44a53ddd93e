// src/readers/discovery.rs

//! Find log files within a directory.
//!
//! A file is considered a log file if its name has a common log file
//! extension, or if it is a well-known log path, or if its first line looks
//! like a log message.

use crate::common::{FPath, FileSz};
use crate::data::datetime::DateTimeL;
use crate::readers::helpers::{format_size, path_to_fpath};

use std::io::{BufRead, BufReader};
use std::path::Path;

use ::chrono::{DateTime, Local};
use ::lazy_static::lazy_static;
use ::regex::Regex;
#[allow(unused_imports)]
use ::si_trace_print::{defn, defo, defx, defñ};
use ::walkdir::WalkDir;

/// File name suffixes that imply a log file
pub const LOG_FILE_SUFFIXES: &[&str] = &[".log", ".txt", ".1", ".gz"];

/// Regex pattern matched against the first line of a file with an
/// unrecognized name:
/// - `name[pid]` prefix, e.g. `"sshd[123]: …"`
/// - ISO date prefix, e.g. `"2024-01-05 …"`
/// - BSD syslog prefix, e.g. `"Jan  5 10:"`
pub const RP_LOG_FIRST_LINE: &str =
    r"^[\w\s:]+\[\d+\]|^\d{4}-\d{2}-\d{2}|^\w{3}\s+\d{1,2}\s+\d{2}:";

/// Description of a log file when nothing more specific is known
pub const DESCRIPTION_DEFAULT: &str = "System log file";

/// Well-known log paths and their descriptions.
///
/// A path entry also describes files beneath it, e.g. `/var/log/nginx`
/// describes `/var/log/nginx/access.log`.
pub const LOG_DESCRIPTIONS: &[(&str, &str)] = &[
    ("/var/log/syslog", "Main system log containing general system activity messages"),
    ("/var/log/auth.log", "Authentication and security-related events"),
    ("/var/log/kern.log", "Kernel messages and hardware-related events"),
    ("/var/log/dmesg", "Boot-time hardware detection and driver initialization"),
    ("/var/log/dpkg.log", "Package management activities (installations, updates)"),
    ("/var/log/apt/history.log", "APT package manager history"),
    ("/var/log/apt/term.log", "Detailed APT package manager operations"),
    ("/var/log/boot.log", "System boot messages"),
    ("/var/log/faillog", "Failed login attempts"),
    ("/var/log/Xorg.0.log", "X Window System log"),
    ("/var/log/cups", "Printer and printing-related logs"),
    ("/var/log/nginx", "Nginx web server logs"),
    ("/var/log/apache2", "Apache web server logs"),
    ("/var/log/mysql", "MySQL/MariaDB database logs"),
    ("/var/log/postgresql", "PostgreSQL database logs"),
    ("/var/log/mail.log", "Mail server logs"),
    ("/var/log/ufw.log", "Uncomplicated Firewall logs"),
    ("/var/log/cron.log", "Cron job execution logs"),
    ("/var/log/wtmp", "Login/logout history (binary file)"),
    ("/var/log/btmp", "Failed login attempts (binary file)"),
    ("/var/log/secure", "Security and authentication logs (some systems)"),
    ("/var/log/messages", "General system messages (some systems)"),
];

lazy_static! {
    static ref REGEX_LOG_FIRST_LINE: Regex = {
        defñ!("lazy_static! REGEX_LOG_FIRST_LINE::new()");

        Regex::new(RP_LOG_FIRST_LINE).unwrap()
    };
}

/// A log file found by [`discover_logs`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LogFileEntry {
    pub path: FPath,
    /// file size in bytes (on disk, not decompressed)
    pub size: FileSz,
    /// file modified time, if the platform provides it
    pub modified: Option<DateTimeL>,
    pub description: &'static str,
}

impl LogFileEntry {
    /// Human-readable `size`, e.g. `"1.5 MB"`.
    pub fn size_string(&self) -> String {
        format_size(self.size)
    }

    /// `modified` as `"%Y-%m-%d %H:%M"` or `"N/A"`.
    pub fn modified_string(&self) -> String {
        match self.modified {
            Some(dt) => dt.format("%Y-%m-%d %H:%M").to_string(),
            None => String::from("N/A"),
        }
    }
}

/// Return the description of a well-known log `path`.
///
/// Checks for an exact match, then the parent directory, then any known
/// path that is a prefix of `path`.
pub fn log_description(path: &FPath) -> &'static str {
    if let Some((_, desc)) = LOG_DESCRIPTIONS.iter().find(|(p, _)| *p == path.as_str()) {
        return *desc;
    }
    if let Some(parent) = Path::new(path).parent() {
        let parent: FPath = path_to_fpath(parent);
        if let Some((_, desc)) = LOG_DESCRIPTIONS.iter().find(|(p, _)| *p == parent) {
            return *desc;
        }
    }
    if let Some((_, desc)) = LOG_DESCRIPTIONS.iter().find(|(p, _)| path.starts_with(p)) {
        return *desc;
    }

    DESCRIPTION_DEFAULT
}

/// Is the file at `path` a log file?
///
/// Directories and unreadable files are not log files.
pub fn is_log_file(path: &Path) -> bool {
    defn!("({:?})", path);
    if !path.is_file() {
        defx!("not a file, return false");
        return false;
    }
    let name: String = match path.file_name() {
        Some(val) => val.to_string_lossy().to_string(),
        None => {
            defx!("no file_name, return false");
            return false;
        }
    };
    if LOG_FILE_SUFFIXES.iter().any(|suffix| name.ends_with(suffix)) {
        defx!("suffix match, return true");
        return true;
    }
    let fpath: FPath = path_to_fpath(path);
    if LOG_DESCRIPTIONS.iter().any(|(p, _)| *p == fpath) {
        defx!("known path, return true");
        return true;
    }
    let file = match std::fs::File::open(path) {
        Ok(val) => val,
        Err(_err) => {
            defx!("open failed {}, return false", _err);
            return false;
        }
    };
    let mut first_line: String = String::new();
    match BufReader::new(file).read_line(&mut first_line) {
        Ok(_) => {}
        Err(_err) => {
            // not UTF-8 or unreadable
            defx!("read_line failed {}, return false", _err);
            return false;
        }
    }
    let ret: bool = REGEX_LOG_FIRST_LINE.is_match(&first_line);
    defx!("return {}", ret);

    ret
}

/// List the log files directly within `dir` (not recursive), sorted by path.
///
/// Entries that cannot be read (e.g. permission denied) are skipped.
/// A `dir` that cannot be read returns an empty list.
pub fn discover_logs(dir: &Path) -> Vec<LogFileEntry> {
    defn!("({:?})", dir);
    let mut entries: Vec<LogFileEntry> = Vec::new();
    for entry_res in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
        .sort_by_file_name()
    {
        let entry = match entry_res {
            Ok(val) => val,
            Err(_err) => {
                defo!("skip {:?}", _err);
                continue;
            }
        };
        let path: &Path = entry.path();
        if !is_log_file(path) {
            continue;
        }
        let metadata = match entry.metadata() {
            Ok(val) => val,
            Err(_err) => {
                defo!("skip {:?}, metadata error {:?}", path, _err);
                continue;
            }
        };
        let modified: Option<DateTimeL> = metadata
            .modified()
            .ok()
            .map(|st| DateTime::<Local>::from(st).naive_local());
        let fpath: FPath = path_to_fpath(path);
        let description: &'static str = log_description(&fpath);
        entries.push(LogFileEntry {
            path: fpath,
            size: metadata.len(),
            modified,
            description,
        });
    }
    defx!("return {} entries", entries.len());

    entries
}
