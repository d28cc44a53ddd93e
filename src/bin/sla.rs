// src/bin/sla.rs

//! Driver program _sla_ drives the [_salib_].
//!
//! Processes user-passed command-line arguments, then runs one of three
//! modes:
//!
//! * default: scan one log file with an [`AnalysisEngine`] and print the
//!   requested reports. With `--follow` the file is then tailed until
//!   Ctrl+C; the reports are printed again after tailing stops.
//! * `--errors`: print every error line of one log file.
//! * `--list`: print the log files found in a directory.
//!
//! `sla.rs` is the only place that prints to STDOUT.
//!
//! [_salib_]: salib
//! [`AnalysisEngine`]: salib::analysis::engine::AnalysisEngine

#![allow(non_camel_case_types)]

use std::io::{self, Write};
use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use ::anyhow::{bail, Context};
use ::clap::{Parser, ValueEnum};
use ::const_format::concatcp;
use ::salib::analysis::classifier::{Category, RuleTable};
use ::salib::analysis::config::{AnalysisConfig, POLL_INTERVAL_DEFAULT, TOP_N_DEFAULT};
use ::salib::analysis::engine::{AnalysisEngine, TailEvent};
use ::salib::analysis::errorsummary::ErrorSummaryReport;
use ::salib::analysis::frequency::FrequencyReportEntry;
use ::salib::analysis::histogram::HourHistogram;
use ::salib::analysis::ipregistry::IpReportEntry;
use ::salib::analysis::search::search_errors;
use ::salib::common::{Compression, FPath};
use ::salib::data::datetime::HOURS_PER_DAY;
use ::salib::data::logline::LogLine;
use ::salib::readers::discovery::{discover_logs, LogFileEntry};
use ::salib::{e_err, e_wrn};
use ::si_trace_print::stack::stack_offset_set;
#[allow(unused_imports)]
use ::si_trace_print::{defn, defo, defx, defñ};

// --------------------
// command-line parsing

/// width of the longest histogram bar, in characters
const HISTOGRAM_WIDTH: usize = 50;

/// width of the message column of the frequency report
const MESSAGE_WIDTH: usize = 80;

const CLI_HELP_AFTER: &str = concatcp!(
    "Without --section, all reports are printed.\n",
    "\n",
    "A file ending \".gz\", \".bz2\", or \".lz4\" is decompressed while reading.\n",
    "\n",
    "While following (--follow), press Ctrl+C to stop following and print the\n",
    "final reports.\n",
    "\n",
    "Version: ", env!("CARGO_PKG_VERSION"), "\n",
    "License: ", env!("CARGO_PKG_LICENSE"), "\n",
);

/// Report sections selectable with `--section`.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    ValueEnum, // from `clap`
)]
enum CLI_Section {
    frequency,
    histogram,
    ips,
    errors,
}

/// clap command-line arguments build-time definitions.
#[derive(Parser, Debug)]
#[clap(
    about = env!("CARGO_PKG_DESCRIPTION"),
    name = "sla",
    version = env!("CARGO_PKG_VERSION"),
    after_help = CLI_HELP_AFTER,
    verbatim_doc_comment,
)]
struct CLI_Args {
    /// Path of the log file to analyze.
    #[clap(
        required_unless_present = "list",
        verbatim_doc_comment,
    )]
    path: Option<String>,

    /// Print this many of the most frequent messages.
    #[clap(
        short = 'n',
        long = "top",
        verbatim_doc_comment,
        default_value_t = TOP_N_DEFAULT,
    )]
    top_n: usize,

    /// After the scan, follow the file for appended lines until Ctrl+C.
    #[clap(
        short = 'f',
        long,
        verbatim_doc_comment,
        conflicts_with = "errors",
    )]
    follow: bool,

    /// Milliseconds between checks of a followed file.
    #[clap(
        short = 'i',
        long = "interval",
        verbatim_doc_comment,
        default_value_t = POLL_INTERVAL_DEFAULT.as_millis() as u64,
    )]
    interval_ms: u64,

    /// Treat the file as gzip compressed regardless of file name.
    #[clap(
        short = 'z',
        long,
        verbatim_doc_comment,
        conflicts_with = "plain",
    )]
    gzip: bool,

    /// Treat the file as plain text regardless of file name.
    #[clap(
        long,
        verbatim_doc_comment,
    )]
    plain: bool,

    /// Print only the error lines of the file.
    #[clap(
        short = 'e',
        long,
        verbatim_doc_comment,
    )]
    errors: bool,

    /// List the log files in directory DIR and exit.
    #[clap(
        short = 'l',
        long,
        value_name = "DIR",
        verbatim_doc_comment,
        exclusive = true,
    )]
    list: Option<String>,

    /// Print only these report sections. May be passed more than once.
    #[clap(
        short = 's',
        long,
        verbatim_doc_comment,
        value_enum,
    )]
    section: Vec<CLI_Section>,
}

impl CLI_Args {
    fn compression(&self) -> Compression {
        match (self.gzip, self.plain) {
            (true, _) => Compression::Gzip,
            (false, true) => Compression::Plain,
            (false, false) => Compression::Infer,
        }
    }

    fn config(&self) -> AnalysisConfig {
        AnalysisConfig::default()
            .with_poll_interval(Duration::from_millis(self.interval_ms))
            .with_compression(self.compression())
            .with_top_n(self.top_n)
    }

    fn print_section(&self, section: CLI_Section) -> bool {
        self.section.is_empty() || self.section.contains(&section)
    }
}

/// Process the user-passed command-line arguments.
/// Run the selected mode.
/// Determine a process return code.
pub fn main() -> ExitCode {
    if cfg!(debug_assertions) {
        stack_offset_set(Some(0));
    }
    defn!();

    let args = CLI_Args::parse();
    defo!("args {:?}", args);

    let result: anyhow::Result<()> = match (&args.list, &args.path) {
        (Some(dir), _) => run_list(dir),
        (None, Some(path)) if args.errors => run_errors(path, &args),
        (None, Some(path)) => run_analysis(path, &args),
        (None, None) => Err(anyhow::anyhow!("no PATH passed")),
    };

    let exitcode = match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            e_err!("{:#}", err);
            ExitCode::FAILURE
        }
    };
    defx!("exitcode {:?}", exitcode);

    exitcode
}

// --------------------
// modes

/// `--list` mode
fn run_list(dir: &str) -> anyhow::Result<()> {
    defn!("({:?})", dir);
    let path: &Path = Path::new(dir);
    if !path.is_dir() {
        bail!("not a directory {:?}", dir);
    }
    let entries: Vec<LogFileEntry> = discover_logs(path);
    if entries.is_empty() {
        e_wrn!("no log files found in {:?}", dir);
    }
    let mut stdout = io::stdout().lock();
    for entry in entries.iter() {
        writeln!(
            stdout,
            "{:<48} {:>10}  {:<19}  {}",
            entry.path,
            entry.size_string(),
            entry.modified_string(),
            entry.description,
        )?;
    }
    defx!("{} entries", entries.len());

    Ok(())
}

/// `--errors` mode
fn run_errors(path: &FPath, args: &CLI_Args) -> anyhow::Result<()> {
    defn!("({:?})", path);
    let rules = RuleTable::default();
    let lines: Vec<LogLine> = search_errors(path, args.compression(), &rules)
        .with_context(|| format!("search of {:?} failed", path))?;
    let mut stdout = io::stdout().lock();
    for line in lines.iter() {
        writeln!(stdout, "{}", line.raw())?;
    }
    defx!("{} lines", lines.len());

    Ok(())
}

/// default mode, optionally `--follow`
fn run_analysis(path: &FPath, args: &CLI_Args) -> anyhow::Result<()> {
    defn!("({:?})", path);
    let engine: Arc<AnalysisEngine> = Arc::new(AnalysisEngine::new(args.config()));
    engine
        .open(path)
        .with_context(|| format!("analysis of {:?} failed", path))?;
    print_reports(&engine, args)?;

    if args.follow {
        follow(&engine)?;
        print_reports(&engine, args)?;
    }
    engine.close();
    defx!();

    Ok(())
}

/// Tail the opened file until Ctrl+C.
fn follow(engine: &Arc<AnalysisEngine>) -> anyhow::Result<()> {
    defn!();
    let events = engine.subscribe();
    set_signal_handler(engine).context("failed to set the Ctrl+C handler")?;
    engine.start_tail().context("failed to start following")?;
    eprintln!("following {:?}, press Ctrl+C to stop", engine.path().unwrap_or_default());

    for event in events.iter() {
        match event {
            TailEvent::Appended { lines, offset } => {
                eprintln!("+{} lines (offset {})", lines, offset);
            }
            TailEvent::Truncated { previous_offset } => {
                e_wrn!("file was truncated below offset {}, reading from the start", previous_offset);
            }
            TailEvent::PollFailed(err) => {
                e_wrn!("{}", err);
            }
            TailEvent::Stopped => break,
        }
    }
    defx!("{} failed polls", engine.tail_poll_failures());

    Ok(())
}

/// set a process signal handler that stops tailing of `engine`
fn set_signal_handler(engine: &Arc<AnalysisEngine>) -> Result<(), ctrlc::Error> {
    defn!();
    let engine: Arc<AnalysisEngine> = Arc::clone(engine);
    ctrlc::set_handler(move || {
        defn!();
        // a second Ctrl+C after tailing stopped is an `InvalidState`
        if let Err(_err) = engine.stop_tail() {
            defo!("stop_tail: {}", _err);
        }
        defx!();
    })?;
    defx!();

    Ok(())
}

// --------------------
// report printing

fn print_reports(engine: &AnalysisEngine, args: &CLI_Args) -> io::Result<()> {
    let mut stdout = io::stdout().lock();
    writeln!(
        stdout,
        "{} lines, {} bytes processed",
        engine.total_lines(),
        engine.processed_offset(),
    )?;
    if args.print_section(CLI_Section::frequency) {
        print_frequency(&mut stdout, &engine.top_messages())?;
    }
    if args.print_section(CLI_Section::histogram) {
        print_histogram(&mut stdout, &engine.hour_histogram())?;
    }
    if args.print_section(CLI_Section::ips) {
        print_ips(&mut stdout, &engine.ip_report())?;
    }
    if args.print_section(CLI_Section::errors) {
        print_error_summary(&mut stdout, &engine.error_summary())?;
    }
    stdout.flush()
}

fn print_header(out: &mut impl Write, title: &str) -> io::Result<()> {
    writeln!(out)?;
    writeln!(out, "{}", title)?;
    writeln!(out, "{}", "=".repeat(title.len()))
}

/// Shorten `s` to `width` characters, marking a cut with `"..."`.
fn truncate_str(s: &str, width: usize) -> String {
    if s.chars().count() <= width {
        return s.to_string();
    }
    let mut t: String = s.chars().take(width.saturating_sub(3)).collect();
    t.push_str("...");

    t
}

fn print_frequency(out: &mut impl Write, entries: &[FrequencyReportEntry]) -> io::Result<()> {
    print_header(out, "Message Frequency")?;
    writeln!(out, "{:>8} {:>7}  Message", "Count", "%")?;
    for entry in entries.iter() {
        writeln!(
            out,
            "{:>8} {:>6.2}%  {}",
            entry.count,
            entry.percentage,
            truncate_str(&entry.message, MESSAGE_WIDTH),
        )?;
    }

    Ok(())
}

fn print_histogram(out: &mut impl Write, histogram: &HourHistogram) -> io::Result<()> {
    print_header(out, "Messages per Hour")?;
    for hour in 0..HOURS_PER_DAY {
        let bar: String = "#".repeat(histogram.bar_len(hour, HISTOGRAM_WIDTH));
        writeln!(
            out,
            "{:02}:00 |{:<width$}| {}",
            hour,
            bar,
            histogram.buckets[hour],
            width = HISTOGRAM_WIDTH,
        )?;
    }
    let labels: Vec<String> = histogram
        .axis_labels()
        .iter()
        .map(|label| label.to_string())
        .collect();
    writeln!(out, "scale: {}", labels.join(" | "))
}

fn print_ips(out: &mut impl Write, entries: &[IpReportEntry]) -> io::Result<()> {
    print_header(out, "IP Addresses")?;
    writeln!(out, "{:<15} {:>8}  Last Seen", "Address", "Count")?;
    for entry in entries.iter() {
        writeln!(
            out,
            "{:<15} {:>8}  {}",
            entry.address,
            entry.count,
            entry.last_seen_iso8601(),
        )?;
    }

    Ok(())
}

fn print_error_summary(out: &mut impl Write, report: &ErrorSummaryReport) -> io::Result<()> {
    print_header(out, "Error Summary")?;
    for category in Category::ALL.iter() {
        let entry = match report.get(category) {
            Some(val) => val,
            None => continue,
        };
        writeln!(out, "{} ({})", category, entry.count)?;
        for example in entry.examples.iter() {
            writeln!(out, "    {}", truncate_str(example, MESSAGE_WIDTH))?;
        }
    }

    Ok(())
}
