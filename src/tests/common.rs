// src/tests/common.rs

//! Common data shared by tests.

#![allow(non_upper_case_globals)]

/// the example line of an sshd password failure
pub const LINE_SSHD_FAIL: &str =
    "Jan 5 10:15:32 host sshd[123]: Failed password for root from 10.0.0.5";

/// two lines that normalize to the same message
pub const LINE_CONN_REFUSED_A: &str = "Jan 5 10:15:33 host nginx[77]: connection refused";
pub const LINE_CONN_REFUSED_B: &str = "other-prefix]: connection refused";

/// A small log where every line has a full `YYYY-MM-DD HH:MM:SS`
/// datetime, so every report is independent of the wall clock.
pub const LOG_TIMESTAMPED: &str = "\
2024-01-05 08:00:01 host kernel[1]: system boot complete
2024-01-05 08:00:02 host sshd[10]: Accepted password for alice from 192.168.1.20
2024-01-05 09:30:00 host sshd[11]: Failed password for root from 10.0.0.5
2024-01-05 09:31:00 host sshd[11]: Failed password for root from 10.0.0.5
2024-01-05 10:00:00 host kernel[1]: usb device error on port 3
2024-01-05 10:05:00 host ufw[5]: firewall blocked 10.0.0.5 -> 192.168.1.1
2024-01-05 13:45:10 host app[42]: warning low memory
2024-01-05 13:45:11 host app[42]: warning low memory
2024-01-05 23:59:59 host cron[9]: session opened
";

/// count of lines of `LOG_TIMESTAMPED`
pub const LOG_TIMESTAMPED_LINES: u64 = 9;

/// lines with no datetime, no hour, no address, and no keywords
pub const LOG_PLAIN_INFO: &str = "\
hello there
just some text
hello there
";
