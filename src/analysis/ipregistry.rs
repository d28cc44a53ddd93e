// src/analysis/ipregistry.rs

//! Track occurrences of IPv4 addresses.
//!
//! The address pattern is permissive; any four dot-separated groups of one
//! to three digits match, e.g. `999.999.999.999`. There is no octet range
//! check.

use crate::common::Count;
use crate::data::datetime::{datetime_to_iso8601, now_local, DateTimeL, DateTimeLOpt};

use std::collections::HashMap;

use ::lazy_static::lazy_static;
use ::regex::Regex;
#[allow(unused_imports)]
use ::si_trace_print::{defn, defo, defx, defñ};

/// regex pattern for a dotted-quad IPv4 address
pub const RP_IPV4: &str = r"\b(?:\d{1,3}\.){3}\d{1,3}\b";

lazy_static! {
    static ref REGEX_IPV4: Regex = {
        defñ!("lazy_static! REGEX_IPV4::new()");

        Regex::new(RP_IPV4).unwrap()
    };
}

/// Every IPv4 address in `line`, in order of appearance.
pub fn find_ipv4_addresses(line: &str) -> impl Iterator<Item = &str> {
    REGEX_IPV4.find_iter(line).map(|m| m.as_str())
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
struct IpOccurrence {
    count: Count,
    last_seen: DateTimeL,
    /// order of first occurrence, for tie-breaking
    first_seen: Count,
}

/// One row of [`IPRegistryAggregator::ranked`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct IpReportEntry {
    pub address: String,
    pub count: Count,
    pub last_seen: DateTimeL,
}

impl IpReportEntry {
    pub fn last_seen_iso8601(&self) -> String {
        datetime_to_iso8601(&self.last_seen)
    }
}

/// Address to `(count, last_seen)`.
#[derive(Clone, Debug, Default)]
pub struct IPRegistryAggregator {
    addresses: HashMap<String, IpOccurrence>,
}

impl IPRegistryAggregator {
    pub fn new() -> IPRegistryAggregator {
        IPRegistryAggregator::default()
    }

    /// Count every address in `line`. `timestamp` is the datetime of the
    /// line, or the current time when the line has none.
    ///
    /// `last_seen` of an address never decreases.
    pub fn observe(&mut self, line: &str, timestamp: DateTimeL) {
        for address in find_ipv4_addresses(line) {
            let first_seen: Count = self.addresses.len() as Count;
            match self.addresses.get_mut(address) {
                Some(occurrence) => {
                    occurrence.count += 1;
                    if timestamp > occurrence.last_seen {
                        occurrence.last_seen = timestamp;
                    }
                }
                None => {
                    self.addresses.insert(
                        address.to_string(),
                        IpOccurrence {
                            count: 1,
                            last_seen: timestamp,
                            first_seen,
                        },
                    );
                }
            }
        }
    }

    /// Like [`observe`](IPRegistryAggregator::observe) but the current time
    /// is only read when `timestamp` is `None` and `line` has an address.
    pub fn observe_opt(&mut self, line: &str, timestamp: DateTimeLOpt) {
        if let Some(dt) = timestamp {
            self.observe(line, dt);
            return;
        }
        if find_ipv4_addresses(line).next().is_none() {
            return;
        }
        self.observe(line, now_local());
    }

    pub fn len(&self) -> usize {
        self.addresses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.addresses.is_empty()
    }

    /// `(count, last_seen)` of `address`.
    pub fn get(&self, address: &str) -> Option<(Count, DateTimeL)> {
        self.addresses
            .get(address)
            .map(|occurrence| (occurrence.count, occurrence.last_seen))
    }

    /// All addresses, descending by count. Ties are in order of first
    /// occurrence.
    pub fn ranked(&self) -> Vec<IpReportEntry> {
        let mut ranked: Vec<(&String, &IpOccurrence)> = self.addresses.iter().collect();
        ranked.sort_unstable_by(|a, b| {
            b.1.count
                .cmp(&a.1.count)
                .then(a.1.first_seen.cmp(&b.1.first_seen))
        });

        ranked
            .into_iter()
            .map(|(address, occurrence)| IpReportEntry {
                address: address.clone(),
                count: occurrence.count,
                last_seen: occurrence.last_seen,
            })
            .collect()
    }
}
