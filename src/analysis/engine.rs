// src/analysis/engine.rs

//! Implements an [`AnalysisEngine`], the driver of one analysis session of
//! one log file.
//!
//! The engine advances through the states of [`EngineStatus`]:
//!
//! ```text
//! Idle ──open──▶ Scanning ──▶ Ready ──start_tail──▶ Tailing
//!   ▲               │           ▲                      │
//!   └──(failure)────┘           └──────stop_tail───────┘
//! ```
//!
//! A full scan runs on the thread that calls [`open`]. Tailing runs on a
//! worker thread that polls the file size every
//! [`poll_interval`](AnalysisConfig::poll_interval). Only one of those may be
//! active at a time.
//!
//! All methods take `&self`; an `AnalysisEngine` may be shared (e.g. within
//! an `Arc`) so that queries, [`stop_tail`], and [`close`] can be called from
//! other threads. Queries return snapshots.
//!
//! [`open`]: AnalysisEngine::open
//! [`stop_tail`]: AnalysisEngine::stop_tail
//! [`close`]: AnalysisEngine::close

use crate::analysis::classifier::{Classifier, RuleTable};
use crate::analysis::config::AnalysisConfig;
use crate::analysis::error::{AnalysisError, AnalysisResult};
use crate::analysis::errorsummary::{ErrorSummaryAggregator, ErrorSummaryReport};
use crate::analysis::frequency::{FrequencyAggregator, FrequencyReportEntry};
use crate::analysis::histogram::{HourHistogram, TimeHistogramAggregator};
use crate::analysis::ipregistry::{IPRegistryAggregator, IpReportEntry};
use crate::analysis::search::search_errors_source;
use crate::common::{Count, FPath, FileOffset, FileSz};
use crate::data::logline::LogLine;
use crate::readers::helpers::{basename, fpath_to_filetypearchive};
use crate::readers::logsource::{LogLineIter, LogSource};
use crate::{de_err, de_wrn};

use std::fmt;
use std::iter::Peekable;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::thread;
use std::time::Duration;

use ::crossbeam_channel::{Receiver, RecvTimeoutError, Sender};
#[allow(unused_imports)]
use ::si_trace_print::{defn, defo, defx, defñ};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// EngineStatus, TailEvent
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Processing state of an [`AnalysisEngine`].
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub enum EngineStatus {
    /// No file is opened.
    #[default]
    Idle,
    /// A full scan is in progress. Queries return empty reports.
    Scanning,
    /// The scan completed. Reports are queryable.
    Ready,
    /// A worker thread is following the file for appended lines.
    /// Reports are queryable.
    Tailing,
}

impl fmt::Display for EngineStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s: &str = match self {
            EngineStatus::Idle => "Idle",
            EngineStatus::Scanning => "Scanning",
            EngineStatus::Ready => "Ready",
            EngineStatus::Tailing => "Tailing",
        };
        write!(f, "{}", s)
    }
}

/// Published to each [`subscribe`](AnalysisEngine::subscribe)r by the tail
/// worker.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TailEvent {
    /// `lines` new lines were processed; `offset` is the new processed
    /// offset.
    Appended { lines: Count, offset: FileOffset },
    /// The file became smaller than the processed offset. The offset was
    /// reset to `0`; aggregates were kept.
    Truncated { previous_offset: FileOffset },
    /// One poll failed. Tailing continues.
    PollFailed(AnalysisError),
    /// The tail worker exited.
    Stopped,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// EngineState
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// The four aggregators of one analysis and the processed offset.
#[derive(Clone, Debug, Default)]
pub struct EngineState {
    pub frequency: FrequencyAggregator,
    pub histogram: TimeHistogramAggregator,
    pub ipregistry: IPRegistryAggregator,
    pub errorsummary: ErrorSummaryAggregator,
    /// offset of the byte after the last processed line
    offset: FileOffset,
    /// count of processed lines
    lines: Count,
    /// the state before an unterminated final line was observed
    resume: Option<Box<EngineState>>,
}

impl EngineState {
    pub fn new() -> EngineState {
        EngineState::default()
    }

    /// Classify `line` once and pass it to every aggregator.
    ///
    /// An unterminated `line` may still be in the middle of being written,
    /// so the state before it is kept for
    /// [`rewind_partial_line`](EngineState::rewind_partial_line).
    pub fn observe(&mut self, line: &LogLine, classifier: &Classifier) {
        if !line.is_terminated() {
            self.resume = Some(Box::new(EngineState {
                resume: None,
                ..self.clone()
            }));
        }
        let raw: &str = line.raw();
        let (severity, category) = classifier.classify(raw);
        self.frequency.observe(raw);
        self.histogram.observe_hour(line.hour());
        self.ipregistry.observe_opt(raw, line.timestamp());
        self.errorsummary.observe(raw, severity, category);
        self.offset = line.offset_next();
        self.lines += 1;
    }

    pub const fn offset(&self) -> FileOffset {
        self.offset
    }

    pub const fn lines(&self) -> Count {
        self.lines
    }

    /// Offset of the last observed line if it had no terminating newline.
    pub fn partial_line_offset(&self) -> Option<FileOffset> {
        self.resume.as_ref().map(|before| before.offset)
    }

    /// Undo the observation of an unterminated last line, so the line can
    /// be observed again once it is complete. Returns `false` if the last
    /// observed line was terminated.
    pub fn rewind_partial_line(&mut self) -> bool {
        match self.resume.take() {
            Some(before) => {
                *self = *before;
                true
            }
            None => false,
        }
    }

    /// Feed every line of `iter` to [`observe`](EngineState::observe) until
    /// the iterator ends, a read fails, or `cancelled` returns `true`.
    ///
    /// Returns the count of lines processed, or the first read error.
    /// Lines processed before an error remain observed.
    pub fn observe_iter<I, F>(
        &mut self,
        iter: I,
        classifier: &Classifier,
        cancelled: F,
    ) -> Result<Count, (Count, std::io::Error)>
    where
        I: IntoIterator<Item = std::io::Result<LogLine>>,
        F: Fn() -> bool,
    {
        let mut count: Count = 0;
        for line_res in iter {
            if cancelled() {
                defñ!("cancelled after {} lines", count);
                break;
            }
            match line_res {
                Ok(line) => {
                    self.observe(&line, classifier);
                    count += 1;
                }
                Err(err) => return Err((count, err)),
            }
        }

        Ok(count)
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Shared
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

// a panicking holder of a lock does not leave the reports unusable
fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Data shared by the engine and its tail worker.
struct Shared {
    status: RwLock<EngineStatus>,
    state: RwLock<EngineState>,
    source: RwLock<Option<LogSource>>,
    /// Incremented by every `open` and `close`. A scan or tail poll started
    /// under a different generation stops at the next line.
    generation: AtomicU64,
    rules: RuleTable,
    subscribers: Mutex<Vec<Sender<TailEvent>>>,
    tail_poll_failures: AtomicU64,
    last_tail_error: RwLock<Option<AnalysisError>>,
}

impl Shared {
    fn new(rules: RuleTable) -> Shared {
        Shared {
            status: RwLock::new(EngineStatus::Idle),
            state: RwLock::new(EngineState::new()),
            source: RwLock::new(None),
            generation: AtomicU64::new(0),
            rules,
            subscribers: Mutex::new(Vec::new()),
            tail_poll_failures: AtomicU64::new(0),
            last_tail_error: RwLock::new(None),
        }
    }

    fn is_current(&self, generation: u64) -> bool {
        self.generation.load(Ordering::SeqCst) == generation
    }

    /// Send `event` to all subscribers. Subscribers that dropped their
    /// `Receiver` are forgotten.
    fn publish(&self, event: TailEvent) {
        let mut subscribers = lock(&self.subscribers);
        subscribers.retain(|sender| sender.send(event.clone()).is_ok());
    }

    /// One tail poll: compare the file size to the processed offset and
    /// process any complete lines appended since the last poll.
    fn tail_poll(
        &self,
        source: &LogSource,
        classifier: &Classifier,
        generation: u64,
    ) -> AnalysisResult<()> {
        let size: FileSz = source
            .logical_size()
            .map_err(|err| AnalysisError::from_tail(&err))?;
        let (offset, partial): (FileOffset, Option<FileOffset>) = {
            let state = read(&self.state);
            (state.offset, state.partial_line_offset())
        };
        if size < offset {
            // rotated or truncated; the next poll reads from the start
            defo!("file size {} < offset {}, reset offset", size, offset);
            let mut state = write(&self.state);
            state.offset = 0;
            // a partial line of the previous file is never completed
            state.resume = None;
            drop(state);
            self.publish(TailEvent::Truncated { previous_offset: offset });
            return Ok(());
        }
        if size == offset {
            return Ok(());
        }
        defo!("file size {} > offset {}, partial line at {:?}", size, offset, partial);
        // an unterminated last line of the scan is read again when complete
        let mut iter: Peekable<LogLineIter> = source
            .tail_from(partial.unwrap_or(offset))
            .map_err(|err| AnalysisError::from_tail(&err))?
            .peekable();
        if partial.is_some() && iter.peek().is_none() {
            defo!("partial line at {:?} is not complete yet", partial);
            return Ok(());
        }
        let mut state = write(&self.state);
        state.rewind_partial_line();
        let result = state.observe_iter(iter, classifier, || !self.is_current(generation));
        let offset_new: FileOffset = state.offset;
        drop(state);

        let (lines, ret) = match result {
            Ok(lines) => (lines, Ok(())),
            Err((lines, err)) => (lines, Err(AnalysisError::from_tail(&err))),
        };
        if lines > 0 {
            self.publish(TailEvent::Appended { lines, offset: offset_new });
        }

        ret
    }

    fn tail_poll_failed(&self, error: AnalysisError) {
        de_wrn!("{}", error);
        self.tail_poll_failures.fetch_add(1, Ordering::SeqCst);
        *write(&self.last_tail_error) = Some(error.clone());
        self.publish(TailEvent::PollFailed(error));
    }
}

/// Body of the tail worker thread. Returns when `stop` receives or is
/// disconnected.
fn tail_loop(
    shared: Arc<Shared>,
    source: LogSource,
    poll_interval: Duration,
    stop: Receiver<()>,
    generation: u64,
) {
    defn!("({:?}, {:?})", source, poll_interval);
    let classifier = Classifier::new(&shared.rules);
    loop {
        match stop.recv_timeout(poll_interval) {
            Err(RecvTimeoutError::Timeout) => {}
            Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
        }
        if !shared.is_current(generation) {
            break;
        }
        if let Err(err) = shared.tail_poll(&source, &classifier, generation) {
            shared.tail_poll_failed(err);
        }
    }
    shared.publish(TailEvent::Stopped);
    defx!();
}

/// Handle to a running tail worker thread.
struct TailWorker {
    stop_sender: Sender<()>,
    handle: thread::JoinHandle<()>,
}

impl TailWorker {
    /// Signal the worker to stop and wait for it to exit.
    fn stop(self) {
        let TailWorker { stop_sender, handle } = self;
        // a disconnected channel wakes the worker as well as a message
        drop(stop_sender);
        if handle.join().is_err() {
            de_err!("tail worker thread panicked");
        }
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// AnalysisEngine
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Scans a log file, then optionally follows it, and answers report
/// queries.
pub struct AnalysisEngine {
    config: AnalysisConfig,
    shared: Arc<Shared>,
    tail: Mutex<Option<TailWorker>>,
}

impl fmt::Debug for AnalysisEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnalysisEngine")
            .field("config", &self.config)
            .field("status", &self.status())
            .field("path", &self.path())
            .field("offset", &self.processed_offset())
            .finish()
    }
}

impl Default for AnalysisEngine {
    fn default() -> AnalysisEngine {
        AnalysisEngine::new(AnalysisConfig::default())
    }
}

impl Drop for AnalysisEngine {
    fn drop(&mut self) {
        self.close();
    }
}

impl AnalysisEngine {
    /// Create an `Idle` engine using the built-in classification rules.
    pub fn new(config: AnalysisConfig) -> AnalysisEngine {
        AnalysisEngine::with_rules(config, RuleTable::default())
    }

    /// Create an `Idle` engine using `rules`.
    pub fn with_rules(config: AnalysisConfig, rules: RuleTable) -> AnalysisEngine {
        AnalysisEngine {
            config,
            shared: Arc::new(Shared::new(rules)),
            tail: Mutex::new(None),
        }
    }

    pub const fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    pub fn rules(&self) -> &RuleTable {
        &self.shared.rules
    }

    /// Open `path` and scan it fully with fresh aggregators.
    ///
    /// On success the engine is `Ready`. On failure the engine is `Idle`,
    /// with empty reports, and the error is returned; a partially scanned
    /// file is never reported.
    ///
    /// Tailing of a previously opened file is stopped first. Returns
    /// `InvalidState` if another scan is in progress.
    pub fn open(&self, path: &FPath) -> AnalysisResult<()> {
        defn!("({:?})", path);
        if let Some(worker) = lock(&self.tail).take() {
            worker.stop();
        }
        let generation: u64;
        {
            let mut status = write(&self.shared.status);
            if *status == EngineStatus::Scanning {
                defx!("already Scanning");
                return Err(AnalysisError::InvalidState {
                    operation: "open",
                    state: *status,
                });
            }
            *status = EngineStatus::Scanning;
            generation = self.shared.generation.fetch_add(1, Ordering::SeqCst) + 1;
            *write(&self.shared.state) = EngineState::new();
            *write(&self.shared.source) = None;
        }

        match self.scan(path, generation) {
            Ok(()) => {
                defx!("Ready");
                Ok(())
            }
            Err(err) => {
                let mut status = write(&self.shared.status);
                if self.shared.is_current(generation) {
                    *write(&self.shared.state) = EngineState::new();
                    *status = EngineStatus::Idle;
                }
                defx!("return {:?}", err);
                Err(err)
            }
        }
    }

    /// The `Scanning` stage. Installs the new state and becomes `Ready` only
    /// if the whole file was read and `close` was not called meanwhile.
    fn scan(&self, path: &FPath, generation: u64) -> AnalysisResult<()> {
        let compression = self.config.compression;
        let source: LogSource = LogSource::open(path, compression).map_err(|err| {
            AnalysisError::from_open(&err, fpath_to_filetypearchive(path, compression))
        })?;
        let iter: LogLineIter = source
            .read_all()
            .map_err(|err| AnalysisError::from_open(&err, source.archive()))?;
        let classifier = Classifier::new(&self.shared.rules);
        let mut state = EngineState::new();
        if let Err((_lines, err)) =
            state.observe_iter(iter, &classifier, || !self.shared.is_current(generation))
        {
            defo!("read error after {} lines", _lines);
            return Err(AnalysisError::from_scan(&err, source.archive()));
        }

        let mut status = write(&self.shared.status);
        if !self.shared.is_current(generation) {
            return Err(AnalysisError::ScanFailed(format!("scan of {:?} was cancelled", path)));
        }
        defo!("scanned {} lines, {} bytes", state.lines(), state.offset());
        *write(&self.shared.state) = state;
        *write(&self.shared.source) = Some(source);
        *status = EngineStatus::Ready;

        Ok(())
    }

    /// Start following the opened file for appended lines.
    ///
    /// The engine must be `Ready`. The file is checked again, so a file
    /// removed since `open` returns `NotFound`.
    pub fn start_tail(&self) -> AnalysisResult<()> {
        defn!();
        let mut tail = lock(&self.tail);
        let mut status = write(&self.shared.status);
        if *status != EngineStatus::Ready {
            defx!("not Ready, {}", *status);
            return Err(AnalysisError::InvalidState {
                operation: "start tail",
                state: *status,
            });
        }
        let path: FPath = match read(&self.shared.source).as_ref() {
            Some(source) => source.path().clone(),
            None => {
                return Err(AnalysisError::InvalidState {
                    operation: "start tail",
                    state: *status,
                });
            }
        };
        let compression = self.config.compression;
        let source: LogSource = LogSource::open(&path, compression).map_err(|err| {
            AnalysisError::from_open(&err, fpath_to_filetypearchive(&path, compression))
        })?;

        let (stop_sender, stop_receiver) = ::crossbeam_channel::bounded::<()>(1);
        let shared: Arc<Shared> = Arc::clone(&self.shared);
        let poll_interval: Duration = self.config.poll_interval;
        let generation: u64 = self.shared.generation.load(Ordering::SeqCst);
        let handle = thread::Builder::new()
            .name(format!("sla-tail-{}", basename(&path)))
            .spawn(move || tail_loop(shared, source, poll_interval, stop_receiver, generation))
            .map_err(|err| AnalysisError::Io(format!("spawn tail thread failed: {}", err)))?;
        *tail = Some(TailWorker { stop_sender, handle });
        *status = EngineStatus::Tailing;
        defx!("Tailing");

        Ok(())
    }

    /// Stop following the file. Aggregates are kept; the engine is `Ready`.
    ///
    /// Takes effect within one poll interval (plus the time to finish a poll
    /// in progress). May be called from any thread.
    pub fn stop_tail(&self) -> AnalysisResult<()> {
        defn!();
        let mut tail = lock(&self.tail);
        let worker: TailWorker = match tail.take() {
            Some(val) => val,
            None => {
                let state: EngineStatus = *read(&self.shared.status);
                defx!("not Tailing, {}", state);
                return Err(AnalysisError::InvalidState {
                    operation: "stop tail",
                    state,
                });
            }
        };
        worker.stop();
        let mut status = write(&self.shared.status);
        if *status == EngineStatus::Tailing {
            *status = EngineStatus::Ready;
        }
        defx!();

        Ok(())
    }

    /// End the session. Stops tailing, cancels a scan in progress, releases
    /// the file, and discards all aggregates. The engine is `Idle`.
    ///
    /// Does not wait for a scan in progress on another thread; that scan
    /// stops at its next line and drops its file handle.
    pub fn close(&self) {
        defn!();
        self.shared.generation.fetch_add(1, Ordering::SeqCst);
        if let Some(worker) = lock(&self.tail).take() {
            worker.stop();
        }
        let mut status = write(&self.shared.status);
        *write(&self.shared.state) = EngineState::new();
        *write(&self.shared.source) = None;
        *status = EngineStatus::Idle;
        defx!();
    }

    // ---------------------------------------------------------------------
    // queries

    pub fn status(&self) -> EngineStatus {
        *read(&self.shared.status)
    }

    /// Path of the opened file, if `Ready` or `Tailing`.
    pub fn path(&self) -> Option<FPath> {
        read(&self.shared.source)
            .as_ref()
            .map(|source| source.path().clone())
    }

    /// Offset of the end of processed data, in decompressed bytes.
    pub fn processed_offset(&self) -> FileOffset {
        read(&self.shared.state).offset()
    }

    /// Count of processed lines, including lines processed while tailing.
    pub fn total_lines(&self) -> Count {
        read(&self.shared.state).lines()
    }

    /// The `top_n` most frequent normalized messages.
    pub fn frequency_report(&self, top_n: usize) -> Vec<FrequencyReportEntry> {
        read(&self.shared.state).frequency.top_n(top_n)
    }

    /// The [`top_n`](AnalysisConfig::top_n) most frequent normalized
    /// messages of the engine's configuration.
    pub fn top_messages(&self) -> Vec<FrequencyReportEntry> {
        self.frequency_report(self.config.top_n)
    }

    pub fn hour_histogram(&self) -> HourHistogram {
        read(&self.shared.state).histogram.snapshot()
    }

    pub fn ip_report(&self) -> Vec<IpReportEntry> {
        read(&self.shared.state).ipregistry.ranked()
    }

    pub fn error_summary(&self) -> ErrorSummaryReport {
        read(&self.shared.state).errorsummary.report()
    }

    /// Every error line of the opened file. Reads the file again.
    pub fn search_errors(&self) -> AnalysisResult<Vec<LogLine>> {
        let source: Option<LogSource> = read(&self.shared.source).clone();
        let source: LogSource = match source {
            Some(val) => val,
            None => {
                return Err(AnalysisError::InvalidState {
                    operation: "search errors",
                    state: self.status(),
                });
            }
        };

        search_errors_source(&source, &Classifier::new(&self.shared.rules))
    }

    // ---------------------------------------------------------------------
    // diagnostics

    /// Receive [`TailEvent`]s of all future tail polls.
    pub fn subscribe(&self) -> Receiver<TailEvent> {
        let (sender, receiver) = ::crossbeam_channel::unbounded::<TailEvent>();
        lock(&self.shared.subscribers).push(sender);

        receiver
    }

    /// The most recent failed tail poll.
    pub fn last_tail_error(&self) -> Option<AnalysisError> {
        read(&self.shared.last_tail_error).clone()
    }

    /// Count of failed tail polls of this engine.
    pub fn tail_poll_failures(&self) -> Count {
        self.shared.tail_poll_failures.load(Ordering::SeqCst)
    }
}
