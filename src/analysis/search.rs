// src/analysis/search.rs

//! Find the error lines of a log file.

use crate::analysis::classifier::{Classifier, RuleTable};
use crate::analysis::error::{AnalysisError, AnalysisResult};
use crate::common::{Compression, FPath};
use crate::data::logline::LogLine;
use crate::readers::helpers::fpath_to_filetypearchive;
use crate::readers::logsource::LogSource;

#[allow(unused_imports)]
use ::si_trace_print::{defn, defo, defx, defñ};

/// Return every line of the file at `path` matching the error search
/// pattern of `rules`, in file order.
pub fn search_errors(
    path: &FPath,
    compression: Compression,
    rules: &RuleTable,
) -> AnalysisResult<Vec<LogLine>> {
    defn!("({:?})", path);
    let source: LogSource = match LogSource::open(path, compression) {
        Ok(val) => val,
        Err(err) => {
            let archive = fpath_to_filetypearchive(path, compression);
            defx!("LogSource::open Error {:?}", err);
            return Err(AnalysisError::from_open(&err, archive));
        }
    };

    let ret = search_errors_source(&source, &Classifier::new(rules));
    defx!();

    ret
}

/// Return every line of `source` matching the error search pattern.
pub fn search_errors_source(
    source: &LogSource,
    classifier: &Classifier,
) -> AnalysisResult<Vec<LogLine>> {
    let iter = source
        .read_all()
        .map_err(|err| AnalysisError::from_open(&err, source.archive()))?;
    let mut found: Vec<LogLine> = Vec::new();
    for line_res in iter {
        let line: LogLine = line_res.map_err(|err| AnalysisError::from_scan(&err, source.archive()))?;
        if classifier.is_error_search_match(line.raw()) {
            found.push(line);
        }
    }
    defñ!("found {} lines", found.len());

    Ok(found)
}
