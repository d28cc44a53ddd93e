// src/debug/printers.rs

//! Printer macros for warnings and errors of `sla` and the analysis engine.
//!
//! The `e_` macros always print to stderr; the command-line program uses
//! them for failures the user must see, e.g. an unreadable log file or a
//! followed file that was truncated.
//!
//! The `de_` macros only print in debug and test builds. The engine uses
//! them from the tail worker thread, where a failure is also published as a
//! [`TailEvent`] and must not disturb the report output of a release build.
//!
//! [`TailEvent`]: crate::analysis::engine::TailEvent

/// Label printed before an error message
pub const LABEL_ERROR: &str = "ERROR: ";
/// Label printed before a warning message
pub const LABEL_WARNING: &str = "WARNING: ";

/// `e`println! `args` after `label`, on one line of stderr.
#[doc(hidden)]
#[macro_export]
macro_rules! e_labeled {
    (
        $label:expr,
        $($args:tt)*
    ) => {
        {
            eprintln!("{}{}", $label, format_args!($($args)*))
        }
    }
}
pub use e_labeled;

/// `d`ebug `e`println! an `err`or, e.g. a panicked tail worker thread
#[macro_export]
macro_rules! de_err {
    (
        $($args:tt)*
    ) => {
        {
            #[cfg(any(debug_assertions,test))]
            $crate::e_labeled!($crate::debug::printers::LABEL_ERROR, $($args)*)
        }
    }
}
pub use de_err;

/// `d`ebug `e`println! a `w`a`rn`ing, e.g. one failed tail poll
#[macro_export]
macro_rules! de_wrn {
    (
        $($args:tt)*
    ) => {
        {
            #[cfg(any(debug_assertions,test))]
            $crate::e_labeled!($crate::debug::printers::LABEL_WARNING, $($args)*)
        }
    }
}
pub use de_wrn;

/// `e`println! an `err`or that ends the program
#[macro_export]
macro_rules! e_err {
    (
        $($args:tt)*
    ) => {
        {
            $crate::e_labeled!($crate::debug::printers::LABEL_ERROR, $($args)*)
        }
    }
}
pub use e_err;

/// `e`println! a `w`a`rn`ing about the analyzed files
#[macro_export]
macro_rules! e_wrn {
    (
        $($args:tt)*
    ) => {
        {
            $crate::e_labeled!($crate::debug::printers::LABEL_WARNING, $($args)*)
        }
    }
}
pub use e_wrn;
