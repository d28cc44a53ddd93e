// src/tests/mod.rs

//! Tests for _salib_.
//!
//! Tests are placed at `src/tests/`, inside the `salib`, so they have
//! crate-internal visibility.

pub mod common;
pub mod engine_tests;
