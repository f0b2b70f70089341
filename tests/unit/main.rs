//! Unit tests for individual components

mod builders_test;
mod config_test;
mod diagnostics_test;
mod error_test;
