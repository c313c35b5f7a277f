//! ibreview: report IBLinter issues on the lines a change touches.
//!
//! Modules:
//! - `cli`: command line parsing (the binary uses this).
//! - `config`: `ibreview.toml` loading and defaults.
//! - `linter`: locating and running iblinter, decoding its JSON report.
//! - `review`: diff index, issue filtering, classification and reporting.
//! - `types`: issue and severity types shared by the modules above.
//! - `util`: git helpers and unified diff reading.
pub mod cli;
pub mod config;
pub mod linter;
pub mod review;
pub mod types;
pub mod util;
