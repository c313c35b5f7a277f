//! Diff-scoped review of IBLinter issues.
//!
//! Raw issues flow through `filter` (against a `DiffIndex`), `classify` and
//! finally the `reporter`, which writes either inline annotations or a single
//! markdown summary to a sink.

pub mod classify;
pub mod diff_index;
pub mod filter;
pub mod orchestrator;
pub mod render;
pub mod reporter;
pub mod sink;
