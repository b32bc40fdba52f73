//! `tapdoc_core` turns test artifacts into documentation and datasets. It
//! decodes indentation-structured test reports (TAP) into trees annotated with
//! test metrics, extracts markdown documentation from comments in test
//! sources, and mines question/answer pairs from that markdown.
//!
//! ## Pipelines
//!
//! ```text
//! report text
//!   -> IndentCodec (lines to TreeNode by indentation)
//!   -> Dialect::view (TestNode metrics: counts, duration, status)
//!   -> ReportFilter / ReportFormat
//!
//! test source
//!   -> DocsParser (docs regions and test cases to markdown)
//!   -> DatasetParser (question + code block pairs to DatasetEntry)
//! ```
//!
//! ## Key Types
//!
//! - [`TreeNode`]: an ordered tree of text lines.
//! - [`IndentCodec`]: decodes text into a [`TreeNode`] and encodes it back.
//! - [`Dialect`] and [`TestNode`]: report prefix tables and the metrics they
//!   derive.
//! - [`DocsParser`]: the documentation state machine.
//! - [`DatasetParser`] and [`DatasetEntry`]: dataset generation.
//! - [`TapdocConfig`]: configuration loaded from `tapdoc.toml`.
//!
//! ## Quick Start
//!
//! ```rust
//! use tapdoc_core::Dialect;
//! use tapdoc_core::IndentCodec;
//!
//! let report = "TAP version 13\nok 1 - adds\n# tests 1\n# pass 1\n# duration_ms 12.5";
//! let root = IndentCodec::new().decode(report);
//! let dialect = Dialect::node_test();
//! let summary = dialect.view(&root);
//!
//! assert_eq!(summary.version(), 13);
//! assert_eq!(summary.tests_count(), 1);
//! assert_eq!(summary.pass_count(), 1);
//! ```

pub use codec::*;
pub use config::*;
pub use dataset::*;
pub use dialect::*;
pub use docs::*;
pub use error::*;
pub use report::*;
pub use tree::*;

mod codec;
pub mod config;
mod dataset;
mod dialect;
mod docs;
#[allow(unused_assignments)]
mod error;
pub(crate) mod lexer;
mod report;
mod tree;

#[cfg(test)]
mod __fixtures;
