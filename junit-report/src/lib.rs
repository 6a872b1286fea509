//! JUnit Report Library
//!
//! Builds and decorates HTML reports of JUnit test results.
//!
//! # Architecture
//!
//! - [`junit`] reads JUnit XML files into [`TestSuite`] values
//! - [`builder`] turns suites into an HTML [`Document`]: a summary table and
//!   one feature section per suite
//! - [`decorator`] colors result cells, sets the step column in monospace
//!   and links summary rows to their sections
//! - [`html_import`] loads existing HTML reports so they can be decorated
//!
//! Decoration is applied to the document tree before it is written out, so
//! the resulting page needs no script to look right. Only the summary links
//! carry an inline click handler.
//!
//! # Example Usage
//!
//! ```no_run
//! use junit_report::{junit, ReportBuilder, ReportConfig};
//! use std::path::Path;
//!
//! let suites = junit::load_junit_dir(Path::new("reports")).unwrap();
//! let config = ReportConfig::new().with_title("Nightly run");
//! let html = ReportBuilder::new(config).build_html(&suites).unwrap();
//! std::fs::write("index.html", html).unwrap();
//! ```

// Public modules
pub mod builder;
pub mod config;
pub mod decorator;
pub mod dom;
pub mod html_import;
pub mod junit;
pub mod types;

// Re-export main types for convenience
pub use builder::ReportBuilder;
pub use config::ReportConfig;
pub use decorator::{DecorationStats, ReportCells, ReportDecorator};
pub use dom::{Document, NodeId, NodeKind};
pub use types::{
    Failure, ReportError, Result, SuiteSummary, TestCase, TestStatus, TestSuite, Timestamp,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
