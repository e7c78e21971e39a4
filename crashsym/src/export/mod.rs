//! Report export functionality
//!
//! The symbolicated text is the primary output. This module adds a JSON
//! report listing every extracted address and how it was resolved.

pub mod report;

pub use report::ReportExporter;
