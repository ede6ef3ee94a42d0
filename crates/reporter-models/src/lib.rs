//! Core data models for the project status reporter.
//!
//! This crate provides the types that flow through one report request:
//! per-source report sections, the assembled structured report, the
//! notification outcome, and the API response envelope.

pub mod ids;
pub mod response;
pub mod section;

// Re-export main types
pub use ids::RequestId;
pub use response::{NotificationStatus, ReportResponse, SourceFailure};
pub use section::{ReportSection, SectionKind, StructuredReport};
