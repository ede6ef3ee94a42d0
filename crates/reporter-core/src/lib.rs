//! Report assembly and parsing for the project status reporter.
//!
//! This crate holds the pure parts of the pipeline:
//!
//! - [`config`]: process settings loaded once from the environment
//! - [`builder`]: turns three report sections into the Markdown raw report
//! - [`parser`]: re-derives sections from a raw report string
//! - [`display`]: renders a report response as cards plus an analysis panel
//! - [`tagger`]: keyword tagging for chat messages
//! - [`text`]: preview and whitespace helpers shared by the connectors

pub mod builder;
pub mod config;
pub mod display;
pub mod parser;
pub mod tagger;
pub mod text;

pub use builder::{build_structured, degraded_section, render_raw_report, section_lines};
pub use config::{ConfigError, Settings};
pub use display::{Card, DashboardView};
pub use parser::{parse_raw_report, ParsedReport, ParsedSection};
pub use tagger::KeywordTagger;
