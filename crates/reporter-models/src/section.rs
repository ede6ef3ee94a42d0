//! Report section types.
//!
//! A report is made of exactly three sections, one per source. Each section
//! starts with a bold Markdown header whose wording is load-bearing: the
//! display side re-derives section boundaries by matching fixed substrings
//! (see [`SectionKind::needle`]) against header lines.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Markdown bold marker that opens every section header.
pub const HEADER_MARKER: &str = "**";

/// Source a report section was produced from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionKind {
    /// Trello board lists and cards.
    Trello,
    /// Unread labeled Gmail messages.
    Email,
    /// Recent Slack channel messages.
    Slack,
}

impl SectionKind {
    /// All kinds, in report order.
    pub const ALL: [SectionKind; 3] = [SectionKind::Trello, SectionKind::Email, SectionKind::Slack];

    /// Canonical header line emitted by the report builder.
    pub fn header(&self) -> &'static str {
        match self {
            Self::Trello => "**Trello Board Status:**",
            Self::Email => "**Recent Email Updates (Label: project-updates):**",
            Self::Slack => "**Recent Slack Messages (Filtered):**",
        }
    }

    /// Substring the parser looks for in a header line.
    pub fn needle(&self) -> &'static str {
        match self {
            Self::Trello => "Trello",
            Self::Email => "Email Updates",
            Self::Slack => "Slack Messages",
        }
    }

    /// Human-readable card title.
    pub fn title(&self) -> &'static str {
        match self {
            Self::Trello => "Trello Tasks",
            Self::Email => "Email Updates",
            Self::Slack => "Slack Messages",
        }
    }

    /// Vendor name used in degraded-section notices.
    pub fn vendor(&self) -> &'static str {
        match self {
            Self::Trello => "Trello",
            Self::Email => "Gmail",
            Self::Slack => "Slack",
        }
    }

    /// Short source name used in logs and error details.
    pub fn source_name(&self) -> &'static str {
        match self {
            Self::Trello => "trello",
            Self::Email => "gmail",
            Self::Slack => "slack",
        }
    }

    /// Classifies a header line by substring match, in report order.
    pub fn classify(line: &str) -> Option<SectionKind> {
        Self::ALL.into_iter().find(|kind| line.contains(kind.needle()))
    }

    /// Returns true if `line` is a bold header recognized as this kind.
    pub fn is_header_line(&self, line: &str) -> bool {
        line.starts_with(HEADER_MARKER) && Self::classify(line) == Some(*self)
    }
}

impl fmt::Display for SectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.source_name())
    }
}

/// One source's contribution to a report.
///
/// `lines[0]` is conventionally the section header. Sections created with
/// [`ReportSection::new`] always start with it; the report builder restores
/// it when a section was assembled without one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportSection {
    /// Source of the section.
    pub kind: SectionKind,

    /// Rendered lines, header first.
    pub lines: Vec<String>,

    /// Number of items contributed (cards, emails, messages).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,

    /// Number of overdue items (Trello only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overdue_count: Option<usize>,
}

impl ReportSection {
    /// Creates a section holding only its canonical header.
    pub fn new(kind: SectionKind) -> Self {
        Self {
            kind,
            lines: vec![kind.header().to_string()],
            count: None,
            overdue_count: None,
        }
    }

    /// Creates a section with no lines, not even the header.
    pub fn empty(kind: SectionKind) -> Self {
        Self {
            kind,
            lines: Vec::new(),
            count: None,
            overdue_count: None,
        }
    }

    /// Appends a body line.
    pub fn push_line(&mut self, line: impl Into<String>) {
        self.lines.push(line.into());
    }

    /// Sets the item count.
    pub fn with_count(mut self, count: usize) -> Self {
        self.count = Some(count);
        self
    }

    /// Sets the overdue count.
    pub fn with_overdue_count(mut self, overdue: usize) -> Self {
        self.overdue_count = Some(overdue);
        self
    }

    /// Returns true if the first line is a recognized header for this kind.
    pub fn has_header(&self) -> bool {
        self.lines
            .first()
            .is_some_and(|line| self.kind.is_header_line(line))
    }

    /// Body lines, excluding the header.
    pub fn body(&self) -> &[String] {
        if self.has_header() {
            &self.lines[1..]
        } else {
            &self.lines
        }
    }
}

/// The three sections of one report, in fixed order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructuredReport {
    /// Trello section.
    pub trello: ReportSection,
    /// Gmail section.
    pub email: ReportSection,
    /// Slack section.
    pub slack: ReportSection,
}

impl StructuredReport {
    /// Returns the sections in report order.
    pub fn sections(&self) -> [&ReportSection; 3] {
        [&self.trello, &self.email, &self.slack]
    }

    /// Returns the section for a kind.
    pub fn get(&self, kind: SectionKind) -> &ReportSection {
        match kind {
            SectionKind::Trello => &self.trello,
            SectionKind::Email => &self.email,
            SectionKind::Slack => &self.slack,
        }
    }
}
