//! Raw report parsing.
//!
//! Re-derives per-source sections from a raw report string: line endings are
//! normalized, repeated blank lines collapsed, and the text is split before
//! every line that begins with `**`. Each chunk is classified by its first
//! line. Chunks that match no known section are kept as unrecognized rather
//! than dropped.

use reporter_models::section::HEADER_MARKER;
use reporter_models::SectionKind;

/// One chunk of a parsed report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedSection {
    /// Recognized kind, or `None` for unrecognized chunks.
    pub kind: Option<SectionKind>,
    /// First line of the chunk (empty for a headerless preamble).
    pub header: String,
    /// Non-blank lines after the header.
    pub lines: Vec<String>,
}

impl ParsedSection {
    /// Returns true if the chunk matched a known section.
    pub fn is_recognized(&self) -> bool {
        self.kind.is_some()
    }

    /// Header with the bold markers and trailing colon removed.
    pub fn title(&self) -> String {
        self.header
            .trim()
            .trim_matches('*')
            .trim()
            .trim_end_matches(':')
            .trim()
            .to_string()
    }
}

/// Result of parsing a raw report.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedReport {
    /// Chunks in document order.
    pub sections: Vec<ParsedSection>,
}

impl ParsedReport {
    /// Returns the first chunk recognized as `kind`.
    pub fn get(&self, kind: SectionKind) -> Option<&ParsedSection> {
        self.sections.iter().find(|s| s.kind == Some(kind))
    }

    /// Returns the chunks that matched no known section.
    pub fn unrecognized(&self) -> impl Iterator<Item = &ParsedSection> {
        self.sections.iter().filter(|s| !s.is_recognized())
    }

    /// Returns true if all three known sections were found.
    pub fn is_complete(&self) -> bool {
        SectionKind::ALL.iter().all(|kind| self.get(*kind).is_some())
    }
}

/// Normalizes line endings and collapses runs of blank lines into one.
pub fn normalize(raw: &str) -> String {
    let unified = raw.replace("\r\n", "\n").replace('\r', "\n");
    let mut out: Vec<&str> = Vec::new();
    let mut previous_blank = false;
    for line in unified.split('\n') {
        let blank = line.trim().is_empty();
        if blank && previous_blank {
            continue;
        }
        out.push(if blank { "" } else { line });
        previous_blank = blank;
    }
    out.join("\n").trim_matches('\n').to_string()
}

/// Parses a raw report into chunks.
pub fn parse_raw_report(raw: &str) -> ParsedReport {
    let normalized = normalize(raw);
    let mut chunks: Vec<Vec<&str>> = Vec::new();

    for line in normalized.split('\n') {
        if line.starts_with(HEADER_MARKER) || chunks.is_empty() {
            chunks.push(Vec::new());
        }
        if let Some(chunk) = chunks.last_mut() {
            chunk.push(line);
        }
    }

    let sections = chunks
        .into_iter()
        .filter_map(|chunk| {
            let (first, rest) = chunk.split_first()?;
            let (header, body) = if first.starts_with(HEADER_MARKER) {
                (first.to_string(), rest)
            } else {
                (String::new(), chunk.as_slice())
            };
            let lines: Vec<String> = body
                .iter()
                .filter(|line| !line.trim().is_empty())
                .map(|line| line.to_string())
                .collect();
            if header.is_empty() && lines.is_empty() {
                return None;
            }
            let kind = if header.is_empty() {
                None
            } else {
                SectionKind::classify(&header)
            };
            Some(ParsedSection {
                kind,
                header,
                lines,
            })
        })
        .collect();

    ParsedReport { sections }
}
