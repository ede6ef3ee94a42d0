//! Raw report assembly.
//!
//! The raw report is the Markdown string handed to the analysis agent and
//! returned to clients. Its framing is a contract with [`crate::parser`]:
//! every section starts with a line beginning with `**` that contains the
//! section's needle, and no body line begins with `**`.

use reporter_models::section::HEADER_MARKER;
use reporter_models::{ReportSection, SectionKind, StructuredReport};

use crate::text::collapse_whitespace;

/// Separator placed between sections.
pub const SECTION_SEPARATOR: &str = "\n\n";

/// Bundles the three connector outputs into a structured report.
///
/// Sections are re-keyed by position, so a section passed in the wrong slot
/// keeps its lines but takes the slot's kind.
pub fn build_structured(
    trello: ReportSection,
    email: ReportSection,
    slack: ReportSection,
) -> StructuredReport {
    StructuredReport {
        trello: with_kind(trello, SectionKind::Trello),
        email: with_kind(email, SectionKind::Email),
        slack: with_kind(slack, SectionKind::Slack),
    }
}

fn with_kind(mut section: ReportSection, kind: SectionKind) -> ReportSection {
    section.kind = kind;
    section
}

/// Returns the lines a section contributes to the raw report.
///
/// The result always starts with a recognized header: the section's own first
/// line when it is one, the canonical header otherwise. Embedded line breaks
/// (`\r\n`, `\r` or `\n`) become separate lines, blank lines are dropped,
/// and body lines starting with `**` are indented so they cannot open a new
/// section.
pub fn section_lines(section: &ReportSection) -> Vec<String> {
    let mut lines = section
        .lines
        .iter()
        .flat_map(|line| line.split(['\r', '\n']))
        .map(str::trim_end)
        .filter(|line| !line.trim().is_empty())
        .peekable();

    let mut out = Vec::with_capacity(section.lines.len() + 1);
    match lines.peek() {
        Some(first) if section.kind.is_header_line(first) => {
            out.push((*first).to_string());
            lines.next();
        }
        _ => out.push(section.kind.header().to_string()),
    }

    out.extend(lines.map(|line| {
        if line.starts_with(HEADER_MARKER) {
            format!("  {}", line)
        } else {
            line.to_string()
        }
    }));
    out
}

/// Renders the raw report: Trello, Email, Slack, separated by a blank line.
pub fn render_raw_report(report: &StructuredReport) -> String {
    report
        .sections()
        .iter()
        .map(|section| section_lines(section).join("\n"))
        .collect::<Vec<_>>()
        .join(SECTION_SEPARATOR)
}

/// Builds the section shown when a connector could not deliver.
pub fn degraded_section(kind: SectionKind, detail: &str) -> ReportSection {
    let mut section = ReportSection::new(kind);
    section.push_line(format!(
        "  _({} unavailable: {})_",
        kind.vendor(),
        collapse_whitespace(detail)
    ));
    section
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_raw_report;

    fn section(kind: SectionKind, body: &[&str]) -> ReportSection {
        let mut s = ReportSection::new(kind);
        for line in body {
            s.push_line(*line);
        }
        s
    }

    #[test]
    fn test_empty_lines_still_emit_header() {
        let report = build_structured(
            ReportSection::empty(SectionKind::Trello),
            ReportSection::empty(SectionKind::Email),
            ReportSection::empty(SectionKind::Slack),
        );
        let raw = render_raw_report(&report);
        for kind in SectionKind::ALL {
            assert!(raw.contains(kind.header()), "missing header for {}", kind);
        }
        assert_eq!(
            raw,
            format!(
                "{}\n\n{}\n\n{}",
                SectionKind::Trello.header(),
                SectionKind::Email.header(),
                SectionKind::Slack.header()
            )
        );
    }

    #[test]
    fn test_header_not_duplicated() {
        let s = section(SectionKind::Slack, &["- **bob**: hi"]);
        let lines = section_lines(&s);
        assert_eq!(lines, vec![SectionKind::Slack.header(), "- **bob**: hi"]);
    }

    #[test]
    fn test_missing_header_prepended() {
        let mut s = ReportSection::empty(SectionKind::Trello);
        s.push_line("- **Todo**: 2 card(s)");
        let lines = section_lines(&s);
        assert_eq!(lines[0], SectionKind::Trello.header());
        assert_eq!(lines.len(), 2);
    }

    #[test]
    fn test_foreign_header_is_indented() {
        let mut s = ReportSection::empty(SectionKind::Trello);
        s.push_line(SectionKind::Slack.header());
        let lines = section_lines(&s);
        assert_eq!(lines[0], SectionKind::Trello.header());
        assert_eq!(lines[1], format!("  {}", SectionKind::Slack.header()));
    }

    #[test]
    fn test_embedded_newlines_and_blanks() {
        let s = section(
            SectionKind::Email,
            &["- **From:** a@b.c\n  **Subject:** Hi\n", "", "   "],
        );
        let lines = section_lines(&s);
        assert_eq!(
            lines,
            vec![
                SectionKind::Email.header(),
                "- **From:** a@b.c",
                "  **Subject:** Hi"
            ]
        );
    }

    #[test]
    fn test_bold_body_line_cannot_open_section() {
        let s = section(SectionKind::Trello, &["**Overdue Tasks:**"]);
        let lines = section_lines(&s);
        assert_eq!(lines[1], "  **Overdue Tasks:**");
    }

    #[test]
    fn test_lone_carriage_return_splits_line() {
        let s = section(
            SectionKind::Trello,
            &["- **Backlog\r**Recent Slack Messages**: 1 card(s)"],
        );
        let lines = section_lines(&s);
        assert_eq!(
            lines,
            vec![
                SectionKind::Trello.header(),
                "- **Backlog",
                "  **Recent Slack Messages**: 1 card(s)"
            ]
        );
    }

    #[test]
    fn test_carriage_return_in_body_survives_parsing() {
        let report = build_structured(
            section(
                SectionKind::Trello,
                &["- **Backlog\r**Recent Slack Messages**: 1 card(s)"],
            ),
            section(SectionKind::Email, &["No new emails."]),
            section(SectionKind::Slack, &["- **alice**: shipped\r\n- **bob**: ok"]),
        );
        let raw = render_raw_report(&report);
        let parsed = parse_raw_report(&raw);

        assert!(parsed.is_complete());
        assert_eq!(parsed.unrecognized().count(), 0);
        assert_eq!(parsed.sections.len(), 3);

        let trello = parsed.get(SectionKind::Trello).unwrap();
        assert_eq!(trello.lines.len(), 2);
        let slack = parsed.get(SectionKind::Slack).unwrap();
        assert_eq!(slack.header, SectionKind::Slack.header());
        assert_eq!(slack.lines, vec!["- **alice**: shipped", "- **bob**: ok"]);
    }

    #[test]
    fn test_build_structured_rekeys_sections() {
        let report = build_structured(
            ReportSection::new(SectionKind::Slack),
            ReportSection::new(SectionKind::Email),
            ReportSection::new(SectionKind::Slack),
        );
        assert_eq!(report.trello.kind, SectionKind::Trello);
        // The Slack header no longer matches the slot, so Trello's is restored.
        assert_eq!(section_lines(&report.trello)[0], SectionKind::Trello.header());
    }

    #[test]
    fn test_degraded_section() {
        let s = degraded_section(SectionKind::Trello, "HTTP 401:\ninvalid token");
        assert_eq!(s.lines[0], SectionKind::Trello.header());
        assert_eq!(s.lines[1], "  _(Trello unavailable: HTTP 401: invalid token)_");
    }
}
