//! Report display.
//!
//! Turns a [`ReportResponse`] into three source cards, a fallback card per
//! unrecognized section, and an analysis panel, then renders them as plain
//! text for a terminal.

use std::fmt::Write as _;

use reporter_models::{ReportResponse, ReportSection, SectionKind};

use crate::builder::section_lines;
use crate::parser::parse_raw_report;

const MISSING_SECTION: &str = "(section missing from report)";

/// One rendered card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Card {
    /// Card title.
    pub title: String,
    /// Short summary shown next to the title.
    pub badge: Option<String>,
    /// Body lines, Markdown bold markers removed.
    pub lines: Vec<String>,
    /// False for unrecognized sections.
    pub recognized: bool,
}

impl Card {
    fn from_section(section: &ReportSection) -> Self {
        let body = section_lines(section).into_iter().skip(1).map(|l| plain(&l));
        Self {
            title: section.kind.title().to_string(),
            badge: badge(section),
            lines: body.collect(),
            recognized: true,
        }
    }

    fn missing(kind: SectionKind) -> Self {
        Self {
            title: kind.title().to_string(),
            badge: None,
            lines: vec![MISSING_SECTION.to_string()],
            recognized: true,
        }
    }
}

fn badge(section: &ReportSection) -> Option<String> {
    let count = section.count?;
    Some(match section.kind {
        SectionKind::Trello => format!(
            "{} cards, {} overdue",
            count,
            section.overdue_count.unwrap_or(0)
        ),
        SectionKind::Email => format!("{} unread", count),
        SectionKind::Slack => format!("{} messages", count),
    })
}

fn plain(line: &str) -> String {
    line.replace("**", "")
}

/// Everything a client shows for one report.
#[derive(Debug, Clone)]
pub struct DashboardView {
    /// Trello, Email and Slack cards, in that order.
    pub cards: Vec<Card>,
    /// Cards for sections the parser could not classify.
    pub other: Vec<Card>,
    /// Analysis panel text.
    pub analysis: String,
    /// True if `analysis` is an error placeholder.
    pub analysis_failed: bool,
    /// Notification status line.
    pub notification: String,
    /// Request identifier, if the server sent one.
    pub request_id: Option<String>,
    /// Degraded sources, as `source: detail`.
    pub warnings: Vec<String>,
}

impl DashboardView {
    /// Builds the view, preferring typed sections over parsing `raw_report`.
    pub fn from_response(response: &ReportResponse) -> Self {
        let (cards, other): (Vec<Card>, Vec<Card>) = match &response.sections {
            Some(report) => (
                report.sections().iter().map(|s| Card::from_section(s)).collect(),
                Vec::new(),
            ),
            None => cards_from_raw(&response.raw_report),
        };

        Self {
            cards,
            other,
            analysis: response.agent_analysis.clone(),
            analysis_failed: response.analysis_error.is_some(),
            notification: response.slack_notification_status.to_string(),
            request_id: response.request_id.as_ref().map(|id| id.to_string()),
            warnings: response
                .source_errors
                .iter()
                .map(|f| format!("{}: {}", f.source, f.detail))
                .collect(),
        }
    }

    /// Renders the view as plain text.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for card in self.cards.iter().chain(self.other.iter()) {
            let title = if card.recognized {
                card.title.clone()
            } else {
                format!("Other: {}", card.title)
            };
            match &card.badge {
                Some(badge) => {
                    let _ = writeln!(out, "== {} [{}] ==", title, badge);
                }
                None => {
                    let _ = writeln!(out, "== {} ==", title);
                }
            }
            for line in &card.lines {
                let _ = writeln!(out, "  {}", line.trim_start());
            }
            out.push('\n');
        }

        let heading = if self.analysis_failed {
            "== Analysis (unavailable) =="
        } else {
            "== Analysis =="
        };
        let _ = writeln!(out, "{}", heading);
        for line in self.analysis.lines() {
            let _ = writeln!(out, "  {}", line);
        }
        out.push('\n');

        let _ = writeln!(out, "Slack: {}", self.notification);
        for warning in &self.warnings {
            let _ = writeln!(out, "Warning: {}", warning);
        }
        if let Some(id) = &self.request_id {
            let _ = writeln!(out, "Request: {}", id);
        }
        out
    }
}

fn cards_from_raw(raw: &str) -> (Vec<Card>, Vec<Card>) {
    let parsed = parse_raw_report(raw);

    let cards = SectionKind::ALL
        .iter()
        .map(|kind| match parsed.get(*kind) {
            Some(section) => Card {
                title: kind.title().to_string(),
                badge: None,
                lines: section.lines.iter().map(|l| plain(l)).collect(),
                recognized: true,
            },
            None => Card::missing(*kind),
        })
        .collect();

    let other = parsed
        .unrecognized()
        .map(|section| Card {
            title: if section.header.is_empty() {
                "Preamble".to_string()
            } else {
                section.title()
            },
            badge: None,
            lines: section.lines.iter().map(|l| plain(l)).collect(),
            recognized: false,
        })
        .collect();

    (cards, other)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::{build_structured, render_raw_report};
    use reporter_models::{NotificationStatus, RequestId, SourceFailure};

    fn response(raw: &str) -> ReportResponse {
        ReportResponse {
            raw_report: raw.to_string(),
            agent_analysis: "**1. Concise Summary:**\n\n- on track".to_string(),
            slack_notification_status: NotificationStatus::success("posted to C1"),
            request_id: Some(RequestId::from("cafe0001")),
            sections: None,
            analysis_error: None,
            source_errors: Vec::new(),
        }
    }

    #[test]
    fn test_view_from_raw_report() {
        let raw = "**Trello Board Status:**\n- **To Do**: 1 card(s)\n\n\
                   **Recent Email Updates (Label: project-updates):**\n  _(none)_\n\n\
                   **Recent Slack Messages (Filtered):**\n- **Ann**: hi";
        let view = DashboardView::from_response(&response(raw));

        assert_eq!(view.cards.len(), 3);
        assert_eq!(view.cards[0].title, "Trello Tasks");
        assert_eq!(view.cards[0].lines, vec!["- To Do: 1 card(s)"]);
        assert_eq!(view.cards[2].lines, vec!["- Ann: hi"]);
        assert!(view.other.is_empty());
    }

    #[test]
    fn test_view_renders_unrecognized_fallback() {
        let raw = "**Trello Board Status:**\n- a\n\n**Calendar:**\n- standup";
        let view = DashboardView::from_response(&response(raw));

        assert_eq!(view.other.len(), 1);
        assert_eq!(view.other[0].title, "Calendar");
        assert_eq!(view.cards[1].lines, vec![MISSING_SECTION]);

        let text = view.render();
        assert!(text.contains("== Other: Calendar =="));
        assert!(text.contains("standup"));
    }

    #[test]
    fn test_view_prefers_typed_sections() {
        let mut trello = ReportSection::new(SectionKind::Trello)
            .with_count(4)
            .with_overdue_count(1);
        trello.push_line("Total Cards: 4");
        let email = ReportSection::new(SectionKind::Email).with_count(0);
        let slack = ReportSection::new(SectionKind::Slack).with_count(2);
        let report = build_structured(trello, email, slack);

        let mut resp = response("ignored");
        resp.raw_report = render_raw_report(&report);
        resp.sections = Some(report);
        let view = DashboardView::from_response(&resp);

        assert_eq!(view.cards[0].badge.as_deref(), Some("4 cards, 1 overdue"));
        assert_eq!(view.cards[1].badge.as_deref(), Some("0 unread"));
        assert_eq!(view.cards[2].badge.as_deref(), Some("2 messages"));
        assert_eq!(view.cards[0].lines, vec!["Total Cards: 4"]);
    }

    #[test]
    fn test_render_analysis_failure_and_warnings() {
        let mut resp = response("**Trello Board Status:**");
        resp.agent_analysis = "Error during agent analysis: timed out. (Req ID: cafe0001)".into();
        resp.analysis_error = Some("timed out".into());
        resp.slack_notification_status = NotificationStatus::skipped("no analysis to send");
        resp.source_errors.push(SourceFailure {
            source: SectionKind::Slack,
            detail: "invalid_auth".into(),
        });

        let text = DashboardView::from_response(&resp).render();
        assert!(text.contains("== Analysis (unavailable) =="));
        assert!(text.contains("Slack: skipped: no analysis to send"));
        assert!(text.contains("Warning: slack: invalid_auth"));
        assert!(text.contains("Request: cafe0001"));
    }
}
