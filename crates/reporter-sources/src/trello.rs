//! Trello board connector.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reporter_core::config::TrelloSettings;
use reporter_core::text::collapse_whitespace;
use reporter_models::{ReportSection, SectionKind};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::error::{Result, SourceError};
use crate::{http_client, SourceConnector};

/// Trello REST API base URL.
pub const TRELLO_API_URL: &str = "https://api.trello.com/1";

const SECTION: SectionKind = SectionKind::Trello;

/// A list on the board.
#[derive(Debug, Clone, Deserialize)]
pub struct TrelloList {
    pub id: String,
    #[serde(default)]
    pub name: String,
}

/// A card, reduced to the fields the report uses.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TrelloCard {
    #[serde(default)]
    pub name: String,
    /// ISO 8601 due date.
    #[serde(default)]
    pub due: Option<String>,
    #[serde(default, rename = "dueComplete")]
    pub due_complete: bool,
}

impl TrelloCard {
    /// Returns true if the card has an incomplete due date before `now`.
    ///
    /// Unparseable due dates are logged and treated as not overdue.
    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        if self.due_complete {
            return false;
        }
        let Some(due) = self.due.as_deref().filter(|d| !d.is_empty()) else {
            return false;
        };
        match DateTime::parse_from_rfc3339(due) {
            Ok(due) => due.with_timezone(&Utc) < now,
            Err(e) => {
                warn!(card = %self.name, due, error = %e, "Unparseable Trello due date");
                false
            }
        }
    }
}

/// One list with its cards.
#[derive(Debug, Clone)]
pub struct BoardList {
    pub list: TrelloList,
    pub cards: Vec<TrelloCard>,
}

/// Reads lists and cards from one Trello board.
pub struct TrelloConnector {
    client: reqwest::Client,
    settings: TrelloSettings,
    base_url: String,
}

impl TrelloConnector {
    /// Creates a connector for the public Trello API.
    pub fn new(settings: TrelloSettings) -> Result<Self> {
        Ok(Self {
            client: http_client(SECTION)?,
            settings,
            base_url: TRELLO_API_URL.to_string(),
        })
    }

    /// Overrides the API base URL.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Fetches every list and its cards.
    ///
    /// Failing to fetch the lists fails the call. Failing to fetch one list's
    /// cards is logged and that list counts as empty.
    pub async fn fetch_board(&self) -> Result<Vec<BoardList>> {
        let lists: Vec<TrelloList> = self
            .get(
                &format!("boards/{}/lists", self.settings.board_id),
                &[("cards", "none")],
            )
            .await?;
        debug!(board = %self.settings.board_id, count = lists.len(), "Fetched Trello lists");

        let mut board = Vec::with_capacity(lists.len());
        for list in lists {
            let cards = match self
                .get::<Vec<TrelloCard>>(
                    &format!("lists/{}/cards", list.id),
                    &[("fields", "name,due,dueComplete")],
                )
                .await
            {
                Ok(cards) => cards,
                Err(e) => {
                    warn!(
                        list = %list.id,
                        error = %e,
                        "Failed to fetch Trello cards, counting list as empty"
                    );
                    Vec::new()
                }
            };
            board.push(BoardList { list, cards });
        }
        Ok(board)
    }

    async fn get<T: DeserializeOwned>(&self, path: &str, params: &[(&str, &str)]) -> Result<T> {
        let response = self
            .client
            .get(format!("{}/{}", self.base_url, path))
            .query(&[
                ("key", self.settings.api_key.as_str()),
                ("token", self.settings.token.as_str()),
            ])
            .query(params)
            .send()
            .await
            .map_err(|e| SourceError::from_reqwest(SECTION, e))?;

        if !response.status().is_success() {
            return Err(SourceError::from_response(SECTION, response).await);
        }

        response
            .json()
            .await
            .map_err(|e| SourceError::from_reqwest(SECTION, e))
    }
}

#[async_trait]
impl SourceConnector for TrelloConnector {
    fn kind(&self) -> SectionKind {
        SECTION
    }

    async fn fetch_section(&self) -> Result<ReportSection> {
        let board = self.fetch_board().await?;
        let section = render_board(&board, Utc::now());
        info!(
            lists = board.len(),
            cards = section.count.unwrap_or(0),
            overdue = section.overdue_count.unwrap_or(0),
            "Trello section ready"
        );
        Ok(section)
    }
}

/// Renders the Trello section for a board as of `now`.
pub fn render_board(board: &[BoardList], now: DateTime<Utc>) -> ReportSection {
    let mut section = ReportSection::new(SECTION);
    if board.is_empty() {
        section.push_line("  _(No lists found on the Trello board)_");
        return section.with_count(0).with_overdue_count(0);
    }

    let mut total = 0;
    let mut overdue = Vec::new();
    for entry in board {
        let list_name = collapse_whitespace(&entry.list.name);
        total += entry.cards.len();
        section.push_line(format!(
            "- **{}**: {} card(s)",
            list_name,
            entry.cards.len()
        ));
        overdue.extend(
            entry
                .cards
                .iter()
                .filter(|card| card.is_overdue(now))
                .map(|card| {
                    format!(
                        "- '{}' in list '{}'",
                        collapse_whitespace(&card.name),
                        list_name
                    )
                }),
        );
    }

    section.push_line(format!("Total Cards: {}", total));
    if overdue.is_empty() {
        section.push_line("✅ **No overdue tasks found.**");
    } else {
        section.push_line("🚨 **Overdue Tasks:**");
    }
    let overdue_count = overdue.len();
    for line in overdue {
        section.push_line(line);
    }
    section.with_count(total).with_overdue_count(overdue_count)
}
