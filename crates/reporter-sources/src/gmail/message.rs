//! Gmail message payloads and body extraction.

use std::sync::OnceLock;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use regex::Regex;
use serde::Deserialize;

/// Entry in a `messages.list` response.
#[derive(Debug, Clone, Deserialize)]
pub struct MessageRef {
    pub id: String,
}

/// `messages.list` response.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageList {
    #[serde(default)]
    pub messages: Vec<MessageRef>,
    #[serde(default)]
    pub result_size_estimate: Option<u32>,
}

/// A message fetched with `format=full`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Message {
    pub id: String,
    #[serde(default)]
    pub snippet: Option<String>,
    #[serde(default)]
    pub payload: Option<MessagePart>,
}

/// One MIME part. The top-level payload is a part too.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessagePart {
    #[serde(default)]
    pub mime_type: Option<String>,
    #[serde(default)]
    pub headers: Vec<Header>,
    #[serde(default)]
    pub body: Option<PartBody>,
    #[serde(default)]
    pub parts: Vec<MessagePart>,
}

/// Message header.
#[derive(Debug, Clone, Deserialize)]
pub struct Header {
    pub name: String,
    pub value: String,
}

/// Body of a part; `data` is base64url.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PartBody {
    #[serde(default)]
    pub data: Option<String>,
}

impl MessagePart {
    fn is(&self, mime: &str) -> bool {
        self.mime_type
            .as_deref()
            .is_some_and(|m| m.eq_ignore_ascii_case(mime))
    }

    fn decoded(&self) -> Option<String> {
        self.body
            .as_ref()
            .and_then(|b| b.data.as_deref())
            .and_then(decode_body)
            .filter(|text| !text.trim().is_empty())
    }

    /// Value of the first header named `name`, case-insensitive.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|h| h.name.eq_ignore_ascii_case(name))
            .map(|h| h.value.as_str())
    }
}

impl Message {
    /// `From` header, or `Unknown Sender`.
    pub fn sender(&self) -> String {
        self.payload
            .as_ref()
            .and_then(|p| p.header("From"))
            .unwrap_or("Unknown Sender")
            .to_string()
    }

    /// `Subject` header, or `No Subject`.
    pub fn subject(&self) -> String {
        self.payload
            .as_ref()
            .and_then(|p| p.header("Subject"))
            .filter(|s| !s.trim().is_empty())
            .unwrap_or("No Subject")
            .to_string()
    }

    /// Best-effort plain body text.
    ///
    /// Order: a `text/plain` part, a `text/html` part with tags stripped, the
    /// first decodable nested part, the top-level body, then the API snippet.
    pub fn body_text(&self) -> String {
        self.payload
            .as_ref()
            .and_then(payload_text)
            .or_else(|| self.snippet.clone())
            .unwrap_or_default()
            .trim()
            .to_string()
    }
}

fn payload_text(payload: &MessagePart) -> Option<String> {
    if payload.parts.is_empty() {
        return payload
            .decoded()
            .map(|text| if payload.is("text/html") { strip_html(&text) } else { text });
    }

    let decoded_part = |mime: &str| {
        payload
            .parts
            .iter()
            .find(|p| p.is(mime))
            .and_then(MessagePart::decoded)
    };
    if let Some(text) = decoded_part("text/plain") {
        return Some(text);
    }
    if let Some(html) = decoded_part("text/html") {
        return Some(strip_html(&html));
    }
    payload
        .parts
        .iter()
        .filter(|p| !p.parts.is_empty())
        .find_map(payload_text)
        .or_else(|| payload.decoded())
}

/// Decodes a base64url body, with or without padding.
pub fn decode_body(data: &str) -> Option<String> {
    let bytes = URL_SAFE_NO_PAD.decode(data.trim().trim_end_matches('=')).ok()?;
    Some(String::from_utf8_lossy(&bytes).into_owned())
}

fn html_patterns() -> &'static [Regex] {
    static PATTERNS: OnceLock<Vec<Regex>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        [
            r"(?is)<(script|style|head)\b.*?</(script|style|head)>",
            r"(?s)<!--.*?-->",
            r"(?s)<[^>]*>",
        ]
        .into_iter()
        .filter_map(|p| Regex::new(p).ok())
        .collect()
    })
}

/// Removes tags and decodes the common entities.
pub fn strip_html(html: &str) -> String {
    let mut text = html.to_string();
    for pattern in html_patterns() {
        text = pattern.replace_all(&text, "\n").into_owned();
    }
    let text = text
        .replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&");
    text.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::engine::general_purpose::URL_SAFE;

    fn encoded(text: &str) -> Option<PartBody> {
        Some(PartBody {
            data: Some(URL_SAFE.encode(text)),
        })
    }

    fn part(mime: &str, text: &str) -> MessagePart {
        MessagePart {
            mime_type: Some(mime.into()),
            body: encoded(text),
            ..Default::default()
        }
    }

    fn message(payload: MessagePart) -> Message {
        Message {
            id: "m1".into(),
            snippet: Some("snippet text".into()),
            payload: Some(payload),
        }
    }

    #[test]
    fn test_headers() {
        let msg: Message = serde_json::from_value(serde_json::json!({
            "id": "m1",
            "payload": {
                "mimeType": "text/plain",
                "headers": [
                    {"name": "from", "value": "Ann <ann@example.com>"},
                    {"name": "Subject", "value": "Weekly update"}
                ]
            }
        }))
        .unwrap();
        assert_eq!(msg.sender(), "Ann <ann@example.com>");
        assert_eq!(msg.subject(), "Weekly update");

        let bare = Message::default();
        assert_eq!(bare.sender(), "Unknown Sender");
        assert_eq!(bare.subject(), "No Subject");
    }

    #[test]
    fn test_prefers_plain_over_html() {
        let msg = message(MessagePart {
            mime_type: Some("multipart/alternative".into()),
            parts: vec![part("text/html", "<p>html</p>"), part("text/plain", "plain body")],
            ..Default::default()
        });
        assert_eq!(msg.body_text(), "plain body");
    }

    #[test]
    fn test_html_is_stripped() {
        let msg = message(MessagePart {
            mime_type: Some("multipart/alternative".into()),
            parts: vec![part(
                "text/html",
                "<html><head><style>p{}</style></head>\
                 <body><p>Release &amp; deploy</p><br>done</body></html>",
            )],
            ..Default::default()
        });
        assert_eq!(msg.body_text(), "Release & deploy\ndone");
    }

    #[test]
    fn test_nested_parts() {
        let msg = message(MessagePart {
            mime_type: Some("multipart/mixed".into()),
            parts: vec![
                MessagePart {
                    mime_type: Some("multipart/alternative".into()),
                    parts: vec![part("text/plain", "nested body")],
                    ..Default::default()
                },
                part("application/pdf", "%PDF"),
            ],
            ..Default::default()
        });
        assert_eq!(msg.body_text(), "nested body");
    }

    #[test]
    fn test_top_level_body_and_snippet_fallback() {
        assert_eq!(message(part("text/plain", " single part ")).body_text(), "single part");

        let empty = message(MessagePart {
            mime_type: Some("text/plain".into()),
            ..Default::default()
        });
        assert_eq!(empty.body_text(), "snippet text");
    }

    #[test]
    fn test_decode_body_padding() {
        assert_eq!(decode_body("aGk").as_deref(), Some("hi"));
        assert_eq!(decode_body("aGk=").as_deref(), Some("hi"));
        assert_eq!(decode_body("!!"), None);
    }
}
