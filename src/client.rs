//! HTTP page source for the group-chat API.
//!
//! [`PageSource`] is the seam between the pagination loop and the network:
//! the extractor only ever asks for "the page before this id", so tests can
//! drive it with an in-memory implementation and no HTTP at all.
//!
//! [`ApiClient`] is the real implementation over a blocking reqwest client.

use serde::Deserialize;

use crate::error::{ChatvaultError, Result};
use crate::message::Message;

/// A source of message pages, newest first.
///
/// Implementations return at most `limit` messages per call. An empty vector
/// is the exhaustion signal: there is nothing older than `before_id`.
pub trait PageSource {
    /// Fetches one page of messages.
    ///
    /// `before_id` is the exclusive backward boundary; `None` requests the
    /// newest page.
    fn fetch_page(
        &self,
        group_id: &str,
        limit: u32,
        before_id: Option<&str>,
    ) -> Result<Vec<Message>>;
}

// Response envelope: {"response": {"messages": [...]}}.
// A missing or null `messages` key decodes as empty, which the extractor
// treats as exhaustion.

#[derive(Debug, Deserialize)]
struct Envelope {
    response: PageBody,
}

#[derive(Debug, Deserialize)]
struct PageBody {
    #[serde(default)]
    messages: Vec<Message>,
}

/// Blocking HTTP client for the group-chat API.
///
/// # Example
///
/// ```rust,no_run
/// use chatvault::client::{ApiClient, PageSource};
///
/// let client = ApiClient::new("https://api.groupme.com/v3", "secret-token");
/// let newest = client.fetch_page("123", 20, None)?;
/// # Ok::<(), chatvault::ChatvaultError>(())
/// ```
pub struct ApiClient {
    http: reqwest::blocking::Client,
    base_url: String,
    token: String,
}

impl ApiClient {
    /// Creates a client against the given base URL.
    ///
    /// Any trailing slash on `base_url` is trimmed so joined paths stay clean.
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self {
            http: reqwest::blocking::Client::new(),
            base_url,
            token: token.into(),
        }
    }

    fn messages_url(&self, group_id: &str) -> String {
        format!("{}/groups/{}/messages", self.base_url, group_id)
    }
}

impl PageSource for ApiClient {
    fn fetch_page(
        &self,
        group_id: &str,
        limit: u32,
        before_id: Option<&str>,
    ) -> Result<Vec<Message>> {
        let context = match before_id {
            Some(id) => format!("fetching messages before id {id}"),
            None => "fetching newest messages".to_string(),
        };

        let mut request = self
            .http
            .get(self.messages_url(group_id))
            .query(&[("token", self.token.as_str())])
            .query(&[("limit", limit)]);
        if let Some(id) = before_id {
            request = request.query(&[("before_id", id)]);
        }

        let response = request
            .send()
            .and_then(reqwest::blocking::Response::error_for_status)
            .map_err(|e| ChatvaultError::transport(context.clone(), e))?;

        let envelope: Envelope = response
            .json()
            .map_err(|e| ChatvaultError::transport(context, e))?;

        Ok(envelope.response.messages)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_url() {
        let client = ApiClient::new("https://api.groupme.com/v3", "t");
        assert_eq!(
            client.messages_url("123"),
            "https://api.groupme.com/v3/groups/123/messages"
        );
    }

    #[test]
    fn test_trailing_slash_trimmed() {
        let client = ApiClient::new("http://localhost:8080/v3/", "t");
        assert_eq!(
            client.messages_url("9"),
            "http://localhost:8080/v3/groups/9/messages"
        );
    }

    #[test]
    fn test_envelope_decodes_messages() {
        let json = r#"{"response": {"messages": [
            {"id": "2", "created_at": 20},
            {"id": "1", "created_at": 10}
        ]}}"#;
        let envelope: Envelope = serde_json::from_str(json).unwrap();
        assert_eq!(envelope.response.messages.len(), 2);
        assert_eq!(envelope.response.messages[1].id, "1");
    }

    #[test]
    fn test_envelope_missing_messages_is_empty() {
        let json = r#"{"response": {}}"#;
        let envelope: Envelope = serde_json::from_str(json).unwrap();
        assert!(envelope.response.messages.is_empty());
    }
}
