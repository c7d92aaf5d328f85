//! The raw message record as returned by the group-chat API.
//!
//! [`Message`] decodes only the fixed scalar columns the pipeline actually
//! reasons about (ids, timestamps, text, flags). Everything semi-structured —
//! attachments, reactions, events, pin metadata — is carried as opaque
//! [`serde_json::Value`]s, byte-for-byte, and only given shape later by the
//! transform stage's projections. Fields this struct does not model at all are
//! preserved through a flattened passthrough map so that raw files never lose
//! data the API sent.
//!
//! # Example
//!
//! ```
//! use chatvault::Message;
//!
//! let json = r#"{
//!     "id": "163",
//!     "group_id": "123",
//!     "sender_id": "u1",
//!     "created_at": 1714000000,
//!     "text": "hello",
//!     "system": false
//! }"#;
//! let msg: Message = serde_json::from_str(json)?;
//! assert_eq!(msg.id, "163");
//! assert_eq!(msg.created_at, 1714000000);
//! # Ok::<(), serde_json::Error>(())
//! ```

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One message from a group, as the API returns it.
///
/// `id` and `created_at` are required; the API never omits them. Message ids
/// are decimal strings that increase with time, which is what makes them
/// usable as a backward-pagination cursor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Message identifier, unique within a group.
    pub id: String,

    /// Identifier of the group this message belongs to.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub group_id: Option<String>,

    /// Identifier of the sender.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub sender_id: Option<String>,

    /// Creation time as integer epoch seconds.
    pub created_at: i64,

    /// Free-text body. `None` for attachment-only and some system messages.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub text: Option<String>,

    /// Whether this is a system-generated message (joins, topic changes, ...).
    #[serde(default)]
    pub system: bool,

    /// Display name of the sender at send time.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub name: Option<String>,

    /// Avatar URL of the sender at send time.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub avatar_url: Option<String>,

    /// Sender type ("user", "bot", "system").
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub sender_type: Option<String>,

    /// Client-supplied GUID used by the API for send de-duplication.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub source_guid: Option<String>,

    /// User id of the sender (distinct from the per-group `sender_id`).
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub user_id: Option<String>,

    /// Originating platform, when reported.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub platform: Option<String>,

    /// Ids of users who hearted the message.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub favorited_by: Option<Vec<String>>,

    /// Id of the user who pinned the message, if pinned.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub pinned_by: Option<String>,

    /// Deletion time as integer epoch seconds, for retracted messages.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub deleted_at: Option<i64>,

    /// Who performed the deletion ("sender" or "admin").
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub deletion_actor: Option<String>,

    // ------------------------------------------------------------------
    // Opaque nested attributes. Not decoded here; the transform stage pairs
    // each with the message id in its own side table.
    // ------------------------------------------------------------------
    /// Attachment list, carried opaquely.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub attachments: Option<Value>,

    /// Reaction list, carried opaquely.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub reactions: Option<Value>,

    /// Pin timestamp payload, carried opaquely.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub pinned_at: Option<Value>,

    /// System-event payload, carried opaquely.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub event: Option<Value>,

    /// Any field the API sends that this struct does not model.
    ///
    /// Flattened on (de)serialization so raw files round-trip the full record.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Message {
    /// Creates a minimal message with the required columns only.
    ///
    /// Mostly useful in tests and fixtures; real messages come out of the
    /// API envelope via serde.
    pub fn new(id: impl Into<String>, group_id: impl Into<String>, created_at: i64) -> Self {
        Self {
            id: id.into(),
            group_id: Some(group_id.into()),
            sender_id: None,
            created_at,
            text: None,
            system: false,
            name: None,
            avatar_url: None,
            sender_type: None,
            source_guid: None,
            user_id: None,
            platform: None,
            favorited_by: None,
            pinned_by: None,
            deleted_at: None,
            deletion_actor: None,
            attachments: None,
            reactions: None,
            pinned_at: None,
            event: None,
            extra: Map::new(),
        }
    }

    /// Builder method to set the text body.
    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Builder method to set the sender id.
    #[must_use]
    pub fn with_sender(mut self, sender_id: impl Into<String>) -> Self {
        self.sender_id = Some(sender_id.into());
        self
    }

    /// Builder method to set the opaque attachment payload.
    #[must_use]
    pub fn with_attachments(mut self, attachments: Value) -> Self {
        self.attachments = Some(attachments);
        self
    }

    /// Returns `true` if the message carries any nested attribute payload.
    pub fn has_nested(&self) -> bool {
        self.attachments.is_some()
            || self.reactions.is_some()
            || self.pinned_at.is_some()
            || self.event.is_some()
    }
}
