//! Client/freelancer chat rules.
//!
//! Delivery is by polling only. A chat belongs to one project and exactly two
//! participants; each side has its own unread counter.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::CoreError;
use crate::types::DbId;

/// Maximum length of a message body in characters.
pub const MAX_MESSAGE_LENGTH: usize = 2000;

/// Kind of message payload.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    #[default]
    Text,
    File,
}

impl MessageKind {
    pub fn as_str(self) -> &'static str {
        match self {
            MessageKind::Text => "text",
            MessageKind::File => "file",
        }
    }
}

impl FromStr for MessageKind {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "text" => Ok(MessageKind::Text),
            "file" => Ok(MessageKind::File),
            other => Err(CoreError::Validation(format!(
                "Unknown message kind '{other}'"
            ))),
        }
    }
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Descriptor of an already-uploaded file referenced by a message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct FileAttachment {
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    #[validate(url)]
    pub url: String,
    #[validate(range(min = 0))]
    pub size: Option<i64>,
    #[validate(length(max = 100))]
    pub mime: Option<String>,
}

/// Request body for `POST /chats`.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OpenChat {
    pub project_id: DbId,
    pub freelancer_id: DbId,
}

/// Request body for sending a message.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct SendMessage {
    #[validate(length(min = 1, max = 2000, message = "must be 1-2000 characters"))]
    pub text: String,
    #[serde(default)]
    pub kind: MessageKind,
    #[validate(nested)]
    pub file: Option<FileAttachment>,
}

impl SendMessage {
    /// Field rules plus the cross-field rules: the text must not be blank
    /// and a `file` message must carry an attachment.
    pub fn check(&self) -> Result<(), CoreError> {
        self.validate()?;
        if self.text.trim().is_empty() {
            return Err(CoreError::Validation("text: must not be blank".into()));
        }
        if self.kind == MessageKind::File && self.file.is_none() {
            return Err(CoreError::Validation(
                "file: required when kind is 'file'".into(),
            ));
        }
        Ok(())
    }
}

/// Which side of a chat a user is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatSide {
    Client,
    Freelancer,
}

impl ChatSide {
    pub fn other(self) -> ChatSide {
        match self {
            ChatSide::Client => ChatSide::Freelancer,
            ChatSide::Freelancer => ChatSide::Client,
        }
    }
}

/// The two users of a chat.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChatParticipants {
    pub client_id: DbId,
    pub freelancer_id: DbId,
}

impl ChatParticipants {
    pub fn side_of(&self, user_id: DbId) -> Option<ChatSide> {
        if user_id == self.client_id {
            Some(ChatSide::Client)
        } else if user_id == self.freelancer_id {
            Some(ChatSide::Freelancer)
        } else {
            None
        }
    }

    /// The caller's side, or Forbidden for outsiders.
    pub fn require_participant(&self, user_id: DbId) -> Result<ChatSide, CoreError> {
        self.side_of(user_id)
            .ok_or_else(|| CoreError::Forbidden("Access to this chat is denied".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text_message(text: &str) -> SendMessage {
        SendMessage {
            text: text.into(),
            kind: MessageKind::Text,
            file: None,
        }
    }

    #[test]
    fn plain_text_message_is_valid() {
        assert!(text_message("Hello!").check().is_ok());
    }

    #[test]
    fn blank_text_is_rejected() {
        assert!(text_message("   ").check().is_err());
        assert!(text_message("").check().is_err());
    }

    #[test]
    fn overlong_text_is_rejected() {
        let long = "a".repeat(MAX_MESSAGE_LENGTH + 1);
        assert!(text_message(&long).check().is_err());
        let max = "a".repeat(MAX_MESSAGE_LENGTH);
        assert!(text_message(&max).check().is_ok());
    }

    #[test]
    fn file_message_requires_attachment() {
        let mut msg = text_message("see attached");
        msg.kind = MessageKind::File;
        assert!(msg.check().is_err());

        msg.file = Some(FileAttachment {
            name: "brief.pdf".into(),
            url: "https://files.example.com/brief.pdf".into(),
            size: Some(1024),
            mime: Some("application/pdf".into()),
        });
        assert!(msg.check().is_ok());
    }

    #[test]
    fn attachment_url_must_be_valid() {
        let mut msg = text_message("see attached");
        msg.kind = MessageKind::File;
        msg.file = Some(FileAttachment {
            name: "brief.pdf".into(),
            url: "not a url".into(),
            size: None,
            mime: None,
        });
        assert!(msg.check().is_err());
    }

    #[test]
    fn kind_defaults_to_text() {
        let msg: SendMessage = serde_json::from_value(serde_json::json!({ "text": "hi" })).unwrap();
        assert_eq!(msg.kind, MessageKind::Text);
    }

    #[test]
    fn participants_resolve_sides() {
        let chat = ChatParticipants {
            client_id: 1,
            freelancer_id: 2,
        };
        assert_eq!(chat.side_of(1), Some(ChatSide::Client));
        assert_eq!(chat.side_of(2), Some(ChatSide::Freelancer));
        assert_eq!(chat.side_of(3), None);
        assert!(chat.require_participant(3).is_err());
        assert_eq!(ChatSide::Client.other(), ChatSide::Freelancer);
    }
}
