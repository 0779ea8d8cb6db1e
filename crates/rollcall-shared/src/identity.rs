use serde::{Deserialize, Serialize};

use crate::constants::KDF_CONTEXT_PARTICIPANT_KEY;
use crate::types::Sender;

/// Who a roster entry refers to.
///
/// The variant decides how the entry is keyed, displayed and linked. Two
/// identities of the same variant with the same handle text always share a
/// key; identities of different variants never do.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Identity {
    /// A user confirmed by the messaging channel itself.
    Channel {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        external_id: Option<String>,
        #[serde(default)]
        handle: String,
        #[serde(default)]
        first_name: String,
        #[serde(default)]
        last_name: String,
    },
    /// A user named by `@handle` from someone else, not yet seen in the chat.
    Unresolved { handle: String },
    /// A free-text name with no channel account behind it.
    Guest { name: String },
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum IdentityKind {
    Channel,
    Unresolved,
    Guest,
}

impl IdentityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            IdentityKind::Channel => "channel",
            IdentityKind::Unresolved => "unresolved",
            IdentityKind::Guest => "guest",
        }
    }
}

impl std::fmt::Display for IdentityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Identity {
    /// Build the channel identity of the user who sent a command.
    pub fn from_sender(sender: &Sender) -> Self {
        let external_id = Some(sender.external_id.trim())
            .filter(|id| !id.is_empty())
            .map(str::to_string);

        Identity::Channel {
            external_id,
            handle: sender.handle.clone(),
            first_name: sender.first_name.clone(),
            last_name: sender.last_name.clone(),
        }
    }

    pub fn unresolved(handle: impl Into<String>) -> Self {
        Identity::Unresolved {
            handle: handle.into(),
        }
    }

    pub fn guest(name: impl Into<String>) -> Self {
        Identity::Guest { name: name.into() }
    }

    pub fn kind(&self) -> IdentityKind {
        match self {
            Identity::Channel { .. } => IdentityKind::Channel,
            Identity::Unresolved { .. } => IdentityKind::Unresolved,
            Identity::Guest { .. } => IdentityKind::Guest,
        }
    }

    /// The handle or free text this identity was created from.
    pub fn handle(&self) -> &str {
        match self {
            Identity::Channel { handle, .. } | Identity::Unresolved { handle } => handle,
            Identity::Guest { name } => name,
        }
    }

    /// Key of this identity inside a chat partition, `"<kind>:<id>"`.
    ///
    /// Channel identities use their external id when they have one; every
    /// other case hashes the handle text.
    pub fn unique_key(&self) -> String {
        let id = match self {
            Identity::Channel {
                external_id: Some(id),
                ..
            } => id.clone(),
            other => content_hash(other.handle()),
        };
        format!("{}:{}", self.kind(), id)
    }

    /// Human-readable name shown in the roster.
    pub fn display_name(&self) -> String {
        match self {
            Identity::Channel {
                handle,
                first_name,
                last_name,
                ..
            } => {
                if first_name.is_empty() {
                    handle.clone()
                } else if last_name.is_empty() {
                    first_name.clone()
                } else {
                    format!("{first_name} {last_name}")
                }
            }
            Identity::Unresolved { handle } => handle.clone(),
            Identity::Guest { name } => name.clone(),
        }
    }

    /// Mention form: `@handle` for channel users and references, the plain
    /// text for guests.
    pub fn display_link(&self) -> String {
        match self {
            Identity::Channel { handle, .. } if handle.is_empty() => self.display_name(),
            Identity::Channel { handle, .. } | Identity::Unresolved { handle } => {
                format!("@{handle}")
            }
            Identity::Guest { name } => name.clone(),
        }
    }

    pub fn is_unresolved(&self) -> bool {
        matches!(self, Identity::Unresolved { .. })
    }
}

fn content_hash(text: &str) -> String {
    let mut hasher = blake3::Hasher::new_derive_key(KDF_CONTEXT_PARTICIPANT_KEY);
    hasher.update(text.as_bytes());
    hasher.finalize().to_hex().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn smith() -> Identity {
        Identity::Channel {
            external_id: Some("1001".into()),
            handle: "smith".into(),
            first_name: "John".into(),
            last_name: "Smith".into(),
        }
    }

    #[test]
    fn test_same_variant_same_handle_collides() {
        assert_eq!(
            Identity::unresolved("jones").unique_key(),
            Identity::unresolved("jones").unique_key()
        );
        assert_eq!(
            Identity::guest("My brother").unique_key(),
            Identity::guest("My brother").unique_key()
        );
    }

    #[test]
    fn test_different_variants_never_collide() {
        let unresolved = Identity::unresolved("jones").unique_key();
        let guest = Identity::guest("jones").unique_key();
        let channel = Identity::Channel {
            external_id: None,
            handle: "jones".into(),
            first_name: String::new(),
            last_name: String::new(),
        }
        .unique_key();

        assert_ne!(unresolved, guest);
        assert_ne!(unresolved, channel);
        assert_ne!(guest, channel);
        assert!(unresolved.starts_with("unresolved:"));
        assert!(guest.starts_with("guest:"));
    }

    #[test]
    fn test_channel_key_prefers_external_id() {
        assert_eq!(smith().unique_key(), "channel:1001");
    }

    #[test]
    fn test_display_name_rules() {
        assert_eq!(smith().display_name(), "John Smith");

        let first_only = Identity::Channel {
            external_id: None,
            handle: "jj".into(),
            first_name: "John".into(),
            last_name: String::new(),
        };
        assert_eq!(first_only.display_name(), "John");

        let handle_only = Identity::Channel {
            external_id: None,
            handle: "jj".into(),
            first_name: String::new(),
            last_name: "Ignored".into(),
        };
        assert_eq!(handle_only.display_name(), "jj");

        assert_eq!(Identity::guest("Uncle Bob").display_name(), "Uncle Bob");
    }

    #[test]
    fn test_display_link_rules() {
        assert_eq!(smith().display_link(), "@smith");
        assert_eq!(Identity::unresolved("jones").display_link(), "@jones");
        assert_eq!(Identity::guest("Uncle Bob").display_link(), "Uncle Bob");

        let no_handle = Identity::Channel {
            external_id: Some("7".into()),
            handle: String::new(),
            first_name: "Anna".into(),
            last_name: String::new(),
        };
        assert_eq!(no_handle.display_link(), "Anna");
    }

    #[test]
    fn test_from_sender_drops_blank_id() {
        let sender = Sender {
            external_id: "  ".into(),
            handle: "nobody".into(),
            first_name: String::new(),
            last_name: String::new(),
        };
        let identity = Identity::from_sender(&sender);
        assert!(identity.unique_key().starts_with("channel:"));
        assert_ne!(identity.unique_key(), "channel:");
        assert!(!identity.is_unresolved());
    }

    #[test]
    fn test_json_shape_is_tagged() {
        let value = serde_json::to_value(Identity::unresolved("jones")).unwrap();
        assert_eq!(value["type"], "unresolved");
        assert_eq!(value["handle"], "jones");
    }
}
