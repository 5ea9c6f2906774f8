//! Invite relay and client
//!
//! Wire format: the client sends one JSON object per WebSocket text frame,
//! `{"username": "...", "invite": "..."}` with `invite` optional. The relay
//! answers with plain text frames, always one of three canned lines.

pub mod client;
pub mod relay;
pub mod server;

pub use client::{ClientError, InviteClient};
pub use relay::{Connection, Delivery, Relay, RelayError};
pub use server::RelayServer;

use serde::{Deserialize, Serialize};

/// Client-to-relay message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InviteRequest {
    /// Sender; (re)registers this connection under the name
    pub username: String,
    /// Player to notify
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub invite: Option<String>,
}

impl InviteRequest {
    pub fn new(username: impl Into<String>, invite: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            invite: Some(invite.into()),
        }
    }

    /// Registration without an invite
    pub fn register(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            invite: None,
        }
    }
}

/// Sent to the invited player
pub fn invited_notice(from: &str) -> String {
    format!("{from} has invited you to a game!")
}

/// Sent back to the inviter on delivery
pub fn invite_sent_notice(to: &str) -> String {
    format!("Invite sent to {to}")
}

/// Sent back to the inviter when nobody is registered under `to`
pub fn not_online_notice(to: &str) -> String {
    format!("{to} is not online.")
}
