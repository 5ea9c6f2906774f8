//! Invite client
//!
//! Connects to the relay, sends one request and then surfaces every text
//! frame the relay pushes until the socket closes. No retries.

use std::ops::ControlFlow;

use actix_codec::Framed;
use awc::BoxedSocket;
use awc::error::WsProtocolError;
use awc::ws::{Codec, Frame, Message};
use futures::{SinkExt, StreamExt};
use thiserror::Error;

use super::InviteRequest;

#[derive(Error, Debug)]
pub enum ClientError {
    /// Relay unreachable or the upgrade was refused.
    #[error("cannot reach relay at {url}: {reason}")]
    Connect { url: String, reason: String },

    /// Connection broke mid-stream.
    #[error("relay connection: {0}")]
    Protocol(#[from] WsProtocolError),

    #[error("encoding request: {0}")]
    Encode(#[from] serde_json::Error),
}

pub struct InviteClient {
    framed: Framed<BoxedSocket, Codec>,
}

impl InviteClient {
    /// Open a WebSocket to the relay at `url`
    pub async fn connect(url: &str) -> Result<Self, ClientError> {
        let (_response, framed) = awc::Client::new()
            .ws(url)
            .connect()
            .await
            .map_err(|e| ClientError::Connect {
                url: url.to_string(),
                reason: e.to_string(),
            })?;
        log::info!("Connected to relay at {url}");
        Ok(Self { framed })
    }

    pub async fn send(&mut self, request: &InviteRequest) -> Result<(), ClientError> {
        let json = serde_json::to_string(request)?;
        self.send_text(json).await
    }

    /// Send a raw text frame
    pub async fn send_text(&mut self, text: impl Into<String>) -> Result<(), ClientError> {
        self.framed.send(Message::Text(text.into().into())).await?;
        Ok(())
    }

    /// Next text message from the relay, `None` once the relay closes
    pub async fn recv(&mut self) -> Result<Option<String>, ClientError> {
        while let Some(frame) = self.framed.next().await {
            match frame? {
                Frame::Text(bytes) => return Ok(Some(String::from_utf8_lossy(&bytes).into_owned())),
                Frame::Ping(bytes) => self.framed.send(Message::Pong(bytes)).await?,
                Frame::Close(reason) => {
                    log::info!("Relay closed the connection: {reason:?}");
                    return Ok(None);
                }
                _ => {}
            }
        }
        Ok(None)
    }

    pub async fn close(mut self) -> Result<(), ClientError> {
        self.framed.send(Message::Close(None)).await?;
        Ok(())
    }

    /// Full invite flow: connect, send `{username, invite}`, call `on_sent`,
    /// then hand every relay message to `on_message` until the relay closes
    /// or the callback breaks.
    pub async fn invite(
        url: &str,
        username: &str,
        opponent: &str,
        on_sent: impl FnOnce(),
        mut on_message: impl FnMut(&str) -> ControlFlow<()>,
    ) -> Result<(), ClientError> {
        let mut client = Self::connect(url).await?;
        client.send(&InviteRequest::new(username, opponent)).await?;
        on_sent();
        while let Some(msg) = client.recv().await? {
            if on_message(&msg).is_break() {
                return client.close().await;
            }
        }
        Ok(())
    }
}
