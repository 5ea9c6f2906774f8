//! Username registry and invite routing
//!
//! Transport-free: each connection is represented by an outbound text queue,
//! so the routing rules can be driven directly from tests.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};

use thiserror::Error;
use tokio::sync::Mutex;
use tokio::sync::mpsc::UnboundedSender;

use super::{InviteRequest, invite_sent_notice, invited_notice, not_online_notice};

pub type ConnectionId = u64;
type Tx = UnboundedSender<String>;

#[derive(Error, Debug)]
pub enum RelayError {
    /// Frame is not an object with a string `username`.
    #[error("malformed message: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// What a handled message resulted in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// Registration only, no invite field
    Registered,
    /// Invite delivered to the target
    Sent,
    /// Target not registered (or its connection is gone)
    Offline,
}

/// One live connection as seen by the relay
#[derive(Debug)]
pub struct Connection {
    id: ConnectionId,
    tx: Tx,
    /// Every name this connection registered, for cleanup on close
    names: HashSet<String>,
}

impl Connection {
    pub fn id(&self) -> ConnectionId {
        self.id
    }

    fn reply(&self, text: String) {
        if self.tx.send(text).is_err() {
            log::warn!("connection {} closed before reply", self.id);
        }
    }
}

#[derive(Debug)]
struct Peer {
    id: ConnectionId,
    tx: Tx,
}

/// Registry of online players; the last connection to claim a name wins
#[derive(Debug)]
pub struct Relay {
    peers: Mutex<HashMap<String, Peer>>,
    count: AtomicU64,
}

impl Default for Relay {
    fn default() -> Self {
        Self {
            peers: Mutex::new(HashMap::new()),
            count: AtomicU64::new(1),
        }
    }
}

impl Relay {
    pub fn new() -> Self {
        Self::default()
    }

    /// Track a new connection whose outbound frames go to `tx`
    pub fn connect(&self, tx: Tx) -> Connection {
        let id = self.count.fetch_add(1, Ordering::Relaxed);
        log::debug!("connection {id} opened");
        Connection {
            id,
            tx,
            names: HashSet::new(),
        }
    }

    /// Handle one text frame from `conn`
    ///
    /// A malformed frame is returned as an error and changes nothing; the
    /// caller decides to drop the connection.
    pub async fn handle(&self, conn: &mut Connection, text: &str) -> Result<Delivery, RelayError> {
        let request: InviteRequest = serde_json::from_str(text)?;
        self.register(conn, &request.username).await;
        Ok(match request.invite {
            Some(target) => self.invite(conn, &request.username, &target).await,
            None => Delivery::Registered,
        })
    }

    /// Map `username` to `conn`, replacing any earlier connection
    pub async fn register(&self, conn: &mut Connection, username: &str) {
        let previous = self.peers.lock().await.insert(
            username.to_string(),
            Peer {
                id: conn.id,
                tx: conn.tx.clone(),
            },
        );
        if conn.names.insert(username.to_string()) {
            match previous {
                Some(peer) if peer.id != conn.id => log::info!(
                    "{username} re-registered on connection {} (was {})",
                    conn.id,
                    peer.id
                ),
                _ => log::info!("{username} registered on connection {}", conn.id),
            }
        }
    }

    /// Notify `target` that `from` wants a game and tell the sender how it went
    pub async fn invite(&self, conn: &Connection, from: &str, target: &str) -> Delivery {
        let delivered = {
            let mut peers = self.peers.lock().await;
            let sent = peers
                .get(target)
                .map(|peer| peer.tx.send(invited_notice(from)).is_ok());
            match sent {
                Some(true) => true,
                Some(false) => {
                    log::warn!("dropping stale entry for {target}");
                    peers.remove(target);
                    false
                }
                None => false,
            }
        };

        if delivered {
            log::info!("{from} invited {target}");
            conn.reply(invite_sent_notice(target));
            Delivery::Sent
        } else {
            log::info!("{from} invited {target}, who is not online");
            conn.reply(not_online_notice(target));
            Delivery::Offline
        }
    }

    /// Forget every name still held by `conn`
    ///
    /// Names since claimed by a newer connection are left alone.
    pub async fn disconnect(&self, conn: Connection) {
        let mut peers = self.peers.lock().await;
        for name in &conn.names {
            if peers.get(name).is_some_and(|peer| peer.id == conn.id) {
                peers.remove(name);
                log::info!("{name} went offline");
            }
        }
        log::debug!("connection {} closed", conn.id);
    }

    pub async fn is_online(&self, username: &str) -> bool {
        self.peers.lock().await.contains_key(username)
    }

    /// Number of registered names
    pub async fn online(&self) -> usize {
        self.peers.lock().await.len()
    }
}
