//! WebSocket endpoint for the relay
//!
//! Every request path upgrades to a WebSocket. Each connection gets its own
//! bridge task shuttling frames between the socket and the shared `Relay`.

use std::io;
use std::net::TcpListener;
use std::sync::Arc;

use actix_web::dev::Server;
use actix_web::middleware::Logger;
use actix_web::{App, HttpRequest, HttpResponse, HttpServer, web};
use actix_ws::{CloseCode, CloseReason, Message};
use futures::StreamExt;
use tokio::sync::mpsc::unbounded_channel;

use super::Relay;

pub struct RelayServer {
    relay: web::Data<Relay>,
    workers: usize,
}

impl RelayServer {
    pub fn new(relay: Arc<Relay>) -> Self {
        Self {
            relay: web::Data::from(relay),
            workers: 2,
        }
    }

    /// Worker threads; the registry is shared across all of them
    pub fn workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    /// Handle to the registry served by this server
    pub fn relay(&self) -> Arc<Relay> {
        self.relay.clone().into_inner()
    }

    /// Start serving on an already bound listener; await the returned server
    pub fn listen(self, listener: TcpListener) -> io::Result<Server> {
        let addr = listener.local_addr()?;
        let relay = self.relay;
        let server = HttpServer::new(move || {
            App::new()
                .wrap(Logger::new("%r %s %Ts"))
                .app_data(relay.clone())
                .default_service(web::to(enter))
        })
        .workers(self.workers)
        .listen(listener)?
        .run();
        log::info!("Multiplayer relay running on ws://{addr}");
        Ok(server)
    }
}

async fn enter(
    relay: web::Data<Relay>,
    req: HttpRequest,
    body: web::Payload,
) -> Result<HttpResponse, actix_web::Error> {
    let (response, session, stream) = actix_ws::handle(&req, body)?;
    actix_web::rt::spawn(bridge(relay.into_inner(), session, stream));
    Ok(response)
}

/// Pump one connection until either side closes or it sends garbage
async fn bridge(
    relay: Arc<Relay>,
    mut session: actix_ws::Session,
    mut stream: actix_ws::MessageStream,
) {
    let (tx, mut rx) = unbounded_channel::<String>();
    let mut conn = relay.connect(tx);
    let mut reason: Option<CloseReason> = None;

    'sesh: loop {
        tokio::select! {
            biased;
            msg = rx.recv() => match msg {
                Some(text) => if session.text(text).await.is_err() { break 'sesh },
                None => break 'sesh,
            },
            msg = stream.next() => {
                let text = match msg {
                    Some(Ok(Message::Text(text))) => text.to_string(),
                    Some(Ok(Message::Binary(bytes))) => match std::str::from_utf8(&bytes) {
                        Ok(text) => text.to_string(),
                        Err(_) => {
                            reason = Some((CloseCode::Unsupported, "expected utf-8 json").into());
                            break 'sesh;
                        }
                    },
                    Some(Ok(Message::Ping(bytes))) => {
                        if session.pong(&bytes).await.is_err() { break 'sesh }
                        continue 'sesh;
                    }
                    Some(Ok(Message::Close(_))) => break 'sesh,
                    Some(Err(e)) => {
                        log::warn!("connection {} protocol error: {e}", conn.id());
                        break 'sesh;
                    }
                    None => break 'sesh,
                    _ => continue 'sesh,
                };
                if let Err(e) = relay.handle(&mut conn, &text).await {
                    log::warn!("closing connection {}: {e}", conn.id());
                    reason = Some((CloseCode::Invalid, "malformed message").into());
                    break 'sesh;
                }
            },
        }
    }

    // Late invites now fail to send and are answered "not online"
    rx.close();
    relay.disconnect(conn).await;
    log::debug!("{} players online", relay.online().await);
    let _ = session.close(reason).await;
}
