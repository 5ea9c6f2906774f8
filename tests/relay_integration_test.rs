//! End-to-end relay tests over real WebSockets on an ephemeral port

use std::cell::RefCell;
use std::net::TcpListener;
use std::ops::ControlFlow;
use std::sync::Arc;
use std::time::Duration;

use term_pong::net::{ClientError, InviteClient, InviteRequest, Relay, RelayServer};

fn start_relay() -> (String, Arc<Relay>) {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind ephemeral port");
    let port = listener.local_addr().expect("local addr").port();
    let server = RelayServer::new(Arc::new(Relay::new())).workers(1);
    let relay = server.relay();
    actix_web::rt::spawn(server.listen(listener).expect("start relay"));
    (format!("ws://127.0.0.1:{port}"), relay)
}

async fn wait_until(relay: &Relay, name: &str, online: bool) {
    for _ in 0..500 {
        if relay.is_online(name).await == online {
            return;
        }
        actix_web::rt::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("{name} never became online={online}");
}

#[actix_web::test]
async fn test_invite_reaches_registered_player() {
    let (url, relay) = start_relay();

    let mut bob = InviteClient::connect(&url).await.unwrap();
    bob.send(&InviteRequest::register("bob")).await.unwrap();
    wait_until(&relay, "bob", true).await;

    let mut alice = InviteClient::connect(&url).await.unwrap();
    alice.send(&InviteRequest::new("alice", "bob")).await.unwrap();

    assert_eq!(alice.recv().await.unwrap().as_deref(), Some("Invite sent to bob"));
    assert_eq!(
        bob.recv().await.unwrap().as_deref(),
        Some("alice has invited you to a game!")
    );
}

#[actix_web::test]
async fn test_invite_flow_to_offline_player() {
    let (url, _relay) = start_relay();

    let received = RefCell::new(Vec::new());
    InviteClient::invite(
        &url,
        "alice",
        "carol",
        || received.borrow_mut().push("sent".to_string()),
        |msg| {
            received.borrow_mut().push(msg.to_string());
            ControlFlow::Break(())
        },
    )
    .await
    .unwrap();

    // The sent hook fires before any relay reply is handed over
    assert_eq!(received.into_inner(), vec!["sent", "carol is not online."]);
}

#[actix_web::test]
async fn test_malformed_message_closes_only_that_connection() {
    let (url, relay) = start_relay();

    let mut bob = InviteClient::connect(&url).await.unwrap();
    bob.send(&InviteRequest::register("bob")).await.unwrap();
    wait_until(&relay, "bob", true).await;

    let mut broken = InviteClient::connect(&url).await.unwrap();
    broken.send_text(r#"{"invite":"bob"}"#).await.unwrap();
    assert_eq!(broken.recv().await.unwrap(), None);

    // Relay keeps serving everyone else
    let mut alice = InviteClient::connect(&url).await.unwrap();
    alice.send(&InviteRequest::new("alice", "bob")).await.unwrap();
    assert_eq!(alice.recv().await.unwrap().as_deref(), Some("Invite sent to bob"));
    assert_eq!(
        bob.recv().await.unwrap().as_deref(),
        Some("alice has invited you to a game!")
    );
}

#[actix_web::test]
async fn test_closed_connection_is_unregistered() {
    let (url, relay) = start_relay();

    let mut bob = InviteClient::connect(&url).await.unwrap();
    bob.send(&InviteRequest::register("bob")).await.unwrap();
    wait_until(&relay, "bob", true).await;

    bob.close().await.unwrap();
    wait_until(&relay, "bob", false).await;

    let mut alice = InviteClient::connect(&url).await.unwrap();
    alice.send(&InviteRequest::new("alice", "bob")).await.unwrap();
    assert_eq!(alice.recv().await.unwrap().as_deref(), Some("bob is not online."));
}

#[actix_web::test]
async fn test_unreachable_relay_fails_fast() {
    // Grab a free port, then release it so nothing is listening there
    let port = TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap()
        .port();
    let result = InviteClient::connect(&format!("ws://127.0.0.1:{port}")).await;
    assert!(matches!(result, Err(ClientError::Connect { .. })));
}
