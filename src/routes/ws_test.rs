use super::*;
use crate::frame::Status;
use crate::state::{Message, Room, test_helpers};
use futures::{SinkExt, StreamExt};
use serde_json::json;
use tokio::time::{Duration, timeout};
use tokio_tungstenite::tungstenite::Message as TungMessage;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;

// =============================================================================
// HELPERS
// =============================================================================

fn landing_for(state: &AppState, user: &str) -> LandingController {
    LandingController::new(state.clone(), SessionIdentity::named(user))
}

fn request_json(syscall: &str, data: serde_json::Value) -> String {
    json!({
        "id": Uuid::new_v4(),
        "syscall": syscall,
        "status": "request",
        "data": data,
    })
    .to_string()
}

async fn send(state: &AppState, landing: &mut LandingController, client_id: Uuid, syscall: &str, data: serde_json::Value) -> Frame {
    let mut replies = process_inbound_text(state, landing, client_id, &request_json(syscall, data)).await;
    assert_eq!(replies.len(), 1, "expected exactly one reply");
    replies.remove(0)
}

async fn subscribe(state: &AppState) -> (Uuid, mpsc::Receiver<Frame>) {
    let client_id = Uuid::new_v4();
    let (tx, rx) = mpsc::channel(16);
    feed::connect(state, client_id, tx).await;
    (client_id, rx)
}

fn error_code(frame: &Frame) -> Option<&str> {
    frame.data.get(FRAME_CODE).and_then(|v| v.as_str())
}

// =============================================================================
// DISPATCH
// =============================================================================

#[tokio::test]
async fn invalid_json_yields_gateway_error() {
    let state = test_helpers::test_app_state();
    let mut landing = landing_for(&state, "alice");

    let replies = process_inbound_text(&state, &mut landing, Uuid::new_v4(), "not json").await;
    assert_eq!(replies.len(), 1);
    assert_eq!(replies[0].syscall, "gateway:error");
    assert!(replies[0].str_field(FRAME_MESSAGE).is_some_and(|m| m.starts_with("invalid json")));
}

#[tokio::test]
async fn unknown_prefix_is_rejected() {
    let state = test_helpers::test_app_state();
    let mut landing = landing_for(&state, "alice");

    let reply = send(&state, &mut landing, Uuid::new_v4(), "users:list", json!({})).await;
    assert_eq!(reply.status, Status::Error);
    assert_eq!(reply.str_field(FRAME_MESSAGE), Some("unknown prefix: users"));
}

#[tokio::test]
async fn unknown_op_is_rejected() {
    let state = test_helpers::test_app_state();
    let mut landing = landing_for(&state, "alice");

    let reply = send(&state, &mut landing, Uuid::new_v4(), "rooms:rename", json!({})).await;
    assert_eq!(reply.status, Status::Error);
    assert_eq!(reply.str_field(FRAME_MESSAGE), Some("unknown rooms op: rename"));
}

// =============================================================================
// ROOMS
// =============================================================================

#[tokio::test]
async fn rooms_add_replies_and_notifies_peers() {
    let state = test_helpers::test_app_state();
    let mut landing = landing_for(&state, "alice");
    let (sender, mut sender_rx) = subscribe(&state).await;
    let (_peer, mut peer_rx) = subscribe(&state).await;

    let reply = send(&state, &mut landing, sender, "rooms:add", json!({ "name": "General" })).await;
    assert_eq!(reply.status, Status::Done);
    assert_eq!(reply.str_field("name"), Some("General"));
    assert_eq!(reply.str_field("type"), Some("Room"));
    assert!(landing.new_room_name.is_empty());

    let notice = peer_rx.try_recv().expect("peer notified");
    assert_eq!(notice.syscall, "rooms:add");
    assert!(notice.parent_id.is_none());
    assert_eq!(notice.from.as_deref(), Some("alice"));
    assert_eq!(notice.data, reply.data);
    assert!(sender_rx.try_recv().is_err(), "sender gets only the reply");

    assert_eq!(state.rooms.len().await, 1);
}

#[tokio::test]
async fn rooms_add_blank_name_is_rejected_without_broadcast() {
    let state = test_helpers::test_app_state();
    let mut landing = landing_for(&state, "alice");
    let (_peer, mut peer_rx) = subscribe(&state).await;

    let reply = send(&state, &mut landing, Uuid::new_v4(), "rooms:add", json!({ "name": "   " })).await;
    assert_eq!(reply.status, Status::Error);
    assert_eq!(error_code(&reply), Some("E_ROOM_NAME_REQUIRED"));
    assert!(peer_rx.try_recv().is_err());
    assert_eq!(state.rooms.len().await, 0);
}

#[tokio::test]
async fn rooms_list_returns_snapshot() {
    let state = test_helpers::test_app_state();
    let general = test_helpers::seed_room(&state, "General").await;
    let mut landing = landing_for(&state, "alice");

    let reply = send(&state, &mut landing, Uuid::new_v4(), "rooms:list", json!({})).await;
    let rooms: Vec<Room> = serde_json::from_value(reply.data["rooms"].clone()).expect("rooms");
    assert_eq!(rooms, vec![general]);
}

#[tokio::test]
async fn rooms_remove_requires_id() {
    let state = test_helpers::test_app_state();
    let mut landing = landing_for(&state, "alice");

    let reply = send(&state, &mut landing, Uuid::new_v4(), "rooms:remove", json!({})).await;
    assert_eq!(reply.str_field(FRAME_MESSAGE), Some("id required"));
}

#[tokio::test]
async fn rooms_remove_broadcasts_id() {
    let state = test_helpers::test_app_state();
    let general = test_helpers::seed_room(&state, "General").await;
    let mut landing = landing_for(&state, "alice");
    let (_peer, mut peer_rx) = subscribe(&state).await;

    let reply =
        send(&state, &mut landing, Uuid::new_v4(), "rooms:remove", json!({ "id": general.id })).await;
    assert_eq!(reply.status, Status::Done);
    assert_eq!(reply.uuid_field("id"), Some(general.id));

    let notice = peer_rx.try_recv().expect("peer notified");
    assert_eq!(notice.syscall, "rooms:remove");
    assert_eq!(notice.uuid_field("id"), Some(general.id));
    assert!(state.rooms.get(general.id).await.is_none());
}

#[tokio::test]
async fn rooms_set_opens_panel_with_room_messages() {
    let state = test_helpers::test_app_state();
    let general = test_helpers::seed_room(&state, "General").await;
    let random = test_helpers::seed_room(&state, "Random").await;
    let hello = test_helpers::message(general.id, "bob", "hello");
    state.messages.insert(hello.clone()).await.expect("insert");
    state.messages.insert(test_helpers::message(random.id, "bob", "elsewhere")).await.expect("insert");
    let mut landing = landing_for(&state, "alice");

    let reply = send(&state, &mut landing, Uuid::new_v4(), "rooms:set", json!({ "id": general.id })).await;
    assert_eq!(reply.status, Status::Done);
    assert_eq!(reply.str_field("name"), Some("General"));
    assert_eq!(reply.uuid_field("room_id"), Some(general.id));
    assert_eq!(reply.data["room_panel_open"], json!(true));
    let messages: Vec<Message> = serde_json::from_value(reply.data["messages"].clone()).expect("messages");
    assert_eq!(messages, vec![hello]);
}

#[tokio::test]
async fn rooms_set_unknown_room_is_not_found() {
    let state = test_helpers::test_app_state();
    let mut landing = landing_for(&state, "alice");

    let reply =
        send(&state, &mut landing, Uuid::new_v4(), "rooms:set", json!({ "id": Uuid::new_v4() })).await;
    assert_eq!(reply.status, Status::Error);
    assert_eq!(error_code(&reply), Some("E_ROOM_NOT_FOUND"));
    assert!(landing.current.is_none());
}

// =============================================================================
// MESSAGES
// =============================================================================

#[tokio::test]
async fn messages_add_uses_session_name_not_frame_from() {
    let state = test_helpers::test_app_state();
    let general = test_helpers::seed_room(&state, "General").await;
    let mut landing = landing_for(&state, "alice");
    let client = Uuid::new_v4();
    send(&state, &mut landing, client, "rooms:set", json!({ "id": general.id })).await;

    let raw = json!({
        "id": Uuid::new_v4(),
        "syscall": "messages:add",
        "status": "request",
        "from": "mallory",
        "data": { "content": "hi there" },
    })
    .to_string();
    let replies = process_inbound_text(&state, &mut landing, client, &raw).await;
    let reply = &replies[0];
    assert_eq!(reply.status, Status::Done);
    assert_eq!(reply.str_field("userName"), Some("alice"));
    assert_eq!(reply.str_field("content"), Some("hi there"));
    assert_eq!(reply.uuid_field("roomId"), Some(general.id));
    assert!(landing.msg_text.is_empty());
}

#[tokio::test]
async fn messages_add_without_active_room_is_rejected() {
    let state = test_helpers::test_app_state();
    let mut landing = landing_for(&state, "alice");

    let reply = send(&state, &mut landing, Uuid::new_v4(), "messages:add", json!({ "content": "hi" })).await;
    assert_eq!(reply.status, Status::Error);
    assert_eq!(error_code(&reply), Some("E_NO_ACTIVE_ROOM"));
    assert_eq!(landing.msg_text, "hi");
}

#[tokio::test]
async fn messages_list_filters_by_room() {
    let state = test_helpers::test_app_state();
    let general = test_helpers::seed_room(&state, "General").await;
    let random = test_helpers::seed_room(&state, "Random").await;
    let in_general = test_helpers::message(general.id, "bob", "one");
    let in_random = test_helpers::message(random.id, "bob", "two");
    state.messages.insert(in_general.clone()).await.expect("insert");
    state.messages.insert(in_random.clone()).await.expect("insert");
    let mut landing = landing_for(&state, "alice");

    let all = send(&state, &mut landing, Uuid::new_v4(), "messages:list", json!({})).await;
    let all: Vec<Message> = serde_json::from_value(all.data["messages"].clone()).expect("messages");
    assert_eq!(all, vec![in_general.clone(), in_random]);

    let filtered =
        send(&state, &mut landing, Uuid::new_v4(), "messages:list", json!({ "room_id": general.id })).await;
    let filtered: Vec<Message> = serde_json::from_value(filtered.data["messages"].clone()).expect("messages");
    assert_eq!(filtered, vec![in_general]);
}

#[tokio::test]
async fn messages_remove_broadcasts_id() {
    let state = test_helpers::test_app_state();
    let general = test_helpers::seed_room(&state, "General").await;
    let msg = test_helpers::message(general.id, "bob", "bye");
    state.messages.insert(msg.clone()).await.expect("insert");
    let mut landing = landing_for(&state, "alice");
    let (_peer, mut peer_rx) = subscribe(&state).await;

    let reply = send(&state, &mut landing, Uuid::new_v4(), "messages:remove", json!({ "id": msg.id })).await;
    assert_eq!(reply.status, Status::Done);

    let notice = peer_rx.try_recv().expect("peer notified");
    assert_eq!(notice.syscall, "messages:remove");
    assert_eq!(notice.uuid_field("id"), Some(msg.id));
    assert_eq!(state.messages.len().await, 0);
}

// =============================================================================
// END TO END
// =============================================================================

type Socket = tokio_tungstenite::WebSocketStream<tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>>;

async fn serve(state: AppState) -> std::net::SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    tokio::spawn(async move {
        axum::serve(listener, crate::routes::app(state)).await.expect("serve");
    });
    addr
}

async fn connect(addr: std::net::SocketAddr, user: Option<&str>) -> Socket {
    let mut request = format!("ws://{addr}/api/ws").into_client_request().expect("request");
    if let Some(user) = user {
        let cookie = format!("binChatCurrentUser={user}");
        request.headers_mut().insert("cookie", cookie.parse().expect("header"));
    }
    let (socket, _) = tokio_tungstenite::connect_async(request).await.expect("connect");
    socket
}

async fn next_frame(socket: &mut Socket) -> Frame {
    loop {
        let msg = timeout(Duration::from_secs(2), socket.next())
            .await
            .expect("frame receive timed out")
            .expect("socket closed")
            .expect("socket error");
        if let TungMessage::Text(text) = msg {
            return serde_json::from_str(text.as_str()).expect("frame json");
        }
    }
}

async fn send_frame_json(socket: &mut Socket, syscall: &str, data: serde_json::Value) {
    socket.send(TungMessage::text(request_json(syscall, data))).await.expect("send");
}

#[tokio::test]
async fn websocket_session_end_to_end() {
    let state = test_helpers::test_app_state();
    let addr = serve(state.clone()).await;

    let mut alice = connect(addr, Some("alice")).await;
    let hello = next_frame(&mut alice).await;
    assert_eq!(hello.syscall, "session:connected");
    assert_eq!(hello.status, Status::Done);
    assert!(hello.parent_id.is_none());
    assert_eq!(hello.str_field("welcome"), Some("BLOC CHAT"));
    assert_eq!(hello.str_field("user_name"), Some("alice"));
    assert_eq!(hello.data["needs_prompt"], json!(false));

    let mut anon = connect(addr, None).await;
    let hello = next_frame(&mut anon).await;
    assert_eq!(hello.str_field("user_name"), Some("unknown user"));
    assert_eq!(hello.data["needs_prompt"], json!(true));

    send_frame_json(&mut alice, "rooms:add", json!({ "name": "General" })).await;
    let added = next_frame(&mut alice).await;
    assert_eq!(added.status, Status::Done);
    let room_id = added.uuid_field("id").expect("room id");

    let notice = next_frame(&mut anon).await;
    assert_eq!(notice.syscall, "rooms:add");
    assert_eq!(notice.uuid_field("id"), Some(room_id));

    send_frame_json(&mut alice, "rooms:set", json!({ "id": room_id })).await;
    let set = next_frame(&mut alice).await;
    assert_eq!(set.data["room_panel_open"], json!(true));

    send_frame_json(&mut alice, "messages:add", json!({ "content": "hello" })).await;
    let posted = next_frame(&mut alice).await;
    assert_eq!(posted.str_field("userName"), Some("alice"));

    let notice = next_frame(&mut anon).await;
    assert_eq!(notice.syscall, "messages:add");
    assert_eq!(notice.str_field("content"), Some("hello"));

    assert_eq!(state.messages.len().await, 1);
}
