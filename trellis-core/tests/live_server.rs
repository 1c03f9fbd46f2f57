//! End-to-end tests of the live server over real sockets.

use std::net::SocketAddr;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::{sleep, timeout};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use trellis_core::transport::{ClientMessage, LiveHandle, LiveServer, ServerMessage};
use trellis_core::{App, Observable, State, Widget};

type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;

struct Counter {
    count: State<i64>,
}

impl App for Counter {
    fn build(&self) -> Widget {
        let inc = self.count.clone();
        Widget::column()
            .child(Widget::text(format!("Count: {}", self.count.get())))
            .child(Widget::button("+").on_click(move || {
                inc.update(|n| n + 1);
            }))
    }

    fn states(&self) -> Vec<&dyn Observable> {
        vec![&self.count]
    }
}

async fn start() -> LiveHandle<Counter> {
    LiveServer::new(Counter { count: State::new(0) })
        .bind("127.0.0.1", 0, 0)
        .await
        .unwrap()
}

async fn get(addr: SocketAddr, path: &str) -> String {
    let mut stream = TcpStream::connect(addr).await.unwrap();
    let request = format!("GET {path} HTTP/1.1\r\nHost: {addr}\r\nConnection: close\r\n\r\n");
    stream.write_all(request.as_bytes()).await.unwrap();
    let mut response = String::new();
    stream.read_to_string(&mut response).await.unwrap();
    response
}

/// Open a socket and consume the tree the server sends on connect.
async fn connect(handle: &LiveHandle<Counter>) -> (Socket, ServerMessage) {
    let (mut socket, _) = connect_async(format!("ws://{}", handle.ws_addr())).await.unwrap();
    let initial = next_reload(&mut socket).await;
    (socket, initial)
}

async fn wait_for_clients(handle: &LiveHandle<Counter>, n: usize) {
    timeout(Duration::from_secs(5), async {
        while handle.clients() < n {
            sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .unwrap();
}

async fn next_reload(socket: &mut Socket) -> ServerMessage {
    loop {
        let message = timeout(Duration::from_secs(5), socket.next())
            .await
            .unwrap()
            .unwrap()
            .unwrap();
        if let Message::Text(text) = message {
            return ServerMessage::parse(&text).unwrap();
        }
    }
}

fn first_click_id(message: &ServerMessage) -> String {
    let ServerMessage::Reload { tree } = message;
    tree.handler_ids()[0].to_string()
}

async fn click_id(handle: &LiveHandle<Counter>) -> String {
    let host = handle.server().host().lock().await;
    host.tree().unwrap().handler_ids()[0].to_string()
}

#[tokio::test]
async fn serves_document_and_runtime() {
    let handle = start().await;

    let page = get(handle.http_addr(), "/").await;
    assert!(page.starts_with("HTTP/1.1 200"));
    assert!(page.contains("Count: 0"));
    assert!(page.contains(&format!("data-ws-port=\"{}\"", handle.ws_addr().port())));

    let script = get(handle.http_addr(), "/runtime.js").await;
    assert!(script.starts_with("HTTP/1.1 200"));
    assert!(script.contains("class TrellisRuntime"));

    let missing = get(handle.http_addr(), "/favicon.ico").await;
    assert!(missing.starts_with("HTTP/1.1 404"));

    handle.shutdown().await;
}

#[tokio::test]
async fn event_reaches_every_client_once() {
    let handle = start().await;
    get(handle.http_addr(), "/").await;

    let mut sockets = Vec::new();
    for _ in 0..3 {
        sockets.push(connect(&handle).await.0);
    }
    wait_for_clients(&handle, 3).await;

    let event = ClientMessage::event(click_id(&handle).await, None).to_json().unwrap();
    sockets[0].send(Message::Text(event)).await.unwrap();

    for socket in &mut sockets {
        let ServerMessage::Reload { tree } = next_reload(socket).await;
        assert!(tree.text_content().contains("Count: 1"));
    }

    // Nothing else was queued behind the reload.
    for socket in &mut sockets {
        assert!(timeout(Duration::from_millis(100), socket.next()).await.is_err());
    }

    handle.shutdown().await;
}

#[tokio::test]
async fn malformed_frames_leave_the_channel_open() {
    let handle = start().await;
    handle.reload().await.unwrap();

    let (mut socket, _) = connect(&handle).await;
    wait_for_clients(&handle, 1).await;

    socket.send(Message::Text("{\"type\":\"event\"}".into())).await.unwrap();
    socket.send(Message::Text("garbage".into())).await.unwrap();

    let event = ClientMessage::event(click_id(&handle).await, None).to_json().unwrap();
    socket.send(Message::Text(event)).await.unwrap();

    let ServerMessage::Reload { tree } = next_reload(&mut socket).await;
    assert!(tree.text_content().contains("Count: 1"));

    handle.shutdown().await;
}

#[tokio::test]
async fn reload_pushes_to_connected_clients() {
    let handle = start().await;
    let (mut socket, initial) = connect(&handle).await;
    let ServerMessage::Reload { tree } = initial;
    assert!(tree.text_content().contains("Count: 0"));
    wait_for_clients(&handle, 1).await;

    handle.server().host().lock().await.app().count.set(41);
    let report = handle.reload().await.unwrap();
    assert_eq!(report.delivered, 1);

    let ServerMessage::Reload { tree } = next_reload(&mut socket).await;
    assert!(tree.text_content().contains("Count: 41"));

    handle.shutdown().await;
}

#[tokio::test]
async fn late_client_receives_the_current_tree() {
    let handle = start().await;
    get(handle.http_addr(), "/").await;
    let stale_page = click_id(&handle).await;

    let (mut early, initial) = connect(&handle).await;
    let event = ClientMessage::event(first_click_id(&initial), None).to_json().unwrap();
    early.send(Message::Text(event)).await.unwrap();
    let ServerMessage::Reload { tree } = next_reload(&mut early).await;
    assert!(tree.text_content().contains("Count: 1"));

    // Connects after the commit that invalidated the page it loaded.
    let (mut late, current) = connect(&handle).await;
    let ServerMessage::Reload { tree } = &current;
    assert!(tree.text_content().contains("Count: 1"));
    assert_ne!(first_click_id(&current), stale_page);

    let event = ClientMessage::event(first_click_id(&current), None).to_json().unwrap();
    late.send(Message::Text(event)).await.unwrap();
    let ServerMessage::Reload { tree } = next_reload(&mut late).await;
    assert!(tree.text_content().contains("Count: 2"));

    let host = handle.server().host().lock().await;
    assert_eq!(host.app().count.get(), 2);
    assert_eq!(host.stats().stale_events, 0);
    drop(host);

    handle.shutdown().await;
}
