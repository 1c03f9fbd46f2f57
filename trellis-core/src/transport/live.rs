//! Live server: one HTTP listener for the document and runtime script, one
//! WebSocket listener for the duplex event channel.
//!
//! Every connection is split in two tasks. The reader decodes client frames
//! and dispatches them through the shared host; the writer drains the
//! client's broadcast queue into the socket. Reloads are enqueued while the
//! host lock is held, so all clients see them in commit order.

use std::convert::Infallible;
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use futures_util::{SinkExt, StreamExt};
use http_body_util::Full;
use hyper::body::Incoming;
use hyper::header::{HeaderValue, CACHE_CONTROL, CONTENT_TYPE};
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Method, Request, Response, StatusCode};
use hyper_util::rt::TokioIo;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, info, warn};

use super::broadcast::{BroadcastReport, Broadcaster, ClientId};
use super::protocol::{ClientMessage, ServerMessage};
use crate::app::{App, AppError, AppHost, Dispatch, SharedHost};
use crate::config::{Config, ConfigError};
use crate::document::{initial_document, DocumentError, DocumentMode, RUNTIME_JS};

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    App(#[from] AppError),

    #[error(transparent)]
    Document(#[from] DocumentError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("failed to encode a reload message: {0}")]
    Encode(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Serves one application to any number of browsers.
pub struct LiveServer<A: App> {
    host: SharedHost<A>,
    hub: Arc<Broadcaster>,
}

impl<A: App> Clone for LiveServer<A> {
    fn clone(&self) -> Self {
        Self {
            host: Arc::clone(&self.host),
            hub: Arc::clone(&self.hub),
        }
    }
}

impl<A: App> LiveServer<A> {
    pub fn new(app: A) -> Self {
        Self::from_host(AppHost::new(app).shared())
    }

    pub fn from_host(host: SharedHost<A>) -> Self {
        Self {
            host,
            hub: Arc::new(Broadcaster::new()),
        }
    }

    pub fn host(&self) -> &SharedHost<A> {
        &self.host
    }

    pub fn broadcaster(&self) -> &Arc<Broadcaster> {
        &self.hub
    }

    /// Re-render and push the new tree to every client.
    pub async fn reload(&self) -> Result<BroadcastReport, TransportError> {
        let mut host = self.host.lock().await;
        let tree = host.render()?;
        Ok(self.hub.broadcast_message(&ServerMessage::reload(tree))?)
    }

    /// Bind both listeners and start accepting. `0` picks a free port.
    pub async fn bind(self, host: &str, http_port: u16, ws_port: u16) -> Result<LiveHandle<A>, TransportError> {
        let http = bind(host, http_port).await?;
        let ws = bind(host, ws_port).await?;
        let http_addr = http.local_addr()?;
        let ws_addr = ws.local_addr()?;
        info!(%http_addr, %ws_addr, "live server listening");

        let (shutdown, signal) = watch::channel(false);
        let tasks = vec![
            tokio::spawn(self.clone().accept_http(http, ws_addr.port(), signal.clone())),
            tokio::spawn(self.clone().accept_ws(ws, signal)),
        ];

        Ok(LiveHandle {
            server: self,
            http_addr,
            ws_addr,
            shutdown,
            tasks,
        })
    }

    /// Bind as configured and serve until Ctrl-C.
    pub async fn serve(self, config: &Config) -> Result<(), TransportError> {
        let handle = self.bind(&config.host, config.port, config.websocket_port()?).await?;
        info!("serving on http://{}", handle.http_addr());

        tokio::signal::ctrl_c().await?;
        info!("shutting down");
        handle.shutdown().await;
        Ok(())
    }

    async fn accept_http(self, listener: TcpListener, ws_port: u16, mut shutdown: watch::Receiver<bool>) {
        loop {
            tokio::select! {
                _ = shutdown.changed() => break,
                accepted = listener.accept() => match accepted {
                    Ok((stream, peer)) => {
                        debug!(%peer, "http connection");
                        let server = self.clone();
                        tokio::spawn(async move {
                            let service = service_fn(move |request: Request<Incoming>| {
                                let server = server.clone();
                                async move {
                                    Ok::<_, Infallible>(server.route(request.method(), request.uri().path(), ws_port).await)
                                }
                            });
                            if let Err(err) = http1::Builder::new()
                                .serve_connection(TokioIo::new(stream), service)
                                .await
                            {
                                warn!("http connection error: {}", err);
                            }
                        });
                    }
                    Err(err) => {
                        warn!("http accept error: {}", err);
                        sleep(Duration::from_millis(200)).await;
                    }
                },
            }
        }
    }

    /// Answer one HTTP request.
    async fn route(&self, method: &Method, path: &str, ws_port: u16) -> Response<Full<Bytes>> {
        if method != Method::GET && method != Method::HEAD {
            return respond(StatusCode::METHOD_NOT_ALLOWED, "text/plain; charset=utf-8", "method not allowed");
        }

        match path {
            "/" | "/index.html" => match self.document(ws_port).await {
                Ok(html) => respond(StatusCode::OK, "text/html; charset=utf-8", html),
                Err(err) => {
                    warn!("failed to build the initial document: {}", err);
                    respond(StatusCode::INTERNAL_SERVER_ERROR, "text/plain; charset=utf-8", err.to_string())
                }
            },
            "/runtime.js" => respond(StatusCode::OK, "application/javascript; charset=utf-8", RUNTIME_JS),
            _ => respond(StatusCode::NOT_FOUND, "text/plain; charset=utf-8", "not found"),
        }
    }

    /// A fresh render as a live document.
    ///
    /// Rendering replaces the handler table, so clients already connected are
    /// sent the same tree to keep their handler ids current.
    async fn document(&self, ws_port: u16) -> Result<String, TransportError> {
        let mut host = self.host.lock().await;
        let tree = host.render()?;
        if !self.hub.is_empty() {
            self.hub.broadcast_message(&ServerMessage::reload(tree.clone()))?;
        }
        Ok(initial_document(&host.meta(), &tree, DocumentMode::Live { ws_port })?)
    }

    async fn accept_ws(self, listener: TcpListener, mut shutdown: watch::Receiver<bool>) {
        loop {
            tokio::select! {
                _ = shutdown.changed() => break,
                accepted = listener.accept() => match accepted {
                    Ok((stream, peer)) => {
                        tokio::spawn(self.clone().connection(stream, peer, shutdown.clone()));
                    }
                    Err(err) => {
                        warn!("websocket accept error: {}", err);
                        sleep(Duration::from_millis(200)).await;
                    }
                },
            }
        }
    }

    async fn connection(self, stream: TcpStream, peer: SocketAddr, mut shutdown: watch::Receiver<bool>) {
        let socket = match tokio_tungstenite::accept_async(stream).await {
            Ok(socket) => socket,
            Err(err) => {
                warn!(%peer, "websocket handshake failed: {}", err);
                return;
            }
        };

        let (id, mut queue) = self.hub.register();
        info!(%id, %peer, clients = self.hub.len(), "client connected");
        if let Err(err) = self.sync_client(id).await {
            warn!(%id, "failed to send the current tree: {}", err);
        }
        let (mut sink, mut stream) = socket.split();

        let writer = tokio::spawn(async move {
            while let Some(frame) = queue.recv().await {
                if let Err(err) = sink.send(Message::Text(frame.to_string())).await {
                    warn!(%id, "failed to send frame: {}", err);
                    break;
                }
            }
            let _ = sink.close().await;
        });

        loop {
            tokio::select! {
                _ = shutdown.changed() => break,
                message = stream.next() => match message {
                    Some(Ok(Message::Text(text))) => self.handle_frame(id, &text).await,
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Ok(_)) => {}
                    Some(Err(err)) => {
                        warn!(%id, "websocket read error: {}", err);
                        break;
                    }
                },
            }
        }

        // Dropping the queue sender ends the writer.
        self.hub.unregister(id);
        let _ = writer.await;
        info!(%id, clients = self.hub.len(), "client disconnected");
    }

    /// Send the current tree to one client.
    ///
    /// A page served before the latest commit carries dead handler ids; the
    /// tree sent here replaces it. The host lock orders this frame with any
    /// concurrent broadcast.
    async fn sync_client(&self, id: ClientId) -> Result<(), TransportError> {
        let mut host = self.host.lock().await;
        let tree = match host.tree() {
            Some(tree) => tree.clone(),
            None => host.render()?,
        };
        let frame: Arc<str> = ServerMessage::reload(tree).to_json()?.into();
        if !self.hub.send_to(id, frame) {
            debug!(%id, "client left before the initial tree was sent");
        }
        Ok(())
    }

    /// Decode one client frame and dispatch it. Malformed frames are skipped.
    async fn handle_frame(&self, client: ClientId, text: &str) {
        let (handler, value) = match ClientMessage::parse(text) {
            Ok(ClientMessage::Event { handler, value, .. }) => (handler, value),
            Err(err) => {
                warn!(%client, "skipping client message: {}", err);
                return;
            }
        };

        let mut host = self.host.lock().await;
        let tree = match host.dispatch(&handler, value) {
            Ok(Dispatch::Changed(tree)) => Some(tree),
            Ok(Dispatch::Unchanged | Dispatch::Stale) => None,
            Err(AppError::HandlerPanicked { .. }) => host.render_if_dirty().unwrap_or_else(|err| {
                warn!(%client, "render after a failed handler: {}", err);
                None
            }),
            Err(err) => {
                warn!(%client, "event dispatch failed: {}", err);
                None
            }
        };

        if let Some(tree) = tree {
            match self.hub.broadcast_message(&ServerMessage::reload(tree)) {
                Ok(report) => debug!(
                    generation = host.generation(),
                    delivered = report.delivered,
                    dropped = report.dropped,
                    "reload broadcast"
                ),
                Err(err) => warn!("failed to encode reload: {}", err),
            }
        }
    }
}

/// A running [`LiveServer`].
pub struct LiveHandle<A: App> {
    server: LiveServer<A>,
    http_addr: SocketAddr,
    ws_addr: SocketAddr,
    shutdown: watch::Sender<bool>,
    tasks: Vec<JoinHandle<()>>,
}

impl<A: App> LiveHandle<A> {
    pub fn http_addr(&self) -> SocketAddr {
        self.http_addr
    }

    pub fn ws_addr(&self) -> SocketAddr {
        self.ws_addr
    }

    pub fn server(&self) -> &LiveServer<A> {
        &self.server
    }

    /// Number of connected WebSocket clients.
    pub fn clients(&self) -> usize {
        self.server.hub.len()
    }

    pub async fn reload(&self) -> Result<BroadcastReport, TransportError> {
        self.server.reload().await
    }

    /// Stop accepting, close every connection and wait for the listeners.
    pub async fn shutdown(self) {
        let _ = self.shutdown.send(true);
        for task in self.tasks {
            if let Err(err) = task.await {
                warn!("listener task failed: {}", err);
            }
        }
    }
}

async fn bind(host: &str, port: u16) -> Result<TcpListener, TransportError> {
    TcpListener::bind((host, port))
        .await
        .map_err(|source| TransportError::Bind {
            addr: format!("{host}:{port}"),
            source,
        })
}

fn respond(status: StatusCode, content_type: &'static str, body: impl Into<Bytes>) -> Response<Full<Bytes>> {
    let mut response = Response::new(Full::new(body.into()));
    *response.status_mut() = status;
    let headers = response.headers_mut();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static(content_type));
    headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-cache, no-store, must-revalidate"));
    response
}
