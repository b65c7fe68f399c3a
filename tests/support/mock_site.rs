use std::{
    convert::Infallible,
    sync::{
        atomic::{AtomicU16, AtomicU64, Ordering},
        Arc, Mutex, RwLock,
    },
};

use anyhow::{Context, Result};
use hyper::service::{make_service_fn, service_fn};
use hyper::{body, Body, Method, Request, Response, Server, StatusCode};
use serde_json::Value;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

pub const PAGE_PATH: &str = "/page";
pub const PUSHOVER_PATH: &str = "/1/messages.json";

/// Mutable page content plus a capture of every Pushover message posted.
#[derive(Clone)]
pub struct SiteState {
    page: Arc<RwLock<String>>,
    page_status: Arc<AtomicU16>,
    page_hits: Arc<AtomicU64>,
    pushover_status: Arc<AtomicU16>,
    messages: Arc<Mutex<Vec<Value>>>,
}

impl SiteState {
    pub fn new(page: impl Into<String>) -> Self {
        Self {
            page: Arc::new(RwLock::new(page.into())),
            page_status: Arc::new(AtomicU16::new(200)),
            page_hits: Arc::new(AtomicU64::new(0)),
            pushover_status: Arc::new(AtomicU16::new(200)),
            messages: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn set_page(&self, page: impl Into<String>) {
        *self.page.write().expect("page lock poisoned") = page.into();
    }

    pub fn set_page_status(&self, status: u16) {
        self.page_status.store(status, Ordering::SeqCst);
    }

    pub fn set_pushover_status(&self, status: u16) {
        self.pushover_status.store(status, Ordering::SeqCst);
    }

    pub fn page_hits(&self) -> u64 {
        self.page_hits.load(Ordering::SeqCst)
    }

    pub fn messages(&self) -> Vec<Value> {
        self.messages.lock().expect("messages lock poisoned").clone()
    }

    pub fn messages_titled(&self, title: &str) -> Vec<Value> {
        self.messages()
            .into_iter()
            .filter(|message| message["title"] == title)
            .collect()
    }
}

pub struct MockSiteServer {
    base_url: String,
    shutdown: Option<oneshot::Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl MockSiteServer {
    pub async fn start(state: SiteState) -> Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .context("failed to bind mock site listener")?;
        let addr = listener
            .local_addr()
            .context("failed to read mock listener address")?;
        let std_listener = listener
            .into_std()
            .context("failed to convert mock listener")?;
        std_listener
            .set_nonblocking(true)
            .context("failed to set mock listener non-blocking")?;

        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        let make_service = make_service_fn(move |_| {
            let state = state.clone();
            async move { Ok::<_, Infallible>(service_fn(move |req| serve_request(state.clone(), req))) }
        });

        let server = Server::from_tcp(std_listener)
            .context("failed to build mock HTTP server")?
            .serve(make_service);
        let graceful = server.with_graceful_shutdown(async {
            let _ = shutdown_rx.await;
        });

        let handle = tokio::spawn(async move {
            if let Err(err) = graceful.await {
                eprintln!("mock site server stopped: {err}");
            }
        });

        Ok(Self {
            base_url: format!("http://{}", addr),
            shutdown: Some(shutdown_tx),
            handle: Some(handle),
        })
    }

    pub fn page_url(&self) -> String {
        format!("{}{}", self.base_url, PAGE_PATH)
    }

    pub fn pushover_url(&self) -> String {
        format!("{}{}", self.base_url, PUSHOVER_PATH)
    }

    pub async fn shutdown(mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = self.handle.take() {
            let _ = handle.await;
        }
    }
}

async fn serve_request(state: SiteState, req: Request<Body>) -> Result<Response<Body>, Infallible> {
    match (req.method(), req.uri().path()) {
        (&Method::GET, PAGE_PATH) => {
            state.page_hits.fetch_add(1, Ordering::SeqCst);
            let page = state.page.read().expect("page lock poisoned").clone();
            let status = state.page_status.load(Ordering::SeqCst);
            Ok(with_status(Response::new(Body::from(page)), status))
        }
        (&Method::POST, PUSHOVER_PATH) => {
            let bytes = match body::to_bytes(req.into_body()).await {
                Ok(bytes) => bytes,
                Err(err) => {
                    let response = Response::new(Body::from(format!("failed to read body: {err}")));
                    return Ok(with_status(response, 400));
                }
            };
            match serde_json::from_slice::<Value>(&bytes) {
                Ok(message) => state
                    .messages
                    .lock()
                    .expect("messages lock poisoned")
                    .push(message),
                Err(err) => {
                    let response = Response::new(Body::from(format!("invalid JSON payload: {err}")));
                    return Ok(with_status(response, 400));
                }
            }
            let status = state.pushover_status.load(Ordering::SeqCst);
            Ok(with_status(Response::new(Body::from(r#"{"status":1}"#)), status))
        }
        _ => Ok(with_status(Response::new(Body::from("not found")), 404)),
    }
}

fn with_status(mut response: Response<Body>, status: u16) -> Response<Body> {
    *response.status_mut() = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    response
}
