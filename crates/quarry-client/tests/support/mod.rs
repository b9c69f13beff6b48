//! In-process servers for the integration tests.
//!
//! Both servers bind `127.0.0.1:0`, record every request they see and answer
//! through a caller-supplied handler. The HTTP server runs hyper on its own
//! tokio runtime in a background thread, so the blocking client under test
//! never touches an async context.

#![allow(dead_code)]

use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::sync::{mpsc, Arc, Mutex};
use std::thread;
use std::time::Duration;

use http_body_util::{BodyExt, Full};
use hyper::body::{Bytes, Incoming};
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Request, Response};
use hyper_util::rt::TokioIo;
use tokio::net::TcpListener;

/// A request as seen by [`TestHttpServer`].
#[derive(Debug, Clone)]
pub struct SeenRequest {
    pub method: String,
    pub path: String,
    pub query: BTreeMap<String, String>,
    pub content_type: Option<String>,
    pub body: String,
}

/// What [`TestHttpServer`] answers with.
#[derive(Debug, Clone)]
pub struct Reply {
    pub status: u16,
    pub body: String,
    pub delay: Option<Duration>,
}

impl Reply {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Reply {
            status,
            body: body.into(),
            delay: None,
        }
    }

    pub fn empty(status: u16) -> Self {
        Reply::new(status, "")
    }

    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

type HttpHandler = Arc<dyn Fn(&SeenRequest) -> Reply + Send + Sync>;

/// Search engine stand-in speaking HTTP/1.1.
pub struct TestHttpServer {
    addr: SocketAddr,
    seen: Arc<Mutex<Vec<SeenRequest>>>,
    shutdown_tx: Option<tokio::sync::oneshot::Sender<()>>,
}

impl TestHttpServer {
    pub fn new(handler: impl Fn(&SeenRequest) -> Reply + Send + Sync + 'static) -> Self {
        let handler: HttpHandler = Arc::new(handler);
        let seen = Arc::new(Mutex::new(Vec::new()));
        let (addr_tx, addr_rx) = mpsc::channel();
        let (shutdown_tx, mut shutdown_rx) = tokio::sync::oneshot::channel::<()>();

        let recorded = Arc::clone(&seen);
        thread::spawn(move || {
            let runtime = tokio::runtime::Builder::new_multi_thread()
                .worker_threads(2)
                .enable_all()
                .build()
                .unwrap();

            runtime.block_on(async move {
                let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
                addr_tx.send(listener.local_addr().unwrap()).unwrap();

                loop {
                    tokio::select! {
                        result = listener.accept() => {
                            let (stream, _) = match result {
                                Ok(accepted) => accepted,
                                Err(err) => {
                                    eprintln!("Accept error: {}", err);
                                    continue;
                                }
                            };
                            let io = TokioIo::new(stream);
                            let handler = Arc::clone(&handler);
                            let recorded = Arc::clone(&recorded);

                            tokio::spawn(async move {
                                let service = service_fn(move |req| {
                                    let handler = Arc::clone(&handler);
                                    let recorded = Arc::clone(&recorded);
                                    async move { Self::handle(req, handler, recorded).await }
                                });

                                if let Err(err) = http1::Builder::new()
                                    .serve_connection(io, service)
                                    .await
                                {
                                    eprintln!("Server error: {}", err);
                                }
                            });
                        }
                        _ = &mut shutdown_rx => {
                            break;
                        }
                    }
                }
            });
        });

        let addr = addr_rx.recv().unwrap();
        Self {
            addr,
            seen,
            shutdown_tx: Some(shutdown_tx),
        }
    }

    /// Answers every request with a copy of `reply`.
    pub fn replying(reply: Reply) -> Self {
        Self::new(move |_| reply.clone())
    }

    async fn handle(
        req: Request<Incoming>,
        handler: HttpHandler,
        recorded: Arc<Mutex<Vec<SeenRequest>>>,
    ) -> Result<Response<Full<Bytes>>, hyper::Error> {
        let method = req.method().to_string();
        let path = req.uri().path().trim_start_matches('/').to_string();
        let query: BTreeMap<String, String> = req
            .uri()
            .query()
            .map(|query| {
                url::form_urlencoded::parse(query.as_bytes())
                    .into_owned()
                    .collect()
            })
            .unwrap_or_default();
        let content_type = req
            .headers()
            .get("content-type")
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        let body = req.into_body().collect().await?.to_bytes();

        let seen = SeenRequest {
            method,
            path,
            query,
            content_type,
            body: String::from_utf8_lossy(&body).into_owned(),
        };
        let reply = handler(&seen);
        recorded.lock().unwrap().push(seen);

        if let Some(delay) = reply.delay {
            tokio::time::sleep(delay).await;
        }

        Ok(Response::builder()
            .status(reply.status)
            .body(Full::new(Bytes::from(reply.body)))
            .unwrap())
    }

    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn seen(&self) -> Vec<SeenRequest> {
        self.seen.lock().unwrap().clone()
    }

    pub fn last(&self) -> SeenRequest {
        self.seen().pop().unwrap()
    }
}

impl Drop for TestHttpServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

/// A port nothing is listening on.
pub fn closed_port() -> u16 {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    port
}

#[cfg(feature = "rpc")]
#[allow(unused_imports)]
pub use self::rpc::TestRpcServer;

#[cfg(feature = "rpc")]
mod rpc {
    use std::net::{SocketAddr, TcpListener};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};
    use std::thread;
    use std::time::Duration;

    use quarry_common::codec::RpcCodec;
    use quarry_common::transport::TcpFraming;
    use quarry_common::{RestRequest, RestResponse};

    type RpcHandler = Arc<dyn Fn(&RestRequest) -> RestResponse + Send + Sync>;

    /// Search engine stand-in speaking the framed binary protocol.
    ///
    /// Each accepted connection is served on its own thread until the client
    /// hangs up or, with [`closing_after`](Self::closing_after), until the
    /// server has answered that many requests on it.
    pub struct TestRpcServer {
        addr: SocketAddr,
        seen: Arc<Mutex<Vec<RestRequest>>>,
        connections: Arc<AtomicUsize>,
    }

    impl TestRpcServer {
        pub fn new(handler: impl Fn(&RestRequest) -> RestResponse + Send + Sync + 'static) -> Self {
            Self::start(Arc::new(handler), None, None)
        }

        pub fn closing_after(
            requests: usize,
            handler: impl Fn(&RestRequest) -> RestResponse + Send + Sync + 'static,
        ) -> Self {
            Self::start(Arc::new(handler), Some(requests), None)
        }

        pub fn delayed(
            delay: Duration,
            handler: impl Fn(&RestRequest) -> RestResponse + Send + Sync + 'static,
        ) -> Self {
            Self::start(Arc::new(handler), None, Some(delay))
        }

        fn start(handler: RpcHandler, close_after: Option<usize>, delay: Option<Duration>) -> Self {
            let listener = TcpListener::bind("127.0.0.1:0").unwrap();
            let addr = listener.local_addr().unwrap();
            let seen = Arc::new(Mutex::new(Vec::new()));
            let connections = Arc::new(AtomicUsize::new(0));

            let recorded = Arc::clone(&seen);
            let accepted = Arc::clone(&connections);
            thread::spawn(move || {
                for stream in listener.incoming() {
                    let Ok(mut stream) = stream else { continue };
                    accepted.fetch_add(1, Ordering::SeqCst);
                    let handler = Arc::clone(&handler);
                    let recorded = Arc::clone(&recorded);

                    thread::spawn(move || {
                        let framing = TcpFraming::new(Duration::from_secs(10));
                        let mut served = 0;
                        while let Ok(data) = framing.receive_message(&mut stream) {
                            let request = RpcCodec::decode_request(&data).unwrap();
                            let response = handler(&request);
                            recorded.lock().unwrap().push(request);
                            if let Some(delay) = delay {
                                thread::sleep(delay);
                            }
                            let encoded = RpcCodec::encode_response(&response).unwrap();
                            if framing.send_message(&mut stream, &encoded).is_err() {
                                break;
                            }
                            served += 1;
                            if close_after == Some(served) {
                                break;
                            }
                        }
                    });
                }
            });

            Self {
                addr,
                seen,
                connections,
            }
        }

        pub fn url(&self) -> String {
            format!("rpc://{}", self.addr)
        }

        pub fn seen(&self) -> Vec<RestRequest> {
            self.seen.lock().unwrap().clone()
        }

        pub fn last(&self) -> RestRequest {
            self.seen().pop().unwrap()
        }

        pub fn connections(&self) -> usize {
            self.connections.load(Ordering::SeqCst)
        }
    }
}
