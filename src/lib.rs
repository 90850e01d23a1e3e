use crate::classy::ClassyView;
use crate::config::Config;
use crate::context::Context;
use crate::error::{ClassyError, RouterError};
use crate::route::{Resolution, RouteEntry, RouteRegistry, Router};
use crate::types::{HttpRequest, HttpResponse, State};
use http_body_util::{BodyExt, Full};
use hyper::body::Incoming;
use hyper::{server::conn::http1, service::Service, Request};

use tokio::net::TcpListener;

use hyper_util::rt::TokioIo;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use tracing::{error, info, warn};

pub mod classy;
pub mod config;
pub mod context;
pub mod error;
pub mod handler;
pub mod response;
pub mod route;
pub mod types;
pub mod utils;

/// The host application: a router of class based views plus shared state.
pub struct App {
    router: Router,
    state: State,
}

pub struct AppService {
    inner: Arc<App>,
}

impl AppService {
    fn new(inner: Arc<App>) -> Self {
        AppService { inner }
    }
}

impl Default for App {
    fn default() -> Self {
        App::new()
    }
}

impl App {
    pub fn new() -> Self {
        App {
            router: Router::new(),
            state: Arc::new(()),
        }
    }

    pub fn router(&self) -> &Router {
        &self.router
    }

    pub fn state(&self) -> &State {
        &self.state
    }

    pub fn set_state(&mut self, state: State) {
        self.state = state;
    }

    /// Route every method of `V` under `base_path`.
    pub fn register<V: ClassyView>(&mut self, base_path: &str) -> Result<(), ClassyError> {
        V::register(&mut self.router, base_path)
    }

    pub fn url_for(&self, name: &str, params: &[(&str, &str)]) -> Result<String, RouterError> {
        self.router.url_for(name, params)
    }

    /// Resolve and run one request. Handler errors become 500 responses.
    pub async fn dispatch(&self, mut req: HttpRequest) -> HttpResponse {
        let path = req.uri().path().to_string();
        let (route, view_args) = match self.router.resolve(req.method(), &path) {
            Resolution::Matched { route, args } => (route, args),
            Resolution::MethodNotAllowed { allowed } => {
                return response::method_not_allowed(req.method(), &allowed)
            }
            Resolution::NotFound => return response::not_found(&path),
        };

        let mut ctx = Context::new(self.state.clone(), view_args);
        match route.handler().call(&mut req, &mut ctx).await {
            Ok(res) => res,
            Err(e) => {
                error!(route = route.name(), error = %e, "handler failed");
                response::internal_server_error(&e)
            }
        }
    }

    pub fn service(self: &Arc<Self>) -> AppService {
        AppService::new(self.clone())
    }

    /// Serve on `config.addr` until ctrl-c.
    pub async fn run(self, config: &Config) -> anyhow::Result<()> {
        let app = Arc::new(self);
        let addr = config.socket_addr()?;
        let listener = TcpListener::bind(addr).await?;
        info!(%addr, routes = app.router.routes().len(), "listening");

        loop {
            let (stream, peer) = tokio::select! {
                accepted = listener.accept() => accepted?,
                _ = tokio::signal::ctrl_c() => {
                    info!("shutting down");
                    return Ok(());
                }
            };
            let io = TokioIo::new(stream);
            let service = app.service();
            tokio::task::spawn(async move {
                if let Err(err) = http1::Builder::new().serve_connection(io, service).await {
                    warn!(%peer, error = ?err, "error serving connection");
                }
            });
        }
    }
}

impl RouteRegistry for App {
    fn add_route(&mut self, entry: RouteEntry) -> Result<(), RouterError> {
        self.router.add_route(entry)
    }
}

impl Service<Request<Incoming>> for AppService {
    type Response = HttpResponse;
    type Error = anyhow::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn call(&self, req: Request<Incoming>) -> Self::Future {
        let app = self.inner.clone();
        Box::pin(async move {
            let (parts, body) = req.into_parts();
            let body = body.collect().await?.to_bytes();
            let req = Request::from_parts(parts, Full::new(body));
            Ok(app.dispatch(req).await)
        })
    }
}
