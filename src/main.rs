use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use classy_api::{
    classy::{Callable, ClassyView, Members, RouteAnnotation},
    config::Config,
    context::Context,
    response,
    types::{HttpRequest, HttpResponse},
    utils::body::read_text,
    App,
};
use hyper::Method;
use serde_json::json;
use tracing_subscriber::EnvFilter;

struct CustomState {
    hits: AtomicU64,
}

#[derive(Default)]
struct Greeting;

impl Greeting {
    async fn index(&self, _req: &mut HttpRequest, ctx: &mut Context) -> anyhow::Result<HttpResponse> {
        let s = ctx.get_state::<CustomState>()?;
        let hits = s.hits.fetch_add(1, Ordering::Relaxed) + 1;
        response::ok_json(json!({"Hello": "World!", "hits": hits}))
    }

    async fn get(&self, _req: &mut HttpRequest, ctx: &mut Context) -> anyhow::Result<HttpResponse> {
        Ok(response::text(format!("Hello, {}!", ctx.arg("name")?)))
    }

    async fn echo(&self, req: &mut HttpRequest, _ctx: &mut Context) -> anyhow::Result<HttpResponse> {
        Ok(response::text(read_text(req).await?))
    }
}

#[async_trait]
impl ClassyView for Greeting {
    fn members() -> Members<Self> {
        Members::new()
            .handler(
                "index",
                Callable::method(&[], |v: &Greeting, req, ctx| Box::pin(v.index(req, ctx))),
            )
            .handler(
                "get",
                Callable::method(&["name"], |v: &Greeting, req, ctx| Box::pin(v.get(req, ctx))),
            )
            .handler(
                "echo",
                Callable::method(&[], |v: &Greeting, req, ctx| Box::pin(v.echo(req, ctx)))
                    .route(RouteAnnotation::at("/echo").methods([Method::POST])),
            )
    }

    async fn after_request(
        &self,
        _req: &mut HttpRequest,
        ctx: &mut Context,
        mut res: HttpResponse,
    ) -> anyhow::Result<HttpResponse> {
        if let Some(method) = ctx.method_name() {
            res.headers_mut()
                .insert("x-classy-method", method.parse()?);
        }
        Ok(res)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::load("classy.toml")?;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_new(&config.log)?)
        .init();

    let mut app = App::new();
    app.set_state(Arc::new(CustomState {
        hits: AtomicU64::new(0),
    }));
    app.register::<Greeting>("/")?;

    app.run(&config).await
}
