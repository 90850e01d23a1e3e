#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use classy_api::classy::{handler_fn, Callable, ClassyView, HandlerFuture, Members, RouteAnnotation};
use classy_api::context::Context;
use classy_api::response::text;
use classy_api::types::{HttpRequest, HttpResponse};
use classy_api::utils::body::{read_text, response_text};
use classy_api::App;
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::{Method, Request, StatusCode};

pub fn reply(body: impl Into<String>) -> HandlerFuture<'static> {
    let res: anyhow::Result<HttpResponse> = Ok(text(body));
    Box::pin(std::future::ready(res))
}

pub fn request(method: Method, path: &str, body: &str) -> HttpRequest {
    Request::builder()
        .method(method)
        .uri(path)
        .body(Full::new(Bytes::from(body.to_owned())))
        .unwrap()
}

pub async fn call(app: &App, method: Method, path: &str, body: &str) -> (StatusCode, String) {
    let res = app.dispatch(request(method, path, body)).await;
    let status = res.status();
    (status, response_text(res).await.unwrap())
}

pub async fn get(app: &App, path: &str) -> String {
    let (status, body) = call(app, Method::GET, path, "").await;
    assert_eq!(status, StatusCode::OK, "GET {path}: {body}");
    body
}

// Decorators

/// Plain forwarding layer that does not keep the inner signature.
pub fn func_decorator<V: 'static>(c: Callable<V>) -> Callable<V> {
    c.decorate(|f| handler_fn(move |v, req, ctx| (*f)(v, req, ctx)))
}

/// Forwarding layer that keeps the inner signature.
pub fn wraps_decorator<V: 'static>(c: Callable<V>) -> Callable<V> {
    c.wraps(|f| handler_fn(move |v, req, ctx| (*f)(v, req, ctx)))
}

/// Signature-keeping layer configured with two values it stores on the
/// request context.
pub fn params_decorator<V: 'static>(
    p_1: &'static str,
    p_2: &'static str,
) -> impl FnOnce(Callable<V>) -> Callable<V> {
    move |c: Callable<V>| {
        c.wraps(move |f| {
            handler_fn(move |v, req, ctx| {
                ctx.set("params_decorator", (p_1, p_2));
                (*f)(v, req, ctx)
            })
        })
    }
}

/// Signature-keeping layer that records how often it ran.
pub fn recursive_decorator<V: 'static>(c: Callable<V>) -> Callable<V> {
    let runs = Arc::new(AtomicUsize::new(0));
    c.wraps(move |f| {
        handler_fn(move |v, req, ctx| {
            let n = runs.fetch_add(1, Ordering::SeqCst) + 1;
            ctx.set("recursive_decorator_runs", n);
            (*f)(v, req, ctx)
        })
    })
}

/// Opaque layer built by a decorator factory.
pub fn more_recursive<V: 'static>(_stop: Option<()>) -> impl FnOnce(Callable<V>) -> Callable<V> {
    |c: Callable<V>| c.decorate(|f| handler_fn(move |v, req, ctx| (*f)(v, req, ctx)))
}

// Views

#[derive(Default)]
pub struct IndexView;

impl ClassyView for IndexView {
    fn members() -> Members<Self> {
        Members::new().handler("index", Callable::method(&[], |_, _, _| reply("Index")))
    }
}

#[derive(Default)]
pub struct BasicView;

impl BasicView {
    async fn get(&self, _req: &mut HttpRequest, ctx: &mut Context) -> anyhow::Result<HttpResponse> {
        Ok(text(format!("Get {}", ctx.arg("obj_id")?)))
    }

    async fn put(&self, req: &mut HttpRequest, ctx: &mut Context) -> anyhow::Result<HttpResponse> {
        Ok(text(format!("Put {}: {}", ctx.arg("id")?, read_text(req).await?)))
    }

    async fn post(&self, req: &mut HttpRequest, _ctx: &mut Context) -> anyhow::Result<HttpResponse> {
        Ok(text(format!("Post: {}", read_text(req).await?)))
    }

    async fn custom_method_with_params(
        &self,
        _req: &mut HttpRequest,
        ctx: &mut Context,
    ) -> anyhow::Result<HttpResponse> {
        Ok(text(format!(
            "Custom Method {} {}",
            ctx.arg("p_one")?,
            ctx.arg("p_two")?
        )))
    }
}

impl ClassyView for BasicView {
    fn members() -> Members<Self> {
        Members::new()
            .handler("index", Callable::method(&[], |_, _, _| reply("Index")))
            .handler(
                "get",
                Callable::method(&["obj_id"], |v: &BasicView, req, ctx| Box::pin(v.get(req, ctx))),
            )
            .handler(
                "put",
                Callable::method(&["id"], |v: &BasicView, req, ctx| Box::pin(v.put(req, ctx))),
            )
            .handler(
                "post",
                Callable::method(&[], |v: &BasicView, req, ctx| Box::pin(v.post(req, ctx))),
            )
            .handler(
                "custom_method",
                Callable::method(&[], |_, _, _| reply("Custom Method")),
            )
            .handler(
                "custom_method_with_params",
                Callable::method(&["p_one", "p_two"], |v: &BasicView, req, ctx| {
                    Box::pin(v.custom_method_with_params(req, ctx))
                }),
            )
            .handler(
                "routed_method",
                Callable::method(&[], |_, _, _| reply("Routed Method"))
                    .route(RouteAnnotation::at("/routed/")),
            )
            .handler(
                "multi_routed_method",
                Callable::method(&[], |_, _, _| reply("Multi Routed Method"))
                    .route(RouteAnnotation::at("/route1/"))
                    .route(RouteAnnotation::at("/route2/")),
            )
            .handler(
                "no_slash_method",
                Callable::method(&[], |_, _, _| reply("No Slash Method"))
                    .route(RouteAnnotation::at("/noslash")),
            )
            .handler(
                "custom_endpoint",
                Callable::method(&["param"], |_, _, _| reply("Custom Endpoint"))
                    .route(RouteAnnotation::at("/endpoint/{param}").name("foobar")),
            )
            .handler(
                "custom_http_method",
                Callable::method(&[], |_, _, _| reply("Custom HTTP Method"))
                    .route(RouteAnnotation::at("/route3/").methods([Method::POST])),
            )
    }
}

#[derive(Default)]
pub struct PostView;

impl ClassyView for PostView {
    fn members() -> Members<Self> {
        Members::new()
            .handler("post", Callable::method(&[], |_, _, _| reply("Custom HTTP Method")))
            .handler(
                "check",
                Callable::method(&[], |_, _, _| reply("Check"))
                    .route(RouteAnnotation::default().methods([Method::POST])),
            )
    }
}

fn shared_response(ctx: &Context) -> HandlerFuture<'static> {
    reply(ctx.route_state().get::<String>("response").unwrap_or_default())
}

#[derive(Default)]
pub struct BeforeRequestView;

#[async_trait]
impl ClassyView for BeforeRequestView {
    fn members() -> Members<Self> {
        Members::new().handler("index", Callable::method(&[], |_, _, ctx| shared_response(ctx)))
    }

    async fn before_request(
        &self,
        _req: &mut HttpRequest,
        ctx: &mut Context,
    ) -> anyhow::Result<Option<HttpResponse>> {
        ctx.route_state().set("response", "Before Request".to_string());
        Ok(None)
    }
}

#[derive(Default)]
pub struct BeforeViewView;

impl ClassyView for BeforeViewView {
    fn members() -> Members<Self> {
        Members::new()
            .before("index", |_, _, ctx| {
                ctx.route_state().set("response", "Before View".to_string());
                Box::pin(std::future::ready(Ok(None)))
            })
            .handler("index", Callable::method(&[], |_, _, ctx| shared_response(ctx)))
    }
}

#[derive(Default)]
pub struct BeforeRequestReturnsView;

#[async_trait]
impl ClassyView for BeforeRequestReturnsView {
    fn members() -> Members<Self> {
        Members::new()
            .handler(
                "index",
                Callable::method(&[], |_, _, _| reply("Should never see this")),
            )
            .after("index", |_, _, _, _res| {
                Box::pin(std::future::ready(Ok(text("AFTER VIEW"))))
            })
    }

    async fn before_request(
        &self,
        _req: &mut HttpRequest,
        _ctx: &mut Context,
    ) -> anyhow::Result<Option<HttpResponse>> {
        Ok(Some(text("BEFORE")))
    }

    async fn after_request(
        &self,
        _req: &mut HttpRequest,
        _ctx: &mut Context,
        _res: HttpResponse,
    ) -> anyhow::Result<HttpResponse> {
        Ok(text("AFTER REQUEST"))
    }
}

#[derive(Default)]
pub struct BeforeViewReturnsView;

#[async_trait]
impl ClassyView for BeforeViewReturnsView {
    fn members() -> Members<Self> {
        Members::new()
            .before("index", |_, _, _| {
                Box::pin(std::future::ready(Ok(Some(text("BEFORE")))))
            })
            .handler(
                "index",
                Callable::method(&[], |_, _, _| reply("Should never see this")),
            )
            .after("index", |_, _, _, _res| {
                Box::pin(std::future::ready(Ok(text("AFTER VIEW"))))
            })
    }

    async fn after_request(
        &self,
        _req: &mut HttpRequest,
        _ctx: &mut Context,
        _res: HttpResponse,
    ) -> anyhow::Result<HttpResponse> {
        Ok(text("AFTER REQUEST"))
    }
}

#[derive(Default)]
pub struct AfterViewView;

impl ClassyView for AfterViewView {
    fn members() -> Members<Self> {
        Members::new()
            .after("index", |_, _, _, _res| Box::pin(std::future::ready(Ok(text("After View")))))
            .handler("index", Callable::method(&[], |_, _, _| reply("Index")))
    }
}

#[derive(Default)]
pub struct AfterRequestView;

#[async_trait]
impl ClassyView for AfterRequestView {
    fn members() -> Members<Self> {
        Members::new().handler("index", Callable::method(&[], |_, _, _| reply("Index")))
    }

    async fn after_request(
        &self,
        _req: &mut HttpRequest,
        _ctx: &mut Context,
        _res: HttpResponse,
    ) -> anyhow::Result<HttpResponse> {
        Ok(text("After Request"))
    }
}

/// After hook returning an empty body still replaces the response.
#[derive(Default)]
pub struct EmptyAfterView;

impl ClassyView for EmptyAfterView {
    fn members() -> Members<Self> {
        Members::new()
            .handler("index", Callable::method(&[], |_, _, _| reply("Index")))
            .after("index", |_, _, _, _res| Box::pin(std::future::ready(Ok(text("")))))
    }
}

#[derive(Default)]
pub struct VariedMethodsView;

impl VariedMethodsView {
    /// Not in the member table, so never routed.
    pub fn class_method() -> &'static str {
        "Class Method"
    }
}

impl ClassyView for VariedMethodsView {
    fn members() -> Members<Self> {
        Members::new()
            .handler("index", Callable::method(&[], |_, _, _| reply("Index")))
            .handler(
                "routed_method",
                Callable::method(&[], |_, _, _| reply("Routed Method"))
                    .route(RouteAnnotation::at("/routed/")),
            )
    }
}

#[derive(Default)]
pub struct SubVariedMethodsView {
    base: VariedMethodsView,
}

impl ClassyView for SubVariedMethodsView {
    fn members() -> Members<Self> {
        Members::<Self>::new().inherit(VariedMethodsView::members(), |v| &v.base)
    }
}

#[derive(Default)]
pub struct DecoratedView;

impl DecoratedView {
    async fn get(&self, _req: &mut HttpRequest, ctx: &mut Context) -> anyhow::Result<HttpResponse> {
        Ok(text(format!("Get {}", ctx.arg("id")?)))
    }

    async fn delete(&self, _req: &mut HttpRequest, ctx: &mut Context) -> anyhow::Result<HttpResponse> {
        Ok(text(format!("Params Decorator Delete {}", ctx.arg("obj_id")?)))
    }

    async fn someval(&self, _req: &mut HttpRequest, ctx: &mut Context) -> anyhow::Result<HttpResponse> {
        Ok(text(format!("Someval {}", ctx.arg("val")?)))
    }

    async fn anotherval(&self, _req: &mut HttpRequest, ctx: &mut Context) -> anyhow::Result<HttpResponse> {
        Ok(text(format!("Anotherval {}", ctx.arg("val")?)))
    }
}

impl ClassyView for DecoratedView {
    fn members() -> Members<Self> {
        Members::new()
            .handler(
                "index",
                func_decorator(Callable::method(&[], |_, _, _| reply("Index"))),
            )
            .handler(
                "get",
                func_decorator(Callable::method(&["id"], |v: &DecoratedView, req, ctx| {
                    Box::pin(v.get(req, ctx))
                })),
            )
            .handler(
                "post",
                recursive_decorator(Callable::method(&[], |_, _, _| reply("Post"))),
            )
            .handler(
                "params_decorator_method",
                params_decorator("oneval", "anotherval")(Callable::method(&[], |_, _, _| {
                    reply("Params Decorator")
                })),
            )
            .handler(
                "delete",
                params_decorator("value1", "value")(Callable::method(
                    &["obj_id"],
                    |v: &DecoratedView, req, ctx| Box::pin(v.delete(req, ctx)),
                )),
            )
            .handler(
                "get_some",
                more_recursive(None)(Callable::method(&[], |_, _, _| reply("Get Some"))),
            )
            .handler(
                "get_this",
                more_recursive(None)(recursive_decorator(Callable::method(&[], |_, _, _| {
                    reply("Get This")
                }))),
            )
            .handler(
                "mixitup",
                more_recursive(None)(recursive_decorator(Callable::method(&[], |_, _, _| {
                    reply("Mix It Up")
                })))
                .route(RouteAnnotation::at("/mixitup")),
            )
            .handler(
                "someval",
                more_recursive(None)(Callable::method(&["val"], |v: &DecoratedView, req, ctx| {
                    Box::pin(v.someval(req, ctx))
                })),
            )
            .handler(
                "anotherval",
                more_recursive(None)(recursive_decorator(Callable::method(
                    &["val"],
                    |v: &DecoratedView, req, ctx| Box::pin(v.anotherval(req, ctx)),
                )))
                .route(RouteAnnotation::at("/anotherval/{val}")),
            )
    }
}

#[derive(Default)]
pub struct InheritanceView {
    base: BasicView,
}

impl InheritanceView {
    async fn get(&self, _req: &mut HttpRequest, ctx: &mut Context) -> anyhow::Result<HttpResponse> {
        Ok(text(format!("Inheritance Get {}", ctx.arg("obj_id")?)))
    }

    async fn delete(&self, _req: &mut HttpRequest, ctx: &mut Context) -> anyhow::Result<HttpResponse> {
        Ok(text(format!("Inheritance Delete {}", ctx.arg("obj_id")?)))
    }
}

/// Inherits everything from [`BasicView`], including the route explicitly
/// named `foobar`.
pub fn inheritance_members() -> Members<InheritanceView> {
    Members::<InheritanceView>::new()
        .inherit(BasicView::members(), |v| &v.base)
        .handler(
            "get",
            Callable::method(&["obj_id"], |v: &InheritanceView, req, ctx| {
                Box::pin(v.get(req, ctx))
            }),
        )
        .handler(
            "delete",
            Callable::method(&["obj_id"], |v: &InheritanceView, req, ctx| {
                Box::pin(v.delete(req, ctx))
            })
            .route(RouteAnnotation::at("/{obj_id}/delete").methods([Method::DELETE])),
        )
        .handler(
            "with_route",
            Callable::method(&[], |_, _, _| reply("Inheritance with route"))
                .route(RouteAnnotation::at("/with_route")),
        )
}

impl ClassyView for InheritanceView {
    fn members() -> Members<Self> {
        inheritance_members().without("custom_endpoint")
    }
}

/// Same as [`InheritanceView`] but keeps the inherited `foobar` route name.
#[derive(Default)]
pub struct ConflictingInheritanceView {
    inner: InheritanceView,
}

impl ClassyView for ConflictingInheritanceView {
    fn members() -> Members<Self> {
        Members::<Self>::new().inherit(inheritance_members(), |v| &v.inner)
    }
}

#[derive(Default)]
pub struct DecoratedInheritanceView {
    base: DecoratedView,
}

impl DecoratedInheritanceView {
    async fn get(&self, _req: &mut HttpRequest, ctx: &mut Context) -> anyhow::Result<HttpResponse> {
        Ok(text(format!("Decorated Inheritance Get {}", ctx.arg("obj_id")?)))
    }
}

impl ClassyView for DecoratedInheritanceView {
    fn members() -> Members<Self> {
        Members::<Self>::new()
            .inherit(DecoratedView::members(), |v| &v.base)
            .handler(
                "get",
                recursive_decorator(Callable::method(
                    &["obj_id"],
                    |v: &DecoratedInheritanceView, req, ctx| Box::pin(v.get(req, ctx)),
                )),
            )
    }
}

/// Stores the `name` query value in route state and never clears it.
#[derive(Default)]
pub struct StickyView {
    calls: AtomicUsize,
}

fn query_name(req: &HttpRequest) -> Option<String> {
    let query = req.uri().query()?;
    url::form_urlencoded::parse(query.as_bytes())
        .find(|(key, _)| key == "name")
        .map(|(_, value)| value.into_owned())
}

impl StickyView {
    async fn index(&self, _req: &mut HttpRequest, ctx: &mut Context) -> anyhow::Result<HttpResponse> {
        let calls = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        let shared = ctx
            .route_state()
            .get::<String>("name")
            .unwrap_or_else(|| "nobody".to_owned());
        let local = ctx.get::<String>("name").cloned().unwrap_or_else(|| "nobody".to_owned());
        Ok(text(format!("{shared} {local} {calls}")))
    }

    async fn other(&self, _req: &mut HttpRequest, ctx: &mut Context) -> anyhow::Result<HttpResponse> {
        let calls = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        let shared = ctx
            .route_state()
            .get::<String>("name")
            .unwrap_or_else(|| "nobody".to_owned());
        Ok(text(format!("{shared} {calls}")))
    }
}

#[async_trait]
impl ClassyView for StickyView {
    fn members() -> Members<Self> {
        Members::new()
            .handler(
                "index",
                Callable::method(&[], |v: &StickyView, req, ctx| Box::pin(v.index(req, ctx))),
            )
            .handler(
                "other",
                Callable::method(&[], |v: &StickyView, req, ctx| Box::pin(v.other(req, ctx))),
            )
    }

    async fn before_request(
        &self,
        req: &mut HttpRequest,
        ctx: &mut Context,
    ) -> anyhow::Result<Option<HttpResponse>> {
        if let Some(name) = query_name(req) {
            ctx.route_state().set("name", name.clone());
            ctx.set("name", name);
        }
        Ok(None)
    }
}

/// Application with every example view mounted.
pub fn app() -> App {
    let mut app = App::new();
    app.register::<IndexView>("/").unwrap();
    app.register::<BasicView>("/basic").unwrap();
    app.register::<PostView>("/post").unwrap();
    app.register::<BeforeRequestView>("/before_request").unwrap();
    app.register::<BeforeViewView>("/before_view").unwrap();
    app.register::<BeforeRequestReturnsView>("/before_request_returns").unwrap();
    app.register::<BeforeViewReturnsView>("/before_view_returns").unwrap();
    app.register::<AfterViewView>("/after_view").unwrap();
    app.register::<AfterRequestView>("/after_request").unwrap();
    app.register::<EmptyAfterView>("/empty_after").unwrap();
    app.register::<VariedMethodsView>("/varied").unwrap();
    app.register::<SubVariedMethodsView>("/subvaried").unwrap();
    app.register::<DecoratedView>("/decorated").unwrap();
    app.register::<InheritanceView>("/inherit").unwrap();
    app.register::<DecoratedInheritanceView>("/decor_inherit").unwrap();
    app.register::<StickyView>("/sticky").unwrap();
    app
}
