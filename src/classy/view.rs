use super::members::Members;
use crate::context::Context;
use crate::error::ClassyError;
use crate::route::RouteRegistry;
use crate::types::{HttpRequest, HttpResponse};
use async_trait::async_trait;

/// A class based view: a type whose methods are routed by name.
///
/// ```ignore
/// #[derive(Default)]
/// struct ItemView;
///
/// impl ItemView {
///     async fn get(&self, _req: &mut HttpRequest, ctx: &mut Context) -> anyhow::Result<HttpResponse> {
///         Ok(response::text(format!("item {}", ctx.arg("id")?)))
///     }
/// }
///
/// #[async_trait]
/// impl ClassyView for ItemView {
///     fn members() -> Members<Self> {
///         Members::new().handler(
///             "get",
///             Callable::method(&["id"], |v: &ItemView, req, ctx| Box::pin(v.get(req, ctx))),
///         )
///     }
/// }
///
/// ItemView::register(&mut router, "/items")?; // GET /items/{id}, named "ItemView:get"
/// ```
#[async_trait]
pub trait ClassyView: Default + Send + Sync + 'static {
    /// Routable methods and their per-method hooks.
    fn members() -> Members<Self>;

    /// Prefix of derived route names: the bare type name, without module
    /// path or generic arguments.
    fn view_name() -> &'static str {
        let full = std::any::type_name::<Self>();
        let base = full.split('<').next().unwrap_or(full);
        base.rsplit("::").next().unwrap_or(base)
    }

    /// Runs before every routed method; a response skips everything else.
    async fn before_request(
        &self,
        _req: &mut HttpRequest,
        _ctx: &mut Context,
    ) -> anyhow::Result<Option<HttpResponse>> {
        Ok(None)
    }

    /// Runs after every routed method; its result is the final response.
    async fn after_request(
        &self,
        _req: &mut HttpRequest,
        _ctx: &mut Context,
        res: HttpResponse,
    ) -> anyhow::Result<HttpResponse> {
        Ok(res)
    }

    /// Derive this view's routes under `base_path` and add them to `registry`.
    fn register<R: RouteRegistry + ?Sized>(
        registry: &mut R,
        base_path: &str,
    ) -> Result<(), ClassyError> {
        super::register::register::<Self, R>(registry, base_path)
    }
}
