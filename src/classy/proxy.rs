use super::members::{AfterHook, BeforeHook, MethodDescriptor, Members};
use super::signature::{HandlerFn, Signature};
use super::view::ClassyView;
use crate::context::{Context, RouteState};
use crate::handler::Handler;
use crate::types::{HttpRequest, HttpResponse};
use anyhow::anyhow;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::trace;

/// Handler the router calls for one routed view method.
///
/// The proxy owns the view instance and a [`RouteState`]; both live as long
/// as the route and are shared by every request it serves.
pub struct Proxy<V> {
    view: V,
    name: String,
    signature: Signature,
    call: Arc<HandlerFn<V>>,
    before: Option<Arc<BeforeHook<V>>>,
    after: Option<Arc<AfterHook<V>>>,
    state: Arc<RouteState>,
}

pub fn make_proxy<V: ClassyView>(
    view: V,
    method: &MethodDescriptor<V>,
    signature: Signature,
    members: &Members<V>,
) -> Proxy<V> {
    Proxy {
        view,
        name: method.name.clone(),
        signature,
        call: method.callable.handler().clone(),
        before: members.before_hook(&method.name),
        after: members.after_hook(&method.name),
        state: Arc::new(RouteState::default()),
    }
}

impl<V> Proxy<V> {
    pub fn view(&self) -> &V {
        &self.view
    }

    pub fn route_state(&self) -> &Arc<RouteState> {
        &self.state
    }
}

#[async_trait]
impl<V: ClassyView> Handler for Proxy<V> {
    async fn call(&self, req: &mut HttpRequest, ctx: &mut Context) -> anyhow::Result<HttpResponse> {
        ctx.set_method_name(&self.name);
        ctx.bind_route_state(self.state.clone());

        if let Some(res) = self.view.before_request(req, ctx).await? {
            trace!(method = %self.name, "before_request answered");
            return Ok(res);
        }

        if let Some(before) = &self.before {
            if let Some(res) = (**before)(&self.view, req, ctx).await? {
                trace!(method = %self.name, "before hook answered");
                return Ok(res);
            }
        }

        for param in self.signature.path_params() {
            if !ctx.view_args.contains_key(param) {
                return Err(anyhow!(
                    "{}::{}() is missing path argument {:?}",
                    V::view_name(),
                    self.name,
                    param
                ));
            }
        }
        let mut res = (*self.call)(&self.view, req, ctx).await?;

        if let Some(after) = &self.after {
            res = (**after)(&self.view, req, ctx, res).await?;
        }

        self.view.after_request(req, ctx, res).await
    }
}
