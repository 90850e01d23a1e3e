use crate::context::Context;
use crate::types::{HttpRequest, HttpResponse};
use async_trait::async_trait;

/// Anything the router can dispatch a matched request to.
#[async_trait]
pub trait Handler: Send + Sync {
    async fn call(&self, req: &mut HttpRequest, ctx: &mut Context)
        -> anyhow::Result<HttpResponse>;
}
