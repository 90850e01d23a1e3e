//! Callables behind view methods and recovery of their true parameter list.
//!
//! A view method is stored as a [`Callable`]: the type-erased function the
//! proxy invokes, the formal parameters it declares, and the callables it
//! wraps when it is a decorator. Route derivation needs the parameters of the
//! innermost method, so [`recover_signature`] walks down the wrapped chain
//! until it meets a receiver-first parameter list.

use super::annotation::RouteAnnotation;
use crate::context::Context;
use crate::error::SignatureRecoveryError;
use crate::types::{HttpRequest, HttpResponse};
use futures_util::future::BoxFuture;
use std::fmt;
use std::sync::Arc;

/// Name of the instance receiver parameter.
pub const RECEIVER: &str = "self";
/// Name of the request parameter that follows the receiver.
pub const REQUEST: &str = "request";

pub type HandlerFuture<'a> = BoxFuture<'a, anyhow::Result<HttpResponse>>;

pub type HandlerFn<V> = dyn for<'a> Fn(&'a V, &'a mut HttpRequest, &'a mut Context) -> HandlerFuture<'a>
    + Send
    + Sync;

/// Erase a closure into a [`HandlerFn`].
pub fn handler_fn<V, F>(f: F) -> Arc<HandlerFn<V>>
where
    F: for<'a> Fn(&'a V, &'a mut HttpRequest, &'a mut Context) -> HandlerFuture<'a>
        + Send
        + Sync
        + 'static,
{
    Arc::new(f)
}

/// Formal parameter names in declaration order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Signature {
    params: Vec<String>,
}

impl Signature {
    pub fn new<I, S>(params: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Signature {
            params: params.into_iter().map(Into::into).collect(),
        }
    }

    /// `self, request` followed by `path_params`.
    pub fn method<I, S>(path_params: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut params = vec![RECEIVER.to_owned(), REQUEST.to_owned()];
        params.extend(path_params.into_iter().map(Into::into));
        Signature { params }
    }

    /// A `(*args, **kwargs)` style layer: nothing declared.
    pub fn variadic() -> Self {
        Signature::default()
    }

    pub fn params(&self) -> &[String] {
        &self.params
    }

    pub fn is_receiver_first(&self) -> bool {
        self.params.first().map(String::as_str) == Some(RECEIVER)
    }

    /// Parameters after the receiver and the request.
    pub fn path_params(&self) -> &[String] {
        self.params.get(2..).unwrap_or_default()
    }
}

pub struct Callable<V> {
    signature: Signature,
    call: Arc<HandlerFn<V>>,
    wrapped: Vec<Arc<Callable<V>>>,
    annotations: Vec<RouteAnnotation>,
}

impl<V> Clone for Callable<V> {
    fn clone(&self) -> Self {
        Callable {
            signature: self.signature.clone(),
            call: self.call.clone(),
            wrapped: self.wrapped.clone(),
            annotations: self.annotations.clone(),
        }
    }
}

impl<V> fmt::Debug for Callable<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Callable")
            .field("signature", &self.signature)
            .field("wrapped", &self.wrapped)
            .field("annotations", &self.annotations)
            .finish_non_exhaustive()
    }
}

impl<V: 'static> Callable<V> {
    pub fn new<F>(signature: Signature, f: F) -> Self
    where
        F: for<'a> Fn(&'a V, &'a mut HttpRequest, &'a mut Context) -> HandlerFuture<'a>
            + Send
            + Sync
            + 'static,
    {
        Callable {
            signature,
            call: handler_fn(f),
            wrapped: Vec::new(),
            annotations: Vec::new(),
        }
    }

    /// An undecorated view method taking `path_params` after the request.
    pub fn method<F>(path_params: &[&str], f: F) -> Self
    where
        F: for<'a> Fn(&'a V, &'a mut HttpRequest, &'a mut Context) -> HandlerFuture<'a>
            + Send
            + Sync
            + 'static,
    {
        Callable::new(Signature::method(path_params.iter().copied()), f)
    }

    /// Decorator over several callables with its own declared signature.
    pub fn wrapping(wrapped: Vec<Callable<V>>, signature: Signature, call: Arc<HandlerFn<V>>) -> Self {
        Callable {
            signature,
            call,
            wrapped: wrapped.into_iter().map(Arc::new).collect(),
            annotations: Vec::new(),
        }
    }

    /// Apply a decorator that hides the inner signature and drops its route
    /// annotations.
    pub fn decorate<L>(self, layer: L) -> Self
    where
        L: FnOnce(Arc<HandlerFn<V>>) -> Arc<HandlerFn<V>>,
    {
        let call = layer(self.call.clone());
        Callable {
            signature: Signature::variadic(),
            call,
            wrapped: vec![Arc::new(self)],
            annotations: Vec::new(),
        }
    }

    /// Apply a decorator that keeps the inner signature and annotations.
    pub fn wraps<L>(self, layer: L) -> Self
    where
        L: FnOnce(Arc<HandlerFn<V>>) -> Arc<HandlerFn<V>>,
    {
        let call = layer(self.call.clone());
        Callable {
            signature: self.signature.clone(),
            call,
            annotations: self.annotations.clone(),
            wrapped: vec![Arc::new(self)],
        }
    }

    /// Attach one more route annotation.
    pub fn route(mut self, annotation: RouteAnnotation) -> Self {
        self.annotations.push(annotation);
        self
    }

    /// Re-target this callable at a view embedding `V`.
    pub(crate) fn project<W: 'static>(&self, project: fn(&W) -> &V) -> Callable<W> {
        let inner = self.call.clone();
        Callable {
            signature: self.signature.clone(),
            call: handler_fn(move |w, req, ctx| (*inner)(project(w), req, ctx)),
            wrapped: self
                .wrapped
                .iter()
                .map(|c| Arc::new(c.project(project)))
                .collect(),
            annotations: self.annotations.clone(),
        }
    }
}

impl<V> Callable<V> {
    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    pub fn handler(&self) -> &Arc<HandlerFn<V>> {
        &self.call
    }

    pub fn wrapped(&self) -> &[Arc<Callable<V>>] {
        &self.wrapped
    }

    pub fn annotations(&self) -> &[RouteAnnotation] {
        &self.annotations
    }
}

/// Find the receiver-first parameter list behind any number of decorators.
///
/// When a layer wraps several callables the first one that recovers wins.
pub fn recover_signature<V>(callable: &Callable<V>) -> Result<Signature, SignatureRecoveryError> {
    let mut layers = 0;
    match recover(callable, &mut layers) {
        Some(signature) => Ok(signature),
        None => Err(SignatureRecoveryError { layers }),
    }
}

fn recover<V>(callable: &Callable<V>, layers: &mut usize) -> Option<Signature> {
    *layers += 1;
    if callable.signature.is_receiver_first() {
        return Some(callable.signature.clone());
    }
    callable
        .wrapped
        .iter()
        .filter(|inner| !std::ptr::eq(inner.as_ref(), callable))
        .find_map(|inner| recover(inner, layers))
}
