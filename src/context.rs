use crate::types::{State, ViewPathArgs};
use anyhow::anyhow;
use parking_lot::Mutex;
use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;

/// Per-request context handed to every hook and handler next to the request.
pub struct Context {
    pub view_args: ViewPathArgs,
    state: State,
    method_name: Option<String>,
    route_state: Arc<RouteState>,
    inner: HashMap<String, Box<dyn Any + Send + Sync>>,
}

impl Context {
    pub fn new(state: State, view_args: ViewPathArgs) -> Self {
        Context {
            view_args,
            state,
            method_name: None,
            route_state: Arc::new(RouteState::default()),
            inner: HashMap::new(),
        }
    }

    pub fn get<T: 'static + Send>(&self, key: &str) -> Option<&T> {
        self.inner.get(key).and_then(|v| v.downcast_ref::<T>())
    }

    pub fn set<T: 'static + Send + Sync>(&mut self, key: &str, value: T) {
        self.inner.insert(key.to_string(), Box::new(value));
    }

    /// Matched path argument `name`.
    pub fn arg(&self, name: &str) -> anyhow::Result<&str> {
        self.view_args
            .get(name)
            .map(String::as_str)
            .ok_or_else(|| anyhow!("no path argument named {name:?}"))
    }

    pub fn get_state<T: Send + Sync + 'static>(&self) -> anyhow::Result<Arc<T>> {
        self.state
            .clone()
            .downcast::<T>()
            .map_err(|_| anyhow!("app state is not a {}", std::any::type_name::<T>()))
    }

    /// Name of the view method this request was dispatched to.
    pub fn method_name(&self) -> Option<&str> {
        self.method_name.as_deref()
    }

    pub fn set_method_name(&mut self, name: &str) {
        self.method_name = Some(name.to_owned());
    }

    /// State shared by every request dispatched through the current route.
    pub fn route_state(&self) -> &RouteState {
        &self.route_state
    }

    pub fn bind_route_state(&mut self, state: Arc<RouteState>) {
        self.route_state = state;
    }
}

/// Key/value store living as long as one routed view method.
///
/// A single instance backs all requests that reach the same method, so a
/// value set while handling one request is seen by the next one. Concurrent
/// requests race on it: keep per-request data in [`Context`] instead.
#[derive(Default)]
pub struct RouteState {
    inner: Mutex<HashMap<String, Box<dyn Any + Send + Sync>>>,
}

impl RouteState {
    pub fn get<T: Clone + 'static>(&self, key: &str) -> Option<T> {
        self.inner
            .lock()
            .get(key)
            .and_then(|v| v.downcast_ref::<T>())
            .cloned()
    }

    pub fn set<T: 'static + Send + Sync>(&self, key: &str, value: T) {
        self.inner.lock().insert(key.to_string(), Box::new(value));
    }

    pub fn remove(&self, key: &str) -> bool {
        self.inner.lock().remove(key).is_some()
    }
}
