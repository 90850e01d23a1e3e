//! Member tables of class based views and the scan that picks routable
//! methods out of them.

use super::annotation::RouteAnnotation;
use super::signature::Callable;
use crate::context::Context;
use crate::types::{HttpRequest, HttpResponse};
use futures_util::future::BoxFuture;
use std::sync::Arc;
use tracing::debug;

/// Names owned by the `ClassyView` surface itself. A handler declared under
/// one of them is never routed.
pub const BASE_MEMBERS: &[&str] = &[
    "after_request",
    "before_request",
    "default",
    "members",
    "register",
    "view_name",
];

pub type BeforeHook<V> = dyn for<'a> Fn(
        &'a V,
        &'a mut HttpRequest,
        &'a mut Context,
    ) -> BoxFuture<'a, anyhow::Result<Option<HttpResponse>>>
    + Send
    + Sync;

pub type AfterHook<V> = dyn for<'a> Fn(
        &'a V,
        &'a mut HttpRequest,
        &'a mut Context,
        HttpResponse,
    ) -> BoxFuture<'a, anyhow::Result<HttpResponse>>
    + Send
    + Sync;

/// Capability marker of a member.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberKind {
    Handler,
    BeforeView,
    AfterView,
}

enum Slot<V> {
    Handler(Callable<V>),
    Before(Arc<BeforeHook<V>>),
    After(Arc<AfterHook<V>>),
}

impl<V> Slot<V> {
    fn kind(&self) -> MemberKind {
        match self {
            Slot::Handler(_) => MemberKind::Handler,
            Slot::Before(_) => MemberKind::BeforeView,
            Slot::After(_) => MemberKind::AfterView,
        }
    }
}

impl<V> Clone for Slot<V> {
    fn clone(&self) -> Self {
        match self {
            Slot::Handler(c) => Slot::Handler(c.clone()),
            Slot::Before(h) => Slot::Before(h.clone()),
            Slot::After(h) => Slot::After(h.clone()),
        }
    }
}

pub struct Member<V> {
    name: String,
    slot: Slot<V>,
}

impl<V> Member<V> {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> MemberKind {
        self.slot.kind()
    }

    pub fn callable(&self) -> Option<&Callable<V>> {
        match &self.slot {
            Slot::Handler(c) => Some(c),
            _ => None,
        }
    }
}

impl<V> Clone for Member<V> {
    fn clone(&self) -> Self {
        Member {
            name: self.name.clone(),
            slot: self.slot.clone(),
        }
    }
}

/// Ordered member table of a view.
///
/// Handlers are keyed by name, hooks by the name of the method they guard.
/// Adding a member whose (name, kind) already exists replaces it in place,
/// which is how a derived view overrides what it inherited.
pub struct Members<V> {
    entries: Vec<Member<V>>,
}

impl<V> Default for Members<V> {
    fn default() -> Self {
        Members {
            entries: Vec::new(),
        }
    }
}

impl<V> Clone for Members<V> {
    fn clone(&self) -> Self {
        Members {
            entries: self.entries.clone(),
        }
    }
}

impl<V: 'static> Members<V> {
    pub fn new() -> Self {
        Members::default()
    }

    fn upsert(mut self, name: String, slot: Slot<V>) -> Self {
        let kind = slot.kind();
        match self
            .entries
            .iter_mut()
            .find(|m| m.name == name && m.kind() == kind)
        {
            Some(existing) => existing.slot = slot,
            None => self.entries.push(Member { name, slot }),
        }
        self
    }

    pub fn handler(self, name: impl Into<String>, callable: Callable<V>) -> Self {
        self.upsert(name.into(), Slot::Handler(callable))
    }

    /// Hook run before handler `name`; returning a response skips the handler.
    pub fn before<F>(self, name: impl Into<String>, hook: F) -> Self
    where
        F: for<'a> Fn(
                &'a V,
                &'a mut HttpRequest,
                &'a mut Context,
            ) -> BoxFuture<'a, anyhow::Result<Option<HttpResponse>>>
            + Send
            + Sync
            + 'static,
    {
        self.upsert(name.into(), Slot::Before(Arc::new(hook)))
    }

    /// Hook run after handler `name`; its result replaces the response.
    pub fn after<F>(self, name: impl Into<String>, hook: F) -> Self
    where
        F: for<'a> Fn(
                &'a V,
                &'a mut HttpRequest,
                &'a mut Context,
                HttpResponse,
            ) -> BoxFuture<'a, anyhow::Result<HttpResponse>>
            + Send
            + Sync
            + 'static,
    {
        self.upsert(name.into(), Slot::After(Arc::new(hook)))
    }

    /// Import every member of a parent view reachable through `project`.
    pub fn inherit<P: 'static>(self, parent: Members<P>, project: fn(&V) -> &P) -> Self {
        parent.entries.into_iter().fold(self, |acc, member| {
            let slot = match member.slot {
                Slot::Handler(c) => Slot::Handler(c.project(project)),
                Slot::Before(hook) => Slot::Before(project_before(hook, project)),
                Slot::After(hook) => Slot::After(project_after(hook, project)),
            };
            acc.upsert(member.name, slot)
        })
    }

    /// Drop every member called `name`.
    pub fn without(mut self, name: &str) -> Self {
        self.entries.retain(|m| m.name != name);
        self
    }
}

impl<V> Members<V> {
    pub fn iter(&self) -> impl Iterator<Item = &Member<V>> {
        self.entries.iter()
    }

    pub fn before_hook(&self, name: &str) -> Option<Arc<BeforeHook<V>>> {
        self.entries.iter().find_map(|m| match &m.slot {
            Slot::Before(h) if m.name == name => Some(h.clone()),
            _ => None,
        })
    }

    pub fn after_hook(&self, name: &str) -> Option<Arc<AfterHook<V>>> {
        self.entries.iter().find_map(|m| match &m.slot {
            Slot::After(h) if m.name == name => Some(h.clone()),
            _ => None,
        })
    }
}

fn project_before<V: 'static, P: 'static>(
    hook: Arc<BeforeHook<P>>,
    project: fn(&V) -> &P,
) -> Arc<BeforeHook<V>> {
    fn erase<V, F>(f: F) -> Arc<BeforeHook<V>>
    where
        F: for<'a> Fn(
                &'a V,
                &'a mut HttpRequest,
                &'a mut Context,
            ) -> BoxFuture<'a, anyhow::Result<Option<HttpResponse>>>
            + Send
            + Sync
            + 'static,
    {
        Arc::new(f)
    }
    erase(move |v, req, ctx| (*hook)(project(v), req, ctx))
}

fn project_after<V: 'static, P: 'static>(
    hook: Arc<AfterHook<P>>,
    project: fn(&V) -> &P,
) -> Arc<AfterHook<V>> {
    fn erase<V, F>(f: F) -> Arc<AfterHook<V>>
    where
        F: for<'a> Fn(
                &'a V,
                &'a mut HttpRequest,
                &'a mut Context,
                HttpResponse,
            ) -> BoxFuture<'a, anyhow::Result<HttpResponse>>
            + Send
            + Sync
            + 'static,
    {
        Arc::new(f)
    }
    erase(move |v, req, ctx, res| (*hook)(project(v), req, ctx, res))
}

/// A routable method found by [`scan`].
pub struct MethodDescriptor<V> {
    pub name: String,
    pub callable: Callable<V>,
    pub annotations: Vec<RouteAnnotation>,
}

/// Routable methods of a member table, in table order.
pub fn scan<V>(members: &Members<V>) -> Vec<MethodDescriptor<V>> {
    members
        .iter()
        .filter_map(|member| {
            if BASE_MEMBERS.contains(&member.name()) {
                debug!(member = member.name(), "skipping member reserved by the view surface");
                return None;
            }
            if member.name().starts_with('_') {
                debug!(member = member.name(), "skipping private member");
                return None;
            }
            let callable = member.callable()?;
            Some(MethodDescriptor {
                name: member.name().to_owned(),
                callable: callable.clone(),
                annotations: super::annotation::route_annotations(callable).to_vec(),
            })
        })
        .collect()
}
