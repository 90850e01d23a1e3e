use super::annotation::RouteAnnotation;
use super::members::scan;
use super::path::{build_path, is_root, resolve_methods, route_name};
use super::proxy::make_proxy;
use super::signature::recover_signature;
use super::view::ClassyView;
use crate::error::ClassyError;
use crate::handler::Handler;
use crate::route::{RouteEntry, RouteRegistry};
use std::sync::Arc;
use tracing::{debug, error};

/// Register one route per (method, annotation) pair of `V` under `base_path`.
///
/// Signatures are recovered for every method before anything is added, so a
/// bad decorator leaves `registry` untouched. Root-convention methods
/// (`index`, `get`, `post`, ...) are added last, after every more specific
/// route of the view.
pub fn register<V, R>(registry: &mut R, base_path: &str) -> Result<(), ClassyError>
where
    V: ClassyView,
    R: RouteRegistry + ?Sized,
{
    let members = V::members();
    let mut routes = Vec::new();
    let mut delayed = Vec::new();

    for method in scan(&members) {
        let signature = recover_signature(&method.callable).map_err(|source| {
            error!(view = V::view_name(), method = %method.name, base_path, "bad decorator");
            ClassyError::BadDecorator {
                view: V::view_name().to_owned(),
                method: method.name.clone(),
                base_path: base_path.to_owned(),
                source,
            }
        })?;

        let annotations = if method.annotations.is_empty() {
            vec![RouteAnnotation::default()]
        } else {
            method.annotations.clone()
        };
        let handler: Arc<dyn Handler> =
            Arc::new(make_proxy(V::default(), &method, signature.clone(), &members));

        for (position, annotation) in annotations.iter().enumerate() {
            let entry = RouteEntry {
                path: build_path(base_path, &method.name, annotation, &signature),
                methods: resolve_methods(&method.name, annotation),
                name: route_name(V::view_name(), &method.name, annotation, position),
                handler: handler.clone(),
            };
            if is_root(&method.name) {
                delayed.push(entry);
            } else {
                routes.push(entry);
            }
        }
    }

    for entry in routes.into_iter().chain(delayed) {
        debug!(
            view = V::view_name(),
            name = %entry.name,
            path = %entry.path,
            methods = %entry.methods,
            "registering route"
        );
        registry.add_route(entry)?;
    }
    Ok(())
}
