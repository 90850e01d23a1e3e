//! Path, method set and name derivation for one (method, annotation) pair.

use super::annotation::RouteAnnotation;
use super::signature::Signature;
use crate::route::MethodSet;
use hyper::Method;

/// HTTP method implied by a root-convention method name. Root methods are
/// routed at the base path itself.
pub fn root_method(method_name: &str) -> Option<Method> {
    match method_name {
        "index" | "get" => Some(Method::GET),
        "put" => Some(Method::PUT),
        "patch" => Some(Method::PATCH),
        "post" => Some(Method::POST),
        "delete" => Some(Method::DELETE),
        _ => None,
    }
}

pub fn is_root(method_name: &str) -> bool {
    root_method(method_name).is_some()
}

fn join<'s, I>(base_path: &str, segments: I) -> String
where
    I: IntoIterator<Item = &'s str>,
{
    let mut path = String::new();
    let base = base_path.trim_matches('/');
    if !base.is_empty() {
        path.push('/');
        path.push_str(base);
    }
    for seg in segments {
        let seg = seg.trim_matches('/');
        if seg.is_empty() {
            continue;
        }
        path.push('/');
        path.push_str(seg);
    }
    if path.is_empty() {
        path.push('/');
    }
    path
}

pub fn build_path(
    base_path: &str,
    method_name: &str,
    annotation: &RouteAnnotation,
    signature: &Signature,
) -> String {
    let placeholders: Vec<String> = signature
        .path_params()
        .iter()
        .map(|p| format!("{{{}}}", p))
        .collect();
    let placeholders = placeholders.iter().map(String::as_str);

    if is_root(method_name) {
        return join(base_path, placeholders);
    }
    match &annotation.path {
        Some(explicit) => join(base_path, [explicit.as_str()]),
        None => join(base_path, std::iter::once(method_name).chain(placeholders)),
    }
}

pub fn resolve_methods(method_name: &str, annotation: &RouteAnnotation) -> MethodSet {
    if let Some(methods) = &annotation.methods {
        return MethodSet::only(methods.iter().cloned());
    }
    match root_method(method_name) {
        Some(m) => MethodSet::only([m]),
        None => MethodSet::Any,
    }
}

/// `position` is the index of `annotation` among the method's annotations.
pub fn route_name(
    view_name: &str,
    method_name: &str,
    annotation: &RouteAnnotation,
    position: usize,
) -> String {
    match &annotation.name {
        Some(name) => name.clone(),
        None if position == 0 => format!("{}:{}", view_name, method_name),
        None => format!("{}:{}:{}", view_name, method_name, position + 1),
    }
}
