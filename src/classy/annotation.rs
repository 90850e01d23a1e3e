use super::signature::Callable;
use hyper::Method;

/// Explicit routing for one view method. A method may carry several; each
/// one yields its own route.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteAnnotation {
    pub path: Option<String>,
    pub methods: Option<Vec<Method>>,
    pub name: Option<String>,
}

impl RouteAnnotation {
    /// Route the method at `path`, relative to the view's base path.
    pub fn at(path: impl Into<String>) -> Self {
        RouteAnnotation {
            path: Some(path.into()),
            ..Default::default()
        }
    }

    pub fn methods<I: IntoIterator<Item = Method>>(mut self, methods: I) -> Self {
        self.methods = Some(methods.into_iter().collect());
        self
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

/// Annotations of `callable` in the order they were applied.
pub fn route_annotations<V>(callable: &Callable<V>) -> &[RouteAnnotation] {
    callable.annotations()
}
