use crate::error::RouterError;
use crate::handler::Handler;
use crate::types::ViewPathArgs;
use hyper::Method;
use once_cell::sync::Lazy;
use percent_encoding::percent_decode_str;
use regex::Regex;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

static PLACEHOLDER: Lazy<Regex> = Lazy::new(|| Regex::new(r"\{([^{}/]*)\}").unwrap());
static IDENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").unwrap());

/// HTTP methods a route answers to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MethodSet {
    Any,
    Only(Vec<Method>),
}

impl MethodSet {
    pub fn only<I: IntoIterator<Item = Method>>(methods: I) -> Self {
        let mut v: Vec<Method> = Vec::new();
        for m in methods {
            if !v.contains(&m) {
                v.push(m);
            }
        }
        MethodSet::Only(v)
    }

    pub fn allows(&self, method: &Method) -> bool {
        match self {
            MethodSet::Any => true,
            MethodSet::Only(v) => v.contains(method),
        }
    }

    pub fn overlaps(&self, other: &MethodSet) -> bool {
        match (self, other) {
            (MethodSet::Any, _) | (_, MethodSet::Any) => true,
            (MethodSet::Only(a), MethodSet::Only(b)) => a.iter().any(|m| b.contains(m)),
        }
    }
}

impl fmt::Display for MethodSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MethodSet::Any => f.write_str("*"),
            MethodSet::Only(v) => {
                let names: Vec<&str> = v.iter().map(Method::as_str).collect();
                f.write_str(&names.join(","))
            }
        }
    }
}

/// What gets handed to a [`RouteRegistry`]: one path, one method set, one
/// unique name and the handler behind them.
pub struct RouteEntry {
    pub path: String,
    pub methods: MethodSet,
    pub name: String,
    pub handler: Arc<dyn Handler>,
}

impl fmt::Debug for RouteEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteEntry")
            .field("path", &self.path)
            .field("methods", &self.methods)
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// Sink for derived routes.
pub trait RouteRegistry {
    fn add_route(&mut self, entry: RouteEntry) -> Result<(), RouterError>;
}

pub struct Route {
    name: String,
    path: String,
    methods: MethodSet,
    params: Vec<String>,
    re_path: Regex,
    handler: Arc<dyn Handler>,
}

impl Route {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn methods(&self) -> &MethodSet {
        &self.methods
    }

    pub fn params(&self) -> &[String] {
        &self.params
    }

    pub fn handler(&self) -> &Arc<dyn Handler> {
        &self.handler
    }
}

pub enum Resolution<'r> {
    Matched {
        route: &'r Route,
        args: ViewPathArgs,
    },
    MethodNotAllowed {
        allowed: Vec<Method>,
    },
    NotFound,
}

/// Named routes matched in registration order.
#[derive(Default)]
pub struct Router {
    routes: Vec<Route>,
    by_name: HashMap<String, usize>,
}

/// Captured path arguments, percent-decoded. Invalid UTF-8 is replaced
/// rather than rejected.
fn caps_to_map(re: &Regex, caps: &regex::Captures) -> ViewPathArgs {
    re.capture_names()
        .flatten()
        .filter_map(|n| {
            let raw = caps.name(n)?.as_str();
            let value = percent_decode_str(raw).decode_utf8_lossy().into_owned();
            Some((n.to_owned(), value))
        })
        .collect()
}

fn compile(path: &str) -> Result<(Regex, Vec<String>), RouterError> {
    let invalid = |reason: String| RouterError::InvalidPattern {
        path: path.to_owned(),
        reason,
    };
    if !path.starts_with('/') {
        return Err(invalid("must start with '/'".into()));
    }

    let mut pattern = String::from("^");
    let mut params = Vec::new();
    let mut last = 0;
    for caps in PLACEHOLDER.captures_iter(path) {
        let (whole, name) = match (caps.get(0), caps.get(1)) {
            (Some(w), Some(n)) => (w, n.as_str()),
            _ => continue,
        };
        if !IDENT.is_match(name) {
            return Err(invalid(format!("bad placeholder {{{}}}", name)));
        }
        if params.iter().any(|p| p == name) {
            return Err(invalid(format!("placeholder {{{}}} used twice", name)));
        }
        pattern.push_str(&regex::escape(&path[last..whole.start()]));
        pattern.push_str(&format!("(?P<{}>[^/]+)", name));
        params.push(name.to_owned());
        last = whole.end();
    }
    let rest = &path[last..];
    if rest.contains('{') || rest.contains('}') {
        return Err(invalid("unbalanced braces".into()));
    }
    pattern.push_str(&regex::escape(rest));
    pattern.push('$');

    let re = Regex::new(&pattern).map_err(|e| invalid(e.to_string()))?;
    Ok((re, params))
}

impl Router {
    pub fn new() -> Self {
        Router::default()
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    pub fn route(&self, name: &str) -> Option<&Route> {
        self.by_name.get(name).map(|&i| &self.routes[i])
    }

    /// First route whose pattern matches `path` and whose method set allows
    /// `method`.
    pub fn resolve(&self, method: &Method, path: &str) -> Resolution<'_> {
        let mut allowed: Vec<Method> = Vec::new();
        for route in self.routes.iter() {
            let Some(caps) = route.re_path.captures(path) else {
                continue;
            };
            if route.methods.allows(method) {
                let args = caps_to_map(&route.re_path, &caps);
                return Resolution::Matched { route, args };
            }
            if let MethodSet::Only(v) = &route.methods {
                for m in v {
                    if !allowed.contains(m) {
                        allowed.push(m.clone());
                    }
                }
            }
        }
        if allowed.is_empty() {
            Resolution::NotFound
        } else {
            Resolution::MethodNotAllowed { allowed }
        }
    }

    /// Build the URL of route `name`, filling its placeholders from `params`.
    pub fn url_for(&self, name: &str, params: &[(&str, &str)]) -> Result<String, RouterError> {
        let route = self
            .route(name)
            .ok_or_else(|| RouterError::UnknownRoute(name.to_owned()))?;

        let mut url = String::with_capacity(route.path.len());
        let mut last = 0;
        for caps in PLACEHOLDER.captures_iter(&route.path) {
            let (whole, param) = match (caps.get(0), caps.get(1)) {
                (Some(w), Some(p)) => (w, p.as_str()),
                _ => continue,
            };
            let value = params
                .iter()
                .find(|(k, _)| *k == param)
                .map(|(_, v)| *v)
                .ok_or_else(|| RouterError::MissingParam {
                    name: name.to_owned(),
                    param: param.to_owned(),
                })?;
            url.push_str(&route.path[last..whole.start()]);
            url.push_str(value);
            last = whole.end();
        }
        url.push_str(&route.path[last..]);
        Ok(url)
    }
}

impl RouteRegistry for Router {
    fn add_route(&mut self, entry: RouteEntry) -> Result<(), RouterError> {
        if self.by_name.contains_key(&entry.name) {
            return Err(RouterError::DuplicateName(entry.name));
        }
        if let Some(existing) = self
            .routes
            .iter()
            .find(|r| r.path == entry.path && r.methods.overlaps(&entry.methods))
        {
            return Err(RouterError::DuplicateRoute {
                path: entry.path,
                methods: entry.methods.to_string(),
                existing: existing.name.clone(),
            });
        }

        let (re_path, params) = compile(&entry.path)?;
        self.by_name.insert(entry.name.clone(), self.routes.len());
        self.routes.push(Route {
            name: entry.name,
            path: entry.path,
            methods: entry.methods,
            params,
            re_path,
            handler: entry.handler,
        });
        Ok(())
    }
}
