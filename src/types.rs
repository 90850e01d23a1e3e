use http_body_util::Full;
use hyper::body::Bytes;
use hyper::{Request, Response};
use std::collections::HashMap;
use std::{any::Any, sync::Arc};

pub type HttpRequest = Request<Full<Bytes>>;

pub type HttpResponse = Response<Full<Bytes>>;

pub type State = Arc<dyn Any + Send + Sync>;

pub type ViewPathArgs = HashMap<String, String>;
