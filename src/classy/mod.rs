//! Class based views: group handlers on a type, derive their routes from
//! method names and annotations, and run lifecycle hooks around each call.

pub mod annotation;
pub mod members;
pub mod path;
pub mod proxy;
pub mod register;
pub mod signature;
pub mod view;

pub use annotation::{route_annotations, RouteAnnotation};
pub use members::{scan, MemberKind, Members, MethodDescriptor};
pub use proxy::{make_proxy, Proxy};
pub use register::register;
pub use signature::{handler_fn, recover_signature, Callable, HandlerFn, HandlerFuture, Signature};
pub use view::ClassyView;
