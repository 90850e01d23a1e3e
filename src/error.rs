use thiserror::Error;

/// No layer of a decorated callable exposes a receiver-first parameter list.
#[derive(Debug, Error)]
#[error("no receiver-first signature behind {layers} decorator layer(s)")]
pub struct SignatureRecoveryError {
    pub layers: usize,
}

#[derive(Debug, Error)]
pub enum RouterError {
    #[error("route name {0:?} is already registered")]
    DuplicateName(String),

    #[error("{methods} {path} is already handled by route {existing:?}")]
    DuplicateRoute {
        path: String,
        methods: String,
        existing: String,
    },

    #[error("invalid route pattern {path:?}: {reason}")]
    InvalidPattern { path: String, reason: String },

    #[error("no route named {0:?}")]
    UnknownRoute(String),

    #[error("route {name:?} needs a value for {{{param}}}")]
    MissingParam { name: String, param: String },
}

#[derive(Debug, Error)]
pub enum ClassyError {
    #[error("can't get method arguments on {base_path} in view {view}::{method}: bad decorator")]
    BadDecorator {
        view: String,
        method: String,
        base_path: String,
        #[source]
        source: SignatureRecoveryError,
    },

    #[error(transparent)]
    Router(#[from] RouterError),
}
