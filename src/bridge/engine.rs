//! The request/response boundary to the foreign engine.

use std::io;

use serde::{Deserialize, Serialize};

use super::value::{ForeignValue, RefId};

/// One boundary crossing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Request {
    /// Calls a function resolved by name in the engine's main module.
    Call {
        /// Function name.
        function: String,
        /// Positional arguments.
        args: Vec<ForeignValue>,
        /// Keyword arguments in insertion order.
        kwargs: Vec<(String, ForeignValue)>,
        /// Keep the return value in the foreign process and answer with a reference.
        retain: bool,
    },
    /// Reads one field of a retained object.
    GetField {
        /// Object holding the field.
        target: RefId,
        /// Field name, verbatim (may contain non-ASCII characters).
        field: String,
        /// Answer with the field's string form instead of its value.
        stringify: bool,
    },
    /// Parses an output request; answers with a reference.
    Outputs {
        /// Free-text request, passed through untouched.
        spec: String,
    },
    /// Fetches the markdown documentation of a named binding.
    Doc {
        /// Binding name.
        name: String,
    },
    /// Drops a retained object.
    Release {
        /// Object to drop.
        target: RefId,
    },
}

impl Request {
    /// Convenience constructor for a call without keyword arguments.
    #[must_use]
    pub fn call(function: impl Into<String>, args: Vec<ForeignValue>) -> Self {
        Self::Call {
            function: function.into(),
            args,
            kwargs: Vec::new(),
            retain: false,
        }
    }

    /// Human-readable operation label used in errors and logs.
    #[must_use]
    pub fn operation(&self) -> String {
        match self {
            Self::Call { function, .. } => function.clone(),
            Self::GetField { field, .. } => format!("getfield({field})"),
            Self::Outputs { .. } => "@outputs".to_owned(),
            Self::Doc { name } => format!("doc({name})"),
            Self::Release { .. } => "release".to_owned(),
        }
    }
}

/// Failures raised while talking to an engine.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// The engine evaluated the request and raised an error.
    #[error("{0}")]
    Foreign(String),
    /// Reading from or writing to the engine failed.
    #[error("engine i/o failed: {0}")]
    Io(#[from] io::Error),
    /// The engine answered with something that is not a valid response.
    #[error("engine protocol violation: {0}")]
    Protocol(String),
    /// The engine is gone.
    #[error("engine process has exited")]
    Closed,
}

/// A foreign engine. Every call blocks until the engine answers.
pub trait Engine: Send {
    /// Performs one boundary crossing.
    fn request(&mut self, request: &Request) -> Result<ForeignValue, EngineError>;
}

impl<E: Engine + ?Sized> Engine for Box<E> {
    fn request(&mut self, request: &Request) -> Result<ForeignValue, EngineError> {
        (**self).request(request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_wire_format_is_op_tagged() {
        let req = Request::GetField {
            target: RefId(7),
            field: "s₁".into(),
            stringify: false,
        };
        let json = serde_json::to_string(&req).expect("serializable");
        assert_eq!(
            json,
            r#"{"op":"get_field","target":7,"field":"s₁","stringify":false}"#
        );
    }

    #[test]
    fn operation_labels_name_the_function() {
        assert_eq!(Request::call("edgecount", Vec::new()).operation(), "edgecount");
        assert_eq!(
            Request::Doc { name: "analyze".into() }.operation(),
            "doc(analyze)"
        );
    }
}
