/*!
# Errors

Every precondition violation is reported synchronously through [`GraphError`].
Nothing in this crate retries or recovers internally.

"No path exists" or "no acyclic ordering exists" are *not* errors: those are
reported as `None` by the respective algorithms. Likewise, power iterations that
exhaust their iteration budget return their best-effort result with
`converged == false`.
*/

use std::fmt::Debug;

/// Error taxonomy shared by the graph and all algorithms.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GraphError {
    /// A referenced node is not part of the graph.
    #[error("node not found: {0}")]
    NodeNotFound(String),

    /// The operation is not allowed on this graph, e.g. a directedness precondition
    /// is violated or a negative weight reached an algorithm that forbids them.
    #[error("invalid operation: {0}")]
    InvalidOperation(String),

    /// A configuration value is out of its valid range.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
}

impl GraphError {
    /// Shorthand for a [`GraphError::NodeNotFound`] on a given key
    pub fn node_not_found<K: Debug + ?Sized>(key: &K) -> Self {
        Self::NodeNotFound(format!("{key:?}"))
    }
}

pub type Result<T> = std::result::Result<T, GraphError>;

/// Shorthand for returning `Err(GraphError::InvalidOperation)` early when a condition fails
macro_rules! ensure_operation {
    ($cond:expr, $($arg:tt)+) => {
        if !($cond) {
            return Err($crate::error::GraphError::InvalidOperation(format!($($arg)+)));
        }
    };
}

/// Shorthand for returning `Err(GraphError::InvalidParameter)` early when a condition fails
macro_rules! ensure_parameter {
    ($cond:expr, $($arg:tt)+) => {
        if !($cond) {
            return Err($crate::error::GraphError::InvalidParameter(format!($($arg)+)));
        }
    };
}

pub(crate) use ensure_operation;
pub(crate) use ensure_parameter;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages() {
        assert_eq!(
            GraphError::node_not_found("A").to_string(),
            "node not found: \"A\""
        );
        assert_eq!(
            GraphError::InvalidOperation("graph is undirected".into()).to_string(),
            "invalid operation: graph is undirected"
        );
    }
}
