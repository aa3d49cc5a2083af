//! Error taxonomy for registration, configuration, and execution.

use thiserror::Error;

/// Error returned by an action handler, propagated to the caller untouched.
pub type HandlerError = Box<dyn std::error::Error + 'static>;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
/// Registration failures while building the action tree.
pub enum RegistrationError {
    /// Node names must contain at least one character.
    #[error("node names must contain characters")]
    EmptyName,
    /// Node names are matched per fragment, so they cannot contain whitespace.
    #[error("node names can not include whitespace, {0:?}")]
    WhitespaceInName(String),
    /// The parent handle does not refer to a group of this tree.
    #[error("parent group {0} is not registered in this tree")]
    UnknownParent(usize),
    /// The parent handle refers to an action, which cannot hold children.
    #[error("node {0} is an action and can not hold children")]
    ParentNotGroup(usize),
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
/// A parameter cast function rejected an already validated raw value.
#[error("failed to cast parameter '{param}' from {raw:?}: {message}")]
pub struct CastError {
    /// Parameter name.
    pub param: String,
    /// Raw (pre-cast) value.
    pub raw: String,
    /// Cast failure message.
    pub message: String,
}

#[derive(Debug, Error)]
/// Failures of [`crate::ActionCompleter::execute`] and its resolution step.
pub enum ExecuteError {
    /// The buffer names a group or leaves required parameters unfilled.
    #[error("incomplete action at offset {offset}: {message}")]
    Incomplete {
        /// Buffer offset where input is missing.
        offset: usize,
        /// Human-readable message.
        message: String,
    },
    /// The buffer has too many parameters or a validator rejected a value.
    #[error("invalid action at offset {offset}: {message}")]
    Invalid {
        /// Buffer offset of the offending fragment.
        offset: usize,
        /// Human-readable message.
        message: String,
    },
    /// A parameter cast failed; the handler was not invoked.
    #[error(transparent)]
    Cast(#[from] CastError),
    /// The action handler itself failed.
    #[error("action '{path}' failed: {source}")]
    Execution {
        /// Typed path of the failing action.
        path: String,
        /// Handler error, unchanged.
        #[source]
        source: HandlerError,
    },
}

impl ExecuteError {
    /// Returns the buffer offset for resolution failures.
    pub fn offset(&self) -> Option<usize> {
        match self {
            Self::Incomplete { offset, .. } | Self::Invalid { offset, .. } => Some(*offset),
            Self::Cast(_) | Self::Execution { .. } => None,
        }
    }

    /// Returns whether the failure is an expected not-yet-submittable state.
    pub fn is_incomplete(&self) -> bool {
        matches!(self, Self::Incomplete { .. })
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
/// Configuration loading failures.
pub enum ConfigError {
    /// The config file could not be read.
    #[error("failed to read {path}: {message}")]
    Read {
        /// Path that was read.
        path: String,
        /// I/O failure message.
        message: String,
    },
    /// The config body is not valid TOML for [`crate::CompleterConfig`].
    #[error("failed to parse completer config: {0}")]
    Parse(String),
    /// The fuzzy tolerance must be a percentage.
    #[error("fuzzy_tolerance must be within 0..=100, got {0}")]
    ToleranceOutOfRange(u8),
}

#[cfg(test)]
mod tests {
    use std::fmt;

    use super::*;

    #[derive(Debug)]
    struct Boom;

    impl fmt::Display for Boom {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("boom")
        }
    }

    impl std::error::Error for Boom {}

    #[test]
    fn execution_error_keeps_handler_error_as_source() {
        let err = ExecuteError::Execution {
            path: "deploy".to_string(),
            source: Box::new(Boom),
        };
        assert_eq!(err.to_string(), "action 'deploy' failed: boom");
        let source = std::error::Error::source(&err).expect("source");
        assert!(source.downcast_ref::<Boom>().is_some());
        assert_eq!(err.offset(), None);
    }

    #[test]
    fn cast_error_names_parameter_and_raw_value() {
        let err = ExecuteError::from(CastError {
            param: "count".to_string(),
            raw: "ab".to_string(),
            message: "invalid digit found in string".to_string(),
        });
        assert!(err.to_string().contains("'count'"));
        assert!(err.to_string().contains("\"ab\""));
    }
}
