//! Error types produced by [`crate`].
//!
//! Mirrors the teacher's own preference for a hand-rolled `Error` enum over pulling in an
//! error-derive crate: each variant implements [`Display`] by hand and the whole thing implements
//! [`std::error::Error`].

use std::fmt::{self, Display, Formatter};

use crate::configuration::Configuration;

/// Anything that can go wrong when configuring or running a [`Tuner`](crate::Tuner).
#[derive(Debug)]
pub enum Error {
    /// A problem with the declared parameters themselves, caught before any search space is
    /// generated.
    Configuration(ConfigurationError),
    /// Every path through every group's tree was pruned by a constraint, so the search space
    /// contains no valid configurations.
    EmptySearchSpace,
    /// The cost function raised a failure other than
    /// [`InvalidConfiguration`](crate::cost::CostError::InvalidConfiguration) while evaluating
    /// `configuration`.
    CostFunction {
        configuration: Configuration,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// The run-log file (`Config::log_file`) couldn't be opened.
    LogFile(std::io::Error),
    /// The tuner has already reached its `Terminated` state; `tune`/`make_step` can't be called
    /// again.
    AlreadyTerminated,
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Error::Configuration(e) => write!(f, "invalid tuning parameters: {e}"),
            Error::EmptySearchSpace => {
                write!(f, "search space is empty: every configuration was pruned by a constraint")
            }
            Error::CostFunction { configuration, source } => {
                write!(f, "cost function failed for `{configuration}`: {source}")
            }
            Error::LogFile(e) => write!(f, "couldn't open run log file: {e}"),
            Error::AlreadyTerminated => write!(f, "tuner has already terminated"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::CostFunction { source, .. } => Some(source.as_ref()),
            Error::LogFile(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ConfigurationError> for Error {
    fn from(e: ConfigurationError) -> Self {
        Error::Configuration(e)
    }
}

/// A problem detected while declaring [`Parameter`](crate::parameter::Parameter)s, before any
/// search-space generation is attempted.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigurationError {
    /// Two parameters were declared with the same name.
    DuplicateParameterName(String),
    /// A parameter's range contains no values.
    EmptyRange(String),
    /// A constraint named a dependency that either doesn't exist, or occurs at or after the
    /// constrained parameter in declaration order.
    UnknownOrLaterDependency {
        parameter: String,
        dependency: String,
    },
}

impl Display for ConfigurationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            ConfigurationError::DuplicateParameterName(name) => {
                write!(f, "duplicate parameter name {name:?}")
            }
            ConfigurationError::EmptyRange(name) => {
                write!(f, "parameter {name:?} has an empty range")
            }
            ConfigurationError::UnknownOrLaterDependency {
                parameter,
                dependency,
            } => write!(
                f,
                "constraint on parameter {parameter:?} depends on {dependency:?}, which isn't a \
                 parameter declared strictly before it"
            ),
        }
    }
}

impl std::error::Error for ConfigurationError {}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;
