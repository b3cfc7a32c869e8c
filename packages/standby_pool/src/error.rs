use thiserror::Error;

use crate::RequestToken;

/// Reasons a pool operation refused to act.
///
/// None of these are fatal. The pool never changes state when it reports an error, so the
/// caller is free to ignore the error if the outcome does not matter to it. The convenience
/// forms of the operations (e.g. [`PoolManager::acquire()`][1]) discard the error and return
/// `None` or `false` instead.
///
/// Resource kinds are carried in their `Debug` rendering so that the error type does not depend
/// on the kind type of any particular pool.
///
/// [1]: crate::PoolManager::acquire
#[derive(Clone, Debug, Error, Eq, PartialEq)]
#[non_exhaustive]
pub enum Error {
    /// No pool exists for the requested resource kind.
    #[error("resource kind {kind} is not managed by any pool")]
    NotPoolable {
        /// The resource kind that was requested.
        kind: String,
    },

    /// Every instance of the pool is in use and the growth policy forbids creating more.
    #[error("pool for resource kind {kind} is exhausted and its growth policy forbids creating new instances")]
    PoolExhausted {
        /// The resource kind of the exhausted pool.
        kind: String,
    },

    /// A resource was returned that the pool could not take back.
    #[error("cannot return resource of kind {kind} to its pool: {problem}")]
    InvalidReturn {
        /// The resource kind of the pool the resource was returned to.
        kind: String,

        /// A human-readable description of the problem.
        problem: &'static str,
    },

    /// A deferred acquisition was finished with a token that is unknown or already consumed.
    #[error("request token {token} does not identify a pending acquisition")]
    InvalidToken {
        /// The token that was presented.
        token: RequestToken,
    },

    /// The pools have not been constructed yet, or have already been torn down.
    #[error("the pool registry is not ready")]
    RegistryNotReady,
}

/// A specialized `Result` type for pool operations, returning the crate's
/// [`Error`] type as the error value.
pub(crate) type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub(crate) fn not_poolable(kind: &impl std::fmt::Debug) -> Self {
        Self::NotPoolable {
            kind: format!("{kind:?}"),
        }
    }

    pub(crate) fn pool_exhausted(kind: &impl std::fmt::Debug) -> Self {
        Self::PoolExhausted {
            kind: format!("{kind:?}"),
        }
    }

    pub(crate) fn invalid_return(kind: &impl std::fmt::Debug, problem: &'static str) -> Self {
        Self::InvalidReturn {
            kind: format!("{kind:?}"),
            problem,
        }
    }
}
