use thiserror::Error;

/// The two failure kinds every core operation can produce.
///
/// `Input` covers bad or nonexistent caller-supplied data (unknown ids,
/// length violations, duplicate unique fields, idempotence violations).
/// `Access` covers authentication and permission failures (unresolvable
/// token, insufficient role or ownership). Both carry a human-readable
/// description that the HTTP boundary surfaces verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    #[error("{0}")]
    Input(String),
    #[error("{0}")]
    Access(String),
}

impl CoreError {
    pub fn input(desc: impl Into<String>) -> Self {
        CoreError::Input(desc.into())
    }

    pub fn access(desc: impl Into<String>) -> Self {
        CoreError::Access(desc.into())
    }

    pub fn description(&self) -> &str {
        match self {
            CoreError::Input(d) | CoreError::Access(d) => d,
        }
    }
}

pub type CoreResult<T> = Result<T, CoreError>;
