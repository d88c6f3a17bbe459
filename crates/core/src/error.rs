use std::fmt;

/// Failures the UI layer is expected to branch on.
///
/// Carried inside `anyhow::Error`; use `err.downcast_ref::<ApiError>()` to inspect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// The origin answered with a non-2xx status.
    Http {
        resource: &'static str,
        status: u16,
        message: String,
    },
    /// A checkup operation had neither a checkup id nor a resolvable job mapping.
    MissingCorrelation { job_id: Option<String> },
    /// Rejected on the client before any request was made.
    InvalidInput {
        field: &'static str,
        reason: String,
    },
}

impl ApiError {
    pub fn invalid_input(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            field,
            reason: reason.into(),
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Http {
                resource,
                status,
                message,
            } => write!(f, "{resource} 실패 ({status}): {message}"),
            Self::MissingCorrelation { job_id: Some(job_id) } => {
                write!(f, "no checkup is linked to job {job_id}")
            }
            Self::MissingCorrelation { job_id: None } => {
                write!(f, "a checkup id or job id is required")
            }
            Self::InvalidInput { field, reason } => write!(f, "invalid {field}: {reason}"),
        }
    }
}

impl std::error::Error for ApiError {}
