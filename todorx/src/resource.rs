use crate::ErrorDetail;

/// Outcome of an in-flight or completed asynchronous operation.
///
/// A pipeline run emits `Loading` first and then exactly one terminal state,
/// either `Success` or `Error`.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum Resource<T> {
    Loading,
    Success { value: T },
    Error { detail: ErrorDetail },
}

impl<T> Resource<T> {
    pub fn loading() -> Self {
        Resource::Loading
    }

    pub fn success(value: T) -> Self {
        Resource::Success { value }
    }

    pub fn error(detail: ErrorDetail) -> Self {
        Resource::Error { detail }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, Resource::Loading)
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Resource::Success { .. })
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Resource::Error { .. })
    }

    /// True for the terminal states.
    pub fn is_complete(&self) -> bool {
        matches!(self, Resource::Success { .. } | Resource::Error { .. })
    }

    pub fn value_ref(&self) -> Option<&T> {
        match self {
            Resource::Success { value } => Some(value),
            _ => None,
        }
    }

    pub fn value(self) -> Option<T> {
        match self {
            Resource::Success { value } => Some(value),
            _ => None,
        }
    }

    pub fn error_ref(&self) -> Option<&ErrorDetail> {
        match self {
            Resource::Error { detail } => Some(detail),
            _ => None,
        }
    }

    pub fn as_ref(&self) -> Resource<&T> {
        match self {
            Resource::Loading => Resource::Loading,
            Resource::Success { value } => Resource::Success { value },
            Resource::Error { detail } => Resource::Error {
                detail: detail.clone(),
            },
        }
    }

    pub fn map<U, F>(self, f: F) -> Resource<U>
    where
        F: FnOnce(T) -> U,
    {
        match self {
            Resource::Loading => Resource::Loading,
            Resource::Success { value } => Resource::Success { value: f(value) },
            Resource::Error { detail } => Resource::Error { detail },
        }
    }

    /// Converts a terminal state back into a `Result`. `Loading` yields `None`.
    pub fn into_result(self) -> Option<Result<T, ErrorDetail>> {
        match self {
            Resource::Loading => None,
            Resource::Success { value } => Some(Ok(value)),
            Resource::Error { detail } => Some(Err(detail)),
        }
    }
}

impl<T> From<Result<T, ErrorDetail>> for Resource<T> {
    fn from(value: Result<T, ErrorDetail>) -> Self {
        match value {
            Ok(value) => Resource::success(value),
            Err(detail) => Resource::error(detail),
        }
    }
}
