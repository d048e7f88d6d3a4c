use crate::{ErrorDetail, Resource};

/// Anything a remote call can resolve to that maps onto a terminal [`Resource`].
pub trait ExecutionResult<T> {
    fn into_resource(self) -> Resource<T>;
}

impl<T, E> ExecutionResult<T> for Result<T, E>
where
    E: Into<ErrorDetail>,
{
    fn into_resource(self) -> Resource<T> {
        match self {
            Ok(value) => Resource::success(value),
            Err(error) => Resource::error(error.into()),
        }
    }
}

impl<T> ExecutionResult<T> for Resource<T> {
    fn into_resource(self) -> Resource<T> {
        self
    }
}

pub fn execution_result_to_resource<T, R>(result: R) -> Resource<T>
where
    R: ExecutionResult<T>,
{
    result.into_resource()
}
