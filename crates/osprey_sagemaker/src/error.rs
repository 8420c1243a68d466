use osprey_core::prelude::*;

use aws_sdk_sagemaker::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};

const RETRYABLE_CODES: &[&str] = &[
    "ThrottlingException",
    "Throttling",
    "TooManyRequestsException",
    "RequestLimitExceeded",
    "ServiceUnavailable",
    "ServiceUnavailableException",
    "InternalFailure",
];

const NOT_FOUND_CODES: &[&str] = &["ResourceNotFound", "ResourceNotFoundException"];

/// Maps an SDK failure onto [`ServiceError`].
///
/// Connection trouble, throttling and 5xx responses are transient; everything
/// the service answered on purpose is not.
pub(crate) fn classify<E>(err: SdkError<E>) -> ServiceError
where
    E: ProvideErrorMetadata + std::error::Error + Send + Sync + 'static,
{
    let message = DisplayErrorContext(&err).to_string();

    match &err {
        SdkError::TimeoutError(_) | SdkError::DispatchFailure(_) | SdkError::ResponseError(_) => {
            ServiceError::Transient(message)
        }
        SdkError::ServiceError(context) => {
            let code = context.err().code().unwrap_or_default();
            if RETRYABLE_CODES.contains(&code) || context.raw().status().is_server_error() {
                ServiceError::Transient(message)
            } else if NOT_FOUND_CODES.contains(&code) {
                ServiceError::NotFound(message)
            } else {
                ServiceError::Rejected(message)
            }
        }
        _ => ServiceError::Rejected(message),
    }
}

/// Converts a count the service models as `i32`.
pub(crate) fn int(field: &str, value: u32) -> Result<i32, ServiceError> {
    i32::try_from(value).map_err(|_| ServiceError::Rejected(format!("{field} is out of range: {value}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use aws_sdk_sagemaker::operation::describe_training_job::DescribeTrainingJobError;

    #[test]
    fn timeouts_are_transient() {
        let err = SdkError::<DescribeTrainingJobError>::timeout_error("read timed out");
        assert!(classify(err).is_transient());
    }

    #[test]
    fn unsent_requests_are_rejected() {
        let err = SdkError::<DescribeTrainingJobError>::construction_failure("missing name");
        assert!(matches!(classify(err), ServiceError::Rejected(_)));
    }

    #[test]
    fn counts_must_fit_the_wire_type() {
        assert_eq!(int("InstanceCount", 4), Ok(4));
        assert!(int("InstanceCount", u32::MAX).is_err());
    }
}
