//! Errors that can occur when using this SDK

use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;

/// Errors from performing network requests.
#[allow(missing_docs)]
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Reqwest(#[from] reqwest::Error),
    #[error(transparent)]
    Serde(#[from] serde_json::Error),

    #[error("received error from server: [{status}] {errcode}: {message}")]
    ResponseContent {
        status: StatusCode,
        errcode: String,
        message: String,
    },
}

/// Standard Matrix error body, sent with every non-2xx API response.
#[derive(Debug, Default, Deserialize)]
struct MatrixErrorBody {
    errcode: Option<String>,
    error: Option<String>,
}

impl ApiError {
    /// Builds the error for a non-success response, decoding the standard
    /// Matrix error body when one is present.
    pub async fn from_response(response: reqwest::Response) -> Self {
        let status = response.status();
        let body: MatrixErrorBody = response.json().await.unwrap_or_default();
        ApiError::ResponseContent {
            status,
            errcode: body.errcode.unwrap_or_else(|| "M_UNKNOWN".to_owned()),
            message: body.error.unwrap_or_default(),
        }
    }

    /// The Matrix `errcode` for protocol-level failures, if this error
    /// carries one.
    pub fn errcode(&self) -> Option<&str> {
        match self {
            ApiError::ResponseContent { errcode, .. } => Some(errcode),
            _ => None,
        }
    }
}

/// Missing required field.
#[derive(Debug, Error)]
#[error("The response received was missing a required field: {0}")]
pub struct MissingFieldError(pub &'static str);

/// This macro is used to require that a value is present or return an error otherwise.
/// It is equivalent to using `val.ok_or(Error::MissingFields)?`, but easier to use and
/// with a more descriptive error message.
/// Note that this macro will return early from the function if the value is not present.
#[macro_export]
macro_rules! require {
    ($val:expr) => {
        match $val {
            Some(val) => val,
            None => return Err($crate::MissingFieldError(stringify!($val)).into()),
        }
    };
}
