//! JSON body extractor with `validator` rules applied
//!
//! Bodies that do not parse into the request type (bad JSON, wrong field
//! type, unknown tap status, unreadable timestamp) answer 400. Bodies that
//! parse but break a rule, such as a flow rate of zero, answer 422.

use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequest, Request};
use axum::http::StatusCode;
use axum::Json;
use serde::de::DeserializeOwned;
use tracing::debug;
use validator::{Validate, ValidationErrors};

use super::{ApiError, ApiResponse};

pub struct ValidatedJson<T>(pub T);

impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(malformed_body)?;
        value.validate().map_err(|e| rule_violations(&e))?;
        Ok(ValidatedJson(value))
    }
}

fn malformed_body(rejection: JsonRejection) -> ApiError {
    debug!(error = %rejection.body_text(), "Unreadable request body");
    (
        StatusCode::BAD_REQUEST,
        Json(ApiResponse::error(format!(
            "Invalid request body: {}",
            rejection.body_text()
        ))),
    )
}

/// One `field: message` entry per failed rule, sorted by field.
fn rule_violations(errors: &ValidationErrors) -> ApiError {
    let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
    fields.sort_by(|a, b| a.0.cmp(&b.0));

    let messages: Vec<String> = fields
        .into_iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |e| match &e.message {
                Some(m) => format!("{}: {}", field, m),
                None => format!("{}: {}", field, e.code),
            })
        })
        .collect();

    let message = if messages.is_empty() {
        "Validation failed".to_string()
    } else {
        messages.join("; ")
    };
    (
        StatusCode::UNPROCESSABLE_ENTITY,
        Json(ApiResponse::error(message)),
    )
}
