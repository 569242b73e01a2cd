//! HTTP mapping for domain errors.
//!
//! Keeps the domain error type transport-agnostic: this is the only place
//! that knows which status code each [`ErrorCode`] maps to. Internal errors
//! are redacted before they leave the process; raw store failure text is
//! logged, never returned.

use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use tracing::error;

use crate::domain::{Error, ErrorCode};
use crate::middleware::trace::{TraceId, TRACE_ID_HEADER};

/// Convenient result alias for HTTP handlers.
pub type ApiResult<T> = Result<T, Error>;

fn status_for(code: ErrorCode) -> StatusCode {
    match code {
        ErrorCode::InvalidRequest => StatusCode::BAD_REQUEST,
        ErrorCode::Unauthorized => StatusCode::UNAUTHORIZED,
        ErrorCode::Forbidden => StatusCode::FORBIDDEN,
        ErrorCode::NotFound => StatusCode::NOT_FOUND,
        ErrorCode::Conflict => StatusCode::CONFLICT,
        ErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn redact_if_internal(error: &Error) -> Error {
    if matches!(error.code(), ErrorCode::InternalError) {
        error!(detail = %error.message(), "internal error returned to client");
        Error::internal("Internal server error")
    } else {
        error.clone()
    }
}

impl ResponseError for Error {
    fn status_code(&self) -> StatusCode {
        status_for(self.code())
    }

    fn error_response(&self) -> HttpResponse {
        let trace_id = self
            .trace_id()
            .map(str::to_owned)
            .or_else(|| TraceId::current().map(|id| id.to_string()));

        let mut payload = redact_if_internal(self);
        let mut builder = HttpResponse::build(self.status_code());
        if let Some(id) = trace_id {
            builder.insert_header((TRACE_ID_HEADER, id.clone()));
            payload = payload.with_trace_id(id);
        }
        builder.json(payload)
    }
}

impl From<actix_web::Error> for Error {
    fn from(err: actix_web::Error) -> Self {
        // Do not leak framework detail to clients.
        error!(error = %err, "actix error promoted to domain error");
        Self::internal("Internal server error")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(Error::invalid_request("bad"), StatusCode::BAD_REQUEST)]
    #[case(Error::unauthorized("who"), StatusCode::UNAUTHORIZED)]
    #[case(Error::forbidden("no"), StatusCode::FORBIDDEN)]
    #[case(Error::not_found("gone"), StatusCode::NOT_FOUND)]
    #[case(Error::conflict("dup"), StatusCode::CONFLICT)]
    #[case(Error::internal("boom"), StatusCode::INTERNAL_SERVER_ERROR)]
    fn codes_map_to_statuses(#[case] error: Error, #[case] status: StatusCode) {
        assert_eq!(error.status_code(), status);
    }

    async fn body_text(response: HttpResponse) -> String {
        let bytes = actix_web::body::to_bytes(response.into_body())
            .await
            .expect("body reads");
        String::from_utf8(bytes.to_vec()).expect("utf8 body")
    }

    #[actix_web::test]
    async fn internal_detail_is_redacted() {
        let text = body_text(Error::internal("sqlite said something secret").error_response()).await;
        assert!(!text.contains("secret"));
        assert!(text.contains("Internal server error"));
    }

    #[actix_web::test]
    async fn client_errors_keep_their_message() {
        let text = body_text(Error::conflict("already joined").error_response()).await;
        assert!(text.contains("already joined"));
    }
}
