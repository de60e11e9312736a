use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};

use super::models::{ErrorResponse, ErrorsResponse};
use crate::error::LedgerError;

impl ResponseError for LedgerError {
    fn status_code(&self) -> StatusCode {
        match self {
            LedgerError::Validation(_) => StatusCode::BAD_REQUEST,
            LedgerError::MiningAbandoned { .. } => StatusCode::SERVICE_UNAVAILABLE,
            LedgerError::StaleMiningJob => StatusCode::CONFLICT,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let mut resp = HttpResponse::build(self.status_code());
        match self {
            LedgerError::Validation(errors) => resp.json(ErrorsResponse {
                errors: errors.clone(),
            }),
            other => resp.json(ErrorResponse {
                error: other.to_string(),
            }),
        }
    }
}
