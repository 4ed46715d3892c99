use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use partsledger_core::DomainError;
use partsledger_infra::CatalogError;
use partsledger_inventory::StockError;

pub fn stock_error_to_response(err: StockError) -> axum::response::Response {
    let message = err.to_string();
    match err {
        StockError::InvalidQuantity(_) => json_error(StatusCode::BAD_REQUEST, "invalid_quantity", message),
        StockError::SameWarehouse(_) => json_error(StatusCode::BAD_REQUEST, "same_warehouse", message),
        StockError::UnknownPart(_) => json_error(StatusCode::NOT_FOUND, "unknown_part", message),
        StockError::UnknownWarehouse(_) => {
            json_error(StatusCode::NOT_FOUND, "unknown_warehouse", message)
        }
        StockError::InsufficientStock { .. } => {
            json_error(StatusCode::CONFLICT, "insufficient_stock", message)
        }
        StockError::QuantityOverflow { .. } => {
            json_error(StatusCode::UNPROCESSABLE_ENTITY, "quantity_overflow", message)
        }
        StockError::Persistence(detail) => storage_failure(&detail),
    }
}

pub fn catalog_error_to_response(err: CatalogError) -> axum::response::Response {
    match err {
        CatalogError::Domain(e) => domain_error_to_response(e),
        CatalogError::Persistence(detail) => storage_failure(&detail),
    }
}

pub fn domain_error_to_response(err: DomainError) -> axum::response::Response {
    let message = err.to_string();
    match err {
        DomainError::Validation(_) => json_error(StatusCode::BAD_REQUEST, "validation_error", message),
        DomainError::InvalidId(_) => json_error(StatusCode::BAD_REQUEST, "invalid_id", message),
        DomainError::NotFound => json_error(StatusCode::NOT_FOUND, "not_found", message),
        DomainError::Conflict(_) => json_error(StatusCode::CONFLICT, "conflict", message),
        DomainError::InvariantViolation(_) => {
            json_error(StatusCode::UNPROCESSABLE_ENTITY, "invariant_violation", message)
        }
    }
}

/// Storage details are logged, not returned.
fn storage_failure(detail: &str) -> axum::response::Response {
    tracing::error!(error = %detail, "storage failure");
    json_error(
        StatusCode::INTERNAL_SERVER_ERROR,
        "storage_error",
        "storage failure",
    )
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}
