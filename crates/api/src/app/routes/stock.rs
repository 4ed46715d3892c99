use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};

use partsledger_auth::Permission;
use partsledger_core::WarehouseId;

use crate::app::routes::common::{CmdAuth, JsonBody};
use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::authz;
use crate::context::PrincipalContext;

pub fn router() -> Router {
    Router::new()
        .route("/receive", post(receive))
        .route("/transfer", post(transfer))
        .route("/parts/:part_id", get(part_stock))
        .route("/parts/:part_id/movements", get(part_movements))
        .route("/parts/:part_id/warehouses/:warehouse_id", get(quantity))
        .route("/warehouses/:warehouse_id", get(warehouse_stock))
}

pub async fn receive(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    JsonBody(body): JsonBody<dto::ReceiveStockRequest>,
) -> axum::response::Response {
    let cmd_auth = CmdAuth::new(body, Permission::STOCK_RECEIVE);
    if let Err(e) = authz::authorize_command(&principal, &cmd_auth) {
        return authz::forbidden(e);
    }
    let body = cmd_auth.inner;

    let part_id = match dto::parse_part_id(&body.part_id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match services
        .receive(
            part_id,
            WarehouseId::new(body.warehouse_id),
            body.quantity,
            principal.principal_id(),
        )
        .await
    {
        Ok(applied) => (StatusCode::OK, Json(dto::applied_to_json(&applied))).into_response(),
        Err(e) => errors::stock_error_to_response(e),
    }
}

pub async fn transfer(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    JsonBody(body): JsonBody<dto::TransferStockRequest>,
) -> axum::response::Response {
    let cmd_auth = CmdAuth::new(body, Permission::STOCK_TRANSFER);
    if let Err(e) = authz::authorize_command(&principal, &cmd_auth) {
        return authz::forbidden(e);
    }
    let body = cmd_auth.inner;

    let part_id = match dto::parse_part_id(&body.part_id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match services
        .transfer(
            part_id,
            WarehouseId::new(body.from_warehouse_id),
            WarehouseId::new(body.to_warehouse_id),
            body.quantity,
            principal.principal_id(),
        )
        .await
    {
        Ok(applied) => (StatusCode::OK, Json(dto::applied_to_json(&applied))).into_response(),
        Err(e) => errors::stock_error_to_response(e),
    }
}

pub async fn quantity(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path((part_id, warehouse_id)): Path<(String, String)>,
) -> axum::response::Response {
    if let Err(resp) = authz::require(&principal, Permission::STOCK_READ) {
        return resp;
    }
    let (part_id, warehouse_id) = match (
        dto::parse_part_id(&part_id),
        dto::parse_warehouse_id(&warehouse_id),
    ) {
        (Ok(p), Ok(w)) => (p, w),
        (Err(resp), _) | (_, Err(resp)) => return resp,
    };

    match services.get_quantity(&part_id, warehouse_id).await {
        Ok(quantity) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "part_id": part_id.as_str(),
                "warehouse_id": warehouse_id.get(),
                "quantity": quantity,
            })),
        )
            .into_response(),
        Err(e) => errors::stock_error_to_response(e),
    }
}

pub async fn part_stock(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(part_id): Path<String>,
) -> axum::response::Response {
    if let Err(resp) = authz::require(&principal, Permission::STOCK_READ) {
        return resp;
    }
    let part_id = match dto::parse_part_id(&part_id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match services.part_summary(&part_id).await {
        Ok(summary) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "part_id": part_id.as_str(),
                "total": summary.total,
                "entries": summary.entries.iter().map(dto::entry_to_json).collect::<Vec<_>>(),
            })),
        )
            .into_response(),
        Err(e) => errors::stock_error_to_response(e),
    }
}

pub async fn part_movements(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(part_id): Path<String>,
    Query(query): Query<dto::MovementsQuery>,
) -> axum::response::Response {
    if let Err(resp) = authz::require(&principal, Permission::STOCK_READ) {
        return resp;
    }
    let part_id = match dto::parse_part_id(&part_id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match services.movements_for_part(&part_id, query.limit()).await {
        Ok(movements) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "part_id": part_id.as_str(),
                "items": movements.iter().map(dto::movement_to_json).collect::<Vec<_>>(),
            })),
        )
            .into_response(),
        Err(e) => errors::stock_error_to_response(e),
    }
}

pub async fn warehouse_stock(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(warehouse_id): Path<String>,
) -> axum::response::Response {
    if let Err(resp) = authz::require(&principal, Permission::STOCK_READ) {
        return resp;
    }
    let warehouse_id = match dto::parse_warehouse_id(&warehouse_id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match services.stock_for_warehouse(warehouse_id).await {
        Ok(entries) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "warehouse_id": warehouse_id.get(),
                "entries": entries.iter().map(dto::entry_to_json).collect::<Vec<_>>(),
            })),
        )
            .into_response(),
        Err(e) => errors::stock_error_to_response(e),
    }
}
