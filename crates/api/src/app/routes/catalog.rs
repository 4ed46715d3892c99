use std::sync::Arc;

use axum::{
    extract::Extension,
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};

use partsledger_auth::Permission;

use crate::app::routes::common::{CmdAuth, JsonBody};
use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::authz;
use crate::context::PrincipalContext;

pub fn router() -> Router {
    Router::new()
        .route("/parts", get(list_parts).post(register_part))
        .route("/warehouses", get(list_warehouses).post(register_warehouse))
}

pub async fn register_part(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    JsonBody(body): JsonBody<dto::RegisterPartRequest>,
) -> axum::response::Response {
    let cmd_auth = CmdAuth::new(body, Permission::CATALOG_WRITE);
    if let Err(e) = authz::authorize_command(&principal, &cmd_auth) {
        return authz::forbidden(e);
    }

    let new_part = match cmd_auth.inner.into_new_part() {
        Ok(p) => p,
        Err(resp) => return resp,
    };

    match services.register_part(new_part).await {
        Ok(part) => {
            tracing::info!(part_id = %part.id, "part registered");
            (StatusCode::CREATED, Json(dto::part_to_json(part))).into_response()
        }
        Err(e) => errors::catalog_error_to_response(e),
    }
}

pub async fn list_parts(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
) -> axum::response::Response {
    if let Err(resp) = authz::require(&principal, Permission::CATALOG_READ) {
        return resp;
    }

    match services.list_parts().await {
        Ok(parts) => {
            let items: Vec<_> = parts.into_iter().map(dto::part_to_json).collect();
            (StatusCode::OK, Json(serde_json::json!({ "items": items }))).into_response()
        }
        Err(e) => errors::catalog_error_to_response(e),
    }
}

pub async fn register_warehouse(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    JsonBody(body): JsonBody<dto::RegisterWarehouseRequest>,
) -> axum::response::Response {
    let cmd_auth = CmdAuth::new(body, Permission::CATALOG_WRITE);
    if let Err(e) = authz::authorize_command(&principal, &cmd_auth) {
        return authz::forbidden(e);
    }

    match services.register_warehouse(cmd_auth.inner.into()).await {
        Ok(warehouse) => {
            tracing::info!(warehouse_id = %warehouse.id, "warehouse registered");
            (StatusCode::CREATED, Json(dto::warehouse_to_json(warehouse))).into_response()
        }
        Err(e) => errors::catalog_error_to_response(e),
    }
}

pub async fn list_warehouses(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
) -> axum::response::Response {
    if let Err(resp) = authz::require(&principal, Permission::CATALOG_READ) {
        return resp;
    }

    match services.list_warehouses().await {
        Ok(warehouses) => {
            let items: Vec<_> = warehouses.into_iter().map(dto::warehouse_to_json).collect();
            (StatusCode::OK, Json(serde_json::json!({ "items": items }))).into_response()
        }
        Err(e) => errors::catalog_error_to_response(e),
    }
}
