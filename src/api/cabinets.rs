//! Cabinet endpoints

use axum::{
    extract::{Path, State},
    Json,
};

use crate::{
    error::AppResult,
    models::{
        cabinet::{Cabinet, CabinetContents, CreateCabinet, UpdateCabinet},
        user::Resource,
        EquipmentKind,
    },
};

use super::AuthenticatedUser;

equipment_handlers! {
    kind: EquipmentKind::Cabinet,
    model: Cabinet,
    create: CreateCabinet => create_cabinet,
    update: UpdateCabinet => update_cabinet,
    tag: "cabinets",
    list_path: "/cabinets",
    item_path: "/cabinets/{id}",
    status_path: "/cabinets/{id}/status",
}

/// Equipment mounted in a cabinet
#[utoipa::path(
    get,
    path = "/cabinets/{id}/contents",
    tag = "cabinets",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Cabinet ID")),
    responses(
        (status = 200, description = "Cabinet and its equipment", body = CabinetContents),
        (status = 404, description = "Cabinet not found")
    )
)]
pub async fn contents(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<CabinetContents>> {
    claims.require_read(Resource::Equipment)?;

    let contents = state.services.inventory.cabinet_contents(id).await?;
    Ok(Json(contents))
}
