//! Camera endpoints

use axum::{extract::State, Json};

use crate::{
    error::AppResult,
    models::{
        camera::{Camera, CreateCamera, UpdateCamera},
        user::Resource,
        EquipmentKind,
    },
};

use super::AuthenticatedUser;

equipment_handlers! {
    kind: EquipmentKind::Camera,
    model: Camera,
    create: CreateCamera => create_camera,
    update: UpdateCamera => update_camera,
    tag: "cameras",
    list_path: "/cameras",
    item_path: "/cameras/{id}",
    status_path: "/cameras/{id}/status",
}

/// Cameras whose next maintenance date has passed
#[utoipa::path(
    get,
    path = "/cameras/maintenance-due",
    tag = "cameras",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Cameras due for maintenance", body = Vec<Camera>)
    )
)]
pub async fn maintenance_due(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<Vec<Camera>>> {
    claims.require_read(Resource::Equipment)?;

    let cameras = state.services.inventory.cameras_maintenance_due().await?;
    Ok(Json(cameras))
}
