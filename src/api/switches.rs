//! Network switch endpoints

use axum::{
    extract::{Path, State},
    Json,
};

use crate::{
    error::AppResult,
    models::{
        switch::{CreateSwitch, Switch, SwitchUsage, UpdateSwitch},
        user::Resource,
        EquipmentKind,
    },
};

use super::AuthenticatedUser;

equipment_handlers! {
    kind: EquipmentKind::Switch,
    model: Switch,
    create: CreateSwitch => create_switch,
    update: UpdateSwitch => update_switch,
    tag: "switches",
    list_path: "/switches",
    item_path: "/switches/{id}",
    status_path: "/switches/{id}/status",
}

/// Port and PoE usage computed from the connected cameras
#[utoipa::path(
    get,
    path = "/switches/{id}/usage",
    tag = "switches",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Switch ID")),
    responses(
        (status = 200, description = "Switch usage", body = SwitchUsage),
        (status = 404, description = "Switch not found")
    )
)]
pub async fn usage(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<SwitchUsage>> {
    claims.require_read(Resource::Equipment)?;

    let usage = state.services.inventory.switch_usage(id).await?;
    Ok(Json(usage))
}
