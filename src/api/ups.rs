//! UPS endpoints

use crate::models::{
    ups::{CreateUps, UpdateUps, Ups},
    EquipmentKind,
};

equipment_handlers! {
    kind: EquipmentKind::Ups,
    model: Ups,
    create: CreateUps => create_ups,
    update: UpdateUps => update_ups,
    tag: "ups",
    list_path: "/ups",
    item_path: "/ups/{id}",
    status_path: "/ups/{id}/status",
}
