//! Power supply endpoints

use crate::models::{
    power_supply::{CreatePowerSupply, PowerSupply, UpdatePowerSupply},
    EquipmentKind,
};

equipment_handlers! {
    kind: EquipmentKind::PowerSupply,
    model: PowerSupply,
    create: CreatePowerSupply => create_power_supply,
    update: UpdatePowerSupply => update_power_supply,
    tag: "power-supplies",
    list_path: "/power-supplies",
    item_path: "/power-supplies/{id}",
    status_path: "/power-supplies/{id}/status",
}
