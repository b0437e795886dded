//! NVR/DVR endpoints

use crate::models::{
    nvr::{CreateNvr, Nvr, UpdateNvr},
    EquipmentKind,
};

equipment_handlers! {
    kind: EquipmentKind::Nvr,
    model: Nvr,
    create: CreateNvr => create_nvr,
    update: UpdateNvr => update_nvr,
    tag: "nvrs",
    list_path: "/nvrs",
    item_path: "/nvrs/{id}",
    status_path: "/nvrs/{id}/status",
}
