//! Equipment inventory: validation, status history and cross-kind queries

use std::{collections::HashMap, net::IpAddr};

use chrono::Utc;
use sqlx::{postgres::PgRow, FromRow};

use crate::{
    error::{AppError, AppResult},
    models::{
        cabinet::{Cabinet, CabinetContents, CreateCabinet, UpdateCabinet},
        camera::{Camera, CreateCamera, UpdateCamera},
        enums::{EquipmentKind, EquipmentStatus},
        equipment::{
            EquipmentQuery, EquipmentSummary, HasCore, StatusChange, StatusHistoryEntry,
        },
        network_link::{CreateNetworkLink, NetworkLink, NetworkLinkQuery},
        nvr::{CreateNvr, Nvr, UpdateNvr},
        power_supply::{CreatePowerSupply, PowerSupply, UpdatePowerSupply},
        switch::{CreateSwitch, Switch, SwitchUsage, UpdateSwitch},
        ups::{CreateUps, UpdateUps, Ups},
    },
    repository::Repository,
};

/// Trim an IP address and check it parses; blank input becomes `None`
pub fn normalize_ip(ip: Option<&str>) -> AppResult<Option<String>> {
    match ip.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(None),
        Some(raw) => raw
            .parse::<IpAddr>()
            .map(|addr| Some(addr.to_string()))
            .map_err(|_| AppError::Validation(format!("Invalid IP address: {}", raw))),
    }
}

/// Port and PoE usage of a switch from the cameras plugged into it
pub fn compute_switch_usage(switch: &Switch, cameras: &[Camera]) -> SwitchUsage {
    let mut per_port: HashMap<i32, usize> = HashMap::new();
    for camera in cameras {
        if let Some(port) = camera.switch_port {
            *per_port.entry(port).or_default() += 1;
        }
    }
    let mut conflicting_ports: Vec<i32> = per_port
        .iter()
        .filter(|(_, n)| **n > 1)
        .map(|(port, _)| *port)
        .collect();
    conflicting_ports.sort_unstable();

    let used_ports = cameras.len() as i64;
    SwitchUsage {
        switch_id: switch.core.id,
        total_ports: switch.total_ports,
        used_ports,
        free_ports: switch
            .total_ports
            .map(|total| (i64::from(total) - used_ports).max(0)),
        poe_ports: switch.poe_ports,
        poe_devices: cameras.iter().filter(|c| c.poe).count() as i64,
        conflicting_ports,
    }
}

#[derive(Clone)]
pub struct InventoryService {
    repository: Repository,
}

impl InventoryService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub async fn list<T>(&self, query: &EquipmentQuery) -> AppResult<(Vec<T>, i64)>
    where
        T: HasCore + for<'r> FromRow<'r, PgRow> + Send + Unpin,
    {
        self.repository.equipment.list::<T>(query).await
    }

    pub async fn get<T>(&self, id: i32) -> AppResult<T>
    where
        T: HasCore + for<'r> FromRow<'r, PgRow> + Send + Unpin,
    {
        self.repository.equipment.get::<T>(id).await
    }

    /// Short "CODE name" label for messages
    pub async fn label(&self, kind: EquipmentKind, id: i32) -> String {
        match self.repository.equipment.summary(kind, id).await {
            Ok(s) => format!("{} {} ({})", s.code, s.name, kind.label()),
            Err(_) => format!("{} #{}", kind.label(), id),
        }
    }

    // Shared checks

    async fn check_code(&self, kind: EquipmentKind, code: &str, exclude: Option<i32>) -> AppResult<()> {
        if code.trim().is_empty() {
            return Err(AppError::Validation("Code is required".to_string()));
        }
        if self.repository.equipment.code_exists(kind, code, exclude).await? {
            return Err(AppError::Conflict(format!(
                "{} with code {} already exists",
                kind.label(),
                code
            )));
        }
        Ok(())
    }

    async fn check_ip(&self, ip: Option<&str>, exclude: Option<(EquipmentKind, i32)>) -> AppResult<()> {
        if let Some(ip) = ip {
            if let Some(other) = self.repository.equipment.ip_in_use(ip, exclude).await? {
                return Err(AppError::Conflict(format!(
                    "IP address {} is already used by {} {}",
                    ip,
                    other.kind.label(),
                    other.code
                )));
            }
        }
        Ok(())
    }

    async fn check_location(&self, location_id: Option<i32>) -> AppResult<()> {
        if let Some(id) = location_id {
            if !self.repository.locations.exists(id).await? {
                return Err(AppError::Validation(format!("Location {} does not exist", id)));
            }
        }
        Ok(())
    }

    async fn check_ref(&self, kind: EquipmentKind, id: Option<i32>) -> AppResult<()> {
        if let Some(id) = id {
            if !self.repository.equipment.exists(kind, id).await? {
                return Err(AppError::Validation(format!("{} {} does not exist", kind.label(), id)));
            }
        }
        Ok(())
    }

    // Cameras

    pub async fn create_camera(&self, mut data: CreateCamera, actor: Option<i32>) -> AppResult<Camera> {
        let kind = EquipmentKind::Camera;
        data.common.ip_address = normalize_ip(data.common.ip_address.as_deref())?;
        self.check_code(kind, &data.common.code, None).await?;
        self.check_ip(data.common.ip_address.as_deref(), None).await?;
        self.check_location(data.common.location_id).await?;
        self.check_ref(EquipmentKind::Cabinet, data.cabinet_id).await?;
        self.check_ref(EquipmentKind::Switch, data.switch_id).await?;
        self.check_ref(EquipmentKind::Nvr, data.nvr_id).await?;
        self.check_ref(EquipmentKind::PowerSupply, data.power_supply_id).await?;

        let camera = self.repository.cameras.create(&data, actor).await?;
        tracing::info!(camera_id = camera.core.id, code = %camera.core.code, "Camera created");
        Ok(camera)
    }

    pub async fn update_camera(&self, id: i32, mut data: UpdateCamera, actor: Option<i32>) -> AppResult<Camera> {
        let kind = EquipmentKind::Camera;
        self.repository.equipment.get::<Camera>(id).await?;
        data.common.ip_address = normalize_ip(data.common.ip_address.as_deref())?;
        if let Some(ref code) = data.common.code {
            self.check_code(kind, code, Some(id)).await?;
        }
        self.check_ip(data.common.ip_address.as_deref(), Some((kind, id))).await?;
        self.check_location(data.common.location_id).await?;
        self.check_ref(EquipmentKind::Cabinet, data.cabinet_id).await?;
        self.check_ref(EquipmentKind::Switch, data.switch_id).await?;
        self.check_ref(EquipmentKind::Nvr, data.nvr_id).await?;
        self.check_ref(EquipmentKind::PowerSupply, data.power_supply_id).await?;

        let camera = self.repository.cameras.update(id, &data, actor).await?;
        Ok(camera)
    }

    /// Cameras whose next preventive maintenance date is today or earlier
    pub async fn cameras_maintenance_due(&self) -> AppResult<Vec<Camera>> {
        self.repository
            .cameras
            .maintenance_due(Utc::now().date_naive())
            .await
    }

    // Switches

    pub async fn create_switch(&self, mut data: CreateSwitch, actor: Option<i32>) -> AppResult<Switch> {
        let kind = EquipmentKind::Switch;
        data.common.ip_address = normalize_ip(data.common.ip_address.as_deref())?;
        self.check_code(kind, &data.common.code, None).await?;
        self.check_ip(data.common.ip_address.as_deref(), None).await?;
        self.check_location(data.common.location_id).await?;
        self.check_ref(EquipmentKind::Cabinet, data.cabinet_id).await?;
        self.check_ref(EquipmentKind::PowerSupply, data.power_supply_id).await?;
        self.check_ref(EquipmentKind::Ups, data.ups_id).await?;
        if let (Some(total), Some(poe)) = (data.total_ports, data.poe_ports) {
            if poe > total {
                return Err(AppError::Validation(
                    "PoE ports cannot exceed total ports".to_string(),
                ));
            }
        }

        let switch = self.repository.switches.create(&data, actor).await?;
        Ok(switch)
    }

    pub async fn update_switch(&self, id: i32, mut data: UpdateSwitch, actor: Option<i32>) -> AppResult<Switch> {
        let kind = EquipmentKind::Switch;
        let current: Switch = self.repository.equipment.get(id).await?;
        data.common.ip_address = normalize_ip(data.common.ip_address.as_deref())?;
        if let Some(ref code) = data.common.code {
            self.check_code(kind, code, Some(id)).await?;
        }
        self.check_ip(data.common.ip_address.as_deref(), Some((kind, id))).await?;
        self.check_location(data.common.location_id).await?;
        self.check_ref(EquipmentKind::Cabinet, data.cabinet_id).await?;
        self.check_ref(EquipmentKind::PowerSupply, data.power_supply_id).await?;
        self.check_ref(EquipmentKind::Ups, data.ups_id).await?;
        let total = data.total_ports.or(current.total_ports);
        let poe = data.poe_ports.or(current.poe_ports);
        if let (Some(total), Some(poe)) = (total, poe) {
            if poe > total {
                return Err(AppError::Validation(
                    "PoE ports cannot exceed total ports".to_string(),
                ));
            }
        }

        let switch = self.repository.switches.update(id, &data, actor).await?;
        Ok(switch)
    }

    pub async fn switch_usage(&self, id: i32) -> AppResult<SwitchUsage> {
        let switch: Switch = self.repository.equipment.get(id).await?;
        let cameras = self.repository.cameras.by_switch(id).await?;
        Ok(compute_switch_usage(&switch, &cameras))
    }

    // NVR / DVR

    pub async fn create_nvr(&self, mut data: CreateNvr, actor: Option<i32>) -> AppResult<Nvr> {
        let kind = EquipmentKind::Nvr;
        data.common.ip_address = normalize_ip(data.common.ip_address.as_deref())?;
        self.check_code(kind, &data.common.code, None).await?;
        self.check_ip(data.common.ip_address.as_deref(), None).await?;
        self.check_location(data.common.location_id).await?;
        self.check_ref(EquipmentKind::Cabinet, data.cabinet_id).await?;
        self.check_ref(EquipmentKind::Switch, data.switch_id).await?;
        self.check_ref(EquipmentKind::Ups, data.ups_id).await?;

        let nvr = self.repository.nvrs.create(&data, actor).await?;
        Ok(nvr)
    }

    pub async fn update_nvr(&self, id: i32, mut data: UpdateNvr, actor: Option<i32>) -> AppResult<Nvr> {
        let kind = EquipmentKind::Nvr;
        self.repository.equipment.get::<Nvr>(id).await?;
        data.common.ip_address = normalize_ip(data.common.ip_address.as_deref())?;
        if let Some(ref code) = data.common.code {
            self.check_code(kind, code, Some(id)).await?;
        }
        self.check_ip(data.common.ip_address.as_deref(), Some((kind, id))).await?;
        self.check_location(data.common.location_id).await?;
        self.check_ref(EquipmentKind::Cabinet, data.cabinet_id).await?;
        self.check_ref(EquipmentKind::Switch, data.switch_id).await?;
        self.check_ref(EquipmentKind::Ups, data.ups_id).await?;
        if let Some(channels) = data.channels {
            let used = self.repository.nvrs.used_channels(id).await?;
            if i64::from(channels) < used {
                return Err(AppError::Validation(format!(
                    "{} cameras are recorded on this device, channels cannot be lowered to {}",
                    used, channels
                )));
            }
        }

        let nvr = self.repository.nvrs.update(id, &data, actor).await?;
        Ok(nvr)
    }

    // UPS

    pub async fn create_ups(&self, mut data: CreateUps, actor: Option<i32>) -> AppResult<Ups> {
        let kind = EquipmentKind::Ups;
        data.common.ip_address = normalize_ip(data.common.ip_address.as_deref())?;
        self.check_code(kind, &data.common.code, None).await?;
        self.check_ip(data.common.ip_address.as_deref(), None).await?;
        self.check_location(data.common.location_id).await?;
        self.check_ref(EquipmentKind::Cabinet, data.cabinet_id).await?;

        let ups = self.repository.ups.create(&data, actor).await?;
        Ok(ups)
    }

    pub async fn update_ups(&self, id: i32, mut data: UpdateUps, actor: Option<i32>) -> AppResult<Ups> {
        let kind = EquipmentKind::Ups;
        self.repository.equipment.get::<Ups>(id).await?;
        data.common.ip_address = normalize_ip(data.common.ip_address.as_deref())?;
        if let Some(ref code) = data.common.code {
            self.check_code(kind, code, Some(id)).await?;
        }
        self.check_ip(data.common.ip_address.as_deref(), Some((kind, id))).await?;
        self.check_location(data.common.location_id).await?;
        self.check_ref(EquipmentKind::Cabinet, data.cabinet_id).await?;

        let ups = self.repository.ups.update(id, &data, actor).await?;
        Ok(ups)
    }

    // Power supplies

    pub async fn create_power_supply(
        &self,
        mut data: CreatePowerSupply,
        actor: Option<i32>,
    ) -> AppResult<PowerSupply> {
        let kind = EquipmentKind::PowerSupply;
        data.common.ip_address = normalize_ip(data.common.ip_address.as_deref())?;
        self.check_code(kind, &data.common.code, None).await?;
        self.check_ip(data.common.ip_address.as_deref(), None).await?;
        self.check_location(data.common.location_id).await?;
        self.check_ref(EquipmentKind::Cabinet, data.cabinet_id).await?;
        self.check_ref(EquipmentKind::Ups, data.ups_id).await?;

        let ps = self.repository.power_supplies.create(&data, actor).await?;
        Ok(ps)
    }

    pub async fn update_power_supply(
        &self,
        id: i32,
        mut data: UpdatePowerSupply,
        actor: Option<i32>,
    ) -> AppResult<PowerSupply> {
        let kind = EquipmentKind::PowerSupply;
        self.repository.equipment.get::<PowerSupply>(id).await?;
        data.common.ip_address = normalize_ip(data.common.ip_address.as_deref())?;
        if let Some(ref code) = data.common.code {
            self.check_code(kind, code, Some(id)).await?;
        }
        self.check_ip(data.common.ip_address.as_deref(), Some((kind, id))).await?;
        self.check_location(data.common.location_id).await?;
        self.check_ref(EquipmentKind::Cabinet, data.cabinet_id).await?;
        self.check_ref(EquipmentKind::Ups, data.ups_id).await?;

        let ps = self.repository.power_supplies.update(id, &data, actor).await?;
        Ok(ps)
    }

    // Cabinets

    pub async fn create_cabinet(&self, mut data: CreateCabinet, actor: Option<i32>) -> AppResult<Cabinet> {
        let kind = EquipmentKind::Cabinet;
        data.common.ip_address = normalize_ip(data.common.ip_address.as_deref())?;
        self.check_code(kind, &data.common.code, None).await?;
        self.check_ip(data.common.ip_address.as_deref(), None).await?;
        self.check_location(data.common.location_id).await?;

        let cabinet = self.repository.cabinets.create(&data, actor).await?;
        Ok(cabinet)
    }

    pub async fn update_cabinet(&self, id: i32, mut data: UpdateCabinet, actor: Option<i32>) -> AppResult<Cabinet> {
        let kind = EquipmentKind::Cabinet;
        self.repository.equipment.get::<Cabinet>(id).await?;
        data.common.ip_address = normalize_ip(data.common.ip_address.as_deref())?;
        if let Some(ref code) = data.common.code {
            self.check_code(kind, code, Some(id)).await?;
        }
        self.check_ip(data.common.ip_address.as_deref(), Some((kind, id))).await?;
        self.check_location(data.common.location_id).await?;

        let cabinet = self.repository.cabinets.update(id, &data, actor).await?;
        Ok(cabinet)
    }

    pub async fn cabinet_contents(&self, id: i32) -> AppResult<CabinetContents> {
        let cabinet: Cabinet = self.repository.equipment.get(id).await?;
        let equipment = self.repository.equipment.in_cabinet(id).await?;
        Ok(CabinetContents { cabinet, equipment })
    }

    // Any kind

    /// Explicit status change with a reason, recorded in the history
    pub async fn change_status(
        &self,
        kind: EquipmentKind,
        id: i32,
        change: &StatusChange,
        actor: Option<i32>,
    ) -> AppResult<EquipmentSummary> {
        if change.status == EquipmentStatus::Decommissioned {
            return Err(AppError::BadRequest(
                "Use DELETE to decommission equipment".to_string(),
            ));
        }
        let old = self
            .repository
            .equipment
            .change_status(kind, id, change.status, change.reason.as_deref(), actor)
            .await?;
        tracing::info!(
            kind = %kind,
            id,
            from = %old,
            to = %change.status,
            "Equipment status changed"
        );
        self.repository.equipment.summary(kind, id).await
    }

    /// Soft delete, recorded as decommissioning
    pub async fn delete(&self, kind: EquipmentKind, id: i32, actor: Option<i32>) -> AppResult<()> {
        let current = self.repository.equipment.summary(kind, id).await?;
        self.repository.equipment.soft_delete(kind, id).await?;
        self.repository
            .equipment
            .record_history(
                kind,
                id,
                Some(current.status),
                EquipmentStatus::Decommissioned,
                Some("deleted"),
                actor,
            )
            .await?;
        tracing::info!(kind = %kind, id, code = %current.code, "Equipment deleted");
        Ok(())
    }

    pub async fn search(&self, term: &str, limit: Option<i64>) -> AppResult<Vec<EquipmentSummary>> {
        self.repository
            .equipment
            .search(term, limit.unwrap_or(50))
            .await
    }

    pub async fn find_by_ip(&self, ip: &str) -> AppResult<Vec<EquipmentSummary>> {
        let ip = normalize_ip(Some(ip))?
            .ok_or_else(|| AppError::Validation("IP address is required".to_string()))?;
        self.repository.equipment.find_by_ip(&ip).await
    }

    pub async fn history(&self, kind: EquipmentKind, id: i32) -> AppResult<Vec<StatusHistoryEntry>> {
        self.repository.equipment.history(kind, id).await
    }

    pub async fn at_location(&self, location_id: i32) -> AppResult<Vec<EquipmentSummary>> {
        self.repository.equipment.at_location(location_id).await
    }

    // Network links

    pub async fn links(&self, query: &NetworkLinkQuery) -> AppResult<Vec<NetworkLink>> {
        self.repository.network_links.list(query).await
    }

    /// Both ends must exist and differ
    pub async fn create_link(&self, data: &CreateNetworkLink) -> AppResult<NetworkLink> {
        if data.source_kind == data.target_kind && data.source_id == data.target_id {
            return Err(AppError::Validation(
                "A link needs two different devices".to_string(),
            ));
        }
        self.check_ref(data.source_kind, Some(data.source_id)).await?;
        self.check_ref(data.target_kind, Some(data.target_id)).await?;
        let link = self.repository.network_links.create(data).await?;
        tracing::info!(
            link_id = link.id,
            source = %format!("{}:{}", link.source_kind, link.source_id),
            target = %format!("{}:{}", link.target_kind, link.target_id),
            "Network link created"
        );
        Ok(link)
    }

    pub async fn set_link_active(&self, id: i32, active: bool) -> AppResult<NetworkLink> {
        self.repository.network_links.set_active(id, active).await
    }

    pub async fn delete_link(&self, id: i32) -> AppResult<()> {
        self.repository.network_links.delete(id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::equipment::EquipmentCore;

    fn core(id: i32, code: &str) -> EquipmentCore {
        EquipmentCore {
            id,
            code: code.to_string(),
            name: code.to_string(),
            brand: None,
            model: None,
            serial_number: None,
            ip_address: None,
            mac_address: None,
            status: EquipmentStatus::Active,
            location_id: None,
            installed_on: None,
            decommissioned_on: None,
            notes: None,
            deleted: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn camera(id: i32, port: Option<i32>, poe: bool) -> Camera {
        Camera {
            core: core(id, &format!("CAM-{id}")),
            cabinet_id: None,
            camera_type: None,
            resolution: None,
            switch_id: Some(1),
            switch_port: port,
            nvr_id: None,
            nvr_channel: None,
            power_supply_id: None,
            poe,
            warranty_until: None,
            last_maintenance_on: None,
            next_maintenance_on: None,
            latitude: None,
            longitude: None,
        }
    }

    fn switch(total: Option<i32>) -> Switch {
        Switch {
            core: core(1, "SW-1"),
            cabinet_id: None,
            total_ports: total,
            poe_ports: Some(8),
            poe_budget_watts: None,
            managed: true,
            power_supply_id: None,
            ups_id: None,
        }
    }

    #[test]
    fn test_normalize_ip() {
        assert_eq!(normalize_ip(None).unwrap(), None);
        assert_eq!(normalize_ip(Some("  ")).unwrap(), None);
        assert_eq!(
            normalize_ip(Some(" 10.0.0.5 ")).unwrap(),
            Some("10.0.0.5".to_string())
        );
        assert_eq!(normalize_ip(Some("fe80::1")).unwrap(), Some("fe80::1".to_string()));
        assert!(normalize_ip(Some("10.0.0.256")).is_err());
        assert!(normalize_ip(Some("camera")).is_err());
    }

    #[test]
    fn test_switch_usage_counts_ports_and_poe() {
        let cameras = vec![
            camera(1, Some(1), true),
            camera(2, Some(2), true),
            camera(3, Some(2), false),
            camera(4, None, true),
        ];
        let usage = compute_switch_usage(&switch(Some(8)), &cameras);
        assert_eq!(usage.used_ports, 4);
        assert_eq!(usage.free_ports, Some(4));
        assert_eq!(usage.poe_devices, 3);
        assert_eq!(usage.conflicting_ports, vec![2]);
    }

    #[test]
    fn test_switch_usage_never_negative() {
        let cameras: Vec<Camera> = (1..=3).map(|i| camera(i, Some(i), false)).collect();
        let usage = compute_switch_usage(&switch(Some(2)), &cameras);
        assert_eq!(usage.free_ports, Some(0));
        assert_eq!(compute_switch_usage(&switch(None), &cameras).free_ports, None);
    }
}
