//! Spreadsheet import: cleaned rows are upserted by code, one row at a time

use std::{
    collections::HashMap,
    path::{Path, PathBuf},
};

use rust_decimal::Decimal;
use uuid::Uuid;
use validator::Validate;

use super::{inventory::InventoryService, locations::LocationsService};
use crate::{
    config::UploadConfig,
    error::{AppError, AppResult},
    import::{
        mapping::{
            map_row, CameraRecord, ColumnMap, EquipmentRecord, FailureRecord, Field,
            LocationRecord, NvrRecord, Record, SwitchRecord, UpsRecord,
        },
        sheet::{read_workbook, Sheet, SheetRow},
    },
    models::{
        camera::{Camera, CreateCamera, UpdateCamera},
        enums::{EquipmentKind, FailureStatus, LocationKind},
        equipment::{EquipmentFields, EquipmentPatch},
        failure::{CreateFailure, Failure, UpdateFailure},
        import_report::{ImportAction, ImportKind, ImportReport},
        location::{CreateLocation, UpdateLocation},
        nvr::{CreateNvr, Nvr, UpdateNvr},
        switch::{CreateSwitch, Switch, UpdateSwitch},
        ups::{CreateUps, UpdateUps, Ups},
    },
    repository::{failures::FailuresRepository, Repository},
};

const WORKBOOK_EXTENSIONS: &[&str] = &["xlsx", "xlsm", "xls", "ods"];
const IMPORT_DIR: &str = "imports";

/// Workbook extensions calamine can open
pub fn workbook_extension(file_name: &str) -> AppResult<String> {
    let ext = Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase)
        .unwrap_or_default();
    if WORKBOOK_EXTENSIONS.contains(&ext.as_str()) {
        Ok(ext)
    } else {
        Err(AppError::Validation(format!(
            "Unsupported workbook '{}', expected one of {}",
            file_name,
            WORKBOOK_EXTENSIONS.join(", ")
        )))
    }
}

fn patch(record: &EquipmentRecord, location_id: Option<i32>) -> EquipmentPatch {
    EquipmentPatch {
        code: None,
        name: Some(record.name.clone()),
        brand: record.brand.clone(),
        model: record.model.clone(),
        serial_number: record.serial_number.clone(),
        ip_address: record.ip_address.clone(),
        mac_address: record.mac_address.clone(),
        status: record.status,
        location_id,
        installed_on: record.installed_on,
        decommissioned_on: None,
        notes: record.notes.clone(),
    }
}

fn fields(record: &EquipmentRecord, location_id: Option<i32>) -> EquipmentFields {
    EquipmentFields {
        code: record.code.clone(),
        name: record.name.clone(),
        brand: record.brand.clone(),
        model: record.model.clone(),
        serial_number: record.serial_number.clone(),
        ip_address: record.ip_address.clone(),
        mac_address: record.mac_address.clone(),
        status: record.status,
        location_id,
        installed_on: record.installed_on,
        notes: record.notes.clone(),
    }
}

fn location_kind(record: &LocationRecord) -> LocationKind {
    match (&record.campus, &record.building, &record.floor) {
        (_, _, Some(_)) => LocationKind::Floor,
        (_, Some(_), None) => LocationKind::Building,
        (Some(_), None, None) => LocationKind::Campus,
        _ => LocationKind::Building,
    }
}

/// Column map and empty report for a sheet; fails when the key column is missing
fn open_batch(
    kind: ImportKind,
    sheet: &Sheet,
    file_name: Option<String>,
    dry_run: bool,
) -> AppResult<(ColumnMap, ImportReport)> {
    let map = ColumnMap::new(kind, &sheet.headers);
    let key = match kind {
        ImportKind::Failures => Field::Title,
        ImportKind::Locations if map.has(Field::Building) => Field::Building,
        _ => Field::Name,
    };
    if !map.has(key) {
        return Err(AppError::Import(format!(
            "Sheet '{}' has no {} column (headings: {})",
            sheet.name,
            if key == Field::Title { "title" } else { "name" },
            sheet.headers.join(", ")
        )));
    }

    let mut report = ImportReport::new(kind, file_name, dry_run);
    report.unmapped_columns = map.unmapped.clone();
    Ok((map, report))
}

/// Map one row into the report: count it, keep its cleaning warnings, count it
/// as skipped when it has no record, and add it to the preview on dry runs
fn stage_row(
    kind: ImportKind,
    map: &ColumnMap,
    row: &SheetRow,
    report: &mut ImportReport,
) -> AppResult<Option<Record>> {
    report.rows_read += 1;
    let mapped = map_row(kind, map, row);
    for (column, message) in mapped.warnings {
        tracing::warn!(
            row = row.number,
            column = column.as_deref(),
            %message,
            "Import cleaning problem"
        );
        report.warn(row.number, column.as_deref(), message);
    }
    let Some(record) = mapped.record else {
        report.record(ImportAction::Skipped);
        return Ok(None);
    };
    if report.dry_run {
        let value = serde_json::to_value(&record)
            .map_err(|e| AppError::Internal(format!("Cannot serialize preview: {}", e)))?;
        report.preview.push(value);
    }
    Ok(Some(record))
}

/// Lookups made while walking one sheet
#[derive(Default)]
struct BatchCache {
    /// lowercased building name -> location id
    locations: HashMap<String, Option<i32>>,
}

/// Where one row is being written from, for warnings
struct RowContext<'a> {
    row: usize,
    dry_run: bool,
    actor: Option<i32>,
    report: &'a mut ImportReport,
}

impl RowContext<'_> {
    fn warn(&mut self, column: Option<&str>, message: String) {
        tracing::warn!(row = self.row, column, %message, "Import cleaning problem");
        self.report.warn(self.row, column, message);
    }
}

#[derive(Clone)]
pub struct ImportService {
    repository: Repository,
    inventory: InventoryService,
    locations: LocationsService,
    folder: PathBuf,
}

impl ImportService {
    pub fn new(
        repository: Repository,
        inventory: InventoryService,
        locations: LocationsService,
        config: &UploadConfig,
    ) -> Self {
        Self {
            repository,
            inventory,
            locations,
            folder: PathBuf::from(&config.folder),
        }
    }

    /// Keep an uploaded workbook in the upload folder and return its path
    pub async fn store_upload(&self, original_name: &str, bytes: &[u8]) -> AppResult<PathBuf> {
        if bytes.is_empty() {
            return Err(AppError::Validation("Uploaded file is empty".to_string()));
        }
        let ext = workbook_extension(original_name)?;
        let dir = self.folder.join(IMPORT_DIR);
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|e| AppError::Internal(format!("Cannot create upload folder: {}", e)))?;
        let path = dir.join(format!("{}.{}", Uuid::new_v4(), ext));
        tokio::fs::write(&path, bytes)
            .await
            .map_err(|e| AppError::Internal(format!("Cannot store upload: {}", e)))?;
        Ok(path)
    }

    /// Read a workbook from disk and import its sheet
    pub async fn import_file(
        &self,
        kind: ImportKind,
        path: PathBuf,
        sheet_name: Option<String>,
        file_name: Option<String>,
        dry_run: bool,
        actor: Option<i32>,
    ) -> AppResult<ImportReport> {
        workbook_extension(&path.to_string_lossy())?;
        let sheet = tokio::task::spawn_blocking(move || read_workbook(&path, sheet_name.as_deref()))
            .await
            .map_err(|e| AppError::Internal(format!("Workbook reader stopped: {}", e)))?
            .map_err(|e| AppError::Import(e.to_string()))?;
        self.import_sheet(kind, &sheet, file_name, dry_run, actor).await
    }

    pub async fn import_sheet(
        &self,
        kind: ImportKind,
        sheet: &Sheet,
        file_name: Option<String>,
        dry_run: bool,
        actor: Option<i32>,
    ) -> AppResult<ImportReport> {
        let (map, mut report) = open_batch(kind, sheet, file_name, dry_run)?;
        let mut cache = BatchCache::default();
        tracing::info!(
            kind = %kind,
            sheet = %sheet.name,
            rows = sheet.rows.len(),
            dry_run,
            "Import started"
        );

        for row in &sheet.rows {
            let Some(record) = stage_row(kind, &map, row, &mut report)? else {
                continue;
            };
            let mut ctx = RowContext {
                row: row.number,
                dry_run,
                actor,
                report: &mut report,
            };
            match self.apply(&record, &mut ctx, &mut cache).await {
                Ok(action) => ctx.report.record(action),
                Err(e) => {
                    ctx.warn(None, e.to_string());
                    ctx.report.record(ImportAction::Skipped);
                }
            }
        }

        report.finish();
        if !dry_run {
            self.repository.imports.save(&report, actor).await?;
        }
        tracing::info!(
            batch_id = %report.batch_id,
            kind = %kind,
            created = report.created,
            updated = report.updated,
            skipped = report.skipped,
            warnings = report.warnings.len(),
            "Import finished"
        );
        Ok(report)
    }

    async fn apply(
        &self,
        record: &Record,
        ctx: &mut RowContext<'_>,
        cache: &mut BatchCache,
    ) -> AppResult<ImportAction> {
        match record {
            Record::Location(r) => self.apply_location(r, ctx).await,
            Record::Camera(r) => self.apply_camera(r, ctx, cache).await,
            Record::Switch(r) => self.apply_switch(r, ctx, cache).await,
            Record::Nvr(r) => self.apply_nvr(r, ctx, cache).await,
            Record::Ups(r) => self.apply_ups(r, ctx, cache).await,
            Record::Failure(r) => self.apply_failure(r, ctx).await,
        }
    }

    async fn apply_location(&self, r: &LocationRecord, ctx: &mut RowContext<'_>) -> AppResult<ImportAction> {
        let existing = self
            .repository
            .locations
            .find_by_code_or_name(r.code.as_deref(), &r.name)
            .await?;
        if ctx.dry_run {
            return Ok(if existing.is_some() { ImportAction::Updated } else { ImportAction::Created });
        }
        match existing {
            Some(location) => {
                let data = UpdateLocation {
                    code: r.code.clone().filter(|_| location.code.is_none()),
                    name: Some(r.name.clone()),
                    kind: None,
                    parent_id: None,
                    campus: r.campus.clone(),
                    building: r.building.clone(),
                    floor: r.floor.clone(),
                    latitude: r.latitude,
                    longitude: r.longitude,
                    description: r.description.clone(),
                };
                data.validate()?;
                self.locations.update(location.id, data).await?;
                Ok(ImportAction::Updated)
            }
            None => {
                let data = CreateLocation {
                    code: r.code.clone(),
                    name: r.name.clone(),
                    kind: Some(location_kind(r)),
                    parent_id: None,
                    campus: r.campus.clone(),
                    building: r.building.clone(),
                    floor: r.floor.clone(),
                    latitude: r.latitude,
                    longitude: r.longitude,
                    description: r.description.clone(),
                };
                data.validate()?;
                self.locations.create(data).await?;
                Ok(ImportAction::Created)
            }
        }
    }

    /// Location id for the building named in a row, created on first sight
    async fn resolve_location(
        &self,
        r: &EquipmentRecord,
        ctx: &RowContext<'_>,
        cache: &mut BatchCache,
    ) -> AppResult<Option<i32>> {
        let Some(building) = r.building.as_deref() else {
            return Ok(None);
        };
        let key = building.to_lowercase();
        if let Some(id) = cache.locations.get(&key) {
            return Ok(*id);
        }

        let id = match self
            .repository
            .locations
            .find_by_code_or_name(None, building)
            .await?
        {
            Some(location) => Some(location.id),
            None if ctx.dry_run => None,
            None => {
                let location = self
                    .locations
                    .create(CreateLocation {
                        name: building.to_string(),
                        kind: Some(LocationKind::Building),
                        campus: r.campus.clone(),
                        building: Some(building.to_string()),
                        ..Default::default()
                    })
                    .await?;
                Some(location.id)
            }
        };
        cache.locations.insert(key, id);
        Ok(id)
    }

    /// Find equipment of one kind by code, then by exact name
    async fn find_equipment(&self, kind: EquipmentKind, text: &str) -> AppResult<Option<i32>> {
        self.repository.equipment.find_exact(kind, text).await
    }

    async fn resolve_ref(
        &self,
        kind: EquipmentKind,
        text: Option<&str>,
        column: &str,
        ctx: &mut RowContext<'_>,
    ) -> AppResult<Option<i32>> {
        let Some(text) = text else {
            return Ok(None);
        };
        let found = self.find_equipment(kind, text).await?;
        if found.is_none() {
            ctx.warn(
                Some(column),
                format!("{} '{}' not found, link left empty", kind.label(), text),
            );
        }
        Ok(found)
    }

    async fn apply_camera(
        &self,
        r: &CameraRecord,
        ctx: &mut RowContext<'_>,
        cache: &mut BatchCache,
    ) -> AppResult<ImportAction> {
        let location_id = self.resolve_location(&r.common, ctx, cache).await?;
        let nvr_id = self.resolve_ref(EquipmentKind::Nvr, r.nvr.as_deref(), "nvr", ctx).await?;
        let switch_id = self
            .resolve_ref(EquipmentKind::Switch, r.switch.as_deref(), "switch", ctx)
            .await?;
        let existing = self
            .repository
            .equipment
            .get_by_code::<Camera>(&r.common.code)
            .await?;
        if ctx.dry_run {
            return Ok(if existing.is_some() { ImportAction::Updated } else { ImportAction::Created });
        }

        match existing {
            Some(camera) => {
                let data = UpdateCamera {
                    common: patch(&r.common, location_id),
                    camera_type: r.camera_type,
                    resolution: r.resolution.clone(),
                    switch_id,
                    switch_port: r.switch_port,
                    nvr_id,
                    nvr_channel: r.nvr_channel,
                    poe: r.poe,
                    latitude: r.latitude,
                    longitude: r.longitude,
                    ..Default::default()
                };
                data.validate()?;
                self.inventory
                    .update_camera(camera.core.id, data, ctx.actor)
                    .await?;
                Ok(ImportAction::Updated)
            }
            None => {
                let data = CreateCamera {
                    common: fields(&r.common, location_id),
                    camera_type: r.camera_type,
                    resolution: r.resolution.clone(),
                    switch_id,
                    switch_port: r.switch_port,
                    nvr_id,
                    nvr_channel: r.nvr_channel,
                    poe: r.poe,
                    latitude: r.latitude,
                    longitude: r.longitude,
                    ..Default::default()
                };
                data.validate()?;
                self.inventory.create_camera(data, ctx.actor).await?;
                Ok(ImportAction::Created)
            }
        }
    }

    async fn apply_switch(
        &self,
        r: &SwitchRecord,
        ctx: &mut RowContext<'_>,
        cache: &mut BatchCache,
    ) -> AppResult<ImportAction> {
        let location_id = self.resolve_location(&r.common, ctx, cache).await?;
        let existing = self
            .repository
            .equipment
            .get_by_code::<Switch>(&r.common.code)
            .await?;
        if ctx.dry_run {
            return Ok(if existing.is_some() { ImportAction::Updated } else { ImportAction::Created });
        }

        match existing {
            Some(switch) => {
                let data = UpdateSwitch {
                    common: patch(&r.common, location_id),
                    total_ports: r.total_ports,
                    poe_ports: r.poe_ports,
                    managed: r.managed,
                    ..Default::default()
                };
                data.validate()?;
                self.inventory
                    .update_switch(switch.core.id, data, ctx.actor)
                    .await?;
                Ok(ImportAction::Updated)
            }
            None => {
                let data = CreateSwitch {
                    common: fields(&r.common, location_id),
                    total_ports: r.total_ports,
                    poe_ports: r.poe_ports,
                    managed: r.managed,
                    ..Default::default()
                };
                data.validate()?;
                self.inventory.create_switch(data, ctx.actor).await?;
                Ok(ImportAction::Created)
            }
        }
    }

    async fn apply_nvr(
        &self,
        r: &NvrRecord,
        ctx: &mut RowContext<'_>,
        cache: &mut BatchCache,
    ) -> AppResult<ImportAction> {
        let location_id = self.resolve_location(&r.common, ctx, cache).await?;
        let storage = r
            .storage_capacity_gb
            .and_then(|gb| Decimal::try_from(gb).ok());
        let existing = self
            .repository
            .equipment
            .get_by_code::<Nvr>(&r.common.code)
            .await?;
        if ctx.dry_run {
            return Ok(if existing.is_some() { ImportAction::Updated } else { ImportAction::Created });
        }

        match existing {
            Some(nvr) => {
                let data = UpdateNvr {
                    common: patch(&r.common, location_id),
                    system_type: r.system_type,
                    channels: r.channels,
                    storage_capacity_gb: storage,
                    ..Default::default()
                };
                data.validate()?;
                self.inventory.update_nvr(nvr.core.id, data, ctx.actor).await?;
                Ok(ImportAction::Updated)
            }
            None => {
                let data = CreateNvr {
                    common: fields(&r.common, location_id),
                    system_type: r.system_type,
                    channels: r.channels,
                    storage_capacity_gb: storage,
                    ..Default::default()
                };
                data.validate()?;
                self.inventory.create_nvr(data, ctx.actor).await?;
                Ok(ImportAction::Created)
            }
        }
    }

    async fn apply_ups(
        &self,
        r: &UpsRecord,
        ctx: &mut RowContext<'_>,
        cache: &mut BatchCache,
    ) -> AppResult<ImportAction> {
        let location_id = self.resolve_location(&r.common, ctx, cache).await?;
        let existing = self
            .repository
            .equipment
            .get_by_code::<Ups>(&r.common.code)
            .await?;
        if ctx.dry_run {
            return Ok(if existing.is_some() { ImportAction::Updated } else { ImportAction::Created });
        }

        match existing {
            Some(ups) => {
                let data = UpdateUps {
                    common: patch(&r.common, location_id),
                    capacity_va: r.capacity_va,
                    capacity_watts: r.capacity_watts,
                    battery_count: r.battery_count,
                    runtime_minutes: r.runtime_minutes,
                    ..Default::default()
                };
                data.validate()?;
                self.inventory.update_ups(ups.core.id, data, ctx.actor).await?;
                Ok(ImportAction::Updated)
            }
            None => {
                let data = CreateUps {
                    common: fields(&r.common, location_id),
                    capacity_va: r.capacity_va,
                    capacity_watts: r.capacity_watts,
                    battery_count: r.battery_count,
                    runtime_minutes: r.runtime_minutes,
                    ..Default::default()
                };
                data.validate()?;
                self.inventory.create_ups(data, ctx.actor).await?;
                Ok(ImportAction::Created)
            }
        }
    }

    /// Ticket a failure row was imported into before: by ticket code or sheet
    /// reference, or without a reference by title, equipment and report date
    async fn existing_failure(
        &self,
        r: &FailureRecord,
        equipment_kind: EquipmentKind,
        equipment_id: i32,
    ) -> AppResult<Option<Failure>> {
        let failures = &self.repository.failures;
        match r.reference.as_deref() {
            Some(reference) => match failures.get_by_code(reference).await? {
                Some(found) => Ok(Some(found)),
                None => failures.get_by_external_ref(reference).await,
            },
            None => {
                failures
                    .find_same_report(&r.title, equipment_kind, equipment_id, r.reported_on)
                    .await
            }
        }
    }

    /// Historical tickets are written with their sheet status, without notifications
    async fn apply_failure(&self, r: &FailureRecord, ctx: &mut RowContext<'_>) -> AppResult<ImportAction> {
        let Some(equipment) = r.equipment.as_deref() else {
            return Err(AppError::Import("no affected equipment given".to_string()));
        };
        let mut target = None;
        for kind in EquipmentKind::ALL {
            if let Some(id) = self.find_equipment(*kind, equipment).await? {
                target = Some((*kind, id));
                break;
            }
        }
        let Some((equipment_kind, equipment_id)) = target else {
            return Err(AppError::Import(format!("equipment '{}' not found", equipment)));
        };

        let technician_id = match r.technician.as_deref() {
            Some(name) => {
                let found = self.repository.technicians.find_by_name(name).await?;
                if found.is_none() {
                    ctx.warn(Some("technician"), format!("technician '{}' not found", name));
                }
                found.map(|t| t.id)
            }
            None => None,
        };

        let existing = self
            .existing_failure(r, equipment_kind, equipment_id)
            .await?;
        if ctx.dry_run {
            return Ok(if existing.is_some() { ImportAction::Updated } else { ImportAction::Created });
        }

        if let Some(failure) = existing {
            let data = UpdateFailure {
                title: Some(r.title.clone()),
                description: r.description.clone(),
                category: None,
                priority: r.priority,
                requires_maintenance: None,
            };
            self.repository.failures.update(failure.id, &data).await?;
            return Ok(ImportAction::Updated);
        }

        let data = CreateFailure {
            title: r.title.clone(),
            description: r.description.clone(),
            category: Some(r.title.chars().take(50).collect()),
            priority: r.priority,
            equipment_kind,
            equipment_id,
            assigned_technician_id: technician_id,
            requires_maintenance: None,
            reported_at: r
                .reported_on
                .and_then(|d| d.and_hms_opt(0, 0, 0))
                .map(|dt| dt.and_utc()),
            external_ref: r.reference.clone(),
        };
        data.validate()?;
        let status = r.status.unwrap_or(if technician_id.is_some() {
            FailureStatus::Assigned
        } else {
            FailureStatus::Open
        });

        let mut conn = self.repository.pool.acquire().await?;
        FailuresRepository::insert(&mut conn, &data, status, ctx.actor).await?;
        Ok(ImportAction::Created)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::import::sheet::CellValue;

    #[test]
    fn test_workbook_extension() {
        assert_eq!(workbook_extension("Camaras 2024.XLSX").unwrap(), "xlsx");
        assert_eq!(workbook_extension("legacy.xls").unwrap(), "xls");
        assert!(workbook_extension("export.csv").is_err());
        assert!(workbook_extension("noext").is_err());
    }

    #[test]
    fn test_location_kind_from_columns() {
        let mut record = LocationRecord {
            code: None,
            name: "Biblioteca".to_string(),
            campus: Some("Central".to_string()),
            building: None,
            floor: None,
            latitude: None,
            longitude: None,
            description: None,
        };
        assert_eq!(location_kind(&record), LocationKind::Campus);
        record.building = Some("Biblioteca".to_string());
        assert_eq!(location_kind(&record), LocationKind::Building);
        record.floor = Some("2".to_string());
        assert_eq!(location_kind(&record), LocationKind::Floor);
    }

    #[test]
    fn test_patch_leaves_code_alone() {
        let record = EquipmentRecord {
            code: "CAM-PATIO".to_string(),
            name: "Patio".to_string(),
            brand: None,
            model: None,
            serial_number: None,
            ip_address: Some("10.0.0.4".to_string()),
            mac_address: None,
            status: None,
            campus: None,
            building: None,
            floor: None,
            installed_on: None,
            notes: None,
        };
        let p = patch(&record, Some(3));
        assert_eq!(p.code, None);
        assert_eq!(p.name.as_deref(), Some("Patio"));
        assert_eq!(p.location_id, Some(3));
        assert_eq!(fields(&record, None).code, "CAM-PATIO");
    }

    fn sheet(rows: Vec<Vec<&str>>) -> Sheet {
        Sheet::from_rows(
            "Hoja1",
            rows.into_iter()
                .map(|r| r.into_iter().map(CellValue::from).collect())
                .collect(),
        )
        .unwrap()
    }

    #[test]
    fn test_open_batch_requires_key_column() {
        let s = sheet(vec![vec!["Código", "IP"], vec!["CAM-1", "10.0.0.1"]]);
        let err = open_batch(ImportKind::Cameras, &s, None, false).unwrap_err();
        assert!(matches!(err, AppError::Import(_)));

        let s = sheet(vec![vec!["Nombre", "Color"], vec!["Patio", "gris"]]);
        let (_, report) = open_batch(ImportKind::Cameras, &s, Some("c.xlsx".into()), true).unwrap();
        assert_eq!(report.unmapped_columns, vec!["Color".to_string()]);
        assert!(report.dry_run);
    }

    #[test]
    fn test_stage_rows_counts_skips_and_previews() {
        let s = sheet(vec![
            vec!["Nombre", "IP"],
            vec!["Cámara Patio", "10.0.0.4"],
            vec!["", "10.0.0.5"],
            vec!["Cámara Hall", "999.1.1.1"],
        ]);
        let (map, mut report) = open_batch(ImportKind::Cameras, &s, None, true).unwrap();

        let staged: Vec<_> = s
            .rows
            .iter()
            .map(|row| stage_row(ImportKind::Cameras, &map, row, &mut report).unwrap())
            .collect();

        assert_eq!(report.rows_read, 3);
        assert_eq!(report.skipped, 1);
        assert!(staged[1].is_none());
        assert_eq!(report.preview.len(), 2);
        // The invalid IP is reported against its spreadsheet row
        assert!(report.warnings.iter().any(|w| w.row == 4));
        assert!(report.warnings.iter().any(|w| w.row == 3));
        let Some(Record::Camera(camera)) = &staged[2] else {
            panic!("expected a camera record");
        };
        assert_eq!(camera.common.ip_address, None);
    }

    #[test]
    fn test_stage_row_without_dry_run_keeps_no_preview() {
        let s = sheet(vec![vec!["Nombre"], vec!["Cámara Patio"]]);
        let (map, mut report) = open_batch(ImportKind::Cameras, &s, None, false).unwrap();
        let record = stage_row(ImportKind::Cameras, &map, &s.rows[0], &mut report).unwrap();
        assert!(record.is_some());
        assert!(report.preview.is_empty());
        assert_eq!(report.skipped, 0);
    }
}
