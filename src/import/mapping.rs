//! Heading tables and row-to-record mapping for each import kind

use std::collections::HashMap;

use chrono::NaiveDate;
use serde::Serialize;

use super::{
    clean::{self, normalize_header},
    sheet::{CellValue, SheetRow},
};
use crate::models::{
    enums::{CameraType, EquipmentKind, EquipmentStatus, FailurePriority, FailureStatus, RecorderType},
    import_report::ImportKind,
};

/// Target field of a spreadsheet column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Code,
    Name,
    Brand,
    Model,
    Serial,
    Ip,
    Mac,
    Status,
    Campus,
    Building,
    Floor,
    Zone,
    Latitude,
    Longitude,
    InstalledOn,
    Notes,
    CameraType,
    Resolution,
    Nvr,
    NvrChannel,
    Switch,
    SwitchPort,
    Poe,
    TotalPorts,
    PoePorts,
    Managed,
    RecorderType,
    Channels,
    StorageGb,
    CapacityVa,
    CapacityWatts,
    Batteries,
    RuntimeMinutes,
    Reference,
    ReportedOn,
    Title,
    Description,
    Priority,
    FailureStatus,
    Equipment,
    Technician,
}

// Headings are written already normalized (lowercase, no accents)
const COMMON: &[(&str, Field)] = &[
    ("codigo", Field::Code),
    ("code", Field::Code),
    ("marca", Field::Brand),
    ("brand", Field::Brand),
    ("modelo", Field::Model),
    ("model", Field::Model),
    ("numero de serie", Field::Serial),
    ("serie", Field::Serial),
    ("serial", Field::Serial),
    ("mac", Field::Mac),
    ("direccion mac", Field::Mac),
    ("estado", Field::Status),
    ("estado de funcionamiento", Field::Status),
    ("status", Field::Status),
    ("campus", Field::Campus),
    ("edificio", Field::Building),
    ("campus/edificio", Field::Building),
    ("ubicacion", Field::Building),
    ("building", Field::Building),
    ("location", Field::Building),
    ("piso", Field::Floor),
    ("piso/nivel", Field::Floor),
    ("floor", Field::Floor),
    ("fecha de instalacion", Field::InstalledOn),
    ("installed on", Field::InstalledOn),
    ("observaciones", Field::Notes),
    ("notas", Field::Notes),
    ("notes", Field::Notes),
];

const LOCATIONS: &[(&str, Field)] = &[
    ("codigo", Field::Code),
    ("code", Field::Code),
    ("nombre", Field::Name),
    ("name", Field::Name),
    ("campus", Field::Campus),
    ("edificio", Field::Building),
    ("building", Field::Building),
    ("piso", Field::Floor),
    ("piso/nivel", Field::Floor),
    ("floor", Field::Floor),
    ("zona", Field::Zone),
    ("zone", Field::Zone),
    ("latitud", Field::Latitude),
    ("latitude", Field::Latitude),
    ("longitud", Field::Longitude),
    ("longitude", Field::Longitude),
    ("descripcion", Field::Notes),
    ("description", Field::Notes),
];

const CAMERAS: &[(&str, Field)] = &[
    ("nombre de camara", Field::Name),
    ("nombre", Field::Name),
    ("camara", Field::Name),
    ("name", Field::Name),
    ("ip de camara", Field::Ip),
    ("ip", Field::Ip),
    ("direccion ip", Field::Ip),
    ("ip address", Field::Ip),
    ("tipo de camara", Field::CameraType),
    ("tipo", Field::CameraType),
    ("camera type", Field::CameraType),
    ("resolucion", Field::Resolution),
    ("resolution", Field::Resolution),
    ("nvr asociado (camara)", Field::Nvr),
    ("nvr asociado", Field::Nvr),
    ("nvr", Field::Nvr),
    ("canal nvr", Field::NvrChannel),
    ("canal", Field::NvrChannel),
    ("channel", Field::NvrChannel),
    ("switch", Field::Switch),
    ("switch asociado", Field::Switch),
    ("puerto switch", Field::SwitchPort),
    ("puerto", Field::SwitchPort),
    ("port", Field::SwitchPort),
    ("poe", Field::Poe),
    ("latitud", Field::Latitude),
    ("latitude", Field::Latitude),
    ("longitud", Field::Longitude),
    ("longitude", Field::Longitude),
];

const SWITCHES: &[(&str, Field)] = &[
    ("nombre switch", Field::Name),
    ("nombre", Field::Name),
    ("name", Field::Name),
    ("id switch", Field::Code),
    ("ip switch", Field::Ip),
    ("ip", Field::Ip),
    ("direccion ip", Field::Ip),
    ("numero de puertos", Field::TotalPorts),
    ("puertos", Field::TotalPorts),
    ("total ports", Field::TotalPorts),
    ("puertos poe", Field::PoePorts),
    ("poe ports", Field::PoePorts),
    ("administrable", Field::Managed),
    ("managed", Field::Managed),
];

const NVRS: &[(&str, Field)] = &[
    ("id nvr", Field::Code),
    ("nombre nvr", Field::Name),
    ("nombre", Field::Name),
    ("name", Field::Name),
    ("ip nvr", Field::Ip),
    ("ip", Field::Ip),
    ("direccion ip", Field::Ip),
    ("tipo", Field::RecorderType),
    ("tipo de sistema", Field::RecorderType),
    ("system type", Field::RecorderType),
    ("numero de canales", Field::Channels),
    ("canales", Field::Channels),
    ("channels", Field::Channels),
    ("almacenamiento (gb)", Field::StorageGb),
    ("capacidad de almacenamiento", Field::StorageGb),
    ("storage gb", Field::StorageGb),
];

const UPS: &[(&str, Field)] = &[
    ("id ups", Field::Code),
    ("nombre ups", Field::Name),
    ("nombre", Field::Name),
    ("name", Field::Name),
    ("ip ups", Field::Ip),
    ("ip", Field::Ip),
    ("capacidad (va)", Field::CapacityVa),
    ("capacidad va", Field::CapacityVa),
    ("capacity va", Field::CapacityVa),
    ("capacidad (w)", Field::CapacityWatts),
    ("potencia (w)", Field::CapacityWatts),
    ("capacity watts", Field::CapacityWatts),
    ("baterias", Field::Batteries),
    ("numero de baterias", Field::Batteries),
    ("batteries", Field::Batteries),
    ("autonomia (min)", Field::RuntimeMinutes),
    ("autonomia", Field::RuntimeMinutes),
    ("runtime minutes", Field::RuntimeMinutes),
];

const FAILURES: &[(&str, Field)] = &[
    ("id falla", Field::Reference),
    ("codigo", Field::Reference),
    ("fecha de reporte", Field::ReportedOn),
    ("fecha", Field::ReportedOn),
    ("reported on", Field::ReportedOn),
    ("tipo de falla", Field::Title),
    ("titulo", Field::Title),
    ("title", Field::Title),
    ("camara afectada", Field::Equipment),
    ("equipo afectado", Field::Equipment),
    ("equipment", Field::Equipment),
    ("ubicacion", Field::Building),
    ("edificio", Field::Building),
    ("descripcion", Field::Description),
    ("description", Field::Description),
    ("estado", Field::FailureStatus),
    ("status", Field::FailureStatus),
    ("prioridad", Field::Priority),
    ("priority", Field::Priority),
    ("tecnico asignado", Field::Technician),
    ("tecnico", Field::Technician),
    ("technician", Field::Technician),
];

fn table(kind: ImportKind) -> Vec<(&'static str, Field)> {
    let specific: &[(&str, Field)] = match kind {
        ImportKind::Locations => return LOCATIONS.to_vec(),
        ImportKind::Failures => return FAILURES.to_vec(),
        ImportKind::Cameras => CAMERAS,
        ImportKind::Switches => SWITCHES,
        ImportKind::Nvrs => NVRS,
        ImportKind::Ups => UPS,
    };
    specific.iter().chain(COMMON).copied().collect()
}

/// Which column feeds which field
#[derive(Debug, Clone, Default)]
pub struct ColumnMap {
    columns: HashMap<Field, (usize, String)>,
    pub unmapped: Vec<String>,
}

impl ColumnMap {
    pub fn new(kind: ImportKind, headers: &[String]) -> Self {
        let lookup: HashMap<&str, Field> = table(kind).into_iter().rev().collect();
        let mut map = Self::default();
        for (index, heading) in headers.iter().enumerate() {
            if heading.trim().is_empty() {
                continue;
            }
            match lookup.get(normalize_header(heading).as_str()) {
                // first column wins when two headings feed the same field
                Some(field) if !map.columns.contains_key(field) => {
                    map.columns.insert(*field, (index, heading.clone()));
                }
                Some(_) => {}
                None => map.unmapped.push(heading.clone()),
            }
        }
        map
    }

    pub fn has(&self, field: Field) -> bool {
        self.columns.contains_key(&field)
    }
}

/// Reads typed values out of one row and collects cleaning warnings
pub struct RowReader<'a> {
    map: &'a ColumnMap,
    row: &'a SheetRow,
    pub warnings: Vec<(Option<String>, String)>,
}

impl<'a> RowReader<'a> {
    pub fn new(map: &'a ColumnMap, row: &'a SheetRow) -> Self {
        Self {
            map,
            row,
            warnings: Vec::new(),
        }
    }

    fn cell(&self, field: Field) -> Option<(&'a CellValue, &'a str)> {
        self.map
            .columns
            .get(&field)
            .map(|(index, heading)| (self.row.cell(*index), heading.as_str()))
    }

    fn warn(&mut self, heading: &str, message: String) {
        self.warnings.push((Some(heading.to_string()), message));
    }

    pub fn text(&self, field: Field) -> Option<String> {
        self.cell(field).and_then(|(cell, _)| clean::cell_text(cell))
    }

    pub fn ip(&mut self, field: Field) -> Option<String> {
        let (cell, heading) = self.cell(field)?;
        match clean::cell_ip(cell) {
            Ok(ip) => ip,
            Err(message) => {
                self.warn(heading, message);
                None
            }
        }
    }

    pub fn date(&mut self, field: Field) -> Option<NaiveDate> {
        let (cell, heading) = self.cell(field)?;
        match clean::cell_date(cell) {
            Ok(date) => date,
            Err(message) => {
                self.warn(heading, message);
                None
            }
        }
    }

    pub fn int(&mut self, field: Field) -> Option<i32> {
        let (cell, heading) = self.cell(field)?;
        match clean::cell_int(cell) {
            Ok(value) => value,
            Err(message) => {
                self.warn(heading, message);
                None
            }
        }
    }

    pub fn float(&mut self, field: Field) -> Option<f64> {
        let (cell, heading) = self.cell(field)?;
        match clean::cell_float(cell) {
            Ok(value) => value,
            Err(message) => {
                self.warn(heading, message);
                None
            }
        }
    }

    pub fn flag(&self, field: Field) -> Option<bool> {
        self.cell(field).and_then(|(cell, _)| clean::cell_bool(cell))
    }

    /// Text run through a lookup table; unknown values are dropped with a warning
    pub fn lookup<T>(&mut self, field: Field, what: &str, parse: fn(&str) -> Option<T>) -> Option<T> {
        let (cell, heading) = self.cell(field)?;
        let raw = clean::cell_text(cell)?;
        let value = parse(&raw);
        if value.is_none() {
            self.warn(heading, format!("unknown {} '{}'", what, raw));
        }
        value
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct LocationRecord {
    pub code: Option<String>,
    pub name: String,
    pub campus: Option<String>,
    pub building: Option<String>,
    pub floor: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub description: Option<String>,
}

/// Columns every equipment sheet shares
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct EquipmentRecord {
    pub code: String,
    pub name: String,
    pub brand: Option<String>,
    pub model: Option<String>,
    pub serial_number: Option<String>,
    pub ip_address: Option<String>,
    pub mac_address: Option<String>,
    pub status: Option<EquipmentStatus>,
    pub campus: Option<String>,
    pub building: Option<String>,
    pub floor: Option<String>,
    pub installed_on: Option<NaiveDate>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CameraRecord {
    #[serde(flatten)]
    pub common: EquipmentRecord,
    pub camera_type: Option<CameraType>,
    pub resolution: Option<String>,
    /// Recorder code or name as written in the sheet
    pub nvr: Option<String>,
    pub nvr_channel: Option<i32>,
    pub switch: Option<String>,
    pub switch_port: Option<i32>,
    pub poe: Option<bool>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SwitchRecord {
    #[serde(flatten)]
    pub common: EquipmentRecord,
    pub total_ports: Option<i32>,
    pub poe_ports: Option<i32>,
    pub managed: Option<bool>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct NvrRecord {
    #[serde(flatten)]
    pub common: EquipmentRecord,
    pub system_type: Option<RecorderType>,
    pub channels: Option<i32>,
    pub storage_capacity_gb: Option<f64>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct UpsRecord {
    #[serde(flatten)]
    pub common: EquipmentRecord,
    pub capacity_va: Option<i32>,
    pub capacity_watts: Option<i32>,
    pub battery_count: Option<i32>,
    pub runtime_minutes: Option<i32>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct FailureRecord {
    /// Identifier from the sheet; matched against ticket codes and earlier imports
    pub reference: Option<String>,
    pub title: String,
    pub description: Option<String>,
    pub priority: Option<FailurePriority>,
    pub status: Option<FailureStatus>,
    pub reported_on: Option<NaiveDate>,
    /// Affected camera, by code or name
    pub equipment: Option<String>,
    pub building: Option<String>,
    pub technician: Option<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(untagged)]
pub enum Record {
    Location(LocationRecord),
    Camera(CameraRecord),
    Switch(SwitchRecord),
    Nvr(NvrRecord),
    Ups(UpsRecord),
    Failure(FailureRecord),
}

/// Result of mapping one row: the record (unless skipped) and its warnings
#[derive(Debug)]
pub struct MappedRow {
    pub record: Option<Record>,
    pub warnings: Vec<(Option<String>, String)>,
}

fn equipment_kind(kind: ImportKind) -> Option<EquipmentKind> {
    match kind {
        ImportKind::Cameras => Some(EquipmentKind::Camera),
        ImportKind::Switches => Some(EquipmentKind::Switch),
        ImportKind::Nvrs => Some(EquipmentKind::Nvr),
        ImportKind::Ups => Some(EquipmentKind::Ups),
        ImportKind::Locations | ImportKind::Failures => None,
    }
}

fn read_common(reader: &mut RowReader<'_>, name: String, prefix: &str) -> EquipmentRecord {
    let code = reader
        .text(Field::Code)
        .map(|c| c.to_uppercase())
        .unwrap_or_else(|| clean::derive_code(prefix, &name));
    EquipmentRecord {
        code,
        name,
        brand: reader.text(Field::Brand),
        model: reader.text(Field::Model),
        serial_number: reader.text(Field::Serial),
        ip_address: reader.ip(Field::Ip),
        mac_address: reader.text(Field::Mac),
        status: reader.lookup(Field::Status, "status", clean::equipment_status),
        campus: reader.text(Field::Campus),
        building: reader.text(Field::Building),
        floor: reader.text(Field::Floor),
        installed_on: reader.date(Field::InstalledOn),
        notes: reader.text(Field::Notes),
    }
}

fn location_name(reader: &RowReader<'_>) -> Option<String> {
    if let Some(name) = reader.text(Field::Name) {
        return Some(name);
    }
    let parts: Vec<String> = [Field::Building, Field::Floor, Field::Zone]
        .into_iter()
        .filter_map(|f| reader.text(f))
        .collect();
    if parts.is_empty() {
        None
    } else {
        Some(parts.join(" - "))
    }
}

/// Clean one row into a record of the given kind
pub fn map_row(kind: ImportKind, map: &ColumnMap, row: &SheetRow) -> MappedRow {
    let mut reader = RowReader::new(map, row);

    let record = match kind {
        ImportKind::Locations => location_name(&reader).map(|name| {
            let description = match (reader.text(Field::Zone), reader.text(Field::Notes)) {
                (Some(zone), Some(notes)) => Some(format!("{}. {}", zone, notes)),
                (zone, notes) => zone.or(notes),
            };
            Record::Location(LocationRecord {
                code: reader.text(Field::Code).map(|c| c.to_uppercase()),
                name,
                campus: reader.text(Field::Campus),
                building: reader.text(Field::Building),
                floor: reader.text(Field::Floor),
                latitude: reader.float(Field::Latitude),
                longitude: reader.float(Field::Longitude),
                description,
            })
        }),
        ImportKind::Failures => reader.text(Field::Title).map(|title| {
            Record::Failure(FailureRecord {
                reference: reader.text(Field::Reference),
                title,
                description: reader.text(Field::Description),
                priority: reader.lookup(Field::Priority, "priority", clean::priority),
                status: reader.lookup(Field::FailureStatus, "status", clean::failure_status),
                reported_on: reader.date(Field::ReportedOn),
                equipment: reader.text(Field::Equipment),
                building: reader.text(Field::Building),
                technician: reader.text(Field::Technician),
            })
        }),
        _ => match (reader.text(Field::Name), equipment_kind(kind)) {
            (Some(name), Some(eq)) => {
                let common = read_common(&mut reader, name, eq.code_prefix());
                Some(match kind {
                    ImportKind::Cameras => Record::Camera(CameraRecord {
                        common,
                        camera_type: reader.lookup(Field::CameraType, "camera type", clean::camera_type),
                        resolution: reader.text(Field::Resolution),
                        nvr: reader.text(Field::Nvr),
                        nvr_channel: reader.int(Field::NvrChannel),
                        switch: reader.text(Field::Switch),
                        switch_port: reader.int(Field::SwitchPort),
                        poe: reader.flag(Field::Poe),
                        latitude: reader.float(Field::Latitude),
                        longitude: reader.float(Field::Longitude),
                    }),
                    ImportKind::Switches => Record::Switch(SwitchRecord {
                        common,
                        total_ports: reader.int(Field::TotalPorts),
                        poe_ports: reader.int(Field::PoePorts),
                        managed: reader.flag(Field::Managed),
                    }),
                    ImportKind::Nvrs => Record::Nvr(NvrRecord {
                        common,
                        system_type: reader.lookup(Field::RecorderType, "recorder type", clean::recorder_type),
                        channels: reader.int(Field::Channels),
                        storage_capacity_gb: reader.float(Field::StorageGb),
                    }),
                    _ => Record::Ups(UpsRecord {
                        common,
                        capacity_va: reader.int(Field::CapacityVa),
                        capacity_watts: reader.int(Field::CapacityWatts),
                        battery_count: reader.int(Field::Batteries),
                        runtime_minutes: reader.int(Field::RuntimeMinutes),
                    }),
                })
            }
            _ => None,
        },
    };

    let mut warnings = reader.warnings;
    if record.is_none() {
        let missing = if kind == ImportKind::Failures { "title" } else { "name" };
        warnings.push((None, format!("row has no {}, skipped", missing)));
    }
    MappedRow { record, warnings }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::import::sheet::Sheet;

    fn sheet(rows: Vec<Vec<&str>>) -> Sheet {
        Sheet::from_rows(
            "test",
            rows.into_iter()
                .map(|r| r.into_iter().map(CellValue::from).collect())
                .collect(),
        )
        .unwrap()
    }

    #[test]
    fn test_column_map_normalizes_headings() {
        let headers: Vec<String> = [
            " Nombre de Cámara ",
            "IP de Cámara",
            "Campus/Edificio",
            "NVR Asociado (Cámara)",
            "Tipo de Cámara",
            "Estado de Funcionamiento",
            "Observaciones",
            "Columna Rara",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();
        let map = ColumnMap::new(ImportKind::Cameras, &headers);
        for field in [
            Field::Name,
            Field::Ip,
            Field::Building,
            Field::Nvr,
            Field::CameraType,
            Field::Status,
            Field::Notes,
        ] {
            assert!(map.has(field), "{field:?}");
        }
        assert_eq!(map.unmapped, vec!["Columna Rara".to_string()]);
    }

    #[test]
    fn test_first_column_wins() {
        let headers = vec!["Nombre".to_string(), "Name".to_string()];
        let map = ColumnMap::new(ImportKind::Cameras, &headers);
        let row = SheetRow {
            number: 2,
            cells: vec!["Primary".into(), "Secondary".into()],
        };
        let reader = RowReader::new(&map, &row);
        assert_eq!(reader.text(Field::Name).as_deref(), Some("Primary"));
    }

    #[test]
    fn test_camera_row() {
        let s = sheet(vec![
            vec!["Nombre de Cámara", "IP de Cámara", "Tipo de Cámara", "Estado", "Campus/Edificio"],
            vec!["Acceso Norte", "10-1-2-3", "Domo", "Funcionando", "Biblioteca"],
        ]);
        let map = ColumnMap::new(ImportKind::Cameras, &s.headers);
        let mapped = map_row(ImportKind::Cameras, &map, &s.rows[0]);
        assert!(mapped.warnings.is_empty(), "{:?}", mapped.warnings);
        let Some(Record::Camera(camera)) = mapped.record else {
            panic!("expected a camera record");
        };
        assert_eq!(camera.common.code, "CAM-ACCESO-NORTE");
        assert_eq!(camera.common.ip_address.as_deref(), Some("10.1.2.3"));
        assert_eq!(camera.common.status, Some(EquipmentStatus::Active));
        assert_eq!(camera.common.building.as_deref(), Some("Biblioteca"));
        assert_eq!(camera.camera_type, Some(CameraType::Dome));
    }

    #[test]
    fn test_bad_values_become_null_with_warnings() {
        let s = sheet(vec![
            vec!["Nombre", "IP", "Tipo de Cámara", "Fecha de Instalación"],
            vec!["Patio", "300.1.1.1", "Robot", "someday"],
        ]);
        let map = ColumnMap::new(ImportKind::Cameras, &s.headers);
        let mapped = map_row(ImportKind::Cameras, &map, &s.rows[0]);
        let Some(Record::Camera(camera)) = mapped.record else {
            panic!("expected a camera record");
        };
        assert_eq!(camera.common.ip_address, None);
        assert_eq!(camera.camera_type, None);
        assert_eq!(camera.common.installed_on, None);
        assert_eq!(mapped.warnings.len(), 3);
        assert_eq!(mapped.warnings[0].0.as_deref(), Some("IP"));
    }

    #[test]
    fn test_row_without_name_is_skipped() {
        let s = sheet(vec![vec!["Nombre NVR", "IP NVR"], vec!["", "10.0.0.9"]]);
        let map = ColumnMap::new(ImportKind::Nvrs, &s.headers);
        let mapped = map_row(ImportKind::Nvrs, &map, &s.rows[0]);
        assert!(mapped.record.is_none());
        assert_eq!(mapped.warnings.len(), 1);
    }

    #[test]
    fn test_nvr_row_keeps_sheet_code() {
        let s = sheet(vec![
            vec!["ID NVR", "Nombre NVR", "IP NVR", "Marca", "Modelo", "Número de Canales"],
            vec!["nvr-01", "Grabador Central", "192.168.10.5", "Hikvision", "DS-7732", "32"],
        ]);
        let map = ColumnMap::new(ImportKind::Nvrs, &s.headers);
        let Some(Record::Nvr(nvr)) = map_row(ImportKind::Nvrs, &map, &s.rows[0]).record else {
            panic!("expected an nvr record");
        };
        assert_eq!(nvr.common.code, "NVR-01");
        assert_eq!(nvr.channels, Some(32));
        assert_eq!(nvr.common.brand.as_deref(), Some("Hikvision"));
    }

    #[test]
    fn test_failure_row() {
        let s = sheet(vec![
            vec![
                "ID Falla",
                "Fecha de Reporte",
                "Tipo de Falla",
                "Cámara Afectada",
                "Ubicación",
                "Descripción",
                "Estado",
                "Prioridad",
                "Técnico Asignado",
            ],
            vec![
                "17",
                "05/02/2024",
                "Sin video",
                "CAM-PATIO",
                "Edificio A",
                "Pantalla negra",
                "Cerrada",
                "Alta",
                "Juan Pérez",
            ],
        ]);
        let map = ColumnMap::new(ImportKind::Failures, &s.headers);
        let Some(Record::Failure(f)) = map_row(ImportKind::Failures, &map, &s.rows[0]).record else {
            panic!("expected a failure record");
        };
        assert_eq!(f.title, "Sin video");
        assert_eq!(f.reported_on, NaiveDate::from_ymd_opt(2024, 2, 5));
        assert_eq!(f.status, Some(FailureStatus::Closed));
        assert_eq!(f.priority, Some(FailurePriority::High));
        assert_eq!(f.technician.as_deref(), Some("Juan Pérez"));
    }

    #[test]
    fn test_location_name_from_parts() {
        let s = sheet(vec![
            vec!["Campus", "Edificio", "Piso/Nivel", "Zona"],
            vec!["Central", "Biblioteca", "2", "Sala de lectura"],
        ]);
        let map = ColumnMap::new(ImportKind::Locations, &s.headers);
        let Some(Record::Location(l)) = map_row(ImportKind::Locations, &map, &s.rows[0]).record
        else {
            panic!("expected a location record");
        };
        assert_eq!(l.name, "Biblioteca - 2 - Sala de lectura");
        assert_eq!(l.campus.as_deref(), Some("Central"));
        assert_eq!(l.description.as_deref(), Some("Sala de lectura"));
    }
}
