//! Cell cleaning and value normalization for spreadsheet imports

use chrono::{Datelike, Duration, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;
use unicode_normalization::{char::is_combining_mark, UnicodeNormalization};

use super::sheet::CellValue;
use crate::models::enums::{
    CameraType, EquipmentStatus, FailurePriority, FailureStatus, RecorderType,
};

static DISALLOWED: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^\w\s\-.,()]").unwrap());
static SPACES: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());
static IP_DOTTED: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{1,3}(\.\d{1,3}){3}$").unwrap());
static IP_DASHED: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{1,3}(-\d{1,3}){3}$").unwrap());

const DATE_FORMATS: &[&str] = &[
    "%d/%m/%Y", "%Y-%m-%d", "%d-%m-%Y", "%m/%d/%Y", "%d/%m/%y", "%Y/%m/%d", "%d.%m.%Y",
];

/// Largest serial Excel accepts (9999-12-31)
const MAX_EXCEL_SERIAL: f64 = 2_958_465.0;

/// Values spreadsheets and pandas exports use for "nothing"
fn is_placeholder(s: &str) -> bool {
    matches!(s, "" | "nan" | "NaN" | "None" | "none" | "null" | "NULL" | "-")
}

/// Lowercase, no accents, single spaces
pub fn fold(s: &str) -> String {
    let stripped: String = s.nfd().filter(|c| !is_combining_mark(*c)).collect();
    SPACES
        .replace_all(stripped.trim(), " ")
        .to_lowercase()
}

/// Normalize a sheet heading for lookup in the column tables
pub fn normalize_header(s: &str) -> String {
    fold(s)
}

/// Strip stray symbols and collapse whitespace; placeholders become `None`
pub fn clean_text(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if is_placeholder(trimmed) {
        return None;
    }
    let replaced = DISALLOWED.replace_all(trimmed, " ");
    let collapsed = SPACES.replace_all(&replaced, " ");
    let out = collapsed.trim();
    if out.is_empty() {
        None
    } else {
        Some(out.to_string())
    }
}

pub fn cell_text(cell: &CellValue) -> Option<String> {
    match cell {
        CellValue::Empty => None,
        CellValue::Text(s) => clean_text(s),
        CellValue::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => Some(format!("{}", *n as i64)),
        CellValue::Number(n) => Some(n.to_string()),
        CellValue::Bool(b) => Some(b.to_string()),
    }
}

/// IPv4 written with dots or dashes, each octet 0-255.
///
/// `Ok(None)` for a blank cell, `Err` for a value that is not an address.
pub fn clean_ip(raw: &str) -> Result<Option<String>, String> {
    let s = raw.trim();
    if is_placeholder(s) {
        return Ok(None);
    }
    if !(IP_DOTTED.is_match(s) || IP_DASHED.is_match(s)) {
        return Err(format!("invalid IP address '{}'", s));
    }
    let octets: Vec<u16> = s
        .split(['.', '-'])
        .map(|p| p.parse::<u16>().unwrap_or(u16::MAX))
        .collect();
    if octets.iter().any(|o| *o > 255) {
        return Err(format!("IP address '{}' has an octet above 255", s));
    }
    Ok(Some(
        octets
            .iter()
            .map(u16::to_string)
            .collect::<Vec<_>>()
            .join("."),
    ))
}

pub fn cell_ip(cell: &CellValue) -> Result<Option<String>, String> {
    match cell {
        CellValue::Empty => Ok(None),
        CellValue::Text(s) => clean_ip(s),
        other => Err(format!("invalid IP address '{}'", other)),
    }
}

/// Excel serial day number to a date (1900 date system)
pub fn excel_serial_to_date(serial: f64) -> Option<NaiveDate> {
    if !(1.0..=MAX_EXCEL_SERIAL).contains(&serial) {
        return None;
    }
    // Serial 60 is the fictitious 1900-02-29; 1899-12-30 as epoch is right from serial 61 on
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?;
    let days = if serial < 61.0 { serial + 1.0 } else { serial };
    epoch.checked_add_signed(Duration::days(days.trunc() as i64))
}

pub fn parse_date(raw: &str) -> Result<Option<NaiveDate>, String> {
    let s = raw.trim();
    if is_placeholder(s) {
        return Ok(None);
    }
    if s.chars().all(|c| c.is_ascii_digit() || c == '.') && s.chars().any(|c| c.is_ascii_digit()) {
        if let Ok(serial) = s.parse::<f64>() {
            if let Some(date) = excel_serial_to_date(serial) {
                return Ok(Some(date));
            }
        }
    }
    // Datetime text such as "2024-03-15 00:00:00"
    let date_part = s.split_whitespace().next().unwrap_or(s);
    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(date_part, format) {
            // %Y happily reads "24" as year 24; leave two-digit years to %y
            if date.year() < 100 {
                continue;
            }
            return Ok(Some(date));
        }
    }
    Err(format!("unrecognised date '{}'", s))
}

pub fn cell_date(cell: &CellValue) -> Result<Option<NaiveDate>, String> {
    match cell {
        CellValue::Empty => Ok(None),
        CellValue::Number(n) => excel_serial_to_date(*n)
            .map(Some)
            .ok_or_else(|| format!("date serial {} out of range", n)),
        CellValue::Text(s) => parse_date(s),
        CellValue::Bool(_) => Err("a boolean is not a date".to_string()),
    }
}

pub fn cell_int(cell: &CellValue) -> Result<Option<i32>, String> {
    match cell {
        CellValue::Empty => Ok(None),
        CellValue::Number(n) if n.fract() == 0.0 && n.abs() <= i32::MAX as f64 => Ok(Some(*n as i32)),
        CellValue::Number(n) => Err(format!("{} is not a whole number", n)),
        CellValue::Text(s) => {
            let t = s.trim();
            if is_placeholder(t) {
                return Ok(None);
            }
            t.parse::<i32>()
                .map(Some)
                .map_err(|_| format!("'{}' is not a whole number", t))
        }
        CellValue::Bool(_) => Err("a boolean is not a number".to_string()),
    }
}

pub fn cell_float(cell: &CellValue) -> Result<Option<f64>, String> {
    match cell {
        CellValue::Empty => Ok(None),
        CellValue::Number(n) => Ok(Some(*n)),
        CellValue::Text(s) => {
            let t = s.trim();
            if is_placeholder(t) {
                return Ok(None);
            }
            t.replace(',', ".")
                .parse::<f64>()
                .map(Some)
                .map_err(|_| format!("'{}' is not a number", t))
        }
        CellValue::Bool(_) => Err("a boolean is not a number".to_string()),
    }
}

/// Yes/no cells: "si", "sí", "yes", "x", 1
pub fn cell_bool(cell: &CellValue) -> Option<bool> {
    match cell {
        CellValue::Bool(b) => Some(*b),
        CellValue::Number(n) => Some(*n != 0.0),
        CellValue::Text(s) => match fold(s).as_str() {
            "si" | "yes" | "y" | "x" | "true" | "1" => Some(true),
            "no" | "n" | "false" | "0" => Some(false),
            _ => None,
        },
        CellValue::Empty => None,
    }
}

pub fn equipment_status(raw: &str) -> Option<EquipmentStatus> {
    let key = fold(raw);
    let status = match key.as_str() {
        "funcionando" | "funcionando correctamente" | "operativo" | "operativa" | "activo"
        | "activa" | "ok" | "active" | "online" | "en linea" | "conectado" | "conectada" => {
            EquipmentStatus::Active
        }
        "error" | "falla" | "con falla" | "failing" | "fault" | "faulty" | "danado" | "danada" => {
            EquipmentStatus::Failing
        }
        "fuera de servicio" | "inactivo" | "inactiva" | "inactive" | "offline" | "desconectado"
        | "desconectada" | "apagado" | "apagada" | "sin conexion" => EquipmentStatus::Inactive,
        "mantenimiento" | "en mantenimiento" | "maintenance" | "en reparacion" => {
            EquipmentStatus::Maintenance
        }
        "de baja" | "dado de baja" | "retirado" | "decommissioned" => {
            EquipmentStatus::Decommissioned
        }
        _ => return None,
    };
    Some(status)
}

pub fn camera_type(raw: &str) -> Option<CameraType> {
    let key = fold(raw);
    let kind = match key.as_str() {
        "domo" | "dome" | "camara domo" => CameraType::Dome,
        "bullet" | "bala" | "tubo" | "camara bullet" => CameraType::Bullet,
        "ptz" | "camara ptz" | "speed dome" => CameraType::Ptz,
        "fisheye" | "ojo de pez" | "360" | "panoramica" => CameraType::Fisheye,
        "caja" | "box" | "camara caja" => CameraType::Box,
        _ => return None,
    };
    Some(kind)
}

pub fn recorder_type(raw: &str) -> Option<RecorderType> {
    match fold(raw).as_str() {
        "nvr" => Some(RecorderType::Nvr),
        "dvr" => Some(RecorderType::Dvr),
        "hibrido" | "hybrid" | "xvr" => Some(RecorderType::Hybrid),
        _ => None,
    }
}

pub fn priority(raw: &str) -> Option<FailurePriority> {
    let p = match fold(raw).as_str() {
        "baja" | "low" => FailurePriority::Low,
        "media" | "medium" | "normal" => FailurePriority::Medium,
        "alta" | "high" => FailurePriority::High,
        "critica" | "critical" | "urgente" | "urgent" => FailurePriority::Critical,
        _ => return None,
    };
    Some(p)
}

pub fn failure_status(raw: &str) -> Option<FailureStatus> {
    let s = match fold(raw).as_str() {
        "abierta" | "abierto" | "pendiente" | "open" | "reportada" => FailureStatus::Open,
        "asignada" | "asignado" | "assigned" => FailureStatus::Assigned,
        "en proceso" | "en progreso" | "en reparacion" | "in progress" | "in_progress" => {
            FailureStatus::InProgress
        }
        "resuelta" | "resuelto" | "reparada" | "resolved" | "solucionada" => FailureStatus::Resolved,
        "cerrada" | "cerrado" | "closed" => FailureStatus::Closed,
        "cancelada" | "cancelado" | "cancelled" | "anulada" => FailureStatus::Cancelled,
        _ => return None,
    };
    Some(s)
}

/// Code derived from a name: `CAM` + "Acceso Norte 2" -> `CAM-ACCESO-NORTE-2`
pub fn derive_code(prefix: &str, name: &str) -> String {
    let folded = fold(name).to_uppercase();
    let mut slug = String::with_capacity(folded.len());
    for c in folded.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c);
        } else if !slug.ends_with('-') {
            slug.push('-');
        }
    }
    let slug: String = slug.trim_matches('-').chars().take(40).collect();
    format!("{}-{}", prefix, slug.trim_end_matches('-'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_text() {
        assert_eq!(clean_text("  Cámara   Acceso #1 ** "), Some("Cámara Acceso 1".to_string()));
        assert_eq!(clean_text("Edificio (A), piso 2."), Some("Edificio (A), piso 2.".to_string()));
        assert_eq!(clean_text("nan"), None);
        assert_eq!(clean_text("None"), None);
        assert_eq!(clean_text("   "), None);
        assert_eq!(clean_text("@@@"), None);
    }

    #[test]
    fn test_fold_strips_accents() {
        assert_eq!(fold("  Dirección   IP "), "direccion ip");
        assert_eq!(normalize_header("Ubicación/Edificio"), "ubicacion/edificio");
        assert_eq!(fold("CRÍTICA"), "critica");
    }

    #[test]
    fn test_clean_ip() {
        assert_eq!(clean_ip("192.168.1.10"), Ok(Some("192.168.1.10".to_string())));
        assert_eq!(clean_ip(" 10-0-0-7 "), Ok(Some("10.0.0.7".to_string())));
        assert_eq!(clean_ip("010.001.000.009"), Ok(Some("10.1.0.9".to_string())));
        assert_eq!(clean_ip("nan"), Ok(None));
        assert!(clean_ip("192.168.1.256").is_err());
        assert!(clean_ip("192.168.1").is_err());
        assert!(clean_ip("camera-1").is_err());
    }

    #[test]
    fn test_parse_date_formats() {
        let d = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
        for s in [
            "15/03/2024",
            "2024-03-15",
            "15-03-2024",
            "15/03/24",
            "2024/03/15",
            "15.03.2024",
            "2024-03-15 00:00:00",
        ] {
            assert_eq!(parse_date(s), Ok(Some(d)), "{s}");
        }
        // day-first wins, month-first only when the day-first reading fails
        assert_eq!(
            parse_date("03/15/2024"),
            Ok(Some(NaiveDate::from_ymd_opt(2024, 3, 15).unwrap()))
        );
        assert_eq!(parse_date(""), Ok(None));
        assert!(parse_date("yesterday").is_err());
    }

    #[test]
    fn test_excel_serials() {
        assert_eq!(excel_serial_to_date(45366.0), NaiveDate::from_ymd_opt(2024, 3, 15));
        assert_eq!(excel_serial_to_date(1.0), NaiveDate::from_ymd_opt(1900, 1, 1));
        assert_eq!(excel_serial_to_date(0.0), None);
        assert_eq!(parse_date("45366"), Ok(NaiveDate::from_ymd_opt(2024, 3, 15)));
        assert_eq!(cell_date(&CellValue::Number(45366.5)), Ok(NaiveDate::from_ymd_opt(2024, 3, 15)));
    }

    #[test]
    fn test_cell_numbers() {
        assert_eq!(cell_int(&CellValue::Number(24.0)), Ok(Some(24)));
        assert_eq!(cell_int(&CellValue::Text(" 8 ".into())), Ok(Some(8)));
        assert!(cell_int(&CellValue::Number(2.5)).is_err());
        assert_eq!(cell_float(&CellValue::Text("-38,74".into())), Ok(Some(-38.74)));
        assert_eq!(cell_text(&CellValue::Number(12.0)), Some("12".to_string()));
    }

    #[test]
    fn test_lookup_tables() {
        assert_eq!(equipment_status("Funcionando"), Some(EquipmentStatus::Active));
        assert_eq!(equipment_status("FUERA DE SERVICIO"), Some(EquipmentStatus::Inactive));
        assert_eq!(equipment_status("Mantenimiento"), Some(EquipmentStatus::Maintenance));
        assert_eq!(equipment_status("desconocido"), None);
        assert_eq!(camera_type("Domo"), Some(CameraType::Dome));
        assert_eq!(camera_type("PTZ"), Some(CameraType::Ptz));
        assert_eq!(priority("Crítica"), Some(FailurePriority::Critical));
        assert_eq!(priority("urgente"), Some(FailurePriority::Critical));
        assert_eq!(failure_status("En proceso"), Some(FailureStatus::InProgress));
        assert_eq!(recorder_type("DVR"), Some(RecorderType::Dvr));
    }

    #[test]
    fn test_derive_code() {
        assert_eq!(derive_code("CAM", "Acceso Norte 2"), "CAM-ACCESO-NORTE-2");
        assert_eq!(derive_code("SW", "  Edificio Química / Piso 1 "), "SW-EDIFICIO-QUIMICA-PISO-1");
        assert_eq!(derive_code("NVR", "nvr#1"), "NVR-NVR-1");
    }
}
