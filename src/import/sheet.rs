//! Workbook reading: one worksheet becomes a header row plus numbered data rows

use std::{fmt, path::Path};

use calamine::{open_workbook_auto, Data, Reader};

#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
}

impl CellValue {
    pub fn is_empty(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Empty => Ok(()),
            CellValue::Text(s) => write!(f, "{}", s),
            CellValue::Number(n) => write!(f, "{}", n),
            CellValue::Bool(b) => write!(f, "{}", b),
        }
    }
}

impl From<&Data> for CellValue {
    fn from(data: &Data) -> Self {
        match data {
            Data::Empty => CellValue::Empty,
            Data::String(s) => CellValue::Text(s.clone()),
            Data::Float(f) => CellValue::Number(*f),
            Data::Int(i) => CellValue::Number(*i as f64),
            Data::Bool(b) => CellValue::Bool(*b),
            Data::DateTime(dt) => CellValue::Number(dt.as_f64()),
            Data::Error(_) => CellValue::Empty,
            other => CellValue::Text(other.to_string()),
        }
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        if s.is_empty() {
            CellValue::Empty
        } else {
            CellValue::Text(s.to_string())
        }
    }
}

#[derive(Debug, Clone)]
pub struct SheetRow {
    /// 1-based spreadsheet row number, header included
    pub number: usize,
    pub cells: Vec<CellValue>,
}

impl SheetRow {
    pub fn cell(&self, index: usize) -> &CellValue {
        self.cells.get(index).unwrap_or(&CellValue::Empty)
    }
}

#[derive(Debug, Clone, Default)]
pub struct Sheet {
    pub name: String,
    pub headers: Vec<String>,
    pub rows: Vec<SheetRow>,
}

#[derive(Debug, thiserror::Error)]
pub enum SheetError {
    #[error("cannot open workbook: {0}")]
    Open(String),
    #[error("worksheet '{0}' not found")]
    MissingSheet(String),
    #[error("workbook has no worksheets")]
    NoSheets,
    #[error("worksheet '{0}' has no header row")]
    NoHeader(String),
}

impl Sheet {
    /// Build from a header row and data rows; blank rows are dropped
    pub fn from_rows(name: &str, mut rows: Vec<Vec<CellValue>>) -> Result<Self, SheetError> {
        // Leading blank lines before the header are common in hand-made sheets
        let header_at = rows
            .iter()
            .position(|r| r.iter().any(|c| !c.is_empty()))
            .ok_or_else(|| SheetError::NoHeader(name.to_string()))?;
        let data = rows.split_off(header_at + 1);
        let headers = rows
            .pop()
            .unwrap_or_default()
            .iter()
            .map(|c| c.to_string().trim().to_string())
            .collect();

        let rows = data
            .into_iter()
            .enumerate()
            .filter(|(_, cells)| cells.iter().any(|c| !c.is_empty()))
            .map(|(i, cells)| SheetRow {
                number: header_at + i + 2,
                cells,
            })
            .collect();

        Ok(Self {
            name: name.to_string(),
            headers,
            rows,
        })
    }
}

/// Read one worksheet, the first one when no name is given.
///
/// Blocking; call it from `spawn_blocking` inside the server.
pub fn read_workbook(path: &Path, sheet: Option<&str>) -> Result<Sheet, SheetError> {
    let mut workbook = open_workbook_auto(path).map_err(|e| SheetError::Open(e.to_string()))?;
    let names = workbook.sheet_names();
    let name = match sheet {
        Some(wanted) => names
            .iter()
            .find(|n| n.trim().eq_ignore_ascii_case(wanted.trim()))
            .cloned()
            .ok_or_else(|| SheetError::MissingSheet(wanted.to_string()))?,
        None => names.first().cloned().ok_or(SheetError::NoSheets)?,
    };
    let range = workbook
        .worksheet_range(&name)
        .map_err(|e| SheetError::Open(e.to_string()))?;

    let rows = range
        .rows()
        .map(|row| row.iter().map(CellValue::from).collect())
        .collect();
    Sheet::from_rows(&name, rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text_row(cells: &[&str]) -> Vec<CellValue> {
        cells.iter().map(|c| CellValue::from(*c)).collect()
    }

    #[test]
    fn test_from_rows_numbers_and_blanks() {
        let sheet = Sheet::from_rows(
            "Cámaras",
            vec![
                text_row(&["", ""]),
                text_row(&[" Nombre de Cámara ", "IP de Cámara"]),
                text_row(&["Acceso", "10.0.0.1"]),
                text_row(&["", " "]),
                text_row(&["Patio", ""]),
            ],
        )
        .unwrap();

        assert_eq!(sheet.headers, vec!["Nombre de Cámara", "IP de Cámara"]);
        assert_eq!(sheet.rows.len(), 2);
        assert_eq!(sheet.rows[0].number, 3);
        assert_eq!(sheet.rows[1].number, 5);
        assert_eq!(sheet.rows[1].cell(1), &CellValue::Empty);
        assert_eq!(sheet.rows[1].cell(7), &CellValue::Empty);
    }

    #[test]
    fn test_empty_sheet_has_no_header() {
        assert!(matches!(
            Sheet::from_rows("x", vec![]),
            Err(SheetError::NoHeader(_))
        ));
    }

    #[test]
    fn test_data_conversion() {
        assert_eq!(CellValue::from(&Data::Int(8)), CellValue::Number(8.0));
        assert_eq!(
            CellValue::from(&Data::String("PTZ".into())),
            CellValue::Text("PTZ".into())
        );
        assert_eq!(CellValue::from(&Data::Empty), CellValue::Empty);
    }
}
