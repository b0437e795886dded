//! Spreadsheet import report models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Kind of sheet being imported
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ImportKind {
    Locations,
    Cameras,
    Switches,
    Nvrs,
    Ups,
    Failures,
}

impl ImportKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImportKind::Locations => "locations",
            ImportKind::Cameras => "cameras",
            ImportKind::Switches => "switches",
            ImportKind::Nvrs => "nvrs",
            ImportKind::Ups => "ups",
            ImportKind::Failures => "failures",
        }
    }
}

impl std::str::FromStr for ImportKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "locations" | "ubicaciones" => Ok(ImportKind::Locations),
            "cameras" | "camaras" => Ok(ImportKind::Cameras),
            "switches" => Ok(ImportKind::Switches),
            "nvrs" | "nvr" | "dvr" => Ok(ImportKind::Nvrs),
            "ups" => Ok(ImportKind::Ups),
            "failures" | "fallas" => Ok(ImportKind::Failures),
            _ => Err(format!("Unknown import kind: {}", s)),
        }
    }
}

impl std::fmt::Display for ImportKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// What happened to one spreadsheet row
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ImportAction {
    Created,
    Updated,
    Skipped,
}

/// Problem found while cleaning a row
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct RowWarning {
    /// 1-based row number as shown in the spreadsheet
    pub row: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub column: Option<String>,
    pub message: String,
}

/// Report returned after an import batch
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ImportReport {
    pub batch_id: Uuid,
    pub kind: ImportKind,
    pub file_name: Option<String>,
    pub dry_run: bool,
    pub rows_read: usize,
    pub created: usize,
    pub updated: usize,
    pub skipped: usize,
    /// Spreadsheet headings that matched no known column
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub unmapped_columns: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<RowWarning>,
    /// Cleaned records, only filled on dry runs
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    #[schema(value_type = Vec<Object>)]
    pub preview: Vec<serde_json::Value>,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
}

impl ImportReport {
    pub fn new(kind: ImportKind, file_name: Option<String>, dry_run: bool) -> Self {
        Self {
            batch_id: Uuid::new_v4(),
            kind,
            file_name,
            dry_run,
            rows_read: 0,
            created: 0,
            updated: 0,
            skipped: 0,
            unmapped_columns: Vec::new(),
            warnings: Vec::new(),
            preview: Vec::new(),
            started_at: Utc::now(),
            finished_at: None,
        }
    }

    pub fn record(&mut self, action: ImportAction) {
        match action {
            ImportAction::Created => self.created += 1,
            ImportAction::Updated => self.updated += 1,
            ImportAction::Skipped => self.skipped += 1,
        }
    }

    pub fn warn(&mut self, row: usize, column: Option<&str>, message: impl Into<String>) {
        self.warnings.push(RowWarning {
            row,
            column: column.map(str::to_string),
            message: message.into(),
        });
    }

    pub fn finish(&mut self) {
        self.finished_at = Some(Utc::now());
    }
}
