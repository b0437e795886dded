//! Spreadsheet migration: reading workbooks, cleaning cells, mapping rows to records

pub mod clean;
pub mod mapping;
pub mod sheet;

pub use mapping::{map_row, ColumnMap, Record};
pub use sheet::{read_workbook, Sheet, SheetError};
