use std::io::Cursor;
use std::path::Path;

use calamine::{Data, DataType, Reader, Xlsx};

use crate::error::ReportError;
use crate::models::DataTable;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Spreadsheet,
    Delimited { delimiter: u8 },
}

impl FileKind {
    pub fn from_path(path: &Path) -> Result<Self, ReportError> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase())
            .unwrap_or_default();

        match extension.as_str() {
            "xlsx" => Ok(FileKind::Spreadsheet),
            "csv" => Ok(FileKind::Delimited { delimiter: b',' }),
            "tsv" => Ok(FileKind::Delimited { delimiter: b'\t' }),
            _ => Err(ReportError::UnsupportedFile(path.display().to_string())),
        }
    }
}

pub fn load_table(path: &Path) -> Result<DataTable, ReportError> {
    let kind = FileKind::from_path(path)?;
    let bytes = std::fs::read(path)
        .map_err(|e| ReportError::Load(format!("cannot read {}: {e}", path.display())))?;
    let table = load_bytes(bytes, kind)?;
    tracing::info!(
        path = %path.display(),
        rows = table.rows.len(),
        columns = table.headers.len(),
        "table loaded"
    );
    Ok(table)
}

pub fn load_bytes(bytes: Vec<u8>, kind: FileKind) -> Result<DataTable, ReportError> {
    let table = match kind {
        FileKind::Spreadsheet => read_spreadsheet(bytes)?,
        FileKind::Delimited { delimiter } => read_delimited(&bytes, delimiter)?,
    };

    if table.headers.iter().all(|h| h.trim().is_empty()) {
        return Err(ReportError::Load("file has no header row".to_string()));
    }
    Ok(table)
}

fn read_delimited(bytes: &[u8], delimiter: u8) -> Result<DataTable, ReportError> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .from_reader(bytes);

    let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
    let width = headers.len();
    let mut rows = Vec::new();

    for result in reader.records() {
        let record = result?;
        let mut row: Vec<String> = record.iter().map(str::to_string).collect();
        row.resize(width, String::new());
        rows.push(row);
    }

    Ok(DataTable { headers, rows })
}

fn read_spreadsheet(bytes: Vec<u8>) -> Result<DataTable, ReportError> {
    let mut workbook = Xlsx::new(Cursor::new(bytes))
        .map_err(|e| ReportError::Load(format!("failed to open spreadsheet: {e}")))?;

    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| ReportError::Load("spreadsheet has no worksheet".to_string()))?
        .map_err(|e| ReportError::Load(format!("failed to read worksheet: {e}")))?;

    let mut rows = range.rows();
    let headers: Vec<String> = rows
        .next()
        .map(|row| row.iter().map(cell_text).collect())
        .unwrap_or_default();
    let width = headers.len();

    let rows = rows
        .map(|row| {
            let mut cells: Vec<String> = row.iter().map(cell_text).collect();
            cells.resize(width, String::new());
            cells
        })
        .collect();

    Ok(DataTable { headers, rows })
}

fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::DateTime(_) | Data::DateTimeIso(_) => cell
            .as_date()
            .map(|date| date.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| cell.to_string()),
        other => other.to_string(),
    }
}
