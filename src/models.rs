use serde::Serialize;

use crate::error::ReportError;

pub const SOLD_TO_NAME: &str = "SOLDTO_NAME";
pub const MATERIAL_NUMBER: &str = "FINANCIAL_MATERIAL_NUMBER";
pub const MATERIAL_NAME: &str = "Material Name";
pub const VALID_FROM: &str = "Validfrom";
pub const VALID_UNTIL: &str = "Validuntil";
pub const SUBSCRIPTION_STATUS: &str = "Subscription Status";

/// Columns shown in the renewal and expired tables, in display order.
pub const REPORT_COLUMNS: [&str; 5] = [
    SOLD_TO_NAME,
    MATERIAL_NUMBER,
    MATERIAL_NAME,
    VALID_FROM,
    VALID_UNTIL,
];

/// Columns shown in the per-status view, status first.
pub const STATUS_COLUMNS: [&str; 6] = [
    SUBSCRIPTION_STATUS,
    SOLD_TO_NAME,
    MATERIAL_NUMBER,
    MATERIAL_NAME,
    VALID_FROM,
    VALID_UNTIL,
];

// Spreadsheet exports use these for "no value".
const MISSING_SENTINELS: [&str; 19] = [
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

pub fn is_missing(cell: &str) -> bool {
    MISSING_SENTINELS.contains(&cell.trim())
}

/// A header row plus string cells, exactly as read from the source file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DataTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl DataTable {
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|header| header == name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContractRecord {
    #[serde(rename = "SOLDTO_NAME")]
    pub sold_to_name: String,
    #[serde(rename = "FINANCIAL_MATERIAL_NUMBER")]
    pub material_number: String,
    #[serde(rename = "Material Name")]
    pub material_name: String,
    #[serde(rename = "Validfrom")]
    pub valid_from: String,
    #[serde(rename = "Validuntil")]
    pub valid_until: String,
    #[serde(rename = "Subscription Status")]
    pub subscription_status: Option<String>,
}

impl ContractRecord {
    pub fn report_cells(&self) -> [&str; 5] {
        [
            self.sold_to_name.as_str(),
            self.material_number.as_str(),
            self.material_name.as_str(),
            self.valid_from.as_str(),
            self.valid_until.as_str(),
        ]
    }

    pub fn status_cells(&self) -> [&str; 6] {
        [
            self.subscription_status.as_deref().unwrap_or(""),
            self.sold_to_name.as_str(),
            self.material_number.as_str(),
            self.material_name.as_str(),
            self.valid_from.as_str(),
            self.valid_until.as_str(),
        ]
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContractTable {
    pub records: Vec<ContractRecord>,
}

impl ContractTable {
    /// Projects a loaded table onto the contract columns. Fails on the first
    /// expected column that the header row does not contain.
    pub fn from_data(data: &DataTable) -> Result<Self, ReportError> {
        let index = |name: &str| {
            data.column_index(name)
                .ok_or_else(|| ReportError::MissingColumn {
                    column: name.to_string(),
                })
        };

        let sold_to = index(SOLD_TO_NAME)?;
        let number = index(MATERIAL_NUMBER)?;
        let name = index(MATERIAL_NAME)?;
        let from = index(VALID_FROM)?;
        let until = index(VALID_UNTIL)?;
        let status = index(SUBSCRIPTION_STATUS)?;

        let records = data
            .rows
            .iter()
            .map(|row| {
                let status_value = cell(row, status);
                ContractRecord {
                    sold_to_name: cell(row, sold_to),
                    material_number: cell(row, number),
                    material_name: cell(row, name),
                    valid_from: cell(row, from),
                    valid_until: cell(row, until),
                    subscription_status: if is_missing(&status_value) {
                        None
                    } else {
                        Some(status_value)
                    },
                }
            })
            .collect();

        Ok(Self { records })
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

fn cell(row: &[String], idx: usize) -> String {
    row.get(idx).cloned().unwrap_or_default()
}

impl FromIterator<ContractRecord> for ContractTable {
    fn from_iter<I: IntoIterator<Item = ContractRecord>>(iter: I) -> Self {
        Self {
            records: iter.into_iter().collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusGroup {
    pub status: String,
    pub records: Vec<ContractRecord>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers() -> Vec<String> {
        STATUS_COLUMNS.iter().map(|c| c.to_string()).collect()
    }

    #[test]
    fn projects_rows_by_header_name() {
        let mut headers = headers();
        headers.reverse();
        headers.push("Region".to_string());
        let data = DataTable {
            headers,
            rows: vec![vec![
                "2026-12-31".to_string(),
                "2026-01-01".to_string(),
                "Cobas Pro".to_string(),
                "M-100".to_string(),
                "Acme Labs".to_string(),
                "Active".to_string(),
                "EMEA".to_string(),
            ]],
        };

        let table = ContractTable::from_data(&data).unwrap();
        let record = &table.records[0];
        assert_eq!(record.sold_to_name, "Acme Labs");
        assert_eq!(record.material_number, "M-100");
        assert_eq!(record.valid_until, "2026-12-31");
        assert_eq!(record.subscription_status.as_deref(), Some("Active"));
    }

    #[test]
    fn missing_column_is_reported_by_name() {
        let data = DataTable {
            headers: headers()
                .into_iter()
                .filter(|h| h != VALID_UNTIL)
                .collect(),
            rows: vec![],
        };

        match ContractTable::from_data(&data) {
            Err(ReportError::MissingColumn { column }) => assert_eq!(column, VALID_UNTIL),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn column_names_are_case_sensitive() {
        let data = DataTable {
            headers: headers()
                .into_iter()
                .map(|h| if h == SOLD_TO_NAME { "soldto_name".to_string() } else { h })
                .collect(),
            rows: vec![],
        };
        assert!(matches!(
            ContractTable::from_data(&data),
            Err(ReportError::MissingColumn { .. })
        ));
    }

    #[test]
    fn blank_and_sentinel_statuses_are_missing() {
        let rows = ["", "   ", "NaN", "N/A", "null", "Active"]
            .iter()
            .map(|status| {
                vec![
                    status.to_string(),
                    "Acme".to_string(),
                    "M-1".to_string(),
                    "Kit".to_string(),
                    "2026-01-01".to_string(),
                    "2026-06-01".to_string(),
                ]
            })
            .collect();
        let table = ContractTable::from_data(&DataTable {
            headers: headers(),
            rows,
        })
        .unwrap();

        let present: Vec<_> = table
            .records
            .iter()
            .filter_map(|r| r.subscription_status.as_deref())
            .collect();
        assert_eq!(present, vec!["Active"]);
    }

    #[test]
    fn short_rows_fill_with_empty_cells() {
        let table = ContractTable::from_data(&DataTable {
            headers: headers(),
            rows: vec![vec!["Active".to_string(), "Acme".to_string()]],
        })
        .unwrap();
        assert_eq!(table.records[0].valid_until, "");
        assert_eq!(table.records[0].sold_to_name, "Acme");
    }
}
