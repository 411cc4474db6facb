use chrono::{DateTime, Days, NaiveDate, NaiveDateTime};

use crate::models::{ContractRecord, ContractTable};

pub const RENEWAL_WINDOW_DAYS: u32 = 90;

const DATETIME_FORMATS: [&str; 6] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y/%m/%d %H:%M:%S",
    "%m/%d/%Y %H:%M:%S",
];

// Slash dates are month-first, dotted dates day-first.
const DATE_FORMATS: [&str; 11] = [
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%m-%d-%Y",
    "%d.%m.%Y",
    "%b %d, %Y",
    "%B %d, %Y",
    "%d %b %Y",
    "%d %B %Y",
    "%d-%b-%Y",
    "%b %d %Y",
];

/// Best-effort parse of a contract date cell. Time of day is discarded.
pub fn parse_contract_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    if value.len() == 8 && value.bytes().all(|b| b.is_ascii_digit()) {
        let year = value[0..4].parse().ok()?;
        let month = value[4..6].parse().ok()?;
        let day = value[6..8].parse().ok()?;
        return NaiveDate::from_ymd_opt(year, month, day);
    }

    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Some(parsed.date_naive());
    }

    DATETIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
        .map(|dt| dt.date())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|format| NaiveDate::parse_from_str(value, format).ok())
        })
}

/// Last day of the window, clamped to the latest representable date.
pub fn window_end(today: NaiveDate, window_days: u32) -> NaiveDate {
    today
        .checked_add_days(Days::new(u64::from(window_days)))
        .unwrap_or(NaiveDate::MAX)
}

pub fn upcoming_renewals(table: &ContractTable, today: NaiveDate) -> ContractTable {
    upcoming_renewals_within(table, today, RENEWAL_WINDOW_DAYS)
}

/// Records whose ValidUntil falls in `[today, today + window_days]`.
/// Unparseable dates are skipped.
pub fn upcoming_renewals_within(
    table: &ContractTable,
    today: NaiveDate,
    window_days: u32,
) -> ContractTable {
    let end = window_end(today, window_days);
    let mut skipped = 0usize;

    let upcoming: ContractTable = table
        .records
        .iter()
        .filter(|record| match parse_contract_date(&record.valid_until) {
            Some(until) => until >= today && until <= end,
            None => {
                skipped += 1;
                false
            }
        })
        .cloned()
        .collect();

    tracing::debug!(
        %today,
        %end,
        matched = upcoming.len(),
        skipped,
        "computed renewal window"
    );
    upcoming
}

pub fn is_expired(record: &ContractRecord) -> bool {
    record
        .subscription_status
        .as_deref()
        .is_some_and(|status| status.to_lowercase() == "expired")
}

pub fn expired_contracts(table: &ContractTable) -> ContractTable {
    table
        .records
        .iter()
        .filter(|record| is_expired(record))
        .cloned()
        .collect()
}
