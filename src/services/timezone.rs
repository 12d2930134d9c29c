//! Conversion of UTC timestamp columns to a fixed target offset.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, Utc};

use crate::domain::row::Table;

/// Name of the derived local-date column.
pub const DATE_RECORDED: &str = "Date_Recorded";

/// Timestamp columns converted in the products table.
pub const PRODUCT_TIMESTAMPS: [&str; 3] = ["published_at", "created_at", "updated_at"];
/// Timestamp columns converted in the variants table.
pub const VARIANT_TIMESTAMPS: [&str; 2] = ["created_at", "updated_at"];

const OUTPUT_FORMAT: &str = "%Y-%m-%d %H:%M:%S%:z";
const DATE_FORMAT: &str = "%Y-%m-%d";
const NAIVE_FORMATS: [&str; 3] = ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M"];

/// Parses an offset such as `+05:30`, `-0800` or `UTC`.
pub fn parse_offset(value: &str) -> Option<FixedOffset> {
    let value = value.trim();
    if value.eq_ignore_ascii_case("utc") || value == "Z" {
        return FixedOffset::east_opt(0);
    }
    let (sign, rest) = match value.as_bytes().first()? {
        b'+' => (1, &value[1..]),
        b'-' => (-1, &value[1..]),
        _ => return None,
    };
    if !rest.is_ascii() {
        return None;
    }
    let (hours, minutes) = match rest.split_once(':') {
        Some((h, m)) => (h, m),
        None if rest.len() == 4 => rest.split_at(2),
        None => (rest, "0"),
    };
    let hours: i32 = hours.parse().ok()?;
    let minutes: i32 = minutes.parse().ok()?;
    if !(0..=23).contains(&hours) || !(0..=59).contains(&minutes) {
        return None;
    }
    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
}

/// Interprets a feed timestamp as a UTC instant.
///
/// Values carrying an offset are normalised; values without one are taken
/// as UTC. A bare date is midnight UTC.
pub fn parse_utc(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    if let Ok(instant) = DateTime::parse_from_rfc3339(value) {
        return Some(instant.with_timezone(&Utc));
    }
    if let Ok(instant) = DateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S%.f%:z") {
        return Some(instant.with_timezone(&Utc));
    }
    NAIVE_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(value, DATE_FORMAT)
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
        .map(|naive| naive.and_utc())
}

fn localize(value: &str, offset: &FixedOffset) -> Option<DateTime<FixedOffset>> {
    parse_utc(value).map(|instant| instant.with_timezone(offset))
}

/// Converts `columns` of `table` to `offset` and appends [`DATE_RECORDED`].
///
/// The recorded date is the local calendar date of `created_at` and is only
/// added when that column exists. Cells that cannot be parsed become empty.
/// Columns absent from the table are skipped.
pub fn localize_table(table: &mut Table, columns: &[&str], offset: FixedOffset) {
    if let Some(created) = table.column_index("created_at") {
        table.push_column(DATE_RECORDED, |row| {
            localize(row.get(created), &offset)
                .map(|local| local.format(DATE_FORMAT).to_string())
                .unwrap_or_default()
        });
    }

    for column in columns {
        let found = table.map_column(column, |cell| {
            localize(cell, &offset)
                .map(|local| local.format(OUTPUT_FORMAT).to_string())
                .unwrap_or_default()
        });
        if !found {
            log::warn!("Column {column} not present, skipping time zone conversion");
        }
    }
}
