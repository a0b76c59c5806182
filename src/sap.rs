// SAP/OData wire conventions: /Date(ms)/ timestamps and total field accessors
use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use regex::Regex;
use rust_decimal::Decimal;
use serde_json::Value;
use std::str::FromStr;
use std::sync::OnceLock;

pub fn to_sap_date(instant: &DateTime<Utc>) -> String {
    format!("/Date({})/", instant.timestamp_millis())
}

/// Parse `/Date(ms)/` (optionally `/Date(ms+0000)/`), falling back to common calendar formats.
pub fn parse_sap_date(raw: &str) -> Option<DateTime<Utc>> {
    static SAP_DATE_REGEX: OnceLock<Regex> = OnceLock::new();
    let re = SAP_DATE_REGEX
        .get_or_init(|| Regex::new(r"/Date\((-?\d+)(?:[+-]\d{4})?\)/").expect("Invalid SAP date regex"));

    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Some(caps) = re.captures(raw) {
        if let Ok(millis) = caps[1].parse::<i64>() {
            if let Some(instant) = Utc.timestamp_millis_opt(millis).single() {
                return Some(instant);
            }
        }
    }

    parse_calendar_date(raw)
}

// Values without an offset are taken as UTC
pub fn parse_calendar_date(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }

    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(naive.and_utc());
        }
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

pub fn string_field(element: &Value, name: &str) -> String {
    element
        .get(name)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

// SuccessFactors sends decimals as strings ("12.5"); plain numbers are accepted too
pub fn decimal_field(element: &Value, name: &str) -> Option<Decimal> {
    match element.get(name)? {
        Value::String(s) => parse_decimal(s),
        Value::Number(n) => parse_decimal(&n.to_string()),
        _ => None,
    }
}

fn parse_decimal(raw: &str) -> Option<Decimal> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    Decimal::from_str(raw)
        .or_else(|_| Decimal::from_scientific(raw))
        .ok()
}

pub fn date_field(element: &Value, name: &str) -> Option<DateTime<Utc>> {
    element.get(name).and_then(Value::as_str).and_then(parse_sap_date)
}
