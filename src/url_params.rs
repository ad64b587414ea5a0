//! Query-string mirror of the session
//!
//! The page URL carries `location`, `lat`, `lon`, `start` and `end` so a
//! planning session survives a reload. Coordinates survive but the
//! descriptive Location fields do not: a reload cannot rebuild a full
//! [`crate::models::Location`] from `lat`/`lon` alone.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::warn;

pub const LOCATION_KEY: &str = "location";
pub const LAT_KEY: &str = "lat";
pub const LON_KEY: &str = "lon";
pub const START_KEY: &str = "start";
pub const END_KEY: &str = "end";

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Session-visible URL parameters
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UrlParams {
    pub location: Option<String>,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    /// Unrelated parameters already on the URL, kept in order
    pub extra: Vec<(String, String)>,
}

impl UrlParams {
    /// Parse a query string, with or without the leading `?`.
    ///
    /// Malformed coordinates or dates are dropped with a warning instead of
    /// failing the whole session start.
    #[must_use]
    pub fn parse(query: &str) -> Self {
        let mut params = Self::default();
        let query = query.strip_prefix('?').unwrap_or(query);

        for pair in query.split('&').filter(|pair| !pair.is_empty()) {
            let (raw_key, raw_value) = pair.split_once('=').unwrap_or((pair, ""));
            let key = decode_component(raw_key);
            let value = decode_component(raw_value);

            match key.as_str() {
                LOCATION_KEY => params.location = Some(value),
                LAT_KEY => params.lat = parse_coordinate(&key, &value),
                LON_KEY => params.lon = parse_coordinate(&key, &value),
                START_KEY => params.start = parse_date(&key, &value),
                END_KEY => params.end = parse_date(&key, &value),
                _ => params.extra.push((key, value)),
            }
        }

        params
    }

    /// Render as a query string (no leading `?`), session keys first
    #[must_use]
    pub fn to_query_string(&self) -> String {
        let mut pairs: Vec<(String, String)> = Vec::new();
        if let Some(location) = &self.location {
            pairs.push((LOCATION_KEY.to_string(), location.clone()));
        }
        if let Some(lat) = self.lat {
            pairs.push((LAT_KEY.to_string(), lat.to_string()));
        }
        if let Some(lon) = self.lon {
            pairs.push((LON_KEY.to_string(), lon.to_string()));
        }
        if let Some(start) = self.start {
            pairs.push((START_KEY.to_string(), start.format(DATE_FORMAT).to_string()));
        }
        if let Some(end) = self.end {
            pairs.push((END_KEY.to_string(), end.format(DATE_FORMAT).to_string()));
        }
        pairs.extend(self.extra.iter().cloned());

        pairs
            .iter()
            .map(|(key, value)| {
                format!("{}={}", urlencoding::encode(key), urlencoding::encode(value))
            })
            .collect::<Vec<_>>()
            .join("&")
    }

    /// Coordinates, when both are present
    #[must_use]
    pub fn coordinates(&self) -> Option<(f64, f64)> {
        Some((self.lat?, self.lon?))
    }

    /// Tentative dates, when both are present
    #[must_use]
    pub fn dates(&self) -> Option<(NaiveDate, NaiveDate)> {
        Some((self.start?, self.end?))
    }

    pub fn set_location_query(&mut self, query: &str) {
        self.location = Some(query.to_string());
    }

    pub fn set_coordinates(&mut self, lat: f64, lon: f64) {
        self.lat = Some(lat);
        self.lon = Some(lon);
    }

    pub fn set_dates(&mut self, start: NaiveDate, end: NaiveDate) {
        self.start = Some(start);
        self.end = Some(end);
    }

    /// Drop `location`, `lat` and `lon`
    pub fn clear_location(&mut self) {
        self.location = None;
        self.lat = None;
        self.lon = None;
    }

    /// Drop `start` and `end`
    pub fn clear_dates(&mut self) {
        self.start = None;
        self.end = None;
    }

    /// Drop every parameter, including unrelated ones
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

fn decode_component(raw: &str) -> String {
    let spaced = raw.replace('+', " ");
    match urlencoding::decode(&spaced) {
        Ok(decoded) => decoded.into_owned(),
        Err(_) => spaced,
    }
}

fn parse_coordinate(key: &str, value: &str) -> Option<f64> {
    match value.parse::<f64>() {
        Ok(parsed) if parsed.is_finite() => Some(parsed),
        _ => {
            warn!("Ignoring malformed '{}' URL parameter: {:?}", key, value);
            None
        }
    }
}

fn parse_date(key: &str, value: &str) -> Option<NaiveDate> {
    match NaiveDate::parse_from_str(value, DATE_FORMAT) {
        Ok(date) => Some(date),
        Err(e) => {
            warn!("Ignoring malformed '{}' URL parameter {:?}: {}", key, value, e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, DATE_FORMAT).unwrap()
    }

    #[test]
    fn test_parse_full_query() {
        let params =
            UrlParams::parse("?location=Tokyo+Tower&lat=35.65&lon=139.74&start=2025-06-01&end=2025-06-05");
        assert_eq!(params.location.as_deref(), Some("Tokyo Tower"));
        assert_eq!(params.coordinates(), Some((35.65, 139.74)));
        assert_eq!(params.dates(), Some((date("2025-06-01"), date("2025-06-05"))));
        assert!(params.extra.is_empty());
    }

    #[test]
    fn test_parse_drops_malformed_values() {
        let params = UrlParams::parse("lat=north&lon=139.74&start=June&end=2025-06-05");
        assert_eq!(params.lat, None);
        assert_eq!(params.lon, Some(139.74));
        assert_eq!(params.start, None);
        assert_eq!(params.dates(), None);
    }

    #[test]
    fn test_round_trip_preserves_tuple() {
        let mut params = UrlParams::default();
        params.set_location_query("Tokyo Tower, Minato");
        params.set_coordinates(35.658_581_1, 139.745_433_3);
        params.set_dates(date("2025-06-01"), date("2025-06-05"));

        let reparsed = UrlParams::parse(&params.to_query_string());
        assert_eq!(reparsed, params);
    }

    #[test]
    fn test_extra_parameters_survive() {
        let params = UrlParams::parse("utm_source=mail&lat=1.5&lon=2.5");
        assert_eq!(params.extra, vec![("utm_source".to_string(), "mail".to_string())]);
        assert_eq!(params.to_query_string(), "lat=1.5&lon=2.5&utm_source=mail");
    }

    #[test]
    fn test_clear_helpers() {
        let mut params =
            UrlParams::parse("location=Kyoto&lat=35&lon=135.7&start=2025-06-01&end=2025-06-02&x=1");

        params.clear_dates();
        assert_eq!(params.to_query_string(), "location=Kyoto&lat=35&lon=135.7&x=1");

        params.clear_location();
        assert_eq!(params.to_query_string(), "x=1");

        params.clear();
        assert_eq!(params.to_query_string(), "");
    }
}
