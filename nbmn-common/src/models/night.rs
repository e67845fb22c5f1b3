//! Movie night record
//!
//! Keyed by the date in `YYYYMMDD` form (`datestr`).

use super::{now_field, parse_now_field};
use crate::db::{Document, Store};
use crate::imdb::norm_imdbid;
use crate::Result;
use chrono::{DateTime, Local, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::warn;

/// Storage format of `datestr`
pub const DATE_FMT: &str = "%Y%m%d";

pub const DATESTR_INDEX: &str = "datestr";
pub const YEAR_INDEX: &str = "year";

/// Fewer attendees than this is not a movie night
pub const MIN_ATTENDEES: usize = 2;

/// A single movie night
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Night {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub datestr: String,
    #[serde(default)]
    pub imdbid: String,
    #[serde(default)]
    pub moviename: String,
    #[serde(default)]
    pub dinner: String,
    /// Rich text (HTML) as entered by the editor
    #[serde(default)]
    pub comments: String,
    #[serde(default)]
    pub attendees: Vec<String>,
    /// Couch-comfort index; anything that is not a number reads as 0
    #[serde(default, deserialize_with = "lenient_int")]
    pub ccsi: i64,
    /// Local time of the last save
    #[serde(default)]
    pub last_update: Option<String>,
}

impl Night {
    /// Unsaved night for `date` (`"now"` is today)
    pub fn new(date: &str) -> Self {
        Self {
            datestr: Self::str_from_date(date),
            ..Self::default()
        }
    }

    /// Storage form of a date string; `"now"` becomes today
    pub fn str_from_date(date: &str) -> String {
        let date = date.trim();
        if date.eq_ignore_ascii_case("now") {
            Local::now().format(DATE_FMT).to_string()
        } else {
            date.to_string()
        }
    }

    /// Parse a stored date string (`"now"` is today)
    pub fn date_from_str(date: &str) -> Option<NaiveDate> {
        let date = date.trim();
        if date.is_empty() {
            return None;
        }
        if date.eq_ignore_ascii_case("now") {
            return Some(Local::now().date_naive());
        }
        NaiveDate::parse_from_str(date, DATE_FMT).ok()
    }

    pub fn date(&self) -> Option<NaiveDate> {
        Self::date_from_str(&self.datestr)
    }

    pub fn year(&self) -> Option<i32> {
        use chrono::Datelike;
        self.date().map(|d| d.year())
    }

    /// Bring the fields into canonical form
    pub fn insure_data(&mut self) {
        self.datestr = Self::str_from_date(&self.datestr);
        self.imdbid = norm_imdbid(&self.imdbid);
    }

    /// First night stored for `date`; duplicates are logged
    pub async fn find_datestr<S: Store>(store: &S, date: &str) -> Result<Option<Self>> {
        let datestr = Self::str_from_date(date);
        let mut found: Vec<Self> = store.find_by_index(DATESTR_INDEX, &datestr).await?;
        if found.len() > 1 {
            warn!(datestr = %datestr, count = found.len(), "Found duplicate movie nights");
        }
        Ok(if found.is_empty() {
            None
        } else {
            Some(found.swap_remove(0))
        })
    }

    pub async fn find_by_year<S: Store>(store: &S, year: i32) -> Result<Vec<Self>> {
        store.find_by_index(YEAR_INDEX, &year.to_string()).await
    }

    fn format_date(&self, fmt: &str) -> String {
        self.date()
            .map(|d| d.format(fmt).to_string())
            .unwrap_or_default()
    }

    /// "Friday, March 03, 2017"
    pub fn listdate(&self) -> String {
        self.format_date("%A, %B %d, %Y")
    }

    /// "Mar 03, 2017"
    pub fn listdate_short(&self) -> String {
        self.format_date("%b %d, %Y")
    }

    /// Sortable display form: "2017-03-03 (Fri, Mar 03)"
    pub fn listdate_js(&self) -> String {
        self.format_date("%Y-%m-%d (%a, %b %d)")
    }

    /// iCalendar DTSTART
    pub fn listdate_ical(&self) -> String {
        self.format_date("%Y%m%dT233000Z")
    }

    /// iCalendar DTSTAMP from the last save (now when never saved)
    pub fn dstamp_ical(&self) -> String {
        let stamp = self
            .last_update
            .as_deref()
            .and_then(parse_now_field)
            .unwrap_or_else(|| Local::now().naive_local());
        stamp.format("%Y%m%dT%H%M%SZ").to_string()
    }

    /// Case-insensitive attendee check
    pub fn has_attendee(&self, name: &str) -> bool {
        let name = name.trim().to_lowercase();
        self.attendees
            .iter()
            .any(|a| a.trim().to_lowercase() == name)
    }

    /// Problems that prevent saving; empty when the night is fine
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        if self.attendees.len() < MIN_ATTENDEES {
            errors.push(format!("Need at least {} attendees", MIN_ATTENDEES));
        }
        if self.moviename.trim().is_empty() {
            errors.push("Please enter *something* for the movie name".to_string());
        }
        if self.date().is_none() {
            errors.push(format!("Invalid movie night date '{}'", self.datestr));
        }
        errors
    }
}

impl Document for Night {
    const TABLE: &'static str = "nights";

    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    fn set_id(&mut self, id: String) {
        self.id = Some(id);
    }

    fn indexes(&self) -> Vec<(&'static str, String)> {
        let mut indexes = vec![(DATESTR_INDEX, self.datestr.clone())];
        if let Some(year) = self.year() {
            indexes.push((YEAR_INDEX, year.to_string()));
        }
        indexes
    }

    fn after_load(&mut self) {
        self.insure_data();
    }

    fn before_save(&mut self, _now: DateTime<Utc>) {
        self.insure_data();
        self.last_update = Some(now_field());
    }
}

fn lenient_int<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<i64, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.trunc() as i64))
            .unwrap_or(0),
        Value::String(s) => s.trim().parse().unwrap_or(0),
        Value::Bool(b) => i64::from(b),
        _ => 0,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn night(datestr: &str, attendees: &[&str], moviename: &str) -> Night {
        Night {
            datestr: datestr.to_string(),
            attendees: attendees.iter().map(|a| a.to_string()).collect(),
            moviename: moviename.to_string(),
            ..Night::default()
        }
    }

    #[test]
    fn test_now_is_today() {
        let today = Local::now().format(DATE_FMT).to_string();
        assert_eq!(Night::new("now").datestr, today);
        assert_eq!(Night::str_from_date(" 20170303 "), "20170303");
    }

    #[test]
    fn test_date_formats() {
        let n = night("20170303", &[], "x");
        assert_eq!(n.listdate(), "Friday, March 03, 2017");
        assert_eq!(n.listdate_short(), "Mar 03, 2017");
        assert_eq!(n.listdate_js(), "2017-03-03 (Fri, Mar 03)");
        assert_eq!(n.listdate_ical(), "20170303T233000Z");
        assert_eq!(n.year(), Some(2017));
    }

    #[test]
    fn test_bad_date() {
        let n = night("2017-03-03", &["A", "B"], "x");
        assert!(n.date().is_none());
        assert_eq!(n.listdate(), "");
        assert_eq!(n.indexes().len(), 1);
        assert_eq!(n.validate().len(), 1);
    }

    #[test]
    fn test_dstamp_uses_last_update() {
        let mut n = night("20170303", &[], "x");
        n.last_update = Some("2017-03-04 10:11:12.000000".to_string());
        assert_eq!(n.dstamp_ical(), "20170304T101112Z");
    }

    #[test]
    fn test_has_attendee() {
        let n = night("20170303", &["Adam", " Marty "], "x");
        assert!(n.has_attendee("marty"));
        assert!(n.has_attendee(" ADAM"));
        assert!(!n.has_attendee("Bob"));
    }

    #[test]
    fn test_validate() {
        assert!(night("20170303", &["Adam", "Marty"], "Heat").validate().is_empty());

        let errors = night("20170303", &["Adam"], " ").validate();
        assert_eq!(errors.len(), 2);
        assert!(errors[0].contains("at least 2"));
    }

    #[test]
    fn test_lenient_ccsi() {
        for (raw, expected) in [
            (json!(3), 3),
            (json!("4"), 4),
            (json!(""), 0),
            (json!("lots"), 0),
            (json!(2.9), 2),
            (json!(null), 0),
        ] {
            let n: Night = serde_json::from_value(json!({"ccsi": raw})).unwrap();
            assert_eq!(n.ccsi, expected, "input {:?}", raw);
        }

        let n: Night = serde_json::from_value(json!({})).unwrap();
        assert_eq!(n.ccsi, 0);
    }

    #[test]
    fn test_before_save_canonicalizes() {
        let mut n = night("20170303", &[], "x");
        n.imdbid = "123".to_string();
        n.before_save(Utc::now());
        assert_eq!(n.imdbid, "tt0000123");
        assert!(n.last_update.is_some());
    }
}
