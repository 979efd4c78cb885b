use anyhow::{Context, Result, bail};
use chrono::{DateTime, NaiveDate, SecondsFormat, TimeZone, Utc};
use chrono_tz::Tz;

// Windowing-related types live here to keep main focused. All civil-day math
// happens in the report timezone; only the query bounds leave as UTC.

pub const DEFAULT_REPORT_TZ: &str = "Asia/Manila";

#[derive(Clone, Copy, Eq, PartialEq, Debug)]
pub enum DaySelector {
  Yesterday,
  Today,
  Date(NaiveDate),
}

/// Parse the `--date` argument: "yesterday", "today", or an explicit YYYY-MM-DD.
pub fn parse_selector(raw: &str) -> Result<DaySelector> {
  match raw.trim().to_lowercase().as_str() {
    "yesterday" => Ok(DaySelector::Yesterday),
    "today" => Ok(DaySelector::Today),
    other => {
      let date = NaiveDate::parse_from_str(other, "%Y-%m-%d")
        .with_context(|| format!("invalid --date {:?}, expected yesterday|today|YYYY-MM-DD", raw))?;
      Ok(DaySelector::Date(date))
    }
  }
}

/// The 00:00:00..=23:59:59 range of one calendar date in the report timezone,
/// held as UTC instants for querying.
#[derive(Clone, Copy, Debug)]
pub struct TimeWindow {
  pub start_utc: DateTime<Utc>,
  pub end_utc: DateTime<Utc>,
  pub label_date: NaiveDate,
  pub zone: Tz,
}

impl TimeWindow {
  pub fn for_selector(selector: DaySelector, zone: Tz, now_utc: DateTime<Utc>) -> Result<Self> {
    let today = now_utc.with_timezone(&zone).date_naive();

    let date = match selector {
      DaySelector::Today => today,
      DaySelector::Yesterday => today.pred_opt().context("date underflow computing yesterday")?,
      DaySelector::Date(d) => d,
    };

    Self::for_civil_day(date, zone)
  }

  pub fn for_civil_day(date: NaiveDate, zone: Tz) -> Result<Self> {
    let start_naive = date.and_hms_opt(0, 0, 0).context("civil day start")?;
    let end_naive = date.and_hms_opt(23, 59, 59).context("civil day end")?;

    // earliest/latest sidestep DST folds; a gap swallowing midnight is an error.
    let start = match zone.from_local_datetime(&start_naive).earliest() {
      Some(dt) => dt,
      None => bail!("{} has no 00:00:00 in {}", date, zone),
    };
    let end = match zone.from_local_datetime(&end_naive).latest() {
      Some(dt) => dt,
      None => bail!("{} has no 23:59:59 in {}", date, zone),
    };

    Ok(Self {
      start_utc: start.with_timezone(&Utc),
      end_utc: end.with_timezone(&Utc),
      label_date: date,
      zone,
    })
  }

  /// UTC instant for the search qualifier, e.g. 2025-01-01T16:00:00Z.
  pub fn start_query(&self) -> String {
    self.start_utc.to_rfc3339_opts(SecondsFormat::Secs, true)
  }

  pub fn end_query(&self) -> String {
    self.end_utc.to_rfc3339_opts(SecondsFormat::Secs, true)
  }

  /// Human form for subjects and banners, e.g. "August 07, 2026".
  pub fn label_long(&self) -> String {
    self.label_date.format("%B %d, %Y").to_string()
  }

  /// ISO form used to match fallback sheet rows.
  pub fn label_iso(&self) -> String {
    self.label_date.format("%Y-%m-%d").to_string()
  }
}

/// Parse a `--now-override` string into a UTC instant.
/// Accepts RFC3339 (e.g. 2025-08-15T12:00:00Z) or a naive timestamp
/// formatted as `%Y-%m-%dT%H:%M:%S`, read as UTC.
pub fn parse_now_override(s: Option<&str>) -> Option<DateTime<Utc>> {
  s.and_then(|raw| {
    chrono::DateTime::parse_from_rfc3339(raw)
      .ok()
      .map(|dt| dt.with_timezone(&Utc))
      .or_else(|| {
        chrono::NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S")
          .ok()
          .map(|ndt| ndt.and_utc())
      })
  })
}

pub fn parse_zone(name: &str) -> Result<Tz> {
  match name.parse::<Tz>() {
    Ok(z) => Ok(z),
    Err(_) => bail!("unknown timezone {:?} (expected an IANA name like Asia/Manila)", name),
  }
}
