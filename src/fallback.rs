// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Read the manual fallback sheet (published CSV) and group the target date's rows by team and developer
// role: fallback/reader
// inputs: FALLBACK_SHEET_CSV source (http(s) URL or local path), roster, the window's label date
// outputs: FallbackMap keyed by (team key, developer name)
// side_effects: One HTTP GET when the source is a URL
// invariants:
// - Rows outside the label date, with malformed timestamps, or with unknown positions are skipped
// - A later row for the same (team, developer) replaces the earlier one
// errors: Unreachable configured sources and CSV-level failures propagate; per-row problems only log
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;

use crate::model::FallbackEntry;
use crate::roster::Roster;

/// (team key, developer name as entered in the sheet) -> entry
pub type FallbackMap = HashMap<(String, String), FallbackEntry>;

// Column headers come from the intake form and are part of the sheet contract.
#[derive(Debug, Deserialize)]
struct SheetRow {
  #[serde(rename = "Timestamp")]
  timestamp: String,
  #[serde(rename = "Position")]
  position: String,
  #[serde(rename = "Developer Name")]
  developer: String,
  #[serde(rename = "Accomplishment Today (separate items with commas)", default)]
  accomplishments: String,
  #[serde(rename = "Tomorrow's Plans (separate items with commas)", default)]
  plans: String,
  #[serde(rename = "Blockers/Questions (separate items with commas)", default)]
  blockers: String,
  #[serde(rename = "Notes (separate items with commas)", default)]
  notes: String,
}

/// Sheet timestamps look like `01/15/2025 09:30:12`.
fn row_date(timestamp: &str) -> Option<NaiveDate> {
  let date_part = timestamp.split_whitespace().next()?;
  NaiveDate::parse_from_str(date_part, "%m/%d/%Y").ok()
}

/// "Frontend Developer" -> team key "frontend".
fn team_for_position<'a>(roster: &'a Roster, position: &str) -> Option<&'a str> {
  let needle = position.trim().to_lowercase();

  roster
    .teams
    .iter()
    .find(|t| needle.contains(&t.key.to_lowercase()))
    .map(|t| t.key.as_str())
}

fn non_empty(s: String) -> Option<String> {
  let t = s.trim().to_string();
  if t.is_empty() { None } else { Some(t) }
}

/// Fetch the raw CSV text for a source: an http(s) URL or a local path.
pub fn load_source(source: &str) -> Result<String> {
  if source.starts_with("http://") || source.starts_with("https://") {
    let agent = ureq::AgentBuilder::new().timeout(Duration::from_secs(30)).build();
    let resp = agent
      .get(source)
      .set("User-Agent", "daily-report-mailer")
      .call()
      .with_context(|| format!("fetching fallback sheet from {}", source))?;
    return resp.into_string().context("reading fallback sheet body");
  }

  std::fs::read_to_string(source).with_context(|| format!("reading fallback sheet file {}", source))
}

/// Parse CSV text into the day's fallback entries.
pub fn read_fallback(csv_text: &str, roster: &Roster, label_date: NaiveDate) -> Result<FallbackMap> {
  let mut out: FallbackMap = HashMap::new();
  let mut reader = csv::ReaderBuilder::new().has_headers(true).from_reader(csv_text.as_bytes());

  for (idx, row) in reader.deserialize::<SheetRow>().enumerate() {
    let row = match row {
      Ok(r) => r,
      Err(e) => {
        log::warn!("[fallback] skipping row {}: {}", idx + 2, e);
        continue;
      }
    };

    let Some(date) = row_date(&row.timestamp) else {
      log::debug!("[fallback] row {} has unparseable timestamp {:?}", idx + 2, row.timestamp);
      continue;
    };

    if date != label_date {
      continue;
    }

    let Some(team_key) = team_for_position(roster, &row.position) else {
      log::debug!("[fallback] row {} has unknown position {:?}", idx + 2, row.position);
      continue;
    };

    let developer = row.developer.trim().to_string();

    if developer.is_empty() {
      continue;
    }

    // Insert unconditionally: a resubmitted form wins over the earlier row.
    out.insert(
      (team_key.to_string(), developer),
      FallbackEntry {
        accomplishments: non_empty(row.accomplishments),
        plans: non_empty(row.plans),
        blockers: non_empty(row.blockers),
        notes: non_empty(row.notes),
      },
    );
  }

  Ok(out)
}

/// Load + parse in one step for a configured source.
pub fn fetch_fallback(source: &str, roster: &Roster, label_date: NaiveDate) -> Result<FallbackMap> {
  let text = load_source(source)?;
  let map = read_fallback(&text, roster, label_date)?;
  log::info!("[fallback] {} entr{} for {}", map.len(), if map.len() == 1 { "y" } else { "ies" }, label_date);
  Ok(map)
}
