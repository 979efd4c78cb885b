// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Define the report model (activity items, per-developer records, team reports) shared by fetch, merge, and rendering
// role: model/types
// outputs: Serializable structs with stable field names and optional fallback fields
// invariants: An ActivityItem is identified by its number within a repo; fallback fields are None unless the sheet supplied text
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use serde::{Deserialize, Serialize};

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityKind {
  PrOpened,
  PrMerged,
  IssueClosed,
  IssueUpdated,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ActivityItem {
  pub number: i64,
  pub title: String,
  pub url: String,
  pub author: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub timestamp: Option<String>,
  pub kind: ActivityKind,
}

/// One developer's manual entry from the fallback sheet, already filtered to
/// the report date. Empty form fields arrive as None.
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct FallbackEntry {
  #[serde(skip_serializing_if = "Option::is_none")]
  pub accomplishments: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub plans: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub blockers: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub notes: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct DeveloperRecord {
  pub name: String,
  pub prs_opened: Vec<ActivityItem>,
  pub prs_merged: Vec<ActivityItem>,
  pub issues_closed: Vec<ActivityItem>,
  pub issues_updated: Vec<ActivityItem>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub accomplishments_fallback: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub plans_fallback: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub blockers_fallback: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub notes_fallback: Option<String>,
}

impl DeveloperRecord {
  pub fn empty(name: &str) -> Self {
    Self {
      name: name.to_string(),
      prs_opened: Vec::new(),
      prs_merged: Vec::new(),
      issues_closed: Vec::new(),
      issues_updated: Vec::new(),
      accomplishments_fallback: None,
      plans_fallback: None,
      blockers_fallback: None,
      notes_fallback: None,
    }
  }

  /// Any automated activity in the window counts; fallback text does not.
  pub fn has_activity(&self) -> bool {
    !self.prs_opened.is_empty()
      || !self.prs_merged.is_empty()
      || !self.issues_closed.is_empty()
      || !self.issues_updated.is_empty()
  }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TeamReport {
  pub team: String,
  pub repo: String,
  pub label_date: String,
  pub range: ReportRange,
  pub developers: Vec<DeveloperRecord>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ReportRange {
  pub start: String,
  pub end: String,
}
