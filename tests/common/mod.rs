use assert_cmd::Command;

pub const SHEET_HEADER: &str = "Timestamp,Position,Developer Name,Accomplishment Today (separate items with commas),Tomorrow's Plans (separate items with commas),Blockers/Questions (separate items with commas),Notes (separate items with commas)";

/// Binary command with a scrubbed environment and the two-team fixture
/// roster. Tests layer fixtures on top via `.env(..)`.
#[allow(dead_code)]
pub fn cmd() -> Command {
  let mut cmd = Command::cargo_bin("daily-report-mailer").unwrap();

  cmd.env_clear();
  cmd.env("PATH", std::env::var("PATH").unwrap_or_default());
  cmd.env("TEAMS", "frontend,backend");
  cmd.env("TEAM_FRONTEND_REPO", "acme/frontend");
  cmd.env("TEAM_FRONTEND_DEVELOPERS", "Gerald=gerald-gh,Jesreal=jesreal-gh");
  cmd.env("TEAM_BACKEND_REPO", "acme/backend");
  cmd.env("TEAM_BACKEND_DEVELOPERS", "Gerald=gerald-gh,Hans=hans-gh");

  cmd
}

/// Write a fallback sheet CSV; rows are appended below the standard header.
#[allow(dead_code)]
pub fn write_sheet(dir: &std::path::Path, rows: &[&str]) -> String {
  let path = dir.join("sheet.csv");
  let mut text = String::from(SHEET_HEADER);

  for row in rows {
    text.push('\n');
    text.push_str(row);
  }
  text.push('\n');

  std::fs::write(&path, text).unwrap();
  path.to_string_lossy().to_string()
}

/// An empty search fixture so the binary picks the env backend without any
/// bucket returning items.
#[allow(dead_code)]
pub fn quiet_github(cmd: &mut Command) {
  cmd.env("DRM_TEST_PRS_OPENED_JSON", "[]");
}
