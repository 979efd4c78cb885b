mod common;

fn dump_reports(cmd: &mut assert_cmd::Command) -> serde_json::Value {
  let out = cmd.output().unwrap();
  assert!(
    out.status.success(),
    "binary failed: {}",
    String::from_utf8_lossy(&out.stderr)
  );
  serde_json::from_slice(&out.stdout).unwrap()
}

#[test]
fn pipeline_groups_merges_and_suppresses() {
  let td = tempfile::TempDir::new().unwrap();
  let sheet = common::write_sheet(
    td.path(),
    &[
      "01/15/2025 09:12:00,Frontend Developer,Gerald,fixed config,,none,",
      "01/15/2025 10:00:00,Backend Engineer,Hans,\"wrote docs,reviewed API\",ship v2,vpn flaky,",
    ],
  );

  let mut cmd = common::cmd();
  cmd
    .env(
      "DRM_TEST_PRS_OPENED_JSON",
      serde_json::json!({"acme/frontend": [
        {"number": 1, "title": "Feat: add login", "html_url": "https://github.com/acme/frontend/pull/1",
         "user": {"login": "gerald-gh"}, "created_at": "2025-01-15T03:00:00Z"}
      ]})
      .to_string(),
    )
    .env(
      "DRM_TEST_PRS_MERGED_JSON",
      serde_json::json!({"acme/frontend": [
        {"number": 2, "title": "Fix: bug", "html_url": "https://github.com/acme/frontend/pull/2",
         "user": {"login": "jesreal-gh"}, "pull_request": {"merged_at": "2025-01-15T10:00:00Z"}}
      ]})
      .to_string(),
    )
    .env(
      "DRM_TEST_ISSUES_CLOSED_JSON",
      serde_json::json!({"acme/frontend": [
        {"number": 10, "title": "Chore", "html_url": "https://github.com/acme/frontend/issues/10",
         "user": {"login": "jesreal-gh"}, "closed_at": "2025-01-15T11:00:00Z"}
      ]})
      .to_string(),
    )
    .args(["--dump-json", "--date", "2025-01-15", "--fallback-sheet", &sheet]);

  let reports = dump_reports(&mut cmd);
  assert_eq!(reports.as_array().unwrap().len(), 2);

  let frontend = &reports[0];
  assert_eq!(frontend["team"], "frontend");
  assert_eq!(frontend["label_date"], "January 15, 2025");
  assert_eq!(frontend["range"]["start"], "2025-01-14T16:00:00Z");
  assert_eq!(frontend["range"]["end"], "2025-01-15T15:59:59Z");

  let gerald = &frontend["developers"][0];
  assert_eq!(gerald["name"], "Gerald");
  assert_eq!(gerald["prs_opened"].as_array().unwrap().len(), 1);
  // Automated activity suppresses the sheet's accomplishments but not blockers.
  assert!(gerald.get("accomplishments_fallback").is_none());
  assert_eq!(gerald["blockers_fallback"], "none");

  let jesreal = &frontend["developers"][1];
  assert_eq!(jesreal["prs_merged"][0]["number"], 2);
  assert_eq!(jesreal["issues_closed"][0]["number"], 10);

  let backend = &reports[1];
  let backend_gerald = &backend["developers"][0];
  assert_eq!(backend_gerald["prs_opened"].as_array().unwrap().len(), 0);

  let hans = &backend["developers"][1];
  assert_eq!(hans["accomplishments_fallback"], "wrote docs,reviewed API");
  assert_eq!(hans["plans_fallback"], "ship v2");
}

#[test]
fn bots_and_strangers_never_surface() {
  let mut cmd = common::cmd();
  cmd
    .env(
      "DRM_TEST_PRS_OPENED_JSON",
      serde_json::json!([
        {"number": 3, "title": "Bump deps", "html_url": "u", "user": {"login": "dependabot[bot]"},
         "created_at": "2025-01-15T03:00:00Z"},
        {"number": 4, "title": "Drive-by", "html_url": "u", "user": {"login": "stranger"},
         "created_at": "2025-01-15T04:00:00Z"}
      ])
      .to_string(),
    )
    .args(["--dump-json", "--date", "2025-01-15"]);

  let reports = dump_reports(&mut cmd);

  for report in reports.as_array().unwrap() {
    for dev in report["developers"].as_array().unwrap() {
      assert_eq!(dev["prs_opened"].as_array().unwrap().len(), 0, "dev {:?}", dev["name"]);
    }
  }
}

#[test]
fn closed_issue_wins_over_its_updated_entry() {
  let mut cmd = common::cmd();
  cmd
    .env(
      "DRM_TEST_ISSUES_CLOSED_JSON",
      serde_json::json!({"acme/backend": [
        {"number": 10, "title": "Fix pool", "html_url": "u", "user": {"login": "hans-gh"},
         "closed_at": "2025-01-15T11:00:00Z"}
      ]})
      .to_string(),
    )
    .env(
      "DRM_TEST_ISSUES_UPDATED_JSON",
      serde_json::json!({"acme/backend": [
        {"number": 10, "title": "Fix pool", "html_url": "u", "user": {"login": "hans-gh"},
         "updated_at": "2025-01-15T11:00:00Z"},
        {"number": 11, "title": "Tune cache", "html_url": "u", "user": {"login": "hans-gh"},
         "updated_at": "2025-01-15T12:00:00Z"}
      ]})
      .to_string(),
    )
    .args(["--dump-json", "--date", "2025-01-15"]);

  let reports = dump_reports(&mut cmd);
  let hans = &reports[1]["developers"][1];
  assert_eq!(hans["name"], "Hans");
  assert_eq!(hans["issues_closed"].as_array().unwrap().len(), 1);
  let updated = hans["issues_updated"].as_array().unwrap();
  assert_eq!(updated.len(), 1);
  assert_eq!(updated[0]["number"], 11);
}

#[test]
fn sheet_rows_from_other_days_are_ignored() {
  let td = tempfile::TempDir::new().unwrap();
  let sheet = common::write_sheet(
    td.path(),
    &[
      "01/14/2025 18:00:00,Backend Engineer,Hans,old news,,,",
      "01/15/2025 08:00:00,Backend Engineer,Hans,fresh work,,,",
    ],
  );

  let mut cmd = common::cmd();
  common::quiet_github(&mut cmd);
  cmd.args(["--dump-json", "--date", "2025-01-15", "--fallback-sheet", &sheet]);

  let reports = dump_reports(&mut cmd);
  let hans = &reports[1]["developers"][1];
  assert_eq!(hans["accomplishments_fallback"], "fresh work");
}
