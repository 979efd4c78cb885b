mod common;

use predicates::prelude::*;

#[test]
fn help_describes_the_tool() {
  common::cmd()
    .arg("--help")
    .assert()
    .success()
    .stdout(predicate::str::contains("Aggregate GitHub team activity"))
    .stdout(predicate::str::contains("--dry-run"));
}

#[test]
fn gen_man_emits_troff() {
  common::cmd()
    .arg("--gen-man")
    .assert()
    .success()
    .stdout(predicate::str::contains(".TH"))
    .stdout(predicate::str::contains("daily-report-mailer"));
}

#[test]
fn bad_date_is_rejected() {
  common::cmd()
    .args(["--dump-json", "--date", "last tuesday"])
    .assert()
    .failure()
    .stderr(predicate::str::contains("invalid --date"));
}

#[test]
fn output_modes_are_exclusive() {
  common::cmd()
    .args(["--dry-run", "--dump-json"])
    .assert()
    .failure()
    .stderr(predicate::str::contains("Ambiguous output"));
}

#[test]
fn missing_roster_fails_fast() {
  let mut cmd = assert_cmd::Command::cargo_bin("daily-report-mailer").unwrap();
  cmd.env_clear();
  cmd.env("PATH", std::env::var("PATH").unwrap_or_default());
  cmd
    .arg("--dump-json")
    .assert()
    .failure()
    .stderr(predicate::str::contains("TEAMS"));
}

#[test]
fn sending_without_credentials_fails_fast() {
  common::cmd()
    .assert()
    .failure()
    .stderr(predicate::str::contains("SENDER_EMAIL"));
}
