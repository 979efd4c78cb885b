use anyhow::{Result, bail};
use chrono_tz::Tz;
use clap::Parser;

use crate::mailer::MailConfig;
use crate::roster::Roster;
use crate::window::{self, DaySelector};

#[derive(Parser, Debug)]
#[command(
    name = "daily-report-mailer",
    version,
    about = "Aggregate GitHub team activity and mail a daily HTML report",
    long_about = None
)]
pub struct Cli {
  /// Report day: yesterday, today, or an explicit YYYY-MM-DD
  #[arg(long, default_value = "yesterday")]
  pub date: String,

  /// IANA timezone the civil day is computed in
  #[arg(long, env = "REPORT_TZ", default_value = window::DEFAULT_REPORT_TZ)]
  pub tz: String,

  /// Fallback sheet source: http(s) URL or local CSV path
  #[arg(long, env = "FALLBACK_SHEET_CSV")]
  pub fallback_sheet: Option<String>,

  /// Build the reports and write HTML artifacts instead of sending mail
  #[arg(long)]
  pub dry_run: bool,

  /// Print the merged team reports as JSON to stdout instead of sending mail
  #[arg(long)]
  pub dump_json: bool,

  /// Artifact directory for --dry-run (default: auto-named temp dir)
  #[arg(long, default_value = "-")]
  pub out: String,

  /// Emit a troff man page to stdout (internal; for packaging)
  #[arg(long, hide = true)]
  pub gen_man: bool,

  /// Override the "now" instant for window resolution (hidden; tests only)
  #[arg(long = "now-override", hide = true)]
  pub now_override: Option<String>,
}

#[derive(Debug)]
pub struct EffectiveConfig {
  pub selector: DaySelector,
  pub zone: Tz,
  pub roster: Roster,
  pub mail: MailConfig,
  pub fallback_sheet: Option<String>,
  pub dry_run: bool,
  pub dump_json: bool,
  pub out: String,
  pub now_override: Option<String>,
}

pub fn normalize(cli: Cli) -> Result<EffectiveConfig> {
  if cli.dry_run && cli.dump_json {
    bail!("Ambiguous output: choose only one of --dry-run | --dump-json");
  }

  let selector = window::parse_selector(&cli.date)?;
  let zone = window::parse_zone(&cli.tz)?;
  let roster = Roster::from_env()?;
  let mail = MailConfig::from_env();

  // Surface credential gaps before any network work.
  if !cli.dry_run && !cli.dump_json {
    mail.require_sendable()?;
  }

  Ok(EffectiveConfig {
    selector,
    zone,
    roster,
    mail,
    fallback_sheet: cli.fallback_sheet,
    dry_run: cli.dry_run,
    dump_json: cli.dump_json,
    out: cli.out,
    now_override: cli.now_override,
  })
}
