use anyhow::{Context, Result};
use clap::Parser;

mod cli;
mod ext;
mod fallback;
mod github;
mod mailer;
mod merge;
mod model;
mod normalize;
mod render;
mod roster;
mod util;
mod window;

use crate::cli::Cli;
use crate::model::{ReportRange, TeamReport};

fn main() -> Result<()> {
  dotenvy::dotenv().ok();
  env_logger::init();

  let cli = Cli::parse();

  if cli.gen_man {
    let page = util::render_man_page::<Cli>()?;
    print!("{}", page);
    return Ok(());
  }

  // Phase 1: normalize CLI + environment
  let cfg = cli::normalize(cli)?;

  // Phase 2: resolve the report window
  let now = util::effective_now(window::parse_now_override(cfg.now_override.as_deref()));
  let win = window::TimeWindow::for_selector(cfg.selector, cfg.zone, now)?;
  log::info!("[window] {} in {} ({}..{})", win.label_iso(), win.zone, win.start_query(), win.end_query());

  // Phase 3: fetch, normalize, and merge per team
  let api = github::api::make_default_api();

  let fallback = match cfg.fallback_sheet.as_deref() {
    Some(src) => fallback::fetch_fallback(src, &cfg.roster, win.label_date)?,
    None => {
      log::warn!("[fallback] FALLBACK_SHEET_CSV not set; proceeding on automated activity only");
      fallback::FallbackMap::new()
    }
  };

  let mut reports: Vec<TeamReport> = Vec::new();

  for team in &cfg.roster.teams {
    let items = github::search::fetch_repo_activity(api.as_ref(), &team.repo, &win)?;
    let records = normalize::normalize_team(team, &items);
    let developers = merge::merge_team(records, &fallback, team);

    reports.push(TeamReport {
      team: team.key.clone(),
      repo: team.repo.clone(),
      label_date: win.label_long(),
      range: ReportRange {
        start: win.start_query(),
        end: win.end_query(),
      },
      developers,
    });
  }

  // Phase 4: dispatch (or dump / dry-run)
  if cfg.dump_json {
    println!("{}", serde_json::to_string_pretty(&reports)?);
    return Ok(());
  }

  if cfg.dry_run {
    let dir = util::prepare_out_dir(&cfg.out, window::parse_now_override(cfg.now_override.as_deref()))?;
    let mut entries: Vec<serde_json::Value> = Vec::new();

    for report in &reports {
      let file = format!("report-{}.html", report.team);
      let path = std::path::Path::new(&dir).join(&file);
      std::fs::write(&path, render::render_team_html(report)).with_context(|| format!("writing {}", path.display()))?;

      entries.push(serde_json::json!({
        "team": report.team,
        "file": file,
        "subject": render::subject_for(report),
        "recipients": mailer::recipients_for_team(&cfg.mail, &report.team),
      }));
    }

    println!(
      "{}",
      serde_json::to_string_pretty(&serde_json::json!({"dir": dir, "reports": entries}))?
    );
    return Ok(());
  }

  let mut failures: usize = 0;

  for report in &reports {
    let subject = render::subject_for(report);
    let html = render::render_team_html(report);
    let recipients = mailer::recipients_for_team(&cfg.mail, &report.team);

    // One team's outage shouldn't swallow the others' reports.
    if let Err(e) = mailer::send_report(&cfg.mail, &subject, &html, &recipients) {
      log::error!("[mail] team {}: {:#}", report.team, e);
      failures += 1;
    }
  }

  if failures > 0 {
    anyhow::bail!("{} of {} team report(s) failed to send", failures, reports.len());
  }

  Ok(())
}
