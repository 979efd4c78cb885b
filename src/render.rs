use crate::model::{ActivityItem, ActivityKind, DeveloperRecord, TeamReport};
use crate::util::{capitalize_first, escape_html};

// Email-client HTML: tables and inline styles only. The markup mirrors the
// report mails the teams already receive, so visual changes stay deliberate.

const BANNER_COLOR: &str = "#27a25a";

pub fn subject_for(report: &TeamReport) -> String {
  format!(
    "DAILY REPORT FOR {} [{}]",
    report.team.to_uppercase(),
    report.label_date.to_uppercase()
  )
}

/// Convert a block of comma-separated text into HTML bullet points.
pub fn format_bullet_points(text: &str) -> String {
  text
    .split(',')
    .map(str::trim)
    .filter(|item| !item.is_empty())
    .map(|item| format!("&bull; {}", capitalize_first(&escape_html(item))))
    .collect::<Vec<_>>()
    .join("<br>")
}

fn bullet_label(item: &ActivityItem) -> String {
  let noun = match item.kind {
    ActivityKind::PrOpened => "Opened PR",
    ActivityKind::PrMerged => "Merged PR",
    ActivityKind::IssueClosed => "Closed issue",
    ActivityKind::IssueUpdated => "Updated issue",
  };

  format!("{} #{}: {}", noun, item.number, escape_html(&item.title))
}

fn activity_bullets(record: &DeveloperRecord) -> Option<String> {
  if !record.has_activity() {
    return None;
  }

  let buckets = [
    &record.prs_opened,
    &record.prs_merged,
    &record.issues_closed,
    &record.issues_updated,
  ];

  let mut lines: Vec<String> = Vec::new();

  for bucket in buckets {
    for item in bucket.iter() {
      let label = bullet_label(item);

      if item.url.is_empty() {
        lines.push(format!("&bull; {}", label));
      } else {
        lines.push(format!(r#"&bull; <a href="{}">{}</a>"#, escape_html(&item.url), label));
      }
    }
  }

  Some(lines.join("<br>"))
}

fn accomplishments_cell(record: &DeveloperRecord) -> String {
  if let Some(bullets) = activity_bullets(record) {
    return bullets;
  }

  match &record.accomplishments_fallback {
    Some(text) => format_bullet_points(text),
    None => "None".to_string(),
  }
}

fn fallback_cell(field: Option<&str>) -> String {
  match field {
    Some(text) => format_bullet_points(text),
    None => "None".to_string(),
  }
}

fn build_section(title: &str, rows: &[(String, String)]) -> String {
  let mut html = format!(
    r#"<h2 style="color:{};font-size:25px;margin:0 0 3px 0;padding:0;">{}</h2>"#,
    BANNER_COLOR,
    escape_html(title)
  );

  for (name, cell) in rows {
    html.push_str(&format!(
      r#"<p style="margin:0 0 5px 0;font-size:18px"><b>{}:</b></p>"#,
      escape_html(name)
    ));
    html.push_str(&format!(r#"<p style="margin:0 0 10px 20px;font-size:16px">{}</p>"#, cell));
  }

  html
}

/// One full HTML body for a team's report mail.
pub fn render_team_html(report: &TeamReport) -> String {
  let team_title = capitalize_first(&report.team);
  let names: Vec<String> = report.developers.iter().map(|d| escape_html(&d.name)).collect();

  let rows_for = |cell: &dyn Fn(&DeveloperRecord) -> String| -> Vec<(String, String)> {
    report.developers.iter().map(|d| (d.name.clone(), cell(d))).collect()
  };

  let accomplishments = build_section("Today's Accomplishments", &rows_for(&accomplishments_cell));
  let plans = build_section("Tomorrow's Plan", &rows_for(&|d| fallback_cell(d.plans_fallback.as_deref())));
  let blockers = build_section("Blockers & Questions", &rows_for(&|d| fallback_cell(d.blockers_fallback.as_deref())));
  let notes = build_section("Notes", &rows_for(&|d| fallback_cell(d.notes_fallback.as_deref())));

  format!(
    r##"<table width="600" cellpadding="0" cellspacing="0" border="0" style="font-family:Arial,sans-serif;margin:0;padding:0;">
<tr><td bgcolor="{banner}" style="color:#fff;padding:30px;border-radius:15px"><h1 style="margin:0;font-size:30px;">{team} Daily Report</h1><p style="margin:10px 0 0 0;font-size:18px"><b>Developer{plural}:</b> {names}<br><b>Date:</b> {date}</p></td></tr>
<tr><td bgcolor="#ffffff" style="padding:10px;">
{accomplishments}
{plans}
{blockers}
{notes}
</td></tr>
<tr><td bgcolor="#f9fafb" style="padding:15px;text-align:center;font-size:12px;color:#666;">This is an automated report generated by the {team} team</td></tr>
</table>"##,
    banner = BANNER_COLOR,
    team = escape_html(&team_title),
    plural = if report.developers.len() > 1 { "s" } else { "" },
    names = names.join(", "),
    date = escape_html(&report.label_date),
    accomplishments = accomplishments,
    plans = plans,
    blockers = blockers,
    notes = notes,
  )
}
