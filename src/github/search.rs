// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Run the per-repo activity searches (PRs opened/merged, issues closed/updated) over an injected search api
// role: github/collectors
// inputs: repo full name, TimeWindow, &dyn GithubSearchApi
// outputs: Flat Vec<ActivityItem> across the four buckets
// invariants:
// - Query instants are the window's UTC bounds, inclusive on both ends
// - Pagination follows full pages until total_count is reached; the search API's 1000-result cap is logged, not fatal
// errors: Malformed response shapes and exhausted retries propagate; unmappable items are skipped
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use anyhow::{Result, bail};

use crate::ext::serde_json::JsonPick;
use crate::github::api::{GithubSearchApi, PER_PAGE};
use crate::model::{ActivityItem, ActivityKind};
use crate::window::TimeWindow;

// /search/issues caps results at 1000 regardless of total_count.
const MAX_PAGES: u32 = 10;

fn query_for(repo: &str, kind: ActivityKind, window: &TimeWindow) -> String {
  let range = format!("{}..{}", window.start_query(), window.end_query());

  match kind {
    ActivityKind::PrOpened => format!("repo:{} is:pr created:{}", repo, range),
    ActivityKind::PrMerged => format!("repo:{} is:pr is:merged merged:{}", repo, range),
    ActivityKind::IssueClosed => format!("repo:{} is:issue closed:{}", repo, range),
    ActivityKind::IssueUpdated => format!("repo:{} is:issue updated:{}", repo, range),
  }
}

fn timestamp_path(kind: ActivityKind) -> &'static str {
  match kind {
    ActivityKind::PrOpened => "created_at",
    ActivityKind::PrMerged => "pull_request.merged_at",
    ActivityKind::IssueClosed => "closed_at",
    ActivityKind::IssueUpdated => "updated_at",
  }
}

fn item_from_json(v: &serde_json::Value, kind: ActivityKind) -> Option<ActivityItem> {
  let number = v.pick_i64("number")?;

  Some(ActivityItem {
    number,
    title: v.pick_str("title").unwrap_or_default(),
    url: v.pick_str("html_url").unwrap_or_default(),
    author: v.pick_str("user.login").unwrap_or_default(),
    timestamp: v.pick_str(timestamp_path(kind)),
    kind,
  })
}

fn collect_query(api: &dyn GithubSearchApi, query: &str, kind: ActivityKind) -> Result<Vec<ActivityItem>> {
  let mut out: Vec<ActivityItem> = Vec::new();
  let mut page: u32 = 1;

  loop {
    let v = api.search_issues_json(query, page)?;

    let Some(items) = v.pick("items").and_then(|i| i.as_array()) else {
      bail!("search response for {:?} has no items array", query);
    };

    for item in items {
      match item_from_json(item, kind) {
        Some(a) => out.push(a),
        None => log::debug!("[github] skipping search item without a number in {:?}", query),
      }
    }

    let total = v.pick_i64("total_count").unwrap_or(out.len() as i64);

    if items.len() < PER_PAGE || (out.len() as i64) >= total {
      break;
    }

    page += 1;

    if page > MAX_PAGES {
      log::warn!("[github] {:?} exceeds the search result cap; truncating at {} items", query, out.len());
      break;
    }
  }

  Ok(out)
}

/// Fetch all four activity buckets for one repo over the window.
pub fn fetch_repo_activity(api: &dyn GithubSearchApi, repo: &str, window: &TimeWindow) -> Result<Vec<ActivityItem>> {
  // Sequential on purpose: four small queries per repo, and the search API
  // rate limit is per-minute.
  let kinds = [
    ActivityKind::PrOpened,
    ActivityKind::PrMerged,
    ActivityKind::IssueClosed,
    ActivityKind::IssueUpdated,
  ];

  let mut out: Vec<ActivityItem> = Vec::new();

  for kind in kinds {
    let query = query_for(repo, kind, window);
    let mut items = collect_query(api, &query, kind)?;
    log::debug!("[github] {:?} -> {} items", query, items.len());
    out.append(&mut items);
  }

  Ok(out)
}
