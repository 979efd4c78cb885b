use std::collections::{BTreeMap, HashSet};

use crate::model::{ActivityItem, ActivityKind, DeveloperRecord};
use crate::roster::Team;

/// Group fetched items into per-developer buckets for one team. Every
/// rostered developer gets a record, active or not. Items from authors
/// outside the roster (or bots) are dropped.
pub fn normalize_team(team: &Team, items: &[ActivityItem]) -> BTreeMap<String, DeveloperRecord> {
  let mut records: BTreeMap<String, DeveloperRecord> = team
    .developers
    .iter()
    .map(|d| (d.name.clone(), DeveloperRecord::empty(&d.name)))
    .collect();

  // Natural-key dedup: an issue already counted as closed must not resurface
  // as updated, and pagination overlap must not double-count a bucket.
  let closed_numbers: HashSet<i64> = items
    .iter()
    .filter(|i| i.kind == ActivityKind::IssueClosed)
    .map(|i| i.number)
    .collect();

  let mut seen: HashSet<(ActivityKind, i64)> = HashSet::new();

  for item in items {
    let Some(name) = team.resolve(&item.author) else {
      log::debug!("[normalize] dropping item #{} by {:?} (not on team {})", item.number, item.author, team.key);
      continue;
    };

    if item.kind == ActivityKind::IssueUpdated && closed_numbers.contains(&item.number) {
      continue;
    }

    if !seen.insert((item.kind, item.number)) {
      continue;
    }

    let record = records.get_mut(name).expect("resolved developers are rostered");

    match item.kind {
      ActivityKind::PrOpened => record.prs_opened.push(item.clone()),
      ActivityKind::PrMerged => record.prs_merged.push(item.clone()),
      ActivityKind::IssueClosed => record.issues_closed.push(item.clone()),
      ActivityKind::IssueUpdated => record.issues_updated.push(item.clone()),
    }
  }

  records
}
