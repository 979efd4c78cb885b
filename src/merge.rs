// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Combine normalized activity with fallback sheet entries into final per-developer records
// role: merge/reconcile
// inputs: per-developer records from normalize, FallbackMap, team
// outputs: Vec<DeveloperRecord> in roster order
// invariants:
// - Automated activity suppresses the fallback accomplishments field; plans/blockers/notes always carry
// - Sheet entries for developers outside the roster never surface
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::collections::BTreeMap;

use crate::fallback::FallbackMap;
use crate::model::DeveloperRecord;
use crate::roster::Team;

/// Fold the team's fallback entries into its records, in roster order.
pub fn merge_team(
  mut records: BTreeMap<String, DeveloperRecord>,
  fallback: &FallbackMap,
  team: &Team,
) -> Vec<DeveloperRecord> {
  let mut out: Vec<DeveloperRecord> = Vec::with_capacity(team.developers.len());

  for dev in &team.developers {
    let mut record = records
      .remove(&dev.name)
      .unwrap_or_else(|| DeveloperRecord::empty(&dev.name));

    if let Some(entry) = fallback.get(&(team.key.clone(), dev.name.clone())) {
      // Automated data is authoritative for what was done; manual
      // accomplishments only stand in when the window had no activity.
      record.accomplishments_fallback = if record.has_activity() {
        None
      } else {
        entry.accomplishments.clone()
      };
      record.plans_fallback = entry.plans.clone();
      record.blockers_fallback = entry.blockers.clone();
      record.notes_fallback = entry.notes.clone();
    }

    out.push(record);
  }

  out
}
