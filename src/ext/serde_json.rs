// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Provide dotted-path lookup and typed extraction helpers for serde_json::Value used by the search item mapping
// role: extension/serde_json
// outputs: JsonPick trait with pick/pick_str/pick_i64 accessors
// invariants: No panics; missing or mistyped paths yield None
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

/// Extension to walk nested values via dotted paths like "user.login".
pub trait JsonPick {
  fn pick(&self, path: &str) -> Option<&serde_json::Value>;

  /// String at `path`, trimmed; None when missing, null, or empty.
  fn pick_str(&self, path: &str) -> Option<String> {
    self.pick(path).and_then(|v| v.as_str()).map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
  }

  fn pick_i64(&self, path: &str) -> Option<i64> {
    self.pick(path).and_then(|v| v.as_i64())
  }
}

impl JsonPick for serde_json::Value {
  fn pick(&self, path: &str) -> Option<&serde_json::Value> {
    if path.is_empty() {
      return Some(self);
    }

    let mut cur = self;

    for key in path.split('.') {
      match cur.get(key) {
        Some(next) => cur = next,
        None => return None,
      }
    }

    Some(cur)
  }
}
