// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Isolated GitHub search API access (token discovery, REST calls, retry, per-run caching)
// role: github/search-api
// inputs: search query strings; env GITHUB_TOKEN/GH_TOKEN; optional `gh` CLI for token fallback; DRM_TEST_* fixtures
// outputs: Raw /search/issues JSON pages
// side_effects: Network calls to api.github.com; spawns `gh` subprocess when needed
// invariants:
// - Transient failures (transport, 403/429, 5xx) retry up to 3 attempts, then surface an error
// - Token discovery prefers GITHUB_TOKEN, then GH_TOKEN, then `gh auth token`
// - Any DRM_TEST_*_JSON variable switches the default backend to env fixtures
// errors: Propagated with query context; callers decide whether a failed fetch aborts the run
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use anyhow::{Context, Result, anyhow, bail};
use once_cell::sync::Lazy;
use std::cell::RefCell;
use std::collections::HashMap;
use std::time::Duration;

const SEARCH_URL: &str = "https://api.github.com/search/issues";
const MAX_ATTEMPTS: u32 = 3;
pub const PER_PAGE: usize = 100;

/// Discover a GitHub token: env vars first, then `gh auth token` if available.
pub fn get_github_token() -> Option<String> {
  for var in ["GITHUB_TOKEN", "GH_TOKEN"] {
    if let Ok(t) = std::env::var(var) {
      if !t.trim().is_empty() {
        return Some(t);
      }
    }
  }

  if let Ok(output) = std::process::Command::new("gh").args(["auth", "token"]).output() {
    if output.status.success() {
      let t = String::from_utf8_lossy(&output.stdout).trim().to_string();

      if !t.is_empty() {
        return Some(t);
      }
    }
  }

  None
}

// --- Trait seam for the search endpoint ---
pub trait GithubSearchApi {
  /// One page of /search/issues results for a query string.
  fn search_issues_json(&self, query: &str, page: u32) -> Result<serde_json::Value>;
}

// --- Lightweight in-memory caching wrapper ---
// Memoizes pages per run so repeated windows don't re-hit the API.
struct GithubCachedApi {
  inner: Box<dyn GithubSearchApi>,
  pages: RefCell<HashMap<String, serde_json::Value>>,
}

impl GithubCachedApi {
  fn new(inner: Box<dyn GithubSearchApi>) -> Self {
    Self {
      inner,
      pages: RefCell::new(HashMap::new()),
    }
  }
}

impl GithubSearchApi for GithubCachedApi {
  fn search_issues_json(&self, query: &str, page: u32) -> Result<serde_json::Value> {
    let key = format!("{}|{}", query, page);

    if let Some(v) = self.pages.borrow().get(&key).cloned() {
      return Ok(v);
    }
    let v = self.inner.search_issues_json(query, page)?;
    self.pages.borrow_mut().insert(key, v.clone());

    Ok(v)
  }
}

struct GithubHttpApi {
  agent: ureq::Agent,
  token: Option<String>,
}

impl GithubHttpApi {
  fn new(token: Option<String>) -> Self {
    let agent = ureq::AgentBuilder::new().timeout(Duration::from_secs(30)).build();
    Self { agent, token }
  }
}

fn retryable_status(code: u16) -> bool {
  code == 403 || code == 429 || code >= 500
}

impl GithubSearchApi for GithubHttpApi {
  fn search_issues_json(&self, query: &str, page: u32) -> Result<serde_json::Value> {
    let mut last_err: Option<anyhow::Error> = None;

    for attempt in 1..=MAX_ATTEMPTS {
      if attempt > 1 {
        std::thread::sleep(Duration::from_secs(2 * u64::from(attempt - 1)));
      }

      let mut req = self
        .agent
        .get(SEARCH_URL)
        .set("Accept", "application/vnd.github+json")
        .set("User-Agent", "daily-report-mailer")
        .query("q", query)
        .query("per_page", &PER_PAGE.to_string())
        .query("page", &page.to_string());

      if let Some(token) = &self.token {
        req = req.set("Authorization", &format!("Bearer {}", token));
      }

      match req.call() {
        Ok(resp) => {
          return resp
            .into_json::<serde_json::Value>()
            .with_context(|| format!("parsing search response for {:?}", query));
        }
        Err(ureq::Error::Status(code, _)) if retryable_status(code) => {
          log::warn!("[github] search attempt {}/{} got HTTP {}", attempt, MAX_ATTEMPTS, code);
          last_err = Some(anyhow!("GitHub search returned HTTP {}", code));
        }
        Err(ureq::Error::Status(code, resp)) => {
          let body = resp.into_string().unwrap_or_default();
          bail!("GitHub search returned HTTP {} for {:?}: {}", code, query, body.trim());
        }
        Err(e) => {
          log::warn!("[github] search attempt {}/{} transport error: {}", attempt, MAX_ATTEMPTS, e);
          last_err = Some(anyhow::Error::new(e));
        }
      }
    }

    Err(
      last_err
        .unwrap_or_else(|| anyhow!("GitHub search failed"))
        .context(format!("giving up on query {:?} after {} attempts", query, MAX_ATTEMPTS)),
    )
  }
}

// --- Env-var-backed backend for tests ---
// Fixtures are arrays of search items, or objects keyed by owner/name:
//   DRM_TEST_PRS_OPENED_JSON, DRM_TEST_PRS_MERGED_JSON,
//   DRM_TEST_ISSUES_CLOSED_JSON, DRM_TEST_ISSUES_UPDATED_JSON
struct GithubEnvApi;

const FIXTURE_SLOTS: [&str; 4] = [
  "DRM_TEST_PRS_OPENED_JSON",
  "DRM_TEST_PRS_MERGED_JSON",
  "DRM_TEST_ISSUES_CLOSED_JSON",
  "DRM_TEST_ISSUES_UPDATED_JSON",
];

fn slot_for_query(query: &str) -> Option<&'static str> {
  if query.contains("is:pr") {
    if query.contains("merged:") {
      Some("DRM_TEST_PRS_MERGED_JSON")
    } else {
      Some("DRM_TEST_PRS_OPENED_JSON")
    }
  } else if query.contains("is:issue") {
    if query.contains("closed:") {
      Some("DRM_TEST_ISSUES_CLOSED_JSON")
    } else {
      Some("DRM_TEST_ISSUES_UPDATED_JSON")
    }
  } else {
    None
  }
}

fn repo_in_query(query: &str) -> Option<String> {
  static RE_REPO: Lazy<regex::Regex> = Lazy::new(|| regex::Regex::new(r"repo:(\S+)").unwrap());
  RE_REPO.captures(query).and_then(|c| c.get(1)).map(|m| m.as_str().to_string())
}

impl GithubSearchApi for GithubEnvApi {
  fn search_issues_json(&self, query: &str, page: u32) -> Result<serde_json::Value> {
    let empty = serde_json::json!({"total_count": 0, "items": []});

    // Fixtures are single-page; later pages are empty by construction.
    if page > 1 {
      return Ok(empty);
    }

    let Some(slot) = slot_for_query(query) else {
      return Ok(empty);
    };
    let Ok(raw) = std::env::var(slot) else {
      return Ok(empty);
    };

    let v: serde_json::Value =
      serde_json::from_str(&raw).with_context(|| format!("{} is not valid JSON", slot))?;

    let items = match &v {
      serde_json::Value::Array(arr) => arr.clone(),
      serde_json::Value::Object(map) => match repo_in_query(query).and_then(|r| map.get(&r).cloned()) {
        Some(serde_json::Value::Array(arr)) => arr,
        _ => Vec::new(),
      },
      _ => bail!("{} must be an array or a repo-keyed object", slot),
    };

    Ok(serde_json::json!({"total_count": items.len(), "items": items}))
  }
}

fn env_wants_mock() -> bool {
  FIXTURE_SLOTS.iter().any(|slot| std::env::var(slot).is_ok())
}

/// Default backend: env fixtures when present, HTTP otherwise. Both are
/// wrapped in the per-run cache.
pub fn make_default_api() -> Box<dyn GithubSearchApi> {
  if env_wants_mock() {
    return Box::new(GithubCachedApi::new(Box::new(GithubEnvApi)));
  }

  let token = get_github_token();

  if token.is_none() {
    log::warn!("[github] no token found; searching unauthenticated (low rate limit). Set GITHUB_TOKEN or run: gh auth login");
  }

  Box::new(GithubCachedApi::new(Box::new(GithubHttpApi::new(token))))
}

/// Env-fixture backend, for tests that inject fixtures explicitly.
pub fn make_env_api() -> Box<dyn GithubSearchApi> {
  Box::new(GithubCachedApi::new(Box::new(GithubEnvApi)))
}

#[cfg(test)]
mod tests {
  use super::*;
  use serial_test::serial;

  #[test]
  fn slots_map_to_query_qualifiers() {
    assert_eq!(
      slot_for_query("repo:a/b is:pr created:2025-01-01T00:00:00Z..2025-01-01T23:59:59Z"),
      Some("DRM_TEST_PRS_OPENED_JSON")
    );
    assert_eq!(
      slot_for_query("repo:a/b is:pr is:merged merged:2025-01-01T00:00:00Z..2025-01-01T23:59:59Z"),
      Some("DRM_TEST_PRS_MERGED_JSON")
    );
    assert_eq!(
      slot_for_query("repo:a/b is:issue closed:2025-01-01T00:00:00Z..2025-01-01T23:59:59Z"),
      Some("DRM_TEST_ISSUES_CLOSED_JSON")
    );
    assert_eq!(
      slot_for_query("repo:a/b is:issue updated:2025-01-01T00:00:00Z..2025-01-01T23:59:59Z"),
      Some("DRM_TEST_ISSUES_UPDATED_JSON")
    );
    assert_eq!(slot_for_query("plain text"), None);
  }

  #[test]
  fn repo_qualifier_is_extracted() {
    assert_eq!(repo_in_query("repo:acme/frontend is:pr").as_deref(), Some("acme/frontend"));
    assert_eq!(repo_in_query("is:pr"), None);
  }

  #[test]
  #[serial]
  fn env_api_serves_array_fixture_to_any_repo() {
    std::env::set_var(
      "DRM_TEST_PRS_OPENED_JSON",
      serde_json::json!([{ "number": 1, "title": "T", "html_url": "u", "user": {"login": "ann"} }]).to_string(),
    );

    let api = GithubEnvApi;
    let v = api.search_issues_json("repo:acme/frontend is:pr created:a..b", 1).unwrap();
    assert_eq!(v["total_count"], 1);
    assert_eq!(v["items"][0]["number"], 1);

    // later pages are empty
    let v2 = api.search_issues_json("repo:acme/frontend is:pr created:a..b", 2).unwrap();
    assert_eq!(v2["items"].as_array().unwrap().len(), 0);

    std::env::remove_var("DRM_TEST_PRS_OPENED_JSON");
  }

  #[test]
  #[serial]
  fn env_api_repo_keyed_fixture_scopes_items() {
    std::env::set_var(
      "DRM_TEST_ISSUES_CLOSED_JSON",
      serde_json::json!({
        "acme/backend": [{ "number": 9, "title": "Fix", "html_url": "u", "user": {"login": "hans"} }]
      })
      .to_string(),
    );

    let api = GithubEnvApi;
    let hit = api.search_issues_json("repo:acme/backend is:issue closed:a..b", 1).unwrap();
    assert_eq!(hit["total_count"], 1);

    let miss = api.search_issues_json("repo:acme/frontend is:issue closed:a..b", 1).unwrap();
    assert_eq!(miss["total_count"], 0);

    std::env::remove_var("DRM_TEST_ISSUES_CLOSED_JSON");
  }

  struct CountingApi {
    calls: std::rc::Rc<RefCell<u32>>,
  }

  impl GithubSearchApi for CountingApi {
    fn search_issues_json(&self, _query: &str, _page: u32) -> Result<serde_json::Value> {
      *self.calls.borrow_mut() += 1;
      Ok(serde_json::json!({"total_count": 0, "items": []}))
    }
  }

  #[test]
  fn cached_api_memoizes_pages() {
    let calls = std::rc::Rc::new(RefCell::new(0u32));
    let cached = GithubCachedApi::new(Box::new(CountingApi { calls: calls.clone() }));

    cached.search_issues_json("q", 1).unwrap();
    cached.search_issues_json("q", 1).unwrap();
    cached.search_issues_json("q", 2).unwrap();

    assert_eq!(*calls.borrow(), 2);
  }

  #[test]
  fn retryable_statuses_cover_rate_limit_and_server_errors() {
    assert!(retryable_status(403));
    assert!(retryable_status(429));
    assert!(retryable_status(502));
    assert!(!retryable_status(404));
    assert!(!retryable_status(422));
  }
}
