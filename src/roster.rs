use anyhow::{Context, Result, bail};

// Team and developer rosters are environment-driven:
//   TEAMS=frontend,backend
//   TEAM_FRONTEND_REPO=acme/frontend
//   TEAM_FRONTEND_DEVELOPERS=Gerald=gerald-gh,Jesreal=jesreal-gh
// Keys are upper-cased (dashes become underscores) when forming var names.

#[derive(Debug, Clone)]
pub struct Developer {
  pub name: String,
  pub login: String,
}

#[derive(Debug, Clone)]
pub struct Team {
  pub key: String,
  pub repo: String,
  pub developers: Vec<Developer>,
}

#[derive(Debug, Clone)]
pub struct Roster {
  pub teams: Vec<Team>,
}

fn env_key(team_key: &str, suffix: &str) -> String {
  format!("TEAM_{}_{}", team_key.to_uppercase().replace('-', "_"), suffix)
}

fn parse_developers(team_key: &str, raw: &str) -> Result<Vec<Developer>> {
  let mut out: Vec<Developer> = Vec::new();

  for pair in raw.split(',').map(str::trim).filter(|s| !s.is_empty()) {
    let Some((name, login)) = pair.split_once('=') else {
      bail!("team {}: developer entry {:?} is not Name=github-login", team_key, pair);
    };
    let name = name.trim();
    let login = login.trim();

    if name.is_empty() || login.is_empty() {
      bail!("team {}: developer entry {:?} has an empty side", team_key, pair);
    }

    out.push(Developer {
      name: name.to_string(),
      login: login.to_string(),
    });
  }

  if out.is_empty() {
    bail!("team {} has no developers", team_key);
  }

  Ok(out)
}

impl Roster {
  pub fn from_env() -> Result<Self> {
    let teams_raw = std::env::var("TEAMS").context("TEAMS is not set (comma-separated team keys)")?;
    let mut teams: Vec<Team> = Vec::new();

    for key in teams_raw.split(',').map(str::trim).filter(|s| !s.is_empty()) {
      let repo_var = env_key(key, "REPO");
      let repo = std::env::var(&repo_var).with_context(|| format!("{} is not set", repo_var))?;
      let repo = repo.trim().to_string();

      if !repo.contains('/') {
        bail!("{}={:?} is not owner/name", repo_var, repo);
      }

      let devs_var = env_key(key, "DEVELOPERS");
      let devs_raw = std::env::var(&devs_var).with_context(|| format!("{} is not set", devs_var))?;

      teams.push(Team {
        key: key.to_string(),
        repo,
        developers: parse_developers(key, &devs_raw)?,
      });
    }

    if teams.is_empty() {
      bail!("TEAMS is empty");
    }

    Ok(Self { teams })
  }
}

impl Team {
  /// Map a GitHub login to the canonical developer name. Bot and excluded
  /// accounts resolve to None, as do logins outside the roster.
  pub fn resolve(&self, login: &str) -> Option<&str> {
    if is_excluded_author(login) {
      return None;
    }

    self
      .developers
      .iter()
      .find(|d| d.login.eq_ignore_ascii_case(login))
      .map(|d| d.name.as_str())
  }

  pub fn developer_names(&self) -> Vec<&str> {
    self.developers.iter().map(|d| d.name.as_str()).collect()
  }
}

/// Automated accounts never count as developer activity. GitHub App bots
/// carry a `[bot]` suffix; EXCLUDED_AUTHORS adds service accounts that don't.
pub fn is_excluded_author(login: &str) -> bool {
  if login.ends_with("[bot]") {
    return true;
  }

  match std::env::var("EXCLUDED_AUTHORS") {
    Ok(raw) => raw
      .split(',')
      .map(str::trim)
      .filter(|s| !s.is_empty())
      .any(|ex| ex.eq_ignore_ascii_case(login)),
    Err(_) => false,
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use serial_test::serial;

  fn set_team_env() {
    std::env::set_var("TEAMS", "frontend, backend");
    std::env::set_var("TEAM_FRONTEND_REPO", "acme/frontend");
    std::env::set_var("TEAM_FRONTEND_DEVELOPERS", "Gerald=gerald-gh, Jesreal=jesreal-gh");
    std::env::set_var("TEAM_BACKEND_REPO", "acme/backend");
    std::env::set_var("TEAM_BACKEND_DEVELOPERS", "Gerald=gerald-gh,Hans=hans-gh");
  }

  fn clear_team_env() {
    for k in [
      "TEAMS",
      "TEAM_FRONTEND_REPO",
      "TEAM_FRONTEND_DEVELOPERS",
      "TEAM_BACKEND_REPO",
      "TEAM_BACKEND_DEVELOPERS",
      "EXCLUDED_AUTHORS",
    ] {
      std::env::remove_var(k);
    }
  }

  #[test]
  #[serial]
  fn roster_reads_teams_from_env() {
    set_team_env();
    let roster = Roster::from_env().unwrap();
    assert_eq!(roster.teams.len(), 2);
    assert_eq!(roster.teams[0].key, "frontend");
    assert_eq!(roster.teams[0].repo, "acme/frontend");
    assert_eq!(roster.teams[0].developer_names(), vec!["Gerald", "Jesreal"]);
    clear_team_env();
  }

  #[test]
  #[serial]
  fn roster_requires_repo_and_developers() {
    clear_team_env();
    std::env::set_var("TEAMS", "frontend");
    assert!(Roster::from_env().is_err());

    std::env::set_var("TEAM_FRONTEND_REPO", "not-a-repo");
    std::env::set_var("TEAM_FRONTEND_DEVELOPERS", "Gerald=gerald-gh");
    assert!(Roster::from_env().is_err());
    clear_team_env();
  }

  #[test]
  #[serial]
  fn resolve_is_case_insensitive_and_skips_bots() {
    set_team_env();
    let roster = Roster::from_env().unwrap();
    let team = &roster.teams[0];
    assert_eq!(team.resolve("Gerald-GH"), Some("Gerald"));
    assert_eq!(team.resolve("stranger"), None);
    assert_eq!(team.resolve("dependabot[bot]"), None);
    clear_team_env();
  }

  #[test]
  #[serial]
  fn excluded_authors_env_adds_service_accounts() {
    clear_team_env();
    std::env::set_var("EXCLUDED_AUTHORS", "ci-robot, deploy-user");
    assert!(is_excluded_author("CI-Robot"));
    assert!(is_excluded_author("github-actions[bot]"));
    assert!(!is_excluded_author("gerald-gh"));
    std::env::remove_var("EXCLUDED_AUTHORS");
  }
}
