// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Utilities for text shaping (escaping, capitalization, env truthiness), output dirs, and man page rendering
// role: utilities/helpers
// inputs: Various primitives; clap CommandFactory
// outputs: Escaped/capitalized strings, directories ensured, man page text
// side_effects: prepare_out_dir creates directories
// invariants:
// - escape_html covers the five HTML-significant characters
// - prepare_out_dir returns an existing directory (either provided or temp timestamped)
// errors: IO errors bubble with context
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use anyhow::Result;
use chrono::{DateTime, Utc};
use clap::CommandFactory;

pub fn escape_html(s: &str) -> String {
  let mut out = String::with_capacity(s.len());

  for c in s.chars() {
    match c {
      '&' => out.push_str("&amp;"),
      '<' => out.push_str("&lt;"),
      '>' => out.push_str("&gt;"),
      '"' => out.push_str("&quot;"),
      '\'' => out.push_str("&#39;"),
      _ => out.push(c),
    }
  }

  out
}

/// Uppercase the first character, leaving the rest untouched.
pub fn capitalize_first(s: &str) -> String {
  let mut chars = s.chars();

  match chars.next() {
    Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
    None => String::new(),
  }
}

/// Env-flag truthiness in the loose sense the intake scripts used:
/// unset, empty, "0", "false" and "no" are off; anything else is on.
pub fn truthy_env(var: &str) -> bool {
  match std::env::var(var) {
    Ok(v) => {
      let v = v.trim().to_lowercase();
      !(v.is_empty() || v == "0" || v == "false" || v == "no")
    }
    Err(_) => false,
  }
}

/// Returns the effective "now" given an optional override.
///
/// When `override_now` is `Some`, that instant is returned; otherwise the
/// current time is used. Centralizes test determinism without sprinkling
/// `Utc::now()` throughout the code.
pub fn effective_now(override_now: Option<DateTime<Utc>>) -> DateTime<Utc> {
  override_now.unwrap_or_else(Utc::now)
}

/// Prepare an output directory for dry-run artifacts.
///
/// - When `out` is not "-", it is treated as the target directory; it will be created if needed.
/// - When `out` is "-", a temp directory is created with a timestamped name.
///   Returns the absolute path as a String.
pub fn prepare_out_dir(out: &str, now_opt: Option<DateTime<Utc>>) -> Result<String> {
  let dir = if out != "-" {
    out.to_string()
  } else {
    let eff_now = effective_now(now_opt);
    std::env::temp_dir()
      .join(format!("daily-report-{}", eff_now.format("%Y%m%d-%H%M%S")))
      .to_string_lossy()
      .to_string()
  };
  std::fs::create_dir_all(&dir)?;

  Ok(dir)
}

/// Render a section-1 man page for a clap `CommandFactory` implementor.
/// Returns the troff content as a UTF-8 string.
pub fn render_man_page<T: CommandFactory>() -> Result<String> {
  let cmd = T::command();
  let man = clap_mangen::Man::new(cmd);
  let mut buf: Vec<u8> = Vec::new();

  man.render(&mut buf)?;

  Ok(String::from_utf8_lossy(&buf).to_string())
}
