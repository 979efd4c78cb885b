// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Dispatch rendered team reports over SMTP, with mock-recipient override for rehearsals
// role: dispatch/email
// inputs: SMTP_HOST/SENDER_EMAIL/SMTP_APP_PASSWORD/RECEIVER_EMAIL env; MOCK_MODE + MOCK_RECEIVER_EMAIL; TEAM_<KEY>_EXTRA_RECIPIENTS
// outputs: One HTML mail per team via STARTTLS relay
// side_effects: Network (SMTP session) per send
// invariants:
// - MOCK_MODE with a mock address replaces the entire recipient list
// - Credential gaps surface before any SMTP session is opened
// errors: Address parse and transport errors propagate with subject context
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use anyhow::{Context, Result, bail};
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};

use crate::util::truthy_env;

const DEFAULT_SMTP_HOST: &str = "smtp.gmail.com";

fn env_opt(var: &str) -> Option<String> {
  std::env::var(var).ok().map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

#[derive(Debug, Clone)]
pub struct MailConfig {
  pub host: String,
  pub sender: Option<String>,
  pub password: Option<String>,
  pub receiver: Option<String>,
}

impl MailConfig {
  pub fn from_env() -> Self {
    Self {
      host: env_opt("SMTP_HOST").unwrap_or_else(|| DEFAULT_SMTP_HOST.to_string()),
      sender: env_opt("SENDER_EMAIL"),
      password: env_opt("SMTP_APP_PASSWORD"),
      receiver: env_opt("RECEIVER_EMAIL"),
    }
  }

  /// Sending needs credentials and at least one reachable recipient source;
  /// dry runs and JSON dumps don't.
  pub fn require_sendable(&self) -> Result<()> {
    if self.sender.is_none() {
      bail!("SENDER_EMAIL is not set");
    }
    if self.password.is_none() {
      bail!("SMTP_APP_PASSWORD is not set");
    }
    if self.receiver.is_none() && env_opt("MOCK_RECEIVER_EMAIL").is_none() {
      bail!("RECEIVER_EMAIL is not set (and no MOCK_RECEIVER_EMAIL to fall back to)");
    }
    Ok(())
  }
}

/// Recipients for one team: the base receiver plus per-team extras, replaced
/// wholesale by the mock address when MOCK_MODE is on.
pub fn recipients_for_team(cfg: &MailConfig, team_key: &str) -> Vec<String> {
  if truthy_env("MOCK_MODE") {
    if let Some(mock) = env_opt("MOCK_RECEIVER_EMAIL") {
      return vec![mock];
    }
    log::warn!("[mail] MOCK_MODE is on but MOCK_RECEIVER_EMAIL is empty; using real recipients");
  }

  let mut out: Vec<String> = Vec::new();

  if let Some(base) = &cfg.receiver {
    out.push(base.clone());
  }

  let extras_var = format!("TEAM_{}_EXTRA_RECIPIENTS", team_key.to_uppercase().replace('-', "_"));

  if let Some(extras) = env_opt(&extras_var) {
    for addr in extras.split(',').map(str::trim).filter(|s| !s.is_empty()) {
      out.push(addr.to_string());
    }
  }

  out
}

pub fn send_report(cfg: &MailConfig, subject: &str, html: &str, recipients: &[String]) -> Result<()> {
  let Some(sender) = &cfg.sender else {
    bail!("SENDER_EMAIL is not set");
  };
  let Some(password) = &cfg.password else {
    bail!("SMTP_APP_PASSWORD is not set");
  };

  if recipients.is_empty() {
    bail!("no recipients configured (set RECEIVER_EMAIL or MOCK_RECEIVER_EMAIL)");
  }

  let mut builder = Message::builder()
    .from(sender.parse().with_context(|| format!("invalid sender address {:?}", sender))?)
    .subject(subject)
    .header(ContentType::TEXT_HTML);

  for to in recipients {
    builder = builder.to(to.parse().with_context(|| format!("invalid recipient address {:?}", to))?);
  }

  let message = builder.body(html.to_string()).context("assembling report mail")?;

  let mailer = SmtpTransport::starttls_relay(&cfg.host)
    .with_context(|| format!("connecting SMTP relay {}", cfg.host))?
    .credentials(Credentials::new(sender.clone(), password.clone()))
    .build();

  mailer.send(&message).with_context(|| format!("sending {:?}", subject))?;
  log::info!("[mail] sent {:?} to {} recipient(s)", subject, recipients.len());

  Ok(())
}
