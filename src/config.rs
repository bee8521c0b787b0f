/// Server configuration from environment variables
///
/// The deployment surface is small enough that a flat env-var scheme works:
/// everything has a sensible default except credentials, and a missing
/// credential just disables the provider that needed it.

use crate::contact::email::{EmailProvider, Mailer, ResendProvider, SmtpProvider};
use crate::contact::store::SubmissionStore;
use std::net::SocketAddr;
use std::path::PathBuf;
use tracing::warn;

const DEFAULT_BIND_ADDR: &str = "127.0.0.1:5000";
const DEFAULT_CATALOG_PATH: &str = "data/catalog.json";
const DEFAULT_EMAIL_FROM: &str = "no-reply@nest-portfolio.local";

#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Address the HTTP server binds to (`BIND_ADDR`)
    pub bind_addr: SocketAddr,
    /// SQLite database location (`DATABASE_PATH`)
    pub db_path: PathBuf,
    /// Image catalog JSON (`CATALOG_PATH`)
    pub catalog_path: PathBuf,
    /// Bearer token guarding the submission listing (`ADMIN_TOKEN`);
    /// unset means the listing endpoint is disabled
    pub admin_token: Option<String>,
    /// Transactional provider key (`RESEND_API_KEY`)
    pub resend_api_key: Option<String>,
    /// Sender address (`EMAIL_FROM`)
    pub email_from: String,
    /// Where contact notifications go (`CONTACT_EMAIL`)
    pub contact_email: Option<String>,
    /// SMTP fallback (`SMTP_HOST`, `SMTP_USERNAME`, `SMTP_PASSWORD`)
    pub smtp_host: Option<String>,
    pub smtp_username: Option<String>,
    pub smtp_password: Option<String>,
}

fn env_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

impl AppConfig {
    /// Read the full configuration from the environment. A malformed bind
    /// address is fatal; everything else degrades to a default.
    pub fn from_env() -> Self {
        let bind_addr = env_var("BIND_ADDR")
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string())
            .parse()
            .expect("BIND_ADDR must be a host:port address");

        let db_path = env_var("DATABASE_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(SubmissionStore::default_db_path);

        let catalog_path = env_var("CATALOG_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CATALOG_PATH));

        AppConfig {
            bind_addr,
            db_path,
            catalog_path,
            admin_token: env_var("ADMIN_TOKEN"),
            resend_api_key: env_var("RESEND_API_KEY"),
            email_from: env_var("EMAIL_FROM").unwrap_or_else(|| DEFAULT_EMAIL_FROM.to_string()),
            contact_email: env_var("CONTACT_EMAIL"),
            smtp_host: env_var("SMTP_HOST"),
            smtp_username: env_var("SMTP_USERNAME"),
            smtp_password: env_var("SMTP_PASSWORD"),
        }
    }

    /// Assemble the provider chain from whatever credentials are present:
    /// Resend first, SMTP as the backup. No credentials means a disabled
    /// mailer — submissions are still stored, delivery is skipped.
    pub fn build_mailer(&self) -> Mailer {
        let Some(contact_email) = &self.contact_email else {
            warn!("CONTACT_EMAIL not set; email notifications disabled");
            return Mailer::disabled();
        };

        let mut providers: Vec<Box<dyn EmailProvider>> = Vec::new();

        if let Some(api_key) = &self.resend_api_key {
            providers.push(Box::new(ResendProvider::new(
                api_key.clone(),
                self.email_from.clone(),
                contact_email.clone(),
            )));
        }

        if let (Some(host), Some(user), Some(pass)) =
            (&self.smtp_host, &self.smtp_username, &self.smtp_password)
        {
            match SmtpProvider::new(
                host,
                user.clone(),
                pass.clone(),
                self.email_from.clone(),
                contact_email.clone(),
            ) {
                Ok(provider) => providers.push(Box::new(provider)),
                Err(e) => warn!(error = %e, "SMTP fallback misconfigured; skipping"),
            }
        }

        if providers.is_empty() {
            warn!("no email provider credentials set; email notifications disabled");
        }
        Mailer::new(providers)
    }
}
