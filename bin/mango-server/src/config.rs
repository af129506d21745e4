//! Server configuration, loaded from environment variables at startup and
//! optionally overridden by command-line flags.

use std::path::PathBuf;

use clap::Parser;

/// Placeholder admin code used when `MANGO_ADMIN_ACCESS_CODE` is unset.
pub const DEFAULT_ACCESS_CODE: &str = "mango2024";

/// PDF upload limit used when none (or zero) is configured, in MiB.
pub const DEFAULT_MAX_PDF_MB: usize = 10;

/// Runtime configuration for mango-server.
///
/// Every field has a default so the console starts against a local backend
/// without any environment variables set.
#[derive(Debug, Clone)]
pub struct Config {
    /// TCP address to bind (default: `"0.0.0.0:3000"`).
    pub bind_address: String,

    /// Base URL of the knowledge-base backend (default: `"http://localhost:8000"`).
    pub backend_url: String,

    /// Code typed into the admin login form.
    pub admin_access_code: String,

    /// Lifetime of the admin session cookie, in seconds (default: two hours).
    pub admin_session_max_age_secs: u64,

    /// Mark the session cookie `Secure` (enable behind HTTPS).
    pub secure_cookies: bool,

    /// `tracing` filter string, e.g. `"info"` or `"debug,tower_http=warn"`.
    pub log_level: String,

    /// When `true`, emit log records as newline-delimited JSON.
    pub log_json: bool,

    /// Comma-separated list of allowed CORS origins; `None` allows any.
    pub cors_allowed_origins: Option<String>,

    /// Serve Swagger UI and the OpenAPI document.
    pub enable_swagger: bool,

    /// Largest PDF accepted for upload, in bytes (default: 10 MiB).
    pub max_pdf_bytes: usize,

    /// Optional TOML file overriding the built-in suggestion lexicon.
    pub suggestions_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:3000".into(),
            backend_url: "http://localhost:8000".into(),
            admin_access_code: DEFAULT_ACCESS_CODE.into(),
            admin_session_max_age_secs: 60 * 60 * 2,
            secure_cookies: false,
            log_level: "info".into(),
            log_json: false,
            cors_allowed_origins: None,
            enable_swagger: true,
            max_pdf_bytes: pdf_limit_bytes(DEFAULT_MAX_PDF_MB),
            suggestions_path: None,
        }
    }
}

impl Config {
    /// Build [`Config`] from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        let d = Self::default();
        Self {
            bind_address: env_or("MANGO_BIND", &d.bind_address),
            backend_url: env_or("MANGO_BACKEND_URL", &d.backend_url),
            admin_access_code: env_or("MANGO_ADMIN_ACCESS_CODE", &d.admin_access_code),
            admin_session_max_age_secs: parse_env(
                "MANGO_ADMIN_SESSION_SECS",
                d.admin_session_max_age_secs,
            ),
            secure_cookies: flag_env("MANGO_SECURE_COOKIES", d.secure_cookies),
            log_level: env_or("MANGO_LOG", &d.log_level),
            log_json: flag_env("MANGO_LOG_JSON", d.log_json),
            cors_allowed_origins: std::env::var("MANGO_CORS_ORIGINS").ok(),
            enable_swagger: flag_env("MANGO_ENABLE_SWAGGER", d.enable_swagger),
            max_pdf_bytes: pdf_limit_bytes(parse_env("MANGO_MAX_PDF_MB", DEFAULT_MAX_PDF_MB)),
            suggestions_path: std::env::var_os("MANGO_SUGGESTIONS_PATH").map(PathBuf::from),
        }
    }

    /// Apply command-line overrides on top of `self`.
    pub fn with_cli(mut self, cli: Cli) -> Self {
        if let Some(bind) = cli.bind {
            self.bind_address = bind;
        }
        if let Some(url) = cli.backend_url {
            self.backend_url = url;
        }
        if let Some(code) = cli.admin_access_code {
            self.admin_access_code = code;
        }
        if let Some(secs) = cli.session_max_age {
            self.admin_session_max_age_secs = secs;
        }
        if cli.secure_cookies {
            self.secure_cookies = true;
        }
        if let Some(level) = cli.log_level {
            self.log_level = level;
        }
        if cli.log_json {
            self.log_json = true;
        }
        if let Some(origins) = cli.cors_origins {
            self.cors_allowed_origins = Some(origins);
        }
        if cli.no_swagger {
            self.enable_swagger = false;
        }
        if let Some(mb) = cli.max_pdf_mb {
            self.max_pdf_bytes = pdf_limit_bytes(mb);
        }
        if let Some(path) = cli.suggestions {
            self.suggestions_path = Some(path);
        }
        self
    }

    pub fn uses_default_access_code(&self) -> bool {
        self.admin_access_code == DEFAULT_ACCESS_CODE
    }
}

/// Command-line flags; each one overrides its environment variable.
#[derive(Debug, Default, Parser)]
#[command(name = "mango-server", version, about = "Mango AI chat and admin console")]
pub struct Cli {
    /// Address to listen on (`MANGO_BIND`).
    #[arg(long)]
    pub bind: Option<String>,

    /// Knowledge-base backend base URL (`MANGO_BACKEND_URL`).
    #[arg(long)]
    pub backend_url: Option<String>,

    /// Suggestion lexicon TOML file (`MANGO_SUGGESTIONS_PATH`).
    #[arg(long)]
    pub suggestions: Option<PathBuf>,

    /// Admin login code (`MANGO_ADMIN_ACCESS_CODE`).
    #[arg(long)]
    pub admin_access_code: Option<String>,

    /// Admin session lifetime in seconds (`MANGO_ADMIN_SESSION_SECS`).
    #[arg(long)]
    pub session_max_age: Option<u64>,

    /// Mark the session cookie `Secure` (`MANGO_SECURE_COOKIES`).
    #[arg(long)]
    pub secure_cookies: bool,

    /// `tracing` filter string (`MANGO_LOG`).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Emit JSON logs (`MANGO_LOG_JSON`).
    #[arg(long)]
    pub log_json: bool,

    /// Comma-separated allowed CORS origins (`MANGO_CORS_ORIGINS`).
    #[arg(long)]
    pub cors_origins: Option<String>,

    /// Do not serve Swagger UI or the OpenAPI document (`MANGO_ENABLE_SWAGGER=false`).
    #[arg(long)]
    pub no_swagger: bool,

    /// Largest accepted PDF in MiB (`MANGO_MAX_PDF_MB`).
    #[arg(long)]
    pub max_pdf_mb: Option<usize>,
}

// ── private helpers ──────────────────────────────────────────────────────────

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_owned())
}

fn parse_env<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

/// Zero means "use the default"; huge values saturate instead of overflowing.
fn pdf_limit_bytes(mb: usize) -> usize {
    let mb = if mb == 0 { DEFAULT_MAX_PDF_MB } else { mb };
    mb.saturating_mul(1024 * 1024)
}

fn flag_env(key: &str, default: bool) -> bool {
    std::env::var(key)
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
        .unwrap_or(default)
}
