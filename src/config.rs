use std::path::PathBuf;

use clap::Parser;
use reqwest::header::HeaderValue;

use crate::api::{Siren, Siret};
use crate::auth::{Authenticator, DEFAULT_TOKEN_URL};
use crate::error::ConfigError;
use crate::report::DEFAULT_REPORT_FILE;
use crate::PRODUCTION_BASE_URL;

pub const DEFAULT_SIREN: &str = "497784454";
pub const DEFAULT_SIRET: &str = "49778445400041";

const PORTAL_URL: &str = "https://portail-api.insee.fr/";

/// Values shipped as examples in setup instructions; never real credentials.
const PLACEHOLDERS: &[&str] = &["YOUR_API_KEY_HERE", "YOUR_CLIENT_ID", "YOUR_CLIENT_SECRET"];

#[derive(Parser, Debug)]
#[command(
    name = "sirene-client",
    version,
    about = "Look up companies in the INSEE Sirene registry and save the answers to a report"
)]
pub struct Cli {
    #[arg(long, env = "INSEE_API_KEY", hide_env_values = true, help = "Portal subscription key")]
    pub api_key: Option<String>,

    #[arg(long, env = "INSEE_CLIENT_ID", help = "OAuth2 client id")]
    pub client_id: Option<String>,

    #[arg(long, env = "INSEE_CLIENT_SECRET", hide_env_values = true, help = "OAuth2 client secret")]
    pub client_secret: Option<String>,

    #[arg(long, env = "INSEE_SIREN", default_value = DEFAULT_SIREN, help = "SIREN to look up (9 digits)")]
    pub siren: String,

    #[arg(long, env = "INSEE_SIRET", default_value = DEFAULT_SIRET, help = "SIRET to look up (14 digits)")]
    pub siret: String,

    #[arg(long, env = "INSEE_BASE_URL", default_value = PRODUCTION_BASE_URL)]
    pub base_url: String,

    #[arg(long, env = "INSEE_TOKEN_URL", default_value = DEFAULT_TOKEN_URL)]
    pub token_url: String,

    #[arg(short, long, env = "INSEE_OUTPUT", default_value = DEFAULT_REPORT_FILE)]
    pub output: PathBuf,
}

/// Validated run configuration.
#[derive(Debug, Clone)]
pub struct Settings {
    pub authenticator: Authenticator,
    pub siren: Siren,
    pub siret: Siret,
    pub base_url: String,
    pub output: PathBuf,
}

fn configured(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty() && !PLACEHOLDERS.contains(v))
        .map(str::to_string)
}

impl Settings {
    pub fn from_cli(cli: &Cli) -> Result<Self, ConfigError> {
        let authenticator = match (
            configured(&cli.api_key),
            configured(&cli.client_id),
            configured(&cli.client_secret),
        ) {
            (Some(_), Some(_), _) | (Some(_), _, Some(_)) => {
                return Err(ConfigError::AmbiguousCredentials)
            }
            (Some(key), None, None) => {
                HeaderValue::from_str(&key).map_err(|_| ConfigError::InvalidApiKey)?;
                Authenticator::static_key(key)
            }
            (None, Some(id), Some(secret)) => {
                Authenticator::client_credentials(id, secret, &cli.token_url)?
            }
            (None, Some(_), None) => {
                return Err(ConfigError::IncompleteClientCredentials {
                    missing: "INSEE_CLIENT_SECRET",
                })
            }
            (None, None, Some(_)) => {
                return Err(ConfigError::IncompleteClientCredentials {
                    missing: "INSEE_CLIENT_ID",
                })
            }
            (None, None, None) => return Err(ConfigError::MissingCredentials),
        };

        url::Url::parse(&cli.base_url).map_err(|source| ConfigError::InvalidUrl {
            name: "base URL",
            value: cli.base_url.clone(),
            source,
        })?;

        Ok(Settings {
            authenticator,
            siren: cli.siren.parse()?,
            siret: cli.siret.parse()?,
            base_url: cli.base_url.trim_end_matches('/').to_string(),
            output: cli.output.clone(),
        })
    }
}

impl Cli {
    /// Instructions printed when no credentials are configured.
    pub fn setup_guidance(&self) -> String {
        let base_url = self.base_url.trim_end_matches('/');
        let lines = [
            "\nWARNING: API credentials not configured!".to_string(),
            "\nTo use this tool, you need to:".to_string(),
            format!("1. Go to {}", PORTAL_URL),
            "2. Create an account and log in".to_string(),
            "3. Create an application".to_string(),
            "4. Subscribe to the 'Sirene' API".to_string(),
            "5. Copy your API subscription key, or the application's client id and secret".to_string(),
            "6. Export INSEE_API_KEY, or INSEE_CLIENT_ID and INSEE_CLIENT_SECRET".to_string(),
            "\nThe API endpoints this tool will use:".to_string(),
            format!("  - SIREN endpoint: {}/siren/{}", base_url, self.siren.trim()),
            format!("  - SIRET endpoint: {}/siret/{}", base_url, self.siret.trim()),
            "\nWhat this API returns:".to_string(),
            "  - Company legal information (name, legal form, address)".to_string(),
            "  - Establishment details".to_string(),
            "  - Activity codes (NAF/APE)".to_string(),
            "  - Registration status and dates".to_string(),
            "  - And more company registry data".to_string(),
        ];
        lines.join("\n")
    }
}
