//! Authentication against the INSEE API portal.
//!
//! Two kinds of applications exist on the portal: ones holding a plain
//! subscription key, sent as-is on every call, and OAuth2 applications that
//! trade a client id and secret for a bearer token first. Both end up as an
//! [`AuthHeader`] attached to the registry requests.

use core::fmt;

use chrono::{DateTime, Utc};
use oauth2::basic::BasicClient;
use oauth2::reqwest::http_client;
use oauth2::{AuthType, AuthUrl, ClientId, ClientSecret, TokenResponse, TokenUrl};
use reqwest::blocking::RequestBuilder;
use tracing::{error, info};

use crate::error::{AuthError, ConfigError};

/// Header carrying a static subscription key.
pub const API_KEY_HEADER: &str = "X-INSEE-Api-Key-Integration";

pub const DEFAULT_TOKEN_URL: &str = "https://api.insee.fr/token";

/// Keeps the first 8 characters of a secret, enough to recognize it in a log.
pub fn mask(secret: &str) -> String {
    let prefix: String = secret.chars().take(8).collect();
    format!("{}...", prefix)
}

/// Access token obtained from the token endpoint. Valid for the whole run.
#[derive(Clone)]
pub struct BearerToken {
    value: String,
    pub obtained_at: DateTime<Utc>,
}

impl BearerToken {
    pub fn new(value: String) -> Self {
        Self {
            value,
            obtained_at: Utc::now(),
        }
    }

    pub fn secret(&self) -> &str {
        &self.value
    }
}

impl fmt::Debug for BearerToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BearerToken")
            .field("value", &mask(&self.value))
            .field("obtained_at", &self.obtained_at)
            .finish()
    }
}

#[derive(Clone)]
pub enum AuthHeader {
    ApiKey(String),
    Bearer(BearerToken),
}

impl fmt::Debug for AuthHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthHeader::ApiKey(key) => f.debug_tuple("ApiKey").field(&mask(key)).finish(),
            AuthHeader::Bearer(token) => f.debug_tuple("Bearer").field(token).finish(),
        }
    }
}

impl AuthHeader {
    pub fn apply(&self, request: RequestBuilder) -> RequestBuilder {
        match self {
            AuthHeader::ApiKey(key) => request.header(API_KEY_HEADER, key),
            AuthHeader::Bearer(token) => request.bearer_auth(token.secret()),
        }
    }
}

#[derive(Clone)]
pub enum Authenticator {
    StaticKey(String),
    OAuth2ClientCredentials {
        client_id: ClientId,
        client_secret: ClientSecret,
        token_url: TokenUrl,
    },
}

impl Authenticator {
    pub fn static_key(key: impl Into<String>) -> Self {
        Authenticator::StaticKey(key.into())
    }

    pub fn client_credentials(
        client_id: String,
        client_secret: String,
        token_url: &str,
    ) -> Result<Self, ConfigError> {
        let token_url =
            TokenUrl::new(token_url.to_string()).map_err(|source| ConfigError::InvalidUrl {
                name: "token URL",
                value: token_url.to_string(),
                source,
            })?;

        Ok(Authenticator::OAuth2ClientCredentials {
            client_id: ClientId::new(client_id),
            client_secret: ClientSecret::new(client_secret),
            token_url,
        })
    }

    /// One line telling which credentials are in use, secrets masked.
    pub fn describe(&self) -> String {
        match self {
            Authenticator::StaticKey(key) => format!("Using API key: {}", mask(key)),
            Authenticator::OAuth2ClientCredentials {
                client_id,
                token_url,
                ..
            } => format!(
                "Using OAuth2 client: {} (token endpoint {})",
                client_id.as_str(),
                token_url.as_str()
            ),
        }
    }

    /// Produces the header for registry calls. Only the OAuth2 variant
    /// touches the network, with a single POST to the token endpoint.
    pub fn authenticate(&self) -> Result<AuthHeader, AuthError> {
        match self {
            Authenticator::StaticKey(key) => Ok(AuthHeader::ApiKey(key.clone())),
            Authenticator::OAuth2ClientCredentials {
                client_id,
                client_secret,
                token_url,
            } => {
                let token = exchange_client_credentials(client_id, client_secret, token_url)?;
                info!(
                    client_id = client_id.as_str(),
                    obtained_at = %token.obtained_at,
                    "obtained bearer token"
                );
                Ok(AuthHeader::Bearer(token))
            }
        }
    }
}

impl fmt::Debug for Authenticator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Authenticator::StaticKey(key) => f.debug_tuple("StaticKey").field(&mask(key)).finish(),
            Authenticator::OAuth2ClientCredentials {
                client_id,
                client_secret,
                token_url,
            } => f
                .debug_struct("OAuth2ClientCredentials")
                .field("client_id", client_id)
                .field("client_secret", client_secret)
                .field("token_url", &token_url.as_str())
                .finish(),
        }
    }
}

fn exchange_client_credentials(
    client_id: &ClientId,
    client_secret: &ClientSecret,
    token_url: &TokenUrl,
) -> Result<BearerToken, AuthError> {
    // The client-credentials grant never visits the authorization endpoint.
    let client = BasicClient::new(
        client_id.clone(),
        Some(client_secret.clone()),
        AuthUrl::from_url(token_url.url().clone()),
        Some(token_url.clone()),
    )
    .set_auth_type(AuthType::RequestBody);

    let mut rejected = None;
    let token_result = client.exchange_client_credentials().request(|request| {
        http_client(request).map(|response| {
            if !response.status_code.is_success() {
                rejected = Some((
                    response.status_code.as_u16(),
                    String::from_utf8_lossy(&response.body).into_owned(),
                ));
            }
            response
        })
    });

    match token_result {
        Ok(token) => {
            let value = token.access_token().secret();
            if value.is_empty() {
                error!(
                    token_url = token_url.as_str(),
                    "token endpoint returned an empty access_token"
                );
                return Err(AuthError::Exchange("empty access_token".to_string()));
            }
            Ok(BearerToken::new(value.clone()))
        }
        Err(e) => {
            if let Some((status, body)) = rejected {
                error!(
                    token_url = token_url.as_str(),
                    status,
                    body = %body,
                    "token request rejected"
                );
                Err(AuthError::Rejected { status, body })
            } else {
                error!(token_url = token_url.as_str(), error = %e, "token request failed");
                Err(AuthError::Exchange(e.to_string()))
            }
        }
    }
}
