use reqwest::header::ACCEPT;
use serde_json::Value;
use tracing::debug;

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod report;
pub mod run;

use auth::{AuthHeader, Authenticator};
use error::{ApiException, AuthError, LookupError};

pub const PRODUCTION_BASE_URL: &str = "https://api.insee.fr/api-sirene/3.11";

pub trait ApiClient {
    /// GET `path` below the API base URL and decode the JSON body.
    fn http_get(&self, path: &str) -> Result<Value, LookupError>;
}

#[derive(Debug)]
pub struct SireneApi {
    authenticator: Authenticator,
    base_url: String,
    http_client: reqwest::blocking::Client,

    auth: Option<AuthHeader>,
}

impl SireneApi {
    pub fn new(authenticator: Authenticator) -> Self {
        SireneApi {
            authenticator,
            base_url: PRODUCTION_BASE_URL.to_string(),
            http_client: reqwest::blocking::Client::new(),
            auth: None,
        }
    }

    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn authenticate(&mut self) -> Result<&AuthHeader, AuthError> {
        let header = self.authenticator.authenticate()?;
        Ok(&*self.auth.insert(header))
    }
}

impl ApiClient for SireneApi {
    fn http_get(&self, path: &str) -> Result<Value, LookupError> {
        let auth = self.auth.as_ref().ok_or(LookupError::NotAuthenticated)?;
        let url = format!("{}{}", self.base_url, path);

        debug!(%url, "GET");
        let request = self.http_client.get(&url).header(ACCEPT, "application/json");
        let response = auth.apply(request).send()?;

        let status = response.status();
        let body = response.text()?;
        if !status.is_success() {
            return Err(LookupError::Status {
                status,
                kind: ApiException::from_status(status),
                body,
            });
        }

        Ok(serde_json::from_str(&body)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn refuses_to_call_before_authenticating() {
        // Nothing listens on the discard port; an issued request would fail differently.
        let api = SireneApi::new(Authenticator::static_key("ABC"))
            .with_base_url("http://127.0.0.1:9".to_string());

        let err = api.http_get("/siren/497784454").unwrap_err();
        assert!(matches!(err, LookupError::NotAuthenticated));
    }

    #[test]
    fn base_url_loses_trailing_slash() {
        let api = SireneApi::new(Authenticator::static_key("ABC"))
            .with_base_url("http://localhost:8080/api-sirene/3.11/".to_string());
        assert_eq!(api.base_url(), "http://localhost:8080/api-sirene/3.11");
    }

    #[test]
    fn authenticated_calls_reach_the_transport() {
        let addr = std::net::TcpListener::bind("127.0.0.1:0")
            .and_then(|listener| listener.local_addr())
            .unwrap();
        let mut api = SireneApi::new(Authenticator::static_key("ABC"))
            .with_base_url(format!("http://{}", addr));

        let header = api.authenticate().unwrap();
        assert!(matches!(header, AuthHeader::ApiKey(key) if key == "ABC"));

        // The listener is gone, so the request is sent and refused.
        let err = api.http_get("/siren/497784454").unwrap_err();
        assert!(matches!(err, LookupError::Transport(_)), "{err:?}");
    }
}
