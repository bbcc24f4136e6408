use tracing::{info, warn};

use crate::error::LookupError;
use crate::ApiClient;

use super::{Identifier, QueryResult, Siren, Siret};

/// Lookups against the Sirene registry endpoints.
pub struct Sirene<'a> {
    client: &'a dyn ApiClient,
}

impl<'a> Sirene<'a> {
    pub fn new(client: &'a dyn ApiClient) -> Self {
        Self { client }
    }

    /// Legal unit data: GET `/siren/{siren}`
    pub fn lookup_by_siren(&self, siren: &Siren) -> QueryResult {
        self.lookup(siren)
    }

    /// Establishment data: GET `/siret/{siret}`
    pub fn lookup_by_siret(&self, siret: &Siret) -> QueryResult {
        self.lookup(siret)
    }

    fn lookup<I: Identifier>(&self, id: &I) -> QueryResult {
        let path = format!("/{}/{}", I::KIND.path_segment(), id.as_str());

        let payload = match self.client.http_get(&path) {
            Ok(data) => {
                info!(kind = %I::KIND, id = %id, "lookup succeeded");
                Some(data)
            }
            Err(LookupError::Status { status, kind, body }) => {
                warn!(
                    kind = %I::KIND,
                    id = %id,
                    status = status.as_u16(),
                    reason = %kind,
                    body = %body,
                    "lookup rejected"
                );
                None
            }
            Err(e) => {
                warn!(kind = %I::KIND, id = %id, error = %e, "lookup failed");
                None
            }
        };

        QueryResult::new(I::KIND, id.as_str(), payload)
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::collections::HashMap;

    use reqwest::StatusCode;
    use serde_json::{json, Value};

    use super::*;
    use crate::api::QueryType;
    use crate::error::ApiException;

    #[derive(Default)]
    struct FakeClient {
        answers: HashMap<String, Value>,
        calls: RefCell<Vec<String>>,
    }

    impl FakeClient {
        fn answering(mut self, path: &str, data: Value) -> Self {
            self.answers.insert(path.to_string(), data);
            self
        }
    }

    impl ApiClient for FakeClient {
        fn http_get(&self, path: &str) -> Result<Value, LookupError> {
            self.calls.borrow_mut().push(path.to_string());
            self.answers
                .get(path)
                .cloned()
                .ok_or_else(|| LookupError::Status {
                    status: StatusCode::NOT_FOUND,
                    kind: ApiException::UnknownIdentifier,
                    body: r#"{"header":{"statut":404}}"#.to_string(),
                })
        }
    }

    #[test]
    fn siren_lookup_hits_siren_endpoint() {
        let client = FakeClient::default()
            .answering("/siren/497784454", json!({"siren": "497784454"}));
        let sirene = Sirene::new(&client);

        let result = sirene.lookup_by_siren(&"497784454".parse().unwrap());

        assert_eq!(result.query_type, QueryType::Siren);
        assert_eq!(result.query_value, "497784454");
        assert_eq!(result.payload, Some(json!({"siren": "497784454"})));
        assert_eq!(*client.calls.borrow(), vec!["/siren/497784454"]);
    }

    #[test]
    fn failed_lookup_yields_no_payload() {
        let client = FakeClient::default();
        let sirene = Sirene::new(&client);

        let result = sirene.lookup_by_siret(&"49778445400041".parse().unwrap());

        assert_eq!(result.query_type, QueryType::Siret);
        assert_eq!(result.query_value, "49778445400041");
        assert!(!result.is_success());
        assert_eq!(*client.calls.borrow(), vec!["/siret/49778445400041"]);
    }
}
