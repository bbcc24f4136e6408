use core::fmt;
use std::str::FromStr;

use serde::Serialize;
use serde_json::Value;

use crate::error::ConfigError;

pub mod sirene;

/// Which registry endpoint a lookup went to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum QueryType {
    /// Legal unit, 9 digits
    Siren,
    /// Establishment, 14 digits
    Siret,
}

impl QueryType {
    pub fn digits(self) -> usize {
        match self {
            QueryType::Siren => 9,
            QueryType::Siret => 14,
        }
    }

    pub fn path_segment(self) -> &'static str {
        match self {
            QueryType::Siren => "siren",
            QueryType::Siret => "siret",
        }
    }
}

impl fmt::Display for QueryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let qt = match self {
            QueryType::Siren => "SIREN",
            QueryType::Siret => "SIRET",
        };
        write!(f, "{}", qt)
    }
}

/// A registry identifier that can be looked up.
pub trait Identifier: fmt::Display {
    const KIND: QueryType;

    fn as_str(&self) -> &str;
}

fn parse_identifier(kind: QueryType, value: &str) -> Result<String, ConfigError> {
    let trimmed = value.trim();
    if trimmed.len() != kind.digits() || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ConfigError::InvalidIdentifier {
            kind,
            value: value.to_string(),
            digits: kind.digits(),
        });
    }
    Ok(trimmed.to_string())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Siren(String);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Siret(String);

impl FromStr for Siren {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_identifier(QueryType::Siren, s).map(Siren)
    }
}

impl FromStr for Siret {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_identifier(QueryType::Siret, s).map(Siret)
    }
}

impl Siret {
    /// The SIREN of the legal unit owning this establishment.
    pub fn siren(&self) -> Siren {
        Siren(self.0[..QueryType::Siren.digits()].to_string())
    }
}

impl Identifier for Siren {
    const KIND: QueryType = QueryType::Siren;

    fn as_str(&self) -> &str {
        &self.0
    }
}

impl Identifier for Siret {
    const KIND: QueryType = QueryType::Siret;

    fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Siren {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for Siret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Outcome of one lookup attempt. `payload` is `None` exactly when the call failed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryResult {
    #[serde(rename = "type")]
    pub query_type: QueryType,
    #[serde(rename = "value")]
    pub query_value: String,
    #[serde(rename = "data")]
    pub payload: Option<Value>,
}

impl QueryResult {
    pub fn new(
        query_type: QueryType,
        query_value: impl Into<String>,
        payload: Option<Value>,
    ) -> Self {
        Self {
            query_type,
            query_value: query_value.into(),
            payload,
        }
    }

    pub fn is_success(&self) -> bool {
        self.payload.is_some()
    }
}
