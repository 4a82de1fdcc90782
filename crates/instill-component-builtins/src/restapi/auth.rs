//! Request authentication configured in the setup.

use instill_component::{ComponentError, Setup};
use reqwest::RequestBuilder;
use serde::Deserialize;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub(crate) enum AuthLocation {
  #[default]
  Header,
  Query,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(tag = "auth-type")]
pub(crate) enum Authentication {
  #[default]
  #[serde(rename = "NO_AUTH")]
  NoAuth,
  #[serde(rename = "BASIC_AUTH")]
  BasicAuth {
    username: String,
    #[serde(default)]
    password: String,
  },
  #[serde(rename = "BEARER_TOKEN")]
  BearerToken { token: String },
  #[serde(rename = "API_KEY")]
  ApiKey {
    key: String,
    value: String,
    #[serde(rename = "auth-location", default)]
    location: AuthLocation,
  },
}

impl Authentication {
  /// Read the `authentication` field of a setup. A setup without one sends
  /// requests unauthenticated.
  pub(crate) fn from_setup(setup: &Setup) -> Result<Self, ComponentError> {
    let Some(auth) = setup.get("authentication") else {
      return Ok(Self::NoAuth);
    };
    serde_json::from_value(auth.clone()).map_err(|e| {
      ComponentError::invalid_input(
        format!("invalid authentication: {e}"),
        "The authentication setup is invalid. Please check the authentication type and its fields.",
      )
    })
  }

  pub(crate) fn apply(&self, request: RequestBuilder) -> RequestBuilder {
    match self {
      Self::NoAuth => request,
      Self::BasicAuth { username, password } => request.basic_auth(username, Some(password)),
      Self::BearerToken { token } => request.bearer_auth(token),
      Self::ApiKey {
        key,
        value,
        location: AuthLocation::Header,
      } => request.header(key.as_str(), value.as_str()),
      Self::ApiKey {
        key,
        value,
        location: AuthLocation::Query,
      } => request.query(&[(key, value)]),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  fn setup(value: serde_json::Value) -> Setup {
    value.as_object().cloned().unwrap()
  }

  #[test]
  fn test_missing_authentication_is_no_auth() {
    assert_eq!(Authentication::from_setup(&Setup::new()).unwrap(), Authentication::NoAuth);
  }

  #[test]
  fn test_parse_variants() {
    let bearer = setup(json!({ "authentication": { "auth-type": "BEARER_TOKEN", "token": "t" } }));
    assert_eq!(
      Authentication::from_setup(&bearer).unwrap(),
      Authentication::BearerToken {
        token: "t".to_string()
      }
    );

    let api_key = setup(json!({
      "authentication": { "auth-type": "API_KEY", "key": "k", "value": "v" }
    }));
    assert_eq!(
      Authentication::from_setup(&api_key).unwrap(),
      Authentication::ApiKey {
        key: "k".to_string(),
        value: "v".to_string(),
        location: AuthLocation::Header,
      }
    );
  }

  #[test]
  fn test_unknown_type() {
    let bad = setup(json!({ "authentication": { "auth-type": "OAUTH" } }));
    let err = Authentication::from_setup(&bad).unwrap_err();
    assert!(matches!(err, ComponentError::InvalidInput { .. }));
  }

  #[test]
  fn test_apply_query_key() {
    let auth = Authentication::ApiKey {
      key: "api_key".to_string(),
      value: "secret".to_string(),
      location: AuthLocation::Query,
    };
    let request = auth
      .apply(reqwest::Client::new().get("http://localhost/items"))
      .build()
      .unwrap();
    assert_eq!(request.url().query(), Some("api_key=secret"));
  }
}
