//! Google sign-in
//!
//! Two flows are accepted: an ID token obtained on the device, checked with
//! Google's tokeninfo endpoint, or an authorization code with its PKCE
//! verifier, exchanged through the `oauth2` client and then resolved with the
//! userinfo endpoint.

use std::borrow::Cow;

use anyhow::Result;
use oauth2::{
    AuthUrl, AuthorizationCode, ClientId, ClientSecret, PkceCodeVerifier, RedirectUrl,
    TokenResponse, TokenUrl, basic::BasicClient, reqwest::async_http_client,
};
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;
use tracing::info;

use crate::{config::AuthConfig, models::GoogleProfile};

const GOOGLE_AUTH_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const GOOGLE_TOKENINFO_URL: &str = "https://oauth2.googleapis.com/tokeninfo";
const GOOGLE_USERINFO_URL: &str = "https://openidconnect.googleapis.com/v1/userinfo";

#[derive(Error, Debug)]
pub enum GoogleAuthError {
    #[error("Google sign-in is not configured")]
    NotConfigured,

    #[error("Invalid Google credential: {0}")]
    Rejected(String),

    #[error("Google request failed: {0}")]
    Upstream(String),
}

/// Claims returned by tokeninfo (ID token) or userinfo (access token)
#[derive(Debug, Deserialize)]
struct GoogleClaims {
    aud: Option<String>,
    sub: String,
    email: Option<String>,
    /// A string in tokeninfo responses, a boolean in userinfo responses
    email_verified: Option<Value>,
    name: Option<String>,
}

fn is_true(value: &Value) -> bool {
    matches!(value, Value::Bool(true)) || value.as_str() == Some("true")
}

fn profile_from_claims(
    claims: GoogleClaims,
    expected_audience: Option<&str>,
) -> Result<GoogleProfile, GoogleAuthError> {
    if let Some(expected) = expected_audience {
        if claims.aud.as_deref() != Some(expected) {
            return Err(GoogleAuthError::Rejected(
                "token was issued for another client".to_string(),
            ));
        }
    }

    let email = claims
        .email
        .filter(|e| !e.is_empty())
        .ok_or_else(|| GoogleAuthError::Rejected("no email in Google profile".to_string()))?;

    if !claims.email_verified.as_ref().is_some_and(is_true) {
        return Err(GoogleAuthError::Rejected(
            "Google email is not verified".to_string(),
        ));
    }

    Ok(GoogleProfile {
        google_id: claims.sub,
        email,
        name: claims.name,
    })
}

/// Google identity verification
#[derive(Clone)]
pub struct GoogleAuthenticator {
    client_id: Option<String>,
    client: Option<BasicClient>,
    default_redirect: Option<RedirectUrl>,
    http: reqwest::Client,
}

impl GoogleAuthenticator {
    /// Build the authenticator; without a client id every call reports
    /// [`GoogleAuthError::NotConfigured`]
    pub fn new(
        client_id: Option<String>,
        client_secret: Option<String>,
        redirect_url: Option<String>,
    ) -> Result<Self> {
        let client = match &client_id {
            Some(id) => Some(BasicClient::new(
                ClientId::new(id.clone()),
                client_secret.map(ClientSecret::new),
                AuthUrl::new(GOOGLE_AUTH_URL.to_string())?,
                Some(TokenUrl::new(GOOGLE_TOKEN_URL.to_string())?),
            )),
            None => None,
        };
        let default_redirect = redirect_url.map(RedirectUrl::new).transpose()?;

        Ok(Self {
            client_id,
            client,
            default_redirect,
            http: reqwest::Client::new(),
        })
    }

    pub fn from_config(config: &AuthConfig) -> Result<Self> {
        Self::new(
            config.google_client_id.clone(),
            config.google_client_secret.clone(),
            config.google_redirect_url.clone(),
        )
    }

    /// Verify an ID token issued to this client
    pub async fn verify_id_token(&self, id_token: &str) -> Result<GoogleProfile, GoogleAuthError> {
        let client_id = self
            .client_id
            .as_deref()
            .ok_or(GoogleAuthError::NotConfigured)?;

        let response = self
            .http
            .get(GOOGLE_TOKENINFO_URL)
            .query(&[("id_token", id_token)])
            .send()
            .await
            .map_err(|e| GoogleAuthError::Upstream(e.to_string()))?;

        if !response.status().is_success() {
            return Err(GoogleAuthError::Rejected(format!(
                "tokeninfo returned {}",
                response.status()
            )));
        }

        let claims: GoogleClaims = response
            .json()
            .await
            .map_err(|e| GoogleAuthError::Upstream(e.to_string()))?;

        profile_from_claims(claims, Some(client_id))
    }

    /// Exchange an authorization code (PKCE) and fetch the user's profile
    pub async fn exchange_code(
        &self,
        code: String,
        code_verifier: String,
        redirect_uri: Option<String>,
    ) -> Result<GoogleProfile, GoogleAuthError> {
        let client = self.client.as_ref().ok_or(GoogleAuthError::NotConfigured)?;

        let redirect = match redirect_uri {
            Some(uri) => Some(RedirectUrl::new(uri).map_err(|e| {
                GoogleAuthError::Rejected(format!("invalid redirect URI: {}", e))
            })?),
            None => self.default_redirect.clone(),
        };

        let mut request = client
            .exchange_code(AuthorizationCode::new(code))
            .set_pkce_verifier(PkceCodeVerifier::new(code_verifier));
        if let Some(redirect) = redirect {
            request = request.set_redirect_uri(Cow::Owned(redirect));
        }

        info!("Exchanging Google authorization code");
        let token = request
            .request_async(async_http_client)
            .await
            .map_err(|e| GoogleAuthError::Rejected(e.to_string()))?;

        let response = self
            .http
            .get(GOOGLE_USERINFO_URL)
            .bearer_auth(token.access_token().secret())
            .send()
            .await
            .map_err(|e| GoogleAuthError::Upstream(e.to_string()))?;

        if !response.status().is_success() {
            return Err(GoogleAuthError::Upstream(format!(
                "userinfo returned {}",
                response.status()
            )));
        }

        let claims: GoogleClaims = response
            .json()
            .await
            .map_err(|e| GoogleAuthError::Upstream(e.to_string()))?;

        profile_from_claims(claims, None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn claims(value: Value) -> GoogleClaims {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_tokeninfo_profile() {
        let profile = profile_from_claims(
            claims(json!({
                "aud": "wardrobe-client",
                "sub": "1234567890",
                "email": "ada@example.com",
                "email_verified": "true",
                "name": "Ada Lovelace"
            })),
            Some("wardrobe-client"),
        )
        .unwrap();

        assert_eq!(
            profile,
            GoogleProfile {
                google_id: "1234567890".into(),
                email: "ada@example.com".into(),
                name: Some("Ada Lovelace".into()),
            }
        );
    }

    #[test]
    fn test_audience_must_match() {
        let result = profile_from_claims(
            claims(json!({
                "aud": "someone-else",
                "sub": "1",
                "email": "ada@example.com",
                "email_verified": "true"
            })),
            Some("wardrobe-client"),
        );
        assert!(matches!(result, Err(GoogleAuthError::Rejected(_))));
    }

    #[test]
    fn test_userinfo_profile_needs_verified_email() {
        let verified = profile_from_claims(
            claims(json!({"sub": "1", "email": "ada@example.com", "email_verified": true})),
            None,
        );
        assert!(verified.is_ok());

        let unverified = profile_from_claims(
            claims(json!({"sub": "1", "email": "ada@example.com", "email_verified": false})),
            None,
        );
        assert!(matches!(unverified, Err(GoogleAuthError::Rejected(_))));

        let no_email = profile_from_claims(claims(json!({"sub": "1", "email_verified": true})), None);
        assert!(matches!(no_email, Err(GoogleAuthError::Rejected(_))));
    }

    #[tokio::test]
    async fn test_unconfigured_authenticator() {
        let google = GoogleAuthenticator::new(None, None, None).unwrap();

        assert!(matches!(
            google.verify_id_token("token").await,
            Err(GoogleAuthError::NotConfigured)
        ));
        assert!(matches!(
            google
                .exchange_code("code".into(), "verifier".into(), None)
                .await,
            Err(GoogleAuthError::NotConfigured)
        ));
    }
}
