use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use super::{TokenError, TokenProvider};

/// Who a token is issued for.
#[derive(Debug, Clone)]
pub struct TokenSubject {
    pub user_id: i64,
    pub login_name: String,
    pub first_name: String,
    pub last_name: String,
    pub role: String,
}

#[derive(Serialize)]
struct IssuedClaims<'a> {
    iss: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
    #[serde(rename = "userId")]
    user_id: i64,
    email: &'a str,
    given_name: &'a str,
    last_name: &'a str,
    role: &'a str,
    #[serde(rename = "clientId")]
    client_id: i64,
    #[serde(rename = "permissionIds")]
    permission_ids: &'a [i64],
}

/// Access token claims as read back from a verified token.
///
/// Numeric ids stay as raw JSON values: older issuers wrote them as strings.
#[derive(Debug, Clone, Deserialize)]
pub struct AccessClaims {
    pub iss: String,
    pub exp: i64,
    #[serde(default)]
    pub iat: Option<i64>,

    #[serde(default)]
    pub email: Option<String>,
    #[serde(default, rename = "userId")]
    pub user_id: Option<Value>,
    #[serde(default, rename = "clientId")]
    pub client_id: Option<Value>,
    #[serde(default, rename = "permissionIds")]
    pub permission_ids: Option<Value>,

    #[serde(default)]
    pub given_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
}

/// HS256 access-token provider.
///
/// Issuer and audience are the same URL. Key material is not printable via Debug.
#[derive(Clone)]
pub struct JwtTokenProvider {
    issuer: String,
    ttl_seconds: u64,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl std::fmt::Debug for JwtTokenProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtTokenProvider")
            .field("issuer", &self.issuer)
            .field("ttl_seconds", &self.ttl_seconds)
            .finish()
    }
}

impl JwtTokenProvider {
    pub fn new(secret: &str, issuer: String, ttl_seconds: u64, leeway_seconds: u64) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[issuer.as_str()]);
        validation.set_audience(&[issuer.as_str()]);
        validation.leeway = leeway_seconds;

        Self {
            issuer,
            ttl_seconds,
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    pub fn generate_token(
        &self,
        subject: &TokenSubject,
        permission_ids: &[i64],
        client_id: i64,
    ) -> Result<String, TokenError> {
        self.generate_token_at(subject, permission_ids, client_id, Utc::now())
    }

    /// Issue a token as if the clock read `now`.
    pub fn generate_token_at(
        &self,
        subject: &TokenSubject,
        permission_ids: &[i64],
        client_id: i64,
        now: DateTime<Utc>,
    ) -> Result<String, TokenError> {
        let expires_at = i64::try_from(self.ttl_seconds)
            .ok()
            .and_then(Duration::try_seconds)
            .and_then(|ttl| now.checked_add_signed(ttl))
            .ok_or(TokenError::InvalidClaim("exp"))?;

        let claims = IssuedClaims {
            iss: &self.issuer,
            aud: &self.issuer,
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
            user_id: subject.user_id,
            email: &subject.login_name,
            given_name: &subject.first_name,
            last_name: &subject.last_name,
            role: &subject.role,
            client_id,
            permission_ids,
        };

        let mut header = Header::new(Algorithm::HS256);
        header.typ = Some("JWT".to_string());
        Ok(jsonwebtoken::encode(&header, &claims, &self.encoding_key)?)
    }

    /// Verify signature, `exp`, `iss` and `aud`, then return the claims.
    pub fn claims(&self, token: &str) -> Result<AccessClaims, TokenError> {
        let data = jsonwebtoken::decode::<AccessClaims>(token, &self.decoding_key, &self.validation)
            .inspect_err(|e| debug!(error = %e, "access token rejected"))?;
        Ok(data.claims)
    }

    /// Permission ids granted within the token's client. A token without the
    /// claim grants nothing.
    pub fn permission_ids_from_token(&self, token: &str) -> Result<Vec<i64>, TokenError> {
        match self.claims(token)?.permission_ids {
            None | Some(Value::Null) => Ok(Vec::new()),
            Some(Value::Array(items)) => items
                .iter()
                .map(|item| claim_as_i64(Some(item), "permissionIds"))
                .collect(),
            Some(_) => Err(TokenError::InvalidClaim("permissionIds")),
        }
    }

    /// True when the token verifies and belongs to `user_name`.
    pub fn validate_token(&self, token: &str, user_name: &str) -> bool {
        self.username_from_token(token)
            .map(|name| name == user_name)
            .unwrap_or(false)
    }
}

impl TokenProvider for JwtTokenProvider {
    fn username_from_token(&self, token: &str) -> Result<String, TokenError> {
        self.claims(token)?
            .email
            .ok_or(TokenError::MissingClaim("email"))
    }

    fn user_id_from_token(&self, token: &str) -> Result<i64, TokenError> {
        claim_as_i64(self.claims(token)?.user_id.as_ref(), "userId")
    }

    fn client_id_from_token(&self, token: &str) -> Result<i64, TokenError> {
        claim_as_i64(self.claims(token)?.client_id.as_ref(), "clientId")
    }
}

fn claim_as_i64(value: Option<&Value>, name: &'static str) -> Result<i64, TokenError> {
    match value {
        None | Some(Value::Null) => Err(TokenError::MissingClaim(name)),
        Some(Value::Number(n)) => n.as_i64().ok_or(TokenError::InvalidClaim(name)),
        Some(Value::String(s)) => s.trim().parse().map_err(|_| TokenError::InvalidClaim(name)),
        Some(_) => Err(TokenError::InvalidClaim(name)),
    }
}
