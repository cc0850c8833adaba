use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use base64::Engine;
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode, decode_header};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

const JWKS_URL: &str =
    "https://www.googleapis.com/service_accounts/v1/jwk/securetoken@system.gserviceaccount.com";
const KEY_CACHE_TTL: Duration = Duration::from_secs(3600);

/// Claims carried by identity-provider ID tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdTokenClaims {
    pub aud: String,
    pub iss: String,
    pub iat: u64,
    pub exp: u64,
    pub sub: String,
    pub email: Option<String>,
    pub name: Option<String>,
    #[serde(default)]
    pub email_verified: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwksKey {
    pub kty: String,
    #[serde(rename = "use")]
    pub use_field: Option<String>,
    pub x5c: Option<Vec<String>>,
    pub n: Option<String>,
    pub e: Option<String>,
    pub kid: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwksResponse {
    pub keys: Vec<JwksKey>,
}

/// A caller authenticated by the identity provider. It may or may not have
/// registered a profile yet.
#[derive(Debug, Clone, PartialEq)]
pub struct Identity {
    pub uid: String,
    pub email: Option<String>,
    pub name: Option<String>,
    pub email_verified: bool,
}

impl From<IdTokenClaims> for Identity {
    fn from(claims: IdTokenClaims) -> Self {
        Identity {
            uid: claims.sub,
            email: claims.email,
            name: claims.name,
            email_verified: claims.email_verified,
        }
    }
}

pub struct AuthService {
    client: Client,
    jwks_cache: Arc<RwLock<HashMap<String, (DecodingKey, SystemTime)>>>,
    project_id: String,
    dev_mode: bool,
}

impl AuthService {
    pub fn new(project_id: String) -> Self {
        Self {
            client: Client::new(),
            jwks_cache: Arc::new(RwLock::new(HashMap::new())),
            project_id,
            dev_mode: false,
        }
    }

    pub fn new_dev_mode() -> Self {
        Self {
            client: Client::new(),
            jwks_cache: Arc::new(RwLock::new(HashMap::new())),
            project_id: "dev".to_string(),
            dev_mode: true,
        }
    }

    pub fn is_dev_mode(&self) -> bool {
        self.dev_mode
    }

    pub fn issuer(&self) -> String {
        format!("https://securetoken.google.com/{}", self.project_id)
    }

    pub async fn validate_token(&self, token: &str) -> Result<Identity, AuthError> {
        if self.dev_mode {
            return self.validate_dev_token(token);
        }

        let header = decode_header(token).map_err(|e| {
            tracing::warn!("Failed to decode JWT header: {:?}", e);
            AuthError::InvalidToken
        })?;
        let kid = header.kid.ok_or_else(|| {
            tracing::warn!("JWT header missing 'kid' field");
            AuthError::InvalidToken
        })?;

        let decoding_key = self.get_decoding_key(&kid).await?;

        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_audience(&[&self.project_id]);
        validation.set_issuer(&[self.issuer()]);
        validation.validate_exp = true;

        let token_data = decode::<IdTokenClaims>(token, &decoding_key, &validation).map_err(|e| {
            tracing::warn!("JWT token validation failed: {:?}", e);
            match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                jsonwebtoken::errors::ErrorKind::InvalidAudience => AuthError::AudienceMismatch,
                jsonwebtoken::errors::ErrorKind::InvalidIssuer => AuthError::IssuerMismatch,
                _ => AuthError::InvalidToken,
            }
        })?;

        let claims = token_data.claims;
        if claims.sub.is_empty() {
            tracing::warn!("Token has an empty subject");
            return Err(AuthError::InvalidToken);
        }
        Ok(claims.into())
    }

    async fn get_decoding_key(&self, kid: &str) -> Result<DecodingKey, AuthError> {
        {
            let cache = self.jwks_cache.read().await;
            if let Some((key, cached_time)) = cache.get(kid) {
                let elapsed = cached_time.elapsed().unwrap_or(KEY_CACHE_TTL);
                if elapsed < KEY_CACHE_TTL {
                    tracing::debug!("Using cached decoding key for kid '{}'", kid);
                    return Ok(key.clone());
                }
                tracing::debug!("Cached key for kid '{}' is expired, fetching fresh", kid);
            }
        }

        let response = self.client.get(JWKS_URL).send().await.map_err(|e| {
            tracing::warn!("Failed to fetch JWKS: {:?}", e);
            AuthError::JwksFetchError
        })?;

        if !response.status().is_success() {
            tracing::warn!("JWKS fetch returned status: {}", response.status());
            return Err(AuthError::JwksFetchError);
        }

        let jwks: JwksResponse = response.json().await.map_err(|e| {
            tracing::warn!("Failed to parse JWKS JSON: {:?}", e);
            AuthError::JwksFetchError
        })?;
        tracing::debug!("Fetched JWKS with {} keys", jwks.keys.len());

        let jwks_key = jwks.keys.iter().find(|key| key.kid == kid).ok_or_else(|| {
            tracing::warn!("Key with kid '{}' not found in JWKS", kid);
            AuthError::KeyNotFound
        })?;

        let decoding_key = if let (Some(n), Some(e)) = (&jwks_key.n, &jwks_key.e) {
            DecodingKey::from_rsa_components(n, e).map_err(|e| {
                tracing::warn!("Failed to create decoding key from RSA components: {:?}", e);
                AuthError::InvalidKey
            })?
        } else if let Some(cert) = jwks_key.x5c.as_ref().and_then(|x5c| x5c.first()) {
            let cert_der = base64::engine::general_purpose::STANDARD
                .decode(cert)
                .map_err(|e| {
                    tracing::warn!("Failed to decode x5c certificate: {:?}", e);
                    AuthError::InvalidKey
                })?;
            DecodingKey::from_rsa_der(&cert_der)
        } else {
            tracing::warn!("JWKS key has neither n,e components nor x5c certificate");
            return Err(AuthError::InvalidKey);
        };

        {
            let mut cache = self.jwks_cache.write().await;
            cache.insert(kid.to_string(), (decoding_key.clone(), SystemTime::now()));
        }

        Ok(decoding_key)
    }

    /// Accepts an unsigned JWT, a JSON object, or `uid:email:name`.
    fn validate_dev_token(&self, token: &str) -> Result<Identity, AuthError> {
        let parts: Vec<&str> = token.split('.').collect();
        if parts.len() == 3 {
            let payload_bytes = base64::engine::general_purpose::URL_SAFE_NO_PAD
                .decode(parts[1].trim_end_matches('='))
                .map_err(|e| {
                    tracing::warn!("Failed to decode JWT payload in dev mode: {:?}", e);
                    AuthError::InvalidToken
                })?;

            #[derive(Deserialize)]
            struct DevJwtClaims {
                sub: String,
                email: Option<String>,
                name: Option<String>,
                #[serde(default)]
                email_verified: bool,
            }

            let claims: DevJwtClaims = serde_json::from_slice(&payload_bytes).map_err(|e| {
                tracing::warn!("Failed to parse JWT claims in dev mode: {:?}", e);
                AuthError::InvalidToken
            })?;
            return Ok(Identity {
                uid: claims.sub,
                email: claims.email,
                name: claims.name,
                email_verified: claims.email_verified,
            });
        }

        if token.starts_with('{') && token.ends_with('}') {
            #[derive(Deserialize)]
            struct DevClaims {
                uid: String,
                email: Option<String>,
                name: Option<String>,
                #[serde(default)]
                email_verified: bool,
            }

            let claims: DevClaims =
                serde_json::from_str(token).map_err(|_| AuthError::InvalidToken)?;
            return Ok(Identity {
                uid: claims.uid,
                email: claims.email,
                name: claims.name,
                email_verified: claims.email_verified,
            });
        }

        let string_parts: Vec<&str> = token.splitn(3, ':').collect();
        match string_parts.as_slice() {
            [uid, email, name] if !uid.is_empty() => Ok(Identity {
                uid: uid.to_string(),
                email: Some(email.to_string()).filter(|e| !e.is_empty()),
                name: Some(name.to_string()).filter(|n| !n.is_empty()),
                email_verified: true,
            }),
            _ => Err(AuthError::InvalidToken),
        }
    }
}

/// Strips an optional `Bearer ` prefix.
pub fn bearer_token(header: &str) -> &str {
    header.strip_prefix("Bearer ").unwrap_or(header).trim()
}

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Authentication required")]
    MissingToken,
    #[error("Invalid token")]
    InvalidToken,
    #[error("Token expired")]
    TokenExpired,
    #[error("Failed to fetch JWKS")]
    JwksFetchError,
    #[error("Key not found")]
    KeyNotFound,
    #[error("Invalid key")]
    InvalidKey,
    #[error("Audience mismatch")]
    AudienceMismatch,
    #[error("Issuer mismatch")]
    IssuerMismatch,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_service_creation() {
        let auth_service = AuthService::new("club-ladder".to_string());
        assert_eq!(auth_service.project_id, "club-ladder");
        assert_eq!(
            auth_service.issuer(),
            "https://securetoken.google.com/club-ladder"
        );
        assert!(!auth_service.is_dev_mode());
    }

    #[tokio::test]
    async fn test_invalid_token_validation() {
        let auth_service = AuthService::new("club-ladder".to_string());

        let result = auth_service.validate_token("invalid-token").await;
        assert!(matches!(result, Err(AuthError::InvalidToken)));
    }

    #[tokio::test]
    async fn test_dev_mode_string_token() {
        let auth_service = AuthService::new_dev_mode();

        let identity = auth_service
            .validate_token("uid-7:seven@example.com:Lucky Seven")
            .await
            .unwrap();
        assert_eq!(identity.uid, "uid-7");
        assert_eq!(identity.email.as_deref(), Some("seven@example.com"));
        assert_eq!(identity.name.as_deref(), Some("Lucky Seven"));
        assert!(identity.email_verified);
    }

    #[tokio::test]
    async fn test_dev_mode_json_and_jwt_tokens() {
        let auth_service = AuthService::new_dev_mode();

        let identity = auth_service
            .validate_token(r#"{"uid":"abc","email":"a@b.c","name":null}"#)
            .await
            .unwrap();
        assert_eq!(identity.uid, "abc");
        assert!(!identity.email_verified);

        let payload = base64::engine::general_purpose::URL_SAFE_NO_PAD
            .encode(r#"{"sub":"jwt-user","email":"j@w.t","email_verified":true}"#);
        let token = format!("e30.{payload}.sig");
        let identity = auth_service.validate_token(&token).await.unwrap();
        assert_eq!(identity.uid, "jwt-user");
        assert!(identity.email_verified);
    }

    #[tokio::test]
    async fn test_dev_mode_rejects_malformed_tokens() {
        let auth_service = AuthService::new_dev_mode();
        assert!(auth_service.validate_token("just-a-uid").await.is_err());
        assert!(auth_service.validate_token(":no@uid.com:Name").await.is_err());
    }

    #[test]
    fn test_bearer_token() {
        assert_eq!(bearer_token("Bearer abc.def"), "abc.def");
        assert_eq!(bearer_token("raw"), "raw");
    }
}
