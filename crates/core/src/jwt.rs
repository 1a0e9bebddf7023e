use crate::types::ClientTokenClaims;
use crate::{Error, Result};
use chrono::Utc;
use jsonwebtoken::{decode, decode_header, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use std::time::Duration;

/// Signs and verifies the client-facing JWT issued by `POST /api/auth/login`.
/// Supports key rotation via a current/next kid pair, the same shape as
/// `trace-core/src/lite/jwt.rs`'s task-capability signer.
#[derive(Clone)]
pub struct ClientTokenSigner {
    issuer: String,
    audience: String,
    current_kid: String,
    next_kid: Option<String>,
    ttl: Duration,
    current_encoding_key: EncodingKey,
    current_decoding_key: DecodingKey,
    next_decoding_key: Option<DecodingKey>,
}

impl std::fmt::Debug for ClientTokenSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientTokenSigner")
            .field("issuer", &self.issuer)
            .field("audience", &self.audience)
            .field("current_kid", &self.current_kid)
            .field("next_kid", &self.next_kid)
            .field("ttl", &self.ttl)
            .finish()
    }
}

#[derive(Clone)]
pub struct ClientTokenSignerConfig {
    pub issuer: String,
    pub audience: String,
    pub current_kid: String,
    pub current_secret: String,
    pub next_kid: Option<String>,
    pub next_secret: Option<String>,
    pub ttl: Duration,
}

impl ClientTokenSigner {
    pub fn from_config(cfg: ClientTokenSignerConfig) -> Result<Self> {
        if cfg.next_kid.is_some() != cfg.next_secret.is_some() {
            return Err(Error::msg("next_kid and next_secret must be set together"));
        }
        let secret = cfg.current_secret.as_bytes();
        Ok(Self {
            issuer: cfg.issuer,
            audience: cfg.audience,
            current_kid: cfg.current_kid,
            next_kid: cfg.next_kid,
            ttl: cfg.ttl,
            current_encoding_key: EncodingKey::from_secret(secret),
            current_decoding_key: DecodingKey::from_secret(secret),
            next_decoding_key: cfg
                .next_secret
                .as_deref()
                .map(|s| DecodingKey::from_secret(s.as_bytes())),
        })
    }

    pub fn issue(&self, client_id: &str, scopes: Vec<String>) -> Result<String> {
        let now = Utc::now().timestamp();
        let iat: usize = now.try_into().unwrap_or(0);
        let exp: usize = (now + self.ttl.as_secs().try_into().unwrap_or(i64::MAX))
            .try_into()
            .unwrap_or(usize::MAX);

        let claims = ClientTokenClaims {
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
            sub: format!("client:{client_id}"),
            exp,
            iat,
            client_id: client_id.to_string(),
            scopes,
        };

        let mut header = Header::new(Algorithm::HS256);
        header.kid = Some(self.current_kid.clone());
        encode(&header, &claims, &self.current_encoding_key)
            .map_err(|e| Error::Other(e.into()))
    }

    pub fn verify(&self, token: &str) -> Result<ClientTokenClaims> {
        let header = decode_header(token).map_err(|e| Error::Other(e.into()))?;
        let kid = header
            .kid
            .as_deref()
            .ok_or_else(|| Error::msg("missing jwt kid"))?;

        let decoding_key = if kid == self.current_kid {
            &self.current_decoding_key
        } else if self.next_kid.as_deref() == Some(kid) {
            self.next_decoding_key
                .as_ref()
                .ok_or_else(|| Error::msg("next jwt key not configured"))?
        } else {
            return Err(Error::msg("invalid jwt kid"));
        };

        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(std::slice::from_ref(&self.issuer));
        validation.set_audience(std::slice::from_ref(&self.audience));

        let data = decode::<ClientTokenClaims>(token, decoding_key, &validation)
            .map_err(|e| Error::Other(e.into()))?;
        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signer() -> ClientTokenSigner {
        ClientTokenSigner::from_config(ClientTokenSignerConfig {
            issuer: "scrapcore".into(),
            audience: "scrapcore-clients".into(),
            current_kid: "k1".into(),
            current_secret: "s".repeat(32),
            next_kid: None,
            next_secret: None,
            ttl: Duration::from_secs(3600),
        })
        .unwrap()
    }

    #[test]
    fn round_trips_claims() {
        let signer = signer();
        let token = signer
            .issue("c1", vec!["fetch".into(), "analyze".into()])
            .unwrap();
        let claims = signer.verify(&token).unwrap();
        assert_eq!(claims.client_id, "c1");
        assert_eq!(claims.scopes, vec!["fetch", "analyze"]);
    }

    #[test]
    fn rejects_wrong_kid() {
        let signer = signer();
        let mut other = signer.clone();
        other.current_kid = "k2".into();
        let token = other.issue("c1", vec![]).unwrap();
        assert!(signer.verify(&token).is_err());
    }
}
