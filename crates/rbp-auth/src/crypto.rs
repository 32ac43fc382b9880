use super::*;

const ACCESS_TOKEN_DURATION: std::time::Duration = std::time::Duration::from_secs(15 * 60);

pub struct Crypto {
    encoding: jsonwebtoken::EncodingKey,
    decoding: jsonwebtoken::DecodingKey,
}

impl Crypto {
    pub fn new(secret: &[u8]) -> Self {
        Self {
            encoding: jsonwebtoken::EncodingKey::from_secret(secret),
            decoding: jsonwebtoken::DecodingKey::from_secret(secret),
        }
    }
    pub fn from_env() -> Self {
        Self::new(
            std::env::var("JWT_SECRET")
                .unwrap_or_else(|_| String::default())
                .as_bytes(),
        )
    }
    pub fn encode(&self, claims: &Claims) -> Result<String, jsonwebtoken::errors::Error> {
        jsonwebtoken::encode(&jsonwebtoken::Header::default(), claims, &self.encoding)
    }
    pub fn decode(&self, token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
        jsonwebtoken::decode::<Claims>(token, &self.decoding, &jsonwebtoken::Validation::default())
            .map(|data| data.claims)
    }
    pub fn hash(token: &str) -> Vec<u8> {
        use sha2::Digest;
        sha2::Sha256::digest(token.as_bytes()).to_vec()
    }
    pub const fn duration() -> std::time::Duration {
        ACCESS_TOKEN_DURATION
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rbp_core::ID;

    #[test]
    fn round_trips_claims_through_encode_decode() {
        let crypto = Crypto::new(b"test-secret");
        let claims = Claims::new(ID::default(), ID::default(), "alice".to_string());
        let token = crypto.encode(&claims).unwrap();
        let decoded = crypto.decode(&token).unwrap();
        assert_eq!(decoded.username(), "alice");
        assert_eq!(decoded.user(), claims.user());
    }

    #[test]
    fn rejects_a_token_signed_with_a_different_secret() {
        let a = Crypto::new(b"secret-a");
        let b = Crypto::new(b"secret-b");
        let claims = Claims::new(ID::default(), ID::default(), "alice".to_string());
        let token = a.encode(&claims).unwrap();
        assert!(b.decode(&token).is_err());
    }

    #[test]
    fn hash_is_deterministic_and_not_the_identity() {
        let h1 = Crypto::hash("some-refresh-token");
        let h2 = Crypto::hash("some-refresh-token");
        assert_eq!(h1, h2);
        assert_ne!(h1, b"some-refresh-token".to_vec());
    }
}
