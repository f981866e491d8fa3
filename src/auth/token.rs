use sha2::{Digest, Sha256};

/// Generates an opaque bearer token (32 random bytes, hex encoded)
pub fn generate_token() -> String {
    let bytes: [u8; 32] = rand::random();
    hex::encode(bytes)
}

/// Digest under which a token is stored; the token itself is never persisted
pub fn hash_token(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}
