use anyhow::Context;
use sha2::{Digest, Sha256};

/// Identifier written at the start of every encoded hash
const SCHEME: &str = "sha256";

/// Rounds used for new password hashes
pub const DEFAULT_ITERATIONS: u32 = 50_000;

/// Shortest password accepted at registration or reset
pub const MIN_PASSWORD_LEN: usize = 8;

/// Hashes a password with a fresh random salt
///
/// The result is self-describing: `sha256$<iterations>$<salt hex>$<digest hex>`.
pub fn hash_password(password: &str) -> String {
    hash_password_with(password, DEFAULT_ITERATIONS)
}

/// Hashes a password with an explicit iteration count
pub fn hash_password_with(password: &str, iterations: u32) -> String {
    let salt: [u8; 16] = rand::random();
    let digest = derive(password, &salt, iterations.max(1));
    format!(
        "{}${}${}${}",
        SCHEME,
        iterations.max(1),
        hex::encode(salt),
        hex::encode(digest)
    )
}

/// Checks a password against an encoded hash
///
/// Malformed hashes never verify.
pub fn verify_password(password: &str, encoded: &str) -> bool {
    let mut parts = encoded.split('$');
    let (Some(scheme), Some(iterations), Some(salt), Some(expected), None) =
        (parts.next(), parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return false;
    };
    if scheme != SCHEME {
        return false;
    }
    let Ok(iterations) = iterations.parse::<u32>() else {
        return false;
    };
    let (Ok(salt), Ok(expected)) = (hex::decode(salt), hex::decode(expected)) else {
        return false;
    };
    if iterations == 0 {
        return false;
    }
    let actual = derive(password, &salt, iterations);
    constant_time_eq(&actual, &expected)
}

/// Runs [`hash_password`] on the blocking thread pool
///
/// Hashing takes tens of milliseconds; request handlers call this so the
/// async workers keep serving other requests meanwhile.
pub async fn hash_password_async(password: &str) -> anyhow::Result<String> {
    let password = password.to_string();
    tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .context("Password hashing task failed")
}

/// Runs [`verify_password`] on the blocking thread pool
pub async fn verify_password_async(password: &str, encoded: &str) -> anyhow::Result<bool> {
    let (password, encoded) = (password.to_string(), encoded.to_string());
    tokio::task::spawn_blocking(move || verify_password(&password, &encoded))
        .await
        .context("Password verification task failed")
}

fn derive(password: &str, salt: &[u8], iterations: u32) -> [u8; 32] {
    let mut digest: [u8; 32] = Sha256::new()
        .chain_update(salt)
        .chain_update(password.as_bytes())
        .finalize()
        .into();
    for _ in 1..iterations {
        digest = Sha256::new()
            .chain_update(salt)
            .chain_update(digest)
            .finalize()
            .into();
    }
    digest
}

/// Compares two byte strings without short-circuiting on the first mismatch
pub(crate) fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
