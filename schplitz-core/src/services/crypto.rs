//! Cryptographic codec - passphrase-keyed authenticated encryption
//!
//! Key derivation is PBKDF2-HMAC-SHA256 over a fresh random salt; the cipher
//! is AES-256-GCM. The blob layout is `base64(salt || nonce || ciphertext)`
//! where the ciphertext carries the GCM tag.

use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Nonce};
use base64::Engine;
use rand::RngCore;
use sha2::Sha256;

use crate::domain::result::{Error, Result};

/// PBKDF2 iteration count. Part of the wire format.
pub const KDF_ITERATIONS: u32 = 200_000;
pub const SALT_LEN: usize = 16;
pub const NONCE_LEN: usize = 12;
pub const KEY_LEN: usize = 32;

/// Canonical form of a typed answer: lower-case, no whitespace anywhere
pub fn normalize_answer(answer: &str) -> String {
    answer
        .chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}

/// Derive a 256-bit key from an answer and salt
pub fn derive_key(answer: &str, salt: &[u8]) -> [u8; KEY_LEN] {
    pbkdf2::pbkdf2_hmac_array::<Sha256, KEY_LEN>(answer.as_bytes(), salt, KDF_ITERATIONS)
}

/// Encrypt `plaintext` under `answer`. Every call produces a different blob.
///
/// The answer is used exactly as given; callers normalize beforehand.
pub fn encrypt(plaintext: &[u8], answer: &str) -> Result<String> {
    let mut salt = [0u8; SALT_LEN];
    let mut nonce_bytes = [0u8; NONCE_LEN];
    let mut rng = rand::thread_rng();
    rng.fill_bytes(&mut salt);
    rng.fill_bytes(&mut nonce_bytes);

    let key = derive_key(answer, &salt);
    let cipher = Aes256Gcm::new_from_slice(&key)
        .map_err(|e| Error::validation(format!("Failed to create cipher: {}", e)))?;
    let ciphertext = cipher
        .encrypt(Nonce::from_slice(&nonce_bytes), plaintext)
        .map_err(|_| Error::validation("Encryption failed"))?;

    let mut out = Vec::with_capacity(SALT_LEN + NONCE_LEN + ciphertext.len());
    out.extend_from_slice(&salt);
    out.extend_from_slice(&nonce_bytes);
    out.extend_from_slice(&ciphertext);

    Ok(base64::engine::general_purpose::STANDARD.encode(out))
}

/// Decrypt a blob produced by [`encrypt`].
///
/// Every failure - bad base64, truncated blob, wrong answer, tampering -
/// is the same [`Error::AuthFailure`].
pub fn decrypt(blob: &str, answer: &str) -> Result<Vec<u8>> {
    let raw = base64::engine::general_purpose::STANDARD
        .decode(blob.trim())
        .map_err(|_| Error::AuthFailure)?;
    // 16 bytes is the GCM tag of an empty plaintext
    if raw.len() < SALT_LEN + NONCE_LEN + 16 {
        return Err(Error::AuthFailure);
    }

    let (salt, rest) = raw.split_at(SALT_LEN);
    let (nonce_bytes, ciphertext) = rest.split_at(NONCE_LEN);

    let key = derive_key(answer, salt);
    let cipher = Aes256Gcm::new_from_slice(&key).map_err(|_| Error::AuthFailure)?;
    cipher
        .decrypt(Nonce::from_slice(nonce_bytes), ciphertext)
        .map_err(|_| Error::AuthFailure)
}

/// [`encrypt`] on the blocking pool, for async callers
pub async fn encrypt_async(plaintext: Vec<u8>, answer: String) -> Result<String> {
    tokio::task::spawn_blocking(move || encrypt(&plaintext, &answer))
        .await
        .map_err(|e| Error::validation(format!("Encryption task failed: {}", e)))?
}

/// [`decrypt`] on the blocking pool, for async callers
pub async fn decrypt_async(blob: String, answer: String) -> Result<Vec<u8>> {
    tokio::task::spawn_blocking(move || decrypt(&blob, &answer))
        .await
        .map_err(|_| Error::AuthFailure)?
}
