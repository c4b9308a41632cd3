//! At-rest encryption for backup artifacts.
//!
//! Uses AES-256-GCM for authenticated encryption. The key is loaded once
//! from the environment; a missing or malformed key is a fatal configuration
//! error surfaced at first use, never a per-request error. The key is never
//! persisted alongside the data it protects.

use crate::AppError;
use aes_gcm::{
    aead::{Aead, AeadCore, KeyInit, OsRng},
    Aes256Gcm, Key, Nonce,
};
use base64::{engine::general_purpose, Engine as _};
use std::env;
use tokio::io::{AsyncRead, AsyncReadExt};

/// Environment variable holding the base64-encoded 32-byte key
pub const KEY_ENV_VAR: &str = "BACKUP_ENCRYPTION_KEY";

const NONCE_LEN: usize = 12;

/// Symmetric cipher for whole-file backup encryption.
///
/// Files are staged before processing, so encryption operates on complete
/// buffers; the reader-based helpers exist so callers holding a stream do
/// not have to buffer it themselves.
#[derive(Clone)]
pub struct BackupCipher {
    cipher: Aes256Gcm,
}

// Aes256Gcm has no Debug impl and the key must never end up in logs.
impl std::fmt::Debug for BackupCipher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackupCipher").finish_non_exhaustive()
    }
}

impl BackupCipher {
    /// Create a cipher from a raw 32-byte key (e.g. for tests; avoids env mutation).
    pub fn from_key_bytes(key_bytes: &[u8]) -> Result<Self, AppError> {
        if key_bytes.len() != 32 {
            return Err(AppError::CryptoConfig(
                "Encryption key must be 32 bytes (256 bits)".to_string(),
            ));
        }
        let key = Key::<Aes256Gcm>::from_slice(key_bytes);
        Ok(Self {
            cipher: Aes256Gcm::new(key),
        })
    }

    /// Create a cipher from the environment.
    /// Expects `BACKUP_ENCRYPTION_KEY` to be a base64-encoded 32-byte key.
    pub fn from_env() -> Result<Self, AppError> {
        let key_str = env::var(KEY_ENV_VAR).map_err(|_| {
            AppError::CryptoConfig(format!("{} environment variable not set", KEY_ENV_VAR))
        })?;

        let key_bytes = general_purpose::STANDARD.decode(&key_str).map_err(|e| {
            AppError::CryptoConfig(format!("Failed to decode encryption key: {}", e))
        })?;

        Self::from_key_bytes(&key_bytes)
    }

    /// Encrypt a plaintext buffer. The random 12-byte nonce is prepended to
    /// the returned ciphertext.
    pub fn encrypt(&self, plaintext: &[u8]) -> Result<Vec<u8>, AppError> {
        let nonce = Aes256Gcm::generate_nonce(&mut OsRng);
        let ciphertext = self
            .cipher
            .encrypt(&nonce, plaintext)
            .map_err(|e| AppError::Encryption(format!("Encryption failed: {}", e)))?;

        let mut combined = nonce.to_vec();
        combined.extend_from_slice(&ciphertext);
        Ok(combined)
    }

    /// Decrypt a buffer produced by [`encrypt`](Self::encrypt).
    pub fn decrypt(&self, data: &[u8]) -> Result<Vec<u8>, AppError> {
        if data.len() < NONCE_LEN {
            return Err(AppError::Encryption("Encrypted data too short".to_string()));
        }

        let nonce = Nonce::from_slice(&data[..NONCE_LEN]);
        let ciphertext = &data[NONCE_LEN..];

        self.cipher
            .decrypt(nonce, ciphertext)
            .map_err(|e| AppError::Encryption(format!("Decryption failed: {}", e)))
    }

    /// Encrypt the full contents of an async reader.
    pub async fn encrypt_reader<R>(&self, mut reader: R) -> Result<Vec<u8>, AppError>
    where
        R: AsyncRead + Unpin,
    {
        let mut plaintext = Vec::new();
        reader.read_to_end(&mut plaintext).await?;
        self.encrypt(&plaintext)
    }

    /// Decrypt the full contents of an async reader.
    pub async fn decrypt_reader<R>(&self, mut reader: R) -> Result<Vec<u8>, AppError>
    where
        R: AsyncRead + Unpin,
    {
        let mut data = Vec::new();
        reader.read_to_end(&mut data).await?;
        self.decrypt(&data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_cipher() -> BackupCipher {
        let test_key = b"01234567890123456789012345678901";
        BackupCipher::from_key_bytes(test_key).unwrap()
    }

    #[test]
    fn test_round_trip() {
        let cipher = test_cipher();
        let plaintext = b"-- MySQL dump 10.13\nCREATE TABLE students (...);\n";

        let encrypted = cipher.encrypt(plaintext).unwrap();
        assert_ne!(&encrypted[..], &plaintext[..]);

        let decrypted = cipher.decrypt(&encrypted).unwrap();
        assert_eq!(decrypted, plaintext);
    }

    #[test]
    fn test_round_trip_empty_input() {
        let cipher = test_cipher();
        let encrypted = cipher.encrypt(b"").unwrap();
        let decrypted = cipher.decrypt(&encrypted).unwrap();
        assert!(decrypted.is_empty());
    }

    #[test]
    fn test_wrong_key_fails_authentication() {
        let cipher = test_cipher();
        let other = BackupCipher::from_key_bytes(b"10987654321098765432109876543210").unwrap();

        let encrypted = cipher.encrypt(b"secret dump").unwrap();
        assert!(other.decrypt(&encrypted).is_err());
    }

    #[test]
    fn test_short_key_rejected() {
        let err = BackupCipher::from_key_bytes(b"too short").unwrap_err();
        assert!(matches!(err, AppError::CryptoConfig(_)));
    }

    #[test]
    fn test_debug_output_redacts_key_material() {
        let rendered = format!("{:?}", test_cipher());
        assert!(rendered.starts_with("BackupCipher"));
        assert!(!rendered.contains("0123456789"));
    }

    #[test]
    fn test_truncated_ciphertext_rejected() {
        let cipher = test_cipher();
        assert!(matches!(
            cipher.decrypt(&[0u8; 4]),
            Err(AppError::Encryption(_))
        ));
    }

    #[tokio::test]
    async fn test_reader_round_trip() {
        let cipher = test_cipher();
        let data = vec![42u8; 64 * 1024];

        let encrypted = cipher
            .encrypt_reader(std::io::Cursor::new(data.clone()))
            .await
            .unwrap();
        let decrypted = cipher
            .decrypt_reader(std::io::Cursor::new(encrypted))
            .await
            .unwrap();
        assert_eq!(decrypted, data);
    }
}
