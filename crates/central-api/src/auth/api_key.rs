//! API key generation, hashing, and verification.

/// Raw keys look like `cb_live_<40 hex chars>`.
pub const API_KEY_PREFIX: &str = "cb_live_";

/// Generate a secure API key
pub fn generate_api_key() -> String {
    use rand::Rng;

    let mut rng = rand::rng();
    let random_bytes: Vec<u8> = (0..20).map(|_| rng.random()).collect();
    let random_part = hex::encode(random_bytes);

    format!("{}{}", API_KEY_PREFIX, random_part)
}

/// Hash an API key for storage
pub fn hash_api_key(key: &str) -> Result<String, central_core::AppError> {
    use argon2::{
        password_hash::{PasswordHasher, SaltString},
        Argon2,
    };

    use rand_core::OsRng;
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(key.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| central_core::AppError::Internal(format!("Failed to hash API key: {}", e)))
}

/// Verify an API key against a stored hash.
pub fn verify_api_key(key: &str, hash: &str) -> Result<bool, central_core::AppError> {
    use argon2::{
        password_hash::{PasswordHash, PasswordVerifier},
        Argon2,
    };

    let parsed_hash = PasswordHash::new(hash)
        .map_err(|e| central_core::AppError::Internal(format!("Invalid hash format: {}", e)))?;

    Ok(Argon2::default()
        .verify_password(key.as_bytes(), &parsed_hash)
        .is_ok())
}

/// Extract the key prefix (first 16 chars) for identification.
pub fn extract_key_prefix(key: &str) -> String {
    if key.len() > 16 {
        key[..16].to_string()
    } else {
        key.to_string()
    }
}
