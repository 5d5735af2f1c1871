//! One-way password hashing. Work factor is fixed at write time; changing it
//! only affects newly stored hashes.

use crate::error::AppError;

/// bcrypt cost used by the deployed system.
const COST: u32 = 10;

pub fn hash(plaintext: &str) -> Result<String, AppError> {
    Ok(bcrypt::hash(plaintext, COST)?)
}

pub fn verify(plaintext: &str, hashed: &str) -> Result<bool, AppError> {
    Ok(bcrypt::verify(plaintext, hashed)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_then_verify_round_trips() {
        let hashed = hash("hunter22").unwrap();
        assert_ne!(hashed, "hunter22");
        assert!(verify("hunter22", &hashed).unwrap());
        assert!(!verify("hunter23", &hashed).unwrap());
    }

    #[test]
    fn garbage_hash_is_an_error_not_a_match() {
        assert!(verify("hunter22", "not-a-bcrypt-hash").is_err());
    }
}
