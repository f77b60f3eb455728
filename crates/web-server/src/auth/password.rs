//! bcrypt password hashing. Plaintext passwords exist only between the
//! request body and these two functions.

pub fn hash(password: &str, cost: u32) -> Result<String, bcrypt::BcryptError> {
    bcrypt::hash(password, cost)
}

pub fn verify(password: &str, password_hash: &str) -> Result<bool, bcrypt::BcryptError> {
    bcrypt::verify(password, password_hash)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hashed_passwords_verify_and_reject_the_wrong_input() {
        // Minimum cost keeps the test fast.
        let hashed = hash("correct horse battery", 4).expect("hashes");
        assert!(verify("correct horse battery", &hashed).expect("verifies"));
        assert!(!verify("wrong password", &hashed).expect("verifies"));
    }
}
