use sha2::{Digest, Sha256, Sha512};
use uuid::Uuid;

pub const DEFAULT_ROUNDS: u32 = 100_000;

/// Length of the hex salt prefix of a stored hash.
pub const SALT_HEX_LEN: usize = 64;

const DIGEST_LEN: usize = 64;

/// PBKDF2-HMAC-SHA512 hasher.
///
/// Stored form: 64 hex characters of salt followed by the hex digest. The
/// round count is not stored, so hashes only verify with the hasher that
/// produced them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SecretHasher {
    rounds: u32,
}

impl Default for SecretHasher {
    fn default() -> Self {
        Self {
            rounds: DEFAULT_ROUNDS,
        }
    }
}

impl SecretHasher {
    pub fn new(rounds: u32) -> Self {
        Self {
            rounds: rounds.max(1),
        }
    }

    pub fn rounds(&self) -> u32 {
        self.rounds
    }

    pub fn hash(&self, plaintext: &str) -> String {
        let salt = fresh_salt();
        let digest = self.derive(plaintext, &salt);
        format!("{salt}{digest}")
    }

    pub fn verify(&self, stored: &str, candidate: &str) -> bool {
        let (Some(salt), Some(expected)) = (stored.get(..SALT_HEX_LEN), stored.get(SALT_HEX_LEN..)) else {
            return false;
        };
        let computed = self.derive(candidate, salt);
        if computed.len() != expected.len() {
            return false;
        }
        computed
            .bytes()
            .zip(expected.bytes())
            .fold(0u8, |acc, (a, b)| acc | (a ^ b))
            == 0
    }

    fn derive(&self, plaintext: &str, salt: &str) -> String {
        let mut out = [0u8; DIGEST_LEN];
        pbkdf2::pbkdf2_hmac::<Sha512>(plaintext.as_bytes(), salt.as_bytes(), self.rounds, &mut out);
        hex::encode(out)
    }
}

/// 64 hex characters: SHA-256 over two random v4 UUIDs.
fn fresh_salt() -> String {
    let mut hasher = Sha256::new();
    hasher.update(Uuid::new_v4().as_bytes());
    hasher.update(Uuid::new_v4().as_bytes());
    hex::encode(hasher.finalize())
}

pub fn hash_secret(plaintext: &str) -> String {
    SecretHasher::default().hash(plaintext)
}

pub fn verify_secret(stored: &str, candidate: &str) -> bool {
    SecretHasher::default().verify(stored, candidate)
}
