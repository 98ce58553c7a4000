//! Salt generation for stored file names

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const SALT_CHARS: &[u8] = b"0123456789abcdef";

/// Produces the random prefix that makes stored file names unique
pub trait SaltSource: Send {
    /// Return `len` lowercase hex characters
    fn next_salt(&mut self, len: usize) -> String;
}

/// Entropy-seeded salt generator used by default
#[derive(Debug)]
pub struct RandomSalt {
    rng: StdRng,
}

impl RandomSalt {
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }
}

impl Default for RandomSalt {
    fn default() -> Self {
        Self::new()
    }
}

impl SaltSource for RandomSalt {
    fn next_salt(&mut self, len: usize) -> String {
        (0..len)
            .map(|_| SALT_CHARS[self.rng.gen_range(0..SALT_CHARS.len())] as char)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_random_salt_shape() {
        let mut salts = RandomSalt::new();
        let salt = salts.next_salt(16);
        assert_eq!(salt.len(), 16);
        assert!(salt.bytes().all(|b| SALT_CHARS.contains(&b)));
        assert_ne!(salts.next_salt(16), salts.next_salt(16));
    }
}
