//! Strength checks for session signing secrets.
//!
//! Both servers refuse to start with a secret that is short, looks like a
//! copied placeholder, or repeats too few distinct characters.

use std::collections::HashMap;

use thiserror::Error;

/// Shortest accepted secret, in bytes.
pub const MIN_SECRET_LENGTH: usize = 32;

/// Lowest accepted Shannon entropy, in bits per character.
pub const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;

/// Fragments found in sample `.env` files (matched case-insensitively).
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "secret",
    "password",
    "xxx",
    "todo",
    "fixme",
    "insert",
    "enter-",
    "put-your",
    "add-your",
];

/// Why a secret was rejected.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum WeakSecret {
    #[error("must be at least {min} characters (got {0})", min = MIN_SECRET_LENGTH)]
    TooShort(usize),
    #[error("appears to be a placeholder (contains '{0}')")]
    Placeholder(&'static str),
    #[error(
        "entropy too low ({0:.2} bits/char, need >= {min:.1}). Use a randomly generated secret.",
        min = MIN_ENTROPY_BITS_PER_CHAR
    )]
    LowEntropy(f64),
}

/// Check a session secret.
///
/// # Errors
///
/// Returns the first [`WeakSecret`] problem found: placeholder text is
/// reported before length, length before entropy.
pub fn check_session_secret(secret: &str) -> Result<(), WeakSecret> {
    let lower = secret.to_lowercase();
    if let Some(pattern) = PLACEHOLDER_PATTERNS.iter().find(|p| lower.contains(**p)) {
        return Err(WeakSecret::Placeholder(*pattern));
    }

    if secret.len() < MIN_SECRET_LENGTH {
        return Err(WeakSecret::TooShort(secret.len()));
    }

    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(WeakSecret::LowEntropy(entropy));
    }
    Ok(())
}

/// Shannon entropy of `s` in bits per character.
#[must_use]
pub fn shannon_entropy(s: &str) -> f64 {
    if s.is_empty() {
        return 0.0;
    }

    let mut freq: HashMap<char, usize> = HashMap::new();
    for c in s.chars() {
        *freq.entry(c).or_insert(0) += 1;
    }

    #[allow(clippy::cast_precision_loss)] // secrets are far below 2^52 chars
    let len = s.chars().count() as f64;
    freq.values()
        .map(|&count| {
            #[allow(clippy::cast_precision_loss)]
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_entropy() {
        assert!(shannon_entropy("").abs() < f64::EPSILON);
        assert!((shannon_entropy("ab") - 1.0).abs() < 0.01);
        assert!(shannon_entropy("aB3$xY9!mK2@nL5#") > MIN_ENTROPY_BITS_PER_CHAR);
    }

    #[test]
    fn test_rejects_placeholders() {
        assert_eq!(
            check_session_secret("your-session-key-here-0123456789abcdef"),
            Err(WeakSecret::Placeholder("your-"))
        );
        assert!(matches!(
            check_session_secret("CHANGEME-kQ9vL2pZ7wM4hT6bN1cX8rF3"),
            Err(WeakSecret::Placeholder("changeme"))
        ));
    }

    #[test]
    fn test_rejects_short_and_repetitive() {
        assert_eq!(check_session_secret("kQ9$vL2!"), Err(WeakSecret::TooShort(8)));
        assert!(matches!(
            check_session_secret(&"ab".repeat(16)),
            Err(WeakSecret::LowEntropy(_))
        ));
    }

    #[test]
    fn test_accepts_random_secret() {
        assert!(check_session_secret("aB3$xY9!mK2@nL5#pQ7&rT0*uW4^zC6%").is_ok());
    }
}
