//! Random password generation.
//!
//! Characters are drawn uniformly from the alphabet using the thread-local
//! CSPRNG. Length and alphabet fall back to configured defaults when the
//! caller passes zero or a blank string.

use rand::Rng;
use zeroize::Zeroizing;

use crate::errors::{Result, StoreError};

/// Resolve the effective `(length, alphabet)` pair.
///
/// A zero `length` or a blank `alphabet` is replaced by the default.
pub fn resolve_inputs<'a>(
    length: usize,
    alphabet: &'a str,
    default_length: usize,
    default_alphabet: &'a str,
) -> (usize, &'a str) {
    let length = if length == 0 { default_length } else { length };
    let alphabet = if alphabet.trim().is_empty() {
        default_alphabet
    } else {
        alphabet
    };
    (length, alphabet)
}

/// Generate a password of `length` characters drawn from `alphabet`.
pub fn generate_password(length: usize, alphabet: &str) -> Result<Zeroizing<String>> {
    if length == 0 {
        return Err(StoreError::InvalidGeneratorInput(
            "length must be at least 1".into(),
        ));
    }

    let mut chars: Vec<char> = alphabet.chars().collect();
    chars.sort_unstable();
    chars.dedup();
    if chars.is_empty() {
        return Err(StoreError::InvalidGeneratorInput(
            "alphabet cannot be empty".into(),
        ));
    }

    let mut rng = rand::rng();
    let mut password = Zeroizing::new(String::with_capacity(length));
    for _ in 0..length {
        password.push(chars[rng.random_range(0..chars.len())]);
    }
    Ok(password)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generates_requested_length_from_alphabet() {
        let pw = generate_password(64, "ab").unwrap();
        assert_eq!(pw.chars().count(), 64);
        assert!(pw.chars().all(|c| c == 'a' || c == 'b'));
    }

    #[test]
    fn handles_multibyte_alphabet() {
        let pw = generate_password(10, "äöü").unwrap();
        assert_eq!(pw.chars().count(), 10);
    }

    #[test]
    fn rejects_zero_length() {
        assert!(matches!(
            generate_password(0, "abc"),
            Err(StoreError::InvalidGeneratorInput(_))
        ));
    }

    #[test]
    fn rejects_empty_alphabet() {
        assert!(matches!(
            generate_password(8, ""),
            Err(StoreError::InvalidGeneratorInput(_))
        ));
    }

    #[test]
    fn zero_and_blank_fall_back_to_defaults() {
        assert_eq!(resolve_inputs(0, "  ", 20, "xyz"), (20, "xyz"));
        assert_eq!(resolve_inputs(5, "ab", 20, "xyz"), (5, "ab"));
    }
}
