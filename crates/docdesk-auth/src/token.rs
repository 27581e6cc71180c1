//! Shared-access token generation
//!
//! Tokens are bearer credentials stored in plaintext on the book record, so
//! length and alphabet are the only protection against enumeration. Symbols
//! are drawn uniformly from the alphabet using the operating system CSPRNG.

use std::fmt;
use std::str::FromStr;

use rand::{rngs::OsRng, Rng};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default token length (32 symbols of a 62-symbol alphabet is ~190 bits)
pub const DEFAULT_TOKEN_SIZE: usize = 32;

/// Longest token `book.private_token` can hold
pub const MAX_TOKEN_SIZE: usize = 500;

const NUMERIC: &[u8] = b"0123456789";
const LOWER: &[u8] = b"abcdefghijklmnopqrstuvwxyz";
const UPPER: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ";
const ALL: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Token errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TokenError {
    #[error("Token length must be between 1 and {MAX_TOKEN_SIZE}")]
    InvalidLength,

    #[error("Unknown token alphabet '{0}' (expected numeric, lower, upper or all)")]
    UnknownAlphabet(String),
}

/// Symbol set tokens are drawn from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenAlphabet {
    Numeric,
    Lower,
    Upper,
    #[default]
    All,
}

impl TokenAlphabet {
    pub fn symbols(self) -> &'static [u8] {
        match self {
            Self::Numeric => NUMERIC,
            Self::Lower => LOWER,
            Self::Upper => UPPER,
            Self::All => ALL,
        }
    }

    pub fn contains(self, c: char) -> bool {
        c.is_ascii() && self.symbols().contains(&(c as u8))
    }
}

impl FromStr for TokenAlphabet {
    type Err = TokenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "numeric" | "num" => Ok(Self::Numeric),
            "lower" => Ok(Self::Lower),
            "upper" => Ok(Self::Upper),
            "all" => Ok(Self::All),
            other => Err(TokenError::UnknownAlphabet(other.to_string())),
        }
    }
}

impl fmt::Display for TokenAlphabet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Numeric => "numeric",
            Self::Lower => "lower",
            Self::Upper => "upper",
            Self::All => "all",
        };
        f.write_str(name)
    }
}

/// Random token generator with a fixed length and alphabet
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccessTokenGenerator {
    length: usize,
    alphabet: TokenAlphabet,
}

impl AccessTokenGenerator {
    pub fn new(length: usize, alphabet: TokenAlphabet) -> Result<Self, TokenError> {
        if !(1..=MAX_TOKEN_SIZE).contains(&length) {
            return Err(TokenError::InvalidLength);
        }

        Ok(Self { length, alphabet })
    }

    pub fn length(&self) -> usize {
        self.length
    }

    pub fn alphabet(&self) -> TokenAlphabet {
        self.alphabet
    }

    /// Generate a fresh token
    pub fn generate(&self) -> String {
        let symbols = self.alphabet.symbols();
        let mut rng = OsRng;

        (0..self.length)
            .map(|_| symbols[rng.gen_range(0..symbols.len())] as char)
            .collect()
    }
}

impl Default for AccessTokenGenerator {
    fn default() -> Self {
        Self {
            length: DEFAULT_TOKEN_SIZE,
            alphabet: TokenAlphabet::All,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_length_and_alphabet() {
        for alphabet in [
            TokenAlphabet::Numeric,
            TokenAlphabet::Lower,
            TokenAlphabet::Upper,
            TokenAlphabet::All,
        ] {
            let generator = AccessTokenGenerator::new(48, alphabet).unwrap();
            let token = generator.generate();

            assert_eq!(token.chars().count(), 48);
            assert!(
                token.chars().all(|c| alphabet.contains(c)),
                "{} produced out-of-alphabet symbol in {}",
                alphabet,
                token
            );
        }
    }

    #[test]
    fn test_tokens_differ() {
        let generator = AccessTokenGenerator::default();
        assert_ne!(generator.generate(), generator.generate());
    }

    #[test]
    fn test_zero_length_rejected() {
        assert_eq!(
            AccessTokenGenerator::new(0, TokenAlphabet::All),
            Err(TokenError::InvalidLength)
        );
    }

    #[test]
    fn test_length_above_column_width_rejected() {
        assert_eq!(
            AccessTokenGenerator::new(MAX_TOKEN_SIZE + 1, TokenAlphabet::All),
            Err(TokenError::InvalidLength)
        );

        let generator = AccessTokenGenerator::new(MAX_TOKEN_SIZE, TokenAlphabet::Numeric).unwrap();
        assert_eq!(generator.generate().len(), MAX_TOKEN_SIZE);
    }

    #[test]
    fn test_alphabet_parse() {
        assert_eq!("ALL".parse::<TokenAlphabet>(), Ok(TokenAlphabet::All));
        assert_eq!("numeric".parse::<TokenAlphabet>(), Ok(TokenAlphabet::Numeric));
        assert!("hex".parse::<TokenAlphabet>().is_err());
    }

    #[test]
    fn test_all_alphabet_is_62_symbols() {
        assert_eq!(TokenAlphabet::All.symbols().len(), 62);
    }
}
