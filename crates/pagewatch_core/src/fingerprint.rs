use std::fmt::{self, Write};
use std::str::FromStr;

/// Digest width in bytes (128 bits).
pub const FINGERPRINT_LEN: usize = 16;

/// Content digest compared across runs. Equality is byte-exact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Fingerprint([u8; FINGERPRINT_LEN]);

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum FingerprintParseError {
    #[error("expected {expected} hex digits, found {found}")]
    Length { expected: usize, found: usize },
    #[error("invalid hex digit {0:?}")]
    InvalidDigit(char),
}

impl Fingerprint {
    pub const fn from_bytes(bytes: [u8; FINGERPRINT_LEN]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; FINGERPRINT_LEN] {
        &self.0
    }

    /// Lowercase hex, 32 characters.
    pub fn to_hex(&self) -> String {
        let mut hex = String::with_capacity(FINGERPRINT_LEN * 2);
        for byte in &self.0 {
            let _ = write!(&mut hex, "{byte:02x}");
        }
        hex
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl FromStr for Fingerprint {
    type Err = FingerprintParseError;

    /// Parses hex text, ignoring surrounding whitespace and digit case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if let Some(bad) = trimmed.chars().find(|c| !c.is_ascii_hexdigit()) {
            return Err(FingerprintParseError::InvalidDigit(bad));
        }
        if trimmed.len() != FINGERPRINT_LEN * 2 {
            return Err(FingerprintParseError::Length {
                expected: FINGERPRINT_LEN * 2,
                found: trimmed.len(),
            });
        }

        let mut bytes = [0u8; FINGERPRINT_LEN];
        for (slot, pair) in bytes.iter_mut().zip(trimmed.as_bytes().chunks_exact(2)) {
            *slot = (hex_value(pair[0]) << 4) | hex_value(pair[1]);
        }
        Ok(Self(bytes))
    }
}

// Callers have already checked `is_ascii_hexdigit`.
fn hex_value(digit: u8) -> u8 {
    match digit {
        b'0'..=b'9' => digit - b'0',
        b'a'..=b'f' => digit - b'a' + 10,
        _ => digit - b'A' + 10,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_digit_values() {
        assert_eq!(hex_value(b'0'), 0);
        assert_eq!(hex_value(b'9'), 9);
        assert_eq!(hex_value(b'a'), 10);
        assert_eq!(hex_value(b'F'), 15);
    }
}
