//! Access code issuance and access key derivation.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE;

/// Number of digits in a generated access code.
pub const CODE_DIGITS: usize = 6;

/// Exclusive upper bound of generated codes.
const CODE_SPACE: u32 = 1_000_000;

/// Issues human-facing access codes and derives download keys from them.
#[derive(Debug, Clone, Copy, Default)]
pub struct CodeGenerator;

impl CodeGenerator {
    /// Creates a new code generator.
    pub fn new() -> Self {
        Self
    }

    /// Returns `custom` verbatim when non-empty, else a fresh random code.
    pub fn issue_code(&self, custom: Option<&str>) -> String {
        match custom {
            Some(code) if !code.is_empty() => code.to_string(),
            _ => self.generate_code(),
        }
    }

    /// A uniformly random code in `[0, 1_000_000)`, zero-padded to six digits.
    ///
    /// Drawn from the thread-local CSPRNG.
    pub fn generate_code(&self) -> String {
        let value = rand::random_range(0..CODE_SPACE);
        format!("{value:0width$}", width = CODE_DIGITS)
    }

    /// URL-safe base64 (padded) of `id` followed by `code`.
    ///
    /// This binds a download to an `(id, code)` pair. It is an encoding,
    /// not a MAC: anyone who knows both values can produce it.
    pub fn derive_key(&self, id: &str, code: &str) -> String {
        let mut raw = String::with_capacity(id.len() + code.len());
        raw.push_str(id);
        raw.push_str(code);
        URL_SAFE.encode(raw.as_bytes())
    }

    /// Whether `key` is the key for `(id, code)`.
    pub fn verify_key(&self, key: &str, id: &str, code: &str) -> bool {
        self.derive_key(id, code) == key
    }
}
