use base58::ToBase58;
use rand::RngCore;
use rand::rngs::OsRng;

use crate::CantripPackError;
use crate::pack::MARKER_KEY;

/// Bytes of entropy behind each placeholder token.
pub(crate) const TOKEN_BYTES: usize = 32;

/// A single-use random placeholder, scoped to one packing call.
///
/// During the structural walk, capability markers are keyed by
/// `_special_<token>` rather than the public `_special` name; the packed
/// text is rewritten to the public name at the very end. Because the token
/// is fresh, unpredictable random data, input that tries to smuggle a
/// marker in under the transient name cannot guess it, and the explicit
/// key guard closes the remaining deterministic path.
pub(crate) struct PlaceholderToken {
    key: String,
}

impl PlaceholderToken {
    /// Draw a fresh token from the operating system CSPRNG.
    ///
    /// Failure of the randomness source is fatal: the whole guarantee
    /// rests on unpredictability, so there is no fallback.
    pub(crate) fn generate() -> Result<Self, CantripPackError> {
        let mut bytes = [0u8; TOKEN_BYTES];
        OsRng
            .try_fill_bytes(&mut bytes)
            .map_err(CantripPackError::Entropy)?;
        Ok(Self {
            key: format!("{}_{}", MARKER_KEY, bytes.to_base58()),
        })
    }

    /// The transient key name, `_special_<token>`.
    pub(crate) fn transient_key(&self) -> &str {
        &self.key
    }
}
