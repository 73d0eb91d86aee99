//! Random authorization code generation.

use sessionkv_core::error::AppError;
use sessionkv_core::result::AppResult;

const ALPHANUMERIC: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

/// Largest multiple of the alphabet size that fits in a byte. Bytes at or
/// above it are redrawn so every character is equally likely.
const ACCEPT_BELOW: u8 = (256 / ALPHANUMERIC.len() * ALPHANUMERIC.len()) as u8;

/// Default code length.
pub const DEFAULT_CODE_LENGTH: usize = 6;

/// Generates alphanumeric authorization codes from the thread-local CSPRNG.
#[derive(Debug, Clone, Copy)]
pub struct CodeGenerator {
    /// Characters per code.
    length: usize,
}

impl Default for CodeGenerator {
    fn default() -> Self {
        Self {
            length: DEFAULT_CODE_LENGTH,
        }
    }
}

impl CodeGenerator {
    /// Creates a generator producing codes of `length` characters.
    pub fn new(length: usize) -> AppResult<Self> {
        if length == 0 {
            return Err(AppError::validation(
                "Authorization code length must be at least 1",
            ));
        }
        Ok(Self { length })
    }

    /// Characters per code.
    pub fn length(&self) -> usize {
        self.length
    }

    /// Generates a new code.
    pub fn generate(&self) -> String {
        let mut code = String::with_capacity(self.length);
        while code.len() < self.length {
            let byte: u8 = rand::random();
            if byte < ACCEPT_BELOW {
                let index = usize::from(byte) % ALPHANUMERIC.len();
                code.push(char::from(ALPHANUMERIC[index]));
            }
        }
        code
    }
}
