//! Authorization code issuance configuration.

use serde::{Deserialize, Serialize};

/// Authorization code configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthorizationCodeConfig {
    /// Number of alphanumeric characters in generated codes.
    #[serde(default = "default_code_length")]
    pub code_length: usize,
}

impl Default for AuthorizationCodeConfig {
    fn default() -> Self {
        Self {
            code_length: default_code_length(),
        }
    }
}

fn default_code_length() -> usize {
    6
}
