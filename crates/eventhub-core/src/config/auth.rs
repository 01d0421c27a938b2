//! Authentication boundary configuration.

use serde::{Deserialize, Serialize};

/// How the already-authenticated caller is identified.
///
/// Credentials are verified by the gateway in front of this service; it
/// forwards the resulting user id in a trusted header.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Name of the header carrying the validated user id.
    #[serde(default = "default_user_header")]
    pub user_header: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            user_header: default_user_header(),
        }
    }
}

fn default_user_header() -> String {
    "x-user-id".to_string()
}
