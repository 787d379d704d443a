//! Session configuration parsing and validation.
//!
//! Centralises the environment-driven session settings so they are
//! validated consistently and can be tested in isolation. A SHA-256
//! fingerprint of the key material is logged at startup so operators can
//! tell which key a running instance holds without ever logging the key.

use std::io;
use std::path::{Path, PathBuf};

use actix_web::cookie::Key;
use sha2::{Digest, Sha256};
use tracing::{info, warn};

const SESSION_KEY_DEFAULT_PATH: &str = "/var/run/secrets/session_key";
const SESSION_KEY_MIN_LEN: usize = 64;
const KEY_FILE_ENV: &str = "SESSION_KEY_FILE";
const COOKIE_SECURE_ENV: &str = "SESSION_COOKIE_SECURE";
const ALLOW_EPHEMERAL_ENV: &str = "SESSION_ALLOW_EPHEMERAL";

/// Session settings derived from configuration toggles.
pub struct SessionSettings {
    /// Signing key for cookie sessions.
    pub key: Key,
    /// Whether session cookies are marked `Secure`.
    pub cookie_secure: bool,
}

/// Errors raised while validating session configuration.
#[derive(Debug, thiserror::Error)]
pub enum SessionConfigError {
    /// Reading the session key file failed and ephemeral keys are not
    /// permitted.
    #[error("failed to read session key at {path}: {source}")]
    KeyRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    /// The session key file exists but holds too little material.
    #[error("session key at {path} too short: need >= {min_len} bytes, got {length}")]
    KeyTooShort {
        path: PathBuf,
        length: usize,
        min_len: usize,
    },
}

/// Hex SHA-256 fingerprint of key material, truncated for log lines.
fn key_fingerprint(material: &[u8]) -> String {
    let digest = Sha256::digest(material);
    let mut rendered = hex::encode(digest);
    rendered.truncate(16);
    rendered
}

/// Resolve session settings from the given sources.
///
/// `allow_ephemeral` permits a generated throwaway key when the key file is
/// unreadable; release builds should only set it for local smoke tests.
pub fn resolve_session_settings(
    key_path: &Path,
    cookie_secure: bool,
    allow_ephemeral: bool,
) -> Result<SessionSettings, SessionConfigError> {
    let key = match std::fs::read(key_path) {
        Ok(bytes) => {
            if bytes.len() < SESSION_KEY_MIN_LEN {
                return Err(SessionConfigError::KeyTooShort {
                    path: key_path.to_path_buf(),
                    length: bytes.len(),
                    min_len: SESSION_KEY_MIN_LEN,
                });
            }
            info!(
                fingerprint = %key_fingerprint(&bytes),
                path = %key_path.display(),
                "session key loaded"
            );
            Key::derive_from(&bytes)
        }
        Err(source) => {
            if !allow_ephemeral {
                return Err(SessionConfigError::KeyRead {
                    path: key_path.to_path_buf(),
                    source,
                });
            }
            warn!(
                path = %key_path.display(),
                error = %source,
                "using temporary session key; sessions will not survive restarts"
            );
            Key::generate()
        }
    };

    Ok(SessionSettings { key, cookie_secure })
}

/// Load session settings from the environment.
///
/// - `SESSION_KEY_FILE` — key file path, default `/var/run/secrets/session_key`.
/// - `SESSION_COOKIE_SECURE` — any value other than `0` keeps cookies Secure.
/// - `SESSION_ALLOW_EPHEMERAL` — `1` permits a generated key; debug builds
///   always may fall back to one.
pub fn session_settings_from_env() -> Result<SessionSettings, SessionConfigError> {
    let key_path = std::env::var(KEY_FILE_ENV)
        .map_or_else(|_| PathBuf::from(SESSION_KEY_DEFAULT_PATH), PathBuf::from);
    let cookie_secure = std::env::var(COOKIE_SECURE_ENV)
        .map(|v| v != "0")
        .unwrap_or(true);
    let allow_ephemeral = cfg!(debug_assertions)
        || std::env::var(ALLOW_EPHEMERAL_ENV).ok().as_deref() == Some("1");

    resolve_session_settings(&key_path, cookie_secure, allow_ephemeral)
}
