//! Application settings loaded via OrthoConfig.
//!
//! Values come from `SKICLUB_*` environment variables, matching CLI flags, or
//! a configuration file. Session toggles are validated against the build
//! mode: debug builds fall back to development defaults with a warning,
//! release builds insist on explicit, safe values.

use std::net::SocketAddr;
use std::path::PathBuf;

use actix_web::cookie::{Key, SameSite};
use ortho_config::OrthoConfig;
use serde::Deserialize;
use tracing::warn;
use zeroize::{Zeroize, Zeroizing};

use skiclub::domain::{BootstrapAdmin, DisplayName, UserId};

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const SESSION_KEY_DEFAULT_PATH: &str = "/var/run/secrets/session_key";
const SESSION_KEY_MIN_LEN: usize = 64;
const DEFAULT_ADMIN_ID: &str = "00000000-0000-4000-8000-000000000001";
const DEFAULT_ADMIN_USERNAME: &str = "admin";
const DEFAULT_ADMIN_DISPLAY_NAME: &str = "Club Admin";
const DEV_ADMIN_PASSWORD: &str = "password";
const BOOL_EXPECTED: &str = "1|0|true|false|yes|no|y|n";
const SAMESITE_EXPECTED: &str = "Strict|Lax|None";
const DISPLAY_NAME_EXPECTED: &str =
    "3-32 letters, digits, spaces, underscores, hyphens or apostrophes";

/// Build mode for settings validation.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum BuildMode {
    /// Tolerates defaults and warns about missing toggles.
    Debug,
    /// Requires explicit, valid session toggles.
    Release,
}

impl BuildMode {
    #[must_use]
    pub fn from_debug_assertions() -> Self {
        if cfg!(debug_assertions) {
            Self::Debug
        } else {
            Self::Release
        }
    }

    fn is_debug(self) -> bool {
        matches!(self, Self::Debug)
    }
}

/// Everything the server needs to start.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "SKICLUB")]
pub struct AppSettings {
    /// Socket address to listen on.
    pub bind_addr: Option<String>,
    /// PostgreSQL URL; the in-memory store is used when absent.
    pub database_url: Option<String>,
    /// File holding the session signing key material.
    pub session_key_file: Option<PathBuf>,
    /// Whether session cookies carry the `Secure` flag.
    pub cookie_secure: Option<String>,
    /// `SameSite` policy for session cookies.
    pub same_site: Option<String>,
    /// Allow a generated key when the key file is unreadable.
    pub allow_ephemeral_session_key: Option<String>,
    /// Stable id of the bootstrap administrator.
    pub admin_id: Option<String>,
    pub admin_username: Option<String>,
    pub admin_password: Option<String>,
    pub admin_display_name: Option<String>,
}

/// Session settings derived from [`AppSettings`].
pub struct SessionSettings {
    pub key: Key,
    pub cookie_secure: bool,
    pub same_site: SameSite,
}

/// Errors raised while validating settings.
#[derive(thiserror::Error, Debug)]
pub enum SettingsError {
    #[error("missing required setting: {name}")]
    Missing { name: &'static str },
    #[error("invalid value for {name}='{value}'; expected {expected}")]
    Invalid {
        name: &'static str,
        value: String,
        expected: &'static str,
    },
    #[error("failed to read session key at {path}: {source}")]
    KeyRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("session key at {path} too short: need >= {min_len} bytes, got {length}")]
    KeyTooShort {
        path: PathBuf,
        length: usize,
        min_len: usize,
    },
    #[error("SKICLUB_SAME_SITE=None requires SKICLUB_COOKIE_SECURE=1")]
    InsecureSameSiteNone,
    #[error("SKICLUB_ALLOW_EPHEMERAL_SESSION_KEY must be 0 in release builds")]
    EphemeralNotAllowed,
}

impl AppSettings {
    /// Socket address to bind, defaulting to all interfaces on port 8080.
    pub fn bind_addr(&self) -> Result<SocketAddr, SettingsError> {
        let raw = self.bind_addr.as_deref().unwrap_or(DEFAULT_BIND_ADDR);
        raw.parse().map_err(|_| SettingsError::Invalid {
            name: "SKICLUB_BIND_ADDR",
            value: raw.to_owned(),
            expected: "host:port",
        })
    }

    /// Validate the session toggles and load the signing key.
    pub fn session_settings(&self, mode: BuildMode) -> Result<SessionSettings, SettingsError> {
        let cookie_secure = self.cookie_secure(mode)?;
        let same_site = self.same_site(mode, cookie_secure)?;
        let allow_ephemeral = self.allow_ephemeral(mode)?;
        let key = self.session_key(mode, allow_ephemeral)?;
        Ok(SessionSettings {
            key,
            cookie_secure,
            same_site,
        })
    }

    /// The configured bootstrap administrator.
    ///
    /// Release builds require an explicit password; debug builds fall back to
    /// a well-known development password.
    pub fn bootstrap_admin(&self, mode: BuildMode) -> Result<BootstrapAdmin, SettingsError> {
        let raw_id = self.admin_id.as_deref().unwrap_or(DEFAULT_ADMIN_ID);
        let id = UserId::new(raw_id).map_err(|_| SettingsError::Invalid {
            name: "SKICLUB_ADMIN_ID",
            value: raw_id.to_owned(),
            expected: "a UUID",
        })?;
        let raw_name = self
            .admin_display_name
            .as_deref()
            .unwrap_or(DEFAULT_ADMIN_DISPLAY_NAME);
        let display_name = DisplayName::new(raw_name).map_err(|_| SettingsError::Invalid {
            name: "SKICLUB_ADMIN_DISPLAY_NAME",
            value: raw_name.to_owned(),
            expected: DISPLAY_NAME_EXPECTED,
        })?;
        let username = self
            .admin_username
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .unwrap_or(DEFAULT_ADMIN_USERNAME)
            .to_owned();
        let password = match self.admin_password.as_deref() {
            Some(password) if !password.is_empty() => Zeroizing::new(password.to_owned()),
            _ if mode.is_debug() => {
                warn!("SKICLUB_ADMIN_PASSWORD not set; using the development password");
                Zeroizing::new(DEV_ADMIN_PASSWORD.to_owned())
            }
            _ => {
                return Err(SettingsError::Missing {
                    name: "SKICLUB_ADMIN_PASSWORD",
                });
            }
        };
        Ok(BootstrapAdmin {
            id,
            display_name,
            username,
            password,
        })
    }

    fn cookie_secure(&self, mode: BuildMode) -> Result<bool, SettingsError> {
        let Some(value) = self.cookie_secure.as_deref() else {
            if mode.is_debug() {
                warn!("SKICLUB_COOKIE_SECURE not set; defaulting to secure");
                return Ok(true);
            }
            return Err(SettingsError::Missing {
                name: "SKICLUB_COOKIE_SECURE",
            });
        };
        match parse_bool(value) {
            Some(flag) => Ok(flag),
            None if mode.is_debug() => {
                warn!(value, "invalid SKICLUB_COOKIE_SECURE; defaulting to secure");
                Ok(true)
            }
            None => Err(SettingsError::Invalid {
                name: "SKICLUB_COOKIE_SECURE",
                value: value.to_owned(),
                expected: BOOL_EXPECTED,
            }),
        }
    }

    fn same_site(&self, mode: BuildMode, cookie_secure: bool) -> Result<SameSite, SettingsError> {
        let default_same_site = if mode.is_debug() {
            SameSite::Lax
        } else {
            SameSite::Strict
        };
        let Some(value) = self.same_site.as_deref() else {
            if mode.is_debug() {
                warn!("SKICLUB_SAME_SITE not set; using default");
                return Ok(default_same_site);
            }
            return Err(SettingsError::Missing {
                name: "SKICLUB_SAME_SITE",
            });
        };

        match value.to_ascii_lowercase().as_str() {
            "lax" => Ok(SameSite::Lax),
            "strict" => Ok(SameSite::Strict),
            "none" if cookie_secure => Ok(SameSite::None),
            "none" if mode.is_debug() => {
                warn!("SKICLUB_SAME_SITE=None without secure cookies; browsers may reject them");
                Ok(SameSite::None)
            }
            "none" => Err(SettingsError::InsecureSameSiteNone),
            _ if mode.is_debug() => {
                warn!(value, "invalid SKICLUB_SAME_SITE, using default");
                Ok(default_same_site)
            }
            _ => Err(SettingsError::Invalid {
                name: "SKICLUB_SAME_SITE",
                value: value.to_owned(),
                expected: SAMESITE_EXPECTED,
            }),
        }
    }

    fn allow_ephemeral(&self, mode: BuildMode) -> Result<bool, SettingsError> {
        let Some(value) = self.allow_ephemeral_session_key.as_deref() else {
            return Ok(false);
        };
        match parse_bool(value) {
            Some(true) if mode.is_debug() => Ok(true),
            Some(true) => Err(SettingsError::EphemeralNotAllowed),
            Some(false) => Ok(false),
            None if mode.is_debug() => {
                warn!(
                    value,
                    "invalid SKICLUB_ALLOW_EPHEMERAL_SESSION_KEY; defaulting to disabled"
                );
                Ok(false)
            }
            None => Err(SettingsError::Invalid {
                name: "SKICLUB_ALLOW_EPHEMERAL_SESSION_KEY",
                value: value.to_owned(),
                expected: BOOL_EXPECTED,
            }),
        }
    }

    fn session_key(&self, mode: BuildMode, allow_ephemeral: bool) -> Result<Key, SettingsError> {
        let path = self
            .session_key_file
            .clone()
            .unwrap_or_else(|| PathBuf::from(SESSION_KEY_DEFAULT_PATH));

        match std::fs::read(&path) {
            Ok(mut bytes) => {
                let length = bytes.len();
                if mode == BuildMode::Release && length < SESSION_KEY_MIN_LEN {
                    bytes.zeroize();
                    return Err(SettingsError::KeyTooShort {
                        path,
                        length,
                        min_len: SESSION_KEY_MIN_LEN,
                    });
                }
                let key = Key::derive_from(&bytes);
                bytes.zeroize();
                Ok(key)
            }
            Err(error) if mode.is_debug() || allow_ephemeral => {
                warn!(
                    path = %path.display(),
                    error = %error,
                    "using temporary session key (dev only)"
                );
                Ok(Key::generate())
            }
            Err(error) => Err(SettingsError::KeyRead {
                path,
                source: error,
            }),
        }
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "y" => Some(true),
        "0" | "false" | "no" | "n" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::OsString;
    use std::io::Write;

    use env_lock::lock_env;
    use rstest::rstest;
    use tempfile::NamedTempFile;

    fn blank() -> AppSettings {
        AppSettings {
            bind_addr: None,
            database_url: None,
            session_key_file: None,
            cookie_secure: None,
            same_site: None,
            allow_ephemeral_session_key: None,
            admin_id: None,
            admin_username: None,
            admin_password: None,
            admin_display_name: None,
        }
    }

    fn key_file(len: usize) -> NamedTempFile {
        let mut file = NamedTempFile::new().expect("temp file");
        file.write_all(&vec![b'k'; len]).expect("write key");
        file
    }

    fn release_settings(key: &NamedTempFile) -> AppSettings {
        AppSettings {
            session_key_file: Some(key.path().to_path_buf()),
            cookie_secure: Some("1".to_owned()),
            same_site: Some("Strict".to_owned()),
            admin_password: Some("piste".to_owned()),
            ..blank()
        }
    }

    #[rstest]
    fn environment_overrides_are_loaded() {
        let _guard = lock_env([
            ("SKICLUB_BIND_ADDR", Some("127.0.0.1:9090".to_owned())),
            ("SKICLUB_DATABASE_URL", Some("postgres://club@localhost/club".to_owned())),
            ("SKICLUB_ADMIN_USERNAME", Some("chief".to_owned())),
            ("SKICLUB_COOKIE_SECURE", None::<String>),
        ]);

        let settings =
            AppSettings::load_from_iter([OsString::from("skiclub")]).expect("config should load");
        assert_eq!(
            settings.bind_addr().expect("valid addr"),
            "127.0.0.1:9090".parse::<SocketAddr>().expect("addr")
        );
        assert_eq!(
            settings.database_url.as_deref(),
            Some("postgres://club@localhost/club")
        );
        assert_eq!(settings.admin_username.as_deref(), Some("chief"));
        assert!(settings.cookie_secure.is_none());
    }

    #[rstest]
    fn bind_address_defaults_and_validates() {
        assert_eq!(
            blank().bind_addr().expect("default"),
            DEFAULT_BIND_ADDR.parse::<SocketAddr>().expect("addr")
        );
        let bad = AppSettings {
            bind_addr: Some("nowhere".to_owned()),
            ..blank()
        };
        assert!(matches!(bad.bind_addr(), Err(SettingsError::Invalid { .. })));
    }

    #[rstest]
    fn debug_builds_fall_back_to_development_defaults() {
        let settings = AppSettings {
            session_key_file: Some(PathBuf::from("/nonexistent/skiclub-key")),
            ..blank()
        };
        let session = settings
            .session_settings(BuildMode::Debug)
            .expect("debug defaults");
        assert!(session.cookie_secure);
        assert_eq!(session.same_site, SameSite::Lax);

        let admin = settings
            .bootstrap_admin(BuildMode::Debug)
            .expect("debug admin");
        assert_eq!(admin.username, DEFAULT_ADMIN_USERNAME);
        assert_eq!(admin.password.as_str(), DEV_ADMIN_PASSWORD);
        assert_eq!(admin.id.to_string(), DEFAULT_ADMIN_ID);
    }

    #[rstest]
    fn release_builds_accept_explicit_settings() {
        let key = key_file(SESSION_KEY_MIN_LEN);
        let session = release_settings(&key)
            .session_settings(BuildMode::Release)
            .expect("valid release settings");
        assert!(session.cookie_secure);
        assert_eq!(session.same_site, SameSite::Strict);
    }

    #[derive(Debug)]
    enum Expected {
        Missing,
        Invalid,
        InsecureNone,
        Ephemeral,
    }

    #[rstest]
    #[case::missing_secure(None, Some("Strict"), None, Expected::Missing)]
    #[case::missing_same_site(Some("1"), None, None, Expected::Missing)]
    #[case::bad_secure(Some("maybe"), Some("Strict"), None, Expected::Invalid)]
    #[case::bad_same_site(Some("1"), Some("Sideways"), None, Expected::Invalid)]
    #[case::insecure_none(Some("0"), Some("None"), None, Expected::InsecureNone)]
    #[case::ephemeral(Some("1"), Some("Lax"), Some("1"), Expected::Ephemeral)]
    fn release_builds_reject_unsafe_toggles(
        #[case] cookie_secure: Option<&str>,
        #[case] same_site: Option<&str>,
        #[case] allow_ephemeral: Option<&str>,
        #[case] expected: Expected,
    ) {
        let key = key_file(SESSION_KEY_MIN_LEN);
        let settings = AppSettings {
            cookie_secure: cookie_secure.map(str::to_owned),
            same_site: same_site.map(str::to_owned),
            allow_ephemeral_session_key: allow_ephemeral.map(str::to_owned),
            ..release_settings(&key)
        };
        let err = settings
            .session_settings(BuildMode::Release)
            .err()
            .expect("release validation fails");
        let matched = match expected {
            Expected::Missing => matches!(err, SettingsError::Missing { .. }),
            Expected::Invalid => matches!(err, SettingsError::Invalid { .. }),
            Expected::InsecureNone => matches!(err, SettingsError::InsecureSameSiteNone),
            Expected::Ephemeral => matches!(err, SettingsError::EphemeralNotAllowed),
        };
        assert!(matched, "expected {expected:?}, got {err}");
    }

    #[rstest]
    fn release_builds_reject_short_keys() {
        let key = key_file(16);
        let err = release_settings(&key)
            .session_settings(BuildMode::Release)
            .err()
            .expect("short key rejected");
        assert!(matches!(
            err,
            SettingsError::KeyTooShort { length: 16, .. }
        ));
    }

    #[rstest]
    fn release_builds_require_an_admin_password() {
        let err = blank()
            .bootstrap_admin(BuildMode::Release)
            .expect_err("password required");
        assert!(matches!(err, SettingsError::Missing { name } if name == "SKICLUB_ADMIN_PASSWORD"));
    }

    #[rstest]
    #[case(Some("not-a-uuid"), None)]
    #[case(None, Some("x"))]
    fn malformed_admin_identity_is_rejected(
        #[case] admin_id: Option<&str>,
        #[case] display_name: Option<&str>,
    ) {
        let settings = AppSettings {
            admin_id: admin_id.map(str::to_owned),
            admin_display_name: display_name.map(str::to_owned),
            admin_password: Some("piste".to_owned()),
            ..blank()
        };
        assert!(matches!(
            settings.bootstrap_admin(BuildMode::Release),
            Err(SettingsError::Invalid { .. })
        ));
    }
}
