//! Configuration loading and merging for smtlab.
//!
//! Settings come from four layers, highest precedence first: command-line
//! flags, environment variables, the TOML config file, built-in defaults.
//! Flags and environment are merged by the CLI before they reach
//! [`resolve`], so this crate only sees "explicit" values and the file.

use smtlab_client::{ClientConfig, Credentials, DEFAULT_ENDPOINT, DEFAULT_TIMEOUT};
use smtlab_error::ConfigError;
use smtlab_types::ConfigFile;
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

/// Looked up in the working directory when no `--config` is given.
pub const DEFAULT_CONFIG_FILE: &str = "smtlab.toml";

pub const DEFAULT_CONCURRENCY: usize = 4;

/// Values set explicitly by the caller (flags or environment).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Overrides {
    pub endpoint: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub timeout: Option<String>,
    pub concurrency: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedConfig {
    pub client: ClientConfig,
    /// Upper bound on concurrent result-detail fetches.
    pub concurrency: usize,
}

pub fn load_config_file(path: &Path) -> Result<ConfigFile, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.display().to_string(),
        source,
    })?;
    toml::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.display().to_string(),
        source,
    })
}

/// Load the config file named on the command line, or `smtlab.toml` under
/// `dir` when it exists. An explicit path that cannot be read is an error; a
/// missing default file is not.
pub fn discover_config_file(
    explicit: Option<&Path>,
    dir: &Path,
) -> Result<ConfigFile, ConfigError> {
    if let Some(path) = explicit {
        return load_config_file(path);
    }
    let default: PathBuf = dir.join(DEFAULT_CONFIG_FILE);
    if default.is_file() {
        load_config_file(&default)
    } else {
        Ok(ConfigFile::default())
    }
}

/// Merge explicit values over the file over defaults, and validate.
pub fn resolve(file: ConfigFile, overrides: Overrides) -> Result<ResolvedConfig, ConfigError> {
    let endpoint = overrides
        .endpoint
        .or(file.endpoint)
        .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string());
    let endpoint = parse_endpoint(&endpoint)?;

    let timeout = match overrides.timeout.or(file.timeout) {
        Some(raw) => parse_timeout(&raw)?,
        None => DEFAULT_TIMEOUT,
    };

    let concurrency = overrides
        .concurrency
        .or(file.concurrency)
        .unwrap_or(DEFAULT_CONCURRENCY);
    if concurrency == 0 {
        return Err(ConfigError::ZeroConcurrency);
    }

    // A password without a username authenticates nobody.
    let credentials = overrides
        .username
        .or(file.username)
        .map(|username| Credentials {
            username,
            password: overrides.password.or(file.password).unwrap_or_default(),
        });

    Ok(ResolvedConfig {
        client: ClientConfig {
            endpoint,
            credentials,
            timeout,
        },
        concurrency,
    })
}

fn parse_endpoint(raw: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(raw.trim()).map_err(|e| ConfigError::InvalidEndpoint {
        value: raw.to_string(),
        message: e.to_string(),
    })?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(ConfigError::InvalidEndpoint {
            value: raw.to_string(),
            message: format!("unsupported scheme {other:?}"),
        }),
    }
}

fn parse_timeout(raw: &str) -> Result<Duration, ConfigError> {
    let timeout = humantime::parse_duration(raw.trim()).map_err(|e| ConfigError::InvalidTimeout {
        value: raw.to_string(),
        message: e.to_string(),
    })?;
    if timeout.is_zero() {
        return Err(ConfigError::InvalidTimeout {
            value: raw.to_string(),
            message: "must be greater than zero".to_string(),
        });
    }
    Ok(timeout)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn defaults_apply_when_nothing_is_set() {
        let cfg = resolve(ConfigFile::default(), Overrides::default()).unwrap();
        assert_eq!(cfg.client.endpoint.as_str(), "http://127.0.0.1:5000/");
        assert_eq!(cfg.client.timeout, Duration::from_secs(30));
        assert!(cfg.client.credentials.is_none());
        assert_eq!(cfg.concurrency, 4);
    }

    #[test]
    fn explicit_values_win_over_file() {
        let file = ConfigFile {
            endpoint: Some("http://file.example:5000".into()),
            username: Some("file-user".into()),
            password: Some("file-pass".into()),
            timeout: Some("5s".into()),
            concurrency: Some(2),
        };
        let overrides = Overrides {
            endpoint: Some("https://flag.example/api".into()),
            username: None,
            password: Some("flag-pass".into()),
            timeout: None,
            concurrency: Some(16),
        };
        let cfg = resolve(file, overrides).unwrap();
        assert_eq!(cfg.client.endpoint.as_str(), "https://flag.example/api");
        assert_eq!(cfg.client.timeout, Duration::from_secs(5));
        assert_eq!(cfg.concurrency, 16);
        let creds = cfg.client.credentials.unwrap();
        assert_eq!(creds.username, "file-user");
        assert_eq!(creds.password, "flag-pass");
    }

    #[test]
    fn password_alone_yields_no_credentials() {
        let overrides = Overrides {
            password: Some("secret".into()),
            ..Overrides::default()
        };
        let cfg = resolve(ConfigFile::default(), overrides).unwrap();
        assert!(cfg.client.credentials.is_none());
    }

    #[test]
    fn zero_concurrency_is_rejected() {
        let overrides = Overrides {
            concurrency: Some(0),
            ..Overrides::default()
        };
        assert!(matches!(
            resolve(ConfigFile::default(), overrides),
            Err(ConfigError::ZeroConcurrency)
        ));
    }

    #[test]
    fn bad_endpoint_and_timeout_are_rejected() {
        for endpoint in ["not a url", "ftp://lab.example"] {
            let overrides = Overrides {
                endpoint: Some(endpoint.into()),
                ..Overrides::default()
            };
            assert!(matches!(
                resolve(ConfigFile::default(), overrides),
                Err(ConfigError::InvalidEndpoint { .. })
            ));
        }
        for timeout in ["soon", "0s"] {
            let file = ConfigFile {
                timeout: Some(timeout.into()),
                ..ConfigFile::default()
            };
            assert!(matches!(
                resolve(file, Overrides::default()),
                Err(ConfigError::InvalidTimeout { .. })
            ));
        }
    }

    #[test]
    fn discovers_default_file_in_directory() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join(DEFAULT_CONFIG_FILE),
            "endpoint = \"http://lab.example:5000\"\nconcurrency = 8\n",
        )
        .unwrap();
        let file = discover_config_file(None, dir.path()).unwrap();
        assert_eq!(file.endpoint.as_deref(), Some("http://lab.example:5000"));
        assert_eq!(file.concurrency, Some(8));
    }

    #[test]
    fn missing_default_file_is_empty_config() {
        let dir = TempDir::new().unwrap();
        assert_eq!(
            discover_config_file(None, dir.path()).unwrap(),
            ConfigFile::default()
        );
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nope.toml");
        assert!(matches!(
            discover_config_file(Some(&path), dir.path()),
            Err(ConfigError::Read { .. })
        ));
    }

    #[test]
    fn unknown_key_is_a_parse_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("smtlab.toml");
        fs::write(&path, "endpiont = \"http://x\"\n").unwrap();
        let err = load_config_file(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
        assert!(err.to_string().contains("smtlab.toml"));
    }
}
