use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_PAGE_SIZE: u32 = 1;
pub const DEFAULT_POOL_SIZE: usize = 50;
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_RESULT_KEY: &str = "result";

/// Where the final aggregate is delivered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SinkKind {
    Stdout,
    File,
    Remote,
    /// Print to stdout, then submit to the remote endpoint
    Both,
}

impl SinkKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SinkKind::Stdout => "stdout",
            SinkKind::File => "file",
            SinkKind::Remote => "remote",
            SinkKind::Both => "both",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.to_lowercase().as_str() {
            "stdout" => Some(SinkKind::Stdout),
            "file" => Some(SinkKind::File),
            "remote" => Some(SinkKind::Remote),
            "both" => Some(SinkKind::Both),
            _ => None,
        }
    }

    /// Read `--sink <kind>` from the process arguments (default: stdout)
    pub fn parse_from_args() -> Result<Self, ConfigError> {
        Self::from_args(env::args())
    }

    pub fn from_args<I>(args: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = String>,
    {
        let args: Vec<String> = args.into_iter().collect();

        if let Some(idx) = args.iter().position(|x| x == "--sink") {
            return match args.get(idx + 1) {
                Some(value) => Self::parse(value).ok_or_else(|| {
                    ConfigError::InvalidValue(format!(
                        "--sink must be one of stdout, file, remote, both (got '{}')",
                        value
                    ))
                }),
                None => Err(ConfigError::InvalidValue(
                    "--sink requires a value".to_string(),
                )),
            };
        }

        Ok(SinkKind::Stdout)
    }
}

#[derive(Debug)]
pub enum ConfigError {
    MissingVariable(String),
    InvalidValue(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::MissingVariable(var) => write!(f, "Missing environment variable: {}", var),
            ConfigError::InvalidValue(msg) => write!(f, "Invalid configuration value: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Run configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the page source (`{source_url}/data/lines`)
    pub source_url: String,
    /// Opaque access token, appended as `token=` when present
    pub token: Option<String>,
    pub page_size: u32,
    /// Number of concurrent fetch workers
    pub pool_size: usize,
    pub start_offset: u64,
    pub http_timeout: Duration,
    pub submit_url: Option<String>,
    pub output_path: Option<PathBuf>,
    /// Top-level key wrapping the emitted aggregate; `None` emits it bare
    pub result_key: Option<String>,
    pub rust_log: String,
}

impl Config {
    /// Load configuration from environment variables
    ///
    /// Environment variables:
    /// - `LEDGER_SOURCE_URL` (required)
    /// - `LEDGER_TOKEN` (optional)
    /// - `LEDGER_PAGE_SIZE` (default: 1)
    /// - `LEDGER_POOL_SIZE` (default: 50)
    /// - `LEDGER_START_OFFSET` (default: 0)
    /// - `LEDGER_HTTP_TIMEOUT_SECS` (default: 30, must be at least 1)
    /// - `LEDGER_SUBMIT_URL` (optional)
    /// - `LEDGER_OUTPUT_PATH` (optional)
    /// - `LEDGER_RESULT_KEY` (default: result, empty disables wrapping)
    /// - `RUST_LOG` (default: info)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let source_url = lookup("LEDGER_SOURCE_URL")
            .ok_or_else(|| ConfigError::MissingVariable("LEDGER_SOURCE_URL".to_string()))?;
        check_http_url("LEDGER_SOURCE_URL", &source_url)?;

        let token = lookup("LEDGER_TOKEN").filter(|t| !t.trim().is_empty());

        let page_size = parse_or(&lookup, "LEDGER_PAGE_SIZE", DEFAULT_PAGE_SIZE)?;
        if page_size == 0 {
            return Err(ConfigError::InvalidValue(
                "LEDGER_PAGE_SIZE must be at least 1".to_string(),
            ));
        }

        let pool_size = parse_or(&lookup, "LEDGER_POOL_SIZE", DEFAULT_POOL_SIZE)?;
        if pool_size == 0 {
            return Err(ConfigError::InvalidValue(
                "LEDGER_POOL_SIZE must be at least 1".to_string(),
            ));
        }

        let start_offset = parse_or(&lookup, "LEDGER_START_OFFSET", 0u64)?;

        let timeout_secs = parse_or(&lookup, "LEDGER_HTTP_TIMEOUT_SECS", DEFAULT_HTTP_TIMEOUT_SECS)?;
        // A zero timeout fails every request immediately
        if timeout_secs == 0 {
            return Err(ConfigError::InvalidValue(
                "LEDGER_HTTP_TIMEOUT_SECS must be at least 1".to_string(),
            ));
        }

        let submit_url = lookup("LEDGER_SUBMIT_URL").filter(|u| !u.trim().is_empty());
        if let Some(url) = &submit_url {
            check_http_url("LEDGER_SUBMIT_URL", url)?;
        }

        let output_path = lookup("LEDGER_OUTPUT_PATH")
            .filter(|p| !p.trim().is_empty())
            .map(PathBuf::from);

        // Unset means the default key; set-but-empty means no wrapping
        let result_key = match lookup("LEDGER_RESULT_KEY") {
            Some(key) if key.is_empty() => None,
            Some(key) => Some(key),
            None => Some(DEFAULT_RESULT_KEY.to_string()),
        };

        let rust_log = lookup("RUST_LOG").unwrap_or_else(|| "info".to_string());

        Ok(Self {
            source_url: source_url.trim_end_matches('/').to_string(),
            token,
            page_size,
            pool_size,
            start_offset,
            http_timeout: Duration::from_secs(timeout_secs),
            submit_url,
            output_path,
            result_key,
            rust_log,
        })
    }

    /// Check that the chosen sink has the settings it needs
    pub fn validate_sink(&self, sink: SinkKind) -> Result<(), ConfigError> {
        match sink {
            SinkKind::Stdout => Ok(()),
            SinkKind::File if self.output_path.is_none() => Err(ConfigError::MissingVariable(
                "LEDGER_OUTPUT_PATH".to_string(),
            )),
            SinkKind::File => Ok(()),
            SinkKind::Remote | SinkKind::Both if self.submit_url.is_none() => Err(
                ConfigError::MissingVariable("LEDGER_SUBMIT_URL".to_string()),
            ),
            SinkKind::Remote | SinkKind::Both => Ok(()),
        }
    }
}

fn check_http_url(name: &str, url: &str) -> Result<(), ConfigError> {
    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(ConfigError::InvalidValue(format!(
            "{} must start with http:// or https://",
            name
        )));
    }
    Ok(())
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse::<T>().map_err(|_| {
            ConfigError::InvalidValue(format!("{} is not a valid number: '{}'", key, raw))
        }),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| vars.get(key).cloned()
    }

    #[test]
    fn test_default_config() {
        let config =
            Config::from_lookup(lookup_from(&[("LEDGER_SOURCE_URL", "https://ledger.test/")]))
                .unwrap();

        assert_eq!(config.source_url, "https://ledger.test");
        assert_eq!(config.token, None);
        assert_eq!(config.page_size, 1);
        assert_eq!(config.pool_size, 50);
        assert_eq!(config.start_offset, 0);
        assert_eq!(config.http_timeout, Duration::from_secs(30));
        assert_eq!(config.result_key.as_deref(), Some("result"));
        assert_eq!(config.rust_log, "info");
        assert!(config.submit_url.is_none());
        assert!(config.output_path.is_none());
    }

    #[test]
    fn test_custom_config() {
        let config = Config::from_lookup(lookup_from(&[
            ("LEDGER_SOURCE_URL", "http://localhost:8080"),
            ("LEDGER_TOKEN", "abc-123"),
            ("LEDGER_PAGE_SIZE", "25"),
            ("LEDGER_POOL_SIZE", "4"),
            ("LEDGER_START_OFFSET", "1"),
            ("LEDGER_HTTP_TIMEOUT_SECS", "5"),
            ("LEDGER_SUBMIT_URL", "http://localhost:8080/schedule/puzzle"),
            ("LEDGER_OUTPUT_PATH", "/tmp/accounts.json"),
            ("LEDGER_RESULT_KEY", ""),
        ]))
        .unwrap();

        assert_eq!(config.token.as_deref(), Some("abc-123"));
        assert_eq!(config.page_size, 25);
        assert_eq!(config.pool_size, 4);
        assert_eq!(config.start_offset, 1);
        assert_eq!(config.http_timeout, Duration::from_secs(5));
        assert_eq!(config.output_path, Some(PathBuf::from("/tmp/accounts.json")));
        assert_eq!(config.result_key, None);
    }

    #[test]
    fn test_missing_source_url() {
        let err = Config::from_lookup(lookup_from(&[])).unwrap_err();
        assert!(matches!(err, ConfigError::MissingVariable(ref v) if v == "LEDGER_SOURCE_URL"));
    }

    #[test]
    fn test_invalid_values_rejected() {
        let bad_scheme = Config::from_lookup(lookup_from(&[("LEDGER_SOURCE_URL", "ftp://x")]));
        assert!(matches!(bad_scheme, Err(ConfigError::InvalidValue(_))));

        let zero_pool = Config::from_lookup(lookup_from(&[
            ("LEDGER_SOURCE_URL", "http://x"),
            ("LEDGER_POOL_SIZE", "0"),
        ]));
        assert!(matches!(zero_pool, Err(ConfigError::InvalidValue(_))));

        let zero_timeout = Config::from_lookup(lookup_from(&[
            ("LEDGER_SOURCE_URL", "http://x"),
            ("LEDGER_HTTP_TIMEOUT_SECS", "0"),
        ]));
        match zero_timeout {
            Err(ConfigError::InvalidValue(msg)) => assert!(msg.contains("LEDGER_HTTP_TIMEOUT_SECS")),
            other => panic!("expected invalid timeout, got {:?}", other.map(|c| c.http_timeout)),
        }

        let garbage = Config::from_lookup(lookup_from(&[
            ("LEDGER_SOURCE_URL", "http://x"),
            ("LEDGER_PAGE_SIZE", "ten"),
        ]));
        assert!(matches!(garbage, Err(ConfigError::InvalidValue(_))));
    }

    #[test]
    fn test_sink_from_args() {
        let args = |v: &[&str]| v.iter().map(|s| s.to_string()).collect::<Vec<_>>();

        assert_eq!(SinkKind::from_args(args(&["ledgerflow"])).unwrap(), SinkKind::Stdout);
        assert_eq!(
            SinkKind::from_args(args(&["ledgerflow", "--sink", "remote"])).unwrap(),
            SinkKind::Remote
        );
        assert_eq!(
            SinkKind::from_args(args(&["ledgerflow", "--sink", "BOTH"])).unwrap(),
            SinkKind::Both
        );
        assert!(SinkKind::from_args(args(&["ledgerflow", "--sink"])).is_err());
        assert!(SinkKind::from_args(args(&["ledgerflow", "--sink", "sqlite"])).is_err());
    }

    #[test]
    fn test_validate_sink_requirements() {
        let config = Config::from_lookup(lookup_from(&[("LEDGER_SOURCE_URL", "http://x")])).unwrap();

        assert!(config.validate_sink(SinkKind::Stdout).is_ok());
        assert!(config.validate_sink(SinkKind::File).is_err());
        assert!(config.validate_sink(SinkKind::Remote).is_err());
        assert!(config.validate_sink(SinkKind::Both).is_err());
    }
}
