//! Utilities: logging setup (tracing subscriber, level from -v/-q),
//! option validators (GUID / SharePoint URL / presence / exclusivity),
//! OData URL helpers.
//!
//! Key items:
//!   init_logging / derive_level
//!   validate::*
//!   odata::*

/// Logging helpers.
pub mod logging {
    use tracing_subscriber::EnvFilter;

    #[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd)]
    pub enum LogLevel {
        Error = 0,
        Warn = 1,
        Info = 2,
        Debug = 3,
        Trace = 4,
    }

    impl LogLevel {
        pub fn as_str(&self) -> &'static str {
            match self {
                LogLevel::Error => "error",
                LogLevel::Warn => "warn",
                LogLevel::Info => "info",
                LogLevel::Debug => "debug",
                LogLevel::Trace => "trace",
            }
        }
    }

    pub fn derive_level(verbose: u8, quiet: bool) -> LogLevel {
        if quiet {
            return LogLevel::Error;
        }
        match verbose {
            0 => LogLevel::Warn,
            1 => LogLevel::Info,
            2 => LogLevel::Debug,
            _ => LogLevel::Trace,
        }
    }

    /// Install the global subscriber. Logs go to stderr so JSON on stdout stays clean.
    /// `RUST_LOG` wins over the level derived from flags.
    pub fn init_logging(level: LogLevel) {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(format!("m365={}", level.as_str())));
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .try_init();
    }
}

pub use logging::{derive_level, init_logging};

/// Option validators. Each returns `Err(message)` on the first failing rule.
pub mod validate {
    use regex::Regex;
    use std::path::Path;
    use std::sync::LazyLock;

    static GUID_RE: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(r"(?i)^[0-9a-f]{8}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{12}$")
            .expect("static GUID pattern")
    });

    static SPO_URL_RE: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(r"(?i)^https://[^/?#]+\.sharepoint\.com([/?#]|$)").expect("static SharePoint pattern")
    });

    pub fn is_valid_guid(value: &str) -> bool {
        GUID_RE.is_match(value)
    }

    pub fn is_valid_sharepoint_url(value: &str) -> bool {
        SPO_URL_RE.is_match(value)
    }

    /// Required option present and non-blank; returns the trimmed value.
    pub fn required<'a>(name: &str, value: Option<&'a str>) -> Result<&'a str, String> {
        match value.map(str::trim) {
            Some(v) if !v.is_empty() => Ok(v),
            _ => Err(format!("Required option {name} missing")),
        }
    }

    pub fn guid(name: &str, value: &str) -> Result<(), String> {
        if is_valid_guid(value) {
            Ok(())
        } else {
            Err(format!("{value} in option {name} is not a valid GUID"))
        }
    }

    pub fn sharepoint_url(name: &str, value: &str) -> Result<(), String> {
        if is_valid_sharepoint_url(value) {
            Ok(())
        } else {
            Err(format!(
                "{value} in option {name} is not a valid SharePoint Online site URL"
            ))
        }
    }

    /// Exactly one of two options. Returns `true` when the first one was given.
    pub fn exactly_one(
        first: (&str, Option<&str>),
        second: (&str, Option<&str>),
    ) -> Result<bool, String> {
        let has = |v: Option<&str>| v.is_some_and(|s| !s.trim().is_empty());
        match (has(first.1), has(second.1)) {
            (true, false) => Ok(true),
            (false, true) => Ok(false),
            (false, false) => Err(format!("Specify {} or {}, one is required", first.0, second.0)),
            (true, true) => Err(format!("Specify {} or {} but not both", first.0, second.0)),
        }
    }

    /// Path exists and is a regular file (not a directory).
    pub fn existing_file(name: &str, value: &str) -> Result<(), String> {
        let path = Path::new(value);
        if !path.exists() {
            return Err(format!("File specified in option {name} ({value}) not found"));
        }
        if path.is_dir() {
            return Err(format!(
                "Path specified in option {name} ({value}) points to a directory"
            ));
        }
        Ok(())
    }
}

/// OData / URL helpers.
pub mod odata {
    use url::Url;

    /// Percent-encode a value for use in a path segment or query literal.
    pub fn encode(value: &str) -> String {
        urlencoding::encode(value).into_owned()
    }

    /// Quote-escape then encode a value placed inside an OData string literal.
    pub fn literal(value: &str) -> String {
        encode(&value.replace('\'', "''"))
    }

    /// `scheme://host[:port]` of a URL, used as the token resource for SharePoint sites.
    pub fn origin(raw: &str) -> Option<String> {
        let url = Url::parse(raw).ok()?;
        match url.origin() {
            url::Origin::Tuple(..) => Some(url.origin().ascii_serialization()),
            url::Origin::Opaque(_) => None,
        }
    }

    /// Strip a trailing slash so `{web}/_api/...` never doubles it.
    pub fn trim_web_url(raw: &str) -> &str {
        raw.trim_end_matches('/')
    }
}
