use clap::{ArgAction, Parser};
use std::ffi::OsString;
use tracing::debug;

use crate::{check::Probe, error::ConfigError};

const DEFAULT_PORT: i64 = 80;
const DEFAULT_SCHEMA: &str = "http";
const DEFAULT_VERB: &str = "GET";
const DEFAULT_STATUS_CODE: u16 = 200;

/// Long flag names that may also be written with a single dash (`-url=...`).
const LONG_FLAGS: [&str; 8] = [
    "url", "hostname", "port", "schema", "endpoint", "headers", "verb", "code",
];

/// Rewrites `-<long>` and `-<long>=value` to their double dash form.
///
/// Values given as a separate argument after a flag are left untouched.
fn expand_single_dash_flags<I, T>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    let mut expanded = Vec::new();
    let mut next_is_value = false;
    let mut positional_only = false;
    for arg in args.into_iter().map(Into::into) {
        if next_is_value || positional_only {
            next_is_value = false;
            expanded.push(arg);
            continue;
        }
        let Some(s) = arg.to_str() else {
            expanded.push(arg);
            continue;
        };
        if s == "--" {
            positional_only = true;
        } else if let Some(long) = s.strip_prefix("--") {
            next_is_value = LONG_FLAGS.contains(&long);
        } else if let Some(rest) = s.strip_prefix('-') {
            let name = rest.split_once('=').map_or(rest, |(name, _)| name);
            if LONG_FLAGS.contains(&name) {
                next_is_value = !rest.contains('=');
                expanded.push(format!("-{s}").into());
                continue;
            }
            // short flag with its value in the next argument
            next_is_value = rest.chars().count() == 1;
        }
        expanded.push(arg);
    }
    expanded
}

/// Splits a raw `key:value` header flag on its first colon.
///
/// The key is kept as given; header name validity is checked when the request is built.
fn parse_header(raw: &str) -> Result<(String, String), ConfigError> {
    match raw.split_once(':') {
        Some((key, value)) => Ok((key.to_string(), value.trim().to_string())),
        None => Err(ConfigError::MalformedHeader {
            raw: raw.to_string(),
        }),
    }
}

/// Hits an endpoint for you.
///
/// Sends a single HTTP request and exits 0 when the response status matches
/// the expected code, 1 otherwise.
/// For example: healthcheck -url=http://localhost/ping
#[derive(Parser, Debug, Clone, PartialEq, Eq)]
#[command(name = "healthcheck", version, disable_version_flag = true)]
pub struct RunConfig {
    /// The full url to hit (required if hostname is not set)
    #[arg(long, short = 'U', default_value = "")]
    pub url: String,

    /// The hostname for the request (required if url is not set)
    #[arg(long, short = 'N', default_value = "")]
    pub hostname: String,

    /// The port for the request
    ///
    /// Only used together with hostname.
    #[arg(long, short = 'P', default_value_t = DEFAULT_PORT, allow_negative_numbers = true)]
    pub port: i64,

    /// The schema for the request
    ///
    /// Only used together with hostname.
    #[arg(long, short = 'S', default_value = DEFAULT_SCHEMA)]
    pub schema: String,

    /// The endpoint for the request, appended to hostname and port
    #[arg(long = "endpoint", short = 'E', default_value = "")]
    pub endpoint_path: String,

    /// Specify a header and value for the request (-H=key:value)
    ///
    /// May be repeated; every occurrence is sent, in order.
    #[arg(long, short = 'H', action = ArgAction::Append)]
    pub headers: Vec<String>,

    /// The HTTP verb to use
    #[arg(long, short = 'V', default_value = DEFAULT_VERB)]
    pub verb: String,

    /// Expected response code
    #[arg(long = "code", short = 'C', default_value_t = DEFAULT_STATUS_CODE)]
    pub expected_status_code: u16,

    /// Print version
    #[arg(long, action = ArgAction::Version)]
    version: Option<bool>,
}

impl Default for RunConfig {
    fn default() -> Self {
        RunConfig {
            url: String::new(),
            hostname: String::new(),
            port: DEFAULT_PORT,
            schema: DEFAULT_SCHEMA.to_string(),
            endpoint_path: String::new(),
            headers: Vec::new(),
            verb: DEFAULT_VERB.to_string(),
            expected_status_code: DEFAULT_STATUS_CODE,
            version: None,
        }
    }
}

impl RunConfig {
    /// Parses command line arguments, accepting single dash long flags too.
    pub fn try_parse_args<I, T>(args: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString>,
    {
        Self::try_parse_from(expand_single_dash_flags(args))
    }

    /// Checks the target selection rules, first failure wins.
    pub fn validate(&self) -> Result<(), ConfigError> {
        match (self.url.is_empty(), self.hostname.is_empty()) {
            (true, true) => return Err(ConfigError::MissingTarget),
            (false, false) => return Err(ConfigError::ConflictingTarget),
            _ => {}
        }
        if !self.hostname.is_empty() && self.port <= 0 {
            return Err(ConfigError::InvalidPort { port: self.port });
        }
        Ok(())
    }

    /// The URL the request is sent to. Assumes `validate` passed.
    pub fn target_url(&self) -> String {
        if self.hostname.is_empty() {
            self.url.clone()
        } else {
            format!(
                "{}://{}:{}{}",
                self.schema, self.hostname, self.port, self.endpoint_path
            )
        }
    }

    pub fn parsed_headers(&self) -> Result<Vec<(String, String)>, ConfigError> {
        self.headers.iter().map(|raw| parse_header(raw)).collect()
    }

    /// Turns the command line input into an immutable request plan.
    pub fn plan(&self) -> Result<Probe, ConfigError> {
        self.validate()?;
        let url = self.target_url();
        let headers = self.parsed_headers()?;
        // an empty verb means GET
        let method = if self.verb.is_empty() {
            DEFAULT_VERB.to_string()
        } else {
            self.verb.clone()
        };
        debug!(%url, %method, headers = headers.len(), "Planned health check");
        Ok(Probe {
            url,
            method,
            headers,
            expected_status: self.expected_status_code,
        })
    }
}
