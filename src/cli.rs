//! Command-line interface for the `shared-state` diagnostic tool.
//!
//! Uses lexopt for minimal binary size overhead.

use std::ffi::OsString;
use std::path::PathBuf;

/// What to do with the addressed record.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Print the record, seeding it if absent.
    Get,
    /// Seed the record if absent and print it.
    Init,
    /// Set one field and print the updated record.
    Set {
        /// Field name.
        key: String,
        /// New value.
        value: serde_json::Value,
    },
}

/// A fully addressed request.
#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    /// What to do.
    pub action: Action,
    /// Store namespace.
    pub namespace: String,
    /// Record id.
    pub id: String,
}

/// Command-line arguments.
#[derive(Debug, Clone, Default)]
pub struct Args {
    /// Request to run, if any positional arguments were given.
    pub request: Option<Request>,
    /// Path to configuration file.
    pub config: Option<PathBuf>,
    /// Redis URL (overrides config file and environment).
    pub redis_url: Option<String>,
    /// Initial-state template as JSON text.
    pub template: Option<String>,
    /// Log level (error, warn, info, debug, trace).
    pub log_level: Option<String>,
    /// Report backend timings.
    pub perf_log: bool,
    /// Show version and exit.
    pub version: bool,
    /// Show help and exit.
    pub help: bool,
}

/// Parse command-line arguments.
pub fn parse_args() -> Result<Args, ArgsError> {
    parse_args_from(std::env::args_os())
}

/// Parse arguments from an iterator (for testing).
///
/// The first item is the program name.
pub fn parse_args_from<I>(args: I) -> Result<Args, ArgsError>
where
    I: IntoIterator<Item = OsString>,
{
    use lexopt::prelude::*;

    let mut result = Args::default();
    let mut positional = Vec::new();
    let mut parser = lexopt::Parser::from_iter(args);

    while let Some(arg) = parser.next()? {
        match arg {
            Short('h') | Long("help") => {
                result.help = true;
            }
            Short('V') | Long("version") => {
                result.version = true;
            }
            Short('c') | Long("config") => {
                result.config = Some(parser.value()?.parse()?);
            }
            Short('r') | Long("redis-url") => {
                result.redis_url = Some(parser.value()?.parse()?);
            }
            Short('t') | Long("template") => {
                result.template = Some(parser.value()?.parse()?);
            }
            Short('l') | Long("log-level") => {
                result.log_level = Some(parser.value()?.parse()?);
            }
            Long("perf-log") => {
                result.perf_log = true;
            }
            Value(val) => {
                positional.push(val.string()?);
            }
            _ => return Err(arg.unexpected().into()),
        }
    }

    if !positional.is_empty() {
        result.request = Some(parse_request(positional)?);
    }

    Ok(result)
}

fn parse_request(positional: Vec<String>) -> Result<Request, ArgsError> {
    let mut words = positional.into_iter();
    let command = words.next().unwrap_or_default();
    let namespace = words.next().ok_or(ArgsError::MissingArgument("NAMESPACE"))?;
    let id = words.next().ok_or(ArgsError::MissingArgument("ID"))?;

    let action = match command.as_str() {
        "get" => Action::Get,
        "init" => Action::Init,
        "set" => {
            let key = words.next().ok_or(ArgsError::MissingArgument("KEY"))?;
            let value = words.next().ok_or(ArgsError::MissingArgument("VALUE"))?;
            Action::Set {
                key,
                value: parse_value(&value),
            }
        }
        _ => return Err(ArgsError::UnknownCommand(command)),
    };

    if let Some(extra) = words.next() {
        return Err(ArgsError::UnexpectedArgument(extra));
    }

    Ok(Request {
        action,
        namespace,
        id,
    })
}

/// Interpret a value as JSON, falling back to a plain string.
pub fn parse_value(text: &str) -> serde_json::Value {
    serde_json::from_str(text).unwrap_or_else(|_| serde_json::Value::String(text.to_string()))
}

/// Print help message.
pub fn print_help() {
    let version = env!("CARGO_PKG_VERSION");
    println!(
        r#"shared-state {version}
Inspect and update keyed shared state

USAGE:
    shared-state [OPTIONS] get  <NAMESPACE> <ID>
    shared-state [OPTIONS] init <NAMESPACE> <ID>
    shared-state [OPTIONS] set  <NAMESPACE> <ID> <KEY> <VALUE>

VALUE is parsed as JSON; anything that is not valid JSON is stored as a string.

OPTIONS:
    -c, --config <FILE>     Path to configuration file (JSON)
    -r, --redis-url <URL>   Redis connection target (omit for a local store)
    -t, --template <JSON>   Initial state for new ids [default: {{}}]
    -l, --log-level <LVL>   Log level (error, warn, info, debug, trace)
        --perf-log          Log read/write durations and payload sizes
    -h, --help              Print help
    -V, --version           Print version

ENVIRONMENT VARIABLES:
    REDIS_URL               Redis connection target (overrides config)
    PERF_LOG                Any non-empty value enables perf logging
    SHARED_STATE_LOG_LEVEL  Log level (overrides config)
    RUST_LOG                Alternative log level setting

EXAMPLES:
    # Read channel 1, seeding it with a default index
    shared-state -r redis://127.0.0.1:6379 -t '{{"current":0}}' get chan 1

    # Move channel 1 to asset index 5
    shared-state -r redis://127.0.0.1:6379 set chan 1 current 5
"#
    );
}

/// Print version.
pub fn print_version() {
    println!("shared-state {}", env!("CARGO_PKG_VERSION"));
}

/// Argument parsing errors.
#[derive(Debug)]
pub enum ArgsError {
    /// Lexopt parsing error.
    Lexopt(lexopt::Error),
    /// Required positional argument missing.
    MissingArgument(&'static str),
    /// First positional argument is not a known command.
    UnknownCommand(String),
    /// Unexpected positional argument.
    UnexpectedArgument(String),
}

impl std::fmt::Display for ArgsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Lexopt(e) => write!(f, "{}", e),
            Self::MissingArgument(name) => write!(f, "missing argument: <{}>", name),
            Self::UnknownCommand(cmd) => {
                write!(f, "unknown command: '{}' (expected get, init or set)", cmd)
            }
            Self::UnexpectedArgument(arg) => {
                write!(f, "unexpected argument: '{}'", arg)
            }
        }
    }
}

impl std::error::Error for ArgsError {}

impl From<lexopt::Error> for ArgsError {
    fn from(e: lexopt::Error) -> Self {
        Self::Lexopt(e)
    }
}
