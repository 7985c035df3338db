use log::{debug, warn};
use std::env;
use std::fmt::Display;
use std::path::PathBuf;
use std::str::FromStr;

/// Environment variable selecting the [`Policy`].
pub const POLICY_VAR: &str = "TINYSH_POLICY";

/// How forgiving the shell is with malformed quoting and missing `cat` files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Policy {
    /// Close dangling quotes, drop a trailing backslash, skip missing files.
    #[default]
    Lenient,
    /// Report every one of those as an error.
    Strict,
}

impl Policy {
    /// Swallows `err` when lenient, hands it back when strict.
    pub fn tolerate<E: Display>(self, err: E) -> Result<(), E> {
        match self {
            Policy::Lenient => {
                debug!("tolerated: {}", err);
                Ok(())
            }
            Policy::Strict => Err(err),
        }
    }
}

impl FromStr for Policy {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "lenient" => Ok(Policy::Lenient),
            "strict" => Ok(Policy::Strict),
            _ => Err(()),
        }
    }
}

/// Startup settings, read once and never changed afterwards.
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Colon-delimited directory list used to find external commands.
    pub search_path: String,
    /// Target of `~` for `cd`.
    pub home: Option<PathBuf>,
    pub policy: Policy,
}

impl Config {
    /// Reads `PATH`, `HOME` and [`POLICY_VAR`] from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds a config from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Config::default();
        if let Some(path) = lookup("PATH") {
            config.search_path = path;
        }
        config.home = lookup("HOME")
            .filter(|home| !home.is_empty())
            .map(PathBuf::from);
        if let Some(policy) = lookup(POLICY_VAR) {
            config.set_policy(&policy);
        }
        config
    }

    /// Applies leading `KEY=value` arguments on top of the environment.
    ///
    /// Recognised keys are `PATH`, `HOME` and `POLICY`. Stops at the first
    /// argument without a `=` and returns how many arguments were consumed.
    pub fn apply_overrides<I, S>(&mut self, args: I) -> usize
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut applied = 0;
        for arg in args {
            let Some((key, value)) = arg.as_ref().split_once('=') else {
                break;
            };
            match key {
                "PATH" => self.search_path = value.to_string(),
                "HOME" => self.home = Some(PathBuf::from(value)),
                "POLICY" => self.set_policy(value),
                other => warn!("ignoring unknown override {}", other),
            }
            applied += 1;
        }
        applied
    }

    fn set_policy(&mut self, value: &str) {
        match value.parse() {
            Ok(policy) => self.policy = policy,
            Err(()) => warn!("unknown policy {:?}, keeping {:?}", value, self.policy),
        }
    }
}
