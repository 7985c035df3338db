use log::debug;
use std::io::Write;

pub mod builtins;
pub mod config;
pub mod error;
pub mod parser;
pub mod process;
pub mod resolver;
pub mod session;

pub use builtins::Builtin;
pub use config::{Config, Policy};
pub use error::ShellError;
pub use parser::{Command, ParsedCommand, parse, tokenize};
pub use process::{CapturedOutput, ProcessRunner, SystemRunner};
pub use resolver::{Resolver, SearchPath};
pub use session::Session;

use builtins::Context;

/// Result of a command execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShellStatus {
    /// The shell should continue running.
    Continue,
    /// The shell should exit with the provided code.
    Exit(i32),
}

/// Turns input lines into builtin calls or external processes.
pub struct Shell {
    config: Config,
    resolver: Resolver,
    session: Session,
    runner: Box<dyn ProcessRunner>,
}

impl Shell {
    /// Builds the search path from `config` (creating missing directories)
    /// and runs external commands as real processes.
    pub fn new(config: Config, session: Session) -> Self {
        let resolver = Resolver::new(SearchPath::init(&config.search_path));
        Self::with_parts(config, resolver, session, Box::new(SystemRunner))
    }

    pub fn with_parts(
        config: Config,
        resolver: Resolver,
        session: Session,
        runner: Box<dyn ProcessRunner>,
    ) -> Self {
        Self {
            config,
            resolver,
            session,
            runner,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn resolver(&self) -> &Resolver {
        &self.resolver
    }

    /// Builtin and search path command names starting with `prefix`, sorted.
    pub fn complete(&self, prefix: &str) -> Vec<String> {
        let mut names: Vec<String> = Builtin::ALL
            .iter()
            .map(|builtin| builtin.name())
            .filter(|name| name.starts_with(prefix))
            .map(str::to_string)
            .collect();
        names.extend(self.resolver.executables_with_prefix(prefix));
        names.sort();
        names.dedup();
        names
    }

    /// Orchestrates one input line.
    ///
    /// Builtins are matched first; any other name is looked up on the search
    /// path and run with its standard output copied to `stdout`. Every error
    /// ends up as text on `stdout` or `stderr`; only `exit` stops the shell.
    pub fn run_line<W: Write, E: Write>(
        &mut self,
        line: &str,
        mut stdout: W,
        mut stderr: E,
    ) -> ShellStatus {
        match self.dispatch(line, &mut stdout, &mut stderr) {
            Ok(status) => status,
            Err(e) => {
                let _ = writeln!(stderr, "{}", e);
                ShellStatus::Continue
            }
        }
    }

    fn dispatch<W: Write, E: Write>(
        &mut self,
        line: &str,
        stdout: &mut W,
        stderr: &mut E,
    ) -> Result<ShellStatus, ShellError> {
        let parsed = parse(line, self.config.policy)?;
        debug!("dispatching {:?}", parsed);

        match &parsed.command {
            Command::Empty => Ok(ShellStatus::Continue),
            Command::Builtin(builtin) => {
                let mut ctx = Context {
                    session: &mut self.session,
                    resolver: &self.resolver,
                    policy: self.config.policy,
                };
                Ok(builtin.execute(&parsed.args, &mut ctx, stdout, stderr))
            }
            Command::External(name) => {
                match self.run_external(name, &parsed.args)? {
                    Some(output) => {
                        let _ = stdout.write_all(&output.stdout);
                    }
                    None => {
                        let _ = writeln!(stdout, "{}: command not found", name);
                    }
                }
                Ok(ShellStatus::Continue)
            }
        }
    }

    /// `Ok(None)` when nothing runnable named `name` is on the search path.
    fn run_external(
        &self,
        name: &str,
        args: &[String],
    ) -> Result<Option<CapturedOutput>, ShellError> {
        let Some(program) = self.resolver.resolve_executable(name) else {
            return Ok(None);
        };

        let output = self
            .runner
            .run(&program, name, args, self.session.current_dir())
            .map_err(|source| ShellError::Spawn {
                name: name.to_string(),
                source,
            })?;
        Ok(Some(output))
    }
}
