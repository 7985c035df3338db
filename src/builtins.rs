use crate::ShellStatus;
use crate::config::Policy;
use crate::resolver::Resolver;
use crate::session::Session;
use log::debug;
use std::fs;
use std::io::{self, Write};
use std::str::FromStr;

/// Enumeration of all supported builtin commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Builtin {
    Echo,
    Exit,
    Type,
    Pwd,
    Cd,
    Cat,
}

impl FromStr for Builtin {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "echo" => Ok(Builtin::Echo),
            "exit" => Ok(Builtin::Exit),
            "type" => Ok(Builtin::Type),
            "pwd" => Ok(Builtin::Pwd),
            "cd" => Ok(Builtin::Cd),
            "cat" => Ok(Builtin::Cat),
            _ => Err(()),
        }
    }
}

/// Shell state a builtin may read or change.
pub struct Context<'a> {
    pub session: &'a mut Session,
    pub resolver: &'a Resolver,
    pub policy: Policy,
}

impl Builtin {
    pub const ALL: [Builtin; 6] = [
        Builtin::Echo,
        Builtin::Exit,
        Builtin::Type,
        Builtin::Pwd,
        Builtin::Cd,
        Builtin::Cat,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Builtin::Echo => "echo",
            Builtin::Exit => "exit",
            Builtin::Type => "type",
            Builtin::Pwd => "pwd",
            Builtin::Cd => "cd",
            Builtin::Cat => "cat",
        }
    }

    /// Executes the builtin command.
    ///
    /// Returns a `ShellStatus` indicating whether the shell should continue
    /// or exit with a specific code. Failures are reported on the writers,
    /// never returned.
    pub fn execute<W: Write, E: Write>(
        &self,
        args: &[String],
        ctx: &mut Context<'_>,
        mut stdout: W,
        mut stderr: E,
    ) -> ShellStatus {
        match self {
            Builtin::Exit => {
                let code = args
                    .first()
                    .and_then(|s| s.parse::<i32>().ok())
                    .unwrap_or(0);
                ShellStatus::Exit(code)
            }
            Builtin::Echo => {
                echo_cmd(args, &mut stdout);
                ShellStatus::Continue
            }
            Builtin::Type => {
                type_cmd(args, ctx.resolver, &mut stdout);
                ShellStatus::Continue
            }
            Builtin::Pwd => {
                let _ = writeln!(stdout, "{}", ctx.session.current_dir().display());
                ShellStatus::Continue
            }
            Builtin::Cd => {
                cd_cmd(args, ctx.session, &mut stdout);
                ShellStatus::Continue
            }
            Builtin::Cat => {
                cat_cmd(args, ctx.session, ctx.policy, &mut stdout, &mut stderr);
                ShellStatus::Continue
            }
        }
    }
}

/// Implementation of the `echo` command.
///
/// Prints the arguments to stdout, separated by spaces.
pub fn echo_cmd<W: Write>(args: &[String], writer: &mut W) {
    let _ = writeln!(writer, "{}", args.join(" "));
}

/// Implementation of the `type` command.
///
/// Identifies whether each name is a builtin or a file on the search path.
pub fn type_cmd<W: Write>(args: &[String], resolver: &Resolver, stdout: &mut W) {
    for command in args {
        // 1. Check if it's a builtin
        if Builtin::from_str(command).is_ok() {
            let _ = writeln!(stdout, "{} is a shell builtin", command);
            continue;
        }

        // 2. Search path lookup
        match resolver.resolve(command) {
            Some(path) => {
                let _ = writeln!(stdout, "{} is {}", command, path.display());
            }
            None => {
                let _ = writeln!(stdout, "{}: not found", command);
            }
        }
    }
}

/// Implementation of the `cd` command. No argument means `~`.
pub fn cd_cmd<W: Write>(args: &[String], session: &mut Session, stdout: &mut W) {
    let target = args.first().map(String::as_str).unwrap_or("~");
    let path = session.expand_home(target);

    if let Err(e) = session.change_dir(&path) {
        debug!("cd {} failed: {}", path.display(), e);
        let reason = match e.kind() {
            io::ErrorKind::NotADirectory => "Not a directory",
            _ => "No such file or directory",
        };
        let _ = writeln!(stdout, "cd: {}: {}", target, reason);
    }
}

/// Implementation of the `cat` command.
///
/// Writes each file, relative to the working directory, back to back. Names
/// that aren't regular files are skipped, or reported under
/// [`Policy::Strict`].
pub fn cat_cmd<W: Write, E: Write>(
    args: &[String],
    session: &Session,
    policy: Policy,
    stdout: &mut W,
    stderr: &mut E,
) {
    for name in args {
        let path = session.resolve(name);
        if !path.is_file() {
            let missing = format!("cat: {}: No such file or directory", name);
            if let Err(msg) = policy.tolerate(missing) {
                let _ = writeln!(stderr, "{}", msg);
            }
            continue;
        }

        match fs::read(&path) {
            Ok(contents) => {
                let _ = stdout.write_all(&contents);
            }
            Err(e) => {
                let _ = writeln!(stderr, "cat: {}: {}", name, e);
            }
        }
    }
}
