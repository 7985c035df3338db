use bytes::Bytes;
use log::debug;
use std::io;
use std::path::Path;
use std::process::{Command, Stdio};

/// What the shell keeps from a finished child process.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CapturedOutput {
    pub stdout: Bytes,
    /// Exit code, `None` when the child was killed by a signal.
    pub status: Option<i32>,
}

/// Runs an external program to completion and captures its standard output.
pub trait ProcessRunner {
    /// `argv0` is the name the user typed; `program` is where it was found.
    fn run(
        &self,
        program: &Path,
        argv0: &str,
        args: &[String],
        cwd: &Path,
    ) -> io::Result<CapturedOutput>;
}

/// Spawns real processes, blocking until they exit. Standard error is passed
/// through to the terminal.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

impl ProcessRunner for SystemRunner {
    fn run(
        &self,
        program: &Path,
        argv0: &str,
        args: &[String],
        cwd: &Path,
    ) -> io::Result<CapturedOutput> {
        let mut command = Command::new(program);
        command
            .args(args)
            .current_dir(cwd)
            .stdin(Stdio::inherit())
            .stderr(Stdio::inherit());

        #[cfg(unix)]
        {
            use std::os::unix::process::CommandExt;
            command.arg0(argv0);
        }
        #[cfg(not(unix))]
        let _ = argv0;

        let output = command.output()?;
        debug!("{} exited with {}", program.display(), output.status);
        Ok(CapturedOutput {
            stdout: Bytes::from(output.stdout),
            status: output.status.code(),
        })
    }
}
