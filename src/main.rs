use anyhow::{Context, Result};
use log::debug;
use std::{
    env,
    io::{self, BufRead, Write},
    process,
};
use termion::event::Key;
use termion::input::TermRead;
use termion::raw::IntoRawMode;
use tinysh::{Config, Session, Shell, ShellStatus};

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let mut config = Config::from_env();
    let overrides = config.apply_overrides(env::args().skip(1));
    debug!("{} startup overrides, config {:?}", overrides, config);

    let session = Session::from_process(config.home.clone())
        .context("cannot determine the current directory")?;
    let mut shell = Shell::new(config, session);
    let interactive = unsafe { libc::isatty(libc::STDIN_FILENO) } == 1;

    let code = loop {
        print!("$ ");
        io::stdout().flush()?;

        let line = if interactive {
            read_line_raw(&shell)?
        } else {
            read_line_piped(&mut io::stdin().lock())?
        };
        let Some(line) = line else {
            break 0;
        };

        match shell.run_line(&line, io::stdout().lock(), io::stderr().lock()) {
            ShellStatus::Exit(code) => break code,
            ShellStatus::Continue => continue,
        }
    };

    process::exit(code)
}

/// Reads one line from a terminal in raw mode, handling Tab completion.
///
/// Returns `None` on Ctrl-D with an empty line or when input ends.
fn read_line_raw(shell: &Shell) -> Result<Option<String>> {
    // Enter raw mode to handle input character by character
    let mut stdout = io::stdout()
        .into_raw_mode()
        .context("cannot switch the terminal to raw mode")?;
    let stdin = io::stdin();
    let mut buffer = String::new();

    for c in stdin.keys() {
        match c.context("cannot read from the terminal")? {
            Key::Ctrl('c') => {
                buffer.clear();
                write!(stdout, "\r\n")?;
                return Ok(Some(buffer));
            }
            Key::Ctrl('d') => {
                if buffer.is_empty() {
                    write!(stdout, "\r\n")?;
                    return Ok(None);
                }
            }
            Key::Char('\n') | Key::Char('\r') => {
                write!(stdout, "\r\n")?;
                return Ok(Some(buffer));
            }
            Key::Char('\t') => {
                // Only the command name is completed
                let candidates = if buffer.contains(char::is_whitespace) {
                    Vec::new()
                } else {
                    shell.complete(&buffer)
                };

                if let [only] = candidates.as_slice() {
                    let remainder = &only[buffer.len()..];
                    write!(stdout, "{} ", remainder)?;
                    buffer.push_str(remainder);
                    buffer.push(' ');
                } else {
                    // None or several: beep
                    write!(stdout, "\x07")?;
                }
                stdout.flush()?;
            }
            Key::Backspace => {
                if buffer.pop().is_some() {
                    // Move cursor back, erase char with space, move back again
                    write!(stdout, "\x08 \x08")?;
                    stdout.flush()?;
                }
            }
            Key::Char(c) => {
                buffer.push(c);
                write!(stdout, "{}", c)?;
                stdout.flush()?;
            }
            _ => {}
        }
    }

    Ok(if buffer.is_empty() { None } else { Some(buffer) })
}

/// Reads one line from non-terminal input. `None` at end of input.
fn read_line_piped<R: BufRead>(input: &mut R) -> Result<Option<String>> {
    let mut line = String::new();
    // TermRead also provides read_line for any Read
    if BufRead::read_line(input, &mut line)? == 0 {
        return Ok(None);
    }
    let trimmed = line.trim_end_matches(['\n', '\r']).len();
    line.truncate(trimmed);
    Ok(Some(line))
}
