use crate::builtins::Builtin;
use crate::config::Policy;
use log::trace;
use thiserror::Error;

/// Malformed input the tokenizer refuses under [`Policy::Strict`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("unexpected end of input: missing closing {0}")]
    UnterminatedQuote(char),
    #[error("unexpected end of input after \\")]
    DanglingEscape,
}

/// What the first word of a line refers to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Blank line; the dispatcher does nothing.
    Empty,
    Builtin(Builtin),
    /// Anything else, looked up on the search path at dispatch time.
    External(String),
}

/// A classified command name and its arguments, built once per input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedCommand {
    pub command: Command,
    pub args: Vec<String>,
}

impl ParsedCommand {
    /// The command name as typed (empty for a blank line).
    pub fn name(&self) -> &str {
        match &self.command {
            Command::Empty => "",
            Command::Builtin(builtin) => builtin.name(),
            Command::External(name) => name,
        }
    }
}

/// Splits an input string into a vector of arguments.
///
/// This tokenizer handles:
/// - Single quotes (`'...'`): Preserves literal contents.
/// - Double quotes (`"..."`): Preserves contents; `\\`, `\$` and `\"` are escapes,
///   any other backslash is kept.
/// - Unquoted text: Split by whitespace, a backslash escapes the next character.
///
/// Quoted and unquoted fragments with no whitespace between them join into one
/// argument. An argument that ends up empty (`''`, `""`) is dropped unless it
/// is the only one on the line. Malformed input is repaired as described for
/// [`Policy::Lenient`].
///
/// # Example
/// ```
/// let args = tinysh::tokenize("echo 'hello world'");
/// assert_eq!(args, vec!["echo", "hello world"]);
/// ```
pub fn tokenize(input: &str) -> Vec<String> {
    tokenize_with(input, Policy::Lenient).unwrap_or_default()
}

/// Same as [`tokenize`], but lets the caller choose what happens on an
/// unterminated quote or a trailing backslash.
///
/// Under [`Policy::Lenient`] an open quote is closed at end of input and a
/// trailing bare backslash is dropped. Under [`Policy::Strict`] both are errors.
pub fn tokenize_with(input: &str, policy: Policy) -> Result<Vec<String>, ParseError> {
    let mut args = Vec::new();
    let mut saw_empty = false;
    let mut chars = input.chars().peekable();

    while let Some(&c) = chars.peek() {
        if c.is_whitespace() {
            chars.next();
            continue;
        }

        let mut arg = String::new();

        loop {
            match chars.peek() {
                Some('\'') => {
                    chars.next(); // Consume opening '
                    let mut closed = false;
                    for c in chars.by_ref() {
                        if c == '\'' {
                            closed = true;
                            break;
                        }
                        arg.push(c);
                    }
                    if !closed {
                        policy.tolerate(ParseError::UnterminatedQuote('\''))?;
                    }
                }
                Some('"') => {
                    chars.next(); // Consume opening "
                    let mut closed = false;
                    while let Some(c) = chars.next() {
                        match c {
                            '"' => {
                                closed = true;
                                break;
                            }
                            '\\' => match chars.peek() {
                                Some(&next) if matches!(next, '\\' | '$' | '"') => {
                                    arg.push(next);
                                    chars.next();
                                }
                                _ => arg.push('\\'),
                            },
                            c => arg.push(c),
                        }
                    }
                    if !closed {
                        policy.tolerate(ParseError::UnterminatedQuote('"'))?;
                    }
                }
                Some('\\') => {
                    chars.next(); // Consume \
                    match chars.next() {
                        Some(c) => arg.push(c),
                        None => policy.tolerate(ParseError::DanglingEscape)?,
                    }
                }
                Some(c) if c.is_whitespace() => break,
                Some(&c) => {
                    arg.push(c);
                    chars.next();
                }
                None => break,
            }
        }
        if arg.is_empty() {
            saw_empty = true;
        } else {
            args.push(arg);
        }
    }

    // A lone '' or "" still yields one (empty) token
    if args.is_empty() && saw_empty {
        args.push(String::new());
    }

    trace!("tokens: {:?}", args);
    Ok(args)
}

/// Tokenizes `line` and splits it into a classified command and its arguments.
///
/// Empty tokens never become the name or an argument, so a blank line (or a
/// line holding only `''`) parses to [`Command::Empty`].
pub fn parse(line: &str, policy: Policy) -> Result<ParsedCommand, ParseError> {
    let mut tokens = tokenize_with(line, policy)?
        .into_iter()
        .filter(|token| !token.is_empty());
    let name = tokens.next().unwrap_or_default();
    let args = tokens.collect();

    let command = if name.is_empty() {
        Command::Empty
    } else {
        match name.parse::<Builtin>() {
            Ok(builtin) => Command::Builtin(builtin),
            Err(_) => Command::External(name),
        }
    };

    Ok(ParsedCommand { command, args })
}
