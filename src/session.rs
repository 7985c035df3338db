use std::env;
use std::io;
use std::path::{Path, PathBuf};

/// Per-shell mutable state: the working directory `cd` moves and `pwd`,
/// `cat` and external commands see.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    current_dir: PathBuf,
    home: Option<PathBuf>,
}

impl Session {
    pub fn new(current_dir: impl Into<PathBuf>, home: Option<PathBuf>) -> Self {
        Self {
            current_dir: current_dir.into(),
            home,
        }
    }

    /// Starts in the directory the process was launched from.
    pub fn from_process(home: Option<PathBuf>) -> io::Result<Self> {
        Ok(Self::new(env::current_dir()?, home))
    }

    pub fn current_dir(&self) -> &Path {
        &self.current_dir
    }

    pub fn home(&self) -> Option<&Path> {
        self.home.as_deref()
    }

    /// Expands a leading `~` or `~/` to the home directory. Anything else,
    /// or any target when home is unknown, is returned unchanged.
    pub fn expand_home(&self, target: &str) -> PathBuf {
        match (self.home(), target) {
            (Some(home), "~") => home.to_path_buf(),
            (Some(home), _) if target.starts_with("~/") => home.join(&target[2..]),
            _ => PathBuf::from(target),
        }
    }

    /// Resolves `path` against the working directory.
    pub fn resolve(&self, path: impl AsRef<Path>) -> PathBuf {
        self.current_dir.join(path)
    }

    /// Moves to `target`, which must name an existing directory. The stored
    /// path is canonical. On error the working directory is left as it was.
    pub fn change_dir(&mut self, target: impl AsRef<Path>) -> io::Result<()> {
        let resolved = self.resolve(target).canonicalize()?;
        if !resolved.is_dir() {
            return Err(io::Error::from(io::ErrorKind::NotADirectory));
        }
        self.current_dir = resolved;
        Ok(())
    }
}
