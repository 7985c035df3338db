use log::{debug, warn};
use std::ffi::OsStr;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

#[cfg(unix)]
use std::os::unix::fs::PermissionsExt;

/// Ordered list of directories consulted for external commands.
///
/// Built once at startup; every directory in it existed when it was built.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchPath {
    dirs: Vec<PathBuf>,
}

impl SearchPath {
    /// Splits a colon-delimited list and makes sure each directory exists,
    /// creating the missing ones.
    ///
    /// Empty entries are ignored. An entry that can't be created is left out
    /// so the list only ever holds real directories.
    pub fn init(raw: &str) -> Self {
        let mut dirs = Vec::new();
        for entry in raw.split(':').filter(|entry| !entry.is_empty()) {
            let dir = PathBuf::from(entry);
            if !dir.is_dir() {
                if let Err(e) = fs::create_dir_all(&dir) {
                    warn!("skipping search path entry {}: {}", dir.display(), e);
                    continue;
                }
                debug!("created search path entry {}", dir.display());
            }
            dirs.push(dir);
        }
        Self { dirs }
    }

    /// Takes the directories as given, without touching the filesystem.
    pub fn from_dirs<I, P>(dirs: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self {
            dirs: dirs.into_iter().map(Into::into).collect(),
        }
    }

    pub fn dirs(&self) -> &[PathBuf] {
        &self.dirs
    }
}

/// Where directory listings and file checks come from.
pub trait DirSource {
    /// Entries of `dir`, in whatever order the listing yields them.
    fn entries(&self, dir: &Path) -> io::Result<Box<dyn Iterator<Item = PathBuf> + '_>>;

    /// Whether `path` still exists right now.
    fn exists(&self, path: &Path) -> bool;

    /// Whether `path` is a regular file the shell may run.
    fn is_executable(&self, path: &Path) -> bool;
}

/// The real filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsSource;

impl DirSource for FsSource {
    fn entries(&self, dir: &Path) -> io::Result<Box<dyn Iterator<Item = PathBuf> + '_>> {
        let entries = fs::read_dir(dir)?
            .filter_map(Result::ok)
            .map(|entry| entry.path());
        Ok(Box::new(entries))
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    #[cfg(unix)]
    fn is_executable(&self, path: &Path) -> bool {
        path.metadata()
            .is_ok_and(|metadata| metadata.is_file() && metadata.permissions().mode() & 0o111 != 0)
    }

    #[cfg(not(unix))]
    fn is_executable(&self, path: &Path) -> bool {
        path.is_file()
    }
}

/// Finds files by name across a [`SearchPath`].
///
/// Directories are scanned in order and entries within a directory in listing
/// order; the first match wins.
pub struct Resolver {
    search_path: SearchPath,
    source: Box<dyn DirSource>,
}

impl Resolver {
    pub fn new(search_path: SearchPath) -> Self {
        Self::with_source(search_path, Box::new(FsSource))
    }

    pub fn with_source(search_path: SearchPath, source: Box<dyn DirSource>) -> Self {
        Self {
            search_path,
            source,
        }
    }

    pub fn search_path(&self) -> &SearchPath {
        &self.search_path
    }

    /// First entry named `name` (surrounding whitespace ignored) that still
    /// exists. This is what `type` reports.
    pub fn resolve(&self, name: &str) -> Option<PathBuf> {
        let name = name.trim();
        self.resolve_with(|path| has_file_name(path, name) && self.source.exists(path))
    }

    /// Like [`Resolver::resolve`], but only accepts files that can be run.
    pub fn resolve_executable(&self, name: &str) -> Option<PathBuf> {
        let name = name.trim();
        self.resolve_with(|path| {
            has_file_name(path, name) && self.source.exists(path) && self.source.is_executable(path)
        })
    }

    /// First entry across the whole ordered scan accepted by `predicate`.
    pub fn resolve_with<F>(&self, predicate: F) -> Option<PathBuf>
    where
        F: Fn(&Path) -> bool,
    {
        let found = self
            .search_path
            .dirs()
            .iter()
            .flat_map(|dir| self.entries_of(dir))
            .find(|path| predicate(path));
        debug!("resolved to {:?}", found);
        found
    }

    /// Sorted, de-duplicated names of runnable files starting with `prefix`.
    pub fn executables_with_prefix(&self, prefix: &str) -> Vec<String> {
        let mut names: Vec<String> = self
            .search_path
            .dirs()
            .iter()
            .flat_map(|dir| self.entries_of(dir))
            .filter(|path| self.source.is_executable(path))
            .filter_map(|path| path.file_name()?.to_str().map(str::to_string))
            .filter(|name| name.starts_with(prefix))
            .collect();
        names.sort();
        names.dedup();
        names
    }

    fn entries_of(&self, dir: &Path) -> Box<dyn Iterator<Item = PathBuf> + '_> {
        match self.source.entries(dir) {
            Ok(entries) => entries,
            Err(e) => {
                debug!("cannot list {}: {}", dir.display(), e);
                Box::new(std::iter::empty())
            }
        }
    }
}

fn has_file_name(path: &Path, name: &str) -> bool {
    path.file_name() == Some(OsStr::new(name))
}
