//! A filesystem cache for raw API response bodies.
//!
//! [`Cache`] wraps a cache directory. Entries are addressed by a [`CacheKey`], derived
//! from the request URL (with credentials stripped) and a [`PageSuffix`] that tells
//! the individual pages of a paginated query apart. Entries are laid out as
//! `<cache dir>/<owner>/<repo>/<escaped url><suffix>`.

use super::path_utils::{escape_file_name, sanitize_path_component};
use super::repo_spec::RepoSpec;
use crate::Result;
use bytes::Bytes;
use core::fmt::{Display, Formatter};
use ohno::IntoAppError;
use std::fs;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use url::Url;

const LOG_TARGET: &str = "     cache";

/// Query parameters that carry credentials and never make it into a cache key.
const CREDENTIAL_PARAMS: &[&str] = &["access_token", "token", "client_secret"];

/// Extension of an entry that is still being written.
const PARTIAL_EXTENSION: &str = ".partial";

/// Distinguishes the pages of a paginated query within a cache directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PageSuffix<'a> {
    /// A page of the stargazer listing, following the given cursor.
    Listing(Option<&'a str>),

    /// A page of contribution data following the given cursor, for one calendar year.
    Contributions(Option<&'a str>, i32),
}

/// Escaped cursors never contain `-`, so every variant parses back unambiguously.
impl Display for PageSuffix<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        match *self {
            Self::Listing(None) => write!(f, "-list-first"),
            Self::Listing(Some(c)) => write!(f, "-list-after-{}", escape_file_name(c)),
            Self::Contributions(None, year) => write!(f, "-contrib-{year}-first"),
            Self::Contributions(Some(c), year) => write!(f, "-contrib-{year}-after-{}", escape_file_name(c)),
        }
    }
}

/// Whether `name` is a file the cache writes, either complete or still partial.
fn is_entry_file_name(name: &str) -> bool {
    let name = name.strip_suffix(PARTIAL_EXTENSION).unwrap_or(name);
    !name.is_empty()
        && name.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-')
        && (name.contains("-list-") || name.contains("-contrib-"))
}

/// The identity of a cache entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    owner: String,
    repo: String,
    file_name: String,
}

impl CacheKey {
    /// Derive the key for a request against `url` on behalf of `repo_spec`.
    #[must_use]
    pub fn new(repo_spec: &RepoSpec, url: &str, suffix: PageSuffix<'_>) -> Self {
        Self {
            owner: sanitize_path_component(repo_spec.owner()),
            repo: sanitize_path_component(repo_spec.repo()),
            file_name: format!("{}{suffix}", escape_file_name(&strip_credentials(url))),
        }
    }

    /// The file name of the entry within its repository directory.
    #[must_use]
    pub fn file_name(&self) -> &str {
        &self.file_name
    }
}

impl Display for CacheKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}/{}/{}", self.owner, self.repo, self.file_name)
    }
}

/// What to wipe when clearing the cache.
#[derive(Debug, Clone, Copy)]
pub enum CacheScope<'a> {
    /// Every entry cached for one repository.
    Repository(&'a RepoSpec),

    /// Every entry of every repository.
    All,
}

/// Remove credential query parameters from a URL, wherever they appear in the query string.
#[must_use]
pub fn strip_credentials(raw: &str) -> String {
    let Ok(mut url) = Url::parse(raw) else {
        return strip_credentials_textually(raw);
    };

    if url.query().is_none() {
        return url.into();
    }

    let kept: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(name, _)| !CREDENTIAL_PARAMS.contains(&name.as_ref()))
        .map(|(name, value)| (name.into_owned(), value.into_owned()))
        .collect();

    if kept.is_empty() {
        url.set_query(None);
    } else {
        let _ = url.query_pairs_mut().clear().extend_pairs(kept);
    }

    url.into()
}

/// Fallback for strings the URL parser rejects.
fn strip_credentials_textually(raw: &str) -> String {
    let Some((base, query)) = raw.split_once('?') else {
        return raw.to_string();
    };

    let kept: Vec<&str> = query
        .split('&')
        .filter(|pair| {
            let name = pair.split_once('=').map_or(*pair, |(name, _)| name);
            !pair.is_empty() && !CREDENTIAL_PARAMS.contains(&name)
        })
        .collect();

    if kept.is_empty() {
        base.to_string()
    } else {
        format!("{base}?{}", kept.join("&"))
    }
}

/// A directory-backed store of raw response bodies.
#[derive(Debug, Clone)]
pub struct Cache {
    dir: PathBuf,
}

impl Cache {
    /// Create a new cache rooted at `cache_dir`.
    #[must_use]
    pub fn new(cache_dir: impl Into<PathBuf>) -> Self {
        Self { dir: cache_dir.into() }
    }

    /// Returns the cache directory.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Returns the path of the file backing `key`.
    #[must_use]
    pub fn path_for(&self, key: &CacheKey) -> PathBuf {
        self.dir.join(&key.owner).join(&key.repo).join(&key.file_name)
    }

    /// Read the body cached under `key`, or `None` if there is no such entry.
    pub fn get(&self, key: &CacheKey) -> Result<Option<Bytes>> {
        let path = self.path_for(key);
        match fs::read(&path) {
            Ok(body) => {
                log::debug!(target: LOG_TARGET, "Cache hit for {key}");
                Ok(Some(Bytes::from(body)))
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                log::debug!(target: LOG_TARGET, "Cache miss for {key}");
                Ok(None)
            }
            Err(e) => Err(e).into_app_err_with(|| format!("reading cache file '{}'", path.display())),
        }
    }

    /// Store `body` under `key`, creating directories as needed.
    ///
    /// The body is written to a sibling file first and renamed into place, so an
    /// interrupted write never leaves a truncated entry behind.
    pub fn put(&self, key: &CacheKey, body: &[u8]) -> Result<()> {
        let path = self.path_for(key);

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).into_app_err_with(|| format!("creating directory '{}'", parent.display()))?;
        }

        // Escaped file names never contain '.', so this cannot clash with another entry
        let partial = path.with_file_name(format!("{}{PARTIAL_EXTENSION}", key.file_name));
        let file = File::create(&partial).into_app_err_with(|| format!("creating cache file '{}'", partial.display()))?;
        let mut writer = BufWriter::new(file);
        writer
            .write_all(body)
            .into_app_err_with(|| format!("writing cache file '{}'", partial.display()))?;
        writer
            .flush()
            .into_app_err_with(|| format!("flushing cache file '{}'", partial.display()))?;
        drop(writer);

        fs::rename(&partial, &path).into_app_err_with(|| format!("moving cache file into place at '{}'", path.display()))?;
        log::debug!(target: LOG_TARGET, "Cached {} bytes for {key}", body.len());
        Ok(())
    }

    /// Delete the entry for `key`. Deleting a missing entry is not an error.
    pub fn remove(&self, key: &CacheKey) -> Result<()> {
        let path = self.path_for(key);
        match fs::remove_file(&path) {
            Ok(()) => {
                log::debug!(target: LOG_TARGET, "Removed cache entry {key}");
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e).into_app_err_with(|| format!("removing cache file '{}'", path.display())),
        }
    }

    /// Delete every entry within `scope`.
    ///
    /// Only files named like cache entries are deleted, along with the repository and
    /// owner directories they leave empty. Anything else in the cache directory stays.
    pub fn clear(&self, scope: CacheScope<'_>) -> Result<()> {
        let removed = match scope {
            CacheScope::Repository(repo_spec) => {
                let owner_dir = self.dir.join(sanitize_path_component(repo_spec.owner()));
                let removed = clear_repo_dir(&owner_dir.join(sanitize_path_component(repo_spec.repo())))?;
                remove_dir_if_empty(&owner_dir)?;
                removed
            }
            CacheScope::All => {
                let mut removed = 0;
                for owner_dir in subdirectories(&self.dir)? {
                    for repo_dir in subdirectories(&owner_dir)? {
                        removed += clear_repo_dir(&repo_dir)?;
                    }
                    remove_dir_if_empty(&owner_dir)?;
                }
                removed
            }
        };

        log::info!(target: LOG_TARGET, "Removed {removed} cached responses from '{}'", self.dir.display());
        Ok(())
    }
}

fn read_dir_if_exists(dir: &Path) -> Result<Option<fs::ReadDir>> {
    match fs::read_dir(dir) {
        Ok(entries) => Ok(Some(entries)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e).into_app_err_with(|| format!("reading directory '{}'", dir.display())),
    }
}

/// Directories directly inside `dir`. Symbolic links are not followed.
fn subdirectories(dir: &Path) -> Result<Vec<PathBuf>> {
    let Some(entries) = read_dir_if_exists(dir)? else {
        return Ok(Vec::new());
    };

    let mut dirs = Vec::new();
    for entry in entries {
        let entry = entry.into_app_err_with(|| format!("reading directory '{}'", dir.display()))?;
        let file_type = entry
            .file_type()
            .into_app_err_with(|| format!("inspecting '{}'", entry.path().display()))?;
        if file_type.is_dir() {
            dirs.push(entry.path());
        }
    }

    Ok(dirs)
}

/// Delete the cache entries of one repository directory, returning how many were deleted.
fn clear_repo_dir(dir: &Path) -> Result<usize> {
    let Some(entries) = read_dir_if_exists(dir)? else {
        return Ok(0);
    };

    let mut removed = 0;
    for entry in entries {
        let entry = entry.into_app_err_with(|| format!("reading directory '{}'", dir.display()))?;
        let path = entry.path();
        let is_file = entry
            .file_type()
            .into_app_err_with(|| format!("inspecting '{}'", path.display()))?
            .is_file();

        if is_file && entry.file_name().to_str().is_some_and(is_entry_file_name) {
            fs::remove_file(&path).into_app_err_with(|| format!("removing cache file '{}'", path.display()))?;
            removed += 1;
        }
    }

    remove_dir_if_empty(dir)?;
    Ok(removed)
}

fn remove_dir_if_empty(dir: &Path) -> Result<()> {
    let Some(mut entries) = read_dir_if_exists(dir)? else {
        return Ok(());
    };

    if entries.next().is_none() {
        fs::remove_dir(dir).into_app_err_with(|| format!("removing directory '{}'", dir.display()))?;
    }

    Ok(())
}
