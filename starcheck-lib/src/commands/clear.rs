use super::Host;
use super::common::resolve_cache_dir;
use crate::Result;
use crate::facts::{Cache, CacheScope, RepoSpec};
use camino::Utf8PathBuf;
use clap::Parser;
use std::io::Write;

#[derive(Parser, Debug)]
pub struct ClearArgs {
    /// Repository whose cached responses to delete (format: `owner/repo` or a GitHub URL).
    /// Clears the whole cache when omitted.
    #[arg(value_name = "REPO")]
    pub repo: Option<RepoSpec>,

    /// Directory where responses are cached
    #[arg(long, short = 'c', value_name = "PATH")]
    pub cache_dir: Option<Utf8PathBuf>,
}

pub fn clear_cache<H: Host>(host: &mut H, args: &ClearArgs) -> Result<()> {
    let cache = Cache::new(resolve_cache_dir(args.cache_dir.as_deref())?);

    if let Some(repo) = &args.repo {
        cache.clear(CacheScope::Repository(repo))?;
        let _ = writeln!(host.output(), "Cleared cached responses for {repo}");
    } else {
        cache.clear(CacheScope::All)?;
        let _ = writeln!(host.output(), "Cleared all cached responses in '{}'", cache.dir().display());
    }

    Ok(())
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use crate::commands::host::TestHost;
    use crate::facts::{CacheKey, PageSuffix};

    const ENDPOINT: &str = "https://api.github.com/graphql";

    #[test]
    #[cfg_attr(miri, ignore = "Miri cannot call GetTempPathW")]
    fn test_clear_one_repository() {
        let tmp = tempfile::tempdir().unwrap();
        let cache = Cache::new(tmp.path());
        let kept: RepoSpec = "rust-lang/rust".parse().unwrap();
        let cleared: RepoSpec = "ullaakut/astronomer".parse().unwrap();

        let kept_key = CacheKey::new(&kept, ENDPOINT, PageSuffix::Listing(None));
        let cleared_key = CacheKey::new(&cleared, ENDPOINT, PageSuffix::Listing(None));
        cache.put(&kept_key, b"{}").unwrap();
        cache.put(&cleared_key, b"{}").unwrap();

        let mut host = TestHost::default();
        let args = ClearArgs {
            repo: Some(cleared),
            cache_dir: Some(Utf8PathBuf::try_from(tmp.path().to_path_buf()).unwrap()),
        };
        clear_cache(&mut host, &args).unwrap();

        assert!(cache.get(&cleared_key).unwrap().is_none());
        assert!(cache.get(&kept_key).unwrap().is_some());
        assert!(host.output_text().contains("ullaakut/astronomer"));
    }

    #[test]
    #[cfg_attr(miri, ignore = "Miri cannot call GetTempPathW")]
    fn test_clear_everything() {
        let tmp = tempfile::tempdir().unwrap();
        let cache_dir = tmp.path().join("cache");
        let cache = Cache::new(&cache_dir);
        let repo: RepoSpec = "rust-lang/rust".parse().unwrap();
        let key = CacheKey::new(&repo, ENDPOINT, PageSuffix::Contributions(Some("Y3Vyc29y"), 2020));
        cache.put(&key, b"{}").unwrap();

        let unrelated = cache_dir.join("Documents").join("thesis.tex");
        std::fs::create_dir_all(unrelated.parent().unwrap()).unwrap();
        std::fs::write(&unrelated, "chapter one").unwrap();

        let mut host = TestHost::default();
        let args = ClearArgs {
            repo: None,
            cache_dir: Some(Utf8PathBuf::try_from(cache_dir.clone()).unwrap()),
        };
        clear_cache(&mut host, &args).unwrap();

        assert!(cache.get(&key).unwrap().is_none());
        assert!(!cache_dir.join("rust-lang").exists());
        assert_eq!(std::fs::read_to_string(&unrelated).unwrap(), "chapter one");
    }
}
