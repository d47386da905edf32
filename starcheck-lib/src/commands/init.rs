use super::Host;
use super::config::{Config, DEFAULT_CONFIG_FILE};
use crate::Result;
use camino::Utf8PathBuf;
use clap::Parser;
use ohno::bail;
use std::io::Write;

#[derive(Parser, Debug)]
pub struct InitArgs {
    /// Output configuration file path
    #[arg(long, short = 'o', value_name = "PATH", default_value = DEFAULT_CONFIG_FILE)]
    pub output: Utf8PathBuf,

    /// Overwrite the file if it already exists
    #[arg(long)]
    pub force: bool,
}

pub fn init_config<H: Host>(host: &mut H, args: &InitArgs) -> Result<()> {
    if args.output.exists() && !args.force {
        bail!("'{}' already exists, pass --force to overwrite it", args.output);
    }

    Config::save_default(&args.output)?;
    let _ = writeln!(host.output(), "Generated default configuration file: {}", args.output);
    Ok(())
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use crate::commands::host::TestHost;

    fn args(tmp: &tempfile::TempDir, force: bool) -> InitArgs {
        InitArgs {
            output: Utf8PathBuf::try_from(tmp.path().join(DEFAULT_CONFIG_FILE)).unwrap(),
            force,
        }
    }

    #[test]
    #[cfg_attr(miri, ignore = "Miri cannot call GetTempPathW")]
    fn test_init_writes_default_config() {
        let tmp = tempfile::tempdir().unwrap();
        let mut host = TestHost::default();
        let args = args(&tmp, false);

        init_config(&mut host, &args).unwrap();

        let written = std::fs::read_to_string(&args.output).unwrap();
        assert_eq!(written, crate::commands::config::DEFAULT_CONFIG_TOML);
        assert!(host.output_text().contains("Generated default configuration file"));
    }

    #[test]
    #[cfg_attr(miri, ignore = "Miri cannot call GetTempPathW")]
    fn test_init_refuses_to_overwrite() {
        let tmp = tempfile::tempdir().unwrap();
        let mut host = TestHost::default();
        std::fs::write(tmp.path().join(DEFAULT_CONFIG_FILE), "stars = 40\n").unwrap();

        let _ = init_config(&mut host, &args(&tmp, false)).unwrap_err();
        init_config(&mut host, &args(&tmp, true)).unwrap();
    }
}
