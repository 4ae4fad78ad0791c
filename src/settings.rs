use std::collections::HashMap;
use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};

use clap::Parser;
use configparser::ini::Ini;

const CONFIG_KEYS: [&str; 5] = ["date", "start_date", "end_date", "output_dir", "redownload"];

#[derive(Parser, Debug, Default)]
#[command(version, about = "Download SGX derivative files by date or range", long_about = None)]
pub struct Args {
    /// Path to config file (INI format)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Single date in YYYYMMDD format
    #[arg(long)]
    pub date: Option<String>,

    /// Start date in YYYYMMDD format (for range)
    #[arg(long)]
    pub start_date: Option<String>,

    /// End date in YYYYMMDD format (required with --start-date)
    #[arg(long)]
    pub end_date: Option<String>,

    /// Directory to save files
    #[arg(long)]
    pub output_dir: Option<PathBuf>,

    /// Force redownload even if file was already downloaded
    #[arg(long)]
    pub redownload: bool,
}

/// Final parameter values after merging CLI flags with config-file defaults.
/// CLI wins; the config file fills the gaps; `output_dir` falls back to
/// `downloads`.  No semantic validation happens here, the date fields are
/// passed through as given.
#[derive(Debug)]
pub struct Settings {
    pub date: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub output_dir: PathBuf,
    pub redownload: bool,
}

impl Settings {
    /// Merge the CLI values with the config file named by `--config`, if
    /// any.  Creates the output directory if absent.
    pub fn resolve(args: &Args) -> Result<Settings, Box<dyn Error>> {
        let defaults = match &args.config {
            Some(path) => load_config(path)?,
            None => HashMap::new(),
        };
        let redownload = args.redownload
            || match defaults.get("redownload") {
                Some(value) => parse_bool(value)?,
                None => false,
            };
        let settings = Settings {
            date: args.date.clone().or_else(|| defaults.get("date").cloned()),
            start_date: args
                .start_date
                .clone()
                .or_else(|| defaults.get("start_date").cloned()),
            end_date: args
                .end_date
                .clone()
                .or_else(|| defaults.get("end_date").cloned()),
            output_dir: args
                .output_dir
                .clone()
                .or_else(|| defaults.get("output_dir").map(PathBuf::from))
                .unwrap_or_else(|| PathBuf::from("downloads")),
            redownload,
        };
        fs::create_dir_all(&settings.output_dir)?;
        Ok(settings)
    }
}

/// Read the recognized keys from the default section of an INI file, either
/// under a `[DEFAULT]` header or before any section header.  An unreadable
/// file is a fatal error.
fn load_config(path: &Path) -> Result<HashMap<String, String>, Box<dyn Error>> {
    let mut ini = Ini::new();
    ini.load(path)
        .map_err(|e| format!("cannot read config file {}: {}", path.display(), e))?;
    let mut values: HashMap<String, String> = HashMap::new();
    for key in CONFIG_KEYS {
        if let Some(value) = ini.get("default", key) {
            values.insert(key.to_owned(), value);
        }
    }
    Ok(values)
}

/// Parse a boolean config value.  Accepted spellings, case-insensitive after
/// trimming: `true`/`false`, `yes`/`no`, `1`/`0`.
pub fn parse_bool(value: &str) -> Result<bool, Box<dyn Error>> {
    match value.trim().to_lowercase().as_str() {
        "true" | "yes" | "1" => Ok(true),
        "false" | "no" | "0" => Ok(false),
        _ => Err(format!(
            "invalid boolean config value '{}', use true/false, yes/no or 1/0",
            value
        )
        .into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;
    use std::fs;
    use std::io::Write;

    fn write_config(dir: &Path, content: &str) -> Result<PathBuf, Box<dyn Error>> {
        let path = dir.join("sgx.ini");
        let mut file = fs::File::create(&path)?;
        write!(file, "{}", content)?;
        Ok(path)
    }

    #[test]
    fn cli_values_win_over_config() -> Result<(), Box<dyn Error>> {
        let dir = tempfile::tempdir()?;
        let out_cli = dir.path().join("cli_out");
        let config = write_config(
            dir.path(),
            "[DEFAULT]\n\
             date = 20230601\n\
             start_date = 20230601\n\
             end_date = 20230630\n\
             output_dir = config_out\n\
             redownload = false\n",
        )?;
        let args = Args {
            config: Some(config),
            date: Some("20240102".to_owned()),
            start_date: Some("20240101".to_owned()),
            end_date: Some("20240103".to_owned()),
            output_dir: Some(out_cli.clone()),
            redownload: true,
        };
        let settings = Settings::resolve(&args)?;
        assert_eq!(settings.date.as_deref(), Some("20240102"));
        assert_eq!(settings.start_date.as_deref(), Some("20240101"));
        assert_eq!(settings.end_date.as_deref(), Some("20240103"));
        assert_eq!(settings.output_dir, out_cli);
        assert!(settings.redownload);
        Ok(())
    }

    #[test]
    fn config_fills_missing_cli_values() -> Result<(), Box<dyn Error>> {
        let dir = tempfile::tempdir()?;
        let out = dir.path().join("from_config");
        let config = write_config(
            dir.path(),
            &format!(
                "date = 20240102\noutput_dir = {}\nredownload = yes\n",
                out.display()
            ),
        )?;
        let args = Args {
            config: Some(config),
            ..Default::default()
        };
        let settings = Settings::resolve(&args)?;
        assert_eq!(settings.date.as_deref(), Some("20240102"));
        assert_eq!(settings.start_date, None);
        assert_eq!(settings.end_date, None);
        assert_eq!(settings.output_dir, out);
        assert!(settings.redownload);
        Ok(())
    }

    #[test]
    fn defaults_without_cli_or_config() -> Result<(), Box<dyn Error>> {
        let dir = tempfile::tempdir()?;
        let out = dir.path().join("downloads");
        let args = Args {
            output_dir: Some(out.clone()),
            ..Default::default()
        };
        let settings = Settings::resolve(&args)?;
        assert_eq!(settings.date, None);
        assert_eq!(settings.start_date, None);
        assert_eq!(settings.end_date, None);
        assert!(!settings.redownload);
        assert!(out.is_dir());
        Ok(())
    }

    #[test]
    fn redownload_flag_or_config() -> Result<(), Box<dyn Error>> {
        let dir = tempfile::tempdir()?;
        let out = dir.path().join("out");
        let config = write_config(dir.path(), "redownload = TRUE\n")?;

        // config alone turns it on
        let args = Args {
            config: Some(config.clone()),
            output_dir: Some(out.clone()),
            ..Default::default()
        };
        assert!(Settings::resolve(&args)?.redownload);

        // flag alone turns it on
        let args = Args {
            output_dir: Some(out.clone()),
            redownload: true,
            ..Default::default()
        };
        assert!(Settings::resolve(&args)?.redownload);

        // flag wins even when the config says false
        let config = write_config(dir.path(), "redownload = false\n")?;
        let args = Args {
            config: Some(config),
            output_dir: Some(out),
            redownload: true,
            ..Default::default()
        };
        assert!(Settings::resolve(&args)?.redownload);
        Ok(())
    }

    #[test]
    fn invalid_boolean_config_is_fatal() -> Result<(), Box<dyn Error>> {
        let dir = tempfile::tempdir()?;
        let config = write_config(dir.path(), "redownload = maybe\n")?;
        let args = Args {
            config: Some(config),
            output_dir: Some(dir.path().join("out")),
            ..Default::default()
        };
        assert!(Settings::resolve(&args).is_err());
        Ok(())
    }

    #[test]
    fn unreadable_config_is_fatal() {
        let args = Args {
            config: Some(PathBuf::from("/no/such/file.ini")),
            ..Default::default()
        };
        assert!(Settings::resolve(&args).is_err());
    }

    #[test]
    fn parse_bool_spellings() {
        for value in ["true", "True", " TRUE ", "yes", "Yes", "1"] {
            assert!(parse_bool(value).unwrap(), "{}", value);
        }
        for value in ["false", "False", " no ", "No", "0"] {
            assert!(!parse_bool(value).unwrap(), "{}", value);
        }
        assert!(parse_bool("maybe").is_err());
        assert!(parse_bool("").is_err());
    }

    #[test]
    fn args_parse_from_command_line() {
        let args = Args::parse_from([
            "sgxget",
            "--date",
            "20240102",
            "--output-dir",
            "/tmp/sgx",
            "--redownload",
        ]);
        assert_eq!(args.date.as_deref(), Some("20240102"));
        assert_eq!(args.output_dir, Some(PathBuf::from("/tmp/sgx")));
        assert!(args.redownload);
    }
}
