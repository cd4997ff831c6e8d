//! Command line interface of the `javah` binary.

use std::{
    ffi::OsString,
    fs,
    path::{Path, PathBuf},
    process::ExitCode,
};

use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use javah::{ErrorPolicy, GeneratorConfig, Pipeline};
use tracing::{error, info};

use crate::{
    classpath::ClassPath,
    logging,
    output::{write_units, Target},
};

/// Generate C header files for the native methods of Java classes.
#[derive(Debug, Parser)]
#[command(name = "javah", version)]
pub struct Cli {
    /// Output directory for the generated headers
    #[arg(short = 'd', value_name = "DIR", conflicts_with = "output")]
    pub directory: Option<PathBuf>,

    /// Concatenate all headers into FILE
    #[arg(short = 'o', value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Directories and .jar/.zip archives to search for classes
    #[arg(long = "class-path", visible_alias = "classpath", value_name = "PATH")]
    pub class_path: Option<OsString>,

    /// TOML file with generator settings
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Also write headers for classes without native methods
    #[arg(long)]
    pub emit_empty: bool,

    /// Skip classes that fail and report them at the end
    #[arg(long)]
    pub keep_going: bool,

    /// Number of worker threads
    #[arg(short, long, value_name = "N")]
    pub jobs: Option<usize>,

    /// More log output (repeatable)
    #[arg(short, long, action = ArgAction::Count, conflicts_with = "quiet")]
    pub verbose: u8,

    /// Less log output
    #[arg(short, long, action = ArgAction::Count)]
    pub quiet: u8,

    /// Fully-qualified class names or paths to .class files
    #[arg(required = true, value_name = "CLASSES")]
    pub classes: Vec<String>,
}

impl Cli {
    /// Parses the process arguments, accepting javah's single-dash options.
    pub fn from_env() -> Self {
        Self::parse_from(normalize_args(std::env::args_os()))
    }

    /// Loads `--config` and applies the command line flags on top.
    pub fn generator_config(&self) -> Result<GeneratorConfig> {
        let mut config = match &self.config {
            Some(path) => load_config(path)?,
            None => GeneratorConfig::default(),
        };
        if self.emit_empty {
            config.emit_for_classes_with_no_natives = true;
        }
        if self.keep_going {
            config.error_policy = ErrorPolicy::SkipAndReport;
        }
        if self.jobs.is_some() {
            config.jobs = self.jobs;
        }
        Ok(config)
    }

    pub fn target(&self) -> Target {
        match (&self.output, &self.directory) {
            (Some(file), _) => Target::Combined(file.clone()),
            (None, Some(dir)) => Target::Directory(dir.clone()),
            (None, None) => Target::Directory(PathBuf::from(".")),
        }
    }
}

/// Rewrites `-cp` and `-classpath` to `--class-path`.
pub fn normalize_args<I, T>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    args.into_iter()
        .map(Into::into)
        .map(|arg| {
            if arg == "-cp" || arg == "-classpath" {
                OsString::from("--class-path")
            } else {
                arg
            }
        })
        .collect()
}

fn load_config(path: &Path) -> Result<GeneratorConfig> {
    let text = fs::read_to_string(path).with_context(|| format!("failed to read config {}", path.display()))?;
    toml::from_str(&text).with_context(|| format!("invalid config {}", path.display()))
}

/// Runs the generator. Failing classes under `--keep-going` give exit code 1.
pub fn run(cli: Cli) -> Result<ExitCode> {
    logging::init(logging::level_for(cli.verbose, cli.quiet));

    let config = cli.generator_config()?;
    let class_path = ClassPath::from_option_or_env(cli.class_path.as_deref());
    info!(entries = class_path.entries().len(), classes = cli.classes.len(), "starting");

    let report = Pipeline::new(config)
        .run(&class_path, &cli.classes)
        .context("header generation failed")?;

    let target = cli.target();
    let written = write_units(&report.units, &target)?;
    info!(
        generated = report.units.len(),
        written = written.len(),
        skipped = report.skipped.len(),
        "done"
    );

    if report.failures.is_empty() {
        return Ok(ExitCode::SUCCESS);
    }
    for failure in report.failures {
        let failure = anyhow::Error::from(failure);
        error!("{:#}", failure);
        eprintln!("javah: {:#}", failure);
    }
    Ok(ExitCode::from(1))
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use clap::Parser;
    use javah::ErrorPolicy;

    use super::{normalize_args, Cli};
    use crate::output::Target;

    fn parse(args: &[&str]) -> Result<Cli, clap::Error> {
        Cli::try_parse_from(normalize_args(std::iter::once("javah").chain(args.iter().copied())))
    }

    #[test]
    fn legacy_class_path_spellings() {
        for flag in ["-cp", "-classpath", "--class-path", "--classpath"] {
            let cli = parse(&[flag, "lib", "a.B"]).unwrap();
            assert_eq!(cli.class_path.as_deref(), Some(std::ffi::OsStr::new("lib")), "{}", flag);
            assert_eq!(cli.classes, ["a.B"]);
        }
    }

    #[test]
    fn output_targets() {
        assert_eq!(parse(&["a.B"]).unwrap().target(), Target::Directory(PathBuf::from(".")));
        assert_eq!(
            parse(&["-d", "out", "a.B"]).unwrap().target(),
            Target::Directory(PathBuf::from("out"))
        );
        assert_eq!(
            parse(&["-o", "all.h", "a.B"]).unwrap().target(),
            Target::Combined(PathBuf::from("all.h"))
        );
        assert!(parse(&["-d", "out", "-o", "all.h", "a.B"]).is_err());
        assert!(parse(&[]).is_err());
    }

    #[test]
    fn flags_override_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("javah.toml");
        std::fs::write(&path, "emit-constants = false\njobs = 8\n").unwrap();

        let cli = parse(&["--config", path.to_str().unwrap(), "--keep-going", "-j", "2", "a.B"]).unwrap();
        let config = cli.generator_config().unwrap();
        assert!(!config.emit_constants);
        assert_eq!(config.jobs, Some(2));
        assert_eq!(config.error_policy, ErrorPolicy::SkipAndReport);
        assert!(!config.emit_for_classes_with_no_natives);
    }

    #[test]
    fn bad_config_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("javah.toml");
        std::fs::write(&path, "emit-everything = true\n").unwrap();
        let cli = parse(&["--config", path.to_str().unwrap(), "a.B"]).unwrap();
        let err = cli.generator_config().unwrap_err();
        assert!(format!("{:#}", err).contains("invalid config"));
    }
}
