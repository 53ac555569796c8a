//! aflchain CLI — recover the mutation chain of an AFL queue seed
//!
//! Usage:
//!   aflchain out/queue/id:000042,src:000017,op:havoc,rep:4
//!   aflchain -f dot out/queue/id:000042,... | dot -Tsvg > chain.svg
//!   aflchain -d out/queue -f chain id:000042,...

use aflchain_core::{ChainResolver, OutputFormat, ResolveError, ResolverConfig};
use clap::{ArgAction, Parser, ValueEnum};
use log::debug;
use std::path::PathBuf;
use std::process::ExitCode;
use thiserror::Error;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum FormatArg {
    /// Nested lineage record
    Json,
    /// Graphviz digraph
    Dot,
    /// Flat list of decoded records
    Chain,
}

impl From<FormatArg> for OutputFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Json => OutputFormat::Json,
            FormatArg::Dot => OutputFormat::Dot,
            FormatArg::Chain => OutputFormat::Chain,
        }
    }
}

/// Recover (approximate) mutation chain from an AFL seed
#[derive(Debug, Parser)]
#[command(name = "aflchain", version)]
struct Cli {
    /// Output format
    #[arg(short = 'f', long, value_enum, default_value_t = FormatArg::Json)]
    output_format: FormatArg,

    /// AFL queue directory; SEED_PATH is taken relative to it
    #[arg(short = 'd', long)]
    dir: Option<PathBuf>,

    /// Follow parent ids even if a seed turns out to be its own ancestor
    #[arg(long)]
    no_cycle_check: bool,

    /// More log output on stderr (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,

    /// Path to the seed to recover the mutation chain for
    seed_path: PathBuf,
}

#[derive(Debug, Error)]
enum CliError {
    #[error("{} is not a valid directory", .0.display())]
    InvalidDir(PathBuf),

    #[error(transparent)]
    Resolve(#[from] ResolveError),

    #[error("failed to serialize lineage: {0}")]
    Render(#[from] serde_json::Error),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp_millis()
        .init();

    match run(&cli) {
        Ok(output) => {
            print!("{}", output);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("aflchain: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<String, CliError> {
    let seed_path = match &cli.dir {
        Some(dir) if !dir.is_dir() => return Err(CliError::InvalidDir(dir.clone())),
        Some(dir) => dir.join(&cli.seed_path),
        None => cli.seed_path.clone(),
    };
    debug!("Resolving {}", seed_path.display());

    let mut resolver = ChainResolver::new(ResolverConfig {
        detect_cycles: !cli.no_cycle_check,
        ..ResolverConfig::default()
    });
    let lineage = resolver.resolve(&seed_path)?;

    let mut output = aflchain_core::render(&lineage, cli.output_format.into())?;
    if !output.ends_with('\n') {
        output.push('\n');
    }
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use std::ffi::OsStr;
    use std::fs::File;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_defaults_to_json() {
        let cli = Cli::parse_from(["aflchain", "id:000000,orig:seedA"]);
        assert!(matches!(cli.output_format, FormatArg::Json));
        assert!(cli.dir.is_none());
        assert!(!cli.no_cycle_check);
    }

    #[test]
    fn test_run_with_dir() {
        let dir = tempfile::tempdir().unwrap();
        File::create(dir.path().join("id:000000,orig:seedA")).unwrap();
        File::create(dir.path().join("id:000001,src:000000,op:flip1,pos:5")).unwrap();

        let cli = Cli::parse_from([
            OsStr::new("aflchain"),
            OsStr::new("-d"),
            dir.path().as_os_str(),
            OsStr::new("id:000001,src:000000,op:flip1,pos:5"),
        ]);
        let output = run(&cli).unwrap();
        assert_eq!(
            output,
            concat!(
                r#"{"id":1,"op":"bitflip 1/1","pos":5,"#,
                r#""src":[{"id":0,"orig_seed":"seedA"}]}"#,
                "\n"
            )
        );
    }

    #[test]
    fn test_run_rejects_bad_inputs() {
        let dir = tempfile::tempdir().unwrap();
        File::create(dir.path().join("randomfile.txt")).unwrap();

        let seed = dir.path().join("randomfile.txt");
        let cli = Cli::parse_from([OsStr::new("aflchain"), seed.as_os_str()]);
        assert!(matches!(
            run(&cli),
            Err(CliError::Resolve(ResolveError::UnresolvableLineage { .. }))
        ));

        let cli = Cli::parse_from([OsStr::new("aflchain"), dir.path().join("absent").as_os_str()]);
        assert!(matches!(run(&cli), Err(CliError::Resolve(ResolveError::InvalidInputPath(_)))));

        let cli = Cli::parse_from([
            OsStr::new("aflchain"),
            OsStr::new("-d"),
            dir.path().join("absent").as_os_str(),
            OsStr::new("x"),
        ]);
        assert!(matches!(run(&cli), Err(CliError::InvalidDir(_))));
    }
}
