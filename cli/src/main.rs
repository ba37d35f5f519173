use anyhow::{bail, Result};
use clap::{Parser, Subcommand};

use feedlake_kernel::config::LakeConfig;
use feedlake_kernel::fixture::create_table;
use feedlake_kernel::ingest::ingest_feed;
use feedlake_kernel::adapters::delta::TableSnapshot;
use feedlake_kernel::read::{read_table, ReadError};

/// Feedlake CLI
#[derive(Parser, Debug)]
#[command(name = "feedlake")]
#[command(about = "Read versioned snapshots of the bronze table", long_about = None)]
struct Cli {
    /// Path to lake config JSON
    #[arg(long, global = true)]
    config: Option<String>,

    /// Table version to read (latest if omitted)
    #[arg(allow_negative_numbers = true)]
    version: Option<i64>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
enum Command {
    /// Write the synthetic source feed file
    Generate {
        #[arg(long, default_value_t = 1, allow_negative_numbers = true)]
        feed: i32,
    },

    /// Append a generated feed file to the table
    Ingest {
        #[arg(long, default_value_t = 1, allow_negative_numbers = true)]
        feed: i32,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    if cli.command.is_some() && cli.version.is_some() {
        bail!("a table version cannot be combined with a subcommand");
    }

    // ----------------------------
    // Load config
    // ----------------------------
    let config = match &cli.config {
        Some(path) => LakeConfig::from_json_file(path)?,
        None => LakeConfig::default(),
    };

    match cli.command {
        Some(Command::Generate { feed }) => {
            let generated = create_table(&config, feed)?;
            println!("{}", generated.records);
        }
        Some(Command::Ingest { feed }) => {
            let report = ingest_feed(&config, feed).await?;
            log::info!("{} rows written", report.rows);
        }
        None => read(&config, cli.version).await?,
    }

    Ok(())
}

async fn read(config: &LakeConfig, version: Option<i64>) -> Result<()> {
    let output = read_output(read_table(config, version).await)?;
    println!("{output}");
    Ok(())
}

/// Text to print for a read, or the error that should end the process.
///
/// A version above the max is a graceful stop: report it and exit 0.
fn read_output(result: Result<TableSnapshot, ReadError>) -> Result<String> {
    match result {
        Ok(snapshot) => Ok(snapshot.to_string()),
        Err(err) => match err.version_not_found() {
            Some(max) => Ok(format!(
                "Version requested does not exist. Max version: {max}"
            )),
            None => Err(err.into()),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use feedlake_kernel::resolve::ResolveError;
    use feedlake_kernel::version_log::LogError;

    #[test]
    fn version_above_max_prints_max() {
        let err = ReadError::Resolve(ResolveError::VersionNotFound {
            requested: 13,
            max: 12,
        });

        let output = read_output(Err(err)).unwrap();
        assert_eq!(output, "Version requested does not exist. Max version: 12");
    }

    #[test]
    fn other_read_errors_propagate() {
        let err = ReadError::Resolve(ResolveError::Log(LogError::NoVersions));

        let err = read_output(Err(err)).unwrap_err();
        assert!(err.to_string().contains("no versions found"));
    }

    #[test]
    fn snapshot_is_printed() {
        let snapshot = TableSnapshot {
            version: 2,
            batches: vec![],
        };

        let output = read_output(Ok(snapshot)).unwrap();
        assert!(output.starts_with("version: 2"));
    }

    #[test]
    fn no_argument_reads_latest() {
        let cli = Cli::try_parse_from(["feedlake"]).unwrap();

        assert_eq!(cli.version, None);
        assert_eq!(cli.command, None);
    }

    #[test]
    fn positional_version_is_parsed() {
        let cli = Cli::try_parse_from(["feedlake", "3"]).unwrap();
        assert_eq!(cli.version, Some(3));
    }

    #[test]
    fn negative_version_is_accepted() {
        let cli = Cli::try_parse_from(["feedlake", "-1"]).unwrap();
        assert_eq!(cli.version, Some(-1));
    }

    #[test]
    fn non_integer_version_is_rejected() {
        assert!(Cli::try_parse_from(["feedlake", "latest"]).is_err());
    }

    #[test]
    fn generate_defaults_to_first_feed() {
        let cli = Cli::try_parse_from(["feedlake", "generate"]).unwrap();
        assert_eq!(cli.command, Some(Command::Generate { feed: 1 }));
    }

    #[test]
    fn ingest_takes_feed_and_config() {
        let cli =
            Cli::try_parse_from(["feedlake", "ingest", "--feed", "2", "--config", "lake.json"])
                .unwrap();

        assert_eq!(cli.command, Some(Command::Ingest { feed: 2 }));
        assert_eq!(cli.config.as_deref(), Some("lake.json"));
    }
}
