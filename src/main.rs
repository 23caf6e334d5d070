use clap::{Parser, Subcommand};
use clause::{ConditionStore, Config, Error, FilesystemSourceProvider};
use serde_json::json;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

/// Look up condition blocks in a tree of condition documents.
#[derive(Parser, Debug)]
#[command(name = "clause", version, about, arg_required_else_help = true)]
struct Cli {
    /// JSON configuration (`debug`, `xmlLocations`, `handlerLocations`)
    #[arg(long, short, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Directory relative locations are resolved against
    #[arg(long, value_name = "DIR", default_value = ".")]
    base: PathBuf,

    /// Re-read documents on every lookup
    #[arg(long)]
    debug: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the condition block with this id
    Resolve {
        namespace: String,
        id: String,

        /// Emit JSON instead of the block text
        #[arg(long)]
        json: bool,
    },
    /// List namespaces and the documents registered under them
    Sources,
}

/// How a successful run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Outcome {
    Done,
    /// The requested block does not exist.
    NotFound,
}

impl Outcome {
    fn exit_code(self) -> ExitCode {
        match self {
            Outcome::Done => ExitCode::SUCCESS,
            Outcome::NotFound => ExitCode::from(2),
        }
    }
}

fn main() -> ExitCode {
    env_logger::init();
    match run(Cli::parse()) {
        Ok(outcome) => outcome.exit_code(),
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<Outcome, Error> {
    let mut config = match &cli.config {
        Some(path) => Config::from_path(path)?,
        None => Config::default(),
    };
    if cli.debug {
        config = config.with_debug(true);
    }

    let provider = Arc::new(FilesystemSourceProvider::new(&cli.base));
    let store = ConditionStore::load(config, provider)?;

    match cli.command {
        Command::Resolve {
            namespace,
            id,
            json,
        } => {
            let Some(block) = store.resolve(&namespace, &id)? else {
                eprintln!("No condition '{}' in namespace '{}'", id, namespace);
                return Ok(Outcome::NotFound);
            };
            if json {
                let children: Vec<&str> = block.child_elements().map(|c| c.tag_name()).collect();
                let out = json!({
                    "namespace": namespace,
                    "id": id,
                    "source": block.source(),
                    "text": block.text().trim(),
                    "children": children,
                });
                println!("{}", serde_json::to_string_pretty(&out)?);
            } else {
                println!("{}", block.text().trim());
            }
        }
        Command::Sources => {
            let snapshot = store.snapshot();
            for (namespace, locators) in snapshot.catalog().sources().iter() {
                println!("{}", namespace);
                for locator in locators {
                    println!("  {}", locator);
                }
            }
        }
    }
    Ok(Outcome::Done)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn workspace() -> TempDir {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("conditions")).unwrap();
        fs::write(
            dir.path().join("conditions/orders.xml"),
            r#"<conditions namespace="orders"><condition id="open">status = 'open'</condition></conditions>"#,
        )
        .unwrap();
        dir
    }

    fn cli(dir: &TempDir, args: &[&str]) -> Cli {
        let base = dir.path().to_string_lossy().into_owned();
        let mut argv = vec!["clause", "--base", base.as_str()];
        argv.extend_from_slice(args);
        Cli::parse_from(argv)
    }

    #[test]
    fn missing_block_is_reported_as_an_outcome() {
        let dir = workspace();
        let outcome = run(cli(&dir, &["resolve", "orders", "closed"])).unwrap();
        assert_eq!(outcome, Outcome::NotFound);
    }

    #[test]
    fn resolved_block_and_sources_succeed() {
        let dir = workspace();
        assert_eq!(run(cli(&dir, &["resolve", "orders", "open"])).unwrap(), Outcome::Done);
        assert_eq!(run(cli(&dir, &["--debug", "resolve", "orders", "open", "--json"])).unwrap(), Outcome::Done);
        assert_eq!(run(cli(&dir, &["sources"])).unwrap(), Outcome::Done);
    }

    #[test]
    fn unreadable_config_is_an_error() {
        let dir = workspace();
        let missing = dir.path().join("missing.json");
        let missing = missing.to_string_lossy().into_owned();
        assert!(run(cli(&dir, &["--config", missing.as_str(), "sources"])).is_err());
    }
}
