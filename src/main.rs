//! shard CLI - Command line interface for shardstore
//!
//! Provides commands for managing buckets and objects from the command line.
//! Output is JSON by default so the tool can be wrapped by other programs.

use clap::{Parser, Subcommand};
use shardstore::{Config, Storage};
use std::io::{Read, Write};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "shard")]
#[command(about = "A filesystem object store with digest-sharded blobs")]
#[command(version)]
struct Cli {
    /// Storage root directory (overrides the config file and SHARDSTORE_ROOT)
    #[arg(short, long)]
    root: Option<PathBuf>,

    /// Path to the config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Output format (json or text)
    #[arg(short, long, default_value = "json")]
    format: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
enum OutputFormat {
    Json,
    Text,
}

#[derive(Subcommand)]
enum Commands {
    // === Bucket Commands ===
    /// Create a bucket
    Mb {
        /// Bucket name
        bucket: String,
    },

    /// Delete a bucket and all of its objects
    Rb {
        /// Bucket name
        bucket: String,
    },

    /// List all buckets
    Buckets,

    // === Object Commands ===
    /// List objects in a bucket, one page at a time
    Ls {
        /// Bucket name
        bucket: String,
        /// Resume after this key (the previous page's next_cursor)
        #[arg(short, long)]
        after: Option<String>,
        /// Maximum number of entries to return
        #[arg(short, long)]
        limit: Option<usize>,
        /// Follow cursors and print every page
        #[arg(long)]
        all: bool,
    },

    /// Store an object
    Put {
        /// Bucket name
        bucket: String,
        /// Object name
        name: String,
        /// Read content from this file instead of stdin
        #[arg(long)]
        file: Option<PathBuf>,
    },

    /// Fetch an object
    Get {
        /// Bucket name
        bucket: String,
        /// Object name
        name: String,
        /// Write content to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show object size and content type
    Stat {
        /// Bucket name
        bucket: String,
        /// Object name
        name: String,
    },

    /// Delete an object
    Rm {
        /// Bucket name
        bucket: String,
        /// Object name
        name: String,
    },

    /// Print the digest and storage path of an object name
    Digest {
        /// Object name
        name: String,
        /// Bucket the path is computed for
        #[arg(short, long, default_value = "bucket")]
        bucket: String,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing();

    let storage = open_storage(&cli)?;
    if let Err(err) = execute(&cli, &storage) {
        tracing::debug!(error = %err, "command failed");
        output(
            &cli.format,
            &serde_json::json!({
                "status": "error",
                "kind": err.kind(),
                "message": err.to_string()
            }),
        );
        std::process::exit(1);
    }

    Ok(())
}

fn execute(cli: &Cli, storage: &Storage) -> shardstore::Result<()> {
    match &cli.command {
        Commands::Mb { bucket } => {
            storage.create_bucket(bucket)?;
            output(
                &cli.format,
                &serde_json::json!({
                    "status": "ok",
                    "bucket": bucket
                }),
            );
        }

        Commands::Rb { bucket } => {
            storage.delete_bucket(bucket)?;
            output(
                &cli.format,
                &serde_json::json!({
                    "status": "ok",
                    "bucket": bucket
                }),
            );
        }

        Commands::Buckets => {
            let buckets = storage.list_buckets()?;
            output(
                &cli.format,
                &serde_json::json!({
                    "count": buckets.len(),
                    "buckets": buckets
                }),
            );
        }

        Commands::Ls {
            bucket,
            after,
            limit,
            all,
        } => {
            if *all {
                let limit = limit.unwrap_or(storage.page_size());
                for page in storage.pager().pages(bucket, after.clone(), limit) {
                    output(&cli.format, &serde_json::to_value(page?)?);
                }
            } else {
                let page = storage.list_objects(bucket, after.as_deref(), *limit)?;
                output(&cli.format, &serde_json::to_value(&page)?);
            }
        }

        Commands::Put { bucket, name, file } => {
            let bytes = match file {
                Some(path) => std::fs::read(path)?,
                None => {
                    let mut buf = Vec::new();
                    std::io::stdin().read_to_end(&mut buf)?;
                    buf
                }
            };
            storage.put_object(bucket, name, &bytes)?;
            output(
                &cli.format,
                &serde_json::json!({
                    "status": "ok",
                    "bucket": bucket,
                    "key": name,
                    "size": bytes.len()
                }),
            );
        }

        Commands::Get {
            bucket,
            name,
            output: target,
        } => {
            let data = storage.get_object(bucket, name)?;
            match target {
                Some(path) => {
                    std::fs::write(path, &data.bytes)?;
                    output(
                        &cli.format,
                        &serde_json::json!({
                            "status": "ok",
                            "key": name,
                            "content_type": data.content_type,
                            "size": data.bytes.len(),
                            "path": path.display().to_string()
                        }),
                    );
                }
                None => {
                    let mut stdout = std::io::stdout().lock();
                    stdout.write_all(&data.bytes)?;
                    stdout.flush()?;
                }
            }
        }

        Commands::Stat { bucket, name } => {
            let meta = storage.stat_object(bucket, name)?;
            output(&cli.format, &serde_json::to_value(&meta)?);
        }

        Commands::Rm { bucket, name } => {
            storage.delete_object(bucket, name)?;
            output(
                &cli.format,
                &serde_json::json!({
                    "status": "ok",
                    "bucket": bucket,
                    "key": name
                }),
            );
        }

        Commands::Digest { name, bucket } => {
            let path = storage.objects().path(bucket, name, false)?;
            output(
                &cli.format,
                &serde_json::json!({
                    "key": name,
                    "digest": shardstore::digest(name),
                    "path": path.display().to_string()
                }),
            );
        }
    }

    Ok(())
}

fn open_storage(cli: &Cli) -> anyhow::Result<Storage> {
    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(root) = &cli.root {
        config.storage_root = root.clone();
    }
    Ok(Storage::from_config(&config)?)
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

fn output(format: &OutputFormat, value: &serde_json::Value) {
    let rendered = match format {
        OutputFormat::Json => serde_json::to_string(value),
        OutputFormat::Text => serde_json::to_string_pretty(value),
    };
    match rendered {
        Ok(text) => println!("{}", text),
        Err(e) => eprintln!("failed to render output: {}", e),
    }
}
