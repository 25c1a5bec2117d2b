//! gzkv CLI
//!
//! Command-line interface for gzip-compressed key-value archives.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use gzkv::cache::{self, ReqwestClient};
use gzkv::{ArchiveHeader, DumpOptions, FetchConfig, GzkvError, StoreOptions};
use tracing_subscriber::{fmt, EnvFilter};

/// gzkv CLI
#[derive(Parser, Debug)]
#[command(name = "gzkv")]
#[command(about = "Inspect and edit gzip-compressed key-value archives")]
#[command(version)]
struct Args {
    /// How long to wait for the store lock (milliseconds)
    #[arg(long, default_value = "1000")]
    lock_timeout_ms: u64,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the value stored under a key
    Get {
        archive: PathBuf,
        bucket: String,
        key: String,
    },

    /// Store a value, creating the archive and bucket if needed
    Put {
        archive: PathBuf,
        bucket: String,
        key: String,
        value: String,

        /// Comment written into the gzip header
        #[arg(short, long)]
        comment: Option<String>,
    },

    /// List buckets and their sizes
    Buckets { archive: PathBuf },

    /// Fetch URLs and cache the responses in a bucket
    Dump {
        archive: PathBuf,
        bucket: String,

        #[arg(required = true)]
        urls: Vec<String>,

        /// Per-request share of the batch timeout (seconds)
        #[arg(short, long, default_value = "3")]
        timeout_secs: u64,

        /// Only cache 2xx responses
        #[arg(long)]
        only_ok: bool,

        /// Comment written into the gzip header
        #[arg(short, long)]
        comment: Option<String>,
    },

    /// List cached responses in a bucket
    Responses { archive: PathBuf, bucket: String },
}

fn main() -> ExitCode {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,gzkv=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let options = StoreOptions::builder()
        .lock_timeout(Duration::from_millis(args.lock_timeout_ms))
        .build();

    match run(args.command, &options) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(command: Commands, options: &StoreOptions) -> gzkv::Result<()> {
    match command {
        Commands::Get { archive, bucket, key } => {
            let session = gzkv::open(&archive, options, true)?;
            let value = session.view(|tx| {
                let b = tx
                    .bucket(&bucket)
                    .ok_or_else(|| GzkvError::NoSuchPartition(bucket.clone()))?;
                Ok(b.get(&key).map(<[u8]>::to_vec))
            })?;
            session.close()?;

            match value {
                Some(v) => println!("{}", String::from_utf8_lossy(&v)),
                None => tracing::warn!("Key '{}' not found in '{}'", key, bucket),
            }
        }

        Commands::Put {
            archive,
            bucket,
            key,
            value,
            comment,
        } => {
            let session = gzkv::open(&archive, options, false)?;
            session.update(|tx| tx.create_bucket_if_not_exists(&bucket)?.put(&key, &value))?;

            let header = comment
                .map(ArchiveHeader::with_comment)
                .or_else(|| session.header().cloned());
            session.write_to_archive(&archive, None, header.as_ref())?;
            session.close()?;
        }

        Commands::Buckets { archive } => {
            let session = gzkv::open(&archive, options, true)?;
            if let Some(comment) = session.header().and_then(|h| h.comment.as_deref()) {
                println!("# {}", comment);
            }
            session.view(|tx| {
                for name in tx.bucket_names() {
                    let len = tx.bucket(name).map_or(0, |b| b.len());
                    println!("{}\t{}", String::from_utf8_lossy(name), len);
                }
                Ok(())
            })?;
            session.close()?;
        }

        Commands::Dump {
            archive,
            bucket,
            urls,
            timeout_secs,
            only_ok,
            comment,
        } => {
            let mut builder = DumpOptions::builder()
                .store(options.clone())
                .fetch(FetchConfig::new(Duration::from_secs(timeout_secs)));
            if let Some(comment) = comment {
                builder = builder.header(ArchiveHeader::with_comment(comment));
            }
            if only_ok {
                builder = builder.filter(cache::status_ok);
            }

            let requests = urls.into_iter().map(cache::Request::get).collect();
            let report = cache::dump_responses(
                requests,
                &archive,
                &bucket,
                Arc::new(ReqwestClient::new()),
                &builder.build(),
            )?;

            println!(
                "stored {}, rejected {}, failed {}",
                report.stored,
                report.rejected,
                report.errors.len()
            );
        }

        Commands::Responses { archive, bucket } => {
            let session = gzkv::open(&archive, options, true)?;
            let responses = cache::get_responses_from_db(session.store(), &bucket)?;
            for mut response in responses {
                let body = response.bytes()?;
                println!(
                    "{}\t{} {}\t{} bytes",
                    response.status, response.request.method, response.request.url,
                    body.len()
                );
            }
            session.close()?;
        }
    }

    Ok(())
}
