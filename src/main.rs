use clap::{Parser, Subcommand};
use miette::{IntoDiagnostic, Result};
use std::io::{self, Write};
use std::num::NonZeroUsize;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;
use wallet::application::wallet::WalletService;
use wallet::config::{DEFAULT_PROGRESS_CHUNK_SIZE, WalletConfig};
use wallet::domain::payment::Payment;
use wallet::infrastructure::in_memory::{
    InMemoryAccountStore, InMemoryFavoriteStore, InMemoryPaymentStore,
};
use wallet::interfaces::csv::Terminator;
use wallet::interfaces::csv::dump_writer::DumpWriter;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Directory holding accounts.dump, payments.dump and favorites.dump
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Number of payments summed by each worker of the `progress` command
    #[arg(long, default_value_t = DEFAULT_PROGRESS_CHUNK_SIZE)]
    chunk_size: NonZeroUsize,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Sum the amounts of all payments
    Sum {
        /// Number of worker threads (0 for a single sequential pass)
        #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
        workers: i64,
    },
    /// List the payments of one account
    Filter {
        #[arg(long)]
        account: i64,
        #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
        workers: i64,
        /// Print payments as JSON lines instead of dump records
        #[arg(long)]
        json: bool,
    },
    /// List the payments of one category
    Category {
        #[arg(long)]
        name: String,
        #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
        workers: i64,
    },
    /// Sum all payments, reporting each chunk as it completes
    Progress,
    /// Write the payment history of an account into paginated dump files
    History {
        #[arg(long)]
        account: i64,
        #[arg(long)]
        out: PathBuf,
        #[arg(long)]
        records: usize,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    let wallet = WalletService::with_config(
        Box::new(InMemoryAccountStore::new()),
        Box::new(InMemoryPaymentStore::new()),
        Box::new(InMemoryFavoriteStore::new()),
        WalletConfig {
            progress_chunk_size: cli.chunk_size,
        },
    );

    if let Some(dir) = &cli.data_dir {
        wallet.import(dir).await.into_diagnostic()?;
    }

    let stdout = io::stdout();
    match cli.command {
        Command::Sum { workers } => {
            let total = wallet.sum_payments(workers).await.into_diagnostic()?;
            writeln!(stdout.lock(), "{total}").into_diagnostic()?;
        }
        Command::Filter {
            account,
            workers,
            json,
        } => {
            let payments = wallet
                .filter_payments(account, workers)
                .await
                .into_diagnostic()?;
            print_payments(&payments, json)?;
        }
        Command::Category { name, workers } => {
            let payments = wallet
                .filter_payments_by_fn(move |p: &Payment| p.category == name, workers)
                .await
                .into_diagnostic()?;
            print_payments(&payments, false)?;
        }
        Command::Progress => {
            let mut stream = wallet.sum_payments_with_progress().await.into_diagnostic()?;
            let mut out = stdout.lock();
            let mut total = 0;
            while let Some(progress) = stream.recv().await {
                total += progress.result.0;
                writeln!(out, "part={} result={}", progress.part, progress.result)
                    .into_diagnostic()?;
            }
            writeln!(out, "total={total}").into_diagnostic()?;
        }
        Command::History {
            account,
            out,
            records,
        } => {
            let payments = wallet
                .export_account_history(account)
                .await
                .into_diagnostic()?;
            wallet
                .history_to_files(&payments, &out, records)
                .into_diagnostic()?;
            info!(account, count = payments.len(), "wrote payment history");
        }
    }

    Ok(())
}

fn print_payments(payments: &[Payment], json: bool) -> Result<()> {
    let stdout = io::stdout();
    if json {
        let mut out = stdout.lock();
        for payment in payments {
            let line = serde_json::to_string(payment).into_diagnostic()?;
            writeln!(out, "{line}").into_diagnostic()?;
        }
        Ok(())
    } else {
        DumpWriter::new(stdout.lock(), Terminator::Newline)
            .write_records(payments)
            .into_diagnostic()
    }
}
