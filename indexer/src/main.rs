use std::error::Error;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use rust_decimal::Decimal;
use tokio::sync::watch;

use explorer_indexer::application::ChainSync;
use explorer_indexer::config::AppConfig;
use explorer_indexer::domain::services::{CoinstakeClassifier, TxLookup};
use explorer_indexer::infrastructure::persistence::{DbPool, RepositoryFactory};
use explorer_indexer::infrastructure::rpc::RpcClient;
use explorer_indexer::utils::logging;

#[derive(Debug, Parser)]
#[command(name = "explorer-indexer", version, about = "Chain indexer for the block explorer")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Follow the chain and ingest new blocks (default)
    Sync,
    /// Print a decoded transaction as reported by the node
    Tx {
        txid: String,
        /// Include confirmations, time and blocktime
        #[arg(long)]
        verbose: bool,
    },
    /// Print the stored record of a transaction
    Record { txid: String },
    /// Print the unspent balance of an address
    Balance { address: String },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    logging::init_logger();

    let cli = Cli::parse();
    let config = AppConfig::from_env();

    match cli.command.unwrap_or(Command::Sync) {
        Command::Sync => {
            let db_pool = DbPool::new(&config).await?;
            let ledger = Arc::new(RepositoryFactory::create_ledger(&db_pool));
            let rpc = RpcClient::new(&config.rpc)?;

            let mut sync =
                ChainSync::new(&config.indexer, rpc, ledger, Arc::new(CoinstakeClassifier))
                    .await?;

            let (stop_tx, stop_rx) = watch::channel(false);
            tokio::spawn(async move {
                if let Err(e) = tokio::signal::ctrl_c().await {
                    logging::log_error(&format!("Failed to listen for Ctrl+C: {}", e));
                    return;
                }
                logging::log_info("Shutdown requested, finishing current block");
                let _ = stop_tx.send(true);
            });

            sync.run(stop_rx).await;
        }
        Command::Tx { txid, verbose } => {
            let lookup = TxLookup::new(RpcClient::new(&config.rpc)?);
            let tx = lookup.get_tx(&txid, verbose).await?;
            println!("{}", serde_json::to_string_pretty(&tx)?);
        }
        Command::Record { txid } => {
            let db_pool = DbPool::new(&config).await?;
            let repositories = RepositoryFactory::create_repositories(&db_pool);
            match repositories.transaction.get_by_txid(&txid).await? {
                Some(record) => println!("{}", serde_json::to_string_pretty(&record)?),
                None => logging::log_warning(&format!("Transaction {} is not indexed", txid)),
            }
        }
        Command::Balance { address } => {
            let db_pool = DbPool::new(&config).await?;
            let repositories = RepositoryFactory::create_repositories(&db_pool);
            let utxos = repositories.utxo.find_by_address(&address).await?;
            let balance: Decimal = utxos.iter().map(|u| u.value).sum();
            println!("{} {} ({} unspent outputs)", address, balance, utxos.len());
        }
    }

    Ok(())
}
