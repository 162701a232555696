//! Chain sync driver: walks the node's blocks in height order and feeds every
//! transaction to the ingestion pipeline.

mod retry_handler;

pub use retry_handler::RetryHandler;

use std::sync::Arc;

use tokio::sync::watch;
use tokio::time::{sleep, Duration};

use crate::config::IndexerConfig;
use crate::domain::errors::SyncError;
use crate::domain::ledger::Ledger;
use crate::domain::services::{
    ChainClassifier, ConsensusSchedule, IngestOutcome, TxIngestor, TxLookup,
};
use crate::infrastructure::rpc::RpcClient;
use crate::utils::logging;

/// Polls the node and ingests blocks up to its tip
pub struct ChainSync {
    rpc: RpcClient,
    lookup: TxLookup,
    ingestor: TxIngestor,
    schedule: ConsensusSchedule,
    retry_handler: RetryHandler,
    next_height: u64,
    process_interval_ms: u64,
}

impl ChainSync {
    /// Build a driver that resumes after the ledger's last synced block, or
    /// starts at `start_block_height` on an empty ledger.
    pub async fn new(
        config: &IndexerConfig,
        rpc: RpcClient,
        ledger: Arc<dyn Ledger>,
        classifier: Arc<dyn ChainClassifier>,
    ) -> Result<Self, SyncError> {
        let next_height = match ledger.sync_state().await? {
            Some(state) => {
                logging::log_info(&format!(
                    "Resuming from block height {} (last synced {})",
                    state.height + 1,
                    state.block_hash
                ));
                state.height + 1
            }
            None => {
                logging::log_info(&format!(
                    "No sync state found, starting from block height {}",
                    config.start_block_height
                ));
                config.start_block_height
            }
        };

        let ingestor = TxIngestor::resume(ledger, classifier).await?;

        Ok(Self {
            lookup: TxLookup::new(rpc.clone()),
            rpc,
            ingestor,
            schedule: ConsensusSchedule::new(config.first_pos_block),
            retry_handler: RetryHandler::with_config(
                config.rpc_max_retries,
                config.rpc_retry_delay_ms,
            ),
            next_height,
            process_interval_ms: config.process_interval_ms,
        })
    }

    /// Height of the next block to ingest
    pub fn next_height(&self) -> u64 {
        self.next_height
    }

    /// Ingest every block between the cursor and the node's tip.
    ///
    /// Returns the number of blocks ingested. A failing block stops the pass
    /// and is retried from scratch on the next call.
    pub async fn sync_once(&mut self) -> Result<u64, SyncError> {
        self.sync_to_tip(None).await
    }

    /// Poll the node until `shutdown` flips to true. If every sender is
    /// dropped no shutdown can arrive, and polling continues.
    pub async fn run(&mut self, mut shutdown: watch::Receiver<bool>) {
        let mut listening = true;

        logging::log_info(&format!(
            "Chain sync started via {} provider",
            self.rpc.provider_name()
        ));

        while !*shutdown.borrow() {
            match self.sync_to_tip(Some(&shutdown)).await {
                Ok(0) => logging::log_debug(&format!(
                    "Waiting for new blocks, next height {}",
                    self.next_height
                )),
                Ok(count) => logging::log_info(&format!(
                    "Ingested {} blocks, next height {}",
                    count, self.next_height
                )),
                Err(e) => logging::log_error(&format!(
                    "Sync stopped at block {}: {}",
                    self.next_height, e
                )),
            }

            tokio::select! {
                _ = sleep(Duration::from_millis(self.process_interval_ms)) => {}
                changed = shutdown.changed(), if listening => {
                    if changed.is_err() {
                        logging::log_warning(
                            "Shutdown channel closed, sync continues until the process exits",
                        );
                        listening = false;
                    }
                }
            }
        }

        logging::log_info("Chain sync stopped");
    }

    async fn sync_to_tip(
        &mut self,
        shutdown: Option<&watch::Receiver<bool>>,
    ) -> Result<u64, SyncError> {
        let rpc = &self.rpc;
        let tip = self
            .retry_handler
            .execute_with_retry_and_logging(|| rpc.get_block_count(), "getblockcount")
            .await?;

        let mut ingested = 0;
        while self.next_height <= tip {
            if shutdown.is_some_and(|rx| *rx.borrow()) {
                break;
            }

            self.process_block(self.next_height).await?;
            self.next_height += 1;
            ingested += 1;
        }

        Ok(ingested)
    }

    /// Fetch block `height` and ingest all of its transactions in one ledger
    /// unit, together with the sync state. Returns the number of records.
    pub async fn process_block(&self, height: u64) -> Result<usize, SyncError> {
        let rpc = &self.rpc;
        let lookup = &self.lookup;

        let hash = self
            .retry_handler
            .execute_with_retry_and_logging(|| rpc.get_block_hash(height), "getblockhash")
            .await?;
        let rpc_block = self
            .retry_handler
            .execute_with_retry_and_logging(|| rpc.get_block(&hash), "getblock")
            .await?;

        if rpc_block.height != height {
            return Err(SyncError::MalformedBlock {
                height,
                reason: format!("node returned height {}", rpc_block.height),
            });
        }
        let block = rpc_block.to_block().ok_or_else(|| SyncError::MalformedBlock {
            height,
            reason: format!("invalid block time {}", rpc_block.time),
        })?;

        let proof_of_stake = self.schedule.is_proof_of_stake(&rpc_block);
        let mut batch = self.ingestor.begin_block(&block).await?;
        let mut skipped = 0;

        for txid in &rpc_block.tx {
            let rpctx = self
                .retry_handler
                .execute_with_retry_and_logging(
                    || lookup.get_raw_transaction(txid),
                    "getrawtransaction",
                )
                .await?;

            let outcome = if proof_of_stake {
                batch.add_pos(&rpctx).await?
            } else {
                batch.add_pow(&rpctx).await?
            };

            if outcome == IngestOutcome::SkippedEmptyStake {
                skipped += 1;
            }
        }

        let recorded = batch.complete().await?;

        logging::log_info(&format!(
            "Block {} ({}): {} transactions recorded, {} empty stakes skipped, {}",
            height,
            block.hash,
            recorded,
            skipped,
            if proof_of_stake { "PoS" } else { "PoW" }
        ));

        Ok(recorded)
    }
}
