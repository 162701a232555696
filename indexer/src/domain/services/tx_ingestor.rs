//! Turns raw node transactions into transaction records and UTXO mutations.
//!
//! Blocks must be fed in chain order: an input can only retire a UTXO row that
//! an earlier transaction inserted. [`TxIngestor`] enforces this with a height
//! cursor and rejects any block below the last committed height.

use std::collections::HashSet;
use std::sync::Arc;

use rust_decimal::Decimal;
use tokio::sync::{Mutex, MutexGuard};

use crate::domain::errors::IngestError;
use crate::domain::ledger::{Ledger, LedgerUnit, TransactionStore, UtxoStore};
use crate::domain::models::{
    Block, RawTransaction, SyncState, TransactionInput, TransactionOutput, TransactionRecord,
    UtxoEntry,
};
use crate::infrastructure::persistence::error::DbError;
use crate::utils::logging;

use super::reward_classifier::ChainClassifier;
use super::script_classifier::{classify_output, RecordInclusionPolicy, UtxoInclusionPolicy};

/// Project the inputs of `rpctx` and retire the outputs they spend.
///
/// Spent keys are deduplicated and removed with a single bulk call. Coinbase
/// inputs reference no output and contribute no key; when no key remains the
/// store is not called at all.
pub async fn vin<S>(store: &S, rpctx: &RawTransaction) -> Result<Vec<TransactionInput>, DbError>
where
    S: UtxoStore + ?Sized,
{
    let mut txin = Vec::with_capacity(rpctx.vin.len());
    let mut seen = HashSet::new();
    let mut spent = Vec::new();

    for input in &rpctx.vin {
        txin.push(TransactionInput::from(input));

        if let Some(key) = input.spent_key() {
            if seen.insert(key.clone()) {
                spent.push(key);
            }
        }
    }

    if !spent.is_empty() {
        store.remove(&spent).await?;
    }

    Ok(txin)
}

/// Classify the outputs of `rpctx`, insert their UTXO rows and return the
/// outputs that belong on the transaction record.
pub async fn vout<S>(
    store: &S,
    rpctx: &RawTransaction,
    block_height: u64,
) -> Result<Vec<TransactionOutput>, DbError>
where
    S: UtxoStore + ?Sized,
{
    let utxo_policy = UtxoInclusionPolicy;
    let record_policy = RecordInclusionPolicy;

    let mut txout = Vec::new();
    let mut utxos = Vec::new();

    for output in &rpctx.vout {
        let Some(destination) = classify_output(output) else {
            continue;
        };

        let in_utxo_set = utxo_policy.admits(&destination);
        let on_record = record_policy.admits(&destination);
        let address = destination.into_address();

        if in_utxo_set {
            utxos.push(UtxoEntry::new(
                &rpctx.txid,
                output.n,
                address.clone(),
                output.value,
                block_height,
            ));
        }

        if on_record {
            txout.push(TransactionOutput {
                block_height,
                address,
                n: output.n,
                value: output.value,
            });
        }
    }

    if !utxos.is_empty() {
        store.insert_many(&utxos).await?;
    }

    Ok(txout)
}

/// The placeholder transaction some PoS daemons emit: a coinbase input paying
/// a zero first output. It carries no value and is not stored.
pub fn is_empty_stake(rpctx: &RawTransaction) -> bool {
    let coinbase_first = rpctx.vin.first().is_some_and(|input| input.is_coinbase());
    let empty_first = rpctx
        .vout
        .first()
        .is_some_and(|output| output.value == Decimal::ZERO);

    coinbase_first && empty_first
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestOutcome {
    Recorded,
    SkippedEmptyStake,
}

/// Ingestion pipeline entry point
pub struct TxIngestor {
    ledger: Arc<dyn Ledger>,
    classifier: Arc<dyn ChainClassifier>,
    /// Height of the last committed block
    cursor: Mutex<Option<u64>>,
}

impl TxIngestor {
    pub fn new(ledger: Arc<dyn Ledger>, classifier: Arc<dyn ChainClassifier>) -> Self {
        Self {
            ledger,
            classifier,
            cursor: Mutex::new(None),
        }
    }

    /// Create an ingestor whose cursor starts at the ledger's sync state
    pub async fn resume(
        ledger: Arc<dyn Ledger>,
        classifier: Arc<dyn ChainClassifier>,
    ) -> Result<Self, DbError> {
        let last = ledger.sync_state().await?.map(|state| state.height);
        let ingestor = Self::new(ledger, classifier);
        *ingestor.cursor.lock().await = last;
        Ok(ingestor)
    }

    pub async fn last_height(&self) -> Option<u64> {
        *self.cursor.lock().await
    }

    /// Open a batch for `block`. Only one batch is open at a time; others wait.
    pub async fn begin_block<'a>(
        &'a self,
        block: &'a Block,
    ) -> Result<BlockBatch<'a>, IngestError> {
        let cursor = self.cursor.lock().await;
        if let Some(last) = *cursor {
            if block.height < last {
                return Err(IngestError::OutOfOrder {
                    height: block.height,
                    last,
                });
            }
        }

        Ok(BlockBatch {
            ledger: self.ledger.as_ref(),
            classifier: self.classifier.as_ref(),
            block,
            cursor,
            unit: None,
            recorded: 0,
            abandoned: false,
        })
    }

    /// Ingest one transaction of a proof-of-stake block in its own unit
    pub async fn add_pos(
        &self,
        block: &Block,
        rpctx: &RawTransaction,
    ) -> Result<IngestOutcome, IngestError> {
        let mut batch = self.begin_block(block).await?;
        let outcome = batch.add_pos(rpctx).await?;
        batch.commit().await?;
        Ok(outcome)
    }

    /// Ingest one transaction of a proof-of-work block in its own unit
    pub async fn add_pow(
        &self,
        block: &Block,
        rpctx: &RawTransaction,
    ) -> Result<IngestOutcome, IngestError> {
        let mut batch = self.begin_block(block).await?;
        let outcome = batch.add_pow(rpctx).await?;
        batch.commit().await?;
        Ok(outcome)
    }
}

/// Transactions of one block staged in a single ledger unit.
///
/// The unit is opened lazily on the first write. If any write fails the unit
/// is rolled back and the batch refuses further work.
pub struct BlockBatch<'a> {
    ledger: &'a dyn Ledger,
    classifier: &'a dyn ChainClassifier,
    block: &'a Block,
    cursor: MutexGuard<'a, Option<u64>>,
    unit: Option<Box<dyn LedgerUnit>>,
    recorded: usize,
    abandoned: bool,
}

impl<'a> BlockBatch<'a> {
    /// Number of transaction records staged so far
    pub fn recorded(&self) -> usize {
        self.recorded
    }

    pub async fn add_pos(&mut self, rpctx: &RawTransaction) -> Result<IngestOutcome, IngestError> {
        self.ensure_usable()?;

        if is_empty_stake(rpctx) {
            logging::log_debug(&format!(
                "Skipping empty stake transaction {} in block {}",
                rpctx.txid, self.block.height
            ));
            return Ok(IngestOutcome::SkippedEmptyStake);
        }

        let is_reward = self.classifier.is_reward_raw_transaction(rpctx);
        self.record(rpctx, is_reward).await?;
        Ok(IngestOutcome::Recorded)
    }

    pub async fn add_pow(&mut self, rpctx: &RawTransaction) -> Result<IngestOutcome, IngestError> {
        self.ensure_usable()?;
        self.record(rpctx, false).await?;
        Ok(IngestOutcome::Recorded)
    }

    /// Commit the staged writes and advance the cursor
    pub async fn commit(mut self) -> Result<usize, IngestError> {
        self.ensure_usable()?;

        if let Some(unit) = self.unit.take() {
            unit.commit().await?;
        }
        *self.cursor = Some(self.block.height);

        Ok(self.recorded)
    }

    /// Commit the block together with the sync state marking it done
    pub async fn complete(mut self) -> Result<usize, IngestError> {
        self.ensure_usable()?;

        let state = SyncState {
            height: self.block.height,
            block_hash: self.block.hash.clone(),
        };
        self.unit().await?.save_sync_state(&state).await?;

        self.commit().await
    }

    fn ensure_usable(&self) -> Result<(), IngestError> {
        if self.abandoned {
            return Err(IngestError::Abandoned {
                height: self.block.height,
            });
        }
        Ok(())
    }

    async fn record(&mut self, rpctx: &RawTransaction, is_reward: bool) -> Result<(), IngestError> {
        match self.stage(rpctx, is_reward).await {
            Ok(()) => {
                self.recorded += 1;
                Ok(())
            }
            Err(e) => {
                // Dropping the unit rolls back everything staged for this block
                self.unit = None;
                self.abandoned = true;
                logging::log_error(&format!(
                    "Failed to ingest transaction {} in block {}: {}",
                    rpctx.txid, self.block.height, e
                ));
                Err(e.into())
            }
        }
    }

    async fn stage(&mut self, rpctx: &RawTransaction, is_reward: bool) -> Result<(), DbError> {
        let block = self.block;
        let unit = self.unit().await?;

        let txin = vin(unit, rpctx).await?;
        let txout = vout(unit, rpctx, block.height).await?;

        let record = TransactionRecord {
            id: rpctx.txid.clone(),
            block_hash: block.hash.clone(),
            block_height: block.height,
            created_at: block.created_at,
            tx_id: rpctx.txid.clone(),
            version: rpctx.version,
            vin: txin,
            vout: txout,
            is_reward,
        };
        unit.create(&record).await?;

        logging::log_debug(&format!(
            "Staged transaction {} ({} in, {} out) at height {}",
            record.tx_id,
            record.vin.len(),
            record.vout.len(),
            block.height
        ));

        Ok(())
    }

    async fn unit(&mut self) -> Result<&dyn LedgerUnit, DbError> {
        let unit = match self.unit.take() {
            Some(unit) => unit,
            None => self.ledger.begin().await?,
        };
        Ok(&**self.unit.insert(unit))
    }
}
