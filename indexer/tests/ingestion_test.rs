mod common;

use std::sync::Arc;

use rust_decimal::Decimal;
use serde_json::json;

use common::*;
use explorer_indexer::domain::errors::IngestError;
use explorer_indexer::domain::ledger::Ledger;
use explorer_indexer::domain::services::{vin, vout, IngestOutcome, TxIngestor, NON_STANDARD, ZEROCOIN};
use explorer_indexer::infrastructure::persistence::{DbError, MemoryLedger, StoreCall};

fn ingestor(ledger: &MemoryLedger, reward: bool) -> TxIngestor {
    TxIngestor::new(Arc::new(ledger.clone()), Arc::new(FixedClassifier(reward)))
}

fn dec(s: &str) -> Decimal {
    s.parse().unwrap()
}

#[tokio::test]
async fn test_empty_vin_issues_no_removal() {
    let ledger = MemoryLedger::new();
    let unit = ledger.begin().await.unwrap();

    let txin = vin(&*unit, &raw(tx("t1", vec![], vec![]))).await.unwrap();
    let absent = vin(&*unit, &raw(json!({ "txid": "t2" }))).await.unwrap();

    assert!(txin.is_empty());
    assert!(absent.is_empty());
    assert!(ledger.calls().await.is_empty());
}

#[tokio::test]
async fn test_duplicate_inputs_are_removed_once() {
    let ledger = MemoryLedger::new();
    let unit = ledger.begin().await.unwrap();
    let rpctx = raw(tx("t1", vec![spend("a", 0), spend("a", 0), spend("b", 1)], vec![]));

    let txin = vin(&*unit, &rpctx).await.unwrap();

    assert_eq!(txin.len(), 3, "inputs are projected one to one");
    assert_eq!(
        ledger.calls().await,
        vec![StoreCall::Remove(vec!["a:0".to_string(), "b:1".to_string()])]
    );
}

#[tokio::test]
async fn test_coinbase_input_contributes_no_key() {
    let ledger = MemoryLedger::new();
    let unit = ledger.begin().await.unwrap();

    let txin = vin(&*unit, &raw(tx("cb", vec![coinbase_input()], vec![])))
        .await
        .unwrap();
    assert_eq!(txin.len(), 1);
    assert_eq!(txin[0].coinbase.as_deref(), Some("03a08601"));
    assert!(ledger.calls().await.is_empty());

    vin(
        &*unit,
        &raw(tx("mixed", vec![coinbase_input(), spend("prev", 2)], vec![])),
    )
    .await
    .unwrap();
    assert_eq!(
        ledger.calls().await,
        vec![StoreCall::Remove(vec!["prev:2".to_string()])]
    );
}

#[tokio::test]
async fn test_worthless_and_nulldata_outputs_are_dropped() {
    let ledger = MemoryLedger::new();
    let unit = ledger.begin().await.unwrap();
    let rpctx = raw(tx(
        "t1",
        vec![],
        vec![
            pay(0, 0.0, "DZero"),
            pay(1, -1.0, "DNegative"),
            script_out(2, 1.0, "nulldata"),
            pay(3, 4.0, "DKept"),
        ],
    ));

    let txout = vout(&*unit, &rpctx, 7).await.unwrap();

    assert_eq!(txout.len(), 1);
    assert_eq!(txout[0].n, 3);
    assert_eq!(
        ledger.calls().await,
        vec![StoreCall::InsertMany(vec!["t1:3".to_string()])]
    );
}

#[tokio::test]
async fn test_only_dropped_outputs_issue_no_insert() {
    let ledger = MemoryLedger::new();
    let unit = ledger.begin().await.unwrap();
    let rpctx = raw(tx("t1", vec![], vec![script_out(0, 0.5, "nulldata")]));

    let txout = vout(&*unit, &rpctx, 7).await.unwrap();

    assert!(txout.is_empty());
    assert!(ledger.calls().await.is_empty());
}

#[tokio::test]
async fn test_output_classification() {
    let ledger = MemoryLedger::new();
    let ingest = ingestor(&ledger, false);
    let rpctx = raw(tx(
        "t1",
        vec![],
        vec![
            script_out(0, 1.0, "nonstandard"),
            script_out(1, 2.0, "zerocoinmint"),
            json!({
                "value": 3.0,
                "n": 2,
                "scriptPubKey": { "type": "pubkeyhash", "addresses": ["DFirst", "DSecond"] }
            }),
            json!({
                "value": 4.0,
                "n": 3,
                "scriptPubKey": { "type": "witness_v0_keyhash", "address": "DSingle" }
            }),
        ],
    ));

    ingest.add_pow(&block(10), &rpctx).await.unwrap();

    let nonstandard = ledger.utxo("t1:0").await.unwrap();
    assert_eq!(nonstandard.address, NON_STANDARD);
    assert_eq!(ledger.utxo("t1:1").await.unwrap().address, ZEROCOIN);
    assert_eq!(ledger.utxo("t1:2").await.unwrap().address, "DFirst");
    assert_eq!(ledger.utxo("t1:3").await.unwrap().address, "DSingle");

    let record = ledger.transaction("t1").await.unwrap();
    let shown: Vec<(u32, &str)> = record
        .vout
        .iter()
        .map(|o| (o.n, o.address.as_str()))
        .collect();
    assert_eq!(shown, vec![(1, ZEROCOIN), (2, "DFirst"), (3, "DSingle")]);
    assert!(record.vout.iter().all(|o| o.block_height == 10));
}

#[tokio::test]
async fn test_standard_output_without_address_is_nonstandard() {
    let ledger = MemoryLedger::new();
    let unit = ledger.begin().await.unwrap();
    let rpctx = raw(tx("t1", vec![], vec![script_out(0, 1.0, "pubkeyhash")]));

    let txout = vout(&*unit, &rpctx, 1).await.unwrap();

    assert!(txout.is_empty());
    unit.commit().await.unwrap();
    assert_eq!(ledger.utxo("t1:0").await.unwrap().address, NON_STANDARD);
}

#[tokio::test]
async fn test_two_outputs_round_trip() {
    let ledger = MemoryLedger::new();
    let ingest = ingestor(&ledger, false);
    let rpctx = raw(tx(
        "abc",
        vec![],
        vec![pay(0, 3.0, "DAlice"), pay(1, 2.5, "DBob")],
    ));

    ingest.add_pow(&block(100), &rpctx).await.unwrap();

    let record = ledger.transaction("abc").await.unwrap();
    assert_eq!(record.total_out(), dec("5.5"));
    assert_eq!(record.block_height, 100);
    assert_eq!(record.block_hash, block_hash(100));
    assert_eq!(record.created_at, block(100).created_at);

    let ids: Vec<String> = ledger.utxos().await.into_iter().map(|u| u.id).collect();
    assert_eq!(ids, vec!["abc:0".to_string(), "abc:1".to_string()]);
}

#[tokio::test]
async fn test_empty_stake_performs_no_writes() {
    let ledger = MemoryLedger::new();
    let ingest = ingestor(&ledger, true);

    let outcome = ingest
        .add_pos(&block(500), &raw(empty_stake("stake0")))
        .await
        .unwrap();

    assert_eq!(outcome, IngestOutcome::SkippedEmptyStake);
    assert!(ledger.calls().await.is_empty());
    assert_eq!(ledger.transaction_count().await, 0);
}

#[tokio::test]
async fn test_pos_reward_follows_classifier() {
    for reward in [true, false] {
        let ledger = MemoryLedger::new();
        let ingest = ingestor(&ledger, reward);

        let outcome = ingest
            .add_pos(&block(500), &raw(coinstake("cs", "staked", "DStaker", 10.0)))
            .await
            .unwrap();

        assert_eq!(outcome, IngestOutcome::Recorded);
        assert_eq!(ledger.transaction_count().await, 1);
        assert_eq!(ledger.transaction("cs").await.unwrap().is_reward, reward);
    }
}

#[tokio::test]
async fn test_pos_coinbase_with_value_is_recorded() {
    let ledger = MemoryLedger::new();
    let ingest = ingestor(&ledger, false);
    let rpctx = raw(tx("cb", vec![coinbase_input()], vec![pay(0, 5.0, "DMiner")]));

    let outcome = ingest.add_pos(&block(500), &rpctx).await.unwrap();

    assert_eq!(outcome, IngestOutcome::Recorded);
    assert!(ledger.transaction("cb").await.is_some());
}

#[tokio::test]
async fn test_pow_is_never_a_reward() {
    let ledger = MemoryLedger::new();
    let ingest = ingestor(&ledger, true);

    ingest
        .add_pow(&block(5), &raw(empty_stake("cb")))
        .await
        .unwrap();

    let record = ledger.transaction("cb").await.unwrap();
    assert!(!record.is_reward);
    assert_eq!(ledger.utxo("cb:0").await, None, "zero-value outputs stay out");
}

#[tokio::test]
async fn test_spend_retires_earlier_output() {
    let ledger = MemoryLedger::new();
    let ingest = ingestor(&ledger, false);

    ingest
        .add_pow(&block(1), &raw(tx("fund", vec![coinbase_input()], vec![pay(0, 50.0, "DAlice")])))
        .await
        .unwrap();
    assert_eq!(ledger.balance("DAlice").await, dec("50"));

    ingest
        .add_pow(
            &block(2),
            &raw(tx(
                "pay",
                vec![spend("fund", 0)],
                vec![pay(0, 20.0, "DBob"), pay(1, 29.9, "DAlice")],
            )),
        )
        .await
        .unwrap();

    assert_eq!(ledger.utxo("fund:0").await, None);
    assert_eq!(ledger.balance("DAlice").await, dec("29.9"));
    assert_eq!(ledger.balance("DBob").await, dec("20"));
}

#[tokio::test]
async fn test_out_of_order_block_is_rejected() {
    let ledger = MemoryLedger::new();
    let ingest = ingestor(&ledger, false);

    ingest
        .add_pow(&block(101), &raw(tx("later", vec![], vec![pay(0, 1.0, "DA")])))
        .await
        .unwrap();
    ledger.clear_calls().await;

    let err = ingest
        .add_pow(&block(100), &raw(tx("earlier", vec![], vec![pay(0, 1.0, "DA")])))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        IngestError::OutOfOrder {
            height: 100,
            last: 101
        }
    ));
    assert!(ledger.calls().await.is_empty());
    assert_eq!(ingest.last_height().await, Some(101));
}

#[tokio::test]
async fn test_same_height_is_accepted() {
    let ledger = MemoryLedger::new();
    let ingest = ingestor(&ledger, false);

    ingest
        .add_pow(&block(3), &raw(tx("a", vec![], vec![pay(0, 1.0, "DA")])))
        .await
        .unwrap();
    ingest
        .add_pow(&block(3), &raw(tx("b", vec![spend("a", 0)], vec![pay(0, 1.0, "DB")])))
        .await
        .unwrap();

    assert_eq!(ledger.transaction_count().await, 2);
    assert_eq!(ledger.utxo("a:0").await, None);
}

#[tokio::test]
async fn test_failed_create_rolls_back_utxo_changes() {
    let ledger = MemoryLedger::new();
    let ingest = ingestor(&ledger, false);

    ingest
        .add_pow(&block(1), &raw(tx("fund", vec![], vec![pay(0, 5.0, "DA")])))
        .await
        .unwrap();
    ingest
        .add_pow(&block(2), &raw(tx("spend", vec![spend("fund", 0)], vec![pay(0, 5.0, "DB")])))
        .await
        .unwrap();
    let before = ledger.utxos().await;

    // Reuses the txid "fund" with a fresh output index
    let err = ingest
        .add_pow(
            &block(3),
            &raw(tx("fund", vec![spend("spend", 0)], vec![pay(7, 5.0, "DC")])),
        )
        .await
        .unwrap_err();

    assert!(matches!(err, IngestError::Store(DbError::DuplicateKey(_))));
    assert_eq!(ledger.utxos().await, before);
    assert!(ledger.utxo("spend:0").await.is_some());
    assert_eq!(ledger.utxo("fund:7").await, None);
    assert_eq!(ingest.last_height().await, Some(2));
}

#[tokio::test]
async fn test_block_batch_commits_atomically() {
    let ledger = MemoryLedger::new();
    let ingest = ingestor(&ledger, false);
    let blk = block(9);

    let mut batch = ingest.begin_block(&blk).await.unwrap();
    batch
        .add_pow(&raw(tx("a", vec![coinbase_input()], vec![pay(0, 10.0, "DA")])))
        .await
        .unwrap();
    batch
        .add_pow(&raw(tx("b", vec![spend("a", 0)], vec![pay(0, 9.0, "DB")])))
        .await
        .unwrap();
    assert_eq!(batch.recorded(), 2);
    assert_eq!(
        ledger.transaction_count().await,
        0,
        "nothing is visible before commit"
    );

    assert_eq!(batch.complete().await.unwrap(), 2);

    assert_eq!(ledger.transaction_count().await, 2);
    assert_eq!(ledger.utxo("a:0").await, None);
    assert_eq!(ledger.balance("DB").await, dec("9"));
    let state = ledger.sync_state().await.unwrap().unwrap();
    assert_eq!(state.height, 9);
    assert_eq!(state.block_hash, block_hash(9));
}

#[tokio::test]
async fn test_failed_batch_is_abandoned() {
    let ledger = MemoryLedger::new();
    let ingest = ingestor(&ledger, false);
    let blk = block(4);

    let mut batch = ingest.begin_block(&blk).await.unwrap();
    batch
        .add_pow(&raw(tx("a", vec![], vec![pay(0, 1.0, "DA")])))
        .await
        .unwrap();
    batch
        .add_pow(&raw(tx("a", vec![], vec![pay(1, 1.0, "DA")])))
        .await
        .unwrap_err();

    let err = batch
        .add_pow(&raw(tx("b", vec![], vec![pay(0, 1.0, "DB")])))
        .await
        .unwrap_err();
    assert!(matches!(err, IngestError::Abandoned { height: 4 }));
    assert!(matches!(
        batch.complete().await,
        Err(IngestError::Abandoned { height: 4 })
    ));

    assert_eq!(ledger.transaction_count().await, 0);
    assert!(ledger.utxos().await.is_empty());
    assert_eq!(ledger.sync_state().await.unwrap(), None);
    assert_eq!(ingest.last_height().await, None);
}

#[tokio::test]
async fn test_resume_starts_from_sync_state() {
    let ledger = MemoryLedger::new();
    let blk = block(12);
    {
        let ingest = ingestor(&ledger, false);
        ingest.begin_block(&blk).await.unwrap().complete().await.unwrap();
    }

    let resumed = TxIngestor::resume(Arc::new(ledger.clone()), Arc::new(FixedClassifier(false)))
        .await
        .unwrap();
    assert_eq!(resumed.last_height().await, Some(12));
    assert!(resumed.begin_block(&block(11)).await.is_err());
}
