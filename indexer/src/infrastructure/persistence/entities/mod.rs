pub mod sync_state;
pub mod transactions;
pub mod utxos;
