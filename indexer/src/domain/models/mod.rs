pub mod block;
pub mod raw_transaction;
pub mod transaction;
pub mod utxo;

pub use block::{Block, RpcBlock, SyncState};
pub use raw_transaction::{RawInput, RawOutput, RawTransaction, ScriptPubKey};
pub use transaction::{TransactionInput, TransactionOutput, TransactionRecord};
pub use utxo::{utxo_key, UtxoEntry};
