pub mod sync_state_repository;
pub mod transaction_repository;
pub mod utxo_repository;

pub use transaction_repository::TransactionRepository;
pub use utxo_repository::UtxoRepository;

/// Collection of all repositories
pub struct Repositories {
    /// Repository for transaction records
    pub transaction: TransactionRepository,
    /// Repository for unspent outputs
    pub utxo: UtxoRepository,
}

impl Repositories {
    /// Create a new Repositories instance
    pub fn new(transaction: TransactionRepository, utxo: UtxoRepository) -> Self {
        Self { transaction, utxo }
    }
}
