pub mod consensus;
pub mod reward_classifier;
pub mod script_classifier;
pub mod tx_ingestor;
pub mod tx_lookup;

pub use consensus::ConsensusSchedule;
pub use reward_classifier::{ChainClassifier, CoinstakeClassifier};
pub use script_classifier::{
    classify_output, Destination, RecordInclusionPolicy, ScriptKind, UtxoInclusionPolicy,
    NON_STANDARD, ZEROCOIN,
};
pub use tx_ingestor::{is_empty_stake, vin, vout, BlockBatch, IngestOutcome, TxIngestor};
pub use tx_lookup::TxLookup;
