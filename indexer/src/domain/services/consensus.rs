use crate::domain::models::RpcBlock;

/// Decides whether a block goes down the proof-of-stake ingestion path
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsensusSchedule {
    first_pos_block: Option<u64>,
}

impl ConsensusSchedule {
    pub fn new(first_pos_block: Option<u64>) -> Self {
        Self { first_pos_block }
    }

    /// Block flags reported by the daemon take precedence over the configured
    /// switch-over height.
    pub fn is_proof_of_stake(&self, block: &RpcBlock) -> bool {
        if let Some(flags) = block.flags.as_deref() {
            if flags.contains("proof-of-stake") {
                return true;
            }
            if flags.contains("proof-of-work") {
                return false;
            }
        }

        self.first_pos_block
            .is_some_and(|first| block.height >= first)
    }
}
