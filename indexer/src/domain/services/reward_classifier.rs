use rust_decimal::Decimal;

use crate::domain::models::RawTransaction;

use super::script_classifier::ScriptKind;

/// Tags transactions that pay out staking or masternode rewards
pub trait ChainClassifier: Send + Sync {
    fn is_reward_raw_transaction(&self, rpctx: &RawTransaction) -> bool;
}

/// Recognizes coinstake transactions: a spend of the staked output whose
/// first output is the empty marker (`value == 0`, `nonstandard`), followed by
/// at least one paying output.
#[derive(Debug, Clone, Copy, Default)]
pub struct CoinstakeClassifier;

impl ChainClassifier for CoinstakeClassifier {
    fn is_reward_raw_transaction(&self, rpctx: &RawTransaction) -> bool {
        let Some(first_in) = rpctx.vin.first() else {
            return false;
        };
        if first_in.is_coinbase() || rpctx.vout.len() < 2 {
            return false;
        }

        let marker = &rpctx.vout[0];
        marker.value == Decimal::ZERO
            && ScriptKind::from_type(&marker.script_pub_key.kind) == ScriptKind::NonStandard
    }
}
