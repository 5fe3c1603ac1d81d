use crate::{Action, ConditionId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

/// A strategy-emitted instruction to enter or exit a position.
///
/// Emitted only on a [`crate::Condition`] transition from armed-and-waiting
/// to entry, or from in-position to exit.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct TradingSignal {
    #[serde(with = "crate::wire::timestamp")]
    pub when: DateTime<Utc>,
    pub operation: Action,
    pub commodity_id: SmolStr,
    pub condition_id: ConditionId,
    pub quantity: u32,
}
