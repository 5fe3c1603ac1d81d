use crate::Action;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

/// Opaque, unique key identifying a [`Condition`] in the external condition
/// repository that owns it.
#[derive(
    Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize, Serialize, derive_more::From,
)]
pub struct ConditionId(pub SmolStr);

impl ConditionId {
    pub fn new(id: impl Into<SmolStr>) -> Self {
        Self(id.into())
    }
}

impl std::fmt::Display for ConditionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A user-configured strategy rule. Pre-existing: not authored by the engine,
/// only consumed via the `ConditionStore` interface.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Condition {
    pub id: ConditionId,
    pub commodity_id: SmolStr,
    pub action: Action,
    #[serde(with = "crate::wire::decimal")]
    pub target_price: Decimal,
    #[serde(with = "crate::wire::decimal")]
    pub turning_point: Decimal,
    pub quantity: u32,
    #[serde(with = "crate::wire::decimal")]
    pub take_profit: Decimal,
    #[serde(with = "crate::wire::decimal")]
    pub stop_loss: Decimal,
    pub is_following: bool,
}

/// A [`Condition`] failed one of its construction invariants.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConditionError {
    #[error("quantity must be positive")]
    NonPositiveQuantity,
    #[error("take_profit must be > 0")]
    NonPositiveTakeProfit,
    #[error("stop_loss must be > 0")]
    NonPositiveStopLoss,
    #[error("turning_point must be non-negative")]
    NegativeTurningPoint,
}

impl Condition {
    pub fn new(
        id: ConditionId,
        commodity_id: impl Into<SmolStr>,
        action: Action,
        target_price: Decimal,
        turning_point: Decimal,
        quantity: u32,
        take_profit: Decimal,
        stop_loss: Decimal,
        is_following: bool,
    ) -> Result<Self, ConditionError> {
        if quantity == 0 {
            return Err(ConditionError::NonPositiveQuantity);
        }
        if take_profit <= Decimal::ZERO {
            return Err(ConditionError::NonPositiveTakeProfit);
        }
        if stop_loss <= Decimal::ZERO {
            return Err(ConditionError::NonPositiveStopLoss);
        }
        if turning_point < Decimal::ZERO {
            return Err(ConditionError::NegativeTurningPoint);
        }
        Ok(Self {
            id,
            commodity_id: commodity_id.into(),
            action,
            target_price,
            turning_point,
            quantity,
            take_profit,
            stop_loss,
            is_following,
        })
    }

    /// The entry trigger price: `target_price + turning_point` for BUY,
    /// `target_price - turning_point` for SELL.
    pub fn entry_trigger(&self) -> Decimal {
        match self.action {
            Action::Buy => self.target_price + self.turning_point,
            Action::Sell => self.target_price - self.turning_point,
        }
    }
}

/// SE-owned, per-[`Condition`] runtime state. Never persisted, never shared
/// outside the Strategy Engine process.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ConditionRuntimeState {
    pub armed: bool,
    pub in_position: bool,
    #[serde(with = "crate::wire::decimal::option")]
    pub entry_price: Option<Decimal>,
    pub position_side: Option<Action>,
    #[serde(with = "crate::wire::decimal::option")]
    pub last_observed_price: Option<Decimal>,
}

impl Default for ConditionRuntimeState {
    fn default() -> Self {
        Self {
            armed: true,
            in_position: false,
            entry_price: None,
            position_side: None,
            last_observed_price: None,
        }
    }
}
