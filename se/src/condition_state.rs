use pipeline_model::{Action, Condition, ConditionId, ConditionRuntimeState};
use rust_decimal::Decimal;
use tracing::debug;

/// Internal phase of a condition's position cycle. Broader than
/// [`ConditionRuntimeState`]'s `armed`/`in_position` pair: this is what
/// actually drives the transitions, `snapshot()` projects it down to the
/// public shape spec.md §3 defines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Armed,
    Triggered,
    InPosition,
    Closed,
}

/// One [`Condition`]'s live state machine (spec.md §4.B). Owns a drifting
/// copy of `target_price` (mutated only when `is_following`) separately
/// from the immutable [`Condition`] SE was handed by the condition store.
#[derive(Debug, Clone)]
pub struct ConditionState {
    condition: Condition,
    phase: Phase,
    /// `trigger_low` for BUY conditions, `trigger_high` for SELL.
    trigger_ref: Option<Decimal>,
    target_price: Decimal,
    entry_price: Option<Decimal>,
    last_observed_price: Option<Decimal>,
}

impl ConditionState {
    pub fn new(condition: Condition) -> Self {
        let target_price = condition.target_price;
        Self {
            condition,
            phase: Phase::Armed,
            trigger_ref: None,
            target_price,
            entry_price: None,
            last_observed_price: None,
        }
    }

    pub fn condition_id(&self) -> &ConditionId {
        &self.condition.id
    }

    pub fn commodity_id(&self) -> &str {
        &self.condition.commodity_id
    }

    pub fn quantity(&self) -> u32 {
        self.condition.quantity
    }

    /// A read-only projection matching the public [`ConditionRuntimeState`]
    /// shape spec.md §3 defines.
    pub fn snapshot(&self) -> ConditionRuntimeState {
        ConditionRuntimeState {
            armed: matches!(self.phase, Phase::Armed | Phase::Triggered),
            in_position: matches!(self.phase, Phase::InPosition),
            entry_price: self.entry_price,
            position_side: matches!(self.phase, Phase::InPosition).then_some(self.condition.action),
            last_observed_price: self.last_observed_price,
        }
    }

    pub fn is_closed(&self) -> bool {
        matches!(self.phase, Phase::Closed)
    }

    /// Feeds one already-deduplicated price observation through the state
    /// machine. Returns the [`Action`] to emit a [`pipeline_model::TradingSignal`]
    /// for, if this tick caused a transition that spec.md §4.B says emits one.
    ///
    /// At most one transition is evaluated per call, matching the tick-by-tick
    /// evaluation spec.md §4.B's contract describes (one poll iteration, one
    /// pass through each matching condition).
    pub fn on_price(&mut self, price: Decimal) -> Option<Action> {
        self.last_observed_price = Some(price);
        match self.condition.action {
            Action::Buy => self.on_price_buy(price),
            Action::Sell => self.on_price_sell(price),
        }
    }

    fn on_price_buy(&mut self, price: Decimal) -> Option<Action> {
        match self.phase {
            Phase::Armed => {
                if price <= self.target_price {
                    self.phase = Phase::Triggered;
                    self.trigger_ref = Some(price);
                    debug!(
                        event = "condition.triggered",
                        condition_id = %self.condition.id,
                        price = %price,
                        static_entry_trigger = %self.condition.entry_trigger(),
                        "armed condition triggered"
                    );
                }
                None
            }
            Phase::Triggered => {
                let trigger_low = self.trigger_ref.expect("Triggered always carries trigger_ref");
                if self.condition.is_following && price < trigger_low {
                    self.trigger_ref = Some(price);
                    self.target_price = price;
                    return None;
                }
                if price >= trigger_low + self.condition.turning_point {
                    self.phase = Phase::InPosition;
                    self.entry_price = Some(price);
                    return Some(Action::Buy);
                }
                None
            }
            Phase::InPosition => {
                let entry = self.entry_price.expect("InPosition always carries entry_price");
                if price >= entry + self.condition.take_profit || price <= entry - self.condition.stop_loss {
                    self.phase = Phase::Closed;
                    return Some(Action::Sell);
                }
                None
            }
            Phase::Closed => None,
        }
    }

    fn on_price_sell(&mut self, price: Decimal) -> Option<Action> {
        match self.phase {
            Phase::Armed => {
                if price >= self.target_price {
                    self.phase = Phase::Triggered;
                    self.trigger_ref = Some(price);
                    debug!(
                        event = "condition.triggered",
                        condition_id = %self.condition.id,
                        price = %price,
                        static_entry_trigger = %self.condition.entry_trigger(),
                        "armed condition triggered"
                    );
                }
                None
            }
            Phase::Triggered => {
                let trigger_high = self.trigger_ref.expect("Triggered always carries trigger_ref");
                if self.condition.is_following && price > trigger_high {
                    self.trigger_ref = Some(price);
                    self.target_price = price;
                    return None;
                }
                if price <= trigger_high - self.condition.turning_point {
                    self.phase = Phase::InPosition;
                    self.entry_price = Some(price);
                    return Some(Action::Sell);
                }
                None
            }
            Phase::InPosition => {
                let entry = self.entry_price.expect("InPosition always carries entry_price");
                if price <= entry - self.condition.take_profit || price >= entry + self.condition.stop_loss {
                    self.phase = Phase::Closed;
                    return Some(Action::Buy);
                }
                None
            }
            Phase::Closed => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn buy_condition(is_following: bool) -> Condition {
        Condition::new(
            ConditionId::new("c1"),
            "MXFF5",
            Action::Buy,
            dec!(22000),
            dec!(30),
            1,
            dec!(120),
            dec!(30),
            is_following,
        )
        .unwrap()
    }

    #[test]
    fn scenario_1_clean_buy_cycle() {
        let mut state = ConditionState::new(buy_condition(false));
        assert_eq!(state.on_price(dec!(22010)), None);
        assert_eq!(state.on_price(dec!(21995)), None); // Armed -> Triggered
        assert_eq!(state.on_price(dec!(21980)), None);
        assert_eq!(state.on_price(dec!(22035)), Some(Action::Buy)); // entry
        assert_eq!(state.on_price(dec!(22160)), Some(Action::Sell)); // take-profit
        assert!(state.is_closed());
    }

    #[test]
    fn scenario_2_following_down_entry() {
        let mut state = ConditionState::new(buy_condition(true));
        assert_eq!(state.on_price(dec!(21995)), None); // Armed -> Triggered, trigger_low=21995
        assert_eq!(state.on_price(dec!(21980)), None); // follow-down, trigger_low=21980
        assert_eq!(state.on_price(dec!(21950)), None); // follow-down, trigger_low=21950
        assert_eq!(state.on_price(dec!(21985)), Some(Action::Buy)); // 21985 >= 21950+30
        let snapshot = state.snapshot();
        assert_eq!(snapshot.entry_price, Some(dec!(21985)));
    }

    #[test]
    fn scenario_3_stop_loss_before_take_profit() {
        let mut state = ConditionState::new(buy_condition(false));
        assert_eq!(state.on_price(dec!(21995)), None);
        assert_eq!(state.on_price(dec!(22035)), Some(Action::Buy));
        assert_eq!(state.on_price(dec!(21990)), Some(Action::Sell)); // stop-loss: 22035-30=22005 >= 21990
    }

    #[test]
    fn sell_side_mirrors_buy_with_inverted_comparisons() {
        let condition = Condition::new(
            ConditionId::new("c2"),
            "WINFG",
            Action::Sell,
            dec!(22000),
            dec!(30),
            1,
            dec!(120),
            dec!(30),
            false,
        )
        .unwrap();
        let mut state = ConditionState::new(condition);
        assert_eq!(state.on_price(dec!(22005)), None); // Armed -> Triggered, trigger_high=22005
        assert_eq!(state.on_price(dec!(21980)), None); // 21980 <= 22005-30=21975? no
        assert_eq!(state.on_price(dec!(21970)), Some(Action::Sell)); // 21970 <= 21975
    }

    #[test]
    fn turning_point_zero_enters_on_touch() {
        let condition = Condition::new(
            ConditionId::new("c3"),
            "MXFF5",
            Action::Buy,
            dec!(22000),
            dec!(0),
            1,
            dec!(120),
            dec!(30),
            false,
        )
        .unwrap();
        let mut state = ConditionState::new(condition);
        assert_eq!(state.on_price(dec!(22000)), None); // Armed -> Triggered, trigger_low=22000
        assert_eq!(state.on_price(dec!(22000)), Some(Action::Buy)); // entry on touch
    }

    #[test]
    fn boundary_prices_are_inclusive() {
        let mut state = ConditionState::new(buy_condition(false));
        assert_eq!(state.on_price(dec!(22000)), None); // p == target_price triggers (inclusive)
        assert_eq!(state.on_price(dec!(22030)), Some(Action::Buy)); // p == trigger_low + turning_point
        assert_eq!(state.on_price(dec!(22150)), Some(Action::Sell)); // p == entry_price + take_profit
    }

    #[test]
    fn closed_is_terminal() {
        let mut state = ConditionState::new(buy_condition(false));
        state.on_price(dec!(21995));
        state.on_price(dec!(22035));
        state.on_price(dec!(22160));
        assert!(state.is_closed());
        assert_eq!(state.on_price(dec!(1)), None);
        assert_eq!(state.on_price(dec!(99999)), None);
    }
}
