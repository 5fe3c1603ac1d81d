use crate::{Action, ErrorKind, RequestId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Order type requested of the broker. Only `MARKET` is in scope.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum OrderType {
    Market,
}

crate::wire_enum!(OrderType {
    Market = 0 => "MARKET",
});

/// Whether an order opens, closes, or lets the broker decide (`AUTO`).
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum OpenClose {
    Open,
    Close,
    Auto,
}

crate::wire_enum!(OpenClose {
    Open = 0 => "OPEN",
    Close = 1 => "CLOSE",
    Auto = 2 => "AUTO",
});

/// Order time-in-force.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum TimeInForce {
    /// Immediate-or-cancel.
    Ioc,
    /// Rest-of-day.
    Rod,
    /// Fill-or-kill.
    Fok,
}

crate::wire_enum!(TimeInForce {
    Ioc = 0 => "IOC",
    Rod = 1 => "ROD",
    Fok = 2 => "FOK",
});

/// Day-trade flag carried on every [`OrderRequest`].
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum DayTrade {
    Yes,
    No,
}

crate::wire_enum!(DayTrade {
    Yes = 0 => "YES",
    No = 1 => "NO",
});

/// The longest opaque `note` field DGW accepts.
pub const MAX_NOTE_BYTES: usize = 64;

/// An order submission, internal to the pipeline and the exact payload DGW
/// receives on channel O for the `send_order` operation.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct OrderRequest {
    pub account: String,
    pub symbol: String,
    pub side: Action,
    pub order_type: OrderType,
    /// `0` for MARKET orders.
    #[serde(with = "crate::wire::decimal")]
    pub price: Decimal,
    pub quantity: u32,
    pub open_close: OpenClose,
    pub time_in_force: TimeInForce,
    pub day_trade: DayTrade,
    pub note: String,
    pub request_id: RequestId,
}

/// An [`OrderRequest`] carried a `note` longer than [`MAX_NOTE_BYTES`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("order note exceeds {MAX_NOTE_BYTES} bytes: {0} bytes")]
pub struct NoteTooLong(pub usize);

impl OrderRequest {
    pub fn validate(&self) -> Result<(), NoteTooLong> {
        if self.note.len() > MAX_NOTE_BYTES {
            Err(NoteTooLong(self.note.len()))
        } else {
            Ok(())
        }
    }
}

/// DGW's reply to a `send_order` request.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct OrderResponse {
    pub ok: bool,
    pub order_id: Option<String>,
    pub error_kind: Option<ErrorKind>,
    pub error_detail: Option<String>,
    pub request_id: RequestId,
}

impl OrderResponse {
    pub fn accepted(order_id: impl Into<String>, request_id: RequestId) -> Self {
        Self {
            ok: true,
            order_id: Some(order_id.into()),
            error_kind: None,
            error_detail: None,
            request_id,
        }
    }

    pub fn rejected(kind: ErrorKind, detail: impl Into<String>, request_id: RequestId) -> Self {
        Self {
            ok: false,
            order_id: None,
            error_kind: Some(kind),
            error_detail: Some(detail.into()),
            request_id,
        }
    }
}

/// An open broker position, returned by the `get_positions` operation.
/// Fields mirror the account/position data a broker callback typically
/// surfaces.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Position {
    pub account: String,
    pub symbol: String,
    pub side: Action,
    pub quantity: u32,
    #[serde(with = "crate::wire::decimal")]
    pub avg_price: Decimal,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn note_over_limit_is_rejected() {
        let mut req = sample();
        req.note = "x".repeat(65);
        assert!(req.validate().is_err());
    }

    #[test]
    fn note_at_limit_is_accepted() {
        let mut req = sample();
        req.note = "x".repeat(64);
        assert!(req.validate().is_ok());
    }

    fn sample() -> OrderRequest {
        OrderRequest {
            account: "ACC1".into(),
            symbol: "MXFF5".into(),
            side: Action::Buy,
            order_type: OrderType::Market,
            price: Decimal::ZERO,
            quantity: 1,
            open_close: OpenClose::Auto,
            time_in_force: TimeInForce::Ioc,
            day_trade: DayTrade::No,
            note: String::new(),
            request_id: RequestId::new(0, 0),
        }
    }
}
