//! Binary wire codec: MessagePack payloads plus the custom extensions
//! needed for exact-precision timestamps, decimals and forward-compatible
//! enums.

use chrono::{DateTime, TimeZone, Utc};
use rust_decimal::Decimal;
use serde::{de::DeserializeOwned, Serialize};

/// A channel frame failed to encode or decode. Never panics on truncated
/// input; always surfaces as this error instead.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error("encode failed: {0}")]
    Encode(#[from] rmp_serde::encode::Error),
    #[error("decode failed: {0}")]
    Decode(#[from] rmp_serde::decode::Error),
    #[error("unexpected topic: expected {expected}, got {actual}")]
    UnexpectedTopic { expected: String, actual: String },
}

/// Encodes `value` to MessagePack bytes.
pub fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>, CodecError> {
    rmp_serde::to_vec_named(value).map_err(CodecError::from)
}

/// Decodes MessagePack bytes produced by [`encode`]. Returns [`CodecError`]
/// rather than panicking on truncated or malformed input.
pub fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, CodecError> {
    rmp_serde::from_slice(bytes).map_err(CodecError::from)
}

/// The multipart frame layout of the tick and signal channels: `[topic_bytes,
/// payload_bytes]`. The order channel's request/reply frames carry only the
/// payload (the operation name lives inside the payload envelope).
pub fn encode_frame<T: Serialize>(topic: &str, value: &T) -> Result<(Vec<u8>, Vec<u8>), CodecError> {
    Ok((topic.as_bytes().to_vec(), encode(value)?))
}

/// Decodes a `[topic_bytes, payload_bytes]` frame, checking `expected_topic`.
pub fn decode_frame<T: DeserializeOwned>(
    expected_topic: &str,
    topic_bytes: &[u8],
    payload_bytes: &[u8],
) -> Result<T, CodecError> {
    let actual = String::from_utf8_lossy(topic_bytes);
    if actual != expected_topic {
        return Err(CodecError::UnexpectedTopic {
            expected: expected_topic.to_string(),
            actual: actual.to_string(),
        });
    }
    decode(payload_bytes)
}

/// Implements `Serialize`/`Deserialize` for a simple C-like enum so it always
/// *encodes* as its stable string name, but *decodes* from either the string
/// name or the versioned integer tag, so older and newer senders stay
/// interoperable.
#[macro_export]
macro_rules! wire_enum {
    ($name:ident { $($variant:ident = $tag:expr => $str:expr),+ $(,)? }) => {
        impl serde::Serialize for $name {
            fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
            where
                S: serde::Serializer,
            {
                let s = match self {
                    $(Self::$variant => $str,)+
                };
                serializer.serialize_str(s)
            }
        }

        impl<'de> serde::Deserialize<'de> for $name {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: serde::Deserializer<'de>,
            {
                struct EnumVisitor;

                impl<'de> serde::de::Visitor<'de> for EnumVisitor {
                    type Value = $name;

                    fn expecting(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                        write!(f, "a {} name or integer tag", stringify!($name))
                    }

                    fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
                    where
                        E: serde::de::Error,
                    {
                        match v {
                            $($str => Ok($name::$variant),)+
                            other => Err(E::custom(format!(
                                concat!("unknown ", stringify!($name), " name: {}"),
                                other
                            ))),
                        }
                    }

                    fn visit_u64<E>(self, v: u64) -> Result<Self::Value, E>
                    where
                        E: serde::de::Error,
                    {
                        match v {
                            $($tag => Ok($name::$variant),)+
                            other => Err(E::custom(format!(
                                concat!("unknown ", stringify!($name), " tag: {}"),
                                other
                            ))),
                        }
                    }
                }

                deserializer.deserialize_any(EnumVisitor)
            }
        }
    };
}

/// Wire shape for [`Decimal`]: `{scale: u8, mantissa: i64}`.
///
/// Used via `#[serde(with = "crate::wire::decimal")]` on any field that must
/// cross the wire in this exact representation.
pub mod decimal {
    use super::*;
    use serde::{Deserialize, Deserializer, Serializer};

    #[derive(Serialize, Deserialize)]
    struct DecimalWire {
        scale: u8,
        mantissa: i64,
    }

    /// [`Decimal`] failed to convert to the `{scale, mantissa}` wire shape
    /// (mantissa overflowed `i64`).
    #[derive(Debug, thiserror::Error)]
    #[error("decimal mantissa overflows i64 at scale {scale}")]
    pub struct MantissaOverflow {
        scale: u32,
    }

    pub fn to_wire(value: &Decimal) -> Result<(u8, i64), MantissaOverflow> {
        let scale = value.scale();
        let mantissa = i64::try_from(value.mantissa()).map_err(|_| MantissaOverflow { scale })?;
        Ok((scale as u8, mantissa))
    }

    pub fn from_wire(scale: u8, mantissa: i64) -> Decimal {
        Decimal::new(mantissa, scale as u32)
    }

    pub fn serialize<S>(value: &Decimal, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let (scale, mantissa) = to_wire(value).map_err(serde::ser::Error::custom)?;
        DecimalWire { scale, mantissa }.serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Decimal, D::Error>
    where
        D: Deserializer<'de>,
    {
        let wire = DecimalWire::deserialize(deserializer)?;
        Ok(from_wire(wire.scale, wire.mantissa))
    }

    pub mod option {
        use super::*;

        pub fn serialize<S>(value: &Option<Decimal>, serializer: S) -> Result<S::Ok, S::Error>
        where
            S: Serializer,
        {
            match value {
                Some(d) => super::serialize(d, serializer),
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Decimal>, D::Error>
        where
            D: Deserializer<'de>,
        {
            let wire: Option<DecimalWire> = Option::deserialize(deserializer)?;
            Ok(wire.map(|w| from_wire(w.scale, w.mantissa)))
        }
    }
}

/// Wire shape for [`DateTime<Utc>`]: 64-bit microseconds since the UNIX
/// epoch, UTC.
///
/// Used via `#[serde(with = "crate::wire::timestamp")]`.
pub mod timestamp {
    use super::*;
    use serde::{Deserializer, Serializer};

    pub fn to_micros(value: &DateTime<Utc>) -> i64 {
        value.timestamp_micros()
    }

    pub fn from_micros(micros: i64) -> DateTime<Utc> {
        Utc.timestamp_micros(micros).single().unwrap_or_else(Utc::now)
    }

    pub fn serialize<S>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_i64(to_micros(value))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let micros = i64::deserialize(deserializer)?;
        Ok(from_micros(micros))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Action, ConditionId, TradingSignal};
    use rust_decimal_macros::dec;

    #[test]
    fn decimal_wire_round_trips() {
        let value = dec!(22035.50);
        let (scale, mantissa) = decimal::to_wire(&value).unwrap();
        assert_eq!(decimal::from_wire(scale, mantissa), value);
    }

    #[test]
    fn timestamp_wire_round_trips_to_microsecond_precision() {
        let now = Utc::now();
        let micros = timestamp::to_micros(&now);
        let back = timestamp::from_micros(micros);
        assert_eq!(back.timestamp_micros(), now.timestamp_micros());
    }

    #[test]
    fn trading_signal_round_trips_through_codec() {
        let signal = TradingSignal {
            when: Utc::now(),
            operation: Action::Buy,
            commodity_id: "MXFF5".into(),
            condition_id: ConditionId::new("c1"),
            quantity: 1,
        };
        let bytes = encode(&signal).unwrap();
        let decoded: TradingSignal = decode(&bytes).unwrap();
        assert_eq!(decoded, signal);
    }

    #[test]
    fn decode_on_truncated_payload_yields_codec_error_without_panic() {
        let signal = TradingSignal {
            when: Utc::now(),
            operation: Action::Buy,
            commodity_id: "MXFF5".into(),
            condition_id: ConditionId::new("c1"),
            quantity: 1,
        };
        let mut bytes = encode(&signal).unwrap();
        bytes.truncate(bytes.len() / 2);
        let result: Result<TradingSignal, _> = decode(&bytes);
        assert!(result.is_err());
    }

    #[test]
    fn frame_round_trips_and_rejects_wrong_topic() {
        let signal = TradingSignal {
            when: Utc::now(),
            operation: Action::Sell,
            commodity_id: "WINFG".into(),
            condition_id: ConditionId::new("c2"),
            quantity: 2,
        };
        let (topic, payload) = encode_frame("SIGNAL", &signal).unwrap();
        let decoded: TradingSignal = decode_frame("SIGNAL", &topic, &payload).unwrap();
        assert_eq!(decoded, signal);

        let err = decode_frame::<TradingSignal>("TICK", &topic, &payload);
        assert!(err.is_err());
    }
}
