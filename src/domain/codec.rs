//! Conversion between in-memory records and wire messages
//!
//! Every entity implements [`WireCodec`]. The conversion rules are the same
//! for all of them:
//!
//! - `from_wire` copies an optional wire field only when it is present and
//!   otherwise leaves the model field at its zero value
//! - `to_wire` emits every model field, omitting only unset object-typed
//!   fields (timestamps, referenced identifiers)
//! - `apply_update` overwrites the mutable fields that are present on the
//!   wire and never touches `id`, `created` or `creator`

use super::errors::MedrecordError;
use super::result::Result;
use super::wire::Timestamp;
use chrono::{DateTime, TimeZone, Utc};

/// Bidirectional conversion between a model and its wire message
pub trait WireCodec: Sized {
    /// Wire message type
    type Wire: prost::Message + Clone + Default + PartialEq + Send + Sync + 'static;

    /// Builds a model from its wire form
    ///
    /// # Errors
    ///
    /// Returns `InvalidIdentifier` for malformed identifier strings and
    /// `InvalidTimestamp` for out-of-range timestamps.
    fn from_wire(wire: &Self::Wire) -> Result<Self>;

    /// Renders the model as a wire message
    fn to_wire(&self) -> Self::Wire;

    /// Applies the mutable fields present in `wire` to this model
    ///
    /// # Errors
    ///
    /// Same failure modes as [`WireCodec::from_wire`]; the model is left
    /// untouched when an error is returned.
    fn apply_update(&mut self, wire: &Self::Wire) -> Result<()>;
}

/// Converts an instant to its wire form, exact to the nanosecond
pub fn timestamp_to_wire(instant: &DateTime<Utc>) -> Timestamp {
    Timestamp {
        seconds: instant.timestamp(),
        nanos: instant.timestamp_subsec_nanos() as i32,
    }
}

/// Converts a wire timestamp back to an instant
///
/// # Errors
///
/// Returns `InvalidTimestamp` when nanos fall outside `0..1_000_000_000`
/// or the seconds are outside chrono's range.
pub fn timestamp_from_wire(ts: &Timestamp) -> Result<DateTime<Utc>> {
    if !(0..1_000_000_000).contains(&ts.nanos) {
        return Err(MedrecordError::InvalidTimestamp(format!(
            "nanos {} out of range",
            ts.nanos
        )));
    }
    Utc.timestamp_opt(ts.seconds, ts.nanos as u32)
        .single()
        .ok_or_else(|| {
            MedrecordError::InvalidTimestamp(format!(
                "seconds={} nanos={} not representable",
                ts.seconds, ts.nanos
            ))
        })
}

/// Optional variant of [`timestamp_from_wire`]
pub fn optional_timestamp_from_wire(ts: Option<&Timestamp>) -> Result<Option<DateTime<Utc>>> {
    ts.map(timestamp_from_wire).transpose()
}

/// Optional variant of [`timestamp_to_wire`]
pub fn optional_timestamp_to_wire(instant: Option<&DateTime<Utc>>) -> Option<Timestamp> {
    instant.map(timestamp_to_wire)
}

/// Overwrites `target` when the wire carries a value
pub fn merge<T: Clone>(target: &mut T, incoming: &Option<T>) {
    if let Some(value) = incoming {
        *target = value.clone();
    }
}

/// Overwrites an optional timestamp when the wire carries one
pub fn merge_timestamp(
    target: &mut Option<DateTime<Utc>>,
    incoming: Option<&Timestamp>,
) -> Result<()> {
    if let Some(ts) = incoming {
        *target = Some(timestamp_from_wire(ts)?);
    }
    Ok(())
}

/// Passes through a wire reading only when it is a finite number
///
/// # Errors
///
/// Returns `Validation` for NaN and infinities, which JSON documents
/// cannot represent.
pub fn finite_from_wire(field: &str, value: Option<f64>) -> Result<Option<f64>> {
    match value {
        Some(v) if !v.is_finite() => Err(MedrecordError::Validation(format!(
            "{field} must be a finite number, got {v}"
        ))),
        other => Ok(other),
    }
}

/// Decodes an enumeration number, falling back to the zero variant
pub fn enum_from_wire<E>(value: Option<i32>) -> E
where
    E: TryFrom<i32> + Default,
{
    value
        .and_then(|v| E::try_from(v).ok())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timestamp_round_trip_non_epoch() {
        let ts = Timestamp {
            seconds: 1_696_733_104,
            nanos: 0,
        };
        let instant = timestamp_from_wire(&ts).unwrap();
        assert_eq!(timestamp_to_wire(&instant), ts);
    }

    #[test]
    fn test_timestamp_round_trip_epoch() {
        let ts = Timestamp::default();
        let instant = timestamp_from_wire(&ts).unwrap();
        assert_eq!(instant.timestamp(), 0);
        assert_eq!(timestamp_to_wire(&instant), ts);
    }

    #[test]
    fn test_timestamp_round_trip_nanos() {
        let ts = Timestamp {
            seconds: 1_700_000_000,
            nanos: 123_456_789,
        };
        let instant = timestamp_from_wire(&ts).unwrap();
        assert_eq!(instant.timestamp_subsec_nanos(), 123_456_789);
        assert_eq!(timestamp_to_wire(&instant), ts);
    }

    #[test]
    fn test_timestamp_rejects_bad_nanos() {
        let ts = Timestamp {
            seconds: 10,
            nanos: -1,
        };
        assert!(matches!(
            timestamp_from_wire(&ts),
            Err(MedrecordError::InvalidTimestamp(_))
        ));
        let ts = Timestamp {
            seconds: 10,
            nanos: 1_000_000_000,
        };
        assert!(timestamp_from_wire(&ts).is_err());
    }

    #[test]
    fn test_finite_from_wire() {
        assert_eq!(finite_from_wire("value", None).unwrap(), None);
        assert_eq!(finite_from_wire("value", Some(-4.5)).unwrap(), Some(-4.5));
        for bad in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            let err = finite_from_wire("value", Some(bad)).unwrap_err();
            assert!(matches!(err, MedrecordError::Validation(_)));
        }
    }

    #[test]
    fn test_merge_only_when_present() {
        let mut value = "kept".to_string();
        merge(&mut value, &None);
        assert_eq!(value, "kept");
        merge(&mut value, &Some(String::new()));
        assert_eq!(value, "");
    }
}
