//! Non-fatal advisories raised while simulating.

use std::fmt;

use chrono::NaiveDateTime;
use serde::Serialize;
use tracing::warn;

/// Direction of a battery operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Charge,
    Discharge,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Charge => f.write_str("charge"),
            Self::Discharge => f.write_str("discharge"),
        }
    }
}

/// A non-fatal condition the caller may want to inspect.
///
/// Advisories never interrupt a run: the simulator degrades into a clamped
/// or imperfect result and reports what happened here.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Advisory {
    /// A requested energy exceeded the technical limits or was negative.
    ClampedValue {
        datetime: NaiveDateTime,
        direction: Direction,
        requested_kwh: f64,
        applied_kwh: f64,
    },
    /// The post-hoc check found the resulting curve above the limit.
    ObjectiveNotMet { limit_kw: f64, peak_kw: f64 },
    /// The sizing probe emptied the oversized battery, so the derived
    /// capacity is a lower bound only.
    SentinelExhausted { sentinel_kwh: f64 },
}

impl Advisory {
    /// Emits the advisory as a `tracing` warning and hands it back.
    pub(crate) fn emit(self) -> Self {
        warn!("{self}");
        self
    }
}

impl fmt::Display for Advisory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ClampedValue {
                datetime,
                direction,
                requested_kwh,
                applied_kwh,
            } => write!(
                f,
                "{datetime}: requested {direction} of {requested_kwh:.3} kWh clamped to {applied_kwh:.3} kWh"
            ),
            Self::ObjectiveNotMet { limit_kw, peak_kw } => write!(
                f,
                "limit of {limit_kw:.2} kW was not held, resulting peak is {peak_kw:.2} kW"
            ),
            Self::SentinelExhausted { sentinel_kwh } => write!(
                f,
                "sizing probe emptied the {sentinel_kwh:.0} kWh sentinel, capacity is undercounted"
            ),
        }
    }
}
