use std::fmt;
use std::str::FromStr;

use super::series::{BucketKey, format_float};
use crate::error::{Result, TripError};

/// Width in hours of an hour-of-day bucket, valid within `]0, 24]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HourStep {
    Int(i64),
    Float(f64),
}

impl HourStep {
    /// Checks that the step lies in `]0, 24]`.
    pub fn validate(self) -> Result<Self> {
        let width = self.as_f64();
        if width > 0.0 && width <= 24.0 {
            Ok(self)
        } else {
            Err(invalid_step(self))
        }
    }

    pub fn as_f64(self) -> f64 {
        match self {
            HourStep::Int(s) => s as f64,
            HourStep::Float(s) => s,
        }
    }

    /// Key of the bucket holding `hour`: `step * floor(hour / step)`.
    ///
    /// Float steps stay in `f64` throughout so arbitrarily small steps still
    /// give one bucket per distinct hour.
    pub fn bucket(self, hour: u32) -> BucketKey {
        match self {
            HourStep::Int(s) => BucketKey::Int(s * i64::from(hour).div_euclid(s)),
            HourStep::Float(s) => BucketKey::Float(s * floor_div(f64::from(hour), s)),
        }
    }
}

/// Floor division on floats computed from the remainder, so that e.g.
/// `3 // 0.1` is `29` like the exact quotient, not `30`.
fn floor_div(x: f64, step: f64) -> f64 {
    let rem = x % step;
    let div = (x - rem) / step;
    let floored = div.floor();
    if div - floored > 0.5 { floored + 1.0 } else { floored }
}

fn invalid_step(given: impl fmt::Display) -> TripError {
    TripError::InvalidParameter(format!(
        "step should int or float, and within ]0, 24]. {given} given."
    ))
}

impl fmt::Display for HourStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HourStep::Int(s) => write!(f, "{s}"),
            HourStep::Float(s) => f.write_str(&format_float(*s)),
        }
    }
}

impl From<i64> for HourStep {
    fn from(s: i64) -> Self {
        HourStep::Int(s)
    }
}

impl From<i32> for HourStep {
    fn from(s: i32) -> Self {
        HourStep::Int(s.into())
    }
}

impl From<u32> for HourStep {
    fn from(s: u32) -> Self {
        HourStep::Int(s.into())
    }
}

impl From<f64> for HourStep {
    fn from(s: f64) -> Self {
        HourStep::Float(s)
    }
}

impl FromStr for HourStep {
    type Err = TripError;

    /// Parses `"4"` as an integer step and `"2.5"` as a float step.
    ///
    /// Anything non-numeric or out of range fails, echoing the raw text.
    fn from_str(s: &str) -> Result<Self> {
        let text = s.trim();
        let step = text
            .parse::<i64>()
            .map(HourStep::Int)
            .or_else(|_| text.parse::<f64>().map(HourStep::Float))
            .map_err(|_| invalid_step(s))?;
        step.validate().map_err(|_| invalid_step(s))
    }
}
