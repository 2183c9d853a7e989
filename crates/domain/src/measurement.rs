use std::{fmt, ops::Mul};

use derive_more::{Display, Into};

#[derive(Debug, Default, Display, Clone, Copy, Into, PartialEq, Eq, PartialOrd, Ord)]
pub struct Reps(u32);

impl Reps {
    pub const ONE: Reps = Reps(1);

    pub fn new(value: u32) -> Result<Self, RepsError> {
        if !(0..1000).contains(&value) {
            return Err(RepsError::OutOfRange);
        }

        Ok(Self(value))
    }

    /// Adjust by a signed delta, saturating at the valid range.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn saturating_add(self, delta: i32) -> Self {
        Self((i64::from(self.0) + i64::from(delta)).clamp(0, 999) as u32)
    }
}

impl TryFrom<&str> for Reps {
    type Error = RepsError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.parse::<u32>() {
            Ok(parsed_value) => Reps::new(parsed_value),
            Err(_) => Err(RepsError::ParseError),
        }
    }
}

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum RepsError {
    #[error("Reps must be in the range 0 to 999")]
    OutOfRange,
    #[error("Reps must be an integer")]
    ParseError,
}

#[derive(Debug, Default, Display, Clone, Copy, Into, PartialEq, PartialOrd)]
pub struct Weight(f32);

impl Weight {
    pub fn new(value: f32) -> Result<Self, WeightError> {
        if !(0.0..1000.0).contains(&value) {
            return Err(WeightError::OutOfRange);
        }

        let tenths = value * 10.0;
        if (tenths - tenths.round()).abs() > 0.001 {
            return Err(WeightError::InvalidResolution);
        }

        Ok(Self(value))
    }

    /// Adjust by a signed delta, saturating at the valid range.
    ///
    /// The result is snapped to the 0.1 resolution.
    #[must_use]
    pub fn saturating_add(self, delta: f32) -> Self {
        let value = (self.0 + delta).clamp(0.0, 999.9);
        Self((value * 10.0).round() / 10.0)
    }
}

impl TryFrom<&str> for Weight {
    type Error = WeightError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.parse::<f32>() {
            Ok(parsed_value) => Weight::new(parsed_value),
            Err(_) => Err(WeightError::ParseError),
        }
    }
}

/// Volume of a set (weight times repetitions).
impl Mul<Reps> for Weight {
    type Output = f32;

    #[allow(clippy::cast_precision_loss)]
    fn mul(self, rhs: Reps) -> Self::Output {
        self.0 * rhs.0 as f32
    }
}

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum WeightError {
    #[error("Weight must be in the range 0.0 to 999.9")]
    OutOfRange,
    #[error("Weight must be a multiple of 0.1")]
    InvalidResolution,
    #[error("Weight must be a decimal")]
    ParseError,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, PartialOrd)]
pub struct Rpe(u8);

impl Rpe {
    pub const EIGHT: Rpe = Rpe(80);
    pub const TEN: Rpe = Rpe(100);

    pub fn new(value: f32) -> Result<Self, RpeError> {
        if !(0.0..=10.0).contains(&value) {
            return Err(RpeError::OutOfRange);
        }

        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let v = (value * 10.0) as u8;

        if v % 5 != 0 {
            return Err(RpeError::InvalidResolution);
        }

        Ok(Self(v))
    }
}

impl From<Rpe> for f32 {
    fn from(value: Rpe) -> Self {
        f32::from(value.0) / 10.0
    }
}

impl TryFrom<&str> for Rpe {
    type Error = RpeError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.parse::<f32>() {
            Ok(parsed_value) => Rpe::new(parsed_value),
            Err(_) => Err(RpeError::ParseError),
        }
    }
}

impl fmt::Display for Rpe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", f32::from(*self))
    }
}

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum RpeError {
    #[error("RPE must be in the range 0.0 to 10.0")]
    OutOfRange,
    #[error("RPE must be a multiple of 0.5")]
    InvalidResolution,
    #[error("RPE must be a decimal")]
    ParseError,
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(0, Ok(Reps(0)))]
    #[case(999, Ok(Reps(999)))]
    #[case(1000, Err(RepsError::OutOfRange))]
    fn test_reps_new(#[case] input: u32, #[case] expected: Result<Reps, RepsError>) {
        assert_eq!(Reps::new(input), expected);
    }

    #[rstest]
    #[case("0", Ok(Reps(0)))]
    #[case("999", Ok(Reps(999)))]
    #[case("1000", Err(RepsError::OutOfRange))]
    #[case("4.", Err(RepsError::ParseError))]
    #[case("", Err(RepsError::ParseError))]
    fn test_reps_from_str(#[case] input: &str, #[case] expected: Result<Reps, RepsError>) {
        assert_eq!(Reps::try_from(input), expected);
    }

    #[rstest]
    #[case(Reps(5), 1, Reps(6))]
    #[case(Reps(5), -1, Reps(4))]
    #[case(Reps(0), -1, Reps(0))]
    #[case(Reps(999), 1, Reps(999))]
    fn test_reps_saturating_add(#[case] reps: Reps, #[case] delta: i32, #[case] expected: Reps) {
        assert_eq!(reps.saturating_add(delta), expected);
    }

    #[rstest]
    #[case(Reps(8), "8")]
    fn test_reps_display(#[case] input: Reps, #[case] expected: &str) {
        assert_eq!(input.to_string(), expected);
    }

    #[rstest]
    #[case(0.0, Ok(Weight(0.0)))]
    #[case(999.9, Ok(Weight(999.9)))]
    #[case(1000.0, Err(WeightError::OutOfRange))]
    #[case(-2.5, Err(WeightError::OutOfRange))]
    #[case(1.23, Err(WeightError::InvalidResolution))]
    fn test_weight_new(#[case] input: f32, #[case] expected: Result<Weight, WeightError>) {
        assert_eq!(Weight::new(input), expected);
    }

    #[rstest]
    #[case("2.0", Ok(Weight(2.0)))]
    #[case("4.", Ok(Weight(4.0)))]
    #[case("8", Ok(Weight(8.0)))]
    #[case("1000", Err(WeightError::OutOfRange))]
    #[case("", Err(WeightError::ParseError))]
    fn test_weight_from_str(#[case] input: &str, #[case] expected: Result<Weight, WeightError>) {
        assert_eq!(Weight::try_from(input), expected);
    }

    #[rstest]
    #[case(Weight(100.0), 2.5, Weight(102.5))]
    #[case(Weight(100.0), -5.0, Weight(95.0))]
    #[case(Weight(2.5), -5.0, Weight(0.0))]
    #[case(Weight(999.9), 2.5, Weight(999.9))]
    fn test_weight_saturating_add(
        #[case] weight: Weight,
        #[case] delta: f32,
        #[case] expected: Weight,
    ) {
        assert_eq!(weight.saturating_add(delta), expected);
    }

    #[rstest]
    #[case(Weight(100.0), Reps(10), 1000.0)]
    #[case(Weight(62.5), Reps(4), 250.0)]
    #[case(Weight(100.0), Reps(0), 0.0)]
    fn test_weight_mul_reps(#[case] weight: Weight, #[case] reps: Reps, #[case] expected: f32) {
        assert_eq!(weight * reps, expected);
    }

    #[rstest]
    #[case(Weight(2.0), "2")]
    #[case(Weight(8.4), "8.4")]
    fn test_weight_display(#[case] input: Weight, #[case] expected: &str) {
        assert_eq!(input.to_string(), expected);
    }

    #[rstest]
    #[case(0.0, Ok(Rpe(0)))]
    #[case(8.0, Ok(Rpe::EIGHT))]
    #[case(9.5, Ok(Rpe(95)))]
    #[case(10.0, Ok(Rpe::TEN))]
    #[case(10.5, Err(RpeError::OutOfRange))]
    #[case(9.2, Err(RpeError::InvalidResolution))]
    fn test_rpe_new(#[case] input: f32, #[case] expected: Result<Rpe, RpeError>) {
        assert_eq!(Rpe::new(input), expected);
    }

    #[rstest]
    #[case("8", Ok(Rpe::EIGHT))]
    #[case("9.5", Ok(Rpe(95)))]
    #[case("11", Err(RpeError::OutOfRange))]
    #[case("9.2", Err(RpeError::InvalidResolution))]
    #[case("", Err(RpeError::ParseError))]
    fn test_rpe_from_str(#[case] input: &str, #[case] expected: Result<Rpe, RpeError>) {
        assert_eq!(Rpe::try_from(input), expected);
    }

    #[rstest]
    #[case(Rpe::EIGHT, "8")]
    #[case(Rpe(95), "9.5")]
    fn test_rpe_display(#[case] input: Rpe, #[case] expected: &str) {
        assert_eq!(input.to_string(), expected);
    }
}
