use std::{
    fmt::Display,
    iter::Sum,
    ops::{Add, Mul, Neg, Sub, SubAssign},
};

use serde::{Deserialize, Serialize};
use sqlx::Type;
use thiserror::Error;

use crate::op;

pub const INR_CURRENCY_CODE: &str = "INR";
pub const PAISE_PER_RUPEE: i64 = 100;

//--------------------------------------      Rupees       -----------------------------------------------------------
/// A monetary amount in Indian Rupees, stored as an integer number of paise (the payment gateway's
/// minor unit). Serialized and persisted as paise to avoid floating-point drift.
#[derive(Debug, Clone, Copy, Default, Type, Ord, PartialOrd, Serialize, Deserialize)]
#[sqlx(transparent)]
pub struct Rupees(i64);

op!(binary Rupees, Add, add);
op!(binary Rupees, Sub, sub);
op!(inplace Rupees, SubAssign, sub_assign);
op!(unary Rupees, Neg, neg);

impl Mul<i64> for Rupees {
    type Output = Self;

    fn mul(self, rhs: i64) -> Self::Output {
        Self::from_paise(self.value() * rhs)
    }
}

impl Sum for Rupees {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::default(), Add::add)
    }
}

#[derive(Debug, Clone, Error)]
#[error("Value cannot be represented in paise: {0}")]
pub struct RupeesConversionError(String);

impl From<i64> for Rupees {
    fn from(paise: i64) -> Self {
        Self(paise)
    }
}

impl PartialEq for Rupees {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl Eq for Rupees {}

impl Display for Rupees {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let rupees = self.0 as f64 / PAISE_PER_RUPEE as f64;
        write!(f, "₹{rupees:0.2}")
    }
}

impl Rupees {
    /// The amount in paise.
    pub fn value(&self) -> i64 {
        self.0
    }

    pub fn from_paise(paise: i64) -> Self {
        Self(paise)
    }

    pub fn from_whole_rupees(rupees: i64) -> Self {
        Self(rupees * PAISE_PER_RUPEE)
    }

    /// Converts a rupee amount (as supplied by clients in JSON) to paise, rounding to the nearest
    /// paisa. Non-finite values and values outside the i64 range are rejected.
    pub fn try_from_rupees(rupees: f64) -> Result<Self, RupeesConversionError> {
        if !rupees.is_finite() {
            return Err(RupeesConversionError(format!("{rupees} is not a finite amount")));
        }
        let paise = (rupees * PAISE_PER_RUPEE as f64).round();
        if paise.abs() >= i64::MAX as f64 {
            return Err(RupeesConversionError(format!("{rupees} is too large to represent")));
        }
        #[allow(clippy::cast_possible_truncation)]
        Ok(Self(paise as i64))
    }
}
