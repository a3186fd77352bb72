// 1.0: all the primitives live here. ids, direction, fixed point amounts, timestamps.
// each is a newtype so the compiler catches a reserve being passed where a price belongs.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::math::{self, MathError, WAD, WAD_DECIMALS};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MarketId(pub u64);

// 0 is never allocated. the ledger hands out 1, 2, 3, ...
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PositionId(pub u64);

// traders, the operator, the authority and the ledger all act under an account id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AccountId(pub u64);

impl fmt::Display for MarketId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "market#{}", self.0)
    }
}

impl fmt::Display for PositionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "position#{}", self.0)
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "account#{}", self.0)
    }
}

// Long = profit when the curve price goes up. Short = profit when it goes down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Long,
    Short,
}

impl Side {
    pub fn opposite(&self) -> Self {
        match self {
            Side::Long => Side::Short,
            Side::Short => Side::Long,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Long => write!(f, "long"),
            Side::Short => write!(f, "short"),
        }
    }
}

// 1.1: unsigned 18 decimal fixed point. collateral, reserves, sizes and prices all use it.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Wad(u128);

impl Wad {
    pub const ZERO: Wad = Wad(0);
    pub const ONE: Wad = Wad(WAD);

    pub const fn from_raw(raw: u128) -> Self {
        Self(raw)
    }

    pub const fn raw(&self) -> u128 {
        self.0
    }

    /// Whole units, e.g. `Wad::from_units(100)` is 100.0.
    pub fn from_units(units: u64) -> Self {
        Self(units as u128 * WAD)
    }

    /// Converts a human readable decimal. Digits past 18 decimals are truncated.
    /// Returns `None` for negative values or anything that does not fit.
    pub fn from_decimal(value: Decimal) -> Option<Self> {
        if value.is_sign_negative() && !value.is_zero() {
            return None;
        }
        let mantissa = u128::try_from(value.mantissa()).ok()?;
        let scale = value.scale();
        let raw = if scale <= WAD_DECIMALS {
            mantissa.checked_mul(10u128.checked_pow(WAD_DECIMALS - scale)?)?
        } else {
            mantissa / 10u128.checked_pow(scale - WAD_DECIMALS)?
        };
        Some(Self(raw))
    }

    /// `None` when the raw value exceeds what a `Decimal` mantissa can hold.
    pub fn to_decimal(&self) -> Option<Decimal> {
        let raw = i128::try_from(self.0).ok()?;
        Decimal::try_from_i128_with_scale(raw, WAD_DECIMALS)
            .ok()
            .map(|d| d.normalize())
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    pub fn checked_add(&self, other: Wad) -> Result<Wad, MathError> {
        self.0
            .checked_add(other.0)
            .map(Wad)
            .ok_or(MathError::ArithmeticOverflow)
    }

    pub fn checked_sub(&self, other: Wad) -> Result<Wad, MathError> {
        self.0
            .checked_sub(other.0)
            .map(Wad)
            .ok_or(MathError::InsufficientLiquidity)
    }

    /// Scaled multiply, `self * other / 1e18`.
    pub fn mul(&self, other: Wad) -> Result<Wad, MathError> {
        math::mul(self.0, other.0).map(Wad)
    }

    /// Scaled divide, `self * 1e18 / other`.
    pub fn div(&self, other: Wad) -> Result<Wad, MathError> {
        math::div(self.0, other.0).map(Wad)
    }
}

impl fmt::Display for Wad {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let whole = self.0 / WAD;
        let frac = self.0 % WAD;
        if frac == 0 {
            return write!(f, "{}", whole);
        }
        let digits = format!("{:018}", frac);
        write!(f, "{}.{}", whole, digits.trim_end_matches('0'))
    }
}

// 1.2: signed amount for realized pnl. same 18 decimal scale as Wad.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SignedWad(i128);

impl SignedWad {
    pub const ZERO: SignedWad = SignedWad(0);

    pub const fn from_raw(raw: i128) -> Self {
        Self(raw)
    }

    pub const fn raw(&self) -> i128 {
        self.0
    }

    /// `a - b` as a signed amount.
    pub fn difference(a: Wad, b: Wad) -> Result<SignedWad, MathError> {
        let a = i128::try_from(a.raw()).map_err(|_| MathError::ArithmeticOverflow)?;
        let b = i128::try_from(b.raw()).map_err(|_| MathError::ArithmeticOverflow)?;
        a.checked_sub(b)
            .map(SignedWad)
            .ok_or(MathError::ArithmeticOverflow)
    }

    pub fn is_negative(&self) -> bool {
        self.0 < 0
    }

    pub fn unsigned_abs(&self) -> Wad {
        Wad::from_raw(self.0.unsigned_abs())
    }

    /// `max(0, base + self)`. used for the close payout.
    pub fn settle_against(&self, base: Wad) -> Result<Wad, MathError> {
        if self.is_negative() {
            Ok(base.checked_sub(self.unsigned_abs()).unwrap_or(Wad::ZERO))
        } else {
            base.checked_add(self.unsigned_abs())
        }
    }
}

impl fmt::Display for SignedWad {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_negative() {
            write!(f, "-{}", self.unsigned_abs())
        } else {
            write!(f, "{}", self.unsigned_abs())
        }
    }
}

// 1.3: millisecond timestamp.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Timestamp(pub i64);

impl Timestamp {
    pub fn now() -> Self {
        Self(chrono::Utc::now().timestamp_millis())
    }

    pub fn from_millis(ms: i64) -> Self {
        Self(ms)
    }

    pub fn as_millis(&self) -> i64 {
        self.0
    }
}
