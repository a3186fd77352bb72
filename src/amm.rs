// 3.0 amm.rs: pure open/close formulas over the virtual reserves. no state.
// every open or close is one constant product swap in one direction, and every
// rounding step leaves the dust in the pool, so base * asset never goes down.

use crate::math::{self, MathError};
use crate::types::{SignedWad, Wad};
use serde::{Deserialize, Serialize};

/// Curve state after a trade, plus the amount that moved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpenFill {
    /// Asset units bought (long) or sold into the pool (short).
    pub size: Wad,
    pub new_reserve_base: Wad,
    pub new_reserve_asset: Wad,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CloseFill {
    pub pnl: SignedWad,
    pub new_reserve_base: Wad,
    pub new_reserve_asset: Wad,
}

impl CloseFill {
    /// What the trader walks away with, floored at zero.
    pub fn payout(&self, collateral: Wad) -> Result<Wad, MathError> {
        self.pnl.settle_against(collateral)
    }
}

// 3.1: long open. pay `collateral` base into the pool, receive asset.
pub fn open_long(collateral: Wad, reserve_base: Wad, reserve_asset: Wad) -> Result<OpenFill, MathError> {
    let asset_out = math::ratio_out(collateral.raw(), reserve_base.raw(), reserve_asset.raw())?;
    if asset_out >= reserve_asset.raw() {
        return Err(MathError::InsufficientLiquidity);
    }
    // too small to buy a single raw unit; could never be closed
    if asset_out == 0 {
        return Err(MathError::InvalidInput);
    }
    Ok(OpenFill {
        size: Wad::from_raw(asset_out),
        new_reserve_base: reserve_base.checked_add(collateral)?,
        new_reserve_asset: Wad::from_raw(reserve_asset.raw() - asset_out),
    })
}

// 3.2: short open. the pool pays out `collateral` base; the asset sold in is the
// exact amount that keeps the product whole, rounded up.
pub fn open_short(collateral: Wad, reserve_base: Wad, reserve_asset: Wad) -> Result<OpenFill, MathError> {
    if collateral.is_zero() {
        return Err(MathError::InvalidInput);
    }
    if collateral >= reserve_base {
        return Err(MathError::InsufficientLiquidity);
    }
    let asset_sold = math::ratio_in(collateral.raw(), reserve_asset.raw(), reserve_base.raw())?;
    let asset_sold = Wad::from_raw(asset_sold);
    Ok(OpenFill {
        size: asset_sold,
        new_reserve_base: reserve_base.checked_sub(collateral)?,
        new_reserve_asset: reserve_asset.checked_add(asset_sold)?,
    })
}

// 3.3: long close. sell `size` asset back, pnl = base received - collateral.
pub fn close_long(
    size: Wad,
    collateral: Wad,
    reserve_base: Wad,
    reserve_asset: Wad,
) -> Result<CloseFill, MathError> {
    let base_out = math::ratio_out(size.raw(), reserve_asset.raw(), reserve_base.raw())?;
    let base_out = Wad::from_raw(base_out);
    Ok(CloseFill {
        pnl: SignedWad::difference(base_out, collateral)?,
        new_reserve_base: reserve_base.checked_sub(base_out)?,
        new_reserve_asset: reserve_asset.checked_add(size)?,
    })
}

// 3.4: short close. buy `size` asset back out of the pool, pnl = collateral - base cost.
pub fn close_short(
    size: Wad,
    collateral: Wad,
    reserve_base: Wad,
    reserve_asset: Wad,
) -> Result<CloseFill, MathError> {
    let base_cost = math::ratio_in(size.raw(), reserve_base.raw(), reserve_asset.raw())?;
    let base_cost = Wad::from_raw(base_cost);
    Ok(CloseFill {
        pnl: SignedWad::difference(collateral, base_cost)?,
        new_reserve_base: reserve_base.checked_add(base_cost)?,
        new_reserve_asset: reserve_asset.checked_sub(size)?,
    })
}

/// `reserve_base / reserve_asset`.
pub fn mark_price(reserve_base: Wad, reserve_asset: Wad) -> Result<Wad, MathError> {
    reserve_base.div(reserve_asset)
}
