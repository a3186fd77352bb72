// 2.0 math.rs: scaled integer arithmetic. nothing here may round silently in the
// trader's favour or wrap on overflow.
//
// every product of two scaled values is formed at 256 bits (hi, lo) before the
// division, so 10_000e18 * 1_000e18 style reserve products never overflow on the
// way to a result that fits in u128.

pub const WAD_DECIMALS: u32 = 18;
pub const WAD: u128 = 1_000_000_000_000_000_000;

const LOW_MASK: u128 = u64::MAX as u128;

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum MathError {
    #[error("division by zero")]
    DivisionByZero,

    #[error("arithmetic overflow")]
    ArithmeticOverflow,

    #[error("invalid input: amount must be non-zero")]
    InvalidInput,

    #[error("insufficient liquidity")]
    InsufficientLiquidity,
}

/// Scaled multiply: `a * b / 1e18`, truncated.
pub fn mul(a: u128, b: u128) -> Result<u128, MathError> {
    if a == 0 || b == 0 {
        return Ok(0);
    }
    mul_div(a, b, WAD)
}

/// Scaled divide: `a * 1e18 / b`, truncated.
pub fn div(a: u128, b: u128) -> Result<u128, MathError> {
    if b == 0 {
        return Err(MathError::DivisionByZero);
    }
    mul_div(a, WAD, b)
}

/// Constant product swap output: `amount_in * reserve_out / (reserve_in + amount_in)`.
/// Truncates, so the pool keeps the dust.
pub fn ratio_out(amount_in: u128, reserve_in: u128, reserve_out: u128) -> Result<u128, MathError> {
    if amount_in == 0 {
        return Err(MathError::InvalidInput);
    }
    if reserve_in == 0 || reserve_out == 0 {
        return Err(MathError::InsufficientLiquidity);
    }
    let denominator = reserve_in
        .checked_add(amount_in)
        .ok_or(MathError::ArithmeticOverflow)?;
    mul_div(amount_in, reserve_out, denominator)
}

/// Exact output dual of `ratio_out`: the input needed so the pool pays out
/// `amount_out`, `ceil(amount_out * reserve_in / (reserve_out - amount_out))`.
pub fn ratio_in(amount_out: u128, reserve_in: u128, reserve_out: u128) -> Result<u128, MathError> {
    if amount_out == 0 {
        return Err(MathError::InvalidInput);
    }
    if reserve_in == 0 || reserve_out == 0 || amount_out >= reserve_out {
        return Err(MathError::InsufficientLiquidity);
    }
    mul_div_up(amount_out, reserve_in, reserve_out - amount_out)
}

/// `a * b / denominator` with a 256 bit intermediate, rounded down.
pub fn mul_div(a: u128, b: u128, denominator: u128) -> Result<u128, MathError> {
    div_rem_wide(a, b, denominator).map(|(quotient, _)| quotient)
}

/// `a * b / denominator` with a 256 bit intermediate, rounded up.
pub fn mul_div_up(a: u128, b: u128, denominator: u128) -> Result<u128, MathError> {
    let (quotient, remainder) = div_rem_wide(a, b, denominator)?;
    if remainder == 0 {
        Ok(quotient)
    } else {
        quotient.checked_add(1).ok_or(MathError::ArithmeticOverflow)
    }
}

/// Full 256 bit product as (hi, lo) limbs. Tuples compare lexicographically,
/// so two products can be ordered directly.
pub fn widening_mul(a: u128, b: u128) -> (u128, u128) {
    let (a_hi, a_lo) = (a >> 64, a & LOW_MASK);
    let (b_hi, b_lo) = (b >> 64, b & LOW_MASK);

    let ll = a_lo * b_lo;
    let lh = a_lo * b_hi;
    let hl = a_hi * b_lo;
    let hh = a_hi * b_hi;

    // at most 3 * (2^64 - 1), fits
    let mid = (ll >> 64) + (lh & LOW_MASK) + (hl & LOW_MASK);
    let lo = (ll & LOW_MASK) | (mid << 64);
    let hi = hh + (lh >> 64) + (hl >> 64) + (mid >> 64);
    (hi, lo)
}

fn div_rem_wide(a: u128, b: u128, denominator: u128) -> Result<(u128, u128), MathError> {
    if denominator == 0 {
        return Err(MathError::DivisionByZero);
    }
    let (hi, lo) = widening_mul(a, b);
    if hi == 0 {
        return Ok((lo / denominator, lo % denominator));
    }
    // quotient would need more than 128 bits
    if hi >= denominator {
        return Err(MathError::ArithmeticOverflow);
    }

    // restoring long division of (hi, lo) by denominator. rem < denominator holds
    // at the top of every step; `carry` is the bit shifted out of rem.
    let mut rem = hi;
    let mut quotient: u128 = 0;
    for bit in (0..128).rev() {
        let carry = rem >> 127;
        rem = (rem << 1) | ((lo >> bit) & 1);
        quotient <<= 1;
        if carry == 1 || rem >= denominator {
            rem = rem.wrapping_sub(denominator);
            quotient |= 1;
        }
    }
    Ok((quotient, rem))
}
