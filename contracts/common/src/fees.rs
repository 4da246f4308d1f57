//! Basis-point fee arithmetic for native-currency distributions.

use crate::BPS_DENOMINATOR;

/// Computes the distribution fee on `balance` at `bps` basis points,
/// truncating toward zero. The heir always receives `balance - fee`.
///
/// Non-positive balances and a zero rate yield a zero fee. The scaled
/// multiplication falls back to divide-first only when `balance * bps`
/// would overflow `i128`, which loses at most `bps` stroops of precision
/// at balances no real ledger can represent.
pub fn compute_fee(balance: i128, bps: u32) -> i128 {
    if balance <= 0 || bps == 0 {
        return 0;
    }
    match balance.checked_mul(bps as i128) {
        Some(scaled) => scaled / BPS_DENOMINATOR as i128,
        None => (balance / BPS_DENOMINATOR as i128).saturating_mul(bps as i128),
    }
}
