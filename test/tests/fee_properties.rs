//! Property-based coverage for the shared basis-point fee math.

use common::{compute_fee, BPS_DENOMINATOR, MAX_FEE_BPS};
use proptest::prelude::*;

proptest! {
    /// **Property**: heir payout plus fee always reconstructs the original
    /// balance, with neither side negative.
    #[test]
    fn prop_fee_conservation(
        balance in 1i128..=1_000_000_000_000_000i128,
        bps in 0u32..=MAX_FEE_BPS,
    ) {
        let fee = compute_fee(balance, bps);
        let heir = balance - fee;
        prop_assert!(fee >= 0);
        prop_assert!(heir >= 0);
        prop_assert_eq!(heir + fee, balance);
    }

    /// **Property**: the fee is the floor of the exact proportional amount
    /// and never rounds against the heir.
    #[test]
    fn prop_fee_never_rounds_up(
        balance in 1i128..=1_000_000_000_000_000i128,
        bps in 0u32..=MAX_FEE_BPS,
    ) {
        let fee = compute_fee(balance, bps);
        prop_assert!(fee * BPS_DENOMINATOR as i128 <= balance * bps as i128);
        prop_assert!((fee + 1) * BPS_DENOMINATOR as i128 > balance * bps as i128);
    }

    /// **Property**: the fee is monotone in both the balance and the rate.
    #[test]
    fn prop_fee_monotone(
        balance in 1i128..=1_000_000_000_000i128,
        bps in 0u32..MAX_FEE_BPS,
    ) {
        prop_assert!(compute_fee(balance + 1, bps) >= compute_fee(balance, bps));
        prop_assert!(compute_fee(balance, bps + 1) >= compute_fee(balance, bps));
    }
}
