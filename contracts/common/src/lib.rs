//! Shared types and constants for the Keepsake contract suite.
//!
//! This crate provides:
//! - Basis-point constants and the distribution fee math shared by the
//!   vault and registry contracts.
//! - [`VaultInfo`] — the registry's per-vault bookkeeping record.
//! - Inactivity-period bounds enforced by every vault.

#![no_std]

pub mod fees;

use soroban_sdk::{contracttype, Address};

pub use fees::compute_fee;

/// Basis-point denominator: 10_000 bp == 100%.
pub const BPS_DENOMINATOR: u32 = 10_000;

/// Upper bound on the registry's distribution fee (5%).
pub const MAX_FEE_BPS: u32 = 500;

/// Minimum configurable inactivity period, in seconds.
pub const MIN_INACTIVITY_SECS: u64 = 1;

/// Maximum configurable inactivity period: ten years, in seconds.
pub const MAX_INACTIVITY_SECS: u64 = 10 * 365 * 24 * 60 * 60;

/// Registry-side record for a registered vault.
///
/// `active` tracks membership of the live set; the owner/heir snapshot is
/// retained after deregistration for post-mortem views.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct VaultInfo {
    pub owner: Address,
    pub heir: Address,
    pub active: bool,
}
