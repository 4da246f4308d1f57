//! End-to-end tests for the Keepsake automation protocol.
//!
//! Everything here goes through the public surface only: factory-style
//! vault creation, registry scanning, batch execution, and the vault
//! client — no storage poking.

use proptest::prelude::*;
use soroban_sdk::testutils::{Address as _, Ledger as _};
use soroban_sdk::{Address, Vec};

use registry::{ScanBatch, BATCH_SIZE};
use test_framework::{TestEnv, VaultHandle, DEFAULT_PERIOD, GENESIS, ONE_XLM};
use vault::VaultError;

// ── Concrete scenarios ───────────────────────────────────────────────────────

/// 30-day vault, 1 XLM deposit, 0.2% fee: the heir nets 0.998 XLM and the
/// registry books 0.002 XLM the second the period is exceeded.
#[test]
fn thirty_day_fee_scenario() {
    let t = TestEnv::new(20);
    let v = t.spawn_vault(DEFAULT_PERIOD, ONE_XLM);

    // day 29: invisible to the scanner
    t.env.ledger().set_timestamp(GENESIS + 29 * 24 * 60 * 60);
    let (has_work, batch) = t.registry.scan();
    assert!(!has_work);
    assert_eq!(batch.candidates.len(), 0);

    // exactly day 30: still not eligible (strictly greater than)
    t.env.ledger().set_timestamp(GENESIS + DEFAULT_PERIOD);
    assert!(!v.client.can_distribute());

    // day 30 plus one second
    t.env.ledger().set_timestamp(GENESIS + DEFAULT_PERIOD + 1);
    let (has_work, batch) = t.registry.scan();
    assert!(has_work);
    assert_eq!(batch.candidates.len(), 1);

    let outcome = t.registry.execute_batch(&batch);
    assert_eq!(outcome.succeeded, 1);

    assert_eq!(t.native_balance(&v.heir), 9_980_000); // 0.998 XLM
    assert_eq!(t.native_balance(&t.registry_id), 20_000); // 0.002 XLM
    assert_eq!(t.registry.get_vault_count(), 0);
    assert!(v.client.is_executed());
}

/// Three vaults created in sequence come back from `scan` in creation
/// order, and executing the full list empties the active set.
#[test]
fn batch_preserves_creation_order_and_empties_the_set() {
    let t = TestEnv::new(20);
    let a = t.spawn_vault(DEFAULT_PERIOD, ONE_XLM);
    let b = t.spawn_vault(DEFAULT_PERIOD, ONE_XLM);
    let c = t.spawn_vault(DEFAULT_PERIOD, ONE_XLM);
    assert!(BATCH_SIZE > 3);

    t.advance(DEFAULT_PERIOD + 1);
    let (has_work, batch) = t.registry.scan();
    assert!(has_work);

    let mut expected = Vec::new(&t.env);
    expected.push_back(a.id.clone());
    expected.push_back(b.id.clone());
    expected.push_back(c.id.clone());
    assert_eq!(batch.candidates, expected);

    let outcome = t.registry.execute_batch(&batch);
    assert_eq!(outcome.succeeded, 3);
    assert_eq!(t.registry.get_vault_count(), 0);
}

// ── Scheduler properties ─────────────────────────────────────────────────────

/// With N active vaults and batch size B, ⌈N/B⌉ scans tour the whole set
/// and the cursor wraps back to 0.
#[test]
fn round_robin_covers_the_set_and_wraps() {
    let t = TestEnv::new(20);
    let n = BATCH_SIZE * 2 + 5;
    for _ in 0..n {
        t.spawn_vault(DEFAULT_PERIOD, 0);
    }

    let mut covered = 0u32;
    let tours = n.div_ceil(BATCH_SIZE);
    let mut window_start = 0u32;
    for _ in 0..tours {
        let (has_work, batch) = t.registry.scan();
        assert!(!has_work);
        covered += batch.next_index - window_start;
        t.registry.execute_batch(&batch);
        window_start = t.registry.get_cursor();
    }
    assert_eq!(covered, n);
    assert_eq!(t.registry.get_cursor(), 0);
}

/// An owner heartbeat between scan and execution makes the stale payload
/// harmless.
#[test]
fn heartbeat_invalidates_a_stale_payload() {
    let t = TestEnv::new(20);
    let v = t.spawn_vault(DEFAULT_PERIOD, ONE_XLM);

    t.advance(DEFAULT_PERIOD + 1);
    let (_, batch) = t.registry.scan();
    assert_eq!(batch.candidates.len(), 1);

    v.client.record_activity();

    let outcome = t.registry.execute_batch(&batch);
    assert_eq!(outcome.succeeded, 0);
    assert_eq!(outcome.failed, 1);
    assert_eq!(t.native_balance(&v.heir), 0);
    assert_eq!(t.registry.get_vault_count(), 1);
    assert!(!v.client.is_executed());
}

/// Mixed membership churn keeps counts and views consistent.
#[test]
fn membership_stays_consistent_under_churn() {
    let t = TestEnv::new(20);
    let vaults: std::vec::Vec<VaultHandle> =
        (0..6).map(|_| t.spawn_vault(DEFAULT_PERIOD, ONE_XLM)).collect();

    t.registry.unregister_vault(&vaults[1].owner, &vaults[1].id);
    t.registry.unregister_vault(&t.factory, &vaults[4].id);
    assert_eq!(t.registry.get_vault_count(), 4);

    t.advance(DEFAULT_PERIOD + 1);
    t.drain();
    assert_eq!(t.registry.get_vault_count(), 0);

    // distributed vaults paid out; unregistered ones kept their assets
    for (i, v) in vaults.iter().enumerate() {
        let info = t.registry.get_vault_info(&v.id);
        assert!(!info.active);
        if i == 1 || i == 4 {
            assert!(!v.client.is_executed());
            assert_eq!(t.native_balance(&v.heir), 0);
        } else {
            assert!(v.client.is_executed());
            assert_eq!(t.native_balance(&v.heir), ONE_XLM - 20_000);
        }
    }
}

/// A distribution triggered outside the scheduler leaves a stale registry
/// entry that the next batch quietly sweeps out of the way.
#[test]
fn directly_distributed_vault_is_skipped_then_removable() {
    let t = TestEnv::new(0);
    let v = t.spawn_vault(DEFAULT_PERIOD, ONE_XLM);

    t.advance(DEFAULT_PERIOD + 1);
    v.client.distribute();
    assert_eq!(t.native_balance(&v.heir), ONE_XLM);

    let (has_work, batch) = t.registry.scan();
    assert!(!has_work);
    assert_eq!(batch.candidates.len(), 0);

    // the executed vault stays registered until someone removes it
    assert_eq!(t.registry.get_vault_count(), 1);
    t.registry.unregister_vault(&v.owner, &v.id);
    assert_eq!(t.registry.get_vault_count(), 0);
}

// ── Terminality ──────────────────────────────────────────────────────────────

#[test]
fn distribution_is_exactly_once_forever() {
    let t = TestEnv::new(20);
    let v = t.spawn_vault(DEFAULT_PERIOD, ONE_XLM);

    t.advance(DEFAULT_PERIOD + 1);
    v.client.distribute();
    let paid = t.native_balance(&v.heir);

    assert_eq!(v.client.try_distribute(), Err(Ok(VaultError::AlreadyExecuted)));
    assert_eq!(
        v.client.try_emergency_withdraw(),
        Err(Ok(VaultError::AlreadyExecuted))
    );
    assert_eq!(t.native_balance(&v.heir), paid);
}

#[test]
fn emergency_withdraw_precludes_distribution() {
    let t = TestEnv::new(20);
    let v = t.spawn_vault(DEFAULT_PERIOD, ONE_XLM);

    v.client.emergency_withdraw();
    assert_eq!(t.native_balance(&v.owner), ONE_XLM);

    t.advance(DEFAULT_PERIOD + 1);
    assert_eq!(v.client.try_distribute(), Err(Ok(VaultError::AlreadyExecuted)));
    assert_eq!(t.native_balance(&v.heir), 0);

    // the registry eventually skips and the entry can be cleaned up
    let (has_work, _) = t.registry.scan();
    assert!(!has_work);
}

#[test]
fn manual_payloads_may_name_unregistered_vaults() {
    let t = TestEnv::new(20);
    let unknown = Address::generate(&t.env);
    let mut candidates = Vec::new(&t.env);
    candidates.push_back(unknown);
    let outcome = t.registry.execute_batch(&ScanBatch {
        candidates,
        next_index: 0,
    });
    assert_eq!(outcome.succeeded, 0);
    assert_eq!(outcome.failed, 1);
}

// ── Property-based coverage ──────────────────────────────────────────────────

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    /// **Property**: across any deposit and fee rate, heir payout plus
    /// registry fee always reconstructs the deposit exactly, and the vault
    /// ends empty.
    #[test]
    fn prop_distribution_conserves_value(
        deposit in test_framework::deposit_strategy(),
        fee_bps in test_framework::fee_bps_strategy(),
    ) {
        let t = TestEnv::new(fee_bps);
        let v = t.spawn_vault(DEFAULT_PERIOD, deposit);

        t.advance(DEFAULT_PERIOD + 1);
        let (_, outcome) = t.scan_and_execute();
        prop_assert_eq!(outcome.succeeded, 1);

        let heir = t.native_balance(&v.heir);
        let fee = t.native_balance(&t.registry_id);
        prop_assert_eq!(heir + fee, deposit);
        prop_assert_eq!(fee, common::compute_fee(deposit, fee_bps));
        prop_assert_eq!(t.native_balance(&v.id), 0);
    }

    /// **Property**: a vault is never distributable while the elapsed quiet
    /// time is at most the period, whatever the period.
    #[test]
    fn prop_eligibility_boundary_is_strict(period in test_framework::period_strategy()) {
        let t = TestEnv::new(0);
        let v = t.spawn_vault(period, ONE_XLM);

        t.env.ledger().set_timestamp(GENESIS + period);
        prop_assert!(!v.client.can_distribute());
        prop_assert_eq!(v.client.try_distribute(), Err(Ok(VaultError::StillActive)));

        t.env.ledger().set_timestamp(GENESIS + period + 1);
        prop_assert!(v.client.can_distribute());
    }
}
