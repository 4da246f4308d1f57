//! Time-locked custody vault.
//!
//! One vault instance holds assets for a single owner/heir pair. Any
//! owner-initiated operation resets the inactivity clock; once the owner has
//! been silent for longer than the configured period, anyone may trigger
//! [`VaultContract::distribute`], which sweeps every held asset to the heir
//! (minus a registry fee on the native leg) and permanently seals the vault.
//! The owner can reclaim everything fee-free at any earlier point with
//! [`VaultContract::emergency_withdraw`].
//!
//! Vaults are produced by a factory pre-configured with owner, heir,
//! inactivity period, and the registry they report fees to.

#![no_std]

pub mod events;
pub mod inventory;


use common::{compute_fee, MAX_FEE_BPS, MAX_INACTIVITY_SECS, MIN_INACTIVITY_SECS};
use soroban_sdk::{
    contract, contracterror, contractimpl, symbol_short, token, Address, Env, Symbol, Vec,
};

use events::{DistributedEvent, EmergencyWithdrawnEvent};

const INIT: Symbol = symbol_short!("INIT");
const OWNER: Symbol = symbol_short!("OWNER");
const HEIR: Symbol = symbol_short!("HEIR");
const PERIOD: Symbol = symbol_short!("PERIOD");
const LAST_ACT: Symbol = symbol_short!("LAST_ACT");
const EXEC: Symbol = symbol_short!("EXEC");
const REGISTRY: Symbol = symbol_short!("REGISTRY");
const NATIVE: Symbol = symbol_short!("NATIVE");

#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[repr(u32)]
pub enum VaultError {
    NotInitialized = 1,
    AlreadyInitialized = 2,
    InvalidPeriod = 3,
    ZeroAmount = 4,
    AlreadyExecuted = 5,
    StillActive = 6,
    NoAssets = 7,
    DuplicateDeposit = 8,
}

/// Fee lookup on the registry. Queried best-effort on directly-invoked
/// distributions; any failure is treated as a zero fee. Registry-driven
/// distributions receive the rate in-band instead, because the registry
/// cannot answer this query while it is on the call stack.
#[soroban_sdk::contractclient(name = "FeeSourceClient")]
#[allow(dead_code)]
trait FeeSource {
    fn get_distribution_fee_percent(env: Env) -> u32;
}

/// Minimal unique-token (NFT) interface.
#[soroban_sdk::contractclient(name = "UniqueTokenClient")]
#[allow(dead_code)]
trait UniqueToken {
    fn transfer(env: Env, from: Address, to: Address, id: u64);
    fn owner_of(env: Env, id: u64) -> Address;
}

/// Minimal semi-fungible (multi-token) interface.
#[soroban_sdk::contractclient(name = "SemiFungibleClient")]
#[allow(dead_code)]
trait SemiFungible {
    fn transfer(env: Env, from: Address, to: Address, id: u64, amount: i128);
    fn balance_of(env: Env, owner: Address, id: u64) -> i128;
}

#[contract]
pub struct VaultContract;

#[contractimpl]
impl VaultContract {
    /// Factory-driven one-time setup. The registry reference and the native
    /// asset contract are fixed for the vault's lifetime.
    pub fn initialize(
        env: Env,
        owner: Address,
        heir: Address,
        inactivity_period: u64,
        registry: Address,
        native_token: Address,
    ) -> Result<(), VaultError> {
        if env.storage().instance().has(&INIT) {
            return Err(VaultError::AlreadyInitialized);
        }
        check_period(inactivity_period)?;

        let now = env.ledger().timestamp();
        env.storage().instance().set(&OWNER, &owner);
        env.storage().instance().set(&HEIR, &heir);
        env.storage().instance().set(&PERIOD, &inactivity_period);
        env.storage().instance().set(&LAST_ACT, &now);
        env.storage().instance().set(&EXEC, &false);
        env.storage().instance().set(&REGISTRY, &registry);
        env.storage().instance().set(&NATIVE, &native_token);
        env.storage().instance().set(&INIT, &true);

        events::publish_initialized(&env, &owner, &heir, inactivity_period);
        Ok(())
    }

    /// Owner heartbeat: resets the inactivity clock.
    pub fn record_activity(env: Env) -> Result<(), VaultError> {
        let owner = Self::auth_owner(&env)?;
        Self::require_not_executed(&env)?;
        let now = Self::touch(&env);
        events::publish_activity(&env, &owner, now);
        Ok(())
    }

    pub fn set_heir(env: Env, new_heir: Address) -> Result<(), VaultError> {
        Self::auth_owner(&env)?;
        Self::require_not_executed(&env)?;
        let old_heir: Address = env
            .storage()
            .instance()
            .get(&HEIR)
            .ok_or(VaultError::NotInitialized)?;
        env.storage().instance().set(&HEIR, &new_heir);
        Self::touch(&env);
        events::publish_heir_changed(&env, &old_heir, &new_heir);
        Ok(())
    }

    pub fn set_inactivity_period(env: Env, inactivity_period: u64) -> Result<(), VaultError> {
        Self::auth_owner(&env)?;
        Self::require_not_executed(&env)?;
        check_period(inactivity_period)?;
        env.storage().instance().set(&PERIOD, &inactivity_period);
        Self::touch(&env);
        events::publish_period_changed(&env, inactivity_period);
        Ok(())
    }

    /// Native-asset deposit. Open to any sender; only an owner deposit
    /// counts as activity.
    pub fn deposit_native(env: Env, from: Address, amount: i128) -> Result<(), VaultError> {
        from.require_auth();
        Self::require_init(&env)?;
        Self::require_not_executed(&env)?;
        if amount <= 0 {
            return Err(VaultError::ZeroAmount);
        }
        let native: Address = env
            .storage()
            .instance()
            .get(&NATIVE)
            .ok_or(VaultError::NotInitialized)?;
        token::Client::new(&env, &native).transfer(
            &from,
            &env.current_contract_address(),
            &amount,
        );
        let owner: Address = env
            .storage()
            .instance()
            .get(&OWNER)
            .ok_or(VaultError::NotInitialized)?;
        if from == owner {
            Self::touch(&env);
        }
        events::publish_native_deposit(&env, &from, amount);
        Ok(())
    }

    pub fn deposit_fungible(env: Env, token: Address, amount: i128) -> Result<(), VaultError> {
        let owner = Self::auth_owner(&env)?;
        Self::require_not_executed(&env)?;
        if amount <= 0 {
            return Err(VaultError::ZeroAmount);
        }
        token::Client::new(&env, &token).transfer(
            &owner,
            &env.current_contract_address(),
            &amount,
        );
        inventory::note_fungible(&env, &token);
        Self::touch(&env);
        events::publish_fungible_deposit(&env, &token, amount);
        Ok(())
    }

    pub fn deposit_unique(env: Env, collection: Address, id: u64) -> Result<(), VaultError> {
        let owner = Self::auth_owner(&env)?;
        Self::require_not_executed(&env)?;
        if !inventory::record_unique(&env, &collection, id) {
            return Err(VaultError::DuplicateDeposit);
        }
        UniqueTokenClient::new(&env, &collection).transfer(
            &owner,
            &env.current_contract_address(),
            &id,
        );
        Self::touch(&env);
        events::publish_unique_deposit(&env, &collection, id);
        Ok(())
    }

    pub fn deposit_semi_fungible(
        env: Env,
        collection: Address,
        id: u64,
        amount: i128,
    ) -> Result<(), VaultError> {
        let owner = Self::auth_owner(&env)?;
        Self::require_not_executed(&env)?;
        if amount <= 0 {
            return Err(VaultError::ZeroAmount);
        }
        SemiFungibleClient::new(&env, &collection).transfer(
            &owner,
            &env.current_contract_address(),
            &id,
            &amount,
        );
        inventory::add_semi_fungible(&env, &collection, id, amount);
        Self::touch(&env);
        events::publish_semi_fungible_deposit(&env, &collection, id, amount);
        Ok(())
    }

    /// Eligibility predicate: the vault is distributable the first instant
    /// the inactivity period is strictly exceeded. Uninitialized or sealed
    /// vaults are never distributable.
    pub fn can_distribute(env: Env) -> bool {
        if !env.storage().instance().has(&INIT) {
            return false;
        }
        let executed: bool = env.storage().instance().get(&EXEC).unwrap_or(true);
        if executed {
            return false;
        }
        let last: u64 = env.storage().instance().get(&LAST_ACT).unwrap_or(0);
        let period: u64 = env.storage().instance().get(&PERIOD).unwrap_or(u64::MAX);
        env.ledger().timestamp().saturating_sub(last) > period
    }

    pub fn is_executed(env: Env) -> bool {
        env.storage().instance().get(&EXEC).unwrap_or(false)
    }

    /// Seconds until the vault becomes eligible; 0 when already eligible,
    /// `u64::MAX` once sealed.
    pub fn time_until_eligible(env: Env) -> u64 {
        let executed: bool = env.storage().instance().get(&EXEC).unwrap_or(false);
        if executed {
            return u64::MAX;
        }
        let last: u64 = env.storage().instance().get(&LAST_ACT).unwrap_or(0);
        let period: u64 = env.storage().instance().get(&PERIOD).unwrap_or(u64::MAX);
        let eligible_at = last.saturating_add(period).saturating_add(1);
        eligible_at.saturating_sub(env.ledger().timestamp())
    }

    /// Terminal, permissionless payout to the heir.
    ///
    /// The `executed` flag flips before any transfer; a re-entrant or racing
    /// second call lands on `AlreadyExecuted`. If the sweep moves nothing
    /// the call fails with `NoAssets` and the host rolls the flag back with
    /// the rest of the frame.
    ///
    /// The fee rate is queried from the registry best-effort (failure means
    /// 0 bps). The registry itself drives distributions through
    /// [`distribute_with_fee`](Self::distribute_with_fee) instead: it sits
    /// on the call stack then, and the host denies the reentrant query.
    pub fn distribute(env: Env) -> Result<(), VaultError> {
        Self::require_init(&env)?;
        Self::require_not_executed(&env)?;
        if !Self::can_distribute(env.clone()) {
            return Err(VaultError::StillActive);
        }
        let registry: Address = env
            .storage()
            .instance()
            .get(&REGISTRY)
            .ok_or(VaultError::NotInitialized)?;
        let bps = match FeeSourceClient::new(&env, &registry).try_get_distribution_fee_percent() {
            Ok(Ok(bps)) => bps,
            _ => 0,
        };
        Self::settle(&env, bps.min(MAX_FEE_BPS))
    }

    /// Registry-driven payout: the configured registry supplies its current
    /// fee rate in-band. Only the registry may call this, and the rate is
    /// capped at `MAX_FEE_BPS` regardless of what it claims.
    pub fn distribute_with_fee(env: Env, fee_bps: u32) -> Result<(), VaultError> {
        Self::require_init(&env)?;
        let registry: Address = env
            .storage()
            .instance()
            .get(&REGISTRY)
            .ok_or(VaultError::NotInitialized)?;
        registry.require_auth();
        Self::require_not_executed(&env)?;
        if !Self::can_distribute(env.clone()) {
            return Err(VaultError::StillActive);
        }
        Self::settle(&env, fee_bps.min(MAX_FEE_BPS))
    }

    /// Owner-only escape hatch: sweeps everything back to the owner with no
    /// fee and seals the vault, even when it holds nothing.
    pub fn emergency_withdraw(env: Env) -> Result<(), VaultError> {
        let owner = Self::auth_owner(&env)?;
        Self::require_not_executed(&env)?;
        env.storage().instance().set(&EXEC, &true);

        let (moved, native_paid, _) = Self::sweep(&env, &owner, 0)?;

        events::publish_emergency_withdrawn(
            &env,
            &EmergencyWithdrawnEvent {
                owner,
                native_paid,
                assets_moved: moved,
                timestamp: env.ledger().timestamp(),
            },
        );
        Ok(())
    }

    // ── Read views ───────────────────────────────────────────────────────────

    pub fn get_owner(env: Env) -> Result<Address, VaultError> {
        env.storage().instance().get(&OWNER).ok_or(VaultError::NotInitialized)
    }

    pub fn get_heir(env: Env) -> Result<Address, VaultError> {
        env.storage().instance().get(&HEIR).ok_or(VaultError::NotInitialized)
    }

    pub fn get_inactivity_period(env: Env) -> Result<u64, VaultError> {
        env.storage().instance().get(&PERIOD).ok_or(VaultError::NotInitialized)
    }

    pub fn get_last_active(env: Env) -> Result<u64, VaultError> {
        env.storage().instance().get(&LAST_ACT).ok_or(VaultError::NotInitialized)
    }

    pub fn get_registry(env: Env) -> Result<Address, VaultError> {
        env.storage().instance().get(&REGISTRY).ok_or(VaultError::NotInitialized)
    }

    pub fn get_fungible_tokens(env: Env) -> Vec<Address> {
        inventory::fungible_tokens(&env)
    }

    pub fn get_unique_collections(env: Env) -> Vec<Address> {
        inventory::unique_collections(&env)
    }

    pub fn get_unique_ids(env: Env, collection: Address) -> Vec<u64> {
        inventory::unique_ids(&env, &collection)
    }

    pub fn get_semi_fungible_balance(env: Env, collection: Address, id: u64) -> i128 {
        inventory::semi_fungible_balance(&env, &collection, id)
    }

    // ── Internals ────────────────────────────────────────────────────────────

    /// Seals the vault and sweeps everything to the heir at `fee_bps`.
    fn settle(env: &Env, fee_bps: u32) -> Result<(), VaultError> {
        env.storage().instance().set(&EXEC, &true);

        let heir: Address = env
            .storage()
            .instance()
            .get(&HEIR)
            .ok_or(VaultError::NotInitialized)?;
        let (moved, native_paid, fee_paid) = Self::sweep(env, &heir, fee_bps)?;
        if moved == 0 {
            return Err(VaultError::NoAssets);
        }

        events::publish_distributed(
            env,
            &DistributedEvent {
                heir,
                native_paid,
                fee_paid,
                assets_moved: moved,
                timestamp: env.ledger().timestamp(),
            },
        );
        Ok(())
    }

    /// Moves every held asset to `to` and clears the inventory. Returns
    /// `(assets moved, native paid out, fee forwarded)`.
    ///
    /// The fee applies to the native leg only. The fee forwarding failure is
    /// swallowed: a refusing registry leaves the fee in the sealed vault
    /// rather than blocking the payout. Transfers toward `to` are not
    /// tolerant; any refusal aborts and rolls back the whole call.
    fn sweep(env: &Env, to: &Address, fee_bps: u32) -> Result<(u32, i128, i128), VaultError> {
        let this = env.current_contract_address();
        let mut moved: u32 = 0;
        let mut native_paid: i128 = 0;
        let mut fee_paid: i128 = 0;

        let native: Address = env
            .storage()
            .instance()
            .get(&NATIVE)
            .ok_or(VaultError::NotInitialized)?;
        let native_client = token::Client::new(env, &native);
        let balance = native_client.balance(&this);
        if balance > 0 {
            let registry: Address = env
                .storage()
                .instance()
                .get(&REGISTRY)
                .ok_or(VaultError::NotInitialized)?;
            let fee = compute_fee(balance, fee_bps);
            native_paid = balance - fee;
            native_client.transfer(&this, to, &native_paid);
            if fee > 0 && matches!(native_client.try_transfer(&this, &registry, &fee), Ok(Ok(()))) {
                fee_paid = fee;
            }
            moved += 1;
            events::publish_native_swept(env, to, native_paid, fee_paid);
        }

        for tok in inventory::fungible_tokens(env).iter() {
            let client = token::Client::new(env, &tok);
            let bal = client.balance(&this);
            if bal > 0 {
                client.transfer(&this, to, &bal);
                moved += 1;
                events::publish_fungible_swept(env, &tok, to, bal);
            }
        }
        inventory::clear_fungible(env);

        for collection in inventory::unique_collections(env).iter() {
            let client = UniqueTokenClient::new(env, &collection);
            for id in inventory::unique_ids(env, &collection).iter() {
                client.transfer(&this, to, &id);
                moved += 1;
                events::publish_unique_swept(env, &collection, to, id);
            }
        }
        inventory::clear_unique(env);

        for collection in inventory::semi_fungible_collections(env).iter() {
            let client = SemiFungibleClient::new(env, &collection);
            for id in inventory::semi_fungible_ids(env, &collection).iter() {
                let bal = inventory::semi_fungible_balance(env, &collection, id);
                if bal > 0 {
                    client.transfer(&this, to, &id, &bal);
                    moved += 1;
                    events::publish_semi_fungible_swept(env, &collection, to, id, bal);
                }
            }
        }
        inventory::clear_semi_fungible(env);

        Ok((moved, native_paid, fee_paid))
    }

    fn touch(env: &Env) -> u64 {
        let now = env.ledger().timestamp();
        env.storage().instance().set(&LAST_ACT, &now);
        now
    }

    fn auth_owner(env: &Env) -> Result<Address, VaultError> {
        let owner: Address = env
            .storage()
            .instance()
            .get(&OWNER)
            .ok_or(VaultError::NotInitialized)?;
        owner.require_auth();
        Ok(owner)
    }

    fn require_init(env: &Env) -> Result<(), VaultError> {
        if !env.storage().instance().has(&INIT) {
            return Err(VaultError::NotInitialized);
        }
        Ok(())
    }

    fn require_not_executed(env: &Env) -> Result<(), VaultError> {
        if env.storage().instance().get(&EXEC).unwrap_or(false) {
            return Err(VaultError::AlreadyExecuted);
        }
        Ok(())
    }
}

fn check_period(secs: u64) -> Result<(), VaultError> {
    if !(MIN_INACTIVITY_SECS..=MAX_INACTIVITY_SECS).contains(&secs) {
        return Err(VaultError::InvalidPeriod);
    }
    Ok(())
}
