//! Vault registry and distribution scheduler.
//!
//! Tracks every live vault and partitions eligibility discovery into
//! fixed-size, resumable windows: external automation polls [`scan`] for a
//! bounded candidate batch, then submits it back through [`execute_batch`],
//! which re-validates each vault, triggers its distribution, and shrinks the
//! active set. The scanner is a convenience, not a gate — manually built
//! batches are processed identically, and the real protection is each
//! vault's own eligibility re-check.
//!
//! The active set is a vec plus a vault→index side-table; the swap-pop
//! routine below is the only code allowed to mutate the pair, which keeps
//! deregistration O(1) and the bijection intact.
//!
//! [`scan`]: RegistryContract::scan
//! [`execute_batch`]: RegistryContract::execute_batch

#![no_std]

pub mod events;


use common::{VaultInfo, MAX_FEE_BPS};
use soroban_sdk::{
    contract, contracterror, contractimpl, contracttype, symbol_short, token, Address, Env,
    Symbol, Vec,
};

use events::BatchProcessedEvent;

/// Per-invocation work bound for `scan` and the matching window width.
pub const BATCH_SIZE: u32 = 20;

const INIT: Symbol = symbol_short!("INIT");
const ADMIN: Symbol = symbol_short!("ADMIN");
const FACTORY: Symbol = symbol_short!("FACTORY");
const NATIVE: Symbol = symbol_short!("NATIVE");
const FEE_BPS: Symbol = symbol_short!("FEE_BPS");
const FEE_DST: Symbol = symbol_short!("FEE_DST");
const CURSOR: Symbol = symbol_short!("CURSOR");
const VAULTS: Symbol = symbol_short!("VAULTS");
const INFO: Symbol = symbol_short!("INFO");
const IDX: Symbol = symbol_short!("IDX");

const TTL_THRESHOLD: u32 = 5_184_000;
const TTL_EXTEND_TO: u32 = 10_368_000;

#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[repr(u32)]
pub enum RegistryError {
    NotInitialized = 1,
    AlreadyInitialized = 2,
    Unauthorized = 3,
    AlreadyRegistered = 4,
    NotRegistered = 5,
    FeeTooHigh = 6,
    NoFees = 7,
    InvalidPagination = 8,
}

/// Scanner output: candidates in scan order plus the window end. The window
/// end always travels with the batch so a zero-hit window still advances
/// the cursor instead of re-scanning the same slice forever.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ScanBatch {
    pub candidates: Vec<Address>,
    pub next_index: u32,
}

/// Counts reported back from one `execute_batch` invocation.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct BatchOutcome {
    pub attempted: u32,
    pub succeeded: u32,
    pub failed: u32,
    pub next_cursor: u32,
}

/// Query/command surface the registry needs from a vault.
#[soroban_sdk::contractclient(name = "VaultClient")]
#[allow(dead_code)]
trait VaultInterface {
    fn can_distribute(env: Env) -> bool;
    fn is_executed(env: Env) -> bool;
    fn distribute_with_fee(env: Env, fee_bps: u32);
    fn get_owner(env: Env) -> Address;
    fn get_heir(env: Env) -> Address;
}

#[contract]
pub struct RegistryContract;

#[contractimpl]
impl RegistryContract {
    pub fn initialize(
        env: Env,
        admin: Address,
        factory: Address,
        native_token: Address,
        fee_collector: Address,
        fee_bps: u32,
    ) -> Result<(), RegistryError> {
        if env.storage().instance().has(&INIT) {
            return Err(RegistryError::AlreadyInitialized);
        }
        if fee_bps > MAX_FEE_BPS {
            return Err(RegistryError::FeeTooHigh);
        }
        admin.require_auth();

        env.storage().instance().set(&ADMIN, &admin);
        env.storage().instance().set(&FACTORY, &factory);
        env.storage().instance().set(&NATIVE, &native_token);
        env.storage().instance().set(&FEE_DST, &fee_collector);
        env.storage().instance().set(&FEE_BPS, &fee_bps);
        env.storage().instance().set(&CURSOR, &0u32);
        env.storage().instance().set(&INIT, &true);
        Ok(())
    }

    // ── Membership ───────────────────────────────────────────────────────────

    /// Adds a vault to the active set. Only the factory or the vault's own
    /// owner may register it; owner and heir are read from the vault itself.
    pub fn register_vault(env: Env, caller: Address, vault: Address) -> Result<(), RegistryError> {
        Self::require_init(&env)?;
        caller.require_auth();

        if Self::is_active(&env, &vault) {
            return Err(RegistryError::AlreadyRegistered);
        }

        let client = VaultClient::new(&env, &vault);
        let owner = client.get_owner();
        let heir = client.get_heir();

        let factory: Address = env
            .storage()
            .instance()
            .get(&FACTORY)
            .ok_or(RegistryError::NotInitialized)?;
        if caller != factory && caller != owner {
            return Err(RegistryError::Unauthorized);
        }

        let mut vaults = Self::active(&env);
        let idx = vaults.len();
        vaults.push_back(vault.clone());
        env.storage().instance().set(&VAULTS, &vaults);

        let idx_key = (IDX, vault.clone());
        env.storage().persistent().set(&idx_key, &idx);
        env.storage()
            .persistent()
            .extend_ttl(&idx_key, TTL_THRESHOLD, TTL_EXTEND_TO);

        let info_key = (INFO, vault.clone());
        let info = VaultInfo {
            owner: owner.clone(),
            heir: heir.clone(),
            active: true,
        };
        env.storage().persistent().set(&info_key, &info);
        env.storage()
            .persistent()
            .extend_ttl(&info_key, TTL_THRESHOLD, TTL_EXTEND_TO);

        events::publish_registered(&env, &vault, &owner, &heir);
        Ok(())
    }

    /// Removes a vault from the active set. Allowed for the registered
    /// owner, the factory, or the vault itself (self-deregistration after
    /// a distribution triggered outside `execute_batch`).
    pub fn unregister_vault(env: Env, caller: Address, vault: Address) -> Result<(), RegistryError> {
        Self::require_init(&env)?;
        caller.require_auth();

        let info: VaultInfo = env
            .storage()
            .persistent()
            .get(&(INFO, vault.clone()))
            .ok_or(RegistryError::NotRegistered)?;
        if !info.active {
            return Err(RegistryError::NotRegistered);
        }

        let factory: Address = env
            .storage()
            .instance()
            .get(&FACTORY)
            .ok_or(RegistryError::NotInitialized)?;
        if caller != info.owner && caller != factory && caller != vault {
            return Err(RegistryError::Unauthorized);
        }

        Self::remove_active(&env, &vault)?;
        events::publish_unregistered(&env, &vault);
        Ok(())
    }

    // ── Scheduler ────────────────────────────────────────────────────────────

    /// Read-only eligibility scan over the next cursor window.
    ///
    /// A vault whose queries error out is skipped; one misbehaving vault
    /// never aborts the window.
    pub fn scan(env: Env) -> (bool, ScanBatch) {
        let vaults = Self::active(&env);
        let len = vaults.len();
        if len == 0 {
            return (
                false,
                ScanBatch {
                    candidates: Vec::new(&env),
                    next_index: 0,
                },
            );
        }

        let mut start: u32 = env.storage().instance().get(&CURSOR).unwrap_or(0);
        if start >= len {
            start = 0;
        }
        let end = start.saturating_add(BATCH_SIZE).min(len);

        let mut candidates = Vec::new(&env);
        for i in start..end {
            let vault = vaults.get(i).unwrap();
            let client = VaultClient::new(&env, &vault);
            let eligible = match client.try_can_distribute() {
                Ok(Ok(v)) => v,
                _ => continue,
            };
            let executed = match client.try_is_executed() {
                Ok(Ok(v)) => v,
                _ => continue,
            };
            if eligible && !executed {
                candidates.push_back(vault);
            }
        }

        (
            !candidates.is_empty(),
            ScanBatch {
                candidates,
                next_index: end,
            },
        )
    }

    /// Executes a candidate batch. Permissionless: the batch may come from
    /// [`scan`](Self::scan) or be built by hand; every entry is re-validated
    /// against the vault's live state, so stale or raced payloads degrade to
    /// skips. Successful vaults are deregistered immediately; failures stay
    /// registered for a future scan cycle.
    ///
    /// The current fee rate travels with each distribution call: the vault
    /// cannot query it back while this contract is on the call stack.
    pub fn execute_batch(env: Env, batch: ScanBatch) -> Result<BatchOutcome, RegistryError> {
        Self::require_init(&env)?;

        let fee_bps: u32 = env.storage().instance().get(&FEE_BPS).unwrap_or(0);
        let attempted = batch.candidates.len();
        let mut succeeded: u32 = 0;
        let mut failed: u32 = 0;

        for vault in batch.candidates.iter() {
            if !Self::is_active(&env, &vault) {
                failed += 1;
                continue;
            }
            let client = VaultClient::new(&env, &vault);
            let eligible = matches!(client.try_can_distribute(), Ok(Ok(true)));
            let executed = matches!(client.try_is_executed(), Ok(Ok(true)));
            if !eligible || executed {
                failed += 1;
                continue;
            }
            match client.try_distribute_with_fee(&fee_bps) {
                Ok(Ok(())) => {
                    Self::remove_active(&env, &vault)?;
                    succeeded += 1;
                    events::publish_vault_distributed(&env, &vault);
                }
                _ => {
                    failed += 1;
                }
            }
        }

        // wrap against the post-removal length
        let len = Self::active(&env).len();
        let next_cursor = if batch.next_index >= len {
            0
        } else {
            batch.next_index
        };
        env.storage().instance().set(&CURSOR, &next_cursor);

        events::publish_batch_processed(
            &env,
            &BatchProcessedEvent {
                attempted,
                succeeded,
                failed,
                next_cursor,
                timestamp: env.ledger().timestamp(),
            },
        );

        Ok(BatchOutcome {
            attempted,
            succeeded,
            failed,
            next_cursor,
        })
    }

    // ── Fee administration ───────────────────────────────────────────────────

    pub fn set_distribution_fee_percent(env: Env, fee_bps: u32) -> Result<(), RegistryError> {
        Self::auth_admin(&env)?;
        if fee_bps > MAX_FEE_BPS {
            return Err(RegistryError::FeeTooHigh);
        }
        env.storage().instance().set(&FEE_BPS, &fee_bps);
        events::publish_fee_percent_changed(&env, fee_bps);
        Ok(())
    }

    pub fn set_fee_collector(env: Env, collector: Address) -> Result<(), RegistryError> {
        Self::auth_admin(&env)?;
        env.storage().instance().set(&FEE_DST, &collector);
        events::publish_fee_collector_changed(&env, &collector);
        Ok(())
    }

    /// Sweeps the registry's accumulated native-asset balance (fees
    /// forwarded by distributing vaults) to the collector.
    pub fn withdraw_fees(env: Env) -> Result<i128, RegistryError> {
        Self::auth_admin(&env)?;
        let native: Address = env
            .storage()
            .instance()
            .get(&NATIVE)
            .ok_or(RegistryError::NotInitialized)?;
        let client = token::Client::new(&env, &native);
        let this = env.current_contract_address();
        let balance = client.balance(&this);
        if balance <= 0 {
            return Err(RegistryError::NoFees);
        }
        let collector: Address = env
            .storage()
            .instance()
            .get(&FEE_DST)
            .ok_or(RegistryError::NotInitialized)?;
        client.transfer(&this, &collector, &balance);
        events::publish_fees_withdrawn(&env, &collector, balance);
        Ok(balance)
    }

    /// Best-effort fee lookup target for distributing vaults.
    pub fn get_distribution_fee_percent(env: Env) -> u32 {
        env.storage().instance().get(&FEE_BPS).unwrap_or(0)
    }

    // ── Read views ───────────────────────────────────────────────────────────

    pub fn get_vault_count(env: Env) -> u32 {
        Self::active(&env).len()
    }

    pub fn get_cursor(env: Env) -> u32 {
        env.storage().instance().get(&CURSOR).unwrap_or(0)
    }

    /// Paginated slice of the active set. Order is positional and only
    /// stable between mutations.
    pub fn get_vaults(env: Env, offset: u32, limit: u32) -> Result<Vec<Address>, RegistryError> {
        if limit == 0 {
            return Err(RegistryError::InvalidPagination);
        }
        let vaults = Self::active(&env);
        let len = vaults.len();
        let end = offset.saturating_add(limit).min(len);
        let mut out = Vec::new(&env);
        for i in offset.min(len)..end {
            out.push_back(vaults.get(i).unwrap());
        }
        Ok(out)
    }

    pub fn get_vault_info(env: Env, vault: Address) -> Result<VaultInfo, RegistryError> {
        env.storage()
            .persistent()
            .get(&(INFO, vault))
            .ok_or(RegistryError::NotRegistered)
    }

    /// Full sweep of currently-distributable vaults, with the same per-vault
    /// failure tolerance as `scan`. Unbounded; intended for off-chain reads.
    pub fn get_distributable_vaults(env: Env) -> Vec<Address> {
        let vaults = Self::active(&env);
        let mut out = Vec::new(&env);
        for vault in vaults.iter() {
            let client = VaultClient::new(&env, &vault);
            let eligible = match client.try_can_distribute() {
                Ok(Ok(v)) => v,
                _ => continue,
            };
            let executed = match client.try_is_executed() {
                Ok(Ok(v)) => v,
                _ => continue,
            };
            if eligible && !executed {
                out.push_back(vault);
            }
        }
        out
    }

    // ── Internals ────────────────────────────────────────────────────────────

    /// Swap-pop removal, the sole mutation path for the vec/index pair:
    /// the last element replaces the removed one, the index side-table is
    /// repointed, and the info record flips inactive.
    fn remove_active(env: &Env, vault: &Address) -> Result<(), RegistryError> {
        let mut vaults = Self::active(env);
        let idx: u32 = env
            .storage()
            .persistent()
            .get(&(IDX, vault.clone()))
            .ok_or(RegistryError::NotRegistered)?;
        let last = vaults.len().saturating_sub(1);
        if idx != last {
            let moved = vaults.get(last).unwrap();
            vaults.set(idx, moved.clone());
            let moved_key = (IDX, moved);
            env.storage().persistent().set(&moved_key, &idx);
            env.storage()
                .persistent()
                .extend_ttl(&moved_key, TTL_THRESHOLD, TTL_EXTEND_TO);
        }
        vaults.pop_back();
        env.storage().instance().set(&VAULTS, &vaults);
        env.storage().persistent().remove(&(IDX, vault.clone()));

        let info_key = (INFO, vault.clone());
        if let Some(mut info) = env.storage().persistent().get::<_, VaultInfo>(&info_key) {
            info.active = false;
            env.storage().persistent().set(&info_key, &info);
        }
        Ok(())
    }

    fn active(env: &Env) -> Vec<Address> {
        env.storage()
            .instance()
            .get(&VAULTS)
            .unwrap_or_else(|| Vec::new(env))
    }

    fn is_active(env: &Env, vault: &Address) -> bool {
        env.storage()
            .persistent()
            .get::<_, VaultInfo>(&(INFO, vault.clone()))
            .map(|info| info.active)
            .unwrap_or(false)
    }

    fn auth_admin(env: &Env) -> Result<Address, RegistryError> {
        Self::require_init(env)?;
        let admin: Address = env
            .storage()
            .instance()
            .get(&ADMIN)
            .ok_or(RegistryError::NotInitialized)?;
        admin.require_auth();
        Ok(admin)
    }

    fn require_init(env: &Env) -> Result<(), RegistryError> {
        if !env.storage().instance().has(&INIT) {
            return Err(RegistryError::NotInitialized);
        }
        Ok(())
    }
}
