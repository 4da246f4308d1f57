//! Structured event publishing for the vault contract.

use soroban_sdk::{contracttype, symbol_short, Address, Env};

/// Fired once when the terminal distribution completes.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DistributedEvent {
    pub heir: Address,
    pub native_paid: i128,
    pub fee_paid: i128,
    pub assets_moved: u32,
    pub timestamp: u64,
}

/// Fired once when the owner reclaims the vault contents.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct EmergencyWithdrawnEvent {
    pub owner: Address,
    pub native_paid: i128,
    pub assets_moved: u32,
    pub timestamp: u64,
}

pub fn publish_initialized(env: &Env, owner: &Address, heir: &Address, period: u64) {
    env.events().publish(
        (symbol_short!("V_INIT"),),
        (owner.clone(), heir.clone(), period),
    );
}

pub fn publish_activity(env: &Env, owner: &Address, timestamp: u64) {
    env.events()
        .publish((symbol_short!("V_PING"),), (owner.clone(), timestamp));
}

pub fn publish_heir_changed(env: &Env, old_heir: &Address, new_heir: &Address) {
    env.events().publish(
        (symbol_short!("HEIR_SET"),),
        (old_heir.clone(), new_heir.clone()),
    );
}

pub fn publish_period_changed(env: &Env, period: u64) {
    env.events().publish((symbol_short!("PRD_SET"),), period);
}

pub fn publish_native_deposit(env: &Env, from: &Address, amount: i128) {
    env.events()
        .publish((symbol_short!("DEP_NAT"),), (from.clone(), amount));
}

pub fn publish_fungible_deposit(env: &Env, token: &Address, amount: i128) {
    env.events()
        .publish((symbol_short!("DEP_FT"),), (token.clone(), amount));
}

pub fn publish_unique_deposit(env: &Env, collection: &Address, id: u64) {
    env.events()
        .publish((symbol_short!("DEP_NFT"),), (collection.clone(), id));
}

pub fn publish_semi_fungible_deposit(env: &Env, collection: &Address, id: u64, amount: i128) {
    env.events()
        .publish((symbol_short!("DEP_SFT"),), (collection.clone(), id, amount));
}

pub fn publish_native_swept(env: &Env, to: &Address, amount: i128, fee: i128) {
    env.events()
        .publish((symbol_short!("SWP_NAT"),), (to.clone(), amount, fee));
}

pub fn publish_fungible_swept(env: &Env, token: &Address, to: &Address, amount: i128) {
    env.events().publish(
        (symbol_short!("SWP_FT"), token.clone()),
        (to.clone(), amount),
    );
}

pub fn publish_unique_swept(env: &Env, collection: &Address, to: &Address, id: u64) {
    env.events().publish(
        (symbol_short!("SWP_NFT"), collection.clone()),
        (to.clone(), id),
    );
}

pub fn publish_semi_fungible_swept(
    env: &Env,
    collection: &Address,
    to: &Address,
    id: u64,
    amount: i128,
) {
    env.events().publish(
        (symbol_short!("SWP_SFT"), collection.clone()),
        (to.clone(), id, amount),
    );
}

pub fn publish_distributed(env: &Env, event: &DistributedEvent) {
    env.events()
        .publish((symbol_short!("DISTRIB"),), event.clone());
}

pub fn publish_emergency_withdrawn(env: &Env, event: &EmergencyWithdrawnEvent) {
    env.events()
        .publish((symbol_short!("EMERG_WD"),), event.clone());
}
