//! Structured event publishing for the registry contract.

use soroban_sdk::{contracttype, symbol_short, Address, Env};

/// Fired after every `execute_batch` call, hit or miss.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct BatchProcessedEvent {
    pub attempted: u32,
    pub succeeded: u32,
    pub failed: u32,
    pub next_cursor: u32,
    pub timestamp: u64,
}

pub fn publish_registered(env: &Env, vault: &Address, owner: &Address, heir: &Address) {
    env.events().publish(
        (symbol_short!("REG_ADD"), vault.clone()),
        (owner.clone(), heir.clone()),
    );
}

pub fn publish_unregistered(env: &Env, vault: &Address) {
    env.events()
        .publish((symbol_short!("REG_DEL"),), vault.clone());
}

pub fn publish_vault_distributed(env: &Env, vault: &Address) {
    env.events()
        .publish((symbol_short!("V_DONE"),), vault.clone());
}

pub fn publish_batch_processed(env: &Env, event: &BatchProcessedEvent) {
    env.events()
        .publish((symbol_short!("BATCH"),), event.clone());
}

pub fn publish_fee_percent_changed(env: &Env, fee_bps: u32) {
    env.events().publish((symbol_short!("FEE_SET"),), fee_bps);
}

pub fn publish_fee_collector_changed(env: &Env, collector: &Address) {
    env.events()
        .publish((symbol_short!("FEE_DST"),), collector.clone());
}

pub fn publish_fees_withdrawn(env: &Env, collector: &Address, amount: i128) {
    env.events()
        .publish((symbol_short!("FEE_WD"),), (collector.clone(), amount));
}
