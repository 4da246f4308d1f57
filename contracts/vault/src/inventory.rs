//! Per-class asset inventory bookkeeping.
//!
//! The vault tracks which assets it has ever received so the terminal sweep
//! can enumerate them without external indexing:
//! - fungible tokens: ordered list of known token contracts (balances are
//!   always read live from the token, never cached);
//! - unique tokens: per-collection ordered id lists plus existence flags so
//!   iteration never yields duplicates;
//! - semi-fungible tokens: per-collection id lists, existence flags, and a
//!   locally tracked balance per id (receipt can be partial and repeated).
//!
//! All keys live in persistent storage and get their TTL bumped on write.

use soroban_sdk::{symbol_short, Address, Env, IntoVal, Symbol, Val, Vec};

const FT_LIST: Symbol = symbol_short!("FT_LIST");
const FT_KNOWN: Symbol = symbol_short!("FT_KNOWN");
const NFT_COLS: Symbol = symbol_short!("NFT_COLS");
const NFT_IDS: Symbol = symbol_short!("NFT_IDS");
const NFT_HAS: Symbol = symbol_short!("NFT_HAS");
const SFT_COLS: Symbol = symbol_short!("SFT_COLS");
const SFT_IDS: Symbol = symbol_short!("SFT_IDS");
const SFT_HAS: Symbol = symbol_short!("SFT_HAS");
const SFT_BAL: Symbol = symbol_short!("SFT_BAL");

const TTL_THRESHOLD: u32 = 5_184_000;
const TTL_EXTEND_TO: u32 = 10_368_000;

fn bump<K: IntoVal<Env, Val>>(env: &Env, key: &K) {
    env.storage()
        .persistent()
        .extend_ttl(key, TTL_THRESHOLD, TTL_EXTEND_TO);
}

// ── Fungible tokens ──────────────────────────────────────────────────────────

pub fn fungible_tokens(env: &Env) -> Vec<Address> {
    env.storage()
        .persistent()
        .get(&FT_LIST)
        .unwrap_or_else(|| Vec::new(env))
}

/// Registers a token on first sight; later deposits of the same token are
/// no-ops here.
pub fn note_fungible(env: &Env, token: &Address) {
    let known: bool = env
        .storage()
        .persistent()
        .get(&(FT_KNOWN, token.clone()))
        .unwrap_or(false);
    if known {
        return;
    }
    let mut list = fungible_tokens(env);
    list.push_back(token.clone());
    env.storage().persistent().set(&FT_LIST, &list);
    bump(env, &FT_LIST);
    env.storage().persistent().set(&(FT_KNOWN, token.clone()), &true);
    bump(env, &(FT_KNOWN, token.clone()));
}

pub fn clear_fungible(env: &Env) {
    for token in fungible_tokens(env).iter() {
        env.storage().persistent().remove(&(FT_KNOWN, token));
    }
    env.storage().persistent().remove(&FT_LIST);
}

// ── Unique tokens ────────────────────────────────────────────────────────────

pub fn unique_collections(env: &Env) -> Vec<Address> {
    env.storage()
        .persistent()
        .get(&NFT_COLS)
        .unwrap_or_else(|| Vec::new(env))
}

pub fn unique_ids(env: &Env, collection: &Address) -> Vec<u64> {
    env.storage()
        .persistent()
        .get(&(NFT_IDS, collection.clone()))
        .unwrap_or_else(|| Vec::new(env))
}

pub fn holds_unique(env: &Env, collection: &Address, id: u64) -> bool {
    env.storage()
        .persistent()
        .get(&(NFT_HAS, collection.clone(), id))
        .unwrap_or(false)
}

/// Records a received unique token. Returns `false` if the (collection, id)
/// pair is already held.
pub fn record_unique(env: &Env, collection: &Address, id: u64) -> bool {
    if holds_unique(env, collection, id) {
        return false;
    }
    let mut ids = unique_ids(env, collection);
    if ids.is_empty() {
        let mut cols = unique_collections(env);
        cols.push_back(collection.clone());
        env.storage().persistent().set(&NFT_COLS, &cols);
        bump(env, &NFT_COLS);
    }
    ids.push_back(id);
    env.storage().persistent().set(&(NFT_IDS, collection.clone()), &ids);
    bump(env, &(NFT_IDS, collection.clone()));
    env.storage().persistent().set(&(NFT_HAS, collection.clone(), id), &true);
    bump(env, &(NFT_HAS, collection.clone(), id));
    true
}

pub fn clear_unique(env: &Env) {
    for collection in unique_collections(env).iter() {
        for id in unique_ids(env, &collection).iter() {
            env.storage().persistent().remove(&(NFT_HAS, collection.clone(), id));
        }
        env.storage().persistent().remove(&(NFT_IDS, collection.clone()));
    }
    env.storage().persistent().remove(&NFT_COLS);
}

// ── Semi-fungible tokens ─────────────────────────────────────────────────────

pub fn semi_fungible_collections(env: &Env) -> Vec<Address> {
    env.storage()
        .persistent()
        .get(&SFT_COLS)
        .unwrap_or_else(|| Vec::new(env))
}

pub fn semi_fungible_ids(env: &Env, collection: &Address) -> Vec<u64> {
    env.storage()
        .persistent()
        .get(&(SFT_IDS, collection.clone()))
        .unwrap_or_else(|| Vec::new(env))
}

pub fn semi_fungible_balance(env: &Env, collection: &Address, id: u64) -> i128 {
    env.storage()
        .persistent()
        .get(&(SFT_BAL, collection.clone(), id))
        .unwrap_or(0)
}

/// Accumulates a semi-fungible receipt into the tracked balance.
pub fn add_semi_fungible(env: &Env, collection: &Address, id: u64, amount: i128) {
    let has: bool = env
        .storage()
        .persistent()
        .get(&(SFT_HAS, collection.clone(), id))
        .unwrap_or(false);
    if !has {
        let mut ids = semi_fungible_ids(env, collection);
        if ids.is_empty() {
            let mut cols = semi_fungible_collections(env);
            cols.push_back(collection.clone());
            env.storage().persistent().set(&SFT_COLS, &cols);
            bump(env, &SFT_COLS);
        }
        ids.push_back(id);
        env.storage().persistent().set(&(SFT_IDS, collection.clone()), &ids);
        bump(env, &(SFT_IDS, collection.clone()));
        env.storage().persistent().set(&(SFT_HAS, collection.clone(), id), &true);
        bump(env, &(SFT_HAS, collection.clone(), id));
    }
    let balance = semi_fungible_balance(env, collection, id);
    env.storage().persistent().set(
        &(SFT_BAL, collection.clone(), id),
        &balance.saturating_add(amount),
    );
    bump(env, &(SFT_BAL, collection.clone(), id));
}

pub fn clear_semi_fungible(env: &Env) {
    for collection in semi_fungible_collections(env).iter() {
        for id in semi_fungible_ids(env, &collection).iter() {
            env.storage().persistent().remove(&(SFT_HAS, collection.clone(), id));
            env.storage().persistent().remove(&(SFT_BAL, collection.clone(), id));
        }
        env.storage().persistent().remove(&(SFT_IDS, collection.clone()));
    }
    env.storage().persistent().remove(&SFT_COLS);
}
