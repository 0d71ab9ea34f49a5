//! Canonical pick identity.
//!
//! Every candidate's identity is a pipe-joined string of its normalized
//! identity attributes; the `pick_id` is a truncated SHA-256 digest of that
//! string. Scores and the quoting book are excluded, so multiple quotes of
//! the same logical bet always collide — that collision *is* the
//! deduplication key.

use sha2::{Digest, Sha256};

use crate::types::CandidatePick;

/// Number of lowercase hex characters retained from the digest.
pub const PICK_ID_HEX_LEN: usize = 12;

/// Build the canonical identity string:
/// `sport|event|market|SIDE|line(2dp)|player`.
///
/// Sport, event, and market are lowercased; the side is upper-cased; the
/// line is rounded to two decimals; the player slot is the normalized name
/// (empty string if none). Missing fields were already defaulted to "" by
/// normalization.
pub fn canonical_identity(pick: &CandidatePick) -> String {
    format!(
        "{}|{}|{}|{}|{:.2}|{}",
        pick.sport.to_lowercase(),
        pick.event.to_lowercase(),
        pick.market_label.to_lowercase(),
        pick.side.to_uppercase(),
        pick.line,
        normalize_name(&pick.player_name),
    )
}

/// Content hash of the identity attributes.
///
/// Reduction, fixed for cross-implementation compatibility: SHA-256 of the
/// canonical identity string, rendered as lowercase hex, truncated to the
/// first 12 characters.
pub fn pick_id(pick: &CandidatePick) -> String {
    let digest = Sha256::digest(canonical_identity(pick).as_bytes());
    let hex = format!("{:x}", digest);
    hex[..PICK_ID_HEX_LEN].to_string()
}

/// Canonical descriptor string fed to the esoteric engine:
/// `event|line(2dp)|player`.
pub fn esoteric_descriptor(pick: &CandidatePick) -> String {
    format!(
        "{}|{:.2}|{}",
        pick.event.to_lowercase(),
        pick.line,
        normalize_name(&pick.player_name),
    )
}

/// First 8 hex digits of SHA-256(input), interpreted as a 32-bit integer.
///
/// Equivalent to reading the first four digest bytes big-endian. This is
/// the numerology engine's hash-to-integer reduction; keep it bit-stable.
pub fn hash_prefix_u32(input: &str) -> u32 {
    let digest = Sha256::digest(input.as_bytes());
    u32::from_be_bytes([digest[0], digest[1], digest[2], digest[3]])
}

/// Lowercase, trim, and collapse internal whitespace.
pub fn normalize_name(name: &str) -> String {
    name.to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Diversity key for the per-player cap.
///
/// Canonical player id wins over the name. Props with no player identity at
/// all share the empty key (a valid, capped bucket — the filter logs when
/// it fills up); non-prop markets carry no player key and bypass the cap.
pub fn player_key(pick: &CandidatePick) -> Option<String> {
    let id = pick.player_id.trim();
    if !id.is_empty() {
        return Some(id.to_lowercase());
    }
    let name = normalize_name(&pick.player_name);
    if !name.is_empty() {
        return Some(name);
    }
    if pick.market.is_prop() {
        return Some(String::new());
    }
    None
}

/// Diversity key for the per-game cap: the normalized resolved event
/// (event id, else matchup). May be empty when upstream identity is
/// missing; the empty string is a valid shared key.
pub fn game_key(pick: &CandidatePick) -> String {
    normalize_name(&pick.event)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
