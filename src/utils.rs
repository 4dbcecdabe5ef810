//! Utility functions for identifiers and index keys

use bech32::Bech32m;
use chrono::{DateTime, Utc};
use uuid7::uuid7;

pub const USER_HRP: &str = "user_";
pub const ITEM_HRP: &str = "item_";
pub const BOOKING_HRP: &str = "booking_";

// construct a unique id then encode using bech32
pub fn new_uuid_to_bech32(hrp: &str) -> anyhow::Result<String> {
    let hrp = bech32::Hrp::parse(hrp)?;
    let encode = bech32::encode::<Bech32m>(hrp, uuid7().as_bytes())?;
    Ok(encode)
}

/// Big-endian bytes of a timestamp whose lexicographic order matches
/// chronological order, including instants before the unix epoch.
///
/// Seconds come first with the sign bit flipped, followed by the
/// sub-second nanoseconds, so the key is as precise as the stored record.
pub fn sortable_instant(instant: &DateTime<Utc>) -> [u8; 12] {
    let mut key = [0u8; 12];
    key[..8].copy_from_slice(&((instant.timestamp() as u64) ^ (1 << 63)).to_be_bytes());
    key[8..].copy_from_slice(&instant.timestamp_subsec_nanos().to_be_bytes());
    key
}
