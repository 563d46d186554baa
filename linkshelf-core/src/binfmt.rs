//! `magic (4 bytes) | version (u32 LE) | bincode body` framing for files
//! kept in the config directory.

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::{CoreError, CoreResult};

const HEADER_LEN: usize = 8;

pub fn serialize_with_header<T: Serialize>(
    magic: [u8; 4],
    version: u32,
    payload: &T,
) -> CoreResult<Vec<u8>> {
    let body = bincode::serialize(payload).map_err(CoreError::storage)?;
    let mut out = Vec::with_capacity(HEADER_LEN + body.len());
    out.extend_from_slice(&magic);
    out.extend_from_slice(&version.to_le_bytes());
    out.extend_from_slice(&body);
    Ok(out)
}

pub fn deserialize_with_header<T: DeserializeOwned>(
    bytes: &[u8],
    magic: [u8; 4],
    version: u32,
) -> CoreResult<T> {
    if bytes.len() < HEADER_LEN {
        return Err(CoreError::storage("file shorter than its header"));
    }
    if bytes[0..4] != magic {
        return Err(CoreError::storage("unexpected file magic"));
    }
    let mut ver = [0u8; 4];
    ver.copy_from_slice(&bytes[4..8]);
    let found = u32::from_le_bytes(ver);
    if found != version {
        return Err(CoreError::storage(format!(
            "unsupported format version {found}, expected {version}"
        )));
    }
    bincode::deserialize(&bytes[HEADER_LEN..]).map_err(CoreError::storage)
}
