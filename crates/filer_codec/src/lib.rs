//! # Filer Codec
//!
//! Payload encoding for Filer artifacts.
//!
//! Artifacts are arbitrary Rust values. Before they touch the disk they are
//! serialized to CBOR with `serde`; loading reverses the process. The bytes
//! on disk are exactly the bytes uploaded to the remote store, so the codec
//! is the only place that interprets payload contents.
//!
//! ## Usage
//!
//! ```
//! use filer_codec::{from_payload, to_payload};
//!
//! let bytes = to_payload(&vec![1u32, 2, 3]).unwrap();
//! let decoded: Vec<u32> = from_payload(&bytes).unwrap();
//! assert_eq!(decoded, vec![1, 2, 3]);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod error;

pub use error::{CodecError, CodecResult};

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::io::Cursor;

/// File extension used for encoded payloads on disk.
pub const PAYLOAD_EXTENSION: &str = "flr";

/// Encodes a value into payload bytes.
///
/// # Errors
///
/// Returns `EncodingFailed` if the value cannot be serialized.
pub fn to_payload<T: Serialize + ?Sized>(value: &T) -> CodecResult<Vec<u8>> {
    let mut buf = Vec::new();
    ciborium::into_writer(value, &mut buf).map_err(|e| CodecError::encoding_failed(e.to_string()))?;
    Ok(buf)
}

/// Decodes a value from payload bytes.
///
/// The whole input must be consumed by a single value.
///
/// # Errors
///
/// Returns `DecodingFailed` if the bytes are not a valid encoding of `T`,
/// or `TrailingBytes` if data follows the value.
pub fn from_payload<T: DeserializeOwned>(bytes: &[u8]) -> CodecResult<T> {
    let mut cursor = Cursor::new(bytes);
    let value = ciborium::from_reader(&mut cursor)
        .map_err(|e| CodecError::decoding_failed(e.to_string()))?;

    let consumed = usize::try_from(cursor.position()).unwrap_or(bytes.len());
    if consumed < bytes.len() {
        return Err(CodecError::TrailingBytes {
            remaining: bytes.len() - consumed,
        });
    }

    Ok(value)
}
