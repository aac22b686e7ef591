//! Error types for the fallible external-interface paths.
//!
//! Everything inside the topology/operator layer follows the taxonomy of
//! bad-argument (silent no-op) vs. degenerate-geometry (skip and continue);
//! only file I/O and texture decoding are genuinely fallible, so this is the
//! only place a typed error shows up.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum KernelError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("base64 decode error: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("embedded texture size mismatch: expected {expected} bytes, got {got}")]
    InvalidTexture { expected: usize, got: usize },
}
