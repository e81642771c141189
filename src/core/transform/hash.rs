//! Device pseudonymization

use sha2::{Digest, Sha256};

/// Hash a device description with SHA-256
///
/// Returns the lowercase hex digest (64 characters). The mapping is
/// deterministic and one-way.
///
/// # Examples
///
/// ```
/// use vitalstream::core::transform::hash_device;
///
/// let digest = hash_device("<<HKDevice>>, name:Apple Watch");
/// assert_eq!(digest.len(), 64);
/// assert_eq!(digest, hash_device("<<HKDevice>>, name:Apple Watch"));
/// ```
pub fn hash_device(device: &str) -> String {
    let digest = Sha256::digest(device.as_bytes());
    format!("{digest:x}")
}
