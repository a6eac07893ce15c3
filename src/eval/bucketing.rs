use sha1::{Digest, Sha1};

/// Hashes a (flag key, user key) pair into a bucket value in `[0,100)`.
///
/// The bucket is the first 4 bytes of `sha1(flag_key || user_key)` read as a
/// big-endian `u32`, reduced modulo 100 000 and divided by 1 000, giving three
/// decimal digits of resolution. The flag key is mixed into the input so the
/// same user lands in unrelated buckets for unrelated flags.
///
/// The exact construction is a stable contract: the same pair always yields
/// the same bucket within and across runs of one deployment.
pub(crate) fn bucket(flag_key: &str, user_key: &str) -> f64 {
    let mut hasher = Sha1::new();
    hasher.update(flag_key.as_bytes());
    hasher.update(user_key.as_bytes());
    let digest = hasher.finalize();
    let hash = u32::from_be_bytes([digest[0], digest[1], digest[2], digest[3]]);
    f64::from(hash % 100_000) / 1000.0
}
