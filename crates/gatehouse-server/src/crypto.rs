use std::num::NonZeroU32;

use pbkdf2::pbkdf2_hmac;
use sha2::Sha256;

const OUTPUT_LEN: usize = 32;

/// Derive the server-side password hash.
///
/// PBKDF2-HMAC-SHA256 with a random per-user salt and server-configured
/// iterations; both the salt and the iteration count are stored next to the
/// hash so the work factor can be raised without invalidating old rows.
pub fn hash_password(secret: &[u8], salt: &[u8], iterations: u32) -> Vec<u8> {
    let mut out = vec![0u8; OUTPUT_LEN];
    let iterations = NonZeroU32::new(iterations).expect("Iterations must be non-zero");
    pbkdf2_hmac::<Sha256>(secret, salt, iterations.get(), &mut out);
    out
}

pub fn verify_password_hash(secret: &[u8], salt: &[u8], expected: &[u8], iterations: u32) -> bool {
    let iterations = NonZeroU32::new(iterations).expect("Iterations must be non-zero");
    if expected.len() != OUTPUT_LEN {
        return false;
    }

    // Derive and constant-time compare.
    let mut out = vec![0u8; OUTPUT_LEN];
    pbkdf2_hmac::<Sha256>(secret, salt, iterations.get(), &mut out);
    subtle::ConstantTimeEq::ct_eq(out.as_ref(), expected).into()
}

/// [`hash_password`] off the async executor.
///
/// At the production iteration count the derivation takes long enough to
/// stall a tokio worker thread, so request handlers go through here.
pub async fn hash_password_blocking(secret: Vec<u8>, salt: Vec<u8>, iterations: u32) -> Vec<u8> {
    tokio::task::spawn_blocking(move || hash_password(&secret, &salt, iterations))
        .await
        .expect("Password hashing task panicked")
}

/// [`verify_password_hash`] off the async executor.
pub async fn verify_password_hash_blocking(
    secret: Vec<u8>,
    salt: Vec<u8>,
    expected: Vec<u8>,
    iterations: u32,
) -> bool {
    tokio::task::spawn_blocking(move || verify_password_hash(&secret, &salt, &expected, iterations))
        .await
        .expect("Password verification task panicked")
}

/// Constant-time equality for presented verification secrets.
pub fn secrets_match(presented: &str, stored: &str) -> bool {
    if presented.len() != stored.len() {
        return false;
    }
    subtle::ConstantTimeEq::ct_eq(presented.as_bytes(), stored.as_bytes()).into()
}
