//! # Payment signature verification
//!
//! When a payment completes on the gateway's hosted page, the gateway issues a confirmation
//! consisting of its order id, a payment id, and a signature. The signature is the HMAC-SHA-256 of
//! `"{order_id}|{payment_id}"` keyed with the API secret, hex-encoded. Anyone holding the secret
//! can recompute it; nobody else can forge it.
//!
//! Verification recomputes the tag and compares it against the hex-decoded signature from the
//! request using the constant-time comparison provided by the `hmac` crate. A notification whose
//! signature does not verify must be treated as forged or corrupted and discarded without any
//! state change.

use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// The canonical string the gateway signs: `"{razorpay_order_id}|{razorpay_payment_id}"`.
pub fn signature_message(razorpay_order_id: &str, razorpay_payment_id: &str) -> String {
    format!("{razorpay_order_id}|{razorpay_payment_id}")
}

/// Computes the hex-encoded HMAC-SHA-256 tag for the given message. Exposed so that tests (and
/// tools) can produce valid signatures against a known secret.
pub fn compute_payment_signature(secret: &str, message: &str) -> String {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC accepts keys of any length");
    mac.update(message.as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

/// Verifies a payment confirmation signature. Returns `false` for a malformed (non-hex) signature
/// as well as for a well-formed signature that does not match.
pub fn verify_payment_signature(
    razorpay_order_id: &str,
    razorpay_payment_id: &str,
    signature: &str,
    secret: &str,
) -> bool {
    let provided = match hex::decode(signature) {
        Ok(bytes) => bytes,
        Err(_) => return false,
    };
    let message = signature_message(razorpay_order_id, razorpay_payment_id);
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC accepts keys of any length");
    mac.update(message.as_bytes());
    mac.verify_slice(&provided).is_ok()
}
