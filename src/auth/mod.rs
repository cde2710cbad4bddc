//! Token-based authentication
//!
//! Every outbound SOAP call carries a freshly signed `TokenPassport` header.
//! Passports are never cached or reused: the signature binds the nonce and
//! timestamp, so reuse would be replay-vulnerable.

mod passport;

pub use passport::{TokenPassport, SIGNATURE_ALGORITHM};

#[cfg(test)]
mod tests;
