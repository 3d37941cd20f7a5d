//! Multi-Power RSA: `n = p^(b-1) * q`, decryption accelerated by CRT and
//! Hensel lifting.

mod mprsa;

pub use mprsa::{MultiPowerRsa, PrivateKey, PublicKey};

#[cfg(test)]
mod mprsa_test;
