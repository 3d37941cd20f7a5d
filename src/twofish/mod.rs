//! Twofish: a 128-bit-block cipher with 128/192/256-bit keys, a
//! Reed-Solomon-derived key schedule, and a 16-round Feistel-like network.

mod twofish_const_tables;
mod twofish;

pub use twofish::Twofish;
