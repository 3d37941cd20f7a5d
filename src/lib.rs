
extern crate rmath;

mod cipher;
pub use cipher::Cipher;

mod crypto_err;
pub use crypto_err::{CryptoErrorKind, CryptoError};

mod bigint;
pub use bigint::BigUint;

mod mprsa;
pub use mprsa::{MultiPowerRsa, PrivateKey, PublicKey};

mod twofish;
pub use twofish::Twofish;
