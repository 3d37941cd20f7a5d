use std::error::Error;
use std::fmt::{Display, Formatter, Debug};

#[derive(Copy, Clone, Eq, PartialEq)]
pub enum CryptoErrorKind {
    /// MPRSA plaintext integer is not smaller than the modulus.
    MessageTooLarge,
    /// MPRSA ciphertext integer is not smaller than the modulus.
    CiphertextTooLarge,
    /// A key string (wire format) could not be parsed, or parsed to
    /// values that fail the key's own invariants.
    MalformedKey,
    /// A Twofish block is not exactly 16 bytes.
    BadBlockSize,
    /// A Twofish key is not exactly 16, 24, or 32 bytes.
    BadKeySize,
    /// A big-integer operation (e.g. prime generation) could not
    /// allocate or complete.
    AllocationFailure,
    /// An internal arithmetic invariant that should be unconditionally
    /// true (a modular inverse that must exist, a Hensel-lift error term
    /// that must be exactly divisible) did not hold; this indicates a
    /// corrupt key rather than bad input.
    InternalInvariantViolated,
}

impl Debug for CryptoErrorKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            CryptoErrorKind::MessageTooLarge => write!(f, "{}", "MessageTooLarge"),
            CryptoErrorKind::CiphertextTooLarge => write!(f, "{}", "CiphertextTooLarge"),
            CryptoErrorKind::MalformedKey => write!(f, "{}", "MalformedKey"),
            CryptoErrorKind::BadBlockSize => write!(f, "{}", "BadBlockSize"),
            CryptoErrorKind::BadKeySize => write!(f, "{}", "BadKeySize"),
            CryptoErrorKind::AllocationFailure => write!(f, "{}", "AllocationFailure"),
            CryptoErrorKind::InternalInvariantViolated => write!(f, "{}", "InternalInvariantViolated"),
        }
    }
}

#[derive(Debug)]
pub struct CryptoError {
    kind: CryptoErrorKind,
    err: Box<dyn std::error::Error + Sync + Send>,
}

impl CryptoError {
    pub fn new<E>(kind: CryptoErrorKind, err: E) -> CryptoError 
        where E: Into<Box<dyn Error + Sync + Send>>{
        CryptoError {
            kind,
            err: err.into(),
        }
    }
    
    pub fn kind(&self) -> CryptoErrorKind {
        self.kind
    }
}

impl Display for CryptoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}{}", self.kind, self.err)
    }
}

impl Error for CryptoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        self.err.source()
    }
}