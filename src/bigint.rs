//! A thin façade over the arbitrary-precision integer backend.
//!
//! `mprsa` never touches `rmath` directly; every big-integer operation it
//! needs is named here once so the backend can be swapped without touching
//! the RSA math itself.

use rmath::bigint::{BigInt, Nat};
use rmath::rand::IterSource;
use std::cmp::Ordering;
use std::fmt;
use std::ops::{Add, AddAssign, Mul, MulAssign, Sub, SubAssign};
use std::str::FromStr;

use crate::{CryptoError, CryptoErrorKind};

/// An arbitrary-precision non-negative integer.
///
/// Negative intermediate values can still occur from `sub`; callers that
/// need the sign check it with `is_negative`, the same way
/// `mengsuenyan-rcrypto`'s RSA CRT path checks `signnum()` after a
/// subtraction and adds the modulus back in if it went negative.
#[derive(Clone)]
pub struct BigUint(BigInt);

impl BigUint {
    pub fn zero() -> Self {
        Self::from_u32(0)
    }

    pub fn one() -> Self {
        Self::from_u32(1)
    }

    pub fn from_u32(v: u32) -> Self {
        BigUint(BigInt::from(v))
    }

    pub fn from_be_bytes(bytes: &[u8]) -> Self {
        BigUint(BigInt::from_be_bytes(bytes))
    }

    pub fn to_be_bytes(&self) -> Vec<u8> {
        self.0.to_be_bytes()
    }

    /// Parses a hex string, with or without a leading `0x`/`0X`.
    pub fn from_hex(s: &str) -> Result<Self, CryptoError> {
        let owned;
        let s = if s.starts_with("0x") || s.starts_with("0X") {
            s
        } else {
            owned = format!("0x{}", s);
            owned.as_str()
        };
        BigInt::from_str(s)
            .map(BigUint)
            .map_err(|e| CryptoError::new(CryptoErrorKind::MalformedKey, format!("{}", e)))
    }

    pub fn to_hex(&self) -> String {
        format!("{:x}", self.0)
    }

    pub fn from_decimal(s: &str) -> Result<Self, CryptoError> {
        BigInt::from_str(s)
            .map(BigUint)
            .map_err(|e| CryptoError::new(CryptoErrorKind::MalformedKey, format!("{}", e)))
    }

    pub fn to_decimal(&self) -> String {
        format!("{}", self.0)
    }

    pub fn bits_len(&self) -> usize {
        self.0.bits_len()
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0u32
    }

    pub fn is_one(&self) -> bool {
        self.0 == 1u32
    }

    pub fn is_negative(&self) -> bool {
        matches!(self.0.signnum(), Some(s) if s < 0)
    }

    pub fn is_nan(&self) -> bool {
        self.0.is_nan()
    }

    /// `self^e mod modulus`
    pub fn mod_pow(&self, e: &BigUint, modulus: &BigUint) -> BigUint {
        BigUint(self.0.exp(&e.0, &modulus.0))
    }

    /// Plain integer power, not modular; `e` is expected small (the `b-1`
    /// power in `n = p^(b-1) q` is a handful at most).
    pub fn pow(&self, e: u32) -> BigUint {
        let mut acc = BigUint::one();
        for _ in 0..e {
            acc = &acc * self;
        }
        acc
    }

    pub fn rem_euclid(&self, modulus: &BigUint) -> BigUint {
        BigUint(self.0.rem_euclid(modulus.0.clone()))
    }

    pub fn div_euclid(&self, divisor: &BigUint) -> BigUint {
        let mut q = self.0.clone();
        q.div_euclid_assign(divisor.0.clone());
        BigUint(q)
    }

    /// The modular inverse of `self` mod `modulus`, if it exists.
    pub fn mod_inverse(&self, modulus: &BigUint) -> Option<BigUint> {
        let inv = self.0.mod_inverse(modulus.0.clone());
        if inv.is_nan() {
            None
        } else {
            Some(BigUint(inv))
        }
    }

    /// Textbook Euclidean gcd; `rmath` exposes no dedicated gcd entry
    /// point in any observed usage, so this is built on the confirmed
    /// `rem_euclid` primitive.
    pub fn gcd(&self, other: &BigUint) -> BigUint {
        let (mut a, mut b) = (self.clone(), other.clone());
        while !b.is_zero() {
            let r = a.rem_euclid(&b);
            a = b;
            b = r;
        }
        a
    }

    /// Uniform random value in `[0, self)`.
    pub fn random_below<R: IterSource<u32>>(&self, rng: &mut R) -> BigUint {
        BigUint(self.0.random(rng))
    }

    /// Generates a probable prime of exactly `bits` bits using `rounds`
    /// Miller-Rabin rounds.
    pub fn generate_prime<R: IterSource<u32>>(
        bits: usize,
        rounds: usize,
        rng: &mut R,
    ) -> Result<BigUint, CryptoError> {
        Nat::generate_prime(bits, rounds, rng)
            .map(|nat| BigUint(BigInt::from(nat)))
            .map_err(|e| CryptoError::new(CryptoErrorKind::AllocationFailure, format!("{}", e)))
    }

    pub fn probably_prime<R: IterSource<u32>>(&self, rounds: usize, rng: &mut R) -> bool {
        self.0.as_ref().probably_prime_test(rounds, rng)
    }
}

impl fmt::Debug for BigUint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

impl PartialEq for BigUint {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl Eq for BigUint {}

impl PartialOrd for BigUint {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.0.partial_cmp(&other.0)
    }
}

impl PartialEq<u32> for BigUint {
    fn eq(&self, other: &u32) -> bool {
        self.0 == *other
    }
}

impl<'a> Add for &'a BigUint {
    type Output = BigUint;
    fn add(self, rhs: &'a BigUint) -> BigUint {
        BigUint(self.0.clone() + rhs.0.clone())
    }
}

impl<'a> Sub for &'a BigUint {
    type Output = BigUint;
    fn sub(self, rhs: &'a BigUint) -> BigUint {
        BigUint(self.0.clone() - rhs.0.clone())
    }
}

impl<'a> Mul for &'a BigUint {
    type Output = BigUint;
    fn mul(self, rhs: &'a BigUint) -> BigUint {
        BigUint(self.0.clone() * rhs.0.clone())
    }
}

impl AddAssign<&BigUint> for BigUint {
    fn add_assign(&mut self, rhs: &BigUint) {
        self.0 += rhs.0.clone();
    }
}

impl SubAssign<&BigUint> for BigUint {
    fn sub_assign(&mut self, rhs: &BigUint) {
        self.0 -= rhs.0.clone();
    }
}

impl MulAssign<&BigUint> for BigUint {
    fn mul_assign(&mut self, rhs: &BigUint) {
        self.0 *= rhs.0.clone();
    }
}
