use rmath::rand::IterSource;

use crate::bigint::BigUint;
use crate::{CryptoError, CryptoErrorKind};

/// Public exponent is fixed at generation time, as PKCS#1-style RSA
/// implementations conventionally do (see `mengsuenyan-rcrypto`'s RSA,
/// which also hardcodes 65537).
const PUBLIC_EXPONENT: u32 = 65537;

pub struct PublicKey {
    n: BigUint,
    e: BigUint,
}

impl Clone for PublicKey {
    fn clone(&self) -> Self {
        Self {
            n: self.n.clone(),
            e: self.e.clone(),
        }
    }
}

impl PublicKey {
    pub fn modulus(&self) -> &BigUint {
        &self.n
    }

    pub fn exponent(&self) -> &BigUint {
        &self.e
    }

    /// `m^e mod n`
    pub fn encrypt(&self, m: &BigUint) -> Result<BigUint, CryptoError> {
        if *m >= self.n {
            return Err(CryptoError::new(
                CryptoErrorKind::MessageTooLarge,
                "plaintext integer is not smaller than the modulus",
            ));
        }

        Ok(m.mod_pow(&self.e, &self.n))
    }

    fn to_wire(&self) -> String {
        format!("{}:{}", self.n.to_hex(), self.e.to_hex())
    }

    fn from_wire(s: &str) -> Result<Self, CryptoError> {
        let mut parts = s.split(':');
        let (n, e) = match (parts.next(), parts.next(), parts.next()) {
            (Some(n), Some(e), None) => (n, e),
            _ => {
                return Err(CryptoError::new(
                    CryptoErrorKind::MalformedKey,
                    "public key must be exactly two colon-separated fields",
                ))
            }
        };

        Ok(PublicKey {
            n: BigUint::from_hex(n)?,
            e: BigUint::from_hex(e)?,
        })
    }
}

/// The CRT exponents `r1`/`r2` are stored instead of the raw private
/// exponent `d` — decryption never needs `d` directly, only its residues
/// mod `p-1` and `q-1`. This mirrors `mengsuenyan-rcrypto`'s RSA
/// `PrecomputedValues`, which likewise keeps `d_p`/`d_q` rather than `d`
/// on the fast CRT path.
pub struct PrivateKey {
    p: BigUint,
    q: BigUint,
    p_power: BigUint,
    r1: BigUint,
    r2: BigUint,
    b: u32,
    pk: PublicKey,
}

impl Clone for PrivateKey {
    fn clone(&self) -> Self {
        Self {
            p: self.p.clone(),
            q: self.q.clone(),
            p_power: self.p_power.clone(),
            r1: self.r1.clone(),
            r2: self.r2.clone(),
            b: self.b,
            pk: self.pk.clone(),
        }
    }
}

impl PrivateKey {
    pub fn public_key(&self) -> &PublicKey {
        &self.pk
    }

    /// `is_valid` recomputes the invariants a correctly generated or
    /// correctly imported key must satisfy, without ever reconstructing
    /// the private exponent `d`.
    pub fn is_valid(&self) -> Result<(), CryptoError> {
        let p_power = self.p.pow(self.b - 1);
        if p_power != self.p_power || &p_power * &self.q != self.pk.n {
            return Err(CryptoError::new(
                CryptoErrorKind::MalformedKey,
                "modulus is not p^(b-1) * q",
            ));
        }

        let p_minus1 = &self.p - &BigUint::one();
        let q_minus1 = &self.q - &BigUint::one();

        let check1 = (&self.pk.e * &self.r1).rem_euclid(&p_minus1);
        let check2 = (&self.pk.e * &self.r2).rem_euclid(&q_minus1);
        if !check1.is_one() || !check2.is_one() {
            return Err(CryptoError::new(
                CryptoErrorKind::MalformedKey,
                "CRT exponents are not inverses of e modulo p-1/q-1",
            ));
        }

        Ok(())
    }

    /// `c^r1 mod p` and `c^r2 mod q`, then Hensel-lift the first residue
    /// up to mod `p^(b-1)` before recombining via CRT.
    pub fn decrypt(&self, c: &BigUint) -> Result<BigUint, CryptoError> {
        if *c >= self.pk.n {
            return Err(CryptoError::new(
                CryptoErrorKind::CiphertextTooLarge,
                "ciphertext integer is not smaller than the modulus",
            ));
        }

        let m2 = c.mod_pow(&self.r2, &self.q);
        let mut m1 = c.mod_pow(&self.r1, &self.p);

        if self.b > 2 {
            let e_minus1 = &self.pk.e - &BigUint::one();
            let mut p_pow_i = self.p.clone();

            for _ in 1..=(self.b - 2) {
                let p_pow_i1 = &p_pow_i * &self.p;

                let m1_pow_e = m1.mod_pow(&self.pk.e, &p_pow_i1);
                let c_mod = c.rem_euclid(&p_pow_i1);
                let mut err = &m1_pow_e - &c_mod;
                if err.is_negative() {
                    err = &err + &p_pow_i1;
                }

                if !err.rem_euclid(&p_pow_i).is_zero() {
                    return Err(CryptoError::new(
                        CryptoErrorKind::InternalInvariantViolated,
                        "Hensel lift error term is not divisible by p^i",
                    ));
                }
                let delta_e = err.div_euclid(&p_pow_i);

                let m1_pow_e_minus1 = m1.mod_pow(&e_minus1, &self.p);
                let linearization = (&self.pk.e * &m1_pow_e_minus1).rem_euclid(&self.p);
                let inv = linearization.mod_inverse(&self.p).ok_or_else(|| {
                    CryptoError::new(
                        CryptoErrorKind::InternalInvariantViolated,
                        "Hensel lift linearization factor has no inverse mod p",
                    )
                })?;

                let correction = (&delta_e * &inv).rem_euclid(&self.p);
                let correction_term = &correction * &p_pow_i;

                let mut new_m1 = &m1 - &correction_term;
                if new_m1.is_negative() {
                    new_m1 = &new_m1 + &p_pow_i1;
                }
                m1 = new_m1.rem_euclid(&p_pow_i1);

                p_pow_i = p_pow_i1;
            }
        }

        let q_inv = mod_inverse_or_fatal(&self.q, &self.p_power)?;
        let pp_inv = mod_inverse_or_fatal(&self.p_power, &self.q)?;

        let term1 = &(&m1 * &self.q) * &q_inv;
        let term2 = &(&m2 * &self.p_power) * &pp_inv;

        Ok((&term1 + &term2).rem_euclid(&self.pk.n))
    }

    /// Decrypts and re-encrypts the recovered plaintext as a correctness
    /// fence around the CRT+Hensel fast path.
    pub fn decrypt_and_check(&self, c: &BigUint) -> Result<BigUint, CryptoError> {
        let m = self.decrypt(c)?;
        let check = self.pk.encrypt(&m)?;
        if &check != c {
            return Err(CryptoError::new(
                CryptoErrorKind::InternalInvariantViolated,
                "decrypted plaintext does not re-encrypt to the given ciphertext",
            ));
        }
        Ok(m)
    }

    fn to_wire(&self) -> String {
        format!(
            "{}:{}:{}:{}:{}",
            self.p.to_hex(),
            self.q.to_hex(),
            self.r1.to_hex(),
            self.r2.to_hex(),
            self.b
        )
    }

    fn from_wire(s: &str) -> Result<Self, CryptoError> {
        let fields: Vec<&str> = s.split(':').collect();
        if fields.len() != 5 {
            return Err(CryptoError::new(
                CryptoErrorKind::MalformedKey,
                "private key must be exactly five colon-separated fields",
            ));
        }

        let p = BigUint::from_hex(fields[0])?;
        let q = BigUint::from_hex(fields[1])?;
        let r1 = BigUint::from_hex(fields[2])?;
        let r2 = BigUint::from_hex(fields[3])?;
        let b: u32 = fields[4].parse().map_err(|_| {
            CryptoError::new(CryptoErrorKind::MalformedKey, "b field is not a decimal integer")
        })?;

        if b < 2 {
            return Err(CryptoError::new(
                CryptoErrorKind::MalformedKey,
                "b must be at least 2",
            ));
        }

        let p_power = p.pow(b - 1);
        let n = &p_power * &q;

        Ok(PrivateKey {
            p,
            q,
            p_power,
            r1,
            r2,
            b,
            pk: PublicKey {
                n,
                e: BigUint::from_u32(PUBLIC_EXPONENT),
            },
        })
    }
}

/// Inverse of `base` modulo `modulus`, surfacing a fatal invariant error
/// (rather than `None`) since a missing inverse on the CRT recombination
/// path indicates a corrupt key, per the core's failure semantics.
fn mod_inverse_or_fatal(base: &BigUint, modulus: &BigUint) -> Result<BigUint, CryptoError> {
    base.mod_inverse(modulus).ok_or_else(|| {
        CryptoError::new(
            CryptoErrorKind::InternalInvariantViolated,
            "CRT modulus inverse does not exist",
        )
    })
}

/// A Multi-Power RSA context: holds the key material once generated or
/// imported, or nothing at all (a freshly-constructed, unkeyed context).
pub struct MultiPowerRsa {
    key_size: usize,
    b: u32,
    public: Option<PublicKey>,
    private: Option<PrivateKey>,
}

impl MultiPowerRsa {
    /// `b` must be at least 2 (`b=2` is textbook two-prime RSA with the
    /// Hensel lift loop skipped entirely); this is enforced when the
    /// context is actually keyed, by `generate_keys`/`import_private`.
    pub fn new(key_size: usize, b: u32) -> Self {
        MultiPowerRsa {
            key_size,
            b,
            public: None,
            private: None,
        }
    }

    pub fn public_key(&self) -> Option<&PublicKey> {
        self.public.as_ref()
    }

    pub fn private_key(&self) -> Option<&PrivateKey> {
        self.private.as_ref()
    }

    /// Generates `p`, `q` of the bit lengths prescribed by `(key_size, b)`,
    /// retrying internally until `e = 65537` is coprime to `phi(n)`.
    pub fn generate_keys<R: IterSource<u32>>(
        &mut self,
        prime_test_rounds: usize,
        rng: &mut R,
    ) -> Result<(), CryptoError> {
        if self.b < 2 {
            return Err(CryptoError::new(
                CryptoErrorKind::MalformedKey,
                "b must be at least 2",
            ));
        }

        let bits_p = (self.key_size * 2 / 3) / (self.b as usize);
        let bits_q = self.key_size / 3;
        let e = BigUint::from_u32(PUBLIC_EXPONENT);

        loop {
            let p = BigUint::generate_prime(bits_p, prime_test_rounds, rng)?;
            let q = BigUint::generate_prime(bits_q, prime_test_rounds, rng)?;
            if p == q {
                continue;
            }

            let p_power = p.pow(self.b - 1);
            let n = &p_power * &q;

            let p_minus1 = &p - &BigUint::one();
            let q_minus1 = &q - &BigUint::one();
            let mut phi = &p_minus1 * &q_minus1;
            if self.b > 2 {
                phi = &phi * &p.pow(self.b - 2);
            }

            if !e.gcd(&phi).is_one() {
                continue;
            }

            let d = e.mod_inverse(&phi).ok_or_else(|| {
                CryptoError::new(
                    CryptoErrorKind::InternalInvariantViolated,
                    "e has no inverse mod phi(n) despite passing the coprimality test",
                )
            })?;

            let r1 = d.rem_euclid(&p_minus1);
            let r2 = d.rem_euclid(&q_minus1);

            let pk = PublicKey { n, e: e.clone() };
            self.private = Some(PrivateKey {
                p,
                q,
                p_power,
                r1,
                r2,
                b: self.b,
                pk: pk.clone(),
            });
            self.public = Some(pk);
            return Ok(());
        }
    }

    pub fn encrypt(&self, m: &BigUint) -> Result<BigUint, CryptoError> {
        let pk = self.public.as_ref().ok_or_else(|| {
            CryptoError::new(CryptoErrorKind::MalformedKey, "no public key loaded")
        })?;
        pk.encrypt(m)
    }

    pub fn decrypt(&self, c: &BigUint) -> Result<BigUint, CryptoError> {
        let sk = self.private.as_ref().ok_or_else(|| {
            CryptoError::new(CryptoErrorKind::MalformedKey, "no private key loaded")
        })?;
        sk.decrypt(c)
    }

    pub fn decrypt_and_check(&self, c: &BigUint) -> Result<BigUint, CryptoError> {
        let sk = self.private.as_ref().ok_or_else(|| {
            CryptoError::new(CryptoErrorKind::MalformedKey, "no private key loaded")
        })?;
        sk.decrypt_and_check(c)
    }

    pub fn export_public(&self) -> Result<String, CryptoError> {
        let pk = self.public.as_ref().ok_or_else(|| {
            CryptoError::new(CryptoErrorKind::MalformedKey, "no public key loaded")
        })?;
        Ok(pk.to_wire())
    }

    pub fn export_private(&self) -> Result<String, CryptoError> {
        let sk = self.private.as_ref().ok_or_else(|| {
            CryptoError::new(CryptoErrorKind::MalformedKey, "no private key loaded")
        })?;
        Ok(sk.to_wire())
    }

    pub fn import_public(&mut self, wire: &str) -> Result<(), CryptoError> {
        self.public = Some(PublicKey::from_wire(wire)?);
        Ok(())
    }

    pub fn import_private(&mut self, wire: &str) -> Result<(), CryptoError> {
        let sk = PrivateKey::from_wire(wire)?;
        self.public = Some(sk.pk.clone());
        self.private = Some(sk);
        Ok(())
    }
}
