use crate::twofish::twofish_const_tables::{
    gf_mult, q_permute, MDS_MOD, RHO, RS, RS_MOD, T0, T1, T2, T3, T4, T5, T6, T7,
};
use crate::{Cipher, CryptoError, CryptoErrorKind};

const TWOFISH_BLOCK_SIZE: usize = 16;

fn build_q_tables() -> ([u8; 256], [u8; 256]) {
    let mut q0 = [0u8; 256];
    let mut q1 = [0u8; 256];
    for i in 0..256usize {
        q0[i] = q_permute(i as u8, (&T0, &T1, &T2, &T3));
        q1[i] = q_permute(i as u8, (&T4, &T5, &T6, &T7));
    }
    (q0, q1)
}

fn build_mds_mult_table(coeff: u32) -> [u8; 256] {
    let mut t = [0u8; 256];
    for (i, entry) in t.iter_mut().enumerate() {
        *entry = gf_mult(i as u32, coeff, MDS_MOD);
    }
    t
}

fn rs_matrix_multiply(sd: &[u8; 8]) -> u32 {
    let mut result = [0u8; 4];
    for j in 0..4 {
        let mut t = 0u8;
        for (k, &sdk) in sd.iter().enumerate() {
            t ^= gf_mult(RS[j][k] as u32, sdk as u32, RS_MOD);
        }
        result[3 - j] = t;
    }
    u32::from_be_bytes(result)
}

/// Runs the Q-permutation network shared by the zero-keyed `h` function and
/// the fully-keyed `QF` table precomputation: same layered Q0/Q1 XOR
/// schedule, just stopping short of the MDS multiply.
fn q_network(mut y: [u8; 4], l: &[u32; 4], k: usize, q0: &[u8; 256], q1: &[u8; 256]) -> [u8; 4] {
    if k >= 4 {
        let l3 = l[3].to_le_bytes();
        y[0] = q1[y[0] as usize] ^ l3[0];
        y[1] = q0[y[1] as usize] ^ l3[1];
        y[2] = q0[y[2] as usize] ^ l3[2];
        y[3] = q1[y[3] as usize] ^ l3[3];
    }
    if k >= 3 {
        let l2 = l[2].to_le_bytes();
        y[0] = q1[y[0] as usize] ^ l2[0];
        y[1] = q1[y[1] as usize] ^ l2[1];
        y[2] = q0[y[2] as usize] ^ l2[2];
        y[3] = q0[y[3] as usize] ^ l2[3];
    }

    let l1 = l[1].to_le_bytes();
    let l0 = l[0].to_le_bytes();
    [
        q1[(q0[(q0[y[0] as usize] ^ l1[0]) as usize] ^ l0[0]) as usize],
        q0[(q0[(q1[y[1] as usize] ^ l1[1]) as usize] ^ l0[1]) as usize],
        q1[(q1[(q0[y[2] as usize] ^ l1[2]) as usize] ^ l0[2]) as usize],
        q0[(q1[(q1[y[3] as usize] ^ l1[3]) as usize] ^ l0[3]) as usize],
    ]
}

struct TwofishTables {
    q0: [u8; 256],
    q1: [u8; 256],
    mult5b: [u8; 256],
    multef: [u8; 256],
}

impl TwofishTables {
    fn new() -> Self {
        let (q0, q1) = build_q_tables();
        TwofishTables {
            q0,
            q1,
            mult5b: build_mds_mult_table(0x5B),
            multef: build_mds_mult_table(0xEF),
        }
    }

    /// The zero-keyed `h` function: the Q-permutation network followed by
    /// the MDS matrix multiply, packed big-endian.
    fn h(&self, x: u32, l: &[u32; 4], k: usize) -> u32 {
        let y = q_network(x.to_le_bytes(), l, k, &self.q0, &self.q1);
        let ef = |v: u8| self.multef[v as usize];
        let fb = |v: u8| self.mult5b[v as usize];

        let z0 = ef(y[0]) ^ y[1] ^ ef(y[2]) ^ fb(y[3]);
        let z1 = ef(y[0]) ^ fb(y[1]) ^ y[2] ^ ef(y[3]);
        let z2 = fb(y[0]) ^ ef(y[1]) ^ ef(y[2]) ^ y[3];
        let z3 = y[0] ^ ef(y[1]) ^ fb(y[2]) ^ fb(y[3]);

        u32::from_be_bytes([z0, z1, z2, z3])
    }

    /// Builds the four fully-keyed `QF` tables from the S-box key words
    /// `s`, so that `g(X) = QF[0][b0(X)] ^ QF[1][b1(X)] ^ QF[2][b2(X)] ^ QF[3][b3(X)]`
    /// equals `h(X, s, k)` without re-running the Q-permutation network on
    /// every block.
    fn build_qf(&self, s: &[u32; 4], k: usize) -> [[u32; 256]; 4] {
        let mut qf = [[0u32; 256]; 4];
        let ef = |v: u8| self.multef[v as usize] as u32;
        let fb = |v: u8| self.mult5b[v as usize] as u32;

        for i in 0..256usize {
            let y = q_network([i as u8; 4], s, k, &self.q0, &self.q1);
            let (y0, y1, y2, y3) = (y[0] as u32, y[1] as u32, y[2] as u32, y[3] as u32);

            qf[0][i] = (ef(y[0]) << 24) | (ef(y[0]) << 16) | (fb(y[0]) << 8) | y0;
            qf[1][i] = (y1 << 24) | (fb(y[1]) << 16) | (ef(y[1]) << 8) | ef(y[1]);
            qf[2][i] = (ef(y[2]) << 24) | (y2 << 16) | (ef(y[2]) << 8) | fb(y[2]);
            qf[3][i] = (fb(y[3]) << 24) | (ef(y[3]) << 16) | (y3 << 8) | fb(y[3]);
        }

        qf
    }
}

/// A keyed Twofish context: 40 round/whitening key words plus the four
/// fully-keyed 256-entry `QF` lookup tables. Both are immutable once
/// `new`/`from_slice` has returned.
pub struct Twofish {
    k: [u32; 40],
    qf: [[u32; 256]; 4],
}

impl Twofish {
    pub fn new(key: &[u8]) -> Result<Self, CryptoError> {
        Self::from_slice(key)
    }

    pub fn from_slice(key: &[u8]) -> Result<Self, CryptoError> {
        let key_words = match key.len() {
            16 | 24 | 32 => key.len() / 8,
            _ => {
                return Err(CryptoError::new(
                    CryptoErrorKind::BadKeySize,
                    "Twofish key must be 16, 24, or 32 bytes",
                ))
            }
        };

        let mut me = [0u32; 4];
        let mut mo = [0u32; 4];
        for i in 0..key_words {
            me[i] = u32::from_le_bytes([
                key[8 * i],
                key[8 * i + 1],
                key[8 * i + 2],
                key[8 * i + 3],
            ]);
            mo[i] = u32::from_le_bytes([
                key[8 * i + 4],
                key[8 * i + 5],
                key[8 * i + 6],
                key[8 * i + 7],
            ]);
        }

        let mut s = [0u32; 4];
        for i in 0..key_words {
            let me_b = me[i].to_le_bytes();
            let mo_b = mo[i].to_le_bytes();
            let sd = [
                me_b[0], me_b[1], me_b[2], me_b[3], mo_b[0], mo_b[1], mo_b[2], mo_b[3],
            ];
            s[key_words - i - 1] = rs_matrix_multiply(&sd);
        }

        let tables = TwofishTables::new();

        let mut k = [0u32; 40];
        for i in 0..20usize {
            let a = tables.h((2 * i as u32).wrapping_mul(RHO), &me, key_words);
            let b = tables
                .h((2 * i as u32).wrapping_mul(RHO).wrapping_add(RHO), &mo, key_words)
                .rotate_left(8);
            k[2 * i] = a.wrapping_add(b);
            k[2 * i + 1] = a.wrapping_add(b.wrapping_mul(2)).rotate_left(9);
        }

        let qf = tables.build_qf(&s, key_words);

        Ok(Twofish { k, qf })
    }

    /// The fully-keyed `g` function.
    #[inline]
    fn g(&self, x: u32) -> u32 {
        let b = x.to_le_bytes();
        self.qf[0][b[0] as usize] ^ self.qf[1][b[1] as usize] ^ self.qf[2][b[2] as usize] ^ self.qf[3][b[3] as usize]
    }

    pub fn encrypt_block(&self, block: &[u8; 16]) -> [u8; 16] {
        let mut r = [0u32; 4];
        for (j, reg) in r.iter_mut().enumerate() {
            let word = u32::from_le_bytes([
                block[4 * j],
                block[4 * j + 1],
                block[4 * j + 2],
                block[4 * j + 3],
            ]);
            *reg = self.k[j] ^ word;
        }

        for round in 0..16usize {
            let (s0, s1, d0, d1) = if round % 2 == 0 { (0, 1, 2, 3) } else { (2, 3, 0, 1) };

            let t0 = self.g(r[s0]);
            let t1 = self.g(r[s1].rotate_left(8));

            r[d0] = (r[d0] ^ t0.wrapping_add(t1).wrapping_add(self.k[2 * round + 8])).rotate_right(1);
            r[d1] = r[d1].rotate_left(1) ^ t0.wrapping_add(t1.wrapping_mul(2)).wrapping_add(self.k[2 * round + 9]);
        }

        let order = [2usize, 3, 0, 1];
        let mut out = [0u8; 16];
        for (idx, &reg) in order.iter().enumerate() {
            let word = r[reg] ^ self.k[4 + idx];
            out[4 * idx..4 * idx + 4].copy_from_slice(&word.to_le_bytes());
        }
        out
    }

    pub fn decrypt_block(&self, block: &[u8; 16]) -> [u8; 16] {
        let mut r = [0u32; 4];
        for (j, reg) in r.iter_mut().enumerate() {
            let word = u32::from_le_bytes([
                block[4 * j],
                block[4 * j + 1],
                block[4 * j + 2],
                block[4 * j + 3],
            ]);
            *reg = self.k[4 + j] ^ word;
        }

        for i in 0..16usize {
            let round = 15 - i;
            let (s0, s1, d0, d1) = if i % 2 == 0 { (0, 1, 2, 3) } else { (2, 3, 0, 1) };

            let t0 = self.g(r[s0]);
            let t1 = self.g(r[s1].rotate_left(8));

            r[d0] = r[d0].rotate_left(1) ^ t0.wrapping_add(t1).wrapping_add(self.k[2 * round + 8]);
            r[d1] = (r[d1] ^ t0.wrapping_add(t1.wrapping_mul(2)).wrapping_add(self.k[2 * round + 9])).rotate_right(1);
        }

        let order = [2usize, 3, 0, 1];
        let mut out = [0u8; 16];
        for (idx, &reg) in order.iter().enumerate() {
            let word = r[reg] ^ self.k[idx];
            out[4 * idx..4 * idx + 4].copy_from_slice(&word.to_le_bytes());
        }
        out
    }
}

impl Cipher for Twofish {
    fn block_size(&self) -> Option<usize> {
        Some(TWOFISH_BLOCK_SIZE)
    }

    fn encrypt(&self, dst: &mut Vec<u8>, plaintext_block: &[u8]) -> Result<usize, CryptoError> {
        if plaintext_block.len() != TWOFISH_BLOCK_SIZE {
            return Err(CryptoError::new(
                CryptoErrorKind::BadBlockSize,
                "Twofish operates on 16-byte blocks",
            ));
        }

        let mut block = [0u8; 16];
        block.copy_from_slice(plaintext_block);
        let out = self.encrypt_block(&block);
        dst.clear();
        dst.extend_from_slice(&out);
        Ok(dst.len())
    }

    fn decrypt(&self, dst: &mut Vec<u8>, cipher_block: &[u8]) -> Result<usize, CryptoError> {
        if cipher_block.len() != TWOFISH_BLOCK_SIZE {
            return Err(CryptoError::new(
                CryptoErrorKind::BadBlockSize,
                "Twofish operates on 16-byte blocks",
            ));
        }

        let mut block = [0u8; 16];
        block.copy_from_slice(cipher_block);
        let out = self.decrypt_block(&block);
        dst.clear();
        dst.extend_from_slice(&out);
        Ok(dst.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn twofish_128_all_zero_known_answer() {
        let key = [0u8; 16];
        let pt = [0u8; 16];
        let expected: [u8; 16] = [
            0x9F, 0x58, 0x9F, 0x5C, 0xF6, 0x12, 0x2C, 0x32, 0xB6, 0xBF, 0xEC, 0x2F, 0x2A, 0xE8,
            0xC3, 0x5A,
        ];

        let tf = Twofish::new(&key).unwrap();
        let ct = tf.encrypt_block(&pt);
        assert_eq!(ct, expected);
        assert_eq!(tf.decrypt_block(&ct), pt);
    }

    #[test]
    fn twofish_256_all_zero_known_answer() {
        let key = [0u8; 32];
        let pt = [0u8; 16];
        let expected: [u8; 16] = [
            0x37, 0x52, 0x7B, 0xE0, 0x05, 0x23, 0x34, 0xB8, 0x9F, 0x0C, 0xFC, 0xCA, 0xE8, 0x7C,
            0xFA, 0x20,
        ];

        let tf = Twofish::new(&key).unwrap();
        let ct = tf.encrypt_block(&pt);
        assert_eq!(ct, expected);
        assert_eq!(tf.decrypt_block(&ct), pt);
    }

    #[test]
    fn round_trip_192_bit_key() {
        let key: Vec<u8> = (0..24u8).collect();
        let pt: [u8; 16] = [
            0x01, 0x23, 0x45, 0x67, 0x89, 0xAB, 0xCD, 0xEF, 0xFE, 0xDC, 0xBA, 0x98, 0x76, 0x54,
            0x32, 0x10,
        ];

        let tf = Twofish::new(&key).unwrap();
        let ct = tf.encrypt_block(&pt);
        assert_eq!(tf.decrypt_block(&ct), pt);
        assert_ne!(ct, pt);
    }

    #[test]
    fn rejects_bad_key_size() {
        assert!(Twofish::new(&[0u8; 17]).is_err());
        match Twofish::new(&[0u8; 17]) {
            Err(e) => assert_eq!(e.kind(), CryptoErrorKind::BadKeySize),
            Ok(_) => panic!("expected BadKeySize"),
        }
    }

    #[test]
    fn rejects_bad_block_size() {
        let tf = Twofish::new(&[0u8; 16]).unwrap();
        let mut dst = Vec::new();
        match tf.encrypt(&mut dst, &[0u8; 15]) {
            Err(e) => assert_eq!(e.kind(), CryptoErrorKind::BadBlockSize),
            Ok(_) => panic!("expected BadBlockSize"),
        }
    }

    #[test]
    fn cipher_trait_round_trip() {
        let tf = Twofish::new(&[0x5Au8; 16]).unwrap();
        let pt = [0x42u8; 16];
        let mut ct = Vec::new();
        tf.encrypt(&mut ct, &pt).unwrap();
        let mut back = Vec::new();
        tf.decrypt(&mut back, &ct).unwrap();
        assert_eq!(back.as_slice(), &pt);
    }
}
