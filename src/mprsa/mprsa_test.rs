use crate::mprsa::MultiPowerRsa;
use crate::BigUint;
use rmath::rand::{CryptoRand, DefaultSeed};

fn new_rng() -> CryptoRand<u32> {
    let seed = DefaultSeed::<u32>::new().unwrap();
    CryptoRand::new(&seed).unwrap()
}

fn round_trip_at(key_size: usize, b: u32) -> MultiPowerRsa {
    let mut rd = new_rng();
    let mut mprsa = MultiPowerRsa::new(key_size, b);
    mprsa.generate_keys(20, &mut rd).unwrap();

    let sk = mprsa.private_key().unwrap();
    sk.is_valid().unwrap();

    let p_power = sk.public_key().modulus();
    assert!(!p_power.is_zero());

    mprsa
}

#[test]
fn two_prime_parity_round_trip() {
    let mprsa = round_trip_at(1024, 2);

    let m = BigUint::from_u32(42);
    let c = mprsa.encrypt(&m).unwrap();
    let m2 = mprsa.decrypt(&c).unwrap();
    assert_eq!(m, m2);

    let m3 = mprsa.decrypt_and_check(&c).unwrap();
    assert_eq!(m, m3);
}

#[test]
fn multi_power_b3_modulus_and_round_trip() {
    let mut rd = new_rng();
    let mut mprsa = MultiPowerRsa::new(1536, 3);
    mprsa.generate_keys(20, &mut rd).unwrap();

    let sk = mprsa.private_key().unwrap();
    sk.is_valid().unwrap();

    let seven = BigUint::from_u32(7);
    let n = sk.public_key().modulus();
    let m = n.div_euclid(&seven);

    let c = mprsa.encrypt(&m).unwrap();
    let m2 = mprsa.decrypt_and_check(&c).unwrap();
    assert_eq!(m, m2);
}

#[test]
fn boundary_plaintexts_round_trip() {
    let mprsa = round_trip_at(1024, 2);
    let n = mprsa.public_key().unwrap().modulus().clone();

    for m in [BigUint::zero(), BigUint::one(), &n - &BigUint::one()] {
        let c = mprsa.encrypt(&m).unwrap();
        let back = mprsa.decrypt(&c).unwrap();
        assert_eq!(m, back);
    }
}

#[test]
fn message_too_large_is_rejected() {
    let mprsa = round_trip_at(1024, 2);
    let n = mprsa.public_key().unwrap().modulus().clone();
    assert!(mprsa.encrypt(&n).is_err());
}

#[test]
fn ciphertext_too_large_is_rejected() {
    let mprsa = round_trip_at(1024, 2);
    let n = mprsa.public_key().unwrap().modulus().clone();
    assert!(mprsa.decrypt(&n).is_err());
}

#[test]
fn key_export_import_round_trip() {
    let mprsa = round_trip_at(1024, 2);

    let pub_wire = mprsa.export_public().unwrap();
    let priv_wire = mprsa.export_private().unwrap();

    let mut imported = MultiPowerRsa::new(1024, 2);
    imported.import_private(&priv_wire).unwrap();
    imported.private_key().unwrap().is_valid().unwrap();

    let mut imported_pub_only = MultiPowerRsa::new(1024, 2);
    imported_pub_only.import_public(&pub_wire).unwrap();
    assert!(imported_pub_only.private_key().is_none());

    let m = BigUint::from_u32(1234);
    let c = mprsa.encrypt(&m).unwrap();
    let m2 = imported.decrypt(&c).unwrap();
    assert_eq!(m, m2);
}

#[test]
fn malformed_public_wire_is_rejected() {
    let mut mprsa = MultiPowerRsa::new(1024, 2);
    assert!(mprsa.import_public("not-enough-fields").is_err());
    assert!(mprsa.import_public("zz:ff").is_err());
}

#[test]
fn malformed_private_wire_is_rejected() {
    let mut mprsa = MultiPowerRsa::new(1024, 2);
    assert!(mprsa.import_private("only:four:colon:fields").is_err());
    assert!(mprsa.import_private("01:02:03:04:1").is_err());
}

#[test]
fn no_key_loaded_operations_fail() {
    let mprsa = MultiPowerRsa::new(1024, 2);
    assert!(mprsa.encrypt(&BigUint::one()).is_err());
    assert!(mprsa.decrypt(&BigUint::one()).is_err());
    assert!(mprsa.export_public().is_err());
    assert!(mprsa.export_private().is_err());
}
