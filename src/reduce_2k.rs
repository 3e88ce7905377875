//! Reduction modulo `2^k - d` without division.
//!
//! For such moduli `2^k = d (mod n)`, so the high part of a value can be
//! folded back in with one multiply and add per round.

use crate::algorithms::{add2, mul_digit, sub2};
use crate::big_digit::{self, BigDigit};
use crate::biguint::BigUint;

/// True when the magnitude has the form `2^k - d` with `d` confined to the
/// lowest digit: every bit from `BITS` up to the top must be set. Any
/// single-digit value qualifies trivially.
pub fn reduce_is_2k(a: &BigUint) -> bool {
    match a.data.len() {
        0 => false,
        1 => true,
        _ => {
            let bits = a.bits();
            let mut iw = 1;
            let mut iz: BigDigit = 1;
            for _ in big_digit::BITS..bits {
                if a.data[iw] & iz == 0 {
                    return false;
                }
                iz <<= 1;
                if iz > big_digit::DIGIT_MAX {
                    iw += 1;
                    iz = 1;
                }
            }
            true
        }
    }
}

/// Looser classifier for the multi-digit reducer: at least half of the
/// digits must be all-ones.
pub fn reduce_is_2k_l(a: &BigUint) -> bool {
    if a.data.is_empty() {
        return false;
    }
    let full = a
        .data
        .iter()
        .filter(|&&d| d == big_digit::DIGIT_MAX)
        .count();
    full >= a.data.len() / 2
}

/// The single-digit offset `d = 2^count_bits(a) - a`.
pub fn reduce_2k_setup(a: &BigUint) -> BigDigit {
    let tmp = &BigUint::power_of_two(a.bits()) - a;
    tmp.data.first().cloned().unwrap_or(0)
}

/// The multi-digit offset `mu = 2^count_bits(p) - p`.
pub fn reduce_2k_setup_l(p: &BigUint) -> BigUint {
    &BigUint::power_of_two(p.bits()) - p
}

/// Reduce `a` modulo `n = 2^k - d` for single-digit `d`.
pub fn reduce_2k(a: &mut BigUint, n: &BigUint, d: BigDigit) {
    let p = n.bits();
    loop {
        // Split at 2^p and fold the quotient back in, scaled by d.
        let (mut q, r) = a.div_rem_pow2(p);
        *a = r;
        if d != 1 {
            q = BigUint::from_vec(mul_digit(&q.data, d));
        }
        add2(&mut a.data, &q.data);

        if *a < *n {
            return;
        }
        sub2(&mut a.data, &n.data);
        a.normalize();
    }
}

/// Reduce `a` modulo `n = 2^k - d` for multi-digit `d`.
pub fn reduce_2k_l(a: &mut BigUint, n: &BigUint, d: &BigUint) {
    let p = n.bits();
    loop {
        let (q, r) = a.div_rem_pow2(p);
        *a = r;
        let q = &q * d;
        add2(&mut a.data, &q.data);

        if *a < *n {
            return;
        }
        sub2(&mut a.data, &n.data);
        a.normalize();
    }
}

#[cfg(test)]
mod tests {
    use num_traits::Zero;
    use rand::SeedableRng;
    use rand_chacha::ChaChaRng;

    use super::*;
    use crate::bigrand::RandBigUint;

    #[test]
    fn classifier_accepts_2k_forms() {
        // Any single digit.
        assert!(reduce_is_2k(&BigUint::from(9u32)));
        assert!(reduce_is_2k(&BigUint::from(1000u32)));
        // 2^k - small d.
        assert!(reduce_is_2k(&(&BigUint::power_of_two(89) - &BigUint::from(307u32))));
        assert!(reduce_is_2k(&(&BigUint::power_of_two(61) - &BigUint::from(1u32))));
        assert!(reduce_is_2k(&(&BigUint::power_of_two(64) - &BigUint::from(2u32))));
    }

    #[test]
    fn classifier_rejects_generic_values() {
        assert!(!reduce_is_2k(&BigUint::zero()));
        assert!(!reduce_is_2k(&BigUint::power_of_two(64)));
        assert!(!reduce_is_2k(
            &BigUint::parse_bytes(b"123456789123456789", 10).unwrap()
        ));
    }

    #[test]
    fn loose_classifier_counts_full_digits() {
        assert!(!reduce_is_2k_l(&BigUint::zero()));
        // High half all ones, low half arbitrary.
        let n = &BigUint::power_of_two(224) - &BigUint::parse_bytes(b"99999999999", 10).unwrap();
        assert!(reduce_is_2k_l(&n));
        // A power of two has no all-ones digits at all.
        assert!(!reduce_is_2k_l(&BigUint::power_of_two(224)));
    }

    #[test]
    fn setup_returns_offset() {
        let n = &BigUint::power_of_two(89) - &BigUint::from(307u32);
        assert_eq!(reduce_2k_setup(&n), 307);

        let d = BigUint::parse_bytes(b"99999999999", 10).unwrap();
        let n = &BigUint::power_of_two(224) - &d;
        assert_eq!(reduce_2k_setup_l(&n), d);
    }

    #[test]
    fn reduce_2k_matches_rem() {
        let mut rng = ChaChaRng::from_seed([16u8; 32]);
        for d in &[1u32, 2, 307, 12345] {
            let n = &BigUint::power_of_two(89) - &BigUint::from(*d);
            let dd = reduce_2k_setup(&n);
            assert_eq!(dd, *d as crate::big_digit::BigDigit);
            for _ in 0..10 {
                let x = rng.gen_biguint(176);
                let mut got = x.clone();
                reduce_2k(&mut got, &n, dd);
                assert_eq!(got, &x % &n, "d = {}", d);
            }
        }
    }

    #[test]
    fn reduce_2k_single_digit_modulus() {
        let n = BigUint::from(1000u32);
        let d = reduce_2k_setup(&n);
        assert_eq!(d, 24); // 2^10 - 1000
        let mut x = BigUint::from(123_456_789u64);
        reduce_2k(&mut x, &n, d);
        assert_eq!(x, BigUint::from(789u32));
    }

    #[test]
    fn reduce_2k_l_matches_rem() {
        let mut rng = ChaChaRng::from_seed([17u8; 32]);
        let d = BigUint::parse_bytes(b"99999999999", 10).unwrap();
        let n = &BigUint::power_of_two(224) - &d;
        let mu = reduce_2k_setup_l(&n);
        for _ in 0..10 {
            let x = rng.gen_biguint(440);
            let mut got = x.clone();
            reduce_2k_l(&mut got, &n, &mu);
            assert_eq!(got, &x % &n);
        }
    }

    #[test]
    fn classifier_soundness_round_trip() {
        // Whatever the classifier accepts, the reducer must agree with
        // plain remainder on.
        let mut rng = ChaChaRng::from_seed([18u8; 32]);
        for _ in 0..20 {
            let n = &rng.gen_biguint(27) + &BigUint::from(2u32);
            assert!(reduce_is_2k(&n));
            let d = reduce_2k_setup(&n);
            let x = rng.gen_biguint(50);
            let mut got = x.clone();
            reduce_2k(&mut got, &n, d);
            assert_eq!(got, &x % &n);
        }
    }
}
