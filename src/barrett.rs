//! Barrett reduction.
//!
//! Menezes et al., Handbook of Applied Cryptography, Algorithm 14.42.

use num_traits::Zero;

use crate::algorithms::{add2, mul_digs, mul_high_digs, sub2};
use crate::big_digit::{self, BigDigit};
use crate::biguint::BigUint;

/// Precompute `mu = floor(beta^(2 * p.used) / p)` for [`reduce`].
pub fn reduce_setup(p: &BigUint) -> BigUint {
    assert!(!p.is_zero());
    &BigUint::power_of_two(2 * p.data.len() * big_digit::BITS) / p
}

/// Compute `x <- x mod m`, for `x < m^2` and `mu` from [`reduce_setup`].
///
/// The quotient estimate only needs the product digits above `m.used`, so
/// the partial `mul_high_digs` stands in for a full multiply unless the
/// modulus is too wide for the shortcut to be sound.
pub fn reduce(x: &mut BigUint, m: &BigUint, mu: &BigUint) {
    let um = m.data.len();

    // q1 = x / beta^(um - 1)
    let mut q = x.clone();
    q.shr_digits(um - 1);

    // q2 = q1 * mu, of which only the digits above um matter.
    if um as BigDigit > (1 as BigDigit) << (big_digit::BITS - 1) {
        q = &q * mu;
    } else {
        q = BigUint::from_vec(mul_high_digs(&q.data, &mu.data, um));
    }

    // q3 = q2 / beta^(um + 1)
    q.shr_digits(um + 1);

    // r = (x - q3 * m) mod beta^(um + 1)
    x.keep_low_bits(big_digit::BITS * (um + 1));
    q = BigUint::from_vec(mul_digs(&q.data, &m.data, um + 1));
    if *x < q {
        // The signed original borrows beta^(um + 1) here.
        let bias = BigUint::power_of_two(big_digit::BITS * (um + 1));
        add2(&mut x.data, &bias.data);
    }
    sub2(&mut x.data, &q.data);
    x.normalize();

    // At most two corrective subtractions.
    while *x >= *m {
        sub2(&mut x.data, &m.data);
        x.normalize();
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand_chacha::ChaChaRng;

    use super::*;
    use crate::bigrand::{gen_odd_biguint, RandBigUint};

    #[test]
    fn setup_is_scaled_reciprocal() {
        let mut rng = ChaChaRng::from_seed([13u8; 32]);
        for &bits in &[10usize, 28, 100] {
            let m = gen_odd_biguint(&mut rng, bits);
            let mu = reduce_setup(&m);
            let beta2k = BigUint::power_of_two(2 * m.data.len() * crate::big_digit::BITS);
            assert_eq!(mu, &beta2k / &m);
        }
    }

    #[test]
    fn reduce_matches_rem() {
        let mut rng = ChaChaRng::from_seed([14u8; 32]);
        for &bits in &[8usize, 28, 56, 90, 200, 500] {
            let m = gen_odd_biguint(&mut rng, bits);
            let mu = reduce_setup(&m);
            for _ in 0..10 {
                let x = rng.gen_biguint(2 * bits - 2);
                let mut got = x.clone();
                reduce(&mut got, &m, &mu);
                assert_eq!(got, &x % &m, "bits = {}", bits);
            }
        }
    }

    #[test]
    fn reduce_handles_even_modulus() {
        // Barrett does not care about the parity of the modulus.
        let m = BigUint::from(1000u32);
        let mu = reduce_setup(&m);
        let mut x = BigUint::from(999_999u64);
        reduce(&mut x, &m, &mu);
        assert_eq!(x, BigUint::from(999u32));
    }

    #[test]
    fn reduce_at_square_boundary() {
        let mut rng = ChaChaRng::from_seed([15u8; 32]);
        let m = gen_odd_biguint(&mut rng, 84);
        let mu = reduce_setup(&m);

        // Largest admissible input, m^2 - 1.
        let x = &(&m * &m) - &BigUint::from(1u32);
        let mut got = x.clone();
        reduce(&mut got, &m, &mu);
        assert_eq!(got, &x % &m);

        // Inputs already below the modulus come back unchanged.
        let x = &m - &BigUint::from(1u32);
        let mut got = x.clone();
        reduce(&mut got, &m, &mu);
        assert_eq!(got, x);
    }

    #[test]
    fn reduce_single_digit_modulus() {
        let m = BigUint::from(497u32);
        let mu = reduce_setup(&m);
        let mut x = BigUint::from(497u64 * 496 + 123);
        reduce(&mut x, &m, &mu);
        assert_eq!(x, BigUint::from(123u32));
    }
}
