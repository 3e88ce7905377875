//! Montgomery reduction.
//!
//! References:
//! Brent & Zimmermann, Modern Computer Arithmetic, v0.5.9, Algorithm 2.6.
//! Menezes et al., Handbook of Applied Cryptography, Algorithm 14.32.

use num_traits::{One, Zero};

use crate::algorithms::{mac_digit, sub2};
use crate::big_digit::{self, BigDigit, DoubleBigDigit};
use crate::biguint::BigUint;
use crate::{Error, Result};

/// Compute `rho = -1/n mod beta` for an odd modulus `n`.
///
/// The inverse of the low digit is lifted from a 4-bit seed by Newton
/// doubling: each pass of `x <- x * (2 - n0 * x)` doubles the number of
/// correct low bits, so three passes cover 28-bit digits and four cover
/// 60-bit ones.
pub fn montgomery_setup(n: &BigUint) -> Result<BigDigit> {
    let n0 = match n.data.first() {
        Some(&d) => d,
        None => return Err(Error::InvalidArgument("montgomery modulus must be positive")),
    };
    if n0 & 1 == 0 {
        return Err(Error::InvalidArgument("montgomery modulus must be odd"));
    }

    // x * n0 == 1 mod 2^4
    let mut x = (((n0 + 2) & 4) << 1).wrapping_add(n0);
    let mut bits = 4;
    while bits < big_digit::BITS {
        x = x.wrapping_mul((2 as BigDigit).wrapping_sub(n0.wrapping_mul(x)));
        bits *= 2;
    }

    // rho = beta - x = -x mod beta
    Ok(((big_digit::BASE - (x & big_digit::MASK) as DoubleBigDigit)
        & big_digit::MASK as DoubleBigDigit) as BigDigit)
}

/// Compute `R mod b` where `R = beta^b.used`.
///
/// Starts from the largest power of two below `b` that shares its digit
/// count, then doubles with a conditional subtract until the exponent
/// reaches a whole number of digits. Each step keeps the value below `b`.
pub fn montgomery_calc_normalization(b: &BigUint) -> BigUint {
    assert!(!b.is_zero());

    let used = b.data.len();
    let (mut a, doublings) = if used > 1 {
        let bits = b.bits() % big_digit::BITS;
        if bits == 0 {
            // Full top digit; start one bit below the digit boundary.
            (
                BigUint::power_of_two((used - 1) * big_digit::BITS - 1),
                big_digit::BITS + 1,
            )
        } else {
            (
                BigUint::power_of_two((used - 1) * big_digit::BITS + bits - 1),
                big_digit::BITS - bits + 1,
            )
        }
    } else {
        (BigUint::one(), big_digit::BITS)
    };

    for _ in 0..doublings {
        a = &a << 1;
        if a >= *b {
            sub2(&mut a.data, &b.data);
            a.normalize();
        }
    }
    a
}

/// Compute `x <- x * R^-1 mod n` for `x < n^2`.
///
/// Dispatches to the Comba column path when the operand sizes leave enough
/// slack for the column sums, otherwise runs the row-oriented baseline.
pub fn montgomery_reduce(x: &mut BigUint, n: &BigUint, rho: BigDigit) {
    if (n.data.len() * 2 + 1) < big_digit::WARRAY
        && x.data.len() <= big_digit::WARRAY
        && n.data.len() < big_digit::MAX_COMBA
    {
        montgomery_reduce_comba(x, n, rho);
    } else {
        montgomery_reduce_baseline(x, n, rho);
    }
}

pub(crate) fn montgomery_reduce_baseline(x: &mut BigUint, n: &BigUint, rho: BigDigit) {
    let n_size = n.data.len();
    let digs = n_size * 2 + 1;
    if x.data.len() < digs {
        x.data.resize(digs, 0);
    }

    for ix in 0..n_size {
        // mu chosen so the digit at ix cancels mod beta.
        let mu = (((x.data[ix] as DoubleBigDigit) * rho as DoubleBigDigit)
            & big_digit::MASK as DoubleBigDigit) as BigDigit;
        mac_digit(&mut x.data[ix..], &n.data, mu);
    }

    // x = x / beta^n_size, then a single conditional subtract.
    x.shr_digits(n_size);
    if *x >= *n {
        sub2(&mut x.data, &n.data);
        x.normalize();
    }
}

/// Comba variant: all columns are accumulated in a fixed scratch array and
/// carries are settled one row at a time. Callers guarantee the size bounds
/// checked in `montgomery_reduce`.
pub(crate) fn montgomery_reduce_comba(x: &mut BigUint, n: &BigUint, rho: BigDigit) {
    let n_size = n.data.len();
    let mask = big_digit::MASK as DoubleBigDigit;

    let mut w = [0 as DoubleBigDigit; big_digit::WARRAY];
    for (wi, &d) in w.iter_mut().zip(x.data.iter()) {
        *wi = d as DoubleBigDigit;
    }

    for ix in 0..n_size {
        let mu = ((w[ix] & mask) * rho as DoubleBigDigit) & mask;
        for iy in 0..n_size {
            w[ix + iy] += mu * n.data[iy] as DoubleBigDigit;
        }
        // Settle the finished column's carry before the next row reads it.
        w[ix + 1] += w[ix] >> big_digit::BITS;
    }
    for ix in n_size..2 * n_size {
        w[ix + 1] += w[ix] >> big_digit::BITS;
    }

    x.data.clear();
    x.data
        .extend((n_size..=2 * n_size).map(|i| (w[i] & mask) as BigDigit));
    x.normalize();

    if *x >= *n {
        sub2(&mut x.data, &n.data);
        x.normalize();
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand_chacha::ChaChaRng;

    use super::*;
    use crate::bigrand::{gen_odd_biguint as odd_biguint, RandBigUint};

    #[test]
    fn setup_inverts_low_digit() {
        let mut rng = ChaChaRng::from_seed([8u8; 32]);
        for _ in 0..50 {
            let n = odd_biguint(&mut rng, 90);
            let rho = montgomery_setup(&n).unwrap();
            let n0 = n.data[0] as DoubleBigDigit;
            assert_eq!(
                (rho as DoubleBigDigit * n0 + 1) & big_digit::MASK as DoubleBigDigit,
                0
            );
        }
    }

    #[test]
    fn setup_of_nine() {
        let n = BigUint::from(9u32);
        let rho = montgomery_setup(&n).unwrap();
        assert_eq!(
            (rho as DoubleBigDigit * 9 + 1) & big_digit::MASK as DoubleBigDigit,
            0
        );
        #[cfg(not(feature = "u64_digit"))]
        assert_eq!(rho, 0x071C_71C7);
    }

    #[test]
    fn setup_rejects_even_modulus() {
        assert!(montgomery_setup(&BigUint::from(1000u32)).is_err());
        assert!(montgomery_setup(&BigUint::zero()).is_err());
    }

    #[test]
    fn normalization_is_r_mod_b() {
        let mut rng = ChaChaRng::from_seed([9u8; 32]);
        for &bits in &[5usize, 28, 29, 56, 90, 200] {
            let b = odd_biguint(&mut rng, bits);
            let r = BigUint::power_of_two(b.data.len() * big_digit::BITS);
            assert_eq!(montgomery_calc_normalization(&b), &r % &b, "bits = {}", bits);
        }
    }

    #[test]
    fn normalization_at_digit_boundary() {
        // A modulus with a full top digit exercises the wrap case.
        let b = &BigUint::power_of_two(56) - &BigUint::from(1u32);
        let r = BigUint::power_of_two(b.data.len() * big_digit::BITS);
        assert_eq!(montgomery_calc_normalization(&b), &r % &b);
    }

    #[test]
    fn reduce_round_trips() {
        let mut rng = ChaChaRng::from_seed([10u8; 32]);
        for &bits in &[30usize, 100, 300] {
            let n = odd_biguint(&mut rng, bits);
            let rho = montgomery_setup(&n).unwrap();
            let r_mod_n = montgomery_calc_normalization(&n);
            for _ in 0..10 {
                let y = &rng.gen_biguint(bits + 10) % &n;
                // y * R mod n, then stripping R^-1 must give y back.
                let mut t = &(&y * &r_mod_n) % &n;
                montgomery_reduce(&mut t, &n, rho);
                assert!(t < n);
                assert_eq!(t, y);
            }
        }
    }

    #[test]
    fn comba_and_baseline_agree() {
        let mut rng = ChaChaRng::from_seed([11u8; 32]);
        for &bits in &[60usize, 150, 400] {
            let n = odd_biguint(&mut rng, bits);
            let rho = montgomery_setup(&n).unwrap();
            for _ in 0..10 {
                let x = rng.gen_biguint(2 * bits - 2);
                let mut a = x.clone();
                let mut b = x.clone();
                montgomery_reduce_comba(&mut a, &n, rho);
                montgomery_reduce_baseline(&mut b, &n, rho);
                assert_eq!(a, b);
            }
        }
    }

    #[test]
    fn reduce_at_comba_size_boundaries() {
        // Digit counts straddling MAX_COMBA hit the Comba path on one side
        // and the baseline on the other.
        let mut rng = ChaChaRng::from_seed([12u8; 32]);
        for &digits in &[
            big_digit::MAX_COMBA - 1,
            big_digit::MAX_COMBA,
            big_digit::MAX_COMBA + 1,
        ] {
            let bits = digits * big_digit::BITS;
            let n = odd_biguint(&mut rng, bits);
            let rho = montgomery_setup(&n).unwrap();
            let r_mod_n = montgomery_calc_normalization(&n);
            let y = &rng.gen_biguint(bits) % &n;
            let mut t = &(&y * &r_mod_n) % &n;
            montgomery_reduce(&mut t, &n, rho);
            assert_eq!(t, y, "digits = {}", digits);
        }
    }
}
