//! Sliding-window modular exponentiation.
//!
//! Both engines walk the exponent from the most significant bit down,
//! collecting `winsize` bits at a time so that one table multiply pays for
//! `winsize` squarings. They differ only in how intermediate values are
//! reduced: [`exponent_mod`] binds Barrett or multi-digit `2^k - d`
//! reduction, [`exponent_mod_fast`] binds Montgomery or single-digit
//! `2^k - d` reduction.

use num_traits::{One, Zero};

use crate::barrett;
use crate::big_digit::{self, BigDigit};
use crate::biguint::BigUint;
use crate::monty;
use crate::reduce_2k::{
    reduce_2k, reduce_2k_l, reduce_2k_setup, reduce_2k_setup_l, reduce_is_2k, reduce_is_2k_l,
};
use crate::{Error, Result};

/// Upper bound on the power table; must cover `2^winsize`.
pub const TAB_SIZE: usize = 256;

/// Cap on the window size; 0 leaves the bit-size table uncapped.
pub const MAX_WIN_SIZE: usize = 0;

/// Reduction strategy requested by the caller.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RedMode {
    /// Barrett in [`exponent_mod`], Montgomery in [`exponent_mod_fast`].
    Standard,
    /// Restricted diminished-radix moduli (`beta^k - d`).
    DiminishedRadix,
    /// Unrestricted `2^k - d` moduli.
    TwoK,
}

/// Reducer bound once per call and dispatched inside the hot loop.
enum Reducer {
    Barrett { mu: BigUint },
    TwoKLong { d: BigUint },
    Montgomery { rho: BigDigit },
    TwoK { d: BigDigit },
}

impl Reducer {
    fn apply(&self, x: &mut BigUint, p: &BigUint) {
        match self {
            Reducer::Barrett { mu } => barrett::reduce(x, p, mu),
            Reducer::TwoKLong { d } => reduce_2k_l(x, p, d),
            Reducer::Montgomery { rho } => monty::montgomery_reduce(x, p, *rho),
            Reducer::TwoK { d } => reduce_2k(x, p, *d),
        }
    }
}

fn window_size(bits: usize) -> usize {
    let w = if bits <= 7 {
        2
    } else if bits <= 36 {
        3
    } else if bits <= 140 {
        4
    } else if bits <= 450 {
        5
    } else if bits <= 1303 {
        6
    } else if bits <= 3529 {
        7
    } else {
        8
    };
    if MAX_WIN_SIZE != 0 {
        w.min(MAX_WIN_SIZE)
    } else {
        w
    }
}

/// Scanner state for the left-to-right bit walk.
enum Scan {
    /// Skipping the exponent's leading zeros.
    LeadingZeros,
    /// Between windows; zero bits cost one squaring each.
    Squaring,
    /// Accumulating bits of the current window.
    Window,
}

/// The engine shared by both entry points: `m1` is the (reduced) base, and
/// `res` starts at the representation of one under the bound reducer.
fn window_modpow(x: &BigUint, p: &BigUint, m1: BigUint, res: BigUint, red: &Reducer) -> BigUint {
    let winsize = window_size(x.bits());
    debug_assert!((1 << winsize) <= TAB_SIZE);
    let half = 1usize << (winsize - 1);

    // Power table. Only index 1 and the upper half are ever touched:
    // M[half] is M[1] squared up, and each following slot adds one more
    // multiply by M[1].
    let mut m = vec![BigUint::zero(); 1 << winsize];
    m[1] = m1;
    m[half] = m[1].clone();
    for _ in 0..winsize - 1 {
        let mut t = m[half].sqr();
        red.apply(&mut t, p);
        m[half] = t;
    }
    for ix in half + 1..(1 << winsize) {
        let mut t = &m[ix - 1] * &m[1];
        red.apply(&mut t, p);
        m[ix] = t;
    }

    let mut res = res;
    let mut mode = Scan::LeadingZeros;
    let mut bitcnt = 1usize;
    let mut buf: BigDigit = 0;
    let mut digidx = x.data.len() as isize - 1;
    let mut bitcpy = 0usize;
    let mut bitbuf = 0usize;

    loop {
        bitcnt -= 1;
        if bitcnt == 0 {
            if digidx < 0 {
                break;
            }
            buf = x.data[digidx as usize];
            digidx -= 1;
            bitcnt = big_digit::BITS;
        }

        let y = (buf >> (big_digit::BITS - 1)) & 1;
        buf = (buf << 1) & big_digit::MASK;

        match mode {
            Scan::LeadingZeros if y == 0 => continue,
            Scan::Squaring if y == 0 => {
                let mut t = res.sqr();
                red.apply(&mut t, p);
                res = t;
                continue;
            }
            _ => {}
        }

        // A set bit lands here in every state; buffer it into the window.
        bitcpy += 1;
        bitbuf |= (y as usize) << (winsize - bitcpy);
        mode = Scan::Window;

        if bitcpy == winsize {
            for _ in 0..winsize {
                let mut t = res.sqr();
                red.apply(&mut t, p);
                res = t;
            }
            let mut t = &res * &m[bitbuf];
            red.apply(&mut t, p);
            res = t;

            bitcpy = 0;
            bitbuf = 0;
            mode = Scan::Squaring;
        }
    }

    // Replay a partially filled window one bit at a time.
    if let Scan::Window = mode {
        for _ in 0..bitcpy {
            let mut t = res.sqr();
            red.apply(&mut t, p);
            res = t;

            bitbuf <<= 1;
            if bitbuf & (1 << winsize) != 0 {
                let mut t = &res * &m[1];
                red.apply(&mut t, p);
                res = t;
            }
        }
    }

    res
}

/// Compute `g^x mod p` with Barrett or multi-digit `2^k - d` reduction.
///
/// Works for any positive modulus; prefer [`exponent_mod_fast`] when the
/// modulus is odd or of `2^k - d` shape.
pub fn exponent_mod(g: &BigUint, x: &BigUint, p: &BigUint, redmode: RedMode) -> Result<BigUint> {
    if p.is_zero() {
        return Err(Error::InvalidArgument("modulus must be positive"));
    }

    let red = match redmode {
        RedMode::Standard => Reducer::Barrett {
            mu: barrett::reduce_setup(p),
        },
        _ => Reducer::TwoKLong {
            d: reduce_2k_setup_l(p),
        },
    };

    Ok(window_modpow(x, p, g % p, BigUint::one(), &red))
}

/// Compute `g^x mod p` with Montgomery or single-digit `2^k - d` reduction.
///
/// `RedMode::Standard` requires an odd modulus; `RedMode::DiminishedRadix`
/// is not implemented and reports an error.
pub fn exponent_mod_fast(
    g: &BigUint,
    x: &BigUint,
    p: &BigUint,
    redmode: RedMode,
) -> Result<BigUint> {
    if p.is_zero() {
        return Err(Error::InvalidArgument("modulus must be positive"));
    }

    match redmode {
        RedMode::Standard => {
            let rho = monty::montgomery_setup(p)?;
            // res = R mod p stands for one in the Montgomery domain, and
            // the base moves there through a plain modular multiply.
            let res = monty::montgomery_calc_normalization(p);
            let m1 = &(g * &res) % p;
            let red = Reducer::Montgomery { rho };
            let mut out = window_modpow(x, p, m1, res, &red);
            // One extra reduction cancels the residual factor of R.
            monty::montgomery_reduce(&mut out, p, rho);
            Ok(out)
        }
        RedMode::DiminishedRadix => Err(Error::Unimplemented(
            "restricted diminished-radix exponentiation",
        )),
        RedMode::TwoK => {
            let red = Reducer::TwoK {
                d: reduce_2k_setup(p),
            };
            Ok(window_modpow(x, p, g % p, BigUint::one(), &red))
        }
    }
}

/// Compute `g^x mod p`, picking the reduction from the modulus' shape.
pub fn mod_exp(g: &BigUint, x: &BigUint, p: &BigUint) -> Result<BigUint> {
    if p.is_zero() {
        return Err(Error::InvalidArgument("modulus must be positive"));
    }

    if reduce_is_2k(p) {
        exponent_mod_fast(g, x, p, RedMode::TwoK)
    } else if p.is_odd() {
        exponent_mod_fast(g, x, p, RedMode::Standard)
    } else if reduce_is_2k_l(p) {
        exponent_mod(g, x, p, RedMode::DiminishedRadix)
    } else {
        exponent_mod(g, x, p, RedMode::Standard)
    }
}
