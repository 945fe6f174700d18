//! RT5645 PLL divider search.
//!
//! # PLL Formula
//!
//! ```text
//!   Fout = Fin × (N + 2) / ((M + 2) × (K + 2))      M in use
//!   Fout = Fin × (N + 2) / (K + 2)                   M bypassed
//! ```
//!
//! N is 9 bits, K 5 bits, M 4 bits. The input must lie in 256 kHz..=40 MHz.
//!
//! # Voice Bonnet operating points
//!
//! With the 24.576 MHz oscillator on MCLK and Fout = 512 × fs:
//!
//! | fs       | Fout         | N   | K  | M      |
//! |----------|--------------|-----|----|--------|
//! | 48 kHz   | 24.576 MHz   | 0   | 0  | bypass |
//! | 96 kHz   | 49.152 MHz   | 2   | 0  | bypass |
//! | 44.1 kHz | 22.5792 MHz  | 145 | 8  | 14     |
//!
//! Every search candidate is checked with exact integer arithmetic; a result
//! is accepted within 100 ppm of the target.

use thiserror_no_std::Error;

use super::registers::{PLL_K_MAX, PLL_M_BYPASS, PLL_M_MAX, PLL_M_SHIFT, PLL_N_MAX, PLL_N_SHIFT};

/// Minimum PLL input frequency (Hz).
pub const PLL_INPUT_MIN_HZ: u32 = 256_000;
/// Maximum PLL input frequency (Hz).
pub const PLL_INPUT_MAX_HZ: u32 = 40_000_000;
/// Largest accepted output error, in parts per million.
pub const PLL_TOLERANCE_PPM: u64 = 100;

/// PLL divider search failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PllError {
    /// Input frequency outside 256 kHz..=40 MHz.
    #[error("PLL input {0} Hz out of range")]
    InputOutOfRange(u32),
    /// No divider set lands within tolerance.
    #[error("no PLL dividers for {freq_in_hz} Hz -> {freq_out_hz} Hz")]
    Unreachable {
        /// Input frequency (Hz).
        freq_in_hz: u32,
        /// Requested output frequency (Hz).
        freq_out_hz: u32,
    },
}

/// One set of PLL divider codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PllCoefficients {
    /// N code (feedback divider minus two).
    pub n: u16,
    /// K code (post divider minus two).
    pub k: u8,
    /// M code (pre divider minus two), `None` when bypassed.
    pub m: Option<u8>,
}

impl PllCoefficients {
    /// Total divide ratio `(M + 2) × (K + 2)`, or `K + 2` with M bypassed.
    #[allow(clippy::arithmetic_side_effects)] // codes are at most 5 bits
    fn divisor(&self) -> u64 {
        let k = u64::from(self.k) + 2;
        match self.m {
            Some(m) => (u64::from(m) + 2) * k,
            None => k,
        }
    }

    /// Exact output frequency in millihertz for `freq_in_hz`.
    #[allow(clippy::arithmetic_side_effects)] // ≤ 40e6 × 513 × 1000, fits u64
    pub fn output_mhz(&self, freq_in_hz: u32) -> u64 {
        u64::from(freq_in_hz) * (u64::from(self.n) + 2) * 1000 / self.divisor()
    }

    /// REG_PLL_CTRL1 value.
    #[allow(clippy::arithmetic_side_effects)] // N ≤ 0x1FF, K ≤ 0x1F
    pub fn ctrl1(&self) -> u16 {
        ((self.n & PLL_N_MAX) << PLL_N_SHIFT) | u16::from(self.k & PLL_K_MAX)
    }

    /// REG_PLL_CTRL2 value.
    #[allow(clippy::arithmetic_side_effects)] // M ≤ 0xF
    pub fn ctrl2(&self) -> u16 {
        match self.m {
            Some(m) => u16::from(m & PLL_M_MAX) << PLL_M_SHIFT,
            None => PLL_M_BYPASS,
        }
    }
}

/// Find divider codes producing `freq_out_hz` from `freq_in_hz`.
///
/// Bypassed M is tried before each M code, and smaller K before larger, so
/// the simplest exact setting wins. Otherwise the closest candidate within
/// tolerance is returned.
#[allow(clippy::arithmetic_side_effects)] // bounded by 40e6 × 513 × 17 × 33
pub fn search(freq_in_hz: u32, freq_out_hz: u32) -> Result<PllCoefficients, PllError> {
    if !(PLL_INPUT_MIN_HZ..=PLL_INPUT_MAX_HZ).contains(&freq_in_hz) {
        return Err(PllError::InputOutOfRange(freq_in_hz));
    }
    let unreachable = PllError::Unreachable {
        freq_in_hz,
        freq_out_hz,
    };
    if freq_out_hz == 0 {
        return Err(unreachable);
    }

    let fin = u64::from(freq_in_hz);
    let fout = u64::from(freq_out_hz);
    // (error × divisor, divisor, coefficients) of the best candidate so far.
    let mut best: Option<(u64, u64, PllCoefficients)> = None;

    for k in 0..=PLL_K_MAX {
        for m in core::iter::once(None).chain((0..=PLL_M_MAX).map(Some)) {
            let probe = PllCoefficients { n: 0, k, m };
            let div = probe.divisor();
            // N + 2 rounded to nearest.
            let n_plus_2 = (fout * div + fin / 2) / fin;
            if n_plus_2 < 2 || n_plus_2 - 2 > u64::from(PLL_N_MAX) {
                continue;
            }
            let err = (fin * n_plus_2).abs_diff(fout * div);
            let better = match best {
                // err / div < best_err / best_div
                Some((best_err, best_div, _)) => err * best_div < best_err * div,
                None => true,
            };
            if better {
                let n = u16::try_from(n_plus_2 - 2).map_err(|_| unreachable)?;
                best = Some((err, div, PllCoefficients { n, k, m }));
                if err == 0 {
                    return Ok(PllCoefficients { n, k, m });
                }
            }
        }
    }

    match best {
        // err / div / fout ≤ tolerance / 1e6
        Some((err, div, coeffs)) if err * 1_000_000 <= PLL_TOLERANCE_PPM * fout * div => Ok(coeffs),
        _ => Err(unreachable),
    }
}
