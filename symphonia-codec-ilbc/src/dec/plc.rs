//! Packet loss concealment.

use log::debug;

use crate::consts::*;
use crate::lpc::{LpcCoefs, LPC_IDENTITY};

/// Samples correlated when looking for the pitch of the last frame.
const CORR_RANGE: usize = 60;

const INITIAL_SEED: u32 = 777;

/// Gain applied to the concealed residual after `losses` consecutive
/// losses.
pub fn decay_gain(losses: usize) -> f32 {
    match losses {
        0 => 1.0,
        1 => 0.9,
        2 => 0.7,
        3 => 0.5,
        _ => 0.0,
    }
}

/// Correlation measures of the end of `buffer` against itself `lag`
/// samples back: squared normalized correlation, pitch gain and
/// periodicity.
fn comp_corr(buffer: &[f32], lag: usize, range: usize) -> (f32, f32, f32) {
    let len = buffer.len();
    let range = if len < range + lag { len.saturating_sub(lag) } else { range };

    let mut cross = 0.0f32;
    let mut energy_lag = 0.0f32;
    let mut energy = 0.0f32;
    for i in len - range..len {
        let x = buffer[i];
        let y = buffer[i - lag];
        cross += x * y;
        energy_lag += y * y;
        energy += x * x;
    }

    if energy_lag > 0.0 {
        (
            cross * cross / energy_lag,
            (cross / energy_lag).abs(),
            cross.abs() / (energy_lag.sqrt() * energy.sqrt()),
        )
    } else {
        (0.0, 0.0, 0.0)
    }
}

/// Concealment history, updated on every frame.
pub struct Plc {
    consecutive: usize,
    prev_lost: bool,
    prev_lag: usize,
    per: f32,
    gain: f32,
    seed: u32,
    prev_residual: [f32; BLOCKL_MAX],
    prev_lpc: LpcCoefs,
}

impl Plc {
    pub fn new() -> Self {
        Plc {
            consecutive: 0,
            prev_lost: false,
            prev_lag: 120,
            per: 0.0,
            gain: 1.0,
            seed: INITIAL_SEED,
            prev_residual: [0.0; BLOCKL_MAX],
            prev_lpc: LPC_IDENTITY,
        }
    }

    pub fn consecutive_losses(&self) -> usize {
        self.consecutive
    }

    /// Gain of the most recent frame, one for decoded frames.
    pub fn gain(&self) -> f32 {
        self.gain
    }

    /// Remember a correctly decoded frame.
    pub fn update(&mut self, residual: &[f32], lpc: &LpcCoefs) {
        self.consecutive = 0;
        self.gain = 1.0;
        self.prev_lost = false;
        self.prev_lpc = *lpc;
        self.prev_residual[..residual.len()].copy_from_slice(residual);
    }

    /// Fill `out` with a concealed residual and return the filter to
    /// synthesize it with.
    ///
    /// `inlag` is the pitch lag tracked on the previous decoded frames.
    pub fn conceal(&mut self, inlag: usize, out: &mut [f32]) -> LpcCoefs {
        let len = out.len();
        let prev = &self.prev_residual[..len];
        self.consecutive += 1;

        let (lag, max_per) = if !self.prev_lost {
            // search around the lag of the last good frames
            let inlag = inlag.clamp(20, len - 3);
            let mut lag = inlag - 3;
            let (mut maxcc, _, mut max_per) = comp_corr(prev, lag, CORR_RANGE);
            for i in inlag - 2..=inlag + 3 {
                let (cc, _, per) = comp_corr(prev, i, CORR_RANGE);
                if cc > maxcc {
                    maxcc = cc;
                    lag = i;
                    max_per = per;
                }
            }
            (lag, max_per)
        } else {
            (self.prev_lag, self.per)
        };

        let use_gain = decay_gain(self.consecutive);

        // mix of pitch repetition and noise
        let ftmp = max_per.sqrt();
        let pitchfact = if ftmp > 0.7 {
            1.0
        } else if ftmp > 0.4 {
            (ftmp - 0.4) / (0.7 - 0.4)
        } else {
            0.0
        };

        // avoid repeating the same pitch cycle
        let use_lag = if lag < 80 { 2 * lag } else { lag };

        let mut randvec = [0.0f32; BLOCKL_MAX];
        let mut energy = 0.0f32;
        for i in 0..len {
            self.seed = self.seed.wrapping_mul(69069).wrapping_add(1) & 0x7fff_ffff;
            let randlag = 50 + (self.seed % 70) as usize;
            randvec[i] = if i < randlag { prev[len + i - randlag] } else { randvec[i - randlag] };

            let pitch = if i < use_lag { prev[len + i - use_lag] } else { out[i - use_lag] };

            let fade = if i < 80 {
                1.0
            } else if i < 160 {
                0.95
            } else {
                0.9
            };
            out[i] = fade * use_gain * (pitchfact * pitch + (1.0 - pitchfact) * randvec[i]);
            energy += out[i] * out[i];
        }

        // below 30 dB use the noise only
        if (energy / len as f32).sqrt() < 30.0 {
            out.copy_from_slice(&randvec[..len]);
        }

        if !self.prev_lost {
            debug!("ilbc: concealing from lag {} periodicity {:.3}", lag, max_per);
        }

        self.prev_lag = lag;
        self.per = max_per;
        self.prev_lost = true;
        self.gain = use_gain;
        self.prev_residual[..len].copy_from_slice(out);
        self.prev_lpc
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn periodic(len: usize, period: usize) -> Vec<f32> {
        (0..len)
            .map(|n| 800.0 * (std::f32::consts::TAU * (n % period) as f32 / period as f32).sin())
            .collect()
    }

    #[test]
    fn test_decay_schedule() {
        let gains: Vec<f32> = (1..=6).map(decay_gain).collect();
        assert!(gains.windows(2).all(|w| w[1] <= w[0]));
        assert_eq!(decay_gain(4), 0.0);
    }

    #[test]
    fn test_comp_corr_finds_period() {
        let signal = periodic(BLOCKL_30MS, 50);
        let (cc, gain, per) = comp_corr(&signal, 50, CORR_RANGE);
        assert!(cc > 0.0);
        assert!((gain - 1.0).abs() < 1e-3);
        assert!((per - 1.0).abs() < 1e-3);

        // lags past the buffer give nothing
        assert_eq!(comp_corr(&signal, BLOCKL_30MS, CORR_RANGE), (0.0, 0.0, 0.0));
    }

    #[test]
    fn test_conceal_repeats_pitch() {
        let mut plc = Plc::new();
        let signal = periodic(BLOCKL_30MS, 50);
        plc.update(&signal, &LPC_IDENTITY);

        let mut out = [0.0; BLOCKL_30MS];
        let lpc = plc.conceal(50, &mut out);
        assert_eq!(lpc, LPC_IDENTITY);
        assert_eq!(plc.consecutive_losses(), 1);
        assert_eq!(plc.prev_lag, 50);

        // fully periodic: two cycles back, scaled by the decay
        for i in 0..80 {
            assert!((out[i] - 0.9 * signal[BLOCKL_30MS - 100 + i]).abs() < 1.0);
        }
    }

    #[test]
    fn test_gain_reaches_zero() {
        let mut plc = Plc::new();
        plc.update(&periodic(BLOCKL_20MS, 40), &LPC_IDENTITY);
        let mut out = [0.0; BLOCKL_20MS];
        let mut gains = Vec::new();
        for _ in 0..5 {
            plc.conceal(40, &mut out);
            gains.push(plc.gain());
            assert!(out.iter().all(|x| x.is_finite()));
        }
        assert!(gains.windows(2).all(|w| w[1] <= w[0]));
        assert_eq!(gains[3], 0.0);

        plc.update(&[0.0; BLOCKL_20MS], &LPC_IDENTITY);
        assert_eq!(plc.consecutive_losses(), 0);
        assert_eq!(plc.gain(), 1.0);
    }

    #[test]
    fn test_long_lag_is_bounded() {
        let mut plc = Plc::new();
        plc.update(&periodic(BLOCKL_20MS, 40), &LPC_IDENTITY);
        let mut out = [0.0; BLOCKL_20MS];
        plc.conceal(238, &mut out);
        assert!(plc.prev_lag <= BLOCKL_20MS);
    }
}
