//! Linear prediction and line spectral frequency helpers.

use std::f32::consts::TAU;

use crate::consts::*;
use crate::mode::Mode;

/// Prediction filter `A(z)`, the first coefficient is one.
pub type LpcCoefs = [f32; LPC_FILTERORDER + 1];

pub const LPC_IDENTITY: LpcCoefs = {
    let mut a = [0.0; LPC_FILTERORDER + 1];
    a[0] = 1.0;
    a
};

/// Autocorrelation of `x` for lags `0..r.len()`.
pub fn autocorr(x: &[f32], r: &mut [f32]) {
    for (lag, r) in r.iter_mut().enumerate() {
        *r = x[..x.len() - lag]
            .iter()
            .zip(&x[lag..])
            .map(|(a, b)| a * b)
            .sum();
    }
}

/// Levinson-Durbin recursion.
///
/// A zero lag correlation below `EPS` yields the identity filter.
pub fn levinson_durbin(r: &[f32; LPC_FILTERORDER + 1]) -> LpcCoefs {
    let mut a = LPC_IDENTITY;
    if r[0] < EPS {
        return a;
    }

    let mut k = -r[1] / r[0];
    a[1] = k;
    let mut alpha = r[0] + r[1] * k;
    for m in 1..LPC_FILTERORDER {
        let mut sum = r[m + 1];
        for i in 0..m {
            sum += a[i + 1] * r[m - i];
        }
        k = -sum / alpha;
        alpha += k * sum;
        for i in 0..(m + 1) >> 1 {
            let tmp = a[i + 1] + k * a[m - i];
            a[m - i] += k * a[i + 1];
            a[i + 1] = tmp;
        }
        a[m + 1] = k;
    }
    a
}

/// Bandwidth expansion, coefficient `i` is scaled by `chirp^i`.
pub fn bw_expand(input: &[f32], chirp: f32) -> LpcCoefs {
    let mut out = [0.0; LPC_FILTERORDER + 1];
    let mut fac = 1.0;
    for (o, &x) in out.iter_mut().zip(input) {
        *o = fac * x;
        fac *= chirp;
    }
    out
}

/// `out = coef * in1 + (1 - coef) * in2`
pub fn interpolate(out: &mut [f32], in1: &[f32], in2: &[f32], coef: f32) {
    let invcoef = 1.0 - coef;
    for ((o, &a), &b) in out.iter_mut().zip(in1).zip(in2) {
        *o = coef * a + invcoef * b;
    }
}

/// Convert a prediction filter to line spectral frequencies in radians.
///
/// The roots of the symmetric and antisymmetric polynomials are found on a
/// coarse grid, then refined by halving the step size.
pub fn a2lsf(a: &LpcCoefs) -> [f32; LPC_FILTERORDER] {
    const STEPS: [f32; LSF_NUMBER_OF_STEPS] = [0.00635, 0.003175, 0.0015875, 0.00079375];

    let mut p = [0.0f32; LPC_HALFORDER];
    let mut q = [0.0f32; LPC_HALFORDER];
    for i in 0..LPC_HALFORDER {
        p[i] = -(a[i + 1] + a[LPC_FILTERORDER - i]);
        q[i] = a[LPC_FILTERORDER - i] - a[i + 1];
    }

    let mut p_pre = [0.0f32; LPC_HALFORDER];
    let mut q_pre = [0.0f32; LPC_HALFORDER];
    p_pre[0] = -1.0 - p[0];
    q_pre[0] = 1.0 - q[0];
    for i in 1..LPC_HALFORDER {
        p_pre[i] = -p_pre[i - 1] - p[i];
        q_pre[i] = q_pre[i - 1] - q[i];
    }
    p_pre[LPC_HALFORDER - 1] /= 2.0;
    q_pre[LPC_HALFORDER - 1] /= 2.0;

    let mut freq = [0.0f32; LPC_FILTERORDER];
    let mut olds = [DOUBLE_MAX; 2];
    let mut omega = 0.0f32;
    let mut old_omega = 0.0f32;

    for (lsp_index, f) in freq.iter_mut().enumerate() {
        let (pq, old) = if lsp_index & 1 == 0 {
            (&p_pre, &mut olds[0])
        } else {
            (&q_pre, &mut olds[1])
        };

        let mut step_idx = 0;
        let mut step = STEPS[0];
        while step_idx < LSF_NUMBER_OF_STEPS {
            let hlp = (omega * TAU).cos();
            let hlp1 = 2.0 * hlp + pq[0];
            let hlp2 = 2.0 * hlp * hlp1 - 1.0 + pq[1];
            let hlp3 = 2.0 * hlp * hlp2 - hlp1 + pq[2];
            let hlp4 = 2.0 * hlp * hlp3 - hlp2 + pq[3];
            let hlp5 = hlp * hlp4 - hlp3 + pq[4];

            if hlp5 * *old <= 0.0 || omega >= 0.5 {
                if step_idx == LSF_NUMBER_OF_STEPS - 1 {
                    *f = if hlp5.abs() >= old.abs() {
                        omega - step
                    } else {
                        omega
                    };
                    *old = if *old >= 0.0 { -DOUBLE_MAX } else { DOUBLE_MAX };
                    omega = old_omega;
                    step_idx = LSF_NUMBER_OF_STEPS;
                } else {
                    if step_idx == 0 {
                        old_omega = omega;
                    }
                    step_idx += 1;
                    omega -= STEPS[step_idx];
                    step = STEPS[step_idx];
                }
            } else {
                *old = hlp5;
                omega += step;
            }
        }
    }

    for f in freq.iter_mut() {
        *f *= TAU;
    }
    freq
}

/// Convert line spectral frequencies in radians to a prediction filter.
pub fn lsf2a(lsf: &[f32]) -> LpcCoefs {
    let mut freq = [0.0f32; LPC_FILTERORDER];
    for (f, &l) in freq.iter_mut().zip(lsf) {
        *f = l / TAU;
    }

    // ill-conditioned input is spread evenly over the valid range
    if freq[0] <= 0.0 || freq[LPC_FILTERORDER - 1] >= 0.5 {
        if freq[0] <= 0.0 {
            freq[0] = 0.022;
        }
        if freq[LPC_FILTERORDER - 1] >= 0.5 {
            freq[LPC_FILTERORDER - 1] = 0.499;
        }
        let hlp = (freq[LPC_FILTERORDER - 1] - freq[0]) / (LPC_FILTERORDER - 1) as f32;
        for i in 1..LPC_FILTERORDER {
            freq[i] = freq[i - 1] + hlp;
        }
    }

    let mut p = [0.0f32; LPC_HALFORDER];
    let mut q = [0.0f32; LPC_HALFORDER];
    for i in 0..LPC_HALFORDER {
        p[i] = (TAU * freq[2 * i]).cos();
        q[i] = (TAU * freq[2 * i + 1]).cos();
    }

    let mut a = [0.0f32; LPC_HALFORDER + 1];
    let mut b = [0.0f32; LPC_HALFORDER + 1];
    let mut a1 = [0.0f32; LPC_HALFORDER];
    let mut a2 = [0.0f32; LPC_HALFORDER];
    let mut b1 = [0.0f32; LPC_HALFORDER];
    let mut b2 = [0.0f32; LPC_HALFORDER];

    let mut recurse = |a: &mut [f32; LPC_HALFORDER + 1], b: &mut [f32; LPC_HALFORDER + 1]| {
        for i in 0..LPC_HALFORDER {
            a[i + 1] = a[i] - 2.0 * p[i] * a1[i] + a2[i];
            b[i + 1] = b[i] - 2.0 * q[i] * b1[i] + b2[i];
            a2[i] = a1[i];
            a1[i] = a[i];
            b2[i] = b1[i];
            b1[i] = b[i];
        }
    };

    a[0] = 0.25;
    b[0] = 0.25;
    recurse(&mut a, &mut b);

    let mut coefs = LPC_IDENTITY;
    for j in 0..LPC_FILTERORDER {
        if j == 0 {
            a[0] = 0.25;
            b[0] = -0.25;
        } else {
            a[0] = 0.0;
            b[0] = 0.0;
        }
        recurse(&mut a, &mut b);
        coefs[j + 1] = 2.0 * (a[LPC_HALFORDER] + b[LPC_HALFORDER]);
    }
    coefs
}

/// Interpolate two LSF sets and convert the result to a prediction filter.
pub fn lsf_interpolate_to_a(lsf1: &[f32], lsf2: &[f32], coef: f32) -> LpcCoefs {
    let mut lsf = [0.0f32; LPC_FILTERORDER];
    interpolate(&mut lsf, lsf1, lsf2, coef);
    lsf2a(&lsf)
}

/// Prediction filters of every sub-block, interpolated between the last LSF
/// set of the previous frame `old` and the sets of this frame `lsf`.
pub fn interpolate_subframes(mode: Mode, old: &[f32], lsf: &[f32], out: &mut [LpcCoefs; NSUB_MAX]) {
    let first = &lsf[..LPC_FILTERORDER];
    match mode {
        Mode::Ms20 => {
            for (a, &w) in out.iter_mut().zip(&LSF_WEIGHT_20MS) {
                *a = lsf_interpolate_to_a(old, first, w);
            }
        }
        Mode::Ms30 => {
            let second = &lsf[LPC_FILTERORDER..2 * LPC_FILTERORDER];
            out[0] = lsf_interpolate_to_a(old, first, LSF_WEIGHT_30MS[0]);
            for (a, &w) in out[1..].iter_mut().zip(&LSF_WEIGHT_30MS[1..]) {
                *a = lsf_interpolate_to_a(first, second, w);
            }
        }
    }
}

/// Enforce a minimum distance between neighbouring LSFs and keep them in
/// the valid range, for `count` consecutive vectors of `dim` values.
///
/// Returns true when anything was changed.
pub fn lsf_check(lsf: &mut [f32], dim: usize, count: usize) -> bool {
    const EPS_SEP: f32 = 0.039; // 50 Hz
    const EPS_HALF: f32 = 0.0195;
    const MAX_LSF: f32 = 3.14; // 4000 Hz
    const MIN_LSF: f32 = 0.01; // 0 Hz

    let mut changed = false;
    for _ in 0..2 {
        for m in 0..count {
            for k in 0..dim - 1 {
                let pos = m * dim + k;
                if lsf[pos + 1] - lsf[pos] < EPS_SEP {
                    if lsf[pos + 1] < lsf[pos] {
                        lsf[pos + 1] = lsf[pos] + EPS_HALF;
                        lsf[pos] = lsf[pos + 1] - EPS_HALF;
                    } else {
                        lsf[pos] -= EPS_HALF;
                        lsf[pos + 1] += EPS_HALF;
                    }
                    changed = true;
                }
                if lsf[pos] < MIN_LSF {
                    lsf[pos] = MIN_LSF;
                    changed = true;
                }
                if lsf[pos] > MAX_LSF {
                    lsf[pos] = MAX_LSF;
                    changed = true;
                }
            }
        }
    }
    changed
}

/// Offset of every split codebook in `LSF_CB`.
fn lsf_cb_offsets() -> [usize; LSF_NSPLIT] {
    let mut offsets = [0; LSF_NSPLIT];
    for i in 1..LSF_NSPLIT {
        offsets[i] = offsets[i - 1] + LSF_DIM_CB[i - 1] * LSF_SIZE_CB[i - 1];
    }
    offsets
}

/// Nearest neighbour search, returns the index of the closest vector.
fn vq(x: &[f32], cb: &[f32], dim: usize) -> usize {
    let mut min_dist = DOUBLE_MAX;
    let mut min_index = 0;
    for (j, cand) in cb.chunks_exact(dim).enumerate() {
        let dist: f32 = x.iter().zip(cand).map(|(a, b)| (a - b) * (a - b)).sum();
        if dist < min_dist {
            min_dist = dist;
            min_index = j;
        }
    }
    min_index
}

/// Split vector quantization of one LSF set.
///
/// Writes the quantized vector to `xq` and returns the split indices.
pub fn split_vq(x: &[f32], xq: &mut [f32]) -> [usize; LSF_NSPLIT] {
    let offsets = lsf_cb_offsets();
    let mut index = [0; LSF_NSPLIT];
    let mut pos = 0;
    for i in 0..LSF_NSPLIT {
        let dim = LSF_DIM_CB[i];
        let cb = &LSF_CB[offsets[i]..offsets[i] + dim * LSF_SIZE_CB[i]];
        index[i] = vq(&x[pos..pos + dim], cb, dim);
        xq[pos..pos + dim].copy_from_slice(&cb[index[i] * dim..(index[i] + 1) * dim]);
        pos += dim;
    }
    index
}

/// Look up `lpc_n` LSF sets from their split indices.
pub fn lsf_dequant(index: &[usize], lpc_n: usize) -> [f32; LPC_FILTERORDER * LPC_N_MAX] {
    let offsets = lsf_cb_offsets();
    let mut lsf = [0.0; LPC_FILTERORDER * LPC_N_MAX];
    for set in 0..lpc_n {
        let mut pos = set * LPC_FILTERORDER;
        for i in 0..LSF_NSPLIT {
            let dim = LSF_DIM_CB[i];
            let start = offsets[i] + index[set * LSF_NSPLIT + i] * dim;
            lsf[pos..pos + dim].copy_from_slice(&LSF_CB[start..start + dim]);
            pos += dim;
        }
    }
    lsf
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_levinson_first_order() {
        // autocorrelation of an AR(1) process x[n] = 0.8 x[n-1] + e[n]
        let mut r = [0.0; LPC_FILTERORDER + 1];
        for (k, r) in r.iter_mut().enumerate() {
            *r = 0.8f32.powi(k as i32);
        }
        let a = levinson_durbin(&r);
        assert!((a[1] + 0.8).abs() < 1e-4);
        for &c in &a[2..] {
            assert!(c.abs() < 1e-4);
        }
    }

    #[test]
    fn test_levinson_silence() {
        assert_eq!(levinson_durbin(&[0.0; LPC_FILTERORDER + 1]), LPC_IDENTITY);
    }

    #[test]
    fn test_bw_expand() {
        let a = [1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0];
        let out = bw_expand(&a, 0.5);
        assert_eq!(out[0], 1.0);
        assert_eq!(out[1], 0.5);
        assert_eq!(out[3], 0.125);
    }

    #[test]
    fn test_flat_filter_lsf() {
        let lsf = a2lsf(&LPC_IDENTITY);
        for (k, &f) in lsf.iter().enumerate() {
            let expected = (k + 1) as f32 * std::f32::consts::PI / 11.0;
            assert!((f - expected).abs() < 0.01, "{}: {} != {}", k, f, expected);
        }
        let a = lsf2a(&lsf);
        assert!((a[0] - 1.0).abs() < 1e-6);
        for &c in &a[1..] {
            assert!(c.abs() < 0.02, "{:?}", a);
        }
    }

    #[test]
    fn test_lsf_round_trip() {
        // resonant but stable filter
        let a = bw_expand(&[1.0, -1.6, 0.9, -0.2, 0.1, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0], 0.9);
        let lsf = a2lsf(&a);
        assert!(lsf.windows(2).all(|w| w[0] < w[1]), "{:?}", lsf);
        let back = lsf2a(&lsf);
        for (x, y) in a.iter().zip(&back) {
            assert!((x - y).abs() < 0.05, "{:?} != {:?}", a, back);
        }
    }

    #[test]
    fn test_lsf_check_repairs() {
        let mut lsf = [0.0, 0.3, 0.29, 1.0, 1.01, 1.5, 2.0, 2.5, 2.9, 3.5];
        assert!(lsf_check(&mut lsf, LPC_FILTERORDER, 1));
        assert!(lsf[0] >= 0.01);
        assert!(lsf[1] < lsf[2]);
        assert!(lsf[3] < lsf[4]);
        let mut ok = LSF_MEAN;
        assert!(!lsf_check(&mut ok, LPC_FILTERORDER, 1));
        assert_eq!(ok, LSF_MEAN);
    }

    #[test]
    fn test_split_vq_dequant() {
        let mut xq = [0.0; LPC_FILTERORDER];
        let index = split_vq(&LSF_MEAN, &mut xq);
        for (i, &idx) in index.iter().enumerate() {
            assert!(idx < LSF_SIZE_CB[i]);
        }
        let deq = lsf_dequant(&index, 1);
        assert_eq!(&deq[..LPC_FILTERORDER], &xq[..]);
        // a codebook entry quantizes to itself
        let entry = lsf_dequant(&[5, 17, 99], 1);
        let mut xq2 = [0.0; LPC_FILTERORDER];
        assert_eq!(split_vq(&entry[..LPC_FILTERORDER], &mut xq2), [5, 17, 99]);
    }

    #[test]
    fn test_interpolate_subframes() {
        let mut lsf = [0.0; 2 * LPC_FILTERORDER];
        lsf[..LPC_FILTERORDER].copy_from_slice(&a2lsf(&LPC_IDENTITY));
        let second = bw_expand(&[1.0, -1.2, 0.5, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0], 0.9);
        lsf[LPC_FILTERORDER..].copy_from_slice(&a2lsf(&second));
        let mut out = [LPC_IDENTITY; NSUB_MAX];

        interpolate_subframes(Mode::Ms30, &LSF_MEAN, &lsf, &mut out);
        // the second set is reached at the end of the frame
        assert_eq!(out[4], lsf2a(&lsf[LPC_FILTERORDER..]));
        assert_eq!(out[5], out[4]);
        assert_eq!(out[1], lsf2a(&lsf[..LPC_FILTERORDER]));

        interpolate_subframes(Mode::Ms20, &LSF_MEAN, &lsf, &mut out);
        assert_eq!(out[3], lsf2a(&lsf[..LPC_FILTERORDER]));
    }
}
