//! Scalar coding of the start state.

use crate::consts::*;
use crate::filter::{all_pole_filter, zero_pole_filter};
use crate::lpc::LpcCoefs;

/// Quantized start state: scale index and one index per sample.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StateIndices {
    pub scale: usize,
    pub samples: [usize; STATE_SHORT_LEN_30MS],
}

/// Scalar quantization against a sorted codebook.
///
/// Returns the index and the quantized value.
pub fn sort_sq(x: f32, cb: &[f32]) -> (usize, f32) {
    if x <= cb[0] {
        return (0, cb[0]);
    }
    let mut i = 0;
    while x > cb[i] && i < cb.len() - 1 {
        i += 1;
    }
    if x > (cb[i] + cb[i - 1]) / 2.0 {
        (i, cb[i])
    } else {
        (i - 1, cb[i - 1])
    }
}

/// Numerator of the all-pass filter built from `synt_denum`.
fn all_pass_numerator(synt_denum: &[f32]) -> [f32; LPC_FILTERORDER + 1] {
    let mut numerator = [0.0; LPC_FILTERORDER + 1];
    for (k, n) in numerator.iter_mut().enumerate() {
        *n = synt_denum[LPC_FILTERORDER - k];
    }
    numerator
}

/// Circular convolution of `input` with the all-pass filter of
/// `synt_denum`, `2 * len` samples are returned with `LPC_FILTERORDER`
/// samples of zero history in front.
fn all_pass(input: &[f32], synt_denum: &[f32]) -> [f32; LPC_FILTERORDER + 2 * STATE_LEN] {
    let len = input.len();
    let numerator = all_pass_numerator(synt_denum);

    let mut tmp = [0.0f32; LPC_FILTERORDER + 2 * STATE_LEN];
    tmp[LPC_FILTERORDER..LPC_FILTERORDER + len].copy_from_slice(input);
    let mut fout = [0.0f32; LPC_FILTERORDER + 2 * STATE_LEN];
    zero_pole_filter(
        &tmp,
        LPC_FILTERORDER,
        &numerator,
        synt_denum,
        2 * len,
        LPC_FILTERORDER,
        &mut fout,
        LPC_FILTERORDER,
    );
    fout
}

/// Decode the scalar coded part of the start state into `out`.
pub fn state_construct(scale: usize, idx_vec: &[usize], synt_denum: &[f32], out: &mut [f32]) {
    let len = out.len();
    let max_val = 10f32.powf(STATE_FRGQ[scale]) / 4.5;

    let mut tmp = [0.0f32; STATE_LEN];
    for (k, t) in tmp[..len].iter_mut().enumerate() {
        *t = max_val * STATE_SQ3[idx_vec[len - 1 - k]];
    }

    let fout = all_pass(&tmp[..len], synt_denum);
    let fout = &fout[LPC_FILTERORDER..];
    for (k, o) in out.iter_mut().enumerate() {
        *o = fout[len - 1 - k] + fout[2 * len - 1 - k];
    }
}

/// Predictive noise shaping quantization of the scaled state in
/// `buf[LPC_FILTERORDER..LPC_FILTERORDER + len]`.
///
/// `weight_denum` holds the filters of the two sub-blocks the state spans.
fn abs_quant(
    buf: &mut [f32],
    weight_denum: &[LpcCoefs],
    len: usize,
    state_short_len: usize,
    state_first: bool,
    out: &mut [usize],
) {
    let switch = if state_first {
        SUBL
    } else {
        state_short_len - SUBL
    };
    let mut weight = &weight_denum[0];

    all_pole_filter(buf, LPC_FILTERORDER, weight, switch, LPC_FILTERORDER);

    let mut synt_out = [0.0f32; LPC_FILTERORDER + STATE_SHORT_LEN_30MS];
    for n in 0..len {
        if n == switch {
            weight = &weight_denum[1];
            all_pole_filter(buf, LPC_FILTERORDER + n, weight, len - n, LPC_FILTERORDER);
        }

        // prediction of the weighted synthesis
        let pos = LPC_FILTERORDER + n;
        synt_out[pos] = 0.0;
        all_pole_filter(&mut synt_out, pos, weight, 1, LPC_FILTERORDER);

        let (index, value) = sort_sq(buf[pos] - synt_out[pos], &STATE_SQ3);
        out[n] = index;
        synt_out[pos] = value;
        all_pole_filter(&mut synt_out, pos, weight, 1, LPC_FILTERORDER);
    }
}

/// Encode the scalar part of the start state found in `residual`.
///
/// `synt_denum` is the filter of the first sub-block the state touches,
/// `weight_denum` holds the weighting filters of both sub-blocks.
pub fn state_search(
    residual: &[f32],
    synt_denum: &LpcCoefs,
    weight_denum: &[LpcCoefs],
    state_short_len: usize,
    state_first: bool,
) -> StateIndices {
    let len = residual.len();
    let mut fout = all_pass(residual, synt_denum);
    {
        let fout = &mut fout[LPC_FILTERORDER..];
        for k in 0..len {
            fout[k] += fout[k + len];
        }
    }

    let mut max_val = fout[LPC_FILTERORDER];
    for &v in &fout[LPC_FILTERORDER + 1..LPC_FILTERORDER + len] {
        if v * v > max_val * max_val {
            max_val = v;
        }
    }
    let max_val = max_val.abs().max(10.0).log10();

    let (scale, qmax) = sort_sq(max_val, &STATE_FRGQ);
    let scal = 4.5 / 10f32.powf(qmax);
    for v in &mut fout[LPC_FILTERORDER..LPC_FILTERORDER + len] {
        *v *= scal;
    }

    let mut samples = [0; STATE_SHORT_LEN_30MS];
    abs_quant(&mut fout, weight_denum, len, state_short_len, state_first, &mut samples);
    StateIndices { scale, samples }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::lpc::{bw_expand, LPC_IDENTITY};

    #[test]
    fn test_sort_sq() {
        let cb = [-1.0, 0.0, 1.0, 2.0];
        assert_eq!(sort_sq(-5.0, &cb), (0, -1.0));
        assert_eq!(sort_sq(0.4, &cb), (1, 0.0));
        assert_eq!(sort_sq(0.6, &cb), (2, 1.0));
        assert_eq!(sort_sq(9.0, &cb), (3, 2.0));
    }

    #[test]
    fn test_state_round_trip() {
        let len = STATE_SHORT_LEN_30MS;
        let a = bw_expand(&[1.0, -0.9, 0.3, -0.1, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0], 0.9025);
        let weight = [a, a];

        let residual: Vec<f32> = (0..len)
            .map(|n| 2000.0 * (n as f32 * 0.45).sin() * (-(n as f32 - 20.0).powi(2) / 400.0).exp())
            .collect();

        let state = state_search(&residual, &a, &weight, len, true);
        assert!(state.scale < STATE_FRGQ.len());
        assert!(state.samples[..len].iter().all(|&i| i < STATE_SQ3.len()));

        let mut decoded = vec![0.0; len];
        state_construct(state.scale, &state.samples, &a, &mut decoded);

        let signal: f32 = residual.iter().map(|x| x * x).sum();
        let noise: f32 = residual
            .iter()
            .zip(&decoded)
            .map(|(x, y)| (x - y) * (x - y))
            .sum();
        assert!(noise < signal, "snr too low: {} / {}", signal, noise);
    }

    #[test]
    fn test_silent_state() {
        let weight = [LPC_IDENTITY, LPC_IDENTITY];
        let residual = [0.0; STATE_SHORT_LEN_20MS];
        let state = state_search(&residual, &LPC_IDENTITY, &weight, STATE_SHORT_LEN_20MS, false);
        // the scale is floored at 10
        assert_eq!(state.scale, sort_sq(1.0, &STATE_FRGQ).0);
        let mut decoded = [0.0; STATE_SHORT_LEN_20MS];
        state_construct(state.scale, &state.samples, &LPC_IDENTITY, &mut decoded);
        assert!(decoded.iter().all(|x| x.abs() < 20.0));
    }
}
