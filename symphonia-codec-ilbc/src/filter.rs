//! Filtering primitives.
//!
//! Filters that keep their memory inside the signal buffer take an explicit
//! `start` offset; the `order` samples before it are the filter state.

use crate::consts::LPC_FILTERORDER;

/// In place all-pole filter, `coef[0]` is assumed to be one.
///
/// `buf[start - order..start]` holds the previous outputs.
pub fn all_pole_filter(buf: &mut [f32], start: usize, coef: &[f32], len: usize, order: usize) {
    for n in start..start + len {
        for k in 1..=order {
            buf[n] -= coef[k] * buf[n - k];
        }
    }
}

/// All-zero filter of `input[in_start..in_start + len]`.
///
/// `input[in_start - order..in_start]` holds the previous inputs.
pub fn all_zero_filter(
    input: &[f32],
    in_start: usize,
    coef: &[f32],
    len: usize,
    order: usize,
    out: &mut [f32],
    out_start: usize,
) {
    for n in 0..len {
        let x = &input[in_start + n - order..=in_start + n];
        let mut acc = coef[0] * x[order];
        for k in 1..=order {
            acc += coef[k] * x[order - k];
        }
        out[out_start + n] = acc;
    }
}

/// All-zero filter followed by an all-pole filter.
///
/// Both `input` and `out` carry `order` samples of history before their
/// start offsets.
#[allow(clippy::too_many_arguments)]
pub fn zero_pole_filter(
    input: &[f32],
    in_start: usize,
    zero_coef: &[f32],
    pole_coef: &[f32],
    len: usize,
    order: usize,
    out: &mut [f32],
    out_start: usize,
) {
    all_zero_filter(input, in_start, zero_coef, len, order, out, out_start);
    all_pole_filter(out, out_start, pole_coef, len, order);
}

/// In place LP synthesis filter 1/A(z) with separate memory.
pub fn synt_filter(buf: &mut [f32], a: &[f32], mem: &mut [f32; LPC_FILTERORDER]) {
    let len = buf.len();
    for i in 0..len {
        let mut acc = buf[i];
        for j in 1..=LPC_FILTERORDER {
            let past = if i >= j {
                buf[i - j]
            } else {
                mem[LPC_FILTERORDER + i - j]
            };
            acc -= a[j] * past;
        }
        buf[i] = acc;
    }

    if len >= LPC_FILTERORDER {
        mem.copy_from_slice(&buf[len - LPC_FILTERORDER..]);
    } else {
        mem.copy_within(len.., 0);
        mem[LPC_FILTERORDER - len..].copy_from_slice(buf);
    }
}

/// LP analysis filter A(z) with separate memory.
pub fn ana_filter(input: &[f32], a: &[f32], out: &mut [f32], mem: &mut [f32; LPC_FILTERORDER]) {
    let len = input.len();
    for i in 0..len {
        let mut acc = 0.0;
        for j in 0..=LPC_FILTERORDER {
            let past = if i >= j {
                input[i - j]
            } else {
                mem[LPC_FILTERORDER + i - j]
            };
            acc += a[j] * past;
        }
        out[i] = acc;
    }

    if len >= LPC_FILTERORDER {
        mem.copy_from_slice(&input[len - LPC_FILTERORDER..]);
    } else {
        mem.copy_within(len.., 0);
        mem[LPC_FILTERORDER - len..].copy_from_slice(input);
    }
}

/// Second order high-pass filter.
///
/// `mem` holds two past inputs followed by two past outputs.
pub fn hp_filter(
    input: &[f32],
    out: &mut [f32],
    mem: &mut [f32; 4],
    zero_coef: &[f32; 3],
    pole_coef: &[f32; 3],
) {
    for (y, &x) in out.iter_mut().zip(input) {
        *y = zero_coef[0] * x + zero_coef[1] * mem[0] + zero_coef[2] * mem[1];
        mem[1] = mem[0];
        mem[0] = x;
    }
    for y in out[..input.len()].iter_mut() {
        *y -= pole_coef[1] * mem[2] + pole_coef[2] * mem[3];
        mem[3] = mem[2];
        mem[2] = *y;
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::consts::{HPI_POLE_COEFS, HPI_ZERO_COEFS};

    // minimum phase: the taps after the first sum to less than one
    const A: [f32; LPC_FILTERORDER + 1] =
        [1.0, -0.5, 0.2, -0.1, 0.05, 0.02, -0.01, 0.01, 0.0, 0.0, 0.005];

    fn signal(len: usize) -> Vec<f32> {
        (0..len)
            .map(|n| 1000.0 * (n as f32 * 0.3).sin() + 300.0 * (n as f32 * 1.7).cos())
            .collect()
    }

    #[test]
    fn test_all_zero_matches_convolution() {
        let order = 3;
        let coef = [1.0, 0.5, -0.25, 0.125];
        let mut input = vec![0.0; order];
        input.extend([1.0, 2.0, 3.0, 4.0]);
        let mut out = [0.0; 4];
        all_zero_filter(&input, order, &coef, 4, order, &mut out, 0);
        assert_eq!(out, [1.0, 2.5, 3.75, 5.125]);
    }

    #[test]
    fn test_zero_pole_identity() {
        // same numerator and denominator leaves the signal untouched
        let x = signal(60);
        let mut input = vec![0.0; LPC_FILTERORDER];
        input.extend_from_slice(&x);
        let mut out = vec![0.0; LPC_FILTERORDER + 60];
        zero_pole_filter(
            &input,
            LPC_FILTERORDER,
            &A,
            &A,
            60,
            LPC_FILTERORDER,
            &mut out,
            LPC_FILTERORDER,
        );
        for (a, b) in out[LPC_FILTERORDER..].iter().zip(&x) {
            assert!((a - b).abs() < 1e-2, "{} != {}", a, b);
        }
    }

    #[test]
    fn test_analysis_synthesis_inverse_across_calls() {
        let x = signal(240);
        let mut ana_mem = [0.0; LPC_FILTERORDER];
        let mut syn_mem = [0.0; LPC_FILTERORDER];
        // uneven chunks, including one shorter than the filter order
        for chunk in [x[..40].to_vec(), x[40..47].to_vec(), x[47..240].to_vec()] {
            let mut residual = vec![0.0; chunk.len()];
            ana_filter(&chunk, &A, &mut residual, &mut ana_mem);
            synt_filter(&mut residual, &A, &mut syn_mem);
            for (a, b) in residual.iter().zip(&chunk) {
                assert!((a - b).abs() < 1e-2, "{} != {}", a, b);
            }
        }
        for (a, b) in ana_mem.iter().zip(&syn_mem) {
            assert!((a - b).abs() < 1e-2);
        }
    }

    #[test]
    fn test_hp_filter_removes_dc() {
        let input = vec![1000.0; 2000];
        let mut out = vec![0.0; 2000];
        let mut mem = [0.0; 4];
        hp_filter(&input, &mut out, &mut mem, &HPI_ZERO_COEFS, &HPI_POLE_COEFS);
        assert!(out[0] > 900.0);

        // the rounded coefficients leave a small DC gain
        let zeros: f32 = HPI_ZERO_COEFS.iter().sum();
        let poles: f32 = HPI_POLE_COEFS.iter().sum();
        let steady = 1000.0 * zeros / poles;
        assert!((out[1999] - steady).abs() < 1.0, "{} != {}", out[1999], steady);
        assert!(out[1999].abs() < 0.02 * 1000.0);
    }
}
