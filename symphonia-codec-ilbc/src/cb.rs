//! Adaptive codebook vector construction and gain quantization.
//!
//! The codebook of a sub-block is defined by the excitation history `mem`
//! of length `lmem`. Indices are laid out in up to four sections:
//!
//! 1. plain vectors ending `len..lmem` samples before the end of `mem`,
//! 2. for 40 sample targets, 20 augmented vectors with lags 20..39 built by
//!    repeating and interpolating the last samples,
//! 3. and 4. the same two sections taken from a lowpass filtered copy of
//!    `mem`.

use crate::consts::*;

/// Number of indices in sections 1 and 2.
pub fn base_size(lmem: usize, len: usize) -> usize {
    let plain = lmem - len + 1;
    if len == SUBL {
        plain + len / 2
    } else {
        plain
    }
}

/// Lowpass filtered copy of the codebook memory, same length as `mem`.
fn filtered_memory(mem: &[f32], out: &mut [f32]) {
    let lmem = mem.len();
    for (k, o) in out[..lmem].iter_mut().enumerate() {
        let mut acc = 0.0;
        for j in 0..CB_FILTERLEN {
            // taps reach `CB_HALFFILTERLEN - 1` samples back
            let pos = k + j;
            if pos >= CB_HALFFILTERLEN - 1 && pos - (CB_HALFFILTERLEN - 1) < lmem {
                acc += mem[pos - (CB_HALFFILTERLEN - 1)] * CB_FILTERS[CB_FILTERLEN - 1 - j];
            }
        }
        *o = acc;
    }
}

/// Vector `index` of sections 1 and 2 of `buf`.
fn section_vec(buf: &[f32], index: usize, out: &mut [f32]) {
    let lmem = buf.len();
    let len = out.len();
    if index < lmem - len + 1 {
        let k = index + len;
        out.copy_from_slice(&buf[lmem - k..lmem - k + len]);
    } else {
        let k = 2 * (index - (lmem - len + 1)) + len;
        let ihigh = k / 2;
        let ilow = ihigh - 5;

        out[..ilow].copy_from_slice(&buf[lmem - k / 2..lmem - k / 2 + ilow]);

        let mut alfa = 0.0f32;
        for j in ilow..ihigh {
            out[j] = (1.0 - alfa) * buf[lmem - k / 2 + j] + alfa * buf[lmem - k + j];
            alfa += 0.2;
        }

        out[ihigh..].copy_from_slice(&buf[lmem - k + ihigh..lmem - k + len]);
    }
}

/// Codebook of one sub-block: the excitation history and its filtered
/// copy, built once and shared by every stage.
pub struct Codebook<'a> {
    mem: &'a [f32],
    filtered: [f32; CB_MEML],
}

impl<'a> Codebook<'a> {
    pub fn new(mem: &'a [f32]) -> Self {
        let mut filtered = [0.0f32; CB_MEML];
        filtered_memory(mem, &mut filtered);
        Codebook { mem, filtered }
    }

    /// The lowpass filtered memory, sections 3 and 4.
    pub fn filtered(&self) -> &[f32] {
        &self.filtered[..self.mem.len()]
    }

    /// Construct vector `index`, the vector length is `out.len()`.
    pub fn vector(&self, index: usize, out: &mut [f32]) {
        let base = base_size(self.mem.len(), out.len());
        if index < base {
            section_vec(self.mem, index, out);
        } else {
            section_vec(self.filtered(), index - base, out);
        }
    }
}

/// Gain table of a codebook stage.
pub fn gain_table(stage: usize) -> &'static [f32] {
    match stage {
        0 => &GAIN_SQ5,
        1 => &GAIN_SQ4,
        _ => &GAIN_SQ3,
    }
}

/// Quantize `gain` against `table` scaled by `max_in`.
///
/// Returns the quantized value and its index.
pub fn gain_quant(gain: f32, max_in: f32, table: &[f32]) -> (f32, usize) {
    let scale = max_in.max(0.1);

    let mut min_measure = 10_000_000.0f32;
    let mut index = 0;
    for (i, &cb) in table.iter().enumerate() {
        let measure = (gain - scale * cb) * (gain - scale * cb);
        if measure < min_measure {
            index = i;
            min_measure = measure;
        }
    }
    (scale * table[index], index)
}

pub fn gain_dequant(index: usize, max_in: f32, table: &[f32]) -> f32 {
    max_in.abs().max(0.1) * table[index]
}

/// Dequantize the gains of all stages, each stage scaled by the magnitude
/// of the one before.
pub fn dequant_gains(gain_index: &[usize]) -> [f32; CB_NSTAGES] {
    let mut gains = [0.0; CB_NSTAGES];
    let mut max_in = 1.0;
    for (stage, (gain, &index)) in gains.iter_mut().zip(gain_index).enumerate() {
        *gain = gain_dequant(index, max_in, gain_table(stage));
        max_in = gain.abs();
    }
    gains
}

/// Rebuild an excitation vector from its stage indices and gain indices.
pub fn cb_construct(mem: &[f32], index: &[usize], gain_index: &[usize], out: &mut [f32]) {
    let gains = dequant_gains(&gain_index[..CB_NSTAGES]);
    let mut cbvec = [0.0f32; SUBL];
    let cbvec = &mut cbvec[..out.len()];

    let codebook = Codebook::new(mem);
    out.fill(0.0);
    for (&gain, &idx) in gains.iter().zip(&index[..CB_NSTAGES]) {
        codebook.vector(idx, cbvec);
        for (o, &c) in out.iter_mut().zip(cbvec.iter()) {
            *o += gain * c;
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn ramp(len: usize) -> Vec<f32> {
        (0..len).map(|n| n as f32).collect()
    }

    #[test]
    fn test_base_size() {
        assert_eq!(base_size(CB_MEML, SUBL), 128);
        assert_eq!(base_size(ST_MEM_L, 22), 64);
        assert_eq!(base_size(ST_MEM_L, 23), 63);
    }

    #[test]
    fn test_plain_vectors() {
        let mem = ramp(CB_MEML);
        let codebook = Codebook::new(&mem);
        let mut out = [0.0; SUBL];
        codebook.vector(0, &mut out);
        assert_eq!(out[0], (CB_MEML - SUBL) as f32);
        assert_eq!(out[SUBL - 1], (CB_MEML - 1) as f32);

        codebook.vector(107, &mut out);
        assert_eq!(out[0], 0.0);
    }

    #[test]
    fn test_augmented_vectors_repeat_lag() {
        // lag 20: the last 20 samples repeated, with a short cross-fade
        let mem = ramp(CB_MEML);
        let mut out = [0.0; SUBL];
        Codebook::new(&mem).vector(108, &mut out);
        for j in 0..15 {
            assert_eq!(out[j], mem[CB_MEML - 20 + j]);
        }
        for j in 20..SUBL {
            assert_eq!(out[j], mem[CB_MEML - 20 + j - 20]);
        }
        // interpolated samples lie between both sources
        for j in 15..20 {
            let a = mem[CB_MEML - 20 + j];
            let b = mem[CB_MEML - 40 + j];
            assert!(out[j] <= a.max(b) + 1e-3 && out[j] >= a.min(b) - 1e-3);
        }
    }

    #[test]
    fn test_filtered_section() {
        let mut mem = vec![0.0; CB_MEML];
        mem[CB_MEML - 60] = 1.0;
        let mut filtered = vec![0.0; CB_MEML];
        filtered_memory(&mem, &mut filtered);

        let codebook = Codebook::new(&mem);
        assert_eq!(codebook.filtered(), &filtered[..]);

        let base = base_size(CB_MEML, SUBL);
        let mut plain = [0.0; SUBL];
        let mut out = [0.0; SUBL];
        section_vec(&filtered, 5, &mut plain);
        codebook.vector(base + 5, &mut out);
        assert_eq!(plain, out);

        // impulse response is the reversed filter
        let taps: f32 = filtered.iter().sum();
        let expected: f32 = CB_FILTERS.iter().sum();
        assert!((taps - expected).abs() < 1e-5);
    }

    #[test]
    fn test_short_memory_codebook() {
        // start state memory: no augmented section, filtered copy as long
        // as the memory
        let mem: Vec<f32> = (0..ST_MEM_L).map(|n| (n as f32 * 0.3).cos()).collect();
        let codebook = Codebook::new(&mem);
        assert_eq!(codebook.filtered().len(), ST_MEM_L);

        let len = 22;
        let base = base_size(ST_MEM_L, len);
        let mut out = vec![0.0; len];
        let mut plain = vec![0.0; len];
        for index in [0, base - 1] {
            codebook.vector(base + index, &mut out);
            section_vec(codebook.filtered(), index, &mut plain);
            assert_eq!(out, plain);
        }
    }

    #[test]
    fn test_gain_quant() {
        let (q, index) = gain_quant(1.0, 1.0, &GAIN_SQ5);
        assert_eq!(GAIN_SQ5[index], q);
        assert_eq!(gain_dequant(index, 1.0, &GAIN_SQ5), q);

        // small scales are floored
        let (q, index) = gain_quant(0.0, 0.0, &GAIN_SQ3);
        assert!((q - 0.1 * GAIN_SQ3[index]).abs() < 1e-7);
        assert_eq!(gain_dequant(index, -0.01, &GAIN_SQ3), q);
    }

    #[test]
    fn test_cb_construct_sums_stages() {
        let mem: Vec<f32> = (0..CB_MEML).map(|n| (n as f32 * 0.7).sin()).collect();
        let index = [3, 50, 200];
        let gain_index = [20, 9, 4];
        let mut out = [0.0; SUBL];
        cb_construct(&mem, &index, &gain_index, &mut out);

        let gains = dequant_gains(&gain_index);
        let mut expected = [0.0; SUBL];
        let mut v = [0.0; SUBL];
        for stage in 0..CB_NSTAGES {
            Codebook::new(&mem).vector(index[stage], &mut v);
            for j in 0..SUBL {
                expected[j] += gains[stage] * v[j];
            }
        }
        for (a, b) in out.iter().zip(&expected) {
            assert!((a - b).abs() < 1e-5);
        }
    }
}
