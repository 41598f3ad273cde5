//! Pitch synchronous post filter.
//!
//! The enhancer keeps `ENH_BUFL` samples of decoded residual. Every output
//! block of `ENH_BLOCKL` samples is replaced by a blend of itself and the
//! pitch cycles around it, found by a coarse pitch estimate on a
//! downsampled copy of the history and refined at four times the sampling
//! rate. Output is delayed by one (20 ms) or two (30 ms) sub-blocks.

use std::f32::consts::PI;

use crate::consts::*;
use crate::mode::Mode;

/// Rough pitch estimates are done at half rate.
const DOWNSAMPLED_LEN: usize = (ENH_NBLOCKS * ENH_BLOCKL + 120) / 2;

const POLYPHASE_LEN: usize = 2 * ENH_FL0 + 1;

/// Normalized squared cross correlation, zero for negative correlation.
pub(crate) fn xcorr_coef(target: &[f32], regressor: &[f32]) -> f32 {
    let mut cross = 0.0f32;
    let mut energy = 0.0f32;
    for (&t, &r) in target.iter().zip(regressor) {
        cross += t * r;
        energy += r * r;
    }
    if cross > 0.0 {
        cross * cross / energy
    } else {
        0.0
    }
}

/// Lowpass filter and decimate `input[start..start + len]` by two.
///
/// The `FILTERORDER_DS - 1` samples before `start` are the filter history.
/// Returns the number of samples written.
fn down_sample(input: &[f32], start: usize, len: usize, out: &mut [f32]) -> usize {
    let mut written = 0;
    let mut i = DELAY_DS;
    while i < len {
        let mut acc = 0.0;
        for (j, &c) in LP_FILT_COEFS.iter().enumerate() {
            acc += c * input[start + i - j];
        }
        out[written] = acc;
        written += 1;
        i += FACTOR_DS;
    }

    // one more output with zeros as future input
    let skip = FACTOR_DS;
    let mut acc = 0.0;
    for (j, &c) in LP_FILT_COEFS[skip..].iter().enumerate() {
        acc += c * input[start + len - 1 - j];
    }
    out[written] = acc;
    written + 1
}

/// Index of the element of `array` closest to `value`, first one on ties.
fn nearest_neighbor(array: &[f32], value: f32) -> usize {
    let mut index = 0;
    let mut best = (array[0] - value) * (array[0] - value);
    for (i, &a) in array.iter().enumerate().skip(1) {
        let crit = (a - value) * (a - value);
        if crit < best {
            best = crit;
            index = i;
        }
    }
    index
}

/// `corr[i] = sum_j seq1[i + j] * seq2[j]` for every full overlap.
fn my_corr(corr: &mut [f32], seq1: &[f32], seq2: &[f32]) {
    let dim2 = seq2.len();
    for (i, c) in corr.iter_mut().take(seq1.len() - dim2 + 1).enumerate() {
        *c = seq1[i..i + dim2].iter().zip(seq2).map(|(a, b)| a * b).sum();
    }
}

/// Upsample the first `dim1` values of `seq1` by `ENH_UPS0`, with zeros
/// assumed outside the sequence.
///
/// The filter is shortened when the sequence is shorter than the polyphase
/// filter. `seq1` must be readable up to the filter length.
fn upsample(useq1: &mut [f32], seq1: &[f32], dim1: usize) {
    let mut hfl = ENH_FL0;
    let mut filterlength = POLYPHASE_LEN;
    let mut polyp = [0usize; ENH_UPS0];

    if filterlength > dim1 {
        let hfl2 = dim1 / 2;
        for (j, p) in polyp.iter_mut().enumerate() {
            *p = j * filterlength + hfl - hfl2;
        }
        hfl = hfl2;
        filterlength = 2 * hfl + 1;
    } else {
        for (j, p) in polyp.iter_mut().enumerate() {
            *p = j * filterlength;
        }
    }

    let mut pu = 0;

    // filter overhangs the left side
    for i in hfl..filterlength {
        for &pp in &polyp {
            let mut acc = 0.0;
            for k in 0..=i {
                acc += seq1[i - k] * POLYPHASER[pp + k];
            }
            useq1[pu] = acc;
            pu += 1;
        }
    }

    for i in filterlength..dim1 {
        for &pp in &polyp {
            let mut acc = 0.0;
            for k in 0..filterlength {
                acc += seq1[i - k] * POLYPHASER[pp + k];
            }
            useq1[pu] = acc;
            pu += 1;
        }
    }

    // filter overhangs the right side
    for q in 1..=hfl {
        for &pp in &polyp {
            let mut acc = 0.0;
            for k in 0..filterlength - q {
                acc += seq1[dim1 - 1 - k] * POLYPHASER[pp + q + k];
            }
            useq1[pu] = acc;
            pu += 1;
        }
    }
}

/// Find the segment near `est_seg_pos` best correlated with the block at
/// `center_start`, at a quarter sample resolution.
///
/// The interpolated segment is written to `seg`, its position is returned.
fn refiner(seg: &mut [f32], idata: &[f32], center_start: usize, est_seg_pos: f32) -> f32 {
    let idatal = idata.len() as isize;
    let rounded = (est_seg_pos - 0.5) as isize;

    let search_start = (rounded - ENH_SLOP as isize).max(0);
    let mut search_end = rounded + ENH_SLOP as isize;
    if search_end + ENH_BLOCKL as isize >= idatal {
        search_end = idatal - ENH_BLOCKL as isize - 1;
    }
    let corrdim = (search_end - search_start + 1).clamp(1, ENH_CORRDIM as isize) as usize;
    let search_start = search_start as usize;

    let mut corr = [0.0f32; ENH_CORRDIM];
    my_corr(
        &mut corr[..corrdim],
        &idata[search_start..search_start + corrdim + ENH_BLOCKL - 1],
        &idata[center_start..center_start + ENH_BLOCKL],
    );

    let mut corr_ups = [0.0f32; ENH_CORRDIM * ENH_UPS0];
    upsample(&mut corr_ups, &corr, corrdim);

    let mut tloc = 0;
    let mut maxv = corr_ups[0];
    for (i, &v) in corr_ups[..ENH_UPS0 * corrdim].iter().enumerate().skip(1) {
        if v > maxv {
            tloc = i;
            maxv = v;
        }
    }

    let upd_start_pos = search_start as f32 + tloc as f32 / ENH_UPS0 as f32 + 1.0;
    let tloc2 = (tloc + ENH_UPS0 - 1) / ENH_UPS0;

    // segment to interpolate from, zero outside the buffer
    let mut vect = [0.0f32; ENH_VECTL];
    let st = search_start as isize + tloc2 as isize - ENH_FL0 as isize;
    for (k, v) in vect.iter_mut().enumerate() {
        let pos = st + k as isize;
        if pos >= 0 && pos < idatal {
            *v = idata[pos as usize];
        }
    }

    let fraction = tloc2 * ENH_UPS0 - tloc;
    let filter = &POLYPHASER[POLYPHASE_LEN * fraction..POLYPHASE_LEN * (fraction + 1)];
    my_corr(&mut seg[..ENH_BLOCKL], &vect, filter);

    upd_start_pos
}

/// Collect `2 * ENH_HL + 1` pitch synchronous blocks around the block at
/// `center_start`. Blocks that do not fit in the buffer are zero.
fn get_sseq(sseq: &mut [f32], idata: &[f32], center_start: usize, period: &[f32]) {
    let hl = ENH_HL;
    let mut block_start = [0.0f32; 2 * ENH_HL + 1];
    let mut lag_block = [0usize; 2 * ENH_HL + 1];

    let center_end = center_start + ENH_BLOCKL - 1;
    lag_block[hl] = nearest_neighbor(&ENH_PLOCS, 0.5 * (center_start + center_end) as f32);
    block_start[hl] = center_start as f32;
    sseq[hl * ENH_BLOCKL..(hl + 1) * ENH_BLOCKL]
        .copy_from_slice(&idata[center_start..center_start + ENH_BLOCKL]);

    // past
    for q in (0..hl).rev() {
        let p = period[lag_block[q + 1]];
        block_start[q] = block_start[q + 1] - p;
        lag_block[q] = nearest_neighbor(&ENH_PLOCS, block_start[q] + ENH_BLOCKL_HALF as f32 - p);

        let seg = &mut sseq[q * ENH_BLOCKL..(q + 1) * ENH_BLOCKL];
        if block_start[q] - ENH_OVERHANG as f32 >= 0.0 {
            block_start[q] = refiner(seg, idata, center_start, block_start[q]);
        } else {
            seg.fill(0.0);
        }
    }

    // future
    let mut plocs2 = [0.0f32; ENH_NBLOCKS_TOT];
    for ((p2, &p), &per) in plocs2.iter_mut().zip(&ENH_PLOCS).zip(period) {
        *p2 = p - per;
    }
    for q in hl + 1..=2 * hl {
        lag_block[q] = nearest_neighbor(&plocs2, block_start[q - 1] + ENH_BLOCKL_HALF as f32);
        block_start[q] = block_start[q - 1] + period[lag_block[q]];

        let seg = &mut sseq[q * ENH_BLOCKL..(q + 1) * ENH_BLOCKL];
        if block_start[q] + ((ENH_BLOCKL + ENH_OVERHANG) as f32) < idata.len() as f32 {
            block_start[q] = refiner(seg, idata, center_start, block_start[q]);
        } else {
            seg.fill(0.0);
        }
    }
}

/// Smooth the center block of `sseq` towards the weighted sum of the other
/// blocks, limiting the change to `alpha0` of the block energy.
fn smooth(odata: &mut [f32], sseq: &[f32], hl: usize, alpha0: f32) {
    let mut wt = [0.0f32; 2 * ENH_HL + 1];
    for (i, w) in wt.iter_mut().enumerate().take(2 * hl + 1) {
        *w = 0.5 * (1.0 - (2.0 * PI * (i + 1) as f32 / (2 * hl + 2) as f32).cos());
    }
    wt[hl] = 0.0;

    let mut surround = [0.0f32; ENH_BLOCKL];
    for (k, &w) in wt.iter().enumerate().take(2 * hl + 1) {
        if k == hl {
            continue;
        }
        let block = &sseq[k * ENH_BLOCKL..(k + 1) * ENH_BLOCKL];
        for (s, &x) in surround.iter_mut().zip(block) {
            *s += x * w;
        }
    }

    let current = &sseq[hl * ENH_BLOCKL..(hl + 1) * ENH_BLOCKL];
    let mut w00 = 0.0f32;
    let mut w10 = 0.0f32;
    let mut w11 = 0.0f32;
    for (&s, &x) in surround.iter().zip(current) {
        w00 += x * x;
        w11 += s * s;
        w10 += s * x;
    }
    if w11.abs() < 1.0 {
        w11 = 1.0;
    }
    let c = (w00 / w11).sqrt();

    // first try without the power constraint
    let mut errs = 0.0f32;
    for ((o, &s), &x) in odata.iter_mut().zip(&surround).zip(current) {
        *o = c * s;
        let err = x - *o;
        errs += err * err;
    }

    if errs > alpha0 * w00 {
        if w00 < 1.0 {
            w00 = 1.0;
        }
        let denom = (w11 * w00 - w10 * w10) / (w00 * w00);
        let (a, b) = if denom > 0.0001 {
            let a = ((alpha0 - alpha0 * alpha0 / 4.0) / denom).sqrt();
            (a, -alpha0 / 2.0 - a * w10 / w00 + 1.0)
        } else {
            // the cycles are the same, nothing to smooth
            (0.0, 1.0)
        };
        for ((o, &s), &x) in odata.iter_mut().zip(&surround).zip(current) {
            *o = a * s + b * x;
        }
    }
}

/// Enhance the `ENH_BLOCKL` samples of `idata` at `center_start`.
fn enhance_block(odata: &mut [f32], idata: &[f32], center_start: usize, period: &[f32]) {
    let mut sseq = [0.0f32; (2 * ENH_HL + 1) * ENH_BLOCKL];
    get_sseq(&mut sseq, idata, center_start, period);
    smooth(odata, &sseq, ENH_HL, ENH_ALPHA0);
}

/// History and pitch track of the enhancer.
pub struct Enhancer {
    buf: [f32; ENH_BUFL],
    period: [f32; ENH_NBLOCKS_TOT],
}

impl Enhancer {
    pub fn new() -> Self {
        Enhancer { buf: [0.0; ENH_BUFL], period: [40.0; ENH_NBLOCKS_TOT] }
    }

    /// Push one frame of decoded residual and write the enhanced, delayed
    /// residual to `out`.
    ///
    /// When `prev_concealed` is set the part of the history produced by the
    /// concealment is cross-faded with a backward prediction from the new
    /// frame. Returns the pitch lag estimate for the concealment.
    pub fn process(&mut self, input: &[f32], mode: Mode, prev_concealed: bool, out: &mut [f32]) -> usize {
        let blockl = input.len();
        let (plc_blockl, ioffset) = match mode {
            Mode::Ms20 => (SUBL, 1),
            Mode::Ms30 => (ENH_BLOCKL, 0),
        };

        self.buf.copy_within(blockl.., 0);
        self.buf[ENH_BUFL - blockl..].copy_from_slice(input);

        let shift = 3 - ioffset;
        self.period.copy_within(shift.., 0);

        // rough pitch per block at half rate
        let in_start = (ENH_NBLOCKS_EXTRA + ioffset) * ENH_BLOCKL - 120;
        let in_len = ENH_NBLOCKS * ENH_BLOCKL + 120 - ioffset * ENH_BLOCKL;
        let mut downsampled = [0.0f32; DOWNSAMPLED_LEN];
        down_sample(&self.buf, in_start, in_len, &mut downsampled);

        let mut lag = 10;
        for iblock in 0..ENH_NBLOCKS - ioffset {
            let pos = 60 + iblock * ENH_BLOCKL_HALF;
            let target = &downsampled[pos..pos + ENH_BLOCKL_HALF];
            lag = 10;
            let mut maxcc = xcorr_coef(target, &downsampled[pos - lag..]);
            for ilag in 11..60 {
                let cc = xcorr_coef(target, &downsampled[pos - ilag..]);
                if cc > maxcc {
                    maxcc = cc;
                    lag = ilag;
                }
            }
            self.period[iblock + ENH_NBLOCKS_EXTRA + ioffset] = lag as f32 * 2.0;
        }

        if prev_concealed {
            lag = self.crossfade_concealed(input, blockl, plc_blockl, ioffset);
        }

        match mode {
            Mode::Ms20 => {
                for iblock in 0..2 {
                    enhance_block(
                        &mut out[iblock * ENH_BLOCKL..(iblock + 1) * ENH_BLOCKL],
                        &self.buf,
                        (5 + iblock) * ENH_BLOCKL + 40,
                        &self.period,
                    );
                }
            }
            Mode::Ms30 => {
                for iblock in 0..3 {
                    enhance_block(
                        &mut out[iblock * ENH_BLOCKL..(iblock + 1) * ENH_BLOCKL],
                        &self.buf,
                        (4 + iblock) * ENH_BLOCKL,
                        &self.period,
                    );
                }
            }
        }

        lag * 2
    }

    /// Replace the concealed samples right before the new frame with a
    /// mix of themselves and the new frame predicted backwards one pitch
    /// period. Returns the refined lag.
    fn crossfade_concealed(&mut self, input: &[f32], blockl: usize, plc_blockl: usize, ioffset: usize) -> usize {
        let inlag = self.period[ENH_NBLOCKS_EXTRA + ioffset] as usize;
        let mut lag = inlag - 1;
        let target = &input[..plc_blockl];
        let mut maxcc = xcorr_coef(target, &input[lag..]);
        for ilag in inlag..=inlag + 1 {
            let cc = xcorr_coef(target, &input[ilag..]);
            if cc > maxcc {
                maxcc = cc;
                lag = ilag;
            }
        }
        self.period[ENH_NBLOCKS_EXTRA + ioffset - 1] = lag as f32;

        let old_end = ENH_BUFL - 1 - blockl;

        let mut plc_pred = [0.0f32; ENH_BLOCKL];
        let start = lag.min(plc_blockl);
        for k in 0..start {
            plc_pred[plc_blockl - 1 - k] = input[lag - 1 - k];
        }
        for k in 0..plc_blockl.saturating_sub(lag) {
            plc_pred[plc_blockl - 1 - start - k] = self.buf[old_end - k];
        }

        // limit the energy change
        let mut pred_energy = 0.0f32;
        let mut old_energy = 0.0f32;
        for i in 0..plc_blockl {
            old_energy += self.buf[old_end - i] * self.buf[old_end - i];
            pred_energy += plc_pred[i] * plc_pred[i];
        }
        let pred_rms = (pred_energy / plc_blockl as f32).sqrt();
        let old_rms = (old_energy / plc_blockl as f32).sqrt();
        if pred_rms > 2.0 * old_rms && pred_rms > 0.0 {
            let scale = 2.0 * old_rms / pred_rms;
            for p in &mut plc_pred[..plc_blockl - 10] {
                *p *= scale;
            }
            for i in plc_blockl - 10..plc_blockl {
                let ramp = (i + 10 - plc_blockl) as f32 * (1.0 - scale) / 10.0 + scale;
                plc_pred[i] *= ramp;
            }
        }

        for i in 0..plc_blockl {
            let w = (i + 1) as f32 / (plc_blockl + 1) as f32;
            let pos = old_end - i;
            self.buf[pos] = self.buf[pos] * w + (1.0 - w) * plc_pred[plc_blockl - 1 - i];
        }

        lag
    }
}
