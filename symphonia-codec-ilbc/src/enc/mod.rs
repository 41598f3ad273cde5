//! iLBC encoder.

mod search;

use log::trace;

use crate::cb::cb_construct;
use crate::consts::*;
use crate::errors::{Error, Result};
use crate::filter::{ana_filter, hp_filter};
use crate::index::IndexSet;
use crate::lpc::*;
use crate::mode::{Mode, ModeProfile};
use crate::state::{state_construct, state_search};

pub use search::{cb_search, CbChoice};

fn energy(x: &[f32]) -> f32 {
    x.iter().map(|v| v * v).sum()
}

/// Index (1 based) of the first of the two consecutive sub-blocks holding
/// the most energy.
fn frame_classify(residual: &[f32], profile: &ModeProfile) -> usize {
    const SSQ_EN_WIN: [f32; NSUB_MAX - 1] = [0.8, 0.9, 1.0, 0.9, 0.8];
    const SAMP_EN_WIN: [f32; 5] = [1.0 / 6.0, 2.0 / 6.0, 3.0 / 6.0, 4.0 / 6.0, 5.0 / 6.0];

    let nsub = profile.nsub;
    let mut front = [0.0f32; NSUB_MAX];
    let mut back = [0.0f32; NSUB_MAX];

    for n in 0..nsub {
        let sub = &residual[n * SUBL..(n + 1) * SUBL];
        if n < nsub - 1 {
            for (l, &x) in sub.iter().enumerate() {
                let w = if l < 5 { SAMP_EN_WIN[l] } else { 1.0 };
                front[n] += w * x * x;
            }
        }
        if n > 0 {
            for (l, &x) in sub.iter().enumerate() {
                let w = if l >= SUBL - 5 {
                    SAMP_EN_WIN[SUBL - l - 1]
                } else {
                    1.0
                };
                back[n] += w * x * x;
            }
        }
    }

    // 20 ms frames only use the middle of the window
    let mut l = if profile.mode == Mode::Ms20 { 1 } else { 0 };
    let mut max_en = (front[0] + back[1]) * SSQ_EN_WIN[l];
    let mut max_n = 1;
    for n in 2..nsub {
        l += 1;
        let en = (front[n - 1] + back[n]) * SSQ_EN_WIN[l];
        if en > max_en {
            max_en = en;
            max_n = n;
        }
    }
    max_n
}

fn record_choice(indices: &mut IndexSet, choice: &CbChoice, subcount: usize) {
    let pos = subcount * CB_NSTAGES;
    indices.cb_index[pos..pos + CB_NSTAGES].copy_from_slice(&choice.index);
    indices.gain_index[pos..pos + CB_NSTAGES].copy_from_slice(&choice.gain_index);
}

/// Encoder state of one stream.
pub struct IlbcEncoder {
    profile: &'static ModeProfile,
    /// Input high-pass filter memory.
    hpi_mem: [f32; 4],
    /// Analysis filter memory.
    ana_mem: [f32; LPC_FILTERORDER],
    lsf_old: [f32; LPC_FILTERORDER],
    lsfdeq_old: [f32; LPC_FILTERORDER],
    lpc_buffer: [f32; LPC_LOOKBACK + BLOCKL_MAX],
}

impl IlbcEncoder {
    pub fn new(mode: Mode) -> Self {
        IlbcEncoder {
            profile: mode.profile(),
            hpi_mem: [0.0; 4],
            ana_mem: [0.0; LPC_FILTERORDER],
            lsf_old: LSF_MEAN,
            lsfdeq_old: LSF_MEAN,
            lpc_buffer: [0.0; LPC_LOOKBACK + BLOCKL_MAX],
        }
    }

    pub fn mode(&self) -> Mode {
        self.profile.mode
    }

    /// Samples consumed by one call to [`IlbcEncoder::encode`].
    pub fn frame_samples(&self) -> usize {
        self.profile.block_len
    }

    /// Bytes produced by one call to [`IlbcEncoder::encode`].
    pub fn frame_bytes(&self) -> usize {
        self.profile.bytes
    }

    pub fn reset(&mut self) {
        *self = IlbcEncoder::new(self.profile.mode);
    }

    /// Encode one frame of PCM into `out`, returns the number of bytes
    /// written.
    pub fn encode(&mut self, pcm: &[i16], out: &mut [u8]) -> Result<usize> {
        let profile = self.profile;
        if pcm.len() != profile.block_len {
            return Err(Error::InvalidPcmLength {
                expected: profile.block_len,
                actual: pcm.len(),
            });
        }
        if out.len() < profile.bytes {
            return Err(Error::OutputTooSmall {
                expected: profile.bytes,
                actual: out.len(),
            });
        }

        let mut block = [0.0f32; BLOCKL_MAX];
        for (b, &s) in block.iter_mut().zip(pcm) {
            *b = s as f32;
        }

        let indices = self.encode_block(&block[..profile.block_len]);
        indices.pack(profile, &mut out[..profile.bytes]);
        Ok(profile.bytes)
    }

    /// LSF sets of the new block, one per analysis window.
    fn lpc_analysis(&mut self, data: &[f32]) -> [f32; LPC_FILTERORDER * LPC_N_MAX] {
        let len = self.profile.block_len;
        let lpc_n = self.profile.lpc_n;
        self.lpc_buffer[LPC_LOOKBACK + BLOCKL_MAX - len..].copy_from_slice(data);

        let mut lsf = [0.0; LPC_FILTERORDER * LPC_N_MAX];
        for k in 0..lpc_n {
            // no lookahead, the last window is asymmetric
            let (win, src): (&[f32], &[f32]) = if k < lpc_n - 1 {
                (&LPC_WIN, &self.lpc_buffer[..BLOCKL_MAX])
            } else {
                (&LPC_ASYMWIN, &self.lpc_buffer[LPC_LOOKBACK..])
            };
            let mut windowed = [0.0f32; BLOCKL_MAX];
            for ((w, &c), &x) in windowed.iter_mut().zip(win).zip(src) {
                *w = c * x;
            }

            let mut r = [0.0f32; LPC_FILTERORDER + 1];
            autocorr(&windowed, &mut r);
            for (r, &lag) in r.iter_mut().zip(&LPC_LAGWIN) {
                *r *= lag;
            }
            let a = bw_expand(&levinson_durbin(&r), LPC_CHIRP_SYNTDENUM);
            lsf[k * LPC_FILTERORDER..(k + 1) * LPC_FILTERORDER].copy_from_slice(&a2lsf(&a));
        }

        self.lpc_buffer.copy_within(len.., 0);
        lsf
    }

    /// Quantize the LSFs of `data` and derive the filters of every
    /// sub-block.
    fn lpc_encode(
        &mut self,
        data: &[f32],
        synt_denum: &mut [LpcCoefs; NSUB_MAX],
        weight_denum: &mut [LpcCoefs; NSUB_MAX],
        lsf_index: &mut [usize],
    ) {
        let mode = self.profile.mode;
        let lpc_n = self.profile.lpc_n;
        let lsf = self.lpc_analysis(data);

        let mut lsfdeq = [0.0f32; LPC_FILTERORDER * LPC_N_MAX];
        for k in 0..lpc_n {
            let set = k * LPC_FILTERORDER..(k + 1) * LPC_FILTERORDER;
            let index = split_vq(&lsf[set.clone()], &mut lsfdeq[set]);
            lsf_index[k * LSF_NSPLIT..(k + 1) * LSF_NSPLIT].copy_from_slice(&index);
        }
        lsf_check(&mut lsfdeq, LPC_FILTERORDER, lpc_n);

        interpolate_subframes(mode, &self.lsfdeq_old, &lsfdeq, synt_denum);

        // weighting filters follow the unquantized LSFs
        let mut weight = [LPC_IDENTITY; NSUB_MAX];
        interpolate_subframes(mode, &self.lsf_old, &lsf, &mut weight);
        for (w, a) in weight_denum.iter_mut().zip(&weight) {
            *w = bw_expand(a, LPC_CHIRP_WEIGHTDENUM);
        }

        let last = (lpc_n - 1) * LPC_FILTERORDER..lpc_n * LPC_FILTERORDER;
        self.lsf_old.copy_from_slice(&lsf[last.clone()]);
        self.lsfdeq_old.copy_from_slice(&lsfdeq[last]);
    }

    fn encode_block(&mut self, block: &[f32]) -> IndexSet {
        let profile = self.profile;
        let len = profile.block_len;
        let nsub = profile.nsub;
        let ssl = profile.state_short_len;
        let diff = profile.state_extra_len();

        let mut indices = IndexSet::default();

        let mut data = [0.0f32; BLOCKL_MAX];
        hp_filter(block, &mut data[..len], &mut self.hpi_mem, &HPI_ZERO_COEFS, &HPI_POLE_COEFS);

        let mut synt = [LPC_IDENTITY; NSUB_MAX];
        let mut weight = [LPC_IDENTITY; NSUB_MAX];
        self.lpc_encode(&data[..len], &mut synt, &mut weight, &mut indices.lsf);

        let mut residual = [0.0f32; BLOCKL_MAX];
        for n in 0..nsub {
            let sub = n * SUBL..(n + 1) * SUBL;
            ana_filter(&data[sub.clone()], &synt[n], &mut residual[sub], &mut self.ana_mem);
        }

        // locate the start state
        let start = frame_classify(&residual[..len], profile);
        let first = (start - 1) * SUBL;
        let en1 = energy(&residual[first..first + ssl]);
        let en2 = energy(&residual[first + diff..first + diff + ssl]);
        let state_first = en1 > en2;
        let start_pos = if state_first { first } else { first + diff };

        let state = state_search(
            &residual[start_pos..start_pos + ssl],
            &synt[start - 1],
            &weight[start - 1..=start],
            ssl,
            state_first,
        );
        let mut decresidual = [0.0f32; BLOCKL_MAX];
        state_construct(
            state.scale,
            &state.samples,
            &synt[start - 1],
            &mut decresidual[start_pos..start_pos + ssl],
        );
        indices.start = start;
        indices.state_first = state_first;
        indices.scale = state.scale;
        indices.state[..ssl].copy_from_slice(&state.samples[..ssl]);

        // rest of the start state through the codebook
        let mut mem = [0.0f32; CB_MEML];
        let extra = if state_first {
            mem[CB_MEML - ssl..].copy_from_slice(&decresidual[start_pos..start_pos + ssl]);
            let target = start_pos + ssl..start_pos + ssl + diff;
            let choice = cb_search(
                &residual[target.clone()],
                &mem[CB_MEML - ST_MEM_L..],
                &weight[start],
                0,
            );
            cb_construct(
                &mem[CB_MEML - ST_MEM_L..],
                &choice.index,
                &choice.gain_index,
                &mut decresidual[target],
            );
            choice
        } else {
            let mut reverse_residual = [0.0f32; STATE_LEN];
            for (k, r) in reverse_residual[..diff].iter_mut().enumerate() {
                *r = residual[start_pos - 1 - k];
            }
            for k in 0..ssl {
                mem[CB_MEML - 1 - k] = decresidual[start_pos + k];
            }
            let choice = cb_search(
                &reverse_residual[..diff],
                &mem[CB_MEML - ST_MEM_L..],
                &weight[start - 1],
                0,
            );
            let mut reverse_dec = [0.0f32; STATE_LEN];
            cb_construct(
                &mem[CB_MEML - ST_MEM_L..],
                &choice.index,
                &choice.gain_index,
                &mut reverse_dec[..diff],
            );
            for k in 0..diff {
                decresidual[start_pos - 1 - k] = reverse_dec[k];
            }
            choice
        };
        indices.extra_cb_index = extra.index;
        indices.extra_gain_index = extra.gain_index;

        let mut subcount = 0;

        // forward prediction of the sub-blocks after the state
        let n_for = nsub - start - 1;
        if n_for > 0 {
            mem = [0.0; CB_MEML];
            mem[CB_MEML - STATE_LEN..].copy_from_slice(&decresidual[first..first + STATE_LEN]);

            for subframe in 0..n_for {
                let sub = (start + 1 + subframe) * SUBL..(start + 2 + subframe) * SUBL;
                let lmem = MEM_LF[subcount];
                let choice = cb_search(
                    &residual[sub.clone()],
                    &mem[CB_MEML - lmem..],
                    &weight[start + 1 + subframe],
                    subcount + 1,
                );
                cb_construct(
                    &mem[CB_MEML - lmem..],
                    &choice.index,
                    &choice.gain_index,
                    &mut decresidual[sub.clone()],
                );
                record_choice(&mut indices, &choice, subcount);

                mem.copy_within(SUBL.., 0);
                mem[CB_MEML - SUBL..].copy_from_slice(&decresidual[sub]);
                subcount += 1;
            }
        }

        // backward prediction of the sub-blocks before the state, on time
        // reversed signals
        let n_back = start - 1;
        if n_back > 0 {
            let mut reverse_residual = [0.0f32; BLOCKL_MAX];
            let mut reverse_dec = [0.0f32; BLOCKL_MAX];
            for k in 0..n_back * SUBL {
                reverse_residual[k] = residual[first - 1 - k];
                reverse_dec[k] = decresidual[first - 1 - k];
            }

            let meml_gotten = (SUBL * (nsub + 1 - start)).min(CB_MEML);
            mem = [0.0; CB_MEML];
            for k in 0..meml_gotten {
                mem[CB_MEML - 1 - k] = decresidual[first + k];
            }

            for subframe in 0..n_back {
                let sub = subframe * SUBL..(subframe + 1) * SUBL;
                let lmem = MEM_LF[subcount];
                let choice = cb_search(
                    &reverse_residual[sub.clone()],
                    &mem[CB_MEML - lmem..],
                    &weight[start - 2 - subframe],
                    subcount + 1,
                );
                cb_construct(
                    &mem[CB_MEML - lmem..],
                    &choice.index,
                    &choice.gain_index,
                    &mut reverse_dec[sub.clone()],
                );
                record_choice(&mut indices, &choice, subcount);

                mem.copy_within(SUBL.., 0);
                mem[CB_MEML - SUBL..].copy_from_slice(&reverse_dec[sub]);
                subcount += 1;
            }
        }

        trace!(
            "ilbc: encoded block, start {} state_first {} scale {}",
            start,
            state_first,
            state.scale
        );

        indices.convert_cb_index_for_tx();
        indices
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn speech_like(len: usize, offset: usize) -> Vec<i16> {
        (0..len)
            .map(|n| {
                let t = (n + offset) as f32 / SAMPLE_RATE as f32;
                let env = 0.6 + 0.4 * (t * 3.0 * std::f32::consts::TAU).sin();
                let v = 3000.0 * (t * 180.0 * std::f32::consts::TAU).sin()
                    + 1500.0 * (t * 360.0 * std::f32::consts::TAU).sin()
                    + 800.0 * (t * 1100.0 * std::f32::consts::TAU).sin();
                (env * v) as i16
            })
            .collect()
    }

    #[test]
    fn test_frame_classify_picks_loud_part() {
        for mode in [Mode::Ms20, Mode::Ms30] {
            let profile = mode.profile();
            let mut residual = vec![1.0f32; profile.block_len];
            for x in &mut residual[2 * SUBL..4 * SUBL] {
                *x = 100.0;
            }
            assert_eq!(frame_classify(&residual, profile), 3);
        }
    }

    #[test]
    fn test_encode_rejects_bad_lengths() {
        let mut encoder = IlbcEncoder::new(Mode::Ms20);
        let mut out = [0u8; NO_OF_BYTES_20MS];
        assert_eq!(
            encoder.encode(&[0; 100], &mut out),
            Err(Error::InvalidPcmLength { expected: 160, actual: 100 })
        );
        assert_eq!(
            encoder.encode(&[0; 160], &mut out[..10]),
            Err(Error::OutputTooSmall { expected: 38, actual: 10 })
        );
    }

    #[test]
    fn test_encoded_size_and_valid_indices() {
        for mode in [Mode::Ms20, Mode::Ms30] {
            let mut encoder = IlbcEncoder::new(mode);
            let profile = mode.profile();
            let mut out = [0xffu8; NO_OF_BYTES_30MS + 4];
            for frame in 0..8 {
                let pcm = speech_like(profile.block_len, frame * profile.block_len);
                let n = encoder.encode(&pcm, &mut out).unwrap();
                assert_eq!(n, profile.bytes);

                let (indices, empty) = IndexSet::unpack(profile, &out[..n]);
                assert!(!empty);
                assert!(indices.start >= 1 && indices.start <= profile.max_start);
                assert!(indices.scale < STATE_FRGQ.len());
            }
            // bytes after the block are left alone
            assert_eq!(out[NO_OF_BYTES_30MS..], [0xff; 4]);
        }
    }

    #[test]
    fn test_reset_restores_initial_state() {
        let mut encoder = IlbcEncoder::new(Mode::Ms30);
        let pcm = speech_like(BLOCKL_30MS, 0);
        let mut first = [0u8; NO_OF_BYTES_30MS];
        encoder.encode(&pcm, &mut first).unwrap();
        let mut other = [0u8; NO_OF_BYTES_30MS];
        encoder.encode(&speech_like(BLOCKL_30MS, 999), &mut other).unwrap();

        encoder.reset();
        let mut again = [0u8; NO_OF_BYTES_30MS];
        encoder.encode(&pcm, &mut again).unwrap();
        assert_eq!(first, again);
    }
}
