//! iLBC decoder.

mod enhancer;
mod plc;

use log::{debug, trace};

use crate::cb::{base_size, cb_construct};
use crate::consts::*;
use crate::errors::{Error, Result};
use crate::filter::{hp_filter, synt_filter};
use crate::index::IndexSet;
use crate::lpc::{interpolate_subframes, lsf_check, lsf_dequant, LpcCoefs, LPC_IDENTITY};
use crate::mode::{Mode, ModeProfile};
use crate::state::state_construct;

use enhancer::{xcorr_coef, Enhancer};
use plc::Plc;

/// How the caller wants a block handled.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FrameMode {
    #[default]
    Normal,
    /// The block never arrived, conceal it.
    Lost,
}

/// Pitch lag range searched when the enhancer is disabled.
const LAG_SEARCH: std::ops::Range<usize> = 20..120;

/// Pitch lag of the last `ENH_BLOCKL` samples of `residual`.
///
/// RFC 3951 correlates at `BLOCKL_MAX - ENH_BLOCKL` in both modes, which
/// reads past the end of a 20 ms frame. The target here is always the end
/// of the frame, so 20 ms concealment starts from a different lag than the
/// RFC decoder.
fn pitch_lag(residual: &[f32]) -> usize {
    let start = residual.len() - ENH_BLOCKL;
    let target = &residual[start..];
    let mut lag = LAG_SEARCH.start;
    let mut maxcc = xcorr_coef(target, &residual[start - lag..]);
    for ilag in LAG_SEARCH.start + 1..LAG_SEARCH.end.min(start + 1) {
        let cc = xcorr_coef(target, &residual[start - ilag..]);
        if cc > maxcc {
            maxcc = cc;
            lag = ilag;
        }
    }
    lag
}

/// Whether every codebook index addresses a vector of its codebook.
fn cb_indices_in_range(indices: &IndexSet, profile: &ModeProfile) -> bool {
    let extra_size = 2 * base_size(ST_MEM_L, profile.state_extra_len());
    let size = 2 * base_size(CB_MEML, SUBL);
    indices.extra_cb_index.iter().all(|&i| i < extra_size)
        && indices.cb_index[..profile.nasub * CB_NSTAGES].iter().all(|&i| i < size)
}

/// Rebuild the residual of a frame from its indices.
fn decode_residual(profile: &ModeProfile, indices: &IndexSet, synt: &[LpcCoefs], out: &mut [f32]) {
    let nsub = profile.nsub;
    let ssl = profile.state_short_len;
    let diff = profile.state_extra_len();
    let start = indices.start;
    let first = (start - 1) * SUBL;
    let start_pos = if indices.state_first { first } else { first + diff };

    state_construct(
        indices.scale,
        &indices.state[..ssl],
        &synt[start - 1],
        &mut out[start_pos..start_pos + ssl],
    );

    let mut mem = [0.0f32; CB_MEML];
    if indices.state_first {
        mem[CB_MEML - ssl..].copy_from_slice(&out[start_pos..start_pos + ssl]);
        cb_construct(
            &mem[CB_MEML - ST_MEM_L..],
            &indices.extra_cb_index,
            &indices.extra_gain_index,
            &mut out[start_pos + ssl..start_pos + ssl + diff],
        );
    } else {
        for k in 0..ssl {
            mem[CB_MEML - 1 - k] = out[start_pos + k];
        }
        let mut reverse = [0.0f32; STATE_LEN];
        cb_construct(
            &mem[CB_MEML - ST_MEM_L..],
            &indices.extra_cb_index,
            &indices.extra_gain_index,
            &mut reverse[..diff],
        );
        for k in 0..diff {
            out[start_pos - 1 - k] = reverse[k];
        }
    }

    let mut subcount = 0;

    let n_for = nsub - start - 1;
    if n_for > 0 {
        mem = [0.0; CB_MEML];
        mem[CB_MEML - STATE_LEN..].copy_from_slice(&out[first..first + STATE_LEN]);

        for subframe in 0..n_for {
            let sub = (start + 1 + subframe) * SUBL..(start + 2 + subframe) * SUBL;
            let stages = subcount * CB_NSTAGES..(subcount + 1) * CB_NSTAGES;
            cb_construct(
                &mem[CB_MEML - MEM_LF[subcount]..],
                &indices.cb_index[stages.clone()],
                &indices.gain_index[stages],
                &mut out[sub.clone()],
            );
            mem.copy_within(SUBL.., 0);
            mem[CB_MEML - SUBL..].copy_from_slice(&out[sub]);
            subcount += 1;
        }
    }

    // sub-blocks before the state are decoded on a time reversed signal
    let n_back = start - 1;
    if n_back > 0 {
        let meml_gotten = (SUBL * (nsub + 1 - start)).min(CB_MEML);
        mem = [0.0; CB_MEML];
        for k in 0..meml_gotten {
            mem[CB_MEML - 1 - k] = out[first + k];
        }

        let mut reverse = [0.0f32; BLOCKL_MAX];
        for subframe in 0..n_back {
            let sub = subframe * SUBL..(subframe + 1) * SUBL;
            let stages = subcount * CB_NSTAGES..(subcount + 1) * CB_NSTAGES;
            cb_construct(
                &mem[CB_MEML - MEM_LF[subcount]..],
                &indices.cb_index[stages.clone()],
                &indices.gain_index[stages],
                &mut reverse[sub.clone()],
            );
            mem.copy_within(SUBL.., 0);
            mem[CB_MEML - SUBL..].copy_from_slice(&reverse[sub]);
            subcount += 1;
        }

        for i in 0..SUBL * n_back {
            out[SUBL * n_back - 1 - i] = reverse[i];
        }
    }
}

/// Decoder of one iLBC stream.
pub struct IlbcDecoder {
    profile: &'static ModeProfile,
    use_enhancer: bool,
    synt_mem: [f32; LPC_FILTERORDER],
    lsfdeq_old: [f32; LPC_FILTERORDER],
    old_synt_denum: [LpcCoefs; NSUB_MAX],
    hpo_mem: [f32; 4],
    last_lag: usize,
    /// The previous frame came out of the concealment.
    prev_concealed: bool,
    plc: Plc,
    enhancer: Enhancer,
}

impl IlbcDecoder {
    pub fn new(mode: Mode, use_enhancer: bool) -> Self {
        IlbcDecoder {
            profile: mode.profile(),
            use_enhancer,
            synt_mem: [0.0; LPC_FILTERORDER],
            lsfdeq_old: LSF_MEAN,
            old_synt_denum: [LPC_IDENTITY; NSUB_MAX],
            hpo_mem: [0.0; 4],
            last_lag: 20,
            prev_concealed: false,
            plc: Plc::new(),
            enhancer: Enhancer::new(),
        }
    }

    pub fn mode(&self) -> Mode {
        self.profile.mode
    }

    pub fn enhancer_enabled(&self) -> bool {
        self.use_enhancer
    }

    /// PCM samples produced by every call to [`IlbcDecoder::decode`].
    pub fn frame_samples(&self) -> usize {
        self.profile.block_len
    }

    pub fn frame_bytes(&self) -> usize {
        self.profile.bytes
    }

    pub fn reset(&mut self) {
        *self = IlbcDecoder::new(self.profile.mode, self.use_enhancer);
    }

    /// Consecutive frames concealed so far, zero after a decoded frame.
    pub fn consecutive_losses(&self) -> usize {
        self.plc.consecutive_losses()
    }

    /// Gain of the concealment applied to the last frame, one when the last
    /// frame was decoded.
    pub fn concealment_gain(&self) -> f32 {
        self.plc.gain()
    }

    /// Decode one block into `out`, returns the number of samples written.
    ///
    /// With [`FrameMode::Lost`] `data` is ignored and the frame is
    /// concealed. Blocks with implausible content are concealed as well.
    pub fn decode(&mut self, data: &[u8], frame_mode: FrameMode, out: &mut [i16]) -> Result<usize> {
        let profile = self.profile;
        if frame_mode == FrameMode::Normal && data.len() != profile.bytes {
            return Err(Error::InvalidFrameLength { expected: profile.bytes, actual: data.len() });
        }
        if out.len() < profile.block_len {
            return Err(Error::OutputTooSmall { expected: profile.block_len, actual: out.len() });
        }

        let mut block = [0.0f32; BLOCKL_MAX];
        let block = &mut block[..profile.block_len];
        let payload = match frame_mode {
            FrameMode::Normal => Some(data),
            FrameMode::Lost => None,
        };
        self.decode_block(payload, block);

        for (o, &x) in out.iter_mut().zip(block.iter()) {
            *o = x.clamp(MIN_SAMPLE, MAX_SAMPLE) as i16;
        }
        Ok(profile.block_len)
    }

    /// Unpack and check a received block, `None` when it has to be
    /// concealed.
    fn parse(&self, data: &[u8]) -> Option<IndexSet> {
        let profile = self.profile;
        let (mut indices, empty_frame) = IndexSet::unpack(profile, data);

        if empty_frame {
            debug!("ilbc: empty frame bit set, concealing");
            return None;
        }
        if indices.start < 1 || indices.start > profile.max_start {
            debug!("ilbc: invalid start sub-block {}, concealing", indices.start);
            return None;
        }

        indices.convert_cb_index_from_rx();
        if !cb_indices_in_range(&indices, profile) {
            debug!("ilbc: codebook index out of range, concealing");
            return None;
        }
        Some(indices)
    }

    fn decode_block(&mut self, data: Option<&[u8]>, out: &mut [f32]) {
        let profile = self.profile;
        let len = profile.block_len;
        let nsub = profile.nsub;

        let mut residual = [0.0f32; BLOCKL_MAX];
        let residual = &mut residual[..len];
        let mut synt = [LPC_IDENTITY; NSUB_MAX];

        let indices = data.and_then(|data| self.parse(data));
        let concealed = match &indices {
            Some(indices) => {
                let mut lsfdeq = lsf_dequant(&indices.lsf, profile.lpc_n);
                lsf_check(&mut lsfdeq, LPC_FILTERORDER, profile.lpc_n);
                interpolate_subframes(profile.mode, &self.lsfdeq_old, &lsfdeq, &mut synt);
                let last = (profile.lpc_n - 1) * LPC_FILTERORDER;
                self.lsfdeq_old.copy_from_slice(&lsfdeq[last..last + LPC_FILTERORDER]);

                decode_residual(profile, indices, &synt, residual);
                self.plc.update(residual, &synt[nsub - 1]);

                trace!(
                    "ilbc: decoded block, start {} state_first {} scale {}",
                    indices.start,
                    indices.state_first,
                    indices.scale
                );
                false
            }
            None => {
                let lpc = self.plc.conceal(self.last_lag, residual);
                synt[..nsub].fill(lpc);
                trace!(
                    "ilbc: concealed block {} with gain {}",
                    self.plc.consecutive_losses(),
                    self.plc.gain()
                );
                true
            }
        };

        let mut data = [0.0f32; BLOCKL_MAX];
        let data = &mut data[..len];
        if self.use_enhancer {
            self.last_lag = self.enhancer.process(residual, profile.mode, self.prev_concealed, data);

            // the enhancer output lags behind, the first sub-blocks still
            // belong to the previous frame
            let delay = match profile.mode {
                Mode::Ms20 => 1,
                Mode::Ms30 => 2,
            };
            for (i, sub) in data.chunks_exact_mut(SUBL).enumerate() {
                let a = if i < delay {
                    &self.old_synt_denum[i + nsub - delay]
                } else {
                    &synt[i - delay]
                };
                synt_filter(sub, a, &mut self.synt_mem);
            }
        } else {
            self.last_lag = pitch_lag(residual);
            data.copy_from_slice(residual);
            for (sub, a) in data.chunks_exact_mut(SUBL).zip(&synt) {
                synt_filter(sub, a, &mut self.synt_mem);
            }
        }

        hp_filter(data, out, &mut self.hpo_mem, &HPO_ZERO_COEFS, &HPO_POLE_COEFS);

        self.old_synt_denum = synt;
        self.prev_concealed = concealed;
    }
}
