//! Analysis by synthesis search of the adaptive codebook.

use crate::cb::{base_size, gain_quant, gain_table, Codebook};
use crate::consts::*;
use crate::filter::all_pole_filter;
use crate::lpc::LpcCoefs;

const NO_MEASURE: f32 = -10_000_000.0;
/// Indices of the augmented vectors within a section.
const AUG_LOW: usize = 20;
const AUG_HIGH: usize = 39;

fn dot(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

fn inverse_energy(energy: f32) -> f32 {
    if energy > 0.0 {
        1.0 / (energy + EPS)
    } else {
        0.0
    }
}

/// Best candidate of one stage.
struct Best {
    measure: f32,
    index: usize,
    gain: f32,
}

impl Best {
    fn new() -> Self {
        Best { measure: NO_MEASURE, index: 0, gain: 0.0 }
    }

    /// The first stage only accepts positive correlation.
    fn offer(&mut self, stage: usize, index: usize, cross: f32, inv_energy: f32) {
        let measure = if stage == 0 && cross <= 0.0 {
            NO_MEASURE
        } else {
            cross * cross * inv_energy
        };
        let gain = cross * inv_energy;
        if measure > self.measure && gain.abs() < CB_MAXGAIN {
            self.measure = measure;
            self.index = index;
            self.gain = gain;
        }
    }
}

/// Vector energies, indexed like the codebook.
struct Energies {
    energy: [f32; CB_EXPAND * 128],
    inv: [f32; CB_EXPAND * 128],
}

/// Search the augmented vectors with lags `low..=high` of `buffer`.
///
/// Their codebook indices start at `start_index` for lag 20.
#[allow(clippy::too_many_arguments)]
fn search_augmented(
    low: usize,
    high: usize,
    stage: usize,
    start_index: usize,
    target: &[f32],
    buffer: &[f32],
    best: &mut Best,
    en: &mut Energies,
) {
    let end = buffer.len();

    // energy of the first non interpolated samples
    let mut nrj_recursive: f32 = buffer[end + 1 - low..end - 4].iter().map(|x| x * x).sum();
    let mut ppe = end - low;

    for icount in low..=high {
        let index = start_index + icount - AUG_LOW;
        let ilow = icount - 4;

        nrj_recursive += buffer[ppe] * buffer[ppe];
        ppe = ppe.saturating_sub(1);
        let mut energy = nrj_recursive;

        let mut cross = dot(&target[..ilow], &buffer[end - icount..]);

        let mut alfa = 0.2f32;
        for j in ilow..icount {
            let weighted =
                (1.0 - alfa) * buffer[end - 4 + j - ilow] + alfa * buffer[end - icount - 4 + j - ilow];
            energy += weighted * weighted;
            cross += target[j] * weighted;
            alfa += 0.2;
        }

        for j in icount..SUBL {
            let v = buffer[end - icount + j - icount];
            energy += v * v;
            cross += target[j] * v;
        }

        en.energy[index] = energy;
        en.inv[index] = inverse_energy(energy);
        best.offer(stage, index, cross, en.inv[index]);
    }
}

/// Indices and gain indices of one searched vector.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CbChoice {
    pub index: [usize; CB_NSTAGES],
    pub gain_index: [usize; CB_NSTAGES],
}

/// Three stage codebook search of `target` over the excitation history
/// `mem`, in the domain of the weighting filter `weight_denum`.
///
/// `block` selects the row of the search range table: 0 for the part of
/// the start state coded with the codebook, then one per sub-block.
pub fn cb_search(target: &[f32], mem: &[f32], weight_denum: &LpcCoefs, block: usize) -> CbChoice {
    let lmem = mem.len();
    let ltarget = target.len();
    let base = base_size(lmem, ltarget);

    let mut buf = [0.0f32; LPC_FILTERORDER + CB_MEML + SUBL];
    buf[LPC_FILTERORDER..LPC_FILTERORDER + lmem].copy_from_slice(mem);
    buf[LPC_FILTERORDER + lmem..LPC_FILTERORDER + lmem + ltarget].copy_from_slice(target);
    all_pole_filter(&mut buf, LPC_FILTERORDER, weight_denum, lmem + ltarget, LPC_FILTERORDER);

    let weighted = &buf[LPC_FILTERORDER..LPC_FILTERORDER + lmem];
    let mut target_buf = [0.0f32; SUBL];
    let target = &mut target_buf[..ltarget];
    target.copy_from_slice(&buf[LPC_FILTERORDER + lmem..LPC_FILTERORDER + lmem + ltarget]);
    let tene = dot(target, target);

    let codebook = Codebook::new(weighted);
    let filtered = codebook.filtered();

    let mut en = Energies {
        energy: [0.0; CB_EXPAND * 128],
        inv: [0.0; CB_EXPAND * 128],
    };
    let mut choice = CbChoice::default();
    let mut gains = [0.0f32; CB_NSTAGES];
    let mut cvec = [0.0f32; SUBL];
    let mut cbvec = [0.0f32; SUBL];

    for stage in 0..CB_NSTAGES {
        let range = SEARCH_RANGE[block][stage];
        let mut best = Best::new();

        // first section, full search
        if stage == 0 {
            en.energy[0] = dot(&weighted[lmem - ltarget..], &weighted[lmem - ltarget..]);
            en.inv[0] = inverse_energy(en.energy[0]);
            for icount in 1..range {
                let i = weighted[lmem - ltarget - icount];
                let o = weighted[lmem - icount];
                en.energy[icount] = en.energy[icount - 1] + i * i - o * o;
                en.inv[icount] = inverse_energy(en.energy[icount]);
            }
        }
        for icount in 0..range {
            let cross = dot(target, &weighted[lmem - ltarget - icount..]);
            best.offer(stage, icount, cross, en.inv[icount]);
        }

        if ltarget == SUBL {
            search_augmented(
                AUG_LOW,
                AUG_HIGH,
                stage,
                base - ltarget / 2,
                target,
                weighted,
                &mut best,
                &mut en,
            );
        }

        // restrict the filtered section to the neighbourhood of the best
        // index so far
        let range_i = range as isize;
        let base_i = base as isize;
        let resrange = CB_RESRANGE as isize;
        let base_index = best.index as isize;
        let mut s_ind = base_index - resrange / 2;
        let mut e_ind = s_ind + resrange;
        let mut s_aug = 0isize;
        let mut e_aug = 0isize;
        if ltarget == SUBL {
            if s_ind < 0 {
                s_aug = 40 + s_ind;
                e_aug = AUG_HIGH as isize;
                s_ind = 0;
            } else if base_index < base_i - 20 {
                if e_ind > range_i {
                    s_ind -= e_ind - range_i;
                    e_ind = range_i;
                }
            } else if s_ind < base_i - 20 {
                s_aug = 20;
                s_ind = 0;
                e_ind = 0;
                e_aug = 19 + resrange;
                if e_aug > 39 {
                    e_ind = e_aug - 39;
                    e_aug = 39;
                }
            } else {
                s_aug = 20 + s_ind - (base_i - 20);
                e_aug = 39;
                s_ind = 0;
                e_ind = resrange - (e_aug - s_aug + 1);
            }
        } else {
            if s_ind < 0 {
                e_ind -= s_ind;
                s_ind = 0;
            }
            if e_ind > range_i {
                s_ind -= e_ind - range_i;
                e_ind = range_i;
            }
        }
        let s_ind = s_ind.max(0) as usize;
        let e_ind = e_ind.max(0) as usize;

        // filtered section
        if stage == 0 {
            en.energy[base] = dot(&filtered[lmem - ltarget..], &filtered[lmem - ltarget..]);
            for j in 0..range - 1 {
                let i = filtered[lmem - 1 - ltarget - j];
                let o = filtered[lmem - 1 - j];
                en.energy[base + j + 1] = en.energy[base + j] + i * i - o * o;
            }
        }
        for (counter, icount) in (s_ind..e_ind).zip(base + s_ind..base + e_ind) {
            let cross = dot(target, &filtered[lmem - counter - ltarget..]);
            en.inv[icount] = inverse_energy(en.energy[icount]);
            best.offer(stage, icount, cross, en.inv[icount]);
        }

        if ltarget == SUBL && s_aug != 0 {
            search_augmented(
                s_aug as usize,
                e_aug as usize,
                stage,
                2 * base - 20,
                target,
                filtered,
                &mut best,
                &mut en,
            );
        }

        choice.index[stage] = best.index;

        let (gain, gain_index) = if stage == 0 {
            gain_quant(best.gain.clamp(0.0, CB_MAXGAIN), 1.0, gain_table(0))
        } else {
            gain_quant(best.gain, gains[stage - 1].abs(), gain_table(stage))
        };
        choice.gain_index[stage] = gain_index;

        // remove the chosen vector from the target
        let cbvec = &mut cbvec[..ltarget];
        codebook.vector(best.index, cbvec);
        for ((c, t), &v) in cvec.iter_mut().zip(target.iter_mut()).zip(cbvec.iter()) {
            *c += gain * v;
            *t -= gain * v;
        }
        gains[stage] = gain;
    }

    // energy matching of the first stage gain
    let cene = dot(&cvec[..ltarget], &cvec[..ltarget]);
    let mut j = choice.gain_index[0];
    for i in choice.gain_index[0]..GAIN_SQ5.len() {
        let ftmp = cene * GAIN_SQ5[i] * GAIN_SQ5[i];
        if ftmp < tene * gains[0] * gains[0] && GAIN_SQ5[j] < 2.0 * gains[0] {
            j = i;
        }
    }
    choice.gain_index[0] = j;

    choice
}
