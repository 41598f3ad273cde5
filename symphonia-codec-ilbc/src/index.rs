//! The coded parameters of one frame and their bit layout.

use crate::bitstream::{combine, split_value, BitReader, BitWriter};
use crate::consts::*;
use crate::mode::{ModeProfile, UlpBits, ULP_CLASSES};

/// Quantization indices of one frame.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IndexSet {
    pub lsf: [usize; LSF_NSPLIT * LPC_N_MAX],
    /// Start sub-block of the state, 1 based.
    pub start: usize,
    /// The scalar coded part of the state comes before the adaptive one.
    pub state_first: bool,
    /// State scale, index into `STATE_FRGQ`.
    pub scale: usize,
    pub state: [usize; STATE_SHORT_LEN_30MS],
    pub extra_cb_index: [usize; CB_NSTAGES],
    pub extra_gain_index: [usize; CB_NSTAGES],
    pub cb_index: [usize; CB_NSTAGES * NASUB_MAX],
    pub gain_index: [usize; CB_NSTAGES * NASUB_MAX],
}

impl Default for IndexSet {
    fn default() -> Self {
        IndexSet {
            lsf: [0; LSF_NSPLIT * LPC_N_MAX],
            start: 0,
            state_first: false,
            scale: 0,
            state: [0; STATE_SHORT_LEN_30MS],
            extra_cb_index: [0; CB_NSTAGES],
            extra_gain_index: [0; CB_NSTAGES],
            cb_index: [0; CB_NSTAGES * NASUB_MAX],
            gain_index: [0; CB_NSTAGES * NASUB_MAX],
        }
    }
}

impl IndexSet {
    /// Visit every coded field in bitstream order for one protection class.
    ///
    /// The callback gets the field, its bits in `class` and its bits in the
    /// classes after `class`.
    fn visit<F>(&mut self, profile: &ModeProfile, class: usize, mut f: F)
    where
        F: FnMut(&mut usize, u32, u32),
    {
        let ulp = profile.ulp;
        let mut field = |value: &mut usize, bits: &UlpBits| {
            let rest = bits[class + 1..].iter().map(|&b| b as u32).sum();
            f(value, bits[class] as u32, rest)
        };

        for (value, bits) in self
            .lsf
            .iter_mut()
            .zip(ulp.lsf.iter())
            .take(LSF_NSPLIT * profile.lpc_n)
        {
            field(value, bits);
        }

        field(&mut self.start, &ulp.start);
        let mut state_first = self.state_first as usize;
        field(&mut state_first, &ulp.state_first);
        self.state_first = state_first != 0;
        field(&mut self.scale, &ulp.scale);
        for value in &mut self.state[..profile.state_short_len] {
            field(value, &ulp.state);
        }

        for (value, bits) in self.extra_cb_index.iter_mut().zip(&ulp.extra_cb_index) {
            field(value, bits);
        }
        for (value, bits) in self.extra_gain_index.iter_mut().zip(&ulp.extra_cb_gain) {
            field(value, bits);
        }

        for i in 0..profile.nasub {
            for k in 0..CB_NSTAGES {
                field(&mut self.cb_index[i * CB_NSTAGES + k], &ulp.cb_index[i][k]);
            }
        }
        for i in 0..profile.nasub {
            for k in 0..CB_NSTAGES {
                field(&mut self.gain_index[i * CB_NSTAGES + k], &ulp.cb_gain[i][k]);
            }
        }
    }

    /// Write the indices into `out`, which must hold `profile.bytes` bytes.
    ///
    /// The trailing empty frame bit is always cleared.
    pub fn pack(&self, profile: &ModeProfile, out: &mut [u8]) {
        let mut rest = self.clone();
        let mut writer = BitWriter::new(&mut out[..profile.bytes]);
        for class in 0..ULP_CLASSES {
            rest.visit(profile, class, |value, bits, rest_bits| {
                let (high, low) = split_value(*value as u32, bits, bits + rest_bits);
                writer.pack(high, bits);
                *value = low as usize;
            });
        }
        writer.pack(0, 1);
        debug_assert_eq!(writer.position(), profile.bytes * 8);
    }

    /// Read the indices of one encoded block.
    ///
    /// Returns the indices and the value of the trailing empty frame bit.
    pub fn unpack(profile: &ModeProfile, data: &[u8]) -> (Self, bool) {
        let mut indices = Self::default();
        let mut reader = BitReader::new(&data[..profile.bytes]);
        for class in 0..ULP_CLASSES {
            indices.visit(profile, class, |value, bits, _| {
                *value = combine(*value as u32, reader.unpack(bits), bits) as usize;
            });
        }
        let empty_frame = reader.unpack(1) == 1;
        (indices, empty_frame)
    }

    /// Map the codebook indices of the first adaptive sub-block from the
    /// search range onto their 7 bit transmitted range.
    pub fn convert_cb_index_for_tx(&mut self) {
        for index in &mut self.cb_index[1..CB_NSTAGES] {
            if (108..172).contains(index) {
                *index -= 64;
            } else if *index >= 236 {
                *index -= 128;
            }
        }
    }

    /// Inverse of [`IndexSet::convert_cb_index_for_tx`].
    pub fn convert_cb_index_from_rx(&mut self) {
        for index in &mut self.cb_index[1..CB_NSTAGES] {
            if (44..108).contains(index) {
                *index += 64;
            } else if (108..128).contains(index) {
                *index += 128;
            }
        }
    }
}

#[cfg(test)]
mod test {
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    use super::*;
    use crate::mode::Mode;

    fn random_indices(profile: &ModeProfile, rng: &mut StdRng) -> IndexSet {
        let mut indices = IndexSet::default();
        // fill every field with a random value of its full width
        for class in 0..ULP_CLASSES {
            indices.visit(profile, class, |value, bits, rest| {
                if class == 0 {
                    let width = bits + rest;
                    *value = if width == 0 {
                        0
                    } else {
                        rng.gen_range(0..1usize << width)
                    };
                }
            });
        }
        indices
    }

    #[test]
    fn test_pack_unpack_indices() {
        let mut rng = StdRng::seed_from_u64(38);
        for mode in [Mode::Ms20, Mode::Ms30] {
            let profile = mode.profile();
            for _ in 0..50 {
                let indices = random_indices(profile, &mut rng);
                let mut block = [0u8; NO_OF_BYTES_30MS];
                indices.pack(profile, &mut block);
                assert_eq!(block[profile.bytes - 1] & 1, 0);

                let (decoded, empty) = IndexSet::unpack(profile, &block);
                assert!(!empty);
                assert_eq!(decoded, indices);
            }
        }
    }

    #[test]
    fn test_protection_class_order() {
        // the most significant LSF bits open the block
        let profile = Mode::Ms20.profile();
        let indices = IndexSet {
            lsf: [0b101101, 0, 0, 0, 0, 0],
            start: 0b11,
            ..Default::default()
        };
        let mut block = [0u8; NO_OF_BYTES_20MS];
        indices.pack(profile, &mut block);
        assert_eq!(block[0], 0b1011_0100);
        // lsf (6 + 7 + 7 bits) then start
        assert_eq!(block[2] & 0b0000_1100, 0b0000_1100);
    }

    #[test]
    fn test_default_is_all_zero() {
        let indices = IndexSet::default();
        assert!(indices.state.iter().all(|&x| x == 0));
        assert_eq!(indices.state.len(), STATE_SHORT_LEN_30MS);

        // an all zero block unpacks to the default set
        for mode in [Mode::Ms20, Mode::Ms30] {
            let profile = mode.profile();
            let (decoded, empty) = IndexSet::unpack(profile, &[0u8; NO_OF_BYTES_30MS]);
            assert!(!empty);
            assert_eq!(decoded, indices);
        }
    }

    #[test]
    fn test_empty_frame_bit() {
        let profile = Mode::Ms30.profile();
        let mut block = [0u8; NO_OF_BYTES_30MS];
        IndexSet::default().pack(profile, &mut block);
        block[NO_OF_BYTES_30MS - 1] |= 1;
        let (_, empty) = IndexSet::unpack(profile, &block);
        assert!(empty);
    }

    #[test]
    fn test_cb_index_conversion() {
        let mut indices = IndexSet::default();
        indices.cb_index[..3].copy_from_slice(&[200, 120, 240]);
        indices.convert_cb_index_for_tx();
        assert_eq!(&indices.cb_index[..3], &[200, 56, 112]);
        indices.convert_cb_index_from_rx();
        assert_eq!(&indices.cb_index[..3], &[200, 120, 240]);

        indices.cb_index[1] = 30;
        indices.convert_cb_index_for_tx();
        indices.convert_cb_index_from_rx();
        assert_eq!(indices.cb_index[1], 30);
    }
}
