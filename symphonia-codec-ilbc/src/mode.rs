use num_traits::FromPrimitive;

use crate::consts::*;
use crate::errors::{Error, Result};

/// Number of unequal level protection classes.
pub const ULP_CLASSES: usize = 3;

/// Bits of one field in each protection class.
pub type UlpBits = [u8; ULP_CLASSES];

/// Frame duration of an iLBC stream.
#[repr(u32)]
#[derive(Clone, Copy, Debug, Default, FromPrimitive, PartialEq, Eq, Hash)]
pub enum Mode {
    Ms20 = 20,
    #[default]
    Ms30 = 30,
}

impl Mode {
    /// Select a mode from a frame duration in milliseconds.
    pub fn from_ms(ms: u32) -> Result<Self> {
        Mode::from_u32(ms).ok_or(Error::UnsupportedMode(ms))
    }

    /// Select a mode from the size of one encoded block.
    pub fn from_block_size(bytes: usize) -> Option<Self> {
        match bytes {
            NO_OF_BYTES_20MS => Some(Mode::Ms20),
            NO_OF_BYTES_30MS => Some(Mode::Ms30),
            _ => None,
        }
    }

    pub fn ms(self) -> u32 {
        self as u32
    }

    pub fn profile(self) -> &'static ModeProfile {
        match self {
            Mode::Ms20 => &PROFILE_20MS,
            Mode::Ms30 => &PROFILE_30MS,
        }
    }
}

/// Bit allocation of every coded field, split across the protection classes.
#[derive(Debug)]
pub struct UlpTable {
    pub lsf: [UlpBits; LSF_NSPLIT * LPC_N_MAX],
    pub start: UlpBits,
    pub state_first: UlpBits,
    pub scale: UlpBits,
    pub state: UlpBits,
    pub extra_cb_index: [UlpBits; CB_NSTAGES],
    pub extra_cb_gain: [UlpBits; CB_NSTAGES],
    pub cb_index: [[UlpBits; CB_NSTAGES]; NASUB_MAX],
    pub cb_gain: [[UlpBits; CB_NSTAGES]; NASUB_MAX],
}

/// Structural constants of one mode.
#[derive(Debug)]
pub struct ModeProfile {
    pub mode: Mode,
    /// Samples per frame.
    pub block_len: usize,
    /// Sub-blocks per frame.
    pub nsub: usize,
    /// Sub-blocks coded with the adaptive codebook.
    pub nasub: usize,
    /// LSF sets per frame.
    pub lpc_n: usize,
    /// Samples of the start state coded with the scalar quantizer.
    pub state_short_len: usize,
    /// Bytes of one encoded block.
    pub bytes: usize,
    /// Largest valid start sub-block index (1 based).
    pub max_start: usize,
    pub ulp: &'static UlpTable,
}

impl ModeProfile {
    /// Samples of the start state coded with the adaptive codebook.
    pub fn state_extra_len(&self) -> usize {
        STATE_LEN - self.state_short_len
    }

    /// Number of coded bits, including the trailing empty frame bit.
    pub fn total_bits(&self) -> usize {
        let ulp = self.ulp;
        let sum = |bits: &UlpBits| bits.iter().map(|&b| b as usize).sum::<usize>();

        let mut total = ulp.lsf.iter().map(sum).sum::<usize>();
        total += sum(&ulp.start) + sum(&ulp.state_first) + sum(&ulp.scale);
        total += sum(&ulp.state) * self.state_short_len;
        total += ulp.extra_cb_index.iter().map(sum).sum::<usize>();
        total += ulp.extra_cb_gain.iter().map(sum).sum::<usize>();
        total += ulp.cb_index.iter().flatten().map(sum).sum::<usize>();
        total += ulp.cb_gain.iter().flatten().map(sum).sum::<usize>();
        total + 1
    }
}

const ZERO: UlpBits = [0, 0, 0];

static ULP_20MS: UlpTable = UlpTable {
    lsf: [[6, 0, 0], [7, 0, 0], [7, 0, 0], ZERO, ZERO, ZERO],
    start: [2, 0, 0],
    state_first: [1, 0, 0],
    scale: [6, 0, 0],
    state: [0, 1, 2],
    extra_cb_index: [[6, 0, 1], [0, 0, 7], [0, 0, 7]],
    extra_cb_gain: [[2, 0, 3], [1, 1, 2], [0, 0, 3]],
    cb_index: [
        [[7, 0, 1], [0, 0, 7], [0, 0, 7]],
        [[0, 0, 8], [0, 0, 8], [0, 0, 8]],
        [ZERO, ZERO, ZERO],
        [ZERO, ZERO, ZERO],
    ],
    cb_gain: [
        [[1, 2, 2], [1, 1, 2], [0, 0, 3]],
        [[1, 1, 3], [0, 2, 2], [0, 0, 3]],
        [ZERO, ZERO, ZERO],
        [ZERO, ZERO, ZERO],
    ],
};

static ULP_30MS: UlpTable = UlpTable {
    lsf: [[6, 0, 0], [7, 0, 0], [7, 0, 0], [6, 0, 0], [7, 0, 0], [7, 0, 0]],
    start: [3, 0, 0],
    state_first: [1, 0, 0],
    scale: [6, 0, 0],
    state: [0, 1, 2],
    extra_cb_index: [[4, 2, 1], [0, 0, 7], [0, 0, 7]],
    extra_cb_gain: [[1, 1, 3], [1, 1, 2], [0, 0, 3]],
    cb_index: [
        [[6, 1, 1], [0, 0, 7], [0, 0, 7]],
        [[0, 7, 1], [0, 0, 8], [0, 0, 8]],
        [[0, 7, 1], [0, 0, 8], [0, 0, 8]],
        [[0, 7, 1], [0, 0, 8], [0, 0, 8]],
    ],
    cb_gain: [
        [[1, 2, 2], [1, 2, 1], [0, 0, 3]],
        [[0, 2, 3], [0, 2, 2], [0, 0, 3]],
        [[0, 1, 4], [0, 1, 3], [0, 0, 3]],
        [[0, 1, 4], [0, 1, 3], [0, 0, 3]],
    ],
};

static PROFILE_20MS: ModeProfile = ModeProfile {
    mode: Mode::Ms20,
    block_len: BLOCKL_20MS,
    nsub: NSUB_20MS,
    nasub: NASUB_20MS,
    lpc_n: LPC_N_20MS,
    state_short_len: STATE_SHORT_LEN_20MS,
    bytes: NO_OF_BYTES_20MS,
    max_start: 3,
    ulp: &ULP_20MS,
};

static PROFILE_30MS: ModeProfile = ModeProfile {
    mode: Mode::Ms30,
    block_len: BLOCKL_30MS,
    nsub: NSUB_30MS,
    nasub: NASUB_30MS,
    lpc_n: LPC_N_30MS,
    state_short_len: STATE_SHORT_LEN_30MS,
    bytes: NO_OF_BYTES_30MS,
    max_start: 5,
    ulp: &ULP_30MS,
};

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_mode_from_ms() {
        assert_eq!(Mode::from_ms(20).unwrap(), Mode::Ms20);
        assert_eq!(Mode::from_ms(30).unwrap(), Mode::Ms30);
        assert!(matches!(Mode::from_ms(25), Err(Error::UnsupportedMode(25))));
        assert!(matches!(Mode::from_ms(0), Err(Error::UnsupportedMode(0))));
    }

    #[test]
    fn test_total_bits_fill_block() {
        for mode in [Mode::Ms20, Mode::Ms30] {
            let profile = mode.profile();
            assert_eq!(profile.total_bits(), profile.bytes * 8, "{:?}", mode);
            assert_eq!(profile.block_len, profile.nsub * SUBL);
            assert_eq!(Mode::from_block_size(profile.bytes), Some(mode));
        }
    }

    #[test]
    fn test_index_widths() {
        // every stage index must be wide enough for its table
        for mode in [Mode::Ms20, Mode::Ms30] {
            let ulp = mode.profile().ulp;
            let width = |bits: &UlpBits| bits.iter().sum::<u8>();
            assert_eq!(width(&ulp.extra_cb_gain[0]), 5);
            assert_eq!(width(&ulp.extra_cb_gain[1]), 4);
            assert_eq!(width(&ulp.extra_cb_gain[2]), 3);
            for k in 0..mode.profile().nasub {
                assert_eq!(width(&ulp.cb_index[k][0]), 8);
                assert_eq!(width(&ulp.cb_gain[k][0]), 5);
            }
            assert_eq!(width(&ulp.state), STATE_BITS as u8);
            assert_eq!(width(&ulp.scale), SCALE_BITS as u8);
        }
    }
}
