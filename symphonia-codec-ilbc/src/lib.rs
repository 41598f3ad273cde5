#[macro_use]
extern crate num_derive;

use log::warn;
use symphonia_core::audio::{
    AsAudioBufferRef, AudioBuffer, AudioBufferRef, Channels, Signal, SignalSpec,
};
use symphonia_core::codecs::{
    decl_codec_type, CodecDescriptor, CodecParameters, CodecType, Decoder as D, DecoderOptions,
    FinalizeResult,
};
use symphonia_core::errors::{decode_error, Result};
use symphonia_core::formats::Packet;
use symphonia_core::support_codec;

pub mod bitstream;
mod cb;
pub mod consts;
pub mod dec;
pub mod enc;
pub mod errors;
mod filter;
pub mod index;
mod lpc;
pub mod mode;
mod state;

pub use dec::{FrameMode, IlbcDecoder};
pub use enc::IlbcEncoder;
pub use mode::{Mode, ModeProfile};

pub const CODEC_TYPE_ILBC: CodecType = decl_codec_type(b"ilbc");

/// Stream parameters of the symphonia decoder.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DecoderParams {
    pub mode: Mode,
    pub enhancer: bool,
}

impl Default for DecoderParams {
    fn default() -> Self {
        Self {
            mode: Mode::Ms30,
            enhancer: true,
        }
    }
}

impl DecoderParams {
    /// Read the parameters from `extra_data` (frame duration in ms and the
    /// enhancer flag), falling back on `frames_per_block`.
    pub fn from_codec_params(params: &CodecParameters) -> errors::Result<Self> {
        if let Some(extra) = params.extra_data.as_deref() {
            if let [ms, rest @ ..] = extra {
                return Ok(Self {
                    mode: Mode::from_ms(*ms as u32)?,
                    enhancer: rest.first().map_or(true, |&flag| flag != 0),
                });
            }
        }

        let mode = match params.frames_per_block {
            Some(160) => Mode::Ms20,
            Some(240) => Mode::Ms30,
            Some(other) => {
                return Err(errors::Error::UnsupportedMode(
                    (other * 1000 / consts::SAMPLE_RATE as u64) as u32,
                ))
            }
            None => Mode::default(),
        };
        Ok(Self {
            mode,
            enhancer: true,
        })
    }

    pub fn to_extra_data(&self) -> Box<[u8]> {
        Box::new([self.mode.ms() as u8, self.enhancer as u8])
    }
}

pub struct Decoder {
    params: CodecParameters,
    raw: IlbcDecoder,
    decoded_data: AudioBuffer<i16>,
}

impl D for Decoder {
    fn try_new(params: &CodecParameters, _options: &DecoderOptions) -> Result<Self>
    where
        Self: Sized,
    {
        let decode_params = DecoderParams::from_codec_params(params)?;
        let raw = IlbcDecoder::new(decode_params.mode, decode_params.enhancer);

        Ok(Self {
            decoded_data: AudioBuffer::new(
                raw.frame_samples() as u64,
                SignalSpec::new(consts::SAMPLE_RATE, Channels::FRONT_CENTRE),
            ),
            params: params.clone(),
            raw,
        })
    }

    fn reset(&mut self) {
        self.raw.reset();
    }

    fn supported_codecs() -> &'static [CodecDescriptor] {
        &[support_codec!(CODEC_TYPE_ILBC, "ilbc", "internet Low Bitrate Codec")]
    }

    fn codec_params(&self) -> &CodecParameters {
        &self.params
    }

    /// Decode one encoded block, an empty packet marks a lost frame.
    fn decode(&mut self, packet: &Packet) -> Result<AudioBufferRef> {
        let data = packet.buf();
        let frame_mode = if data.is_empty() {
            FrameMode::Lost
        } else if data.len() == self.raw.frame_bytes() {
            FrameMode::Normal
        } else {
            warn!(
                "ilbc: dropping packet of {} bytes, expected {}",
                data.len(),
                self.raw.frame_bytes()
            );
            return decode_error("ilbc: invalid packet length");
        };

        self.decoded_data.clear();
        self.decoded_data.render_reserved(Some(self.raw.frame_samples()));
        self.raw.decode(data, frame_mode, self.decoded_data.chan_mut(0))?;

        Ok(self.decoded_data.as_audio_buffer_ref())
    }

    fn finalize(&mut self) -> FinalizeResult {
        Default::default()
    }

    fn last_decoded(&self) -> AudioBufferRef {
        self.decoded_data.as_audio_buffer_ref()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::consts::*;
    use crate::filter::hp_filter;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn speech_like(len: usize, seed: u64) -> Vec<i16> {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut phase = 0.0f32;
        (0..len)
            .map(|n| {
                let t = n as f32 / SAMPLE_RATE as f32;
                // slowly gliding pitch with some breath noise
                let f0 = 140.0 + 30.0 * (t * 2.0 * std::f32::consts::TAU).sin();
                phase += f0 / SAMPLE_RATE as f32;
                let env = 0.5 + 0.5 * (t * 4.0 * std::f32::consts::TAU).sin().abs();
                let voiced: f32 = (1..8)
                    .map(|h| (phase * h as f32 * std::f32::consts::TAU).sin() * 2500.0 / h as f32)
                    .sum();
                (env * voiced + rng.gen_range(-200.0..200.0)) as i16
            })
            .collect()
    }

    fn encode_all(mode: Mode, pcm: &[i16]) -> Vec<Vec<u8>> {
        let mut encoder = IlbcEncoder::new(mode);
        pcm.chunks(encoder.frame_samples())
            .map(|frame| {
                let mut out = vec![0u8; encoder.frame_bytes()];
                let written = encoder.encode(frame, &mut out).unwrap();
                assert_eq!(written, out.len());
                out
            })
            .collect()
    }

    fn decode_all(decoder: &mut IlbcDecoder, frames: &[Vec<u8>]) -> Vec<i16> {
        let len = decoder.frame_samples();
        let mut pcm = vec![0i16; len * frames.len()];
        for (frame, out) in frames.iter().zip(pcm.chunks_mut(len)) {
            decoder.decode(frame, FrameMode::Normal, out).unwrap();
        }
        pcm
    }

    /// The source as heard through both high-pass filters.
    fn reference(pcm: &[i16]) -> Vec<f32> {
        let input: Vec<f32> = pcm.iter().map(|&x| x as f32).collect();
        let mut filtered = vec![0.0; pcm.len()];
        hp_filter(&input, &mut filtered, &mut [0.0; 4], &HPI_ZERO_COEFS, &HPI_POLE_COEFS);
        let mut out = vec![0.0; pcm.len()];
        hp_filter(&filtered, &mut out, &mut [0.0; 4], &HPO_ZERO_COEFS, &HPO_POLE_COEFS);
        out
    }

    fn distortion(a: &[f32], b: &[i16]) -> f64 {
        a.iter()
            .zip(b)
            .map(|(&x, &y)| (x as f64 - y as f64).powi(2))
            .sum()
    }

    #[test]
    fn test_fixed_output_size() {
        let mut rng = StdRng::seed_from_u64(2);
        for (mode, bytes) in [(Mode::Ms20, 38), (Mode::Ms30, 50)] {
            let mut encoder = IlbcEncoder::new(mode);
            for _ in 0..20 {
                let pcm: Vec<i16> = (0..encoder.frame_samples())
                    .map(|_| rng.gen_range(-20000..20000))
                    .collect();
                let mut out = [0u8; 64];
                assert_eq!(encoder.encode(&pcm, &mut out), Ok(bytes));
            }
        }
    }

    #[test]
    fn test_deterministic_decode() {
        for mode in [Mode::Ms20, Mode::Ms30] {
            let len = mode.profile().block_len;
            let frames = encode_all(mode, &speech_like(len * 6, 3));
            let first = decode_all(&mut IlbcDecoder::new(mode, true), &frames);
            let second = decode_all(&mut IlbcDecoder::new(mode, true), &frames);
            assert_eq!(first, second);
        }
    }

    #[test]
    fn test_lost_frames_always_decode() {
        for mode in [Mode::Ms20, Mode::Ms30] {
            let len = mode.profile().block_len;
            let frames = encode_all(mode, &speech_like(len * 4, 4));
            let mut decoder = IlbcDecoder::new(mode, true);
            let mut out = vec![0i16; len];

            // losses before anything was received
            assert_eq!(decoder.decode(&[], FrameMode::Lost, &mut out), Ok(len));
            assert_eq!(decoder.consecutive_losses(), 1);

            for frame in &frames[..2] {
                decoder.decode(frame, FrameMode::Normal, &mut out).unwrap();
            }
            assert_eq!(decoder.consecutive_losses(), 0);

            for n in 1..=6 {
                assert_eq!(decoder.decode(&[], FrameMode::Lost, &mut out), Ok(len));
                assert_eq!(decoder.consecutive_losses(), n);
            }

            decoder.decode(&frames[2], FrameMode::Normal, &mut out).unwrap();
            assert_eq!(decoder.consecutive_losses(), 0);
            assert_eq!(decoder.concealment_gain(), 1.0);
        }
    }

    #[test]
    fn test_loss_decay() {
        for mode in [Mode::Ms20, Mode::Ms30] {
            let len = mode.profile().block_len;
            let frames = encode_all(mode, &speech_like(len * 5, 5));
            let mut decoder = IlbcDecoder::new(mode, false);
            decode_all(&mut decoder, &frames);

            let mut out = vec![0i16; len];
            let mut gains = Vec::new();
            for _ in 0..6 {
                decoder.decode(&[], FrameMode::Lost, &mut out).unwrap();
                gains.push(decoder.concealment_gain());
            }
            assert!(gains.windows(2).all(|w| w[1] <= w[0]), "{:?}", gains);
            assert!(gains[0] < 1.0);
            assert_eq!(gains[3], 0.0);
        }
    }

    #[test]
    fn test_silence_stability() {
        for mode in [Mode::Ms20, Mode::Ms30] {
            let len = mode.profile().block_len;
            let silence = vec![0i16; len];
            let mut encoder = IlbcEncoder::new(mode);
            let mut decoder = IlbcDecoder::new(mode, true);

            let mut previous: Option<Vec<u8>> = None;
            let mut out = vec![0i16; len];
            for n in 0..30 {
                let mut block = vec![0u8; encoder.frame_bytes()];
                encoder.encode(&silence, &mut block).unwrap();
                decoder.decode(&block, FrameMode::Normal, &mut out).unwrap();

                assert!(out.iter().all(|s| s.abs() <= 8), "frame {}: {:?}", n, out);
                if n > 4 {
                    if let Some(previous) = &previous {
                        assert_eq!(previous, &block, "bitstream drifts at frame {}", n);
                    }
                }
                previous = Some(block);
            }
        }
    }

    #[test]
    fn test_state_continuity() {
        for mode in [Mode::Ms20, Mode::Ms30] {
            let len = mode.profile().block_len;
            let pcm = speech_like(len * 8, 7);
            let frames = encode_all(mode, &pcm);

            // two frames from the middle of the stream
            let pair = &frames[5..7];
            let source = &reference(&pcm)[5 * len..7 * len];

            let mut warm = IlbcDecoder::new(mode, false);
            decode_all(&mut warm, &frames[..5]);
            let continuous = decode_all(&mut warm, pair);

            let mut fresh = Vec::new();
            for frame in pair {
                let mut decoder = IlbcDecoder::new(mode, false);
                fresh.extend(decode_all(&mut decoder, std::slice::from_ref(frame)));
            }

            assert!(
                distortion(source, &continuous) < distortion(source, &fresh),
                "{:?}: continuity does not help",
                mode
            );
        }
    }

    #[test]
    fn test_decoder_params() {
        let mut params = CodecParameters::new();
        assert_eq!(DecoderParams::from_codec_params(&params), Ok(DecoderParams::default()));

        params.with_frames_per_block(160);
        let decode_params = DecoderParams::from_codec_params(&params).unwrap();
        assert_eq!(decode_params.mode, Mode::Ms20);

        let wanted = DecoderParams {
            mode: Mode::Ms30,
            enhancer: false,
        };
        params.with_extra_data(wanted.to_extra_data());
        assert_eq!(DecoderParams::from_codec_params(&params), Ok(wanted));

        params.with_extra_data(Box::new([25u8, 1]));
        assert_eq!(
            DecoderParams::from_codec_params(&params),
            Err(errors::Error::UnsupportedMode(25))
        );
    }

    #[test]
    fn test_symphonia_decoder() {
        let mut params = CodecParameters::new();
        params
            .for_codec(CODEC_TYPE_ILBC)
            .with_extra_data(DecoderParams { mode: Mode::Ms20, enhancer: true }.to_extra_data());
        let mut decoder = Decoder::try_new(&params, &DecoderOptions::default()).unwrap();

        let frames = encode_all(Mode::Ms20, &speech_like(BLOCKL_20MS * 2, 9));
        let packet = Packet::new_from_slice(0, 0, 160, &frames[0]);
        let decoded = decoder.decode(&packet).unwrap();
        assert_eq!(decoded.frames(), BLOCKL_20MS);
        assert_eq!(decoded.spec().rate, SAMPLE_RATE);

        // empty packets are concealed
        let lost = Packet::new_from_slice(0, 160, 160, &[]);
        assert_eq!(decoder.decode(&lost).unwrap().frames(), BLOCKL_20MS);

        let bad = Packet::new_from_slice(0, 320, 160, &frames[1][..20]);
        assert!(matches!(
            decoder.decode(&bad),
            Err(symphonia_core::errors::Error::DecodeError(_))
        ));
        assert_eq!(decoder.last_decoded().frames(), BLOCKL_20MS);
    }
}
