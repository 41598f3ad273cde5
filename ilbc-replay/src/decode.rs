use std::fs::File;
use std::io::{BufWriter, ErrorKind, Read};
use std::path::{Path, PathBuf};

use anyhow::Context;
use byteorder::{LittleEndian, ReadBytesExt};
use clap::ArgMatches;
use log::{info, warn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{CodecParameters, CodecRegistry, DecoderOptions};
use symphonia::core::errors::Error;
use symphonia::core::formats::Packet;
use symphonia_codec_ilbc::consts::SAMPLE_RATE;
use symphonia_codec_ilbc::{Decoder, DecoderParams, CODEC_TYPE_ILBC};

use crate::selected_mode;
use crate::wav::write_wav;

/// Decides which frames reach the decoder.
enum Channel {
    Perfect,
    Random { rng: StdRng, loss: f64 },
    /// Received flags, replayed from the start when exhausted.
    Pattern { flags: Vec<bool>, pos: usize },
}

impl Channel {
    fn received(&mut self) -> bool {
        match self {
            Channel::Perfect => true,
            Channel::Random { rng, loss } => !rng.gen_bool(*loss),
            Channel::Pattern { flags, pos } => {
                let flag = flags[*pos % flags.len()];
                *pos += 1;
                flag
            }
        }
    }
}

/// Channel file of the RFC 3951 test program: one 16-bit little endian
/// flag per frame.
fn read_pattern<R: Read>(mut reader: R) -> anyhow::Result<Vec<bool>> {
    let mut flags = Vec::new();
    loop {
        match reader.read_i16::<LittleEndian>() {
            Ok(flag) => flags.push(flag != 0),
            Err(err) if err.kind() == ErrorKind::UnexpectedEof => break,
            Err(err) => return Err(err.into()),
        }
    }
    Ok(flags)
}

fn open(path: &Path) -> anyhow::Result<File> {
    File::open(path).with_context(|| format!("failed to open {}", path.display()))
}

pub fn decode_file(args: &ArgMatches) -> anyhow::Result<i32> {
    let mode = selected_mode(args)?;
    let input = args.get_one::<PathBuf>("INPUT").context("missing input")?;
    let output = args.get_one::<PathBuf>("OUTPUT").context("missing output")?;

    let mut channel = if let Some(path) = args.get_one::<PathBuf>("loss-file") {
        let flags = read_pattern(open(path)?)?;
        if flags.is_empty() {
            anyhow::bail!("{} holds no frame flags", path.display());
        }
        Channel::Pattern { flags, pos: 0 }
    } else if let Some(&loss) = args.get_one::<f64>("loss") {
        let seed = args.get_one::<u64>("seed").copied().unwrap_or_default();
        Channel::Random { rng: StdRng::seed_from_u64(seed), loss: (loss / 100.0).clamp(0.0, 1.0) }
    } else {
        Channel::Perfect
    };

    let decode_params = DecoderParams { mode, enhancer: !args.get_flag("no-enhancer") };
    let frame_samples = mode.profile().block_len as u64;
    let mut params = CodecParameters::new();
    params
        .for_codec(CODEC_TYPE_ILBC)
        .with_sample_rate(SAMPLE_RATE)
        .with_frames_per_block(frame_samples)
        .with_extra_data(decode_params.to_extra_data());

    let mut registry = CodecRegistry::new();
    registry.register_all::<Decoder>();
    let mut decoder = registry.make(&params, &DecoderOptions::default())?;

    let mut bitstream = Vec::new();
    open(input)?.read_to_end(&mut bitstream)?;
    let frame_bytes = mode.profile().bytes;
    if bitstream.len() % frame_bytes != 0 {
        warn!(
            "{} trailing bytes do not form a {} ms frame",
            bitstream.len() % frame_bytes,
            mode.ms()
        );
    }

    let mut pcm = Vec::new();
    let mut lost = 0;
    for (n, frame) in bitstream.chunks_exact(frame_bytes).enumerate() {
        let ts = n as u64 * frame_samples;
        let packet = if channel.received() {
            Packet::new_from_slice(0, ts, frame_samples, frame)
        } else {
            lost += 1;
            Packet::new_from_slice(0, ts, frame_samples, &[])
        };

        match decoder.decode(&packet) {
            Ok(decoded) => {
                let mut samples = SampleBuffer::<i16>::new(decoded.capacity() as u64, *decoded.spec());
                samples.copy_interleaved_ref(decoded);
                pcm.extend_from_slice(samples.samples());
            }
            Err(Error::DecodeError(err)) => warn!("decode error: {}", err),
            Err(err) => return Err(err.into()),
        }
    }

    let file = File::create(output)
        .with_context(|| format!("failed to create {}", output.display()))?;
    write_wav(BufWriter::new(file), SAMPLE_RATE, &pcm)?;

    info!(
        "decoded {} frames of {} ms into {}, {} lost",
        bitstream.len() / frame_bytes,
        mode.ms(),
        output.display(),
        lost
    );
    Ok(0)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_pattern_channel_repeats() {
        let flags = read_pattern(&[1u8, 0, 0, 0, 1, 0][..]).unwrap();
        assert_eq!(flags, vec![true, false, true]);

        let mut channel = Channel::Pattern { flags, pos: 0 };
        let received: Vec<bool> = (0..5).map(|_| channel.received()).collect();
        assert_eq!(received, vec![true, false, true, true, false]);
    }

    #[test]
    fn test_random_channel_extremes() {
        let mut all = Channel::Random { rng: StdRng::seed_from_u64(1), loss: 0.0 };
        assert!((0..100).all(|_| all.received()));

        let mut none = Channel::Random { rng: StdRng::seed_from_u64(1), loss: 1.0 };
        assert!((0..100).all(|_| !none.received()));
    }
}
