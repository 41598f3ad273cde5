use std::fs::File;
use std::io::{BufReader, BufWriter, ErrorKind, Read, Write};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use byteorder::{LittleEndian, ReadBytesExt};
use clap::ArgMatches;
use log::{debug, info};
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::DecoderOptions;
use symphonia::core::errors::Error;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use symphonia_codec_ilbc::consts::SAMPLE_RATE;
use symphonia_codec_ilbc::IlbcEncoder;

use crate::{ignore_end_of_stream_error, selected_mode};

/// Raw 16-bit little endian samples.
fn read_raw<R: Read>(mut reader: R) -> anyhow::Result<Vec<i16>> {
    let mut samples = Vec::new();
    loop {
        match reader.read_i16::<LittleEndian>() {
            Ok(sample) => samples.push(sample),
            Err(err) if err.kind() == ErrorKind::UnexpectedEof => break,
            Err(err) => return Err(err.into()),
        }
    }
    Ok(samples)
}

/// First track of any container symphonia can read, which must be 8 kHz
/// mono.
fn read_media(path: &Path) -> anyhow::Result<Vec<i16>> {
    let mut hint = Hint::new();
    if let Some(extension) = path.extension().and_then(|e| e.to_str()) {
        hint.with_extension(extension);
    }

    let file = File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
    let mss = MediaSourceStream::new(Box::new(file), Default::default());
    let probed = symphonia::default::get_probe().format(
        &hint,
        mss,
        &FormatOptions::default(),
        &MetadataOptions::default(),
    )?;
    let mut reader = probed.format;

    let track = reader.default_track().context("no audio track")?;
    let track_id = track.id;
    let rate = track.codec_params.sample_rate;
    let channels = track.codec_params.channels.map(|c| c.count());
    if rate != Some(SAMPLE_RATE) || channels != Some(1) {
        bail!("input must be {} Hz mono, got {:?} Hz with {:?} channels", SAMPLE_RATE, rate, channels);
    }

    let mut decoder =
        symphonia::default::get_codecs().make(&track.codec_params, &DecoderOptions::default())?;

    let mut samples = Vec::new();
    let result = loop {
        let packet = match reader.next_packet() {
            Ok(packet) => packet,
            Err(err) => break Err(err),
        };
        if packet.track_id() != track_id {
            continue;
        }

        match decoder.decode(&packet) {
            Ok(decoded) => {
                let mut buf = SampleBuffer::<i16>::new(decoded.capacity() as u64, *decoded.spec());
                buf.copy_interleaved_ref(decoded);
                samples.extend_from_slice(buf.samples());
            }
            Err(Error::DecodeError(err)) => debug!("decode error: {}", err),
            Err(err) => break Err(err),
        }
    };
    ignore_end_of_stream_error(result)?;

    Ok(samples)
}

pub fn encode_file(args: &ArgMatches) -> anyhow::Result<i32> {
    let mode = selected_mode(args)?;
    let input = args.get_one::<PathBuf>("INPUT").context("missing input")?;
    let output = args.get_one::<PathBuf>("OUTPUT").context("missing output")?;

    let raw = matches!(
        input.extension().and_then(|e| e.to_str()),
        Some("pcm") | Some("raw")
    );
    let mut pcm = if raw {
        let file =
            File::open(input).with_context(|| format!("failed to open {}", input.display()))?;
        read_raw(BufReader::new(file))?
    } else {
        read_media(input)?
    };

    let mut encoder = IlbcEncoder::new(mode);
    let frame_samples = encoder.frame_samples();

    // the last frame is completed with silence
    let frames = (pcm.len() + frame_samples - 1) / frame_samples;
    pcm.resize(frames * frame_samples, 0);

    let mut file = BufWriter::new(
        File::create(output).with_context(|| format!("failed to create {}", output.display()))?,
    );
    let mut block = vec![0u8; encoder.frame_bytes()];
    for frame in pcm.chunks(frame_samples) {
        let written = encoder.encode(frame, &mut block)?;
        file.write_all(&block[..written])?;
    }
    file.flush()?;

    info!("encoded {} frames of {} ms into {}", frames, mode.ms(), output.display());
    Ok(0)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_read_raw() {
        let bytes = [0x01, 0x00, 0xff, 0xff, 0x00, 0x80, 0x7f];
        // a trailing odd byte is ignored
        assert_eq!(read_raw(&bytes[..]).unwrap(), vec![1, -1, i16::MIN]);
    }
}
