use std::io::{Result, Write};

use bytemuck::cast_slice;

#[allow(clippy::upper_case_acronyms)]
#[repr(u16)]
#[derive(Clone, Copy, Debug)]
pub enum CompressionCode {
    PCM = 0x0001,
}

/// Write `samples` as a 16-bit mono WAV file.
pub fn write_wav<W: Write>(mut file: W, sr: u32, samples: &[i16]) -> Result<()> {
    let pcm: &[u8] = cast_slice(samples);

    let sft = b"Symphonia ilbc-replay\x00";
    let list_len = 4 + 8 + sft.len() as u32;
    let riff_len = 4 + 8 + 16 + 8 + list_len + 8 + pcm.len() as u32;

    // write file header
    file.write_all(b"RIFF")?;
    file.write_all(&riff_len.to_le_bytes())?;

    file.write_all(b"WAVE")?;

    // write format chunk
    file.write_all(b"fmt ")?;
    file.write_all(&16u32.to_le_bytes())?;

    // compression mode
    file.write_all(&(CompressionCode::PCM as u16).to_le_bytes())?;
    // number of channels, mono
    file.write_all(&1u16.to_le_bytes())?;
    // sample rate
    file.write_all(&sr.to_le_bytes())?;
    // avg bytes per seconds
    file.write_all(&(sr * 2).to_le_bytes())?;
    // block align
    file.write_all(&2u16.to_le_bytes())?;
    // significant bits per sample
    file.write_all(&16u16.to_le_bytes())?;

    // write list chunk
    file.write_all(b"LIST")?;
    file.write_all(&list_len.to_le_bytes())?;

    file.write_all(b"INFO")?;
    file.write_all(b"ISFT")?;
    file.write_all(&(sft.len() as u32).to_le_bytes())?;
    file.write_all(sft)?;

    file.write_all(b"data")?;
    file.write_all(&(pcm.len() as u32).to_le_bytes())?;
    file.write_all(pcm)?;
    file.flush()
}
