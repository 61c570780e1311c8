//! CLI command implementations

pub mod apply;
pub mod defaults;
pub mod probe;
pub mod validate;

use anyhow::{Context, Result, bail};
use grade_core::{CHANNELS, ImageBuf};
use grade_ops::GradeParams;
use half::f16;
use std::path::Path;

/// Sample format of a raw buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RawFormat {
    /// 32-bit float.
    F32,
    /// 16-bit half float.
    F16,
}

impl RawFormat {
    /// Bytes per sample.
    pub fn sample_size(self) -> usize {
        match self {
            RawFormat::F32 => 4,
            RawFormat::F16 => 2,
        }
    }
}

/// Loads parameters from `path`, or the defaults when there is none.
pub fn load_params(path: Option<&Path>) -> Result<GradeParams> {
    match path {
        Some(p) => GradeParams::from_yaml_file(p)
            .with_context(|| format!("Failed to load parameters: {}", p.display())),
        None => Ok(GradeParams::default()),
    }
}

/// Decodes a little-endian interleaved RGBA buffer.
pub fn decode_raw(bytes: &[u8], width: u32, height: u32, format: RawFormat) -> Result<ImageBuf> {
    let expected = width as usize * height as usize * CHANNELS * format.sample_size();
    if bytes.len() != expected {
        bail!(
            "Buffer holds {} bytes, expected {} for {}x{} RGBA {:?}",
            bytes.len(),
            expected,
            width,
            height,
            format
        );
    }
    let data: Vec<f32> = match format {
        RawFormat::F32 => bytemuck::pod_collect_to_vec::<u8, u32>(bytes)
            .into_iter()
            .map(|b| f32::from_bits(u32::from_le(b)))
            .collect(),
        RawFormat::F16 => bytemuck::pod_collect_to_vec::<u8, u16>(bytes)
            .into_iter()
            .map(|b| f16::from_bits(u16::from_le(b)).to_f32())
            .collect(),
    };
    Ok(ImageBuf::from_data(width, height, data)?)
}

/// Encodes an image as a little-endian interleaved RGBA buffer.
pub fn encode_raw(img: &ImageBuf, format: RawFormat) -> Vec<u8> {
    match format {
        RawFormat::F32 => {
            let words: Vec<u32> = img.data().iter().map(|v| v.to_bits().to_le()).collect();
            bytemuck::cast_slice(&words).to_vec()
        }
        RawFormat::F16 => {
            let words: Vec<u16> = img.to_f16().into_iter().map(|v| v.to_bits().to_le()).collect();
            bytemuck::cast_slice(&words).to_vec()
        }
    }
}

/// Reads a raw buffer from disk.
pub fn read_raw(path: &Path, width: u32, height: u32, format: RawFormat) -> Result<ImageBuf> {
    let bytes = std::fs::read(path).with_context(|| format!("Failed to read: {}", path.display()))?;
    decode_raw(&bytes, width, height, format)
        .with_context(|| format!("Failed to decode: {}", path.display()))
}

/// Writes a raw buffer to disk.
pub fn write_raw(path: &Path, img: &ImageBuf, format: RawFormat) -> Result<()> {
    std::fs::write(path, encode_raw(img, format))
        .with_context(|| format!("Failed to write: {}", path.display()))
}
