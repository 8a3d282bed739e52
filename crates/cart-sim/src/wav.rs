//! WAV file export

use crate::error::Result;
use crate::render::RenderReport;
use log::info;
use std::path::Path;

/// Map a unipolar output level onto signed 16-bit, centred on zero
pub fn level_to_i16(level: u16, full_scale: u16) -> i16 {
    if full_scale == 0 {
        return 0;
    }
    let x = level.min(full_scale) as f32 / full_scale as f32;
    ((x * 2.0 - 1.0) * i16::MAX as f32) as i16
}

/// Write levels to a 16-bit mono WAV file
pub fn write_wav_file(
    path: &Path,
    samples: &[u16],
    sample_rate: u32,
    full_scale: u16,
) -> Result<()> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut writer = hound::WavWriter::create(path, spec)?;
    for &level in samples {
        writer.write_sample(level_to_i16(level, full_scale))?;
    }
    writer.finalize()?;

    Ok(())
}

/// Write a render to disk
pub fn export_to_wav<P: AsRef<Path>>(report: &RenderReport, output_path: P) -> Result<()> {
    info!(
        "Writing {} samples to {}",
        report.samples.len(),
        output_path.as_ref().display()
    );
    write_wav_file(
        output_path.as_ref(),
        &report.samples,
        report.sample_rate,
        report.full_scale,
    )
}
