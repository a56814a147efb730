//! # Ogg/Vorbis to AAC conversion
//!
//! Chains the probe, the PCM decoder and the AAC encoder through a temporary
//! PCM file:
//!
//! ```text
//! input.ogg → probe → decode_to_pcm → temp .pcm → encode_pcm_to_aac → output.aac
//! ```
//!
//! When the probe fails the configured fallback stream parameters are used
//! and the decoder gets the final word on whether the input is usable.

use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::{
    aac::{encode_pcm_to_aac, AacOptions},
    decode::DecodeOptions,
    error::OggPcmError,
    pcm::StreamInfo,
    task::{decode_to_pcm_async, join, probe_async},
};

/// Errors reported by [`convert_ogg_to_aac`].
#[derive(thiserror::Error, Debug)]
pub enum ConvertError {
    #[error("input file does not exist: {}", .0.display())]
    FileNotFound(PathBuf),
    #[error("failed to decode OGG to PCM: {0}")]
    DecodeFailed(#[source] OggPcmError),
    #[error("failed to encode PCM to AAC: {0}")]
    EncodeFailed(#[source] OggPcmError),
    #[error("error processing OGG file: {0}")]
    Processing(#[from] std::io::Error),
    #[error("conversion aborted: {0}")]
    Conversion(#[source] OggPcmError),
}

impl ConvertError {
    /// Short machine-readable code of the failure.
    pub fn code(&self) -> &'static str {
        match self {
            ConvertError::FileNotFound(_) => "FILE_NOT_FOUND",
            ConvertError::DecodeFailed(_) => "DECODE_FAILED",
            ConvertError::EncodeFailed(_) => "ENCODE_FAILED",
            ConvertError::Processing(_) => "PROCESSING_ERROR",
            ConvertError::Conversion(_) => "CONVERSION_ERROR",
        }
    }

    /// Wraps a stage failure, keeping aborted worker tasks apart.
    fn stage(err: OggPcmError, wrap: fn(OggPcmError) -> ConvertError) -> Self {
        match err {
            err @ OggPcmError::TaskJoin { .. } => ConvertError::Conversion(err),
            err => wrap(err),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConvertOptions {
    pub aac: AacOptions,
    pub decode: DecodeOptions,
    /// Stream parameters assumed when the input cannot be probed.
    pub fallback: StreamInfo,
    /// Directory of the intermediate PCM file, the system temp dir if `None`.
    pub temp_dir: Option<PathBuf>,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            aac: AacOptions::default(),
            decode: DecodeOptions::default(),
            fallback: StreamInfo {
                sample_rate: 44_100,
                channels: 2,
            },
            temp_dir: None,
        }
    }
}

/// Converts an Ogg/Vorbis file to an ADTS AAC file and returns the output path.
pub async fn convert_ogg_to_aac(
    input: impl AsRef<Path>,
    output: impl AsRef<Path>,
    options: &ConvertOptions,
) -> Result<PathBuf, ConvertError> {
    let input = input.as_ref().to_path_buf();
    let output = output.as_ref().to_path_buf();

    if !tokio::fs::try_exists(&input).await? {
        return Err(ConvertError::FileNotFound(input));
    }
    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }
    if tokio::fs::try_exists(&output).await? {
        tokio::fs::remove_file(&output).await?;
    }

    info!(input = %input.display(), output = %output.display(), "Starting OGG to AAC conversion");

    // Removed on drop, whatever the outcome.
    let mut builder = tempfile::Builder::new();
    builder.prefix("temp_audio").suffix(".pcm");
    let temp_pcm = match &options.temp_dir {
        Some(dir) => builder.tempfile_in(dir)?,
        None => builder.tempfile()?,
    };
    let pcm_path = temp_pcm.path().to_path_buf();

    let info = match probe_async(input.clone()).await {
        Ok(info) => info,
        Err(err) => {
            warn!(error = %err, fallback = ?options.fallback, "Failed to get audio info, using defaults");
            options.fallback
        }
    };

    let summary = decode_to_pcm_async(input, pcm_path.clone(), options.decode)
        .await
        .map_err(|err| ConvertError::stage(err, ConvertError::DecodeFailed))?;

    let aac = options.aac;
    let target = output.clone();
    let frames = join(
        "aac-encode",
        tokio::task::spawn_blocking(move || encode_pcm_to_aac(pcm_path, target, info, &aac)),
    )
    .await
    .map_err(|err| ConvertError::stage(err, ConvertError::EncodeFailed))?;

    info!(
        output = %output.display(),
        pcm_frames = summary.frames,
        aac_frames = frames,
        "OGG to AAC conversion successful"
    );
    drop(temp_pcm);
    Ok(output)
}
