//! Async wrappers running the blocking operations on Tokio's blocking pool.

use std::path::PathBuf;

use crate::{
    decode::{decode_to_pcm_with, DecodeOptions},
    error::OggPcmError,
    pcm::{DecodeSummary, StreamInfo},
    probe::probe,
};

/// Runs [`probe`] on the blocking thread pool.
pub async fn probe_async(path: impl Into<PathBuf>) -> Result<StreamInfo, OggPcmError> {
    let path = path.into();
    join("ogg-probe", tokio::task::spawn_blocking(move || probe(path))).await
}

/// Runs [`decode_to_pcm_with`] on the blocking thread pool.
pub async fn decode_to_pcm_async(
    input: impl Into<PathBuf>,
    output: impl Into<PathBuf>,
    options: DecodeOptions,
) -> Result<DecodeSummary, OggPcmError> {
    let input = input.into();
    let output = output.into();
    join(
        "ogg-decode",
        tokio::task::spawn_blocking(move || decode_to_pcm_with(input, output, &options)),
    )
    .await
}

pub(crate) async fn join<T>(
    role: &'static str,
    handle: tokio::task::JoinHandle<Result<T, OggPcmError>>,
) -> Result<T, OggPcmError> {
    match handle.await {
        Ok(res) => res,
        Err(err) => Err(OggPcmError::TaskJoin {
            role,
            details: err.to_string(),
        }),
    }
}
