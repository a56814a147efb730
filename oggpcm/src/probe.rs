use std::path::Path;

use tracing::{error, info};

use crate::{error::OggPcmError, pcm::StreamInfo, source::VorbisSource};

/// Reads the sample rate and channel count of an Ogg/Vorbis file.
///
/// The decode handle is released before this function returns. Any failure to
/// open the file as a Vorbis stream is reported as [`OggPcmError::Open`].
pub fn probe(path: impl AsRef<Path>) -> Result<StreamInfo, OggPcmError> {
    let path = path.as_ref();
    let source = VorbisSource::open(path).inspect_err(|err| {
        error!(path = %path.display(), error = %err, "Cannot open OGG file");
    })?;

    let info = source.info();
    info!(
        path = %path.display(),
        sample_rate = info.sample_rate,
        channels = info.channels,
        "OGG info"
    );
    Ok(info)
}
