//! Scoped decode handle over one Ogg/Vorbis file.
//!
//! [`VorbisSource`] owns the open file and lewton's stream reader for the
//! duration of a probe or decode. It is released when dropped, so every exit
//! path of the operations built on top of it gives the file back.
//!
//! [`VorbisSource::read_pcm`] behaves like libvorbisfile's `ov_read`: it
//! fills the caller's buffer with interleaved little-endian `i16` samples and
//! returns `0` once the stream is exhausted. Samples that did not fit in the
//! caller's buffer are kept for the next call.

use std::{
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
};

use lewton::inside_ogg::OggStreamReader;
use tracing::{debug, trace};

use crate::{
    error::OggPcmError,
    pcm::{extend_le_bytes, StreamInfo},
};

/// Size of the read buffer wrapped around the input file.
const INPUT_BUFFER_SIZE: usize = 64 * 1024;

/// An open decode session on a single Ogg/Vorbis file.
pub struct VorbisSource {
    path: PathBuf,
    reader: OggStreamReader<BufReader<File>>,
    info: StreamInfo,
    serial: u32,
    pending: Vec<u8>,
    offset: usize,
    finished: bool,
}

impl VorbisSource {
    /// Opens `path` and parses the three Vorbis header packets.
    ///
    /// Every failure (missing file, permission problem, not an Ogg container,
    /// not a Vorbis stream, broken headers) is reported as
    /// [`OggPcmError::Open`].
    pub fn open(path: impl AsRef<Path>) -> Result<Self, OggPcmError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|err| OggPcmError::open(path, err))?;
        let reader = OggStreamReader::new(BufReader::with_capacity(INPUT_BUFFER_SIZE, file))
            .map_err(|err| OggPcmError::open(path, err))?;

        let info = StreamInfo {
            sample_rate: reader.ident_hdr.audio_sample_rate,
            channels: reader.ident_hdr.audio_channels,
        };
        if info.sample_rate == 0 || info.channels == 0 {
            return Err(OggPcmError::open(
                path,
                format!(
                    "invalid stream parameters: rate={} channels={}",
                    info.sample_rate, info.channels
                ),
            ));
        }

        let serial = reader.stream_serial();
        debug!(path = %path.display(), serial, "Opened Vorbis source");

        Ok(Self {
            path: path.to_path_buf(),
            reader,
            info,
            serial,
            pending: Vec::new(),
            offset: 0,
            finished: false,
        })
    }

    /// Returns the stream parameters of the first logical bitstream.
    pub fn info(&self) -> StreamInfo {
        self.info
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Copies up to `buf.len()` bytes of decoded PCM into `buf`.
    ///
    /// Returns the number of bytes written, `0` at end of stream.
    pub fn read_pcm(&mut self, buf: &mut [u8]) -> Result<usize, OggPcmError> {
        if buf.is_empty() {
            return Ok(0);
        }

        while self.offset == self.pending.len() {
            if self.finished || !self.decode_next_packet()? {
                return Ok(0);
            }
        }

        let available = &self.pending[self.offset..];
        let n = buf.len().min(available.len());
        buf[..n].copy_from_slice(&available[..n]);
        self.offset += n;
        Ok(n)
    }

    /// Decodes the next audio packet into `pending`.
    ///
    /// Returns `false` once the first logical bitstream is exhausted.
    fn decode_next_packet(&mut self) -> Result<bool, OggPcmError> {
        let samples = match self.reader.read_dec_packet_itl()? {
            Some(samples) => samples,
            None => {
                self.finished = true;
                return Ok(false);
            }
        };

        // Chained files: lewton moves on to the next link transparently.
        if self.reader.stream_serial() != self.serial {
            debug!(
                path = %self.path.display(),
                next_serial = self.reader.stream_serial(),
                "End of first logical bitstream"
            );
            self.finished = true;
            return Ok(false);
        }

        self.pending.clear();
        self.offset = 0;
        extend_le_bytes(&samples, &mut self.pending);
        Ok(true)
    }
}

impl Drop for VorbisSource {
    fn drop(&mut self) {
        trace!(path = %self.path.display(), "Releasing Vorbis source");
    }
}
