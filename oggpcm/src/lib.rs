//! # oggpcm
//!
//! Ogg/Vorbis probing and decoding to raw PCM files.
//!
//! The crate exposes the two operations a host application needs before handing
//! audio to a platform encoder or player:
//!
//! - [`probe`] reads the sample rate and channel count of the first logical
//!   bitstream.
//! - [`decode_to_pcm`] writes the whole first logical bitstream to a headerless
//!   file of 16-bit little-endian interleaved samples.
//!
//! Both are synchronous and blocking. [`probe_async`] and
//! [`decode_to_pcm_async`] run them on Tokio's blocking pool. Vorbis decoding
//! itself is done by `lewton`.
//!
//! ## Example: probe then decode
//!
//! ```no_run
//! use oggpcm::{decode_to_pcm, probe};
//!
//! fn main() -> Result<(), oggpcm::OggPcmError> {
//!     let info = probe("input.ogg")?;
//!     println!("Sample rate: {} Hz", info.sample_rate);
//!     println!("Channels: {}", info.channels);
//!
//!     let summary = decode_to_pcm("input.ogg", "output.pcm")?;
//!     assert_eq!(summary.bytes_written, summary.frames * info.bytes_per_frame() as u64);
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - `aac`: PCM to AAC/ADTS encoding with `fdk-aac` and the
//!   [`convert_ogg_to_aac`] pipeline.

#[cfg(feature = "aac")]
pub mod aac;
pub mod adts;
#[cfg(feature = "aac")]
pub mod convert;
pub mod decode;
pub mod error;
mod pcm;
mod probe;
pub mod source;
mod task;
pub mod tone;

#[cfg(feature = "aac")]
pub use aac::{encode_pcm_to_aac, AacOptions};
#[cfg(feature = "aac")]
pub use convert::{convert_ogg_to_aac, ConvertError, ConvertOptions};
pub use decode::{decode_to_pcm, decode_to_pcm_with, DecodeOptions, DEFAULT_BUFFER_SIZE};
pub use error::OggPcmError;
pub use pcm::{DecodeSummary, StreamInfo, BITS_PER_SAMPLE};
pub use probe::probe;
pub use source::VorbisSource;
pub use task::{decode_to_pcm_async, probe_async};
