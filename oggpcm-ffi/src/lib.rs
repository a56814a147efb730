//! # oggpcm-ffi
//!
//! C ABI over `oggpcm`, consumed by the Android (JNI) and iOS (Objective-C)
//! host plugins.
//!
//! ```c
//! OggPcmAudioInfo info = oggpcm_get_audio_info("/data/voice.ogg");
//! if (info.sample_rate < 0) {
//!     /* not a readable Ogg/Vorbis file */
//! }
//! bool ok = oggpcm_decode_to_pcm("/data/voice.ogg", "/cache/voice.pcm");
//! ```
//!
//! Failures never cross the boundary as panics: probing returns `{-1, -1}`,
//! decoding returns `false`. The reason is logged and kept for the calling
//! thread in `oggpcm_last_error()`.
//!
//! Decode buffer sizes (and, with the `aac` feature, encoder settings) come
//! from `oggpcmconfig`.

#![allow(clippy::missing_safety_doc)]

use std::cell::RefCell;
use std::ffi::{c_char, CStr, CString};
use std::panic::{catch_unwind, UnwindSafe};
use std::path::PathBuf;

use oggpcm::{decode_to_pcm_with, probe, DecodeOptions, StreamInfo};
use oggpcmconfig::get_config;
use tracing::error;
use tracing_subscriber::EnvFilter;

/// Stream parameters returned by `oggpcm_get_audio_info`.
///
/// Both fields are `-1` when the file could not be opened as Ogg/Vorbis.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OggPcmAudioInfo {
    pub sample_rate: i32,
    pub channels: i32,
}

impl OggPcmAudioInfo {
    pub const INVALID: OggPcmAudioInfo = OggPcmAudioInfo {
        sample_rate: -1,
        channels: -1,
    };
}

impl From<StreamInfo> for OggPcmAudioInfo {
    fn from(info: StreamInfo) -> Self {
        match i32::try_from(info.sample_rate) {
            Ok(sample_rate) => OggPcmAudioInfo {
                sample_rate,
                channels: info.channels as i32,
            },
            Err(_) => OggPcmAudioInfo::INVALID,
        }
    }
}

thread_local! {
    static LAST_ERROR: RefCell<Option<CString>> = const { RefCell::new(None) };
}

fn set_last_error(message: &str) {
    LAST_ERROR.with(|e| {
        *e.borrow_mut() = CString::new(message).ok();
    });
}

fn clear_last_error() {
    LAST_ERROR.with(|e| {
        *e.borrow_mut() = None;
    });
}

/// Converts a C path argument. Null and non-UTF-8 strings are rejected.
unsafe fn path_arg(ptr: *const c_char, name: &str) -> Result<PathBuf, String> {
    if ptr.is_null() {
        return Err(format!("{name} is null"));
    }
    CStr::from_ptr(ptr)
        .to_str()
        .map(PathBuf::from)
        .map_err(|_| format!("{name} is not valid UTF-8"))
}

/// Runs `f`, turning an error or a panic into `fallback`.
fn guarded<T, F>(fallback: T, f: F) -> T
where
    F: FnOnce() -> Result<T, String> + UnwindSafe,
{
    clear_last_error();
    match catch_unwind(f) {
        Ok(Ok(value)) => value,
        Ok(Err(message)) => {
            set_last_error(&message);
            fallback
        }
        Err(_) => {
            error!("panic caught at the C boundary");
            set_last_error("internal panic");
            fallback
        }
    }
}

fn decode_options() -> DecodeOptions {
    let config = get_config();
    DecodeOptions {
        buffer_size: config.get_decode_buffer_size(),
        output_buffer_size: config.get_output_buffer_size(),
    }
}

/// Installs a `tracing` subscriber writing to stderr.
///
/// The filter comes from the `logging.level` configuration key. Returns
/// `true` if this call installed the subscriber, `false` if one was already
/// set.
#[no_mangle]
pub extern "C" fn oggpcm_init_logging() -> bool {
    let level = get_config().get_log_level();
    let filter = EnvFilter::try_new(&level).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .is_ok()
}

/// Reads the sample rate and channel count of an Ogg/Vorbis file.
///
/// Returns `{-1, -1}` if the file cannot be opened as Ogg/Vorbis or if
/// `ogg_path` is null or not UTF-8.
#[no_mangle]
pub unsafe extern "C" fn oggpcm_get_audio_info(ogg_path: *const c_char) -> OggPcmAudioInfo {
    let path = path_arg(ogg_path, "ogg_path");
    guarded(OggPcmAudioInfo::INVALID, move || {
        let info = probe(path?).map_err(|err| err.to_string())?;
        Ok(OggPcmAudioInfo::from(info))
    })
}

/// Decodes an Ogg/Vorbis file into raw 16-bit little-endian interleaved PCM.
///
/// `pcm_path` is created or truncated. Returns `true` only if the whole
/// stream was decoded and written. A failed decode may leave a partial file.
#[no_mangle]
pub unsafe extern "C" fn oggpcm_decode_to_pcm(
    ogg_path: *const c_char,
    pcm_path: *const c_char,
) -> bool {
    let input = path_arg(ogg_path, "ogg_path");
    let output = path_arg(pcm_path, "pcm_path");
    guarded(false, move || {
        let (input, output) = (input?, output?);
        decode_to_pcm_with(input, output, &decode_options()).map_err(|err| err.to_string())?;
        Ok(true)
    })
}

/// Returns the reason of the last failure on the calling thread, or null.
///
/// The pointer stays valid until the next `oggpcm_*` call on the same thread
/// and must not be freed.
#[no_mangle]
pub extern "C" fn oggpcm_last_error() -> *const c_char {
    LAST_ERROR.with(|e| match e.borrow().as_ref() {
        Some(cstr) => cstr.as_ptr(),
        None => std::ptr::null(),
    })
}

#[cfg(feature = "aac")]
pub use aac::{oggpcm_convert_to_aac, OggPcmStatus};

#[cfg(feature = "aac")]
mod aac {
    use std::ffi::c_char;

    use oggpcm::{convert_ogg_to_aac, AacOptions, ConvertError, ConvertOptions, StreamInfo};
    use oggpcmconfig::get_config;

    use crate::{decode_options, guarded, path_arg, set_last_error};

    /// Outcome of `oggpcm_convert_to_aac`.
    #[repr(C)]
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum OggPcmStatus {
        Ok = 0,
        InvalidArguments = -1,
        FileNotFound = -2,
        DecodeFailed = -3,
        EncodeFailed = -4,
        ProcessingError = -5,
        ConversionError = -6,
    }

    impl From<&ConvertError> for OggPcmStatus {
        fn from(err: &ConvertError) -> Self {
            match err {
                ConvertError::FileNotFound(_) => OggPcmStatus::FileNotFound,
                ConvertError::DecodeFailed(_) => OggPcmStatus::DecodeFailed,
                ConvertError::EncodeFailed(_) => OggPcmStatus::EncodeFailed,
                ConvertError::Processing(_) => OggPcmStatus::ProcessingError,
                ConvertError::Conversion(_) => OggPcmStatus::ConversionError,
            }
        }
    }

    fn convert_options(bitrate: i32) -> ConvertOptions {
        let config = get_config();
        let bitrate = u32::try_from(bitrate)
            .ok()
            .filter(|b| *b > 0)
            .unwrap_or_else(|| config.get_aac_bitrate());
        ConvertOptions {
            aac: AacOptions { bitrate },
            decode: decode_options(),
            fallback: StreamInfo {
                sample_rate: config.get_fallback_sample_rate(),
                channels: config.get_fallback_channels(),
            },
        }
    }

    /// Converts an Ogg/Vorbis file to an ADTS AAC file.
    ///
    /// `bitrate <= 0` selects the configured default. Blocks until the
    /// conversion has finished.
    #[no_mangle]
    pub unsafe extern "C" fn oggpcm_convert_to_aac(
        ogg_path: *const c_char,
        aac_path: *const c_char,
        bitrate: i32,
    ) -> OggPcmStatus {
        let input = path_arg(ogg_path, "ogg_path");
        let output = path_arg(aac_path, "aac_path");
        guarded(OggPcmStatus::InvalidArguments, move || {
            let (input, output) = (input?, output?);
            let runtime = tokio::runtime::Builder::new_current_thread()
                .build()
                .map_err(|err| err.to_string())?;
            let options = convert_options(bitrate);
            match runtime.block_on(convert_ogg_to_aac(input, output, &options)) {
                Ok(_) => Ok(OggPcmStatus::Ok),
                Err(err) => {
                    set_last_error(&format!("{}: {}", err.code(), err));
                    Ok(OggPcmStatus::from(&err))
                }
            }
        })
    }

}

#[cfg(test)]
mod tests {
    use super::*;
    use std::num::{NonZeroU32, NonZeroU8};

    pub(crate) fn c_path(path: &std::path::Path) -> CString {
        CString::new(path.to_str().unwrap()).unwrap()
    }

    pub(crate) fn last_error() -> Option<String> {
        let ptr = oggpcm_last_error();
        if ptr.is_null() {
            None
        } else {
            Some(unsafe { CStr::from_ptr(ptr) }.to_string_lossy().into_owned())
        }
    }

    pub(crate) fn write_tone(path: &std::path::Path, sample_rate: u32, channels: u8) {
        let interleaved = oggpcm::tone::sine_wave(sample_rate, channels, 0.5, 440.0);
        let planar: Vec<Vec<f32>> = (0..channels as usize)
            .map(|ch| {
                interleaved
                    .iter()
                    .skip(ch)
                    .step_by(channels as usize)
                    .map(|&s| s as f32 / 32768.0)
                    .collect()
            })
            .collect();
        let mut ogg = Vec::new();
        let mut encoder = vorbis_rs::VorbisEncoderBuilder::new(
            NonZeroU32::new(sample_rate).unwrap(),
            NonZeroU8::new(channels).unwrap(),
            &mut ogg,
        )
        .unwrap()
        .build()
        .unwrap();
        encoder.encode_audio_block(&planar).unwrap();
        encoder.finish().unwrap();
        std::fs::write(path, ogg).unwrap();
    }

    #[test]
    fn audio_info_of_valid_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mono.ogg");
        write_tone(&path, 22_050, 1);

        let info = unsafe { oggpcm_get_audio_info(c_path(&path).as_ptr()) };
        assert_eq!(
            info,
            OggPcmAudioInfo {
                sample_rate: 22_050,
                channels: 1
            }
        );
        assert!(last_error().is_none());
    }

    #[test]
    fn audio_info_sentinel_on_failure() {
        let dir = tempfile::tempdir().unwrap();
        let missing = c_path(&dir.path().join("missing.ogg"));

        let info = unsafe { oggpcm_get_audio_info(missing.as_ptr()) };
        assert_eq!(info, OggPcmAudioInfo::INVALID);
        assert!(last_error().is_some());

        let info = unsafe { oggpcm_get_audio_info(std::ptr::null()) };
        assert_eq!(info, OggPcmAudioInfo::INVALID);
        assert_eq!(last_error().as_deref(), Some("ogg_path is null"));
    }

    #[test]
    fn decode_reports_success_and_writes_pcm() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("stereo.ogg");
        let output = dir.path().join("stereo.pcm");
        write_tone(&input, 44_100, 2);

        let ok = unsafe { oggpcm_decode_to_pcm(c_path(&input).as_ptr(), c_path(&output).as_ptr()) };
        assert!(ok);
        let len = std::fs::metadata(&output).unwrap().len();
        assert!(len > 0);
        assert_eq!(len % 4, 0);
    }

    #[test]
    fn decode_reports_failure() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("stereo.ogg");
        write_tone(&input, 44_100, 2);
        let bad_output = dir.path().join("missing_dir").join("out.pcm");

        let ok = unsafe {
            oggpcm_decode_to_pcm(c_path(&input).as_ptr(), c_path(&bad_output).as_ptr())
        };
        assert!(!ok);
        assert!(last_error().unwrap().contains("cannot create PCM file"));

        let ok = unsafe { oggpcm_decode_to_pcm(c_path(&input).as_ptr(), std::ptr::null()) };
        assert!(!ok);
        assert_eq!(last_error().as_deref(), Some("pcm_path is null"));
    }

    #[test]
    fn out_of_range_sample_rate_maps_to_sentinel() {
        let info = OggPcmAudioInfo::from(StreamInfo {
            sample_rate: u32::MAX,
            channels: 2,
        });
        assert_eq!(info, OggPcmAudioInfo::INVALID);
    }

    #[test]
    fn logging_is_installed_once() {
        oggpcm_init_logging();
        assert!(!oggpcm_init_logging());
    }
}
