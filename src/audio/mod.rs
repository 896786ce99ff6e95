//! Audio payload types.
//!
//! Capture and playback belong to the hosting environment; this crate only
//! moves encoded audio around. [`AudioClip`] is a transient, single-consumer
//! payload — produced by capture or by the synthesizer, consumed once by
//! playback or by the analysis client, then dropped. Nothing is cached.
//!
//! [`TempClipFile`] is a RAII handoff point for hosts that play audio from
//! a file path: the temp file is deleted on drop, on every exit path.

use std::io::Write;
use std::path::Path;

use tempfile::NamedTempFile;

// ---------------------------------------------------------------------------
// AudioFormat
// ---------------------------------------------------------------------------

/// Encoding tag carried alongside the raw bytes.
///
/// Capture is assumed to deliver WAV; the synthesis service returns MP3.
/// No format negotiation happens anywhere in the crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioFormat {
    Wav,
    Mp3,
}

impl AudioFormat {
    /// MIME type sent to the remote analysis service.
    pub fn mime_type(&self) -> &'static str {
        match self {
            AudioFormat::Wav => "audio/wav",
            AudioFormat::Mp3 => "audio/mpeg",
        }
    }

    /// Conventional file extension, for temp-file handoff.
    pub fn extension(&self) -> &'static str {
        match self {
            AudioFormat::Wav => "wav",
            AudioFormat::Mp3 => "mp3",
        }
    }
}

// ---------------------------------------------------------------------------
// AudioClip
// ---------------------------------------------------------------------------

/// An opaque encoded waveform plus its format tag.
#[derive(Debug, Clone)]
pub struct AudioClip {
    pub bytes: Vec<u8>,
    pub format: AudioFormat,
}

impl AudioClip {
    pub fn new(bytes: Vec<u8>, format: AudioFormat) -> Self {
        Self { bytes, format }
    }

    /// A captured user attempt (assumed WAV, per the capture contract).
    pub fn captured_wav(bytes: Vec<u8>) -> Self {
        Self::new(bytes, AudioFormat::Wav)
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }
}

// ---------------------------------------------------------------------------
// TempClipFile
// ---------------------------------------------------------------------------

/// A clip written to a named temporary file for playback handoff.
///
/// Dropping the value deletes the file. Hold it for as long as the host
/// needs the path.
pub struct TempClipFile {
    file: NamedTempFile,
}

impl TempClipFile {
    /// Write `clip` to a fresh temp file with a matching extension.
    pub fn write(clip: &AudioClip) -> std::io::Result<Self> {
        let mut file = tempfile::Builder::new()
            .prefix("accent-coach-")
            .suffix(&format!(".{}", clip.format.extension()))
            .tempfile()?;
        file.write_all(&clip.bytes)?;
        file.flush()?;
        Ok(Self { file })
    }

    /// Path the host can hand to its audio player.
    pub fn path(&self) -> &Path {
        self.file.path()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mime_types_match_formats() {
        assert_eq!(AudioFormat::Wav.mime_type(), "audio/wav");
        assert_eq!(AudioFormat::Mp3.mime_type(), "audio/mpeg");
    }

    #[test]
    fn captured_clip_is_wav() {
        let clip = AudioClip::captured_wav(vec![1, 2, 3]);
        assert_eq!(clip.format, AudioFormat::Wav);
        assert_eq!(clip.len(), 3);
        assert!(!clip.is_empty());
    }

    #[test]
    fn temp_clip_file_round_trips_bytes() {
        let clip = AudioClip::new(vec![0x49, 0x44, 0x33], AudioFormat::Mp3);
        let tmp = TempClipFile::write(&clip).expect("write temp clip");

        let read_back = std::fs::read(tmp.path()).expect("read temp clip");
        assert_eq!(read_back, clip.bytes);
        assert!(tmp.path().to_string_lossy().ends_with(".mp3"));
    }

    #[test]
    fn temp_clip_file_is_deleted_on_drop() {
        let clip = AudioClip::captured_wav(vec![0u8; 16]);
        let path = {
            let tmp = TempClipFile::write(&clip).expect("write temp clip");
            tmp.path().to_path_buf()
        };
        assert!(!path.exists(), "temp file must be gone after drop");
    }
}
