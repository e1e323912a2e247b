//! Captured or uploaded audio source, prior to decoding.

use std::path::Path;

/// A raw audio byte blob with its declared MIME type.
///
/// Immutable once constructed; the decode stage consumes it exactly once.
#[derive(Debug, Clone)]
pub struct AudioAsset {
    pub bytes: Vec<u8>,
    pub mime: String,
    /// Known duration in seconds, if the capture layer reported one.
    pub duration_hint: Option<f64>,
}

impl AudioAsset {
    pub fn new(bytes: Vec<u8>, mime: impl Into<String>) -> Self {
        Self {
            bytes,
            mime: mime.into(),
            duration_hint: None,
        }
    }

    pub fn with_duration_hint(mut self, secs: f64) -> Self {
        self.duration_hint = Some(secs);
        self
    }

    /// Read an asset from disk, deriving the MIME type from the file extension.
    pub fn from_file(path: &Path) -> std::io::Result<Self> {
        let bytes = std::fs::read(path)?;
        let mime = mime_for_extension(
            path.extension()
                .and_then(|e| e.to_str())
                .unwrap_or_default(),
        );
        Ok(Self::new(bytes, mime))
    }

    /// File extension matching the MIME type, used as a decoder probe hint.
    pub fn extension(&self) -> Option<&'static str> {
        match self.mime.as_str() {
            "audio/wav" | "audio/x-wav" => Some("wav"),
            "audio/mpeg" | "audio/mp3" => Some("mp3"),
            "audio/mp4" | "audio/x-m4a" => Some("m4a"),
            "audio/ogg" => Some("ogg"),
            "audio/flac" => Some("flac"),
            "audio/aac" => Some("aac"),
            "audio/webm" => Some("webm"),
            _ => None,
        }
    }
}

fn mime_for_extension(ext: &str) -> String {
    match ext.to_ascii_lowercase().as_str() {
        "wav" => "audio/wav",
        "mp3" => "audio/mpeg",
        "m4a" | "mp4" => "audio/mp4",
        "ogg" | "oga" => "audio/ogg",
        "flac" => "audio/flac",
        "aac" => "audio/aac",
        "webm" => "audio/webm",
        _ => "application/octet-stream",
    }
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_round_trips_through_mime() {
        let asset = AudioAsset::new(vec![0u8; 4], mime_for_extension("mp3"));
        assert_eq!(asset.mime, "audio/mpeg");
        assert_eq!(asset.extension(), Some("mp3"));
    }

    #[test]
    fn unknown_extension_maps_to_octet_stream() {
        assert_eq!(mime_for_extension("xyz"), "application/octet-stream");
    }
}
