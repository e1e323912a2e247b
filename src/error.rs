use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("failed to parse TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("environment variable not found: {0}")]
    EnvVarNotFound(String),
}

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("unrecognized audio container or codec: {0}")]
    UnrecognizedFormat(String),

    #[error("no decodable audio track in source")]
    NoAudioTrack,

    #[error("source track does not declare a sample rate")]
    MissingSampleRate,

    #[error("failed to decode audio packet: {0}")]
    Malformed(String),

    #[error("resampling failed: {0}")]
    Resample(String),
}

#[derive(Debug, Error)]
pub enum EncodeError {
    #[error("WAV write failed: {0}")]
    Write(#[from] hound::Error),

    #[error("WAV header mismatch: declared {declared} data bytes, wrote {actual}")]
    HeaderMismatch { declared: u32, actual: u32 },
}

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("service returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("malformed service response: {0}")]
    MalformedResponse(String),

    #[error("malformed audio payload: {0}")]
    MalformedPayload(String),
}

#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("no input device available")]
    NoInputDevice,

    #[error("failed to query device configs: {0}")]
    DeviceConfig(String),

    #[error("unsupported sample format: {0}")]
    UnsupportedFormat(String),

    #[error("failed to build input stream: {0}")]
    StreamBuild(String),

    #[error("stream error: {0}")]
    Stream(String),
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("store serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum UsageError {
    #[error("plan allowance exceeded: {requested:.1}s requested, {remaining:.1}s remaining")]
    LimitExceeded { requested: f64, remaining: f64 },

    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("empty credentials")]
    EmptyCredentials,
}

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    Encode(#[from] EncodeError),

    #[error("chunk {chunk_index} failed: {source}")]
    Service {
        chunk_index: usize,
        source: ServiceError,
    },

    #[error("speech synthesis failed: {0}")]
    Synthesis(ServiceError),

    #[error("processing cancelled")]
    Cancelled,

    #[error(transparent)]
    Usage(#[from] UsageError),
}
