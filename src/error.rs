use thiserror::Error;

/// Errors surfaced by the library. Parsing never appears here: the decoder
/// skips malformed blocks instead of failing, so only IO and settings
/// handling can go wrong.
#[derive(Error, Debug)]
pub enum SubtickError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid settings file: {path}")]
    SettingsParse {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    #[error("failed to encode settings")]
    SettingsEncode(#[from] toml::ser::Error),
}

/// Result type alias for convenience.
pub type Result<T> = std::result::Result<T, SubtickError>;
