// Crate error type. Every variant states *where* things went wrong.
// Only the shell (window, camera, detector process, config, export) can fail;
// the gesture/tile core degrades to "nothing happens this frame" instead.
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Window init error: {0}")]
    WindowInit(String),

    #[error("Window update error: {0}")]
    WindowUpdate(String),

    #[error("Camera init error: {0}")]
    CameraInit(String),

    #[error("Camera frame error: {0}")]
    CameraFrame(String),

    #[error("Hand detector error: {0}")]
    Detector(String),

    #[error("Export error: {0}")]
    Export(#[from] image::ImageError),

    #[error("Config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config(message.into())
    }

    pub fn detector<S: Into<String>>(message: S) -> Self {
        Self::Detector(message.into())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
