mod camera;
mod upload;

pub use camera::{CameraManager, CameraSource, Frame, TestPatternCamera, CAMERA_HEIGHT, CAMERA_WIDTH};
pub use upload::{load_image_file, UploadedImage};

use thiserror::Error;

/// Failures of the capture layer. None of these are fatal to the session;
/// they degrade to an inert state (camera off, no image loaded).
#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("camera unavailable: {0}")]
    DeviceUnavailable(String),

    #[error("camera is not active")]
    CameraInactive,

    #[error("selected file is not an image")]
    NotAnImage,

    #[error("failed to read image file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to encode frame: {0}")]
    Encode(#[from] image::ImageError),
}
