use std::io::Cursor;
use std::sync::{Arc, Mutex};

use image::codecs::jpeg::JpegEncoder;
use image::{imageops, Rgb, RgbImage};
use log::info;

use super::CaptureError;

pub const CAMERA_WIDTH: u32 = 640;
pub const CAMERA_HEIGHT: u32 = 480;

const JPEG_QUALITY: u8 = 85;

/// One captured still, already mirrored and JPEG-encoded.
#[derive(Debug, Clone)]
pub struct Frame {
    pub jpeg: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

/// A live video device. Implementations are synchronous; callers wrap grabs
/// in `spawn_blocking`.
pub trait CameraSource: Send {
    fn open(&mut self, width: u32, height: u32) -> Result<(), CaptureError>;
    fn grab(&mut self) -> Result<RgbImage, CaptureError>;
    fn close(&mut self);
}

struct CameraInner {
    source: Box<dyn CameraSource>,
    active: bool,
}

/// Clonable handle owning the camera lifecycle. The media source is touched
/// by nothing else in the session.
#[derive(Clone)]
pub struct CameraManager {
    inner: Arc<Mutex<CameraInner>>,
}

impl CameraManager {
    pub fn new(source: Box<dyn CameraSource>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(CameraInner {
                source,
                active: false,
            })),
        }
    }

    /// Opens the device at the fixed preview resolution. On failure the
    /// manager stays inactive; there is no automatic retry.
    pub async fn activate(&self) -> Result<(), CaptureError> {
        let inner = Arc::clone(&self.inner);
        tokio::task::spawn_blocking(move || {
            let mut guard = lock(&inner);
            if guard.active {
                return Ok(());
            }
            guard.source.open(CAMERA_WIDTH, CAMERA_HEIGHT)?;
            guard.active = true;
            info!("camera activated at {}x{}", CAMERA_WIDTH, CAMERA_HEIGHT);
            Ok(())
        })
        .await
        .map_err(|err| CaptureError::DeviceUnavailable(err.to_string()))?
    }

    /// Stops the device. Safe to call when already inactive.
    pub fn deactivate(&self) {
        let mut guard = lock(&self.inner);
        if guard.active {
            guard.source.close();
            guard.active = false;
            info!("camera deactivated");
        }
    }

    pub fn is_active(&self) -> bool {
        lock(&self.inner).active
    }

    /// Grabs the current frame, mirrors it horizontally and encodes it as
    /// JPEG. The mirroring is a hard contract: the stored image and the image
    /// sent to the classifier must match the mirrored preview the user sees,
    /// not the raw sensor frame.
    pub async fn snapshot(&self) -> Result<Frame, CaptureError> {
        let inner = Arc::clone(&self.inner);
        tokio::task::spawn_blocking(move || {
            let mut guard = lock(&inner);
            if !guard.active {
                return Err(CaptureError::CameraInactive);
            }
            let raw = guard.source.grab()?;
            drop(guard);

            let mirrored = imageops::flip_horizontal(&raw);
            let (width, height) = mirrored.dimensions();

            let mut jpeg = Vec::new();
            let encoder = JpegEncoder::new_with_quality(Cursor::new(&mut jpeg), JPEG_QUALITY);
            mirrored.write_with_encoder(encoder)?;

            Ok(Frame {
                jpeg,
                width,
                height,
            })
        })
        .await
        .map_err(|err| CaptureError::DeviceUnavailable(err.to_string()))?
    }
}

fn lock(inner: &Arc<Mutex<CameraInner>>) -> std::sync::MutexGuard<'_, CameraInner> {
    inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Synthetic video source for demos and tests: left half dark, right half
/// bright, with a per-frame shifting stripe so consecutive grabs differ.
pub struct TestPatternCamera {
    width: u32,
    height: u32,
    frame_counter: u32,
    opened: bool,
}

impl TestPatternCamera {
    pub fn new() -> Self {
        Self {
            width: 0,
            height: 0,
            frame_counter: 0,
            opened: false,
        }
    }
}

impl Default for TestPatternCamera {
    fn default() -> Self {
        Self::new()
    }
}

impl CameraSource for TestPatternCamera {
    fn open(&mut self, width: u32, height: u32) -> Result<(), CaptureError> {
        self.width = width;
        self.height = height;
        self.opened = true;
        Ok(())
    }

    fn grab(&mut self) -> Result<RgbImage, CaptureError> {
        if !self.opened {
            return Err(CaptureError::CameraInactive);
        }
        self.frame_counter = self.frame_counter.wrapping_add(1);
        let stripe = (self.frame_counter * 8) % self.width.max(1);
        let half = self.width / 2;
        let height = self.height.max(1);

        Ok(RgbImage::from_fn(self.width, self.height, move |x, y| {
            let base = if x < half { 16u8 } else { 224u8 };
            if x == stripe {
                Rgb([255, 255, 255])
            } else {
                let green = ((y * 255) / height) as u8;
                Rgb([base, green, base])
            }
        }))
    }

    fn close(&mut self) {
        self.opened = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A source whose `open` always fails, for exercising activation errors.
    struct BrokenCamera;

    impl CameraSource for BrokenCamera {
        fn open(&mut self, _width: u32, _height: u32) -> Result<(), CaptureError> {
            Err(CaptureError::DeviceUnavailable(
                "permission denied".to_string(),
            ))
        }

        fn grab(&mut self) -> Result<RgbImage, CaptureError> {
            Err(CaptureError::CameraInactive)
        }

        fn close(&mut self) {}
    }

    #[tokio::test]
    async fn activation_failure_leaves_manager_inactive() {
        let manager = CameraManager::new(Box::new(BrokenCamera));
        assert!(manager.activate().await.is_err());
        assert!(!manager.is_active());
        assert!(matches!(
            manager.snapshot().await,
            Err(CaptureError::CameraInactive)
        ));
    }

    #[tokio::test]
    async fn deactivate_is_idempotent() {
        let manager = CameraManager::new(Box::new(TestPatternCamera::new()));
        manager.deactivate();
        manager.activate().await.unwrap();
        manager.deactivate();
        manager.deactivate();
        assert!(!manager.is_active());
    }

    #[tokio::test]
    async fn snapshot_is_mirrored() {
        let manager = CameraManager::new(Box::new(TestPatternCamera::new()));
        manager.activate().await.unwrap();

        let frame = manager.snapshot().await.unwrap();
        assert_eq!(frame.width, CAMERA_WIDTH);
        assert_eq!(frame.height, CAMERA_HEIGHT);

        // The pattern is dark on the left, bright on the right; after
        // mirroring the far-left pixels must be the bright ones. JPEG is
        // lossy, so compare against the midpoint rather than exact values.
        let decoded = image::load_from_memory(&frame.jpeg).unwrap().to_rgb8();
        let left = decoded.get_pixel(2, CAMERA_HEIGHT / 2)[0];
        let right = decoded.get_pixel(CAMERA_WIDTH - 3, CAMERA_HEIGHT / 2)[0];
        assert!(left > 128, "expected mirrored bright half on the left");
        assert!(right < 128, "expected mirrored dark half on the right");
    }
}
