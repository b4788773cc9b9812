use std::fs;
use std::path::Path;

use image::ImageFormat;
use log::info;

use super::CaptureError;

/// A user-supplied still image held in memory until replaced or cleared.
/// The original bytes are kept as-is; they are what gets sent to the
/// classifier and embedded in ledger entries.
#[derive(Debug, Clone)]
pub struct UploadedImage {
    pub bytes: Vec<u8>,
    pub format: ImageFormat,
}

impl UploadedImage {
    /// Validates that the bytes are a decodable image format. Anything else
    /// is rejected up front as a user-facing validation error.
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self, CaptureError> {
        let format = image::guess_format(&bytes).map_err(|_| CaptureError::NotAnImage)?;
        Ok(Self { bytes, format })
    }
}

/// Reads and validates an image file from disk.
pub fn load_image_file(path: &Path) -> Result<UploadedImage, CaptureError> {
    let bytes = fs::read(path)?;
    let image = UploadedImage::from_bytes(bytes)?;
    info!(
        "loaded upload image {} ({} bytes, {:?})",
        path.display(),
        image.bytes.len(),
        image.format
    );
    Ok(image)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::RgbImage;
    use std::io::Cursor;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn png_bytes() -> Vec<u8> {
        let img = RgbImage::from_pixel(8, 8, image::Rgb([200, 40, 40]));
        let mut bytes = Vec::new();
        img.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .unwrap();
        bytes
    }

    #[test]
    fn accepts_png_file() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(&png_bytes()).unwrap();

        let upload = load_image_file(file.path()).unwrap();
        assert_eq!(upload.format, ImageFormat::Png);
        assert!(!upload.bytes.is_empty());
    }

    #[test]
    fn rejects_non_image_file() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"definitely not pixels").unwrap();

        assert!(matches!(
            load_image_file(file.path()),
            Err(CaptureError::NotAnImage)
        ));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        assert!(matches!(
            load_image_file(Path::new("/nonexistent/upload.png")),
            Err(CaptureError::Io(_))
        ));
    }
}
