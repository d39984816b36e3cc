//! Texture decoding and loading
//!
//! Loaders differ only in how channels are interpreted. Decoding goes through
//! the `image` crate and always converts to the channel layout the target
//! format expects, so the uploaded buffer matches the GL format exactly.
//!
//! A missing or corrupt file is not fatal: the loader logs a warning and
//! returns an empty texture object, which samples as black.

use std::path::Path;

use tracing::{debug, warn};

use crate::device::RenderDevice;
use crate::error::Result;

/// Channel interpretation of a 2D texture
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextureFormat {
    /// Base color with alpha cutout
    Rgba,
    /// Color without alpha
    Rgb,
    /// Single channel mask or roughness
    Red,
    /// sRGB-encoded color, used for cubemap faces
    Srgb,
}

impl TextureFormat {
    pub fn channels(self) -> usize {
        match self {
            TextureFormat::Rgba => 4,
            TextureFormat::Rgb | TextureFormat::Srgb => 3,
            TextureFormat::Red => 1,
        }
    }
}

/// Decoded pixel data ready for upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedImage {
    pub width: u32,
    pub height: u32,
    pub format: TextureFormat,
    pub pixels: Vec<u8>,
}

impl DecodedImage {
    /// Decode an image file into the channel layout of `format`
    pub fn open(path: impl AsRef<Path>, format: TextureFormat) -> Result<Self> {
        let image = image::open(path.as_ref())?;
        let (width, height) = (image.width(), image.height());
        let pixels = match format {
            TextureFormat::Rgba => image.into_rgba8().into_raw(),
            TextureFormat::Rgb | TextureFormat::Srgb => image.into_rgb8().into_raw(),
            TextureFormat::Red => image.into_luma8().into_raw(),
        };

        Ok(Self {
            width,
            height,
            format,
            pixels,
        })
    }
}

/// Decode `path`, logging and returning `None` on failure
fn decode_or_warn(path: &Path, format: TextureFormat) -> Option<DecodedImage> {
    match DecodedImage::open(path, format) {
        Ok(image) => {
            debug!(
                "Loaded texture {} ({}x{}, {:?})",
                path.display(),
                image.width,
                image.height,
                format
            );
            Some(image)
        }
        Err(e) => {
            warn!("Failed to load texture {}: {}", path.display(), e);
            None
        }
    }
}

/// Load a 2D texture with repeat wrapping and trilinear filtering
///
/// Only GL object creation errors are returned. Decode errors are logged
/// and produce an empty texture.
pub fn load_texture<D: RenderDevice>(
    device: &mut D,
    path: impl AsRef<Path>,
    format: TextureFormat,
) -> Result<D::Texture> {
    let image = decode_or_warn(path.as_ref(), format);
    device.create_texture_2d(format, image.as_ref())
}

/// Load six cubemap faces in +X, -X, +Y, -Y, +Z, -Z order
///
/// Each face is stored as sRGB. A face that fails to load is logged and left
/// empty; the remaining faces are still uploaded.
pub fn load_cubemap<D: RenderDevice, P: AsRef<Path>>(
    device: &mut D,
    faces: &[P],
) -> Result<D::Texture> {
    let decoded: Vec<Option<DecodedImage>> = faces
        .iter()
        .map(|face| decode_or_warn(face.as_ref(), TextureFormat::Srgb))
        .collect();
    device.create_cubemap(&decoded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recording::{Command, RecordingDevice};
    use image::{Rgba, RgbaImage};
    use std::sync::{Arc, Mutex};

    fn write_fixture(dir: &Path) -> std::path::PathBuf {
        let path = dir.join("leaf.png");
        let mut img = RgbaImage::new(3, 2);
        for (x, y, pixel) in img.enumerate_pixels_mut() {
            *pixel = Rgba([x as u8 * 80, y as u8 * 100, 200, 128]);
        }
        img.save(&path).unwrap();
        path
    }

    #[test]
    fn test_decode_converts_channels() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_fixture(dir.path());

        let rgba = DecodedImage::open(&path, TextureFormat::Rgba).unwrap();
        assert_eq!((rgba.width, rgba.height), (3, 2));
        assert_eq!(rgba.pixels.len(), 3 * 2 * 4);

        let rgb = DecodedImage::open(&path, TextureFormat::Rgb).unwrap();
        assert_eq!(rgb.pixels.len(), 3 * 2 * 3);

        let red = DecodedImage::open(&path, TextureFormat::Red).unwrap();
        assert_eq!(red.pixels.len(), 3 * 2);
    }

    #[test]
    fn test_decode_missing_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(DecodedImage::open(dir.path().join("nope.png"), TextureFormat::Rgba).is_err());
    }

    #[derive(Clone, Default)]
    struct LogBuffer(Arc<Mutex<Vec<u8>>>);

    impl std::io::Write for LogBuffer {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl LogBuffer {
        fn contents(&self) -> String {
            String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
        }
    }

    /// Run `f` with a subscriber that writes warnings into the returned buffer
    fn capture_warnings(f: impl FnOnce()) -> String {
        let logs = LogBuffer::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .with_max_level(tracing::Level::WARN)
            .finish();
        tracing::subscriber::with_default(subscriber, f);
        logs.contents()
    }

    #[test]
    fn test_missing_texture_logs_warning_and_still_creates_texture() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("absent_leaf.png");
        let mut device = RecordingDevice::default();

        let mut texture = None;
        let logs = capture_warnings(|| {
            texture = Some(load_texture(&mut device, &missing, TextureFormat::Rgba).unwrap());
        });

        assert!(logs.contains("WARN"), "no warning in: {logs}");
        assert!(logs.contains("Failed to load texture"));
        assert!(logs.contains("absent_leaf.png"));

        let id = texture.unwrap();
        assert!(device.commands().contains(&Command::CreateTexture {
            id,
            format: TextureFormat::Rgba,
            uploaded: false,
        }));
    }

    #[test]
    fn test_loaded_texture_logs_no_warning() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_fixture(dir.path());
        let mut device = RecordingDevice::default();

        let logs = capture_warnings(|| {
            load_texture(&mut device, &path, TextureFormat::Rgba).unwrap();
        });

        assert!(logs.is_empty(), "unexpected output: {logs}");
    }

    #[test]
    fn test_missing_cubemap_face_is_reported_per_face() {
        let dir = tempfile::tempdir().unwrap();
        let present = write_fixture(dir.path());
        let faces = [
            present.clone(),
            dir.path().join("left.jpg"),
            present.clone(),
            present.clone(),
            present.clone(),
            present,
        ];
        let mut device = RecordingDevice::default();

        let logs = capture_warnings(|| {
            load_cubemap(&mut device, &faces[..]).unwrap();
        });

        assert_eq!(logs.matches("Failed to load texture").count(), 1);
        assert!(logs.contains("left.jpg"));
        assert!(
            device
                .commands()
                .iter()
                .any(|cmd| matches!(cmd, Command::CreateCubemap { faces_uploaded: 5, .. }))
        );
    }

    #[test]
    fn test_channels() {
        assert_eq!(TextureFormat::Rgba.channels(), 4);
        assert_eq!(TextureFormat::Srgb.channels(), 3);
        assert_eq!(TextureFormat::Red.channels(), 1);
    }
}
