//! Image dimension probing.

use std::path::Path;

use super::error::ConverterError;
use super::types::ImageInfo;

/// Reads the pixel dimensions of an image from its header.
///
/// Decoding runs on the blocking pool; only the header is parsed. The format
/// is sniffed from the content, falling back to the extension.
pub async fn probe_dimensions(path: &Path) -> Result<ImageInfo, ConverterError> {
    let owned = path.to_path_buf();
    let read_header = move || -> image::ImageResult<(u32, u32)> {
        image::ImageReader::open(&owned)?
            .with_guessed_format()?
            .into_dimensions()
    };

    let (width, height) = tokio::task::spawn_blocking(read_header)
        .await
        .map_err(|e| ConverterError::probe_failed(path, e.to_string()))?
        .map_err(|e| match e {
            image::ImageError::IoError(io) if io.kind() == std::io::ErrorKind::NotFound => {
                ConverterError::InputNotFound {
                    path: path.to_path_buf(),
                }
            }
            other => ConverterError::probe_failed(path, other.to_string()),
        })?;

    Ok(ImageInfo {
        path: path.to_path_buf(),
        width,
        height,
    })
}
