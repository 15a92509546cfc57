// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Receipt image codec — decode uploaded photos into RGBA rasters and encode
// rectified receipts as PNG or JPEG.

use std::path::Path;

use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ImageFormat, RgbaImage};
use scanwerk_core::OutputFormat;
use scanwerk_core::error::{Result, ScanwerkError};
use tracing::{debug, info, instrument};

/// Decode an uploaded photo from raw bytes (JPEG, PNG, WebP, ...).
#[instrument(skip(data), fields(data_len = data.len()))]
pub fn decode(data: &[u8]) -> Result<DynamicImage> {
    let image = image::load_from_memory(data).map_err(|err| {
        ScanwerkError::ImageLoad(format!("failed to decode image: {}", err))
    })?;
    debug!(
        width = image.width(),
        height = image.height(),
        "Image decoded from bytes"
    );
    Ok(image)
}

/// Load a photo from a file path.
#[instrument(skip_all, fields(path = %path.as_ref().display()))]
pub fn open(path: impl AsRef<Path>) -> Result<DynamicImage> {
    let image = image::open(path.as_ref()).map_err(|err| match err {
        image::ImageError::IoError(io_err) => ScanwerkError::Io(io_err),
        other => ScanwerkError::ImageLoad(format!(
            "failed to open {}: {}",
            path.as_ref().display(),
            other
        )),
    })?;
    info!(
        width = image.width(),
        height = image.height(),
        "Image loaded"
    );
    Ok(image)
}

/// Encode a raster in the requested format.
///
/// `jpeg_quality` (1-100) only applies to JPEG. JPEG has no alpha channel, so
/// the raster is flattened to RGB first.
#[instrument(skip(image), fields(width = image.width(), height = image.height()))]
pub fn encode(image: &RgbaImage, format: OutputFormat, jpeg_quality: u8) -> Result<Vec<u8>> {
    let mut buffer = Vec::new();
    match format {
        OutputFormat::Png => {
            let mut cursor = std::io::Cursor::new(&mut buffer);
            image.write_to(&mut cursor, ImageFormat::Png).map_err(|err| {
                ScanwerkError::Encode(format!("PNG encoding failed: {}", err))
            })?;
        }
        OutputFormat::Jpeg => {
            let rgb = DynamicImage::ImageRgba8(image.clone()).to_rgb8();
            let encoder = JpegEncoder::new_with_quality(&mut buffer, jpeg_quality.clamp(1, 100));
            rgb.write_with_encoder(encoder).map_err(|err| {
                ScanwerkError::Encode(format!("JPEG encoding failed: {}", err))
            })?;
        }
    }
    debug!(format = ?format, bytes = buffer.len(), "Image encoded");
    Ok(buffer)
}

/// Encode and write a raster; the format comes from the file extension.
///
/// Extensions other than `png`, `jpg` and `jpeg` are rejected with
/// `UnsupportedFormat` before anything is written.
#[instrument(skip(image), fields(path = %path.as_ref().display()))]
pub fn save(image: &RgbaImage, path: impl AsRef<Path>, jpeg_quality: u8) -> Result<OutputFormat> {
    let path = path.as_ref();
    let ext = path
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or_default();
    let format = OutputFormat::from_extension(ext)?;

    let bytes = encode(image, format, jpeg_quality)?;
    std::fs::write(path, &bytes)?;
    info!(format = ?format, bytes = bytes.len(), "Receipt image saved");
    Ok(format)
}
