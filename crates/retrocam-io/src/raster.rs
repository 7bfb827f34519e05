//! Raster decoding and encoding.
//!
//! Decoding applies the EXIF orientation so a portrait phone photo is
//! filtered upright. Encoding writes the format the image came in when
//! it can, and JPEG otherwise.

use std::io::Cursor;

use image::{DynamicImage, ImageDecoder, ImageFormat, ImageReader};
use retrocam_pipeline::{FilterError, Raster};

/// Format written when the source format is unknown or not encodable.
pub const FALLBACK_FORMAT: ImageFormat = ImageFormat::Jpeg;

/// Encoded output image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterResult {
    bytes: Vec<u8>,
    format: ImageFormat,
}

impl FilterResult {
    /// The encoded image.
    #[must_use]
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Consume the result, returning the encoded image.
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    /// The format the bytes are encoded in.
    #[must_use]
    pub const fn format(&self) -> ImageFormat {
        self.format
    }

    /// MIME type of the bytes, e.g. `image/png`.
    #[must_use]
    pub fn content_type(&self) -> &'static str {
        self.format.to_mime_type()
    }
}

/// Decode image bytes, guessing the format from the content and
/// applying any EXIF orientation.
///
/// # Errors
///
/// Returns [`FilterError::EmptyInput`] if `bytes` is empty, or
/// [`FilterError::ImageDecode`] if the format is unrecognized or the
/// data is corrupt.
pub fn decode(bytes: &[u8]) -> Result<Raster, FilterError> {
    if bytes.is_empty() {
        return Err(FilterError::EmptyInput);
    }

    let reader = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| FilterError::ImageDecode(image::ImageError::IoError(e)))?;
    let format = reader.format();

    let mut decoder = reader.into_decoder().map_err(FilterError::ImageDecode)?;
    let orientation = decoder.orientation().map_err(FilterError::ImageDecode)?;
    let mut image = DynamicImage::from_decoder(decoder).map_err(FilterError::ImageDecode)?;
    image.apply_orientation(orientation);

    log::debug!(
        "decoded {}x{} {:?} image",
        image.width(),
        image.height(),
        format
    );
    Ok(Raster::from_dynamic(&image).with_format(format))
}

/// The format [`encode`] will write `raster` in.
#[must_use]
pub fn output_format(raster: &Raster) -> ImageFormat {
    raster
        .format()
        .filter(|format| format.writing_enabled())
        .unwrap_or(FALLBACK_FORMAT)
}

/// Encode `raster` in its source format, or JPEG if that is unknown.
///
/// Three-channel rasters, and anything written as JPEG, are encoded as
/// RGB; the rest keep their alpha channel.
///
/// # Errors
///
/// Returns [`FilterError::ImageEncode`] if the encoder rejects the image.
pub fn encode(raster: &Raster) -> Result<FilterResult, FilterError> {
    let format = output_format(raster);
    let rgba = DynamicImage::ImageRgba8(raster.image().clone());
    let image = if format == ImageFormat::Jpeg || !raster.has_alpha() {
        DynamicImage::ImageRgb8(rgba.to_rgb8())
    } else {
        rgba
    };

    let mut bytes = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut bytes), format)
        .map_err(FilterError::ImageEncode)?;
    Ok(FilterResult { bytes, format })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use retrocam_pipeline::RgbaImage;

    use super::*;

    fn png_bytes(image: &DynamicImage) -> Vec<u8> {
        let mut buf = Vec::new();
        image
            .write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
            .unwrap();
        buf
    }

    #[test]
    fn empty_input_is_rejected() {
        assert!(matches!(decode(&[]), Err(FilterError::EmptyInput)));
    }

    #[test]
    fn garbage_is_a_decode_error() {
        assert!(matches!(
            decode(b"definitely not an image"),
            Err(FilterError::ImageDecode(_))
        ));
    }

    #[test]
    fn decode_records_format_and_channels() {
        let rgb = DynamicImage::ImageRgb8(image::RgbImage::from_pixel(5, 4, image::Rgb([1, 2, 3])));
        let raster = decode(&png_bytes(&rgb)).unwrap();
        assert_eq!(raster.format(), Some(ImageFormat::Png));
        assert_eq!(raster.channels(), 3);
        assert_eq!((raster.width(), raster.height()), (5, 4));
        assert_eq!(raster.pixel(0, 0), [1, 2, 3, 255]);
    }

    #[test]
    fn png_round_trip_keeps_alpha() {
        let rgba = RgbaImage::from_pixel(3, 3, image::Rgba([10, 20, 30, 40]));
        let raster = decode(&png_bytes(&DynamicImage::ImageRgba8(rgba))).unwrap();
        let result = encode(&raster).unwrap();
        assert_eq!(result.format(), ImageFormat::Png);
        assert_eq!(result.content_type(), "image/png");
        let back = decode(result.bytes()).unwrap();
        assert_eq!(back.pixel(1, 1), [10, 20, 30, 40]);
        assert_eq!(back.channels(), 4);
    }

    #[test]
    fn unknown_format_falls_back_to_jpeg() {
        let raster = Raster::from_rgba(RgbaImage::from_pixel(8, 8, image::Rgba([200, 100, 50, 128])));
        let result = encode(&raster).unwrap();
        assert_eq!(result.format(), ImageFormat::Jpeg);
        assert_eq!(result.content_type(), "image/jpeg");
        assert_eq!(&result.bytes()[..2], &[0xFF, 0xD8]);
    }

    #[test]
    fn three_channel_sources_are_written_as_rgb() {
        let raster = Raster::filled(4, 4, [9, 9, 9]).with_format(Some(ImageFormat::Png));
        let result = encode(&raster).unwrap();
        let decoded = image::load_from_memory(result.bytes()).unwrap();
        assert_eq!(decoded.color(), image::ColorType::Rgb8);
    }
}
