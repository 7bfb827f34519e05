//! Print finishing: the orange date imprint and the instant-film frame.

use ab_glyph::{Font, PxScale, ScaleFont, point};

use crate::types::{Raster, Rgb, RgbaImage};

/// Right and bottom edges of the inked pixels when `text` is laid out at
/// the origin, glyph by glyph, as `imageproc` draws it. `None` when no
/// character has an outline.
fn ink_extent(font: &impl Font, scale: PxScale, text: &str) -> Option<(f32, f32)> {
    let scaled = font.as_scaled(scale);
    let mut pen = 0.0;
    let mut prev = None;
    let mut extent: Option<(f32, f32)> = None;
    for c in text.chars() {
        let id = scaled.glyph_id(c);
        let glyph = id.with_scale_and_position(scale, point(pen, scaled.ascent()));
        pen += scaled.h_advance(id);
        if let Some(outlined) = scaled.outline_glyph(glyph) {
            if let Some(prev) = prev {
                pen += scaled.kern(id, prev);
            }
            prev = Some(id);
            let bounds = outlined.px_bounds();
            extent = Some(extent.map_or((bounds.max.x, bounds.max.y), |(right, bottom)| {
                (right.max(bounds.max.x), bottom.max(bounds.max.y))
            }));
        }
    }
    extent
}

/// Draw `text` in the bottom-right corner so its ink sits `padding`
/// pixels in from the right and bottom edges.
///
/// Alpha is preserved: the glyphs tint the color channels only.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn date_stamp(
    raster: &Raster,
    text: &str,
    padding: u32,
    font_size: f32,
    color: Rgb,
    font: &impl Font,
) -> Raster {
    let scale = PxScale::from(font_size);
    let Some((right, bottom)) = ink_extent(font, scale, text) else {
        return raster.clone();
    };

    let x = i64::from(raster.width()) - right.ceil() as i64 - i64::from(padding);
    let y = i64::from(raster.height()) - bottom.ceil() as i64 - i64::from(padding);
    let clamp = |v: i64| v.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32;

    let [r, g, b] = color;
    let mut canvas = raster.image().clone();
    imageproc::drawing::draw_text_mut(
        &mut canvas,
        image::Rgba([r, g, b, 255]),
        clamp(x),
        clamp(y),
        scale,
        font,
        text,
    );

    for (pixel, original) in canvas.pixels_mut().zip(raster.image().pixels()) {
        pixel.0[3] = original.0[3];
    }
    raster.derive(canvas)
}

/// Mount the photo on an instant-film card.
///
/// The card is `frame_width` wider on the left, right and top, and
/// `frame_width + bottom_extra` taller at the bottom. The photo is copied
/// unchanged to `(frame_width, frame_width)`; the border is opaque
/// `background`.
#[must_use]
pub fn polaroid_frame(raster: &Raster, frame_width: u32, bottom_extra: u32, background: Rgb) -> Raster {
    let width = raster
        .width()
        .saturating_add(frame_width.saturating_mul(2));
    let height = raster
        .height()
        .saturating_add(frame_width)
        .saturating_add(bottom_extra);

    let [r, g, b] = background;
    let mut card = RgbaImage::from_pixel(width, height, image::Rgba([r, g, b, 255]));
    image::imageops::replace(
        &mut card,
        raster.image(),
        i64::from(frame_width),
        i64::from(frame_width),
    );
    raster.derive(card)
}
