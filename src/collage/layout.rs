// SPDX-License-Identifier: GPL-3.0-only

//! Vertical strip composition
//!
//! Lays an ordered frame sequence into a single photo-booth strip: a white
//! frame with header and footer bands, the photos stacked in fixed 4:3 cells,
//! and a dot in each corner. Composition is pure: the same frames and layout
//! always produce the same pixels.

use crate::capture::Frame;
use crate::constants::layout;
use crate::errors::{RenderError, RenderResult};
use image::{imageops, Rgb, RgbImage};

/// Strip background
const STRIP_BG: Rgb<u8> = Rgb([255, 255, 255]);
/// Header/footer band fill
const BAND_FILL: Rgb<u8> = Rgb([248, 248, 248]);
/// Border lines and corner dots
const TRIM: Rgb<u8> = Rgb([229, 231, 235]);

/// Fixed layout parameters for the strip
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollageLayout {
    /// Photo cell size; frames are scaled and center-cropped to cover it
    pub cell_width: u32,
    pub cell_height: u32,
    /// Vertical gap between cells
    pub gap: u32,
    /// Outer margin around everything
    pub margin: u32,
    /// Header and footer band height
    pub band_height: u32,
}

impl Default for CollageLayout {
    fn default() -> Self {
        Self {
            cell_width: layout::CELL_WIDTH,
            cell_height: layout::CELL_HEIGHT,
            gap: layout::CELL_GAP,
            margin: layout::MARGIN,
            band_height: layout::BAND_HEIGHT,
        }
    }
}

impl CollageLayout {
    /// Total strip dimensions for `count` photos
    pub fn strip_size(&self, count: usize) -> (u32, u32) {
        let count = count as u32;
        let width = self.cell_width + 2 * self.margin;
        let height = 2 * self.margin
            + 2 * self.band_height
            + count * self.cell_height
            + count.saturating_sub(1) * self.gap;
        (width, height)
    }

    /// Compose the frames into a single strip image
    ///
    /// Deterministic for a fixed frame sequence and layout: rendering twice
    /// with no intervening change yields pixel-identical output.
    pub fn compose(&self, frames: &[Frame]) -> RenderResult<RgbImage> {
        if frames.is_empty() {
            return Err(RenderError::EmptySequence);
        }
        for (index, frame) in frames.iter().enumerate() {
            if !frame.is_well_formed() {
                return Err(RenderError::BadFrame(format!(
                    "photo {} is {}x{} with {} bytes",
                    index + 1,
                    frame.width,
                    frame.height,
                    frame.data.len()
                )));
            }
        }

        let (width, height) = self.strip_size(frames.len());
        let mut strip = RgbImage::from_pixel(width, height, STRIP_BG);

        // Header and footer bands
        fill_rect(&mut strip, 0, 0, width, self.band_height, BAND_FILL);
        fill_rect(
            &mut strip,
            0,
            height - self.band_height,
            width,
            self.band_height,
            BAND_FILL,
        );

        // Photos, top to bottom in capture order
        for (index, frame) in frames.iter().enumerate() {
            let cell = fit_frame(frame, self.cell_width, self.cell_height);
            let x = self.margin;
            let y = self.band_height
                + self.margin
                + index as u32 * (self.cell_height + self.gap);
            imageops::replace(&mut strip, &cell, x as i64, y as i64);
            draw_rect_outline(&mut strip, x - 1, y - 1, self.cell_width + 2, self.cell_height + 2);
        }

        // Corner dots
        let inset = layout::DOT_INSET;
        let radius = layout::DOT_RADIUS;
        for (cx, cy) in [
            (inset + radius, inset + radius),
            (width - inset - radius, inset + radius),
            (inset + radius, height - inset - radius),
            (width - inset - radius, height - inset - radius),
        ] {
            draw_dot(&mut strip, cx, cy, radius);
        }

        Ok(strip)
    }
}

/// Scale and center-crop a frame to exactly `cell_width` x `cell_height`
fn fit_frame(frame: &Frame, cell_width: u32, cell_height: u32) -> RgbImage {
    let mut source = RgbImage::new(frame.width, frame.height);
    for (x, y, pixel) in source.enumerate_pixels_mut() {
        let (r, g, b) = frame.rgb_at(x, y);
        *pixel = Rgb([r, g, b]);
    }

    // Cover scaling: fill the cell completely, cropping the overflow
    let scale = f64::max(
        cell_width as f64 / frame.width as f64,
        cell_height as f64 / frame.height as f64,
    );
    let scaled_width = ((frame.width as f64 * scale).round() as u32).max(cell_width);
    let scaled_height = ((frame.height as f64 * scale).round() as u32).max(cell_height);

    let resized = imageops::resize(
        &source,
        scaled_width,
        scaled_height,
        imageops::FilterType::Triangle,
    );

    let crop_x = (scaled_width - cell_width) / 2;
    let crop_y = (scaled_height - cell_height) / 2;
    imageops::crop_imm(&resized, crop_x, crop_y, cell_width, cell_height).to_image()
}

/// Fill an axis-aligned rectangle
fn fill_rect(image: &mut RgbImage, x: u32, y: u32, width: u32, height: u32, color: Rgb<u8>) {
    for py in y..(y + height).min(image.height()) {
        for px in x..(x + width).min(image.width()) {
            image.put_pixel(px, py, color);
        }
    }
}

/// Draw a one-pixel rectangle outline
fn draw_rect_outline(image: &mut RgbImage, x: u32, y: u32, width: u32, height: u32) {
    for px in x..(x + width).min(image.width()) {
        if y < image.height() {
            image.put_pixel(px, y, TRIM);
        }
        let bottom = y + height - 1;
        if bottom < image.height() {
            image.put_pixel(px, bottom, TRIM);
        }
    }
    for py in y..(y + height).min(image.height()) {
        if x < image.width() {
            image.put_pixel(x, py, TRIM);
        }
        let right = x + width - 1;
        if right < image.width() {
            image.put_pixel(right, py, TRIM);
        }
    }
}

/// Draw a filled dot
fn draw_dot(image: &mut RgbImage, cx: u32, cy: u32, radius: u32) {
    let r = radius as i64;
    let (cx, cy) = (cx as i64, cy as i64);
    for dy in -r..=r {
        for dx in -r..=r {
            if dx * dx + dy * dy > r * r {
                continue;
            }
            let (px, py) = (cx + dx, cy + dy);
            if px >= 0 && py >= 0 && (px as u32) < image.width() && (py as u32) < image.height() {
                image.put_pixel(px as u32, py as u32, TRIM);
            }
        }
    }
}
