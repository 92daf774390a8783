//! Blur compositing against the session snapshot
//!
//! Blur regions never sample the live canvas. Every region crops its own
//! rectangle out of the one pre-annotation snapshot and blurs that crop, so
//! moving or resizing a region re-derives the pixels from the same source and
//! repeated edits never compound.

use image::{RgbaImage, imageops};

use crate::domain::Rect;

/// Smallest Gaussian sigma applied; keeps a zero radius from being a no-op copy
const MIN_SIGMA: f32 = 0.5;

/// What a cached blur was derived from
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BlurKey {
    pub snapshot_width: u32,
    pub snapshot_height: u32,
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
    /// Radius in hundredths of a pixel
    pub radius: u32,
}

/// A blurred crop and the scene rectangle it covers
#[derive(Clone, Debug, PartialEq)]
pub struct BlurCache {
    pub key: BlurKey,
    pub image: RgbaImage,
    pub dest: Rect,
}

/// Crop `region` out of `snapshot`, clamped to the snapshot bounds
///
/// Returns the crop and the clamped scene rectangle, or None when the region
/// is empty or lies entirely outside the snapshot.
pub fn crop_clamped(snapshot: &RgbaImage, region: Rect) -> Option<(RgbaImage, Rect)> {
    if region.is_empty() {
        return None;
    }
    let (x, y, width, height) = region.clamp_to_pixels(snapshot.width(), snapshot.height())?;
    let crop = imageops::crop_imm(snapshot, x, y, width, height).to_image();
    Some((
        crop,
        Rect::new(x as f32, y as f32, width as f32, height as f32),
    ))
}

/// Gaussian blur with sigma derived from the region's blur radius
pub fn blur_image(image: &RgbaImage, radius: f32) -> RgbaImage {
    let sigma = (radius / 2.0).max(MIN_SIGMA);
    imageops::blur(image, sigma)
}

/// Return the cached blur for `region`, rebuilding it when the key changed
///
/// `cache` is left untouched when the region is empty or outside the
/// snapshot; callers skip drawing in that case.
pub fn refresh<'c>(
    cache: &'c mut Option<BlurCache>,
    snapshot: &RgbaImage,
    region: Rect,
    radius: f32,
) -> Option<&'c BlurCache> {
    if region.is_empty() {
        return None;
    }
    let (x, y, width, height) = region.clamp_to_pixels(snapshot.width(), snapshot.height())?;
    let key = BlurKey {
        snapshot_width: snapshot.width(),
        snapshot_height: snapshot.height(),
        x,
        y,
        width,
        height,
        radius: (radius.max(0.0) * 100.0).round() as u32,
    };

    let stale = cache.as_ref().is_none_or(|entry| entry.key != key);
    if stale {
        let (crop, dest) = crop_clamped(snapshot, region)?;
        log::debug!(
            "Re-blurring region {}x{} at ({}, {}) radius {}",
            width,
            height,
            x,
            y,
            radius
        );
        *cache = Some(BlurCache {
            key,
            image: blur_image(&crop, radius),
            dest,
        });
    }
    cache.as_ref()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn checkerboard(w: u32, h: u32) -> RgbaImage {
        RgbaImage::from_fn(w, h, |x, y| {
            if (x + y) % 2 == 0 {
                image::Rgba([255, 255, 255, 255])
            } else {
                image::Rgba([0, 0, 0, 255])
            }
        })
    }

    #[test]
    fn test_crop_is_clamped_to_snapshot() {
        let snapshot = checkerboard(20, 20);
        let (crop, dest) = crop_clamped(&snapshot, Rect::new(15.0, -5.0, 30.0, 10.0)).unwrap();
        assert_eq!((crop.width(), crop.height()), (5, 5));
        assert_eq!(dest, Rect::new(15.0, 0.0, 5.0, 5.0));
    }

    #[test]
    fn test_empty_region_is_skipped() {
        let snapshot = checkerboard(20, 20);
        let mut cache = None;
        assert!(refresh(&mut cache, &snapshot, Rect::new(3.0, 3.0, 0.0, 10.0), 4.0).is_none());
        assert!(cache.is_none());
    }

    #[test]
    fn test_blur_does_not_compound_across_edits() {
        let snapshot = checkerboard(40, 40);
        let region = Rect::new(5.0, 5.0, 20.0, 20.0);
        let mut cache = None;
        let first = refresh(&mut cache, &snapshot, region, 6.0).unwrap().clone();

        // Move away and back: the result is re-derived from the same snapshot
        refresh(&mut cache, &snapshot, region.translate(crate::domain::Vector::new(7.0, 3.0)), 6.0);
        let again = refresh(&mut cache, &snapshot, region, 6.0).unwrap();
        assert_eq!(first.image, again.image);
    }

    #[test]
    fn test_blur_smooths_checkerboard() {
        let snapshot = checkerboard(16, 16);
        let blurred = blur_image(&snapshot, 4.0);
        let center = blurred.get_pixel(8, 8);
        assert!(center[0] > 60 && center[0] < 200);
    }
}
