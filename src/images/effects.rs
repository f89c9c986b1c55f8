//! Pixel treatments for provisional previews and fade-ins.

use image::{DynamicImage, Rgba, RgbaImage};

/// Blur a provisional preview so it reads as "not final".
pub fn provisional(image: &DynamicImage, sigma: f32) -> DynamicImage {
    if sigma <= 0.0 {
        return image.clone();
    }
    image.blur(sigma)
}

/// Blend `image` toward `background`; `progress` 0.0 is all background,
/// 1.0 is the untouched image.
pub fn fade_frame(image: &DynamicImage, progress: f32, background: [u8; 3]) -> DynamicImage {
    let progress = progress.clamp(0.0, 1.0);
    let source = image.to_rgba8();
    let mut out = RgbaImage::new(source.width(), source.height());

    for (x, y, pixel) in source.enumerate_pixels() {
        let Rgba([r, g, b, a]) = *pixel;
        let mix = |fg: u8, bg: u8| -> u8 {
            let value = f32::from(bg) + (f32::from(fg) - f32::from(bg)) * progress;
            value.round().clamp(0.0, 255.0) as u8
        };
        out.put_pixel(
            x,
            y,
            Rgba([
                mix(r, background[0]),
                mix(g, background[1]),
                mix(b, background[2]),
                a,
            ]),
        );
    }

    DynamicImage::ImageRgba8(out)
}

/// Quantize fade progress so frames can be cached per step.
pub fn fade_step(progress: f32, steps: u8) -> u8 {
    let steps = steps.max(1);
    (progress.clamp(0.0, 1.0) * f32::from(steps)).floor() as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    fn white() -> DynamicImage {
        DynamicImage::ImageRgba8(RgbaImage::from_pixel(2, 2, Rgba([255, 255, 255, 255])))
    }

    #[test]
    fn test_fade_endpoints() {
        let start = fade_frame(&white(), 0.0, [0, 0, 0]).to_rgba8();
        assert_eq!(start.get_pixel(0, 0), &Rgba([0, 0, 0, 255]));

        let end = fade_frame(&white(), 1.0, [0, 0, 0]).to_rgba8();
        assert_eq!(end.get_pixel(1, 1), &Rgba([255, 255, 255, 255]));
    }

    #[test]
    fn test_fade_midpoint() {
        let mid = fade_frame(&white(), 0.5, [55, 55, 55]).to_rgba8();
        assert_eq!(mid.get_pixel(0, 1), &Rgba([155, 155, 155, 255]));
    }

    #[test]
    fn test_provisional_keeps_size() {
        let blurred = provisional(&DynamicImage::new_rgb8(10, 6), 2.0);
        assert_eq!((blurred.width(), blurred.height()), (10, 6));
    }

    #[test]
    fn test_fade_step() {
        assert_eq!(fade_step(0.0, 4), 0);
        assert_eq!(fade_step(0.49, 4), 1);
        assert_eq!(fade_step(1.0, 4), 4);
        assert_eq!(fade_step(2.0, 0), 1);
    }
}
