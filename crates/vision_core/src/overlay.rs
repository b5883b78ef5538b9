use image::{Rgba, RgbaImage, RgbImage};

/// Widen an RGB image to RGBA with a fully opaque alpha channel.
pub fn rgb_to_rgba(img: &RgbImage) -> RgbaImage {
    let (w, h) = img.dimensions();
    RgbaImage::from_fn(w, h, |x, y| {
        let p = img.get_pixel(x, y);
        Rgba([p[0], p[1], p[2], 255])
    })
}

/// Tint every masked pixel with `color`, weighted by the color's alpha.
///
/// `mask` is row-major with one entry per pixel. Unmasked pixels are left
/// untouched; the image alpha channel stays as-is.
pub fn blend_mask(img: &mut RgbaImage, mask: &[bool], color: Rgba<u8>) {
    let (w, h) = img.dimensions();
    assert_eq!(
        mask.len(),
        (w * h) as usize,
        "mask length must match image dimensions"
    );
    let alpha = color[3] as f32 / 255.0;
    for (i, on) in mask.iter().enumerate() {
        if !*on {
            continue;
        }
        let x = (i as u32) % w;
        let y = (i as u32) / w;
        let p = img.get_pixel_mut(x, y);
        for c in 0..3 {
            let base = p[c] as f32;
            let tint = color[c] as f32;
            p[c] = ((1.0 - alpha) * base + alpha * tint).round() as u8;
        }
    }
}
