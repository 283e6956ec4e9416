use image::DynamicImage;

use super::error::ImageError;

/// WebP 单边最大像素数（libwebp 限制）
pub const WEBP_MAX_DIMENSION: u32 = 16383;

/// 将任意栅格图片字节解码后重新编码为有损 WebP。
///
/// - 调色板/灰度/16 位输入统一展开为 8 位真彩色
/// - 带透明通道的输入保留 alpha
pub fn encode_to_webp(bytes: &[u8], quality: u8) -> Result<Vec<u8>, ImageError> {
    let decoded = image::load_from_memory(bytes)
        .map_err(|e| ImageError::InvalidImageData(e.to_string()))?;

    let (w, h) = (decoded.width(), decoded.height());
    if w == 0 || h == 0 {
        return Err(ImageError::InvalidImageData("图片尺寸为 0".to_string()));
    }
    if w > WEBP_MAX_DIMENSION || h > WEBP_MAX_DIMENSION {
        return Err(ImageError::EncodingUnsupported(format!(
            "尺寸 {w}x{h} 超出 WebP 上限 {WEBP_MAX_DIMENSION}x{WEBP_MAX_DIMENSION}"
        )));
    }

    let normalized = normalize_color(decoded);
    let out = encode_lossy(&normalized, quality)?;
    if out.is_empty() {
        return Err(ImageError::EncodingFailed("编码器未产出数据".to_string()));
    }
    Ok(out)
}

fn normalize_color(img: DynamicImage) -> DynamicImage {
    if img.color().has_alpha() {
        match img {
            DynamicImage::ImageRgba8(_) => img,
            other => DynamicImage::ImageRgba8(other.to_rgba8()),
        }
    } else {
        match img {
            DynamicImage::ImageRgb8(_) => img,
            other => DynamicImage::ImageRgb8(other.to_rgb8()),
        }
    }
}

#[cfg(feature = "webp")]
fn encode_lossy(img: &DynamicImage, quality: u8) -> Result<Vec<u8>, ImageError> {
    let encoder = webp::Encoder::from_image(img)
        .map_err(|e| ImageError::EncodingUnsupported(e.to_string()))?;
    let memory = encoder
        .encode_simple(false, f32::from(quality.clamp(1, 100)))
        .map_err(|e| ImageError::EncodingFailed(format!("{e:?}")))?;
    Ok(memory.to_vec())
}

#[cfg(not(feature = "webp"))]
fn encode_lossy(_img: &DynamicImage, _quality: u8) -> Result<Vec<u8>, ImageError> {
    Err(ImageError::EncodingUnsupported(
        "当前构建未启用 webp 特性".to_string(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, Rgba, RgbaImage};
    use std::io::Cursor;

    fn png_with_alpha(w: u32, h: u32) -> Vec<u8> {
        let img = RgbaImage::from_fn(w, h, |x, _| {
            if x < w / 2 {
                Rgba([255, 0, 0, 255])
            } else {
                Rgba([0, 0, 255, 0])
            }
        });
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, ImageFormat::Png).expect("encode png");
        out.into_inner()
    }

    #[cfg(feature = "webp")]
    #[test]
    fn png_is_reencoded_as_webp_with_alpha() {
        let webp = encode_to_webp(&png_with_alpha(32, 16), 80).expect("encode");
        assert_eq!(&webp[0..4], b"RIFF");
        assert_eq!(&webp[8..12], b"WEBP");

        let back = image::load_from_memory_with_format(&webp, ImageFormat::WebP)
            .expect("decode webp");
        assert_eq!((back.width(), back.height()), (32, 16));
        assert!(back.color().has_alpha());
    }

    #[test]
    fn garbage_is_invalid_image_data() {
        let err = encode_to_webp(b"definitely not an image", 80).unwrap_err();
        assert_eq!(err.kind(), "INVALID_IMAGE_DATA");
    }

    #[test]
    fn oversized_dimension_is_encoding_unsupported() {
        let err = encode_to_webp(&png_with_alpha(WEBP_MAX_DIMENSION + 1, 1), 80).unwrap_err();
        assert_eq!(err.kind(), "ENCODING_UNSUPPORTED");
        assert!(matches!(err, ImageError::EncodingUnsupported(_)));
    }

    #[cfg(not(feature = "webp"))]
    #[test]
    fn build_without_webp_reports_encoding_unsupported() {
        let err = encode_to_webp(&png_with_alpha(8, 8), 80).unwrap_err();
        assert_eq!(err.kind(), "ENCODING_UNSUPPORTED");
    }

    #[test]
    fn gray_input_is_expanded_to_rgb() {
        let img = DynamicImage::ImageLuma8(image::GrayImage::new(4, 4));
        let n = normalize_color(img);
        assert!(matches!(n, DynamicImage::ImageRgb8(_)));
    }
}
