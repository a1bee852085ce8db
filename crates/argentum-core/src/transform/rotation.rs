//! Lossless quarter-turn rotation.
//!
//! Rotation angles are multiples of 90 degrees, so every output pixel is an
//! exact copy of a source pixel and no interpolation is involved. Positive
//! angles are counter-clockwise.
//!
//! For a counter-clockwise quarter turn of a `w` x `h` image the output is
//! `h` x `w` and:
//!
//! ```text
//! dst(y, w - 1 - x) = src(x, y)
//! ```

use super::TransformError;
use crate::decode::DecodedImage;

/// Rotate `image` by `quarter_turns` counter-clockwise quarter turns.
pub fn rotate_quarter_turns(image: &DecodedImage, quarter_turns: u8) -> Result<DecodedImage, TransformError> {
    let turns = quarter_turns % 4;

    // Fast path: no rotation needed
    if turns == 0 {
        super::check_buffer(image)?;
        return Ok(image.clone());
    }

    let rgb = image.to_rgb_image().ok_or(TransformError::InvalidPixelData {
        expected: image.width as usize * image.height as usize * 3,
        actual: image.pixels.len(),
    })?;

    // imageops turns clockwise.
    let rotated = match turns {
        1 => image::imageops::rotate270(&rgb),
        2 => image::imageops::rotate180(&rgb),
        _ => image::imageops::rotate90(&rgb),
    };

    Ok(DecodedImage::from_rgb_image(rotated))
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 2x1 image: red on the left, green on the right.
    fn red_green() -> DecodedImage {
        DecodedImage::new(2, 1, vec![255, 0, 0, 0, 255, 0])
    }

    #[test]
    fn test_no_rotation() {
        let img = red_green();
        assert_eq!(rotate_quarter_turns(&img, 0).unwrap(), img);
        assert_eq!(rotate_quarter_turns(&img, 4).unwrap(), img);
    }

    #[test]
    fn test_counter_clockwise_quarter() {
        // Right edge moves to the top.
        let result = rotate_quarter_turns(&red_green(), 1).unwrap();
        assert_eq!((result.width, result.height), (1, 2));
        assert_eq!(result.pixels, vec![0, 255, 0, 255, 0, 0]);
    }

    #[test]
    fn test_clockwise_quarter() {
        // Left edge moves to the top.
        let result = rotate_quarter_turns(&red_green(), 3).unwrap();
        assert_eq!((result.width, result.height), (1, 2));
        assert_eq!(result.pixels, vec![255, 0, 0, 0, 255, 0]);
    }

    #[test]
    fn test_half_turn() {
        let result = rotate_quarter_turns(&red_green(), 2).unwrap();
        assert_eq!(result.pixels, vec![0, 255, 0, 255, 0, 0]);
        assert_eq!(rotate_quarter_turns(&red_green(), 6).unwrap(), result);
    }

    #[test]
    fn test_invalid_buffer() {
        let img = DecodedImage {
            width: 3,
            height: 3,
            pixels: vec![0; 4],
        };
        assert!(rotate_quarter_turns(&img, 1).is_err());
        assert!(rotate_quarter_turns(&img, 0).is_err());
    }
}
