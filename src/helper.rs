//! Undecorated matrix output for debugging and quick previews.

use image::{GrayImage, Luma};

use crate::matrix::ModuleMatrix;

/// Quiet zone, in modules, required around a symbol by scanners.
pub const QUIET_ZONE: u32 = 4;

/// Renders the matrix as block characters, two columns per module, with a quiet zone.
pub fn matrix_to_text(matrix: &ModuleMatrix) -> String {
    let border = QUIET_ZONE as usize;
    let span = matrix.size() + 2 * border;
    let mut out = String::with_capacity(span * (span * 2 * 3 + 1));
    for y in 0..span {
        for x in 0..span {
            let dark = x >= border && y >= border && matrix.is_dark(x - border, y - border);
            out.push_str(if dark { "██" } else { "  " });
        }
        out.push('\n');
    }
    out
}

/// Prints the given matrix to the console.
pub fn print_matrix(matrix: &ModuleMatrix) {
    println!("{}", matrix_to_text(matrix));
}

/// Converts a matrix to a plain black-on-white image.
///
/// # Arguments
///
/// * `matrix` - The module matrix to draw.
/// * `border` - Quiet zone width, in modules.
/// * `scale` - Pixels per module; `0` is treated as `1`.
///
/// # Returns
///
/// A grayscale image `(size + 2 * border) * scale` pixels on each side.
///
/// # Example
///
/// ```rust
/// use qirust_studio::helper::matrix_to_image_buffer;
/// use qirust_studio::matrix::{generate_matrix, EcLevel};
///
/// let matrix = generate_matrix("Hello, World!", EcLevel::M).unwrap();
/// let img = matrix_to_image_buffer(&matrix, 4, 8);
/// assert_eq!(img.width(), (21 + 8) * 8);
/// ```
pub fn matrix_to_image_buffer(matrix: &ModuleMatrix, border: u32, scale: u32) -> GrayImage {
    let scale = scale.max(1);
    let modules = matrix.size() as u32 + 2 * border;
    GrayImage::from_fn(modules * scale, modules * scale, |px, py| {
        let (mx, my) = (px / scale, py / scale);
        let dark = mx >= border
            && my >= border
            && matrix.is_dark((mx - border) as usize, (my - border) as usize);
        if dark {
            Luma([0u8]) // Black
        } else {
            Luma([255u8]) // White
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matrix::{generate_matrix, EcLevel};

    #[test]
    fn test_text_has_quiet_zone() {
        let matrix = generate_matrix("Hello, World!", EcLevel::L).unwrap();
        let text = matrix_to_text(&matrix);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 21 + 8);
        assert!(lines[0].trim().is_empty());
        assert!(lines[4].starts_with("        ██"));
    }

    #[test]
    fn test_image_buffer_pixels() {
        let matrix = generate_matrix("Hello, World!", EcLevel::L).unwrap();
        let img = matrix_to_image_buffer(&matrix, 4, 3);
        assert_eq!(img.dimensions(), (29 * 3, 29 * 3));
        assert_eq!(img.get_pixel(0, 0), &Luma([255]));
        // Top-left finder corner starts right after the quiet zone.
        assert_eq!(img.get_pixel(12, 12), &Luma([0]));
        assert_eq!(img.get_pixel(14, 14), &Luma([0]));
    }

    #[test]
    fn test_generated_image_decodes() {
        let matrix = generate_matrix("https://example.com", EcLevel::M).unwrap();
        let img = matrix_to_image_buffer(&matrix, 4, 6);
        let (w, h) = (img.width() as usize, img.height() as usize);
        let mut prepared =
            rqrr::PreparedImage::prepare_from_greyscale(w, h, |x, y| img.get_pixel(x as u32, y as u32)[0]);
        let grids = prepared.detect_grids();
        assert_eq!(grids.len(), 1);
        let (_, content) = grids[0].decode().unwrap();
        assert_eq!(content, "https://example.com");
    }
}
