//! Utilities for rendering an encoded QR code symbol.
//!
//! Everything in this module consumes only [`QrCode::size`] and
//! [`QrCode::get_module`]; the encoding core has no knowledge of any output
//! format.

use crate::qrcode::{Error, QrCode, QrCodeEcc};

use image::{GrayImage, ImageBuffer, Luma};
use std::path::Path;

/// Returns a string of SVG code for an image depicting the given QR code,
/// with the given number of border modules.
///
/// The string always uses Unix newlines (\n), regardless of the platform.
///
/// # Panics
///
/// Panics if `border` is negative.
pub fn to_svg_string(qr: &QrCode, border: i32) -> String {
    assert!(border >= 0, "Border must be non-negative");
    let mut result = String::new();
    result += "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n";
    result += "<!DOCTYPE svg PUBLIC \"-//W3C//DTD SVG 1.1//EN\" \"http://www.w3.org/Graphics/SVG/1.1/DTD/svg11.dtd\">\n";
    let dimension = qr.size() + border * 2;
    result += &format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" version=\"1.1\" viewBox=\"0 0 {0} {0}\" stroke=\"none\">\n",
        dimension
    );
    result += "\t<rect width=\"100%\" height=\"100%\" fill=\"#FFFFFF\"/>\n";
    result += "\t<path d=\"";
    for y in 0..qr.size() {
        for x in 0..qr.size() {
            if qr.get_module(x, y) {
                if x != 0 || y != 0 {
                    result += " ";
                }
                result += &format!("M{},{}h1v1h-1z", x + border, y + border);
            }
        }
    }
    result += "\" fill=\"#000000\"/>\n";
    result += "</svg>\n";
    result
}

/// Prints the given QR code to the console as blocks, with a quiet zone of
/// four border modules.
pub fn print_qr(qr: &QrCode) {
    let border: i32 = 4;
    for y in -border..qr.size() + border {
        for x in -border..qr.size() + border {
            let c: char = if qr.get_module(x, y) { '█' } else { ' ' };
            print!("{0}{0}", c);
        }
        println!();
    }
    println!();
}

/// Renders the given QR code as a grayscale image: each module becomes a
/// `scale`-by-`scale` block of black or white pixels, surrounded by `border`
/// modules of white quiet zone.
///
/// # Panics
///
/// Panics if `scale` is zero.
pub fn to_image(qr: &QrCode, scale: u32, border: u32) -> GrayImage {
    assert!(scale > 0, "Scale must be positive");
    let dimension = (qr.size() as u32 + border * 2) * scale;
    let mut img: GrayImage = ImageBuffer::new(dimension, dimension);
    for (x, y, pixel) in img.enumerate_pixels_mut() {
        let qr_x = (x / scale) as i32 - border as i32;
        let qr_y = (y / scale) as i32 - border as i32;
        *pixel = if qr.get_module(qr_x, qr_y) {
            Luma([0u8]) // Black
        } else {
            Luma([255u8]) // White
        };
    }
    img
}

/// Renders the given QR code with [`to_image`] and saves it as a PNG file.
///
/// # Errors
///
/// Returns an [`image::ImageError`] if the file cannot be written.
pub fn save_png<P: AsRef<Path>>(
    qr: &QrCode,
    path: P,
    scale: u32,
    border: u32,
) -> Result<(), image::ImageError> {
    to_image(qr, scale, border).save(path)
}

/// Encodes the given text and returns the SVG for the resulting symbol with
/// a four-module quiet zone.
///
/// # Errors
///
/// Returns [`Error`] if the text cannot be encoded.
///
/// # Example
///
/// ```rust
/// use qrsym::helper::encode_to_svg;
/// use qrsym::qrcode::QrCodeEcc;
///
/// let svg = encode_to_svg("HELLO WORLD", QrCodeEcc::Low).unwrap();
/// assert!(svg.starts_with("<?xml"));
/// ```
pub fn encode_to_svg(text: &str, ecl: QrCodeEcc) -> Result<String, Error> {
    let qr = QrCode::encode_text(text, ecl)?;
    Ok(to_svg_string(&qr, 4))
}

/// Encodes the given text and renders it as a grayscale image.
///
/// # Errors
///
/// Returns [`Error`] if the text cannot be encoded.
///
/// # Example
///
/// ```rust
/// use qrsym::helper::encode_to_image;
/// use qrsym::qrcode::QrCodeEcc;
///
/// let img = encode_to_image("HELLO WORLD", QrCodeEcc::Low, 1, 4).unwrap();
/// assert_eq!(img.dimensions(), (29, 29));
/// ```
pub fn encode_to_image(
    text: &str,
    ecl: QrCodeEcc,
    scale: u32,
    border: u32,
) -> Result<GrayImage, Error> {
    let qr = QrCode::encode_text(text, ecl)?;
    Ok(to_image(&qr, scale, border))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_svg_string() {
        let qr = QrCode::encode_text("HELLO WORLD", QrCodeEcc::Low).unwrap();
        let svg = to_svg_string(&qr, 4);
        assert!(svg.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
        assert!(svg.contains("viewBox=\"0 0 29 29\""));
        assert!(svg.ends_with("</svg>\n"));
    }

    #[test]
    fn test_to_image_dimensions() {
        let qr = QrCode::encode_text("HELLO WORLD", QrCodeEcc::Low).unwrap();
        // 21 modules plus 4 border modules on each side
        assert_eq!(to_image(&qr, 1, 4).dimensions(), (29, 29));
        // Each module becomes a 4x4 pixel block
        assert_eq!(to_image(&qr, 4, 2).dimensions(), (100, 100));
    }

    #[test]
    fn test_to_image_palette() {
        let qr = QrCode::encode_text("HELLO WORLD", QrCodeEcc::Low).unwrap();
        let img = to_image(&qr, 1, 0);
        // Top left finder corner is dark, and every pixel is pure black or white
        assert_eq!(img.get_pixel(0, 0), &Luma([0u8]));
        assert!(img.pixels().all(|p| p[0] == 0 || p[0] == 255));
    }

    #[test]
    fn test_encode_to_image_rejects_bad_text() {
        assert!(encode_to_image("hello", QrCodeEcc::Low, 1, 4).is_err());
    }
}
