//! # qrsym
//!
//! A Rust library for encoding alphanumeric text into QR code symbols.
//!
//! `qrsym` implements the QR Code Model 2 specification for the alphanumeric
//! mode (digits, uppercase letters, and the nine symbols ` $%*+-./:`). It
//! supports versions 1 to 40, four error correction levels, automatic and
//! manual mask selection, and rendering to console art, SVG, and PNG.
//!
//! ## Features
//!
//! - Encode alphanumeric text with automatic version selection.
//! - Support four error correction levels: Low, Medium, Quartile, High.
//! - Automatically boost the error correction level when capacity allows.
//! - Choose a mask pattern automatically by penalty score, or force one.
//! - Render QR codes as ASCII art, SVGs, or grayscale images.
//! - Safe Rust implementation with no unsafe code.
//!
//! ## Installation
//!
//! Add to your `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! qrsym = "0.1" # Replace with the latest version
//! ```
//!
//! ## Example
//!
//! Encode a string and inspect individual modules:
//!
//! ```rust
//! use qrsym::qrcode::{QrCode, QrCodeEcc};
//!
//! let qr = QrCode::encode_text("HELLO WORLD", QrCodeEcc::Low).unwrap();
//! assert_eq!(qr.size(), 21);
//! // Top left corner of the finder pattern is always dark.
//! assert!(qr.get_module(0, 0));
//! ```
//!
//! Render to an SVG string:
//!
//! ```rust
//! use qrsym::helper::encode_to_svg;
//! use qrsym::qrcode::QrCodeEcc;
//!
//! let svg = encode_to_svg("HTTPS://EXAMPLE.COM", QrCodeEcc::Medium).unwrap();
//! assert!(svg.starts_with("<?xml"));
//! ```
//!
//! ## Modules
//!
//! - [`qrcode`]: Core QR code encoding functionality.
//! - [`helper`]: Utilities for rendering QR codes in various formats.

pub mod qrcode;
pub mod helper;
