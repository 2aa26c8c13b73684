//! # byteqr
//!
//! A small QR code encoder for byte mode data in versions 1 and 2 (21x21 and
//! 25x25 modules), with Reed-Solomon error correction, penalty scored masking
//! and BCH protected format information.
//!
//! ## Features
//!
//! - **Capacity negotiation**: Picks the smallest version that fits, then relaxes the ec level
//! - **Pluggable parity**: Reed-Solomon by default, any [`ParityCodec`] through `build_with`
//! - **Mask selection**: Scores all eight masks, in parallel with the `parallel` feature
//! - **Logo clearance**: Optional centred 5x5 box in version 2, rejected when the payload no
//!   longer fits around it
//!
//! ## Quick Start
//!
//! ```rust
//! use byteqr::QRBuilder;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! // Only data is required, ec level defaults to ECLevel::L
//! let qr = QRBuilder::new(b"Hello, World!").build()?;
//!
//! println!("{}", qr.to_str(1));
//! # Ok(())
//! # }
//! ```
//!
//! ### Full Configuration
//!
//! ```rust,no_run
//! use byteqr::{ECLevel, MaskPattern, QRBuilder, Version};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let qr = QRBuilder::new(b"Hello, World!")
//!     .version(Version::new(2))    // Pins the version, only the ec level may relax
//!     .ec_level(ECLevel::Q)        // Strongest level to try
//!     .mask(MaskPattern::new(3))   // Skips mask scoring
//!     .build()?;
//!
//! let img = qr.render(4); // 4 pixels per module
//! img.save("configured_qr.png")?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Error Correction Levels
//! - **L (Low)**: ~7% error correction
//! - **M (Medium)**: ~15% error correction
//! - **Q (Quartile)**: ~25% error correction
//! - **H (High)**: ~30% error correction
//!
//! Data that doesn't fit at the requested level in either version is retried
//! at the next weaker level. [`QRError::InputTooLarge`] is returned once level L
//! at version 2 overflows, 32 bytes being the largest payload.

#![allow(clippy::items_after_test_module)]

pub mod builder;
pub(crate) mod common;

pub use builder::{LayoutConfig, QRBuilder, QR};
pub use common::ec::{ParityCodec, ReedSolomon};
pub use common::error::{QRError, QRResult};
pub use common::mask::MaskPattern;
pub use common::metadata::{ECLevel, Module, Version};
