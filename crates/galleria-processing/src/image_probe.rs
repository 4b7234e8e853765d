//! Image dimension probing
//!
//! Decode-only, in-process. Failure returns `None` and never aborts an
//! upload; RAW formats the `image` crate cannot parse simply get no
//! dimensions.

use galleria_core::Dimensions;
use std::io::Cursor;

pub fn image_dimensions(data: &[u8]) -> Option<Dimensions> {
    let reader = image::ImageReader::new(Cursor::new(data))
        .with_guessed_format()
        .ok()?;
    let (width, height) = reader.into_dimensions().ok()?;
    Some(Dimensions { width, height })
}
