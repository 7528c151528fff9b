use std::fmt;
use std::str::FromStr;

use thiserror::Error;

const DEFAULT_WIDTH: u32 = 600;
const DEFAULT_HEIGHT: u32 = 300;

/// Requested street-level image dimensions in pixels.
///
/// # Examples
/// ```
/// use sightline_core::ImageSize;
///
/// let size: ImageSize = "640x320".parse()?;
/// assert_eq!((size.width(), size.height()), (640, 320));
/// assert_eq!(ImageSize::default().to_string(), "600x300");
/// # Ok::<(), sightline_core::ImageSizeError>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ImageSize {
    width: u32,
    height: u32,
}

/// Errors returned when constructing or parsing an [`ImageSize`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ImageSizeError {
    /// Either dimension was zero.
    #[error("image dimensions must be non-zero (got {width}x{height})")]
    ZeroDimension {
        /// Requested width.
        width: u32,
        /// Requested height.
        height: u32,
    },
    /// The text was not of the form `WIDTHxHEIGHT`.
    #[error("image size {input:?} must look like WIDTHxHEIGHT")]
    Malformed {
        /// Rejected input.
        input: String,
    },
}

impl ImageSize {
    /// Validate and construct an image size.
    ///
    /// # Errors
    /// Returns [`ImageSizeError::ZeroDimension`] when either side is zero.
    pub const fn new(width: u32, height: u32) -> Result<Self, ImageSizeError> {
        if width == 0 || height == 0 {
            return Err(ImageSizeError::ZeroDimension { width, height });
        }
        Ok(Self { width, height })
    }

    /// Width in pixels.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }
}

impl Default for ImageSize {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
        }
    }
}

impl fmt::Display for ImageSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

impl FromStr for ImageSize {
    type Err = ImageSizeError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let malformed = || ImageSizeError::Malformed {
            input: input.to_owned(),
        };
        let (width, height) = input
            .trim()
            .split_once(['x', 'X'])
            .ok_or_else(malformed)?;
        let parsed_width = width.trim().parse().map_err(|_| malformed())?;
        let parsed_height = height.trim().parse().map_err(|_| malformed())?;
        Self::new(parsed_width, parsed_height)
    }
}

/// A street-level photograph as returned by the imagery collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StreetImage {
    /// Encoded image bytes, typically JPEG.
    pub bytes: Vec<u8>,
    /// MIME type reported by the service, when known.
    pub content_type: Option<String>,
}

impl StreetImage {
    /// Wrap raw bytes without a content type.
    #[must_use]
    pub const fn from_bytes(bytes: Vec<u8>) -> Self {
        Self {
            bytes,
            content_type: None,
        }
    }

    /// Size of the encoded image in bytes.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Report whether the image carries no bytes.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}
