//! Aggregate detected objects into an obstruction fraction.
//!
//! Every detection contributes its normalised bounding-box area to the total;
//! detections whose label is in the [`BlockingLabels`] set also contribute to
//! the blocked area. Overlapping boxes are summed independently, so two boxes
//! covering the same pixels count twice on both sides of the ratio.

use std::collections::HashSet;

use thiserror::Error;

/// Labels treated as blocking when no override is supplied.
pub const DEFAULT_BLOCKING_LABELS: [&str; 5] = ["car", "person", "tree", "sign", "bush"];

/// Axis-aligned rectangle in normalised image coordinates.
///
/// Components are fractions of image width (`x`) and height (`y`) in
/// `[0, 1]`, with `x0 <= x1` and `y0 <= y1`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    x0: f64,
    y0: f64,
    x1: f64,
    y1: f64,
}

/// Errors returned by [`BoundingBox::new`] and [`BoundingBox::enclosing`].
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum BoundingBoxError {
    /// A component was NaN, infinite, or outside `[0, 1]`.
    #[error("bounding box component {value} is not a normalised coordinate")]
    OutOfRange {
        /// Offending component.
        value: f64,
    },
    /// The minimum corner lies beyond the maximum corner.
    #[error("bounding box corners are inverted")]
    Inverted,
    /// No vertices were supplied.
    #[error("bounding polygon has no vertices")]
    Empty,
}

impl BoundingBox {
    /// Validate and construct a box from its minimum and maximum corners.
    ///
    /// # Errors
    /// Returns [`BoundingBoxError`] when a component is not in `[0, 1]` or the
    /// corners are inverted.
    ///
    /// # Examples
    /// ```
    /// use sightline_core::BoundingBox;
    ///
    /// let bbox = BoundingBox::new(0.1, 0.1, 0.5, 0.5)?;
    /// assert!((bbox.area() - 0.16).abs() < 1e-12);
    /// # Ok::<(), sightline_core::BoundingBoxError>(())
    /// ```
    pub fn new(x0: f64, y0: f64, x1: f64, y1: f64) -> Result<Self, BoundingBoxError> {
        for value in [x0, y0, x1, y1] {
            if !(0.0..=1.0).contains(&value) {
                return Err(BoundingBoxError::OutOfRange { value });
            }
        }
        if x0 > x1 || y0 > y1 {
            return Err(BoundingBoxError::Inverted);
        }
        Ok(Self { x0, y0, x1, y1 })
    }

    /// Smallest box enclosing a polygon given as normalised `(x, y)` vertices.
    ///
    /// # Errors
    /// Returns [`BoundingBoxError::Empty`] for an empty vertex list and
    /// [`BoundingBoxError::OutOfRange`] when a vertex lies outside the frame.
    pub fn enclosing<I>(vertices: I) -> Result<Self, BoundingBoxError>
    where
        I: IntoIterator<Item = (f64, f64)>,
    {
        let mut bounds: Option<(f64, f64, f64, f64)> = None;
        for (x, y) in vertices {
            bounds = Some(match bounds {
                None => (x, y, x, y),
                Some((x0, y0, x1, y1)) => (x0.min(x), y0.min(y), x1.max(x), y1.max(y)),
            });
        }
        let (x0, y0, x1, y1) = bounds.ok_or(BoundingBoxError::Empty)?;
        Self::new(x0, y0, x1, y1)
    }

    /// Minimum corner as `(x0, y0)`.
    #[must_use]
    pub const fn min(&self) -> (f64, f64) {
        (self.x0, self.y0)
    }

    /// Maximum corner as `(x1, y1)`.
    #[must_use]
    pub const fn max(&self) -> (f64, f64) {
        (self.x1, self.y1)
    }

    /// Area as a fraction of the whole frame.
    #[must_use]
    #[expect(
        clippy::float_arithmetic,
        reason = "box area is a product of normalised extents"
    )]
    pub fn area(&self) -> f64 {
        (self.x1 - self.x0) * (self.y1 - self.y0)
    }
}

/// One object reported by the detection collaborator.
#[derive(Debug, Clone, PartialEq)]
pub struct DetectedObject {
    label: String,
    confidence: f64,
    bounding_box: BoundingBox,
}

/// Errors returned by [`DetectedObject::new`].
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum DetectedObjectError {
    /// Confidence was not a finite value in `[0, 1]`.
    #[error("detection confidence {confidence} is outside [0, 1]")]
    InvalidConfidence {
        /// Offending confidence.
        confidence: f64,
    },
}

impl DetectedObject {
    /// Validate and construct a detection.
    ///
    /// # Errors
    /// Returns [`DetectedObjectError::InvalidConfidence`] when `confidence` is
    /// not in `[0, 1]`.
    pub fn new(
        label: impl Into<String>,
        confidence: f64,
        bounding_box: BoundingBox,
    ) -> Result<Self, DetectedObjectError> {
        if !(0.0..=1.0).contains(&confidence) {
            return Err(DetectedObjectError::InvalidConfidence { confidence });
        }
        Ok(Self {
            label: label.into(),
            confidence,
            bounding_box,
        })
    }

    /// Label as reported by the detector.
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Detector confidence in `[0, 1]`.
    #[must_use]
    pub const fn confidence(&self) -> f64 {
        self.confidence
    }

    /// Normalised bounding box.
    #[must_use]
    pub const fn bounding_box(&self) -> &BoundingBox {
        &self.bounding_box
    }
}

/// Case-insensitive set of labels that count as obstructions.
///
/// # Examples
/// ```
/// use sightline_core::BlockingLabels;
///
/// let labels = BlockingLabels::default();
/// assert!(labels.contains("Car"));
/// assert!(!labels.contains("building"));
///
/// let custom = BlockingLabels::from_iter(["Bus", "lamp post"]);
/// assert!(custom.contains("bus"));
/// assert!(!custom.contains("car"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockingLabels {
    labels: HashSet<String>,
}

impl BlockingLabels {
    /// Report whether `label` is blocking, ignoring case.
    #[must_use]
    pub fn contains(&self, label: &str) -> bool {
        self.labels.contains(&label.to_lowercase())
    }

    /// Iterate over the lowercase labels in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.labels.iter().map(String::as_str)
    }

    /// Number of distinct labels.
    #[must_use]
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// Report whether the set is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

impl Default for BlockingLabels {
    fn default() -> Self {
        Self::from_iter(DEFAULT_BLOCKING_LABELS)
    }
}

impl<S: AsRef<str>> FromIterator<S> for BlockingLabels {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            labels: iter
                .into_iter()
                .map(|label| label.as_ref().trim().to_lowercase())
                .filter(|label| !label.is_empty())
                .collect(),
        }
    }
}

/// Summed detection areas and the resulting obstruction fraction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ObstructionReport {
    /// Sum of every detection's box area.
    pub total_area: f64,
    /// Sum of the blocking detections' box areas.
    pub blocked_area: f64,
    /// `blocked_area / total_area`, or `0.0` when nothing was detected.
    pub blocked_fraction: f64,
}

impl ObstructionReport {
    /// Obstruction expressed as a percentage in `[0, 100]`.
    #[must_use]
    #[expect(
        clippy::float_arithmetic,
        reason = "converting a fraction to a percentage"
    )]
    pub fn blocked_percentage(&self) -> f64 {
        self.blocked_fraction * 100.0
    }
}

/// Classifies detections and sums their areas.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ObstructionAggregator {
    blocking: BlockingLabels,
}

impl ObstructionAggregator {
    /// Create an aggregator using the supplied blocking labels.
    #[must_use]
    pub const fn new(blocking: BlockingLabels) -> Self {
        Self { blocking }
    }

    /// Labels this aggregator treats as blocking.
    #[must_use]
    pub const fn blocking_labels(&self) -> &BlockingLabels {
        &self.blocking
    }

    /// Report whether a detection with `label` counts as an obstruction.
    #[must_use]
    pub fn is_blocking(&self, label: &str) -> bool {
        self.blocking.contains(label)
    }

    /// Sum detection areas into an [`ObstructionReport`].
    ///
    /// # Examples
    /// ```
    /// use sightline_core::{BoundingBox, DetectedObject, ObstructionAggregator};
    ///
    /// let car = DetectedObject::new("Car", 0.9, BoundingBox::new(0.1, 0.1, 0.5, 0.5)?)?;
    /// let building = DetectedObject::new("Building", 0.8, BoundingBox::new(0.0, 0.0, 1.0, 1.0)?)?;
    /// let report = ObstructionAggregator::default().aggregate(&[car, building]);
    /// assert!((report.blocked_fraction - 0.16 / 1.16).abs() < 1e-12);
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    #[must_use]
    #[expect(
        clippy::float_arithmetic,
        reason = "obstruction is a ratio of summed areas"
    )]
    pub fn aggregate(&self, objects: &[DetectedObject]) -> ObstructionReport {
        let (total_area, blocked_area) =
            objects
                .iter()
                .fold((0.0_f64, 0.0_f64), |(total, blocked), object| {
                    let area = object.bounding_box().area();
                    if self.is_blocking(object.label()) {
                        (total + area, blocked + area)
                    } else {
                        (total + area, blocked)
                    }
                });
        let blocked_fraction = if total_area > 0.0 {
            (blocked_area / total_area).clamp(0.0, 1.0)
        } else {
            0.0
        };
        ObstructionReport {
            total_area,
            blocked_area,
            blocked_fraction,
        }
    }
}
