//! Combine distance, bearing, and obstruction into a visibility score.
//!
//! The score is the product of three factors:
//!
//! - `exp(-decay_rate * distance_km)` for distance from the road,
//! - `cos(bearing)` for orientation (bearing `0` faces the road head on),
//! - `1 - obstruction_fraction` for the unobstructed share of the view.
//!
//! The bearing is not folded into a facing deviation first, so bearings past
//! 90 degrees yield a negative angle factor. The final clamp maps every such
//! product to `0`.

use std::fmt;

use thiserror::Error;

/// Decay rate applied per kilometre when none is configured.
pub const DEFAULT_DECAY_RATE: f64 = 0.1;

/// A visibility score in `[0, 1]`; `1` is maximally visible.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct VisibilityScore(f64);

impl VisibilityScore {
    /// Clamp `raw` into `[0, 1]`, mapping non-finite values to `0`.
    #[must_use]
    pub fn sanitise(raw: f64) -> Self {
        if !raw.is_finite() {
            return Self(0.0);
        }
        Self(raw.clamp(0.0, 1.0))
    }

    /// The score as a plain number.
    #[must_use]
    pub const fn value(self) -> f64 {
        self.0
    }
}

impl fmt::Display for VisibilityScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// The three multiplicative factors behind a score, before clamping.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VisibilityFactors {
    /// Exponential distance decay in `(0, 1]` for non-negative distances.
    pub distance: f64,
    /// Cosine of the bearing; negative past 90 degrees.
    pub angle: f64,
    /// Unobstructed share of the view.
    pub obstruction: f64,
}

impl VisibilityFactors {
    /// Raw product of the factors.
    #[must_use]
    #[expect(clippy::float_arithmetic, reason = "the score is a product")]
    pub fn product(&self) -> f64 {
        self.distance * self.angle * self.obstruction
    }
}

/// Errors returned by [`VisibilityScorer::new`].
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum ScorerConfigError {
    /// The decay rate was not a finite, strictly positive number.
    #[error("decay rate must be finite and greater than zero (got {decay_rate})")]
    InvalidDecayRate {
        /// Rejected decay rate.
        decay_rate: f64,
    },
}

/// Scores locations with a fixed distance decay rate.
///
/// # Examples
/// ```
/// use sightline_core::VisibilityScorer;
///
/// let scorer = VisibilityScorer::default();
/// assert_eq!(scorer.score(0.0, 0.0, 0.0).value(), 1.0);
/// // Facing away from the road clamps to zero.
/// assert_eq!(scorer.score(0.0, 180.0, 0.0).value(), 0.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VisibilityScorer {
    decay_rate: f64,
}

impl Default for VisibilityScorer {
    fn default() -> Self {
        Self {
            decay_rate: DEFAULT_DECAY_RATE,
        }
    }
}

impl VisibilityScorer {
    /// Create a scorer with a custom decay rate.
    ///
    /// # Errors
    /// Returns [`ScorerConfigError::InvalidDecayRate`] unless `decay_rate` is
    /// finite and greater than zero.
    pub fn new(decay_rate: f64) -> Result<Self, ScorerConfigError> {
        if !decay_rate.is_finite() || decay_rate <= 0.0 {
            return Err(ScorerConfigError::InvalidDecayRate { decay_rate });
        }
        Ok(Self { decay_rate })
    }

    /// Configured decay rate per kilometre.
    #[must_use]
    pub const fn decay_rate(&self) -> f64 {
        self.decay_rate
    }

    /// Compute the unclamped factors for the given inputs.
    #[must_use]
    #[expect(
        clippy::float_arithmetic,
        reason = "factors are exponential and trigonometric terms"
    )]
    pub fn factors(
        &self,
        distance_km: f64,
        bearing_degrees: f64,
        obstruction_fraction: f64,
    ) -> VisibilityFactors {
        VisibilityFactors {
            distance: (-self.decay_rate * distance_km).exp(),
            angle: bearing_degrees.to_radians().cos(),
            obstruction: 1.0 - obstruction_fraction,
        }
    }

    /// Score a location; the result is always within `[0, 1]`.
    #[must_use]
    pub fn score(
        &self,
        distance_km: f64,
        bearing_degrees: f64,
        obstruction_fraction: f64,
    ) -> VisibilityScore {
        let factors = self.factors(distance_km, bearing_degrees, obstruction_fraction);
        VisibilityScore::sanitise(factors.product())
    }
}
