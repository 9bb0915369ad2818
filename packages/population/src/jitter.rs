//! Bounded Gaussian perturbation of coordinates.

use location_insights_population_models::LatLon;
use rand::Rng;
use rand_distr::{Distribution, Normal};

use crate::ConfigurationError;
use crate::config::validate_jitter;

/// Samples are clamped to this many standard deviations so no point lands
/// implausibly far from its anchor.
pub const JITTER_SIGMA_BOUND: f64 = 3.0;

/// Independent per-axis Gaussian jitter with a hard bound.
#[derive(Debug, Clone, Copy)]
pub struct Jitter {
    normal: Normal<f64>,
    bound: f64,
}

impl Jitter {
    /// # Errors
    ///
    /// Returns [`ConfigurationError::InvalidJitter`] if `std_dev_deg` is
    /// negative or not finite.
    pub fn new(name: &'static str, std_dev_deg: f64) -> Result<Self, ConfigurationError> {
        validate_jitter(name, std_dev_deg)?;
        let normal = Normal::new(0.0, std_dev_deg).map_err(|_| ConfigurationError::InvalidJitter {
            name,
            value: std_dev_deg,
        })?;

        Ok(Self {
            normal,
            bound: std_dev_deg * JITTER_SIGMA_BOUND,
        })
    }

    fn offset<R: Rng>(&self, rng: &mut R) -> f64 {
        self.normal.sample(rng).clamp(-self.bound, self.bound)
    }

    /// Perturbs `origin`, latitude first, keeping the result on the globe.
    pub fn apply<R: Rng>(&self, origin: LatLon, rng: &mut R) -> LatLon {
        let lat = (origin.lat + self.offset(rng)).clamp(-90.0, 90.0);
        let lon = (origin.lon + self.offset(rng)).clamp(-180.0, 180.0);
        LatLon::new(lat, lon)
    }
}
