//! The fixed set of named regions for a run.
//!
//! A default registry of 20 Indian cities is embedded at compile time from
//! `regions/india.toml`. Callers can supply their own list (from a config
//! file or code); every list goes through the same validation.

use std::collections::BTreeSet;

use location_insights_population_models::{Region, RegionId};
use serde::Deserialize;

use crate::ConfigurationError;

/// Number of regions in the embedded default registry. Enforced by a test.
#[cfg(test)]
const EXPECTED_DEFAULT_REGION_COUNT: usize = 20;

/// Embedded default region definitions.
const DEFAULT_REGIONS_TOML: &str = include_str!("../regions/india.toml");

#[derive(Deserialize)]
struct RegionFile {
    regions: Vec<Region>,
}

/// Validated, immutable list of regions.
///
/// A region's [`RegionId`] is its position in the list.
#[derive(Debug, Clone, PartialEq)]
pub struct RegionRegistry {
    regions: Vec<Region>,
}

impl RegionRegistry {
    /// Builds a registry from an explicit region list.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigurationError`] if the list is empty, a name is
    /// blank or repeated, a centroid is outside `[-90, 90] x [-180, 180]`,
    /// or a weight is negative or not finite.
    pub fn new(regions: Vec<Region>) -> Result<Self, ConfigurationError> {
        if regions.is_empty() {
            return Err(ConfigurationError::EmptyRegistry);
        }
        if u32::try_from(regions.len()).is_err() {
            return Err(ConfigurationError::TooManyRegions {
                count: regions.len(),
            });
        }

        let mut seen = BTreeSet::new();
        for (index, region) in regions.iter().enumerate() {
            if region.name.trim().is_empty() {
                return Err(ConfigurationError::UnnamedRegion { index });
            }
            if !seen.insert(region.name.as_str()) {
                return Err(ConfigurationError::DuplicateRegion {
                    name: region.name.clone(),
                });
            }
            let lat_ok = region.lat.is_finite() && (-90.0..=90.0).contains(&region.lat);
            let lon_ok = region.lon.is_finite() && (-180.0..=180.0).contains(&region.lon);
            if !lat_ok || !lon_ok {
                return Err(ConfigurationError::InvalidCentroid {
                    name: region.name.clone(),
                    lat: region.lat,
                    lon: region.lon,
                });
            }
            if !region.weight.is_finite() || region.weight < 0.0 {
                return Err(ConfigurationError::InvalidRegionWeight {
                    name: region.name.clone(),
                    weight: region.weight,
                });
            }
        }

        Ok(Self { regions })
    }

    /// Parses a TOML document containing `[[regions]]` tables.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigurationError`] if the document does not parse or
    /// the resulting list fails validation.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigurationError> {
        let file: RegionFile = toml::de::from_str(toml_str)?;
        Self::new(file.regions)
    }

    /// Returns the embedded default registry.
    ///
    /// # Panics
    ///
    /// Panics if the embedded TOML fails to parse or validate. It is a
    /// compile-time constant, so a failure is a development error caught by
    /// the tests below.
    #[must_use]
    pub fn default_registry() -> Self {
        Self::from_toml(DEFAULT_REGIONS_TOML)
            .unwrap_or_else(|e| panic!("Failed to load embedded region registry: {e}"))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.regions.len()
    }

    /// Always `false`: construction rejects empty lists.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    #[must_use]
    pub fn regions(&self) -> &[Region] {
        &self.regions
    }

    #[must_use]
    pub fn get(&self, id: RegionId) -> Option<&Region> {
        self.regions.get(id.index())
    }

    /// Looks up a region's name, if the id belongs to this registry.
    #[must_use]
    pub fn name(&self, id: RegionId) -> Option<&str> {
        self.get(id).map(|r| r.name.as_str())
    }

    /// Finds a region by exact name.
    #[must_use]
    pub fn find(&self, name: &str) -> Option<RegionId> {
        self.regions
            .iter()
            .position(|r| r.name == name)
            .and_then(|i| u32::try_from(i).ok())
            .map(RegionId)
    }

    /// Iterates regions with their ids, in registry order.
    #[allow(clippy::cast_possible_truncation)]
    pub fn iter(&self) -> impl Iterator<Item = (RegionId, &Region)> {
        // Length is checked against u32 in `new`.
        self.regions
            .iter()
            .enumerate()
            .map(|(i, r)| (RegionId(i as u32), r))
    }
}
