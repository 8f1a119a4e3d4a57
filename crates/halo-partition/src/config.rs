//! Halo configuration parameters.

use crate::error::PartitionError;

/// Per-axis halo and discretization settings shared by every partition.
///
/// Validated with [`validate`](Self::validate) before building a
/// [`HaloLayout`](crate::HaloLayout).
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HaloConfig {
    /// Area of interest: how many grid units beyond its owned bounds each
    /// partition mirrors from its neighbours, per axis.
    ///
    /// Default: [`DEFAULT_AOI`](Self::DEFAULT_AOI) on two axes. Must be
    /// non-negative.
    pub aoi: Vec<i32>,

    /// Cell width of continuous storages built for this layout, per axis.
    ///
    /// Default: [`DEFAULT_DISCRETIZATION`](Self::DEFAULT_DISCRETIZATION) on
    /// two axes. Must be finite and positive. A width close to the typical
    /// query radius keeps proximity scans to a few cells.
    pub discretization: Vec<f64>,
}

impl HaloConfig {
    /// Default area of interest in grid units.
    pub const DEFAULT_AOI: i32 = 1;

    /// Default continuous cell width in world units.
    pub const DEFAULT_DISCRETIZATION: f64 = 1.0;

    /// Same `aoi` and `discretization` on every one of `ndim` axes.
    pub fn uniform(ndim: usize, aoi: i32, discretization: f64) -> Self {
        Self {
            aoi: vec![aoi; ndim],
            discretization: vec![discretization; ndim],
        }
    }

    /// Check that both vectors have `ndim` entries with legal values.
    pub fn validate(&self, ndim: usize) -> Result<(), PartitionError> {
        if self.aoi.len() != ndim || self.discretization.len() != ndim {
            return Err(PartitionError::InvalidLayout {
                reason: format!(
                    "halo config has {} aoi and {} discretization entries for a {ndim}-dimensional world",
                    self.aoi.len(),
                    self.discretization.len()
                ),
            });
        }
        if let Some(axis) = self.aoi.iter().position(|&a| a < 0) {
            return Err(PartitionError::InvalidLayout {
                reason: format!("aoi on axis {axis} is negative ({})", self.aoi[axis]),
            });
        }
        if let Some(axis) = self
            .discretization
            .iter()
            .position(|d| !d.is_finite() || *d <= 0.0)
        {
            return Err(PartitionError::InvalidLayout {
                reason: format!(
                    "discretization on axis {axis} must be finite and > 0, got {}",
                    self.discretization[axis]
                ),
            });
        }
        Ok(())
    }
}

impl Default for HaloConfig {
    fn default() -> Self {
        Self::uniform(2, Self::DEFAULT_AOI, Self::DEFAULT_DISCRETIZATION)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_valid_in_two_dimensions() {
        let config = HaloConfig::default();
        assert!(config.validate(2).is_ok());
        assert!(config.validate(3).is_err());
    }

    #[test]
    fn negative_aoi_rejected() {
        let config = HaloConfig {
            aoi: vec![2, -1],
            discretization: vec![1.0, 1.0],
        };
        let err = config.validate(2).unwrap_err();
        assert!(err.to_string().contains("axis 1"));
    }

    #[test]
    fn non_positive_discretization_rejected() {
        for bad in [0.0, -2.0, f64::NAN, f64::INFINITY] {
            let config = HaloConfig {
                aoi: vec![1],
                discretization: vec![bad],
            };
            assert!(config.validate(1).is_err(), "accepted {bad}");
        }
    }

    #[test]
    fn zero_aoi_is_allowed() {
        assert!(HaloConfig::uniform(3, 0, 0.5).validate(3).is_ok());
    }
}
