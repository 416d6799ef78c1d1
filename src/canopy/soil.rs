//! Soil background reflectance.
//!
//! The background is either an explicit caller-supplied spectrum or a
//! two-spectrum linear mixture `rsoil * (psoil * dry + (1 - psoil) * wet)`
//! where the dry/wet components default to the bundled reference soils.
//! With the default brightness and moisture scalars (both 1) the resolved
//! background is the bundled dry soil, unchanged.

use super::spectra::{self, SpectralLibrary};
use crate::error::ModelError;

/// Where the soil background spectrum comes from.
#[derive(Debug, Clone)]
pub enum SoilSource {
    /// Use the given spectrum as-is.
    Explicit(Vec<f64>),
    /// Mix two soil spectra; `None` components use the bundled references.
    Mixed {
        /// First (dry) component; bundled dry soil when `None`.
        dry: Option<Vec<f64>>,
        /// Second (wet) component; bundled wet soil when `None`.
        wet: Option<Vec<f64>>,
        /// Moisture mixing fraction in [0, 1]; 1 selects the dry component.
        psoil: f64,
        /// Brightness scaling, >= 0.
        rsoil: f64,
    },
}

impl Default for SoilSource {
    /// The documented default: bundled dry soil, unscaled
    /// (`psoil = rsoil = 1`).
    fn default() -> Self {
        SoilSource::Mixed {
            dry: None,
            wet: None,
            psoil: 1.0,
            rsoil: 1.0,
        }
    }
}

impl SoilSource {
    /// Translate the optional-argument calling convention of the public
    /// entry points into a soil source.
    ///
    /// An explicit spectrum takes precedence and silently ignores
    /// `psoil`/`rsoil`. Otherwise the two mixing scalars must be supplied
    /// together; providing only one is an ambiguous request and is
    /// rejected. Providing neither selects the documented default.
    pub fn from_optional(
        explicit: Option<Vec<f64>>,
        psoil: Option<f64>,
        rsoil: Option<f64>,
        dry: Option<Vec<f64>>,
        wet: Option<Vec<f64>>,
    ) -> Result<Self, ModelError> {
        if let Some(spectrum) = explicit {
            return Ok(SoilSource::Explicit(spectrum));
        }
        let (psoil, rsoil) = match (psoil, rsoil) {
            (Some(p), Some(r)) => (p, r),
            (None, None) => (1.0, 1.0),
            _ => {
                return Err(ModelError::InvalidParameter(
                    "psoil and rsoil must be supplied together (or an explicit \
                     soil spectrum instead)"
                        .into(),
                ))
            }
        };
        Ok(SoilSource::Mixed {
            dry,
            wet,
            psoil,
            rsoil,
        })
    }

    /// Resolve to a background reflectance spectrum on the fixed grid.
    pub fn resolve(&self, lib: &SpectralLibrary) -> Result<Vec<f64>, ModelError> {
        match self {
            SoilSource::Explicit(spectrum) => {
                spectra::check_grid("soil spectrum", spectrum)?;
                Ok(spectrum.clone())
            }
            SoilSource::Mixed {
                dry,
                wet,
                psoil,
                rsoil,
            } => {
                if !(0.0..=1.0).contains(psoil) {
                    return Err(ModelError::InvalidParameter(format!(
                        "psoil must be in [0, 1], got {psoil}"
                    )));
                }
                if !(*rsoil >= 0.0) {
                    return Err(ModelError::InvalidParameter(format!(
                        "rsoil must be non-negative, got {rsoil}"
                    )));
                }
                let dry = dry.as_deref().unwrap_or(&lib.soil_dry);
                let wet = wet.as_deref().unwrap_or(&lib.soil_wet);
                spectra::check_grid("first soil spectrum", dry)?;
                spectra::check_grid("second soil spectrum", wet)?;

                Ok(dry
                    .iter()
                    .zip(wet)
                    .map(|(&d, &w)| rsoil * (psoil * d + (1.0 - psoil) * w))
                    .collect())
            }
        }
    }
}
