//! Canopy reflectance pipeline.
//!
//! Chains the leaf model (PROSPECT), the canopy bidirectional reflectance
//! model (FourSAIL), and the discontinuous-canopy geometric blend (GEO)
//! into forward simulations over the fixed 400–2500 nm grid. Every stage
//! is a pure function from borrowed inputs to freshly allocated spectra;
//! nothing is retained between calls.

pub mod geo;
pub mod lidf;
pub mod prospect;
pub mod sail;
pub mod soil;
pub mod spectra;
pub mod thermal;

#[cfg(test)]
mod tests;

use std::str::FromStr;

use log::{debug, warn};

pub use geo::CrownOptics;
pub use lidf::{Lidf, LidfSpec};
pub use sail::SailOutputs;
pub use soil::SoilSource;
pub use spectra::{spectral_library, wavelengths, SpectralLibrary};
pub use thermal::{ComponentTemperatures, ThermalOutputs, ThermalSurface};

use crate::error::ModelError;

/// Which PROSPECT coefficient set and parameter contract to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProspectVersion {
    /// PROSPECT-5: no anthocyanin term (the parameter is ignored if given).
    Five,
    /// PROSPECT-D: anthocyanins required.
    D,
}

impl FromStr for ProspectVersion {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "5" => Ok(ProspectVersion::Five),
            "D" => Ok(ProspectVersion::D),
            other => Err(ModelError::InvalidParameter(format!(
                "prospect version must be one of 5, D; got {other:?}"
            ))),
        }
    }
}

/// Leaf biochemistry and structure.
///
/// Concentrations are per unit leaf area; the documented typical ranges
/// (e.g. cab 0–100 µg cm⁻², cw 0–0.05 cm, cm 0–0.02 g cm⁻²) are guidance,
/// not hard bounds. Only sign and finiteness are enforced.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LeafParameters {
    /// Leaf structure parameter (number of elementary layers), >= 1
    /// typically.
    pub n: f64,
    /// Chlorophyll a+b content, µg cm⁻².
    pub cab: f64,
    /// Carotenoid content, µg cm⁻².
    pub car: f64,
    /// Anthocyanin content, µg cm⁻²; required by PROSPECT-D, ignored by
    /// PROSPECT-5.
    pub ant: Option<f64>,
    /// Brown pigment content, unitless.
    pub cbrown: f64,
    /// Equivalent water thickness, cm.
    pub cw: f64,
    /// Dry matter content, g cm⁻².
    pub cm: f64,
}

impl LeafParameters {
    fn validate(&self) -> Result<(), ModelError> {
        let scalars = [
            ("n", self.n),
            ("cab", self.cab),
            ("car", self.car),
            ("ant", self.ant.unwrap_or(0.0)),
            ("cbrown", self.cbrown),
            ("cw", self.cw),
            ("cm", self.cm),
        ];
        for (name, value) in scalars {
            if !value.is_finite() || value < 0.0 {
                return Err(ModelError::InvalidParameter(format!(
                    "leaf parameter {name} must be finite and non-negative, got {value}"
                )));
            }
        }
        if self.n < 1.0 {
            // Atypical but not fatal: fewer than one elementary layer.
            warn!("leaf structure parameter n = {} is below 1", self.n);
        }
        Ok(())
    }
}

/// Canopy structure: leaf area and hotspot size parameter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CanopyStructure {
    /// Leaf area index, >= 0.
    pub lai: f64,
    /// Hotspot parameter (leaf size over canopy height), in [0, 1).
    pub hotspot: f64,
}

impl CanopyStructure {
    pub(crate) fn validate(&self) -> Result<(), ModelError> {
        if !self.lai.is_finite() || self.lai < 0.0 {
            return Err(ModelError::InvalidParameter(format!(
                "lai must be finite and non-negative, got {}",
                self.lai
            )));
        }
        if !self.hotspot.is_finite() || !(0.0..1.0).contains(&self.hotspot) {
            return Err(ModelError::InvalidParameter(format!(
                "hotspot parameter must be in [0, 1), got {}",
                self.hotspot
            )));
        }
        Ok(())
    }
}

/// Sun and sensor angles, in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Geometry {
    /// Solar zenith angle, 0–90.
    pub tts: f64,
    /// Viewer zenith angle, 0–90.
    pub tto: f64,
    /// Relative sun-sensor azimuth, 0–360.
    pub psi: f64,
}

impl Geometry {
    /// Validate the angular ranges and fold the azimuth into [0, 180]
    /// (the reflectance is symmetric about the principal plane).
    pub(crate) fn validated(&self) -> Result<Geometry, ModelError> {
        for (name, value, max) in [
            ("solar zenith angle", self.tts, 90.0),
            ("viewer zenith angle", self.tto, 90.0),
            ("relative azimuth angle", self.psi, 360.0),
        ] {
            if !value.is_finite() || !(0.0..=max).contains(&value) {
                return Err(ModelError::InvalidParameter(format!(
                    "{name} must be in [0, {max}] degrees, got {value}"
                )));
            }
        }
        let mut folded = *self;
        if folded.psi > 180.0 {
            folded.psi = 360.0 - folded.psi;
        }
        Ok(folded)
    }
}

/// Solid shape approximating individual plant crowns. Adding a shape means
/// supplying its projected-area fractions in the geometric blend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrownShape {
    /// Conical crown (conifers).
    Cone,
    /// Right-cylindrical crown.
    Cylinder,
}

impl FromStr for CrownShape {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cone" => Ok(CrownShape::Cone),
            "cylinder" => Ok(CrownShape::Cylinder),
            other => Err(ModelError::UnsupportedShape(format!(
                "crown shape must be one of cone, cylinder; got {other:?}"
            ))),
        }
    }
}

/// Crown geometry of a discontinuous canopy.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CrownGeometry {
    /// Crown height-to-width ratio, > 0.
    pub height_to_width: f64,
    /// Fraction of ground covered by crowns, in [0, 1].
    pub cover: f64,
    /// Crown solid shape.
    pub shape: CrownShape,
}

impl CrownGeometry {
    pub(crate) fn validate(&self) -> Result<(), ModelError> {
        if !self.height_to_width.is_finite() || self.height_to_width <= 0.0 {
            return Err(ModelError::InvalidParameter(format!(
                "crown height-to-width ratio must be positive, got {}",
                self.height_to_width
            )));
        }
        if !self.cover.is_finite() || !(0.0..=1.0).contains(&self.cover) {
            return Err(ModelError::InvalidParameter(format!(
                "crown cover fraction must be in [0, 1], got {}",
                self.cover
            )));
        }
        Ok(())
    }
}

/// Leaf reflectance and transmittance spectra from the leaf model.
///
/// Both are on the fixed grid, inside [0, 1], with reflectance plus
/// transmittance never exceeding one.
#[derive(Debug, Clone)]
pub struct LeafOptics {
    /// Leaf directional-hemispherical reflectance.
    pub reflectance: Vec<f64>,
    /// Leaf directional-hemispherical transmittance.
    pub transmittance: Vec<f64>,
}

/// Which reflectance factor(s) a caller wants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReflFactor {
    /// Bidirectional reflectance factor (`rsot`).
    Sdr,
    /// Bi-hemispherical reflectance factor (`rddt`).
    Bhr,
    /// Directional-hemispherical reflectance factor (`rsdt`).
    Dhr,
    /// Hemispherical-directional reflectance factor (`rdot`).
    Hdr,
    /// The four factors above.
    All,
    /// Every radiative term of the layer solution.
    AllAll,
}

impl FromStr for ReflFactor {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "SDR" => Ok(ReflFactor::Sdr),
            "BHR" => Ok(ReflFactor::Bhr),
            "DHR" => Ok(ReflFactor::Dhr),
            "HDR" => Ok(ReflFactor::Hdr),
            "ALL" => Ok(ReflFactor::All),
            "ALLALL" => Ok(ReflFactor::AllAll),
            other => Err(ModelError::InvalidParameter(format!(
                "factor must be one of SDR, BHR, DHR, HDR, ALL, ALLALL; got {other:?}"
            ))),
        }
    }
}

/// The factor selection made from a [`SailOutputs`].
#[derive(Debug, Clone)]
pub enum FactorSelection {
    /// One named reflectance factor.
    Single(Vec<f64>),
    /// The four reflectance factors.
    All {
        /// Bidirectional.
        sdr: Vec<f64>,
        /// Bi-hemispherical.
        bhr: Vec<f64>,
        /// Directional-hemispherical.
        dhr: Vec<f64>,
        /// Hemispherical-directional.
        hdr: Vec<f64>,
    },
    /// The complete set of radiative terms.
    Full(Box<SailOutputs>),
}

impl SailOutputs {
    /// Select the requested reflectance factor(s).
    pub fn select(self, factor: ReflFactor) -> FactorSelection {
        match factor {
            ReflFactor::Sdr => FactorSelection::Single(self.rsot),
            ReflFactor::Bhr => FactorSelection::Single(self.rddt),
            ReflFactor::Dhr => FactorSelection::Single(self.rsdt),
            ReflFactor::Hdr => FactorSelection::Single(self.rdot),
            ReflFactor::All => FactorSelection::All {
                sdr: self.rsot,
                bhr: self.rddt,
                dhr: self.rsdt,
                hdr: self.rdot,
            },
            ReflFactor::AllAll => FactorSelection::Full(Box::new(self)),
        }
    }

    /// The canopy-only terms the geometric blend consumes.
    pub fn crown_optics(&self) -> CrownOptics {
        CrownOptics {
            rc: self.rdo.clone(),
            tc: self.tdo.clone(),
            rch: self.rdd.clone(),
        }
    }
}

/// Leaf reflectance and transmittance from biochemistry.
pub fn leaf_optics(
    params: &LeafParameters,
    version: ProspectVersion,
    alpha_deg: f64,
    lib: &SpectralLibrary,
) -> Result<LeafOptics, ModelError> {
    params.validate()?;
    debug!("running prospect {version:?} (n={}, cab={})", params.n, params.cab);
    prospect::leaf_optics(params, version, alpha_deg, lib)
}

/// Canopy radiative terms from leaf optics, structure, soil, and geometry.
pub fn canopy_reflectance(
    leaf_refl: &[f64],
    leaf_tran: &[f64],
    lidf: &Lidf,
    soil: &[f64],
    structure: &CanopyStructure,
    geometry: &Geometry,
) -> Result<SailOutputs, ModelError> {
    debug!(
        "running sail (lai={}, tts={}, tto={}, psi={})",
        structure.lai, geometry.tts, geometry.tto, geometry.psi
    );
    sail::canopy_reflectance(leaf_refl, leaf_tran, lidf, soil, structure, geometry)
}

/// Scene reflectance of a discontinuous canopy at nadir view.
pub fn discontinuous_canopy(
    crown_optics: &CrownOptics,
    soil: &[f64],
    crown: &CrownGeometry,
    geometry: &Geometry,
) -> Result<Vec<f64>, ModelError> {
    debug!(
        "running geometric blend ({:?}, cover={})",
        crown.shape, crown.cover
    );
    geo::discontinuous_canopy(crown_optics, soil, crown, geometry)
}

/// The composed PROSPECT-then-SAIL forward simulation.
#[allow(clippy::too_many_arguments)]
pub fn run_prosail(
    leaf: &LeafParameters,
    version: ProspectVersion,
    alpha_deg: f64,
    lidf_spec: &LidfSpec,
    soil_source: &SoilSource,
    structure: &CanopyStructure,
    geometry: &Geometry,
    lib: &SpectralLibrary,
) -> Result<SailOutputs, ModelError> {
    let optics = leaf_optics(leaf, version, alpha_deg, lib)?;
    let lidf = Lidf::with_default_classes(lidf_spec)?;
    let soil = soil_source.resolve(lib)?;
    canopy_reflectance(
        &optics.reflectance,
        &optics.transmittance,
        &lidf,
        &soil,
        structure,
        geometry,
    )
}

/// The composed PROSPECT-SAIL-GEO forward simulation for discontinuous
/// canopies.
#[allow(clippy::too_many_arguments)]
pub fn run_progeosail(
    crown: &CrownGeometry,
    leaf: &LeafParameters,
    version: ProspectVersion,
    alpha_deg: f64,
    lidf_spec: &LidfSpec,
    soil_source: &SoilSource,
    structure: &CanopyStructure,
    geometry: &Geometry,
    lib: &SpectralLibrary,
) -> Result<Vec<f64>, ModelError> {
    let soil = soil_source.resolve(lib)?;
    let outputs = run_prosail(
        leaf,
        version,
        alpha_deg,
        lidf_spec,
        soil_source,
        structure,
        geometry,
        lib,
    )?;
    discontinuous_canopy(&outputs.crown_optics(), &soil, crown, geometry)
}
