//! Discontinuous-canopy geometric correction.
//!
//! Clustered or row vegetation is approximated by solid crown shapes
//! standing on a soil background. The scene reflectance at nadir is the
//! sum of the component reflectances of the illuminated and shadowed
//! portions of the crowns and of the background, weighted by their
//! projected ground-area fractions (Jasinski/Huemmrich formulation). For
//! cylinders the shadowed-crown contribution is neglected as
//! quantitatively insignificant.

use super::spectra;
use super::{CrownGeometry, CrownShape, Geometry};
use crate::error::ModelError;

/// Canopy-only radiative terms the blend consumes, taken from the SAIL
/// solution: `rc` is the nadir-view reflectance of the illuminated crown
/// (`rdo`), `tc` the crown transmittance (`tdo`), and `rch` the
/// hemispheric crown reflectance (`rdd`), carried for shape formulas that
/// weight the diffuse crown field.
#[derive(Debug, Clone)]
pub struct CrownOptics {
    /// Nadir-view reflectance of the illuminated crown.
    pub rc: Vec<f64>,
    /// Transmittance through the crown.
    pub tc: Vec<f64>,
    /// Hemispheric reflectance of the illuminated crown.
    pub rch: Vec<f64>,
}

/// Projected ground-area fractions of the four scene components. For all
/// valid crown geometries these are non-negative and sum to one.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct AreaFractions {
    /// Crown area receiving direct sunlight.
    pub illuminated_crown: f64,
    /// Self-shaded crown area.
    pub shaded_crown: f64,
    /// Background receiving direct sunlight.
    pub illuminated_soil: f64,
    /// Background under crown shadow.
    pub shaded_soil: f64,
}

/// Blend crown and background contributions into the scene reflectance.
///
/// Only the nadir view is modeled; any other view zenith is rejected as an
/// unsupported configuration rather than extrapolated.
pub(crate) fn discontinuous_canopy(
    crown_optics: &CrownOptics,
    soil: &[f64],
    crown: &CrownGeometry,
    geometry: &Geometry,
) -> Result<Vec<f64>, ModelError> {
    crown.validate()?;
    let geometry = geometry.validated()?;
    if geometry.tto != 0.0 {
        return Err(ModelError::UnsupportedConfiguration(format!(
            "the discontinuous-canopy blend is defined for nadir view only (tto = 0), \
             got tto = {}",
            geometry.tto
        )));
    }
    spectra::check_grid("soil spectrum", soil)?;
    if crown_optics.rc.len() != soil.len()
        || crown_optics.tc.len() != soil.len()
        || crown_optics.rch.len() != soil.len()
    {
        return Err(ModelError::InvalidParameter(
            "crown and soil spectra must share one grid".into(),
        ));
    }

    let f = area_fractions(crown, geometry.tts);
    debug_assert!((f.illuminated_crown + f.shaded_crown + f.illuminated_soil + f.shaded_soil
        - 1.0)
        .abs()
        < 1e-9);

    let blended = crown_optics
        .rc
        .iter()
        .zip(&crown_optics.tc)
        .zip(soil)
        .map(|((&rc, &tc), &rs)| {
            // Shadowed components are lit only through the crown.
            let rc_shaded = tc * rc;
            let rs_shaded = tc * rs;
            f.illuminated_crown * rc
                + f.shaded_crown * rc_shaded
                + f.shaded_soil * rs_shaded
                + f.illuminated_soil * rs
        })
        .collect();
    Ok(blended)
}

/// Shape-specific projected-area fractions for sun zenith `tts` (degrees).
pub(crate) fn area_fractions(crown: &CrownGeometry, tts: f64) -> AreaFractions {
    let cover = crown.cover;
    let chw = crown.height_to_width;
    let tan_tts = tts.to_radians().tan();

    let (shaded_crown_of_crown, eta) = match crown.shape {
        CrownShape::Cone => {
            // Half-angle of the cone apex seen from the side.
            let caspa = (1.0 / (2.0 * chw)).atan();
            // The cone self-shades only once the sun drops below the
            // slope of its flank.
            let beta = if chw > 1.0 / (2.0 * tan_tts) {
                (caspa.tan() / tan_tts).acos()
            } else {
                0.0
            };
            let eta = (beta.tan() - beta) / std::f64::consts::PI;
            (beta / std::f64::consts::PI, eta)
        }
        // An upright cylinder never shades itself at nadir view; its
        // shadow-to-crown area ratio is the projected side wall.
        CrownShape::Cylinder => (0.0, chw * tan_tts),
    };

    // Shadow overlap between neighboring crowns follows the Poisson
    // argument of Jasinski: of the (1 - cover) background, the part that
    // escapes all shadows is (1 - cover)^(eta + 1).
    let shaded_soil = 1.0 - cover - (1.0 - cover).powf(eta + 1.0);
    let illuminated_soil = 1.0 - cover - shaded_soil;

    AreaFractions {
        illuminated_crown: cover * (1.0 - shaded_crown_of_crown),
        shaded_crown: cover * shaded_crown_of_crown,
        illuminated_soil,
        shaded_soil,
    }
}
