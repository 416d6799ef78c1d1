//! Thermal-domain extension of the canopy layer solution.
//!
//! Reuses the SAIL solve on a caller-supplied thermal wavelength grid and
//! combines the component temperatures (sunlit and shaded leaves and soil,
//! sky) through Planck emission into top-of-canopy radiance, brightness
//! temperature, and directional emissivity. Entirely separate from the
//! optical pipeline; not calling it leaves the optical outputs untouched.

use super::lidf::Lidf;
use super::sail;
use super::{CanopyStructure, Geometry};
use crate::error::ModelError;

/// First radiation constant scaled for wavelengths in µm, W m⁻².
const C1: f64 = 3.741856e-16;
/// Second radiation constant, µm K.
const C2: f64 = 14388.0;

/// Component temperatures of the scene, in K.
#[derive(Debug, Clone, Copy)]
pub struct ComponentTemperatures {
    /// Shaded leaves.
    pub tveg: f64,
    /// Shaded soil.
    pub tsoil: f64,
    /// Sunlit leaves.
    pub tveg_sunlit: f64,
    /// Sunlit soil.
    pub tsoil_sunlit: f64,
    /// Sky (downwelling) emission temperature.
    pub t_atm: f64,
}

/// Leaf and soil optical properties on the thermal grid. Reflectance and
/// emissivity are complements; either member of each pair may be supplied.
#[derive(Debug, Clone)]
pub struct ThermalSurface {
    /// Leaf reflectance.
    pub refl: Vec<f64>,
    /// Leaf emissivity.
    pub emv: Vec<f64>,
    /// Soil reflectance.
    pub rsoil: Vec<f64>,
    /// Soil emissivity.
    pub ems: Vec<f64>,
}

/// Top-of-canopy thermal quantities on the caller's wavelength grid.
#[derive(Debug, Clone)]
pub struct ThermalOutputs {
    /// Upwelling radiance, W m⁻² sr⁻¹ µm⁻¹.
    pub radiance: Vec<f64>,
    /// Equivalent brightness temperature, K.
    pub brightness_temperature: Vec<f64>,
    /// Directional emissivity in the view direction.
    pub directional_emissivity: Vec<f64>,
}

impl ThermalSurface {
    /// Complete reflectance/emissivity pairs from whichever member was
    /// supplied (`rho = 1 - epsilon`). Each pair needs at least one member.
    pub fn from_optional(
        refl: Option<Vec<f64>>,
        emv: Option<Vec<f64>>,
        rsoil: Option<Vec<f64>>,
        ems: Option<Vec<f64>>,
    ) -> Result<Self, ModelError> {
        let complement = |s: &[f64]| s.iter().map(|v| 1.0 - v).collect::<Vec<f64>>();
        let (refl, emv) = match (refl, emv) {
            (Some(r), Some(e)) => (r, e),
            (Some(r), None) => {
                let e = complement(&r);
                (r, e)
            }
            (None, Some(e)) => (complement(&e), e),
            (None, None) => {
                return Err(ModelError::InvalidParameter(
                    "either the leaf reflectance or the leaf emissivity is required".into(),
                ))
            }
        };
        let (rsoil, ems) = match (rsoil, ems) {
            (Some(r), Some(e)) => (r, e),
            (Some(r), None) => {
                let e = complement(&r);
                (r, e)
            }
            (None, Some(e)) => (complement(&e), e),
            (None, None) => {
                return Err(ModelError::InvalidParameter(
                    "either the soil reflectance or the soil emissivity is required".into(),
                ))
            }
        };
        Ok(Self {
            refl,
            emv,
            rsoil,
            ems,
        })
    }
}

/// Wavelength-only part of the Planck law, shared between the emission
/// terms and the brightness-temperature inversion.
fn planck_top(lam: f64) -> f64 {
    1.0e-6 * C1 * (lam * 1e-6).powi(-5)
}

fn planck(top: f64, lam: f64, t: f64) -> f64 {
    top / ((C2 / (lam * t)).exp() - 1.0)
}

/// Thermal radiance, brightness temperature, and directional emissivity of
/// the canopy/soil scene.
pub fn thermal_radiance(
    lam_um: &[f64],
    temps: &ComponentTemperatures,
    lidf: &Lidf,
    structure: &CanopyStructure,
    geometry: &Geometry,
    surface: &ThermalSurface,
) -> Result<ThermalOutputs, ModelError> {
    use std::f64::consts::PI;

    if lam_um.is_empty() || lam_um.iter().any(|&l| !(l > 0.0)) {
        return Err(ModelError::InvalidParameter(
            "thermal wavelengths must be positive and non-empty".into(),
        ));
    }
    for (name, t) in [
        ("tveg", temps.tveg),
        ("tsoil", temps.tsoil),
        ("tveg_sunlit", temps.tveg_sunlit),
        ("tsoil_sunlit", temps.tsoil_sunlit),
        ("t_atm", temps.t_atm),
    ] {
        if !(t > 0.0) {
            return Err(ModelError::InvalidParameter(format!(
                "{name} must be a positive temperature in K, got {t}"
            )));
        }
    }
    let n = lam_um.len();
    if surface.refl.len() != n
        || surface.emv.len() != n
        || surface.rsoil.len() != n
        || surface.ems.len() != n
    {
        return Err(ModelError::InvalidParameter(
            "thermal surface spectra must share the thermal wavelength grid".into(),
        ));
    }

    // Thermal leaves scatter by reflection only.
    let tau = vec![0.0; n];
    let out = sail::solve(&surface.refl, &tau, lidf, &surface.rsoil, structure, geometry)?;

    let mut radiance = Vec::with_capacity(n);
    let mut brightness = Vec::with_capacity(n);
    let mut dir_em = Vec::with_capacity(n);
    for i in 0..n {
        let lam = lam_um[i];
        let top = planck_top(lam);
        let h_shade_veg = planck(top, lam, temps.tveg);
        let h_sunlit_veg = planck(top, lam, temps.tveg_sunlit);
        let h_shade_soil = planck(top, lam, temps.tsoil);
        let h_sunlit_soil = planck(top, lam, temps.tsoil_sunlit);
        let h_sky = planck(top, lam, temps.t_atm);

        let rs = surface.rsoil[i];
        // Absorbed fractions of the diffuse and directional fields.
        let gammad = 1.0 - out.rdd[i] - out.tdd[i];
        let gammao = 1.0 - out.rdo[i] - out.tdo[i] - out.too;

        let dn = 1.0 - rs * out.rdd[i];
        let tso = out.tsstoo + out.tss * (out.tdo[i] + rs * out.rdd[i] * out.too) / dn;
        let ttot = (out.too + out.tdo[i]) / dn;
        let gammaot = gammao + ttot * rs * gammad;
        let gammasot = out.gammaso[i] + ttot * rs * out.gammasdf[i];

        let aeev = gammaot;
        let aees = ttot * surface.ems[i];

        let lw = ((out.rdot[i] * h_sky) / PI
            + (aeev * h_shade_veg
                + gammasot * surface.emv[i] * (h_sunlit_veg - h_shade_veg)
                + aees * h_shade_soil
                + tso * surface.ems[i] * (h_sunlit_soil - h_shade_soil)))
            / PI;

        let tb = C2 / (lam * (top / (lw * PI) + 1.0).ln());
        if !(lw.is_finite() && tb.is_finite()) {
            return Err(ModelError::NumericalInstability(format!(
                "thermal solution is not finite at {lam} um"
            )));
        }
        radiance.push(lw);
        brightness.push(tb);
        dir_em.push(1.0 - out.rdot[i]);
    }

    Ok(ThermalOutputs {
        radiance,
        brightness_temperature: brightness,
        directional_emissivity: dir_em,
    })
}
