//! Leaf-level radiative transfer (PROSPECT generalized plate model).
//!
//! A leaf is modeled as one compact layer of `n` elementary plates with
//! rough surfaces. The per-wavelength absorption coefficient is the
//! concentration-weighted sum of the specific absorption spectra; the plate
//! transmissivity and the interface transmissivities then feed the Stokes
//! layer-stacking solution.

use rayon::prelude::*;

use super::spectra::{SpectralLibrary, N_SAMPLES};
use super::{LeafOptics, LeafParameters, ProspectVersion};
use crate::error::ModelError;

/// Tolerance above 1.0 allowed for reflectance + transmittance before the
/// solve is declared unstable.
const ENERGY_TOL: f64 = 1e-9;

/// Compute leaf reflectance and transmittance spectra.
///
/// `alpha_deg` is the maximum incidence angle describing the roughness of
/// the leaf surface, in degrees (40° in the standard parametrization).
pub(crate) fn leaf_optics(
    params: &LeafParameters,
    version: ProspectVersion,
    alpha_deg: f64,
    lib: &SpectralLibrary,
) -> Result<LeafOptics, ModelError> {
    if !(alpha_deg > 0.0 && alpha_deg <= 90.0) {
        return Err(ModelError::InvalidParameter(format!(
            "alpha must be in (0, 90] degrees, got {alpha_deg}"
        )));
    }

    // Version 5 has no anthocyanin term; the parameter is accepted and
    // ignored so callers can switch versions without rebuilding inputs.
    let ant = match version {
        ProspectVersion::Five => 0.0,
        ProspectVersion::D => params.ant.ok_or_else(|| {
            ModelError::InvalidParameter("prospect-d requires the anthocyanin content".into())
        })?,
    };

    let spectra: Result<Vec<(f64, f64)>, ModelError> = (0..N_SAMPLES)
        .into_par_iter()
        .map(|i| {
            let k = (params.cab * lib.kab[i]
                + params.car * lib.kcar[i]
                + ant * lib.kant[i]
                + params.cbrown * lib.kbrown[i]
                + params.cw * lib.kw[i]
                + params.cm * lib.km[i])
                / params.n;
            let (refl, tran) = plate_stack(params.n, k, lib.nr[i], alpha_deg);

            if !(refl.is_finite() && tran.is_finite())
                || !(0.0..=1.0).contains(&refl)
                || !(0.0..=1.0).contains(&tran)
                || refl + tran > 1.0 + ENERGY_TOL
            {
                return Err(ModelError::NumericalInstability(format!(
                    "leaf energy balance violated at {} nm (rho={refl}, tau={tran})",
                    super::spectra::WL_MIN + i
                )));
            }
            Ok((refl, tran))
        })
        .collect();

    let (reflectance, transmittance) = spectra?.into_iter().unzip();
    Ok(LeafOptics {
        reflectance,
        transmittance,
    })
}

/// Reflectance and transmittance of `n` elementary plates at one wavelength.
///
/// `k` is the total absorption coefficient of the elementary layer, `nr`
/// the refractive index. Solves the single rough-surfaced plate first, then
/// stacks the remaining `n - 1` layers with the generalized Stokes
/// equations; the zero-absorption case (`r + t >= 1`) takes the exact
/// conservative-scattering limit.
fn plate_stack(n: f64, k: f64, nr: f64, alpha_deg: f64) -> (f64, f64) {
    // Plate transmissivity from the absorption coefficient: the angular
    // integral of Beer's law over an isotropic incident field.
    let tau = if k <= 0.0 {
        1.0
    } else {
        (1.0 - k) * (-k).exp() + k * k * exp_int_e1(k)
    };

    // One rough-surfaced plate: interface transmissivities from the
    // Stern/Allen integral, internal multiple reflections in closed form.
    let talf = tav(alpha_deg, nr);
    let ralf = 1.0 - talf;
    let t12 = tav(90.0, nr);
    let r12 = 1.0 - t12;
    let t21 = t12 / (nr * nr);
    let r21 = 1.0 - t21;

    let denom = 1.0 - r21 * r21 * tau * tau;
    let t_a = talf * tau * t21 / denom;
    let r_a = ralf + r21 * tau * t_a;
    let t = t12 * tau * t21 / denom;
    let r = r12 + r21 * tau * t;

    // Stokes stacking for the n - 1 layers below the top plate.
    let (r_sub, t_sub) = if r + t >= 1.0 {
        let t_sub = t / (t + (1.0 - t) * (n - 1.0));
        (1.0 - t_sub, t_sub)
    } else {
        let d = ((1.0 + r + t) * (1.0 + r - t) * (1.0 - r + t) * (1.0 - r - t)).sqrt();
        let rq = r * r;
        let tq = t * t;
        let a = (1.0 + rq - tq + d) / (2.0 * r);
        let b = (1.0 - rq + tq + d) / (2.0 * t);

        let b_nm1 = b.powf(n - 1.0);
        let b_n2 = b_nm1 * b_nm1;
        let a2 = a * a;
        let denom = a2 * b_n2 - 1.0;
        (a * (b_n2 - 1.0) / denom, b_nm1 * (a2 - 1.0) / denom)
    };

    // Combine the top plate with the sub-stack.
    let denom = 1.0 - r_sub * r;
    let tran = t_a * t_sub / denom;
    let refl = r_a + t_a * r_sub * t / denom;
    (refl, tran)
}

/// Transmissivity of a dielectric interface averaged over incidence angles
/// from 0 to `alpha_deg`, for refractive index `nr` (Stern's integral in the
/// Allen closed form).
fn tav(alpha_deg: f64, nr: f64) -> f64 {
    let n2 = nr * nr;
    let np = n2 + 1.0;
    let nm = n2 - 1.0;
    let a = (nr + 1.0) * (nr + 1.0) / 2.0;
    let k = -(n2 - 1.0) * (n2 - 1.0) / 4.0;
    let sa = alpha_deg.to_radians().sin();

    let b2 = sa * sa - np / 2.0;
    let b1 = if alpha_deg == 90.0 {
        0.0
    } else {
        (b2 * b2 + k).sqrt()
    };
    let b = b1 - b2;
    let b3 = b * b * b;
    let a3 = a * a * a;

    let ts = (k * k / (6.0 * b3) + k / b - b / 2.0) - (k * k / (6.0 * a3) + k / a - a / 2.0);

    let tp1 = -2.0 * n2 * (b - a) / (np * np);
    let tp2 = -2.0 * n2 * np * (b / a).ln() / (nm * nm);
    let tp3 = n2 * (1.0 / b - 1.0 / a) / 2.0;
    let tp4 = 16.0 * n2 * n2 * (n2 * n2 + 1.0) * ((2.0 * np * b - nm * nm) / (2.0 * np * a - nm * nm)).ln()
        / (np * np * np * nm * nm);
    let tp5 = 16.0 * n2 * n2 * n2 * (1.0 / (2.0 * np * b - nm * nm) - 1.0 / (2.0 * np * a - nm * nm))
        / (np * np * np);
    let tp = tp1 + tp2 + tp3 + tp4 + tp5;

    (ts + tp) / (2.0 * sa * sa)
}

/// Exponential integral E1(x) for x > 0.
///
/// Rational approximations 5.1.53 and 5.1.56 from Abramowitz & Stegun;
/// absolute error below 2e-7, ample for the plate transmissivity.
pub(crate) fn exp_int_e1(x: f64) -> f64 {
    if x <= 1.0 {
        let poly = -0.57721566
            + x * (0.99999193
                + x * (-0.24991055 + x * (0.05519968 + x * (-0.00976004 + x * 0.00107857))));
        poly - x.ln()
    } else {
        let num = x * (x * (x * (x + 8.5733287401) + 18.0590169730) + 8.6347608925) + 0.2677737343;
        let den = x * (x * (x * (x + 9.5733223454) + 25.6329561486) + 21.0996530827) + 3.9584969228;
        (num / den) * (-x).exp() / x
    }
}
