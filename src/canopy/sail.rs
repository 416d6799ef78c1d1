//! Canopy-level radiative transfer (FourSAIL).
//!
//! Suits-style turbid-medium formulation: the canopy is one homogeneous
//! layer whose extinction and scattering coefficients come from the leaf
//! optical properties weighted by the inclination distribution and by the
//! geometric projections of the sun and view directions. The two-stream
//! differential system has a closed-form solution per wavelength; the
//! single-scattering term carries the Verhoef hotspot correction.

use rayon::prelude::*;

use super::lidf::Lidf;
use super::spectra;
use super::{CanopyStructure, Geometry};
use crate::error::ModelError;

/// Floor for scattering coefficients before they divide something.
const SIGMA_FLOOR: f64 = 1e-36;

/// Complete set of radiative terms produced by the layer solution.
///
/// `tss`, `too` and `tsstoo` are direct beam quantities and do not depend
/// on wavelength; every other term is a spectrum on the input grid. The
/// four reflectance factors are `rsot` (SDR), `rddt` (BHR), `rsdt` (DHR)
/// and `rdot` (HDR).
#[derive(Debug, Clone)]
#[allow(missing_docs)]
pub struct SailOutputs {
    /// Direct transmittance in the sun direction.
    pub tss: f64,
    /// Direct transmittance in the view direction.
    pub too: f64,
    /// Bidirectional gap fraction (hotspot-corrected).
    pub tsstoo: f64,
    pub rdd: Vec<f64>,
    pub tdd: Vec<f64>,
    pub rsd: Vec<f64>,
    pub tsd: Vec<f64>,
    pub rdo: Vec<f64>,
    pub tdo: Vec<f64>,
    pub rso: Vec<f64>,
    pub rsos: Vec<f64>,
    pub rsod: Vec<f64>,
    pub rddt: Vec<f64>,
    pub rsdt: Vec<f64>,
    pub rdot: Vec<f64>,
    pub rsodt: Vec<f64>,
    pub rsost: Vec<f64>,
    pub rsot: Vec<f64>,
    pub gammasdf: Vec<f64>,
    pub gammasdb: Vec<f64>,
    pub gammaso: Vec<f64>,
}

/// Per-wavelength terms produced by one bin of the layer solution, in the
/// same order they are assembled into [`SailOutputs`].
struct BinTerms {
    rdd: f64,
    tdd: f64,
    rsd: f64,
    tsd: f64,
    rdo: f64,
    tdo: f64,
    rso: f64,
    rsos: f64,
    rsod: f64,
    rddt: f64,
    rsdt: f64,
    rdot: f64,
    rsodt: f64,
    rsost: f64,
    rsot: f64,
    gammasdf: f64,
    gammasdb: f64,
    gammaso: f64,
}

/// LIDF-weighted extinction and scattering factors for one sun/view
/// geometry (Suits coefficients).
#[derive(Debug)]
struct SuitsCoefficients {
    /// Extinction coefficient in the sun direction.
    ks: f64,
    /// Extinction coefficient in the view direction.
    ko: f64,
    /// Mean squared leaf-normal projection.
    bf: f64,
    /// Backward area scattering fraction.
    sob: f64,
    /// Forward area scattering fraction.
    sof: f64,
}

/// Canopy reflectance factors on the fixed 400–2500 nm grid.
///
/// Validates the grid contract on every spectral input, then runs the
/// layer solution.
pub(crate) fn canopy_reflectance(
    leaf_refl: &[f64],
    leaf_tran: &[f64],
    lidf: &Lidf,
    soil: &[f64],
    structure: &CanopyStructure,
    geometry: &Geometry,
) -> Result<SailOutputs, ModelError> {
    spectra::check_grid("leaf reflectance", leaf_refl)?;
    spectra::check_grid("leaf transmittance", leaf_tran)?;
    spectra::check_grid("soil spectrum", soil)?;
    solve(leaf_refl, leaf_tran, lidf, soil, structure, geometry)
}

/// Grid-agnostic layer solution: the three spectra only have to agree in
/// length. The thermal extension reuses this on its own wavelength axis.
pub(crate) fn solve(
    leaf_refl: &[f64],
    leaf_tran: &[f64],
    lidf: &Lidf,
    soil: &[f64],
    structure: &CanopyStructure,
    geometry: &Geometry,
) -> Result<SailOutputs, ModelError> {
    if leaf_refl.len() != leaf_tran.len() || leaf_refl.len() != soil.len() {
        return Err(ModelError::InvalidParameter(format!(
            "leaf and soil spectra must share one grid, got lengths {}, {} and {}",
            leaf_refl.len(),
            leaf_tran.len(),
            soil.len()
        )));
    }
    structure.validate()?;
    let geometry = geometry.validated()?;
    let lai = structure.lai;

    if lai == 0.0 {
        return Ok(bare_soil(soil));
    }

    let cts = geometry.tts.to_radians().cos();
    let cto = geometry.tto.to_radians().cos();
    let tants = geometry.tts.to_radians().tan();
    let tanto = geometry.tto.to_radians().tan();
    let cospsi = geometry.psi.to_radians().cos();
    // Horizontal distance between the sun and view paths at unit depth.
    let dso = (tants * tants + tanto * tanto - 2.0 * tants * tanto * cospsi).sqrt();

    let c = suits_coefficients(lidf, &geometry);

    // Upper/lower hemisphere dispersion factors for direct, observed and
    // diffuse fluxes.
    let sdb = 0.5 * (c.ks + c.bf);
    let sdf = 0.5 * (c.ks - c.bf);
    let dob = 0.5 * (c.ko + c.bf);
    let dof = 0.5 * (c.ko - c.bf);
    let ddb = 0.5 * (1.0 + c.bf);
    let ddf = 0.5 * (1.0 - c.bf);

    let tss = (-c.ks * lai).exp();
    let too = (-c.ko * lai).exp();

    let (tsstoo, sumint) = hotspot_integral(structure.hotspot, dso, c.ks, c.ko, lai, tss)?;

    let bins: Result<Vec<BinTerms>, ModelError> = (0..leaf_refl.len())
        .into_par_iter()
        .map(|i| {
            let rho = leaf_refl[i];
            let tau = leaf_tran[i];
            let rs = soil[i];

            // Volume scattering coefficients for this wavelength.
            let sigb = (ddb * rho + ddf * tau).max(SIGMA_FLOOR);
            let sigf = (ddf * rho + ddb * tau).max(SIGMA_FLOOR);
            let att = 1.0 - sigf;
            let m = ((att + sigb) * (att - sigb)).max(0.0).sqrt();
            let sb = sdb * rho + sdf * tau;
            let sf = sdf * rho + sdb * tau;
            let vb = dob * rho + dof * tau;
            let vf = dof * rho + dob * tau;
            let w = c.sob * rho + c.sof * tau;

            // Infinite-canopy reflectance and the layer exponentials.
            let e1 = (-m * lai).exp();
            let e2 = e1 * e1;
            let rinf = (att - m) / sigb;
            let rinf2 = rinf * rinf;
            let re = rinf * e1;
            let denom = 1.0 - rinf2 * e2;

            let j1ks = jfunc1(c.ks, m, lai);
            let j2ks = jfunc2(c.ks, m, lai);
            let j1ko = jfunc1(c.ko, m, lai);
            let j2ko = jfunc2(c.ko, m, lai);

            let pss = (sf + sb * rinf) * j1ks;
            let qss = (sf * rinf + sb) * j2ks;
            let pv = (vf + vb * rinf) * j1ko;
            let qv = (vf * rinf + vb) * j2ko;

            let tdd = (1.0 - rinf2) * e1 / denom;
            let rdd = rinf * (1.0 - e2) / denom;
            let tsd = (pss - re * qss) / denom;
            let rsd = (qss - re * pss) / denom;
            let tdo = (pv - re * qv) / denom;
            let rdo = (qv - re * pv) / denom;

            let gammasdf = (1.0 + rinf) * (j1ks - re * j2ks) / denom;
            let gammasdb = (1.0 + rinf) * (-re * j1ks + j2ks) / denom;

            // Multiple-scattering part of the bidirectional reflectance.
            let z = jfunc2(c.ks, c.ko, lai);
            let g1 = (z - j1ks * too) / (c.ko + m);
            let g2 = (z - j1ko * tss) / (c.ks + m);
            let tv1 = (vf * rinf + vb) * g1;
            let tv2 = (vf + vb * rinf) * g2;
            let rsod = (tv1 * (sf + sb * rinf) + tv2 * (sf * rinf + sb)
                - (rdo * qss + tdo * pss) * rinf)
                / (1.0 - rinf2);
            let gammasod = (tv1 * (1.0 + rinf) + tv2 * (1.0 + rinf)
                - (rdo * j2ks + tdo * j1ks) * (1.0 + rinf) * rinf)
                / (1.0 - rinf2);

            // Single scattering with the hotspot-corrected bidirectional
            // gap fraction.
            let rsos = w * lai * sumint;
            let rso = rsos + rsod;
            let gammaso = c.ko * lai * sumint + gammasod;

            // Couple the canopy layer to the soil below it.
            let dn = 1.0 - rs * rdd;
            let rddt = rdd + tdd * rs * tdd / dn;
            let rsdt = rsd + (tsd + tss) * rs * tdd / dn;
            let rdot = rdo + tdd * rs * (tdo + too) / dn;
            let rsodt = ((tss + tsd) * tdo + (tsd + tss * rs * rdd) * too) * rs / dn;
            let rsost = rso + tsstoo * rs;
            let rsot = rsost + rsodt;

            let terms = BinTerms {
                rdd,
                tdd,
                rsd,
                tsd,
                rdo,
                tdo,
                rso,
                rsos,
                rsod,
                rddt,
                rsdt,
                rdot,
                rsodt,
                rsost,
                rsot,
                gammasdf,
                gammasdb,
                gammaso,
            };
            if [
                terms.rddt, terms.rsdt, terms.rdot, terms.rsot, terms.rdd, terms.tdd, terms.rsd,
                terms.tsd, terms.rdo, terms.tdo, terms.rso, terms.gammasdf, terms.gammasdb,
                terms.gammaso,
            ]
            .iter()
            .any(|v| !v.is_finite())
            {
                return Err(ModelError::NumericalInstability(format!(
                    "canopy solution is not finite at bin {i} \
                     (lai={lai}, tts={}, tto={})",
                    geometry.tts, geometry.tto
                )));
            }
            Ok(terms)
        })
        .collect();
    let bins = bins?;

    let n = bins.len();
    let mut out = SailOutputs {
        tss,
        too,
        tsstoo,
        rdd: Vec::with_capacity(n),
        tdd: Vec::with_capacity(n),
        rsd: Vec::with_capacity(n),
        tsd: Vec::with_capacity(n),
        rdo: Vec::with_capacity(n),
        tdo: Vec::with_capacity(n),
        rso: Vec::with_capacity(n),
        rsos: Vec::with_capacity(n),
        rsod: Vec::with_capacity(n),
        rddt: Vec::with_capacity(n),
        rsdt: Vec::with_capacity(n),
        rdot: Vec::with_capacity(n),
        rsodt: Vec::with_capacity(n),
        rsost: Vec::with_capacity(n),
        rsot: Vec::with_capacity(n),
        gammasdf: Vec::with_capacity(n),
        gammasdb: Vec::with_capacity(n),
        gammaso: Vec::with_capacity(n),
    };
    for b in bins {
        out.rdd.push(b.rdd);
        out.tdd.push(b.tdd);
        out.rsd.push(b.rsd);
        out.tsd.push(b.tsd);
        out.rdo.push(b.rdo);
        out.tdo.push(b.tdo);
        out.rso.push(b.rso);
        out.rsos.push(b.rsos);
        out.rsod.push(b.rsod);
        out.rddt.push(b.rddt);
        out.rsdt.push(b.rsdt);
        out.rdot.push(b.rdot);
        out.rsodt.push(b.rsodt);
        out.rsost.push(b.rsost);
        out.rsot.push(b.rsot);
        out.gammasdf.push(b.gammasdf);
        out.gammasdb.push(b.gammasdb);
        out.gammaso.push(b.gammaso);
    }
    Ok(out)
}

/// Degenerate solution for a canopy with no leaf area: the scene is the
/// bare soil seen through fully transparent air.
fn bare_soil(soil: &[f64]) -> SailOutputs {
    let n = soil.len();
    let zeros = vec![0.0; n];
    SailOutputs {
        tss: 1.0,
        too: 1.0,
        tsstoo: 1.0,
        rdd: zeros.clone(),
        tdd: vec![1.0; n],
        rsd: zeros.clone(),
        tsd: zeros.clone(),
        rdo: zeros.clone(),
        tdo: zeros.clone(),
        rso: zeros.clone(),
        rsos: zeros.clone(),
        rsod: zeros.clone(),
        rddt: soil.to_vec(),
        rsdt: soil.to_vec(),
        rdot: soil.to_vec(),
        rsodt: zeros.clone(),
        rsost: soil.to_vec(),
        rsot: soil.to_vec(),
        gammasdf: zeros.clone(),
        gammasdb: zeros.clone(),
        gammaso: zeros,
    }
}

/// LIDF-weighted Suits coefficients for the given geometry.
fn suits_coefficients(lidf: &Lidf, geometry: &Geometry) -> SuitsCoefficients {
    let cts = geometry.tts.to_radians().cos();
    let cto = geometry.tto.to_radians().cos();
    let ctscto = cts * cto;

    let mut c = SuitsCoefficients {
        ks: 0.0,
        ko: 0.0,
        bf: 0.0,
        sob: 0.0,
        sof: 0.0,
    };
    for (&weight, theta_l) in lidf.weights().iter().zip(lidf.class_centers()) {
        let (chi_s, chi_o, frho, ftau) = volscatt(geometry.tts, geometry.tto, geometry.psi, theta_l);
        c.ks += weight * chi_s / cts;
        c.ko += weight * chi_o / cto;
        c.bf += weight * theta_l.to_radians().cos().powi(2);
        c.sob += weight * frho * std::f64::consts::PI / ctscto;
        c.sof += weight * ftau * std::f64::consts::PI / ctscto;
    }
    c
}

/// Volume scattering phase-function geometry for one leaf inclination.
///
/// Returns `(chi_s, chi_o, frho, ftau)`: the interception cross sections
/// for the sun and view directions and the area fractions to be multiplied
/// by leaf reflectance and transmittance.
fn volscatt(tts: f64, tto: f64, psi: f64, ttl: f64) -> (f64, f64, f64, f64) {
    use std::f64::consts::PI;

    let cts = tts.to_radians().cos();
    let cto = tto.to_radians().cos();
    let sts = tts.to_radians().sin();
    let sto = tto.to_radians().sin();
    let psir = psi.to_radians();
    let cospsi = psir.cos();
    let cttl = ttl.to_radians().cos();
    let sttl = ttl.to_radians().sin();

    let cs = cttl * cts;
    let co = cttl * cto;
    let ss = sttl * sts;
    let so = sttl * sto;

    // Transition azimuths where the projected leaf normal crosses the
    // sun/view planes; the sentinel 5.0 keeps |cos| >= 1 when the leaf is
    // horizontal or the direction vertical.
    let cosbts = if ss.abs() > 1e-6 { -cs / ss } else { 5.0 };
    let cosbto = if so.abs() > 1e-6 { -co / so } else { 5.0 };

    let (bts, ds) = if cosbts.abs() < 1.0 {
        (cosbts.acos(), ss)
    } else {
        (PI, cs)
    };
    let chi_s = 2.0 / PI * ((bts - PI * 0.5) * cs + bts.sin() * ss);

    let (bto, doo) = if cosbto.abs() < 1.0 {
        (cosbto.acos(), so)
    } else if tto < 90.0 {
        (PI, co)
    } else {
        (0.0, -co)
    };
    let chi_o = 2.0 / PI * ((bto - PI * 0.5) * co + bto.sin() * so);

    // Order the three azimuthal transition angles around psi.
    let btran1 = (bts - bto).abs();
    let btran2 = PI - (bts + bto - PI).abs();
    let (bt1, bt2, bt3) = if psir <= btran1 {
        (psir, btran1, btran2)
    } else if psir <= btran2 {
        (btran1, psir, btran2)
    } else {
        (btran1, btran2, psir)
    };

    let t1 = 2.0 * cs * co + ss * so * cospsi;
    let t2 = if bt2 > 0.0 {
        bt2.sin() * (2.0 * ds * doo + ss * so * bt1.cos() * bt3.cos())
    } else {
        0.0
    };

    let denom = 2.0 * PI * PI;
    let frho = ((PI - bt2) * t1 + t2) / denom;
    let ftau = (-bt2 * t1 + t2) / denom;

    (chi_s, chi_o, frho.max(0.0), ftau.max(0.0))
}

/// Bidirectional gap fraction and the single-scattering path integral.
///
/// `hotspot` is the leaf-size to canopy-height ratio. The integral is the
/// Verhoef exponential-midpoint rule over 20 steps of increasing size; when
/// the sun and view paths coincide the pure-hotspot limit is exact, and as
/// `hotspot` tends to zero the rule collapses to the uncorrelated
/// single-scattering integral.
fn hotspot_integral(
    hotspot: f64,
    dso: f64,
    ks: f64,
    ko: f64,
    lai: f64,
    tss: f64,
) -> Result<(f64, f64), ModelError> {
    // Without a hotspot the correlation length is forced to zero by a huge
    // decay constant rather than a separate code path.
    let alf = if hotspot > 0.0 {
        (dso / hotspot) * 2.0 / (ks + ko)
    } else {
        1e36
    };

    if alf == 0.0 {
        // Pure hotspot: view and sun paths coincide.
        return Ok((tss, (1.0 - tss) / (ks * lai)));
    }

    let fhot = lai * (ko * ks).sqrt();
    let fint = (1.0 - (-alf).exp()) * 0.05;
    let mut sumint = 0.0;
    let mut x1 = 0.0;
    let mut y1 = 0.0;
    let mut f1 = 1.0;
    for istep in 1..=20 {
        let x2 = if istep < 20 {
            -(1.0 - istep as f64 * fint).ln() / alf
        } else {
            1.0
        };
        let y2 = -(ko + ks) * lai * x2 + fhot * (1.0 - (-alf * x2).exp()) / alf;
        let f2 = y2.exp();
        sumint += (f2 - f1) * (x2 - x1) / (y2 - y1);
        x1 = x2;
        y1 = y2;
        f1 = f2;
    }

    if !(sumint.is_finite() && f1.is_finite()) {
        return Err(ModelError::NumericalInstability(format!(
            "hotspot integration diverged (hotspot={hotspot}, ks={ks}, ko={ko}, lai={lai})"
        )));
    }
    Ok((f1, sumint))
}

/// The J1 exponential integral of the layer solution, with the series
/// expansion that avoids the `k == l` singularity.
fn jfunc1(k: f64, l: f64, t: f64) -> f64 {
    let del = (k - l) * t;
    if del.abs() > 1e-3 {
        ((-l * t).exp() - (-k * t).exp()) / (k - l)
    } else {
        0.5 * t * ((-k * t).exp() + (-l * t).exp()) * (1.0 - del * del / 12.0)
    }
}

/// The J2 exponential integral of the layer solution.
fn jfunc2(k: f64, l: f64, t: f64) -> f64 {
    (1.0 - (-(k + l) * t).exp()) / (k + l)
}
