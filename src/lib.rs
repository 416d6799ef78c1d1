//! Canopy reflectance simulation
//!
//! NOTE: this module is intended for the interface between Rust and Python.
//! The real work happens in the other modules, and they do not use `pyo3`,
//! its only used here.

pub mod canopy;
pub mod error;

use canopy::{
    CanopyStructure, ComponentTemperatures, CrownGeometry, CrownShape, FactorSelection, Geometry,
    LeafParameters, LidfSpec, Lidf, ProspectVersion, ReflFactor, SailOutputs, SoilSource,
    ThermalSurface,
};
use error::ModelError;
use log::info;
use numpy::{IntoPyArray, PyArray1, PyReadonlyArray1};
use pyo3::exceptions::{PyArithmeticError, PyValueError};
use pyo3::prelude::*;
use pyo3::types::PyDict;

impl From<ModelError> for PyErr {
    fn from(e: ModelError) -> Self {
        match e {
            ModelError::InvalidParameter(_) => PyValueError::new_err(e.to_string()),
            ModelError::UnsupportedConfiguration(_) => PyValueError::new_err(e.to_string()),
            ModelError::UnsupportedShape(_) => PyValueError::new_err(e.to_string()),
            ModelError::NumericalInstability(_) => PyArithmeticError::new_err(e.to_string()),
        }
    }
}

/// Map the `typelidf`/`lidfa`/`lidfb` calling convention onto a
/// distribution spec: 1 is the two-parameter form, 2 the ellipsoidal form
/// (for which `lidfb` is accepted and ignored).
fn lidf_spec(typelidf: u8, lidfa: f64, lidfb: f64) -> Result<LidfSpec, ModelError> {
    match typelidf {
        1 => Ok(LidfSpec::TwoParameter { a: lidfa, b: lidfb }),
        2 => Ok(LidfSpec::Ellipsoidal { mean_angle: lidfa }),
        other => Err(ModelError::InvalidParameter(format!(
            "typelidf must be 1 (two-parameter) or 2 (ellipsoidal), got {other}"
        ))),
    }
}

/// Convert an optional numpy spectrum into an owned vector.
fn optional_vec(spectrum: Option<PyReadonlyArray1<'_, f64>>) -> PyResult<Option<Vec<f64>>> {
    spectrum
        .map(|s| s.as_slice().map(<[f64]>::to_vec))
        .transpose()
        .map_err(Into::into)
}

/// Render a factor selection for Python: a bare array for a single factor,
/// a name-keyed dict otherwise.
fn selection_to_py<'py>(
    py: Python<'py>,
    selection: FactorSelection,
) -> PyResult<Bound<'py, PyAny>> {
    match selection {
        FactorSelection::Single(spectrum) => Ok(spectrum.into_pyarray(py).into_any()),
        FactorSelection::All { sdr, bhr, dhr, hdr } => {
            let dict = PyDict::new(py);
            dict.set_item("SDR", sdr.into_pyarray(py))?;
            dict.set_item("BHR", bhr.into_pyarray(py))?;
            dict.set_item("DHR", dhr.into_pyarray(py))?;
            dict.set_item("HDR", hdr.into_pyarray(py))?;
            Ok(dict.into_any())
        }
        FactorSelection::Full(outputs) => {
            let SailOutputs {
                tss,
                too,
                tsstoo,
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
            } = *outputs;
            let dict = PyDict::new(py);
            dict.set_item("tss", tss)?;
            dict.set_item("too", too)?;
            dict.set_item("tsstoo", tsstoo)?;
            dict.set_item("rdd", rdd.into_pyarray(py))?;
            dict.set_item("tdd", tdd.into_pyarray(py))?;
            dict.set_item("rsd", rsd.into_pyarray(py))?;
            dict.set_item("tsd", tsd.into_pyarray(py))?;
            dict.set_item("rdo", rdo.into_pyarray(py))?;
            dict.set_item("tdo", tdo.into_pyarray(py))?;
            dict.set_item("rso", rso.into_pyarray(py))?;
            dict.set_item("rsos", rsos.into_pyarray(py))?;
            dict.set_item("rsod", rsod.into_pyarray(py))?;
            dict.set_item("rddt", rddt.into_pyarray(py))?;
            dict.set_item("rsdt", rsdt.into_pyarray(py))?;
            dict.set_item("rdot", rdot.into_pyarray(py))?;
            dict.set_item("rsodt", rsodt.into_pyarray(py))?;
            dict.set_item("rsost", rsost.into_pyarray(py))?;
            dict.set_item("rsot", rsot.into_pyarray(py))?;
            dict.set_item("gammasdf", gammasdf.into_pyarray(py))?;
            dict.set_item("gammasdb", gammasdb.into_pyarray(py))?;
            dict.set_item("gammaso", gammaso.into_pyarray(py))?;
            Ok(dict.into_any())
        }
    }
}

/// Run the PROSPECT leaf optical model.
///
/// `n` is the leaf structure parameter, `cab`/`car`/`ant` the chlorophyll,
/// carotenoid and anthocyanin contents in µg cm⁻², `cbrown` the brown
/// pigment fraction, `cw` the equivalent water thickness in cm and `cm`
/// the dry matter content in g cm⁻². `prospect_version` selects "5" or
/// "D"; version D requires `ant`, version 5 ignores it. `alpha` is the
/// maximum surface incidence angle in degrees.
///
/// Returns `(wavelengths, reflectance, transmittance)` on the 400–2500 nm
/// grid at 1 nm.
#[pyfunction]
#[pyo3(signature = (n, cab, car, cbrown, cw, cm, ant=None, prospect_version="D", alpha=40.0))]
#[allow(clippy::too_many_arguments)]
fn run_prospect<'py>(
    py: Python<'py>,
    n: f64,
    cab: f64,
    car: f64,
    cbrown: f64,
    cw: f64,
    cm: f64,
    ant: Option<f64>,
    prospect_version: &str,
    alpha: f64,
) -> PyResult<(
    Bound<'py, PyArray1<f64>>,
    Bound<'py, PyArray1<f64>>,
    Bound<'py, PyArray1<f64>>,
)> {
    let version: ProspectVersion = prospect_version.parse()?;
    let params = LeafParameters {
        n,
        cab,
        car,
        ant,
        cbrown,
        cw,
        cm,
    };
    let optics = canopy::leaf_optics(&params, version, alpha, canopy::spectral_library())?;
    Ok((
        canopy::wavelengths().into_pyarray(py),
        optics.reflectance.into_pyarray(py),
        optics.transmittance.into_pyarray(py),
    ))
}

/// Run the SAIL canopy bidirectional reflectance model.
///
/// `refl` and `trans` are the leaf reflectance and transmittance on the
/// 400–2500 nm grid at 1 nm. The soil background is either `rsoil0` (an
/// explicit spectrum, taking precedence) or the mixture
/// `rsoil * (psoil * soil_spectrum1 + (1 - psoil) * soil_spectrum2)`;
/// `soil_spectrum1`/`soil_spectrum2` default to the bundled dry and wet
/// reference soils, and when neither `rsoil0` nor the `psoil`/`rsoil`
/// pair is given the background defaults to the bundled dry soil,
/// unscaled (`psoil = rsoil = 1`).
///
/// `factor` selects the output: one of SDR, BHR, DHR, HDR returns that
/// spectrum; ALL returns a dict of the four factors; ALLALL returns a
/// dict of every radiative term of the layer solution.
#[pyfunction]
#[pyo3(signature = (refl, trans, lai, lidfa, hspot, tts, tto, psi, typelidf=2, lidfb=0.0, factor="SDR", rsoil0=None, rsoil=None, psoil=None, soil_spectrum1=None, soil_spectrum2=None))]
#[allow(clippy::too_many_arguments)]
fn run_sail<'py>(
    py: Python<'py>,
    refl: PyReadonlyArray1<'_, f64>,
    trans: PyReadonlyArray1<'_, f64>,
    lai: f64,
    lidfa: f64,
    hspot: f64,
    tts: f64,
    tto: f64,
    psi: f64,
    typelidf: u8,
    lidfb: f64,
    factor: &str,
    rsoil0: Option<PyReadonlyArray1<'_, f64>>,
    rsoil: Option<f64>,
    psoil: Option<f64>,
    soil_spectrum1: Option<PyReadonlyArray1<'_, f64>>,
    soil_spectrum2: Option<PyReadonlyArray1<'_, f64>>,
) -> PyResult<Bound<'py, PyAny>> {
    let factor: ReflFactor = factor.parse()?;
    let spec = lidf_spec(typelidf, lidfa, lidfb)?;
    let lidf = Lidf::with_default_classes(&spec)?;
    let soil_source = SoilSource::from_optional(
        optional_vec(rsoil0)?,
        psoil,
        rsoil,
        optional_vec(soil_spectrum1)?,
        optional_vec(soil_spectrum2)?,
    )?;
    let soil = soil_source.resolve(canopy::spectral_library())?;

    let structure = CanopyStructure { lai, hotspot: hspot };
    let geometry = Geometry { tts, tto, psi };

    info!("processing canopy reflectance for lai={lai}, tts={tts}, tto={tto}");
    let outputs = canopy::canopy_reflectance(
        refl.as_slice()?,
        trans.as_slice()?,
        &lidf,
        &soil,
        &structure,
        &geometry,
    )?;
    selection_to_py(py, outputs.select(factor))
}

/// Run the composed PROSPECT and SAIL models.
///
/// Leaf parameters and `prospect_version`/`alpha` are as in
/// [`run_prospect`] (version "5" by default here); canopy, geometry, soil
/// and `factor` parameters are as in [`run_sail`].
#[pyfunction]
#[pyo3(signature = (n, cab, car, cbrown, cw, cm, lai, lidfa, hspot, tts, tto, psi, ant=None, alpha=40.0, prospect_version="5", typelidf=2, lidfb=0.0, factor="SDR", rsoil0=None, rsoil=None, psoil=None, soil_spectrum1=None, soil_spectrum2=None))]
#[allow(clippy::too_many_arguments)]
fn run_prosail<'py>(
    py: Python<'py>,
    n: f64,
    cab: f64,
    car: f64,
    cbrown: f64,
    cw: f64,
    cm: f64,
    lai: f64,
    lidfa: f64,
    hspot: f64,
    tts: f64,
    tto: f64,
    psi: f64,
    ant: Option<f64>,
    alpha: f64,
    prospect_version: &str,
    typelidf: u8,
    lidfb: f64,
    factor: &str,
    rsoil0: Option<PyReadonlyArray1<'_, f64>>,
    rsoil: Option<f64>,
    psoil: Option<f64>,
    soil_spectrum1: Option<PyReadonlyArray1<'_, f64>>,
    soil_spectrum2: Option<PyReadonlyArray1<'_, f64>>,
) -> PyResult<Bound<'py, PyAny>> {
    let factor: ReflFactor = factor.parse()?;
    let version: ProspectVersion = prospect_version.parse()?;
    let params = LeafParameters {
        n,
        cab,
        car,
        ant,
        cbrown,
        cw,
        cm,
    };
    let spec = lidf_spec(typelidf, lidfa, lidfb)?;
    let soil_source = SoilSource::from_optional(
        optional_vec(rsoil0)?,
        psoil,
        rsoil,
        optional_vec(soil_spectrum1)?,
        optional_vec(soil_spectrum2)?,
    )?;
    let structure = CanopyStructure { lai, hotspot: hspot };
    let geometry = Geometry { tts, tto, psi };

    info!("processing prosail for lai={lai}, tts={tts}, tto={tto}");
    let outputs = canopy::run_prosail(
        &params,
        version,
        alpha,
        &spec,
        &soil_source,
        &structure,
        &geometry,
        canopy::spectral_library(),
    )?;
    selection_to_py(py, outputs.select(factor))
}

/// Run the composed PROSPECT, SAIL and geometric models for a
/// discontinuous canopy.
///
/// `chw` is the crown height-to-width ratio, `ccover` the crown cover
/// fraction in [0, 1] and `cshp` the crown shape, "cone" or "cylinder".
/// The view zenith angle must be 0 (nadir); remaining parameters are as
/// in [`run_prosail`]. Returns the blended scene reflectance spectrum.
#[pyfunction]
#[pyo3(signature = (chw, ccover, cshp, n, cab, car, cbrown, cw, cm, lai, lidfa, hspot, tts, tto, psi, ant=None, alpha=40.0, prospect_version="5", typelidf=2, lidfb=0.0, rsoil0=None, rsoil=None, psoil=None, soil_spectrum1=None, soil_spectrum2=None))]
#[allow(clippy::too_many_arguments)]
fn run_progeosail<'py>(
    py: Python<'py>,
    chw: f64,
    ccover: f64,
    cshp: &str,
    n: f64,
    cab: f64,
    car: f64,
    cbrown: f64,
    cw: f64,
    cm: f64,
    lai: f64,
    lidfa: f64,
    hspot: f64,
    tts: f64,
    tto: f64,
    psi: f64,
    ant: Option<f64>,
    alpha: f64,
    prospect_version: &str,
    typelidf: u8,
    lidfb: f64,
    rsoil0: Option<PyReadonlyArray1<'_, f64>>,
    rsoil: Option<f64>,
    psoil: Option<f64>,
    soil_spectrum1: Option<PyReadonlyArray1<'_, f64>>,
    soil_spectrum2: Option<PyReadonlyArray1<'_, f64>>,
) -> PyResult<Bound<'py, PyArray1<f64>>> {
    let shape: CrownShape = cshp.parse()?;
    let crown = CrownGeometry {
        height_to_width: chw,
        cover: ccover,
        shape,
    };
    let version: ProspectVersion = prospect_version.parse()?;
    let params = LeafParameters {
        n,
        cab,
        car,
        ant,
        cbrown,
        cw,
        cm,
    };
    let spec = lidf_spec(typelidf, lidfa, lidfb)?;
    let soil_source = SoilSource::from_optional(
        optional_vec(rsoil0)?,
        psoil,
        rsoil,
        optional_vec(soil_spectrum1)?,
        optional_vec(soil_spectrum2)?,
    )?;
    let structure = CanopyStructure { lai, hotspot: hspot };
    let geometry = Geometry { tts, tto, psi };

    info!("processing progeosail for lai={lai}, cover={ccover}, shape={cshp}");
    let scene = canopy::run_progeosail(
        &crown,
        &params,
        version,
        alpha,
        &spec,
        &soil_source,
        &structure,
        &geometry,
        canopy::spectral_library(),
    )?;
    Ok(scene.into_pyarray(py))
}

/// Run the SAIL layer solution in the thermal domain.
///
/// `lam` is the thermal wavelength grid in µm; `tveg`/`tsoil` are the
/// shaded leaf and soil temperatures, `tveg_sunlit`/`tsoil_sunlit` their
/// sunlit counterparts and `t_atm` the sky emission temperature, all in
/// K. Either reflectance or emissivity may be given for leaves
/// (`refl`/`emv`) and soil (`rsoil`/`ems`); the missing member of each
/// pair is completed as 1 minus the other. Returns `(radiance,
/// brightness_temperature, directional_emissivity)` on the `lam` grid.
#[pyfunction]
#[pyo3(signature = (lam, tveg, tsoil, tveg_sunlit, tsoil_sunlit, t_atm, lai, lidfa, hspot, tts, tto, psi, rsoil=None, refl=None, emv=None, ems=None, typelidf=2, lidfb=0.0))]
#[allow(clippy::too_many_arguments)]
fn run_thermal_sail<'py>(
    py: Python<'py>,
    lam: PyReadonlyArray1<'_, f64>,
    tveg: f64,
    tsoil: f64,
    tveg_sunlit: f64,
    tsoil_sunlit: f64,
    t_atm: f64,
    lai: f64,
    lidfa: f64,
    hspot: f64,
    tts: f64,
    tto: f64,
    psi: f64,
    rsoil: Option<PyReadonlyArray1<'_, f64>>,
    refl: Option<PyReadonlyArray1<'_, f64>>,
    emv: Option<PyReadonlyArray1<'_, f64>>,
    ems: Option<PyReadonlyArray1<'_, f64>>,
    typelidf: u8,
    lidfb: f64,
) -> PyResult<(
    Bound<'py, PyArray1<f64>>,
    Bound<'py, PyArray1<f64>>,
    Bound<'py, PyArray1<f64>>,
)> {
    let spec = lidf_spec(typelidf, lidfa, lidfb)?;
    let lidf = Lidf::with_default_classes(&spec)?;
    let surface = ThermalSurface::from_optional(
        optional_vec(refl)?,
        optional_vec(emv)?,
        optional_vec(rsoil)?,
        optional_vec(ems)?,
    )?;
    let temps = ComponentTemperatures {
        tveg,
        tsoil,
        tveg_sunlit,
        tsoil_sunlit,
        t_atm,
    };
    let structure = CanopyStructure { lai, hotspot: hspot };
    let geometry = Geometry { tts, tto, psi };

    info!("processing thermal sail for lai={lai}, tts={tts}, tto={tto}");
    let outputs = canopy::thermal::thermal_radiance(
        lam.as_slice()?,
        &temps,
        &lidf,
        &structure,
        &geometry,
        &surface,
    )?;
    Ok((
        outputs.radiance.into_pyarray(py),
        outputs.brightness_temperature.into_pyarray(py),
        outputs.directional_emissivity.into_pyarray(py),
    ))
}

/// A Python module implemented in Rust.
#[pymodule]
fn canopy_rtm(m: &Bound<'_, PyModule>) -> PyResult<()> {
    pyo3_log::init();

    m.add_function(wrap_pyfunction!(run_prospect, m)?)?;
    m.add_function(wrap_pyfunction!(run_sail, m)?)?;
    m.add_function(wrap_pyfunction!(run_prosail, m)?)?;
    m.add_function(wrap_pyfunction!(run_progeosail, m)?)?;
    m.add_function(wrap_pyfunction!(run_thermal_sail, m)?)?;
    Ok(())
}
