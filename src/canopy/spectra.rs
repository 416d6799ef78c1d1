//! Bundled per-wavelength physical constants.
//!
//! The leaf constants (refractive index and specific absorption
//! coefficients) and the two reference soil spectra are shipped as plain
//! text tables and parsed once into a process-wide read-only
//! [`SpectralLibrary`]. The numeric engines receive the library by
//! reference; [`spectral_library`] hands out the bundled instance.

use std::sync::OnceLock;

use crate::error::ModelError;

/// Shortest wavelength on the grid, in nm.
pub const WL_MIN: usize = 400;
/// Longest wavelength on the grid, in nm.
pub const WL_MAX: usize = 2500;
/// Number of samples on the fixed 1 nm grid.
pub const N_SAMPLES: usize = WL_MAX - WL_MIN + 1;

const LEAF_TABLE: &str = include_str!("../../data/prospect_d_spectra.txt");
const SOIL_TABLE: &str = include_str!("../../data/soil_reflectance.txt");

/// Per-wavelength constants on the fixed 400–2500 nm grid.
///
/// Every field has length [`N_SAMPLES`]. Specific absorption coefficients
/// are per unit of the corresponding biochemical concentration, so the
/// products `cab * kab` etc. are dimensionless optical depths.
#[derive(Debug)]
pub struct SpectralLibrary {
    /// Leaf interior refractive index.
    pub nr: Vec<f64>,
    /// Chlorophyll a+b specific absorption, cm² µg⁻¹.
    pub kab: Vec<f64>,
    /// Carotenoid specific absorption, cm² µg⁻¹.
    pub kcar: Vec<f64>,
    /// Anthocyanin specific absorption, cm² µg⁻¹.
    pub kant: Vec<f64>,
    /// Brown pigment specific absorption, unitless scaling.
    pub kbrown: Vec<f64>,
    /// Liquid water specific absorption, cm⁻¹.
    pub kw: Vec<f64>,
    /// Dry matter specific absorption, cm² g⁻¹.
    pub km: Vec<f64>,
    /// First reference soil reflectance (dry).
    pub soil_dry: Vec<f64>,
    /// Second reference soil reflectance (wet).
    pub soil_wet: Vec<f64>,
}

/// The bundled spectral constants, parsed on first use.
pub fn spectral_library() -> &'static SpectralLibrary {
    static LIBRARY: OnceLock<SpectralLibrary> = OnceLock::new();
    LIBRARY.get_or_init(|| {
        let leaf = parse_table(LEAF_TABLE, 8, "leaf constants");
        let soil = parse_table(SOIL_TABLE, 3, "soil reflectance");
        SpectralLibrary {
            nr: leaf[1].clone(),
            kab: leaf[2].clone(),
            kcar: leaf[3].clone(),
            kant: leaf[4].clone(),
            kbrown: leaf[5].clone(),
            kw: leaf[6].clone(),
            km: leaf[7].clone(),
            soil_dry: soil[1].clone(),
            soil_wet: soil[2].clone(),
        }
    })
}

/// The wavelength axis in nm, 400 to 2500 inclusive.
pub fn wavelengths() -> Vec<f64> {
    (WL_MIN..=WL_MAX).map(|wl| wl as f64).collect()
}

/// Parse a whitespace-separated table into one column vector per column.
///
/// The bundled tables are part of the binary, so a malformed row is a
/// packaging defect and panics rather than returning an error.
fn parse_table(text: &str, columns: usize, what: &str) -> Vec<Vec<f64>> {
    let mut out = vec![Vec::with_capacity(N_SAMPLES); columns];
    for (lineno, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let mut fields = 0;
        for (column, field) in line.split_whitespace().enumerate() {
            let value: f64 = field
                .parse()
                .unwrap_or_else(|_| panic!("bundled {what} table, line {}: bad field", lineno + 1));
            out[column].push(value);
            fields = column + 1;
        }
        assert!(
            fields == columns,
            "bundled {what} table, line {}: expected {columns} columns",
            lineno + 1
        );
    }
    assert!(
        out[0].len() == N_SAMPLES,
        "bundled {what} table: expected {N_SAMPLES} rows, found {}",
        out[0].len()
    );
    out
}

/// Check that a caller-supplied spectrum sits on the fixed grid.
pub(crate) fn check_grid(name: &str, spectrum: &[f64]) -> Result<(), ModelError> {
    if spectrum.len() != N_SAMPLES {
        return Err(ModelError::InvalidParameter(format!(
            "{name} must have {N_SAMPLES} samples (400-2500 nm at 1 nm), got {}",
            spectrum.len()
        )));
    }
    Ok(())
}
