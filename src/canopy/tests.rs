use approx::{assert_abs_diff_eq, assert_relative_eq};

use super::spectra::N_SAMPLES;
use super::*;
use crate::error::ModelError;

/// The PROSPECT-D reference leaf used across the canopy tests.
fn leaf_d() -> LeafParameters {
    LeafParameters {
        n: 1.5,
        cab: 40.0,
        car: 8.0,
        ant: Some(8.0),
        cbrown: 0.0,
        cw: 0.01,
        cm: 0.009,
    }
}

fn bin(wavelength_nm: usize) -> usize {
    wavelength_nm - spectra::WL_MIN
}

#[test]
fn prospect_conserves_energy() {
    let lib = spectral_library();
    let cases = [
        leaf_d(),
        LeafParameters {
            n: 1.0,
            cab: 0.0,
            car: 0.0,
            ant: Some(0.0),
            cbrown: 0.0,
            cw: 0.0,
            cm: 0.0,
        },
        LeafParameters {
            n: 2.5,
            cab: 90.0,
            car: 20.0,
            ant: Some(15.0),
            cbrown: 1.0,
            cw: 0.04,
            cm: 0.02,
        },
    ];
    for params in &cases {
        let optics = leaf_optics(params, ProspectVersion::D, 40.0, lib).unwrap();
        for (i, (r, t)) in optics
            .reflectance
            .iter()
            .zip(&optics.transmittance)
            .enumerate()
        {
            assert!((0.0..=1.0).contains(r), "reflectance {r} at bin {i}");
            assert!((0.0..=1.0).contains(t), "transmittance {t} at bin {i}");
            assert!(r + t <= 1.0 + 1e-9, "energy violation {} at bin {i}", r + t);
        }
    }
}

#[test]
fn prospect_five_ignores_anthocyanin() {
    let lib = spectral_library();
    let mut with_ant = leaf_d();
    with_ant.ant = Some(25.0);
    let mut without_ant = leaf_d();
    without_ant.ant = None;

    let a = leaf_optics(&with_ant, ProspectVersion::Five, 40.0, lib).unwrap();
    let b = leaf_optics(&without_ant, ProspectVersion::Five, 40.0, lib).unwrap();
    assert_eq!(a.reflectance, b.reflectance);
    assert_eq!(a.transmittance, b.transmittance);
}

#[test]
fn prospect_d_requires_anthocyanin() {
    let lib = spectral_library();
    let mut params = leaf_d();
    params.ant = None;
    let err = leaf_optics(&params, ProspectVersion::D, 40.0, lib).unwrap_err();
    assert!(matches!(err, ModelError::InvalidParameter(_)), "{err}");
}

#[test]
fn prospect_rejects_negative_contents() {
    let lib = spectral_library();
    let mut params = leaf_d();
    params.cab = -1.0;
    let err = leaf_optics(&params, ProspectVersion::D, 40.0, lib).unwrap_err();
    assert!(matches!(err, ModelError::InvalidParameter(_)), "{err}");
}

#[test]
fn prospect_shows_chlorophyll_absorption() {
    // A green leaf reflects less at the red absorption peak than in the
    // green plateau.
    let lib = spectral_library();
    let optics = leaf_optics(&leaf_d(), ProspectVersion::D, 40.0, lib).unwrap();
    assert!(
        optics.reflectance[bin(670)] < optics.reflectance[bin(550)],
        "R(670) = {}, R(550) = {}",
        optics.reflectance[bin(670)],
        optics.reflectance[bin(550)]
    );
}

#[test]
fn exponential_integral_matches_reference() {
    // E1 at a few tabulated points.
    assert_relative_eq!(prospect::exp_int_e1(1.0), 0.2193839, max_relative = 1e-5);
    assert_relative_eq!(prospect::exp_int_e1(0.5), 0.5597736, max_relative = 1e-5);
    assert_relative_eq!(prospect::exp_int_e1(2.0), 0.0489005, max_relative = 1e-4);
    // Continuity across the approximation switch at x = 1.
    assert_relative_eq!(
        prospect::exp_int_e1(1.0 - 1e-9),
        prospect::exp_int_e1(1.0 + 1e-9),
        max_relative = 1e-5
    );
}

#[test]
fn lidf_two_parameter_weights_are_a_distribution() {
    for (a, b) in [
        (-0.35, -0.15),
        (0.0, 0.0),
        (0.5, 0.5),
        (-1.0, 0.0),
        (1.0, 0.0),
        (0.3, -0.6),
    ] {
        let lidf = Lidf::with_default_classes(&LidfSpec::TwoParameter { a, b }).unwrap();
        let total: f64 = lidf.weights().iter().sum();
        assert_abs_diff_eq!(total, 1.0, epsilon = 1e-6);
        for &w in lidf.weights() {
            assert!(w >= -1e-12, "negative weight {w} for a={a}, b={b}");
        }
    }
}

#[test]
fn lidf_ellipsoidal_weights_are_a_distribution() {
    for mean_angle in [0.0, 5.0, 30.0, 57.0, 85.0, 90.0] {
        let lidf = Lidf::with_default_classes(&LidfSpec::Ellipsoidal { mean_angle }).unwrap();
        let total: f64 = lidf.weights().iter().sum();
        assert_abs_diff_eq!(total, 1.0, epsilon = 1e-6);
        assert!(lidf.weights().iter().all(|&w| w >= 0.0));
    }
}

#[test]
fn lidf_mean_angle_shifts_the_distribution() {
    // An erectophile canopy puts more weight on steep inclinations than a
    // planophile one.
    let planophile = Lidf::with_default_classes(&LidfSpec::Ellipsoidal { mean_angle: 20.0 }).unwrap();
    let erectophile = Lidf::with_default_classes(&LidfSpec::Ellipsoidal { mean_angle: 80.0 }).unwrap();
    let steep = |l: &Lidf| -> f64 { l.weights().iter().rev().take(4).sum() };
    assert!(steep(&erectophile) > steep(&planophile));
}

#[test]
fn lidf_rejects_out_of_domain_parameters() {
    for spec in [
        LidfSpec::TwoParameter { a: 0.8, b: 0.5 },
        LidfSpec::TwoParameter { a: 1.2, b: 0.0 },
        LidfSpec::TwoParameter { a: 0.0, b: -1.1 },
        LidfSpec::Ellipsoidal { mean_angle: 120.0 },
        LidfSpec::Ellipsoidal { mean_angle: -5.0 },
    ] {
        let err = Lidf::with_default_classes(&spec).unwrap_err();
        assert!(matches!(err, ModelError::InvalidParameter(_)), "{err}");
    }
    let err = Lidf::new(&LidfSpec::Ellipsoidal { mean_angle: 57.0 }, 0).unwrap_err();
    assert!(matches!(err, ModelError::InvalidParameter(_)), "{err}");
}

#[test]
fn soil_explicit_spectrum_passes_through() {
    let lib = spectral_library();
    let spectrum: Vec<f64> = (0..N_SAMPLES).map(|i| 0.1 + 1e-5 * i as f64).collect();
    let resolved = SoilSource::Explicit(spectrum.clone()).resolve(lib).unwrap();
    assert_eq!(resolved, spectrum);
}

#[test]
fn soil_fully_dry_mixture_is_the_dry_spectrum() {
    let lib = spectral_library();
    let dry: Vec<f64> = vec![0.3; N_SAMPLES];
    let wet: Vec<f64> = vec![0.1; N_SAMPLES];
    let resolved = SoilSource::Mixed {
        dry: Some(dry.clone()),
        wet: Some(wet),
        psoil: 1.0,
        rsoil: 1.0,
    }
    .resolve(lib)
    .unwrap();
    assert_eq!(resolved, dry);
}

#[test]
fn soil_mixture_interpolates_and_scales() {
    let lib = spectral_library();
    let resolved = SoilSource::Mixed {
        dry: Some(vec![0.4; N_SAMPLES]),
        wet: Some(vec![0.2; N_SAMPLES]),
        psoil: 0.25,
        rsoil: 0.5,
    }
    .resolve(lib)
    .unwrap();
    for &v in &resolved {
        assert_relative_eq!(v, 0.5 * (0.25 * 0.4 + 0.75 * 0.2), max_relative = 1e-12);
    }
}

#[test]
fn soil_lone_mixing_scalar_is_rejected() {
    let err = SoilSource::from_optional(None, Some(0.5), None, None, None).unwrap_err();
    assert!(matches!(err, ModelError::InvalidParameter(_)), "{err}");
    let err = SoilSource::from_optional(None, None, Some(0.8), None, None).unwrap_err();
    assert!(matches!(err, ModelError::InvalidParameter(_)), "{err}");
}

#[test]
fn soil_default_is_the_dry_reference() {
    let lib = spectral_library();
    let resolved = SoilSource::default().resolve(lib).unwrap();
    assert_eq!(resolved, lib.soil_dry);
}

#[test]
fn soil_explicit_wins_over_mixing_scalars() {
    let lib = spectral_library();
    let spectrum = vec![0.2; N_SAMPLES];
    let source =
        SoilSource::from_optional(Some(spectrum.clone()), Some(0.3), Some(0.7), None, None)
            .unwrap();
    assert_eq!(source.resolve(lib).unwrap(), spectrum);
}

fn flat_leaf(rho: f64, tau: f64) -> (Vec<f64>, Vec<f64>) {
    (vec![rho; N_SAMPLES], vec![tau; N_SAMPLES])
}

fn spherical_lidf() -> Lidf {
    Lidf::with_default_classes(&LidfSpec::Ellipsoidal { mean_angle: 57.0 }).unwrap()
}

#[test]
fn sail_with_no_canopy_returns_the_soil() {
    let (rho, tau) = flat_leaf(0.45, 0.45);
    let soil: Vec<f64> = (0..N_SAMPLES).map(|i| 0.05 + 1e-4 * i as f64).collect();
    let outputs = canopy_reflectance(
        &rho,
        &tau,
        &spherical_lidf(),
        &soil,
        &CanopyStructure {
            lai: 0.0,
            hotspot: 0.05,
        },
        &Geometry {
            tts: 30.0,
            tto: 10.0,
            psi: 90.0,
        },
    )
    .unwrap();
    assert_eq!(outputs.rsot, soil);
    assert_eq!(outputs.rddt, soil);
    assert_eq!(outputs.rsdt, soil);
    assert_eq!(outputs.rdot, soil);
    assert_eq!(outputs.tss, 1.0);
}

#[test]
fn sail_hotspot_vanishes_in_the_limit() {
    // Near backscatter but off the exact retro direction, a vanishing
    // hotspot parameter must reproduce the uncorrelated result.
    let (rho, tau) = flat_leaf(0.3, 0.25);
    let soil = vec![0.15; N_SAMPLES];
    let structure = |hotspot| CanopyStructure { lai: 3.0, hotspot };
    let geometry = Geometry {
        tts: 30.0,
        tto: 29.0,
        psi: 0.0,
    };
    let with_tiny = canopy_reflectance(
        &rho,
        &tau,
        &spherical_lidf(),
        &soil,
        &structure(1e-9),
        &geometry,
    )
    .unwrap();
    let without = canopy_reflectance(
        &rho,
        &tau,
        &spherical_lidf(),
        &soil,
        &structure(0.0),
        &geometry,
    )
    .unwrap();
    assert_relative_eq!(with_tiny.rso[0], without.rso[0], max_relative = 1e-5);
    assert_relative_eq!(with_tiny.rsot[0], without.rsot[0], max_relative = 1e-5);
}

#[test]
fn sail_hotspot_brightens_the_retro_direction() {
    let (rho, tau) = flat_leaf(0.3, 0.25);
    let soil = vec![0.15; N_SAMPLES];
    let geometry = Geometry {
        tts: 30.0,
        tto: 30.0,
        psi: 0.0,
    };
    let with_hotspot = canopy_reflectance(
        &rho,
        &tau,
        &spherical_lidf(),
        &soil,
        &CanopyStructure {
            lai: 3.0,
            hotspot: 0.2,
        },
        &geometry,
    )
    .unwrap();
    let without = canopy_reflectance(
        &rho,
        &tau,
        &spherical_lidf(),
        &soil,
        &CanopyStructure {
            lai: 3.0,
            hotspot: 0.0,
        },
        &geometry,
    )
    .unwrap();
    assert!(with_hotspot.rso[0] > without.rso[0]);
}

#[test]
fn sail_black_soil_stays_below_leaf_reflectance() {
    let lib = spectral_library();
    let optics = leaf_optics(&leaf_d(), ProspectVersion::D, 40.0, lib).unwrap();
    let outputs = run_prosail(
        &leaf_d(),
        ProspectVersion::D,
        40.0,
        &LidfSpec::Ellipsoidal { mean_angle: 57.0 },
        &SoilSource::Explicit(vec![0.0; N_SAMPLES]),
        &CanopyStructure {
            lai: 3.0,
            hotspot: 0.01,
        },
        &Geometry {
            tts: 30.0,
            tto: 0.0,
            psi: 0.0,
        },
        lib,
    )
    .unwrap();
    for (i, (&sdr, &rho)) in outputs.rsot.iter().zip(&optics.reflectance).enumerate() {
        if rho > 0.0 {
            assert!(sdr < rho, "sdr {sdr} >= leaf reflectance {rho} at bin {i}");
        }
    }
}

#[test]
fn sail_factors_stay_physical() {
    let lib = spectral_library();
    let outputs = run_prosail(
        &leaf_d(),
        ProspectVersion::D,
        40.0,
        &LidfSpec::Ellipsoidal { mean_angle: 45.0 },
        &SoilSource::default(),
        &CanopyStructure {
            lai: 2.0,
            hotspot: 0.1,
        },
        &Geometry {
            tts: 35.0,
            tto: 12.0,
            psi: 48.0,
        },
        lib,
    )
    .unwrap();
    for factors in [&outputs.rsot, &outputs.rddt, &outputs.rsdt, &outputs.rdot] {
        assert!(factors.iter().all(|&v| (0.0..=1.0).contains(&v)));
    }
    assert!(outputs.tss > 0.0 && outputs.tss < 1.0);
    assert!(outputs.too > 0.0 && outputs.too < 1.0);
}

#[test]
fn sail_rejects_out_of_domain_inputs() {
    let (rho, tau) = flat_leaf(0.3, 0.25);
    let soil = vec![0.15; N_SAMPLES];
    let lidf = spherical_lidf();
    let good_geometry = Geometry {
        tts: 30.0,
        tto: 0.0,
        psi: 0.0,
    };

    let err = canopy_reflectance(
        &rho,
        &tau,
        &lidf,
        &soil,
        &CanopyStructure {
            lai: -1.0,
            hotspot: 0.1,
        },
        &good_geometry,
    )
    .unwrap_err();
    assert!(matches!(err, ModelError::InvalidParameter(_)), "{err}");

    let err = canopy_reflectance(
        &rho,
        &tau,
        &lidf,
        &soil,
        &CanopyStructure {
            lai: 3.0,
            hotspot: 1.0,
        },
        &good_geometry,
    )
    .unwrap_err();
    assert!(matches!(err, ModelError::InvalidParameter(_)), "{err}");

    let err = canopy_reflectance(
        &rho,
        &tau,
        &lidf,
        &soil,
        &CanopyStructure {
            lai: 3.0,
            hotspot: 0.1,
        },
        &Geometry {
            tts: 95.0,
            tto: 0.0,
            psi: 0.0,
        },
    )
    .unwrap_err();
    assert!(matches!(err, ModelError::InvalidParameter(_)), "{err}");

    let short = vec![0.3; 100];
    let err = canopy_reflectance(
        &short,
        &tau,
        &lidf,
        &soil,
        &CanopyStructure {
            lai: 3.0,
            hotspot: 0.1,
        },
        &good_geometry,
    )
    .unwrap_err();
    assert!(matches!(err, ModelError::InvalidParameter(_)), "{err}");
}

#[test]
fn geo_area_fractions_sum_to_one() {
    for shape in [CrownShape::Cone, CrownShape::Cylinder] {
        for (chw, cover, tts) in [
            (1.5, 0.5, 30.0),
            (0.3, 0.2, 45.0),
            (2.0, 0.9, 70.0),
            (1.0, 0.0, 10.0),
            (0.8, 1.0, 60.0),
        ] {
            let crown = CrownGeometry {
                height_to_width: chw,
                cover,
                shape,
            };
            let f = geo::area_fractions(&crown, tts);
            let total =
                f.illuminated_crown + f.shaded_crown + f.illuminated_soil + f.shaded_soil;
            assert_abs_diff_eq!(total, 1.0, epsilon = 1e-12);
            for part in [
                f.illuminated_crown,
                f.shaded_crown,
                f.illuminated_soil,
                f.shaded_soil,
            ] {
                assert!(part >= 0.0, "negative fraction {part} ({shape:?}, chw={chw})");
            }
        }
    }
}

fn flat_crown_optics(rc: f64, tc: f64, rch: f64) -> CrownOptics {
    CrownOptics {
        rc: vec![rc; N_SAMPLES],
        tc: vec![tc; N_SAMPLES],
        rch: vec![rch; N_SAMPLES],
    }
}

#[test]
fn geo_full_cover_cylinder_is_the_crown_term() {
    let optics = flat_crown_optics(0.32, 0.18, 0.4);
    let soil = vec![0.25; N_SAMPLES];
    let crown = CrownGeometry {
        height_to_width: 1.5,
        cover: 1.0,
        shape: CrownShape::Cylinder,
    };
    let geometry = Geometry {
        tts: 30.0,
        tto: 0.0,
        psi: 0.0,
    };
    let scene = discontinuous_canopy(&optics, &soil, &crown, &geometry).unwrap();
    for &v in &scene {
        assert_relative_eq!(v, 0.32, max_relative = 1e-12);
    }
}

#[test]
fn geo_short_cone_never_self_shades() {
    // A squat cone below the self-shading threshold sees no shaded crown.
    let crown = CrownGeometry {
        height_to_width: 0.2,
        cover: 0.6,
        shape: CrownShape::Cone,
    };
    let f = geo::area_fractions(&crown, 30.0);
    assert_eq!(f.shaded_crown, 0.0);
    assert_abs_diff_eq!(f.illuminated_crown, 0.6, epsilon = 1e-12);
}

#[test]
fn geo_sparse_cover_blends_toward_the_soil() {
    let optics = flat_crown_optics(0.4, 0.2, 0.45);
    let soil = vec![0.1; N_SAMPLES];
    let geometry = Geometry {
        tts: 30.0,
        tto: 0.0,
        psi: 0.0,
    };
    let scene_at = |cover| {
        let crown = CrownGeometry {
            height_to_width: 1.0,
            cover,
            shape: CrownShape::Cylinder,
        };
        discontinuous_canopy(&optics, &soil, &crown, &geometry).unwrap()[0]
    };
    let sparse = scene_at(0.1);
    let dense = scene_at(0.9);
    assert!(sparse < dense);
    assert!(sparse > 0.0);
}

#[test]
fn geo_rejects_non_nadir_view() {
    let optics = flat_crown_optics(0.3, 0.2, 0.4);
    let soil = vec![0.2; N_SAMPLES];
    let crown = CrownGeometry {
        height_to_width: 1.5,
        cover: 0.5,
        shape: CrownShape::Cone,
    };
    let err = discontinuous_canopy(
        &optics,
        &soil,
        &crown,
        &Geometry {
            tts: 30.0,
            tto: 15.0,
            psi: 0.0,
        },
    )
    .unwrap_err();
    assert!(matches!(err, ModelError::UnsupportedConfiguration(_)), "{err}");
}

#[test]
fn geo_rejects_bad_crown_geometry() {
    let optics = flat_crown_optics(0.3, 0.2, 0.4);
    let soil = vec![0.2; N_SAMPLES];
    let geometry = Geometry {
        tts: 30.0,
        tto: 0.0,
        psi: 0.0,
    };
    for crown in [
        CrownGeometry {
            height_to_width: 0.0,
            cover: 0.5,
            shape: CrownShape::Cone,
        },
        CrownGeometry {
            height_to_width: 1.5,
            cover: 1.5,
            shape: CrownShape::Cylinder,
        },
    ] {
        let err = discontinuous_canopy(&optics, &soil, &crown, &geometry).unwrap_err();
        assert!(matches!(err, ModelError::InvalidParameter(_)), "{err}");
    }
}

#[test]
fn factor_and_shape_names_parse() {
    assert_eq!("sdr".parse::<ReflFactor>().unwrap(), ReflFactor::Sdr);
    assert_eq!("ALLALL".parse::<ReflFactor>().unwrap(), ReflFactor::AllAll);
    assert!(matches!(
        "banana".parse::<ReflFactor>().unwrap_err(),
        ModelError::InvalidParameter(_)
    ));

    assert_eq!("Cone".parse::<CrownShape>().unwrap(), CrownShape::Cone);
    assert_eq!("cylinder".parse::<CrownShape>().unwrap(), CrownShape::Cylinder);
    assert!(matches!(
        "sphere".parse::<CrownShape>().unwrap_err(),
        ModelError::UnsupportedShape(_)
    ));

    assert_eq!("5".parse::<ProspectVersion>().unwrap(), ProspectVersion::Five);
    assert_eq!("d".parse::<ProspectVersion>().unwrap(), ProspectVersion::D);
    assert!(matches!(
        "PRO".parse::<ProspectVersion>().unwrap_err(),
        ModelError::InvalidParameter(_)
    ));
}

#[test]
fn factor_selection_picks_the_right_terms() {
    let lib = spectral_library();
    let outputs = run_prosail(
        &leaf_d(),
        ProspectVersion::D,
        40.0,
        &LidfSpec::Ellipsoidal { mean_angle: 57.0 },
        &SoilSource::default(),
        &CanopyStructure {
            lai: 2.0,
            hotspot: 0.05,
        },
        &Geometry {
            tts: 30.0,
            tto: 0.0,
            psi: 0.0,
        },
        lib,
    )
    .unwrap();
    let rsot = outputs.rsot.clone();
    match outputs.clone().select(ReflFactor::Sdr) {
        FactorSelection::Single(spectrum) => assert_eq!(spectrum, rsot),
        other => panic!("expected a single factor, got {other:?}"),
    }
    match outputs.select(ReflFactor::All) {
        FactorSelection::All { sdr, .. } => assert_eq!(sdr, rsot),
        other => panic!("expected the four factors, got {other:?}"),
    }
}

#[test]
fn thermal_isothermal_black_scene_recovers_the_temperature() {
    let lam = [8.0, 10.0, 12.0];
    let n = lam.len();
    let surface = ThermalSurface::from_optional(
        Some(vec![0.0; n]),
        None,
        Some(vec![0.0; n]),
        None,
    )
    .unwrap();
    let temps = ComponentTemperatures {
        tveg: 300.0,
        tsoil: 300.0,
        tveg_sunlit: 300.0,
        tsoil_sunlit: 300.0,
        t_atm: 300.0,
    };
    let outputs = thermal::thermal_radiance(
        &lam,
        &temps,
        &spherical_lidf(),
        &CanopyStructure {
            lai: 2.0,
            hotspot: 0.01,
        },
        &Geometry {
            tts: 30.0,
            tto: 0.0,
            psi: 0.0,
        },
        &surface,
    )
    .unwrap();
    for (&tb, &em) in outputs
        .brightness_temperature
        .iter()
        .zip(&outputs.directional_emissivity)
    {
        assert_relative_eq!(tb, 300.0, max_relative = 1e-9);
        assert_relative_eq!(em, 1.0, max_relative = 1e-9);
    }
}

#[test]
fn thermal_surface_completes_missing_members() {
    let surface =
        ThermalSurface::from_optional(Some(vec![0.02, 0.04]), None, None, Some(vec![0.95, 0.9]))
            .unwrap();
    assert_relative_eq!(surface.emv[0], 0.98, max_relative = 1e-12);
    assert_relative_eq!(surface.rsoil[1], 0.1, max_relative = 1e-12);

    let err = ThermalSurface::from_optional(None, None, Some(vec![0.1]), None).unwrap_err();
    assert!(matches!(err, ModelError::InvalidParameter(_)), "{err}");
}

#[test]
fn progeosail_composes_end_to_end() {
    let lib = spectral_library();
    let crown = CrownGeometry {
        height_to_width: 1.5,
        cover: 0.5,
        shape: CrownShape::Cone,
    };
    let scene = run_progeosail(
        &crown,
        &leaf_d(),
        ProspectVersion::D,
        40.0,
        &LidfSpec::Ellipsoidal { mean_angle: 57.0 },
        &SoilSource::default(),
        &CanopyStructure {
            lai: 3.0,
            hotspot: 0.05,
        },
        &Geometry {
            tts: 30.0,
            tto: 0.0,
            psi: 0.0,
        },
        lib,
    )
    .unwrap();
    assert_eq!(scene.len(), N_SAMPLES);
    assert!(scene.iter().all(|&v| v.is_finite() && (0.0..=1.0).contains(&v)));
    // The scene keeps the vegetation signature: red absorption below the
    // near-infrared plateau.
    assert!(scene[bin(670)] < scene[bin(860)]);
}
