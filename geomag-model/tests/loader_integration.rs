use std::io::Write;

use approx::assert_abs_diff_eq;
use geomag_core::{GeodeticPoint, GeomagError};
use geomag_model::{evaluate_point, CoefficientStore, LoadOptions, MagneticCalculator};

const WMM2020: &str = include_str!("../coefs/WMM2020.COF");

const TWO_SECTIONS: &str = "\
2015.0 2014.75 12/15/2014
 x 2015.0 section
 1 0 -29442.0 0.0 10.3 0.0
 1 1 -1501.0 4797.1 18.1 -26.6
 x 2020.0 section
 1 0 -29404.5 0.0 6.7 0.0
 1 1 -1450.7 4652.9 7.7 -25.1
9999
";

fn write_temp(content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

// --- File loading ---

#[test]
fn loaded_file_matches_bundled_model() {
    let file = write_temp(WMM2020);
    let loaded = CoefficientStore::load(file.path(), &LoadOptions::default()).unwrap();
    let bundled = CoefficientStore::wmm2020().unwrap();

    assert_eq!(loaded.table(), bundled.table());
    assert!(!loaded.same_table(&bundled));
    assert_eq!(loaded.nmax(), 12);
    assert_eq!(loaded.len(), 91);
    assert_eq!(loaded.epoch(), 2020.0);
    assert_eq!(loaded.max_year(), 2025.0);
    assert!(loaded.has_secular_variation());
}

#[test]
fn missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("absent.COF");
    match CoefficientStore::load(&path, &LoadOptions::default()) {
        Err(GeomagError::Io { path: reported, .. }) => {
            assert!(reported.ends_with("absent.COF"));
        }
        other => panic!("expected Io error, got {:?}", other),
    }
}

#[test]
fn truncated_load_evaluates_lower_degree() {
    let file = write_temp(WMM2020);
    let options = LoadOptions::default().with_end_degree(6);
    let store = CoefficientStore::load(file.path(), &options).unwrap();
    assert_eq!(store.nmax(), 6);
    assert_eq!(store.len(), 28);

    let point = GeodeticPoint::new(40.0, -105.0, 0.0).unwrap();
    let low = evaluate_point(&store, &point, 2022.0).unwrap();
    let full = evaluate_point(&CoefficientStore::wmm2020().unwrap(), &point, 2022.0).unwrap();
    assert!(low != full);
    assert_abs_diff_eq!(low.f(), full.f(), epsilon = 1000.0);
}

#[test]
fn without_secular_variation_rates_are_zero() {
    let file = write_temp(WMM2020);
    let options = LoadOptions::default().without_secular_variation();
    let store = CoefficientStore::load(file.path(), &options).unwrap();
    assert!(!store.has_secular_variation());

    let mut calc = MagneticCalculator::new(store);
    calc.configure_decimal_year(2024.0).unwrap();
    calc.configure_position(10.0, 10.0, 0.0).unwrap();
    let rate = calc.field_rate().unwrap().value[0];
    assert_eq!((rate.x, rate.y, rate.z), (0.0, 0.0, 0.0));
}

#[test]
fn multi_epoch_file_selects_section() {
    let file = write_temp(TWO_SECTIONS);
    let store = CoefficientStore::load(file.path(), &LoadOptions::default().with_load_year(2015))
        .unwrap();
    assert_eq!(store.epoch(), 2015.0);
    assert_eq!(store.nmax(), 1);
    assert_eq!(store.g(), &[0.0, -29442.0, -1501.0]);

    let err = CoefficientStore::load(file.path(), &LoadOptions::default().with_load_year(2010))
        .unwrap_err();
    assert_eq!(err, GeomagError::YearNotFound { year: 2010 });
}

// --- Malformed input ---

#[test]
fn malformed_value_reports_line() {
    let broken = WMM2020.replacen("-29404.5", "-29404,5", 1);
    let file = write_temp(&broken);
    match CoefficientStore::load(file.path(), &LoadOptions::default()) {
        Err(GeomagError::MalformedCoefficientData { line, .. }) => assert_eq!(line, 2),
        other => panic!("expected malformed data, got {:?}", other),
    }
}

#[test]
fn missing_footer_is_malformed() {
    let body: String = WMM2020
        .lines()
        .filter(|l| !l.starts_with("9999"))
        .map(|l| format!("{}\n", l))
        .collect();
    let file = write_temp(&body);
    let err = CoefficientStore::load(file.path(), &LoadOptions::default()).unwrap_err();
    assert!(matches!(err, GeomagError::MalformedCoefficientData { .. }));
    assert!(!err.is_recoverable());
}

#[test]
fn empty_file_is_malformed() {
    let file = write_temp("");
    assert!(matches!(
        CoefficientStore::load(file.path(), &LoadOptions::default()),
        Err(GeomagError::MalformedCoefficientData { .. })
    ));
}

// --- Sharing ---

#[test]
fn calculators_share_one_table() {
    let store = CoefficientStore::wmm2020().unwrap();
    let a = MagneticCalculator::new(store.clone());
    let b = MagneticCalculator::new(store.clone());
    assert!(a.store().same_table(&store));
    assert!(a.store().same_table(b.store()));
}

#[cfg(feature = "serde")]
#[test]
fn load_options_round_trip() {
    let options = LoadOptions::default().with_end_degree(8).with_load_year(2020);
    let json = serde_json::to_string(&options).unwrap();
    let back: LoadOptions = serde_json::from_str(&json).unwrap();
    assert_eq!(back, options);
}
