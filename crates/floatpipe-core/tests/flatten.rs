use std::path::{Path, PathBuf};

use floatpipe_core::flatten::flatten_dataset;
use floatpipe_core::reader::ProfileDataset;

fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("floatpipe-flatten-{name}-{}", std::process::id()));
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).expect("failed to create scratch dir");
    dir
}

/// 2 profiles x 3 levels, with a fill value in TEMP and per-profile
/// coordinates that must broadcast over the level dimension.
fn write_profile_fixture(path: &Path) {
    let mut file = netcdf::create(path).expect("failed to create fixture");

    file.add_dimension("N_PROF", 2).expect("dim");
    file.add_dimension("N_LEVELS", 3).expect("dim");

    let mut temp = file
        .add_variable::<f64>("TEMP", &["N_PROF", "N_LEVELS"])
        .expect("TEMP");
    temp.put_attribute("_FillValue", 99999.0f64).expect("attr");
    temp.put_values(&[10.0, 11.0, 12.0, 20.0, 21.0, 99999.0], ..)
        .expect("TEMP values");

    let mut pres = file
        .add_variable::<f64>("PRES", &["N_PROF", "N_LEVELS"])
        .expect("PRES");
    pres.put_values(&[5.0, 50.0, 500.0, 6.0, 60.0, 600.0], ..)
        .expect("PRES values");

    let mut lat = file.add_variable::<f64>("LATITUDE", &["N_PROF"]).expect("LATITUDE");
    lat.put_values(&[-10.5, 33.0], ..).expect("LATITUDE values");

    let mut juld = file.add_variable::<f64>("JULD", &["N_PROF"]).expect("JULD");
    juld.put_attribute("units", "days since 1950-01-01 00:00:00 UTC")
        .expect("attr");
    juld.put_values(&[18262.0, 18262.5], ..).expect("JULD values");
}

#[test]
fn one_row_per_dimension_index_combination() {
    let dir = scratch_dir("product");
    let path = dir.join("profile.nc");
    write_profile_fixture(&path);

    let dataset = ProfileDataset::open(&path).expect("open failed");
    let df = flatten_dataset(&dataset).expect("flatten failed");

    assert_eq!(df.height(), 6, "2 profiles x 3 levels");

    // Per-profile coordinates broadcast over levels.
    let lat = df.column("LATITUDE").unwrap().f64().unwrap();
    assert_eq!(lat.get(0), Some(-10.5));
    assert_eq!(lat.get(2), Some(-10.5));
    assert_eq!(lat.get(3), Some(33.0));

    let pres = df.column("PRES").unwrap().f64().unwrap();
    assert_eq!(pres.get(4), Some(60.0));
}

#[test]
fn fill_values_become_nulls() {
    let dir = scratch_dir("fill");
    let path = dir.join("profile.nc");
    write_profile_fixture(&path);

    let dataset = ProfileDataset::open(&path).expect("open failed");
    let df = flatten_dataset(&dataset).expect("flatten failed");

    let temp = df.column("TEMP").unwrap().f64().unwrap();
    assert_eq!(temp.get(5), None, "sentinel 99999.0 must be masked");
    assert_eq!(temp.get(0), Some(10.0));
}

#[test]
fn julian_day_coordinate_becomes_time_column() {
    let dir = scratch_dir("time");
    let path = dir.join("profile.nc");
    write_profile_fixture(&path);

    let dataset = ProfileDataset::open(&path).expect("open failed");
    let df = flatten_dataset(&dataset).expect("flatten failed");

    assert!(df.column("JULD").is_err(), "JULD is replaced by TIME");
    let time = df.column("TIME").unwrap().str().unwrap();
    // 18262 days after 1950-01-01 is 2000-01-01.
    assert_eq!(time.get(0), Some("2000-01-01 00:00:00"));
    assert_eq!(time.get(3), Some("2000-01-01 12:00:00"));
}

#[test]
fn zero_length_dimension_yields_empty_valid_frame() {
    let dir = scratch_dir("empty");
    let path = dir.join("empty.nc");

    {
        let mut file = netcdf::create(&path).expect("failed to create fixture");
        file.add_dimension("N_PROF", 0).expect("dim");
        file.add_variable::<f64>("TEMP", &["N_PROF"]).expect("TEMP");
    }

    let dataset = ProfileDataset::open(&path).expect("open failed");
    let df = flatten_dataset(&dataset).expect("flatten failed");

    assert_eq!(df.height(), 0);
    assert!(df.column("TEMP").is_ok(), "columns survive an empty frame");
}

#[test]
fn unreadable_file_is_a_source_format_error() {
    let dir = scratch_dir("corrupt");
    let path = dir.join("corrupt.nc");
    std::fs::write(&path, b"definitely not a netcdf file").expect("write");

    assert!(ProfileDataset::open(&path).is_err());
}
