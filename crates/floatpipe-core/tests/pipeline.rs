use std::path::{Path, PathBuf};

use floatpipe_core::config::{ExportTarget, MissingFieldPolicy, PipelineConfig};
use floatpipe_core::pipeline::{process_directory, process_single_file, summarize, write_summary};

fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("floatpipe-pipeline-{name}-{}", std::process::id()));
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).expect("failed to create scratch dir");
    dir
}

fn write_profile_fixture(path: &Path) {
    let mut file = netcdf::create(path).expect("failed to create fixture");

    file.add_dimension("N_PROF", 1).expect("dim");
    file.add_dimension("N_LEVELS", 4).expect("dim");

    let mut temp = file
        .add_variable::<f64>("TEMP", &["N_PROF", "N_LEVELS"])
        .expect("TEMP");
    temp.put_values(&[10.0, 8.0, 4.0, 2.0], ..).expect("TEMP values");

    let mut pres = file
        .add_variable::<f64>("PRES", &["N_PROF", "N_LEVELS"])
        .expect("PRES");
    pres.put_values(&[5.0, 50.0, 500.0, 900.0], ..)
        .expect("PRES values");

    let mut lat = file.add_variable::<f64>("LATITUDE", &["N_PROF"]).expect("LATITUDE");
    lat.put_values(&[-10.5], ..).expect("LATITUDE values");
}

fn config(output_dir: PathBuf) -> PipelineConfig {
    PipelineConfig {
        output_dir,
        targets: vec![ExportTarget::Csv],
        missing_fields: MissingFieldPolicy::Omit,
    }
}

#[tokio::test]
async fn single_file_reports_counts_columns_and_artifacts() {
    let input = scratch_dir("single-in");
    let output = scratch_dir("single-out");
    let path = input.join("R13857_001.nc");
    write_profile_fixture(&path);

    let result = process_single_file(&config(output), None, &path)
        .await
        .expect("processing failed");

    assert_eq!(result.rows_flattened, 4);
    assert_eq!(result.rows_processed, 4);
    assert_eq!(result.columns, vec!["LATITUDE", "PRES", "TEMP"]);
    assert_eq!(result.artifacts.len(), 1);
    assert!(Path::new(&result.artifacts[0].location).exists());
}

#[tokio::test]
async fn corrupt_file_fails_without_aborting_the_batch() {
    let input = scratch_dir("batch-in");
    let output = scratch_dir("batch-out");

    write_profile_fixture(&input.join("R13857_001.nc"));
    std::fs::write(input.join("R13857_002.nc"), b"garbage").expect("write corrupt file");
    write_profile_fixture(&input.join("R13857_003.nc"));

    let report = process_directory(&config(output.clone()), None, &input, "*.nc")
        .await
        .expect("batch failed");

    assert_eq!(report.outcomes.len(), 3);
    assert_eq!(report.processed_count(), 2);
    assert_eq!(report.failed_count(), 1);

    let summary = summarize(&report).expect("summarize failed");
    assert_eq!(summary.height(), 2, "failed file must not appear as a row");

    let summary_path = write_summary(&report, &output)
        .expect("write_summary failed")
        .expect("expected a summary artifact");
    assert!(summary_path.exists());
}

#[tokio::test]
async fn empty_directory_yields_empty_report_and_no_summary() {
    let input = scratch_dir("empty-in");
    let output = scratch_dir("empty-out");

    let report = process_directory(&config(output.clone()), None, &input, "*.nc")
        .await
        .expect("batch failed");

    assert!(report.outcomes.is_empty());
    assert!(write_summary(&report, &output).expect("write_summary failed").is_none());
}

#[tokio::test]
async fn file_without_required_columns_fails_that_file() {
    let input = scratch_dir("gate-in");
    let output = scratch_dir("gate-out");
    let path = input.join("no_temp.nc");

    {
        let mut file = netcdf::create(&path).expect("create");
        file.add_dimension("N_LEVELS", 2).expect("dim");
        let mut pres = file.add_variable::<f64>("PRES", &["N_LEVELS"]).expect("PRES");
        pres.put_values(&[5.0, 50.0], ..).expect("PRES values");
    }

    let err = process_single_file(&config(output.clone()), None, &path)
        .await
        .expect_err("expected required-field failure");
    assert!(err.to_string().contains("TEMP"));

    // No artifacts for a gated file.
    let leftovers = std::fs::read_dir(&output)
        .map(|entries| entries.count())
        .unwrap_or(0);
    assert_eq!(leftovers, 0);
}
