use polars::prelude::*;

use floatpipe_core::project::{project, ALLOWED_COLUMNS};

fn frame(names: &[&str]) -> DataFrame {
    let columns = names
        .iter()
        .map(|name| Series::new((*name).into(), vec![Some(1.0f64)]).into())
        .collect();
    DataFrame::new(columns).expect("frame construction failed")
}

fn column_names(df: &DataFrame) -> Vec<String> {
    df.get_columns()
        .iter()
        .map(|c| c.name().to_string())
        .collect()
}

#[test]
fn keeps_allow_list_order_regardless_of_input_order() {
    let df = frame(&["PSAL", "TEMP", "LONGITUDE", "PRES", "LATITUDE"]);

    let out = project(&df);
    assert_eq!(
        column_names(&out),
        vec!["LATITUDE", "LONGITUDE", "PRES", "TEMP", "PSAL"]
    );
    assert_eq!(out.height(), df.height());
}

#[test]
fn omits_absent_columns_instead_of_padding() {
    let df = frame(&["TEMP", "PRES", "HISTORY_STEP"]);

    let out = project(&df);
    assert_eq!(column_names(&out), vec!["PRES", "TEMP"]);
}

#[test]
fn empty_intersection_yields_empty_frame_not_error() {
    let df = frame(&["HISTORY_STEP", "PLATFORM_NUMBER"]);

    let out = project(&df);
    assert_eq!(out.width(), 0);
}

#[test]
fn column_set_depends_only_on_which_columns_exist() {
    let a = frame(&["TEMP", "PRES", "DOXY"]);
    let mut b = frame(&["TEMP", "PRES", "DOXY"]);
    b = b
        .lazy()
        .filter(col("TEMP").gt(lit(100.0)))
        .collect()
        .expect("filter failed"); // same columns, zero rows

    assert_eq!(column_names(&project(&a)), column_names(&project(&b)));
}

#[test]
fn full_allow_list_projects_in_declared_order() {
    let df = frame(&ALLOWED_COLUMNS.iter().rev().copied().collect::<Vec<_>>());

    let out = project(&df);
    assert_eq!(column_names(&out), ALLOWED_COLUMNS.to_vec());
}
