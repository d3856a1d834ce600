use super::*;

fn header() -> Vec<String> {
    CATALOG_COLUMNS.iter().map(|c| (*c).to_owned()).collect()
}

fn row(cells: &[&str]) -> Vec<String> {
    cells.iter().map(|c| (*c).to_owned()).collect()
}

fn valid_row(id: &str) -> Vec<String> {
    row(&[id, "50.05", "8.67", "6", "09:00:00", "18:00:00", "4.5"])
}

// -----------------------------------------------------------------------
// parse_clock_time
// -----------------------------------------------------------------------

#[test]
fn parse_clock_time_accepts_hh_mm_ss() {
    assert_eq!(parse_clock_time("21:30:00"), Some(2130));
    assert_eq!(parse_clock_time("00:00:00"), Some(0));
    assert_eq!(parse_clock_time("23:59:59"), Some(2359));
}

#[test]
fn parse_clock_time_accepts_hh_mm() {
    assert_eq!(parse_clock_time("09:05"), Some(905));
}

#[test]
fn parse_clock_time_accepts_bare_hhmm() {
    assert_eq!(parse_clock_time("2130"), Some(2130));
    assert_eq!(parse_clock_time("0"), Some(0));
    assert_eq!(parse_clock_time(" 600 "), Some(600));
}

#[test]
fn parse_clock_time_rejects_out_of_range_values() {
    assert_eq!(parse_clock_time("24:00:00"), None);
    assert_eq!(parse_clock_time("2400"), None);
    assert_eq!(parse_clock_time("1260"), None);
    assert_eq!(parse_clock_time("noon"), None);
    assert_eq!(parse_clock_time(""), None);
}

// -----------------------------------------------------------------------
// normalize_records
// -----------------------------------------------------------------------

#[test]
fn normalize_records_converts_valid_rows_in_order() {
    let records = vec![header(), valid_row("b"), valid_row("a")];
    let catalog = normalize_records(&records).unwrap();
    assert_eq!(catalog.rows_skipped, 0);
    let ids: Vec<&str> = catalog.restaurants.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, ["b", "a"]);

    let first = &catalog.restaurants[0];
    assert!((first.lat - 50.05).abs() < f64::EPSILON);
    assert!((first.long - 8.67).abs() < f64::EPSILON);
    assert!((first.radius - 6.0).abs() < f64::EPSILON);
    assert_eq!(first.open, 900);
    assert_eq!(first.close, 1800);
    assert!((first.rating - 4.5).abs() < f64::EPSILON);
}

#[test]
fn normalize_records_skips_row_with_wrong_column_count() {
    let records = vec![
        header(),
        valid_row("a"),
        row(&["broken", "50.05", "8.67"]),
        valid_row("c"),
    ];
    let catalog = normalize_records(&records).unwrap();
    assert_eq!(catalog.rows_skipped, 1);
    let ids: Vec<&str> = catalog.restaurants.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, ["a", "c"]);
}

#[test]
fn normalize_records_skips_unparsable_fields() {
    let records = vec![
        header(),
        row(&["lat", "north", "8.67", "6", "09:00", "18:00", "4"]),
        row(&["time", "50.0", "8.67", "6", "late", "18:00", "4"]),
        row(&["rating", "50.0", "8.67", "6", "09:00", "18:00", ""]),
        valid_row("ok"),
    ];
    let catalog = normalize_records(&records).unwrap();
    assert_eq!(catalog.rows_skipped, 3);
    assert_eq!(catalog.restaurants.len(), 1);
    assert_eq!(catalog.restaurants[0].id, "ok");
}

#[test]
fn normalize_records_skips_out_of_range_coordinates_and_negative_radius() {
    let records = vec![
        header(),
        row(&["lat", "91", "8.67", "6", "09:00", "18:00", "4"]),
        row(&["long", "50", "-181", "6", "09:00", "18:00", "4"]),
        row(&["radius", "50", "8.67", "-1", "09:00", "18:00", "4"]),
        row(&["nan", "NaN", "8.67", "6", "09:00", "18:00", "4"]),
        valid_row("ok"),
    ];
    let catalog = normalize_records(&records).unwrap();
    assert_eq!(catalog.rows_skipped, 4);
    assert_eq!(catalog.restaurants.len(), 1);
}

#[test]
fn normalize_records_keeps_first_of_duplicate_ids() {
    let mut second = valid_row("dup");
    second[1] = "10.0".to_owned();
    let records = vec![header(), valid_row("dup"), second];
    let catalog = normalize_records(&records).unwrap();
    assert_eq!(catalog.rows_skipped, 1);
    assert_eq!(catalog.restaurants.len(), 1);
    assert!((catalog.restaurants[0].lat - 50.05).abs() < f64::EPSILON);
}

#[test]
fn normalize_records_skips_empty_id() {
    let records = vec![header(), valid_row(""), valid_row("a")];
    let catalog = normalize_records(&records).unwrap();
    assert_eq!(catalog.rows_skipped, 1);
    assert_eq!(catalog.restaurants.len(), 1);
}

#[test]
fn normalize_records_succeeds_with_every_row_skipped() {
    let records = vec![header(), row(&["only-id"])];
    let catalog = normalize_records(&records).unwrap();
    assert!(catalog.restaurants.is_empty());
    assert_eq!(catalog.rows_skipped, 1);
}

#[test]
fn normalize_records_rejects_missing_column_in_header() {
    let mut bad_header = header();
    bad_header.remove(3);
    let records = vec![bad_header, valid_row("a")];
    let err = normalize_records(&records).unwrap_err();
    assert!(
        matches!(err, CatalogError::InvalidHeader { .. }),
        "expected InvalidHeader, got: {err:?}"
    );
}

#[test]
fn normalize_records_rejects_reordered_header() {
    let mut bad_header = header();
    bad_header.swap(1, 2);
    let records = vec![bad_header, valid_row("a")];
    assert!(matches!(
        normalize_records(&records),
        Err(CatalogError::InvalidHeader { .. })
    ));
}

#[test]
fn normalize_records_tolerates_byte_order_mark_on_header() {
    let mut bom_header = header();
    bom_header[0] = "\u{feff}id".to_owned();
    let records = vec![bom_header, valid_row("a")];
    assert!(normalize_records(&records).is_ok());
}

#[test]
fn normalize_records_rejects_header_only() {
    let records = vec![header()];
    let err = normalize_records(&records).unwrap_err();
    assert!(matches!(err, CatalogError::TooFewRows { found: 1 }));
}

#[test]
fn normalize_records_rejects_empty_input() {
    let err = normalize_records(&[]).unwrap_err();
    assert!(matches!(err, CatalogError::TooFewRows { found: 0 }));
}

#[test]
fn parse_restaurant_row_reports_column_count() {
    let err = parse_restaurant_row(&row(&["a", "1"])).unwrap_err();
    assert_eq!(
        err,
        RowError::ColumnCount {
            expected: 7,
            found: 2
        }
    );
}
