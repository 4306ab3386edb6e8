mod support;

use std::fs;

use gsync::SyncError;
use gsync::io::FileFormat;
use gsync::model::{CellValue, Table, records_from_rows};
use gsync::sync::{SheetOptions, SyncSheet};
use support::{FakeService, to_rows};
use tempfile::tempdir;

const ORDERS: &[&[&str]] = &[
    &["id", "name", "qty", "price", "note"],
    &["A1", "Widget", "3", "2.5", ""],
    &["B2", "Gadget", "10", "0.75", "fragile"],
    &["C3", "Gizmo", "-4", "12.25", "back order"],
];

fn orders_table() -> Table {
    let fetched = records_from_rows(to_rows(ORDERS)).expect("records built");
    Table::from_records(fetched.columns, fetched.records).expect("table built")
}

#[test]
fn records_are_numericised_and_padded() {
    let fetched = records_from_rows(to_rows(&[
        &["id", "qty", "label"],
        &["7", "1.5"],
        &["x", "", "  12 "],
    ]))
    .expect("records built");
    let records = fetched.records;

    assert_eq!(
        records[0],
        vec![
            ("id".to_string(), CellValue::Integer(7)),
            ("qty".to_string(), CellValue::Number(1.5)),
            ("label".to_string(), CellValue::Empty),
        ]
    );
    assert_eq!(records[1][0].1, CellValue::String("x".to_string()));
    assert_eq!(records[1][1].1, CellValue::Empty);
    assert_eq!(records[1][2].1, CellValue::Integer(12));
}

#[test]
fn header_without_data_rows_keeps_columns() {
    let fetched = records_from_rows(to_rows(&[&["id", "name"]])).expect("records built");
    assert_eq!(fetched.columns, vec!["id".to_string(), "name".to_string()]);
    assert!(fetched.records.is_empty());

    let table = Table::from_records(fetched.columns, fetched.records).expect("table built");
    assert_eq!(table.columns(), ["id", "name"]);
    assert!(table.is_empty());
}

#[test]
fn duplicate_header_is_rejected() {
    let result = records_from_rows(to_rows(&[&["id", "id"], &["1", "2"]]));
    assert!(matches!(result, Err(SyncError::InvalidTable(_))));
}

#[test]
fn tsv_roundtrip_preserves_rows() {
    let table = orders_table();
    let temp_dir = tempdir().expect("temporary directory");
    let path = temp_dir.path().join("orders.tsv");

    FileFormat::Tsv.write(&path, &table).expect("TSV written");
    let written = fs::read_to_string(&path).expect("TSV read back");
    assert!(written.starts_with("id\tname\tqty\tprice\tnote"));
    assert!(written.contains("B2\tGadget\t10\t0.75\tfragile"));

    let restored = FileFormat::Tsv.read(&path).expect("TSV parsed");
    assert_eq!(table, restored);
}

#[test]
fn xlsx_roundtrip_preserves_rows() {
    let table = orders_table();
    let temp_dir = tempdir().expect("temporary directory");
    let path = temp_dir.path().join("orders.xlsx");

    FileFormat::Xlsx.write(&path, &table).expect("Excel written");
    let restored = FileFormat::Xlsx.read(&path).expect("Excel read");

    assert_eq!(table, restored);
}

#[test]
fn xlsx_roundtrip_keeps_trailing_blank_rows() {
    let mut table = orders_table();
    table
        .push_row(vec![CellValue::String("D4".to_string())])
        .expect("row pushed");
    table.push_row(Vec::new()).expect("blank row pushed");
    table.push_row(Vec::new()).expect("blank row pushed");
    let temp_dir = tempdir().expect("temporary directory");
    let path = temp_dir.path().join("orders.xlsx");

    FileFormat::Xlsx.write(&path, &table).expect("Excel written");
    let restored = FileFormat::Xlsx.read(&path).expect("Excel read");

    assert_eq!(restored.len(), 6);
    assert_eq!(table, restored);
}

#[test]
fn xlsx_roundtrip_of_blank_only_rows() {
    let mut table = Table::new(vec!["id".to_string(), "name".to_string()]).expect("table built");
    table.push_row(Vec::new()).expect("blank row pushed");
    let temp_dir = tempdir().expect("temporary directory");
    let path = temp_dir.path().join("blank.xlsx");

    FileFormat::Xlsx.write(&path, &table).expect("Excel written");
    let restored = FileFormat::Xlsx.read(&path).expect("Excel read");

    assert_eq!(table, restored);
}

#[test]
fn json_without_rows_reads_back_without_columns() {
    let table = Table::new(vec!["id".to_string(), "name".to_string()]).expect("table built");
    let temp_dir = tempdir().expect("temporary directory");
    let path = temp_dir.path().join("empty.json");

    FileFormat::Json.write(&path, &table).expect("JSON written");
    assert_eq!(fs::read_to_string(&path).expect("JSON read back").trim(), "[]");

    let restored = FileFormat::Json.read(&path).expect("JSON parsed");
    assert!(restored.columns().is_empty());
    assert!(restored.is_empty());
}

#[test]
fn json_roundtrip_preserves_rows_and_column_order() {
    let table = orders_table();
    let temp_dir = tempdir().expect("temporary directory");
    let path = temp_dir.path().join("orders.json");

    FileFormat::Json.write(&path, &table).expect("JSON written");
    let written = fs::read_to_string(&path).expect("JSON read back");
    assert!(written.starts_with("[\n  {\n    \"id\": \"A1\",\n    \"name\": \"Widget\""));

    let restored = FileFormat::Json.read(&path).expect("JSON parsed");
    assert_eq!(table, restored);
}

#[test]
fn unsupported_extension_is_a_configuration_error() {
    let temp_dir = tempdir().expect("temporary directory");
    let result = FileFormat::from_path(&temp_dir.path().join("orders.csv"));
    assert!(matches!(
        result,
        Err(SyncError::UnsupportedExtension { ref extension, .. }) if extension == "csv"
    ));
}

#[test]
fn sheet_save_then_load_restores_index() {
    for format in [FileFormat::Tsv, FileFormat::Xlsx, FileFormat::Json] {
        let mut service = FakeService::new();
        service.add_book("orders", "2024-01-01T12:00:00Z", ORDERS);
        let temp_dir = tempdir().expect("temporary directory");
        let path = temp_dir
            .path()
            .join(format!("orders.{}", format.extension()));

        let mut sheet = SyncSheet::new(
            "orders",
            "orders",
            SheetOptions {
                path: Some(path),
                index_col: Some(1),
                service: Some(service.into_arc()),
                ..SheetOptions::default()
            },
        )
        .expect("sheet constructed");

        sheet.download(0, false).expect("downloaded");
        let downloaded = sheet.table().cloned().expect("table cached");
        assert_eq!(downloaded.index_column(), Some("name"));

        sheet.load().expect("loaded");
        let loaded = sheet.table().expect("table cached");
        assert_eq!(&downloaded, loaded, "{format} round trip");

        let gadget = loaded.get("Gadget").expect("row keyed by name");
        assert_eq!(gadget.get("qty"), Some(&CellValue::Integer(10)));
    }
}
