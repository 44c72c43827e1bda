//! CadBom Export Tests
//!
//! Aggregates realistic selections and writes them through the real
//! spreadsheet writers, then reads the files back.

use cadbom_models::{AttrValue, CadObject};
use cadbom_utils::bom::{BomAggregator, BomExporter, SheetLayout};
use calamine::{open_workbook, DataType, Reader, Xlsx};

fn selection() -> Vec<AttrValue> {
    let bolt = |price: &str| {
        AttrValue::map([
            ("Name", AttrValue::from("Bolt M8")),
            ("ObjectType", AttrValue::from("Brep")),
            ("price", AttrValue::from(price)),
        ])
    };
    let rail: AttrValue = CadObject::new("RhinoObject")
        .with_field(
            "Attributes",
            CadObject::new("ObjectAttributes")
                .with_field("Name", "Rail")
                .with_field("Layer", "Frame"),
        )
        .with_field("Geometry", CadObject::new("Curve").with_field("ObjectType", "Curve"))
        .into();

    vec![bolt("10"), rail, bolt("20"), bolt("10")]
}

#[test]
fn test_xlsx_export_round_trip() {
    let rows = BomAggregator::new()
        .with_extra_fields(["price"])
        .aggregate(&selection());
    assert_eq!(rows.len(), 2);

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bom.xlsx");
    let saved = BomExporter::default().export_bom(&rows, &path).unwrap();
    assert_eq!(saved, path);

    let mut workbook: Xlsx<_> = open_workbook(&path).unwrap();
    assert_eq!(workbook.sheet_names(), vec!["Itens".to_string()]);

    let range = workbook.worksheet_range("Itens").unwrap().unwrap();
    assert_eq!(range.get_size(), (3, 5));

    let headers: Vec<String> = (0..5)
        .map(|col| range.get_value((0, col)).map(ToString::to_string).unwrap_or_default())
        .collect();
    assert_eq!(
        headers,
        vec!["Nome", "Quantidade", "Propriedades", "Observações", "Preço Unitário"]
    );

    assert_eq!(range.get_value((1, 0)), Some(&DataType::String("Bolt M8".to_string())));
    assert_eq!(range.get_value((1, 1)), Some(&DataType::Float(3.0)));
    assert_eq!(
        range.get_value((1, 2)),
        Some(&DataType::String("type: Brep, price: 10; 20".to_string()))
    );
    assert_eq!(range.get_value((1, 3)), Some(&DataType::Empty));

    assert_eq!(range.get_value((2, 0)), Some(&DataType::String("Rail".to_string())));
    assert_eq!(range.get_value((2, 1)), Some(&DataType::Float(1.0)));
    assert_eq!(
        range.get_value((2, 2)),
        Some(&DataType::String("type: Curve".to_string()))
    );
}

#[test]
fn test_csv_export_with_custom_layout() {
    let rows = BomAggregator::new()
        .with_key_fields(["name"])
        .aggregate(&selection());

    let layout = SheetLayout {
        sheet_name: "Parts".to_string(),
        name_header: "Name".to_string(),
        quantity_header: "Qty".to_string(),
        properties_header: "Properties".to_string(),
        extra_headers: vec!["Notes".to_string()],
    };

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bom.csv");
    BomExporter::new(layout).export_bom(&rows, &path).unwrap();

    let mut reader = csv::Reader::from_path(&path).unwrap();
    let headers: Vec<String> = reader.headers().unwrap().iter().map(String::from).collect();
    assert_eq!(headers, vec!["Name", "Qty", "Properties", "Notes"]);

    let records: Vec<Vec<String>> = reader
        .records()
        .map(|record| record.unwrap().iter().map(String::from).collect())
        .collect();
    assert_eq!(
        records,
        vec![
            vec!["Bolt M8".to_string(), "3".to_string(), String::new(), String::new()],
            vec!["Rail".to_string(), "1".to_string(), String::new(), String::new()],
        ]
    );
}

#[test]
fn test_empty_bom_writes_headers_only() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("empty.xlsx");
    BomExporter::default().export_bom(&[], &path).unwrap();

    let mut workbook: Xlsx<_> = open_workbook(&path).unwrap();
    let range = workbook.worksheet_range("Itens").unwrap().unwrap();
    assert_eq!(range.get_size(), (1, 5));
}
