use super::*;
use crate::style::{NormalizedStyle, StyleValue};

/// 创建测试用的 TextAsset
fn create_test_asset(id: &str, characters: &str) -> TextAsset {
    TextAsset {
        id: id.to_string(),
        name: "Title".to_string(),
        page_name: "Page 1".to_string(),
        frame_path: vec!["Hero".to_string(), String::new(), String::new()],
        characters: characters.to_string(),
        style: NormalizedStyle {
            font_family: "Inter".to_string(),
            font_style: "Regular".to_string(),
            font_size: StyleValue::Number(16.0),
            line_height: "AUTO".to_string(),
            letter_spacing: "0%".to_string(),
            text_align_horizontal: "LEFT".to_string(),
            text_align_vertical: "TOP".to_string(),
            text_case: "ORIGINAL".to_string(),
            text_decoration: "NONE".to_string(),
            fill_color: "#000000".to_string(),
            fill_opacity: "100%".to_string(),
            x: 10.5,
            y: 0.0,
            width: 120.0,
            height: 24.0,
            rotation: 0.0,
            corner_radius: StyleValue::Text(String::new()),
            opacity: 1.0,
        },
    }
}

#[test]
fn test_header_layout() {
    let table = encode(&[], 3);
    assert_eq!(&table.header[..6], &["ID", "Page", "Frame 1", "Frame 2", "Frame 3", "Name"]);
    assert_eq!(table.header[6], "Characters");
    assert_eq!(table.header.last().map(String::as_str), Some("Opacity"));
    assert!(table.rows.is_empty());
}

#[test]
fn test_encode_cells() {
    let table = encode(&[create_test_asset("1:1", "Hello")], 3);
    let row = &table.rows[0];

    assert_eq!(row[table.column_index("ID").unwrap()], Cell::text("1:1"));
    assert_eq!(row[table.column_index("Frame 1").unwrap()], Cell::text("Hero"));
    assert_eq!(row[table.column_index("Frame 2").unwrap()], Cell::Empty);
    assert_eq!(row[table.column_index("Font Size").unwrap()], Cell::Number(16.0));
    assert_eq!(row[table.column_index("Corner Radius").unwrap()], Cell::Empty);
}

#[test]
fn test_csv_escaping() {
    let asset = create_test_asset("1:1", "Say \"hi\", then<br>leave");
    let csv = delimited::write(&encode(&[asset], 1), ',');
    let data_line = csv.lines().nth(1).unwrap();

    assert!(data_line.starts_with("1:1,Page 1,Hero,Title,\"Say \"\"hi\"\", then<br>leave\",Inter"));
    assert!(data_line.contains(",16,"));
    assert!(data_line.contains(",10.5,"));
}

#[test]
fn test_tsv_does_not_quote_commas() {
    assert_eq!(delimited::escape("a, b", '\t'), "a, b");
    assert_eq!(delimited::escape("a\tb", '\t'), "\"a\tb\"");
    assert_eq!(delimited::escape("line\nbreak", ','), "\"line\nbreak\"");
}

#[test]
fn test_read_quoted_fields() {
    let input = "\u{feff}ID,Characters\r\n1:1,\"He said \"\"yes\"\"\"\r\n1:2,\"multi\nline, text\"\r\n";
    let table = delimited::read(input, ',').unwrap();

    assert_eq!(table.header, vec!["ID", "Characters"]);
    assert_eq!(table.rows.len(), 2);
    assert_eq!(table.rows[0][1], Cell::text("He said \"yes\""));
    assert_eq!(table.rows[1][1], Cell::text("multi\nline, text"));
}

#[test]
fn test_read_keeps_blank_rows() {
    let table = delimited::read("ID,Characters\n1:1,a\n\n1:2,b", ',').unwrap();
    assert_eq!(table.rows.len(), 3);
    assert_eq!(table.rows[1], vec![Cell::Empty]);
}

#[test]
fn test_read_errors() {
    assert_eq!(delimited::read("", ','), Err(TableError::MissingHeader));
    assert_eq!(
        delimited::read("ID,Characters\n1:1,\"open", ','),
        Err(TableError::UnterminatedQuote { line: 2 })
    );
}

#[test]
fn test_decode_by_column_name() {
    let table = Table {
        header: vec!["Notes".to_string(), " characters ".to_string(), "id".to_string()],
        rows: vec![
            vec![Cell::text("x"), Cell::text("Hola"), Cell::text("1:1")],
            vec![Cell::text("y"), Cell::Empty, Cell::text("1:2")],
            vec![Cell::text("z"), Cell::text("Adiós")],
        ],
    };

    let requests = decode(&table).unwrap();
    assert_eq!(requests.len(), 3);
    assert_eq!(requests[0], UpdateRequest::new(1, Some("1:1".into()), Some("Hola".into())));
    assert_eq!(requests[1].id.as_deref(), Some("1:2"));
    assert!(requests[1].new_text.is_none());
    assert!(requests[2].id.is_none());
    assert_eq!(requests[2].row, 3);
}

#[test]
fn test_decode_text_alias_and_missing_columns() {
    let table = delimited::read("ID,New Text\n1:1,Bonjour\n", ',').unwrap();
    let requests = decode(&table).unwrap();
    assert_eq!(requests[0].new_text.as_deref(), Some("Bonjour"));

    let table = delimited::read("Characters\nBonjour\n", ',').unwrap();
    assert_eq!(decode(&table), Err(TableError::MissingColumn("ID".to_string())));

    let table = delimited::read("ID,Name\n1:1,Title\n", ',').unwrap();
    assert_eq!(decode(&table), Err(TableError::MissingColumn("Characters".to_string())));
}

#[test]
fn test_decode_numeric_id_cell() {
    let table = Table {
        header: vec!["ID".to_string(), "Characters".to_string()],
        rows: vec![vec![Cell::Number(12.0), Cell::text("Hi")]],
    };
    let requests = decode(&table).unwrap();
    assert_eq!(requests[0].id.as_deref(), Some("12"));
}

#[test]
fn test_json_rows_preserve_types_and_order() {
    let table = encode(&[create_test_asset("1:1", "Hello")], 2);
    let rows = rows::to_json_rows(&table);

    let keys: Vec<&str> = rows[0].keys().map(String::as_str).collect();
    assert_eq!(&keys[..4], &["ID", "Page", "Frame 1", "Frame 2"]);
    assert_eq!(rows[0]["Font Size"], serde_json::json!(16));
    assert_eq!(rows[0]["X"], serde_json::json!(10.5));

    let back = rows::from_json_rows(&serde_json::to_value(&rows).unwrap()).unwrap();
    assert_eq!(back.header, table.header);
    assert_eq!(back.rows[0][back.column_index("Characters").unwrap()], Cell::text("Hello"));
}

#[test]
fn test_json_rows_errors() {
    assert!(matches!(
        rows::from_json_rows(&serde_json::json!({ "ID": "1:1" })),
        Err(TableError::InvalidRows(_))
    ));
    assert!(matches!(
        rows::from_json_rows(&serde_json::json!([1, 2])),
        Err(TableError::InvalidRows(_))
    ));
    assert_eq!(rows::from_json_rows(&serde_json::json!([])).unwrap(), Table::default());
}

#[test]
fn test_format_detection() {
    assert_eq!(TableFormat::from_path(Path::new("out/texts.CSV")), Some(TableFormat::Csv));
    assert_eq!(TableFormat::from_path(Path::new("texts.tsv")), Some(TableFormat::Tsv));
    assert_eq!(TableFormat::from_path(Path::new("texts.json")), Some(TableFormat::Json));
    assert_eq!(TableFormat::from_path(Path::new("texts.xlsx")), None);
}

#[test]
fn test_decode_input_encodings() {
    let utf8_bom = b"\xEF\xBB\xBFID,Characters\n";
    assert_eq!(decode_input(utf8_bom, None).unwrap(), "ID,Characters\n");

    let (shift_jis, _, _) = encoding_rs::SHIFT_JIS.encode("こんにちは");
    assert_eq!(decode_input(&shift_jis, Some("shift_jis")).unwrap(), "こんにちは");

    assert!(matches!(
        decode_input(b"abc", Some("not-an-encoding")),
        Err(SyncError::UnsupportedEncoding(_))
    ));
}

#[test]
fn test_table_file_roundtrip() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("nested").join("texts.csv");
    let table = encode(&[create_test_asset("1:1", "Hello")], 5);

    write_table_file(&path, &table, TableFormat::Csv, true).unwrap();
    let bytes = std::fs::read(&path).unwrap();
    assert!(bytes.starts_with(b"\xEF\xBB\xBF"));

    let loaded = read_table_file(&path, TableFormat::Csv, None).unwrap();
    assert_eq!(loaded.header, table.header);
    assert_eq!(decode(&loaded).unwrap()[0].new_text.as_deref(), Some("Hello"));
}
