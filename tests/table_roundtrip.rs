use futures::executor::block_on;
use serde_json::json;
use tempfile::TempDir;

use layer_text_sync::table::{self, read_table_file, write_table_file, TableFormat};
use layer_text_sync::{
    extract, Document, DocumentHost, ExtractOptions, MemoryHost, ReconcileOptions, Reconciler, TextAsset,
};

fn document() -> Document {
    Document::from_json_value(json!({
        "pages": [{
            "id": "0:1", "type": "PAGE", "name": "Page 1",
            "children": [{
                "id": "1:0", "type": "FRAME", "name": "Card, \"primary\"",
                "children": [
                    {
                        "id": "1:1", "type": "TEXT", "name": "Title", "characters": "Price: 1,000\nper \"unit\"",
                        "fontName": { "family": "Inter", "style": "Regular" }, "fontSize": 12.5
                    },
                    {
                        "id": "1:2", "type": "TEXT", "name": "Caption", "characters": "こんにちは\tworld",
                        "fontName": { "family": "Inter", "style": "Regular" }
                    },
                    {
                        "id": "1:3", "type": "TEXT", "name": "Empty", "characters": "",
                        "fontName": { "family": "Inter", "style": "Regular" }
                    }
                ]
            }]
        }]
    }))
    .unwrap()
}

fn assets() -> Vec<TextAsset> {
    let mut host = MemoryHost::new(document());
    block_on(extract(&mut host, &ExtractOptions::default())).unwrap().assets
}

fn pairs_from_assets(assets: &[TextAsset]) -> Vec<(String, String)> {
    assets
        .iter()
        .filter(|asset| !asset.characters.is_empty())
        .map(|asset| (asset.id.clone(), asset.characters.clone()))
        .collect()
}

fn roundtrip_pairs(format: TableFormat) {
    let assets = assets();
    let encoded = format.render(&table::encode(&assets, 5)).unwrap();
    let decoded = table::decode(&format.parse(&encoded).unwrap()).unwrap();

    assert_eq!(decoded.len(), assets.len());
    let pairs: Vec<(String, String)> = decoded
        .into_iter()
        .filter_map(|request| Some((request.id?, request.new_text?)))
        .collect();
    assert_eq!(pairs, pairs_from_assets(&assets));
}

#[test]
fn csv_roundtrip_preserves_id_text_pairs() {
    roundtrip_pairs(TableFormat::Csv);
}

#[test]
fn tsv_roundtrip_preserves_id_text_pairs() {
    roundtrip_pairs(TableFormat::Tsv);
}

#[test]
fn json_roundtrip_preserves_id_text_pairs() {
    roundtrip_pairs(TableFormat::Json);
}

#[test]
fn edited_csv_applies_back_onto_document() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("texts.csv");
    write_table_file(&path, &table::encode(&assets(), 5), TableFormat::Csv, true).unwrap();

    // 模拟表格软件编辑：只保留 ID 与文本列并调换顺序
    let edited = "Characters,ID\n\"Prix : 1 000<br>par « unité »\",1:1\n,1:2\n";
    std::fs::write(&path, edited).unwrap();

    let table = read_table_file(&path, TableFormat::Csv, None).unwrap();
    let requests = table::decode(&table).unwrap();

    let mut host = MemoryHost::new(document());
    let report = block_on(Reconciler::new(&mut host, ReconcileOptions::default()).apply(&requests));

    assert_eq!(report.summary.applied, 1);
    assert_eq!(report.summary.skipped, 1);
    assert_eq!(host.text_of("1:1").as_deref(), Some("Prix : 1 000\npar « unité »"));
    assert_eq!(host.text_of("1:2").as_deref(), Some("こんにちは\tworld"));

    let saved = dir.path().join("snapshot.json");
    host.into_document().save(&saved).unwrap();
    let reloaded = Document::load(&saved).unwrap();
    let index = reloaded.find("1:1").unwrap();
    assert_eq!(reloaded.text_props(index).unwrap().characters, "Prix : 1 000\npar « unité »");
}
