/// JSON 行对象（结构化传输）
///
/// 每个数据行是一个以表头为键的对象，数字保持为 JSON 数字，无需转义。
/// 例如表格服务的脚本端点接收的就是这种格式。
use serde_json::{Map, Value};

use super::{Cell, Table, TableError};

/// 表格转为行对象数组（键顺序与表头一致）
pub fn to_json_rows(table: &Table) -> Vec<Map<String, Value>> {
    table
        .rows
        .iter()
        .map(|row| {
            table
                .header
                .iter()
                .enumerate()
                .map(|(i, column)| {
                    let value = row
                        .get(i)
                        .map(|cell| serde_json::to_value(cell).unwrap_or(Value::Null))
                        .unwrap_or_else(|| Value::String(String::new()));
                    (column.clone(), value)
                })
                .collect()
        })
        .collect()
}

/// 行对象数组转回表格
///
/// 表头取所有对象键的并集（按首次出现顺序）；缺失的键记为空单元格。
pub fn from_json_rows(value: &Value) -> Result<Table, TableError> {
    let rows = value
        .as_array()
        .ok_or_else(|| TableError::InvalidRows("expected a JSON array of row objects".to_string()))?;

    let mut objects = Vec::with_capacity(rows.len());
    for (i, row) in rows.iter().enumerate() {
        let object = row
            .as_object()
            .ok_or_else(|| TableError::InvalidRows(format!("row {} is not an object", i + 1)))?;
        objects.push(object);
    }

    if objects.is_empty() {
        return Ok(Table::default());
    }

    let mut header: Vec<String> = Vec::new();
    for object in &objects {
        for key in object.keys() {
            if !header.contains(key) {
                header.push(key.clone());
            }
        }
    }

    if header.is_empty() {
        return Err(TableError::MissingHeader);
    }

    let rows = objects
        .iter()
        .map(|object| {
            header
                .iter()
                .map(|column| object.get(column).map(Cell::from_value).unwrap_or(Cell::Empty))
                .collect()
        })
        .collect();

    Ok(Table { header, rows })
}
