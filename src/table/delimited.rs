/// 分隔符文本（CSV / TSV）读写
///
/// 含分隔符、引号或换行的单元格用双引号包裹，内部引号写成两个。
use std::borrow::Cow;

use super::{Cell, Table, TableError};

/// 将表格写为分隔符文本（每行以 `\n` 结尾）
pub fn write(table: &Table, delimiter: char) -> String {
    let mut out = String::new();

    write_row(&mut out, table.header.iter().map(|h| Cow::Borrowed(h.as_str())), delimiter);
    for row in &table.rows {
        write_row(&mut out, row.iter().map(|cell| Cow::Owned(cell.to_string())), delimiter);
    }

    out
}

fn write_row<'a>(out: &mut String, cells: impl Iterator<Item = Cow<'a, str>>, delimiter: char) {
    for (i, cell) in cells.enumerate() {
        if i > 0 {
            out.push(delimiter);
        }
        out.push_str(&escape(&cell, delimiter));
    }
    out.push('\n');
}

/// 转义单个单元格
pub fn escape(cell: &str, delimiter: char) -> Cow<'_, str> {
    let needs_quotes = cell
        .chars()
        .any(|c| c == delimiter || c == '"' || c == '\n' || c == '\r');

    if needs_quotes {
        Cow::Owned(format!("\"{}\"", cell.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(cell)
    }
}

/// 解析分隔符文本
///
/// 支持引号字段、转义引号、字段内换行、CRLF 与开头的 UTF-8 BOM。
/// 首行作为表头；中间的空行保留为空数据行。
pub fn read(input: &str, delimiter: char) -> Result<Table, TableError> {
    let input = input.strip_prefix('\u{feff}').unwrap_or(input);

    let mut records: Vec<Vec<String>> = Vec::new();
    let mut record: Vec<String> = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut field_quoted = false;
    let mut line = 1;
    let mut quote_line = 0;

    let mut chars = input.chars().peekable();
    while let Some(c) = chars.next() {
        if in_quotes {
            match c {
                '"' if chars.peek() == Some(&'"') => {
                    chars.next();
                    field.push('"');
                }
                '"' => in_quotes = false,
                '\n' => {
                    line += 1;
                    field.push(c);
                }
                _ => field.push(c),
            }
            continue;
        }

        match c {
            '"' if field.is_empty() && !field_quoted => {
                in_quotes = true;
                field_quoted = true;
                quote_line = line;
            }
            c if c == delimiter => {
                record.push(std::mem::take(&mut field));
                field_quoted = false;
            }
            '\r' | '\n' => {
                if c == '\r' && chars.peek() == Some(&'\n') {
                    chars.next();
                }
                record.push(std::mem::take(&mut field));
                records.push(std::mem::take(&mut record));
                field_quoted = false;
                line += 1;
            }
            _ => field.push(c),
        }
    }

    if in_quotes {
        return Err(TableError::UnterminatedQuote { line: quote_line });
    }
    if !field.is_empty() || field_quoted || !record.is_empty() {
        record.push(field);
        records.push(record);
    }

    let mut records = records.into_iter();
    let header: Vec<String> = records
        .next()
        .ok_or(TableError::MissingHeader)?
        .into_iter()
        .map(|name| name.trim().to_string())
        .collect();

    if header.iter().all(|name| name.is_empty()) {
        return Err(TableError::MissingHeader);
    }

    let rows = records
        .map(|record| record.into_iter().map(Cell::text).collect())
        .collect();

    Ok(Table { header, rows })
}
