use std::io::Cursor;

use calamine::{Data, Reader, open_workbook_auto_from_rs};
use serde_json::{Map, Value};

use crate::import::input::UploadSource;
use crate::table::{Cell, SheetTable, Workbook, format_number};
use crate::{ClientError, ClientResult};

const DEFAULT_SHEET_NAME: &str = "Sheet1";
const ZIP_MAGIC: &[u8] = b"PK\x03\x04";
const OLE_MAGIC: &[u8] = b"\xD0\xCF\x11\xE0";

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub(crate) enum UploadFormat {
    Spreadsheet,
    Csv,
    Json,
}

impl UploadFormat {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            Self::Spreadsheet => "spreadsheet",
            Self::Csv => "csv",
            Self::Json => "json",
        }
    }
}

pub(crate) fn parse_workbook(source: &UploadSource) -> ClientResult<Workbook> {
    if source.bytes.is_empty() {
        return Err(ClientError::upload_empty());
    }

    let format = detect_format(source)?;
    log::debug!(
        "parsing {} upload {:?} as {}",
        source.source_kind(),
        source.file_name,
        format.as_str()
    );

    match format {
        UploadFormat::Spreadsheet => parse_spreadsheet(&source.bytes),
        UploadFormat::Csv => {
            let name = source.stem().unwrap_or_else(|| DEFAULT_SHEET_NAME.to_string());
            let sheet = parse_csv(&name, decode_text(&source.bytes)?)?;
            Ok(Workbook {
                sheets: vec![sheet],
            })
        }
        UploadFormat::Json => parse_json(decode_text(&source.bytes)?),
    }
}

pub(crate) fn detect_format(source: &UploadSource) -> ClientResult<UploadFormat> {
    match source.extension().as_deref() {
        Some("xlsx" | "xlsm" | "xlsb" | "xls" | "ods") => return Ok(UploadFormat::Spreadsheet),
        Some("csv") => return Ok(UploadFormat::Csv),
        Some("json") => return Ok(UploadFormat::Json),
        _ => {}
    }

    if source.bytes.starts_with(ZIP_MAGIC) || source.bytes.starts_with(OLE_MAGIC) {
        return Ok(UploadFormat::Spreadsheet);
    }

    let Ok(text) = std::str::from_utf8(&source.bytes) else {
        return Err(ClientError::unsupported_format(
            "Upload is neither a recognised workbook nor UTF-8 text.",
            "binary",
        ));
    };
    let trimmed = strip_bom(text).trim_start();
    if trimmed.starts_with('[') || trimmed.starts_with('{') {
        return Ok(UploadFormat::Json);
    }
    let first_line = trimmed.lines().next().unwrap_or("");
    if first_line.contains(',') {
        return Ok(UploadFormat::Csv);
    }

    Err(ClientError::unsupported_format(
        "Unsupported upload format. Provide an Excel workbook, CSV with headers, or JSON rows.",
        "unknown",
    ))
}

fn parse_spreadsheet(bytes: &[u8]) -> ClientResult<Workbook> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))
        .map_err(|error| ClientError::workbook_unreadable(&error.to_string()))?;

    let mut sheets = Vec::new();
    for name in workbook.sheet_names() {
        let range = workbook
            .worksheet_range(&name)
            .map_err(|error| ClientError::workbook_unreadable(&error.to_string()))?;
        let mut rows = range.rows();
        let headers = rows
            .next()
            .map(|cells| header_names(cells.iter().map(spreadsheet_cell)))
            .unwrap_or_default();
        let body = rows
            .map(|cells| cells.iter().map(spreadsheet_cell).collect::<Vec<Cell>>())
            .filter(|cells| !cells.iter().all(Cell::is_empty))
            .collect::<Vec<Vec<Cell>>>();
        sheets.push(SheetTable::new(&name, headers, body));
    }

    Ok(Workbook { sheets })
}

fn spreadsheet_cell(value: &Data) -> Cell {
    match value {
        Data::Empty => Cell::Empty,
        Data::Int(number) => Cell::Number(*number as f64),
        Data::Float(number) => Cell::Number(*number),
        Data::Bool(flag) => Cell::Number(if *flag { 1.0 } else { 0.0 }),
        Data::String(text) => Cell::from_text(text),
        other => Cell::Text(other.to_string()),
    }
}

/// Blank header cells get positional names so they never collide.
fn header_names<I>(cells: I) -> Vec<String>
where
    I: Iterator<Item = Cell>,
{
    cells
        .enumerate()
        .map(|(index, cell)| match cell {
            Cell::Empty => format!("Unnamed: {index}"),
            Cell::Number(value) => format_number(value),
            Cell::Text(text) => text,
        })
        .collect()
}

fn parse_csv(name: &str, content: &str) -> ClientResult<SheetTable> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(content.as_bytes());

    let raw_headers = reader
        .headers()
        .map_err(|_| invalid_upload_error("CSV header row is missing or unreadable."))?
        .iter()
        .map(Cell::from_text)
        .collect::<Vec<Cell>>();
    let headers = header_names(raw_headers.into_iter());

    let mut rows = Vec::new();
    for result_row in reader.records() {
        let record =
            result_row.map_err(|_| invalid_upload_error("CSV rows are malformed or not UTF-8."))?;
        let cells = record.iter().map(Cell::from_text).collect::<Vec<Cell>>();
        if cells.iter().all(Cell::is_empty) {
            continue;
        }
        rows.push(cells);
    }

    Ok(SheetTable::new(name, headers, rows))
}

fn parse_json(content: &str) -> ClientResult<Workbook> {
    let parsed = serde_json::from_str::<Value>(content)
        .map_err(|_| invalid_upload_error("Invalid JSON input. Provide a JSON array of rows."))?;

    match parsed {
        Value::Array(items) => Ok(Workbook {
            sheets: vec![sheet_from_json_rows(DEFAULT_SHEET_NAME, &items)?],
        }),
        Value::Object(object) => {
            let Some(Value::Array(sheet_values)) = object.get("sheets") else {
                return Err(invalid_upload_error(
                    "JSON object input must carry a `sheets` array.",
                ));
            };
            let mut sheets = Vec::new();
            for (index, sheet_value) in sheet_values.iter().enumerate() {
                let default_name = format!("Sheet{}", index + 1);
                let name = sheet_value
                    .get("name")
                    .and_then(Value::as_str)
                    .unwrap_or(&default_name);
                let rows = sheet_value
                    .get("rows")
                    .and_then(Value::as_array)
                    .map(Vec::as_slice)
                    .unwrap_or(&[]);
                sheets.push(sheet_from_json_rows(name, rows)?);
            }
            Ok(Workbook { sheets })
        }
        _ => Err(invalid_upload_error(
            "JSON input must be an array of rows or an object with a `sheets` array.",
        )),
    }
}

fn sheet_from_json_rows(name: &str, items: &[Value]) -> ClientResult<SheetTable> {
    let mut objects: Vec<&Map<String, Value>> = Vec::with_capacity(items.len());
    for item in items {
        let Some(object) = item.as_object() else {
            return Err(invalid_upload_error(
                "JSON rows must all be objects keyed by column header.",
            ));
        };
        objects.push(object);
    }

    let mut headers: Vec<String> = Vec::new();
    for object in &objects {
        for key in object.keys() {
            if !headers.contains(key) {
                headers.push(key.clone());
            }
        }
    }

    let rows = objects
        .iter()
        .map(|object| {
            headers
                .iter()
                .map(|header| object.get(header).map(Cell::from_json).unwrap_or(Cell::Empty))
                .collect::<Vec<Cell>>()
        })
        .collect::<Vec<Vec<Cell>>>();

    Ok(SheetTable::new(name, headers, rows))
}

fn decode_text(bytes: &[u8]) -> ClientResult<&str> {
    std::str::from_utf8(bytes)
        .map(strip_bom)
        .map_err(|_| invalid_upload_error("Text uploads must be UTF-8 encoded."))
}

fn strip_bom(text: &str) -> &str {
    text.strip_prefix('\u{FEFF}').unwrap_or(text)
}

fn invalid_upload_error(message: &str) -> ClientError {
    ClientError::invalid_argument_with_recovery(
        message,
        vec![
            "Provide an Excel workbook, CSV with a header row, or JSON rows.".to_string(),
            "Run `creditlens score --help` to confirm the accepted layouts.".to_string(),
        ],
    )
    .with_score_help()
}
