use serde_json::Value;

/// One spreadsheet cell after format-specific decoding.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Number(f64),
    Text(String),
}

impl Cell {
    pub fn from_text(value: &str) -> Self {
        if value.trim().is_empty() {
            return Self::Empty;
        }
        Self::Text(value.to_string())
    }

    pub fn from_json(value: &Value) -> Self {
        match value {
            Value::Null => Self::Empty,
            Value::Number(number) => number.as_f64().map(Self::Number).unwrap_or(Self::Empty),
            Value::String(text) => Self::from_text(text),
            Value::Bool(flag) => Self::Number(if *flag { 1.0 } else { 0.0 }),
            other => Self::Text(other.to_string()),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    /// Numeric view of the cell; text is accepted when it parses as a finite float.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(value) if value.is_finite() => Some(*value),
            Self::Number(_) | Self::Empty => None,
            Self::Text(text) => text
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|value| value.is_finite()),
        }
    }

    pub fn display_text(&self) -> String {
        match self {
            Self::Empty => String::new(),
            Self::Number(value) => format_number(*value),
            Self::Text(text) => text.trim().to_string(),
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            Self::Empty => Value::Null,
            Self::Number(value) => number_to_json(*value),
            Self::Text(text) => Value::String(text.clone()),
        }
    }
}

/// Integral values print without a trailing `.0` so ids like `1001` survive.
pub fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        value.to_string()
    }
}

/// Same integral rule as [`format_number`]; non-finite values become `null`.
pub fn number_to_json(value: f64) -> Value {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        return Value::from(value as i64);
    }
    serde_json::Number::from_f64(value)
        .map(Value::Number)
        .unwrap_or(Value::Null)
}

/// A named grid of cells whose rows line up positionally with `headers`.
#[derive(Debug, Clone, PartialEq)]
pub struct SheetTable {
    pub name: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

impl SheetTable {
    pub fn new(name: &str, headers: Vec<String>, rows: Vec<Vec<Cell>>) -> Self {
        Self {
            name: name.to_string(),
            headers,
            rows,
        }
    }

    pub fn column_index(&self, header: &str) -> Option<usize> {
        self.headers.iter().position(|candidate| candidate == header)
    }

    pub fn cell(&self, row: usize, column: usize) -> &Cell {
        self.rows
            .get(row)
            .and_then(|cells| cells.get(column))
            .unwrap_or(&Cell::Empty)
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }
}

/// Sheets in the order they appear in the uploaded file.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Workbook {
    pub sheets: Vec<SheetTable>,
}

impl Workbook {
    pub fn sheet_names(&self) -> Vec<String> {
        self.sheets.iter().map(|sheet| sheet.name.clone()).collect()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{Cell, SheetTable, format_number, number_to_json};

    #[test]
    fn text_cells_coerce_to_numbers_when_parseable() {
        assert_eq!(Cell::from_text(" 45.5 ").as_number(), Some(45.5));
        assert_eq!(Cell::from_text("n/a").as_number(), None);
        assert_eq!(Cell::from_text("   "), Cell::Empty);
        assert_eq!(Cell::from_text("inf").as_number(), None);
    }

    #[test]
    fn integral_numbers_render_without_fraction() {
        assert_eq!(format_number(1001.0), "1001");
        assert_eq!(format_number(0.75), "0.75");
        assert_eq!(Cell::Number(-20.0).display_text(), "-20");
        assert_eq!(number_to_json(36.0), json!(36));
        assert_eq!(number_to_json(64.5), json!(64.5));
        assert_eq!(number_to_json(f64::NAN), json!(null));
    }

    #[test]
    fn json_values_map_to_cells() {
        assert_eq!(Cell::from_json(&json!(null)), Cell::Empty);
        assert_eq!(Cell::from_json(&json!(12)), Cell::Number(12.0));
        assert_eq!(Cell::from_json(&json!("C-1")), Cell::Text("C-1".to_string()));
    }

    #[test]
    fn missing_cells_read_as_empty() {
        let table = SheetTable::new("S", vec!["a".to_string()], vec![vec![]]);
        assert_eq!(table.cell(0, 0), &Cell::Empty);
        assert_eq!(table.cell(5, 5), &Cell::Empty);
    }
}
