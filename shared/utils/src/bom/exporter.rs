//! Spreadsheet Exporter
//!
//! Writes BOM rows to a worksheet with fixed headers for name, quantity and
//! properties, followed by blank columns left for manual entry.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use cadbom_models::{AttrValue, BomRow, NAME_FIELD};
use rust_xlsxwriter::{Format, Workbook};
use tracing::info;

use crate::config::ExportConfig;
use crate::error::{BomError, BomResult};
use crate::validation::validate_file_type;

/// Supported export formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Xlsx,
    Csv,
}

impl ExportFormat {
    pub const EXTENSIONS: &'static [&'static str] = &["xlsx", "csv"];

    /// Detect format from file extension
    pub fn from_extension(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_lowercase();
        match ext.as_str() {
            "xlsx" => Some(Self::Xlsx),
            "csv" => Some(Self::Csv),
            _ => None,
        }
    }
}

/// A worksheet cell
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Text(String),
    Number(f64),
    Blank,
}

impl Cell {
    pub fn to_text(&self) -> String {
        match self {
            Self::Text(text) => text.clone(),
            Self::Number(number) => number.to_string(),
            Self::Blank => String::new(),
        }
    }
}

impl From<&AttrValue> for Cell {
    fn from(value: &AttrValue) -> Self {
        match value {
            AttrValue::Null => Self::Blank,
            AttrValue::Integer(number) => Self::Number(*number as f64),
            AttrValue::Float(number) => Self::Number(*number),
            other => Self::Text(other.to_string()),
        }
    }
}

/// Worksheet title and column headers
#[derive(Debug, Clone, PartialEq)]
pub struct SheetLayout {
    pub sheet_name: String,
    pub name_header: String,
    pub quantity_header: String,
    pub properties_header: String,
    pub extra_headers: Vec<String>,
}

impl Default for SheetLayout {
    fn default() -> Self {
        Self::from(&ExportConfig::default())
    }
}

impl From<&ExportConfig> for SheetLayout {
    fn from(config: &ExportConfig) -> Self {
        Self {
            sheet_name: config.sheet_name.clone(),
            name_header: config.name_header.clone(),
            quantity_header: config.quantity_header.clone(),
            properties_header: config.properties_header.clone(),
            extra_headers: config.extra_headers.clone(),
        }
    }
}

impl SheetLayout {
    /// Headers whose values are filled from row data
    pub fn basic_headers(&self) -> [&str; 3] {
        [
            self.name_header.as_str(),
            self.quantity_header.as_str(),
            self.properties_header.as_str(),
        ]
    }

    /// All headers in column order
    pub fn headers(&self) -> Vec<&str> {
        let mut headers = self.basic_headers().to_vec();
        headers.extend(self.extra_headers.iter().map(String::as_str));
        headers
    }
}

/// One worksheet line keyed by header
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SheetRow {
    cells: HashMap<String, Cell>,
}

impl SheetRow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, header: impl Into<String>, cell: Cell) -> Self {
        self.cells.insert(header.into(), cell);
        self
    }

    pub fn get(&self, header: &str) -> Option<&Cell> {
        self.cells.get(header)
    }

    /// Map a BOM row onto the basic headers.
    ///
    /// The name goes under the name header, the quantity under the quantity
    /// header, and every other present field is listed as `field: value`
    /// under the properties header.
    pub fn from_bom_row(row: &BomRow, layout: &SheetLayout) -> Self {
        let name = row.get(NAME_FIELD).map(Cell::from).unwrap_or(Cell::Blank);

        let properties: Vec<String> = row
            .fields()
            .into_iter()
            .filter(|(field, _)| *field != NAME_FIELD)
            .filter_map(|(field, value)| value.map(|value| format!("{}: {}", field, value)))
            .collect();
        let properties = if properties.is_empty() {
            Cell::Blank
        } else {
            Cell::Text(properties.join(", "))
        };

        Self::new()
            .with(layout.name_header.clone(), name)
            .with(layout.quantity_header.clone(), Cell::Number(row.quantity() as f64))
            .with(layout.properties_header.clone(), properties)
    }
}

fn row_index(index: usize) -> BomResult<u32> {
    u32::try_from(index).map_err(|_| BomError::export(format!("Row {} exceeds worksheet limits", index)))
}

fn column_index(index: usize) -> BomResult<u16> {
    u16::try_from(index)
        .map_err(|_| BomError::export(format!("Column {} exceeds worksheet limits", index)))
}

/// Spreadsheet exporter
#[derive(Debug, Clone, Default)]
pub struct BomExporter {
    layout: SheetLayout,
}

impl BomExporter {
    pub fn new(layout: SheetLayout) -> Self {
        Self { layout }
    }

    pub fn layout(&self) -> &SheetLayout {
        &self.layout
    }

    /// Convert aggregated rows and write them to `path`
    pub fn export_bom(&self, rows: &[BomRow], path: &Path) -> BomResult<PathBuf> {
        let sheet_rows: Vec<SheetRow> = rows
            .iter()
            .map(|row| SheetRow::from_bom_row(row, &self.layout))
            .collect();
        self.export(&sheet_rows, path)
    }

    /// Write rows to `path`, choosing the format by extension.
    /// Returns the path the workbook was saved to.
    pub fn export(&self, rows: &[SheetRow], path: &Path) -> BomResult<PathBuf> {
        validate_file_type(path, ExportFormat::EXTENSIONS)?;
        let format = ExportFormat::from_extension(path)
            .ok_or_else(|| BomError::validation("file_type", "Could not determine export format"))?;

        match format {
            ExportFormat::Xlsx => self.write_xlsx(rows, path)?,
            ExportFormat::Csv => self.write_csv(rows, path)?,
        }

        info!(
            path = %path.display(),
            rows = rows.len(),
            format = ?format,
            "exported BOM"
        );
        Ok(path.to_path_buf())
    }

    fn write_xlsx(&self, rows: &[SheetRow], path: &Path) -> BomResult<()> {
        let mut workbook = Workbook::new();
        let header_format = Format::new().set_bold();

        let worksheet = workbook.add_worksheet();
        worksheet.set_name(&self.layout.sheet_name)?;

        for (col, header) in self.layout.headers().into_iter().enumerate() {
            worksheet.write_string_with_format(0, column_index(col)?, header, &header_format)?;
        }
        worksheet.set_freeze_panes(1, 0)?;

        for (index, row) in rows.iter().enumerate() {
            let row_num = row_index(index + 1)?;
            for (col, header) in self.layout.basic_headers().into_iter().enumerate() {
                let col = column_index(col)?;
                match row.get(header) {
                    Some(Cell::Text(text)) => {
                        worksheet.write_string(row_num, col, text)?;
                    }
                    Some(Cell::Number(number)) => {
                        worksheet.write_number(row_num, col, *number)?;
                    }
                    Some(Cell::Blank) | None => {}
                }
            }
        }

        workbook.save(path)?;
        Ok(())
    }

    fn write_csv(&self, rows: &[SheetRow], path: &Path) -> BomResult<()> {
        let mut writer = csv::Writer::from_path(path)?;
        writer.write_record(self.layout.headers())?;

        for row in rows {
            let mut record: Vec<String> = self
                .layout
                .basic_headers()
                .iter()
                .map(|header| row.get(header).map(Cell::to_text).unwrap_or_default())
                .collect();
            record.extend(self.layout.extra_headers.iter().map(|_| String::new()));
            writer.write_record(&record)?;
        }

        writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cadbom_models::TYPE_FIELD;

    fn bolt_row() -> BomRow {
        let mut row = BomRow::new(vec![
            (NAME_FIELD.to_string(), Some("Bolt".into())),
            (TYPE_FIELD.to_string(), Some("Brep".into())),
        ]);
        row.increment();
        row.increment();
        row.set_extra("price", Some("10; 20".into()));
        row.set_extra("finish", None);
        row
    }

    #[test]
    fn test_format_detection() {
        assert_eq!(ExportFormat::from_extension(Path::new("bom.xlsx")), Some(ExportFormat::Xlsx));
        assert_eq!(ExportFormat::from_extension(Path::new("bom.CSV")), Some(ExportFormat::Csv));
        assert_eq!(ExportFormat::from_extension(Path::new("bom.xls")), None);
        assert_eq!(ExportFormat::from_extension(Path::new("bom")), None);
    }

    #[test]
    fn test_default_layout() {
        let layout = SheetLayout::default();
        assert_eq!(layout.sheet_name, "Itens");
        assert_eq!(
            layout.headers(),
            vec!["Nome", "Quantidade", "Propriedades", "Observações", "Preço Unitário"]
        );
    }

    #[test]
    fn test_sheet_row_from_bom_row() {
        let layout = SheetLayout::default();
        let row = SheetRow::from_bom_row(&bolt_row(), &layout);

        assert_eq!(row.get("Nome"), Some(&Cell::Text("Bolt".to_string())));
        assert_eq!(row.get("Quantidade"), Some(&Cell::Number(2.0)));
        assert_eq!(
            row.get("Propriedades"),
            Some(&Cell::Text("type: Brep, price: 10; 20".to_string()))
        );
        assert_eq!(row.get("Observações"), None);
    }

    #[test]
    fn test_sheet_row_without_properties() {
        let mut row = BomRow::new(vec![(NAME_FIELD.to_string(), None)]);
        row.increment();
        let sheet_row = SheetRow::from_bom_row(&row, &SheetLayout::default());

        assert_eq!(sheet_row.get("Nome"), Some(&Cell::Blank));
        assert_eq!(sheet_row.get("Propriedades"), Some(&Cell::Blank));
    }

    #[test]
    fn test_cell_from_value() {
        assert_eq!(Cell::from(&AttrValue::Integer(4)), Cell::Number(4.0));
        assert_eq!(Cell::from(&AttrValue::from("M8")), Cell::Text("M8".to_string()));
        assert_eq!(Cell::Number(3.0).to_text(), "3");
        assert_eq!(Cell::Blank.to_text(), "");
    }

    #[test]
    fn test_unknown_extension_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let err = BomExporter::default()
            .export_bom(&[bolt_row()], &dir.path().join("bom.pdf"))
            .unwrap_err();
        assert_eq!(err.error_code(), "VALIDATION_ERROR");
    }
}
