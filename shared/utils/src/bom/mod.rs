//! BOM (Bill of Materials) Processing Module
//!
//! Reads properties off selected drawing objects, aggregates them into BOM
//! rows and exports the rows to a spreadsheet.

pub mod extractor;
pub mod aggregator;
pub mod exporter;

pub use extractor::{
    extract_properties, first_of, resolve, title_case, FieldCandidates, PropertyExtractor,
    BUILTIN_CANDIDATES,
};
pub use aggregator::{aggregate_bom, BomAggregator, BomSummary, GroupingKey, COLLAPSE_SEPARATOR};
pub use exporter::{BomExporter, Cell, ExportFormat, SheetLayout, SheetRow};
