//! Selection input
//!
//! The CAD host hands over the selected objects as a JSON export. A missing
//! export means the command is not running next to a host.

use std::io::{IsTerminal, Read};
use std::path::PathBuf;

use cadbom_models::AttrValue;
use cadbom_utils::{BomError, BomResult};

/// Where the selected objects come from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionSource {
    Stdin,
    File(PathBuf),
}

impl SelectionSource {
    pub fn parse(arg: &str) -> Self {
        if arg == "-" {
            Self::Stdin
        } else {
            Self::File(PathBuf::from(arg))
        }
    }
}

/// Read the selected objects from their source
pub fn load_selection(source: &SelectionSource) -> BomResult<Vec<AttrValue>> {
    let text = match source {
        SelectionSource::File(path) => {
            if !path.exists() {
                return Err(BomError::host_unavailable(format!(
                    "selection export {} not found",
                    path.display()
                )));
            }
            std::fs::read_to_string(path)
                .map_err(|e| BomError::selection(format!("{}: {}", path.display(), e)))?
        }
        SelectionSource::Stdin => {
            let mut stdin = std::io::stdin();
            if stdin.is_terminal() {
                return Err(BomError::host_unavailable("no selection piped on stdin"));
            }
            let mut text = String::new();
            stdin
                .read_to_string(&mut text)
                .map_err(|e| BomError::selection(e.to_string()))?;
            text
        }
    };

    parse_selection(&text)
}

/// Parse a selection export.
///
/// Accepts an array of objects, an `{"objects": [...]}` envelope, or a
/// single object. Blank input and `null` mean nothing was selected.
pub fn parse_selection(text: &str) -> BomResult<Vec<AttrValue>> {
    if text.trim().is_empty() {
        return Ok(Vec::new());
    }

    let value: serde_json::Value = serde_json::from_str(text)?;
    let objects = match value {
        serde_json::Value::Null => Vec::new(),
        serde_json::Value::Array(items) => items.into_iter().map(AttrValue::from).collect(),
        serde_json::Value::Object(mut envelope) => match envelope.remove("objects") {
            Some(serde_json::Value::Array(items)) => items.into_iter().map(AttrValue::from).collect(),
            Some(other) => {
                return Err(BomError::selection(format!(
                    "expected \"objects\" to be an array, found {}",
                    other
                )))
            }
            None => vec![AttrValue::from(serde_json::Value::Object(envelope))],
        },
        other => {
            return Err(BomError::selection(format!(
                "expected an array of objects, found {}",
                other
            )))
        }
    };

    Ok(objects)
}
