use crate::error::{BomError, BomResult};
use std::path::Path;
use validator::{Validate, ValidationErrors, ValidationErrorsKind};

pub fn validate_model<T: Validate>(model: &T) -> BomResult<()> {
    match model.validate() {
        Ok(()) => Ok(()),
        Err(errors) => {
            let error_messages = format_validation_errors(&errors);
            Err(BomError::validation("model", error_messages))
        }
    }
}

/// Flatten validation errors, including nested sections, into one message
pub fn format_validation_errors(errors: &ValidationErrors) -> String {
    let mut messages = Vec::new();
    collect_messages("", errors, &mut messages);
    messages.join(", ")
}

fn collect_messages(prefix: &str, errors: &ValidationErrors, messages: &mut Vec<String>) {
    for (field, kind) in errors.errors() {
        let path = if prefix.is_empty() {
            field.to_string()
        } else {
            format!("{}.{}", prefix, field)
        };

        match kind {
            ValidationErrorsKind::Field(field_errors) => {
                for error in field_errors {
                    let message = match &error.code {
                        std::borrow::Cow::Borrowed("length") => {
                            format!("Length validation failed for field '{}'", path)
                        }
                        std::borrow::Cow::Borrowed("range") => {
                            format!("Value out of range for field '{}'", path)
                        }
                        std::borrow::Cow::Borrowed("required") => {
                            format!("Field '{}' is required", path)
                        }
                        _ => format!("Validation failed for field '{}': {}", path, error.code),
                    };
                    messages.push(message);
                }
            }
            ValidationErrorsKind::Struct(nested) => collect_messages(&path, nested, messages),
            ValidationErrorsKind::List(items) => {
                for (index, nested) in items {
                    collect_messages(&format!("{}[{}]", path, index), nested, messages);
                }
            }
        }
    }
}

pub fn validate_file_type(path: &Path, allowed_types: &[&str]) -> BomResult<()> {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or("");

    if !allowed_types.contains(&extension.to_lowercase().as_str()) {
        return Err(BomError::validation(
            "file_type",
            format!(
                "File type '{}' not allowed. Allowed types: {}",
                extension,
                allowed_types.join(", ")
            ),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Validate)]
    struct Sheet {
        #[validate(length(min = 1, max = 31))]
        name: String,
    }

    #[derive(Validate)]
    struct Workbook {
        #[validate]
        sheet: Sheet,
    }

    #[test]
    fn test_validate_model_reports_field() {
        let model = Sheet { name: String::new() };
        let err = validate_model(&model).unwrap_err();
        assert_eq!(err.error_code(), "VALIDATION_ERROR");
        assert!(err.to_string().contains("'name'"));
    }

    #[test]
    fn test_nested_errors_are_prefixed() {
        let model = Workbook {
            sheet: Sheet { name: "x".repeat(40) },
        };
        let err = validate_model(&model).unwrap_err();
        assert!(err.to_string().contains("'sheet.name'"));
    }

    #[test]
    fn test_validate_file_type() {
        let allowed_types = &["xlsx", "csv"];
        assert!(validate_file_type(Path::new("bom.xlsx"), allowed_types).is_ok());
        assert!(validate_file_type(Path::new("BOM.CSV"), allowed_types).is_ok());
        assert!(validate_file_type(Path::new("bom.pdf"), allowed_types).is_err());
        assert!(validate_file_type(Path::new("bom"), allowed_types).is_err());
    }
}
