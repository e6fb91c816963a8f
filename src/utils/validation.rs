use std::collections::BTreeMap;
use validator::{ValidationErrors, ValidationErrorsKind};

/// Field name to messages, sorted by field name.
pub fn field_messages(errors: &ValidationErrors) -> BTreeMap<String, Vec<String>> {
    let mut fields = BTreeMap::new();
    for (field, kind) in errors.errors() {
        if let ValidationErrorsKind::Field(errs) = kind {
            let field = field.to_string();
            let messages = errs
                .iter()
                .map(|err| {
                    err.message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| format!("{} is invalid", field))
                })
                .collect();
            fields.insert(field, messages);
        }
    }
    fields
}

/// All messages flattened in field-name order.
pub fn validation_messages(errors: &ValidationErrors) -> Vec<String> {
    field_messages(errors).into_values().flatten().collect()
}
