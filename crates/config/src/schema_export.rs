//! JSON Schema export for the logging config document.

use crate::LoggingConfig;
use schemars::{Schema, schema_for};

/// JSON Schema for `LoggingConfig`.
#[must_use]
pub fn logging_config_schema() -> Schema {
    schema_for!(LoggingConfig)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_describes_tree_fields() -> Result<(), Box<dyn std::error::Error>> {
        let schema = serde_json::to_value(logging_config_schema())?;
        let text = schema.to_string();
        assert!(text.contains("minLevel"));
        assert!(text.contains("children"));
        assert!(text.contains("onSinkFailure"));
        Ok(())
    }
}
