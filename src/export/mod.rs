//! The export surface: turns runtime [`Value`]s into source text.
//!
//! Scalars and arrays are rendered structurally; closures go through the
//! locate/parse/resolve/re-render pipeline in [`closure`], degrading to a
//! commented placeholder when the declaring source cannot be recovered.

mod array;
mod closure;
mod indent;
mod scalar;

pub use closure::{describe_closure, ClosureExporter};

use crate::config::{FormatterConfig, FormatterMode};
use crate::error::ExportResult;
use crate::value::{Value, ValuePath};

/// Value-to-source exporter. Construction is cheap; one instance can serve
/// any number of export calls and never mutates its configuration.
#[derive(Debug, Clone, Default)]
pub struct VarExporter {
    config: FormatterConfig,
    closures: ClosureExporter,
}

impl VarExporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: FormatterConfig) -> Self {
        Self {
            config,
            closures: ClosureExporter::new(),
        }
    }

    pub fn config(&self) -> &FormatterConfig {
        &self.config
    }

    /// Renders `value` as a source expression under the configured mode.
    pub fn export(&self, value: &Value) -> ExportResult<String> {
        self.render(value, &self.config)
    }

    /// Renders `value` multi-line regardless of the configured mode. The
    /// other options (indent unit, sorting, trailing comma) still apply.
    pub fn export_pretty(&self, value: &Value) -> ExportResult<String> {
        let pretty = self.config.clone().with_mode(FormatterMode::Pretty);
        self.render(value, &pretty)
    }

    /// Renders `value` as a complete expression statement, terminator
    /// included, ready to splice into generated source.
    pub fn export_statement(&self, value: &Value) -> ExportResult<String> {
        Ok(format!("{};", self.export(value)?))
    }

    fn render(&self, value: &Value, config: &FormatterConfig) -> ExportResult<String> {
        array::format_value(value, &self.closures, config, 0, &ValuePath::root())
    }
}

#[cfg(test)]
mod tests {
    use crate::config::{FormatterConfig, FormatterMode};
    use crate::value::{Key, Value};

    use super::VarExporter;

    #[test]
    fn statement_export_appends_a_terminator() {
        let exporter = VarExporter::new();
        let value = Value::array(vec![(Some(Key::from("on")), Value::Bool(true))]);
        assert_eq!(
            exporter.export_statement(&value).unwrap(),
            "['on' => true];"
        );
    }

    #[test]
    fn pretty_export_overrides_mode_only() {
        let exporter = VarExporter::with_config(
            FormatterConfig::default().with_indent("  ").with_trailing_comma(true),
        );
        let value = Value::array(vec![(None, Value::Int(1))]);
        assert_eq!(exporter.export(&value).unwrap(), "[0 => 1]");
        assert_eq!(exporter.export_pretty(&value).unwrap(), "[\n  0 => 1,\n]");
        assert_eq!(exporter.config().mode, FormatterMode::Standard);
    }

    #[test]
    fn scalar_exports_need_no_container() {
        let exporter = VarExporter::new();
        assert_eq!(exporter.export(&Value::Null).unwrap(), "null");
        assert_eq!(exporter.export(&Value::Str("a'b".into())).unwrap(), "'a\\'b'");
        assert_eq!(exporter.export(&Value::Float(2.5)).unwrap(), "2.5");
    }
}
