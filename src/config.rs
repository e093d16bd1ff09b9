//! Formatter configuration shared by every export path.

/// Output layout selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatterMode {
    /// Single-line output, entries separated by `, `.
    Standard,
    /// Multi-line output, one entry per line under increasing indent.
    Pretty,
}

/// Immutable export options. `with_*` methods return modified copies; an
/// instance handed to an export call is never mutated by it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatterConfig {
    pub mode: FormatterMode,
    pub indent: String,
    pub max_depth: usize,
    pub sort_keys: bool,
    pub trailing_comma: bool,
}

impl Default for FormatterConfig {
    fn default() -> Self {
        Self {
            mode: FormatterMode::Standard,
            indent: "    ".to_string(),
            max_depth: 100,
            sort_keys: false,
            trailing_comma: false,
        }
    }
}

impl FormatterConfig {
    pub fn with_mode(mut self, mode: FormatterMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_indent(mut self, indent: impl Into<String>) -> Self {
        self.indent = indent.into();
        self
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_sort_keys(mut self, sort_keys: bool) -> Self {
        self.sort_keys = sort_keys;
        self
    }

    pub fn with_trailing_comma(mut self, trailing_comma: bool) -> Self {
        self.trailing_comma = trailing_comma;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::{FormatterConfig, FormatterMode};

    #[test]
    fn with_copies_leave_other_fields_alone() {
        let base = FormatterConfig::default();
        let pretty = base.clone().with_mode(FormatterMode::Pretty).with_indent("  ");
        assert_eq!(pretty.mode, FormatterMode::Pretty);
        assert_eq!(pretty.indent, "  ");
        assert_eq!(pretty.max_depth, base.max_depth);
        assert_eq!(base.mode, FormatterMode::Standard, "original untouched");
    }
}
