//! Recursive value-to-source formatting for arrays and the scalars and
//! closures nested inside them.

use crate::config::{FormatterConfig, FormatterMode};
use crate::error::{ExportError, ExportResult};
use crate::value::{Key, Value, ValuePath};

use super::closure::ClosureExporter;
use super::scalar::{format_float, quote_str};

/// Renders `value` as it would appear `depth` containers deep. Containers
/// check the depth bound on entry, so a top-level array sits at depth zero
/// and the bound counts nesting levels, not values.
pub(super) fn format_value(
    value: &Value,
    closures: &ClosureExporter,
    config: &FormatterConfig,
    depth: usize,
    path: &ValuePath,
) -> ExportResult<String> {
    match value {
        Value::Null => Ok("null".to_string()),
        Value::Bool(true) => Ok("true".to_string()),
        Value::Bool(false) => Ok("false".to_string()),
        Value::Int(n) => Ok(n.to_string()),
        Value::Float(f) => Ok(format_float(*f)),
        Value::Str(s) => Ok(quote_str(s)),
        Value::Array(entries) => format_array(entries, closures, config, depth, path),
        Value::Closure(handle) => Ok(closures.export_at(handle, config, depth)),
        Value::Object { .. } | Value::Resource { .. } => Err(ExportError::Unexportable {
            type_name: value.type_name().to_string(),
            path: path.clone(),
            value: value.clone(),
        }),
    }
}

fn format_array(
    entries: &[(Key, Value)],
    closures: &ClosureExporter,
    config: &FormatterConfig,
    depth: usize,
    path: &ValuePath,
) -> ExportResult<String> {
    if depth >= config.max_depth {
        return Err(ExportError::DepthExceeded {
            max_depth: config.max_depth,
        });
    }
    let mut ordered: Vec<&(Key, Value)> = entries.iter().collect();
    if config.sort_keys {
        // Key's ordering puts integer keys (ascending) ahead of string keys
        // (lexicographic). Nested arrays sort through the recursion.
        ordered.sort_by(|a, b| a.0.cmp(&b.0));
    }
    if ordered.is_empty() {
        return Ok("[]".to_string());
    }

    let mut parts = Vec::with_capacity(ordered.len());
    for (key, value) in ordered {
        let child = path.child(key.clone());
        let rendered = format_value(value, closures, config, depth + 1, &child)?;
        parts.push(format!("{} => {}", render_key(key), rendered));
    }

    match config.mode {
        FormatterMode::Standard => Ok(format!("[{}]", parts.join(", "))),
        FormatterMode::Pretty => {
            let entry_indent = config.indent.repeat(depth + 1);
            let close_indent = config.indent.repeat(depth);
            let mut out = String::from("[\n");
            let last = parts.len() - 1;
            for (i, part) in parts.iter().enumerate() {
                out.push_str(&entry_indent);
                out.push_str(part);
                if i < last || config.trailing_comma {
                    out.push(',');
                }
                out.push('\n');
            }
            out.push_str(&close_indent);
            out.push(']');
            Ok(out)
        }
    }
}

fn render_key(key: &Key) -> String {
    match key {
        Key::Int(n) => n.to_string(),
        Key::Str(s) => quote_str(s),
    }
}

#[cfg(test)]
mod tests {
    use crate::config::{FormatterConfig, FormatterMode};
    use crate::error::ExportError;
    use crate::value::{Key, Value, ValuePath};

    use super::super::closure::ClosureExporter;
    use super::format_value;

    fn render(value: &Value, config: &FormatterConfig) -> Result<String, ExportError> {
        format_value(value, &ClosureExporter::new(), config, 0, &ValuePath::root())
    }

    fn sample() -> Value {
        Value::array(vec![
            (None, Value::Int(1)),
            (Some(Key::from("a")), Value::Int(2)),
        ])
    }

    #[test]
    fn standard_mode_is_single_line_with_explicit_keys() {
        let out = render(&sample(), &FormatterConfig::default()).unwrap();
        assert_eq!(out, "[0 => 1, 'a' => 2]");
    }

    #[test]
    fn pretty_mode_indents_and_honors_trailing_comma() {
        let config = FormatterConfig::default()
            .with_mode(FormatterMode::Pretty)
            .with_trailing_comma(true);
        let out = render(&sample(), &config).unwrap();
        assert_eq!(out, "[\n    0 => 1,\n    'a' => 2,\n]");
    }

    #[test]
    fn pretty_mode_without_trailing_comma() {
        let config = FormatterConfig::default().with_mode(FormatterMode::Pretty);
        let out = render(&sample(), &config).unwrap();
        assert_eq!(out, "[\n    0 => 1,\n    'a' => 2\n]");
    }

    #[test]
    fn empty_array_is_bare_brackets_in_both_modes() {
        let empty = Value::array(vec![]);
        assert_eq!(render(&empty, &FormatterConfig::default()).unwrap(), "[]");
        let pretty = FormatterConfig::default().with_mode(FormatterMode::Pretty);
        assert_eq!(render(&empty, &pretty).unwrap(), "[]");
    }

    #[test]
    fn sort_keys_orders_ints_before_strings_recursively() {
        let value = Value::array(vec![
            (Some(Key::from("b")), Value::Int(1)),
            (
                Some(Key::from("a")),
                Value::array(vec![
                    (Some(Key::from("z")), Value::Int(3)),
                    (Some(Key::Int(2)), Value::Int(4)),
                ]),
            ),
            (Some(Key::Int(7)), Value::Int(5)),
        ]);
        let config = FormatterConfig::default().with_sort_keys(true);
        let out = render(&value, &config).unwrap();
        assert_eq!(out, "[7 => 5, 'a' => [2 => 4, 'z' => 3], 'b' => 1]");
    }

    #[test]
    fn depth_bound_counts_nesting_levels() {
        let nested = Value::array(vec![(
            None,
            Value::array(vec![(None, Value::Int(1))]),
        )]);
        let ok = FormatterConfig::default().with_max_depth(2);
        assert!(render(&nested, &ok).is_ok());
        let tight = FormatterConfig::default().with_max_depth(1);
        match render(&nested, &tight) {
            Err(ExportError::DepthExceeded { max_depth }) => assert_eq!(max_depth, 1),
            other => panic!("expected depth error, got {other:?}"),
        }
    }

    #[test]
    fn unexportable_value_reports_its_path() {
        let value = Value::array(vec![(
            Some(Key::from("jobs")),
            Value::array(vec![(
                None,
                Value::Object {
                    class: "PDO".to_string(),
                },
            )]),
        )]);
        match render(&value, &FormatterConfig::default()) {
            Err(ExportError::Unexportable {
                type_name, path, ..
            }) => {
                assert_eq!(type_name, "object");
                assert_eq!(path.to_string(), "$root['jobs'][0]");
            }
            other => panic!("expected unexportable error, got {other:?}"),
        }
    }

    #[test]
    fn float_scalars_render_constant_tokens() {
        let value = Value::array(vec![(None, Value::Float(f64::NAN))]);
        let out = render(&value, &FormatterConfig::default()).unwrap();
        assert_eq!(out, "[0 => NAN]");
    }

    #[test]
    fn missing_closure_source_degrades_inside_arrays() {
        let handle = crate::handle::ClosureHandle::from_source("/gone.php", 3, 4)
            .with_params(["x"]);
        let value = Value::array(vec![(None, Value::Closure(handle))]);
        let out = render(&value, &FormatterConfig::default()).unwrap();
        assert_eq!(out, "[0 => function($x) { /* closure */ }]");
    }
}
