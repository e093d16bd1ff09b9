//! End-to-end exports: real source files on disk, full pipeline, exact
//! output text.

use std::io::Write;

use varex::{
    ClosureHandle, ExportError, FormatterConfig, FormatterMode, Key, Value, VarExporter,
};

fn write_fixture(content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    file.write_all(content.as_bytes()).expect("write fixture");
    file
}

#[test]
fn exports_mixed_array_single_line() {
    let value = Value::array(vec![
        (None, Value::Int(1)),
        (Some(Key::from("a")), Value::Int(2)),
    ]);
    let exporter = VarExporter::new();
    assert_eq!(exporter.export(&value).unwrap(), "[0 => 1, 'a' => 2]");
    assert_eq!(exporter.export_statement(&value).unwrap(), "[0 => 1, 'a' => 2];");
}

#[test]
fn pretty_mode_with_trailing_comma_and_nesting() {
    let value = Value::array(vec![
        (Some(Key::from("name")), Value::Str("queue".to_string())),
        (
            Some(Key::from("limits")),
            Value::array(vec![(None, Value::Int(10)), (None, Value::Int(20))]),
        ),
    ]);
    let exporter = VarExporter::with_config(
        FormatterConfig::default()
            .with_mode(FormatterMode::Pretty)
            .with_trailing_comma(true),
    );
    assert_eq!(
        exporter.export(&value).unwrap(),
        "[\n    'name' => 'queue',\n    'limits' => [\n        0 => 10,\n        1 => 20,\n    ],\n]"
    );
}

#[test]
fn non_finite_floats_render_as_constants() {
    let value = Value::array(vec![
        (None, Value::Float(f64::NAN)),
        (None, Value::Float(f64::INFINITY)),
        (None, Value::Float(f64::NEG_INFINITY)),
    ]);
    let out = VarExporter::new().export(&value).unwrap();
    assert_eq!(out, "[0 => NAN, 1 => INF, 2 => -INF]");
}

#[test]
fn closure_is_reparsed_and_fully_qualified() {
    let fixture = write_fixture(concat!(
        "<?php\n",
        "namespace App\\Jobs;\n",
        "use Vendor\\Log\\Logger as Log;\n",
        "$cb = function ($msg) use ($prefix) {\n",
        "    Log::write($prefix . $msg);\n",
        "    return count([$msg]) > 0;\n",
        "};\n",
    ));
    let handle = ClosureHandle::from_source(fixture.path(), 4, 7);
    let out = VarExporter::new()
        .export(&Value::Closure(handle))
        .unwrap();
    assert_eq!(
        out,
        "function ($msg) use ($prefix) { \\Vendor\\Log\\Logger::write($prefix . $msg); return \\count([$msg]) > 0; }"
    );
}

#[test]
fn closure_in_pretty_array_is_reindented_under_its_entry() {
    let fixture = write_fixture(concat!(
        "<?php\n",
        "$cb = function ($x) {\n",
        "    return $x * 2;\n",
        "};\n",
    ));
    let handle = ClosureHandle::from_source(fixture.path(), 2, 4);
    let value = Value::array(vec![(Some(Key::from("cb")), Value::Closure(handle))]);
    let exporter =
        VarExporter::with_config(FormatterConfig::default().with_mode(FormatterMode::Pretty));
    assert_eq!(
        exporter.export(&value).unwrap(),
        "[\n    'cb' => function ($x) {\n        return $x * 2;\n    }\n]"
    );
}

#[test]
fn deleted_source_file_degrades_to_placeholder() {
    let handle = {
        let fixture = write_fixture("<?php\n$cb = fn($job) => $job;\n");
        ClosureHandle::from_source(fixture.path(), 2, 2).with_params(["job"])
        // fixture dropped here, deleting the file
    };
    let value = Value::array(vec![(Some(Key::from("cb")), Value::Closure(handle))]);
    let out = VarExporter::new().export(&value).unwrap();
    assert_eq!(out, "['cb' => function($job) { /* closure */ }]");
}

#[test]
fn synthetic_closure_always_takes_the_fallback() {
    let value = Value::Closure(ClosureHandle::synthetic());
    let out = VarExporter::new().export(&value).unwrap();
    assert_eq!(out, "function() { /* closure */ }");
}

#[test]
fn object_deep_in_a_container_reports_its_path() {
    let value = Value::array(vec![(
        Some(Key::from("jobs")),
        Value::array(vec![(
            None,
            Value::Object {
                class: "PDO".to_string(),
            },
        )]),
    )]);
    let err = VarExporter::new().export(&value).unwrap_err();
    match err {
        ExportError::Unexportable { type_name, path, .. } => {
            assert_eq!(type_name, "object");
            assert_eq!(path.to_string(), "$root['jobs'][0]");
        }
        other => panic!("expected unexportable, got {other:?}"),
    }
}

#[test]
fn depth_limit_allows_max_depth_levels_exactly() {
    fn nest(levels: usize) -> Value {
        let mut value = Value::Int(1);
        for _ in 0..levels {
            value = Value::array(vec![(None, value)]);
        }
        value
    }
    let exporter = VarExporter::with_config(FormatterConfig::default().with_max_depth(3));
    assert!(exporter.export(&nest(3)).is_ok());
    match exporter.export(&nest(4)) {
        Err(ExportError::DepthExceeded { max_depth }) => assert_eq!(max_depth, 3),
        other => panic!("expected depth error, got {other:?}"),
    }
}

#[test]
fn sorted_keys_put_integers_before_strings() {
    let value = Value::array(vec![
        (Some(Key::from("zeta")), Value::Int(1)),
        (Some(Key::Int(10)), Value::Int(2)),
        (Some(Key::from("alpha")), Value::Int(3)),
        (Some(Key::Int(2)), Value::Int(4)),
    ]);
    let exporter = VarExporter::with_config(FormatterConfig::default().with_sort_keys(true));
    assert_eq!(
        exporter.export(&value).unwrap(),
        "[2 => 4, 10 => 2, 'alpha' => 3, 'zeta' => 1]"
    );
}

#[test]
fn pretty_collapses_back_to_standard_layout() {
    let value = Value::array(vec![
        (Some(Key::from("a")), Value::Int(1)),
        (
            Some(Key::from("b")),
            Value::array(vec![(None, Value::Str("x".to_string()))]),
        ),
    ]);
    let standard = VarExporter::new().export(&value).unwrap();
    let pretty = VarExporter::new().export_pretty(&value).unwrap();
    let collapsed: String = pretty.split_whitespace().collect::<Vec<_>>().join(" ");
    // Pretty layout differs only in whitespace placement.
    assert_eq!(collapsed.replace("[ ", "[").replace(" ]", "]"), standard);
}

#[test]
fn bound_method_closure_exports_a_forwarding_literal() {
    let fixture = write_fixture(concat!(
        "<?php\n",
        "namespace App;\n",
        "use Vendor\\Mailer;\n",
    ));
    let handle = ClosureHandle::from_source(fixture.path(), 99, 99)
        .with_bound_method("Mailer", "send");
    let out = VarExporter::new()
        .export(&Value::Closure(handle))
        .unwrap();
    assert_eq!(
        out,
        "static function () { return \\Vendor\\Mailer::send(...\\func_get_args()); }"
    );
}

#[test]
fn closure_string_literal_contents_are_preserved() {
    let fixture = write_fixture("<?php\n$f = fn() => 'a  b';\n");
    let handle = ClosureHandle::from_source(fixture.path(), 2, 2);
    let out = VarExporter::new().export(&Value::Closure(handle)).unwrap();
    assert_eq!(out, "fn() => 'a  b'");
}

#[test]
fn magic_constants_bake_in_the_declaring_file() {
    let fixture = write_fixture("<?php\n$cb = fn() => __FILE__;\n");
    let path = fixture.path().display().to_string();
    let handle = ClosureHandle::from_source(fixture.path(), 2, 2);
    let out = VarExporter::new()
        .export(&Value::Closure(handle))
        .unwrap();
    assert_eq!(out, format!("fn() => '{path}'"));
}
