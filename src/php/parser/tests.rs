use crate::php::ast::{ClosureFlags, Expr, Item, Stmt};
use crate::php::parser::parse_source;

#[test]
fn parses_namespace_and_use_declarations() {
    let src = "<?php\nnamespace App\\Jobs;\nuse Vendor\\Queue as Q;\nuse App\\Support\\{Clock, Timer as T};\n";
    let program = parse_source(src).expect("parse");
    assert_eq!(program.items.len(), 3);

    let Item::Namespace(ns) = &program.items[0] else {
        panic!("expected namespace");
    };
    assert_eq!(ns.name.to_string(), "App\\Jobs");

    let Item::Use(single) = &program.items[1] else {
        panic!("expected use");
    };
    assert_eq!(single.entries[0].path.to_string(), "Vendor\\Queue");
    assert_eq!(single.entries[0].alias.as_deref(), Some("Q"));

    let Item::Use(group) = &program.items[2] else {
        panic!("expected group use");
    };
    assert_eq!(group.entries.len(), 2);
    assert_eq!(group.entries[0].path.to_string(), "App\\Support\\Clock");
    assert_eq!(group.entries[1].path.to_string(), "App\\Support\\Timer");
    assert_eq!(group.entries[1].alias.as_deref(), Some("T"));
}

#[test]
fn closure_records_its_start_line() {
    let src = "<?php\n$f =\n    function ($x) use ($y) {\n        return $x + $y;\n    };\n";
    let program = parse_source(src).expect("parse");
    let Item::Stmt(Stmt::Expr(Expr::Assign { value, .. })) = &program.items[0] else {
        panic!("expected assignment");
    };
    let Expr::Closure(closure) = value.as_ref() else {
        panic!("expected closure");
    };
    assert_eq!(closure.line, 3);
    assert_eq!(closure.params[0].name, "x");
    assert_eq!(closure.uses[0].name, "y");
}

#[test]
fn static_arrow_fn_carries_flags() {
    let src = "<?php $f = static fn($n) => $n * 2;";
    let program = parse_source(src).expect("parse");
    let Item::Stmt(Stmt::Expr(Expr::Assign { value, .. })) = &program.items[0] else {
        panic!("expected assignment");
    };
    let Expr::ArrowFn(arrow) = value.as_ref() else {
        panic!("expected arrow fn");
    };
    assert!(arrow.flags.contains(ClosureFlags::STATIC));
}

#[test]
fn parses_class_with_method_and_const() {
    let src = "<?php\nclass Worker extends Base {\n    const LIMIT = 10;\n    private $count = 0;\n    public static function run(int $n): void {\n        return;\n    }\n}\n";
    let program = parse_source(src).expect("parse");
    let Item::Class(class) = &program.items[0] else {
        panic!("expected class");
    };
    assert_eq!(class.name, "Worker");
    assert_eq!(class.parent.as_ref().map(|p| p.to_string()).as_deref(), Some("Base"));
    assert_eq!(class.members.len(), 3);
}

#[test]
fn parses_nested_call_and_array_literal() {
    let src = "<?php $out = array_map(fn($v) => $v + 1, ['a' => 1, 2]);";
    let program = parse_source(src).expect("parse");
    let Item::Stmt(Stmt::Expr(Expr::Assign { value, .. })) = &program.items[0] else {
        panic!("expected assignment");
    };
    let Expr::Call { args, .. } = value.as_ref() else {
        panic!("expected call");
    };
    assert_eq!(args.len(), 2);
    let Expr::ArrayLit(entries) = &args[1] else {
        panic!("expected array literal");
    };
    assert!(entries[0].key.is_some());
    assert!(entries[1].key.is_none());
}

#[test]
fn concat_and_comparison_precedence() {
    let src = "<?php $ok = 'a' . 'b' === 'ab';";
    let program = parse_source(src).expect("parse");
    let Item::Stmt(Stmt::Expr(Expr::Assign { value, .. })) = &program.items[0] else {
        panic!("expected assignment");
    };
    // '.' binds tighter than '===': (('a' . 'b') === 'ab').
    let Expr::Binary { op, .. } = value.as_ref() else {
        panic!("expected binary");
    };
    assert_eq!(*op, crate::php::ast::BinOp::Identical);
}

#[test]
fn reports_parse_error_with_line() {
    let src = "<?php\n$x = ;\n";
    let err = parse_source(src).unwrap_err();
    assert_eq!(err.line(), 2);
}

#[test]
fn rejects_file_without_open_tag() {
    let err = parse_source("$x = 1;").unwrap_err();
    assert!(err.to_string().contains("open tag"));
}
