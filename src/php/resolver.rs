//! Rewrites symbolic references inside an isolated function-literal subtree
//! into fully-qualified, context-independent form.

use std::path::Path;

use super::ast::{CallTarget, Expr, Name, Param, Stmt, TypeHint};
use super::context::FileContext;
use super::finder::Ancestor;

/// Global constants a stock PHP runtime defines. File-level `const`
/// declarations extend this set through [`FileContext`].
const BUILTIN_CONSTANTS: &[&str] = &[
    "DIRECTORY_SEPARATOR",
    "E_ALL",
    "E_ERROR",
    "E_NOTICE",
    "E_WARNING",
    "INF",
    "JSON_PRETTY_PRINT",
    "JSON_THROW_ON_ERROR",
    "JSON_UNESCAPED_SLASHES",
    "JSON_UNESCAPED_UNICODE",
    "M_E",
    "M_PI",
    "NAN",
    "PATH_SEPARATOR",
    "PHP_EOL",
    "PHP_FLOAT_EPSILON",
    "PHP_FLOAT_MAX",
    "PHP_INT_MAX",
    "PHP_INT_MIN",
    "PHP_OS",
    "PHP_VERSION",
    "SORT_NUMERIC",
    "SORT_REGULAR",
    "SORT_STRING",
];

/// Commonly linked global functions. Not exhaustive; a name missing here
/// still resolves through the namespace-prefix rule, which is what PHP itself
/// would fall back to at call time.
const BUILTIN_FUNCTIONS: &[&str] = &[
    "abs",
    "array_filter",
    "array_key_exists",
    "array_keys",
    "array_map",
    "array_merge",
    "array_pop",
    "array_push",
    "array_search",
    "array_slice",
    "array_values",
    "call_user_func",
    "call_user_func_array",
    "ceil",
    "count",
    "explode",
    "floor",
    "func_get_args",
    "get_class",
    "gettype",
    "implode",
    "in_array",
    "intval",
    "is_array",
    "is_int",
    "is_null",
    "is_string",
    "json_decode",
    "json_encode",
    "max",
    "min",
    "printf",
    "round",
    "sort",
    "sprintf",
    "str_contains",
    "str_repeat",
    "str_replace",
    "strlen",
    "strpos",
    "strtolower",
    "strtoupper",
    "substr",
    "trim",
    "usort",
];

/// Type-hint keywords that denote builtin types, never classes.
const BUILTIN_TYPES: &[&str] = &[
    "array", "bool", "callable", "false", "float", "int", "iterable", "mixed", "never", "null",
    "object", "self", "static", "string", "true", "void",
];

/// Syntactic position of a name, gating which resolution rules apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NamePos {
    /// Constant-fetch position: bare name used as a value.
    Const,
    /// Call position: bare name followed by an argument list.
    Func,
    /// Class-name position: `new`, `::`, `instanceof`, type hints.
    Class,
}

#[derive(Debug, Clone)]
struct EnclosingClass {
    name: String,
    parent: Option<String>,
}

/// Tree-walking visitor over one isolated literal subtree. Holds the file
/// context, the declaring file path (for magic-constant substitution), and
/// the nearest enclosing class found on the locator's ancestor trail.
pub struct NameResolver<'a> {
    ctx: &'a FileContext,
    file: &'a Path,
    class: Option<EnclosingClass>,
}

impl<'a> NameResolver<'a> {
    pub fn new(ctx: &'a FileContext, file: &'a Path, trail: &[Ancestor]) -> Self {
        let class = trail.iter().rev().find_map(|ancestor| match ancestor {
            Ancestor::Class { name, parent } => Some(EnclosingClass {
                name: name.clone(),
                parent: parent.clone(),
            }),
            _ => None,
        });
        Self { ctx, file, class }
    }

    /// Rewrites every resolvable reference inside `expr` in place.
    pub fn resolve(&self, expr: &mut Expr) {
        self.resolve_expr(expr);
    }

    fn resolve_expr(&self, expr: &mut Expr) {
        match expr {
            Expr::MagicFile => {
                *expr = Expr::Str(self.file.display().to_string());
            }
            Expr::MagicDir => {
                let dir = self
                    .file
                    .parent()
                    .map(|p| p.display().to_string())
                    .unwrap_or_default();
                *expr = Expr::Str(dir);
            }
            Expr::MagicClass => {
                // Denotes a type, not a string: render as `\Fq\Class::class`.
                *expr = match self.qualified_enclosing_class() {
                    Some(class) => Expr::ClassConst {
                        class,
                        constant: "class".to_string(),
                    },
                    None => Expr::Str(String::new()),
                };
            }
            Expr::ConstFetch(name) => self.resolve_name(name, NamePos::Const),
            Expr::Call { callee, args } => {
                match callee {
                    CallTarget::Name(name) => self.resolve_name(name, NamePos::Func),
                    CallTarget::Expr(inner) => self.resolve_expr(inner),
                }
                for arg in args {
                    self.resolve_expr(arg);
                }
            }
            Expr::StaticCall { class, args, .. } | Expr::New { class, args } => {
                self.resolve_name(class, NamePos::Class);
                for arg in args {
                    self.resolve_expr(arg);
                }
            }
            Expr::ClassConst { class, .. } => self.resolve_name(class, NamePos::Class),
            Expr::Instanceof { expr, class } => {
                self.resolve_expr(expr);
                self.resolve_name(class, NamePos::Class);
            }
            Expr::MethodCall { object, args, .. } => {
                self.resolve_expr(object);
                for arg in args {
                    self.resolve_expr(arg);
                }
            }
            Expr::PropFetch { object, .. } => self.resolve_expr(object),
            Expr::Index { base, index } => {
                self.resolve_expr(base);
                if let Some(index) = index {
                    self.resolve_expr(index);
                }
            }
            Expr::ArrayLit(entries) => {
                for entry in entries {
                    if let Some(key) = &mut entry.key {
                        self.resolve_expr(key);
                    }
                    self.resolve_expr(&mut entry.value);
                }
            }
            Expr::Assign { target, value, .. } => {
                self.resolve_expr(target);
                self.resolve_expr(value);
            }
            Expr::Binary { lhs, rhs, .. } => {
                self.resolve_expr(lhs);
                self.resolve_expr(rhs);
            }
            Expr::Unary { expr, .. } | Expr::Spread(expr) => self.resolve_expr(expr),
            Expr::Ternary {
                cond,
                then,
                otherwise,
            } => {
                self.resolve_expr(cond);
                if let Some(then) = then {
                    self.resolve_expr(then);
                }
                self.resolve_expr(otherwise);
            }
            Expr::Closure(closure) => {
                self.resolve_params(&mut closure.params);
                if let Some(hint) = &mut closure.return_type {
                    self.resolve_type_hint(hint);
                }
                for stmt in &mut closure.body {
                    self.resolve_stmt(stmt);
                }
            }
            Expr::ArrowFn(arrow) => {
                self.resolve_params(&mut arrow.params);
                if let Some(hint) = &mut arrow.return_type {
                    self.resolve_type_hint(hint);
                }
                self.resolve_expr(&mut arrow.body);
            }
            Expr::Null | Expr::Bool(_) | Expr::Number(_) | Expr::Str(_) | Expr::Variable(_) => {}
        }
    }

    fn resolve_stmt(&self, stmt: &mut Stmt) {
        match stmt {
            Stmt::Expr(expr) => self.resolve_expr(expr),
            Stmt::Return(value) => {
                if let Some(value) = value {
                    self.resolve_expr(value);
                }
            }
            Stmt::If {
                cond,
                then,
                elseifs,
                otherwise,
            } => {
                self.resolve_expr(cond);
                for stmt in then {
                    self.resolve_stmt(stmt);
                }
                for (cond, body) in elseifs {
                    self.resolve_expr(cond);
                    for stmt in body {
                        self.resolve_stmt(stmt);
                    }
                }
                if let Some(body) = otherwise {
                    for stmt in body {
                        self.resolve_stmt(stmt);
                    }
                }
            }
            Stmt::While { cond, body } => {
                self.resolve_expr(cond);
                for stmt in body {
                    self.resolve_stmt(stmt);
                }
            }
            Stmt::Foreach { subject, body, .. } => {
                self.resolve_expr(subject);
                for stmt in body {
                    self.resolve_stmt(stmt);
                }
            }
            Stmt::Echo(values) => {
                for value in values {
                    self.resolve_expr(value);
                }
            }
            Stmt::Break | Stmt::Continue => {}
        }
    }

    fn resolve_params(&self, params: &mut [Param]) {
        for param in params {
            if let Some(hint) = &mut param.type_hint {
                self.resolve_type_hint(hint);
            }
            if let Some(default) = &mut param.default {
                self.resolve_expr(default);
            }
        }
    }

    fn resolve_type_hint(&self, hint: &mut TypeHint) {
        match hint {
            TypeHint::Name(name) => {
                if name.is_simple() && is_builtin_type(name.first()) {
                    if is_self_segment(name.first()) {
                        self.substitute_self(name);
                        self.prefix_namespace(name);
                    }
                    return;
                }
                self.resolve_name(name, NamePos::Class);
            }
            TypeHint::Nullable(inner) => self.resolve_type_hint(inner),
            TypeHint::Union(members) => {
                for member in members {
                    self.resolve_type_hint(member);
                }
            }
        }
    }

    /// The ordered resolution rules. The first matching rule wins.
    fn resolve_name(&self, name: &mut Name, pos: NamePos) {
        if name.fully_qualified {
            return;
        }

        // Rule 1: import table, by alias or trailing path segment. The
        // matched leading segment is replaced with the entry's full path;
        // any remaining segments of the reference are kept.
        if let Some(full) = self.ctx.import_for(name.first()) {
            let rest: Vec<String> = name.segments.iter().skip(1).cloned().collect();
            name.segments = full.segments.clone();
            name.segments.extend(rest);
            name.fully_qualified = true;
            return;
        }

        // Rule 2: known global constant in constant-fetch position. The
        // true/false/null literal keywords are excluded case-insensitively.
        if pos == NamePos::Const
            && name.is_simple()
            && !is_literal_keyword(name.first())
            && (self.ctx.declares_constant(name.first())
                || BUILTIN_CONSTANTS.contains(&name.first()))
        {
            name.fully_qualified = true;
            return;
        }

        // Rule 3: known global or file-level function in call position.
        if pos == NamePos::Func
            && name.is_simple()
            && (self.ctx.declares_function(name.first())
                || BUILTIN_FUNCTIONS.contains(&name.first().to_ascii_lowercase().as_str()))
        {
            name.fully_qualified = true;
            return;
        }

        // Rule 4: self-reference keywords. `self`/`static` substitute the
        // enclosing class's simple name and fall through to the namespace
        // rule; `parent` splices the spelled extends-name and restarts the
        // chain, since that name may itself be imported.
        if name.segments.iter().any(|s| is_self_segment(s)) {
            if self.class.is_some() {
                self.substitute_self(name);
                self.prefix_namespace(name);
            }
            // Outside a class the keyword has no referent; leave it spelled.
            return;
        }
        if let Some(position) = name
            .segments
            .iter()
            .position(|s| s.eq_ignore_ascii_case("parent"))
        {
            if let Some(parent) = self.class.as_ref().and_then(|c| c.parent.clone()) {
                let spelled = Name::from_path(&parent);
                name.segments.remove(position);
                for (offset, segment) in spelled.segments.iter().enumerate() {
                    name.segments.insert(position + offset, segment.clone());
                }
                name.fully_qualified = spelled.fully_qualified;
                self.resolve_name(name, pos);
            }
            return;
        }

        // Rules 5 and 6: namespace prefix, else already root-level.
        self.prefix_namespace(name);
    }

    fn substitute_self(&self, name: &mut Name) {
        let Some(class) = &self.class else {
            return;
        };
        for segment in name.segments.iter_mut() {
            if is_self_segment(segment) {
                *segment = class.name.clone();
            }
        }
    }

    fn prefix_namespace(&self, name: &mut Name) {
        if name.fully_qualified {
            return;
        }
        if let Some(ns) = self.ctx.namespace() {
            let mut segments = ns.segments.clone();
            segments.extend(name.segments.iter().cloned());
            name.segments = segments;
        }
        name.fully_qualified = true;
    }

    fn qualified_enclosing_class(&self) -> Option<Name> {
        let class = self.class.as_ref()?;
        let mut name = Name::new([class.name.clone()]);
        self.prefix_namespace(&mut name);
        Some(name)
    }
}

fn is_self_segment(segment: &str) -> bool {
    segment.eq_ignore_ascii_case("self") || segment.eq_ignore_ascii_case("static")
}

fn is_literal_keyword(segment: &str) -> bool {
    segment.eq_ignore_ascii_case("true")
        || segment.eq_ignore_ascii_case("false")
        || segment.eq_ignore_ascii_case("null")
}

fn is_builtin_type(segment: &str) -> bool {
    BUILTIN_TYPES
        .iter()
        .any(|t| segment.eq_ignore_ascii_case(t))
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::NameResolver;
    use crate::php::ast::Expr;
    use crate::php::context::FileContext;
    use crate::php::finder::NodeFinder;
    use crate::php::parser::parse_source;
    use crate::php::printer::print_expr;

    fn resolve_at(src: &str, line: usize) -> String {
        let program = parse_source(src).expect("parse");
        let ctx = FileContext::build(&program);
        let found = NodeFinder::new()
            .find_closure(&program, line)
            .expect("closure");
        let mut expr = found.expr;
        NameResolver::new(&ctx, Path::new("/tmp/src.php"), &found.trail).resolve(&mut expr);
        print_expr(&expr)
    }

    #[test]
    fn import_alias_resolves_with_trailing_segments() {
        let src = "<?php\nuse Vendor\\Foo;\n$f = fn() => Foo\\Bar::make();\n";
        let code = resolve_at(src, 3);
        assert!(code.contains("\\Vendor\\Foo\\Bar::make()"), "{code}");
    }

    #[test]
    fn known_function_and_constant_qualify_to_root() {
        let src = "<?php\nnamespace App;\n$f = fn($s) => strlen($s) . PHP_EOL;\n";
        let code = resolve_at(src, 3);
        assert!(code.contains("\\strlen($s)"), "{code}");
        assert!(code.contains("\\PHP_EOL"), "{code}");
    }

    #[test]
    fn literal_keywords_stay_bare() {
        let src = "<?php\nnamespace App;\n$f = fn() => true ? null : false;\n";
        let code = resolve_at(src, 3);
        assert!(!code.contains("\\true"), "{code}");
        assert!(!code.contains("\\null"), "{code}");
    }

    #[test]
    fn unknown_name_gets_namespace_prefix() {
        let src = "<?php\nnamespace App\\Jobs;\n$f = fn() => new Mailer();\n";
        let code = resolve_at(src, 3);
        assert!(code.contains("new \\App\\Jobs\\Mailer()"), "{code}");
    }

    #[test]
    fn self_resolves_through_enclosing_class() {
        let src = "<?php\nnamespace App;\nclass Greeter {\n    public function make() {\n        return function () {\n            return self::NAME;\n        };\n    }\n}\n";
        let code = resolve_at(src, 5);
        assert!(code.contains("\\App\\Greeter::NAME"), "{code}");
    }

    #[test]
    fn parent_resolves_through_import() {
        let src = "<?php\nnamespace App;\nuse Vendor\\Base;\nclass Child extends Base {\n    public function make() {\n        return fn() => parent::ping();\n    }\n}\n";
        let code = resolve_at(src, 6);
        assert!(code.contains("\\Vendor\\Base::ping()"), "{code}");
    }

    #[test]
    fn magic_constants_substitute_literally() {
        let src = "<?php\nnamespace App;\nclass W {\n    public function f() {\n        return fn() => [__FILE__, __DIR__, __CLASS__];\n    }\n}\n";
        let code = resolve_at(src, 5);
        assert!(code.contains("'/tmp/src.php'"), "{code}");
        assert!(code.contains("'/tmp'"), "{code}");
        assert!(code.contains("\\App\\W::class"), "{code}");
    }

    #[test]
    fn already_qualified_names_are_untouched() {
        let src = "<?php\nnamespace App;\n$f = fn() => \\Other\\Thing::go();\n";
        let code = resolve_at(src, 3);
        assert!(code.contains("\\Other\\Thing::go()"), "{code}");
        assert!(!code.contains("App\\Other"), "{code}");
    }

    #[test]
    fn class_typed_parameter_hint_is_qualified() {
        let src = "<?php\nnamespace App;\nuse Vendor\\Request;\n$f = function (Request $r, int $n) {\n    return $n;\n};\n";
        let code = resolve_at(src, 4);
        assert!(code.contains("\\Vendor\\Request $r"), "{code}");
        assert!(code.contains("int $n"), "{code}");
        assert!(!code.contains("\\int"), "{code}");
    }
}
