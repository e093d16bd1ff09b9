//! Renders resolved syntax nodes back to source text.
//!
//! Output is deterministic: four-space body indentation relative to the
//! expression's own first column, block closures multi-line, everything else
//! single-line. Mode-dependent layout (collapsing, nesting under a container)
//! is applied afterwards by the export layer, not here.

use super::ast::{
    ArrowFnExpr, BinOp, CallTarget, ClosureExpr, ClosureFlags, ClosureUse, Expr, Param, Stmt,
    TypeHint, UnOp,
};

const INDENT: &str = "    ";

/// Renders a single expression fragment. No trailing terminator.
pub fn print_expr(expr: &Expr) -> String {
    let mut printer = Printer::new();
    printer.expr(expr, 0);
    printer.out
}

struct Printer {
    out: String,
    level: usize,
}

// Binding strength, loosest first. Children printed at a position requiring
// more strength than they have get parenthesized.
const PREC_ASSIGN: u8 = 2;
const PREC_TERNARY: u8 = 3;
const PREC_COALESCE: u8 = 4;
const PREC_OR: u8 = 5;
const PREC_AND: u8 = 6;
const PREC_BIT_OR: u8 = 7;
const PREC_BIT_XOR: u8 = 8;
const PREC_BIT_AND: u8 = 9;
const PREC_EQUALITY: u8 = 10;
const PREC_RELATIONAL: u8 = 11;
const PREC_SHIFT: u8 = 12;
const PREC_ADDITIVE: u8 = 13;
const PREC_MULTIPLICATIVE: u8 = 14;
const PREC_INSTANCEOF: u8 = 15;
const PREC_UNARY: u8 = 16;
const PREC_POW: u8 = 17;
const PREC_POSTFIX: u8 = 18;

fn bin_prec(op: BinOp) -> u8 {
    match op {
        BinOp::Coalesce => PREC_COALESCE,
        BinOp::Or => PREC_OR,
        BinOp::And => PREC_AND,
        BinOp::BitOr => PREC_BIT_OR,
        BinOp::BitXor => PREC_BIT_XOR,
        BinOp::BitAnd => PREC_BIT_AND,
        BinOp::Eq | BinOp::Identical | BinOp::NotEq | BinOp::NotIdentical => PREC_EQUALITY,
        BinOp::Lt | BinOp::LtEq | BinOp::Gt | BinOp::GtEq => PREC_RELATIONAL,
        BinOp::Shl | BinOp::Shr => PREC_SHIFT,
        BinOp::Add | BinOp::Sub | BinOp::Concat => PREC_ADDITIVE,
        BinOp::Mul | BinOp::Div | BinOp::Mod => PREC_MULTIPLICATIVE,
        BinOp::Pow => PREC_POW,
    }
}

fn right_assoc(op: BinOp) -> bool {
    matches!(op, BinOp::Coalesce | BinOp::Pow)
}

fn expr_prec(expr: &Expr) -> u8 {
    match expr {
        Expr::Assign { .. } => PREC_ASSIGN,
        Expr::Ternary { .. } => PREC_TERNARY,
        Expr::Binary { op, .. } => bin_prec(*op),
        Expr::Instanceof { .. } => PREC_INSTANCEOF,
        Expr::Unary { .. } | Expr::Spread(_) => PREC_UNARY,
        // Literals and postfix chains never need parens.
        Expr::Closure(_) | Expr::ArrowFn(_) | Expr::New { .. } => PREC_ASSIGN,
        _ => PREC_POSTFIX,
    }
}

impl Printer {
    fn new() -> Self {
        Self {
            out: String::new(),
            level: 0,
        }
    }

    fn push(&mut self, text: &str) {
        self.out.push_str(text);
    }

    fn newline_indent(&mut self) {
        self.out.push('\n');
        for _ in 0..self.level {
            self.out.push_str(INDENT);
        }
    }

    /// Prints `expr`, parenthesizing when its own binding is looser than the
    /// position requires.
    fn expr(&mut self, expr: &Expr, min_prec: u8) {
        if expr_prec(expr) < min_prec {
            self.push("(");
            self.expr_inner(expr);
            self.push(")");
        } else {
            self.expr_inner(expr);
        }
    }

    fn expr_inner(&mut self, expr: &Expr) {
        match expr {
            Expr::Null => self.push("null"),
            Expr::Bool(true) => self.push("true"),
            Expr::Bool(false) => self.push("false"),
            Expr::Number(raw) => self.push(raw),
            Expr::Str(value) => self.push(&quote_string(value)),
            // Magic constants survive printing only when the resolver was
            // skipped; render them as spelled.
            Expr::MagicFile => self.push("__FILE__"),
            Expr::MagicDir => self.push("__DIR__"),
            Expr::MagicClass => self.push("__CLASS__"),
            Expr::Variable(name) => self.push(&format!("${name}")),
            Expr::ConstFetch(name) => self.push(&name.to_string()),
            Expr::ClassConst { class, constant } => {
                self.push(&format!("{class}::{constant}"));
            }
            Expr::Call { callee, args } => {
                match callee {
                    CallTarget::Name(name) => self.push(&name.to_string()),
                    CallTarget::Expr(inner) => self.expr(inner, PREC_POSTFIX),
                }
                self.args(args);
            }
            Expr::MethodCall {
                object,
                method,
                args,
            } => {
                self.expr(object, PREC_POSTFIX);
                self.push(&format!("->{method}"));
                self.args(args);
            }
            Expr::StaticCall {
                class,
                method,
                args,
            } => {
                self.push(&format!("{class}::{method}"));
                self.args(args);
            }
            Expr::New { class, args } => {
                self.push(&format!("new {class}"));
                self.args(args);
            }
            Expr::PropFetch { object, prop } => {
                self.expr(object, PREC_POSTFIX);
                self.push(&format!("->{prop}"));
            }
            Expr::Index { base, index } => {
                self.expr(base, PREC_POSTFIX);
                self.push("[");
                if let Some(index) = index {
                    self.expr(index, 0);
                }
                self.push("]");
            }
            Expr::ArrayLit(entries) => {
                self.push("[");
                for (i, entry) in entries.iter().enumerate() {
                    if i > 0 {
                        self.push(", ");
                    }
                    if let Some(key) = &entry.key {
                        self.expr(key, PREC_TERNARY);
                        self.push(" => ");
                    }
                    self.expr(&entry.value, PREC_TERNARY);
                }
                self.push("]");
            }
            Expr::Assign { target, op, value } => {
                self.expr(target, PREC_POSTFIX);
                match op {
                    Some(op) => self.push(&format!(" {}= ", op.symbol())),
                    None => self.push(" = "),
                }
                self.expr(value, PREC_ASSIGN);
            }
            Expr::Binary { op, lhs, rhs } => {
                let prec = bin_prec(*op);
                let (lmin, rmin) = if right_assoc(*op) {
                    (prec + 1, prec)
                } else {
                    (prec, prec + 1)
                };
                self.expr(lhs, lmin);
                self.push(&format!(" {} ", op.symbol()));
                self.expr(rhs, rmin);
            }
            Expr::Unary { op, expr } => {
                self.push(op.symbol());
                // `- -$x` must not collapse into a decrement.
                if matches!(
                    (op, expr.as_ref()),
                    (UnOp::Neg, Expr::Unary { op: UnOp::Neg, .. })
                        | (UnOp::Plus, Expr::Unary { op: UnOp::Plus, .. })
                ) {
                    self.push(" ");
                }
                self.expr(expr, PREC_UNARY);
            }
            Expr::Ternary {
                cond,
                then,
                otherwise,
            } => {
                self.expr(cond, PREC_TERNARY + 1);
                match then {
                    Some(then) => {
                        self.push(" ? ");
                        self.expr(then, PREC_TERNARY + 1);
                        self.push(" : ");
                    }
                    None => self.push(" ?: "),
                }
                self.expr(otherwise, PREC_TERNARY);
            }
            Expr::Instanceof { expr, class } => {
                self.expr(expr, PREC_INSTANCEOF);
                self.push(&format!(" instanceof {class}"));
            }
            Expr::Spread(inner) => {
                self.push("...");
                self.expr(inner, PREC_UNARY);
            }
            Expr::Closure(closure) => self.closure(closure),
            Expr::ArrowFn(arrow) => self.arrow_fn(arrow),
        }
    }

    fn args(&mut self, args: &[Expr]) {
        self.push("(");
        for (i, arg) in args.iter().enumerate() {
            if i > 0 {
                self.push(", ");
            }
            self.expr(arg, PREC_TERNARY);
        }
        self.push(")");
    }

    fn closure(&mut self, closure: &ClosureExpr) {
        if closure.flags.contains(ClosureFlags::STATIC) {
            self.push("static ");
        }
        self.push("function ");
        if closure.flags.contains(ClosureFlags::BY_REF) {
            self.push("&");
        }
        self.params(&closure.params);
        if !closure.uses.is_empty() {
            self.push(" use (");
            for (i, ClosureUse { name, by_ref }) in closure.uses.iter().enumerate() {
                if i > 0 {
                    self.push(", ");
                }
                if *by_ref {
                    self.push("&");
                }
                self.push(&format!("${name}"));
            }
            self.push(")");
        }
        if let Some(hint) = &closure.return_type {
            self.push(": ");
            self.type_hint(hint);
        }
        self.push(" {");
        self.level += 1;
        for stmt in &closure.body {
            self.newline_indent();
            self.stmt(stmt);
        }
        self.level -= 1;
        self.newline_indent();
        self.push("}");
    }

    fn arrow_fn(&mut self, arrow: &ArrowFnExpr) {
        if arrow.flags.contains(ClosureFlags::STATIC) {
            self.push("static ");
        }
        self.push("fn");
        if arrow.flags.contains(ClosureFlags::BY_REF) {
            self.push("&");
        }
        self.params(&arrow.params);
        if let Some(hint) = &arrow.return_type {
            self.push(": ");
            self.type_hint(hint);
        }
        self.push(" => ");
        self.expr(&arrow.body, PREC_ASSIGN);
    }

    fn params(&mut self, params: &[Param]) {
        self.push("(");
        for (i, param) in params.iter().enumerate() {
            if i > 0 {
                self.push(", ");
            }
            if let Some(hint) = &param.type_hint {
                self.type_hint(hint);
                self.push(" ");
            }
            if param.by_ref {
                self.push("&");
            }
            if param.variadic {
                self.push("...");
            }
            self.push(&format!("${}", param.name));
            if let Some(default) = &param.default {
                self.push(" = ");
                self.expr(default, PREC_TERNARY);
            }
        }
        self.push(")");
    }

    fn type_hint(&mut self, hint: &TypeHint) {
        match hint {
            TypeHint::Name(name) => self.push(&name.to_string()),
            TypeHint::Nullable(inner) => {
                self.push("?");
                self.type_hint(inner);
            }
            TypeHint::Union(members) => {
                for (i, member) in members.iter().enumerate() {
                    if i > 0 {
                        self.push("|");
                    }
                    self.type_hint(member);
                }
            }
        }
    }

    fn stmt(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::Expr(expr) => {
                self.expr(expr, 0);
                self.push(";");
            }
            Stmt::Return(None) => self.push("return;"),
            Stmt::Return(Some(value)) => {
                self.push("return ");
                self.expr(value, 0);
                self.push(";");
            }
            Stmt::If {
                cond,
                then,
                elseifs,
                otherwise,
            } => {
                self.push("if (");
                self.expr(cond, 0);
                self.push(") {");
                self.block(then);
                self.push("}");
                for (cond, body) in elseifs {
                    self.push(" elseif (");
                    self.expr(cond, 0);
                    self.push(") {");
                    self.block(body);
                    self.push("}");
                }
                if let Some(body) = otherwise {
                    self.push(" else {");
                    self.block(body);
                    self.push("}");
                }
            }
            Stmt::While { cond, body } => {
                self.push("while (");
                self.expr(cond, 0);
                self.push(") {");
                self.block(body);
                self.push("}");
            }
            Stmt::Foreach {
                subject,
                key_var,
                by_ref,
                value_var,
                body,
            } => {
                self.push("foreach (");
                self.expr(subject, 0);
                self.push(" as ");
                if let Some(key) = key_var {
                    self.push(&format!("${key} => "));
                }
                if *by_ref {
                    self.push("&");
                }
                self.push(&format!("${value_var}"));
                self.push(") {");
                self.block(body);
                self.push("}");
            }
            Stmt::Echo(values) => {
                self.push("echo ");
                for (i, value) in values.iter().enumerate() {
                    if i > 0 {
                        self.push(", ");
                    }
                    self.expr(value, 0);
                }
                self.push(";");
            }
            Stmt::Break => self.push("break;"),
            Stmt::Continue => self.push("continue;"),
        }
    }

    fn block(&mut self, stmts: &[Stmt]) {
        self.level += 1;
        for stmt in stmts {
            self.newline_indent();
            self.stmt(stmt);
        }
        self.level -= 1;
        self.newline_indent();
    }
}

/// Renders a string value as a source literal. Strings holding whitespace
/// control characters go out double-quoted with escape sequences, keeping the
/// rendered line free of raw newlines and tabs; everything else stays
/// single-quoted.
pub(crate) fn quote_string(value: &str) -> String {
    if !value.contains(['\n', '\t', '\r']) {
        return format!("'{}'", escape_single_quoted(value));
    }
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for ch in value.chars() {
        match ch {
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            // Bare '$' would read as interpolation when re-parsed.
            '$' => out.push_str("\\$"),
            other => out.push(other),
        }
    }
    out.push('"');
    out
}

fn escape_single_quoted(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '\'' => out.push_str("\\'"),
            '\\' => out.push_str("\\\\"),
            other => out.push(other),
        }
    }
    out
}
