//! Locates a function-literal node by its recorded start line.

use smallvec::SmallVec;

use super::ast::{ClassMember, Expr, Item, Program, Stmt};

/// One step on the path from the program root down to a located node.
/// The resolver walks this upward to find the nearest enclosing class.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Ancestor {
    Class {
        name: String,
        /// Source-spelled `extends` name, kept for `parent::` resolution.
        parent: Option<String>,
    },
    Method { name: String, is_static: bool },
    Function { name: String },
    Closure,
    ArrowFn,
}

/// A located function literal together with the ancestor trail that led to
/// it. The trail is rebuilt per search and never outlives it.
#[derive(Debug, Clone)]
pub struct FoundClosure {
    pub expr: Expr,
    pub trail: Vec<Ancestor>,
}

type Trail = SmallVec<[Ancestor; 8]>;

/// Stateless locator for closure and arrow-function nodes. Safe to reuse
/// across searches and cheap to recreate.
#[derive(Debug, Default, Clone, Copy)]
pub struct NodeFinder;

impl NodeFinder {
    pub fn new() -> Self {
        Self
    }

    /// Pre-order depth-first search for the first closure or arrow function
    /// whose start line equals `line`. When several literals share a start
    /// line (nested literals on one line), the first in traversal order wins;
    /// there is no further tie-break.
    pub fn find_closure(&self, program: &Program, line: usize) -> Option<FoundClosure> {
        let mut trail = Trail::new();
        self.find_in_items(&program.items, line, &mut trail)
    }

    fn find_in_items(
        &self,
        items: &[Item],
        line: usize,
        trail: &mut Trail,
    ) -> Option<FoundClosure> {
        for item in items {
            let found = match item {
                Item::Function(func) => {
                    trail.push(Ancestor::Function {
                        name: func.name.clone(),
                    });
                    let found = self.find_in_stmts(&func.body, line, trail);
                    trail.pop();
                    found
                }
                Item::Class(class) => {
                    trail.push(Ancestor::Class {
                        name: class.name.clone(),
                        parent: class.parent.as_ref().map(|p| p.to_string()),
                    });
                    let found = self.find_in_class(&class.members, line, trail);
                    trail.pop();
                    found
                }
                Item::Const(decl) => self.find_in_expr(&decl.value, line, trail),
                Item::Stmt(stmt) => self.find_in_stmt(stmt, line, trail),
                Item::Namespace(_) | Item::Use(_) => None,
            };
            if found.is_some() {
                return found;
            }
        }
        None
    }

    fn find_in_class(
        &self,
        members: &[ClassMember],
        line: usize,
        trail: &mut Trail,
    ) -> Option<FoundClosure> {
        for member in members {
            let found = match member {
                ClassMember::Const(decl) => self.find_in_expr(&decl.value, line, trail),
                ClassMember::Property(prop) => prop
                    .default
                    .as_ref()
                    .and_then(|default| self.find_in_expr(default, line, trail)),
                ClassMember::Method(method) => {
                    trail.push(Ancestor::Method {
                        name: method.name.clone(),
                        is_static: method.is_static,
                    });
                    let found = self.find_in_stmts(&method.body, line, trail);
                    trail.pop();
                    found
                }
            };
            if found.is_some() {
                return found;
            }
        }
        None
    }

    fn find_in_stmts(
        &self,
        stmts: &[Stmt],
        line: usize,
        trail: &mut Trail,
    ) -> Option<FoundClosure> {
        stmts
            .iter()
            .find_map(|stmt| self.find_in_stmt(stmt, line, trail))
    }

    fn find_in_stmt(&self, stmt: &Stmt, line: usize, trail: &mut Trail) -> Option<FoundClosure> {
        match stmt {
            Stmt::Expr(expr) => self.find_in_expr(expr, line, trail),
            Stmt::Return(value) => value
                .as_ref()
                .and_then(|expr| self.find_in_expr(expr, line, trail)),
            Stmt::If {
                cond,
                then,
                elseifs,
                otherwise,
            } => self
                .find_in_expr(cond, line, trail)
                .or_else(|| self.find_in_stmts(then, line, trail))
                .or_else(|| {
                    elseifs.iter().find_map(|(cond, body)| {
                        self.find_in_expr(cond, line, trail)
                            .or_else(|| self.find_in_stmts(body, line, trail))
                    })
                })
                .or_else(|| {
                    otherwise
                        .as_ref()
                        .and_then(|body| self.find_in_stmts(body, line, trail))
                }),
            Stmt::While { cond, body } => self
                .find_in_expr(cond, line, trail)
                .or_else(|| self.find_in_stmts(body, line, trail)),
            Stmt::Foreach { subject, body, .. } => self
                .find_in_expr(subject, line, trail)
                .or_else(|| self.find_in_stmts(body, line, trail)),
            Stmt::Echo(values) => values
                .iter()
                .find_map(|expr| self.find_in_expr(expr, line, trail)),
            Stmt::Break | Stmt::Continue => None,
        }
    }

    fn find_in_expr(&self, expr: &Expr, line: usize, trail: &mut Trail) -> Option<FoundClosure> {
        match expr {
            Expr::Closure(closure) => {
                if closure.line == line {
                    return Some(FoundClosure {
                        expr: expr.clone(),
                        trail: trail.to_vec(),
                    });
                }
                trail.push(Ancestor::Closure);
                let found = closure
                    .params
                    .iter()
                    .filter_map(|p| p.default.as_ref())
                    .find_map(|default| self.find_in_expr(default, line, trail))
                    .or_else(|| self.find_in_stmts(&closure.body, line, trail));
                trail.pop();
                found
            }
            Expr::ArrowFn(arrow) => {
                if arrow.line == line {
                    return Some(FoundClosure {
                        expr: expr.clone(),
                        trail: trail.to_vec(),
                    });
                }
                trail.push(Ancestor::ArrowFn);
                let found = self.find_in_expr(&arrow.body, line, trail);
                trail.pop();
                found
            }
            Expr::Call { args, callee } => {
                let in_callee = match callee {
                    super::ast::CallTarget::Expr(inner) => self.find_in_expr(inner, line, trail),
                    super::ast::CallTarget::Name(_) => None,
                };
                in_callee.or_else(|| {
                    args.iter()
                        .find_map(|arg| self.find_in_expr(arg, line, trail))
                })
            }
            Expr::MethodCall { object, args, .. } => {
                self.find_in_expr(object, line, trail).or_else(|| {
                    args.iter()
                        .find_map(|arg| self.find_in_expr(arg, line, trail))
                })
            }
            Expr::StaticCall { args, .. } | Expr::New { args, .. } => args
                .iter()
                .find_map(|arg| self.find_in_expr(arg, line, trail)),
            Expr::PropFetch { object, .. } => self.find_in_expr(object, line, trail),
            Expr::Index { base, index } => self.find_in_expr(base, line, trail).or_else(|| {
                index
                    .as_ref()
                    .and_then(|idx| self.find_in_expr(idx, line, trail))
            }),
            Expr::ArrayLit(entries) => entries.iter().find_map(|entry| {
                entry
                    .key
                    .as_ref()
                    .and_then(|key| self.find_in_expr(key, line, trail))
                    .or_else(|| self.find_in_expr(&entry.value, line, trail))
            }),
            Expr::Assign { target, value, .. } => self
                .find_in_expr(target, line, trail)
                .or_else(|| self.find_in_expr(value, line, trail)),
            Expr::Binary { lhs, rhs, .. } => self
                .find_in_expr(lhs, line, trail)
                .or_else(|| self.find_in_expr(rhs, line, trail)),
            Expr::Unary { expr, .. } | Expr::Spread(expr) => self.find_in_expr(expr, line, trail),
            Expr::Ternary {
                cond,
                then,
                otherwise,
            } => self
                .find_in_expr(cond, line, trail)
                .or_else(|| {
                    then.as_ref()
                        .and_then(|expr| self.find_in_expr(expr, line, trail))
                })
                .or_else(|| self.find_in_expr(otherwise, line, trail)),
            Expr::Instanceof { expr, .. } => self.find_in_expr(expr, line, trail),
            Expr::Null
            | Expr::Bool(_)
            | Expr::Number(_)
            | Expr::Str(_)
            | Expr::MagicFile
            | Expr::MagicDir
            | Expr::MagicClass
            | Expr::Variable(_)
            | Expr::ConstFetch(_)
            | Expr::ClassConst { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Ancestor, NodeFinder};
    use crate::php::ast::Expr;
    use crate::php::parser::parse_source;

    #[test]
    fn finds_closure_by_start_line() {
        let src = "<?php\n$a = fn($x) => $x;\n$b = function ($y) {\n    return $y;\n};\n";
        let program = parse_source(src).expect("parse");
        let finder = NodeFinder::new();

        let arrow = finder.find_closure(&program, 2).expect("arrow on line 2");
        assert!(matches!(arrow.expr, Expr::ArrowFn(_)));

        let closure = finder.find_closure(&program, 3).expect("closure on line 3");
        assert!(matches!(closure.expr, Expr::Closure(_)));

        assert!(finder.find_closure(&program, 4).is_none());
    }

    #[test]
    fn trail_records_enclosing_class_and_method() {
        let src = "<?php\nclass Greeter {\n    public function make() {\n        return function () {\n            return self::NAME;\n        };\n    }\n}\n";
        let program = parse_source(src).expect("parse");
        let found = NodeFinder::new()
            .find_closure(&program, 4)
            .expect("closure in method");
        assert_eq!(
            found.trail,
            vec![
                Ancestor::Class {
                    name: "Greeter".to_string(),
                    parent: None
                },
                Ancestor::Method {
                    name: "make".to_string(),
                    is_static: false
                },
            ]
        );
    }

    #[test]
    fn first_match_wins_on_shared_line() {
        let src = "<?php $f = function () { return fn($x) => $x; };\n";
        let program = parse_source(src).expect("parse");
        let found = NodeFinder::new().find_closure(&program, 1).expect("found");
        assert!(
            matches!(found.expr, Expr::Closure(_)),
            "outer literal is first in pre-order"
        );
    }
}
