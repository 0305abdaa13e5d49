//! swc-based extraction for JavaScript and TypeScript sources.

use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Result, anyhow};
use swc_common::{FileName, GLOBALS, Globals, SourceMap};
use swc_ecma_ast::{BinaryOp, CallExpr, Callee, Expr, Lit, MemberProp, Tpl};
use swc_ecma_parser::{Parser, StringInput, Syntax, TsSyntax};
use swc_ecma_visit::{Visit, VisitWith};

use crate::core::scan::{KeyArgument, KeyExtractor, RawReference, UnresolvedReason};

/// Finds calls to the configured translation functions in JS/TS modules.
pub struct ScriptExtractor {
    functions: HashSet<String>,
}

impl ScriptExtractor {
    pub fn new(functions: &[String]) -> Self {
        Self {
            functions: functions.iter().cloned().collect(),
        }
    }
}

impl KeyExtractor for ScriptExtractor {
    fn extract(&self, path: &str, source: &str) -> Result<Vec<RawReference>> {
        let source_map: Arc<SourceMap> = Arc::default();

        GLOBALS.set(&Globals::new(), || {
            let source_file =
                source_map.new_source_file(FileName::Real(path.into()).into(), source.to_string());

            let mut parser = Parser::new(syntax_for(path), StringInput::from(&*source_file), None);
            let module = parser
                .parse_module()
                .map_err(|e| anyhow!("failed to parse: {:?}", e))?;

            let mut visitor = CallVisitor {
                functions: &self.functions,
                source_map: &source_map,
                references: Vec::new(),
            };
            module.visit_with(&mut visitor);
            Ok(visitor.references)
        })
    }
}

/// `.ts` files are parsed without JSX so `<T>value` assertions keep working.
fn syntax_for(path: &str) -> Syntax {
    let ext = Path::new(path)
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or_default();
    Syntax::Typescript(TsSyntax {
        tsx: !matches!(ext, "ts" | "mts" | "cts"),
        decorators: true,
        ..Default::default()
    })
}

struct CallVisitor<'a> {
    functions: &'a HashSet<String>,
    source_map: &'a SourceMap,
    references: Vec<RawReference>,
}

impl CallVisitor<'_> {
    fn is_translation_call(&self, callee: &Expr) -> bool {
        let Some(name) = callee_name(callee) else {
            return false;
        };
        if self.functions.contains(&name) {
            return true;
        }
        // `this.$t(...)` inside components counts as `$t(...)`.
        name.strip_prefix("this.")
            .is_some_and(|method| self.functions.contains(method))
    }
}

impl Visit for CallVisitor<'_> {
    fn visit_call_expr(&mut self, node: &CallExpr) {
        if let Callee::Expr(callee) = &node.callee
            && self.is_translation_call(callee)
        {
            let loc = self.source_map.lookup_char_pos(node.span.lo);
            let argument = match node.args.first() {
                None => KeyArgument::dynamic(UnresolvedReason::MissingArgument, None),
                Some(arg) if arg.spread.is_some() => {
                    KeyArgument::dynamic(UnresolvedReason::Expression, None)
                }
                Some(arg) => classify_argument(&arg.expr),
            };
            self.references.push(RawReference {
                line: loc.line,
                col: loc.col_display + 1,
                argument,
            });
        }

        node.visit_children_with(self);
    }
}

/// Dotted name of a callee: `t`, `i18n.t`, `this.$t`.
fn callee_name(expr: &Expr) -> Option<String> {
    match expr {
        Expr::Ident(ident) => Some(ident.sym.to_string()),
        Expr::This(_) => Some("this".to_string()),
        Expr::Member(member) => match &member.prop {
            MemberProp::Ident(prop) => {
                callee_name(&member.obj).map(|obj| format!("{}.{}", obj, prop.sym))
            }
            _ => None,
        },
        Expr::Paren(paren) => callee_name(&paren.expr),
        _ => None,
    }
}

fn classify_argument(expr: &Expr) -> KeyArgument {
    match expr {
        Expr::Lit(Lit::Str(s)) => match s.value.as_str() {
            Some(value) => KeyArgument::Literal(value.to_string()),
            None => KeyArgument::dynamic(UnresolvedReason::Expression, None),
        },
        Expr::Tpl(tpl) if tpl.exprs.is_empty() => match first_quasi(tpl) {
            Some(value) => KeyArgument::Literal(value),
            None => KeyArgument::dynamic(UnresolvedReason::Expression, None),
        },
        Expr::Tpl(tpl) => KeyArgument::dynamic(UnresolvedReason::TemplateWithExpr, first_quasi(tpl)),
        Expr::Bin(bin) if bin.op == BinaryOp::Add => {
            KeyArgument::dynamic(UnresolvedReason::Concatenation, leading_literal(&bin.left))
        }
        Expr::Paren(paren) => classify_argument(&paren.expr),
        Expr::TsAs(ts) => classify_argument(&ts.expr),
        Expr::TsConstAssertion(ts) => classify_argument(&ts.expr),
        Expr::TsSatisfies(ts) => classify_argument(&ts.expr),
        Expr::Ident(_) | Expr::Member(_) => KeyArgument::dynamic(UnresolvedReason::Variable, None),
        _ => KeyArgument::dynamic(UnresolvedReason::Expression, None),
    }
}

fn first_quasi(tpl: &Tpl) -> Option<String> {
    tpl.quasis
        .first()
        .and_then(|q| q.cooked.as_ref())
        .and_then(|s| s.as_str())
        .map(|s| s.to_string())
}

/// Static text at the start of a `+` chain (`"errors." + a + b` → `errors.`).
fn leading_literal(expr: &Expr) -> Option<String> {
    match expr {
        Expr::Lit(Lit::Str(s)) => s.value.as_str().map(|s| s.to_string()),
        Expr::Tpl(tpl) => first_quasi(tpl),
        Expr::Bin(bin) if bin.op == BinaryOp::Add => leading_literal(&bin.left),
        Expr::Paren(paren) => leading_literal(&paren.expr),
        _ => None,
    }
}
