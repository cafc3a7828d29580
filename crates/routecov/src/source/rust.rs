//! Rust route builder sources
//!
//! Uses `syn` to locate `fn configure` entry methods and flatten their method
//! chains into [`CallNode`]s. A chain `r.from("a").route_id("x").to("b")` is
//! nested receiver-first in the AST, so it is discovered from its last call
//! backward and reversed into program order here.
//!
//! DSL method names are snake_case in Rust and are normalised to the
//! lowerCamelCase step keywords (`route_id` → `routeId`, `r#loop` → `loop`).

use super::{CallArg, CallNode, EntryMethod, SourceUnit, ENTRY_METHOD, FROM};
use crate::result::{RouteCoverageError, RouteCoverageResult};
use std::path::Path;
use syn::spanned::Spanned;
use syn::visit::{self, Visit};
use syn::{Block, Expr, ImplItemFn, ItemFn, ItemImpl, ItemMod, Lit, Stmt, Type};

/// Parsed Rust source file
#[derive(Debug, Clone)]
pub struct RustSourceUnit {
    file: String,
    primary: Option<EntryMethod>,
    nested: Vec<EntryMethod>,
}

impl RustSourceUnit {
    /// Parse source text; `file` is used for attribution and error messages
    pub fn parse(source: &str, file: &str) -> RouteCoverageResult<Self> {
        let syntax =
            syn::parse_file(source).map_err(|e| RouteCoverageError::source(file, e.to_string()))?;

        let mut collector = EntryMethodCollector::default();
        collector.visit_file(&syntax);

        Ok(Self {
            file: file.to_string(),
            primary: collector.primary,
            nested: collector.nested,
        })
    }

    /// Read and parse a file
    pub fn from_path(path: &Path, file: &str) -> RouteCoverageResult<Self> {
        let source = std::fs::read_to_string(path)?;
        Self::parse(&source, file)
    }
}

impl SourceUnit for RustSourceUnit {
    fn file_name(&self) -> &str {
        &self.file
    }

    fn find_entry_method(&self, name: &str) -> Option<&EntryMethod> {
        self.primary.as_ref().filter(|m| m.name == name)
    }

    fn find_nested_entry_methods(&self, name: &str) -> Vec<&EntryMethod> {
        self.nested.iter().filter(|m| m.name == name).collect()
    }
}

/// Collects `fn configure` methods of impl blocks.
///
/// The first file-level one that starts a route with `from(...)` is the
/// primary entry method; every other one (file-level impls without a route,
/// later file-level impls, impls inside modules or function bodies) is a
/// nested entry method.
#[derive(Debug, Default)]
struct EntryMethodCollector {
    depth: usize,
    owners: Vec<String>,
    primary: Option<EntryMethod>,
    nested: Vec<EntryMethod>,
}

impl<'ast> Visit<'ast> for EntryMethodCollector {
    fn visit_item_mod(&mut self, node: &'ast ItemMod) {
        self.depth += 1;
        visit::visit_item_mod(self, node);
        self.depth -= 1;
    }

    fn visit_item_fn(&mut self, node: &'ast ItemFn) {
        self.depth += 1;
        visit::visit_item_fn(self, node);
        self.depth -= 1;
    }

    fn visit_item_impl(&mut self, node: &'ast ItemImpl) {
        self.owners.push(type_name(&node.self_ty));
        visit::visit_item_impl(self, node);
        self.owners.pop();
    }

    fn visit_impl_item_fn(&mut self, node: &'ast ImplItemFn) {
        if node.sig.ident == ENTRY_METHOD {
            let span = node.span();
            let method = EntryMethod {
                owner: self.owners.last().cloned().unwrap_or_default(),
                name: ENTRY_METHOD.to_string(),
                line_start: Some(span.start().line),
                line_end: Some(span.end().line),
                statements: block_chains(&node.block),
            };
            let declares_route = method
                .statements
                .iter()
                .any(|calls| calls.first().is_some_and(|c| c.name == FROM));
            if self.depth == 0 && self.primary.is_none() && declares_route {
                self.primary = Some(method);
            } else {
                self.nested.push(method);
            }
        }
        self.depth += 1;
        visit::visit_impl_item_fn(self, node);
        self.depth -= 1;
    }
}

fn type_name(ty: &Type) -> String {
    match ty {
        Type::Path(path) => path
            .path
            .segments
            .last()
            .map(|s| s.ident.to_string())
            .unwrap_or_default(),
        Type::Reference(reference) => type_name(&reference.elem),
        _ => String::new(),
    }
}

/// Call chains of every expression statement in a block
fn block_chains(block: &Block) -> Vec<Vec<CallNode>> {
    block
        .stmts
        .iter()
        .filter_map(|stmt| match stmt {
            Stmt::Expr(expr, _) => Some(flatten_chain(expr)),
            Stmt::Local(local) => local.init.as_ref().map(|init| flatten_chain(&init.expr)),
            _ => None,
        })
        .filter(|chain| !chain.is_empty())
        .collect()
}

/// Flatten `a.b(..).c(..)` into `[b, c]` (plus `a` when it is a call)
fn flatten_chain(expr: &Expr) -> Vec<CallNode> {
    let mut calls = Vec::new();
    let mut current = expr;
    loop {
        match current {
            Expr::MethodCall(method) => {
                let start = method.method.span().start().line;
                let end = method.span().end().line;
                calls.push(CallNode {
                    name: dsl_name(&method.method.to_string()),
                    line_start: Some(start),
                    line_end: Some(end.max(start)),
                    args: method.args.iter().map(call_arg).collect(),
                });
                current = &method.receiver;
            }
            Expr::Call(call) => {
                if let Expr::Path(path) = &*call.func {
                    if let Some(segment) = path.path.segments.last() {
                        let span = call.span();
                        calls.push(CallNode {
                            name: dsl_name(&segment.ident.to_string()),
                            line_start: Some(span.start().line),
                            line_end: Some(span.end().line),
                            args: call.args.iter().map(call_arg).collect(),
                        });
                    }
                }
                break;
            }
            Expr::Paren(paren) => current = &paren.expr,
            Expr::Try(try_expr) => current = &try_expr.expr,
            Expr::Await(await_expr) => current = &await_expr.base,
            _ => break,
        }
    }
    calls.reverse();
    calls
}

fn call_arg(expr: &Expr) -> CallArg {
    match expr {
        Expr::Lit(lit) => match &lit.lit {
            Lit::Str(s) => CallArg::Literal(s.value()),
            Lit::Int(i) => CallArg::Literal(i.base10_digits().to_string()),
            Lit::Bool(b) => CallArg::Literal(b.value.to_string()),
            _ => CallArg::Expression,
        },
        Expr::Closure(closure) => CallArg::Block(closure_calls(&closure.body)),
        Expr::Reference(reference) => call_arg(&reference.expr),
        _ => CallArg::Expression,
    }
}

/// Calls of a closure body; statements of a block body are concatenated
fn closure_calls(body: &Expr) -> Vec<CallNode> {
    match body {
        Expr::Block(block) => block_chains(&block.block).into_iter().flatten().collect(),
        other => flatten_chain(other),
    }
}

/// `route_id` → `routeId`, `r#loop` → `loop`
fn dsl_name(ident: &str) -> String {
    let ident = ident.strip_prefix("r#").unwrap_or(ident);
    let mut name = String::with_capacity(ident.len());
    let mut upper = false;
    for c in ident.chars() {
        if c == '_' {
            upper = !name.is_empty();
        } else if upper {
            name.extend(c.to_uppercase());
            upper = false;
        } else {
            name.push(c);
        }
    }
    name
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::catalog::EipCatalog;
    use crate::source::{parse_route_builder, parse_route_builder_trees};

    const ORDER_ROUTES: &str = r#"
use routes::{Routes, RouteBuilder};

pub struct OrderRoutes;

impl RouteBuilder for OrderRoutes {
    fn configure(&self, r: &mut Routes) {
        r.from("direct:orders")
            .route_id("orders")
            .to("mock:a")
            .choice()
                .when(header("vip").is_equal_to(true))
                    .to("mock:b")
                .otherwise()
                    .to("mock:c");
    }
}
"#;

    fn names(tree: &crate::node::RouteTree) -> Vec<(usize, String)> {
        tree.pre_order()
            .map(|(id, depth)| (depth, tree.node(id).name.clone()))
            .collect()
    }

    #[test]
    fn test_dsl_name_conversion() {
        assert_eq!(dsl_name("route_id"), "routeId");
        assert_eq!(dsl_name("to_d"), "toD");
        assert_eq!(dsl_name("do_try"), "doTry");
        assert_eq!(dsl_name("r#loop"), "loop");
        assert_eq!(dsl_name("to"), "to");
        assert_eq!(dsl_name("_private"), "private");
    }

    #[test]
    fn test_primary_configure_method() {
        let unit = RustSourceUnit::parse(ORDER_ROUTES, "src/order_routes.rs").unwrap();
        let method = unit.find_entry_method(ENTRY_METHOD).unwrap();
        assert_eq!(method.owner, "OrderRoutes");
        assert_eq!(method.statements.len(), 1);
        let chain: Vec<&str> = method.statements[0].iter().map(|c| c.name.as_str()).collect();
        assert_eq!(
            chain,
            ["from", "routeId", "to", "choice", "when", "to", "otherwise", "to"]
        );
        assert_eq!(method.statements[0][0].first_literal(), Some("direct:orders"));
        assert_eq!(method.statements[0][4].args, vec![CallArg::Expression]);
    }

    #[test]
    fn test_builds_choice_tree_from_rust_source() {
        let unit = RustSourceUnit::parse(ORDER_ROUTES, "src/order_routes.rs").unwrap();
        let tree = parse_route_builder(&unit, false, &EipCatalog::builtin())
            .unwrap()
            .unwrap();
        assert_eq!(tree.route_id(), Some("orders"));
        let expected: Vec<(usize, String)> = [
            (0, "from"),
            (1, "to"),
            (1, "choice"),
            (2, "when"),
            (3, "to"),
            (2, "otherwise"),
            (3, "to"),
        ]
        .iter()
        .map(|(d, n)| (*d, (*n).to_string()))
        .collect();
        assert_eq!(names(&tree), expected);
        assert!(tree.verify_order().is_ok());
    }

    #[test]
    fn test_line_numbers_follow_source() {
        let unit = RustSourceUnit::parse(ORDER_ROUTES, "src/order_routes.rs").unwrap();
        let chain = &unit.find_entry_method(ENTRY_METHOD).unwrap().statements[0];
        assert_eq!(chain[0].line_start, Some(8));
        assert_eq!(chain[2].line_start, Some(10));
        assert_eq!(chain[7].line_start, Some(15));
    }

    #[test]
    fn test_closure_arguments_become_blocks() {
        let source = r#"
impl RouteBuilder for Split {
    fn configure(&self, r: &mut Routes) {
        r.from("direct:in")
            .route_id("split")
            .split(body(), |s| s.to("mock:item").log("item"))
            .to("mock:done");
    }
}
"#;
        let unit = RustSourceUnit::parse(source, "split.rs").unwrap();
        let tree = parse_route_builder(&unit, false, &EipCatalog::builtin())
            .unwrap()
            .unwrap();
        let expected: Vec<(usize, String)> = [
            (0, "from"),
            (1, "split"),
            (2, "to"),
            (2, "log"),
            (1, "to"),
        ]
        .iter()
        .map(|(d, n)| (*d, (*n).to_string()))
        .collect();
        assert_eq!(names(&tree), expected);
    }

    #[test]
    fn test_nested_route_builders() {
        let source = r#"
struct Outer;

impl RouteBuilder for Outer {
    fn configure(&self, r: &mut Routes) {
        r.from("direct:outer").route_id("outer").to("mock:o");
    }
}

mod inner {
    struct Inner;

    impl RouteBuilder for Inner {
        fn configure(&self, r: &mut Routes) {
            r.from("direct:inner").route_id("inner").log("hi");
        }
    }
}

fn make() -> impl RouteBuilder {
    struct Inline;
    impl RouteBuilder for Inline {
        fn configure(&self, r: &mut Routes) {
            r.from("direct:inline").to("mock:i");
        }
    }
    Inline
}
"#;
        let unit = RustSourceUnit::parse(source, "nested.rs").unwrap();
        assert_eq!(unit.find_entry_method(ENTRY_METHOD).unwrap().owner, "Outer");
        let nested = unit.find_nested_entry_methods(ENTRY_METHOD);
        let owners: Vec<&str> = nested.iter().map(|m| m.owner.as_str()).collect();
        assert_eq!(owners, ["Inner", "Inline"]);

        let catalog = EipCatalog::builtin();
        let trees = parse_route_builder_trees(&unit, true, &catalog).unwrap();
        let ids: Vec<Option<&str>> = trees.iter().map(|t| t.route_id()).collect();
        assert_eq!(ids, [Some("outer"), Some("inner"), None]);
        assert_eq!(parse_route_builder_trees(&unit, false, &catalog).unwrap().len(), 1);
    }

    #[test]
    fn test_primary_skips_configure_without_route() {
        let source = r#"
struct Errors;

impl RouteBuilder for Errors {
    fn configure(&self, r: &mut Routes) {
        r.on_exception("io").handled(true);
    }
}

struct Payments;

impl RouteBuilder for Payments {
    fn configure(&self, r: &mut Routes) {
        r.from("direct:pay").route_id("payments").to("mock:p");
    }
}
"#;
        let unit = RustSourceUnit::parse(source, "payments.rs").unwrap();
        assert_eq!(unit.find_entry_method(ENTRY_METHOD).unwrap().owner, "Payments");
        let nested = unit.find_nested_entry_methods(ENTRY_METHOD);
        assert_eq!(nested.len(), 1);
        assert_eq!(nested[0].owner, "Errors");

        let tree = parse_route_builder(&unit, false, &EipCatalog::builtin())
            .unwrap()
            .unwrap();
        assert_eq!(tree.route_id(), Some("payments"));
    }

    #[test]
    fn test_file_without_route_builder() {
        let unit = RustSourceUnit::parse("fn main() { println!(\"hi\"); }", "main.rs").unwrap();
        assert!(unit.find_entry_method(ENTRY_METHOD).is_none());
        let tree = parse_route_builder(&unit, true, &EipCatalog::builtin()).unwrap();
        assert!(tree.is_none());
    }

    #[test]
    fn test_invalid_source_is_an_error() {
        let err = RustSourceUnit::parse("impl {", "broken.rs").unwrap_err();
        assert!(matches!(err, RouteCoverageError::Source { .. }));
        assert!(err.to_string().contains("broken.rs"));
    }

    #[test]
    fn test_let_binding_chain() {
        let source = r#"
impl RouteBuilder for Bound {
    fn configure(&self, r: &mut Routes) {
        let _route = r.from("timer:tick").route_id("tick").to_d("mock:${header.x}");
    }
}
"#;
        let unit = RustSourceUnit::parse(source, "bound.rs").unwrap();
        let tree = parse_route_builder(&unit, false, &EipCatalog::builtin())
            .unwrap()
            .unwrap();
        assert_eq!(tree.route_id(), Some("tick"));
        let child = tree.root_node().children()[0];
        assert_eq!(tree.node(child).name, "toD");
    }
}
