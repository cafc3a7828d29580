//! Source Route Tree Builder
//!
//! Converts the call chains of a route builder's entry method into a
//! [`RouteTree`] shaped exactly like the markup builder's output.
//!
//! The parser boundary is [`SourceUnit`]: anything that can locate entry
//! methods and hand back their statements as ordered [`CallNode`] chains.
//! [`RustSourceUnit`] is the bundled implementation for Rust route builders.
//!
//! # Scoping
//!
//! A flat fluent chain such as
//!
//! ```text
//! from(x).to(a).choice().when(p).to(b).otherwise().to(c)
//! ```
//!
//! is nested by keyword: block steps (`choice`, `filter`, `split`, ...) open a
//! scope closed by `end()`, branch arms (`when`, `otherwise`, `doCatch`, ...)
//! attach to their enclosing block and collect the steps that follow them.
//! Closure arguments are converted recursively and become the children of
//! the call that received them.

mod rust;

pub use rust::RustSourceUnit;

use crate::catalog::StepCatalog;
use crate::node::{NodeId, RouteTree};
use crate::result::RouteCoverageResult;
use tracing::debug;

/// Name of the route builder entry method
pub const ENTRY_METHOD: &str = "configure";

/// Call that starts a route
pub const FROM: &str = "from";

/// Call that names a route
pub const ROUTE_ID: &str = "routeId";

/// Steps whose following calls nest under them until `end()`
const BLOCK_STEPS: &[&str] = &[
    "aggregate",
    "choice",
    "circuitBreaker",
    "doTry",
    "filter",
    "idempotentConsumer",
    "loadBalance",
    "loop",
    "multicast",
    "onCompletion",
    "pipeline",
    "policy",
    "resequence",
    "saga",
    "split",
    "step",
    "transacted",
    "whenSkipSendToEndpoint",
];

/// Branch arms and the block each one belongs to
const BRANCH_ARMS: &[(&str, &str)] = &[
    ("when", "choice"),
    ("otherwise", "choice"),
    ("doCatch", "doTry"),
    ("doFinally", "doTry"),
    ("onFallback", "circuitBreaker"),
];

/// Argument of a call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallArg {
    /// String, integer or boolean literal
    Literal(String),
    /// Nested call chain (a closure body)
    Block(Vec<CallNode>),
    /// Any other expression (predicates, variables, ...)
    Expression,
}

/// One call of a fluent chain
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallNode {
    /// DSL keyword in lowerCamelCase
    pub name: String,
    /// First line of the call
    pub line_start: Option<usize>,
    /// Last line of the call
    pub line_end: Option<usize>,
    /// Arguments in source order
    pub args: Vec<CallArg>,
}

impl CallNode {
    /// Create a call without arguments or position
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            line_start: None,
            line_end: None,
            args: Vec::new(),
        }
    }

    /// Add a literal argument
    #[must_use]
    pub fn with_literal(mut self, value: &str) -> Self {
        self.args.push(CallArg::Literal(value.to_string()));
        self
    }

    /// Add a nested chain argument
    #[must_use]
    pub fn with_block(mut self, calls: Vec<CallNode>) -> Self {
        self.args.push(CallArg::Block(calls));
        self
    }

    /// Set the line span
    #[must_use]
    pub fn at_lines(mut self, start: usize, end: usize) -> Self {
        self.line_start = Some(start);
        self.line_end = Some(end);
        self
    }

    /// First literal argument
    #[must_use]
    pub fn first_literal(&self) -> Option<&str> {
        self.args.iter().find_map(|arg| match arg {
            CallArg::Literal(value) => Some(value.as_str()),
            _ => None,
        })
    }

    fn blocks(&self) -> impl Iterator<Item = &[CallNode]> + '_ {
        self.args.iter().filter_map(|arg| match arg {
            CallArg::Block(calls) => Some(calls.as_slice()),
            _ => None,
        })
    }
}

/// A located route builder entry method
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryMethod {
    /// Type declaring the method
    pub owner: String,
    /// Method name
    pub name: String,
    /// First line of the method
    pub line_start: Option<usize>,
    /// Last line of the method
    pub line_end: Option<usize>,
    /// Body statements, each one an ordered call chain
    pub statements: Vec<Vec<CallNode>>,
}

/// A parsed source file that may declare route builders
pub trait SourceUnit {
    /// File name used for attribution
    fn file_name(&self) -> &str;

    /// The primary entry method named `name`, if any
    fn find_entry_method(&self, name: &str) -> Option<&EntryMethod>;

    /// Further entry methods named `name` declared inside nested scopes
    fn find_nested_entry_methods(&self, name: &str) -> Vec<&EntryMethod>;
}

/// Build the first route tree of a unit, `None` when it declares no route builder
pub fn parse_route_builder(
    unit: &dyn SourceUnit,
    include_nested: bool,
    catalog: &dyn StepCatalog,
) -> RouteCoverageResult<Option<RouteTree>> {
    Ok(parse_route_builder_trees(unit, include_nested, catalog)?
        .into_iter()
        .next())
}

/// Build one route tree per entry method of a unit
pub fn parse_route_builder_trees(
    unit: &dyn SourceUnit,
    include_nested: bool,
    catalog: &dyn StepCatalog,
) -> RouteCoverageResult<Vec<RouteTree>> {
    let mut methods = Vec::new();
    if let Some(method) = unit.find_entry_method(ENTRY_METHOD) {
        methods.push(method);
    }
    if include_nested {
        methods.extend(unit.find_nested_entry_methods(ENTRY_METHOD));
    }

    let mut trees = Vec::new();
    for method in methods {
        if let Some(tree) = build_route_tree(method, unit.file_name(), catalog)? {
            trees.push(tree);
        }
    }
    Ok(trees)
}

/// Build the route tree of one entry method.
///
/// The first statement starting with `from(...)` defines the route; the
/// method yields `None` when there is none.
pub fn build_route_tree(
    method: &EntryMethod,
    file: &str,
    catalog: &dyn StepCatalog,
) -> RouteCoverageResult<Option<RouteTree>> {
    let Some(chain) = method
        .statements
        .iter()
        .find(|calls| calls.first().is_some_and(|c| c.name == FROM))
    else {
        debug!(file, owner = %method.owner, "entry method declares no route");
        return Ok(None);
    };

    let from = &chain[0];
    let mut tree = RouteTree::new(FROM);
    tree.set_route_id(find_route_id(chain));
    tree.set_source_file(Some(file));
    let root = tree.root();
    tree.set_lines(root, from.line_start, from.line_end);

    let mut placements = Vec::new();
    place_chain(&mut tree, &chain[1..], root, catalog, &mut placements);

    // Placements are in program order; walking them backward and inserting
    // at the front leaves every child list in program order.
    for &(parent, child) in placements.iter().rev() {
        tree.prepend_child(parent, child);
    }
    tree.verify_order()?;

    let extra = method
        .statements
        .iter()
        .filter(|calls| calls.first().is_some_and(|c| c.name == FROM))
        .count()
        .saturating_sub(1);
    if extra > 0 {
        debug!(file, owner = %method.owner, extra, "only the first route of the entry method is built");
    }

    debug!(
        file,
        route_id = tree.route_id().unwrap_or("<anonymous>"),
        nodes = tree.len(),
        "built source route tree"
    );
    Ok(Some(tree))
}

fn find_route_id(chain: &[CallNode]) -> Option<&str> {
    chain
        .iter()
        .find(|c| c.name == ROUTE_ID)
        .and_then(CallNode::first_literal)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScopeKind {
    Root,
    Block,
    Arm,
}

#[derive(Debug)]
struct Scope<'a> {
    node: NodeId,
    name: &'a str,
    kind: ScopeKind,
}

/// Create nodes for `calls` in program order and record where each one goes.
///
/// Nodes are not attached here; `placements` collects `(parent, child)` pairs
/// in creation order for the backward assembly pass.
fn place_chain<'a>(
    tree: &mut RouteTree,
    calls: &'a [CallNode],
    scope_root: NodeId,
    catalog: &dyn StepCatalog,
    placements: &mut Vec<(NodeId, NodeId)>,
) {
    let root_name = tree.node(scope_root).name.clone();
    let mut stack = vec![Scope {
        node: scope_root,
        name: "",
        kind: ScopeKind::Root,
    }];
    // The scope root keeps its own name so that arms inside a closure passed
    // to e.g. `choice(...)` find their block.
    let root_is_block = BLOCK_STEPS.contains(&root_name.as_str());

    for call in calls {
        let name = call.name.as_str();
        match name {
            ROUTE_ID => {}
            "end" => close_block(&mut stack, None),
            "endChoice" => close_arm(&mut stack, "choice"),
            "endDoTry" => close_block(&mut stack, Some("doTry")),
            "endCircuitBreaker" => close_block(&mut stack, Some("circuitBreaker")),
            _ if !catalog.is_recognized_step_name(name) => {
                debug!(call = name, "skipping unrecognized call");
            }
            _ => {
                let arm_owner = BRANCH_ARMS
                    .iter()
                    .find(|(arm, _)| *arm == name)
                    .map(|(_, owner)| *owner);
                let is_arm = match arm_owner {
                    Some(owner) => enter_owner(&mut stack, owner, root_is_block && root_name == owner),
                    None => false,
                };

                let parent = stack.last().map_or(scope_root, |s| s.node);
                let id = tree.create_node(parent, name);
                tree.set_lines(id, call.line_start, call.line_end);
                placements.push((parent, id));

                let mut has_block = false;
                for block in call.blocks() {
                    has_block = true;
                    place_chain(tree, block, id, catalog, placements);
                }

                if !has_block {
                    if is_arm {
                        stack.push(Scope {
                            node: id,
                            name,
                            kind: ScopeKind::Arm,
                        });
                    } else if BLOCK_STEPS.contains(&name) {
                        stack.push(Scope {
                            node: id,
                            name,
                            kind: ScopeKind::Block,
                        });
                    }
                }
            }
        }
    }
}

/// Unwind the stack to the innermost block named `owner`.
///
/// Returns `false` (leaving the stack untouched) when no such block is open,
/// in which case the arm is treated as an ordinary step.
fn enter_owner(stack: &mut Vec<Scope<'_>>, owner: &str, root_is_owner: bool) -> bool {
    let position = stack
        .iter()
        .rposition(|s| s.kind == ScopeKind::Block && s.name == owner);
    match position {
        Some(pos) => {
            stack.truncate(pos + 1);
            true
        }
        None if root_is_owner => {
            stack.truncate(1);
            true
        }
        None => false,
    }
}

/// `end()`: close the current arm (if any) and its block.
///
/// With an `owner` (`endDoTry()`, `endCircuitBreaker()`) everything above the
/// innermost open block of that name is closed along with it; nothing happens
/// when no such block is open.
fn close_block(stack: &mut Vec<Scope<'_>>, owner: Option<&str>) {
    if let Some(owner) = owner {
        if let Some(pos) = stack
            .iter()
            .rposition(|s| s.kind == ScopeKind::Block && s.name == owner)
        {
            stack.truncate(pos);
        }
        return;
    }
    if stack.len() > 1 && stack[stack.len() - 1].kind == ScopeKind::Arm {
        stack.pop();
    }
    if stack.len() > 1 {
        stack.pop();
    }
}

/// `endChoice()`: close the current arm, stay inside its block
fn close_arm(stack: &mut Vec<Scope<'_>>, owner: &str) {
    if let Some(pos) = stack
        .iter()
        .rposition(|s| s.kind == ScopeKind::Block && s.name == owner)
    {
        stack.truncate(pos + 1);
    } else if stack.len() > 1 && stack[stack.len() - 1].kind == ScopeKind::Arm {
        stack.pop();
    }
}
