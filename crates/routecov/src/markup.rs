//! Markup Route Tree Builder
//!
//! Turns one `<route>` element into a [`RouteTree`]. The `route` element
//! itself never becomes a node: its element children hang directly off the
//! caller-supplied root. Text and comment nodes are ignored.

use crate::node::{NodeId, RouteTree};
use crate::result::{RouteCoverageError, RouteCoverageResult};
use roxmltree::{Document, Node};
use std::path::Path;
use tracing::debug;

/// Tag name of the route wrapper element
pub const ROUTE_ELEMENT: &str = "route";

/// Name given to the synthetic root of markup-built trees
pub const MARKUP_ENTRY_NAME: &str = "entry";

/// Build the tree of one route element into `root`.
///
/// `root` plays the role of the route element. Its route id and source file
/// are set from the arguments and inherited by every created node. The
/// result always holds exactly one tree.
pub fn build_markup_route_tree(
    route: Node<'_, '_>,
    route_id: Option<&str>,
    mut root: RouteTree,
    base_dir: &Path,
    file: &Path,
) -> Vec<RouteTree> {
    root.set_route_id(route_id);
    root.set_source_file(Some(&relative_file_name(base_dir, file)));
    let parent = root.root();
    walk_element(&mut root, route, parent);
    vec![root]
}

fn walk_element(tree: &mut RouteTree, element: Node<'_, '_>, parent: NodeId) {
    let name = element.tag_name().name();
    let current = if name == ROUTE_ELEMENT {
        parent
    } else {
        let id = tree.add_node(parent, name);
        let (start, end) = line_span(element);
        tree.set_lines(id, start, end);
        id
    };

    for child in element.children().filter(Node::is_element) {
        walk_element(tree, child, current);
    }
}

/// Line span of an element, 1-indexed
fn line_span(element: Node<'_, '_>) -> (Option<usize>, Option<usize>) {
    let doc = element.document();
    let range = element.range();
    let start = doc.text_pos_at(range.start).row as usize;
    let end = doc.text_pos_at(range.end.saturating_sub(1).max(range.start)).row as usize;
    (Some(start), Some(end))
}

/// Parse a markup document and build one tree per `<route>` element.
///
/// Routes without an `id` attribute produce anonymous trees.
pub fn parse_markup_routes(
    source: &str,
    file: &Path,
    base_dir: &Path,
) -> RouteCoverageResult<Vec<RouteTree>> {
    let doc = Document::parse(source)
        .map_err(|e| RouteCoverageError::markup(file.display().to_string(), e.to_string()))?;

    let mut trees = Vec::new();
    for route in doc
        .descendants()
        .filter(|n| n.is_element() && n.tag_name().name() == ROUTE_ELEMENT)
    {
        let route_id = route.attribute("id");
        let mut root = RouteTree::new(MARKUP_ENTRY_NAME);
        let (start, end) = line_span(route);
        let root_id = root.root();
        root.set_lines(root_id, start, end);
        trees.extend(build_markup_route_tree(route, route_id, root, base_dir, file));
    }
    debug!(file = %file.display(), routes = trees.len(), "parsed markup routes");
    Ok(trees)
}

/// Path of `file` relative to `base_dir` when it lives below it
pub(crate) fn relative_file_name(base_dir: &Path, file: &Path) -> String {
    file.strip_prefix(base_dir)
        .unwrap_or(file)
        .to_string_lossy()
        .replace('\\', "/")
}
