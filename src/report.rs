//! Plain-text rendering of the discovered file list.

use std::collections::BTreeMap;

/// Nested directory structure keyed by path component.
#[derive(Debug, Default)]
struct TreeNode {
    children: BTreeMap<String, TreeNode>,
}

/// Renders blob paths as an indented directory tree.
///
/// Sibling entries are sorted, so the rendering is deterministic regardless
/// of listing order.
///
/// # Example
///
/// ```
/// use appraise::report::render_directory_tree;
///
/// let paths = ["src/main.rs".to_owned(), "README.md".to_owned()];
/// let tree = render_directory_tree(&paths);
/// assert!(tree.contains("├── src"));
/// ```
#[must_use]
pub fn render_directory_tree(paths: &[String]) -> String {
    let mut root = TreeNode::default();
    for path in paths {
        let mut node = &mut root;
        for component in path.split('/').filter(|component| !component.is_empty()) {
            node = node.children.entry(component.to_owned()).or_default();
        }
    }

    let mut rendered = String::new();
    render_node(&root, "", &mut rendered);
    rendered
}

fn render_node(node: &TreeNode, indent: &str, output: &mut String) {
    for (name, child) in &node.children {
        output.push_str(indent);
        output.push_str("├── ");
        output.push_str(name);
        output.push('\n');
        render_node(child, &format!("{indent}    "), output);
    }
}
