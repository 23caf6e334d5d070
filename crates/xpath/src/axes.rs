//! Node collection along each supported axis.
//!
//! Collectors append into a shared result vector and skip nodes already seen,
//! so a step evaluated over several context nodes yields each node once.

use crate::ast::Axis;
use crate::datasource::DataSourceNode;
use std::collections::HashSet;

fn add_node<'a, N: DataSourceNode<'a>>(node: N, seen: &mut HashSet<N>, results: &mut Vec<N>) {
    if seen.insert(node) {
        results.push(node);
    }
}

pub fn collect<'a, N: DataSourceNode<'a>>(
    axis: Axis,
    node: N,
    seen: &mut HashSet<N>,
    results: &mut Vec<N>,
) {
    match axis {
        Axis::Child => {
            for child in node.children() {
                add_node(child, seen, results);
            }
        }
        Axis::Attribute => {
            for attr in node.attributes() {
                add_node(attr, seen, results);
            }
        }
        Axis::SelfAxis => add_node(node, seen, results),
        Axis::Descendant => collect_descendants(node, seen, results),
        Axis::DescendantOrSelf => {
            add_node(node, seen, results);
            collect_descendants(node, seen, results);
        }
        Axis::Parent => {
            if let Some(parent) = node.parent() {
                add_node(parent, seen, results);
            }
        }
        Axis::Ancestor => {
            let mut current = node.parent();
            while let Some(p) = current {
                add_node(p, seen, results);
                current = p.parent();
            }
        }
        Axis::FollowingSibling => {
            if let Some(parent) = node.parent() {
                for sibling in parent.children().skip_while(|s| *s != node).skip(1) {
                    add_node(sibling, seen, results);
                }
            }
        }
        Axis::PrecedingSibling => {
            if let Some(parent) = node.parent() {
                for sibling in parent.children().take_while(|s| *s != node) {
                    add_node(sibling, seen, results);
                }
            }
        }
    }
}

/// Pre-order walk, so descendants come out in document order.
fn collect_descendants<'a, N: DataSourceNode<'a>>(
    node: N,
    seen: &mut HashSet<N>,
    results: &mut Vec<N>,
) {
    let mut stack: Vec<N> = node.children().collect();
    stack.reverse();
    while let Some(current) = stack.pop() {
        add_node(current, seen, results);
        let mut children: Vec<N> = current.children().collect();
        children.reverse();
        stack.extend(children);
    }
}
