//! Depth-bounded recursive descent over element trees and value graphs
//!
//! Both walkers share the same contract: depth-first, visitor per node, a depth
//! cap that terminates traversal quietly instead of erroring. They differ only
//! in child enumeration: element children plus shadow-root children for DOM
//! nodes, object values plus array items for JSON graphs. Shadow boundaries are
//! transparent to the walker; frame boundaries are not (each frame needs its
//! own serialization pass, see [`crate::dom::DomTree::from_frames`]).

use crate::dom::element::ElementNode;
use serde_json::Value;

/// Default depth cap when mining opaque state objects.
///
/// Page-side framework state is an unknown, possibly self-referential graph;
/// five levels is deep enough to reach the strings the console embeds there.
pub const DEFAULT_STATE_DEPTH: usize = 5;

/// Depth cap for element trees. Real documents never approach this.
pub const DEFAULT_DOM_DEPTH: usize = 64;

/// Depth-first traversal over an element tree, shadow roots included.
///
/// The visitor runs once per element. After an element's children, the walker
/// descends into its shadow-root children, so every element is visited exactly
/// once regardless of shadow nesting. Nodes deeper than `max_depth` are
/// skipped, not reported as errors.
pub fn walk<'a, F>(root: &'a ElementNode, visitor: &mut F, max_depth: usize)
where
    F: FnMut(&'a ElementNode),
{
    walk_element(root, visitor, 0, max_depth);
}

fn walk_element<'a, F>(node: &'a ElementNode, visitor: &mut F, depth: usize, max_depth: usize)
where
    F: FnMut(&'a ElementNode),
{
    if depth > max_depth {
        return;
    }

    visitor(node);

    for child in &node.children {
        walk_element(child, visitor, depth + 1, max_depth);
    }

    for shadow_child in &node.shadow_root {
        walk_element(shadow_child, visitor, depth + 1, max_depth);
    }
}

/// Depth-first traversal over a parsed JSON graph, visiting every string leaf.
///
/// Child enumeration covers object values and array items. The depth cap
/// guards against pathologically nested state dumps the same way the page-side
/// miner guards against self-referential live objects.
pub fn walk_values<F>(value: &Value, visitor: &mut F, max_depth: usize)
where
    F: FnMut(&str),
{
    walk_value(value, visitor, 0, max_depth);
}

fn walk_value<F>(value: &Value, visitor: &mut F, depth: usize, max_depth: usize)
where
    F: FnMut(&str),
{
    if depth > max_depth {
        return;
    }

    match value {
        Value::String(s) => visitor(s),
        Value::Array(items) => {
            for item in items {
                walk_value(item, visitor, depth + 1, max_depth);
            }
        }
        Value::Object(map) => {
            for item in map.values() {
                walk_value(item, visitor, depth + 1, max_depth);
            }
        }
        _ => {}
    }
}
