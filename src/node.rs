//! The constituent DAG a derivation builds as it runs, and the primitives
//! used to rewrite a finished chain of [`Node`]s into a rendered [`crate::Tree`].

use std::rc::Rc;

use crate::lexical_item::LexicalItem;

/// One constituent in a derivation's structure.
///
/// `Merge` always orders its two children the way they are pronounced:
/// for a plain selector the projecting head is `left` and the complement is
/// `right`, for `=X` the order is swapped, and `Move` always puts the
/// attracted specifier on `left`. A `Leaf` marked `silent` contributed its
/// phonetic content elsewhere (it is the base position of a head that moved
/// out via a `=>X`/`X<=` selector) and is skipped during linearization.
#[derive(Debug, Clone)]
pub enum Node {
    /// A single lexical entry, or the fused affix formed by head movement.
    ///
    /// `fusion_id` links a silenced (grey) stem left behind by head
    /// movement to the fused leaf its content surfaced on; both ends of a
    /// single incorporation share the same id.
    Leaf {
        item: LexicalItem,
        silent: bool,
        fusion_id: Option<u32>,
    },
    /// The base position of a phrasal (licensee-triggered) movement chain.
    Trace(u32),
    /// A binary Merge. `label` is the unconsumed feature list of the
    /// resulting constituent, e.g. `"=D T"`.
    Merge {
        left: Rc<Node>,
        right: Rc<Node>,
        label: String,
    },
    /// A Move: `specifier` is the attracted mover, `base` is the rest of
    /// the projection it was pulled out of. `label` is the unconsumed
    /// feature list after the move, e.g. `"C"`.
    Move {
        specifier: Rc<Node>,
        base: Rc<Node>,
        trace_id: u32,
        label: String,
    },
}

impl Node {
    /// Build a fresh, non-silent leaf around a lexical item.
    pub fn leaf(item: LexicalItem) -> Rc<Node> {
        Rc::new(Node::Leaf {
            item,
            silent: false,
            fusion_id: None,
        })
    }

    /// Build the fused leaf formed by a head-movement merge, tagged so it
    /// can be paired back up with the grey stem [`silence`] leaves behind.
    pub fn fused_leaf(item: LexicalItem, fusion_id: u32) -> Rc<Node> {
        Rc::new(Node::Leaf {
            item,
            silent: false,
            fusion_id: Some(fusion_id),
        })
    }

    /// The lexical item at a leaf node. Panics if `self` isn't a leaf;
    /// every call site holds that invariant by construction.
    pub fn leaf_item(&self) -> &LexicalItem {
        match self {
            Node::Leaf { item, .. } => item,
            _ => panic!("expected a chain head to be a leaf node"),
        }
    }
}

/// Rebuild `node`, replacing the single occurrence of `target` (compared by
/// `Rc` identity) with a silenced copy tagged `fusion_id`. Used when a head
/// incorporates into a selector above it: the base copy stays in the tree,
/// greyed out, while its phonetic content surfaces on the fused leaf
/// carrying the same `fusion_id`.
pub fn silence(node: &Rc<Node>, target: &Rc<Node>, fusion_id: u32) -> Rc<Node> {
    if Rc::ptr_eq(node, target) {
        return match node.as_ref() {
            Node::Leaf { item, .. } => Rc::new(Node::Leaf {
                item: item.clone(),
                silent: true,
                fusion_id: Some(fusion_id),
            }),
            _ => node.clone(),
        };
    }
    match node.as_ref() {
        Node::Merge { left, right, label } => Rc::new(Node::Merge {
            left: silence(left, target, fusion_id),
            right: silence(right, target, fusion_id),
            label: label.clone(),
        }),
        Node::Move {
            specifier,
            base,
            trace_id,
            label,
        } => Rc::new(Node::Move {
            specifier: silence(specifier, target, fusion_id),
            base: silence(base, target, fusion_id),
            trace_id: *trace_id,
            label: label.clone(),
        }),
        Node::Leaf { .. } | Node::Trace(_) => node.clone(),
    }
}

/// Every lexical item reachable from `node`, including those silenced by
/// head movement (their phonetic content still "participates" in the
/// derivation even though it surfaces fused onto another leaf).
pub fn leaves<'a>(node: &'a Node) -> Vec<&'a LexicalItem> {
    let mut out = Vec::new();
    collect_leaves(node, &mut out);
    out
}

fn collect_leaves<'a>(node: &'a Node, out: &mut Vec<&'a LexicalItem>) {
    match node {
        Node::Leaf { item, .. } => out.push(item),
        Node::Trace(_) => {}
        Node::Merge { left, right, .. } => {
            collect_leaves(left, out);
            collect_leaves(right, out);
        }
        Node::Move { specifier, base, .. } => {
            collect_leaves(specifier, out);
            collect_leaves(base, out);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feature::Feature;

    #[test]
    fn silence_replaces_only_the_targeted_leaf() {
        let drink = LexicalItem::new("drink", vec![Feature::Category("V".into())]);
        let drink_leaf = Node::leaf(drink.clone());
        let trace = Rc::new(Node::Trace(0));
        let merge = Rc::new(Node::Merge {
            left: drink_leaf.clone(),
            right: trace,
            label: "V".into(),
        });

        let silenced = silence(&merge, &drink_leaf, 7);
        match silenced.as_ref() {
            Node::Merge { left, right, .. } => {
                match left.as_ref() {
                    Node::Leaf {
                        item,
                        silent,
                        fusion_id,
                    } => {
                        assert_eq!(item.form, "drink");
                        assert!(*silent);
                        assert_eq!(*fusion_id, Some(7));
                    }
                    _ => panic!("expected leaf"),
                }
                assert!(matches!(right.as_ref(), Node::Trace(0)));
            }
            _ => panic!("expected merge"),
        }
    }
}
