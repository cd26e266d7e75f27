//! Rendering a finished [`Node`] chain into an inspectable tree: DOT,
//! LaTeX (`forest`), and the two linearizations used by
//! [`crate::Derivation`].

use std::collections::{HashMap, VecDeque};
use std::fmt;
use std::rc::Rc;

use crate::node::Node;

/// One token in a derivation's base-generated (pre-movement) linearization.
#[derive(Debug, Clone, PartialEq)]
pub enum BaseToken {
    /// An ordinary pronounced word.
    Word(String),
    /// A null-headed lexical item, shown as `ε`.
    Empty,
    /// A moved constituent, shown at its pronounced (landing) position.
    Mover { words: Vec<String>, trace: u32 },
    /// The base position a `Mover` moved out of.
    Trace(u32),
}

impl fmt::Display for BaseToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BaseToken::Word(w) => write!(f, "{w}"),
            BaseToken::Empty => write!(f, "\u{3b5}"),
            BaseToken::Mover { words, trace } => write!(f, "Mover({}, trace={trace})", words.join(" ")),
            BaseToken::Trace(id) => write!(f, "t{id}"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum InternalKind {
    Merge,
    Move { trace_id: u32 },
}

/// A single node in a rendered tree.
#[derive(Debug, Clone)]
pub enum TreeNode {
    /// An entry's `form::features` text. `grey` marks a head that moved out
    /// via head-incorporation; it's drawn dashed and linked to the leaf it
    /// fused into.
    Leaf { entry: String, grey: bool },
    /// The base position of a phrasal movement chain. The id is local to
    /// this tree, assigned in discovery order starting at 0.
    Trace(u32),
    /// An internal constituent labeled by its own unconsumed feature list.
    Internal { label: String, children: Vec<usize> },
}

/// An arena-indexed rendering of a derivation's constituent structure.
///
/// Nodes are numbered in breadth-first discovery order starting from the
/// root at index 0 — this, rather than a post-order numbering, is what
/// keeps [`Tree::to_dot`]'s node ids matching a reader's left-to-right,
/// top-down expectation of the tree.
pub struct Tree {
    pub nodes: Vec<TreeNode>,
    pub root: usize,
    /// Dashed move edges, `(source, target)`: `source` is either a `Trace`
    /// node or a greyed head-movement `Leaf`, `target` is where its content
    /// actually surfaces.
    pub move_edges: Vec<(usize, usize)>,
    /// Internal-node index -> whether it's a Merge or a Move (and which
    /// trace it introduced), kept alongside `nodes` for linearization.
    kinds: HashMap<usize, InternalKind>,
}

impl Tree {
    /// Render the constituent structure rooted at `node` into an arena tree,
    /// locating the dashed move edges (head-incorporation and phrasal
    /// movement alike) as it goes.
    pub fn build(root: &Rc<Node>) -> Tree {
        let mut nodes: Vec<TreeNode> = Vec::new();
        let mut kinds: HashMap<usize, InternalKind> = HashMap::new();
        let mut grey_by_fusion: HashMap<u32, usize> = HashMap::new();
        let mut fused_by_fusion: HashMap<u32, usize> = HashMap::new();
        let mut trace_index: HashMap<u32, usize> = HashMap::new();
        let mut move_sources: Vec<(usize, u32)> = Vec::new();
        let mut trace_renumber: HashMap<u32, u32> = HashMap::new();
        let mut next_local_trace = 0u32;

        let mut queue: VecDeque<Rc<Node>> = VecDeque::new();
        queue.push_back(root.clone());
        let mut next_id = 1usize;

        while let Some(node) = queue.pop_front() {
            let id = nodes.len();
            match node.as_ref() {
                Node::Leaf {
                    item,
                    silent,
                    fusion_id,
                } => {
                    nodes.push(TreeNode::Leaf {
                        entry: item.entry_string(),
                        grey: *silent,
                    });
                    if let Some(fid) = fusion_id {
                        if *silent {
                            grey_by_fusion.insert(*fid, id);
                        } else {
                            fused_by_fusion.insert(*fid, id);
                        }
                    }
                }
                Node::Trace(raw_id) => {
                    let local = *trace_renumber.entry(*raw_id).or_insert_with(|| {
                        let n = next_local_trace;
                        next_local_trace += 1;
                        n
                    });
                    nodes.push(TreeNode::Trace(local));
                    trace_index.insert(local, id);
                }
                Node::Merge { left, right, label } => {
                    let (l, r) = (next_id, next_id + 1);
                    next_id += 2;
                    nodes.push(TreeNode::Internal {
                        label: label.clone(),
                        children: vec![l, r],
                    });
                    kinds.insert(id, InternalKind::Merge);
                    queue.push_back(left.clone());
                    queue.push_back(right.clone());
                }
                Node::Move {
                    specifier,
                    base,
                    trace_id,
                    label,
                } => {
                    let (l, r) = (next_id, next_id + 1);
                    next_id += 2;
                    let local = *trace_renumber.entry(*trace_id).or_insert_with(|| {
                        let n = next_local_trace;
                        next_local_trace += 1;
                        n
                    });
                    nodes.push(TreeNode::Internal {
                        label: label.clone(),
                        children: vec![l, r],
                    });
                    kinds.insert(id, InternalKind::Move { trace_id: local });
                    move_sources.push((l, local));
                    queue.push_back(specifier.clone());
                    queue.push_back(base.clone());
                }
            }
        }

        let mut move_edges = Vec::new();
        move_sources.sort_by_key(|&(_, trace_id)| trace_id);
        for (spec_idx, trace_id) in move_sources {
            if let Some(&trace_idx) = trace_index.get(&trace_id) {
                move_edges.push((trace_idx, spec_idx));
            }
        }
        let mut fusions: Vec<(&u32, &usize)> = grey_by_fusion.iter().collect();
        fusions.sort_by_key(|&(fid, _)| *fid);
        for (fid, grey_idx) in fusions {
            if let Some(&fused_idx) = fused_by_fusion.get(fid) {
                move_edges.push((*grey_idx, fused_idx));
            }
        }

        Tree {
            nodes,
            root: 0,
            move_edges,
            kinds,
        }
    }

    /// Render as Graphviz DOT.
    pub fn to_dot(&self) -> String {
        let mut out = String::from("digraph {\n");
        for (idx, node) in self.nodes.iter().enumerate() {
            match node {
                TreeNode::Leaf { entry, grey } => {
                    let display = display_entry(entry);
                    if *grey {
                        out.push_str(&format!(
                            "{idx} [color=gray, fontcolor=gray, label=\"{display}\", ordering=out, style=dashed];\n"
                        ));
                    } else {
                        out.push_str(&format!("{idx} [label=\"{display}\", ordering=out];\n"));
                    }
                }
                TreeNode::Trace(id) => {
                    out.push_str(&format!("{idx} [label=\"t{id}\", ordering=out];\n"));
                }
                TreeNode::Internal { label, .. } => {
                    out.push_str(&format!("{idx} [label=\"{label}\", ordering=out];\n"));
                }
            }
        }
        for side in 0..2 {
            for (idx, node) in self.nodes.iter().enumerate() {
                if let TreeNode::Internal { children, .. } = node {
                    out.push_str(&format!("{idx} -> {} ;\n", children[side]));
                }
            }
        }
        for &(from, to) in &self.move_edges {
            out.push_str(&format!("{from} -> {to} [constraint=false, style=dashed];\n"));
        }
        out.push_str("}\n");
        out
    }

    /// Render as a LaTeX `forest` picture.
    pub fn latex(&self) -> String {
        format!("\\begin{{forest}}{}\\end{{forest}}", self.latex_node(self.root))
    }

    fn latex_node(&self, idx: usize) -> String {
        match &self.nodes[idx] {
            TreeNode::Leaf { entry, .. } => {
                let form = entry_form(entry);
                let form = if form.is_empty() {
                    "$\\epsilon$".to_string()
                } else {
                    form.to_string()
                };
                format!("[\\plainlex{{{}}}{{{}}}]", entry_features(entry), form)
            }
            TreeNode::Trace(id) => format!("[$t_{id}$]"),
            TreeNode::Internal { label, children } => {
                let kids = children
                    .iter()
                    .map(|&c| self.latex_node(c))
                    .collect::<Vec<_>>()
                    .join(" ");
                format!("[\\der{{{label}}} {kids}]")
            }
        }
    }

    /// Linearize, skipping silenced and null-headed leaves.
    pub fn normal_string(&self) -> String {
        self.normal_words().join(" ")
    }

    pub fn normal_words(&self) -> Vec<String> {
        let mut words = Vec::new();
        collect_words(&self.nodes, self.root, &mut words);
        words
    }

    /// Linearize in base-generated order: movers shown at their pronounced
    /// position but wrapped with their trace id, traces shown at their base
    /// position, null heads shown as `ε`.
    pub fn base_string(&self) -> Vec<BaseToken> {
        let mut out = Vec::new();
        self.collect_base(self.root, &mut out);
        out
    }

    fn collect_base(&self, idx: usize, out: &mut Vec<BaseToken>) {
        match &self.nodes[idx] {
            TreeNode::Leaf { entry, grey } => {
                if *grey {
                    return;
                }
                let form = entry_form(entry);
                if form.is_empty() {
                    out.push(BaseToken::Empty);
                } else {
                    out.push(BaseToken::Word(form.to_string()));
                }
            }
            TreeNode::Trace(id) => out.push(BaseToken::Trace(*id)),
            TreeNode::Internal { children, .. } => {
                let (left, right) = (children[0], children[1]);
                match self.kinds.get(&idx) {
                    Some(InternalKind::Move { trace_id }) => {
                        let mut words = Vec::new();
                        collect_words(&self.nodes, left, &mut words);
                        out.push(BaseToken::Mover {
                            words,
                            trace: *trace_id,
                        });
                        self.collect_base(right, out);
                    }
                    _ => {
                        self.collect_base(left, out);
                        self.collect_base(right, out);
                    }
                }
            }
        }
    }

    /// Every lexical entry string (`form::features`) appearing at a leaf of
    /// this tree, including leaves silenced by head movement.
    pub fn lexical_entries(&self) -> Vec<&str> {
        self.nodes
            .iter()
            .filter_map(|n| match n {
                TreeNode::Leaf { entry, .. } => Some(entry.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Every pronounced form (possibly empty) at a leaf of this tree,
    /// including leaves silenced by head movement.
    pub fn leaf_forms(&self) -> Vec<&str> {
        self.nodes
            .iter()
            .filter_map(|n| match n {
                TreeNode::Leaf { entry, .. } => Some(entry_form(entry)),
                _ => None,
            })
            .collect()
    }
}

/// Substitute the unicode `ε` for an empty surface form, for DOT labels.
fn display_entry(entry: &str) -> String {
    if entry_form(entry).is_empty() {
        format!("\u{3b5}::{}", entry_features(entry))
    } else {
        entry.to_string()
    }
}

fn entry_features(entry: &str) -> &str {
    entry.split_once("::").map(|(_, f)| f).unwrap_or("")
}

fn entry_form(entry: &str) -> &str {
    entry.split_once("::").map(|(f, _)| f).unwrap_or(entry)
}

fn collect_words(nodes: &[TreeNode], idx: usize, out: &mut Vec<String>) {
    match &nodes[idx] {
        TreeNode::Leaf { entry, grey } => {
            if *grey {
                return;
            }
            let form = entry_form(entry);
            if !form.is_empty() {
                out.push(form.to_string());
            }
        }
        TreeNode::Trace(_) => {}
        TreeNode::Internal { children, .. } => {
            for &c in children {
                collect_words(nodes, c, out);
            }
        }
    }
}
