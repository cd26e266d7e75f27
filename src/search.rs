//! The beam search that drives parsing, generation, and continuation lookup.
//!
//! All three public operations share one engine: a single global frontier of
//! partial derivations ordered by accumulated log-probability, where picking
//! a complement or a specifier for an outstanding selector is itself a
//! sub-search that resumes the outer derivation once it completes. Modeling
//! "resume the outer derivation" as a continuation keeps the whole process a
//! single priority-ordered loop over one kind of job, rather than a tree of
//! nested searches.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};
use std::rc::Rc;

use crate::config::SearchConfig;
use crate::feature::Feature;
use crate::lexicon::Lexicon;
use crate::node::{silence, Node};

/// A mover sitting in a chain's store, awaiting attraction by a matching licensor.
#[derive(Debug, Clone)]
struct Mover {
    /// The mover's own unconsumed feature list, front-stripped as it's re-attracted
    /// through successive movement.
    remaining: Vec<Feature>,
    /// The full constituent that will surface at the attraction site.
    node: Rc<Node>,
    /// Id of the trace already standing at this mover's base position.
    trace_id: u32,
}

type MoverMap = HashMap<String, Mover>;

/// A derivation's state at one point in the search: an unconsumed feature
/// list, the constituent built so far, and the movers it has accumulated.
#[derive(Debug, Clone)]
struct Chain {
    remaining: Vec<Feature>,
    node: Rc<Node>,
    /// This chain's own phonetic head, tracked separately from `node` so a
    /// `=>X`/`X<=` selector above it can later fuse or silence it.
    head: Rc<Node>,
    movers: MoverMap,
    log_prob: f64,
    steps: u32,
    /// Largest `movers.len()` ever reached along this chain's history.
    peak_movers: usize,
}

impl Chain {
    fn fresh(item: &crate::lexical_item::LexicalItem) -> Chain {
        let leaf = Node::leaf(item.clone());
        Chain {
            remaining: item.features.clone(),
            node: leaf.clone(),
            head: leaf,
            movers: MoverMap::new(),
            log_prob: item.log_weight(),
            steps: 0,
            peak_movers: 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SelectorVariant {
    Bare,
    Left,
    RightAffix,
    LeftAffix,
}

impl SelectorVariant {
    fn of(feature: &Feature) -> SelectorVariant {
        match feature {
            Feature::Selector(_) => SelectorVariant::Bare,
            Feature::LeftSelector(_) => SelectorVariant::Left,
            Feature::RightAffixSelector(_) => SelectorVariant::RightAffix,
            Feature::LeftAffixSelector(_) => SelectorVariant::LeftAffix,
            _ => unreachable!("selector variant requested for a non-selector feature"),
        }
    }
}

/// What to do once a sub-derivation aimed at completing some selector's
/// target category becomes ready.
#[derive(Clone)]
enum Continuation {
    /// This chain is a top-level attempt at the search's goal category.
    Top,
    Resume(Rc<ResumeFrame>),
}

struct ResumeFrame {
    /// The outer chain, already advanced past the selector that spawned this
    /// sub-search.
    outer: Chain,
    variant: SelectorVariant,
    next: Continuation,
}

fn cont_key(cont: &Continuation) -> usize {
    match cont {
        Continuation::Top => 0,
        Continuation::Resume(frame) => Rc::as_ptr(frame) as usize,
    }
}

fn fingerprint(chain: &Chain, cont: &Continuation) -> String {
    let mut movers: Vec<String> = chain
        .movers
        .iter()
        .map(|(k, m)| format!("{k}:{}", crate::feature::display_features(&m.remaining)))
        .collect();
    movers.sort();
    format!(
        "{}|{}|{}",
        cont_key(cont),
        crate::feature::display_features(&chain.remaining),
        movers.join(",")
    )
}

struct Job {
    chain: Chain,
    cont: Continuation,
    fp: String,
}

impl PartialEq for Job {
    fn eq(&self, other: &Self) -> bool {
        self.chain.log_prob == other.chain.log_prob
            && self.chain.steps == other.chain.steps
            && self.fp == other.fp
    }
}
impl Eq for Job {}

impl PartialOrd for Job {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Job {
    fn cmp(&self, other: &Self) -> Ordering {
        self.chain
            .log_prob
            .partial_cmp(&other.chain.log_prob)
            .unwrap_or(Ordering::Equal)
            .then_with(|| other.chain.steps.cmp(&self.chain.steps))
            .then_with(|| other.fp.cmp(&self.fp))
    }
}

/// A finished derivation: a constituent tree, its accumulated log-probability,
/// and the number of Merge/Move steps it took.
pub struct Completed {
    pub node: Rc<Node>,
    pub log_prob: f64,
    pub steps: u32,
    pub peak_movers: usize,
}

/// Hard backstop on total heap pops, independent of `SearchConfig`. Every
/// real step strictly lowers `log_prob` as long as `0 < move_prob < 1`; this
/// guards the degenerate `move_prob` values at the boundary.
const POP_LIMIT: usize = 200_000;

/// Run the shared beam search toward `goal`, returning completed derivations
/// in non-increasing log-probability order.
pub fn search(lexicon: &Lexicon, goal: &str, cfg: &SearchConfig) -> Vec<Completed> {
    search_filtered(lexicon, goal, cfg, &|_| true)
}

/// Run the shared beam search toward `goal`, but only count a completed
/// derivation against `cfg.max_strings` if `accept` holds for it; derivations
/// `accept` rejects are dropped rather than returned.
///
/// Parsing (match a target string), generation (match anything), and
/// continuation lookup (match a prefix) differ only in this predicate. Plain
/// [`search`] stops once it has `cfg.max_strings` completions regardless of
/// what they are, which lets unrelated high-probability derivations exhaust
/// the bound before a low-probability match is ever reached; gating the
/// bound on `accept` instead means the search keeps exploring — within
/// `cfg`'s other limits and [`POP_LIMIT`] — until it finds enough derivations
/// that actually matter to the caller.
pub fn search_filtered(
    lexicon: &Lexicon,
    goal: &str,
    cfg: &SearchConfig,
    accept: &dyn Fn(&Completed) -> bool,
) -> Vec<Completed> {
    let mut heap: BinaryHeap<Job> = BinaryHeap::new();
    let mut seen: HashMap<(usize, String), f64> = HashMap::new();
    let mut results = Vec::new();
    let mut trace_counter: u32 = 0;

    seed(lexicon, goal, Continuation::Top, cfg, &mut heap, &mut seen);

    let mut pops = 0usize;
    while let Some(job) = heap.pop() {
        if results.len() >= cfg.max_strings {
            break;
        }
        pops += 1;
        if pops > POP_LIMIT {
            log::warn!("search for category '{goal}' hit the hard pop limit, stopping early");
            break;
        }
        step(
            lexicon,
            job,
            cfg,
            &mut heap,
            &mut seen,
            &mut results,
            &mut trace_counter,
            accept,
        );
    }

    results
}

fn seed(
    lexicon: &Lexicon,
    category: &str,
    cont: Continuation,
    cfg: &SearchConfig,
    heap: &mut BinaryHeap<Job>,
    seen: &mut HashMap<(usize, String), f64>,
) {
    for &idx in lexicon.items_with_category(category) {
        let chain = Chain::fresh(&lexicon.items()[idx]);
        push_job(heap, seen, chain, cont.clone(), cfg);
    }
}

fn push_job(
    heap: &mut BinaryHeap<Job>,
    seen: &mut HashMap<(usize, String), f64>,
    chain: Chain,
    cont: Continuation,
    cfg: &SearchConfig,
) {
    if chain.log_prob < cfg.min_log_prob || chain.steps > cfg.max_steps {
        return;
    }
    let key = (cont_key(&cont), fingerprint(&chain, &cont));
    if let Some(&best) = seen.get(&key) {
        if chain.log_prob <= best {
            return;
        }
    }
    seen.insert(key.clone(), chain.log_prob);
    heap.push(Job {
        chain,
        cont,
        fp: key.1,
    });

    let slack = cfg.n_beams.saturating_mul(4).max(16);
    if heap.len() > slack {
        let mut entries: Vec<Job> = std::mem::take(heap).into_vec();
        entries.sort();
        entries.reverse();
        entries.truncate(cfg.n_beams);
        *heap = BinaryHeap::from(entries);
    }
}

fn step(
    lexicon: &Lexicon,
    job: Job,
    cfg: &SearchConfig,
    heap: &mut BinaryHeap<Job>,
    seen: &mut HashMap<(usize, String), f64>,
    results: &mut Vec<Completed>,
    trace_counter: &mut u32,
    accept: &dyn Fn(&Completed) -> bool,
) {
    let Job { chain, cont, .. } = job;
    let front = chain.remaining[0].clone();
    match front {
        Feature::Category(_) => match cont {
            Continuation::Top => {
                if chain.remaining.len() == 1 && chain.movers.is_empty() {
                    let completed = Completed {
                        node: chain.node,
                        log_prob: chain.log_prob,
                        steps: chain.steps,
                        peak_movers: chain.peak_movers,
                    };
                    if accept(&completed) {
                        results.push(completed);
                    }
                }
            }
            Continuation::Resume(frame) => {
                if let Some(merged) = merge(&frame, chain, trace_counter) {
                    let next = frame.next.clone();
                    push_job(heap, seen, merged, next, cfg);
                }
            }
        },
        Feature::Selector(_)
        | Feature::LeftSelector(_)
        | Feature::RightAffixSelector(_)
        | Feature::LeftAffixSelector(_) => {
            let target = front.name().to_string();
            let variant = SelectorVariant::of(&front);
            let outer = Chain {
                remaining: chain.remaining[1..].to_vec(),
                node: chain.node,
                head: chain.head,
                movers: chain.movers,
                log_prob: chain.log_prob + (1.0 - cfg.move_prob).ln(),
                steps: chain.steps + 1,
                peak_movers: chain.peak_movers,
            };
            let resume = Continuation::Resume(Rc::new(ResumeFrame {
                outer,
                variant,
                next: cont,
            }));
            seed(lexicon, &target, resume, cfg, heap, seen);
        }
        Feature::Licensor(x) => {
            let Some(mover) = chain.movers.get(&x).cloned() else {
                return;
            };
            let mut new_movers = chain.movers.clone();
            new_movers.remove(&x);
            let trailing = if mover.remaining.len() > 1 {
                mover.remaining[1..].to_vec()
            } else {
                Vec::new()
            };
            match trailing.first() {
                Some(Feature::Licensee(z)) => {
                    if new_movers.contains_key(z) {
                        return;
                    }
                    new_movers.insert(
                        z.clone(),
                        Mover {
                            remaining: trailing,
                            node: mover.node.clone(),
                            trace_id: mover.trace_id,
                        },
                    );
                }
                Some(_) => return,
                None => {}
            }
            let new_remaining = chain.remaining[1..].to_vec();
            let peak_movers = chain.peak_movers.max(new_movers.len());
            let new_chain = Chain {
                node: Rc::new(Node::Move {
                    specifier: mover.node,
                    base: chain.node,
                    trace_id: mover.trace_id,
                    label: crate::feature::display_features(&new_remaining),
                }),
                remaining: new_remaining,
                head: chain.head,
                movers: new_movers,
                log_prob: chain.log_prob + cfg.move_prob.ln(),
                steps: chain.steps + 1,
                peak_movers,
            };
            push_job(heap, seen, new_chain, cont, cfg);
        }
        Feature::Licensee(_) => {
            // A bare licensee can never lead a live chain's feature list;
            // this path is unreachable for any well-formed lexicon.
        }
    }
}

/// Merge a ready complement/specifier candidate (`inner`) into the outer
/// chain captured by `frame`, branching and fusing per `frame.variant`.
fn merge(frame: &ResumeFrame, inner: Chain, trace_counter: &mut u32) -> Option<Chain> {
    let trailing = inner.remaining[1..].to_vec();

    let mut movers = frame.outer.movers.clone();
    for (k, v) in inner.movers.iter() {
        if movers.contains_key(k) {
            return None;
        }
        movers.insert(k.clone(), v.clone());
    }

    let branch = match trailing.first() {
        None => inner.node.clone(),
        Some(Feature::Licensee(z)) => {
            if movers.contains_key(z) {
                return None;
            }
            let trace_id = *trace_counter;
            *trace_counter += 1;
            movers.insert(
                z.clone(),
                Mover {
                    remaining: trailing,
                    node: inner.node.clone(),
                    trace_id,
                },
            );
            Rc::new(Node::Trace(trace_id))
        }
        Some(_) => return None,
    };

    let label = crate::feature::display_features(&frame.outer.remaining);
    let (node, head) = match frame.variant {
        SelectorVariant::Bare => (
            Rc::new(Node::Merge {
                left: frame.outer.node.clone(),
                right: branch,
                label,
            }),
            frame.outer.head.clone(),
        ),
        SelectorVariant::Left => (
            Rc::new(Node::Merge {
                left: branch,
                right: frame.outer.node.clone(),
                label,
            }),
            frame.outer.head.clone(),
        ),
        SelectorVariant::RightAffix | SelectorVariant::LeftAffix => {
            let outer_item = frame.outer.head.leaf_item().clone();
            let inner_item = inner.head.leaf_item().clone();
            let fused_form = if frame.variant == SelectorVariant::RightAffix {
                format!("{}-{}", inner_item.form, outer_item.form)
            } else {
                format!("{}-{}", outer_item.form, inner_item.form)
            };
            let fused = crate::lexical_item::LexicalItem::new(fused_form, outer_item.features.clone());
            let fusion_id = *trace_counter;
            *trace_counter += 1;
            let fused_leaf = Node::fused_leaf(fused, fusion_id);
            let grey_branch = silence(&branch, &inner.head, fusion_id);
            let node = if frame.variant == SelectorVariant::RightAffix {
                Rc::new(Node::Merge {
                    left: fused_leaf.clone(),
                    right: grey_branch,
                    label,
                })
            } else {
                Rc::new(Node::Merge {
                    left: grey_branch,
                    right: fused_leaf.clone(),
                    label,
                })
            };
            (node, fused_leaf)
        }
    };

    let peak_movers = frame
        .outer
        .peak_movers
        .max(inner.peak_movers)
        .max(movers.len());

    Some(Chain {
        remaining: frame.outer.remaining.clone(),
        node,
        head,
        movers,
        log_prob: frame.outer.log_prob + inner.log_prob,
        steps: frame.outer.steps + inner.steps,
        peak_movers,
    })
}
