//! Window tree construction.
//!
//! Boundary nodes live in a keyed table (`NodeKey` -> `NodeId`) and are
//! merged by structural equality of their resolved endpoint expression,
//! no back-references, just a union-find over
//! node keys.

use std::collections::{BTreeMap, HashMap, VecDeque};

use cohort_types::predicate::{RECORD_END, RECORD_START};
use cohort_types::{ConfigError, Duration, EndpointExpr, Reference, Side, WindowSpec};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u32);

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum NodeKey {
    Trigger,
    Boundary(String, Side),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EdgeKind {
    Temporal { delta: Duration },
    /// `forward = true` is NEXT (search at/after the anchor); `false` is
    /// PREV (search at/before the anchor).
    EventBound { predicate: String, forward: bool },
}

/// One edge of the window tree: `parent` is the already-known anchor
/// timestamp, `child` is the boundary this edge computes. `window`/`side`
/// identify which window's boundary the child node represents.
///
/// `incl_left` is the inclusivity of the *parent* anchor, consulted by
/// `agg_event_bound` to decide whether a row exactly at the anchor is an
/// eligible self-match. The child boundary's own inclusivity isn't carried
/// on the edge: `has`-range evaluation reads it straight off the window's
/// `start_inclusive`/`end_inclusive` once all boundaries are resolved.
#[derive(Debug, Clone)]
pub struct TreeEdge {
    pub parent: NodeId,
    pub child: NodeId,
    pub kind: EdgeKind,
    pub incl_left: bool,
    pub window: String,
    pub side: Side,
}

#[derive(Debug)]
pub struct WindowTree {
    pub root: NodeId,
    /// Canonical node for every window boundary, after identity-merging.
    boundary_of: HashMap<(String, Side), NodeId>,
    /// Edges keyed by parent node id, in declaration order.
    pub children: HashMap<NodeId, Vec<TreeEdge>>,
}

impl WindowTree {
    pub fn node_for(&self, window: &str, side: Side) -> NodeId {
        self.boundary_of[&(window.to_string(), side)]
    }

    pub fn edges_from(&self, node: NodeId) -> &[TreeEdge] {
        self.children.get(&node).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Pre-order traversal of window *names*, visiting a window the first
    /// time either of its boundary nodes is reached as a tree edge's child.
    ///
    /// A window whose `start` and `end` are both IDENTITY references never
    /// owns a tree edge of its own — both sides collapse into a DSU union
    /// with another node — so it can't be discovered this way. `boundary_of`
    /// still carries an entry for every declared window regardless, so any
    /// name the traversal missed is appended afterward in name order.
    pub fn preorder_windows(&self) -> Vec<String> {
        let mut seen = std::collections::HashSet::new();
        let mut order = Vec::new();
        let mut stack = vec![self.root];
        while let Some(node) = stack.pop() {
            let mut edges = self.edges_from(node).to_vec();
            edges.reverse(); // preserve declaration order when popping a stack
            for edge in edges {
                if seen.insert(edge.window.clone()) {
                    order.push(edge.window.clone());
                }
                stack.push(edge.child);
            }
        }

        let mut remaining: Vec<String> = self
            .boundary_of
            .keys()
            .map(|(name, _)| name.clone())
            .filter(|name| seen.insert(name.clone()))
            .collect();
        remaining.sort();
        order.extend(remaining);

        order
    }
}

struct Dsu {
    parent: HashMap<NodeKey, NodeKey>,
}

impl Dsu {
    fn new() -> Self {
        Self {
            parent: HashMap::new(),
        }
    }

    fn find(&mut self, key: &NodeKey) -> NodeKey {
        if !self.parent.contains_key(key) {
            self.parent.insert(key.clone(), key.clone());
            return key.clone();
        }
        let p = self.parent[key].clone();
        if &p == key {
            return p;
        }
        let root = self.find(&p);
        self.parent.insert(key.clone(), root.clone());
        root
    }

    fn union(&mut self, a: &NodeKey, b: &NodeKey) {
        let ra = self.find(a);
        let rb = self.find(b);
        if ra != rb {
            self.parent.insert(ra, rb);
        }
    }
}

fn reference_key(r: &Reference) -> NodeKey {
    match r {
        Reference::Trigger => NodeKey::Trigger,
        Reference::WindowStart(name) => NodeKey::Boundary(name.clone(), Side::Start),
        Reference::WindowEnd(name) => NodeKey::Boundary(name.clone(), Side::End),
    }
}

/// Builds the window tree by resolving every window's `start`/`end`
/// expression independently: each becomes either a DSU union (IDENTITY), a
/// real edge from its reference's node (OFFSET/NEXT/PREV), or — for NULL —
/// a synthetic edge from the trigger using the always-once-per-subject
/// `_RECORD_START`/`_RECORD_END` predicate, which lands on the same row
/// regardless of search direction or anchor.
pub fn build(windows: &BTreeMap<String, WindowSpec>) -> Result<WindowTree, ConfigError> {
    let mut dsu = Dsu::new();
    let mut pending: Vec<(NodeKey, NodeKey, EdgeKind, bool, String, Side)> = Vec::new();

    for window in windows.values() {
        for side in [Side::Start, Side::End] {
            let expr = side_expr(window, side);
            let child_key = NodeKey::Boundary(window.name.clone(), side);

            match expr {
                EndpointExpr::Null(_) => {
                    // RECORD_START fires on the globally-first row, which is
                    // always at or before the trigger; RECORD_END fires on
                    // the globally-last row, always at or after it. Each is
                    // the unique match in its search direction.
                    let (predicate, forward) = if side == Side::End {
                        (RECORD_END, true)
                    } else {
                        (RECORD_START, false)
                    };
                    pending.push((
                        NodeKey::Trigger,
                        child_key,
                        EdgeKind::EventBound {
                            predicate: predicate.to_string(),
                            forward,
                        },
                        true,
                        window.name.clone(),
                        side,
                    ));
                }
                other => {
                    let reference = other.reference().cloned().expect("non-null has a reference");
                    record_edge(
                        &mut dsu,
                        &mut pending,
                        reference_key(&reference),
                        child_key,
                        other,
                        reference_inclusive(&reference, windows),
                        window.name.clone(),
                        side,
                    );
                }
            }
        }
    }

    assemble(dsu, pending, windows)
}

/// Whether the node a reference points at is itself an inclusive endpoint.
/// The trigger instant is always inclusive; a window boundary inherits that
/// window's own inclusivity flag for the side referenced.
fn reference_inclusive(reference: &Reference, windows: &BTreeMap<String, WindowSpec>) -> bool {
    match reference {
        Reference::Trigger => true,
        Reference::WindowStart(name) => windows.get(name).is_none_or(|w| w.start_inclusive),
        Reference::WindowEnd(name) => windows.get(name).is_none_or(|w| w.end_inclusive),
    }
}

fn record_edge(
    dsu: &mut Dsu,
    pending: &mut Vec<(NodeKey, NodeKey, EdgeKind, bool, String, Side)>,
    parent_key: NodeKey,
    child_key: NodeKey,
    expr: EndpointExpr,
    incl_left: bool,
    window: String,
    side: Side,
) {
    match expr {
        EndpointExpr::Identity(_) => dsu.union(&parent_key, &child_key),
        EndpointExpr::Offset(_, delta) => pending.push((
            parent_key,
            child_key,
            EdgeKind::Temporal { delta },
            incl_left,
            window,
            side,
        )),
        EndpointExpr::Next(_, predicate) => pending.push((
            parent_key,
            child_key,
            EdgeKind::EventBound {
                predicate,
                forward: true,
            },
            incl_left,
            window,
            side,
        )),
        EndpointExpr::Prev(_, predicate) => pending.push((
            parent_key,
            child_key,
            EdgeKind::EventBound {
                predicate,
                forward: false,
            },
            incl_left,
            window,
            side,
        )),
        EndpointExpr::Null(_) => unreachable!("NULL handled by caller"),
    }
}

fn side_expr(window: &WindowSpec, side: Side) -> EndpointExpr {
    match side {
        Side::Start => window.start_expr.clone(),
        Side::End => window.end_expr.clone(),
    }
}

fn assemble(
    mut dsu: Dsu,
    pending: Vec<(NodeKey, NodeKey, EdgeKind, bool, String, Side)>,
    windows: &BTreeMap<String, WindowSpec>,
) -> Result<WindowTree, ConfigError> {
    // Canonicalize every key that participates in an edge, and make sure
    // every window boundary (even ones only ever referenced, never a
    // pending-edge endpoint because they were unioned away) gets an id.
    let mut canon_to_id: HashMap<NodeKey, NodeId> = HashMap::new();
    let mut next_id = 0u32;
    let mut intern = |dsu: &mut Dsu, key: &NodeKey, canon_to_id: &mut HashMap<NodeKey, NodeId>, next_id: &mut u32| -> NodeId {
        let canon = dsu.find(key);
        if let Some(id) = canon_to_id.get(&canon) {
            *id
        } else {
            let id = NodeId(*next_id);
            *next_id += 1;
            canon_to_id.insert(canon, id);
            id
        }
    };

    let root = intern(&mut dsu, &NodeKey::Trigger, &mut canon_to_id, &mut next_id);

    let mut edges: Vec<TreeEdge> = Vec::new();
    for (parent_key, child_key, kind, incl_left, window, side) in pending {
        let parent = intern(&mut dsu, &parent_key, &mut canon_to_id, &mut next_id);
        let child = intern(&mut dsu, &child_key, &mut canon_to_id, &mut next_id);
        edges.push(TreeEdge {
            parent,
            child,
            kind,
            incl_left,
            window,
            side,
        });
    }

    // Every window boundary must resolve to some node id, even sides that
    // only ever appear as a DSU-union target.
    let mut boundary_of: HashMap<(String, Side), NodeId> = HashMap::new();
    for name in windows.keys() {
        for side in [Side::Start, Side::End] {
            let id = intern(
                &mut dsu,
                &NodeKey::Boundary(name.clone(), side),
                &mut canon_to_id,
                &mut next_id,
            );
            boundary_of.insert((name.clone(), side), id);
        }
    }

    let mut children: HashMap<NodeId, Vec<TreeEdge>> = HashMap::new();
    let mut parent_count: HashMap<NodeId, u32> = HashMap::new();
    for edge in edges {
        *parent_count.entry(edge.child).or_insert(0) += 1;
        children.entry(edge.parent).or_default().push(edge);
    }

    for (node, count) in &parent_count {
        if *count > 1 {
            return Err(ConfigError::NotATree(format!("node {:?}", node)));
        }
    }

    // Reachability from root: every node that appears anywhere (as a
    // parent or a child) must be reachable from root.
    let mut all_nodes: std::collections::HashSet<NodeId> = std::collections::HashSet::new();
    all_nodes.insert(root);
    for edges in children.values() {
        for e in edges {
            all_nodes.insert(e.parent);
            all_nodes.insert(e.child);
        }
    }
    for id in boundary_of.values() {
        all_nodes.insert(*id);
    }

    let mut visited = std::collections::HashSet::new();
    let mut queue = VecDeque::new();
    queue.push_back(root);
    visited.insert(root);
    while let Some(node) = queue.pop_front() {
        for edge in children.get(&node).map(Vec::as_slice).unwrap_or(&[]) {
            if visited.insert(edge.child) {
                queue.push_back(edge.child);
            }
        }
    }
    if visited.len() != all_nodes.len() {
        let missing = all_nodes.difference(&visited).next().copied();
        return Err(ConfigError::NotATree(format!(
            "unreachable node {:?}",
            missing
        )));
    }

    Ok(WindowTree {
        root,
        boundary_of,
        children,
    })
}
