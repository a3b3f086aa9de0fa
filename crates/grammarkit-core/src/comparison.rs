//! Partial-order resolution over named nodes.
//!
//! Nodes carry optional integer weights and pairwise relations (`<`, `=`, `>`).
//! `compare` resolves two nodes through weights first, then direct arcs, then by
//! walking relation arcs towards something comparable. Anything unresolved is
//! `Equal`, so sorting falls back to insertion order for unrelated nodes.

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use std::hash::Hash;

use indexmap::{IndexMap, IndexSet};

#[derive(Debug, Clone)]
pub struct ComparisonGraph<N> {
    nodes: IndexSet<N>,
    weights: HashMap<N, i64>,
    arcs: HashMap<N, IndexMap<N, Ordering>>,
}

impl<N: Clone + Eq + Hash> Default for ComparisonGraph<N> {
    fn default() -> Self {
        Self {
            nodes: IndexSet::new(),
            weights: HashMap::new(),
            arcs: HashMap::new(),
        }
    }
}

impl<N: Clone + Eq + Hash> ComparisonGraph<N> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a node. Sorting order for ties is registration order.
    pub fn add_node(&mut self, node: N) {
        self.nodes.insert(node);
    }

    pub fn nodes(&self) -> impl Iterator<Item = &N> {
        self.nodes.iter()
    }

    pub fn set_weight(&mut self, node: N, weight: i64) {
        self.nodes.insert(node.clone());
        self.weights.insert(node, weight);
    }

    pub fn weight(&self, node: &N) -> Option<i64> {
        self.weights.get(node).copied()
    }

    /// Records `a <relation> b` and the inverse `b <reversed> a`.
    ///
    /// Neither endpoint is registered as a sortable node.
    pub fn connect(&mut self, a: N, b: N, relation: Ordering) {
        self.arcs
            .entry(b.clone())
            .or_default()
            .insert(a.clone(), relation.reverse());
        self.arcs.entry(a).or_default().insert(b, relation);
    }

    pub fn relation(&self, a: &N, b: &N) -> Option<Ordering> {
        self.arcs.get(a).and_then(|arcs| arcs.get(b)).copied()
    }

    pub fn compare(&self, a: &N, b: &N) -> Ordering {
        if a == b {
            return Ordering::Equal;
        }
        self.resolve_from(a, b)
            .or_else(|| self.resolve_from(b, a).map(Ordering::reverse))
            .unwrap_or(Ordering::Equal)
    }

    fn resolve_from(&self, a: &N, b: &N) -> Option<Ordering> {
        let mut visited = HashSet::from([a.clone()]);
        self.resolve(a, b, &mut visited)
    }

    fn resolve(&self, a: &N, b: &N, visited: &mut HashSet<N>) -> Option<Ordering> {
        if let (Some(wa), Some(wb)) = (self.weights.get(a), self.weights.get(b)) {
            return Some(wa.cmp(wb));
        }
        if let Some(relation) = self.relation(a, b) {
            return Some(relation);
        }

        let arcs = self.arcs.get(a)?;
        for (via, relation) in arcs {
            if !visited.insert(via.clone()) {
                continue;
            }
            let Some(rest) = self.resolve(via, b, visited) else {
                continue;
            };
            match (relation, rest) {
                (Ordering::Equal, rest) => return Some(rest),
                (Ordering::Less, Ordering::Less | Ordering::Equal) => return Some(Ordering::Less),
                (Ordering::Greater, Ordering::Greater | Ordering::Equal) => {
                    return Some(Ordering::Greater);
                }
                _ => {}
            }
        }
        None
    }

    /// All registered nodes, ordered by `compare` (descending when `reversed`).
    pub fn sorted(&self, reversed: bool) -> Vec<N> {
        let nodes: Vec<N> = self.nodes.iter().cloned().collect();
        self.sort(nodes, reversed)
    }

    /// Stable sort of `nodes` by `compare`.
    ///
    /// Repeatedly takes the first remaining node that no other remaining node
    /// must precede. Unrelated nodes keep their input order. On a cycle the
    /// first remaining node is taken. `compare` need not be a total order, so
    /// the standard library sorts are not an option.
    ///
    /// Each pair is compared once up front.
    pub fn sort(&self, nodes: Vec<N>, reversed: bool) -> Vec<N> {
        let n = nodes.len();
        let mut successors: Vec<Vec<usize>> = vec![Vec::new(); n];
        let mut blockers = vec![0usize; n];
        for (i, x) in nodes.iter().enumerate() {
            for (j, y) in nodes.iter().enumerate() {
                if x == y {
                    continue;
                }
                let ord = self.compare(x, y);
                let first = if reversed {
                    ord == Ordering::Greater
                } else {
                    ord == Ordering::Less
                };
                if first {
                    successors[i].push(j);
                    blockers[j] += 1;
                }
            }
        }

        let mut slots: Vec<Option<N>> = nodes.into_iter().map(Some).collect();
        let mut out = Vec::with_capacity(n);
        while out.len() < n {
            let ready = (0..n).find(|&i| slots[i].is_some() && blockers[i] == 0);
            let Some(pick) = ready.or_else(|| (0..n).find(|&i| slots[i].is_some())) else {
                break;
            };
            for &j in &successors[pick] {
                blockers[j] = blockers[j].saturating_sub(1);
            }
            out.extend(slots[pick].take());
        }
        out
    }

    /// Pairs of registered nodes whose relative order is contradictory.
    ///
    /// A pair conflicts when each node is strictly below the other through
    /// relation arcs (a cycle), or when resolving the pair from either end
    /// disagrees. The sort order of conflicting nodes depends on registration
    /// order.
    pub fn conflicts(&self) -> Vec<(N, N)> {
        let mut out = Vec::new();
        for (i, a) in self.nodes.iter().enumerate() {
            for b in self.nodes.iter().skip(i + 1) {
                let cyclic = self.strictly_below(a, b) && self.strictly_below(b, a);
                let forward = self.resolve_from(a, b);
                let backward = self.resolve_from(b, a);
                let asymmetric =
                    matches!((forward, backward), (Some(f), Some(r)) if f != r.reverse());
                if cyclic || asymmetric {
                    out.push((a.clone(), b.clone()));
                }
            }
        }
        out
    }

    /// Whether `b` is reachable from `a` over `<`/`=` arcs with at least one `<`.
    fn strictly_below(&self, a: &N, b: &N) -> bool {
        let mut stack = vec![(a.clone(), false)];
        let mut seen = HashSet::new();
        while let Some((node, strict)) = stack.pop() {
            if !seen.insert((node.clone(), strict)) {
                continue;
            }
            let Some(arcs) = self.arcs.get(&node) else {
                continue;
            };
            for (next, relation) in arcs {
                let strict = match relation {
                    Ordering::Less => true,
                    Ordering::Equal => strict,
                    Ordering::Greater => continue,
                };
                if next == b && strict {
                    return true;
                }
                stack.push((next.clone(), strict));
            }
        }
        false
    }
}
