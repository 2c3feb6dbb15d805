//! Arena-backed tree of timed compilation phases

use std::time::{Duration, Instant};

/// Index of a phase inside its [`PhaseTree`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PhaseId(usize);

impl PhaseId {
    pub const ROOT: PhaseId = PhaseId(0);

    pub fn index(self) -> usize {
        self.0
    }
}

/// A single named phase
#[derive(Debug, Clone)]
pub struct PhaseNode {
    pub name: String,
    pub start: Instant,
    /// Set once the phase has been closed
    pub end: Option<Instant>,
    /// Sub-phases in the order they were started
    pub children: Vec<PhaseId>,
}

impl PhaseNode {
    fn new(name: String, start: Instant) -> Self {
        Self {
            name,
            start,
            end: None,
            children: Vec::new(),
        }
    }

    pub fn is_closed(&self) -> bool {
        self.end.is_some()
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Wall-clock span of the phase; zero while it is still open
    pub fn elapsed(&self) -> Duration {
        self.end
            .map(|end| end.saturating_duration_since(self.start))
            .unwrap_or(Duration::ZERO)
    }
}

/// Phases of one compilation, owned in a flat arena.
///
/// The root always lives at [`PhaseId::ROOT`]; every other node is owned by
/// exactly one parent through that parent's `children` list.
#[derive(Debug, Clone)]
pub struct PhaseTree {
    nodes: Vec<PhaseNode>,
}

impl PhaseTree {
    pub fn new(root_name: impl Into<String>, start: Instant) -> Self {
        Self {
            nodes: vec![PhaseNode::new(root_name.into(), start)],
        }
    }

    /// Append a new phase as the last child of `parent`
    pub fn push_child(
        &mut self,
        parent: PhaseId,
        name: impl Into<String>,
        start: Instant,
    ) -> PhaseId {
        let id = PhaseId(self.nodes.len());
        self.nodes.push(PhaseNode::new(name.into(), start));
        self.nodes[parent.0].children.push(id);
        id
    }

    pub fn close(&mut self, id: PhaseId, end: Instant) {
        self.nodes[id.0].end = Some(end);
    }

    pub fn root(&self) -> &PhaseNode {
        &self.nodes[PhaseId::ROOT.0]
    }

    pub fn node(&self, id: PhaseId) -> &PhaseNode {
        &self.nodes[id.0]
    }

    pub fn children(&self, id: PhaseId) -> &[PhaseId] {
        &self.nodes[id.0].children
    }

    /// Span of `id` in whole microseconds (truncated)
    pub fn duration_us(&self, id: PhaseId) -> u64 {
        u64::try_from(self.nodes[id.0].elapsed().as_micros()).unwrap_or(u64::MAX)
    }

    /// Sum of the spans of the direct children of `id`, saturating at
    /// `u64::MAX`
    pub fn children_total_us(&self, id: PhaseId) -> u64 {
        self.children(id)
            .iter()
            .map(|&child| self.duration_us(child))
            .fold(0, u64::saturating_add)
    }

    /// True once every phase has been closed
    pub fn is_complete(&self) -> bool {
        self.nodes.iter().all(PhaseNode::is_closed)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Depth-first pre-order walk yielding `(depth, id)`, visiting
    /// children in start order
    pub fn preorder(&self) -> Vec<(usize, PhaseId)> {
        let mut order = Vec::with_capacity(self.nodes.len());
        let mut pending = vec![(0, PhaseId::ROOT)];

        while let Some((depth, id)) = pending.pop() {
            order.push((depth, id));
            for &child in self.children(id).iter().rev() {
                pending.push((depth + 1, child));
            }
        }

        order
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(base: Instant, ms: u64) -> Instant {
        base + Duration::from_millis(ms)
    }

    #[test]
    fn test_children_keep_start_order() {
        let base = Instant::now();
        let mut tree = PhaseTree::new("root", base);
        let a = tree.push_child(PhaseId::ROOT, "a", at(base, 1));
        let b = tree.push_child(PhaseId::ROOT, "b", at(base, 2));
        let a1 = tree.push_child(a, "a1", at(base, 3));

        assert_eq!(tree.children(PhaseId::ROOT), &[a, b]);
        assert_eq!(tree.children(a), &[a1]);
        assert!(tree.node(b).is_leaf());
        assert_eq!(tree.len(), 4);
    }

    #[test]
    fn test_durations() {
        let base = Instant::now();
        let mut tree = PhaseTree::new("root", base);
        let a = tree.push_child(PhaseId::ROOT, "a", at(base, 10));
        assert_eq!(tree.duration_us(a), 0);
        assert!(!tree.is_complete());

        tree.close(a, at(base, 30));
        tree.close(PhaseId::ROOT, at(base, 100));

        assert_eq!(tree.duration_us(a), 20_000);
        assert_eq!(tree.duration_us(PhaseId::ROOT), 100_000);
        assert_eq!(tree.children_total_us(PhaseId::ROOT), 20_000);
        assert!(tree.is_complete());
    }

    #[test]
    fn test_huge_spans_saturate() {
        let base = Instant::now();
        let huge = Duration::from_secs(1 << 45);
        let mut tree = PhaseTree::new("root", base);
        let a = tree.push_child(PhaseId::ROOT, "a", base);
        tree.close(a, base + huge);
        let b = tree.push_child(PhaseId::ROOT, "b", base + huge);
        tree.close(b, base + huge + huge);
        tree.close(PhaseId::ROOT, base + huge + huge);

        assert_eq!(tree.duration_us(a), u64::MAX);
        assert_eq!(tree.children_total_us(PhaseId::ROOT), u64::MAX);
    }

    #[test]
    fn test_preorder() {
        let base = Instant::now();
        let mut tree = PhaseTree::new("root", base);
        let a = tree.push_child(PhaseId::ROOT, "a", base);
        let a1 = tree.push_child(a, "a1", base);
        let a2 = tree.push_child(a, "a2", base);
        let b = tree.push_child(PhaseId::ROOT, "b", base);
        let b1 = tree.push_child(b, "b1", base);

        assert_eq!(
            tree.preorder(),
            vec![
                (0, PhaseId::ROOT),
                (1, a),
                (2, a1),
                (2, a2),
                (1, b),
                (2, b1),
            ]
        );
    }
}
