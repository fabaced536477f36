//! Arena-backed tri-state checkbox tree.
//!
//! Nodes live in one `Vec`; parent and child links are indices into it. Node 0 is always the
//! select-all root. Leaves point at the popup item they represent, and that item, not the
//! tree, is what the commit step reads: the tree is a view whose inner nodes only ever hold
//! the consensus of their children.
//!
//! Every state change goes through [`DateTree::set_checked`], which cascades a definite value
//! down to descendants and then recomputes the ancestor chain. An indeterminate value never
//! cascades downward.

use crate::error::FilterError;
use crate::models::PopupItem;

/// Index of a node in its tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub usize);

impl NodeId {
    pub const ROOT: NodeId = NodeId(0);
}

pub const ROOT_LEVEL: i32 = 0;
pub const BLANK_LEVEL: i32 = -1;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeNode {
    /// 0 for the root, 1 for the top unit (year), -1 for the blank bucket
    pub level: i32,
    /// Grouping key at this level: year, month, day, hours...
    pub content: i64,
    pub label: String,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
    /// Popup item a leaf stands for
    pub item: Option<usize>,
    checked: Option<bool>,
    initial: Option<bool>,
}

impl TreeNode {
    pub(crate) fn new(level: i32, content: i64, label: impl Into<String>, parent: Option<NodeId>) -> Self {
        Self {
            level,
            content,
            label: label.into(),
            parent,
            children: Vec::new(),
            item: None,
            checked: Some(true),
            initial: Some(true),
        }
    }

    /// `None` is the indeterminate state
    pub fn is_checked(&self) -> Option<bool> {
        self.checked
    }

    pub fn is_changed(&self) -> bool {
        self.checked != self.initial
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

/// Consensus of child states: all true, all false, or indeterminate
pub fn consensus(states: impl IntoIterator<Item = Option<bool>>) -> Option<bool> {
    let mut states = states.into_iter();
    let first = states.next()?;
    first?;
    for state in states {
        if state != first {
            return None;
        }
    }
    first
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateTree {
    nodes: Vec<TreeNode>,
}

impl DateTree {
    /// A tree holding only the select-all root
    pub fn with_root(label: impl Into<String>) -> Self {
        Self { nodes: vec![TreeNode::new(ROOT_LEVEL, 0, label, None)] }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Root-only trees count as empty
    pub fn is_empty(&self) -> bool {
        self.nodes.len() <= 1
    }

    pub fn node(&self, id: NodeId) -> Option<&TreeNode> {
        self.nodes.get(id.0)
    }

    pub fn root(&self) -> &TreeNode {
        &self.nodes[NodeId::ROOT.0]
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.nodes.get(id.0).map(|n| n.children.as_slice()).unwrap_or(&[])
    }

    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &TreeNode)> {
        self.nodes.iter().enumerate().map(|(idx, node)| (NodeId(idx), node))
    }

    /// Popup items linked from the tree, in tree order
    pub fn linked_items(&self) -> Vec<usize> {
        self.nodes.iter().filter_map(|n| n.item).collect()
    }

    /// Node standing for a popup item
    pub fn node_for_item(&self, item: usize) -> Option<NodeId> {
        self.nodes.iter().position(|n| n.item == Some(item)).map(NodeId)
    }

    /// Find a child by grouping key
    pub fn child_by_content(&self, parent: NodeId, content: i64) -> Option<NodeId> {
        self.children(parent).iter().copied().find(|c| self.nodes[c.0].content == content)
    }

    /// Depth-first walk from the root with each node's depth, for rendering
    pub fn walk(&self) -> Vec<(usize, NodeId)> {
        let mut out = Vec::with_capacity(self.nodes.len());
        let mut stack = vec![(0, NodeId::ROOT)];
        while let Some((depth, id)) = stack.pop() {
            out.push((depth, id));
            for child in self.children(id).iter().rev() {
                stack.push((depth + 1, *child));
            }
        }
        out
    }

    pub(crate) fn push(&mut self, node: TreeNode) -> NodeId {
        let id = NodeId(self.nodes.len());
        if let Some(parent) = node.parent {
            self.nodes[parent.0].children.push(id);
        }
        self.nodes.push(node);
        id
    }

    pub(crate) fn link_leaf(&mut self, id: NodeId, item: usize, checked: bool) {
        let node = &mut self.nodes[id.0];
        node.item = Some(item);
        node.checked = Some(checked);
        node.initial = Some(checked);
    }

    /// Derive every inner node's state from its children and take the result as the
    /// build-time state.
    pub(crate) fn verify_checked_state(&mut self) {
        // Children are always pushed after their parent, so a reverse sweep is bottom-up
        for idx in (0..self.nodes.len()).rev() {
            if self.nodes[idx].children.is_empty() {
                continue;
            }
            let state = self.consensus_of(NodeId(idx));
            let node = &mut self.nodes[idx];
            node.checked = state;
            node.initial = state;
        }
    }

    /// Set a node's state and propagate it through the tree and onto linked popup items
    pub fn set_checked(
        &mut self,
        id: NodeId,
        value: Option<bool>,
        items: &mut [PopupItem],
    ) -> Result<(), FilterError> {
        let node = self.nodes.get(id.0).ok_or(FilterError::NodeOutOfRange(id.0))?;
        if node.checked == value {
            return Ok(());
        }

        self.apply_state(id, value, items);

        if id == NodeId::ROOT {
            if value.is_some() {
                for idx in 1..self.nodes.len() {
                    self.apply_state(NodeId(idx), value, items);
                }
            }
            return Ok(());
        }

        if let Some(checked) = value {
            self.cascade_to_descendants(id, checked, items);
        }
        self.recompute_ancestors(id, items);
        Ok(())
    }

    /// Push a definite state down to every descendant of `id`
    pub fn cascade_to_descendants(&mut self, id: NodeId, checked: bool, items: &mut [PopupItem]) {
        let mut stack: Vec<NodeId> = self.children(id).to_vec();
        while let Some(child) = stack.pop() {
            self.apply_state(child, Some(checked), items);
            stack.extend_from_slice(&self.nodes[child.0].children);
        }
    }

    /// Re-derive each ancestor of `id` from its direct children, stopping at the first
    /// ancestor whose state does not change
    pub fn recompute_ancestors(&mut self, id: NodeId, items: &mut [PopupItem]) {
        let mut current = self.nodes.get(id.0).and_then(|n| n.parent);
        while let Some(parent) = current {
            let state = self.consensus_of(parent);
            if self.nodes[parent.0].checked == state {
                break;
            }
            self.apply_state(parent, state, items);
            current = self.nodes[parent.0].parent;
        }
    }

    fn consensus_of(&self, id: NodeId) -> Option<bool> {
        consensus(self.nodes[id.0].children.iter().map(|c| self.nodes[c.0].checked))
    }

    fn apply_state(&mut self, id: NodeId, value: Option<bool>, items: &mut [PopupItem]) {
        let node = &mut self.nodes[id.0];
        node.checked = value;
        if let (Some(item), Some(checked)) = (node.item, value) {
            if let Some(item) = items.get_mut(item) {
                item.set_checked(checked);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::FilterValue;

    /// root -> one year -> two months -> three days each
    fn sample() -> (DateTree, Vec<PopupItem>) {
        let mut tree = DateTree::with_root("(Select all)");
        let mut items = vec![PopupItem::select_all("(Select all)")];
        let year = tree.push(TreeNode::new(1, 2023, "2023", Some(NodeId::ROOT)));
        for month in 1..=2 {
            let month_id = tree.push(TreeNode::new(2, month, month.to_string(), Some(year)));
            for day in 1..=3 {
                items.push(PopupItem::value(FilterValue::Integer(month * 100 + day), "", true));
                let day_id = tree.push(TreeNode::new(3, day, day.to_string(), Some(month_id)));
                tree.link_leaf(day_id, items.len() - 1, true);
            }
        }
        tree.verify_checked_state();
        (tree, items)
    }

    fn year(tree: &DateTree) -> NodeId {
        tree.children(NodeId::ROOT)[0]
    }

    fn month(tree: &DateTree, idx: usize) -> NodeId {
        tree.children(year(tree))[idx]
    }

    fn state(tree: &DateTree, id: NodeId) -> Option<bool> {
        tree.node(id).unwrap().is_checked()
    }

    #[test]
    fn test_consensus_rules() {
        assert_eq!(consensus([Some(true), Some(true)]), Some(true));
        assert_eq!(consensus([Some(true), Some(false)]), None);
        assert_eq!(consensus([Some(false), Some(false)]), Some(false));
        assert_eq!(consensus([Some(true), None, Some(true)]), None);
        assert_eq!(consensus([None]), None);
    }

    #[test]
    fn test_consensus_all_permutations_up_to_five_children() {
        for len in 2..=5u32 {
            for mask in 0..(1u32 << len) {
                let states: Vec<Option<bool>> = (0..len).map(|bit| Some(mask & (1 << bit) != 0)).collect();
                let expected = if mask == 0 {
                    Some(false)
                } else if mask == (1 << len) - 1 {
                    Some(true)
                } else {
                    None
                };
                assert_eq!(consensus(states), expected, "len {} mask {:b}", len, mask);
            }
        }
    }

    #[test]
    fn test_unchecking_one_day_makes_ancestors_indeterminate() {
        let (mut tree, mut items) = sample();
        let first_day = tree.children(month(&tree, 0))[0];

        tree.set_checked(first_day, Some(false), &mut items).unwrap();

        assert_eq!(state(&tree, month(&tree, 0)), None);
        assert_eq!(state(&tree, year(&tree)), None);
        assert_eq!(state(&tree, NodeId::ROOT), None);
        assert_eq!(state(&tree, month(&tree, 1)), Some(true));
        assert!(!items[1].is_checked());
        assert!(items[1].is_changed());
    }

    #[test]
    fn test_unchecking_all_days_of_a_month() {
        let (mut tree, mut items) = sample();
        let days: Vec<NodeId> = tree.children(month(&tree, 0)).to_vec();

        for day in days {
            tree.set_checked(day, Some(false), &mut items).unwrap();
        }

        assert_eq!(state(&tree, month(&tree, 0)), Some(false));
        assert_eq!(state(&tree, year(&tree)), None);
        assert_eq!(state(&tree, month(&tree, 1)), Some(true));
    }

    #[test]
    fn test_toggling_year_cascades_to_leaves_and_items() {
        let (mut tree, mut items) = sample();
        let year = year(&tree);

        tree.set_checked(year, Some(false), &mut items).unwrap();

        assert!(items.iter().skip(1).all(|i| !i.is_checked()));
        assert_eq!(state(&tree, month(&tree, 1)), Some(false));
        assert_eq!(state(&tree, NodeId::ROOT), Some(false));
    }

    #[test]
    fn test_indeterminate_does_not_cascade_down() {
        let (mut tree, mut items) = sample();
        let year = year(&tree);

        tree.set_checked(year, None, &mut items).unwrap();

        assert_eq!(state(&tree, year), None);
        assert_eq!(state(&tree, month(&tree, 0)), Some(true));
        assert!(items.iter().all(|i| i.is_checked()));
    }

    #[test]
    fn test_root_toggle_reaches_every_node() {
        let (mut tree, mut items) = sample();

        tree.set_checked(NodeId::ROOT, Some(false), &mut items).unwrap();
        assert!(tree.nodes().all(|(_, n)| n.is_checked() == Some(false)));
        assert!(items.iter().skip(1).all(|i| !i.is_checked()));

        tree.set_checked(NodeId::ROOT, Some(true), &mut items).unwrap();
        assert!(tree.nodes().all(|(_, n)| n.is_checked() == Some(true)));
        assert!(items.iter().all(|i| !i.is_changed()));
    }

    #[test]
    fn test_rechecking_restores_consensus() {
        let (mut tree, mut items) = sample();
        let day = tree.children(month(&tree, 1))[2];

        tree.set_checked(day, Some(false), &mut items).unwrap();
        tree.set_checked(day, Some(true), &mut items).unwrap();

        assert_eq!(state(&tree, NodeId::ROOT), Some(true));
        assert!(tree.nodes().all(|(_, n)| !n.is_changed()));
    }

    #[test]
    fn test_verify_demotes_parents_with_unchecked_leaves() {
        let mut tree = DateTree::with_root("all");
        let mut items = vec![PopupItem::select_all("all")];
        let year = tree.push(TreeNode::new(1, 2024, "2024", Some(NodeId::ROOT)));
        for (day, checked) in [(1, false), (2, false)] {
            items.push(PopupItem::value(FilterValue::Integer(day), "", checked));
            let id = tree.push(TreeNode::new(2, day, day.to_string(), Some(year)));
            tree.link_leaf(id, items.len() - 1, checked);
        }

        tree.verify_checked_state();

        assert_eq!(state(&tree, year), Some(false));
        assert_eq!(state(&tree, NodeId::ROOT), Some(false));
        assert!(!tree.node(year).unwrap().is_changed());
    }

    #[test]
    fn test_set_checked_out_of_range() {
        let (mut tree, mut items) = sample();
        assert_eq!(
            tree.set_checked(NodeId(999), Some(true), &mut items),
            Err(FilterError::NodeOutOfRange(999))
        );
    }

    #[test]
    fn test_walk_is_depth_first() {
        let (tree, _) = sample();
        let walk = tree.walk();
        assert_eq!(walk.len(), tree.len());
        assert_eq!(walk[0], (0, NodeId::ROOT));
        assert_eq!(walk[1].0, 1);
        assert_eq!(walk[2].0, 2);
        assert_eq!(walk[3].0, 3);
    }
}
