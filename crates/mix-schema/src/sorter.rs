//! Schema-order sorting
//!
//! Reorders the children of every element in a tree so that siblings follow
//! the schema's declaration order. Sorting is stable: siblings with the same
//! rank (repeated names, or names the schema does not declare) keep their
//! relative input order.

use std::sync::Arc;

use mix_ir::Element;
use tracing::trace;

use crate::model::{SchemaElementOrder, UnknownPlacement};

/// Sorts element trees into schema declaration order
#[derive(Debug, Clone)]
pub struct SchemaOrderSorter {
    order: Arc<SchemaElementOrder>,
    placement: UnknownPlacement,
}

impl SchemaOrderSorter {
    /// Create a sorter that places undeclared names first
    pub fn new(order: impl Into<Arc<SchemaElementOrder>>) -> Self {
        Self::with_placement(order, UnknownPlacement::default())
    }

    /// Create a sorter with an explicit placement for undeclared names
    pub fn with_placement(
        order: impl Into<Arc<SchemaElementOrder>>,
        placement: UnknownPlacement,
    ) -> Self {
        Self {
            order: order.into(),
            placement,
        }
    }

    /// The element order this sorter applies
    #[must_use]
    pub fn order(&self) -> &SchemaElementOrder {
        &self.order
    }

    /// Where undeclared names are placed
    #[must_use]
    pub fn placement(&self) -> UnknownPlacement {
        self.placement
    }

    /// Recursively sort the children of `root` and of every descendant.
    ///
    /// Only sibling order changes; no element is added, removed or copied.
    pub fn fix_order(&self, root: &mut Element) {
        root.children
            .sort_by_key(|child| self.order.rank(&child.name, self.placement));
        trace!(element = %root.name, children = root.children.len(), "sorted children");

        for child in &mut root.children {
            self.fix_order(child);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(element: &Element) -> Vec<&str> {
        element.children.iter().map(|c| c.name.as_str()).collect()
    }

    fn sorter(placement: UnknownPlacement) -> SchemaOrderSorter {
        SchemaOrderSorter::with_placement(SchemaElementOrder::new(["A", "B", "C"]), placement)
    }

    #[test]
    fn test_fix_order_sorts_direct_children() {
        let mut root = Element::new("root")
            .with_child(Element::new("C"))
            .with_child(Element::new("A"))
            .with_child(Element::new("B"));

        sorter(UnknownPlacement::First).fix_order(&mut root);

        assert_eq!(names(&root), vec!["A", "B", "C"]);
    }

    #[test]
    fn test_fix_order_recurses() {
        let mut root = Element::new("root").with_child(
            Element::new("A")
                .with_child(
                    Element::new("C")
                        .with_child(Element::new("B"))
                        .with_child(Element::new("A")),
                )
                .with_child(Element::new("B")),
        );

        sorter(UnknownPlacement::First).fix_order(&mut root);

        let a = &root.children[0];
        assert_eq!(names(a), vec!["B", "C"]);
        assert_eq!(names(&a.children[1]), vec!["A", "B"]);
    }

    #[test]
    fn test_unknown_names_first_keep_input_order() {
        let mut root = Element::new("root")
            .with_child(Element::new("B"))
            .with_child(Element::new("y"))
            .with_child(Element::new("A"))
            .with_child(Element::new("x"));

        sorter(UnknownPlacement::First).fix_order(&mut root);

        assert_eq!(names(&root), vec!["y", "x", "A", "B"]);
    }

    #[test]
    fn test_unknown_names_last_keep_input_order() {
        let mut root = Element::new("root")
            .with_child(Element::new("y"))
            .with_child(Element::new("B"))
            .with_child(Element::new("x"))
            .with_child(Element::new("A"));

        sorter(UnknownPlacement::Last).fix_order(&mut root);

        assert_eq!(names(&root), vec!["A", "B", "y", "x"]);
    }

    #[test]
    fn test_repeated_names_keep_input_order() {
        let mut root = Element::new("root")
            .with_child(Element::new("B").with_text("1"))
            .with_child(Element::new("A"))
            .with_child(Element::new("B").with_text("2"));

        sorter(UnknownPlacement::First).fix_order(&mut root);

        assert_eq!(names(&root), vec!["A", "B", "B"]);
        assert_eq!(root.children[1].text(), "1");
        assert_eq!(root.children[2].text(), "2");
    }

    #[test]
    fn test_default_placement_is_first() {
        let sorter = SchemaOrderSorter::new(SchemaElementOrder::new(["A"]));
        assert_eq!(sorter.placement(), UnknownPlacement::First);
        assert_eq!(sorter.order().len(), 1);
    }

    #[test]
    fn test_shared_order_across_sorters() {
        let order = Arc::new(SchemaElementOrder::new(["A", "B"]));
        let first = SchemaOrderSorter::new(Arc::clone(&order));
        let last = SchemaOrderSorter::with_placement(Arc::clone(&order), UnknownPlacement::Last);

        let mut one = Element::new("r").with_child(Element::new("B")).with_child(Element::new("z"));
        let mut two = one.clone();
        first.fix_order(&mut one);
        last.fix_order(&mut two);

        assert_eq!(names(&one), vec!["z", "B"]);
        assert_eq!(names(&two), vec!["B", "z"]);
    }
}
