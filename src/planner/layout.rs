use crate::planner::Slot;
use crate::sql::ast::{Expression, SlotReference};
use crate::sql::{AstVisitor, NodeRef, UnhandledNode};
use std::cell::RefCell;
use std::collections::HashMap;

/// Collects the distinct slots an expression references, in first-seen order.
///
/// Only slot references are handled explicitly; every other expression falls
/// back to `visit_expression`, which descends into the children. Subquery
/// expressions are opaque and contribute nothing.
#[derive(Debug, Default)]
pub struct SlotCollector {
    slots: RefCell<Vec<Slot>>,
}

impl SlotCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Slots referenced by `expression`
    pub fn collect(expression: &Expression) -> Result<Vec<Slot>, UnhandledNode> {
        let collector = Self::new();
        collector.process_expression(expression, &())?;
        Ok(collector.into_slots())
    }

    pub fn into_slots(self) -> Vec<Slot> {
        self.slots.into_inner()
    }
}

impl AstVisitor<()> for SlotCollector {
    type Output = ();
    type Error = UnhandledNode;

    fn visit_slot_reference(&self, node: &SlotReference, _: &()) -> Result<(), UnhandledNode> {
        let mut slots = self.slots.borrow_mut();
        if !slots.contains(&node.slot) {
            log::trace!("Collected slot {}", node.slot);
            slots.push(node.slot.clone());
        }
        Ok(())
    }

    fn visit_expression(&self, node: NodeRef<'_>, context: &()) -> Result<(), UnhandledNode> {
        for child in node.children() {
            self.process_expression(child, context)?;
        }
        Ok(())
    }
}

/// Assignment of slots to consecutive channels of a row
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChannelLayout {
    slots: Vec<Slot>,
    channels: HashMap<Slot, usize>,
}

impl ChannelLayout {
    /// Channel `i` holds `slots[i]`. Repeated slots keep their first channel.
    pub fn from_slots(slots: impl IntoIterator<Item = Slot>) -> Self {
        let mut layout = Self::default();
        for slot in slots {
            if layout.channels.contains_key(&slot) {
                continue;
            }
            layout.channels.insert(slot.clone(), layout.slots.len());
            layout.slots.push(slot);
        }
        layout
    }

    /// One channel per slot referenced by `expression`, in first-seen order
    pub fn for_expression(expression: &Expression) -> Result<Self, UnhandledNode> {
        let layout = Self::from_slots(SlotCollector::collect(expression)?);
        log::trace!("Laid out {} channels", layout.len());
        Ok(layout)
    }

    pub fn channel(&self, slot: &Slot) -> Option<usize> {
        self.channels.get(slot).copied()
    }

    /// Slots in channel order
    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn mapping(&self) -> &HashMap<Slot, usize> {
        &self.channels
    }

    pub fn into_mapping(self) -> HashMap<Slot, usize> {
        self.channels
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::access::DataType;
    use crate::sql::ast::{Query, SubqueryExpression};

    fn slot(id: u32, name: &str) -> Slot {
        Slot::new(id, name, DataType::Long)
    }

    #[test]
    fn test_collects_in_first_seen_order() {
        let a = slot(7, "a");
        let b = slot(3, "b");
        let expr = Expression::or(
            Expression::gt(Expression::slot(a.clone()), Expression::slot(b.clone())),
            Expression::coalesce(vec![
                Expression::slot(b.clone()),
                Expression::null_if(Expression::slot(a.clone()), Expression::long(0)),
            ]),
        );

        assert_eq!(SlotCollector::collect(&expr).unwrap(), vec![a, b]);
    }

    #[test]
    fn test_descends_into_unsupported_variants() {
        let a = slot(0, "a");
        let b = slot(1, "b");
        let expr = Expression::function_call(
            "abs",
            vec![Expression::in_list(
                Expression::slot(a.clone()),
                vec![Expression::aliased(Expression::slot(b.clone()), "x")],
            )],
        );

        assert_eq!(SlotCollector::collect(&expr).unwrap(), vec![a, b]);
    }

    #[test]
    fn test_subqueries_are_opaque() {
        let expr = Expression::Subquery(SubqueryExpression {
            query: Box::new(Query::simple(vec![Expression::slot(slot(0, "a"))], "t")),
        });
        assert!(SlotCollector::collect(&expr).unwrap().is_empty());
    }

    #[test]
    fn test_non_expression_nodes_are_unhandled() {
        let query = Query::simple(vec![], "t");
        let err = SlotCollector::new()
            .process(NodeRef::Query(&query), &())
            .unwrap_err();
        assert_eq!(err.kind, crate::sql::NodeKind::Query);
    }

    #[test]
    fn test_layout_assigns_consecutive_channels() {
        let a = slot(10, "a");
        let b = slot(20, "b");
        let expr = Expression::add(Expression::slot(b.clone()), Expression::slot(a.clone()));

        let layout = ChannelLayout::for_expression(&expr).unwrap();
        assert_eq!(layout.len(), 2);
        assert_eq!(layout.channel(&b), Some(0));
        assert_eq!(layout.channel(&a), Some(1));
        assert_eq!(layout.slots(), &[b, a]);
        assert_eq!(layout.channel(&slot(30, "c")), None);
    }

    #[test]
    fn test_layout_from_slots_skips_duplicates() {
        let a = slot(0, "a");
        let b = slot(1, "b");
        let layout = ChannelLayout::from_slots(vec![a.clone(), b.clone(), a.clone()]);

        assert_eq!(layout.len(), 2);
        let mapping = layout.into_mapping();
        assert_eq!(mapping[&a], 0);
        assert_eq!(mapping[&b], 1);
    }

    #[test]
    fn test_literal_only_expression_needs_no_channels() {
        let layout =
            ChannelLayout::for_expression(&Expression::add(Expression::long(1), Expression::long(2)))
                .unwrap();
        assert!(layout.is_empty());
    }
}
