//! The handler table: numbered groups of handlers.
//!
//! Groups are walked in ascending numeric order. Within a group, handlers are
//! tried in registration order and the first whose predicate matches wins
//! the group.

use std::collections::BTreeMap;

use crate::handler::Handler;

/// Default group for handlers registered without an explicit one.
pub const DEFAULT_GROUP: i32 = 0;

/// Ordered collection of handler groups.
#[derive(Debug, Default, Clone)]
pub struct HandlerTable {
    groups: BTreeMap<i32, Vec<Handler>>,
}

impl HandlerTable {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a handler in `group`, after any existing ones.
    pub fn add(&mut self, group: i32, handler: Handler) {
        self.groups.entry(group).or_default().push(handler);
    }

    /// Registers a handler in `group` (builder pattern).
    pub fn with(mut self, group: i32, handler: Handler) -> Self {
        self.add(group, handler);
        self
    }

    /// Iterates groups in ascending order.
    pub fn groups(&self) -> impl Iterator<Item = (i32, &[Handler])> {
        self.groups.iter().map(|(g, h)| (*g, h.as_slice()))
    }

    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    pub fn handler_count(&self) -> usize {
        self.groups.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filters::Predicate;
    use crate::handler::Outcome;

    fn noop(name: &str) -> Handler {
        Handler::new(Predicate::always(), |_| async { Ok(Outcome::Continue) }).named(name)
    }

    #[test]
    fn test_groups_ascending_handlers_in_order() {
        let table = HandlerTable::new()
            .with(5, noop("late"))
            .with(-1, noop("migrate"))
            .with(DEFAULT_GROUP, noop("first"))
            .with(DEFAULT_GROUP, noop("second"));

        let order: Vec<(i32, Vec<&str>)> = table
            .groups()
            .map(|(g, hs)| (g, hs.iter().map(Handler::name).collect()))
            .collect();
        assert_eq!(
            order,
            vec![
                (-1, vec!["migrate"]),
                (0, vec!["first", "second"]),
                (5, vec!["late"]),
            ]
        );
        assert_eq!(table.group_count(), 3);
        assert_eq!(table.handler_count(), 4);
    }
}
