//! Append-only local collections behind the dashboard forms.
//!
//! Nothing here is sent to the backend. Ids are `count + 1` at the time
//! of the append and are only unique within one collection instance.

/// Named append-only list.
#[derive(Debug, Clone)]
pub struct LocalCollection<T> {
    name: &'static str,
    items: Vec<T>,
}

impl<T> LocalCollection<T> {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            items: Vec::new(),
        }
    }

    pub fn seeded(name: &'static str, items: Vec<T>) -> Self {
        Self { name, items }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn next_id(&self) -> u32 {
        self.items.len() as u32 + 1
    }

    /// Build the record with the next id and push it. Returns the stored record.
    pub fn append_with(&mut self, build: impl FnOnce(u32) -> T) -> &T {
        let id = self.next_id();
        self.items.push(build(id));
        tracing::info!(collection = self.name, id, len = self.items.len(), "Local record appended");
        &self.items[self.items.len() - 1]
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_count_plus_one() {
        let mut list = LocalCollection::seeded("labs", vec![(1, "a"), (2, "b")]);
        assert_eq!(list.next_id(), 3);
        let stored = list.append_with(|id| (id, "c"));
        assert_eq!(*stored, (3, "c"));
        assert_eq!(list.len(), 3);
    }

    #[test]
    fn empty_collection_starts_at_one() {
        let mut list: LocalCollection<u32> = LocalCollection::new("treatments");
        assert!(list.is_empty());
        assert_eq!(*list.append_with(|id| id), 1);
        assert_eq!(list.name(), "treatments");
    }
}
