/// A growable list of editable items, as used by list-valued form fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DynamicList<T> {
    items: Vec<T>,
}

impl<T> Default for DynamicList<T> {
    fn default() -> Self {
        Self { items: Vec::new() }
    }
}

impl<T> DynamicList<T> {
    pub fn new(items: Vec<T>) -> Self {
        Self { items }
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

    pub fn get(&self, index: usize) -> Option<&T> {
        self.items.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        self.items.get_mut(index)
    }

    /// Append `item`, returning its index.
    pub fn add(&mut self, item: T) -> usize {
        self.items.push(item);
        self.items.len() - 1
    }

    /// Remove the item at `index`; later items move up.
    pub fn delete(&mut self, index: usize) -> Option<T> {
        (index < self.items.len()).then(|| self.items.remove(index))
    }

    /// Replace the item at `index`, returning the old one.
    pub fn update(&mut self, index: usize, item: T) -> Option<T> {
        self.items
            .get_mut(index)
            .map(|slot| std::mem::replace(slot, item))
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }
}

impl<'a, T> IntoIterator for &'a DynamicList<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_delete_update() {
        let mut list = DynamicList::new(vec![String::new()]);
        assert_eq!(list.add("b".to_string()), 1);
        assert_eq!(list.update(0, "a".to_string()), Some(String::new()));
        assert_eq!(list.items(), ["a", "b"]);
        assert_eq!(list.delete(0).as_deref(), Some("a"));
        assert_eq!(list.items(), ["b"]);
        assert_eq!(list.delete(5), None);
        assert_eq!(list.update(5, "x".to_string()), None);
    }
}
