//! An ordered collection whose elements are reconstructed from row ids on first access.
//!
//! [`LazyList`] starts out as a list of row ids plus a reader that turns one row id into an
//! element. Elements are materialized one slot at a time, the first time that slot is read, and
//! then kept. Everything pushed or inserted by a caller is stored directly, so after
//! construction the list behaves like any other mutable sequence.
//!
//! Reader failures are returned to the caller and leave the slot pending; a later read of the
//! same slot invokes the reader again.

use std::fmt;

use crate::{Error, Result};

/// Reconstructs one element of a [`LazyList`] from its row id
pub type ItemReader<T> = Box<dyn Fn(u32) -> Result<T>>;

enum Item<T> {
    Pending(u32),
    Loaded(T),
}

/// Ordered, mutable list with per-slot lazy materialization.
pub struct LazyList<T> {
    items: Vec<Item<T>>,
    reader: Option<ItemReader<T>>,
}

impl<T> LazyList<T> {
    /// Creates an empty, eagerly usable list
    #[must_use]
    pub fn new() -> Self {
        LazyList {
            items: Vec::new(),
            reader: None,
        }
    }

    /// Creates a list that holds `items` as already materialized elements
    #[must_use]
    pub fn from_vec(items: Vec<T>) -> Self {
        LazyList {
            items: items.into_iter().map(Item::Loaded).collect(),
            reader: None,
        }
    }

    /// Creates a list of `ids.len()` pending elements, each produced by `reader` on first access.
    pub fn new_lazy<F>(ids: Vec<u32>, reader: F) -> Self
    where
        F: Fn(u32) -> Result<T> + 'static,
    {
        LazyList {
            items: ids.into_iter().map(Item::Pending).collect(),
            reader: Some(Box::new(reader)),
        }
    }

    /// Number of elements, loaded or pending
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns `true` if the list holds no elements
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Returns `true` if the element at `index` has been materialized
    #[must_use]
    pub fn is_loaded(&self, index: usize) -> bool {
        matches!(self.items.get(index), Some(Item::Loaded(_)))
    }

    /// Returns the element at `index`, materializing it if required.
    ///
    /// Returns `Ok(None)` if `index` is past the end of the list.
    ///
    /// # Errors
    ///
    /// Returns the error of the reader if the element could not be reconstructed.
    pub fn get(&mut self, index: usize) -> Result<Option<&T>> {
        if !self.load(index)? {
            return Ok(None);
        }

        match self.items.get(index) {
            Some(Item::Loaded(value)) => Ok(Some(value)),
            _ => Ok(None),
        }
    }

    /// Mutable access to the element at `index`, materializing it if required.
    ///
    /// # Errors
    ///
    /// Returns the error of the reader if the element could not be reconstructed.
    pub fn get_mut(&mut self, index: usize) -> Result<Option<&mut T>> {
        if !self.load(index)? {
            return Ok(None);
        }

        match self.items.get_mut(index) {
            Some(Item::Loaded(value)) => Ok(Some(value)),
            _ => Ok(None),
        }
    }

    /// Appends an element
    pub fn push(&mut self, value: T) {
        self.items.push(Item::Loaded(value));
    }

    /// Inserts an element at `index`, shifting all following elements.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OutOfBounds`] if `index > len`.
    pub fn insert(&mut self, index: usize, value: T) -> Result<()> {
        if index > self.items.len() {
            return Err(Error::OutOfBounds);
        }

        self.items.insert(index, Item::Loaded(value));
        Ok(())
    }

    /// Removes and returns the element at `index`, materializing it first if required.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OutOfBounds`] if `index >= len`, or the error of the reader.
    pub fn remove(&mut self, index: usize) -> Result<T> {
        if !self.load(index)? {
            return Err(Error::OutOfBounds);
        }

        match self.items.remove(index) {
            Item::Loaded(value) => Ok(value),
            Item::Pending(_) => Err(Error::OutOfBounds),
        }
    }

    /// Removes all elements
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Materializes every pending element.
    ///
    /// # Errors
    ///
    /// Stops at and returns the first reader error; elements before it stay loaded.
    pub fn load_all(&mut self) -> Result<()> {
        for index in 0..self.items.len() {
            self.load(index)?;
        }
        Ok(())
    }

    /// Iterates over all elements that are already materialized, in order
    pub fn iter_loaded(&self) -> impl Iterator<Item = &T> {
        self.items.iter().filter_map(|item| match item {
            Item::Loaded(value) => Some(value),
            Item::Pending(_) => None,
        })
    }

    fn load(&mut self, index: usize) -> Result<bool> {
        let Some(item) = self.items.get_mut(index) else {
            return Ok(false);
        };

        if let Item::Pending(id) = *item {
            let Some(reader) = &self.reader else {
                return Err(malformed_error!("No reader for pending element {}", id));
            };

            log::trace!("Materializing lazy list element {index} from row {id}");
            *item = Item::Loaded(reader(id)?);
        }

        Ok(true)
    }
}

impl<T: Clone> LazyList<T> {
    /// Materializes every element and returns a copy of the whole list.
    ///
    /// # Errors
    ///
    /// Returns the first reader error.
    pub fn to_vec(&mut self) -> Result<Vec<T>> {
        self.load_all()?;
        Ok(self.iter_loaded().cloned().collect())
    }
}

impl<T> Default for LazyList<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: fmt::Debug> fmt::Debug for LazyList<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut list = f.debug_list();
        for item in &self.items {
            match item {
                Item::Loaded(value) => list.entry(value),
                Item::Pending(id) => list.entry(&format_args!("<pending {id}>")),
            };
        }
        list.finish()
    }
}
