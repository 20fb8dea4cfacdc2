//! Local variable slots of a CIL method body.
//!
//! The slot index of a local is its position in the [`LocalList`]. Instructions such as
//! `ldloc`/`stloc` and the locals signature refer to slots by that index; the list keeps every
//! [`Local::index`] equal to its position, but does not rewrite instructions when slots move.

use std::{fmt, slice};

use crate::{metadata::token::Token, Error, Result};

/// A local variable slot
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Local {
    /// Position of this local in its list
    pub index: usize,
    /// Optional name, e.g. from debug information
    pub name: Option<String>,
    /// Token of the local's type, if known
    pub type_token: Option<Token>,
    /// The local is pinned
    pub pinned: bool,
}

impl Local {
    /// Create an unnamed local of the given type. The index is assigned when it is added to a list.
    #[must_use]
    pub fn new(type_token: Option<Token>) -> Self {
        Local {
            type_token,
            ..Local::default()
        }
    }

    /// Create a named local of the given type
    #[must_use]
    pub fn named(name: impl Into<String>, type_token: Option<Token>) -> Self {
        Local {
            name: Some(name.into()),
            type_token,
            ..Local::default()
        }
    }
}

impl fmt::Display for Local {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.name {
            Some(name) => write!(f, "{name}"),
            None => write!(f, "V_{}", self.index),
        }
    }
}

/// Ordered list of local variable slots.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LocalList {
    locals: Vec<Local>,
}

impl LocalList {
    /// Create an empty list
    #[must_use]
    pub fn new() -> Self {
        LocalList { locals: Vec::new() }
    }

    /// Take ownership of `locals`, renumbering them by position
    #[must_use]
    pub fn from_vec(locals: Vec<Local>) -> Self {
        let mut list = LocalList { locals };
        list.renumber(0);
        list
    }

    /// Number of slots
    #[must_use]
    pub fn len(&self) -> usize {
        self.locals.len()
    }

    /// Returns `true` if there are no slots
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.locals.is_empty()
    }

    /// The slot at `index`
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Local> {
        self.locals.get(index)
    }

    /// Mutable access to the slot at `index`.
    ///
    /// Changing [`Local::index`] through this reference breaks the position invariant until the
    /// next insert or remove.
    pub fn get_mut(&mut self, index: usize) -> Option<&mut Local> {
        self.locals.get_mut(index)
    }

    /// Append a slot and return its index
    pub fn push(&mut self, mut local: Local) -> usize {
        let index = self.locals.len();
        local.index = index;
        self.locals.push(local);
        index
    }

    /// Insert a slot at `index`, shifting the following slots up by one.
    ///
    /// # Errors
    /// Returns [`Error::OutOfBounds`] if `index > len`.
    pub fn insert(&mut self, index: usize, local: Local) -> Result<()> {
        if index > self.locals.len() {
            return Err(Error::OutOfBounds);
        }

        self.locals.insert(index, local);
        self.renumber(index);
        Ok(())
    }

    /// Remove the slot at `index`, shifting the following slots down by one.
    ///
    /// # Errors
    /// Returns [`Error::OutOfBounds`] if `index >= len`.
    pub fn remove(&mut self, index: usize) -> Result<Local> {
        if index >= self.locals.len() {
            return Err(Error::OutOfBounds);
        }

        let removed = self.locals.remove(index);
        self.renumber(index);
        Ok(removed)
    }

    /// Remove all slots
    pub fn clear(&mut self) {
        self.locals.clear();
    }

    /// Iterate the slots in index order
    pub fn iter(&self) -> slice::Iter<'_, Local> {
        self.locals.iter()
    }

    fn renumber(&mut self, from: usize) {
        for (index, local) in self.locals.iter_mut().enumerate().skip(from) {
            local.index = index;
        }
    }
}

impl<'a> IntoIterator for &'a LocalList {
    type Item = &'a Local;
    type IntoIter = slice::Iter<'a, Local>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl From<Vec<Local>> for LocalList {
    fn from(locals: Vec<Local>) -> Self {
        LocalList::from_vec(locals)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(list: &LocalList) -> Vec<String> {
        list.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn push_assigns_indexes() {
        let mut list = LocalList::new();
        assert!(list.is_empty());

        assert_eq!(list.push(Local::new(Some(Token::new(0x0100_0001)))), 0);
        assert_eq!(list.push(Local::new(None)), 1);
        assert_eq!(list.len(), 2);
        assert_eq!(list.get(1).unwrap().index, 1);
        assert_eq!(names(&list), ["V_0", "V_1"]);
    }

    #[test]
    fn insert_and_remove_renumber() {
        let mut list = LocalList::from_vec(vec![
            Local::named("a", None),
            Local::named("b", None),
            Local::named("c", None),
        ]);

        list.insert(1, Local::named("x", None)).unwrap();
        assert_eq!(names(&list), ["a", "x", "b", "c"]);
        for (position, local) in list.iter().enumerate() {
            assert_eq!(local.index, position);
        }

        let removed = list.remove(0).unwrap();
        assert_eq!(removed.name.as_deref(), Some("a"));
        assert_eq!(list.get(0).unwrap().index, 0);
        assert_eq!(list.get(2).unwrap().name.as_deref(), Some("c"));
        assert_eq!(list.get(2).unwrap().index, 2);

        assert_eq!(list.insert(10, Local::default()), Err(Error::OutOfBounds));
        assert_eq!(list.remove(3), Err(Error::OutOfBounds));
    }

    #[test]
    fn from_vec_renumbers() {
        let list: LocalList = vec![
            Local {
                index: 7,
                ..Local::default()
            },
            Local {
                index: 7,
                pinned: true,
                ..Local::default()
            },
        ]
        .into();

        assert_eq!(list.get(0).unwrap().index, 0);
        assert_eq!(list.get(1).unwrap().index, 1);
        assert!(list.get(1).unwrap().pinned);
    }
}
