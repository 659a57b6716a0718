//! Intern table for function display names.
//!
//! Every distinct name is stored once; frames refer to it through a
//! small `Symbol` handle, so the common case of comparing two call
//! sites is a handle comparison instead of a string comparison.

use std::collections::HashMap;
use std::rc::Rc;

/// Handle to a string owned by an [`InternTable`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Symbol(u32);

/// Owner of interned names
#[derive(Debug, Default)]
pub struct InternTable {
    lookup: HashMap<Rc<str>, Symbol>,
    names: Vec<Rc<str>>,
}

impl InternTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the handle for `text`, storing it on first sight
    pub fn intern(&mut self, text: &str) -> Symbol {
        if let Some(&symbol) = self.lookup.get(text) {
            return symbol;
        }

        let symbol = Symbol(self.names.len() as u32);
        let owned: Rc<str> = Rc::from(text);
        self.names.push(Rc::clone(&owned));
        self.lookup.insert(owned, symbol);
        symbol
    }

    /// Text behind a handle
    ///
    /// Handles from another table resolve to an empty string.
    pub fn resolve(&self, symbol: Symbol) -> &str {
        self.names
            .get(symbol.0 as usize)
            .map_or("", |name| name.as_ref())
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Drop every interned name, returning how many were released
    pub fn clear(&mut self) -> usize {
        let released = self.names.len();
        self.lookup.clear();
        self.names.clear();
        released
    }
}
