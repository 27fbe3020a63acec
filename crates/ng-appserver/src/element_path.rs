use std::fmt;
use std::str::FromStr;

use crate::error::StateError;

/// Position of the element currently being visited, e.g. `0.2.1`.
///
/// Every phase walks the page in the same order and moves the path the same
/// way, so an element gets the same path when it renders a link as when the
/// link is followed.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct ElementPath {
    components: Vec<u32>,
}

impl ElementPath {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Descend one level, starting at index 0.
    pub fn add_branch(&mut self) {
        self.components.push(0);
    }

    pub fn add_branch_and_set(&mut self, index: u32) {
        self.components.push(index);
    }

    pub fn remove_branch(&mut self) -> Result<(), StateError> {
        self.components
            .pop()
            .map(|_| ())
            .ok_or(StateError::PathUnderflow)
    }

    /// Move to the next sibling. A no-op on the empty path.
    pub fn increment(&mut self) {
        if let Some(last) = self.components.last_mut() {
            *last += 1;
        }
    }

    pub fn reset(&mut self) {
        self.components.clear();
    }

    #[must_use]
    pub fn depth(&self) -> usize {
        self.components.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    #[must_use]
    pub fn components(&self) -> &[u32] {
        &self.components
    }
}

impl fmt::Display for ElementPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, index) in self.components.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            write!(f, "{index}")?;
        }
        Ok(())
    }
}

impl FromStr for ElementPath {
    type Err = StateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Ok(Self::default());
        }
        s.split('.')
            .map(|part| {
                part.parse::<u32>()
                    .map_err(|_| StateError::InvalidActionUrl(s.to_string()))
            })
            .collect::<Result<Vec<_>, _>>()
            .map(|components| Self { components })
    }
}

impl From<Vec<u32>> for ElementPath {
    fn from(components: Vec<u32>) -> Self {
        Self { components }
    }
}
