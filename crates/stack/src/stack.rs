use core::ops::{Deref, DerefMut};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{StackError, StackValue, repr::Tagged};

/// Ordered TVM stack, as a JSON array of stack entries
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Stack(Vec<StackValue>);

impl Stack {
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    /// Decode array of values in either shape. Returns `None` if any of
    /// them has unknown `@type`.
    pub fn from_json(value: Value) -> Result<Option<Self>, StackError> {
        let entries: Vec<Tagged> = serde_json::from_value(value)?;
        Ok(Tagged::into_values(entries)?.map(Self))
    }

    /// Encode as array of stack entries
    #[inline]
    pub fn to_json(&self) -> Result<Value, StackError> {
        serde_json::to_value(self).map_err(Into::into)
    }

    #[inline]
    pub fn into_inner(self) -> Vec<StackValue> {
        self.0
    }
}

impl Deref for Stack {
    type Target = Vec<StackValue>;

    #[inline]
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl DerefMut for Stack {
    #[inline]
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl From<Vec<StackValue>> for Stack {
    #[inline]
    fn from(values: Vec<StackValue>) -> Self {
        Self(values)
    }
}

impl FromIterator<StackValue> for Stack {
    #[inline]
    fn from_iter<T: IntoIterator<Item = StackValue>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for Stack {
    type Item = StackValue;
    type IntoIter = std::vec::IntoIter<StackValue>;

    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}
