//! Accumulated column declarations across all merged sources.

use serde::{Deserialize, Serialize};

use crate::field::Field;

/// Union of every [`Field`] seen so far, in first-declared order.
///
/// A later declaration of an existing name is ignored: the first source to
/// declare a column owns its kind, bounds and imputation rules.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Schema {
    fields: Vec<Field>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|field| field.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Add `field` unless its name is already declared. Returns whether it was added.
    pub fn insert(&mut self, field: Field) -> bool {
        if self.contains(&field.name) {
            return false;
        }
        self.fields.push(field);
        true
    }

    /// Insert every field, returning the names that were new.
    pub fn extend<I>(&mut self, fields: I) -> Vec<String>
    where
        I: IntoIterator<Item = Field>,
    {
        let mut added = Vec::new();
        for field in fields {
            let name = field.name.clone();
            if self.insert(field) {
                added.push(name);
            }
        }
        added
    }

    pub fn iter(&self) -> impl Iterator<Item = &Field> {
        self.fields.iter()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|field| field.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl FromIterator<Field> for Schema {
    fn from_iter<T: IntoIterator<Item = Field>>(iter: T) -> Self {
        let mut schema = Schema::new();
        schema.extend(iter);
        schema
    }
}

impl<'a> IntoIterator for &'a Schema {
    type Item = &'a Field;
    type IntoIter = std::slice::Iter<'a, Field>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.iter()
    }
}
