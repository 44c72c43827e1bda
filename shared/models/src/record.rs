//! Extracted property sets and aggregated BOM rows

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use crate::value::AttrValue;

/// Logical field names always computed for every object
pub const NAME_FIELD: &str = "name";
pub const TYPE_FIELD: &str = "type";
pub const LAYER_FIELD: &str = "layer";
pub const QUANTITY_FIELD: &str = "quantity";

/// Properties resolved from one drawing object, keyed by logical field name
///
/// Insertion ordered; an absent property is kept as `None` so that the
/// field is still known to have been requested.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExtractedProperties {
    entries: Vec<(String, Option<AttrValue>)>,
}

impl ExtractedProperties {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a field, replacing any earlier value in place
    pub fn insert(&mut self, field: impl Into<String>, value: Option<AttrValue>) {
        let field = field.into();
        match self.entries.iter_mut().find(|(name, _)| *name == field) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((field, value)),
        }
    }

    pub fn contains(&self, field: &str) -> bool {
        self.entries.iter().any(|(name, _)| name == field)
    }

    /// Resolved value of a field; `None` when absent or never requested
    pub fn get(&self, field: &str) -> Option<&AttrValue> {
        self.entries
            .iter()
            .find(|(name, _)| name == field)
            .and_then(|(_, value)| value.as_ref())
    }

    pub fn name(&self) -> Option<&AttrValue> {
        self.get(NAME_FIELD)
    }

    pub fn object_type(&self) -> Option<&AttrValue> {
        self.get(TYPE_FIELD)
    }

    pub fn layer(&self) -> Option<&AttrValue> {
        self.get(LAYER_FIELD)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&AttrValue>)> {
        self.entries
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_ref()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for ExtractedProperties {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, value) in &self.entries {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

/// One aggregated line of the bill of materials
///
/// Holds the grouping-field values shared by every object in the group,
/// the number of objects, and one collapsed value per extra field.
#[derive(Debug, Clone, PartialEq)]
pub struct BomRow {
    key: Vec<(String, Option<AttrValue>)>,
    quantity: usize,
    extras: Vec<(String, Option<AttrValue>)>,
}

impl BomRow {
    /// Seed a row from its grouping-field values with a quantity of zero.
    /// Repeated field names keep their first position. A field named
    /// `quantity` is dropped; that name belongs to the count.
    pub fn new<I>(key: I) -> Self
    where
        I: IntoIterator<Item = (String, Option<AttrValue>)>,
    {
        let mut fields: Vec<(String, Option<AttrValue>)> = Vec::new();
        for (name, value) in key {
            if name != QUANTITY_FIELD && !fields.iter().any(|(existing, _)| *existing == name) {
                fields.push((name, value));
            }
        }

        Self {
            key: fields,
            quantity: 0,
            extras: Vec::new(),
        }
    }

    pub fn quantity(&self) -> usize {
        self.quantity
    }

    pub fn increment(&mut self) {
        self.quantity += 1;
    }

    /// Set the collapsed value of an extra field; `quantity` is ignored
    pub fn set_extra(&mut self, field: impl Into<String>, value: Option<AttrValue>) {
        let field = field.into();
        if field == QUANTITY_FIELD {
            return;
        }
        match self.extras.iter_mut().find(|(name, _)| *name == field) {
            Some(entry) => entry.1 = value,
            None => self.extras.push((field, value)),
        }
    }

    /// Value of a field. Extra fields shadow grouping fields of the same name.
    pub fn get(&self, field: &str) -> Option<&AttrValue> {
        self.extras
            .iter()
            .chain(self.key.iter())
            .find(|(name, _)| name == field)
            .and_then(|(_, value)| value.as_ref())
    }

    /// Grouping-field values in key order
    pub fn key_values(&self) -> impl Iterator<Item = (&str, Option<&AttrValue>)> {
        self.key
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_ref()))
    }

    /// Collapsed extra-field values in request order
    pub fn extra_values(&self) -> impl Iterator<Item = (&str, Option<&AttrValue>)> {
        self.extras
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_ref()))
    }

    /// Every field except quantity, in column order: grouping fields first
    /// (shadowed by extras where names collide), then the remaining extras.
    pub fn fields(&self) -> Vec<(&str, Option<&AttrValue>)> {
        let mut columns: Vec<(&str, Option<&AttrValue>)> = self
            .key
            .iter()
            .map(|(name, _)| (name.as_str(), self.get(name)))
            .collect();

        for (name, value) in &self.extras {
            if !self.key.iter().any(|(key_name, _)| key_name == name) {
                columns.push((name.as_str(), value.as_ref()));
            }
        }

        columns
    }
}

impl Serialize for BomRow {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        for (name, _) in &self.key {
            map.serialize_entry(name, &self.get(name))?;
        }
        map.serialize_entry(QUANTITY_FIELD, &self.quantity)?;
        for (name, value) in &self.extras {
            if !self.key.iter().any(|(key_name, _)| key_name == name) {
                map.serialize_entry(name, value)?;
            }
        }
        map.end()
    }
}
