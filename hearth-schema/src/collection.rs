use serde::{Deserialize, Serialize};

use crate::field::{FieldDefinition, RelationOptions};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionSchema {
    id: String,
    name: String,
    #[serde(default)]
    fields: Vec<FieldDefinition>,
}

impl CollectionSchema {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            fields: Vec::new(),
        }
    }

    pub fn field(mut self, field: FieldDefinition) -> Self {
        self.fields.push(field);
        self
    }

    pub fn fields_from(mut self, fields: impl IntoIterator<Item = FieldDefinition>) -> Self {
        self.fields.extend(fields);
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn fields(&self) -> &[FieldDefinition] {
        &self.fields
    }

    pub fn get_field(&self, id: &str) -> Option<&FieldDefinition> {
        self.fields.iter().find(|field| field.id() == id)
    }

    pub fn get_field_by_name(&self, name: &str) -> Option<&FieldDefinition> {
        self.fields.iter().find(|field| field.name() == name)
    }

    pub fn position(&self, field_id: &str) -> Option<usize> {
        self.fields.iter().position(|field| field.id() == field_id)
    }

    /// Relation fields of this collection pointing at `target`.
    pub fn relations_to<'a>(
        &'a self,
        target: &'a str,
    ) -> impl Iterator<Item = (&'a FieldDefinition, &'a RelationOptions)> + 'a {
        self.fields.iter().filter_map(move |field| {
            field
                .as_relation()
                .filter(|options| options.collection_id == target)
                .map(|options| (field, options))
        })
    }

    pub(crate) fn insert_field(&mut self, field: FieldDefinition, index: Option<usize>) {
        match index {
            Some(index) => self.fields.insert(index.min(self.fields.len()), field),
            None => self.fields.push(field),
        }
    }

    pub(crate) fn take_field(&mut self, index: usize) -> FieldDefinition {
        self.fields.remove(index)
    }
}
