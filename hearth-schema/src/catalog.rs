use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

use crate::{
    collection::CollectionSchema,
    error::{Result, SchemaError},
    field::FieldDefinition,
};

/// A single schema store mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Change {
    CreateCollection(CollectionSchema),
    AddField {
        collection_id: String,
        field: FieldDefinition,
        /// Insert position, `None` appends.
        index: Option<usize>,
    },
    RemoveField {
        collection_id: String,
        field_id: String,
    },
    DeleteCollection {
        id: String,
    },
}

impl Change {
    /// Collection the change is about.
    pub fn collection_id(&self) -> &str {
        match self {
            Change::CreateCollection(schema) => schema.id(),
            Change::AddField { collection_id, .. } | Change::RemoveField { collection_id, .. } => {
                collection_id
            }
            Change::DeleteCollection { id } => id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Created(CollectionSchema),
    Updated(CollectionSchema),
    Deleted {
        id: String,
        /// `(collection_id, field_id)` of cascading relations whose records
        /// the storage engine has to remove.
        cascaded: Vec<(String, String)>,
    },
}

/// In-memory image of every collection, keyed by collection id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog(BTreeMap<String, CollectionSchema>);

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: &str) -> Option<&CollectionSchema> {
        self.0.get(id)
    }

    pub fn get_by_name(&self, name: &str) -> Option<&CollectionSchema> {
        self.0.values().find(|collection| collection.name() == name)
    }

    pub fn collections(&self) -> impl Iterator<Item = &CollectionSchema> {
        self.0.values()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Relation fields whose target collection no longer exists, as
    /// `(collection_id, field_id, target_id)`.
    pub fn dangling_relations(&self) -> Vec<(String, String, String)> {
        let mut dangling = Vec::new();

        for collection in self.0.values() {
            for field in collection.fields() {
                let Some(options) = field.as_relation() else {
                    continue;
                };

                if !self.0.contains_key(&options.collection_id) {
                    dangling.push((
                        collection.id().to_owned(),
                        field.id().to_owned(),
                        options.collection_id.to_owned(),
                    ));
                }
            }
        }

        dangling
    }

    /// Validates and applies `change`. On error the catalog is left untouched.
    pub fn apply(&mut self, change: Change) -> Result<Outcome> {
        match change {
            Change::CreateCollection(schema) => self.create_collection(schema),
            Change::AddField {
                collection_id,
                field,
                index,
            } => self.add_field(&collection_id, field, index),
            Change::RemoveField {
                collection_id,
                field_id,
            } => self.remove_field(&collection_id, &field_id),
            Change::DeleteCollection { id } => self.delete_collection(&id),
        }
    }

    fn create_collection(&mut self, schema: CollectionSchema) -> Result<Outcome> {
        if schema.id().trim().is_empty() {
            return Err(SchemaError::InvalidIdentifier(schema.id().to_owned()));
        }

        if schema.name().trim().is_empty() {
            return Err(SchemaError::InvalidIdentifier(schema.name().to_owned()));
        }

        if self.0.contains_key(schema.id()) {
            return Err(SchemaError::DuplicateCollection(schema.id().to_owned()));
        }

        if self.get_by_name(schema.name()).is_some() {
            return Err(SchemaError::DuplicateCollection(schema.name().to_owned()));
        }

        let mut ids = HashSet::new();
        let mut names = HashSet::new();

        for field in schema.fields() {
            if !ids.insert(field.id()) || !names.insert(field.name()) {
                return Err(SchemaError::DuplicateField {
                    collection: schema.name().to_owned(),
                    field: field.name().to_owned(),
                });
            }

            self.check_field(schema.id(), field)?;
        }

        self.0.insert(schema.id().to_owned(), schema.clone());

        Ok(Outcome::Created(schema))
    }

    fn add_field(
        &mut self,
        collection_id: &str,
        field: FieldDefinition,
        index: Option<usize>,
    ) -> Result<Outcome> {
        let Some(collection) = self.0.get(collection_id) else {
            return Err(SchemaError::CollectionNotFound(collection_id.to_owned()));
        };

        let clash = collection
            .get_field(field.id())
            .or_else(|| collection.get_field_by_name(field.name()));

        if clash.is_some() {
            return Err(SchemaError::DuplicateField {
                collection: collection.name().to_owned(),
                field: field.name().to_owned(),
            });
        }

        self.check_field(collection_id, &field)?;

        let Some(collection) = self.0.get_mut(collection_id) else {
            return Err(SchemaError::CollectionNotFound(collection_id.to_owned()));
        };

        collection.insert_field(field, index);

        Ok(Outcome::Updated(collection.clone()))
    }

    fn remove_field(&mut self, collection_id: &str, field_id: &str) -> Result<Outcome> {
        let Some(collection) = self.0.get_mut(collection_id) else {
            return Err(SchemaError::CollectionNotFound(collection_id.to_owned()));
        };

        let Some(index) = collection.position(field_id) else {
            return Err(SchemaError::FieldNotFound {
                collection: collection.name().to_owned(),
                field: field_id.to_owned(),
            });
        };

        collection.take_field(index);

        Ok(Outcome::Updated(collection.clone()))
    }

    /// Cascading relations do not block the delete and are not removed: the
    /// referencing fields keep pointing at `id`, so their target no longer
    /// exists until a collection with the same id is created again. They are
    /// listed in the outcome and by [`Catalog::dangling_relations`].
    fn delete_collection(&mut self, id: &str) -> Result<Outcome> {
        if !self.0.contains_key(id) {
            return Err(SchemaError::CollectionNotFound(id.to_owned()));
        }

        let mut cascaded = Vec::new();

        for collection in self.0.values().filter(|collection| collection.id() != id) {
            for (field, options) in collection.relations_to(id) {
                if !options.cascade_delete {
                    return Err(SchemaError::RelationConstraint {
                        collection: collection.name().to_owned(),
                        field: field.name().to_owned(),
                        target: id.to_owned(),
                    });
                }

                cascaded.push((collection.id().to_owned(), field.id().to_owned()));
            }
        }

        self.0.remove(id);

        Ok(Outcome::Deleted {
            id: id.to_owned(),
            cascaded,
        })
    }

    fn check_field(&self, owner_id: &str, field: &FieldDefinition) -> Result<()> {
        field.validate()?;

        if let Some(options) = field.as_relation() {
            if options.collection_id != owner_id && !self.0.contains_key(&options.collection_id) {
                return Err(SchemaError::UnknownRelationTarget {
                    field: field.name().to_owned(),
                    target: options.collection_id.to_owned(),
                });
            }
        }

        Ok(())
    }
}

impl FromIterator<CollectionSchema> for Catalog {
    fn from_iter<T: IntoIterator<Item = CollectionSchema>>(iter: T) -> Self {
        Self(
            iter.into_iter()
                .map(|collection| (collection.id().to_owned(), collection))
                .collect(),
        )
    }
}
