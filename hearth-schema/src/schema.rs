use crate::{
    catalog::{Catalog, Change, Outcome},
    collection::CollectionSchema,
    engine::Engine,
    error::Result,
    field::FieldDefinition,
};

/// Handle on a schema store. Cheap to clone, every clone talks to the same
/// engine.
#[derive(Clone)]
pub struct Schema {
    pub(crate) engine: Box<dyn Engine>,
}

impl Schema {
    pub fn new<E: Engine + 'static>(engine: E) -> Self {
        Self {
            engine: Box::new(engine),
        }
    }

    pub async fn apply(&self, change: Change) -> Result<Outcome> {
        self.engine.apply(change).await
    }

    pub async fn create_collection(
        &self,
        id: impl Into<String>,
        name: impl Into<String>,
        fields: Vec<FieldDefinition>,
    ) -> Result<CollectionSchema> {
        let schema = CollectionSchema::new(id, name).fields_from(fields);
        self.engine
            .apply(Change::CreateCollection(schema.clone()))
            .await?;

        Ok(schema)
    }

    pub async fn add_field(
        &self,
        collection_id: impl Into<String>,
        field: FieldDefinition,
    ) -> Result<Outcome> {
        self.engine
            .apply(Change::AddField {
                collection_id: collection_id.into(),
                field,
                index: None,
            })
            .await
    }

    pub async fn add_field_at(
        &self,
        collection_id: impl Into<String>,
        field: FieldDefinition,
        index: usize,
    ) -> Result<Outcome> {
        self.engine
            .apply(Change::AddField {
                collection_id: collection_id.into(),
                field,
                index: Some(index),
            })
            .await
    }

    pub async fn remove_field(
        &self,
        collection_id: impl Into<String>,
        field_id: impl Into<String>,
    ) -> Result<Outcome> {
        self.engine
            .apply(Change::RemoveField {
                collection_id: collection_id.into(),
                field_id: field_id.into(),
            })
            .await
    }

    /// Fails with `RelationConstraint` while a non-cascading relation targets
    /// `id`. Cascading relation fields survive the delete and dangle until a
    /// collection with the same id exists again, see
    /// [`Catalog::dangling_relations`].
    pub async fn delete_collection(&self, id: impl Into<String>) -> Result<Outcome> {
        self.engine
            .apply(Change::DeleteCollection { id: id.into() })
            .await
    }

    pub async fn find(&self, id: &str) -> Result<Option<CollectionSchema>> {
        Ok(self.engine.catalog().await?.get(id).cloned())
    }

    pub async fn find_by_name(&self, name: &str) -> Result<Option<CollectionSchema>> {
        Ok(self.engine.catalog().await?.get_by_name(name).cloned())
    }

    pub async fn collections(&self) -> Result<Vec<CollectionSchema>> {
        Ok(self.engine.catalog().await?.collections().cloned().collect())
    }

    pub async fn catalog(&self) -> Result<Catalog> {
        self.engine.catalog().await
    }
}
