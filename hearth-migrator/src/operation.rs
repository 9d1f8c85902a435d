use hearth_schema::{Catalog, Change, CollectionSchema, FieldDefinition};

/// One reversible schema mutation. Destructive shapes carry the full prior
/// definition because the schema store keeps no history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    CreateCollection(CollectionSchema),
    AddField {
        collection_id: String,
        field: FieldDefinition,
    },
    RemoveField {
        collection_id: String,
        field: FieldDefinition,
        /// Position of `field` before removal, restored on `down`.
        index: usize,
    },
    DeleteCollection(CollectionSchema),
}

impl Operation {
    pub fn up(&self) -> Change {
        match self {
            Operation::CreateCollection(schema) => Change::CreateCollection(schema.clone()),
            Operation::AddField {
                collection_id,
                field,
            } => Change::AddField {
                collection_id: collection_id.to_owned(),
                field: field.clone(),
                index: None,
            },
            Operation::RemoveField {
                collection_id,
                field,
                ..
            } => Change::RemoveField {
                collection_id: collection_id.to_owned(),
                field_id: field.id().to_owned(),
            },
            Operation::DeleteCollection(schema) => Change::DeleteCollection {
                id: schema.id().to_owned(),
            },
        }
    }

    pub fn down(&self) -> Change {
        match self {
            Operation::CreateCollection(schema) => Change::DeleteCollection {
                id: schema.id().to_owned(),
            },
            Operation::AddField {
                collection_id,
                field,
            } => Change::RemoveField {
                collection_id: collection_id.to_owned(),
                field_id: field.id().to_owned(),
            },
            Operation::RemoveField {
                collection_id,
                field,
                index,
            } => Change::AddField {
                collection_id: collection_id.to_owned(),
                field: field.clone(),
                index: Some(*index),
            },
            Operation::DeleteCollection(schema) => Change::CreateCollection(schema.clone()),
        }
    }

    /// What `up` is about to destroy.
    pub(crate) fn snapshot_before_up(&self) -> Option<Snapshot<'_>> {
        match self {
            Operation::RemoveField {
                collection_id,
                field,
                index,
            } => Some(Snapshot::Field {
                collection_id,
                field,
                index: Some(*index),
            }),
            Operation::DeleteCollection(schema) => Some(Snapshot::Collection(schema)),
            _ => None,
        }
    }

    /// What `down` is about to destroy.
    pub(crate) fn snapshot_before_down(&self) -> Option<Snapshot<'_>> {
        match self {
            Operation::CreateCollection(schema) => Some(Snapshot::Collection(schema)),
            Operation::AddField {
                collection_id,
                field,
            } => Some(Snapshot::Field {
                collection_id,
                field,
                index: None,
            }),
            _ => None,
        }
    }
}

pub(crate) enum Snapshot<'a> {
    Collection(&'a CollectionSchema),
    Field {
        collection_id: &'a str,
        field: &'a FieldDefinition,
        index: Option<usize>,
    },
}

impl Snapshot<'_> {
    /// `None` when the target is absent, the store reports that case itself.
    pub(crate) fn matches(&self, catalog: &Catalog) -> Option<bool> {
        match self {
            Snapshot::Collection(schema) => catalog.get(schema.id()).map(|live| live == *schema),
            Snapshot::Field {
                collection_id,
                field,
                index,
            } => {
                let collection = catalog.get(collection_id)?;
                let position = collection.position(field.id())?;
                let same_position = index.map_or(true, |index| index == position);

                Some(same_position && collection.fields()[position] == **field)
            }
        }
    }

    pub(crate) fn target(&self) -> String {
        match self {
            Snapshot::Collection(schema) => schema.name().to_owned(),
            Snapshot::Field {
                collection_id,
                field,
                ..
            } => format!("{collection_id}.{}", field.name()),
        }
    }
}
