use crate::store::{JsonStore, StoreError};
use crate::types::{CollectionDocument, CollectionFields, Record};
use crate::short_id;

impl JsonStore {
    pub async fn list_items<F: CollectionFields>(&self) -> Result<Vec<Record<F>>, StoreError> {
        let document: CollectionDocument<F> = self.read().await?;
        Ok(document.items)
    }

    pub async fn create_item<F: CollectionFields>(
        &self,
        fields: F,
    ) -> Result<Record<F>, StoreError> {
        let record = Record {
            id: short_id(),
            fields,
        };
        let created = record.clone();
        self.update(|document: &mut CollectionDocument<F>| {
            document.items.push(record);
            Ok::<_, StoreError>(())
        })
        .await?;
        tracing::info!("Created {} item {}", F::COLLECTION, created.id);
        Ok(created)
    }

    /// Replace an item's fields. Unknown ids are an error.
    pub async fn update_item<F: CollectionFields>(
        &self,
        id: &str,
        fields: F,
    ) -> Result<Record<F>, StoreError> {
        let updated = self
            .update(|document: &mut CollectionDocument<F>| {
                let item = document
                    .items
                    .iter_mut()
                    .find(|item| item.id == id)
                    .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
                item.fields = fields;
                Ok::<_, StoreError>(item.clone())
            })
            .await?;
        tracing::info!("Updated {} item {}", F::COLLECTION, id);
        Ok(updated)
    }

    /// Remove an item. Unknown ids are an error.
    pub async fn delete_item<F: CollectionFields>(&self, id: &str) -> Result<Record<F>, StoreError> {
        let removed = self
            .update(|document: &mut CollectionDocument<F>| {
                let index = document
                    .items
                    .iter()
                    .position(|item| item.id == id)
                    .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
                Ok::<_, StoreError>(document.items.remove(index))
            })
            .await?;
        tracing::info!("Deleted {} item {}", F::COLLECTION, id);
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use crate::types::{ExpenseFields, PersonFields};
    use crate::{JsonStore, StoreError};

    fn person(name: &str) -> PersonFields {
        PersonFields {
            first_name: name.to_string(),
            last_name: "Soto".to_string(),
            phone: "555".to_string(),
        }
    }

    #[tokio::test]
    async fn test_collection_lifecycle() {
        let temp_dir = tempfile::tempdir().unwrap();
        let store = JsonStore::new(temp_dir.path());

        let first = store.create_item(person("Ana")).await.unwrap();
        let second = store.create_item(person("Luis")).await.unwrap();
        assert_eq!(first.id.len(), 8);
        assert_ne!(first.id, second.id);

        let items = store.list_items::<PersonFields>().await.unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].fields.first_name, "Ana");

        let updated = store.update_item(&first.id, person("Ana María")).await.unwrap();
        assert_eq!(updated.id, first.id);
        assert_eq!(updated.fields.first_name, "Ana María");

        store.delete_item::<PersonFields>(&second.id).await.unwrap();
        let items = store.list_items::<PersonFields>().await.unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].fields.first_name, "Ana María");
    }

    #[tokio::test]
    async fn test_unknown_ids_are_not_found() {
        let temp_dir = tempfile::tempdir().unwrap();
        let store = JsonStore::new(temp_dir.path());

        let result = store.delete_item::<ExpenseFields>("missing1").await;
        assert!(matches!(result, Err(StoreError::NotFound(_))));

        let result = store
            .update_item(
                "missing1",
                ExpenseFields {
                    description: "taxi".to_string(),
                    amount: 12.5,
                },
            )
            .await;
        assert!(matches!(result, Err(StoreError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_collections_use_separate_files() {
        let temp_dir = tempfile::tempdir().unwrap();
        let store = JsonStore::new(temp_dir.path());

        store.create_item(person("Ana")).await.unwrap();
        store
            .create_item(ExpenseFields {
                description: "almuerzo".to_string(),
                amount: 9.75,
            })
            .await
            .unwrap();

        assert!(temp_dir.path().join("personas.json").exists());
        assert!(temp_dir.path().join("gastos.json").exists());
        assert_eq!(store.list_items::<ExpenseFields>().await.unwrap().len(), 1);
    }
}
