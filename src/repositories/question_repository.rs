use std::collections::HashMap;

use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::{
    bson::{doc, Document},
    options::{FindOptions, IndexOptions},
    Collection, IndexModel,
};

use crate::{
    db::{Database, QuestionBankCollections},
    errors::AppResult,
    models::domain::{QuestionBatch, QuestionRecord},
};

/// Storage for generated batches and questions. Writers may call concurrently;
/// rows are only ever inserted or deleted, never updated in place.
#[async_trait]
pub trait QuestionRepository: Send + Sync {
    async fn insert_batch(&self, batch: &QuestionBatch) -> AppResult<()>;
    async fn insert_question(&self, record: QuestionRecord) -> AppResult<QuestionRecord>;
    async fn find_batch(&self, batch_id: &str) -> AppResult<Option<QuestionBatch>>;
    /// Batches newest first, each with its current question count.
    async fn list_batches(&self) -> AppResult<Vec<QuestionBatch>>;
    async fn list_by_batch(&self, batch_id: &str) -> AppResult<Vec<QuestionRecord>>;
    async fn list_all(&self) -> AppResult<Vec<QuestionRecord>>;
    /// Returns false when no question had that id.
    async fn delete_question(&self, id: &str) -> AppResult<bool>;
}

pub struct MongoQuestionRepository {
    batches: Collection<QuestionBatch>,
    questions: Collection<QuestionRecord>,
}

impl MongoQuestionRepository {
    pub fn new(db: &Database) -> Self {
        let QuestionBankCollections { batches, questions } = db.question_bank();
        Self { batches, questions }
    }

    pub async fn ensure_indexes(&self) -> AppResult<()> {
        log::info!("Creating indexes for question bank collections");

        let batch_id_index = IndexModel::builder()
            .keys(doc! { "batch_id": 1 })
            .options(
                IndexOptions::builder()
                    .unique(true)
                    .name("batch_id_unique".to_string())
                    .build(),
            )
            .build();
        self.batches.create_index(batch_id_index).await?;

        let question_id_index = IndexModel::builder()
            .keys(doc! { "id": 1 })
            .options(
                IndexOptions::builder()
                    .unique(true)
                    .name("id_unique".to_string())
                    .build(),
            )
            .build();
        self.questions.create_index(question_id_index).await?;

        let question_batch_index = IndexModel::builder()
            .keys(doc! { "batch_id": 1, "created_at": 1 })
            .options(
                IndexOptions::builder()
                    .name("batch_id_created_at".to_string())
                    .build(),
            )
            .build();
        self.questions.create_index(question_batch_index).await?;

        log::info!("Successfully created indexes for question bank collections");
        Ok(())
    }

    async fn question_counts(&self) -> AppResult<HashMap<String, i64>> {
        let pipeline = vec![doc! {
            "$group": { "_id": "$batch_id", "count": { "$sum": 1 } }
        }];

        let cursor = self.questions.aggregate(pipeline).await?;
        let groups: Vec<Document> = cursor.try_collect().await?;

        Ok(groups
            .into_iter()
            .filter_map(|group| {
                let batch_id = group.get_str("_id").ok()?.to_string();
                let count = group
                    .get_i32("count")
                    .map(i64::from)
                    .or_else(|_| group.get_i64("count"))
                    .ok()?;
                Some((batch_id, count))
            })
            .collect())
    }
}

#[async_trait]
impl QuestionRepository for MongoQuestionRepository {
    async fn insert_batch(&self, batch: &QuestionBatch) -> AppResult<()> {
        self.batches.insert_one(batch).await?;
        Ok(())
    }

    async fn insert_question(&self, record: QuestionRecord) -> AppResult<QuestionRecord> {
        self.questions.insert_one(&record).await?;
        Ok(record)
    }

    async fn find_batch(&self, batch_id: &str) -> AppResult<Option<QuestionBatch>> {
        let batch = self.batches.find_one(doc! { "batch_id": batch_id }).await?;
        Ok(batch)
    }

    async fn list_batches(&self) -> AppResult<Vec<QuestionBatch>> {
        let counts = self.question_counts().await?;

        let find_options = FindOptions::builder()
            .sort(doc! { "created_at": -1 })
            .build();
        let cursor = self.batches.find(doc! {}).with_options(find_options).await?;
        let mut batches: Vec<QuestionBatch> = cursor.try_collect().await?;

        for batch in &mut batches {
            batch.item_count = Some(counts.get(&batch.batch_id).copied().unwrap_or(0));
        }

        Ok(batches)
    }

    async fn list_by_batch(&self, batch_id: &str) -> AppResult<Vec<QuestionRecord>> {
        let find_options = FindOptions::builder()
            .sort(doc! { "created_at": 1 })
            .build();
        let cursor = self
            .questions
            .find(doc! { "batch_id": batch_id })
            .with_options(find_options)
            .await?;
        let items: Vec<QuestionRecord> = cursor.try_collect().await?;
        Ok(items)
    }

    async fn list_all(&self) -> AppResult<Vec<QuestionRecord>> {
        let find_options = FindOptions::builder()
            .sort(doc! { "created_at": -1 })
            .build();
        let cursor = self.questions.find(doc! {}).with_options(find_options).await?;
        let items: Vec<QuestionRecord> = cursor.try_collect().await?;
        Ok(items)
    }

    async fn delete_question(&self, id: &str) -> AppResult<bool> {
        let result = self.questions.delete_one(doc! { "id": id }).await?;
        Ok(result.deleted_count > 0)
    }
}
