use std::time::Duration;

use mongodb::{
    bson::doc,
    options::{ClientOptions, ServerApi, ServerApiVersion},
    Client, Collection,
};

use crate::{
    config::Config,
    errors::AppResult,
    models::domain::{QuestionBatch, QuestionRecord},
};

const APP_NAME: &str = "teachai-server";

/// Typed handles on the two question bank collections.
pub struct QuestionBankCollections {
    pub batches: Collection<QuestionBatch>,
    pub questions: Collection<QuestionRecord>,
}

/// Pooled MongoDB client bound to the question bank database.
#[derive(Clone)]
pub struct Database {
    client: Client,
    database: mongodb::Database,
    batches_collection: String,
    questions_collection: String,
}

impl Database {
    pub async fn connect(config: &Config) -> AppResult<Self> {
        let options = client_options(config).await?;
        let client = Client::with_options(options)?;

        let db = Self {
            database: client.database(&config.mongo_db_name),
            client,
            batches_collection: config.batches_collection.clone(),
            questions_collection: config.questions_collection.clone(),
        };
        db.ping().await?;

        log::info!(
            "MongoDB ready db={} batches={} questions={} pool={}..{} timeout={}s",
            config.mongo_db_name,
            db.batches_collection,
            db.questions_collection,
            config.mongo_min_pool_size,
            config.mongo_max_pool_size,
            config.mongo_timeout_secs
        );
        Ok(db)
    }

    pub fn question_bank(&self) -> QuestionBankCollections {
        QuestionBankCollections {
            batches: self.database.collection(&self.batches_collection),
            questions: self.database.collection(&self.questions_collection),
        }
    }

    pub async fn health_check(&self) -> AppResult<()> {
        self.ping().await
    }

    async fn ping(&self) -> AppResult<()> {
        self.client
            .database("admin")
            .run_command(doc! { "ping": 1 })
            .await?;
        Ok(())
    }
}

/// Connection options from `Config`. Parsing a plain `mongodb://` URI does no
/// network I/O.
async fn client_options(config: &Config) -> AppResult<ClientOptions> {
    let mut options = ClientOptions::parse(&config.mongo_conn_string).await?;

    options.app_name = Some(APP_NAME.to_string());
    options.server_api = Some(ServerApi::builder().version(ServerApiVersion::V1).build());

    let max_pool = config.mongo_max_pool_size.max(1);
    options.max_pool_size = Some(max_pool);
    options.min_pool_size = Some(config.mongo_min_pool_size.min(max_pool));

    let timeout = Duration::from_secs(config.mongo_timeout_secs);
    options.connect_timeout = Some(timeout);
    options.server_selection_timeout = Some(timeout);

    Ok(options)
}
