use std::sync::Arc;

use futures::{stream::BoxStream, StreamExt};
use serde::Serialize;
use tokio::{
    sync::{mpsc, Semaphore},
    task::JoinSet,
};
use tokio_stream::wrappers::ReceiverStream;

use crate::{
    errors::{AppError, AppResult},
    models::{
        domain::{GeneratedItem, QuestionBatch, QuestionRecord},
        dto::{
            request::GenerationRequest,
            response::{GenerationErrorEvent, GeneratedItemEvent},
        },
    },
    repositories::QuestionRepository,
    services::{
        completion_provider::{complete_as, CompletionProvider},
        prompt_builder::build_question_prompt,
    },
};

const GENERATED_ITEM_SCHEMA: &str = "generated_item";

/// A started batch: the stored header plus one serialized event per unit,
/// in completion order. The stream ends once every dispatched unit reported.
pub struct BatchRun {
    pub batch: QuestionBatch,
    pub events: BoxStream<'static, String>,
}

/// Runs question batches. Provider calls from every batch draw on one shared
/// pool of `max_concurrency` permits.
pub struct QuestionGenerationService {
    provider: Arc<dyn CompletionProvider>,
    repository: Arc<dyn QuestionRepository>,
    max_concurrency: usize,
    permits: Arc<Semaphore>,
}

impl QuestionGenerationService {
    pub fn new(
        provider: Arc<dyn CompletionProvider>,
        repository: Arc<dyn QuestionRepository>,
        max_concurrency: usize,
    ) -> Self {
        let max_concurrency = max_concurrency.max(1);
        Self {
            provider,
            repository,
            max_concurrency,
            permits: Arc::new(Semaphore::new(max_concurrency)),
        }
    }

    /// Stores the batch header, then fans out one generation unit per
    /// requested question. Only the header insert can fail the call; unit
    /// failures surface as error events.
    pub async fn run_batch(&self, request: GenerationRequest) -> AppResult<BatchRun> {
        let batch = QuestionBatch::new(&request.subject, &request.knowledge_points);
        self.repository.insert_batch(&batch).await?;

        let count = request.effective_count();
        log::info!(
            "Starting batch {} ({}) with {} unit(s), {}/{} permit(s) free",
            batch.batch_id,
            batch.batch_name,
            count,
            self.permits.available_permits(),
            self.max_concurrency
        );

        let unit = Arc::new(GenerationUnit {
            provider: Arc::clone(&self.provider),
            repository: Arc::clone(&self.repository),
            request,
            batch_id: batch.batch_id.clone(),
        });
        let (tx, rx) = mpsc::channel(count);

        tokio::spawn(drive_batch(unit, Arc::clone(&self.permits), count, tx));

        Ok(BatchRun {
            batch,
            events: ReceiverStream::new(rx).boxed(),
        })
    }
}

async fn drive_batch(
    unit: Arc<GenerationUnit>,
    semaphore: Arc<Semaphore>,
    count: usize,
    tx: mpsc::Sender<String>,
) {
    let mut units = JoinSet::new();

    for index in 0..count {
        let permit = match Arc::clone(&semaphore).acquire_owned().await {
            Ok(permit) => permit,
            Err(_) => break,
        };
        if tx.is_closed() {
            log::info!(
                "Consumer of batch {} went away, {} unit(s) not dispatched",
                unit.batch_id,
                count - index
            );
            break;
        }

        let unit = Arc::clone(&unit);
        let tx = tx.clone();
        units.spawn(async move {
            let event = unit.run(index).await;
            // The permit covers the provider call and the insert only.
            drop(permit);
            // Receiver may be gone; the question is already persisted.
            let _ = tx.send(event).await;
        });
    }

    while let Some(joined) = units.join_next().await {
        if let Err(e) = joined {
            log::error!("Generation unit of batch {} aborted: {}", unit.batch_id, e);
            let error = AppError::InternalError(format!("generation unit aborted: {}", e));
            let _ = tx.send(unit.error_event(&error)).await;
        }
    }

    log::info!("Batch {} finished", unit.batch_id);
}

struct GenerationUnit {
    provider: Arc<dyn CompletionProvider>,
    repository: Arc<dyn QuestionRepository>,
    request: GenerationRequest,
    batch_id: String,
}

impl GenerationUnit {
    async fn run(&self, index: usize) -> String {
        match self.generate().await {
            Ok(item) => encode(
                &GeneratedItemEvent {
                    item: &item,
                    question_id: &self.batch_id,
                },
                &self.batch_id,
            ),
            Err(e) => {
                log::warn!("Unit {} of batch {} failed: {}", index, self.batch_id, e);
                self.error_event(&e)
            }
        }
    }

    async fn generate(&self) -> AppResult<GeneratedItem> {
        let prompt = build_question_prompt(&self.request);
        let item: GeneratedItem =
            complete_as(self.provider.as_ref(), &prompt, GENERATED_ITEM_SCHEMA).await?;
        let item = item.validated_for(self.request.question_type)?;

        let record = QuestionRecord::from_generated(
            &item,
            &self.batch_id,
            &self.request.subject,
            self.request.question_type,
            self.request.level,
        )?;
        self.repository.insert_question(record).await?;

        Ok(item)
    }

    fn error_event(&self, error: &AppError) -> String {
        encode(
            &GenerationErrorEvent {
                error: error.to_string(),
                question_id: &self.batch_id,
            },
            &self.batch_id,
        )
    }
}

fn encode<T: Serialize>(event: &T, batch_id: &str) -> String {
    serde_json::to_string(event).unwrap_or_else(|e| {
        serde_json::json!({ "error": format!("event encoding failed: {}", e), "questionId": batch_id })
            .to_string()
    })
}

#[cfg(test)]
mod tests {
    use std::{
        sync::{
            atomic::{AtomicUsize, Ordering},
            Mutex,
        },
        time::Duration,
    };

    use async_trait::async_trait;
    use serde_json::Value;

    use super::*;
    use crate::{
        models::domain::{ChatMessage, QuestionType},
        services::{
            completion_provider::{MockCompletionProvider, ResponseSchema, TextStream},
            prompt_builder::Prompt,
        },
        test_utils::fixtures::{generation_request as request, CHOICE_REPLY, JUDGE_REPLY},
    };

    #[derive(Default)]
    struct RecordingRepository {
        batches: Mutex<Vec<QuestionBatch>>,
        questions: Mutex<Vec<QuestionRecord>>,
        fail_batch: bool,
    }

    #[async_trait]
    impl QuestionRepository for RecordingRepository {
        async fn insert_batch(&self, batch: &QuestionBatch) -> AppResult<()> {
            if self.fail_batch {
                return Err(AppError::DatabaseError("connection refused".to_string()));
            }
            self.batches.lock().unwrap().push(batch.clone());
            Ok(())
        }

        async fn insert_question(&self, record: QuestionRecord) -> AppResult<QuestionRecord> {
            self.questions.lock().unwrap().push(record.clone());
            Ok(record)
        }

        async fn find_batch(&self, _batch_id: &str) -> AppResult<Option<QuestionBatch>> {
            Ok(None)
        }

        async fn list_batches(&self) -> AppResult<Vec<QuestionBatch>> {
            Ok(self.batches.lock().unwrap().clone())
        }

        async fn list_by_batch(&self, _batch_id: &str) -> AppResult<Vec<QuestionRecord>> {
            Ok(self.questions.lock().unwrap().clone())
        }

        async fn list_all(&self) -> AppResult<Vec<QuestionRecord>> {
            Ok(self.questions.lock().unwrap().clone())
        }

        async fn delete_question(&self, _id: &str) -> AppResult<bool> {
            Ok(false)
        }
    }

    /// Sleeps per call and tracks how many calls overlap. Call `n` waits
    /// `delays_ms[n]` (the last entry once the list runs out) and answers a
    /// judge item whose question names the call.
    struct PacedProvider {
        delays_ms: Vec<u64>,
        calls: AtomicUsize,
        in_flight: AtomicUsize,
        peak: AtomicUsize,
    }

    impl PacedProvider {
        fn new(delays_ms: &[u64]) -> Self {
            Self {
                delays_ms: delays_ms.to_vec(),
                calls: AtomicUsize::new(0),
                in_flight: AtomicUsize::new(0),
                peak: AtomicUsize::new(0),
            }
        }

        fn peak(&self) -> usize {
            self.peak.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl CompletionProvider for PacedProvider {
        async fn complete_structured(
            &self,
            _prompt: &Prompt,
            _schema: Option<ResponseSchema>,
        ) -> AppResult<String> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);

            let delay = self
                .delays_ms
                .get(call)
                .or(self.delays_ms.last())
                .copied()
                .unwrap_or_default();
            tokio::time::sleep(Duration::from_millis(delay)).await;

            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            Ok(format!(
                r#"{{"question":"call-{}","answer":"正确","explain":"e"}}"#,
                call
            ))
        }

        async fn complete_stream(&self, _messages: Vec<ChatMessage>) -> AppResult<TextStream> {
            Err(AppError::InternalError("not scripted".to_string()))
        }
    }

    async fn collect(run: BatchRun) -> Vec<Value> {
        run.events
            .map(|event| serde_json::from_str::<Value>(&event).expect("event is json"))
            .collect()
            .await
    }

    #[tokio::test]
    async fn emits_one_event_per_unit_tagged_with_batch_id() {
        let mut provider = MockCompletionProvider::new();
        provider
            .expect_complete_structured()
            .times(3)
            .returning(|_, _| Ok(JUDGE_REPLY.to_string()));
        let repository = Arc::new(RecordingRepository::default());
        let service = QuestionGenerationService::new(Arc::new(provider), repository.clone(), 2);

        let run = service
            .run_batch(request(QuestionType::Judge, 3))
            .await
            .expect("batch should start");
        let batch_id = run.batch.batch_id.clone();
        assert_eq!(run.batch.batch_name, "物理-牛顿定律练习");

        let events = collect(run).await;
        assert_eq!(events.len(), 3);
        for event in &events {
            assert_eq!(event["questionId"], batch_id.as_str());
            assert_eq!(event["answer"], "正确");
            assert!(event.get("options").is_none());
        }

        let questions = repository.questions.lock().unwrap();
        assert_eq!(questions.len(), 3);
        assert!(questions.iter().all(|q| q.batch_id == batch_id && q.difficulty == 5));
        assert_eq!(repository.batches.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn non_positive_count_runs_a_single_unit() {
        let mut provider = MockCompletionProvider::new();
        provider
            .expect_complete_structured()
            .times(1)
            .returning(|_, _| Ok(JUDGE_REPLY.to_string()));
        let service = QuestionGenerationService::new(
            Arc::new(provider),
            Arc::new(RecordingRepository::default()),
            4,
        );

        let run = service
            .run_batch(request(QuestionType::Judge, 0))
            .await
            .expect("batch should start");
        assert_eq!(collect(run).await.len(), 1);
    }

    #[tokio::test]
    async fn failing_units_do_not_stop_siblings() {
        let calls = Arc::new(Mutex::new(0usize));
        let mut provider = MockCompletionProvider::new();
        let counter = Arc::clone(&calls);
        provider.expect_complete_structured().returning(move |_, _| {
            let mut calls = counter.lock().unwrap();
            *calls += 1;
            if *calls == 2 {
                Err(AppError::ProviderError("upstream 503".to_string()))
            } else {
                Ok(JUDGE_REPLY.to_string())
            }
        });
        let repository = Arc::new(RecordingRepository::default());
        let service = QuestionGenerationService::new(Arc::new(provider), repository.clone(), 1);

        let run = service
            .run_batch(request(QuestionType::Judge, 3))
            .await
            .expect("batch should start");
        let batch_id = run.batch.batch_id.clone();
        let events = collect(run).await;

        assert_eq!(events.len(), 3);
        let errors: Vec<&Value> = events.iter().filter(|e| e.get("error").is_some()).collect();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0]["questionId"], batch_id.as_str());
        assert!(errors[0]["error"].as_str().unwrap_or_default().contains("upstream 503"));
        assert_eq!(repository.questions.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn choice_items_store_options_as_json() {
        let mut provider = MockCompletionProvider::new();
        provider
            .expect_complete_structured()
            .returning(|_, _| Ok(CHOICE_REPLY.to_string()));
        let repository = Arc::new(RecordingRepository::default());
        let service = QuestionGenerationService::new(Arc::new(provider), repository.clone(), 2);

        let run = service
            .run_batch(request(QuestionType::Choice, 1))
            .await
            .expect("batch should start");
        let events = collect(run).await;

        assert_eq!(events[0]["answer"], "B");
        assert_eq!(events[0]["options"][1], "B. 速度");

        let questions = repository.questions.lock().unwrap();
        assert_eq!(questions[0].question_type, "选择题");
        assert_eq!(
            questions[0].options.as_deref(),
            Some(r#"["A. 质量","B. 速度","C. 时间","D. 温度"]"#)
        );
    }

    #[tokio::test]
    async fn invalid_items_become_error_events() {
        let mut provider = MockCompletionProvider::new();
        provider
            .expect_complete_structured()
            .returning(|_, _| Ok(r#"{"question":"q","options":["A. 1","B. 2"],"answer":"A"}"#.to_string()));
        let repository = Arc::new(RecordingRepository::default());
        let service = QuestionGenerationService::new(Arc::new(provider), repository.clone(), 2);

        let run = service
            .run_batch(request(QuestionType::Choice, 2))
            .await
            .expect("batch should start");
        let events = collect(run).await;

        assert_eq!(events.len(), 2);
        assert!(events.iter().all(|e| e.get("error").is_some()));
        assert!(repository.questions.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn batch_insert_failure_fails_the_call() {
        let mut provider = MockCompletionProvider::new();
        provider.expect_complete_structured().never();
        let repository = Arc::new(RecordingRepository {
            fail_batch: true,
            ..Default::default()
        });
        let service = QuestionGenerationService::new(Arc::new(provider), repository, 2);

        let result = service.run_batch(request(QuestionType::Judge, 3)).await;
        assert!(matches!(result, Err(AppError::DatabaseError(_))));
    }

    #[tokio::test]
    async fn units_overlap_up_to_the_concurrency_bound() {
        let provider = Arc::new(PacedProvider::new(&[20]));
        let service = QuestionGenerationService::new(
            provider.clone(),
            Arc::new(RecordingRepository::default()),
            3,
        );

        let run = service
            .run_batch(request(QuestionType::Judge, 8))
            .await
            .expect("batch should start");
        assert_eq!(collect(run).await.len(), 8);

        let peak = provider.peak();
        assert!(peak > 1, "units never overlapped");
        assert!(peak <= 3, "peak of {} exceeds the bound", peak);
    }

    #[tokio::test]
    async fn events_arrive_in_completion_order() {
        let provider = Arc::new(PacedProvider::new(&[150, 5]));
        let service = QuestionGenerationService::new(
            provider,
            Arc::new(RecordingRepository::default()),
            2,
        );

        let run = service
            .run_batch(request(QuestionType::Judge, 2))
            .await
            .expect("batch should start");
        let events = collect(run).await;

        assert_eq!(events.len(), 2);
        assert_eq!(events[0]["question"], "call-1");
        assert_eq!(events[1]["question"], "call-0");
    }

    #[tokio::test]
    async fn concurrent_batches_share_one_bound() {
        let provider = Arc::new(PacedProvider::new(&[20]));
        let service = QuestionGenerationService::new(
            provider.clone(),
            Arc::new(RecordingRepository::default()),
            2,
        );

        let first = service
            .run_batch(request(QuestionType::Judge, 4))
            .await
            .expect("first batch should start");
        let second = service
            .run_batch(request(QuestionType::Judge, 4))
            .await
            .expect("second batch should start");
        let (first, second) = futures::join!(collect(first), collect(second));

        assert_eq!(first.len() + second.len(), 8);
        assert!(provider.peak() <= 2, "peak of {} exceeds the bound", provider.peak());
    }
}
