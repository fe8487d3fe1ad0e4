pub mod chat_message;
pub mod generated_item;
pub mod question;
pub mod question_batch;
pub mod question_record;
pub use chat_message::{ChatMessage, ChatRole};
pub use generated_item::GeneratedItem;
pub use question::{DifficultyLevel, QuestionType};
pub use question_batch::QuestionBatch;
pub use question_record::QuestionRecord;
