pub mod conversation_memory;
pub mod question_repository;

pub use conversation_memory::{ConversationMemory, InMemoryConversationMemory};
pub use question_repository::{MongoQuestionRepository, QuestionRepository};
