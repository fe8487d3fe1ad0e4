pub mod chunk_sanitizer;
pub mod completion_provider;
pub mod prompt_builder;
pub mod question_bank_service;
pub mod question_generation_service;
pub mod teaching_design_service;
