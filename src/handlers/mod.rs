pub mod health_handler;
pub mod question_bank_handler;
pub mod question_handler;
pub mod sse;
pub mod teaching_design_handler;

use actix_web::web;

pub use health_handler::{health_check, health_check_live, health_check_ready};
pub use question_bank_handler::{
    delete_question, get_conversation, list_batch_questions, list_batches, list_questions,
};
pub use question_handler::generate_questions;
pub use teaching_design_handler::{create_lesson_plan, optimize_outline};

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(health_check)
        .service(health_check_live)
        .service(health_check_ready)
        .service(generate_questions)
        .service(optimize_outline)
        .service(create_lesson_plan)
        .service(list_batches)
        .service(list_batch_questions)
        .service(list_questions)
        .service(delete_question)
        .service(get_conversation);
}
