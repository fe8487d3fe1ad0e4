pub mod question_prompt;
pub mod teaching_design_prompt;
