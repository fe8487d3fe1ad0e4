pub const QUESTION_SYSTEM_PROMPT: &str =
    "你是一名专业的教育测评专家，擅长针对知识点生成符合规范的考题，输出内容必须严格遵守 JSON 格式。";

/// Used when a request carries no knowledge points.
pub const DEFAULT_KNOWLEDGE_POINT: &str = "综合知识点";

pub const KNOWLEDGE_POINT_DELIMITER: &str = "、";

pub const CHOICE_SHAPE: &str = r#"- 题干：简洁、单问
- 必须给出 **4** 个备选项，列表顺序固定 A-D
- 正确答案返回选项字母（如 "B"）
- 最终仅输出合法 JSON，不要加入 markdown、中文括号或多余文字
{
  "question":"...",
  "options":["A. ...","B. ...","C. ...","D. ..."],
  "answer":"A",
  "explain":"..."
}"#;

pub const JUDGE_SHAPE: &str = r#"- 题干：陈述句
- answer 字段只能是 **"正确"** 或 **"错误"**
{
  "question":"...",
  "answer":"正确",
  "explain":"..."
}"#;

pub const OPEN_ANSWER_SHAPE: &str = r#"{
  "question":"...",
  "answer":"...",
  "explain":"..."
}"#;
