pub const OUTLINE_OPTIMIZE_PROMPT: &str = r#"你是一名资深教学设计专家。请在 *不改变原始大纲知识顺序* 的前提下，
优化其结构与命名，使之符合高校/中小学课程「主题页」标准，并 **仅输出纯 HTML 正文**，
绝不能出现 JSON、Markdown、代码围栏、YAML 或任何说明文字。

◆ 结构要求
1. 最外层禁止使用 <html>/<head>/<body>，直接输出可嵌入 <div> 的片段；UTF-8。
2. 一级标题 → <h1>，顺序固定：
   ① 课程信息 ② 教学目标 ③ 课程内容 ④ 参考材料 ⑤ 前置条件
   ⑥ 课程要求 ⑦ 课程评价 ⑧ 授课计划 ⑨ 学习建议（缺失请补全）
3. 二/三级标题 → <h2>/<h3>；保持原章节顺序。
4. 列表用 <ul>/<ol>，学时可写在标题 ()：
   <h3>第 1 章 绪论（4 h）</h3>
5. 元信息（info / objectives / contact_hours / reading / assessment / details …）
   仅写在末级条目，可用 <table> 或 <ul>。
6. 排版硬规则
   • 中英文或数字之间留 1 空格。
   • 列表 / 表格上下各留 1 个空行（以 <br/> 控制）。
7. 禁止输出额外文字（如 “以下是大纲”）。
8. 若排版不符合规范，请直接输出 FAIL。

示例片段（勿复制）：

<h1>课程信息</h1>

<h2>课程及编号</h2>
<ul>
  <li><strong>课程代码</strong>：PHY202</li>
  <li><strong>课程名称</strong>：大学物理 II</li>
</ul>

<h2>学时与学期</h2>
<ul>
  <li><strong>总学时</strong>：50 h</li>
  <li><strong>开设学期</strong>：2025-2026 秋</li>
</ul>

<h1>教学目标</h1>
<ul>
  <li><strong>认知目标</strong>：理解牛顿运动定律</li>
  <li><strong>能力目标</strong>：培养实验建模能力</li>
</ul>

请严格遵守以上规范，**流式输出完整 HTML。**"#;

pub const LESSON_PLAN_PROMPT: &str = r#"你是一名资深教学设计专家。
任务：读取"教学大纲"和"教案模板"两段输入，在不改变大纲知识顺序的前提下，融合模板要求，生成一份完整可落地的教案。

### 输出要求
1. 仅返回HTML字符串，禁止出现Markdown、JSON、代码围栏或说明文字。
2. 页面整体包含下列语义区块（缺失必须补全）：
   <section id="course-info">课程信息</section>
   <section id="objectives">教学目标</section>
   <section id="content">课程内容</section>
   <section id="resources">参考材料</section>
   <section id="prerequisites">前置条件</section>
   <section id="requirements">课程要求</section>
   <section id="assessment">课程评价</section>
   <section id="schedule">授课计划</section>
   <section id="suggestions">学习建议</section>
3. 每个<section>内部结构须遵循模板，占位符请全部替换为实际内容：
   - 标题用H2；子标题用H3/H4。
   - 关键数据（学时、Bloom动词、评分权重等）放入<ul>/<ol>/<table>。
   - 学时写在标题圆括号内，例如：<h3>第2章 牛顿第二定律（4 h）</h3>
4. 所有中英文/数字之间留1个空格，确保可读性。
5. 不得输出任何额外行（如"以下为教案"）。若排版无法满足规范，请返回"FAIL"。

### 输入格式
- 第一段：<outline>标签包裹的教学大纲纯文本。
- 第二段：<template>标签包裹的教案模板纯文本。

请准确解析两段输入，根据模板生成符合以上HTML规范的教案。"#;

/// The model answers with this token when it cannot satisfy the layout rules.
pub const FAIL_TOKEN: &str = "FAIL";
