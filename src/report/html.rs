//! Self-contained HTML report of translation results.
//!
//! One collapsible section per translated model, in input order, each
//! holding the model's translation status and a side-by-side diff of
//! source vs. translated SQL. Styling and the toggle script are inlined
//! so the document embeds in any host display surface.

use crate::api::{TranslatedModel, TranslationJob};
use crate::report::diff::{diff_lines, SourceLine, TargetLine};

pub const EMPTY_REPORT_MESSAGE: &str = "No queries were translated.";

const REPORT_STYLE: &str = r#"
<style>
    .collapsible {
        background-color: #f1f1f1;
        color: #333;
        cursor: pointer;
        padding: 18px;
        width: 100%;
        border: 1px solid #ddd;
        text-align: left;
        outline: none;
        font-size: 16px;
        font-family: sans-serif;
        margin-top: 10px;
        transition: background-color 0.3s;
    }
    .collapsible:hover {
        background-color: #e0e0e0;
    }
    .collapsible.active {
        background-color: #d0d0d0;
    }
    .content {
        padding: 0 18px;
        max-height: 0;
        overflow: hidden;
        transition: max-height 0.3s ease-out;
        background-color: white;
    }
    .content.active {
        max-height: 10000px;
        padding: 18px;
    }
    .sql-container {
        display: flex;
        gap: 20px;
        font-family: monospace;
    }
    .sql-column {
        flex: 1;
        border: 1px solid #ddd;
        padding: 15px;
        background-color: #f5f5f5;
        overflow-x: auto;
    }
    .sql-column h3 {
        margin-top: 0;
        color: #333;
        font-family: sans-serif;
    }
    .line {
        font-size: 12px;
        line-height: 1.6;
        padding: 2px 4px;
        white-space: pre-wrap;
    }
    .unchanged {
        background-color: transparent;
    }
    .removed {
        background-color: #ffecec;
        color: #d73a49;
    }
    .added {
        background-color: #e6ffec;
        color: #22863a;
    }
</style>
"#;

const REPORT_SCRIPT: &str = r#"
<script>
    function toggleCollapse(element) {
        element.classList.toggle('active');
        const content = element.nextElementSibling;
        content.classList.toggle('active');
    }
</script>
"#;

/// Render the final report. Empty results produce the fixed message
/// instead of an empty report shell.
pub fn render_report(job: &TranslationJob) -> String {
    if job.translated_models.is_empty() {
        return EMPTY_REPORT_MESSAGE.to_string();
    }

    let mut html = String::new();
    html.push_str(REPORT_STYLE);
    html.push_str(REPORT_SCRIPT);

    for model in &job.translated_models {
        html.push_str("<button class=\"collapsible\" onclick=\"toggleCollapse(this)\">");
        html.push_str(&escape_html(&model.asset_name));
        html.push_str("</button>\n<div class=\"content\">\n");
        html.push_str(&render_model(model));
        html.push_str("</div>\n");
    }

    html
}

fn render_model(model: &TranslatedModel) -> String {
    let target_sql = model.target_sql.as_deref().unwrap_or("");
    let columns = diff_lines(&model.source_sql, target_sql);

    let mut html = String::new();
    html.push_str("<p>Translation Status: <span class=\"status\">");
    html.push_str(&escape_html(&model.translation_status));
    html.push_str("</span></p>\n<div class=\"sql-container\">\n");

    html.push_str("<div class=\"sql-column\">\n<h3>Source SQL</h3>\n");
    for line in &columns.source {
        let class = match line {
            SourceLine::Unchanged(_) => "unchanged",
            SourceLine::Removed(_) => "removed",
        };
        push_line(&mut html, class, line.content());
    }
    html.push_str("</div>\n");

    html.push_str("<div class=\"sql-column\">\n<h3>Translated SQL</h3>\n");
    for line in &columns.target {
        let class = match line {
            TargetLine::Unchanged(_) => "unchanged",
            TargetLine::Added(_) => "added",
        };
        push_line(&mut html, class, line.content());
    }
    html.push_str("</div>\n</div>\n");

    html
}

fn push_line(html: &mut String, class: &str, content: &str) {
    html.push_str("<div class=\"line ");
    html.push_str(class);
    html.push_str("\">");
    html.push_str(&escape_html(content));
    html.push_str("</div>\n");
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
