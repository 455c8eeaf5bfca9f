//! HTML overview page

use axum::{extract::State, response::Html, Extension};

use crate::error::Result;
use crate::server::session::SessionId;
use crate::server::state::AppState;
use crate::types::{Conversation, Document};

/// GET / - Documents and this session's conversation history
pub async fn index(
    State(state): State<AppState>,
    Extension(session): Extension<SessionId>,
) -> Result<Html<String>> {
    let documents = state.db().list_documents()?;
    let conversations = if session.is_new() {
        Vec::new()
    } else {
        state.db().list_conversations(session.id())?
    };

    Ok(Html(render_page(&documents, &conversations)))
}

fn render_page(documents: &[Document], conversations: &[Conversation]) -> String {
    let document_items = if documents.is_empty() {
        "<li class=\"empty\">No documents uploaded yet.</li>".to_string()
    } else {
        documents.iter().map(render_document).collect()
    };

    let conversation_items = if conversations.is_empty() {
        "<li class=\"empty\">No questions asked in this session.</li>".to_string()
    } else {
        conversations.iter().map(render_conversation).collect()
    };

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>AI Research Assistant</title>
<style>
body {{ font-family: sans-serif; max-width: 60rem; margin: 2rem auto; padding: 0 1rem; }}
li {{ margin-bottom: 0.75rem; }}
.meta {{ color: #666; font-size: 0.85rem; }}
.empty {{ color: #999; list-style: none; }}
</style>
</head>
<body>
<h1>AI Research Assistant</h1>
<section>
<h2>Upload</h2>
<form action="/upload" method="post" enctype="multipart/form-data">
<input type="file" name="file" accept=".pdf,.txt">
<button type="submit">Upload</button>
</form>
</section>
<section>
<h2>Documents</h2>
<ul id="documents">
{document_items}
</ul>
</section>
<section>
<h2>Conversation</h2>
<ul id="conversations">
{conversation_items}
</ul>
</section>
</body>
</html>
"#
    )
}

fn render_document(doc: &Document) -> String {
    let status = if doc.processed { "processed" } else { "not processed" };
    format!(
        "<li><strong>{}</strong> <span class=\"meta\">#{} &middot; {} &middot; {} &middot; {}</span><p>{}</p></li>\n",
        escape_html(&doc.original_filename),
        doc.id,
        doc.file_type,
        doc.upload_time.format("%Y-%m-%d %H:%M"),
        status,
        escape_html(doc.summary.as_deref().unwrap_or("")),
    )
}

fn render_conversation(conv: &Conversation) -> String {
    format!(
        "<li><p><strong>Q:</strong> {}</p><p><strong>A:</strong> {}</p><span class=\"meta\">{}</span></li>\n",
        escape_html(&conv.question),
        escape_html(&conv.answer),
        conv.timestamp.format("%Y-%m-%d %H:%M:%S"),
    )
}

/// Escape text for HTML element content and attribute values
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#x27;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
