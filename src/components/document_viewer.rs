// src/components/document_viewer.rs
use super::escape_html;

/// Renders document text one paragraph per line.
pub fn render_document_viewer(content: &str) -> String {
    if content.is_empty() {
        return r#"<div class="document-empty">No document content available</div>"#.to_string();
    }

    let paragraphs: String = content
        .split('\n')
        .map(|paragraph| format!("<p>{}</p>", escape_html(paragraph.trim_end_matches('\r'))))
        .collect::<Vec<_>>()
        .join("\n");

    format!(r#"<div class="card document-viewer">{}</div>"#, paragraphs)
}
