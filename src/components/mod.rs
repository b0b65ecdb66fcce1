// src/components/mod.rs
//! Stateless HTML fragments shared by the pages.

pub mod chat_message;
pub mod document_viewer;
pub mod file_upload;

pub use chat_message::render_chat_message;
pub use document_viewer::render_document_viewer;
pub use file_upload::render_file_upload;

/// Escapes text for use inside HTML element content and quoted attributes.
pub fn escape_html(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

const PAGE_SHELL: &str = r###"
<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{{TITLE}} - SyllabusAI</title>
    <style>
        * { margin: 0; padding: 0; box-sizing: border-box; }
        body { font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif; color: #111827; background: #f9fafb; }
        header { border-bottom: 1px solid #e5e7eb; background: white; }
        header .bar { max-width: 1100px; margin: 0 auto; height: 64px; display: flex; align-items: center; padding: 0 1.5rem; }
        header .brand { font-weight: 600; }
        header nav { margin-left: auto; display: flex; gap: 1.5rem; }
        header nav a { color: #111827; text-decoration: none; font-size: 0.9rem; font-weight: 500; }
        main { max-width: 1100px; margin: 0 auto; padding: 2rem 1.5rem; }
        .card { background: white; border: 1px solid #e5e7eb; border-radius: 10px; padding: 1.5rem; }
        .button { display: inline-block; background: #111827; color: white; border: none; border-radius: 6px; padding: 0.6rem 1.1rem; cursor: pointer; text-decoration: none; font-size: 0.9rem; }
        .button.outline { background: white; color: #111827; border: 1px solid #d1d5db; }
        .button:disabled { opacity: 0.5; cursor: not-allowed; }
        .muted { color: #6b7280; }
        .toast { position: fixed; bottom: 1.5rem; right: 1.5rem; padding: 1rem 1.25rem; border-radius: 8px; background: #111827; color: white; display: none; }
        .toast.error { background: #dc2626; }
        .message { display: flex; gap: 0.75rem; max-width: 80%; margin-bottom: 1rem; }
        .message.user { margin-left: auto; flex-direction: row-reverse; }
        .message.assistant { margin-right: auto; }
        .message .avatar { width: 32px; height: 32px; border-radius: 50%; background: #e0e7ff; display: flex; align-items: center; justify-content: center; flex-shrink: 0; }
        .message .bubble { border-radius: 8px; padding: 0.75rem; background: #f3f4f6; }
        .message.user .bubble { background: #111827; color: white; }
        .message .text { font-size: 0.9rem; white-space: pre-wrap; }
        .message .time { margin-top: 0.25rem; font-size: 0.75rem; opacity: 0.7; }
        .document-viewer { height: 60vh; overflow-y: auto; }
        .document-viewer p { margin-bottom: 0.75rem; line-height: 1.6; }
        .document-empty { height: 60vh; display: flex; align-items: center; justify-content: center; color: #6b7280; }
        .file-drop { display: flex; flex-direction: column; align-items: center; justify-content: center; padding: 1.5rem; border: 2px dashed #d1d5db; border-radius: 8px; cursor: pointer; }
        .file-drop.active { border-color: #111827; background: #f3f4f6; }
        .file-selected { display: none; align-items: center; justify-content: space-between; padding: 1rem; border: 1px solid #e5e7eb; border-radius: 8px; background: #f9fafb; }
    </style>
</head>
<body>
    <header>
        <div class="bar">
            <div class="brand">📘 SyllabusAI</div>
            <nav>
                <a href="/dashboard">Dashboard</a>
                <a href="/upload">Upload</a>
                <a href="/chat">Chat</a>
            </nav>
        </div>
    </header>
    <main>
{{BODY}}
    </main>
    <div class="toast" id="toast"></div>
    <script>
        function showToast(message, isError) {
            const toast = document.getElementById('toast');
            toast.textContent = message;
            toast.className = isError ? 'toast error' : 'toast';
            toast.style.display = 'block';
            setTimeout(() => { toast.style.display = 'none'; }, 4000);
        }
    </script>
</body>
</html>
"###;

/// Substitutes `{{KEY}}` placeholders in a single left-to-right pass.
/// Inserted values are never rescanned, so user text containing `{{...}}`
/// comes out untouched. Unknown keys are left as they are.
pub fn fill_template(template: &str, values: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let Some(end) = after.find("}}") else {
            out.push_str(&rest[start..]);
            return out;
        };

        let key = &after[..end];
        match values.iter().find(|(k, _)| *k == key) {
            Some((_, value)) => out.push_str(value),
            None => out.push_str(&rest[start..start + 2 + end + 2]),
        }
        rest = &after[end + 2..];
    }

    out.push_str(rest);
    out
}

/// Wraps page content in the shared header, styles and toast helper.
/// `title` is escaped; `body` is inserted as-is.
pub fn page_shell(title: &str, body: &str) -> String {
    fill_template(PAGE_SHELL, &[("TITLE", escape_html(title).as_str()), ("BODY", body)])
}
