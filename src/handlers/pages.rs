use crate::components::{
    escape_html, fill_template, page_shell, render_chat_message, render_document_viewer, render_file_upload,
};
use crate::models::chat::Message;
use crate::AppState;
use axum::{
    extract::{Extension, Query},
    response::Html,
    routing::get,
    Router,
};
use serde::Deserialize;
use std::sync::Arc;

pub fn page_routes() -> Router {
    Router::new()
        .route("/", get(home_page))
        .route("/dashboard", get(dashboard_page))
        .route("/upload", get(upload_page))
        .route("/chat", get(chat_page))
}

pub async fn home_page() -> Html<String> {
    let body = r###"
        <section style="display: grid; grid-template-columns: 1fr 1fr; gap: 3rem; align-items: center; padding: 4rem 0;">
            <div>
                <h1 style="font-size: 3rem; line-height: 1.1; margin-bottom: 1rem;">Study Smarter with Your Syllabus AI</h1>
                <p class="muted" style="font-size: 1.2rem; margin-bottom: 2rem;">
                    Upload your course syllabus and get personalized study assistance, topic explanations, and answers to your questions.
                </p>
                <a class="button" href="/upload">Get Started →</a>
                <a class="button outline" href="/dashboard">Your Documents</a>
            </div>
            <div class="card" style="text-align: center; font-size: 5rem;">📘</div>
        </section>
        <section style="display: grid; grid-template-columns: repeat(3, 1fr); gap: 1.5rem;">
            <div class="card"><h3>📄 Upload</h3><p class="muted">Add your syllabus as a PDF or text file.</p></div>
            <div class="card"><h3>💬 Ask</h3><p class="muted">Chat about deadlines, grading, readings and topics.</p></div>
            <div class="card"><h3>📚 Review</h3><p class="muted">Read the extracted document side by side with the chat.</p></div>
        </section>
"###;

    Html(page_shell("Home", body))
}

pub async fn dashboard_page(Extension(state): Extension<Arc<AppState>>) -> Html<String> {
    let documents = state.documents.list().await;

    let content = if documents.is_empty() {
        r###"
        <div class="card" style="text-align: center; padding: 3rem;">
            <div style="font-size: 3rem;">📄</div>
            <h3 style="margin: 0.5rem 0;">No documents yet</h3>
            <p class="muted" style="margin-bottom: 1rem;">Upload your first syllabus to get started</p>
            <a class="button" href="/upload">+ Upload Document</a>
        </div>
"###
        .to_string()
    } else {
        let cards: Vec<String> = documents
            .iter()
            .map(|doc| {
                format!(
                    r###"
            <div class="card" data-document-id="{id}">
                <h3 style="white-space: nowrap; overflow: hidden; text-overflow: ellipsis;">{name}</h3>
                <p class="muted">Uploaded {date}</p>
                <p class="muted" style="font-size: 0.85rem; margin: 1rem 0;">📄 Syllabus Document</p>
                <div style="display: flex; justify-content: space-between;">
                    <a class="button outline" href="/chat?documentId={id}">💬 Chat</a>
                    <button class="button outline" style="color: #dc2626;" onclick="hideDocument('{id}')">🗑</button>
                </div>
            </div>"###,
                    id = escape_html(&doc.id),
                    name = escape_html(&doc.name),
                    date = doc.uploaded_at.format("%b %d, %Y"),
                )
            })
            .collect();

        format!(
            r#"<div style="display: grid; grid-template-columns: repeat(3, 1fr); gap: 1.5rem;">{}</div>"#,
            cards.join("\n")
        )
    };

    // Removal only hides the card; documents are kept on the server.
    let body = format!(
        r###"
        <div style="display: flex; justify-content: space-between; align-items: center; margin-bottom: 1.5rem;">
            <h1>Your Documents</h1>
            <a class="button" href="/upload">+ Upload New</a>
        </div>
        {content}
        <script>
            function hideDocument(id) {{
                const card = document.querySelector('[data-document-id="' + id + '"]');
                if (card) {{
                    card.remove();
                    showToast('The document has been removed from this view.', false);
                }}
            }}
        </script>
"###,
        content = content
    );

    Html(page_shell("Dashboard", &body))
}

pub async fn upload_page(Extension(state): Extension<Arc<AppState>>) -> Html<String> {
    let body = r###"
        <h1 style="text-align: center; margin-bottom: 2rem;">Upload Your Syllabus</h1>
        <div class="card" style="max-width: 560px; margin: 0 auto;">
            <h3>Document Upload</h3>
            <p class="muted" style="margin-bottom: 1.5rem;">Upload your syllabus document to get started. We support PDF, DOCX, and TXT files.</p>
            <form id="uploadForm">
                <label for="documentName" style="display: block; font-weight: 500; margin-bottom: 0.5rem;">Document Name</label>
                <input id="documentName" placeholder="Enter a name for your document"
                       style="width: 100%; padding: 0.6rem; border: 1px solid #d1d5db; border-radius: 6px; margin-bottom: 1.5rem;">
                <label style="display: block; font-weight: 500; margin-bottom: 0.5rem;">Upload File</label>
                {{FILE_UPLOAD}}
                <p class="muted" style="font-size: 0.85rem; margin: 0.5rem 0 1.5rem;">Maximum file size: {{MAX_MB}}MB. Supported formats: PDF, DOCX, TXT</p>
                <button type="submit" class="button" id="uploadButton" style="width: 100%;" disabled>⬆️ Upload Document</button>
            </form>
        </div>
        <script>
            const MAX_SIZE = {{MAX_BYTES}};
            const nameInput = document.getElementById('documentName');
            const uploadButton = document.getElementById('uploadButton');

            window.onFileSelected = function (file) {
                uploadButton.disabled = !file;
                if (file) {
                    // Default document name to the file name without extension
                    nameInput.value = file.name.split('.')[0];
                }
            };

            document.getElementById('uploadForm').addEventListener('submit', async (e) => {
                e.preventDefault();
                const file = window.selectedFiles['syllabusFile'];

                if (!file) {
                    showToast('Please select a file to upload.', true);
                    return;
                }
                if (!nameInput.value.trim()) {
                    showToast('Please provide a name for your document.', true);
                    return;
                }
                if (file.size > MAX_SIZE) {
                    showToast('File must be under {{MAX_MB}}MB.', true);
                    return;
                }

                uploadButton.disabled = true;
                uploadButton.textContent = '⏳ Processing...';

                try {
                    const formData = new FormData();
                    formData.append('file', file);
                    formData.append('name', nameInput.value.trim());

                    const response = await fetch('/api/documents/upload', { method: 'POST', body: formData });
                    const data = await response.json();
                    if (!response.ok) throw new Error(data.error || 'Upload failed');

                    showToast('Your syllabus has been processed and is ready for use.', false);
                    window.location.href = '/chat?documentId=' + encodeURIComponent(data.documentId);
                } catch (error) {
                    console.error('Upload error:', error);
                    showToast('There was an error uploading your document. Please try again.', true);
                    uploadButton.disabled = false;
                    uploadButton.textContent = '⬆️ Upload Document';
                }
            });
        </script>
"###;
    let body = fill_template(
        body,
        &[
            ("FILE_UPLOAD", render_file_upload("syllabusFile").as_str()),
            ("MAX_BYTES", state.config.max_upload_bytes.to_string().as_str()),
            ("MAX_MB", (state.config.max_upload_bytes / (1024 * 1024)).to_string().as_str()),
        ],
    );

    Html(page_shell("Upload", &body))
}

#[derive(Debug, Deserialize)]
pub struct ChatPageQuery {
    #[serde(rename = "documentId")]
    pub document_id: Option<String>,
}

pub async fn chat_page(
    Query(query): Query<ChatPageQuery>,
    Extension(state): Extension<Arc<AppState>>,
) -> Html<String> {
    let document = match query.document_id.as_deref() {
        Some(id) => state.documents.get(id).await,
        None => None,
    };

    let (title, content, welcome) = match (&query.document_id, &document) {
        (_, Some(doc)) => (
            doc.name.clone(),
            doc.content.clone(),
            format!(
                "I've analyzed your syllabus \"{}\". What would you like to know about this course?",
                doc.name
            ),
        ),
        (Some(id), None) => {
            tracing::warn!("Chat page requested for unknown document {}", id);
            (
                "Your Syllabus".to_string(),
                String::new(),
                "Failed to load document. Please upload it again.".to_string(),
            )
        }
        (None, None) => (
            "Your Syllabus".to_string(),
            String::new(),
            "Welcome! Please upload a syllabus document to get started.".to_string(),
        ),
    };

    let document_id_js = match document {
        Some(ref doc) => format!("'{}'", escape_html(&doc.id)),
        None => "null".to_string(),
    };

    let body = r###"
        <h1 style="text-align: center; margin-bottom: 1.5rem;">{{TITLE}}</h1>
        <div style="margin-bottom: 1rem;">
            <button class="button" id="chatTab" onclick="showTab('chat')">Chat</button>
            <button class="button outline" id="documentTab" onclick="showTab('document')">Document</button>
        </div>
        <div id="chatPanel" class="card" style="height: 60vh; display: flex; flex-direction: column; padding: 0;">
            <div id="messages" style="flex: 1; overflow-y: auto; padding: 1rem;">
                {{WELCOME}}
            </div>
            <form id="chatForm" style="display: flex; gap: 0.5rem; padding: 1rem; border-top: 1px solid #e5e7eb;">
                <input id="chatInput" placeholder="Ask a question about your syllabus..."
                       style="flex: 1; padding: 0.6rem; border: 1px solid #d1d5db; border-radius: 6px;">
                <button type="submit" class="button" id="sendButton">➤</button>
            </form>
        </div>
        <div id="documentPanel" style="display: none;">
            {{DOCUMENT}}
        </div>
        <script>
            const documentId = {{DOCUMENT_ID}};
            const messages = document.getElementById('messages');
            const input = document.getElementById('chatInput');
            const sendButton = document.getElementById('sendButton');
            let isLoading = false;

            function showTab(tab) {
                document.getElementById('chatPanel').style.display = tab === 'chat' ? 'flex' : 'none';
                document.getElementById('documentPanel').style.display = tab === 'document' ? 'block' : 'none';
                document.getElementById('chatTab').className = tab === 'chat' ? 'button' : 'button outline';
                document.getElementById('documentTab').className = tab === 'document' ? 'button' : 'button outline';
            }

            function appendMessage(role, content) {
                const now = new Date();
                const wrapper = document.createElement('div');
                wrapper.className = 'message ' + role;
                wrapper.dataset.id = String(now.getTime());
                const avatar = document.createElement('div');
                avatar.className = 'avatar';
                avatar.textContent = role === 'user' ? '🧑' : '🤖';
                const bubble = document.createElement('div');
                bubble.className = 'bubble';
                const text = document.createElement('p');
                text.className = 'text';
                text.textContent = content;
                const time = document.createElement('div');
                time.className = 'time';
                time.textContent = now.toLocaleTimeString([], { hour: '2-digit', minute: '2-digit' });
                bubble.appendChild(text);
                bubble.appendChild(time);
                wrapper.appendChild(avatar);
                wrapper.appendChild(bubble);
                messages.appendChild(wrapper);
                messages.scrollTop = messages.scrollHeight;
            }

            document.getElementById('chatForm').addEventListener('submit', async (e) => {
                e.preventDefault();
                const prompt = input.value;
                if (!prompt.trim() || isLoading) return;

                appendMessage('user', prompt);
                input.value = '';
                isLoading = true;
                sendButton.disabled = true;
                input.disabled = true;

                try {
                    const response = await fetch('/api/chat/generate', {
                        method: 'POST',
                        headers: { 'Content-Type': 'application/json' },
                        body: JSON.stringify({ prompt, documentId })
                    });
                    if (!response.ok) throw new Error('Failed to generate response');
                    const data = await response.json();
                    appendMessage('assistant', data.text);
                } catch (error) {
                    console.error('Error generating response:', error);
                    showToast('Failed to generate a response. Please try again.', true);
                } finally {
                    isLoading = false;
                    sendButton.disabled = false;
                    input.disabled = false;
                    input.focus();
                }
            });
        </script>
"###;
    let body = fill_template(
        body,
        &[
            ("TITLE", escape_html(&title).as_str()),
            ("WELCOME", render_chat_message(&Message::assistant("welcome", welcome)).as_str()),
            ("DOCUMENT", render_document_viewer(&content).as_str()),
            ("DOCUMENT_ID", document_id_js.as_str()),
        ],
    );

    Html(page_shell(&title, &body))
}
