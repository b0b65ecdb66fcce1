// src/services/prompt.rs
const SYSTEM_PROMPT_PREAMBLE: &str = "You are a helpful study assistant that helps students understand their course syllabus. \
Use the following syllabus content as your knowledge base. \
Only answer questions related to this specific course syllabus. \
If asked about something not in the syllabus, politely explain that information isn't in the document.";

/// System prompt with the whole document inlined. No chunking: large
/// documents go to the model as-is.
pub fn build_system_prompt(document_content: &str) -> String {
    format!("{}\n\nSYLLABUS CONTENT:\n{}", SYSTEM_PROMPT_PREAMBLE, document_content)
}
