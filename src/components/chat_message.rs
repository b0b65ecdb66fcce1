// src/components/chat_message.rs
use super::escape_html;
use crate::models::chat::Message;

/// A chat bubble: user messages on the right, assistant on the left, with
/// the send time as HH:MM.
pub fn render_chat_message(message: &Message) -> String {
    let (class, avatar) = if message.is_user() {
        ("user", "🧑")
    } else {
        ("assistant", "🤖")
    };

    format!(
        r#"<div class="message {class}" data-id="{id}">
    <div class="avatar">{avatar}</div>
    <div class="bubble">
        <p class="text">{content}</p>
        <div class="time">{time}</div>
    </div>
</div>"#,
        class = class,
        id = escape_html(&message.id),
        avatar = avatar,
        content = escape_html(&message.content),
        time = message.timestamp.format("%H:%M"),
    )
}
