//! Chat frontend HTML generation and embedding.
//!
//! The Parley frontend is a single self-contained HTML file with all CSS and
//! JavaScript inlined. It provides the chat pane, a conversation sidebar,
//! and the voice controls (record button + spoken-reply toggle).
//!
//! The HTML is embedded at compile time via `include_str!` so the binary has
//! no external file dependencies at runtime.

/// The complete self-contained chat frontend HTML.
///
/// A single HTML file with all CSS in `<style>` tags and all JavaScript in
/// `<script>` tags. No CDN links, no npm packages, no build step.
///
/// The page talks to the Parley API on its own origin and provides:
///
/// - **Chat pane**: user/assistant bubbles, typing indicator, error bubble
/// - **Sidebar**: past conversations (tracked in localStorage), new-chat button
/// - **Voice record**: MediaRecorder upload to `/voice/stt`, falling back to
///   the browser's built-in speech recognition when the provider path fails
/// - **Spoken replies**: toggle that routes turns through `/voice/chat` and
///   plays the base64 audio when present
pub const CHAT_HTML: &str = include_str!("../assets/chat.html");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chat_html_is_not_empty() {
        assert!(!CHAT_HTML.is_empty());
    }

    #[test]
    fn chat_html_is_valid_html() {
        assert!(CHAT_HTML.starts_with("<!DOCTYPE html>"));
        assert!(CHAT_HTML.contains("<html"));
        assert!(CHAT_HTML.contains("</html>"));
    }

    #[test]
    fn chat_html_contains_main_regions() {
        assert!(CHAT_HTML.contains("id=\"sidebar\""));
        assert!(CHAT_HTML.contains("id=\"messages\""));
        assert!(CHAT_HTML.contains("id=\"composer\""));
        assert!(CHAT_HTML.contains("id=\"mic-btn\""));
        assert!(CHAT_HTML.contains("id=\"voice-toggle\""));
        assert!(CHAT_HTML.contains("id=\"new-chat\""));
    }

    #[test]
    fn chat_html_has_embedded_css_and_js() {
        assert!(CHAT_HTML.contains("<style>"));
        assert!(CHAT_HTML.contains("</style>"));
        assert!(CHAT_HTML.contains("<script>"));
        assert!(CHAT_HTML.contains("</script>"));
    }

    #[test]
    fn chat_html_calls_the_api_surface() {
        assert!(CHAT_HTML.contains("/chat"));
        assert!(CHAT_HTML.contains("/voice/chat"));
        assert!(CHAT_HTML.contains("/voice/stt"));
        assert!(CHAT_HTML.contains("/chat/history/"));
    }

    #[test]
    fn chat_html_has_no_external_resources() {
        assert!(!CHAT_HTML.contains("https://cdn."));
        assert!(!CHAT_HTML.contains("src=\"http"));
        assert!(!CHAT_HTML.contains("href=\"http"));
    }

    #[test]
    fn chat_html_has_recognition_fallback() {
        assert!(CHAT_HTML.contains("webkitSpeechRecognition"));
    }
}
