//! HTML pages for the upload and chat UIs.

use axum::response::Html;

/// GET `/` - invoice upload page.
pub async fn index_page() -> Html<&'static str> {
    Html(include_str!("../../templates/index.html"))
}

/// GET `/chat` - chat page.
pub async fn chat_page() -> Html<&'static str> {
    Html(include_str!("../../templates/chat.html"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_pages_contain_expected_anchors() {
        let Html(index) = index_page().await;
        assert!(index.contains("invoice_file"));
        assert!(index.contains("/upload"));

        let Html(chat) = chat_page().await;
        assert!(chat.contains("/chat/message"));
    }
}
