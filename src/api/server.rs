use crate::bot::{Bot, InboundMessage};
use crate::realtime::HttpFeedSource;
use axum::{
    Json, Router,
    extract::State,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use std::sync::Arc;
use tracing::info;

pub type SharedBot = Arc<Bot<HttpFeedSource>>;

pub fn router(bot: SharedBot) -> Router {
    Router::new()
        .route("/messages", post(post_message))
        .route("/health", get(health_check))
        .with_state(bot)
}

pub async fn run_server(bot: SharedBot, port: u16) -> std::io::Result<()> {
    let addr = format!("0.0.0.0:{}", port);
    info!(%addr, "Starting HTTP bridge");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, router(bot)).await
}

async fn post_message(State(bot): State<SharedBot>, Json(message): Json<InboundMessage>) -> Response {
    match bot.handle_message(&message).await {
        Some(reply) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
            reply,
        )
            .into_response(),
        None => StatusCode::NO_CONTENT.into_response(),
    }
}

async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gtfs::types::fixtures::sample_gtfs;
    use crate::realtime::FeedFormat;
    use crate::resolver::Dispatcher;
    use crate::resolver::dispatcher::tests::config;
    use std::time::Duration;

    async fn spawn_bridge() -> String {
        let feeds =
            HttpFeedSource::new(None, None, FeedFormat::Json, Duration::from_secs(1)).unwrap();
        let bot = Arc::new(Bot::new(Dispatcher::new(
            Arc::new(sample_gtfs()),
            feeds,
            config(),
        )));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router(bot)).await.unwrap();
        });
        format!("http://{}", addr)
    }

    #[tokio::test]
    async fn test_bridge_replies_in_plain_text() {
        let base = spawn_bridge().await;
        let client = reqwest::Client::new();

        let response = client
            .post(format!("{}/messages", base))
            .json(&serde_json::json!({"sender": "a1b2c3", "text": "bus 404"}))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), reqwest::StatusCode::OK);
        assert_eq!(response.text().await.unwrap(), "No stop found with that id.");

        let response = client
            .post(format!("{}/messages", base))
            .json(&serde_json::json!({"sender": "a1b2c3", "text": "nice weather"}))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), reqwest::StatusCode::NO_CONTENT);

        let response = client.get(format!("{}/health", base)).send().await.unwrap();
        assert_eq!(response.text().await.unwrap(), "OK");
    }
}
