use axum::Json;

use crate::dto::HealthResponse;

pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

#[cfg(test)]
mod tests {
    use super::health_handler;

    #[tokio::test]
    async fn health_reports_ok() {
        assert_eq!(health_handler().await.0.status, "ok");
    }
}
