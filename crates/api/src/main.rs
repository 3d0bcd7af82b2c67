use crudkit_api::app::StoreBackend;

#[tokio::main]
async fn main() {
    crudkit_observability::init();

    let backend = match std::env::var("STORE_BACKEND") {
        Ok(v) => v.parse::<StoreBackend>().unwrap_or_else(|e| {
            tracing::warn!("{e}; falling back to document backend");
            StoreBackend::Document
        }),
        Err(_) => StoreBackend::Document,
    };

    let require_auth = std::env::var("REQUIRE_AUTH")
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
        .unwrap_or(false);

    let bind = std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string());

    let app = crudkit_api::app::build_app(backend, require_auth).expect("failed to build app");

    let listener = tokio::net::TcpListener::bind(&bind)
        .await
        .unwrap_or_else(|e| panic!("failed to bind {bind}: {e}"));

    tracing::info!("listening on {}", listener.local_addr().unwrap());

    axum::serve(listener, app).await.unwrap();
}
