//! The dashboard client against a live server on a loopback port.

use std::sync::Arc;

use serde_json::json;

use insights_api::jwt::{JwtService, ISSUER};
use insights_api::{build_router, AppState};
use insights_client::{
    ClientError, Credentials, DashboardApi, DashboardController, FilterSelection,
    HttpDashboardApi, LoadState,
};
use insights_common::{Facet, RecordFields};
use insights_store::{MemoryRecordStore, MemoryUserStore};

/// Serve the router on an ephemeral port and return the API root URL.
async fn spawn_server(require_auth: bool) -> String {
    let records = MemoryRecordStore::with_records(vec![
        RecordFields::builder()
            .title("Oil demand")
            .topic("oil")
            .region("World")
            .end_year("2040")
            .build(),
        RecordFields::builder()
            .title("Gas prices")
            .topic("gas")
            .region("Northern America")
            .end_year("2020")
            .build(),
    ]);
    let state = Arc::new(AppState {
        records: Arc::new(records),
        users: Arc::new(MemoryUserStore::new()),
        jwt: JwtService::new("test-secret", ISSUER.to_string(), 1),
        require_auth,
    });

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, build_router(state, &[])).await.unwrap();
    });
    format!("http://{addr}/api")
}

#[tokio::test]
async fn reads_records_and_facets_over_http() {
    let base = spawn_server(false).await;
    let api = HttpDashboardApi::new(&base).unwrap();

    let all = api.fetch_records(&FilterSelection::new()).await.unwrap();
    assert_eq!(all.len(), 2);

    let selection = FilterSelection::new().select(
        Facet::Region,
        vec!["Northern America".to_string(), "World".to_string()],
    );
    let filtered = api.fetch_records(&selection).await.unwrap();
    assert_eq!(filtered.len(), 1);
    assert_eq!(filtered[0].title, "Gas prices");

    let facets = api.fetch_facets().await.unwrap();
    assert_eq!(facets.regions, vec!["Northern America", "World"]);
    assert_eq!(facets.end_years, vec!["2020", "2040"]);
}

#[tokio::test]
async fn record_crud_round_trip() {
    let base = spawn_server(false).await;
    let api = HttpDashboardApi::new(&base).unwrap();

    let created = api
        .create_record(&RecordFields::builder().title("Coal exit").topic("coal").build())
        .await
        .unwrap();

    let updated = api
        .update_record(created.id, &json!({"sector": "Energy"}))
        .await
        .unwrap();
    assert_eq!(updated.sector, "Energy");
    assert_eq!(updated.title, "Coal exit");

    api.delete_record(created.id).await.unwrap();
    match api.delete_record(created.id).await {
        Err(ClientError::Status { status, message }) => {
            assert_eq!(status, 404);
            assert_eq!(message, "Record not found");
        }
        other => panic!("expected 404, got {other:?}"),
    }

    match api.create_record(&RecordFields::default()).await {
        Err(ClientError::Status { status, .. }) => assert_eq!(status, 400),
        other => panic!("expected 400, got {other:?}"),
    }
}

#[tokio::test]
async fn protected_deployment_needs_explicit_credentials() {
    let base = spawn_server(true).await;
    let anonymous = HttpDashboardApi::new(&base).unwrap();

    let err = anonymous.fetch_facets().await.unwrap_err();
    assert!(matches!(err, ClientError::Unauthorized(_)));

    let user = anonymous
        .register("Ada Lovelace", "ada@example.com", "analytical")
        .await
        .unwrap();
    let credentials = Credentials::from_user(&user).unwrap();

    let api = HttpDashboardApi::new(&base)
        .unwrap()
        .with_credentials(credentials);
    assert_eq!(api.me().await.unwrap().email, "ada@example.com");

    let controller = DashboardController::new(Arc::new(api));
    assert_eq!(controller.load().await, LoadState::Ready);
    let state = controller.state().await;
    assert_eq!(state.records.len(), 2);
    assert_eq!(state.facets.topics, vec!["gas", "oil"]);

    let load = controller
        .apply_filters(FilterSelection::new().select(Facet::Topic, "oil"))
        .await;
    assert_eq!(load, LoadState::Ready);
    assert_eq!(controller.charts().await.kpis.total_records, 1);
}

#[tokio::test]
async fn login_failure_is_reported_as_unauthorized() {
    let base = spawn_server(false).await;
    let api = HttpDashboardApi::new(&base).unwrap();
    api.register("Ada Lovelace", "ada@example.com", "analytical")
        .await
        .unwrap();

    let user = api.login("ada@example.com", "analytical").await.unwrap();
    assert!(user.token.is_some());

    match api.login("ada@example.com", "nope-nope").await {
        Err(ClientError::Unauthorized(message)) => assert_eq!(message, "Invalid credentials"),
        other => panic!("expected 401, got {other:?}"),
    }
}
