//! Integration tests for the user and health endpoints
//!
//! Every test builds the `Test` environment: an in-memory unit of work,
//! a fixed clock and sequential ids.

#[cfg(test)]
mod users_tests {
    use actix_web::http::StatusCode;
    use actix_web::{test, web};
    use chrono::{TimeZone, Utc};
    use serde_json::{json, Value};
    use std::sync::Arc;
    use uuid::Uuid;

    use qz_api::{create_app, AppState};
    use qz_core::container::Container;
    use qz_core::persistence::InMemoryUnitOfWorkProvider;
    use qz_core::services::{
        Clock, FixedClock, IdGenerator, SequentialIdGenerator, CLOCK, ID_GENERATOR,
    };
    use qz_infra::{build_container, IN_MEMORY_STORE};
    use qz_shared::{AppConfig, Environment};

    async fn test_container() -> Container {
        let container = build_container(&AppConfig::for_tests())
            .for_environment(Environment::Test)
            .unwrap();

        let clock = FixedClock::new(Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap());
        container.register_instance(&CLOCK, Arc::new(clock) as Arc<dyn Clock>);
        container.register_instance(
            &ID_GENERATOR,
            Arc::new(SequentialIdGenerator::new()) as Arc<dyn IdGenerator>,
        );
        container
    }

    async fn ready_state(container: &Container) -> AppState {
        let state = AppState::from_container(container).await.unwrap();
        state.context.initialize().await.unwrap();
        state
    }

    async fn store(container: &Container) -> Arc<InMemoryUnitOfWorkProvider> {
        container.resolve(&IN_MEMORY_STORE).await.unwrap()
    }

    #[actix_web::test]
    async fn test_create_user_awards_welcome_badge() {
        let container = test_container().await;
        let app = test::init_service(create_app(web::Data::new(ready_state(&container).await))).await;

        let req = test::TestRequest::post()
            .uri("/api/v1/users")
            .set_json(json!({ "email": "Learner@Example.com", "display_name": "Learner" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);

        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["id"], json!(Uuid::from_u128(1)));
        assert_eq!(body["email"], "learner@example.com");
        assert_eq!(body["role"], "student");
        assert_eq!(body["badges"], json!(["welcome"]));
        assert_eq!(body["created_at"], "2024-03-01T09:00:00Z");

        let tables = store(&container).await.snapshot().await;
        assert_eq!(tables.users.len(), 1);
        assert_eq!(tables.badges.len(), 1);
    }

    #[actix_web::test]
    async fn test_duplicate_email_conflicts_without_partial_writes() {
        let container = test_container().await;
        let app = test::init_service(create_app(web::Data::new(ready_state(&container).await))).await;

        for expected in [StatusCode::CREATED, StatusCode::CONFLICT] {
            let req = test::TestRequest::post()
                .uri("/api/v1/users")
                .set_json(json!({ "email": "learner@example.com", "display_name": "Learner" }))
                .to_request();
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), expected);
        }

        let tables = store(&container).await.snapshot().await;
        assert_eq!(tables.users.len(), 1);
        assert_eq!(tables.badges.len(), 1);
    }

    #[actix_web::test]
    async fn test_invalid_request_is_rejected() {
        let container = test_container().await;
        let app = test::init_service(create_app(web::Data::new(ready_state(&container).await))).await;

        let req = test::TestRequest::post()
            .uri("/api/v1/users")
            .set_json(json!({ "email": "not-an-email", "display_name": "" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], "VALIDATION_ERROR");
        assert!(body["details"]["email"].is_array());
        assert!(body["details"]["display_name"].is_array());

        assert!(store(&container).await.snapshot().await.is_empty());
    }

    #[actix_web::test]
    async fn test_malformed_json_is_bad_request() {
        let container = test_container().await;
        let app = test::init_service(create_app(web::Data::new(ready_state(&container).await))).await;

        let req = test::TestRequest::post()
            .uri("/api/v1/users")
            .insert_header(("content-type", "application/json"))
            .set_payload("{\"email\": ")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], "BAD_REQUEST");
    }

    #[actix_web::test]
    async fn test_get_user_reads_committed_state() {
        let container = test_container().await;
        let app = test::init_service(create_app(web::Data::new(ready_state(&container).await))).await;

        let req = test::TestRequest::post()
            .uri("/api/v1/users")
            .set_json(json!({ "email": "reader@example.com", "display_name": "Reader" }))
            .to_request();
        let created: Value = test::call_and_read_body_json(&app, req).await;

        let req = test::TestRequest::get()
            .uri(&format!("/api/v1/users/{}", created["id"].as_str().unwrap()))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["display_name"], "Reader");
        assert_eq!(body["badges"], json!(["welcome"]));
    }

    #[actix_web::test]
    async fn test_unknown_user_is_not_found() {
        let container = test_container().await;
        let app = test::init_service(create_app(web::Data::new(ready_state(&container).await))).await;

        let req = test::TestRequest::get()
            .uri(&format!("/api/v1/users/{}", Uuid::from_u128(42)))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);

        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], "NOT_FOUND");
    }

    #[actix_web::test]
    async fn test_health_reports_provider() {
        let container = test_container().await;
        let app = test::init_service(create_app(web::Data::new(ready_state(&container).await))).await;

        let req = test::TestRequest::get().uri("/health").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["database"], "in_memory");
    }

    #[actix_web::test]
    async fn test_health_unavailable_before_initialize() {
        let container = test_container().await;
        let state = AppState::from_container(&container).await.unwrap();
        let app = test::init_service(create_app(web::Data::new(state))).await;

        let req = test::TestRequest::get().uri("/health").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);

        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], "SERVICE_UNAVAILABLE");
    }

    #[actix_web::test]
    async fn test_unknown_route_is_not_found() {
        let container = test_container().await;
        let app = test::init_service(create_app(web::Data::new(ready_state(&container).await))).await;

        let req = test::TestRequest::get().uri("/api/v2/nothing").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }
}
