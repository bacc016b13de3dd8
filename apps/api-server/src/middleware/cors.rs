//! CORS policy - any origin, method and header, with credentials.

use actix_cors::Cors;

use crate::observability::REQUEST_ID_HEADER;

/// Permissive cross-origin policy for browser dashboards.
///
/// Origins are echoed back rather than answered with `*`, since credentialed
/// requests reject the wildcard. `X-Request-ID` is exposed so scripts can
/// read the correlation id.
///
/// Mount it inside `RequestLogging` so preflights are recorded like any
/// other request.
pub fn permissive() -> Cors {
    Cors::default()
        .allow_any_origin()
        .allow_any_method()
        .allow_any_header()
        .supports_credentials()
        .expose_headers([REQUEST_ID_HEADER])
        .max_age(3600)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use actix_web::http::header;
    use actix_web::{App, test, web};
    use alerts_core::{Recorder, Severity, SinkSet};
    use alerts_infra::InMemorySink;
    use async_trait::async_trait;
    use serde_json::Value;

    use super::*;
    use crate::handlers;
    use crate::observability::RequestLogging;
    use crate::state::AppState;
    use alerts_core::ProbeError;
    use alerts_core::ports::DatabaseProbe;

    const ORIGIN: &str = "https://dashboard.example";

    struct Healthy;

    #[async_trait]
    impl DatabaseProbe for Healthy {
        async fn ping(&self) -> Result<(), ProbeError> {
            Ok(())
        }
    }

    fn request_sink() -> (Recorder, Arc<InMemorySink>) {
        let request = Arc::new(InMemorySink::new());
        let set = SinkSet::new(
            Severity::Debug,
            Arc::new(InMemorySink::new()),
            Arc::new(InMemorySink::new()),
            request.clone(),
        );
        (Recorder::new(Arc::new(set)), request)
    }

    fn header<B>(res: &actix_web::dev::ServiceResponse<B>, name: header::HeaderName) -> String {
        res.headers()
            .get(name)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string()
    }

    #[actix_web::test]
    async fn test_preflight_is_answered_and_logged() {
        let (recorder, request) = request_sink();
        let app = test::init_service(
            App::new()
                .wrap(permissive())
                .wrap(RequestLogging::new(recorder))
                .app_data(web::Data::new(AppState::with_probe(Arc::new(Healthy))))
                .configure(|cfg| handlers::configure_routes(cfg, "/api/v1")),
        )
        .await;

        let req = test::TestRequest::default()
            .method(actix_web::http::Method::OPTIONS)
            .uri("/api/v1/db-health")
            .insert_header((header::ORIGIN, ORIGIN))
            .insert_header((header::ACCESS_CONTROL_REQUEST_METHOD, "GET"))
            .insert_header((header::ACCESS_CONTROL_REQUEST_HEADERS, "content-type"))
            .to_request();
        let res = test::call_service(&app, req).await;

        assert!(res.status().is_success());
        assert_eq!(header(&res, header::ACCESS_CONTROL_ALLOW_ORIGIN), ORIGIN);
        assert_eq!(header(&res, header::ACCESS_CONTROL_ALLOW_CREDENTIALS), "true");
        let id = header(&res, header::HeaderName::from_static(REQUEST_ID_HEADER));
        assert!(!id.is_empty());

        let lines = request.lines().await;
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains(&format!("{id} - Request: ")));
        assert!(lines[0].contains("\"method\":\"OPTIONS\""));
        assert!(lines[1].contains(&format!("{id} - Response: ")));
    }

    #[actix_web::test]
    async fn test_cross_origin_get_exposes_request_id() {
        let (recorder, request) = request_sink();
        let app = test::init_service(
            App::new()
                .wrap(permissive())
                .wrap(RequestLogging::new(recorder))
                .app_data(web::Data::new(AppState::with_probe(Arc::new(Healthy))))
                .configure(|cfg| handlers::configure_routes(cfg, "/api/v1")),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/api/v1/health")
            .insert_header((header::ORIGIN, ORIGIN))
            .to_request();
        let res = test::call_service(&app, req).await;

        assert_eq!(res.status(), 200);
        assert_eq!(header(&res, header::ACCESS_CONTROL_ALLOW_ORIGIN), ORIGIN);
        assert_eq!(header(&res, header::ACCESS_CONTROL_ALLOW_CREDENTIALS), "true");
        assert!(
            header(&res, header::ACCESS_CONTROL_EXPOSE_HEADERS)
                .to_ascii_lowercase()
                .contains(REQUEST_ID_HEADER)
        );

        let id = header(&res, header::HeaderName::from_static(REQUEST_ID_HEADER));
        let body: Value = test::read_body_json(res).await;
        assert_eq!(body["request_id"], Value::String(id));
        assert_eq!(request.len().await, 2);
    }
}
