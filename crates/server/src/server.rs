use axum::{
    Router,
    routing::{get, patch, post},
};

use std::sync::Arc;

use crate::{
    billing, customers, intake, pre_orders, products, service_entries, service_items, statistics,
    vehicles,
};
use engine::Engine;

#[derive(Clone)]
pub struct ServerState {
    pub engine: Arc<Engine>,
}

fn router(state: ServerState) -> Router {
    Router::new()
        .route("/api/customers", get(customers::list).post(customers::create))
        .route(
            "/api/customers/{id}",
            get(customers::get).patch(customers::update),
        )
        .route("/api/customers/{id}/vehicles", get(customers::vehicles))
        .route("/api/vehicles", get(vehicles::list).post(vehicles::create))
        .route(
            "/api/vehicles/{id}",
            get(vehicles::get).patch(vehicles::update),
        )
        .route(
            "/api/vehicles/{id}/service-entries",
            get(vehicles::service_entries),
        )
        .route("/api/service-entries", get(service_entries::list))
        .route("/api/service-entries/direct", post(service_entries::create))
        .route(
            "/api/service-entries/{id}",
            get(service_entries::get).patch(service_entries::update),
        )
        .route(
            "/api/service-entries/{id}/details",
            get(service_entries::details),
        )
        .route("/api/service-entries/{id}/items", get(service_entries::items))
        .route("/api/service-items", post(service_items::create))
        .route(
            "/api/service-items/{id}",
            patch(service_items::update).delete(service_items::remove),
        )
        .route("/api/products", get(products::list).post(products::create))
        .route(
            "/api/products/{id}",
            get(products::get).patch(products::update),
        )
        .route(
            "/api/pre-orders",
            get(pre_orders::list).post(pre_orders::create),
        )
        .route("/api/pre-orders/{id}", get(pre_orders::get))
        .route("/api/pre-orders/{id}/status", patch(pre_orders::update_status))
        .route("/api/vehicle-entries", post(intake::create))
        .route("/api/billing", post(billing::submit))
        .route("/api/dashboard/stats", get(statistics::daily))
        .with_state(state)
}

pub async fn run(engine: Engine) {
    let listener = match tokio::net::TcpListener::bind("127.0.0.1:3000").await {
        Ok(listener) => listener,
        Err(err) => {
            tracing::error!("failed to bind server listener: {err}");
            return;
        }
    };
    if let Err(err) = run_with_listener(engine, listener).await {
        tracing::error!("server failed: {err}");
    }
}

pub async fn run_with_listener(
    engine: Engine,
    listener: tokio::net::TcpListener,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!("Server listening on {}", addr);

    let state = ServerState {
        engine: Arc::new(engine),
    };

    axum::serve(listener, router(state)).await
}

pub fn spawn_with_listener(
    engine: Engine,
    listener: tokio::net::TcpListener,
) -> Result<std::net::SocketAddr, std::io::Error> {
    let addr = listener.local_addr()?;

    tokio::spawn(async move {
        if let Err(err) = run_with_listener(engine, listener).await {
            tracing::error!("server failed: {err}");
        }
    });

    Ok(addr)
}

#[cfg(test)]
mod tests {
    use super::*;

    use axum::{
        body::Body,
        http::{Request, StatusCode, header},
    };
    use http_body_util::BodyExt;
    use migration::MigratorTrait;
    use sea_orm::Database;
    use serde_json::{Value, json};
    use tower::ServiceExt;

    async fn test_router() -> Router {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        migration::Migrator::up(&db, None).await.unwrap();
        let engine = Engine::builder().database(db).build().await.unwrap();
        router(ServerState {
            engine: Arc::new(engine),
        })
    }

    fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get_request(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    async fn open_entry(router: &Router) -> i64 {
        let response = router
            .clone()
            .oneshot(json_request(
                "POST",
                "/api/vehicle-entries",
                json!({
                    "vehicleType": "bike",
                    "make": "Hero",
                    "model": "Splendor",
                    "customerName": "Ravi",
                    "customerPhone": "9876543210",
                }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        let body = body_json(response).await;
        body["id"].as_i64().unwrap()
    }

    #[tokio::test]
    async fn intake_then_billing_completes_the_job() {
        let router = test_router().await;
        let entry_id = open_entry(&router).await;

        let response = router
            .clone()
            .oneshot(json_request(
                "POST",
                "/api/billing",
                json!({
                    "serviceEntryId": entry_id,
                    "items": [
                        {"productName": "General Service", "quantity": 1, "price": 50_000}
                    ],
                    "paymentMethod": "cash",
                    "markAsComplete": true,
                }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        assert_eq!(body["totalAmount"], 59_000);
        assert_eq!(body["status"], "completed");
        assert_eq!(body["isPaid"], true);
        assert_eq!(body["paymentMethod"], "cash");
        assert_eq!(body["customer"]["name"], "Ravi");
        assert_eq!(body["items"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn item_mutations_report_the_entry_total() {
        let router = test_router().await;
        let entry_id = open_entry(&router).await;

        let response = router
            .clone()
            .oneshot(json_request(
                "POST",
                "/api/service-items",
                json!({
                    "serviceEntryId": entry_id,
                    "productName": "Engine Oil",
                    "quantity": 2,
                    "price": 45_000,
                }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        let body = body_json(response).await;
        assert_eq!(body["entryTotal"], 90_000);
        let item_id = body["id"].as_i64().unwrap();

        let response = router
            .clone()
            .oneshot(
                Request::builder()
                    .method("DELETE")
                    .uri(format!("/api/service-items/{item_id}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["entryTotal"], 0);
    }

    #[tokio::test]
    async fn backwards_status_transition_is_unprocessable() {
        let router = test_router().await;
        let entry_id = open_entry(&router).await;

        let response = router
            .clone()
            .oneshot(json_request(
                "PATCH",
                &format!("/api/service-entries/{entry_id}"),
                json!({"status": "delivered"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = router
            .clone()
            .oneshot(json_request(
                "PATCH",
                &format!("/api/service-entries/{entry_id}"),
                json!({"status": "in_progress"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn active_filter_excludes_delivered_entries() {
        let router = test_router().await;
        let entry_id = open_entry(&router).await;

        let response = router
            .clone()
            .oneshot(json_request(
                "PATCH",
                &format!("/api/service-entries/{entry_id}"),
                json!({"status": "delivered"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = router
            .clone()
            .oneshot(get_request("/api/service-entries?status=active"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert!(body.as_array().unwrap().is_empty());

        let response = router
            .clone()
            .oneshot(get_request("/api/service-entries"))
            .await
            .unwrap();
        let body = body_json(response).await;
        assert_eq!(body.as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn duplicate_phone_conflicts() {
        let router = test_router().await;

        let payload = json!({"name": "Ravi", "phone": "9876543210"});
        let response = router
            .clone()
            .oneshot(json_request("POST", "/api/customers", payload.clone()))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);

        let response = router
            .clone()
            .oneshot(json_request("POST", "/api/customers", payload))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn missing_resources_are_not_found() {
        let router = test_router().await;

        for uri in [
            "/api/customers/999",
            "/api/vehicles/999",
            "/api/service-entries/999",
            "/api/products/999",
        ] {
            let response = router.clone().oneshot(get_request(uri)).await.unwrap();
            assert_eq!(response.status(), StatusCode::NOT_FOUND, "{uri}");
        }
    }

    #[tokio::test]
    async fn dashboard_stats_cover_the_day() {
        let router = test_router().await;
        let entry_id = open_entry(&router).await;

        router
            .clone()
            .oneshot(json_request(
                "POST",
                "/api/billing",
                json!({
                    "serviceEntryId": entry_id,
                    "items": [{"productName": "Wash", "quantity": 1, "price": 20_000}],
                    "paymentMethod": "upi",
                    "markAsComplete": true,
                }),
            ))
            .await
            .unwrap();

        let response = router
            .clone()
            .oneshot(get_request("/api/dashboard/stats"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["vehicleCount"], 1);
        assert_eq!(body["activeJobs"], 0);
        assert_eq!(body["totalRevenue"], 23_600);
        assert_eq!(body["pendingPayments"], 0);
    }

    #[tokio::test]
    async fn catalog_is_seeded_and_listable() {
        let router = test_router().await;

        let response = router
            .clone()
            .oneshot(get_request("/api/products"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert!(!body.as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn pre_order_round_trip() {
        let router = test_router().await;

        let response = router
            .clone()
            .oneshot(json_request(
                "POST",
                "/api/pre-orders",
                json!({
                    "itemName": "Helmet",
                    "advanceAmount": 20_000,
                    "customerName": "Ravi",
                    "contactNumber": "9876543210",
                }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        let body = body_json(response).await;
        let order_id = body["id"].as_i64().unwrap();
        assert_eq!(body["status"], "pending");

        let response = router
            .clone()
            .oneshot(json_request(
                "PATCH",
                &format!("/api/pre-orders/{order_id}/status"),
                json!({"status": "delivered"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["status"], "delivered");
        assert!(body["deliveredDate"].is_string());
    }
}
