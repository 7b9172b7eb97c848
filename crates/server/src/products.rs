//! Product catalog API endpoints

use api_types::product::{ProductKind as ApiKind, ProductNew, ProductPatch, ProductView};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use engine::Money;

use crate::{ServerError, server::ServerState};

fn map_kind(kind: ApiKind) -> engine::ProductKind {
    match kind {
        ApiKind::Product => engine::ProductKind::Product,
        ApiKind::Service => engine::ProductKind::Service,
    }
}

fn map_engine_kind(kind: engine::ProductKind) -> ApiKind {
    match kind {
        engine::ProductKind::Product => ApiKind::Product,
        engine::ProductKind::Service => ApiKind::Service,
    }
}

fn product_view(product: engine::Product) -> ProductView {
    ProductView {
        id: product.id,
        name: product.name,
        description: product.description,
        kind: map_engine_kind(product.kind),
        price: product.price.minor(),
        in_stock: product.in_stock,
    }
}

pub async fn list(State(state): State<ServerState>) -> Result<Json<Vec<ProductView>>, ServerError> {
    let products = state.engine.products().await?;
    Ok(Json(products.into_iter().map(product_view).collect()))
}

pub async fn get(
    State(state): State<ServerState>,
    Path(id): Path<i32>,
) -> Result<Json<ProductView>, ServerError> {
    let product = state.engine.product(id).await?;
    Ok(Json(product_view(product)))
}

pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<ProductNew>,
) -> Result<(StatusCode, Json<ProductView>), ServerError> {
    let product = state
        .engine
        .new_product(engine::NewProduct {
            name: payload.name,
            description: payload.description,
            kind: map_kind(payload.kind),
            price: Money::new(payload.price),
            in_stock: payload.in_stock,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(product_view(product))))
}

pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<i32>,
    Json(payload): Json<ProductPatch>,
) -> Result<Json<ProductView>, ServerError> {
    let product = state
        .engine
        .update_product(
            id,
            engine::ProductUpdate {
                name: payload.name,
                description: payload.description,
                price: payload.price.map(Money::new),
                in_stock: payload.in_stock,
            },
        )
        .await?;
    Ok(Json(product_view(product)))
}
