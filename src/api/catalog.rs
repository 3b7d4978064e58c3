//! Customers, suppliers, products and services.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};

use super::extract::{CurrentUser, Payload};
use crate::actions::{customers, products, services, suppliers};
use crate::error::Result;
use crate::models::{
    Customer, CustomerInput, Product, ProductInput, Service, ServiceInput, StockAdjustment,
    Supplier, SupplierInput,
};
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/customers", get(list_customers).post(create_customer))
        .route(
            "/customers/:id",
            get(get_customer).put(update_customer).delete(delete_customer),
        )
        .route("/suppliers", get(list_suppliers).post(create_supplier))
        .route(
            "/suppliers/:id",
            get(get_supplier).put(update_supplier).delete(delete_supplier),
        )
        .route("/products", get(list_products).post(create_product))
        .route("/products/low-stock", get(low_stock_products))
        .route(
            "/products/:id",
            get(get_product).put(update_product).delete(delete_product),
        )
        .route("/products/:id/stock", post(adjust_stock))
        .route("/services", get(list_services).post(create_service))
        .route(
            "/services/:id",
            get(get_service).put(update_service).delete(delete_service),
        )
}

async fn list_customers(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
) -> Result<Json<Vec<Customer>>> {
    Ok(Json(customers::list(&state.db, user_id).await?))
}

async fn get_customer(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(id): Path<i32>,
) -> Result<Json<Customer>> {
    Ok(Json(customers::get(&state.db, user_id, id).await?))
}

async fn create_customer(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Payload(input): Payload<CustomerInput>,
) -> Result<(StatusCode, Json<Customer>)> {
    let customer = customers::create(&state.db, user_id, input).await?;
    Ok((StatusCode::CREATED, Json(customer)))
}

async fn update_customer(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(id): Path<i32>,
    Payload(input): Payload<CustomerInput>,
) -> Result<Json<Customer>> {
    Ok(Json(customers::update(&state.db, user_id, id, input).await?))
}

async fn delete_customer(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(id): Path<i32>,
) -> Result<StatusCode> {
    customers::delete(&state.db, user_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn list_suppliers(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
) -> Result<Json<Vec<Supplier>>> {
    Ok(Json(suppliers::list(&state.db, user_id).await?))
}

async fn get_supplier(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(id): Path<i32>,
) -> Result<Json<Supplier>> {
    Ok(Json(suppliers::get(&state.db, user_id, id).await?))
}

async fn create_supplier(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Payload(input): Payload<SupplierInput>,
) -> Result<(StatusCode, Json<Supplier>)> {
    let supplier = suppliers::create(&state.db, user_id, input).await?;
    Ok((StatusCode::CREATED, Json(supplier)))
}

async fn update_supplier(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(id): Path<i32>,
    Payload(input): Payload<SupplierInput>,
) -> Result<Json<Supplier>> {
    Ok(Json(suppliers::update(&state.db, user_id, id, input).await?))
}

async fn delete_supplier(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(id): Path<i32>,
) -> Result<StatusCode> {
    suppliers::delete(&state.db, user_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn list_products(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
) -> Result<Json<Vec<Product>>> {
    Ok(Json(products::list(&state.db, user_id).await?))
}

async fn low_stock_products(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
) -> Result<Json<Vec<Product>>> {
    Ok(Json(products::low_stock(&state.db, user_id).await?))
}

async fn get_product(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(id): Path<i32>,
) -> Result<Json<Product>> {
    Ok(Json(products::get(&state.db, user_id, id).await?))
}

async fn create_product(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Payload(input): Payload<ProductInput>,
) -> Result<(StatusCode, Json<Product>)> {
    let product = products::create(&state.db, user_id, input).await?;
    Ok((StatusCode::CREATED, Json(product)))
}

async fn update_product(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(id): Path<i32>,
    Payload(input): Payload<ProductInput>,
) -> Result<Json<Product>> {
    Ok(Json(products::update(&state.db, user_id, id, input).await?))
}

async fn adjust_stock(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(id): Path<i32>,
    Payload(adjustment): Payload<StockAdjustment>,
) -> Result<Json<Product>> {
    Ok(Json(products::adjust_stock(&state.db, user_id, id, adjustment).await?))
}

async fn delete_product(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(id): Path<i32>,
) -> Result<StatusCode> {
    products::delete(&state.db, user_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn list_services(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
) -> Result<Json<Vec<Service>>> {
    Ok(Json(services::list(&state.db, user_id).await?))
}

async fn get_service(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(id): Path<i32>,
) -> Result<Json<Service>> {
    Ok(Json(services::get(&state.db, user_id, id).await?))
}

async fn create_service(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Payload(input): Payload<ServiceInput>,
) -> Result<(StatusCode, Json<Service>)> {
    let service = services::create(&state.db, user_id, input).await?;
    Ok((StatusCode::CREATED, Json(service)))
}

async fn update_service(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(id): Path<i32>,
    Payload(input): Payload<ServiceInput>,
) -> Result<Json<Service>> {
    Ok(Json(services::update(&state.db, user_id, id, input).await?))
}

async fn delete_service(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(id): Path<i32>,
) -> Result<StatusCode> {
    services::delete(&state.db, user_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
