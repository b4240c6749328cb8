// ================================================================================================
// ORDERS API
// ================================================================================================
//
// CRUD surface for the order collection, plus delete. Orders embed their line
// items; a line item has no identity of its own. Status is unconstrained at
// creation and only validated on the update path, and an order can only be
// deleted while it is still pending.
//
// ================================================================================================

use axum::{
    Router,
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    routing::get,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

use crate::api::{Data, Envelope};
use crate::errors::AppError;
use crate::state::AppState;
use crate::store::{Keyed, Store};
use crate::validate;

/// Statuses an update may set. "delivered" is terminal and gets its own
/// reject; it can only enter the store through the permissive create path.
const UPDATABLE_STATUSES: [&str; 3] = ["pending", "preparing", "out-for-delivery"];

// ================================================================================================
// RECORD & PAYLOAD TYPES
// ================================================================================================

/// A stored order. `status` is omitted from JSON while unset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: String,
    #[serde(rename = "deliverTo")]
    pub deliver_to: String,
    #[serde(rename = "mobileNumber")]
    pub mobile_number: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    pub dishes: Vec<OrderLineItem>,
}

impl Keyed for Order {
    fn id(&self) -> &str {
        &self.id
    }
}

/// One dish line inside an order. Whatever dish-reference fields the client
/// sent ride along untouched; only `quantity` is constrained.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderLineItem {
    pub quantity: Number,
    #[serde(flatten)]
    pub dish: Map<String, Value>,
}

/// Loosely-typed inbound `data` object for create/update.
///
/// `dishes` stays a raw JSON value so the pipeline can tell "absent" from
/// "not an array" from "empty", and line-item quantities are inspected as raw
/// values to report the first offending index.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct OrderPayload {
    pub id: Option<String>,
    #[serde(rename = "deliverTo")]
    pub deliver_to: Option<String>,
    #[serde(rename = "mobileNumber")]
    pub mobile_number: Option<String>,
    pub status: Option<String>,
    pub dishes: Option<Value>,
}

/// Field set shared by create and update, extracted once validation passed.
struct OrderFields {
    deliver_to: String,
    mobile_number: String,
    status: Option<String>,
    dishes: Vec<OrderLineItem>,
}

impl OrderPayload {
    fn into_fields(self) -> Result<OrderFields, AppError> {
        let Self {
            deliver_to: Some(deliver_to),
            mobile_number: Some(mobile_number),
            status,
            dishes: Some(dishes),
            ..
        } = self
        else {
            return Err(AppError::Internal(
                "order payload escaped validation with missing fields".to_string(),
            ));
        };
        let dishes: Vec<OrderLineItem> = serde_json::from_value(dishes)
            .map_err(|err| AppError::Internal(format!("order dishes escaped validation: {err}")))?;
        Ok(OrderFields {
            deliver_to,
            mobile_number,
            status,
            dishes,
        })
    }
}

// ================================================================================================
// VALIDATION CHECKS
// ================================================================================================

/// Per-request context threaded through the order checks.
pub struct OrderContext<'a> {
    store: &'a Store<Order>,
    data: OrderPayload,
    route_id: Option<String>,
    /// Resolved by `order_exists` for the checks and handler behind it.
    order: Option<Order>,
    /// Cached by `has_dishes` for the quantity scan.
    dishes: Option<Vec<Value>>,
}

impl<'a> OrderContext<'a> {
    fn new(store: &'a Store<Order>, data: OrderPayload, route_id: Option<String>) -> Self {
        Self {
            store,
            data,
            route_id,
            order: None,
            dishes: None,
        }
    }
}

fn has_deliver_to(ctx: &mut OrderContext<'_>) -> Result<(), AppError> {
    match ctx.data.deliver_to.as_deref() {
        Some(deliver_to) if !deliver_to.is_empty() => Ok(()),
        _ => Err(AppError::Validation(
            "Order must include a deliverTo".to_string(),
        )),
    }
}

fn has_mobile_number(ctx: &mut OrderContext<'_>) -> Result<(), AppError> {
    match ctx.data.mobile_number.as_deref() {
        Some(mobile_number) if !mobile_number.is_empty() => Ok(()),
        _ => Err(AppError::Validation(
            "Order must include a mobileNumber".to_string(),
        )),
    }
}

fn has_dishes(ctx: &mut OrderContext<'_>) -> Result<(), AppError> {
    let Some(value) = ctx.data.dishes.as_ref() else {
        return Err(AppError::Validation(
            "Order must include a dish".to_string(),
        ));
    };
    match value.as_array() {
        Some(items) if !items.is_empty() => {
            ctx.dishes = Some(items.clone());
            Ok(())
        }
        _ => Err(AppError::Validation(
            "Order must include at least 1 dish".to_string(),
        )),
    }
}

// Linear scan that halts the whole pipeline at the first invalid element;
// remaining items are not inspected.
fn dishes_have_quantity(ctx: &mut OrderContext<'_>) -> Result<(), AppError> {
    let Some(items) = ctx.dishes.as_deref() else {
        return Err(AppError::Internal(
            "quantity check ran before the dishes check".to_string(),
        ));
    };
    for (index, item) in items.iter().enumerate() {
        match item.get("quantity").and_then(Value::as_f64) {
            Some(quantity) if quantity >= 1.0 => {}
            _ => {
                return Err(AppError::Validation(format!(
                    "Dish {index} must have a quantity that is an integer greater than 0"
                )));
            }
        }
    }
    Ok(())
}

fn order_exists(ctx: &mut OrderContext<'_>) -> Result<(), AppError> {
    let id = ctx.route_id.as_deref().unwrap_or_default();
    match ctx.store.find(id) {
        Some(found) => {
            ctx.order = Some(found.clone());
            Ok(())
        }
        None => Err(AppError::NotFound(format!("Order does not exist: {id}"))),
    }
}

// A body without an id passes; identity is only checked when one is supplied.
fn id_matches_route(ctx: &mut OrderContext<'_>) -> Result<(), AppError> {
    let Some(order) = ctx.order.as_ref() else {
        return Err(AppError::Internal(
            "id check ran before existence resolution".to_string(),
        ));
    };
    match ctx.data.id.as_deref() {
        Some(body_id) if !body_id.is_empty() && body_id != order.id => {
            Err(AppError::Validation(format!(
                "Order id does not match route id. Order: {body_id}, Route: {route_id}",
                route_id = order.id
            )))
        }
        _ => Ok(()),
    }
}

// Update only: the payload status must be a forward state. Exactly
// "delivered" earns the terminal-order message; anything else that is not an
// updatable status, including a missing status, earns the enumeration.
fn has_updatable_status(ctx: &mut OrderContext<'_>) -> Result<(), AppError> {
    match ctx.data.status.as_deref() {
        Some(status) if UPDATABLE_STATUSES.contains(&status) => Ok(()),
        Some("delivered") => Err(AppError::Validation(
            "A delivered order cannot be changed".to_string(),
        )),
        _ => Err(AppError::Validation(
            "Order must have a status of pending, preparing, out-for-delivery, delivered"
                .to_string(),
        )),
    }
}

// Delete only: inspects the stored status, not the payload.
fn is_pending(ctx: &mut OrderContext<'_>) -> Result<(), AppError> {
    let Some(order) = ctx.order.as_ref() else {
        return Err(AppError::Internal(
            "pending check ran before existence resolution".to_string(),
        ));
    };
    if order.status.as_deref() == Some("pending") {
        Ok(())
    } else {
        Err(AppError::Validation(
            "An order cannot be deleted unless it is pending".to_string(),
        ))
    }
}

// ================================================================================================
// HANDLERS
// ================================================================================================

/// GET /orders
pub async fn list(State(state): State<AppState>) -> Json<Data<Vec<Order>>> {
    let store = state.orders.lock().await;
    Json(Data {
        data: store.list().to_vec(),
    })
}

/// POST /orders
///
/// Status passes through as supplied, or stays unset; creation does not
/// default or constrain it.
pub async fn create(
    State(state): State<AppState>,
    Json(body): Json<Envelope<OrderPayload>>,
) -> Result<(StatusCode, Json<Data<Order>>), AppError> {
    let mut store = state.orders.lock().await;

    let mut ctx = OrderContext::new(&store, body.data.unwrap_or_default(), None);
    validate::run(
        &mut ctx,
        &[
            has_deliver_to as validate::Check<_>,
            has_mobile_number as validate::Check<_>,
            has_dishes as validate::Check<_>,
            dishes_have_quantity as validate::Check<_>,
        ],
    )?;

    let fields = ctx.data.into_fields()?;
    let new_order = Order {
        id: state.ids.next(),
        deliver_to: fields.deliver_to,
        mobile_number: fields.mobile_number,
        status: fields.status,
        dishes: fields.dishes,
    };
    store.push(new_order.clone());
    tracing::info!(id = %new_order.id, "order created");

    Ok((StatusCode::CREATED, Json(Data { data: new_order })))
}

/// GET /orders/{order_id}
pub async fn read(
    State(state): State<AppState>,
    Path(order_id): Path<String>,
) -> Result<Json<Data<Order>>, AppError> {
    let store = state.orders.lock().await;

    let mut ctx = OrderContext::new(&store, OrderPayload::default(), Some(order_id));
    validate::run(&mut ctx, &[order_exists])?;

    let order = ctx.order.ok_or_else(|| {
        AppError::Internal("read ran without a resolved order".to_string())
    })?;
    Ok(Json(Data { data: order }))
}

/// PUT /orders/{order_id}
///
/// Overwrites every mutable field of the resolved order; the id is preserved.
pub async fn update(
    State(state): State<AppState>,
    Path(order_id): Path<String>,
    Json(body): Json<Envelope<OrderPayload>>,
) -> Result<Json<Data<Order>>, AppError> {
    let mut store = state.orders.lock().await;

    let mut ctx = OrderContext::new(&store, body.data.unwrap_or_default(), Some(order_id));
    validate::run(
        &mut ctx,
        &[
            order_exists as validate::Check<_>,
            has_deliver_to as validate::Check<_>,
            has_mobile_number as validate::Check<_>,
            has_dishes as validate::Check<_>,
            has_updatable_status as validate::Check<_>,
            dishes_have_quantity as validate::Check<_>,
            id_matches_route as validate::Check<_>,
        ],
    )?;

    let resolved = ctx.order.take().ok_or_else(|| {
        AppError::Internal("update ran without a resolved order".to_string())
    })?;
    let fields = ctx.data.into_fields()?;

    let order = store.find_mut(&resolved.id).ok_or_else(|| {
        AppError::Internal(format!("order vanished mid-request: {}", resolved.id))
    })?;
    order.deliver_to = fields.deliver_to;
    order.mobile_number = fields.mobile_number;
    order.status = fields.status;
    order.dishes = fields.dishes;
    let updated = order.clone();
    tracing::info!(id = %updated.id, "order updated");

    Ok(Json(Data { data: updated }))
}

/// DELETE /orders/{order_id}
pub async fn delete(
    State(state): State<AppState>,
    Path(order_id): Path<String>,
) -> Result<StatusCode, AppError> {
    let mut store = state.orders.lock().await;

    let mut ctx = OrderContext::new(&store, OrderPayload::default(), Some(order_id));
    validate::run(
        &mut ctx,
        &[
            order_exists as validate::Check<_>,
            is_pending as validate::Check<_>,
        ],
    )?;

    let resolved = ctx.order.take().ok_or_else(|| {
        AppError::Internal("delete ran without a resolved order".to_string())
    })?;
    let index = store.position(&resolved.id).ok_or_else(|| {
        AppError::Internal(format!("order vanished mid-request: {}", resolved.id))
    })?;
    store.remove_at(index);
    tracing::info!(id = %resolved.id, "order deleted");

    Ok(StatusCode::NO_CONTENT)
}

// ================================================================================================
// ROUTER
// ================================================================================================

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/orders", get(list).post(create))
        .route(
            "/orders/{order_id}",
            get(read).put(update).delete(delete),
        )
}
