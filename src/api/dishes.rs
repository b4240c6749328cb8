// ================================================================================================
// DISHES API
// ================================================================================================
//
// CRUD surface for the dish collection. Every route runs its ordered check
// list before the handler touches the store; the first failing check rejects
// the request with the message for exactly that field. Dishes are never
// deleted.
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
use serde_json::{Number, Value};

use crate::api::{Data, Envelope};
use crate::errors::AppError;
use crate::state::AppState;
use crate::store::{Keyed, Store};
use crate::validate;

// ================================================================================================
// RECORD & PAYLOAD TYPES
// ================================================================================================

/// A stored dish. `price` keeps the client's JSON number representation, so
/// an integer price round-trips as an integer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dish {
    pub id: String,
    pub name: String,
    pub description: String,
    pub price: Number,
    pub image_url: String,
}

impl Keyed for Dish {
    fn id(&self) -> &str {
        &self.id
    }
}

/// Loosely-typed inbound `data` object for create/update.
///
/// `price` stays a raw JSON value so the pipeline can tell "absent" from
/// "present but not a positive number" and report each case precisely.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DishPayload {
    pub id: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<Value>,
    pub image_url: Option<String>,
}

/// Field set shared by create and update, extracted once validation passed.
struct DishFields {
    name: String,
    description: String,
    price: Number,
    image_url: String,
}

impl DishPayload {
    fn into_fields(self) -> Result<DishFields, AppError> {
        match self {
            Self {
                name: Some(name),
                description: Some(description),
                price: Some(Value::Number(price)),
                image_url: Some(image_url),
                ..
            } => Ok(DishFields {
                name,
                description,
                price,
                image_url,
            }),
            _ => Err(AppError::Internal(
                "dish payload escaped validation with missing fields".to_string(),
            )),
        }
    }
}

// ================================================================================================
// VALIDATION CHECKS
// ================================================================================================

/// Per-request context threaded through the dish checks.
pub struct DishContext<'a> {
    store: &'a Store<Dish>,
    data: DishPayload,
    route_id: Option<String>,
    /// Resolved by `dish_exists` for the checks and handler behind it.
    dish: Option<Dish>,
}

impl<'a> DishContext<'a> {
    fn new(store: &'a Store<Dish>, data: DishPayload, route_id: Option<String>) -> Self {
        Self {
            store,
            data,
            route_id,
            dish: None,
        }
    }
}

fn has_name(ctx: &mut DishContext<'_>) -> Result<(), AppError> {
    match ctx.data.name.as_deref() {
        Some(name) if !name.is_empty() => Ok(()),
        _ => Err(AppError::Validation("Dish must include a name".to_string())),
    }
}

fn has_description(ctx: &mut DishContext<'_>) -> Result<(), AppError> {
    match ctx.data.description.as_deref() {
        Some(description) if !description.is_empty() => Ok(()),
        _ => Err(AppError::Validation(
            "Dish must include a description".to_string(),
        )),
    }
}

// The wrong-type/non-positive reject takes precedence over the presence one:
// only an entirely absent price reports "must include".
fn has_price(ctx: &mut DishContext<'_>) -> Result<(), AppError> {
    match ctx.data.price.as_ref() {
        Some(price) => match price.as_f64() {
            Some(price) if price > 0.0 => Ok(()),
            _ => Err(AppError::Validation(
                "Dish must have a price that is an integer greater than 0".to_string(),
            )),
        },
        None => Err(AppError::Validation(
            "Dish must include a price".to_string(),
        )),
    }
}

fn has_image_url(ctx: &mut DishContext<'_>) -> Result<(), AppError> {
    match ctx.data.image_url.as_deref() {
        Some(image_url) if !image_url.is_empty() => Ok(()),
        _ => Err(AppError::Validation(
            "Dish must include an image_url".to_string(),
        )),
    }
}

fn dish_exists(ctx: &mut DishContext<'_>) -> Result<(), AppError> {
    let id = ctx.route_id.as_deref().unwrap_or_default();
    match ctx.store.find(id) {
        Some(found) => {
            ctx.dish = Some(found.clone());
            Ok(())
        }
        None => Err(AppError::NotFound(format!("Dish does not exist: {id}"))),
    }
}

// A body without an id passes; identity is only checked when one is supplied.
fn id_matches_route(ctx: &mut DishContext<'_>) -> Result<(), AppError> {
    let Some(dish) = ctx.dish.as_ref() else {
        return Err(AppError::Internal(
            "id check ran before existence resolution".to_string(),
        ));
    };
    match ctx.data.id.as_deref() {
        Some(body_id) if !body_id.is_empty() && body_id != dish.id => {
            Err(AppError::Validation(format!(
                "Dish id does not match route id. Dish: {body_id}, Route: {route_id}",
                route_id = dish.id
            )))
        }
        _ => Ok(()),
    }
}

// ================================================================================================
// HANDLERS
// ================================================================================================

/// GET /dishes
pub async fn list(State(state): State<AppState>) -> Json<Data<Vec<Dish>>> {
    let store = state.dishes.lock().await;
    Json(Data {
        data: store.list().to_vec(),
    })
}

/// POST /dishes
pub async fn create(
    State(state): State<AppState>,
    Json(body): Json<Envelope<DishPayload>>,
) -> Result<(StatusCode, Json<Data<Dish>>), AppError> {
    let mut store = state.dishes.lock().await;

    let mut ctx = DishContext::new(&store, body.data.unwrap_or_default(), None);
    validate::run(
        &mut ctx,
        &[
            has_name as validate::Check<_>,
            has_description as validate::Check<_>,
            has_price as validate::Check<_>,
            has_image_url as validate::Check<_>,
        ],
    )?;

    let fields = ctx.data.into_fields()?;
    let new_dish = Dish {
        id: state.ids.next(),
        name: fields.name,
        description: fields.description,
        price: fields.price,
        image_url: fields.image_url,
    };
    store.push(new_dish.clone());
    tracing::info!(id = %new_dish.id, "dish created");

    Ok((StatusCode::CREATED, Json(Data { data: new_dish })))
}

/// GET /dishes/{dish_id}
pub async fn read(
    State(state): State<AppState>,
    Path(dish_id): Path<String>,
) -> Result<Json<Data<Dish>>, AppError> {
    let store = state.dishes.lock().await;

    let mut ctx = DishContext::new(&store, DishPayload::default(), Some(dish_id));
    validate::run(&mut ctx, &[dish_exists])?;

    let dish = ctx.dish.ok_or_else(|| {
        AppError::Internal("read ran without a resolved dish".to_string())
    })?;
    Ok(Json(Data { data: dish }))
}

/// PUT /dishes/{dish_id}
///
/// Overwrites every mutable field of the resolved dish; the id is preserved.
pub async fn update(
    State(state): State<AppState>,
    Path(dish_id): Path<String>,
    Json(body): Json<Envelope<DishPayload>>,
) -> Result<Json<Data<Dish>>, AppError> {
    let mut store = state.dishes.lock().await;

    let mut ctx = DishContext::new(&store, body.data.unwrap_or_default(), Some(dish_id));
    validate::run(
        &mut ctx,
        &[
            dish_exists as validate::Check<_>,
            has_name as validate::Check<_>,
            has_description as validate::Check<_>,
            has_price as validate::Check<_>,
            has_image_url as validate::Check<_>,
            id_matches_route as validate::Check<_>,
        ],
    )?;

    let resolved = ctx.dish.take().ok_or_else(|| {
        AppError::Internal("update ran without a resolved dish".to_string())
    })?;
    let fields = ctx.data.into_fields()?;

    let dish = store.find_mut(&resolved.id).ok_or_else(|| {
        AppError::Internal(format!("dish vanished mid-request: {}", resolved.id))
    })?;
    dish.name = fields.name;
    dish.description = fields.description;
    dish.price = fields.price;
    dish.image_url = fields.image_url;
    let updated = dish.clone();
    tracing::info!(id = %updated.id, "dish updated");

    Ok(Json(Data { data: updated }))
}

// ================================================================================================
// ROUTER
// ================================================================================================

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/dishes", get(list).post(create))
        .route("/dishes/{dish_id}", get(read).put(update))
}
