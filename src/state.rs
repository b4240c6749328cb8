use std::sync::Arc;

use tokio::sync::Mutex;

use crate::api::dishes::Dish;
use crate::api::orders::Order;
use crate::ids::NextId;
use crate::store::Store;

/// Process-wide shared state handed to every handler.
///
/// Each store sits behind its own lock, and a handler holds that lock for its
/// whole validate-then-mutate sequence, so no pipeline run observes a torn
/// record. Both resources draw ids from the same generator.
#[derive(Debug, Clone, Default)]
pub struct AppState {
    pub dishes: Arc<Mutex<Store<Dish>>>,
    pub orders: Arc<Mutex<Store<Order>>>,
    pub ids: Arc<NextId>,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }
}
