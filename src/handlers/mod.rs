pub mod addresses;
pub mod admin_orders;
pub mod auth;
pub mod cart;
pub mod checkout;
pub mod common;
pub mod dashboard;
pub mod master;
pub mod orders;
pub mod products;
pub mod profile;
pub mod reports;
pub mod settings;

use crate::{
    config::AppConfig,
    db::DbPool,
    events::EventSender,
    services::{
        access::AccessService, addresses::AddressService, cart::CartService,
        catalog::CatalogService, checkout::CheckoutService, dashboard::DashboardService,
        orders::OrderService, reports::ReportService, settings::SettingsService,
        users::UserService,
    },
};
use std::sync::Arc;

// Re-export AppState so handler modules can import it as crate::handlers::AppState
pub use crate::AppState;

/// Services layer that encapsulates business logic used by HTTP handlers
#[derive(Clone)]
pub struct AppServices {
    pub users: Arc<UserService>,
    pub access: Arc<AccessService>,
    pub addresses: Arc<AddressService>,
    pub catalog: Arc<CatalogService>,
    pub cart: Arc<CartService>,
    pub checkout: Arc<CheckoutService>,
    pub orders: Arc<OrderService>,
    pub settings: Arc<SettingsService>,
    pub dashboard: Arc<DashboardService>,
    pub reports: Arc<ReportService>,
}

impl AppServices {
    pub fn new(db_pool: Arc<DbPool>, event_sender: EventSender, config: &AppConfig) -> Self {
        let event_sender = Arc::new(event_sender);

        Self {
            users: Arc::new(UserService::new(db_pool.clone(), event_sender.clone())),
            access: Arc::new(AccessService::new(db_pool.clone())),
            addresses: Arc::new(AddressService::new(db_pool.clone())),
            catalog: Arc::new(CatalogService::new(
                db_pool.clone(),
                event_sender.clone(),
            )),
            cart: Arc::new(CartService::new(db_pool.clone())),
            checkout: Arc::new(CheckoutService::new(
                db_pool.clone(),
                event_sender.clone(),
                config.default_currency.clone(),
            )),
            orders: Arc::new(OrderService::new(db_pool.clone(), event_sender.clone())),
            settings: Arc::new(SettingsService::new(
                db_pool.clone(),
                event_sender.clone(),
            )),
            dashboard: Arc::new(DashboardService::new(db_pool.clone())),
            reports: Arc::new(ReportService::new(db_pool)),
        }
    }
}
