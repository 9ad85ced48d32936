// Order lifecycle: the status engine and the services that drive it
pub mod checkout;
pub mod order_status;
pub mod orders;

// Storefront
pub mod addresses;
pub mod cart;
pub mod catalog;

// Accounts and access control
pub mod access;
pub mod users;

// Back office
pub mod dashboard;
pub mod reports;
pub mod settings;

use sea_orm::{ConnectionTrait, EntityTrait};

use crate::{entities::store_settings, errors::ServiceError};

/// Loads the single store settings row.
pub(crate) async fn load_settings<C>(conn: &C) -> Result<store_settings::Model, ServiceError>
where
    C: ConnectionTrait,
{
    store_settings::Entity::find_by_id(store_settings::SETTINGS_ROW_ID)
        .one(conn)
        .await?
        .ok_or_else(|| ServiceError::InternalError("Store settings row is missing".to_string()))
}
