use crate::{
    entities::store_settings,
    errors::ServiceError,
    events::{Event, EventSender},
};
use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, DatabaseConnection, Set};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument};
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

fn validate_fee(value: &Decimal) -> Result<(), ValidationError> {
    if value.is_sign_negative() {
        return Err(ValidationError::new("must_not_be_negative"));
    }
    Ok(())
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateSettingsRequest {
    #[validate(length(min = 1, max = 200))]
    pub store_name: Option<String>,
    #[validate(length(max = 20))]
    pub contact_phone: Option<String>,
    #[validate(length(max = 100))]
    pub bank_name: Option<String>,
    #[validate(length(max = 200))]
    pub bank_account_name: Option<String>,
    #[validate(length(max = 50))]
    pub bank_account_number: Option<String>,
    #[validate(custom = "validate_fee")]
    pub shipping_fee: Option<Decimal>,
    /// Zero clears the threshold
    #[validate(custom = "validate_fee")]
    pub free_shipping_threshold: Option<Decimal>,
    pub cod_enabled: Option<bool>,
    #[validate(range(min = 0))]
    pub low_stock_threshold: Option<i32>,
}

/// Storefront-facing subset of the settings.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct StoreInfo {
    pub store_name: String,
    pub contact_phone: Option<String>,
    pub bank_name: Option<String>,
    pub bank_account_name: Option<String>,
    pub bank_account_number: Option<String>,
    pub shipping_fee: Decimal,
    pub free_shipping_threshold: Option<Decimal>,
    pub cod_enabled: bool,
}

impl From<store_settings::Model> for StoreInfo {
    fn from(settings: store_settings::Model) -> Self {
        Self {
            store_name: settings.store_name,
            contact_phone: settings.contact_phone,
            bank_name: settings.bank_name,
            bank_account_name: settings.bank_account_name,
            bank_account_number: settings.bank_account_number,
            shipping_fee: settings.shipping_fee,
            free_shipping_threshold: settings.free_shipping_threshold,
            cod_enabled: settings.cod_enabled,
        }
    }
}

#[derive(Clone)]
pub struct SettingsService {
    db: Arc<DatabaseConnection>,
    event_sender: Arc<EventSender>,
}

impl SettingsService {
    pub fn new(db: Arc<DatabaseConnection>, event_sender: Arc<EventSender>) -> Self {
        Self { db, event_sender }
    }

    pub async fn get(&self) -> Result<store_settings::Model, ServiceError> {
        super::load_settings(&*self.db).await
    }

    #[instrument(skip(self, request))]
    pub async fn update(
        &self,
        request: UpdateSettingsRequest,
    ) -> Result<store_settings::Model, ServiceError> {
        request.validate()?;
        let mut active: store_settings::ActiveModel = self.get().await?.into();

        if let Some(v) = request.store_name {
            active.store_name = Set(v.trim().to_string());
        }
        if let Some(v) = request.contact_phone {
            active.contact_phone = Set(Some(v).filter(|s| !s.trim().is_empty()));
        }
        if let Some(v) = request.bank_name {
            active.bank_name = Set(Some(v).filter(|s| !s.trim().is_empty()));
        }
        if let Some(v) = request.bank_account_name {
            active.bank_account_name = Set(Some(v).filter(|s| !s.trim().is_empty()));
        }
        if let Some(v) = request.bank_account_number {
            active.bank_account_number = Set(Some(v).filter(|s| !s.trim().is_empty()));
        }
        if let Some(v) = request.shipping_fee {
            active.shipping_fee = Set(v);
        }
        if let Some(v) = request.free_shipping_threshold {
            active.free_shipping_threshold = Set(Some(v).filter(|t| !t.is_zero()));
        }
        if let Some(v) = request.cod_enabled {
            active.cod_enabled = Set(v);
        }
        if let Some(v) = request.low_stock_threshold {
            active.low_stock_threshold = Set(v);
        }
        active.updated_at = Set(Utc::now());
        let settings = active.update(&*self.db).await?;

        self.event_sender.send_or_log(Event::SettingsUpdated).await;
        info!("Store settings updated");
        Ok(settings)
    }
}
