use crate::{entities::address, errors::ServiceError};
use chrono::Utc;
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection,
    EntityTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateAddressRequest {
    #[validate(length(min = 1, max = 200, message = "Recipient name is required"))]
    pub recipient_name: String,
    #[validate(length(min = 6, max = 20, message = "Phone must be 6 to 20 characters"))]
    pub phone: String,
    #[validate(length(min = 1, max = 255, message = "Address line is required"))]
    pub line1: String,
    #[validate(length(max = 255))]
    pub line2: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub district: String,
    #[validate(length(min = 1, max = 100))]
    pub province: String,
    #[validate(length(min = 3, max = 10))]
    pub postal_code: String,
    #[serde(default)]
    pub is_default: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateAddressRequest {
    #[validate(length(min = 1, max = 200))]
    pub recipient_name: Option<String>,
    #[validate(length(min = 6, max = 20))]
    pub phone: Option<String>,
    #[validate(length(min = 1, max = 255))]
    pub line1: Option<String>,
    #[validate(length(max = 255))]
    pub line2: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub district: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub province: Option<String>,
    #[validate(length(min = 3, max = 10))]
    pub postal_code: Option<String>,
    pub is_default: Option<bool>,
}

/// Delivery addresses of the calling user. Keeps at most one default
/// address per user; when any address exists exactly one is the default.
#[derive(Clone)]
pub struct AddressService {
    db: Arc<DatabaseConnection>,
}

impl AddressService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Default address first, then newest.
    pub async fn list(&self, user_id: Uuid) -> Result<Vec<address::Model>, ServiceError> {
        Ok(address::Entity::find()
            .filter(address::Column::UserId.eq(user_id))
            .order_by_desc(address::Column::IsDefault)
            .order_by_desc(address::Column::CreatedAt)
            .all(&*self.db)
            .await?)
    }

    pub async fn get(&self, user_id: Uuid, id: Uuid) -> Result<address::Model, ServiceError> {
        find_owned(&*self.db, user_id, id).await
    }

    #[instrument(skip(self, request))]
    pub async fn create(
        &self,
        user_id: Uuid,
        request: CreateAddressRequest,
    ) -> Result<address::Model, ServiceError> {
        request.validate()?;
        let txn = self.db.begin().await?;

        let has_any = address::Entity::find()
            .filter(address::Column::UserId.eq(user_id))
            .one(&txn)
            .await?
            .is_some();
        let make_default = request.is_default || !has_any;
        if make_default {
            clear_default(&txn, user_id).await?;
        }

        let now = Utc::now();
        let model = address::ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(user_id),
            recipient_name: Set(request.recipient_name.trim().to_string()),
            phone: Set(request.phone.trim().to_string()),
            line1: Set(request.line1.trim().to_string()),
            line2: Set(request.line2.filter(|l| !l.trim().is_empty())),
            district: Set(request.district.trim().to_string()),
            province: Set(request.province.trim().to_string()),
            postal_code: Set(request.postal_code.trim().to_string()),
            is_default: Set(make_default),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&txn)
        .await?;

        txn.commit().await?;
        info!(address_id = %model.id, is_default = model.is_default, "Address created");
        Ok(model)
    }

    #[instrument(skip(self, request))]
    pub async fn update(
        &self,
        user_id: Uuid,
        id: Uuid,
        request: UpdateAddressRequest,
    ) -> Result<address::Model, ServiceError> {
        request.validate()?;
        let txn = self.db.begin().await?;
        let existing = find_owned(&txn, user_id, id).await?;
        let was_default = existing.is_default;

        let mut active: address::ActiveModel = existing.into();
        if let Some(v) = request.recipient_name {
            active.recipient_name = Set(v.trim().to_string());
        }
        if let Some(v) = request.phone {
            active.phone = Set(v.trim().to_string());
        }
        if let Some(v) = request.line1 {
            active.line1 = Set(v.trim().to_string());
        }
        if let Some(v) = request.line2 {
            active.line2 = Set(Some(v).filter(|l| !l.trim().is_empty()));
        }
        if let Some(v) = request.district {
            active.district = Set(v.trim().to_string());
        }
        if let Some(v) = request.province {
            active.province = Set(v.trim().to_string());
        }
        if let Some(v) = request.postal_code {
            active.postal_code = Set(v.trim().to_string());
        }

        let promote_other = match request.is_default {
            Some(true) if !was_default => {
                clear_default(&txn, user_id).await?;
                active.is_default = Set(true);
                false
            }
            Some(false) if was_default => {
                active.is_default = Set(false);
                true
            }
            _ => false,
        };
        active.updated_at = Set(Utc::now());
        let mut updated = active.update(&txn).await?;

        if promote_other && !promote_latest(&txn, user_id, Some(id)).await? {
            // the only address stays the default
            let mut active: address::ActiveModel = updated.into();
            active.is_default = Set(true);
            updated = active.update(&txn).await?;
        }

        txn.commit().await?;
        Ok(updated)
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, user_id: Uuid, id: Uuid) -> Result<(), ServiceError> {
        let txn = self.db.begin().await?;
        let existing = find_owned(&txn, user_id, id).await?;
        address::Entity::delete_by_id(existing.id).exec(&txn).await?;
        if existing.is_default {
            promote_latest(&txn, user_id, None).await?;
        }
        txn.commit().await?;
        info!(address_id = %id, "Address deleted");
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn set_default(
        &self,
        user_id: Uuid,
        id: Uuid,
    ) -> Result<address::Model, ServiceError> {
        let txn = self.db.begin().await?;
        let existing = find_owned(&txn, user_id, id).await?;
        clear_default(&txn, user_id).await?;
        let mut active: address::ActiveModel = existing.into();
        active.is_default = Set(true);
        active.updated_at = Set(Utc::now());
        let updated = active.update(&txn).await?;
        txn.commit().await?;
        Ok(updated)
    }
}

/// Addresses of other users are reported as missing.
pub(crate) async fn find_owned<C: ConnectionTrait>(
    conn: &C,
    user_id: Uuid,
    id: Uuid,
) -> Result<address::Model, ServiceError> {
    address::Entity::find_by_id(id)
        .filter(address::Column::UserId.eq(user_id))
        .one(conn)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("Address {} not found", id)))
}

async fn clear_default<C: ConnectionTrait>(conn: &C, user_id: Uuid) -> Result<(), ServiceError> {
    address::Entity::update_many()
        .col_expr(address::Column::IsDefault, Expr::value(false))
        .filter(address::Column::UserId.eq(user_id))
        .filter(address::Column::IsDefault.eq(true))
        .exec(conn)
        .await?;
    Ok(())
}

/// Makes the most recently created address (other than `except`) the default.
/// Returns false when there is no candidate.
async fn promote_latest<C: ConnectionTrait>(
    conn: &C,
    user_id: Uuid,
    except: Option<Uuid>,
) -> Result<bool, ServiceError> {
    let mut query = address::Entity::find().filter(address::Column::UserId.eq(user_id));
    if let Some(except) = except {
        query = query.filter(address::Column::Id.ne(except));
    }
    let Some(candidate) = query
        .order_by_desc(address::Column::CreatedAt)
        .one(conn)
        .await?
    else {
        return Ok(false);
    };

    clear_default(conn, user_id).await?;
    let mut active: address::ActiveModel = candidate.into();
    active.is_default = Set(true);
    active.updated_at = Set(Utc::now());
    active.update(conn).await?;
    Ok(true)
}
