use crate::{
    auth::{
        password::{hash_password, verify_password},
        permissions_for,
    },
    entities::{
        access_level::{self, CUSTOMER_LEVEL},
        user,
    },
    errors::ServiceError,
    events::{Event, EventSender},
};
use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument, warn};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct RegisterRequest {
    #[validate(email(message = "A valid email address is required"))]
    pub email: String,
    #[validate(length(min = 8, max = 128, message = "Password must be 8 to 128 characters"))]
    pub password: String,
    #[validate(length(min = 1, max = 100))]
    pub first_name: String,
    #[validate(length(max = 100))]
    #[serde(default)]
    pub last_name: String,
    #[validate(length(min = 6, max = 20))]
    pub phone: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    #[validate(length(min = 1, message = "Email is required"))]
    pub email: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateProfileRequest {
    #[validate(length(min = 1, max = 100))]
    pub first_name: Option<String>,
    #[validate(length(max = 100))]
    pub last_name: Option<String>,
    #[validate(length(min = 6, max = 20))]
    pub phone: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct ChangePasswordRequest {
    #[validate(length(min = 1))]
    pub current_password: String,
    #[validate(length(min = 8, max = 128, message = "Password must be 8 to 128 characters"))]
    pub new_password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct AssignLevelRequest {
    #[validate(range(min = 0))]
    pub access_level: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SetActiveRequest {
    pub is_active: bool,
}

/// Caller-facing view of a user account.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserProfile {
    pub id: Uuid,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: Option<String>,
    pub access_level: i32,
    pub access_level_name: String,
    pub permissions: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl UserProfile {
    pub fn from_models(user: user::Model, level: &access_level::Model) -> Self {
        Self {
            id: user.id,
            email: user.email,
            first_name: user.first_name,
            last_name: user.last_name,
            phone: user.phone,
            access_level: level.level,
            access_level_name: level.name.clone(),
            permissions: permissions_for(level),
            created_at: user.created_at,
        }
    }
}

/// Row of the role management screen.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct StaffMember {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub access_level: i32,
    pub access_level_name: Option<String>,
    pub is_active: bool,
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Accounts, credentials and level assignment.
#[derive(Clone)]
pub struct UserService {
    db: Arc<DatabaseConnection>,
    event_sender: Arc<EventSender>,
}

impl UserService {
    pub fn new(db: Arc<DatabaseConnection>, event_sender: Arc<EventSender>) -> Self {
        Self { db, event_sender }
    }

    /// Registers a customer account at the built-in customer level.
    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn register(
        &self,
        request: RegisterRequest,
    ) -> Result<(user::Model, access_level::Model), ServiceError> {
        request.validate()?;
        let user = self
            .insert_user(
                &request.email,
                &request.password,
                request.first_name.trim(),
                request.last_name.trim(),
                request.phone,
                CUSTOMER_LEVEL,
            )
            .await?;
        let level = self.access_level(user.access_level).await?;

        self.event_sender
            .send_or_log(Event::UserRegistered(user.id))
            .await;
        info!(user_id = %user.id, "Customer registered");
        Ok((user, level))
    }

    /// Creates an account directly at a given level (admin tooling).
    #[instrument(skip(self, password))]
    pub async fn create_user_with_level(
        &self,
        email: &str,
        password: &str,
        first_name: &str,
        last_name: &str,
        level: i32,
    ) -> Result<user::Model, ServiceError> {
        if password.len() < 8 {
            return Err(ServiceError::ValidationError(
                "Password must be at least 8 characters".to_string(),
            ));
        }
        self.access_level(level).await?;
        let user = self
            .insert_user(email, password, first_name, last_name, None, level)
            .await?;
        self.event_sender
            .send_or_log(Event::UserRegistered(user.id))
            .await;
        Ok(user)
    }

    async fn insert_user(
        &self,
        email: &str,
        password: &str,
        first_name: &str,
        last_name: &str,
        phone: Option<String>,
        level: i32,
    ) -> Result<user::Model, ServiceError> {
        let email = normalize_email(email);
        let existing = user::Entity::find()
            .filter(user::Column::Email.eq(email.as_str()))
            .one(&*self.db)
            .await?;
        if existing.is_some() {
            return Err(ServiceError::Conflict(
                "An account with this email already exists".to_string(),
            ));
        }

        let now = Utc::now();
        let model = user::ActiveModel {
            id: Set(Uuid::new_v4()),
            email: Set(email),
            password_hash: Set(hash_password(password)?),
            first_name: Set(first_name.to_string()),
            last_name: Set(last_name.to_string()),
            phone: Set(phone),
            access_level: Set(level),
            is_active: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
        };
        Ok(model.insert(&*self.db).await?)
    }

    /// Checks credentials and returns the account with its access level.
    #[instrument(skip(self, password))]
    pub async fn authenticate(
        &self,
        email: &str,
        password: &str,
    ) -> Result<(user::Model, access_level::Model), ServiceError> {
        let invalid = || ServiceError::Unauthorized("Invalid email or password".to_string());

        let user = user::Entity::find()
            .filter(user::Column::Email.eq(normalize_email(email)))
            .one(&*self.db)
            .await?
            .ok_or_else(invalid)?;

        if !verify_password(&user.password_hash, password)? {
            warn!(user_id = %user.id, "Login attempt with wrong password");
            return Err(invalid());
        }
        if !user.is_active {
            return Err(ServiceError::Forbidden("Account is disabled".to_string()));
        }

        let level = self.access_level(user.access_level).await?;
        Ok((user, level))
    }

    pub async fn get_user(&self, user_id: Uuid) -> Result<user::Model, ServiceError> {
        user::Entity::find_by_id(user_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("User {} not found", user_id)))
    }

    async fn access_level(&self, level: i32) -> Result<access_level::Model, ServiceError> {
        access_level::Entity::find_by_id(level)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Access level {} not found", level)))
    }

    #[instrument(skip(self))]
    pub async fn profile(&self, user_id: Uuid) -> Result<UserProfile, ServiceError> {
        let user = self.get_user(user_id).await?;
        let level = self.access_level(user.access_level).await?;
        Ok(UserProfile::from_models(user, &level))
    }

    #[instrument(skip(self, request))]
    pub async fn update_profile(
        &self,
        user_id: Uuid,
        request: UpdateProfileRequest,
    ) -> Result<UserProfile, ServiceError> {
        request.validate()?;
        let user = self.get_user(user_id).await?;

        let mut active: user::ActiveModel = user.into();
        if let Some(first_name) = request.first_name {
            active.first_name = Set(first_name.trim().to_string());
        }
        if let Some(last_name) = request.last_name {
            active.last_name = Set(last_name.trim().to_string());
        }
        if let Some(phone) = request.phone {
            active.phone = Set(Some(phone));
        }
        active.updated_at = Set(Utc::now());
        let user = active.update(&*self.db).await?;

        let level = self.access_level(user.access_level).await?;
        Ok(UserProfile::from_models(user, &level))
    }

    #[instrument(skip(self, request))]
    pub async fn change_password(
        &self,
        user_id: Uuid,
        request: ChangePasswordRequest,
    ) -> Result<(), ServiceError> {
        request.validate()?;
        let user = self.get_user(user_id).await?;
        if !verify_password(&user.password_hash, &request.current_password)? {
            return Err(ServiceError::BadRequest(
                "Current password is incorrect".to_string(),
            ));
        }

        let mut active: user::ActiveModel = user.into();
        active.password_hash = Set(hash_password(&request.new_password)?);
        active.updated_at = Set(Utc::now());
        active.update(&*self.db).await?;
        info!(user_id = %user_id, "Password changed");
        Ok(())
    }

    /// Users above the customer level, with their level names.
    #[instrument(skip(self))]
    pub async fn list_staff(&self) -> Result<Vec<StaffMember>, ServiceError> {
        let rows = user::Entity::find()
            .filter(user::Column::AccessLevel.ne(CUSTOMER_LEVEL))
            .find_also_related(access_level::Entity)
            .order_by_asc(user::Column::AccessLevel)
            .order_by_asc(user::Column::Email)
            .all(&*self.db)
            .await?;

        Ok(rows
            .into_iter()
            .map(|(user, level)| StaffMember {
                id: user.id,
                name: user.full_name(),
                email: user.email,
                access_level: user.access_level,
                access_level_name: level.map(|l| l.name),
                is_active: user.is_active,
            })
            .collect())
    }

    /// Loads a user for a role change. Accounts holding system administrator
    /// access are only touched by another system administrator.
    async fn managed_user(
        &self,
        actor_is_admin: bool,
        user_id: Uuid,
    ) -> Result<user::Model, ServiceError> {
        let user = self.get_user(user_id).await?;
        if !actor_is_admin && self.access_level(user.access_level).await?.sys_admin {
            return Err(ServiceError::Forbidden(
                "Only a system administrator can change a system administrator account"
                    .to_string(),
            ));
        }
        Ok(user)
    }

    /// Moves a user to another access level. Only a system administrator may
    /// hand out, or take away, a level that carries the system administrator
    /// flag.
    #[instrument(skip(self))]
    pub async fn assign_level(
        &self,
        actor_is_admin: bool,
        user_id: Uuid,
        level: i32,
    ) -> Result<StaffMember, ServiceError> {
        let target_level = self.access_level(level).await?;
        if target_level.sys_admin && !actor_is_admin {
            return Err(ServiceError::Forbidden(
                "Only a system administrator can grant system administrator access".to_string(),
            ));
        }

        let user = self.managed_user(actor_is_admin, user_id).await?;
        let mut active: user::ActiveModel = user.into();
        active.access_level = Set(level);
        active.updated_at = Set(Utc::now());
        let user = active.update(&*self.db).await?;

        self.event_sender
            .send_or_log(Event::AccessLevelAssigned { user_id, level })
            .await;
        info!(user_id = %user_id, level, "Access level assigned");

        Ok(StaffMember {
            id: user.id,
            name: user.full_name(),
            email: user.email,
            access_level: user.access_level,
            access_level_name: Some(target_level.name),
            is_active: user.is_active,
        })
    }

    /// Enables or disables an account. Disabled accounts cannot log in and
    /// their outstanding tokens stop working.
    #[instrument(skip(self))]
    pub async fn set_active(
        &self,
        actor_is_admin: bool,
        user_id: Uuid,
        is_active: bool,
    ) -> Result<StaffMember, ServiceError> {
        let user = self.managed_user(actor_is_admin, user_id).await?;
        let level = self.access_level(user.access_level).await?;

        let mut active: user::ActiveModel = user.into();
        active.is_active = Set(is_active);
        active.updated_at = Set(Utc::now());
        let user = active.update(&*self.db).await?;

        self.event_sender
            .send_or_log(Event::UserActivationChanged { user_id, is_active })
            .await;
        info!(user_id = %user_id, is_active, "Account activation changed");

        Ok(StaffMember {
            id: user.id,
            name: user.full_name(),
            email: user.email,
            access_level: user.access_level,
            access_level_name: Some(level.name),
            is_active: user.is_active,
        })
    }
}
