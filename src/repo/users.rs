use async_trait::async_trait;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter};
use uuid::Uuid;

use crate::{entities::users, state::DatabaseClient};

/// Emails are stored lowercased; lookups lowercase their input to match.
#[async_trait]
pub trait UsersRepo: Send + Sync {
    async fn insert(&self, model: users::ActiveModel) -> Result<users::Model, sea_orm::DbErr>;
    async fn find_by_uid(&self, uid: Uuid) -> Result<Option<users::Model>, sea_orm::DbErr>;
    async fn find_by_email(&self, email: &str) -> Result<Option<users::Model>, sea_orm::DbErr>;
}

pub struct SeaOrmUsersRepo {
    db: std::sync::Arc<dyn DatabaseClient>,
}

impl SeaOrmUsersRepo {
    pub fn new(db: std::sync::Arc<dyn DatabaseClient>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UsersRepo for SeaOrmUsersRepo {
    async fn insert(&self, model: users::ActiveModel) -> Result<users::Model, sea_orm::DbErr> {
        model.insert(self.db.conn()).await
    }

    async fn find_by_uid(&self, uid: Uuid) -> Result<Option<users::Model>, sea_orm::DbErr> {
        users::Entity::find()
            .filter(users::Column::Uid.eq(uid))
            .one(self.db.conn())
            .await
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<users::Model>, sea_orm::DbErr> {
        users::Entity::find()
            .filter(users::Column::Email.eq(email.to_lowercase()))
            .one(self.db.conn())
            .await
    }
}
