use sea_orm::DatabaseConnection;
use std::sync::Arc;
use tracing::info;

use crate::{
    db::MigrationPlan,
    repo::users::{SeaOrmUsersRepo, UsersRepo},
    service::{
        auth::{AuthService, AuthServiceImpl},
        cache::{CacheStore, RedisPool},
        config::ConfigService,
        email::{MailService, SmtpMailer},
        seeder,
        token::TokenService,
    },
};

const DEFAULT_KEY_PREFIX: &str = "boilerplate";

pub trait DatabaseClient: Send + Sync {
    fn conn(&self) -> &DatabaseConnection;
}

pub struct SeaOrmDatabaseClient {
    conn: DatabaseConnection,
}

impl SeaOrmDatabaseClient {
    pub fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }
}

impl DatabaseClient for SeaOrmDatabaseClient {
    fn conn(&self) -> &DatabaseConnection {
        &self.conn
    }
}

pub struct AppState {
    config: Arc<dyn ConfigService>,
    db: Arc<dyn DatabaseClient>,
    cache: Arc<dyn CacheStore>,
    auth: Arc<dyn AuthService>,
}

impl AppState {
    /// Connects every backing service the configuration describes and runs the
    /// startup database steps its flags enable.
    pub async fn new(config: Arc<dyn ConfigService>) -> anyhow::Result<Arc<Self>> {
        let cfg = config.values();

        let conn = crate::db::connect(&cfg.database).await?;
        let plan = MigrationPlan::from(&cfg.database);
        crate::db::migrate(&conn, plan).await?;
        let db: Arc<dyn DatabaseClient> = Arc::new(SeaOrmDatabaseClient::new(conn));
        let users_repo: Arc<dyn UsersRepo> = Arc::new(SeaOrmUsersRepo::new(db.clone()));
        seeder::run(plan, users_repo.as_ref()).await?;

        let cache: Arc<dyn CacheStore> = Arc::new(RedisPool::connect(&cfg.redis).await?);
        let tokens = Arc::new(TokenService::new(&cfg.jwt)?);
        let mailer = SmtpMailer::from_config(&cfg.mail, &cfg.app.name)?
            .map(|mailer| Arc::new(mailer) as Arc<dyn MailService>);
        if mailer.is_none() {
            info!("MAIL_HOST is empty, outbound mail disabled");
        }

        let key_prefix = if cfg.app.name.is_empty() {
            DEFAULT_KEY_PREFIX.to_string()
        } else {
            cfg.app.name.to_lowercase().replace(char::is_whitespace, "-")
        };
        let auth: Arc<dyn AuthService> = Arc::new(AuthServiceImpl::new(
            users_repo,
            tokens,
            cache.clone(),
            mailer,
            key_prefix,
        ));

        Ok(Arc::new(Self {
            config,
            db,
            cache,
            auth,
        }))
    }

    pub fn config(&self) -> &dyn ConfigService {
        self.config.as_ref()
    }

    pub fn config_handle(&self) -> Arc<dyn ConfigService> {
        self.config.clone()
    }

    pub fn db(&self) -> &dyn DatabaseClient {
        self.db.as_ref()
    }

    pub fn cache(&self) -> &dyn CacheStore {
        self.cache.as_ref()
    }

    pub fn auth(&self) -> &dyn AuthService {
        self.auth.as_ref()
    }
}
