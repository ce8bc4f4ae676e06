use std::{
    env,
    marker::PhantomData,
    sync::{Arc, OnceLock},
};

use crate::config::{AppConfig, Config, DatabaseConfig, JwtConfig, MailConfig, RedisConfig};

pub trait FromEnvValue: Sized {
    fn from_env_value(raw: &str) -> Option<Self>;
}

impl FromEnvValue for String {
    fn from_env_value(raw: &str) -> Option<Self> {
        Some(raw.to_string())
    }
}

impl FromEnvValue for bool {
    fn from_env_value(raw: &str) -> Option<Self> {
        Some(raw.eq_ignore_ascii_case("true"))
    }
}

macro_rules! impl_from_env_value_int {
    ($($ty:ty),*) => {
        $(
            impl FromEnvValue for $ty {
                fn from_env_value(raw: &str) -> Option<Self> {
                    raw.trim().parse::<$ty>().ok()
                }
            }
        )*
    };
}

impl_from_env_value_int!(i64, u32, usize);

pub struct EnvVar<T> {
    pub key: &'static str,
    pub default: &'static str,
    kind: PhantomData<fn() -> T>,
}

impl<T> EnvVar<T> {
    pub const fn new(key: &'static str, default: &'static str) -> Self {
        Self {
            key,
            default,
            kind: PhantomData,
        }
    }
}

impl<T: FromEnvValue + Default> EnvVar<T> {
    pub fn resolve<F>(&self, lookup: &F) -> T
    where
        F: Fn(&str) -> Option<String>,
    {
        lookup(self.key)
            .filter(|value| !value.is_empty())
            .and_then(|value| T::from_env_value(&value))
            .or_else(|| T::from_env_value(self.default))
            .unwrap_or_default()
    }
}

/// Every variable the loader reads, with its default.
pub mod keys {
    use super::EnvVar;

    pub const APP_NAME: EnvVar<String> = EnvVar::new("APP_NAME", "");
    pub const APP_PORT: EnvVar<String> = EnvVar::new("APP_PORT", "");
    pub const APP_ENV: EnvVar<String> = EnvVar::new("APP_ENV", "");

    pub const DB_HOST: EnvVar<String> = EnvVar::new("DB_HOST", "");
    pub const DB_PORT: EnvVar<String> = EnvVar::new("DB_PORT", "");
    pub const DB_USER: EnvVar<String> = EnvVar::new("DB_USER", "");
    pub const DB_PASSWORD: EnvVar<String> = EnvVar::new("DB_PASSWORD", "");
    pub const DB_NAME: EnvVar<String> = EnvVar::new("DB_NAME", "");
    pub const DB_SSL_MODE: EnvVar<String> = EnvVar::new("DB_SSL_MODE", "");
    pub const DB_AUTO_MIGRATE: EnvVar<bool> = EnvVar::new("DB_AUTO_MIGRATE", "false");
    pub const DB_RUN_SEEDER: EnvVar<bool> = EnvVar::new("DB_RUN_SEEDER", "false");
    pub const DB_SEED_USERS: EnvVar<bool> = EnvVar::new("DB_SEED_USERS", "false");
    pub const DB_MIGRATE_ON_START: EnvVar<bool> = EnvVar::new("DB_MIGRATE_ON_START", "false");

    pub const JWT_SECRET: EnvVar<String> = EnvVar::new("JWT_SECRET", "");
    pub const JWT_EXPIRE_HOURS: EnvVar<i64> = EnvVar::new("JWT_EXPIRE_HOURS", "24");
    pub const JWT_REFRESH_TOKEN_EXPIRE_HOURS: EnvVar<i64> =
        EnvVar::new("JWT_REFRESH_TOKEN_EXPIRE_HOURS", "168");

    pub const MAIL_HOST: EnvVar<String> = EnvVar::new("MAIL_HOST", "");
    pub const MAIL_PORT: EnvVar<String> = EnvVar::new("MAIL_PORT", "");
    pub const MAIL_USERNAME: EnvVar<String> = EnvVar::new("MAIL_USERNAME", "");
    pub const MAIL_PASSWORD: EnvVar<String> = EnvVar::new("MAIL_PASSWORD", "");
    pub const MAIL_FROM: EnvVar<String> = EnvVar::new("MAIL_FROM", "");

    pub const REDIS_HOST: EnvVar<String> = EnvVar::new("REDIS_HOST", "localhost");
    pub const REDIS_PORT: EnvVar<String> = EnvVar::new("REDIS_PORT", "6379");
    pub const REDIS_PASSWORD: EnvVar<String> = EnvVar::new("REDIS_PASSWORD", "");
    pub const REDIS_DB: EnvVar<i64> = EnvVar::new("REDIS_DB", "0");
    pub const REDIS_MAX_RETRIES: EnvVar<u32> = EnvVar::new("REDIS_MAX_RETRIES", "3");
    pub const REDIS_POOL_SIZE: EnvVar<usize> = EnvVar::new("REDIS_POOL_SIZE", "10");

    pub const ALL: [&str; 27] = [
        APP_NAME.key,
        APP_PORT.key,
        APP_ENV.key,
        DB_HOST.key,
        DB_PORT.key,
        DB_USER.key,
        DB_PASSWORD.key,
        DB_NAME.key,
        DB_SSL_MODE.key,
        DB_AUTO_MIGRATE.key,
        DB_RUN_SEEDER.key,
        DB_SEED_USERS.key,
        DB_MIGRATE_ON_START.key,
        JWT_SECRET.key,
        JWT_EXPIRE_HOURS.key,
        JWT_REFRESH_TOKEN_EXPIRE_HOURS.key,
        MAIL_HOST.key,
        MAIL_PORT.key,
        MAIL_USERNAME.key,
        MAIL_PASSWORD.key,
        MAIL_FROM.key,
        REDIS_HOST.key,
        REDIS_PORT.key,
        REDIS_PASSWORD.key,
        REDIS_DB.key,
        REDIS_MAX_RETRIES.key,
        REDIS_POOL_SIZE.key,
    ];
}

/// Reads the process environment. Never fails: unset, empty or malformed values
/// resolve to their defaults.
pub fn load_config() -> Config {
    load_config_from(|key| env::var(key).ok())
}

pub fn load_config_from<F>(lookup: F) -> Config
where
    F: Fn(&str) -> Option<String>,
{
    Config {
        app: AppConfig {
            name: keys::APP_NAME.resolve(&lookup),
            port: keys::APP_PORT.resolve(&lookup),
            env: keys::APP_ENV.resolve(&lookup),
        },
        database: DatabaseConfig {
            host: keys::DB_HOST.resolve(&lookup),
            port: keys::DB_PORT.resolve(&lookup),
            user: keys::DB_USER.resolve(&lookup),
            password: keys::DB_PASSWORD.resolve(&lookup),
            name: keys::DB_NAME.resolve(&lookup),
            ssl_mode: keys::DB_SSL_MODE.resolve(&lookup),
            auto_migrate: keys::DB_AUTO_MIGRATE.resolve(&lookup),
            run_seeder: keys::DB_RUN_SEEDER.resolve(&lookup),
            seed_users: keys::DB_SEED_USERS.resolve(&lookup),
            migrate_on_start: keys::DB_MIGRATE_ON_START.resolve(&lookup),
        },
        jwt: JwtConfig {
            secret: keys::JWT_SECRET.resolve(&lookup),
            expire_hours: keys::JWT_EXPIRE_HOURS.resolve(&lookup),
            refresh_token_expire_hours: keys::JWT_REFRESH_TOKEN_EXPIRE_HOURS.resolve(&lookup),
        },
        mail: MailConfig {
            host: keys::MAIL_HOST.resolve(&lookup),
            port: keys::MAIL_PORT.resolve(&lookup),
            username: keys::MAIL_USERNAME.resolve(&lookup),
            password: keys::MAIL_PASSWORD.resolve(&lookup),
            from: keys::MAIL_FROM.resolve(&lookup),
        },
        redis: RedisConfig {
            host: keys::REDIS_HOST.resolve(&lookup),
            port: keys::REDIS_PORT.resolve(&lookup),
            password: keys::REDIS_PASSWORD.resolve(&lookup),
            db: keys::REDIS_DB.resolve(&lookup),
            max_retries: keys::REDIS_MAX_RETRIES.resolve(&lookup),
            pool_size: keys::REDIS_POOL_SIZE.resolve(&lookup),
        },
    }
}

static SHARED: OnceLock<Config> = OnceLock::new();

/// Process-wide configuration, loaded from the environment on first access.
pub fn shared() -> &'static Config {
    SHARED.get_or_init(load_config)
}

pub trait ConfigService: Send + Sync {
    fn values(&self) -> &Config;
}

pub struct ConfigServiceImpl {
    config: Arc<Config>,
}

impl ConfigServiceImpl {
    pub fn new() -> Self {
        Self::from_config(shared().clone())
    }

    pub fn from_config(config: Config) -> Self {
        Self {
            config: Arc::new(config),
        }
    }
}

impl Default for ConfigServiceImpl {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigService for ConfigServiceImpl {
    fn values(&self) -> &Config {
        &self.config
    }
}
