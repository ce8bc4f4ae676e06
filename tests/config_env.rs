use boilerplate_api::service::config::{keys, load_config};

fn cleared() -> Vec<(&'static str, Option<&'static str>)> {
    keys::ALL.iter().map(|key| (*key, None)).collect()
}

fn with_env<R>(vars: &[(&'static str, &'static str)], f: impl FnOnce() -> R) -> R {
    let mut all = cleared();
    for &(key, value) in vars {
        all.retain(|(existing, _)| *existing != key);
        all.push((key, Some(value)));
    }
    temp_env::with_vars(all, f)
}

#[test]
fn reads_every_section_from_the_environment() {
    let cfg = with_env(
        &[
            ("APP_NAME", "fiber-boiler-plate"),
            ("APP_PORT", "8080"),
            ("APP_ENV", "development"),
            ("DB_HOST", "localhost"),
            ("DB_PORT", "5432"),
            ("DB_USER", "postgres"),
            ("DB_PASSWORD", "postgres"),
            ("DB_NAME", "boiler"),
            ("DB_SSL_MODE", "disable"),
            ("JWT_SECRET", "super-secret"),
            ("JWT_EXPIRE_HOURS", "24"),
            ("JWT_REFRESH_TOKEN_EXPIRE_HOURS", "72"),
            ("MAIL_HOST", "smtp.example.com"),
            ("MAIL_PORT", "587"),
            ("MAIL_USERNAME", "mailer"),
            ("MAIL_PASSWORD", "mail-secret"),
            ("MAIL_FROM", "no-reply@example.com"),
            ("REDIS_HOST", "cache"),
            ("REDIS_PORT", "6380"),
            ("REDIS_PASSWORD", "redis-secret"),
            ("REDIS_DB", "2"),
            ("REDIS_MAX_RETRIES", "5"),
            ("REDIS_POOL_SIZE", "20"),
        ],
        load_config,
    );

    assert_eq!(cfg.app.name, "fiber-boiler-plate");
    assert_eq!(cfg.app.port, "8080");
    assert_eq!(cfg.app.env, "development");

    assert_eq!(cfg.database.host, "localhost");
    assert_eq!(cfg.database.port, "5432");
    assert_eq!(cfg.database.user, "postgres");
    assert_eq!(cfg.database.password, "postgres");
    assert_eq!(cfg.database.name, "boiler");
    assert_eq!(cfg.database.ssl_mode, "disable");

    assert_eq!(cfg.jwt.secret, "super-secret");
    assert_eq!(cfg.jwt.expire_hours, 24);
    assert_eq!(cfg.jwt.refresh_token_expire_hours, 72);

    assert_eq!(cfg.mail.host, "smtp.example.com");
    assert_eq!(cfg.mail.port, "587");
    assert_eq!(cfg.mail.username, "mailer");
    assert_eq!(cfg.mail.password, "mail-secret");
    assert_eq!(cfg.mail.from, "no-reply@example.com");

    assert_eq!(cfg.redis.host, "cache");
    assert_eq!(cfg.redis.port, "6380");
    assert_eq!(cfg.redis.password, "redis-secret");
    assert_eq!(cfg.redis.db, 2);
    assert_eq!(cfg.redis.max_retries, 5);
    assert_eq!(cfg.redis.pool_size, 20);
}

#[test]
fn cleared_environment_uses_redis_defaults() {
    let cfg = with_env(&[], load_config);

    assert_eq!(cfg.redis.host, "localhost");
    assert_eq!(cfg.redis.port, "6379");
    assert_eq!(cfg.redis.password, "");
    assert_eq!(cfg.redis.db, 0);
    assert_eq!(cfg.redis.max_retries, 3);
    assert_eq!(cfg.redis.pool_size, 10);
}

#[test]
fn refresh_expiry_defaults_independently() {
    let cfg = with_env(&[("JWT_EXPIRE_HOURS", "2")], load_config);

    assert_eq!(cfg.jwt.expire_hours, 2);
    assert_eq!(cfg.jwt.refresh_token_expire_hours, 168);
}

#[test]
fn database_flags_parse_independently() {
    let flags = [
        "DB_AUTO_MIGRATE",
        "DB_RUN_SEEDER",
        "DB_SEED_USERS",
        "DB_MIGRATE_ON_START",
    ];

    for flag in flags {
        for (raw, expected) in [("true", true), ("false", false)] {
            let db = with_env(&[(flag, raw)], load_config).database;
            let values = [
                ("DB_AUTO_MIGRATE", db.auto_migrate),
                ("DB_RUN_SEEDER", db.run_seeder),
                ("DB_SEED_USERS", db.seed_users),
                ("DB_MIGRATE_ON_START", db.migrate_on_start),
            ];
            for (name, value) in values {
                let want = name == flag && expected;
                assert_eq!(value, want, "{name} with {flag}={raw}");
            }
        }
    }
}

#[test]
fn unset_integers_resolve_to_defaults() {
    let cfg = with_env(&[("REDIS_HOST", "cache")], load_config);

    assert_eq!(cfg.redis.db, 0);
    assert_eq!(cfg.redis.max_retries, 3);
    assert_eq!(cfg.redis.pool_size, 10);
    assert_eq!(cfg.jwt.expire_hours, 24);
}

#[test]
fn empty_values_are_treated_as_unset() {
    let cfg = with_env(&[("REDIS_HOST", ""), ("REDIS_POOL_SIZE", "")], load_config);

    assert_eq!(cfg.redis.host, "localhost");
    assert_eq!(cfg.redis.pool_size, 10);
}

#[test]
fn whitespace_values_pass_through() {
    let cfg = with_env(&[("DB_HOST", "  "), ("REDIS_PORT", " ")], load_config);

    assert_eq!(cfg.database.host, "  ");
    assert_eq!(cfg.redis.port, " ");
}

#[test]
fn loading_twice_yields_equal_configs() {
    let (first, second) = with_env(
        &[("APP_NAME", "boiler"), ("REDIS_DB", "3"), ("DB_RUN_SEEDER", "true")],
        || (load_config(), load_config()),
    );

    assert_eq!(first, second);
}
