use sea_orm::ActiveValue::Set;
use tracing::info;
use uuid::Uuid;

use crate::{
    db::MigrationPlan,
    entities::users,
    repo::users::UsersRepo,
    service::auth::{AuthError, AuthServiceImpl},
};

pub struct SeedUser {
    pub name: &'static str,
    pub email: &'static str,
    pub password: &'static str,
}

pub const SEED_USERS: [SeedUser; 2] = [
    SeedUser {
        name: "Admin",
        email: "admin@example.com",
        password: "admin-password",
    },
    SeedUser {
        name: "Demo User",
        email: "user@example.com",
        password: "user-password",
    },
];

#[derive(Debug, thiserror::Error)]
pub enum SeedError {
    #[error("database error: {0}")]
    Db(#[from] sea_orm::DbErr),
    #[error("password hash failed: {0}")]
    Hash(#[from] AuthError),
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub inserted: usize,
    pub skipped: usize,
}

/// Inserts the demo users the plan allows. Users whose email already exists are skipped.
pub async fn run(plan: MigrationPlan, users_repo: &dyn UsersRepo) -> Result<SeedReport, SeedError> {
    let mut report = SeedReport::default();
    if !plan.run_seeder {
        return Ok(report);
    }

    if plan.seed_users {
        for seed in &SEED_USERS {
            if users_repo.find_by_email(seed.email).await?.is_some() {
                report.skipped += 1;
                continue;
            }
            users_repo
                .insert(users::ActiveModel {
                    uid: Set(Uuid::new_v4()),
                    name: Set(seed.name.to_string()),
                    email: Set(seed.email.to_string()),
                    password_hash: Set(AuthServiceImpl::hash_password(seed.password)?),
                    ..Default::default()
                })
                .await?;
            report.inserted += 1;
        }
    }

    info!(inserted = report.inserted, skipped = report.skipped, "seeder finished");
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::auth::tests::MemoryUsersRepo;

    fn plan(run_seeder: bool, seed_users: bool) -> MigrationPlan {
        MigrationPlan {
            run_seeder,
            seed_users,
            ..MigrationPlan::default()
        }
    }

    #[tokio::test]
    async fn does_nothing_unless_enabled() {
        let repo = MemoryUsersRepo::default();
        assert_eq!(run(plan(false, true), &repo).await.unwrap(), SeedReport::default());
        assert_eq!(run(plan(true, false), &repo).await.unwrap(), SeedReport::default());
        assert!(repo.users.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn seeds_users_once() {
        let repo = MemoryUsersRepo::default();

        let first = run(plan(true, true), &repo).await.unwrap();
        assert_eq!(
            first,
            SeedReport {
                inserted: SEED_USERS.len(),
                skipped: 0
            }
        );

        let second = run(plan(true, true), &repo).await.unwrap();
        assert_eq!(
            second,
            SeedReport {
                inserted: 0,
                skipped: SEED_USERS.len()
            }
        );
        assert_eq!(repo.users.lock().unwrap().len(), SEED_USERS.len());
    }
}
