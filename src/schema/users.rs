use sea_orm::{ConnectionTrait, DatabaseConnection, DbBackend, Statement};
use sea_orm_migration::prelude::*;

pub async fn apply(manager: &SchemaManager<'_>, conn: &DatabaseConnection) -> Result<(), DbErr> {
    if manager.has_table("users").await? {
        return Ok(());
    }

    manager
        .create_table(
            Table::create()
                .table(Users::Table)
                .if_not_exists()
                .col(
                    ColumnDef::new(Users::Id)
                        .big_integer()
                        .not_null()
                        .auto_increment()
                        .primary_key(),
                )
                .col(
                    ColumnDef::new(Users::Uid)
                        .uuid()
                        .not_null()
                        .default(SimpleExpr::Custom("gen_random_uuid()".into())),
                )
                .col(ColumnDef::new(Users::Name).string().not_null())
                .col(ColumnDef::new(Users::Email).string().not_null())
                .col(ColumnDef::new(Users::PasswordHash).string().not_null())
                .col(
                    ColumnDef::new(Users::CreatedAt)
                        .timestamp_with_time_zone()
                        .not_null()
                        .default(SimpleExpr::Custom("now()".into())),
                )
                .col(
                    ColumnDef::new(Users::UpdatedAt)
                        .timestamp_with_time_zone()
                        .not_null()
                        .default(SimpleExpr::Custom("now()".into())),
                )
                .to_owned(),
        )
        .await?;

    conn.execute(Statement::from_string(
        DbBackend::Postgres,
        "CREATE UNIQUE INDEX IF NOT EXISTS users_uid_unique ON users (uid)".to_string(),
    ))
    .await?;

    conn.execute(Statement::from_string(
        DbBackend::Postgres,
        "CREATE UNIQUE INDEX IF NOT EXISTS users_email_unique ON users (lower(email))".to_string(),
    ))
    .await?;

    Ok(())
}

#[derive(Iden)]
enum Users {
    Table,
    Id,
    Uid,
    Name,
    Email,
    PasswordHash,
    CreatedAt,
    UpdatedAt,
}
