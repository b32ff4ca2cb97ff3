//! Migration: Create and seed the lookup tables (roles, types, priorities, statuses).

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

/// Seed rows per table. Lower priority ids rank higher; types 1-2 are
/// front-end and 3-4 back-end.
const SEEDS: &[(&str, &[(i32, &str)])] = &[
    ("roles", &[(1, "ROLE_ADMIN"), (2, "ROLE_USER")]),
    (
        "types",
        &[(1, "interface"), (2, "javascript"), (3, "database"), (4, "server")],
    ),
    (
        "priorities",
        &[(1, "urgent"), (2, "important"), (3, "normal"), (4, "low")],
    ),
    ("statuses", &[(1, "open"), (2, "closed")]),
];

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        for (table, rows) in SEEDS {
            manager
                .create_table(
                    Table::create()
                        .table(Alias::new(*table))
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Lookup::Id)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(Lookup::Name).string_len(45).not_null())
                        .to_owned(),
                )
                .await?;

            let mut insert = Query::insert();
            insert
                .into_table(Alias::new(*table))
                .columns([Lookup::Id, Lookup::Name]);
            for (id, name) in rows.iter() {
                insert
                    .values([(*id).into(), (*name).into()])
                    .map_err(|e| DbErr::Migration(e.to_string()))?;
            }
            manager.exec_stmt(insert).await?;

            // Explicit ids leave the serial sequence behind
            manager
                .get_connection()
                .execute_unprepared(&format!(
                    "SELECT setval(pg_get_serial_sequence('{table}', 'id'), (SELECT MAX(id) FROM {table}))"
                ))
                .await?;
        }

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        for (table, _) in SEEDS.iter().rev() {
            manager
                .drop_table(Table::drop().table(Alias::new(*table)).to_owned())
                .await?;
        }
        Ok(())
    }
}

#[derive(Iden)]
enum Lookup {
    Id,
    Name,
}
