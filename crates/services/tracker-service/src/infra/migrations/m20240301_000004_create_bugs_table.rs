//! Migration: Create bugs table.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Bugs::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Bugs::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Bugs::Name).string_len(45).not_null())
                    .col(ColumnDef::new(Bugs::Description).text().null())
                    .col(ColumnDef::new(Bugs::Reproduction).text().null())
                    .col(ColumnDef::new(Bugs::ExpectedResult).text().null())
                    .col(ColumnDef::new(Bugs::StartDate).date().null())
                    .col(ColumnDef::new(Bugs::EndDate).date().null())
                    .col(ColumnDef::new(Bugs::TypeId).integer().not_null())
                    .col(ColumnDef::new(Bugs::PriorityId).integer().not_null())
                    .col(ColumnDef::new(Bugs::StatusId).integer().not_null().default(1))
                    .col(ColumnDef::new(Bugs::ProjectId).integer().not_null())
                    .col(ColumnDef::new(Bugs::OwnerId).integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_bugs_type")
                            .from(Bugs::Table, Bugs::TypeId)
                            .to(Types::Table, Lookup::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_bugs_priority")
                            .from(Bugs::Table, Bugs::PriorityId)
                            .to(Priorities::Table, Lookup::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_bugs_status")
                            .from(Bugs::Table, Bugs::StatusId)
                            .to(Statuses::Table, Lookup::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_bugs_project")
                            .from(Bugs::Table, Bugs::ProjectId)
                            .to(Projects::Table, Lookup::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_bugs_owner")
                            .from(Bugs::Table, Bugs::OwnerId)
                            .to(Users::Table, Lookup::Id),
                    )
                    .to_owned(),
            )
            .await?;

        for (name, column) in [
            ("idx_bugs_owner_id", Bugs::OwnerId),
            ("idx_bugs_project_id", Bugs::ProjectId),
            ("idx_bugs_status_id", Bugs::StatusId),
        ] {
            manager
                .create_index(
                    Index::create()
                        .name(name)
                        .table(Bugs::Table)
                        .col(column)
                        .to_owned(),
                )
                .await?;
        }

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Bugs::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Bugs {
    Table,
    Id,
    Name,
    Description,
    Reproduction,
    ExpectedResult,
    StartDate,
    EndDate,
    TypeId,
    PriorityId,
    StatusId,
    ProjectId,
    OwnerId,
}

#[derive(Iden)]
enum Types {
    Table,
}

#[derive(Iden)]
enum Priorities {
    Table,
}

#[derive(Iden)]
enum Statuses {
    Table,
}

#[derive(Iden)]
enum Projects {
    Table,
}

#[derive(Iden)]
enum Users {
    Table,
}

/// Primary key column shared by the referenced tables
#[derive(Iden)]
enum Lookup {
    Id,
}
