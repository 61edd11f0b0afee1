use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

/// Status codes the payment ledger relies on.
const STATUSES: [(i32, &str); 3] = [(1, "Unpaid"), (2, "Paid"), (3, "Exempt")];

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let mut insert = Query::insert();
        insert
            .into_table(Status::Table)
            .columns([Status::StatusId, Status::StatusName]);
        for (id, name) in STATUSES {
            insert.values_panic([id.into(), name.into()]);
        }

        manager.exec_stmt(insert.to_owned()).await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let delete = Query::delete()
            .from_table(Status::Table)
            .and_where(Expr::col(Status::StatusId).is_in(STATUSES.map(|(id, _)| id)))
            .to_owned();

        manager.exec_stmt(delete).await
    }
}

#[derive(DeriveIden)]
enum Status {
    Table,
    StatusId,
    StatusName,
}
