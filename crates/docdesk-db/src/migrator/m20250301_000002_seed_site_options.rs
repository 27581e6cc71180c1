//! Seed the site options read by the control plane
//!
//! An empty value means "use the configured default".

use sea_orm_migration::prelude::*;

const DEFAULT_OPTIONS: &[(&str, &str, &str)] = &[
    ("Site name", "SITE_NAME", "docdesk"),
    ("Default avatar", "DEFAULT_AVATAR", ""),
    ("Access token length", "TOKEN_SIZE", ""),
    ("Allow anonymous reading", "ENABLE_ANONYMOUS", "false"),
];

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let mut insert = Query::insert();
        insert.into_table(SiteOption::Table).columns([
            SiteOption::OptionTitle,
            SiteOption::OptionName,
            SiteOption::OptionValue,
        ]);

        for (title, name, value) in DEFAULT_OPTIONS {
            insert.values_panic([(*title).into(), (*name).into(), (*value).into()]);
        }

        manager.exec_stmt(insert.to_owned()).await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let names: Vec<&str> = DEFAULT_OPTIONS.iter().map(|(_, name, _)| *name).collect();

        let delete = Query::delete()
            .from_table(SiteOption::Table)
            .and_where(Expr::col(SiteOption::OptionName).is_in(names))
            .to_owned();

        manager.exec_stmt(delete).await
    }
}

#[derive(DeriveIden)]
enum SiteOption {
    Table,
    OptionTitle,
    OptionName,
    OptionValue,
}
