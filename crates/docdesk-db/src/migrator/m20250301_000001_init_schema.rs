//! Initial schema: members, books, relationships, comments and site options

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // ============================================================
        // 1. Create member table
        // ============================================================
        manager
            .create_table(
                Table::create()
                    .table(Member::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Member::MemberId)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Member::Account)
                            .string_len(50)
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Member::Password).string_len(255).not_null())
                    .col(ColumnDef::new(Member::Email).string_len(100).not_null())
                    .col(ColumnDef::new(Member::Phone).string_len(255))
                    .col(ColumnDef::new(Member::Avatar).string_len(1000).not_null())
                    .col(
                        ColumnDef::new(Member::Role)
                            .integer()
                            .not_null()
                            .default(2),
                    )
                    .col(
                        ColumnDef::new(Member::Status)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Member::CreateAt)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Member::CreateTime)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(ColumnDef::new(Member::LastLoginTime).timestamp_with_time_zone())
                    .to_owned(),
            )
            .await?;

        // ============================================================
        // 2. Create book table
        // ============================================================
        manager
            .create_table(
                Table::create()
                    .table(Book::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Book::BookId)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Book::BookName).string_len(500).not_null())
                    .col(
                        ColumnDef::new(Book::Identify)
                            .string_len(100)
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(Book::OrderIndex)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(Book::Description).text().not_null())
                    .col(
                        ColumnDef::new(Book::Label)
                            .string_len(500)
                            .not_null()
                            .default(""),
                    )
                    .col(
                        ColumnDef::new(Book::CommentStatus)
                            .string_len(32)
                            .not_null()
                            .default("closed"),
                    )
                    .col(
                        ColumnDef::new(Book::PrivatelyOwned)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(Book::PrivateToken).string_len(500))
                    .col(ColumnDef::new(Book::MemberId).integer().not_null())
                    .col(
                        ColumnDef::new(Book::CreateTime)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Book::ModifyTime)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        // ============================================================
        // 3. Create relationship junction table
        // ============================================================
        manager
            .create_table(
                Table::create()
                    .table(Relationship::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Relationship::RelationshipId)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Relationship::MemberId).integer().not_null())
                    .col(ColumnDef::new(Relationship::BookId).integer().not_null())
                    .col(
                        ColumnDef::new(Relationship::RoleId)
                            .integer()
                            .not_null()
                            .default(3),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_relationship_book_id")
                            .from(Relationship::Table, Relationship::BookId)
                            .to(Book::Table, Book::BookId)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_relationship_member_id")
                            .from(Relationship::Table, Relationship::MemberId)
                            .to(Member::Table, Member::MemberId)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_relationship_book_member")
                    .table(Relationship::Table)
                    .col(Relationship::BookId)
                    .col(Relationship::MemberId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_relationship_member_id")
                    .table(Relationship::Table)
                    .col(Relationship::MemberId)
                    .to_owned(),
            )
            .await?;

        // At most one founder row per book. Partial indexes are not expressible
        // through the index builder; the statement is valid on SQLite and PostgreSQL.
        manager
            .get_connection()
            .execute_unprepared(
                "CREATE UNIQUE INDEX IF NOT EXISTS idx_relationship_single_founder \
                 ON relationship (book_id) WHERE role_id = 0",
            )
            .await?;

        // ============================================================
        // 4. Create comment table
        // ============================================================
        manager
            .create_table(
                Table::create()
                    .table(Comment::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Comment::CommentId)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Comment::BookId).integer().not_null())
                    .col(
                        ColumnDef::new(Comment::DocumentId)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(Comment::MemberId).integer().not_null())
                    .col(ColumnDef::new(Comment::Content).text().not_null())
                    .col(
                        ColumnDef::new(Comment::Approved)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Comment::CommentDate)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_comment_book_id")
                            .from(Comment::Table, Comment::BookId)
                            .to(Book::Table, Book::BookId)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_comment_book_id")
                    .table(Comment::Table)
                    .col(Comment::BookId)
                    .to_owned(),
            )
            .await?;

        // ============================================================
        // 5. Create site_option table
        // ============================================================
        manager
            .create_table(
                Table::create()
                    .table(SiteOption::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(SiteOption::OptionId)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(SiteOption::OptionTitle)
                            .string_len(500)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(SiteOption::OptionName)
                            .string_len(80)
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(SiteOption::OptionValue)
                            .text()
                            .not_null(),
                    )
                    .col(ColumnDef::new(SiteOption::Remark).text())
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(SiteOption::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Comment::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Relationship::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Book::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Member::Table).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
enum Member {
    Table,
    MemberId,
    Account,
    Password,
    Email,
    Phone,
    Avatar,
    Role,
    Status,
    CreateAt,
    CreateTime,
    LastLoginTime,
}

#[derive(DeriveIden)]
enum Book {
    Table,
    BookId,
    BookName,
    Identify,
    OrderIndex,
    Description,
    Label,
    CommentStatus,
    PrivatelyOwned,
    PrivateToken,
    MemberId,
    CreateTime,
    ModifyTime,
}

#[derive(DeriveIden)]
enum Relationship {
    Table,
    RelationshipId,
    MemberId,
    BookId,
    RoleId,
}

#[derive(DeriveIden)]
enum Comment {
    Table,
    CommentId,
    BookId,
    DocumentId,
    MemberId,
    Content,
    Approved,
    CommentDate,
}

#[derive(DeriveIden)]
enum SiteOption {
    Table,
    OptionId,
    OptionTitle,
    OptionName,
    OptionValue,
    Remark,
}
