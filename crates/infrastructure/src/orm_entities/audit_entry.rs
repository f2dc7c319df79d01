use sea_orm::entity::prelude::*;

/// Audit entry row; `user_id` is `NULL` for the anonymous actor.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "audit_entries")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    #[sea_orm(column_type = "TimestampWithTimeZone")]
    pub created_at: DateTimeUtc,
    pub user_id: Option<i64>,
    pub action: String,
    pub status: String,
    #[sea_orm(column_type = "Text")]
    pub auditable_record_text: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::audit_user::Entity",
        from = "Column::UserId",
        to = "super::audit_user::Column::Id"
    )]
    AuditUser,
}

impl Related<super::audit_user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::AuditUser.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
