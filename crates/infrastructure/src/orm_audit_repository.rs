use std::str::FromStr;

use async_trait::async_trait;
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    QueryFilter, QueryOrder, QuerySelect, Select, SelectTwo, Set, SqlxPostgresConnector,
    TransactionTrait,
};
use sqlx::PgPool;

use bazaar_application::{AuditReader, AuditSearchQuery, AuditWriter};
use bazaar_core::{AppError, AppResult};
use bazaar_domain::{
    ANONYMOUS_ACTOR, AuditAction, AuditReadRecord, AuditRecord, AuditRecordId, AuditStatus,
};

use crate::orm_entities::{audit_entry, audit_user};

type EntryWithUser = (audit_entry::Model, Option<audit_user::Model>);

/// SeaORM-managed audit repository.
///
/// Actors are stored as rows of `audit_users` linked by foreign key; the
/// anonymous actor is stored as a `NULL` link. Reads rebuild the actor string
/// from the joined user.
#[derive(Clone)]
pub struct OrmAuditRepository {
    connection: DatabaseConnection,
}

impl OrmAuditRepository {
    /// Creates a repository over an established SeaORM connection.
    #[must_use]
    pub fn new(connection: DatabaseConnection) -> Self {
        Self { connection }
    }

    /// Creates a repository sharing an existing sqlx pool.
    #[must_use]
    pub fn from_pool(pool: PgPool) -> Self {
        Self::new(SqlxPostgresConnector::from_sqlx_postgres_pool(pool))
    }

    fn entries_with_users() -> SelectTwo<audit_entry::Entity, audit_user::Entity> {
        audit_entry::Entity::find()
            .find_also_related(audit_user::Entity)
            .order_by_asc(audit_entry::Column::CreatedAt)
            .order_by_asc(audit_entry::Column::Id)
    }
}

fn storage_error(context: &str, error: DbErr) -> AppError {
    AppError::Unavailable(format!("failed to {context}: {error}"))
}

fn into_read_record((entry, user): EntryWithUser) -> AppResult<AuditReadRecord> {
    let action = AuditAction::from_str(entry.action.as_str()).map_err(|error| {
        AppError::Internal(format!("audit entry {} is unreadable: {error}", entry.id))
    })?;
    let status = AuditStatus::from_str(entry.status.as_str()).map_err(|error| {
        AppError::Internal(format!("audit entry {} is unreadable: {error}", entry.id))
    })?;
    let created_by = user
        .map(|user| user.email)
        .unwrap_or_else(|| ANONYMOUS_ACTOR.to_owned());

    Ok(AuditReadRecord::from_storage(
        AuditRecordId::new(entry.id),
        entry.created_at,
        created_by,
        action,
        status,
        entry.auditable_record_text,
    ))
}

fn into_read_records(rows: Vec<EntryWithUser>) -> AppResult<Vec<AuditReadRecord>> {
    rows.into_iter().map(into_read_record).collect()
}

fn filter_by_actor(
    select: SelectTwo<audit_entry::Entity, audit_user::Entity>,
    actor: &str,
) -> SelectTwo<audit_entry::Entity, audit_user::Entity> {
    if actor == ANONYMOUS_ACTOR {
        select.filter(audit_entry::Column::UserId.is_null())
    } else {
        select.filter(audit_user::Column::Email.eq(actor))
    }
}

async fn find_user_by_email<C>(connection: &C, email: &str) -> AppResult<Option<audit_user::Model>>
where
    C: ConnectionTrait,
{
    audit_user::Entity::find()
        .filter(audit_user::Column::Email.eq(email))
        .one(connection)
        .await
        .map_err(|error| storage_error("look up audit user", error))
}

async fn find_or_create_user<C>(connection: &C, email: &str) -> AppResult<i64>
where
    C: ConnectionTrait,
{
    if let Some(user) = find_user_by_email(connection, email).await? {
        return Ok(user.id);
    }

    let inserted = audit_user::Entity::insert(audit_user::ActiveModel {
        email: Set(email.to_owned()),
        ..Default::default()
    })
    .on_conflict(
        OnConflict::column(audit_user::Column::Email)
            .do_nothing()
            .to_owned(),
    )
    .exec(connection)
    .await;

    match inserted {
        Ok(result) => Ok(result.last_insert_id),
        // Another writer created the user between lookup and insert.
        Err(DbErr::RecordNotInserted) => find_user_by_email(connection, email)
            .await?
            .map(|user| user.id)
            .ok_or_else(|| {
                AppError::Internal(format!("audit user '{email}' vanished after conflict"))
            }),
        Err(error) => Err(storage_error("create audit user", error)),
    }
}

fn entry_by_id(id: AuditRecordId) -> Select<audit_entry::Entity> {
    audit_entry::Entity::find_by_id(id.as_i64())
}

#[async_trait]
impl AuditWriter for OrmAuditRepository {
    async fn append(&self, record: AuditRecord) -> AppResult<AuditRecordId> {
        let transaction = self
            .connection
            .begin()
            .await
            .map_err(|error| storage_error("begin audit transaction", error))?;

        let user_id = if record.is_anonymous() {
            None
        } else {
            Some(find_or_create_user(&transaction, record.actor()).await?)
        };

        let entry = audit_entry::ActiveModel {
            created_at: Set(record.created_at()),
            user_id: Set(user_id),
            action: Set(record.action().as_str().to_owned()),
            status: Set(record.status().as_str().to_owned()),
            auditable_record_text: Set(record.auditable_record_text().to_owned()),
            ..Default::default()
        }
        .insert(&transaction)
        .await
        .map_err(|error| storage_error("append audit entry", error))?;

        transaction
            .commit()
            .await
            .map_err(|error| storage_error("commit audit entry", error))?;

        Ok(AuditRecordId::new(entry.id))
    }
}

#[async_trait]
impl AuditReader for OrmAuditRepository {
    async fn find_by_id(&self, id: AuditRecordId) -> AppResult<Option<AuditReadRecord>> {
        entry_by_id(id)
            .find_also_related(audit_user::Entity)
            .one(&self.connection)
            .await
            .map_err(|error| storage_error(&format!("find audit entry {id}"), error))?
            .map(into_read_record)
            .transpose()
    }

    async fn find_all(&self) -> AppResult<Vec<AuditReadRecord>> {
        let rows = Self::entries_with_users()
            .all(&self.connection)
            .await
            .map_err(|error| storage_error("list audit entries", error))?;

        into_read_records(rows)
    }

    async fn find_all_by_actor(&self, actor: &str) -> AppResult<Vec<AuditReadRecord>> {
        let rows = filter_by_actor(Self::entries_with_users(), actor)
            .all(&self.connection)
            .await
            .map_err(|error| {
                storage_error(&format!("list audit entries for actor '{actor}'"), error)
            })?;

        into_read_records(rows)
    }

    async fn search(&self, query: AuditSearchQuery) -> AppResult<Vec<AuditReadRecord>> {
        let mut select = Self::entries_with_users();
        if let Some(actor) = query.actor.as_deref() {
            select = filter_by_actor(select, actor);
        }
        if let Some(action) = query.action {
            select = select.filter(audit_entry::Column::Action.eq(action.as_str()));
        }
        if let Some(status) = query.status {
            select = select.filter(audit_entry::Column::Status.eq(status.as_str()));
        }

        let rows = select
            .limit(u64::try_from(query.capped_limit()).unwrap_or(u64::MAX))
            .offset(u64::try_from(query.capped_offset()).unwrap_or(u64::MAX))
            .all(&self.connection)
            .await
            .map_err(|error| storage_error("search audit entries", error))?;

        into_read_records(rows)
    }
}
