//! SQLx implementation of the contract repository

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{PgPool, Postgres, QueryBuilder};
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::contract::{
    Contract, ContractError, ContractFilter, ContractHistoryEntry, ContractId, ContractNumber,
    ContractSort, ContractStatus, HistoryAction, HistoryEntryId, IContractRepository, Money,
};
use crate::domain::directory::UserId;
use crate::domain::workflow::WorkflowId;

use super::violates;

const CONTRACT_COLUMNS: &str = "id, contract_number, title, description, counterparty, \
     contract_type, department, amount_cents, currency, start_date, end_date, status, \
     workflow_id, created_by, created_at, updated_at";

/// Database row for the contracts table
#[derive(Debug, sqlx::FromRow)]
struct ContractRow {
    id: Uuid,
    contract_number: String,
    title: String,
    description: Option<String>,
    counterparty: String,
    contract_type: String,
    department: Option<String>,
    amount_cents: i64,
    currency: String,
    start_date: NaiveDate,
    end_date: NaiveDate,
    status: String,
    workflow_id: Option<Uuid>,
    created_by: Uuid,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Database row for the contract_history table
#[derive(Debug, sqlx::FromRow)]
struct HistoryRow {
    id: Uuid,
    contract_id: Uuid,
    action: String,
    from_status: Option<String>,
    to_status: Option<String>,
    actor_id: Option<Uuid>,
    note: Option<String>,
    created_at: DateTime<Utc>,
}

fn corrupt(message: String) -> ContractError {
    tracing::error!("Corrupt contract row: {}", message);
    ContractError::DatabaseError { message }
}

fn database_error(context: &str, e: sqlx::Error) -> ContractError {
    tracing::error!("Database error {}: {}", context, e);
    ContractError::DatabaseError {
        message: e.to_string(),
    }
}

fn parse_status(value: &str) -> Result<ContractStatus, ContractError> {
    value.parse().map_err(corrupt)
}

fn row_to_contract(row: ContractRow) -> Result<Contract, ContractError> {
    Ok(Contract {
        id: ContractId::from(row.id),
        contract_number: ContractNumber::new(row.contract_number).map_err(corrupt)?,
        title: row.title,
        description: row.description,
        counterparty: row.counterparty,
        contract_type: row.contract_type,
        department: row.department,
        value: Money::new(row.amount_cents, row.currency).map_err(corrupt)?,
        start_date: row.start_date,
        end_date: row.end_date,
        status: parse_status(&row.status)?,
        workflow_id: row.workflow_id.map(WorkflowId::from),
        created_by: UserId::from(row.created_by),
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
}

fn row_to_history(row: HistoryRow) -> Result<ContractHistoryEntry, ContractError> {
    Ok(ContractHistoryEntry {
        id: HistoryEntryId::from(row.id),
        contract_id: ContractId::from(row.contract_id),
        action: row.action.parse::<HistoryAction>().map_err(corrupt)?,
        from_status: row.from_status.as_deref().map(parse_status).transpose()?,
        to_status: row.to_status.as_deref().map(parse_status).transpose()?,
        actor_id: row.actor_id.map(UserId::from),
        note: row.note,
        created_at: row.created_at,
    })
}

fn rows_to_contracts(rows: Vec<ContractRow>) -> Result<Vec<Contract>, ContractError> {
    rows.into_iter().map(row_to_contract).collect()
}

/// Escape LIKE metacharacters in user-supplied search text
fn like_pattern(search: &str) -> String {
    let escaped = search
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

fn push_filters(builder: &mut QueryBuilder<'_, Postgres>, filter: &ContractFilter) {
    builder.push(" WHERE TRUE");

    if let Some(status) = filter.status {
        builder.push(" AND status = ").push_bind(status.as_str());
    }
    if let Some(counterparty) = &filter.counterparty {
        builder
            .push(" AND LOWER(counterparty) = LOWER(")
            .push_bind(counterparty.clone())
            .push(")");
    }
    if let Some(contract_type) = &filter.contract_type {
        builder
            .push(" AND LOWER(contract_type) = LOWER(")
            .push_bind(contract_type.clone())
            .push(")");
    }
    if let Some(department) = &filter.department {
        builder
            .push(" AND LOWER(department) = LOWER(")
            .push_bind(department.clone())
            .push(")");
    }
    if let Some(created_by) = filter.created_by {
        builder
            .push(" AND created_by = ")
            .push_bind(created_by.as_uuid());
    }
    if let Some(before) = filter.expiring_before {
        builder.push(" AND end_date <= ").push_bind(before);
    }
    if let Some(search) = &filter.search {
        let pattern = like_pattern(search);
        builder
            .push(" AND (title ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR contract_number ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR counterparty ILIKE ")
            .push_bind(pattern)
            .push(")");
    }
}

/// SQLx implementation of the contract repository
pub struct SqlxContractRepository {
    pool: Arc<PgPool>,
}

impl SqlxContractRepository {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }

    async fn fetch_active(
        &self,
        condition: &str,
        first: NaiveDate,
        second: Option<NaiveDate>,
    ) -> Result<Vec<Contract>, ContractError> {
        let sql = format!(
            "SELECT {} FROM contracts WHERE status = 'active' AND {} ORDER BY end_date, id",
            CONTRACT_COLUMNS, condition
        );
        let mut query = sqlx::query_as::<_, ContractRow>(&sql).bind(first);
        if let Some(second) = second {
            query = query.bind(second);
        }
        let rows = query
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| database_error("listing active contracts", e))?;
        rows_to_contracts(rows)
    }
}

#[async_trait]
impl IContractRepository for SqlxContractRepository {
    async fn find_by_id(&self, id: &ContractId) -> Result<Option<Contract>, ContractError> {
        let sql = format!("SELECT {} FROM contracts WHERE id = $1", CONTRACT_COLUMNS);
        let row = sqlx::query_as::<_, ContractRow>(&sql)
            .bind(id.as_uuid())
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| database_error("finding contract by id", e))?;
        row.map(row_to_contract).transpose()
    }

    async fn find_by_number(&self, number: &str) -> Result<Option<Contract>, ContractError> {
        let sql = format!(
            "SELECT {} FROM contracts WHERE contract_number = $1",
            CONTRACT_COLUMNS
        );
        let row = sqlx::query_as::<_, ContractRow>(&sql)
            .bind(number)
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| database_error("finding contract by number", e))?;
        row.map(row_to_contract).transpose()
    }

    async fn list(&self, filter: &ContractFilter) -> Result<(Vec<Contract>, u64), ContractError> {
        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM contracts");
        push_filters(&mut count, filter);
        let total: i64 = count
            .build_query_scalar::<i64>()
            .fetch_one(&*self.pool)
            .await
            .map_err(|e| database_error("counting contracts", e))?;

        let order_by = match filter.sort {
            ContractSort::Title => "LOWER(title)",
            other => other.column(),
        };
        let direction = filter.direction.as_sql();

        let mut select = QueryBuilder::<Postgres>::new(format!(
            "SELECT {} FROM contracts",
            CONTRACT_COLUMNS
        ));
        push_filters(&mut select, filter);
        select
            .push(format!(
                " ORDER BY {} {}, id {}",
                order_by, direction, direction
            ))
            .push(" LIMIT ")
            .push_bind(i64::from(filter.limit))
            .push(" OFFSET ")
            .push_bind(i64::from(filter.offset));

        let rows = select
            .build_query_as::<ContractRow>()
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| database_error("listing contracts", e))?;

        Ok((rows_to_contracts(rows)?, total.max(0) as u64))
    }

    async fn create(&self, contract: &Contract) -> Result<(), ContractError> {
        sqlx::query(
            r#"
            INSERT INTO contracts (id, contract_number, title, description, counterparty,
                contract_type, department, amount_cents, currency, start_date, end_date,
                status, workflow_id, created_by, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)
            "#,
        )
        .bind(contract.id.as_uuid())
        .bind(contract.contract_number.as_str())
        .bind(&contract.title)
        .bind(&contract.description)
        .bind(&contract.counterparty)
        .bind(&contract.contract_type)
        .bind(&contract.department)
        .bind(contract.value.amount_cents)
        .bind(&contract.value.currency)
        .bind(contract.start_date)
        .bind(contract.end_date)
        .bind(contract.status.as_str())
        .bind(contract.workflow_id.map(|w| w.as_uuid()))
        .bind(contract.created_by.as_uuid())
        .bind(contract.created_at)
        .bind(contract.updated_at)
        .execute(&*self.pool)
        .await
        .map_err(|e| {
            if violates(&e, "idx_contracts_number") {
                return ContractError::DuplicateNumber {
                    number: contract.contract_number.to_string(),
                };
            }
            database_error("creating contract", e)
        })?;

        Ok(())
    }

    async fn update(&self, contract: &Contract) -> Result<(), ContractError> {
        let result = sqlx::query(
            r#"
            UPDATE contracts
            SET title = $2, description = $3, counterparty = $4, contract_type = $5,
                department = $6, amount_cents = $7, currency = $8, start_date = $9,
                end_date = $10, status = $11, workflow_id = $12, updated_at = $13
            WHERE id = $1
            "#,
        )
        .bind(contract.id.as_uuid())
        .bind(&contract.title)
        .bind(&contract.description)
        .bind(&contract.counterparty)
        .bind(&contract.contract_type)
        .bind(&contract.department)
        .bind(contract.value.amount_cents)
        .bind(&contract.value.currency)
        .bind(contract.start_date)
        .bind(contract.end_date)
        .bind(contract.status.as_str())
        .bind(contract.workflow_id.map(|w| w.as_uuid()))
        .bind(contract.updated_at)
        .execute(&*self.pool)
        .await
        .map_err(|e| database_error("updating contract", e))?;

        if result.rows_affected() == 0 {
            return Err(ContractError::NotFound {
                id: contract.id.to_string(),
            });
        }
        Ok(())
    }

    async fn delete(&self, id: &ContractId) -> Result<(), ContractError> {
        let result = sqlx::query("DELETE FROM contracts WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&*self.pool)
            .await
            .map_err(|e| database_error("deleting contract", e))?;

        if result.rows_affected() == 0 {
            return Err(ContractError::NotFound { id: id.to_string() });
        }
        Ok(())
    }

    async fn append_history(&self, entry: &ContractHistoryEntry) -> Result<(), ContractError> {
        sqlx::query(
            r#"
            INSERT INTO contract_history (id, contract_id, action, from_status, to_status,
                actor_id, note, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(entry.id.as_uuid())
        .bind(entry.contract_id.as_uuid())
        .bind(entry.action.as_str())
        .bind(entry.from_status.map(|s| s.as_str()))
        .bind(entry.to_status.map(|s| s.as_str()))
        .bind(entry.actor_id.map(|a| a.as_uuid()))
        .bind(&entry.note)
        .bind(entry.created_at)
        .execute(&*self.pool)
        .await
        .map_err(|e| database_error("appending contract history", e))?;

        Ok(())
    }

    async fn list_history(
        &self,
        id: &ContractId,
    ) -> Result<Vec<ContractHistoryEntry>, ContractError> {
        let rows = sqlx::query_as::<_, HistoryRow>(
            r#"
            SELECT id, contract_id, action, from_status, to_status, actor_id, note, created_at
            FROM contract_history
            WHERE contract_id = $1
            ORDER BY created_at, id
            "#,
        )
        .bind(id.as_uuid())
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| database_error("listing contract history", e))?;

        rows.into_iter().map(row_to_history).collect()
    }

    async fn find_active_ending_between(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<Contract>, ContractError> {
        self.fetch_active("end_date BETWEEN $1 AND $2", from, Some(to))
            .await
    }

    async fn find_active_ended_before(
        &self,
        date: NaiveDate,
    ) -> Result<Vec<Contract>, ContractError> {
        self.fetch_active("end_date < $1", date, None).await
    }

    async fn count_with_workflow(
        &self,
        workflow_id: &WorkflowId,
        status: ContractStatus,
    ) -> Result<u64, ContractError> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM contracts WHERE workflow_id = $1 AND status = $2",
        )
        .bind(workflow_id.as_uuid())
        .bind(status.as_str())
        .fetch_one(&*self.pool)
        .await
        .map_err(|e| database_error("counting contracts by workflow", e))?;

        Ok(count.max(0) as u64)
    }

    async fn list_created_between(
        &self,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    ) -> Result<Vec<Contract>, ContractError> {
        let sql = format!(
            "SELECT {} FROM contracts \
             WHERE ($1::timestamptz IS NULL OR created_at >= $1) \
               AND ($2::timestamptz IS NULL OR created_at < $2) \
             ORDER BY created_at, id",
            CONTRACT_COLUMNS
        );
        let rows = sqlx::query_as::<_, ContractRow>(&sql)
            .bind(from)
            .bind(to)
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| database_error("listing contracts in window", e))?;
        rows_to_contracts(rows)
    }
}
