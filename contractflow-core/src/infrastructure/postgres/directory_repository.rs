//! SQLx implementation of the user directory and reference data

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::directory::{
    DirectoryError, IReferenceRepository, IUserRepository, Reference, ReferenceId, ReferenceType,
    User, UserId,
};

use super::violates;

const USER_COLUMNS: &str = "id, name, email, role, department, active, created_at";

#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: Uuid,
    name: String,
    email: String,
    role: String,
    department: Option<String>,
    active: bool,
    created_at: DateTime<Utc>,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        User {
            id: UserId::from(row.id),
            name: row.name,
            email: row.email,
            role: row.role,
            department: row.department,
            active: row.active,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct ReferenceRow {
    id: Uuid,
    ref_type: String,
    code: String,
    name: String,
    parent_id: Option<Uuid>,
    sort_order: i32,
    active: bool,
    created_at: DateTime<Utc>,
}

impl From<ReferenceRow> for Reference {
    fn from(row: ReferenceRow) -> Self {
        Reference {
            id: ReferenceId::from(row.id),
            ref_type: ReferenceType::from(row.ref_type),
            code: row.code,
            name: row.name,
            parent_id: row.parent_id.map(ReferenceId::from),
            sort_order: row.sort_order,
            active: row.active,
            created_at: row.created_at,
        }
    }
}

fn database_error(context: &str, e: sqlx::Error) -> DirectoryError {
    tracing::error!("Database error {}: {}", context, e);
    DirectoryError::DatabaseError {
        message: e.to_string(),
    }
}

/// SQLx implementation of the user directory
pub struct SqlxUserRepository {
    pool: Arc<PgPool>,
}

impl SqlxUserRepository {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }

    async fn fetch_users(&self, sql: &str, bind: Option<&str>) -> Result<Vec<User>, DirectoryError> {
        let mut query = sqlx::query_as::<_, UserRow>(sql);
        if let Some(value) = bind {
            query = query.bind(value);
        }
        let rows = query
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| database_error("listing users", e))?;
        Ok(rows.into_iter().map(User::from).collect())
    }
}

#[async_trait]
impl IUserRepository for SqlxUserRepository {
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, DirectoryError> {
        let sql = format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS);
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(id.as_uuid())
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| database_error("finding user by id", e))?;
        Ok(row.map(User::from))
    }

    async fn find_by_role(&self, role: &str) -> Result<Vec<User>, DirectoryError> {
        let sql = format!(
            "SELECT {} FROM users WHERE active AND LOWER(role) = LOWER($1) ORDER BY name, id",
            USER_COLUMNS
        );
        self.fetch_users(&sql, Some(role)).await
    }

    async fn find_by_department(&self, department: &str) -> Result<Vec<User>, DirectoryError> {
        let sql = format!(
            "SELECT {} FROM users WHERE active AND LOWER(department) = LOWER($1) ORDER BY name, id",
            USER_COLUMNS
        );
        self.fetch_users(&sql, Some(department)).await
    }

    async fn list_active(&self) -> Result<Vec<User>, DirectoryError> {
        let sql = format!(
            "SELECT {} FROM users WHERE active ORDER BY name, id",
            USER_COLUMNS
        );
        self.fetch_users(&sql, None).await
    }

    async fn create(&self, user: &User) -> Result<(), DirectoryError> {
        sqlx::query(
            r#"
            INSERT INTO users (id, name, email, role, department, active, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(user.id.as_uuid())
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.role)
        .bind(&user.department)
        .bind(user.active)
        .bind(user.created_at)
        .execute(&*self.pool)
        .await
        .map_err(|e| {
            if violates(&e, "idx_users_email") {
                return DirectoryError::EmailAlreadyExists {
                    email: user.email.clone(),
                };
            }
            database_error("creating user", e)
        })?;

        Ok(())
    }
}

/// SQLx implementation of reference data
pub struct SqlxReferenceRepository {
    pool: Arc<PgPool>,
}

impl SqlxReferenceRepository {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl IReferenceRepository for SqlxReferenceRepository {
    async fn find_by_type(
        &self,
        ref_type: &ReferenceType,
    ) -> Result<Vec<Reference>, DirectoryError> {
        let rows = sqlx::query_as::<_, ReferenceRow>(
            r#"
            SELECT id, ref_type, code, name, parent_id, sort_order, active, created_at
            FROM reference_data
            WHERE ref_type = $1 AND active
            ORDER BY sort_order, name
            "#,
        )
        .bind(ref_type.as_str())
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| database_error("listing references", e))?;

        Ok(rows.into_iter().map(Reference::from).collect())
    }

    async fn create(&self, reference: &Reference) -> Result<(), DirectoryError> {
        sqlx::query(
            r#"
            INSERT INTO reference_data (id, ref_type, code, name, parent_id, sort_order, active, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(reference.id.as_uuid())
        .bind(reference.ref_type.as_str())
        .bind(&reference.code)
        .bind(&reference.name)
        .bind(reference.parent_id.map(|p| p.as_uuid()))
        .bind(reference.sort_order)
        .bind(reference.active)
        .bind(reference.created_at)
        .execute(&*self.pool)
        .await
        .map_err(|e| {
            if violates(&e, "idx_reference_data_type_code") {
                return DirectoryError::ReferenceAlreadyExists {
                    ref_type: reference.ref_type.to_string(),
                    code: reference.code.clone(),
                };
            }
            database_error("creating reference", e)
        })?;

        Ok(())
    }
}
