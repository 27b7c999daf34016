use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::{PgConnection, PgPool, PgPoolOptions};
use tracing::info;

use super::{PortalStore, StoreError};
use crate::config::DatabaseConfig;
use crate::lifecycle::{
    Complaint, ComplaintId, NewComplaint, NewWorker, User, Worker, WorkerAction, WorkerStatus,
};

const SCHEMA: &str = include_str!("schema.sql");

const SELECT_COMPLAINT: &str = "SELECT id, username, category, location, landmark, urgency, \
     description, assigned_worker, status, worker_status, worker_completed, created_at \
     FROM complaint";

const SELECT_WORKER: &str = "SELECT id, username, password, name, available FROM workers";

/// Raw `complaint` row; status columns are stored as text labels.
#[derive(Debug, sqlx::FromRow)]
struct ComplaintRow {
    id: i32,
    username: String,
    category: String,
    location: String,
    landmark: Option<String>,
    urgency: String,
    description: Option<String>,
    assigned_worker: Option<String>,
    status: String,
    worker_status: Option<String>,
    worker_completed: bool,
    created_at: DateTime<Utc>,
}

impl TryFrom<ComplaintRow> for Complaint {
    type Error = StoreError;

    fn try_from(row: ComplaintRow) -> Result<Self, Self::Error> {
        Ok(Complaint {
            id: ComplaintId(row.id),
            username: row.username,
            category: row.category,
            location: row.location,
            landmark: row.landmark,
            urgency: row.urgency,
            description: row.description,
            assigned_worker: row.assigned_worker,
            status: row.status.parse()?,
            worker_status: row
                .worker_status
                .as_deref()
                .map(str::parse::<WorkerStatus>)
                .transpose()?,
            worker_completed: row.worker_completed,
            created_at: row.created_at,
        })
    }
}

fn into_complaints(rows: Vec<ComplaintRow>) -> Result<Vec<Complaint>, StoreError> {
    rows.into_iter().map(Complaint::try_from).collect()
}

/// PostgreSQL-backed store over the `users`, `workers`, and `complaint` tables.
#[derive(Clone)]
pub struct PgPortalStore {
    pool: PgPool,
}

impl PgPortalStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn connect(url: &str, config: &DatabaseConfig) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .connect(url)
            .await?;
        Ok(Self::new(pool))
    }

    /// Creates missing tables. Safe to run repeatedly.
    pub async fn migrate(&self) -> Result<(), StoreError> {
        sqlx::raw_sql(SCHEMA).execute(&self.pool).await?;
        info!("database schema ensured");
        Ok(())
    }

    async fn complaints_where(
        &self,
        clause: &str,
        bind: Option<&str>,
    ) -> Result<Vec<Complaint>, StoreError> {
        let sql = format!("{SELECT_COMPLAINT} {clause} ORDER BY id DESC");
        let mut query = sqlx::query_as::<_, ComplaintRow>(&sql);
        if let Some(value) = bind {
            query = query.bind(value);
        }
        let rows = query.fetch_all(&self.pool).await?;
        into_complaints(rows)
    }
}

async fn lock_complaint(
    conn: &mut PgConnection,
    id: ComplaintId,
) -> Result<Complaint, StoreError> {
    let sql = format!("{SELECT_COMPLAINT} WHERE id = $1 FOR UPDATE");
    let row = sqlx::query_as::<_, ComplaintRow>(&sql)
        .bind(id.0)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or(StoreError::ComplaintNotFound(id))?;
    Complaint::try_from(row)
}

async fn lock_worker(conn: &mut PgConnection, identity: &str) -> Result<Worker, StoreError> {
    let sql = format!(
        "{SELECT_WORKER} WHERE username = $1 OR name = $1 \
         ORDER BY (username = $1) DESC, id LIMIT 1 FOR UPDATE"
    );
    sqlx::query_as::<_, Worker>(&sql)
        .bind(identity)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or_else(|| StoreError::WorkerNotFound(identity.to_string()))
}

async fn save_complaint(conn: &mut PgConnection, complaint: &Complaint) -> Result<(), StoreError> {
    sqlx::query(
        "UPDATE complaint SET assigned_worker = $1, status = $2, worker_status = $3, \
         worker_completed = $4 WHERE id = $5",
    )
    .bind(complaint.assigned_worker.as_deref())
    .bind(complaint.status.label())
    .bind(complaint.worker_status.map(WorkerStatus::label))
    .bind(complaint.worker_completed)
    .bind(complaint.id.0)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

async fn save_availability(
    conn: &mut PgConnection,
    worker: &Worker,
) -> Result<(), StoreError> {
    sqlx::query("UPDATE workers SET available = $1 WHERE id = $2")
        .bind(worker.available)
        .bind(worker.id)
        .execute(&mut *conn)
        .await?;
    Ok(())
}

fn map_unique_violation(err: sqlx::Error, username: &str) -> StoreError {
    match err {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            StoreError::DuplicateUsername(username.to_string())
        }
        other => StoreError::Database(other),
    }
}

#[async_trait]
impl PortalStore for PgPortalStore {
    async fn create_user(&self, username: &str, password: &str) -> Result<User, StoreError> {
        sqlx::query_as::<_, User>(
            "INSERT INTO users (username, password) VALUES ($1, $2) \
             RETURNING id, username, password",
        )
        .bind(username)
        .bind(password)
        .fetch_one(&self.pool)
        .await
        .map_err(|err| map_unique_violation(err, username))
    }

    async fn find_user(&self, username: &str) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, username, password FROM users WHERE username = $1",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn create_worker(&self, worker: NewWorker) -> Result<Worker, StoreError> {
        sqlx::query_as::<_, Worker>(
            "INSERT INTO workers (username, password, name, available) VALUES ($1, $2, $3, TRUE) \
             RETURNING id, username, password, name, available",
        )
        .bind(&worker.username)
        .bind(&worker.password)
        .bind(&worker.name)
        .fetch_one(&self.pool)
        .await
        .map_err(|err| map_unique_violation(err, &worker.username))
    }

    async fn find_worker(&self, identity: &str) -> Result<Option<Worker>, StoreError> {
        let sql = format!(
            "{SELECT_WORKER} WHERE username = $1 OR name = $1 \
             ORDER BY (username = $1) DESC, id LIMIT 1"
        );
        let worker = sqlx::query_as::<_, Worker>(&sql)
            .bind(identity)
            .fetch_optional(&self.pool)
            .await?;
        Ok(worker)
    }

    async fn list_workers(&self) -> Result<Vec<Worker>, StoreError> {
        let sql = format!("{SELECT_WORKER} ORDER BY id");
        let workers = sqlx::query_as::<_, Worker>(&sql)
            .fetch_all(&self.pool)
            .await?;
        Ok(workers)
    }

    async fn set_worker_availability(
        &self,
        identity: &str,
        available: bool,
    ) -> Result<Worker, StoreError> {
        let mut tx = self.pool.begin().await?;
        let mut worker = lock_worker(&mut tx, identity).await?;
        worker.available = available;
        save_availability(&mut tx, &worker).await?;
        tx.commit().await?;
        Ok(worker)
    }

    async fn create_complaint(&self, complaint: NewComplaint) -> Result<Complaint, StoreError> {
        let row = sqlx::query_as::<_, ComplaintRow>(
            "INSERT INTO complaint (username, category, location, landmark, urgency, description) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING id, username, category, location, landmark, urgency, description, \
             assigned_worker, status, worker_status, worker_completed, created_at",
        )
        .bind(&complaint.username)
        .bind(&complaint.category)
        .bind(&complaint.location)
        .bind(complaint.landmark.as_deref())
        .bind(&complaint.urgency)
        .bind(complaint.description.as_deref())
        .fetch_one(&self.pool)
        .await?;
        Complaint::try_from(row)
    }

    async fn find_complaint(&self, id: ComplaintId) -> Result<Option<Complaint>, StoreError> {
        let sql = format!("{SELECT_COMPLAINT} WHERE id = $1");
        let row = sqlx::query_as::<_, ComplaintRow>(&sql)
            .bind(id.0)
            .fetch_optional(&self.pool)
            .await?;
        row.map(Complaint::try_from).transpose()
    }

    async fn list_complaints(&self) -> Result<Vec<Complaint>, StoreError> {
        self.complaints_where("", None).await
    }

    async fn assigned_complaints(&self) -> Result<Vec<Complaint>, StoreError> {
        self.complaints_where("WHERE assigned_worker IS NOT NULL", None)
            .await
    }

    async fn complaints_for_worker(
        &self,
        worker_name: &str,
    ) -> Result<Vec<Complaint>, StoreError> {
        self.complaints_where("WHERE assigned_worker = $1", Some(worker_name))
            .await
    }

    async fn assign(&self, id: ComplaintId, worker: &str) -> Result<Complaint, StoreError> {
        let mut tx = self.pool.begin().await?;
        let mut complaint = lock_complaint(&mut tx, id).await?;
        let mut worker = lock_worker(&mut tx, worker).await?;

        complaint.assign_to(&mut worker)?;

        save_complaint(&mut tx, &complaint).await?;
        save_availability(&mut tx, &worker).await?;
        tx.commit().await?;
        Ok(complaint)
    }

    async fn record_action(
        &self,
        id: ComplaintId,
        action: WorkerAction,
        actor: Option<&str>,
    ) -> Result<Complaint, StoreError> {
        let mut tx = self.pool.begin().await?;
        let mut complaint = lock_complaint(&mut tx, id).await?;
        if let Some(actor) = actor {
            let worker = lock_worker(&mut tx, actor).await?;
            complaint.ensure_assignee(&worker)?;
        }

        let next = complaint.apply(action)?;
        save_complaint(&mut tx, &complaint).await?;

        if next == WorkerStatus::Rejected {
            if let Some(name) = complaint.assigned_worker.as_deref() {
                let busy = sqlx::query_scalar::<_, bool>(
                    "SELECT EXISTS (SELECT 1 FROM complaint WHERE assigned_worker = $1 \
                     AND status <> 'Successful' \
                     AND worker_status IS DISTINCT FROM 'Rejected')",
                )
                .bind(name)
                .fetch_one(&mut *tx)
                .await?;
                if !busy {
                    sqlx::query("UPDATE workers SET available = TRUE WHERE name = $1")
                        .bind(name)
                        .execute(&mut *tx)
                        .await?;
                }
            }
        }

        tx.commit().await?;
        Ok(complaint)
    }

    async fn mark_successful(&self, id: ComplaintId) -> Result<Complaint, StoreError> {
        let mut tx = self.pool.begin().await?;
        let mut complaint = lock_complaint(&mut tx, id).await?;
        complaint.mark_successful()?;
        save_complaint(&mut tx, &complaint).await?;
        tx.commit().await?;
        Ok(complaint)
    }
}
