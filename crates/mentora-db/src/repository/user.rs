//! SurrealDB implementation of [`UserRepository`].
//!
//! Availability slots are stored in their textual form
//! (`Mon 09:00-11:00`) and parsed back on read.

use chrono::{DateTime, Utc};
use mentora_core::error::MentoraResult;
use mentora_core::models::availability::AvailabilitySlot;
use mentora_core::models::user::{CreateUser, UpdateUser, User, UserRole, UserStatus};
use mentora_core::repository::{PaginatedResult, Pagination, UserFilter, UserRepository};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use super::CountRow;
use crate::error::DbError;

/// DB-side row struct for queries where the UUID is already known.
#[derive(Debug, SurrealValue)]
struct UserRow {
    name: String,
    email: String,
    role: String,
    status: String,
    expertise: Vec<String>,
    interests: Vec<String>,
    goals: Vec<String>,
    availability: Vec<String>,
    program: Option<String>,
    priority: bool,
    capacity: u32,
    active_mentee_count: u32,
    approved_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// DB-side row struct that includes the record ID via `meta::id(id)`.
#[derive(Debug, SurrealValue)]
struct UserRowWithId {
    record_id: String,
    name: String,
    email: String,
    role: String,
    status: String,
    expertise: Vec<String>,
    interests: Vec<String>,
    goals: Vec<String>,
    availability: Vec<String>,
    program: Option<String>,
    priority: bool,
    capacity: u32,
    active_mentee_count: u32,
    approved_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

fn parse_role(s: &str) -> Result<UserRole, DbError> {
    UserRole::parse(s).ok_or_else(|| DbError::Decode(format!("unknown user role: {s}")))
}

fn parse_status(s: &str) -> Result<UserStatus, DbError> {
    UserStatus::parse(s).ok_or_else(|| DbError::Decode(format!("unknown user status: {s}")))
}

fn parse_slots(raw: Vec<String>) -> Result<Vec<AvailabilitySlot>, DbError> {
    raw.iter()
        .map(|s| {
            s.parse::<AvailabilitySlot>()
                .map_err(|e| DbError::Decode(e.to_string()))
        })
        .collect()
}

fn format_slots(slots: &[AvailabilitySlot]) -> Vec<String> {
    slots.iter().map(ToString::to_string).collect()
}

impl UserRow {
    fn into_user(self, id: Uuid) -> Result<User, DbError> {
        Ok(User {
            id,
            name: self.name,
            email: self.email,
            role: parse_role(&self.role)?,
            status: parse_status(&self.status)?,
            expertise: self.expertise,
            interests: self.interests,
            goals: self.goals,
            availability: parse_slots(self.availability)?,
            program: self.program,
            priority: self.priority,
            capacity: self.capacity,
            active_mentee_count: self.active_mentee_count,
            approved_at: self.approved_at,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

impl UserRowWithId {
    fn try_into_user(self) -> Result<User, DbError> {
        let id = Uuid::parse_str(&self.record_id)
            .map_err(|e| DbError::Decode(format!("invalid UUID: {e}")))?;
        UserRow {
            name: self.name,
            email: self.email,
            role: self.role,
            status: self.status,
            expertise: self.expertise,
            interests: self.interests,
            goals: self.goals,
            availability: self.availability,
            program: self.program,
            priority: self.priority,
            capacity: self.capacity,
            active_mentee_count: self.active_mentee_count,
            approved_at: self.approved_at,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
        .into_user(id)
    }
}

/// SurrealDB implementation of the User repository.
#[derive(Clone)]
pub struct SurrealUserRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealUserRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> UserRepository for SurrealUserRepository<C> {
    async fn create(&self, input: CreateUser) -> MentoraResult<User> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();

        // Capacity only means something for mentors.
        let capacity = match input.role {
            UserRole::Mentor => input.capacity,
            _ => 0,
        };

        let result = self
            .db
            .query(
                "CREATE type::record('user', $id) SET \
                 name = $name, email = $email, \
                 role = $role, status = 'pending', \
                 expertise = $expertise, interests = $interests, \
                 goals = $goals, availability = $availability, \
                 program = $program, priority = $priority, \
                 capacity = $capacity, active_mentee_count = 0, \
                 approved_at = NONE",
            )
            .bind(("id", id_str.clone()))
            .bind(("name", input.name))
            .bind(("email", input.email))
            .bind(("role", input.role.as_str().to_string()))
            .bind(("expertise", input.expertise))
            .bind(("interests", input.interests))
            .bind(("goals", input.goals))
            .bind(("availability", format_slots(&input.availability)))
            .bind(("program", input.program))
            .bind(("priority", input.priority))
            .bind(("capacity", capacity))
            .await
            .map_err(DbError::from)?;

        let mut result = result.check().map_err(|e| DbError::Query(e.to_string()))?;

        let rows: Vec<UserRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "user".into(),
            id: id_str,
        })?;

        Ok(row.into_user(id)?)
    }

    async fn get_by_id(&self, id: Uuid) -> MentoraResult<User> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query("SELECT * FROM type::record('user', $id)")
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<UserRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "user".into(),
            id: id_str,
        })?;

        Ok(row.into_user(id)?)
    }

    async fn update(&self, id: Uuid, input: UpdateUser) -> MentoraResult<User> {
        let id_str = id.to_string();

        let mut sets = Vec::new();
        if input.name.is_some() {
            sets.push("name = $name");
        }
        if input.email.is_some() {
            sets.push("email = $email");
        }
        if let Some(status) = input.status {
            sets.push("status = $status");
            if status == UserStatus::Approved {
                sets.push("approved_at = approved_at ?? time::now()");
            }
        }
        if input.expertise.is_some() {
            sets.push("expertise = $expertise");
        }
        if input.interests.is_some() {
            sets.push("interests = $interests");
        }
        if input.goals.is_some() {
            sets.push("goals = $goals");
        }
        if input.availability.is_some() {
            sets.push("availability = $availability");
        }
        if input.program.is_some() {
            sets.push("program = $program");
        }
        if input.priority.is_some() {
            sets.push("priority = $priority");
        }
        if input.capacity.is_some() {
            sets.push("capacity = $capacity");
        }
        sets.push("updated_at = time::now()");

        let query = format!(
            "UPDATE type::record('user', $id) SET {}",
            sets.join(", ")
        );

        let mut builder = self.db.query(&query).bind(("id", id_str.clone()));

        if let Some(name) = input.name {
            builder = builder.bind(("name", name));
        }
        if let Some(email) = input.email {
            builder = builder.bind(("email", email));
        }
        if let Some(status) = input.status {
            builder = builder.bind(("status", status.as_str().to_string()));
        }
        if let Some(expertise) = input.expertise {
            builder = builder.bind(("expertise", expertise));
        }
        if let Some(interests) = input.interests {
            builder = builder.bind(("interests", interests));
        }
        if let Some(goals) = input.goals {
            builder = builder.bind(("goals", goals));
        }
        if let Some(availability) = input.availability {
            builder = builder.bind(("availability", format_slots(&availability)));
        }
        if let Some(program) = input.program {
            // program is Option<Option<String>>: Some(Some(v)) = set, Some(None) = clear
            builder = builder.bind(("program", program));
        }
        if let Some(priority) = input.priority {
            builder = builder.bind(("priority", priority));
        }
        if let Some(capacity) = input.capacity {
            builder = builder.bind(("capacity", capacity));
        }

        let result = builder.await.map_err(DbError::from)?;
        let mut result = result.check().map_err(|e| DbError::Query(e.to_string()))?;

        let rows: Vec<UserRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "user".into(),
            id: id_str,
        })?;

        Ok(row.into_user(id)?)
    }

    async fn delete(&self, id: Uuid) -> MentoraResult<()> {
        // Soft-delete: set status to inactive.
        self.db
            .query(
                "UPDATE type::record('user', $id) SET \
                 status = 'inactive', updated_at = time::now()",
            )
            .bind(("id", id.to_string()))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(|e| DbError::Query(e.to_string()))?;

        Ok(())
    }

    async fn list(
        &self,
        filter: UserFilter,
        pagination: Pagination,
    ) -> MentoraResult<PaginatedResult<User>> {
        let mut conditions = Vec::new();
        if filter.role.is_some() {
            conditions.push("role = $role");
        }
        if filter.status.is_some() {
            conditions.push("status = $status");
        }
        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };

        let role = filter.role.map(|r| r.as_str().to_string());
        let status = filter.status.map(|s| s.as_str().to_string());

        let mut count_result = self
            .db
            .query(format!(
                "SELECT count() AS total FROM user {where_clause} GROUP ALL"
            ))
            .bind(("role", role.clone()))
            .bind(("status", status.clone()))
            .await
            .map_err(DbError::from)?;
        let count_rows: Vec<CountRow> = count_result.take(0).map_err(DbError::from)?;
        let total = count_rows.first().map(|r| r.total).unwrap_or(0);

        let mut result = self
            .db
            .query(format!(
                "SELECT meta::id(id) AS record_id, * FROM user {where_clause} \
                 ORDER BY created_at ASC, record_id ASC \
                 LIMIT $limit START $offset"
            ))
            .bind(("role", role))
            .bind(("status", status))
            .bind(("limit", pagination.limit))
            .bind(("offset", pagination.offset))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<UserRowWithId> = result.take(0).map_err(DbError::from)?;

        let items = rows
            .into_iter()
            .map(|row| row.try_into_user())
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(PaginatedResult {
            items,
            total,
            offset: pagination.offset,
            limit: pagination.limit,
        })
    }
}
