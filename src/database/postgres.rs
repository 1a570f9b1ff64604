use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::{FromRow, PgPool};
use tracing::info;
use uuid::Uuid;

use crate::config::DatabaseConfig;
use super::manager::DatabaseManager;
use super::models::{Cat, CatUpdate, GeoPoint, NewCat, NewUserRecord, User, UserChanges};
use super::store::{CatFilter, Store, StoreError};

const MIGRATIONS: &[&str] = &[
    "CREATE EXTENSION IF NOT EXISTS postgis",
    r#"
    CREATE TABLE IF NOT EXISTS users (
        id UUID PRIMARY KEY,
        user_name TEXT NOT NULL,
        email TEXT NOT NULL UNIQUE,
        role TEXT NOT NULL DEFAULT 'user' CHECK (role IN ('user', 'admin')),
        password TEXT NOT NULL,
        created_at TIMESTAMPTZ NOT NULL DEFAULT now()
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS cats (
        id UUID PRIMARY KEY,
        cat_name TEXT NOT NULL,
        weight DOUBLE PRECISION NOT NULL,
        filename TEXT NOT NULL,
        birthdate DATE NOT NULL,
        location_lng DOUBLE PRECISION NOT NULL,
        location_lat DOUBLE PRECISION NOT NULL,
        owner UUID NOT NULL REFERENCES users (id) ON DELETE CASCADE,
        created_at TIMESTAMPTZ NOT NULL DEFAULT now()
    )
    "#,
    "CREATE INDEX IF NOT EXISTS cats_owner_idx ON cats (owner)",
    r#"
    CREATE INDEX IF NOT EXISTS cats_location_idx ON cats
        USING GIST (ST_SetSRID(ST_MakePoint(location_lng, location_lat), 4326))
    "#,
];

const USER_COLUMNS: &str = "id, user_name, email, role, password";
const CAT_COLUMNS: &str =
    "id, cat_name, weight, filename, birthdate, location_lng, location_lat, owner";

#[derive(FromRow)]
struct UserRow {
    id: Uuid,
    user_name: String,
    email: String,
    role: String,
    password: String,
}

impl TryFrom<UserRow> for User {
    type Error = StoreError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let role = row
            .role
            .parse()
            .map_err(|e: super::models::UnknownRole| StoreError::Corrupt(e.to_string()))?;
        Ok(User {
            id: row.id,
            user_name: row.user_name,
            email: row.email,
            role,
            password_hash: row.password,
        })
    }
}

#[derive(FromRow)]
struct CatRow {
    id: Uuid,
    cat_name: String,
    weight: f64,
    filename: String,
    birthdate: NaiveDate,
    location_lng: f64,
    location_lat: f64,
    owner: Uuid,
}

impl From<CatRow> for Cat {
    fn from(row: CatRow) -> Self {
        Cat {
            id: row.id,
            cat_name: row.cat_name,
            weight: row.weight,
            filename: row.filename,
            birthdate: row.birthdate,
            location: GeoPoint::new(row.location_lng, row.location_lat),
            owner: row.owner,
        }
    }
}

/// Maps constraint violations onto `Conflict`, everything else passes through
fn map_write_error(err: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(db) = &err {
        if db.is_unique_violation() {
            return StoreError::Conflict("email already in use".to_string());
        }
        if db.is_foreign_key_violation() {
            return StoreError::Conflict("owner does not exist".to_string());
        }
    }
    StoreError::Sqlx(err)
}

fn users_from_rows(rows: Vec<UserRow>) -> Result<Vec<User>, StoreError> {
    rows.into_iter().map(User::try_from).collect()
}

/// PostGIS backed store
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn connect(config: &DatabaseConfig) -> Result<Self, StoreError> {
        let pool = DatabaseManager::connect(config).await?;
        Ok(Self::new(pool))
    }

    /// Creates the tables and indexes if they do not exist yet
    pub async fn migrate(&self) -> Result<(), StoreError> {
        for statement in MIGRATIONS {
            sqlx::query(*statement).execute(&self.pool).await?;
        }
        info!("Database schema is up to date");
        Ok(())
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}

#[async_trait]
impl Store for PgStore {
    async fn health_check(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn insert_user(&self, user: NewUserRecord) -> Result<User, StoreError> {
        let sql = format!(
            "INSERT INTO users ({USER_COLUMNS}) VALUES ($1, $2, $3, $4, $5) RETURNING {USER_COLUMNS}"
        );
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(Uuid::new_v4())
            .bind(&user.user_name)
            .bind(&user.email)
            .bind(user.role.as_str())
            .bind(&user.password_hash)
            .fetch_one(&self.pool)
            .await
            .map_err(map_write_error)?;
        row.try_into()
    }

    async fn find_user(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(User::try_from).transpose()
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1");
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        row.map(User::try_from).transpose()
    }

    async fn find_users(&self, ids: &[Uuid]) -> Result<Vec<User>, StoreError> {
        if ids.is_empty() {
            return Ok(vec![]);
        }
        let sql = format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = ANY($1) ORDER BY created_at, id"
        );
        let rows = sqlx::query_as::<_, UserRow>(&sql)
            .bind(ids.to_vec())
            .fetch_all(&self.pool)
            .await?;
        users_from_rows(rows)
    }

    async fn list_users(&self) -> Result<Vec<User>, StoreError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users ORDER BY created_at, id");
        let rows = sqlx::query_as::<_, UserRow>(&sql)
            .fetch_all(&self.pool)
            .await?;
        users_from_rows(rows)
    }

    async fn update_user(&self, id: Uuid, changes: UserChanges) -> Result<Option<User>, StoreError> {
        let sql = format!(
            "UPDATE users SET \
                user_name = COALESCE($2, user_name), \
                email = COALESCE($3, email), \
                password = COALESCE($4, password), \
                role = COALESCE($5, role) \
             WHERE id = $1 RETURNING {USER_COLUMNS}"
        );
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(id)
            .bind(changes.user_name)
            .bind(changes.email)
            .bind(changes.password_hash)
            .bind(changes.role.map(|r| r.as_str()))
            .fetch_optional(&self.pool)
            .await
            .map_err(map_write_error)?;
        row.map(User::try_from).transpose()
    }

    async fn delete_user(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        let sql = format!("DELETE FROM users WHERE id = $1 RETURNING {USER_COLUMNS}");
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(User::try_from).transpose()
    }

    async fn insert_cat(&self, owner: Uuid, cat: NewCat) -> Result<Cat, StoreError> {
        let sql = format!(
            "INSERT INTO cats ({CAT_COLUMNS}) VALUES ($1, $2, $3, $4, $5, $6, $7, $8) RETURNING {CAT_COLUMNS}"
        );
        let row = sqlx::query_as::<_, CatRow>(&sql)
            .bind(Uuid::new_v4())
            .bind(&cat.cat_name)
            .bind(cat.weight)
            .bind(&cat.filename)
            .bind(cat.birthdate)
            .bind(cat.location.lng())
            .bind(cat.location.lat())
            .bind(owner)
            .fetch_one(&self.pool)
            .await
            .map_err(map_write_error)?;
        Ok(row.into())
    }

    async fn find_cat(&self, id: Uuid) -> Result<Option<Cat>, StoreError> {
        let sql = format!("SELECT {CAT_COLUMNS} FROM cats WHERE id = $1");
        let row = sqlx::query_as::<_, CatRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Cat::from))
    }

    async fn find_cats(&self, filter: &CatFilter) -> Result<Vec<Cat>, StoreError> {
        let rows = match filter {
            CatFilter::All => {
                let sql = format!("SELECT {CAT_COLUMNS} FROM cats ORDER BY created_at, id");
                sqlx::query_as::<_, CatRow>(&sql).fetch_all(&self.pool).await?
            }
            CatFilter::Owner(owner) => {
                let sql = format!(
                    "SELECT {CAT_COLUMNS} FROM cats WHERE owner = $1 ORDER BY created_at, id"
                );
                sqlx::query_as::<_, CatRow>(&sql)
                    .bind(owner)
                    .fetch_all(&self.pool)
                    .await?
            }
            CatFilter::Within(region) => {
                let geojson = serde_json::to_string(region)
                    .map_err(|e| StoreError::Corrupt(format!("region: {}", e)))?;
                // ST_Covers keeps points on the edge, matching MemoryStore
                let sql = format!(
                    "SELECT {CAT_COLUMNS} FROM cats \
                     WHERE ST_Covers( \
                        ST_SetSRID(ST_GeomFromGeoJSON($1), 4326), \
                        ST_SetSRID(ST_MakePoint(location_lng, location_lat), 4326)) \
                     ORDER BY created_at, id"
                );
                sqlx::query_as::<_, CatRow>(&sql)
                    .bind(geojson)
                    .fetch_all(&self.pool)
                    .await?
            }
        };
        Ok(rows.into_iter().map(Cat::from).collect())
    }

    async fn update_cat(&self, id: Uuid, changes: CatUpdate) -> Result<Option<Cat>, StoreError> {
        let sql = format!(
            "UPDATE cats SET \
                cat_name = COALESCE($2, cat_name), \
                weight = COALESCE($3, weight), \
                filename = COALESCE($4, filename), \
                birthdate = COALESCE($5, birthdate), \
                location_lng = COALESCE($6, location_lng), \
                location_lat = COALESCE($7, location_lat), \
                owner = COALESCE($8, owner) \
             WHERE id = $1 RETURNING {CAT_COLUMNS}"
        );
        let row = sqlx::query_as::<_, CatRow>(&sql)
            .bind(id)
            .bind(changes.cat_name)
            .bind(changes.weight)
            .bind(changes.filename)
            .bind(changes.birthdate)
            .bind(changes.location.map(|p| p.lng()))
            .bind(changes.location.map(|p| p.lat()))
            .bind(changes.owner)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_write_error)?;
        Ok(row.map(Cat::from))
    }

    async fn delete_cat(&self, id: Uuid) -> Result<Option<Cat>, StoreError> {
        let sql = format!("DELETE FROM cats WHERE id = $1 RETURNING {CAT_COLUMNS}");
        let row = sqlx::query_as::<_, CatRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Cat::from))
    }
}
