use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{PgPool, Row, postgres::PgRow};
use uuid::Uuid;

use crate::{
    PlantId, PurchaseId, Result, StoreError,
    record::{Customer, Plant, PlantUpdate, Purchase, PurchaseDetails, Role, Seller, User},
    store::{PlantStore, PurchaseStore, Upsert, UserStore, checked_quantity},
};

const PLANT_COLUMNS: &str = "id, name, description, category, price, quantity, image, seller_name, seller_image, seller_email";

/// PostgreSQL-backed store implementation.
#[derive(Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Creates a new PostgreSQL store.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Gets a reference to the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Runs the database migrations.
    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("../../migrations").run(&self.pool).await?;
        tracing::info!("database migrations applied");
        Ok(())
    }

    fn row_to_plant(row: PgRow) -> Result<Plant> {
        Ok(Plant {
            id: PlantId::from_uuid(row.try_get::<Uuid, _>("id")?),
            name: row.try_get("name")?,
            description: row.try_get("description")?,
            category: row.try_get("category")?,
            price: row.try_get::<Decimal, _>("price")?,
            quantity: quantity_from_row(row.try_get("quantity")?)?,
            image: row.try_get("image")?,
            seller: Seller {
                name: row.try_get("seller_name")?,
                image: row.try_get("seller_image")?,
                email: row.try_get("seller_email")?,
            },
        })
    }

    fn row_to_purchase(row: &PgRow) -> Result<Purchase> {
        Ok(Purchase {
            id: PurchaseId::from_uuid(row.try_get::<Uuid, _>("id")?),
            plant_id: PlantId::from_uuid(row.try_get::<Uuid, _>("plant_id")?),
            customer: Customer {
                name: row.try_get("customer_name")?,
                email: row.try_get("customer_email")?,
                image: row.try_get("customer_image")?,
            },
            quantity: quantity_from_row(row.try_get("quantity")?)?,
            price: row.try_get::<Decimal, _>("price")?,
            address: row.try_get("address")?,
            created_at: row.try_get::<DateTime<Utc>, _>("created_at")?,
        })
    }

    fn row_to_user(row: PgRow) -> Result<User> {
        let role: String = row.try_get("role")?;
        Ok(User {
            email: row.try_get("email")?,
            name: row.try_get("name")?,
            image: row.try_get("image")?,
            role: role.parse::<Role>().map_err(StoreError::InvalidRecord)?,
            created_at: row.try_get("created_at")?,
        })
    }
}

fn quantity_from_row(value: i64) -> Result<u32> {
    u32::try_from(value).map_err(|_| StoreError::InvalidRecord(format!("quantity {value}")))
}

#[async_trait]
impl PlantStore for PostgresStore {
    async fn insert_plant(&self, plant: Plant) -> Result<PlantId> {
        sqlx::query(
            r#"
            INSERT INTO plants (id, name, description, category, price, quantity, image, seller_name, seller_image, seller_email)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(plant.id.as_uuid())
        .bind(&plant.name)
        .bind(&plant.description)
        .bind(&plant.category)
        .bind(plant.price)
        .bind(i64::from(plant.quantity))
        .bind(&plant.image)
        .bind(&plant.seller.name)
        .bind(&plant.seller.image)
        .bind(&plant.seller.email)
        .execute(&self.pool)
        .await?;

        Ok(plant.id)
    }

    async fn list_plants(&self, limit: usize) -> Result<Vec<Plant>> {
        let rows = sqlx::query(&format!(
            "SELECT {PLANT_COLUMNS} FROM plants ORDER BY seq ASC LIMIT $1"
        ))
        .bind(i64::try_from(limit).unwrap_or(i64::MAX))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Self::row_to_plant).collect()
    }

    async fn list_plants_by_seller(&self, seller_email: &str) -> Result<Vec<Plant>> {
        let rows = sqlx::query(&format!(
            "SELECT {PLANT_COLUMNS} FROM plants WHERE seller_email = $1 ORDER BY seq ASC"
        ))
        .bind(seller_email)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Self::row_to_plant).collect()
    }

    async fn get_plant(&self, id: PlantId) -> Result<Option<Plant>> {
        let row: Option<PgRow> =
            sqlx::query(&format!("SELECT {PLANT_COLUMNS} FROM plants WHERE id = $1"))
                .bind(id.as_uuid())
                .fetch_optional(&self.pool)
                .await?;

        row.map(Self::row_to_plant).transpose()
    }

    async fn update_plant(&self, id: PlantId, update: PlantUpdate) -> Result<Option<Plant>> {
        let row: Option<PgRow> = sqlx::query(&format!(
            r#"
            UPDATE plants
            SET name = $2, description = $3, category = $4, price = $5, quantity = $6, image = $7
            WHERE id = $1
            RETURNING {PLANT_COLUMNS}
            "#
        ))
        .bind(id.as_uuid())
        .bind(&update.name)
        .bind(&update.description)
        .bind(&update.category)
        .bind(update.price)
        .bind(i64::from(update.quantity))
        .bind(&update.image)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Self::row_to_plant).transpose()
    }

    async fn delete_plant(&self, id: PlantId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM plants WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn adjust_quantity(&self, id: PlantId, delta: i64) -> Result<Plant> {
        // The row lock is held from the read until commit, so the bounds check
        // and the error's `available` both see the value that is written over.
        let mut tx = self.pool.begin().await?;

        let row: Option<PgRow> = sqlx::query(&format!(
            "SELECT {PLANT_COLUMNS} FROM plants WHERE id = $1 FOR UPDATE"
        ))
        .bind(id.as_uuid())
        .fetch_optional(&mut *tx)
        .await?;

        let plant = match row {
            Some(row) => Self::row_to_plant(row)?,
            None => return Err(StoreError::PlantNotFound(id)),
        };
        let quantity = checked_quantity(id, plant.quantity, delta)?;

        sqlx::query("UPDATE plants SET quantity = $2 WHERE id = $1")
            .bind(id.as_uuid())
            .bind(i64::from(quantity))
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(Plant { quantity, ..plant })
    }
}

#[async_trait]
impl PurchaseStore for PostgresStore {
    async fn insert_purchase(&self, purchase: Purchase) -> Result<PurchaseId> {
        sqlx::query(
            r#"
            INSERT INTO purchases (id, plant_id, customer_name, customer_email, customer_image, quantity, price, address, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(purchase.id.as_uuid())
        .bind(purchase.plant_id.as_uuid())
        .bind(&purchase.customer.name)
        .bind(&purchase.customer.email)
        .bind(&purchase.customer.image)
        .bind(i64::from(purchase.quantity))
        .bind(purchase.price)
        .bind(&purchase.address)
        .bind(purchase.created_at)
        .execute(&self.pool)
        .await?;

        Ok(purchase.id)
    }

    async fn purchases_for_customer(&self, email: &str) -> Result<Vec<PurchaseDetails>> {
        // Inner join: purchases of deleted plants drop out.
        let rows = sqlx::query(
            r#"
            SELECT pu.id, pu.plant_id, pu.customer_name, pu.customer_email, pu.customer_image,
                   pu.quantity, pu.price, pu.address, pu.created_at,
                   pl.name AS plant_name, pl.image AS plant_image, pl.category AS plant_category
            FROM purchases pu
            JOIN plants pl ON pl.id = pu.plant_id
            WHERE pu.customer_email = $1
            ORDER BY pu.created_at ASC, pu.id ASC
            "#,
        )
        .bind(email)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|row| {
                Ok(PurchaseDetails {
                    purchase: Self::row_to_purchase(&row)?,
                    name: row.try_get("plant_name")?,
                    image: row.try_get("plant_image")?,
                    category: row.try_get("plant_category")?,
                })
            })
            .collect()
    }
}

#[async_trait]
impl UserStore for PostgresStore {
    async fn insert_user_if_absent(&self, user: User) -> Result<Upsert<User>> {
        let inserted: Option<PgRow> = sqlx::query(
            r#"
            INSERT INTO users (email, name, image, role, created_at)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (email) DO NOTHING
            RETURNING email, name, image, role, created_at
            "#,
        )
        .bind(&user.email)
        .bind(&user.name)
        .bind(&user.image)
        .bind(user.role.as_str())
        .bind(user.created_at)
        .fetch_optional(&self.pool)
        .await?;

        if let Some(row) = inserted {
            return Ok(Upsert::Inserted(Self::row_to_user(row)?));
        }

        tracing::debug!(email = %user.email, "user already exists");
        let existing = self.get_user(&user.email).await?.ok_or_else(|| {
            StoreError::InvalidRecord(format!("user {} vanished after conflict", user.email))
        })?;
        Ok(Upsert::Existing(existing))
    }

    async fn get_user(&self, email: &str) -> Result<Option<User>> {
        let row: Option<PgRow> = sqlx::query(
            "SELECT email, name, image, role, created_at FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Self::row_to_user).transpose()
    }
}
