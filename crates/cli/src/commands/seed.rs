//! Seed the database with demo data.
//!
//! Users and products come from a YAML file; demo orders are generated
//! randomly per user (1-3 orders of 1-3 items each) so order lookups have
//! something to find. Seeding is skipped when users already exist unless
//! `--force` wipes the store first.

use std::path::Path;

use argon2::{
    Argon2,
    password_hash::{PasswordHasher, SaltString, rand_core::OsRng},
};
use chrono::{Duration, Utc};
use rand::Rng;
use rust_decimal::Decimal;
use secrecy::SecretString;
use serde::Deserialize;
use sqlx::PgPool;
use tracing::{error, info};

use shopassist_core::{Email, OrderStatus, PaymentMethod};
use shopassist_server::actions::generate_order_number;
use shopassist_server::db::{
    self, NewOrder, NewOrderItem, OrderRepository, ProductRepository, UserRepository,
};
use shopassist_server::models::Product;

/// Seed data configuration loaded from YAML.
#[derive(Debug, Deserialize)]
pub struct SeedConfig {
    /// Demo user accounts.
    pub users: Vec<SeedUser>,
    /// Catalog products.
    pub products: Vec<SeedProduct>,
}

/// A demo user entry.
#[derive(Debug, Deserialize)]
pub struct SeedUser {
    pub email: String,
    pub password: String,
    pub full_name: Option<String>,
    #[serde(default)]
    pub is_superuser: bool,
}

/// A catalog product entry.
#[derive(Debug, Deserialize)]
pub struct SeedProduct {
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub stock: i32,
    pub category: Option<String>,
}

/// Validate a seed configuration, returning all problems found.
fn validate_config(config: &SeedConfig) -> Vec<String> {
    let mut errors = Vec::new();

    if config.users.is_empty() {
        errors.push("no users defined".to_string());
    }
    if config.products.is_empty() {
        errors.push("no products defined".to_string());
    }

    for user in &config.users {
        if let Err(e) = Email::parse(&user.email) {
            errors.push(format!("user {}: {e}", user.email));
        }
        if user.password.is_empty() {
            errors.push(format!("user {}: empty password", user.email));
        }
    }

    for product in &config.products {
        if product.name.trim().is_empty() {
            errors.push("product with empty name".to_string());
        }
        if product.price <= Decimal::ZERO {
            errors.push(format!("product {}: non-positive price", product.name));
        }
        if product.stock < 0 {
            errors.push(format!("product {}: negative stock", product.name));
        }
    }

    errors
}

/// Hash a password using Argon2id.
fn hash_password(password: &str) -> Result<String, String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| format!("password hash failed: {e}"))
}

/// Seed the database from a YAML file.
///
/// # Arguments
///
/// * `file_path` - Path to the YAML configuration file
/// * `force` - If true, clear existing data first
///
/// # Errors
///
/// Returns an error if environment variables are missing, the file cannot
/// be read or validated, or database operations fail.
pub async fn run(file_path: &str, force: bool) -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let database_url = std::env::var("SHOPASSIST_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map(SecretString::from)
        .map_err(|_| "SHOPASSIST_DATABASE_URL not set")?;

    let path = Path::new(file_path);
    if !path.exists() {
        return Err(format!("File not found: {file_path}").into());
    }

    info!(path = %file_path, "Loading seed data from file");

    // Read and validate YAML before connecting to the database
    let content = tokio::fs::read_to_string(path).await?;
    let config: SeedConfig = serde_yaml::from_str(&content)?;

    let errors = validate_config(&config);
    if !errors.is_empty() {
        error!("Seed data validation failed:");
        for err in &errors {
            error!("  - {err}");
        }
        return Err(format!("{} validation errors found", errors.len()).into());
    }

    info!(
        users = config.users.len(),
        products = config.products.len(),
        "Seed data validated"
    );

    let pool = db::create_pool(&database_url).await?;
    info!("Connected to database");

    let users = UserRepository::new(&pool);

    if users.count().await? > 0 {
        if force {
            info!("Force reseeding: clearing existing data");
            clear_all(&pool).await?;
        } else {
            info!("Database already seeded. Skipping.");
            return Ok(());
        }
    }

    // Users
    for user in &config.users {
        let email = Email::parse(&user.email)?;
        let password_hash = hash_password(&user.password)?;
        users
            .create(
                &email,
                &password_hash,
                user.full_name.as_deref(),
                user.is_superuser,
            )
            .await?;
    }
    info!("Created {} users", config.users.len());

    // Products
    let products = ProductRepository::new(&pool);
    for product in &config.products {
        products
            .create(
                &product.name,
                product.description.as_deref(),
                product.price,
                product.stock,
                product.category.as_deref(),
            )
            .await?;
    }
    info!("Created {} products", config.products.len());

    // Demo orders
    let order_count = seed_orders(&pool).await?;
    info!("Created {order_count} demo orders");

    info!("Database seeding completed successfully!");
    Ok(())
}

/// Create 1-3 random demo orders per user, each with 1-3 line items.
async fn seed_orders(pool: &PgPool) -> Result<usize, Box<dyn std::error::Error>> {
    let users = UserRepository::new(pool);
    let products = ProductRepository::new(pool);
    let orders = OrderRepository::new(pool);

    let user_ids = users.list_ids().await?;
    let catalog: Vec<Product> = products.list().await?;
    if catalog.is_empty() {
        return Ok(0);
    }

    let mut rng = rand::rng();
    let mut created = 0;

    for user_id in user_ids {
        for _ in 0..rng.random_range(1..=3) {
            let order_number = generate_order_number();
            let status = OrderStatus::ALL[rng.random_range(0..OrderStatus::ALL.len())];
            let payment_method = PaymentMethod::ALL[rng.random_range(0..PaymentMethod::ALL.len())];
            let order_date = Utc::now() - Duration::days(rng.random_range(0..30));

            let items: Vec<NewOrderItem> = (0..rng.random_range(1..=3))
                .map(|_| {
                    let product = &catalog[rng.random_range(0..catalog.len())];
                    NewOrderItem {
                        product_id: product.id,
                        quantity: rng.random_range(1..=3),
                        price: product.price,
                    }
                })
                .collect();

            orders
                .create_with_items(
                    NewOrder {
                        user_id,
                        order_number: &order_number,
                        status,
                        payment_method,
                        shipping_address: "123 Main St, Anytown, USA",
                        order_date,
                    },
                    &items,
                )
                .await?;
            created += 1;
        }
    }

    Ok(created)
}

/// Delete all seeded data, children first.
async fn clear_all(pool: &PgPool) -> Result<(), sqlx::Error> {
    for table in [
        "order_items",
        "orders",
        "products",
        "messages",
        "conversations",
        "users",
    ] {
        sqlx::query(&format!("DELETE FROM {table}")).execute(pool).await?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_config() -> SeedConfig {
        SeedConfig {
            users: vec![SeedUser {
                email: "customer1@example.com".to_string(),
                password: "password123".to_string(),
                full_name: Some("John Doe".to_string()),
                is_superuser: false,
            }],
            products: vec![SeedProduct {
                name: "Coffee Maker".to_string(),
                description: Some("Automatic coffee maker with timer".to_string()),
                price: "79.99".parse().expect("decimal"),
                stock: 40,
                category: Some("Kitchen".to_string()),
            }],
        }
    }

    #[test]
    fn test_validate_config_accepts_sample() {
        assert!(validate_config(&sample_config()).is_empty());
    }

    #[test]
    fn test_validate_config_rejects_bad_entries() {
        let mut config = sample_config();
        config.users[0].email = "not-an-email".to_string();
        config.products[0].price = Decimal::ZERO;

        let errors = validate_config(&config);
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn test_hash_password_produces_argon2id() {
        let hash = hash_password("password123").expect("hash");
        assert!(hash.starts_with("$argon2id$"));
    }

    #[test]
    fn test_seed_yaml_parses() {
        let yaml = r#"
users:
  - email: customer1@example.com
    password: password123
    full_name: John Doe
products:
  - name: Smartphone X
    description: Latest smartphone with advanced features
    price: "999.99"
    stock: 50
    category: Electronics
"#;
        let config: SeedConfig = serde_yaml::from_str(yaml).expect("parse");
        assert_eq!(config.users.len(), 1);
        assert!(!config.users[0].is_superuser);
        assert_eq!(config.products[0].stock, 50);
    }
}
