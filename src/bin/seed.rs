use dealership_api::{
    config::AppConfig,
    db::{create_pool, run_migrations},
    services::auth_service::hash_password,
};
use rust_decimal::Decimal;
use uuid::Uuid;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;

    let pool = create_pool(&config.database_url, config.max_connections).await?;
    run_migrations(&pool).await?;

    let admin_id = ensure_user(&pool, SeedUser::new("admin", "Dealer Admin", "admin123")).await?;
    let cashier_id = ensure_user(&pool, SeedUser::new("cashier", "Front Desk", "cashier123")).await?;
    let mechanic_id =
        ensure_user(&pool, SeedUser::new("mechanic", "Workshop Mechanic", "mechanic123")).await?;
    seed_spare_parts(&pool, admin_id).await?;

    println!(
        "Seed completed. Admin ID: {admin_id}, Cashier ID: {cashier_id}, Mechanic ID: {mechanic_id}"
    );
    Ok(())
}

/// Seed accounts use their role as the username.
struct SeedUser<'a> {
    role: &'a str,
    full_name: &'a str,
    password: &'a str,
}

impl<'a> SeedUser<'a> {
    fn new(role: &'a str, full_name: &'a str, password: &'a str) -> Self {
        Self {
            role,
            full_name,
            password,
        }
    }
}

async fn ensure_user(pool: &sqlx::PgPool, user: SeedUser<'_>) -> anyhow::Result<Uuid> {
    let password_hash =
        hash_password(user.password).map_err(|e| anyhow::anyhow!(e.to_string()))?;
    let username = user.role;
    let role = user.role;
    let email = format!("{username}@dealership.local");

    let (user_id,): (Uuid,) = sqlx::query_as(
        r#"
        INSERT INTO users (id, username, email, password_hash, full_name, role)
        VALUES ($1, $2, $3, $4, $5, $6)
        ON CONFLICT (username) DO UPDATE SET role = EXCLUDED.role, is_active = TRUE
        RETURNING id
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(username)
    .bind(&email)
    .bind(password_hash)
    .bind(user.full_name)
    .bind(role)
    .fetch_one(pool)
    .await?;

    println!("Ensured user {username} (role={role})");
    Ok(user_id)
}

async fn seed_spare_parts(pool: &sqlx::PgPool, admin_id: Uuid) -> anyhow::Result<()> {
    // (code, name, brand, cost, selling, stock, min level, unit)
    let parts = vec![
        ("SP-OIL-5W30", "Engine Oil 5W-30 4L", "Shell", 180_000, 230_000, 40, 10, "bottle"),
        ("SP-FLT-OIL", "Oil Filter", "Bosch", 45_000, 65_000, 25, 8, "pcs"),
        ("SP-BRK-PAD", "Front Brake Pad Set", "Brembo", 350_000, 450_000, 12, 4, "set"),
        ("SP-SPK-PLG", "Spark Plug", "NGK", 30_000, 45_000, 60, 16, "pcs"),
        ("SP-BAT-12V", "Battery 12V 45Ah", "GS Astra", 750_000, 900_000, 3, 5, "pcs"),
    ];

    for (code, name, brand, cost, selling, stock, min_level, unit) in parts {
        let inserted: Option<(Uuid,)> = sqlx::query_as(
            r#"
            INSERT INTO spare_parts
                (id, part_code, name, brand, cost_price, selling_price, stock_quantity, min_stock_level, unit_measure)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            ON CONFLICT (part_code) DO NOTHING
            RETURNING id
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(code)
        .bind(name)
        .bind(brand)
        .bind(Decimal::from(cost))
        .bind(Decimal::from(selling))
        .bind(stock)
        .bind(min_level)
        .bind(unit)
        .fetch_optional(pool)
        .await?;

        if let Some((part_id,)) = inserted {
            sqlx::query(
                r#"
                INSERT INTO stock_movements
                    (id, spare_part_id, movement_type, reference_type, quantity_before, quantity_moved, quantity_after, processed_by, notes)
                VALUES ($1, $2, 'in', 'adjustment', 0, $3, $3, $4, 'Initial stock')
                "#,
            )
            .bind(Uuid::new_v4())
            .bind(part_id)
            .bind(stock)
            .bind(admin_id)
            .execute(pool)
            .await?;
        }
    }

    println!("Seeded spare parts");
    Ok(())
}
