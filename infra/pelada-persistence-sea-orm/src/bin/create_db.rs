use pelada_persistence_sea_orm::{create_db_pool, create_schema};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let database_url =
        std::env::var("PELADA_DATABASE_URL").expect("PELADA_DATABASE_URL must be set");
    let pool = create_db_pool(&database_url)
        .await
        .expect("Failed to connect to database");

    create_schema(&pool)
        .await
        .expect("Failed to create database tables");

    println!("Created database tables successfully");
}
