use pgcursor::prelude::*;
use std::time::{SystemTime, UNIX_EPOCH};

#[tokio::test]
async fn crud_against_live_database() -> DbResult<()> {
    let database_url = match std::env::var("DATABASE_URL") {
        Ok(v) => v,
        Err(_) => {
            eprintln!("DATABASE_URL is not set; skipping crud_against_live_database");
            return Ok(());
        }
    };

    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock before UNIX_EPOCH")
        .as_nanos();
    let table = format!("pgcursor_test_{}_{}", std::process::id(), nanos);

    let config = DatabaseConfig::new(database_url)
        .with_max_size(2)
        .with_init_sql(format!(
            "CREATE TABLE {table} (id serial PRIMARY KEY, name text NOT NULL, age int NOT NULL, active boolean NOT NULL DEFAULT true)"
        ));
    let db = Database::connect(&config).await?;

    let inserted = db
        .sql()
        .insert([("name", "alice"), ("age", "30")])?
        .in_table(&table)
        .returning(["id"])
        .execute()
        .await?
        .expect("RETURNING yields rows");
    let alice_id: i32 = inserted[0].get("id");

    db.sql()
        .insert([("name", Value::from("bob")), ("age", Value::from(12))])?
        .in_table(&table)
        .execute()
        .await?;

    let adults = db
        .sql()
        .select(["name", "age"])?
        .in_table(&table)
        .where_([("age", ">=18")])?
        .and([("name", "ali*")])?
        .in_order([("name", "")])?
        .execute()
        .await?
        .expect("SELECT yields rows");
    assert_eq!(adults.len(), 1);
    assert_eq!(adults[0].get::<_, String>("name"), "alice");
    assert_eq!(adults[0].get::<_, i32>("age"), 30);

    let updated = db
        .sql()
        .update([("age", "31"), ("active", "f")])?
        .in_table(&table)
        .where_([("id", &format!("={alice_id}"))])?
        .execute()
        .await?;
    assert!(updated.is_none());

    let rows = db
        .sql()
        .select(["age", "active"])?
        .in_table(&table)
        .where_([("id", &format!("={alice_id}"))])?
        .execute()
        .await?
        .expect("SELECT yields rows");
    assert_eq!(rows[0].get::<_, i32>("age"), 31);
    assert!(!rows[0].get::<_, bool>("active"));

    db.sql()
        .delete()?
        .in_table(&table)
        .where_([("age", "<18")])?
        .or([("name", "<>alice")])?
        .execute()
        .await?;

    let remaining = db
        .sql()
        .select_all()?
        .in_table(&table)
        .execute()
        .await?
        .expect("SELECT yields rows");
    assert_eq!(remaining.len(), 1);

    db.query(&format!("DROP TABLE {table}"), &[]).await?;
    db.close();
    Ok(())
}
