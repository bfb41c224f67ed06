//! # Blog Queries Example
//!
//! Builds the relational filters of a small blog schema and prints the SQL:
//! - authors with at least three posts
//! - posts tagged with every requested tag
//! - published posts written by active authors
//!
//! Statements are only executed when the database answers the health check.

use relquery::prelude::*;
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    println!("relquery blog queries");
    println!("=====================");

    let config = DatabaseConfig::new(
        "localhost".to_string(),
        5432,
        "relquery".to_string(),
        "postgres".to_string(),
        "password".to_string(),
        1,    // min_connections
        5,    // max_connections
        30,   // connection_timeout_seconds
        600,  // idle_timeout_seconds
        3600, // max_lifetime_seconds
    );

    let pool = PgPool::connect_lazy(&config.connection_string())?;
    let query_config = QueryConfig::default()
        .with_table(
            "users",
            vec!["id".to_string(), "email".to_string(), "status".to_string()],
        )
        .with_table(
            "posts",
            vec!["id".to_string(), "author_id".to_string(), "published".to_string()],
        )
        .with_table(
            "post_tags",
            vec!["post_id".to_string(), "tag_id".to_string()],
        );
    let relquery = RelQuery::from_connection(Arc::new(PgConnection::new(pool)), &query_config);

    // 1. Authors with at least three posts
    let mut prolific = relquery.table("users");
    prolific
        .set_columns(["id", "email"])
        .where_equal_to("status", "active")
        .where_has("id", "posts", RelationKeys::one_to_many("author_id"), 3)?
        .order_by("email", SortOrder::Asc)
        .limit(20);
    println!("\nProlific authors:\n  {}", prolific.to_sql_string()?);

    // 2. Posts tagged with both tags
    let mut tagged = relquery.table("posts");
    tagged.where_all(
        "id",
        "post_tags",
        RelationKeys::many_to_many("post_id", "tag_id"),
        [1, 2],
    )?;
    let statement = tagged.compile()?;
    println!("\nTagged posts:\n  {}\n  params: {:?}", statement, statement.params);

    // 3. Published posts by active authors
    let mut published = relquery.table("posts");
    published.where_equal_to("published", true).where_relational(
        "author_id",
        "users",
        RelationKeys::many_to_one("id"),
        |users| {
            users.where_equal_to("status", "active");
        },
        Connector::And,
    )?;
    println!("\nPublished posts:\n  {}", published.to_sql_string()?);

    if let Err(err) = relquery.health_check().await {
        println!("\nDatabase unavailable, skipping execution: {}", err);
        return Ok(());
    }

    for (name, query) in [
        ("prolific", &prolific),
        ("tagged", &tagged),
        ("published", &published),
    ] {
        let rows = query.execute().await?;
        println!("\n{}: {} rows", name, rows.len());
        for row in rows.iter() {
            println!("  {}", Value::Object(row.clone()));
        }
    }

    Ok(())
}
