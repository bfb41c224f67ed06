//! Integration tests for relational query building and execution
//!
//! The first group runs against an in-memory connection. The Postgres group
//! needs DATABASE_URL and is ignored by default.

use relquery::prelude::*;
use std::sync::{Arc, Mutex};

/// Connection double that records statements and returns one row per call
#[derive(Debug)]
struct FakeConnection {
    platform: Box<dyn Platform>,
    statements: Mutex<Vec<Statement>>,
}

impl FakeConnection {
    fn new(platform: Box<dyn Platform>) -> Arc<Self> {
        Arc::new(Self {
            platform,
            statements: Mutex::new(Vec::new()),
        })
    }

    fn statements(&self) -> Vec<Statement> {
        self.statements.lock().unwrap().clone()
    }
}

#[async_trait]
impl Connection for FakeConnection {
    fn platform(&self) -> &dyn Platform {
        self.platform.as_ref()
    }

    async fn fetch_all(&self, statement: &Statement) -> Result<ResultSet, sqlx::Error> {
        self.statements.lock().unwrap().push(statement.clone());
        let mut row = Row::new();
        row.insert("ok".to_string(), json!(1));
        Ok(ResultSet::new(vec![row]))
    }
}

fn blog_config() -> QueryConfig {
    QueryConfig::new("postgres".to_string(), "id".to_string())
        .with_table("users", vec!["id".to_string(), "status".to_string()])
        .with_table(
            "posts",
            vec!["id".to_string(), "author_id".to_string(), "published".to_string()],
        )
        .with_table(
            "post_tags",
            vec!["post_id".to_string(), "tag_id".to_string()],
        )
}

#[test]
fn test_table_builder_uses_configured_catalog() {
    let connection = FakeConnection::new(Box::new(PostgresPlatform));
    let relquery = RelQuery::from_connection(connection, &blog_config());

    assert!(relquery.catalog().is_some());
    assert!(relquery.pool().is_none());

    let mut users = relquery.table("users");
    let result = users.where_has("id", "comments", RelationKeys::one_to_many("user_id"), 1);
    assert!(matches!(result, Err(QueryError::TableNotFound(_))));

    users
        .where_has("id", "posts", RelationKeys::one_to_many("author_id"), 2)
        .unwrap();
    let statement = users.compile().unwrap();
    assert_eq!(
        statement.sql,
        "SELECT \"users\".* FROM \"users\" WHERE \"users\".\"id\" IN \
         (SELECT \"posts\".\"author_id\" FROM \"posts\" \
         GROUP BY \"posts\".\"author_id\" HAVING COUNT(*) >= $1)"
    );
}

#[test]
fn test_configured_primary_key_drives_one_to_many_all() {
    let config = QueryConfig::new("postgres".to_string(), "uuid".to_string());
    let relquery = RelQuery::from_connection(FakeConnection::new(Box::new(PostgresPlatform)), &config);

    let mut users = relquery.table("users");
    users
        .where_all("id", "posts", RelationKeys::one_to_many("author_id"), ["a", "b"])
        .unwrap();

    let sql = users.compile().unwrap().sql;
    assert!(sql.contains("WHERE \"posts\".\"uuid\" IN ($1, $2)"));
    assert!(sql.contains("HAVING COUNT(DISTINCT \"posts\".\"uuid\") = $3"));
}

#[tokio::test]
async fn test_execute_and_health_check_through_connection() {
    let connection = FakeConnection::new(Box::new(MySqlPlatform));
    let relquery = RelQuery::from_connection(connection.clone(), &QueryConfig::default());

    relquery.health_check().await.unwrap();

    let mut posts = relquery.table("posts");
    posts
        .where_relational(
            "id",
            "post_tags",
            RelationKeys::many_to_many("post_id", "tag_id"),
            |tags| {
                tags.where_equal_to("tag_id", 7);
            },
            Connector::And,
        )
        .unwrap();
    let rows = posts.execute().await.unwrap();
    assert_eq!(rows.len(), 1);

    let statements = connection.statements();
    assert_eq!(statements.len(), 2);
    assert_eq!(statements[0].sql, "SELECT 1 AS ok");
    assert_eq!(
        statements[1].sql,
        "SELECT `posts`.* FROM `posts` WHERE `posts`.`id` IN \
         (SELECT `post_tags`.`post_id` FROM `post_tags` WHERE `post_tags`.`tag_id` = ?)"
    );
    assert_eq!(statements[1].params, vec![json!(7)]);
}

#[test]
fn test_query_errors_convert_into_crate_error() {
    let relquery = RelQuery::from_connection(
        FakeConnection::new(Box::new(PostgresPlatform)),
        &QueryConfig::default(),
    );
    let query = relquery.query();

    let err: RelQueryError = query.compile().unwrap_err().into();
    assert!(matches!(err, RelQueryError::Query(QueryError::MissingFrom)));
}

// ========================================
// Live Postgres
// ========================================

async fn setup_pool() -> PgPool {
    let database_url =
        std::env::var("DATABASE_URL").expect("DATABASE_URL must be set for integration tests");

    PgPool::connect(&database_url)
        .await
        .expect("Failed to connect to database")
}

async fn seed_blog(pool: &PgPool) {
    let statements = [
        "DROP TABLE IF EXISTS rq_post_tags, rq_posts, rq_users CASCADE",
        "CREATE TABLE rq_users (id INT PRIMARY KEY, email TEXT NOT NULL, status TEXT NOT NULL)",
        "CREATE TABLE rq_posts (id INT PRIMARY KEY, author_id INT NOT NULL, published BOOLEAN NOT NULL)",
        "CREATE TABLE rq_post_tags (post_id INT NOT NULL, tag_id INT NOT NULL)",
        "INSERT INTO rq_users VALUES (1, 'ada@example.com', 'active'), (2, 'bob@example.com', 'active'), (3, 'cy@example.com', 'banned')",
        "INSERT INTO rq_posts VALUES (10, 1, true), (11, 1, true), (12, 2, false), (13, 3, true)",
        "INSERT INTO rq_post_tags VALUES (10, 100), (10, 200), (11, 100), (13, 200)",
    ];
    for sql in statements {
        sqlx::query(sql)
            .execute(pool)
            .await
            .expect("Failed to seed tables");
    }
}

fn ids(rows: &ResultSet) -> Vec<i64> {
    let mut ids: Vec<i64> = rows
        .iter()
        .filter_map(|row| row.get("id").and_then(|id| id.as_i64()))
        .collect();
    ids.sort();
    ids
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_postgres_relational_filters() {
    let pool = setup_pool().await;
    seed_blog(&pool).await;

    let relquery = RelQuery::from_connection(
        Arc::new(PgConnection::new(pool.clone())),
        &QueryConfig::default(),
    );
    relquery.health_check().await.unwrap();

    // authors with at least two posts
    let mut prolific = relquery.table("rq_users");
    prolific
        .where_has("id", "rq_posts", RelationKeys::one_to_many("author_id"), 2)
        .unwrap();
    assert_eq!(ids(&prolific.execute().await.unwrap()), vec![1]);

    // posts tagged with both 100 and 200
    let mut tagged = relquery.table("rq_posts");
    tagged
        .where_all(
            "id",
            "rq_post_tags",
            RelationKeys::many_to_many("post_id", "tag_id"),
            [100, 200],
        )
        .unwrap();
    assert_eq!(ids(&tagged.execute().await.unwrap()), vec![10]);

    // published posts by active authors
    let mut published = relquery.table("rq_posts");
    published
        .where_equal_to("published", true)
        .where_relational(
            "author_id",
            "rq_users",
            RelationKeys::many_to_one("id"),
            |users| {
                users.where_equal_to("status", "active");
            },
            Connector::And,
        )
        .unwrap();
    assert_eq!(ids(&published.execute().await.unwrap()), vec![10, 11]);

    let _ = sqlx::query("DROP TABLE IF EXISTS rq_post_tags, rq_posts, rq_users CASCADE")
        .execute(&pool)
        .await;
}
