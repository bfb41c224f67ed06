//! Query builder integration tests
//!
//! Realistic composed queries across dialects.

#[cfg(test)]
mod integration_tests {
    use crate::platform::SqlitePlatform;
    use crate::query_builder::test_support::{pg_query, RecordingConnection};
    use crate::query_builder::{
        Connector, Expression, JoinClause, JoinCondition, JoinType, QueryBuilder, RelationKeys,
        SelectColumn, SortOrder,
    };
    use serde_json::json;
    use std::sync::Arc;

    // ========================================
    // Real-world Query Scenarios
    // ========================================

    #[test]
    fn test_revenue_report_query() {
        let mut query = pg_query("orders");
        query
            .set_columns([
                SelectColumn::column("user_id"),
                SelectColumn::count_all().with_alias("order_count"),
                SelectColumn::sum("total").with_alias("revenue"),
            ])
            .add_join(
                "users",
                JoinCondition::on("orders.user_id", "users.id"),
                ["email"],
                JoinType::Inner,
            )
            .where_equal_to("status", "paid")
            .where_between("created_at", vec!["2024-01-01", "2024-12-31"])
            .group_by(["user_id", "users.email"])
            .having_expression(Expression::new(
                "SUM(\"orders\".\"total\") > ?",
                vec![json!(100)],
            ))
            .order_by("user_id", SortOrder::Asc)
            .limit(50);

        let statement = query.compile().unwrap();
        assert_eq!(
            statement.sql,
            "SELECT \"orders\".\"user_id\", COUNT(*) AS \"order_count\", \
             SUM(\"orders\".\"total\") AS \"revenue\", \"users\".\"email\" \
             FROM \"orders\" INNER JOIN \"users\" ON \"orders\".\"user_id\" = \"users\".\"id\" \
             WHERE \"orders\".\"status\" = $1 AND \"orders\".\"created_at\" BETWEEN $2 AND $3 \
             GROUP BY \"orders\".\"user_id\", \"users\".\"email\" \
             HAVING SUM(\"orders\".\"total\") > $4 \
             ORDER BY \"orders\".\"user_id\" ASC LIMIT 50"
        );
        assert_eq!(
            statement.params,
            vec![
                json!("paid"),
                json!("2024-01-01"),
                json!("2024-12-31"),
                json!(100)
            ]
        );
    }

    #[test]
    fn test_aliased_and_raw_joins() {
        let mut query = pg_query("users");
        query
            .set_columns(["id", "name"])
            .add_join_clause(
                JoinClause::new_on(JoinType::Left, "orders", "users.id", "o.user_id")
                    .with_alias("o")
                    .with_columns([SelectColumn::count_distinct("id").with_alias("orders")]),
            )
            .add_join(
                "profiles",
                "profiles.user_id = users.id AND profiles.deleted_at IS NULL",
                Vec::<&str>::new(),
                JoinType::Outer,
            )
            .group_by(["id", "name"]);

        let statement = query.compile().unwrap();
        assert_eq!(
            statement.sql,
            "SELECT \"users\".\"id\", \"users\".\"name\", COUNT(DISTINCT \"o\".\"id\") AS \"orders\" \
             FROM \"users\" LEFT JOIN \"orders\" AS \"o\" ON \"users\".\"id\" = \"o\".\"user_id\" \
             FULL OUTER JOIN \"profiles\" ON profiles.user_id = users.id AND profiles.deleted_at IS NULL \
             GROUP BY \"users\".\"id\", \"users\".\"name\""
        );
        assert_eq!(query.get_joins().len(), 2);
    }

    #[test]
    fn test_authors_with_published_posts() {
        let mut query = pg_query("users");
        query
            .where_equal_to("status", "active")
            .where_relational(
                "id",
                "posts",
                RelationKeys::one_to_many("author_id"),
                |posts| {
                    posts.where_equal_to("published", true);
                },
                Connector::And,
            )
            .unwrap();

        let statement = query.compile().unwrap();
        assert_eq!(
            statement.sql,
            "SELECT \"users\".* FROM \"users\" WHERE \"users\".\"status\" = $1 \
             AND \"users\".\"id\" IN (SELECT \"posts\".\"author_id\" FROM \"posts\" \
             WHERE \"posts\".\"published\" = $2)"
        );
        assert_eq!(statement.params, vec![json!("active"), json!(true)]);
    }

    #[test]
    fn test_drafts_or_tagged_posts() {
        let mut query = pg_query("posts");
        query.where_equal_to("status", "draft");
        query
            .or_where_relational(
                "id",
                "post_tags",
                RelationKeys::many_to_many("post_id", "tag_id"),
                |tags| {
                    tags.where_in("tag_id", vec![3, 4]);
                },
            )
            .unwrap();

        let statement = query.compile().unwrap();
        assert_eq!(
            statement.sql,
            "SELECT \"posts\".* FROM \"posts\" WHERE \"posts\".\"status\" = $1 \
             OR \"posts\".\"id\" IN (SELECT \"post_tags\".\"post_id\" FROM \"post_tags\" \
             WHERE \"post_tags\".\"tag_id\" IN ($2, $3))"
        );
        assert_eq!(statement.params, vec![json!("draft"), json!(3), json!(4)]);
    }

    #[test]
    fn test_relation_inside_relation() {
        let mut query = pg_query("users");
        query
            .where_relational(
                "id",
                "posts",
                RelationKeys::one_to_many("author_id"),
                |posts| {
                    posts
                        .where_has("id", "comments", RelationKeys::one_to_many("post_id"), 5)
                        .unwrap();
                },
                Connector::And,
            )
            .unwrap();

        let statement = query.compile().unwrap();
        assert_eq!(
            statement.sql,
            "SELECT \"users\".* FROM \"users\" WHERE \"users\".\"id\" IN \
             (SELECT \"posts\".\"author_id\" FROM \"posts\" WHERE \"posts\".\"id\" IN \
             (SELECT \"comments\".\"post_id\" FROM \"comments\" \
             GROUP BY \"comments\".\"post_id\" HAVING COUNT(*) >= $1))"
        );
        assert_eq!(statement.params, vec![json!(5)]);
    }

    #[test]
    fn test_search_page_query() {
        let mut query = pg_query("products");
        query
            .set_columns(["id", "name", "price"])
            .where_not_null("published_at")
            .nest_where(
                |search| {
                    search.where_like("name", "lamp");
                    search.or_where_like("description", "lamp");
                },
                Connector::And,
            )
            .where_not_empty("sku")
            .where_in("category_id", vec![1, 5, 9])
            .order_by("price", SortOrder::Asc)
            .limit(20)
            .offset(40);

        let statement = query.compile().unwrap();
        assert_eq!(
            statement.sql,
            "SELECT \"products\".\"id\", \"products\".\"name\", \"products\".\"price\" \
             FROM \"products\" WHERE \"products\".\"published_at\" IS NOT NULL \
             AND (\"products\".\"name\" LIKE $1 OR \"products\".\"description\" LIKE $2) \
             AND (\"products\".\"sku\" IS NOT NULL AND \"products\".\"sku\" != $3) \
             AND \"products\".\"category_id\" IN ($4, $5, $6) \
             ORDER BY \"products\".\"price\" ASC LIMIT 20 OFFSET 40"
        );
        assert_eq!(
            statement.params,
            vec![
                json!("%lamp%"),
                json!("%lamp%"),
                json!(""),
                json!(1),
                json!(5),
                json!(9)
            ]
        );
    }

    // ========================================
    // Dialects
    // ========================================

    #[test]
    fn test_mysql_placeholders_and_quoting() {
        let mut query = QueryBuilder::new(RecordingConnection::mysql());
        query
            .set_from("users")
            .where_equal_to("status", "active")
            .where_in("id", vec![1, 2])
            .where_has("id", "posts", RelationKeys::one_to_many("author_id"), 2)
            .unwrap();

        let statement = query.compile().unwrap();
        assert_eq!(
            statement.sql,
            "SELECT `users`.* FROM `users` WHERE `users`.`status` = ? AND `users`.`id` IN (?, ?) \
             AND `users`.`id` IN (SELECT `posts`.`author_id` FROM `posts` \
             GROUP BY `posts`.`author_id` HAVING COUNT(*) >= ?)"
        );
        assert_eq!(
            statement.params,
            vec![json!("active"), json!(1), json!(2), json!(2)]
        );
    }

    #[test]
    fn test_mysql_inline_literals() {
        let mut query = QueryBuilder::new(RecordingConnection::mysql());
        query
            .set_from("users")
            .where_equal_to("verified", true)
            .where_like("name", "o'neil");

        assert_eq!(
            query.to_sql_string().unwrap(),
            "SELECT `users`.* FROM `users` WHERE `users`.`verified` = 1 \
             AND `users`.`name` LIKE '%o''neil%'"
        );
    }

    #[test]
    fn test_sqlite_positional_placeholders() {
        let connection = Arc::new(RecordingConnection::new(Box::new(SqlitePlatform)));
        let mut query = QueryBuilder::new(connection);
        query
            .set_from("events")
            .where_greater_than("created_at", "2024-06-01")
            .where_not_between("severity", vec![2, 4]);

        let statement = query.compile().unwrap();
        assert_eq!(
            statement.sql,
            "SELECT \"events\".* FROM \"events\" WHERE \"events\".\"created_at\" > ? \
             AND \"events\".\"severity\" NOT BETWEEN ? AND ?"
        );
        assert_eq!(query.platform().name(), "sqlite");
    }

    // ========================================
    // Builder reuse
    // ========================================

    #[test]
    fn test_clone_and_modify() {
        let mut base = pg_query("users");
        base.where_equal_to("status", "active");

        let mut admins = base.clone();
        admins.where_equal_to("role", "admin").limit(1);

        assert_eq!(base.get_wheres().len(), 1);
        assert_eq!(admins.get_wheres().len(), 2);
        assert!(!base.compile().unwrap().sql.contains("LIMIT"));
        assert!(admins.compile().unwrap().sql.ends_with("LIMIT 1"));
    }

    #[tokio::test]
    async fn test_execute_through_mysql_connection() {
        let connection = RecordingConnection::mysql();
        let mut query = QueryBuilder::new(connection.clone());
        query.set_from("users").where_in("id", vec![4, 8]);

        let rows = query.execute().await.unwrap();
        assert!(rows.is_empty());

        let executed = connection.executed();
        assert_eq!(
            executed[0].sql,
            "SELECT `users`.* FROM `users` WHERE `users`.`id` IN (?, ?)"
        );
        assert_eq!(executed[0].params, vec![json!(4), json!(8)]);
    }
}
