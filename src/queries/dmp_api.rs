use crate::db::postgres::PostgresClient;
use crate::db::sql_generation::{column_list, escape_like, quote_ident, SqlCall};
use crate::db::store::RecordStore;
use crate::db::table::TableDef;
use crate::db::value::{Record, Value};
use crate::models::tables::{DMP_ISSUES, DMP_ISSUE_UPDATES, DMP_ORGS, DMP_PR_UPDATES};
use crate::queries::settle;

/// Organisations with their issues folded into a JSON array of `{id, name}`
pub fn generate_org_issues_sql(year: Option<i32>) -> SqlCall {
    let orgs = quote_ident(DMP_ORGS.name);
    let issues = quote_ident(DMP_ISSUES.name);
    let mut query = format!(
        concat!(
            "SELECT o.\"id\" AS org_id, o.\"name\" AS org_name,",
            " json_agg(json_build_object('id', i.\"id\", 'name', i.\"title\")) AS issues",
            " FROM {} o LEFT OUTER JOIN {} i ON o.\"id\" = i.\"org_id\""
        ),
        orgs, issues
    );
    let mut params = Vec::new();
    if let Some(year) = year {
        query.push_str(" WHERE i.\"year\" = $1");
        params.push(Value::from(year));
    }
    query.push_str(" GROUP BY o.\"id\" ORDER BY o.\"id\"");
    SqlCall::new(query, params)
}

/// Issues whose repository owner contains `owner`
pub fn generate_issues_by_owner_sql(owner: &str) -> SqlCall {
    SqlCall::new(
        format!(
            "SELECT {} FROM {} WHERE \"repo_owner\" LIKE $1 ESCAPE '\\'",
            column_list(&DMP_ISSUES),
            quote_ident(DMP_ISSUES.name)
        ),
        vec![Value::Text(format!("%{}%", escape_like(owner)))],
    )
}

/// Queries backing the DMP issue-tracking API
pub struct DmpApiQueries<S = PostgresClient> {
    store: S,
}

impl<S: RecordStore> DmpApiQueries<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    async fn read(&self, operation: &str, table: &TableDef, key: &str, value: Value) -> Option<Vec<Record>> {
        settle(operation, table.name, self.store.read(table, key, &value, &[]).await)
    }

    pub async fn get_issue_query(&self, year: Option<i32>) -> Option<Vec<Record>> {
        let call = generate_org_issues_sql(year);
        settle("get_issue_query", DMP_ORGS.name, self.store.fetch(&call).await)
    }

    pub async fn get_issue_owner(&self, name: &str) -> Option<Vec<Record>> {
        self.read("get_issue_owner", &DMP_ORGS, "name", Value::from(name)).await
    }

    pub async fn get_actual_owner_query(&self, owner: &str) -> Option<Vec<Record>> {
        let call = generate_issues_by_owner_sql(owner);
        settle("get_actual_owner_query", DMP_ISSUES.name, self.store.fetch(&call).await)
    }

    pub async fn get_dmp_issues(&self, issue_id: i64) -> Option<Vec<Record>> {
        self.read("get_dmp_issues", &DMP_ISSUES, "id", Value::from(issue_id)).await
    }

    pub async fn get_dmp_issue_updates(&self, dmp_issue_id: i64) -> Option<Vec<Record>> {
        self.read("get_dmp_issue_updates", &DMP_ISSUE_UPDATES, "dmp_id", Value::from(dmp_issue_id))
            .await
    }

    pub async fn get_pr_data(&self, dmp_issue_id: i64) -> Option<Vec<Record>> {
        self.read("get_pr_data", &DMP_PR_UPDATES, "dmp_id", Value::from(dmp_issue_id)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::errors::DatabaseError;
    use crate::db::store::MockRecordStore;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_org_issues_sql() {
        let all_years = generate_org_issues_sql(None);
        assert_eq!(
            all_years.query,
            concat!(
                r#"SELECT o."id" AS org_id, o."name" AS org_name,"#,
                r#" json_agg(json_build_object('id', i."id", 'name', i."title")) AS issues"#,
                r#" FROM "dmp_orgs" o LEFT OUTER JOIN "dmp_issues" i ON o."id" = i."org_id""#,
                r#" GROUP BY o."id" ORDER BY o."id""#
            )
        );
        assert!(all_years.params.is_empty());

        let one_year = generate_org_issues_sql(Some(2024));
        assert!(one_year.query.contains(r#"WHERE i."year" = $1 GROUP BY"#));
        assert_eq!(one_year.params, vec![Value::Int(2024)]);
    }

    #[test]
    fn test_owner_search_escapes_wildcards() {
        let call = generate_issues_by_owner_sql("acme_labs");
        assert_eq!(
            call.query,
            format!(
                r#"SELECT {} FROM "dmp_issues" WHERE "repo_owner" LIKE $1 ESCAPE '\'"#,
                column_list(&DMP_ISSUES)
            )
        );
        assert_eq!(call.params, vec![Value::from(r"%acme\_labs%")]);
    }

    #[tokio::test]
    async fn test_issue_query_returns_grouped_rows() {
        let mut store = MockRecordStore::new();
        store
            .expect_fetch()
            .withf(|call| call.query.contains("json_agg") && call.params.is_empty())
            .returning(|_| {
                let mut row = Record::new();
                row.insert("org_id".to_string(), Value::Int(1));
                row.insert("org_name".to_string(), Value::from("Acme"));
                row.insert("issues".to_string(), Value::Json(json!([{"id": 5, "name": "Fix build"}])));
                Ok(vec![row])
            });
        let queries = DmpApiQueries::new(store);

        let rows = queries.get_issue_query(None).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get("org_name"), Some(&Value::from("Acme")));
    }

    #[tokio::test]
    async fn test_keyed_reads_hit_expected_tables() {
        let mut store = MockRecordStore::new();
        store
            .expect_read()
            .withf(|table, key, value, columns| {
                table.name == "dmp_pr_updates" && key == "dmp_id" && *value == Value::Int(12) && columns.is_empty()
            })
            .times(1)
            .returning(|_, _, _, _| Ok(vec![]));
        store
            .expect_read()
            .withf(|table, key, _, _| table.name == "dmp_issue_updates" && key == "dmp_id")
            .times(1)
            .returning(|_, _, _, _| Err(DatabaseError::ConnectionError("gone".to_string())));
        let queries = DmpApiQueries::new(store);

        assert_eq!(queries.get_pr_data(12).await, Some(vec![]));
        assert_eq!(queries.get_dmp_issue_updates(12).await, None);
    }
}
