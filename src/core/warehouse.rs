use crate::domain::ports::Warehouse;
use crate::utils::error::{EtlError, Result};
use async_trait::async_trait;

/// One named statement stage. The pipeline applies the stages of
/// [`SQL_STAGES`] in order and stops at the first failure.
#[derive(Debug, Clone)]
pub struct SqlStage {
    pub name: &'static str,
    pub file: &'static str,
}

pub const SQL_STAGES: [SqlStage; 3] = [
    SqlStage {
        name: "dataset",
        file: "01_dataset.sql",
    },
    SqlStage {
        name: "tables",
        file: "02_tables.sql",
    },
    SqlStage {
        name: "merges",
        file: "03_merges.sql",
    },
];

/// Substitution values for the statement templates.
#[derive(Debug, Clone)]
pub struct SqlVars {
    pub project: String,
    pub dataset: String,
    pub location: String,
}

impl SqlVars {
    /// Literal placeholder substitution. Placeholders other than the three
    /// known ones are left untouched.
    pub fn render(&self, template: &str) -> String {
        template
            .replace("${project}", &self.project)
            .replace("${dataset}", &self.dataset)
            .replace("${location}", &self.location)
    }
}

/// Applies statement templates and bulk-loads against the warehouse handle.
/// Under dry-run, every call skips the warehouse entirely and emits one
/// "skipped" event instead.
pub struct SqlApplier<W: Warehouse> {
    warehouse: W,
    vars: SqlVars,
    dry_run: bool,
}

impl<W: Warehouse> SqlApplier<W> {
    pub fn new(warehouse: W, vars: SqlVars, dry_run: bool) -> Self {
        Self {
            warehouse,
            vars,
            dry_run,
        }
    }

    /// Renders and executes one statement, blocking until it completes.
    /// Warehouse failures surface as `ApplyError` and are not retried.
    pub async fn apply(&self, statement: &str, template: &str) -> Result<()> {
        if self.dry_run {
            tracing::info!(event = "apply_skipped", statement, "statement skipped (dry-run)");
            return Ok(());
        }

        let sql = self.vars.render(template);
        tracing::debug!(statement, bytes = sql.len(), "executing statement");
        self.warehouse
            .execute(&sql)
            .await
            .map_err(|e| EtlError::ApplyError {
                statement: statement.to_string(),
                message: e.to_string(),
            })
    }

    /// Full-overwrite bulk load of one staging table.
    pub async fn load(&self, table: &str, data: &[u8], rows: usize) -> Result<()> {
        if self.dry_run {
            tracing::info!(event = "load_skipped", table, rows, "table load skipped (dry-run)");
            return Ok(());
        }

        tracing::debug!(table, rows, "loading table (overwrite)");
        self.warehouse
            .load_table(table, data)
            .await
            .map_err(|e| EtlError::ApplyError {
                statement: format!("load:{}", table),
                message: e.to_string(),
            })
    }
}

/// Stand-in for a real warehouse client: accepts every statement and load
/// and discards it, so local runs work without credentials.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopWarehouse;

#[async_trait]
impl Warehouse for NoopWarehouse {
    async fn execute(&self, sql: &str) -> Result<()> {
        tracing::debug!(bytes = sql.len(), "no warehouse client configured, statement discarded");
        Ok(())
    }

    async fn load_table(&self, table: &str, data: &[u8]) -> Result<()> {
        tracing::debug!(
            table,
            bytes = data.len(),
            "no warehouse client configured, load discarded"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use tokio::sync::Mutex;

    #[derive(Clone, Default)]
    struct MockWarehouse {
        ops: Arc<Mutex<Vec<String>>>,
        fail_contains: Option<&'static str>,
    }

    impl MockWarehouse {
        fn new() -> Self {
            Self::default()
        }

        async fn ops(&self) -> Vec<String> {
            self.ops.lock().await.clone()
        }
    }

    #[async_trait]
    impl Warehouse for MockWarehouse {
        async fn execute(&self, sql: &str) -> Result<()> {
            self.ops.lock().await.push(format!("sql:{}", sql));
            if let Some(marker) = self.fail_contains {
                if sql.contains(marker) {
                    return Err(EtlError::ApplyError {
                        statement: "mock".to_string(),
                        message: "statement refused".to_string(),
                    });
                }
            }
            Ok(())
        }

        async fn load_table(&self, table: &str, data: &[u8]) -> Result<()> {
            self.ops
                .lock()
                .await
                .push(format!("load:{}:{}", table, data.len()));
            Ok(())
        }
    }

    fn vars() -> SqlVars {
        SqlVars {
            project: "demo_project".to_string(),
            dataset: "demo_dataset".to_string(),
            location: "US".to_string(),
        }
    }

    #[test]
    fn test_render_substitutes_known_placeholders() {
        let sql = vars().render("CREATE SCHEMA `${project}.${dataset}` -- ${location}");
        assert_eq!(sql, "CREATE SCHEMA `demo_project.demo_dataset` -- US");
    }

    #[test]
    fn test_render_leaves_unknown_placeholders_untouched() {
        let sql = vars().render("SELECT '${mystery}' FROM `${project}.t`");
        assert_eq!(sql, "SELECT '${mystery}' FROM `demo_project.t`");
    }

    #[tokio::test]
    async fn test_apply_executes_rendered_statement() {
        let warehouse = MockWarehouse::new();
        let applier = SqlApplier::new(warehouse.clone(), vars(), false);

        applier.apply("dataset", "CREATE `${dataset}`").await.unwrap();

        assert_eq!(warehouse.ops().await, vec!["sql:CREATE `demo_dataset`"]);
    }

    #[tokio::test]
    async fn test_dry_run_touches_nothing() {
        let warehouse = MockWarehouse::new();
        let applier = SqlApplier::new(warehouse.clone(), vars(), true);

        applier.apply("dataset", "CREATE `${dataset}`").await.unwrap();
        applier.load("stg_sales", b"SaleID\nS1\n", 1).await.unwrap();

        assert!(warehouse.ops().await.is_empty());
    }

    #[tokio::test]
    async fn test_apply_failure_is_apply_error() {
        let warehouse = MockWarehouse {
            fail_contains: Some("REFUSE"),
            ..MockWarehouse::new()
        };
        let applier = SqlApplier::new(warehouse.clone(), vars(), false);

        let err = applier.apply("tables", "REFUSE ME").await.unwrap_err();
        assert!(matches!(
            err,
            EtlError::ApplyError { ref statement, .. } if statement == "tables"
        ));
    }

    #[tokio::test]
    async fn test_load_passes_table_and_data_through() {
        let warehouse = MockWarehouse::new();
        let applier = SqlApplier::new(warehouse.clone(), vars(), false);

        applier.load("stg_sales", b"SaleID\nS1\n", 1).await.unwrap();

        assert_eq!(warehouse.ops().await, vec!["load:stg_sales:10"]);
    }
}
