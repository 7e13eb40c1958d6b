/// テスト用のインメモリPostgreSQLカタログ
///
/// エンジンが生成するDDLとイントロスペクションクエリだけを解釈する Executor 実装。
/// デフォルト式はPostgreSQLと同じ形に正規化して保持します（`'{}'::text`, `5`, `now()`）。
/// 接続は1本だけで、文ごとに制御を戻すため並行する呼び出しは文単位で交互に実行されます。
#[allow(dead_code)]
pub mod fake_postgres {
    use async_trait::async_trait;
    use regex::Regex;
    use std::collections::BTreeMap;
    use std::sync::{LazyLock, Mutex};
    use stratum_reconcile::adapters::executor::{Executor, ExecutorSession, Row};
    use stratum_reconcile::core::error::DatabaseError;

    static DROP_TABLE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r#"^DROP TABLE IF EXISTS "([^"]+)"\."([^"]+)"$"#).unwrap());
    static CREATE_TABLE: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(r#"(?s)^CREATE TABLE "([^"]+)"\."([^"]+)" \(\n(.*)\n\)$"#).unwrap()
    });
    static ALTER_TABLE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r#"(?s)^ALTER TABLE "([^"]+)"\."([^"]+)" (.+)$"#).unwrap());
    static COLUMN_DEF: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(r#"^"([^"]+)" (.+?)( NOT NULL)?(?: DEFAULT (.+))?$"#).unwrap()
    });
    static ALTER_COLUMN: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r#"^ALTER COLUMN "([^"]+)" (.+)$"#).unwrap());
    static QUOTED: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"^'((?:[^']|'')*)'(?:::(.+))?$").unwrap());
    static NUMBER: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"^-?(?:\d+\.?\d*|\.\d+)$").unwrap());
    static FUNCTION_CALL: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"^([A-Za-z_][A-Za-z0-9_]*)\((.*)\)$").unwrap());
    static TIMESTAMP: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}([ T]\d{2}:\d{2}(:\d{2})?)?").unwrap());

    /// カタログ上のカラム
    #[derive(Debug, Clone, PartialEq)]
    pub struct FakeColumn {
        pub name: String,
        pub data_type: String,
        pub char_max_length: Option<u32>,
        pub numeric_precision: Option<u32>,
        pub numeric_scale: Option<u32>,
        pub nullable: bool,
        pub default: Option<String>,
    }

    type Catalog = BTreeMap<(String, String), Vec<FakeColumn>>;

    #[derive(Default)]
    struct FakeState {
        catalog: Catalog,
        snapshot: Option<Catalog>,
        log: Vec<String>,
        fail_on: Option<String>,
    }

    /// インメモリPostgreSQL
    #[derive(Default)]
    pub struct FakePostgres {
        state: Mutex<FakeState>,
        connection: tokio::sync::Mutex<()>,
    }

    impl FakePostgres {
        pub fn new() -> Self {
            Self::default()
        }

        /// 実行されたすべての文
        pub fn log(&self) -> Vec<String> {
            self.state.lock().unwrap().log.clone()
        }

        /// 実行されたDDL文（問い合わせとトランザクション制御を除く）
        pub fn ddl_log(&self) -> Vec<String> {
            self.log()
                .into_iter()
                .filter(|sql| {
                    let sql = sql.trim_start();
                    !sql.starts_with("SELECT")
                        && !matches!(sql, "BEGIN" | "COMMIT" | "ROLLBACK")
                })
                .collect()
        }

        pub fn clear_log(&self) {
            self.state.lock().unwrap().log.clear();
        }

        /// 指定文字列を含む次の文を失敗させる
        pub fn fail_next_matching(&self, needle: &str) {
            self.state.lock().unwrap().fail_on = Some(needle.to_string());
        }

        /// テーブルのカラム
        pub fn table(&self, schema: &str, table: &str) -> Option<Vec<FakeColumn>> {
            self.state
                .lock()
                .unwrap()
                .catalog
                .get(&(schema.to_string(), table.to_string()))
                .cloned()
        }

        /// カラムのデフォルト式
        pub fn column_default(&self, table: &str, column: &str) -> Option<String> {
            self.table("public", table)?
                .into_iter()
                .find(|c| c.name == column)?
                .default
        }

        /// カタログへ直接テーブルを作成（ライブ状態の準備用）
        pub fn seed_table(&self, schema: &str, table: &str, columns: Vec<FakeColumn>) {
            self.state
                .lock()
                .unwrap()
                .catalog
                .insert((schema.to_string(), table.to_string()), columns);
        }

        /// 状態をロックして1文を実行
        fn run_locked(&self, sql: &str, params: &[String]) -> Result<Vec<Row>, DatabaseError> {
            let mut state = self.state.lock().unwrap();
            state.log.push(sql.trim().to_string());

            if let Some(needle) = state.fail_on.clone() {
                if sql.contains(&needle) {
                    state.fail_on = None;
                    return Err(error("injected failure".to_string(), "XX000"));
                }
            }

            self.run(&mut state, sql, params)
        }

        fn run(&self, state: &mut FakeState, sql: &str, params: &[String]) -> Result<Vec<Row>, DatabaseError> {
            let trimmed = sql.trim();

            if trimmed.contains("information_schema.tables") {
                let key = (param(params, 0), param(params, 1));
                return Ok(match state.catalog.get(&key) {
                    Some(_) => vec![Row::from_pairs(vec![("table_name", Some(key.1))])],
                    None => vec![],
                });
            }
            if trimmed.contains("information_schema.columns") {
                let key = (param(params, 0), param(params, 1));
                return Ok(state
                    .catalog
                    .get(&key)
                    .map(|columns| columns.iter().map(column_row).collect())
                    .unwrap_or_default());
            }

            match trimmed {
                "SELECT 1" => return Ok(vec![Row::from_pairs(vec![("?column?", Some("1".to_string()))])]),
                "BEGIN" => {
                    state.snapshot = Some(state.catalog.clone());
                    return Ok(vec![]);
                }
                "COMMIT" => {
                    state.snapshot = None;
                    return Ok(vec![]);
                }
                "ROLLBACK" => {
                    if let Some(snapshot) = state.snapshot.take() {
                        state.catalog = snapshot;
                    }
                    return Ok(vec![]);
                }
                _ => {}
            }

            if let Some(caps) = DROP_TABLE.captures(trimmed) {
                state.catalog.remove(&(caps[1].to_string(), caps[2].to_string()));
                return Ok(vec![]);
            }

            if let Some(caps) = CREATE_TABLE.captures(trimmed) {
                let key = (caps[1].to_string(), caps[2].to_string());
                if state.catalog.contains_key(&key) {
                    return Err(error(
                        format!("relation \"{}\" already exists", key.1),
                        "42P07",
                    ));
                }
                let mut columns = Vec::new();
                for line in caps[3].split(",\n") {
                    let line = line.trim();
                    if line.starts_with("PRIMARY KEY") {
                        continue;
                    }
                    columns.push(parse_column(&key.1, line)?);
                }
                state.catalog.insert(key, columns);
                return Ok(vec![]);
            }

            if let Some(caps) = ALTER_TABLE.captures(trimmed) {
                let key = (caps[1].to_string(), caps[2].to_string());
                let action = caps[3].to_string();
                let table = key.1.clone();
                let columns = state.catalog.get_mut(&key).ok_or_else(|| {
                    error(format!("relation \"{}\" does not exist", table), "42P01")
                })?;
                return alter_table(&table, columns, &action).map(|_| vec![]);
            }

            Err(error(format!("syntax error at or near \"{}\"", trimmed), "42601"))
        }
    }

    #[async_trait]
    impl Executor for FakePostgres {
        async fn execute(&self, sql: &str, params: &[String]) -> Result<Vec<Row>, DatabaseError> {
            let _connection = self.connection.lock().await;
            // ネットワーク往復の代わり
            tokio::task::yield_now().await;
            self.run_locked(sql, params)
        }

        async fn session<'a>(&'a self) -> Result<Box<dyn ExecutorSession + 'a>, DatabaseError> {
            let connection = self.connection.lock().await;
            Ok(Box::new(FakeSession {
                db: self,
                _connection: connection,
            }))
        }
    }

    /// 接続を専有したセッション
    struct FakeSession<'a> {
        db: &'a FakePostgres,
        _connection: tokio::sync::MutexGuard<'a, ()>,
    }

    #[async_trait]
    impl ExecutorSession for FakeSession<'_> {
        async fn execute(&mut self, sql: &str, params: &[String]) -> Result<Vec<Row>, DatabaseError> {
            tokio::task::yield_now().await;
            self.db.run_locked(sql, params)
        }
    }

    fn param(params: &[String], index: usize) -> String {
        params.get(index).cloned().unwrap_or_default()
    }

    fn error(message: String, code: &str) -> DatabaseError {
        DatabaseError::Query {
            message,
            sql: None,
            code: Some(code.to_string()),
        }
    }

    fn column_row(column: &FakeColumn) -> Row {
        let udt = match column.data_type.as_str() {
            "integer" => "int4",
            "bigint" => "int8",
            "character varying" => "varchar",
            "timestamp with time zone" => "timestamptz",
            "boolean" => "bool",
            other => other,
        };
        Row::from_pairs(vec![
            ("column_name", Some(column.name.clone())),
            ("data_type", Some(column.data_type.clone())),
            (
                "is_nullable",
                Some(if column.nullable { "YES" } else { "NO" }.to_string()),
            ),
            ("column_default", column.default.clone()),
            (
                "character_maximum_length",
                column.char_max_length.map(|v| v.to_string()),
            ),
            (
                "numeric_precision",
                column.numeric_precision.map(|v| v.to_string()),
            ),
            ("numeric_scale", column.numeric_scale.map(|v| v.to_string())),
            ("udt_name", Some(udt.to_string())),
            ("datetime_precision", None),
        ])
    }

    /// DDL上の型をinformation_schemaの表現へ変換
    fn live_type(ddl_type: &str) -> (String, Option<u32>, Option<u32>, Option<u32>, bool) {
        let lower = ddl_type.trim().to_lowercase();
        let (base, args) = match lower.find('(') {
            Some(open) if lower.ends_with(')') => (
                lower[..open].trim().to_string(),
                lower[open + 1..lower.len() - 1]
                    .split(',')
                    .filter_map(|a| a.trim().parse::<u32>().ok())
                    .collect::<Vec<_>>(),
            ),
            _ => (lower.clone(), vec![]),
        };

        match base.as_str() {
            "serial" => ("integer".to_string(), None, None, None, true),
            "int" | "int4" | "integer" => ("integer".to_string(), None, None, None, false),
            "int8" | "bigint" => ("bigint".to_string(), None, None, None, false),
            "bool" | "boolean" => ("boolean".to_string(), None, None, None, false),
            "timestamptz" => ("timestamp with time zone".to_string(), None, None, None, false),
            "varchar" | "character varying" => (
                "character varying".to_string(),
                args.first().copied(),
                None,
                None,
                false,
            ),
            "numeric" | "decimal" => (
                "numeric".to_string(),
                None,
                args.first().copied(),
                args.get(1).copied(),
                false,
            ),
            other => (other.to_string(), None, None, None, false),
        }
    }

    fn parse_column(table: &str, definition: &str) -> Result<FakeColumn, DatabaseError> {
        let caps = COLUMN_DEF
            .captures(definition)
            .ok_or_else(|| error(format!("syntax error in \"{}\"", definition), "42601"))?;
        let name = caps[1].to_string();
        let (data_type, char_max_length, numeric_precision, numeric_scale, serial) =
            live_type(&caps[2]);

        let mut column = FakeColumn {
            name: name.clone(),
            data_type,
            char_max_length,
            numeric_precision,
            numeric_scale,
            nullable: caps.get(3).is_none() && !serial,
            default: None,
        };

        if serial {
            column.default = Some(format!("nextval('{}_{}_seq'::regclass)", table, name));
        } else if let Some(expression) = caps.get(4) {
            column.default = Some(normalize_default(&column, expression.as_str())?);
        }

        Ok(column)
    }

    fn alter_table(
        table: &str,
        columns: &mut Vec<FakeColumn>,
        action: &str,
    ) -> Result<(), DatabaseError> {
        if let Some(definition) = action.strip_prefix("ADD COLUMN ") {
            let column = parse_column(table, definition)?;
            if columns.iter().any(|c| c.name == column.name) {
                return Err(error(
                    format!("column \"{}\" of relation \"{}\" already exists", column.name, table),
                    "42701",
                ));
            }
            columns.push(column);
            return Ok(());
        }

        if let Some(rest) = action.strip_prefix("DROP COLUMN ") {
            let name = rest.trim_matches('"');
            let before = columns.len();
            columns.retain(|c| c.name != name);
            if columns.len() == before {
                return Err(missing_column(table, name));
            }
            return Ok(());
        }

        let caps = ALTER_COLUMN
            .captures(action)
            .ok_or_else(|| error(format!("syntax error in \"{}\"", action), "42601"))?;
        let name = caps[1].to_string();
        let operation = caps[2].to_string();
        let column = columns
            .iter_mut()
            .find(|c| c.name == name)
            .ok_or_else(|| missing_column(table, &name))?;

        if let Some(expression) = operation.strip_prefix("SET DEFAULT ") {
            column.default = Some(normalize_default(column, expression)?);
        } else if operation == "DROP DEFAULT" {
            column.default = None;
        } else if operation == "SET NOT NULL" {
            column.nullable = false;
        } else if operation == "DROP NOT NULL" {
            column.nullable = true;
        } else if let Some(rest) = operation.strip_prefix("TYPE ") {
            let ddl_type = rest.split(" USING ").next().unwrap_or(rest);
            let (data_type, char_max_length, numeric_precision, numeric_scale, _) =
                live_type(ddl_type);
            column.data_type = data_type;
            column.char_max_length = char_max_length;
            column.numeric_precision = numeric_precision;
            column.numeric_scale = numeric_scale;
        } else {
            return Err(error(format!("syntax error in \"{}\"", operation), "42601"));
        }

        Ok(())
    }

    fn missing_column(table: &str, column: &str) -> DatabaseError {
        error(
            format!("column \"{}\" of relation \"{}\" does not exist", column, table),
            "42703",
        )
    }

    /// デフォルト式をPostgreSQLが保持する形へ正規化
    fn normalize_default(column: &FakeColumn, expression: &str) -> Result<String, DatabaseError> {
        let expression = expression.trim();
        let data_type = column.data_type.as_str();
        let is_text = matches!(data_type, "text" | "character varying" | "character");
        let is_number = matches!(data_type, "integer" | "bigint" | "numeric");

        let mismatch = |kind: &str| {
            error(
                format!(
                    "column \"{}\" is of type {} but default expression is of type {}",
                    column.name, data_type, kind
                ),
                "42804",
            )
        };
        let invalid_input = |value: &str| {
            error(
                format!("invalid input syntax for type {}: \"{}\"", data_type, value),
                if data_type == "timestamp with time zone" {
                    "22007"
                } else {
                    "22P02"
                },
            )
        };

        if let Some(caps) = QUOTED.captures(expression) {
            let raw = caps[1].to_string();
            let value = raw.replace("''", "'");
            return if is_text {
                let cast = if data_type == "character" {
                    "bpchar"
                } else {
                    data_type
                };
                Ok(format!("'{}'::{}", raw, cast))
            } else if is_number {
                let n: f64 = value.parse().map_err(|_| invalid_input(&value))?;
                Ok(number_default(n, data_type))
            } else if data_type == "boolean" {
                match value.to_lowercase().as_str() {
                    "true" | "t" => Ok("true".to_string()),
                    "false" | "f" => Ok("false".to_string()),
                    _ => Err(invalid_input(&value)),
                }
            } else if data_type == "timestamp with time zone" {
                if TIMESTAMP.is_match(&value) {
                    Ok(format!("'{}'::timestamp with time zone", raw))
                } else {
                    Err(invalid_input(&value))
                }
            } else {
                Ok(format!("'{}'::{}", raw, data_type))
            };
        }

        if NUMBER.is_match(expression) {
            return if is_number {
                let n: f64 = expression.parse().map_err(|_| invalid_input(expression))?;
                Ok(number_default(n, data_type))
            } else if is_text {
                Ok(format!("'{}'::{}", expression, data_type))
            } else {
                Err(mismatch("integer"))
            };
        }

        if expression.eq_ignore_ascii_case("true") || expression.eq_ignore_ascii_case("false") {
            return if data_type == "boolean" {
                Ok(expression.to_lowercase())
            } else {
                Err(mismatch("boolean"))
            };
        }

        if let Some(caps) = FUNCTION_CALL.captures(expression) {
            return Ok(format!("{}({})", caps[1].to_lowercase(), &caps[2]));
        }

        Err(error(
            format!("syntax error at or near \"{}\"", expression),
            "42601",
        ))
    }

    /// 数値デフォルトの表示（負の整数はキャスト付き）
    fn number_default(n: f64, data_type: &str) -> String {
        let text = if n.fract() == 0.0 {
            format!("{}", n as i64)
        } else {
            format!("{}", n)
        };
        if n < 0.0 {
            format!("'{}'::{}", text, data_type)
        } else {
            text
        }
    }
}
