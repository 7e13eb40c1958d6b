// 型マッピング
//
// 論理型とPostgreSQLのカラム型の相互変換、および型文字列の正規化を行います。
// 差分検出では正規化済みの型文字列同士を比較します。

use crate::core::model::{FieldSpec, FieldType};
use regex::Regex;
use std::sync::LazyLock;

/// 日時型の既定の秒精度（PostgreSQLはこの値のとき精度を表示しない）
const DEFAULT_DATETIME_PRECISION: u32 = 6;

/// `timestamp(3) with time zone` / `timestamptz` / `time` などの日時型
static DATETIME_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(timestamptz|timestamp|timetz|time)(?: ?\((\d+)\))?(?: (with|without) time zone)?$")
        .expect("datetime regex is valid")
});

/// 型マッパー
pub trait TypeMapper: Send + Sync {
    /// フィールド定義からDDL用の型文字列を生成
    fn format_sql_type(&self, field: &FieldSpec) -> String;

    /// ライブDBの型文字列から論理型を推定
    fn parse_sql_type(&self, data_type: &str) -> Option<FieldType>;

    /// 比較用に型文字列を正規化
    fn canonical_type(&self, sql_type: &str) -> String;
}

/// information_schema.columns から取得した型メタデータ
#[derive(Debug, Clone, Default)]
pub struct TypeMetadata {
    /// 文字型の最大長
    pub char_max_length: Option<u32>,
    /// 数値型の精度
    pub numeric_precision: Option<u32>,
    /// 数値型のスケール
    pub numeric_scale: Option<u32>,
    /// 日時型の秒精度
    pub datetime_precision: Option<u32>,
    /// ユーザー定義型名
    pub udt_name: Option<String>,
}

/// PostgreSQL用型マッパー
#[derive(Debug, Clone, Copy, Default)]
pub struct PostgresTypeMapper;

impl PostgresTypeMapper {
    /// information_schema の data_type とメタデータから正規化済みの型文字列を組み立てる
    pub fn describe_live_type(&self, data_type: &str, metadata: &TypeMetadata) -> String {
        match data_type {
            "character varying" | "character" => match metadata.char_max_length {
                Some(length) => format!("{}({})", data_type, length),
                None => data_type.to_string(),
            },
            "numeric" => match (metadata.numeric_precision, metadata.numeric_scale) {
                (Some(precision), Some(scale)) => format!("numeric({},{})", precision, scale),
                (Some(precision), None) => format!("numeric({})", precision),
                _ => "numeric".to_string(),
            },
            "timestamp without time zone"
            | "timestamp with time zone"
            | "time without time zone"
            | "time with time zone" => match (metadata.datetime_precision, data_type.split_once(' ')) {
                (Some(precision), Some((base, zone))) if precision != DEFAULT_DATETIME_PRECISION => {
                    format!("{}({}) {}", base, precision, zone)
                }
                _ => data_type.to_string(),
            },
            // 配列の udt_name は要素型に `_` を付けた名前（_text, _int4）
            "ARRAY" => match metadata.udt_name.as_deref() {
                Some(udt) => format!("{}[]", udt.strip_prefix('_').unwrap_or(udt)),
                None => data_type.to_string(),
            },
            "USER-DEFINED" => metadata
                .udt_name
                .clone()
                .unwrap_or_else(|| data_type.to_string()),
            other => other.to_string(),
        }
    }

    /// 2つの型文字列が同じ型を指すか
    pub fn types_match(&self, desired: &str, live: &str) -> bool {
        self.canonical_type(desired) == self.canonical_type(live)
    }

    /// 文字列リテラルのキャスト先として表示される型名
    ///
    /// PostgreSQLは長さ修飾子を落として表示します（`'x'::character varying`）。
    pub fn literal_cast_type(&self, sql_type: &str) -> String {
        let canonical = self.canonical_type(sql_type);
        let (base, _) = split_type_args(&canonical);
        match base {
            "character" => "bpchar".to_string(),
            other => other.to_string(),
        }
    }

    /// 数値型かどうか
    pub fn is_numeric_type(&self, sql_type: &str) -> bool {
        let canonical = self.canonical_type(sql_type);
        let (base, _) = split_type_args(&canonical);
        matches!(
            base,
            "integer" | "smallint" | "bigint" | "numeric" | "real" | "double precision"
        )
    }
}

impl TypeMapper for PostgresTypeMapper {
    fn format_sql_type(&self, field: &FieldSpec) -> String {
        if field.is_generated_id() {
            return "SERIAL".to_string();
        }
        if let Some(data_type) = &field.data_type {
            return data_type.clone();
        }

        match field.field_type {
            FieldType::String => "text".to_string(),
            FieldType::Number => "integer".to_string(),
            FieldType::Boolean => "boolean".to_string(),
            FieldType::Date => "timestamp with time zone".to_string(),
            FieldType::Json => "jsonb".to_string(),
            FieldType::Any => "text".to_string(),
        }
    }

    fn parse_sql_type(&self, data_type: &str) -> Option<FieldType> {
        let canonical = self.canonical_type(data_type);
        if canonical.ends_with("[]") {
            return None;
        }
        if DATETIME_REGEX.is_match(&canonical) {
            return Some(FieldType::Date);
        }
        let (base, _) = split_type_args(&canonical);
        match base {
            "integer" | "smallint" | "bigint" | "numeric" | "real" | "double precision" => {
                Some(FieldType::Number)
            }
            "text" | "character varying" | "character" | "bpchar" | "uuid" => {
                Some(FieldType::String)
            }
            "boolean" => Some(FieldType::Boolean),
            "date" => Some(FieldType::Date),
            "json" | "jsonb" => Some(FieldType::Json),
            _ => None,
        }
    }

    fn canonical_type(&self, sql_type: &str) -> String {
        let normalized = sql_type
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
            .to_lowercase();

        if let Some(element) = normalized.strip_suffix("[]") {
            return format!("{}[]", self.canonical_type(element));
        }
        if let Some(datetime) = canonical_datetime(&normalized) {
            return datetime;
        }

        let (base, args) = split_type_args(&normalized);

        // float(p) は精度24以下なら real、それ以外は double precision
        if base == "float" {
            let single = args
                .and_then(|a| a.trim().parse::<u32>().ok())
                .is_some_and(|p| p <= 24);
            let resolved = if single { "real" } else { "double precision" };
            return resolved.to_string();
        }

        let base = match base {
            "int" | "int4" | "integer" | "serial" | "serial4" => "integer",
            "int2" | "smallint" | "smallserial" | "serial2" => "smallint",
            "int8" | "bigint" | "bigserial" | "serial8" => "bigint",
            "float8" | "double precision" => "double precision",
            "float4" | "real" => "real",
            "bool" | "boolean" => "boolean",
            "varchar" | "character varying" => "character varying",
            "char" | "character" => "character",
            "bpchar" if args.is_some() => "character",
            "decimal" | "numeric" => "numeric",
            other => other,
        };

        match args {
            Some(args) => {
                let args = args
                    .split(',')
                    .map(|a| a.trim())
                    .collect::<Vec<_>>()
                    .join(",");
                format!("{}({})", base, args)
            }
            // 長さ指定のない char は character(1)
            None if base == "character" => "character(1)".to_string(),
            None => base.to_string(),
        }
    }
}

/// 日時型を `timestamp[(p)] with|without time zone` 形式へ正規化
///
/// 既定精度（6）は省略形と同じ型として扱います。
fn canonical_datetime(normalized: &str) -> Option<String> {
    let captures = DATETIME_REGEX.captures(normalized)?;
    let (base, zone_alias) = match &captures[1] {
        "timestamptz" => ("timestamp", true),
        "timetz" => ("time", true),
        "timestamp" => ("timestamp", false),
        _ => ("time", false),
    };
    let with_zone = zone_alias || captures.get(3).is_some_and(|m| m.as_str() == "with");
    let zone = if with_zone {
        "with time zone"
    } else {
        "without time zone"
    };

    let precision = captures
        .get(2)
        .and_then(|m| m.as_str().parse::<u32>().ok())
        .filter(|p| *p != DEFAULT_DATETIME_PRECISION);

    Some(match precision {
        Some(precision) => format!("{}({}) {}", base, precision, zone),
        None => format!("{} {}", base, zone),
    })
}

/// `base(args)` を分割する
fn split_type_args(sql_type: &str) -> (&str, Option<&str>) {
    match sql_type.find('(') {
        Some(open) if sql_type.ends_with(')') => (
            sql_type[..open].trim_end(),
            Some(&sql_type[open + 1..sql_type.len() - 1]),
        ),
        _ => (sql_type, None),
    }
}
