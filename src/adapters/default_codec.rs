// デフォルト値コーデック
//
// 論理デフォルト値（リテラル・生の式・なし）と、バックエンドが保持する
// カラムデフォルトのテキスト表現との相互変換を行います。
// 方言固有の正規化（`'...'::text` キャストなど）はこのモジュールに閉じ込めます。

use crate::adapters::sql_quote::{quote_literal, unquote_literal};
use crate::adapters::type_mapping::{PostgresTypeMapper, TypeMapper};
use crate::core::model::{DefaultValue, FieldSpec, Scalar};
use crate::core::schema::LogicalDefault;
use regex::Regex;
use std::sync::LazyLock;

/// `'<literal>'::<type>` 形式（PostgreSQLが文字列デフォルトを正規化した形）
static CAST_LITERAL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^('(?:[^']|'')*')::([A-Za-z_][A-Za-z0-9_ ]*(?:\(\d+(?:,\s*\d+)?\))?(?:\[\])?)$")
        .expect("cast literal regex is valid")
});

/// 数値リテラル
static NUMBER_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^-?(?:\d+\.?\d*|\.\d+)(?:[eE][-+]?\d+)?$").expect("number regex is valid")
});

/// デフォルト値コーデック
///
/// 新しいバックエンドを追加する場合はこのトレイトを実装します。差分検出器は変更不要です。
pub trait DefaultCodec: Send + Sync {
    /// フィールドのデフォルトをバックエンドのテキスト表現へエンコード
    ///
    /// デフォルトがない場合はNone（DEFAULT句なし、既存のデフォルトは削除対象）。
    /// 生の式は検証せずそのまま返します。
    fn encode(&self, field: &FieldSpec, column_type: &str) -> Option<String>;

    /// バックエンドのデフォルトテキストを論理値へデコード
    fn decode(&self, default_text: &str) -> LogicalDefault;

    /// 望ましいデフォルトとライブのデフォルトが一致するか
    fn matches(&self, field: &FieldSpec, column_type: &str, live: Option<&str>) -> bool;
}

/// PostgreSQL用デフォルト値コーデック
#[derive(Debug, Clone, Copy, Default)]
pub struct PostgresDefaultCodec {
    types: PostgresTypeMapper,
}

impl PostgresDefaultCodec {
    /// 新しいPostgresDefaultCodecを作成
    pub fn new() -> Self {
        Self {
            types: PostgresTypeMapper,
        }
    }

    /// スカラーをリテラル構文でエンコード
    fn encode_scalar(&self, scalar: &Scalar, column_type: &str) -> String {
        match scalar {
            Scalar::Number(n) => format_number(*n),
            Scalar::Boolean(b) => b.to_string(),
            Scalar::Text(s) => format!(
                "{}::{}",
                quote_literal(s),
                self.types.literal_cast_type(column_type)
            ),
        }
    }
}

impl DefaultCodec for PostgresDefaultCodec {
    fn encode(&self, field: &FieldSpec, column_type: &str) -> Option<String> {
        match &field.default {
            DefaultValue::None => None,
            DefaultValue::Expression(expression) => Some(expression.clone()),
            DefaultValue::Literal(scalar) => Some(self.encode_scalar(scalar, column_type)),
        }
    }

    fn decode(&self, default_text: &str) -> LogicalDefault {
        let trimmed = default_text.trim();

        if let Some(captures) = CAST_LITERAL_REGEX.captures(trimmed) {
            if let Some(value) = unquote_literal(&captures[1]) {
                let cast = &captures[2];
                if self.types.is_numeric_type(cast) {
                    if let Ok(n) = value.parse::<f64>() {
                        return LogicalDefault::Number(n);
                    }
                }
                if self.types.canonical_type(cast) == "boolean" {
                    if let Some(b) = parse_bool(&value) {
                        return LogicalDefault::Boolean(b);
                    }
                }
                return LogicalDefault::Text(value);
            }
        }

        if NUMBER_REGEX.is_match(trimmed) {
            if let Ok(n) = trimmed.parse::<f64>() {
                return LogicalDefault::Number(n);
            }
        }

        if let Some(b) = parse_bool(trimmed) {
            return LogicalDefault::Boolean(b);
        }

        if let Some(value) = unquote_literal(trimmed) {
            return LogicalDefault::Text(value);
        }

        LogicalDefault::Expression(trimmed.to_string())
    }

    fn matches(&self, field: &FieldSpec, column_type: &str, live: Option<&str>) -> bool {
        match (&field.default, live) {
            (DefaultValue::None, None) => true,
            (DefaultValue::None, Some(_)) | (_, None) => false,
            (DefaultValue::Expression(expression), Some(live)) => {
                if normalize_expression(expression) == normalize_expression(live) {
                    return true;
                }
                let desired = self.decode(expression);
                let actual = self.decode(live);
                desired.is_scalar() && actual.is_scalar() && logical_equivalent(&desired, &actual)
            }
            (DefaultValue::Literal(_), Some(live)) => {
                let Some(encoded) = self.encode(field, column_type) else {
                    return false;
                };
                logical_equivalent(&self.decode(&encoded), &self.decode(live))
            }
        }
    }
}

/// 数値の正規10進表記
///
/// 整数値は小数点なし（`5`）、それ以外はRustの最短表記（`2.5`）。
pub fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

fn parse_bool(text: &str) -> Option<bool> {
    if text.eq_ignore_ascii_case("true") {
        Some(true)
    } else if text.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}

/// 式比較用の正規化（空白の圧縮と小文字化）
fn normalize_expression(expression: &str) -> String {
    expression
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// 論理値として同じかどうか
///
/// テキスト型カラムに数値リテラルを与えた場合のように、
/// バックエンドが型を変えて保持したケースも同値とみなします。
fn logical_equivalent(desired: &LogicalDefault, actual: &LogicalDefault) -> bool {
    match (desired, actual) {
        (LogicalDefault::Number(a), LogicalDefault::Number(b)) => a == b,
        (LogicalDefault::Text(a), LogicalDefault::Text(b)) => a == b,
        (LogicalDefault::Boolean(a), LogicalDefault::Boolean(b)) => a == b,
        (LogicalDefault::Number(n), LogicalDefault::Text(t))
        | (LogicalDefault::Text(t), LogicalDefault::Number(n)) => {
            t.trim().parse::<f64>().map(|v| v == *n).unwrap_or(false)
        }
        (LogicalDefault::Boolean(b), LogicalDefault::Text(t))
        | (LogicalDefault::Text(t), LogicalDefault::Boolean(b)) => parse_bool(t) == Some(*b),
        (LogicalDefault::Expression(a), LogicalDefault::Expression(b)) => {
            normalize_expression(a) == normalize_expression(b)
        }
        _ => false,
    }
}
