// SQLクォートユーティリティ
//
// PostgreSQL用の識別子クォートと文字列リテラルのエスケープを提供します。
// sql_generatorとdefault_codecの両方から使用される共有モジュールです。

/// PostgreSQL用識別子クォート（ダブルクォート）
///
/// 識別子内のダブルクォートは二重にエスケープします。
///
/// # Examples
/// ```
/// use stratum_reconcile::adapters::sql_quote::quote_identifier;
/// assert_eq!(quote_identifier("users"), r#""users""#);
/// assert_eq!(quote_identifier(r#"table"name"#), r#""table""name""#);
/// ```
pub fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// スキーマ修飾付きのテーブル名
pub fn qualified_table(schema: &str, table: &str) -> String {
    format!("{}.{}", quote_identifier(schema), quote_identifier(table))
}

/// 文字列リテラルのクォート（シングルクォート）
///
/// # Examples
/// ```
/// use stratum_reconcile::adapters::sql_quote::quote_literal;
/// assert_eq!(quote_literal("{}"), "'{}'");
/// assert_eq!(quote_literal("it's"), "'it''s'");
/// ```
pub fn quote_literal(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

/// クォート済み文字列リテラルを元に戻す
///
/// `'...'` の形式でない場合はNoneを返します。
pub fn unquote_literal(quoted: &str) -> Option<String> {
    let inner = quoted.strip_prefix('\'')?.strip_suffix('\'')?;

    // 内部の単独シングルクォートは不正（'' のペアのみ許可）
    let mut chars = inner.chars().peekable();
    let mut value = String::with_capacity(inner.len());
    while let Some(c) = chars.next() {
        if c == '\'' {
            if chars.peek() == Some(&'\'') {
                chars.next();
            } else {
                return None;
            }
        }
        value.push(c);
    }
    Some(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quote_identifier() {
        assert_eq!(quote_identifier("simpleemployee"), "\"simpleemployee\"");
        assert_eq!(quote_identifier("a\"b"), "\"a\"\"b\"");
    }

    #[test]
    fn test_qualified_table() {
        assert_eq!(
            qualified_table("public", "simpleemployee"),
            "\"public\".\"simpleemployee\""
        );
    }

    #[test]
    fn test_quote_and_unquote_literal() {
        assert_eq!(quote_literal("{}"), "'{}'");
        assert_eq!(quote_literal("O'Brien"), "'O''Brien'");
        assert_eq!(unquote_literal("'O''Brien'").as_deref(), Some("O'Brien"));
        assert_eq!(unquote_literal("''").as_deref(), Some(""));
    }

    #[test]
    fn test_unquote_rejects_unbalanced() {
        assert_eq!(unquote_literal("now()"), None);
        assert_eq!(unquote_literal("'a'b'"), None);
        assert_eq!(unquote_literal("'"), None);
    }
}
