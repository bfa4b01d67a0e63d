//! LDAP 搜索过滤器的构建与（开发目录用的）简单解析

/// RFC 4515 转义
pub fn escape(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '*' => escaped.push_str("\\2a"),
            '(' => escaped.push_str("\\28"),
            ')' => escaped.push_str("\\29"),
            '\\' => escaped.push_str("\\5c"),
            '\0' => escaped.push_str("\\00"),
            _ => escaped.push(c),
        }
    }
    escaped
}

pub fn unescape(value: &str) -> Option<String> {
    let mut bytes = Vec::with_capacity(value.len());
    let mut rest = value.as_bytes();
    while let Some((&b, tail)) = rest.split_first() {
        if b == b'\\' {
            let hex = tail.get(..2)?;
            let hex = std::str::from_utf8(hex).ok()?;
            bytes.push(u8::from_str_radix(hex, 16).ok()?);
            rest = &tail[2..];
        } else {
            bytes.push(b);
            rest = tail;
        }
    }
    String::from_utf8(bytes).ok()
}

/// `(&(objectClass=person)(<attribute>=<value>))`
pub fn person_filter(attribute: &str, value: &str) -> String {
    format!("(&(objectClass=person)({attribute}={}))", escape(value))
}

/// 解析由等值条件组成的合取过滤器，如 `(&(a=b)(c=d))` 或 `(a=b)`
pub fn parse_conjunction(filter: &str) -> Option<Vec<(String, String)>> {
    let filter = filter.trim();
    let inner = filter.strip_prefix('(')?.strip_suffix(')')?;

    let Some(terms) = inner.strip_prefix('&') else {
        return parse_equality(inner).map(|term| vec![term]);
    };

    let mut parsed = Vec::new();
    let mut rest = terms;
    while !rest.is_empty() {
        let body = rest.strip_prefix('(')?;
        let end = body.find(')')?;
        parsed.push(parse_equality(&body[..end])?);
        rest = &body[end + 1..];
    }
    Some(parsed)
}

fn parse_equality(term: &str) -> Option<(String, String)> {
    let (attribute, value) = term.split_once('=')?;
    if attribute.is_empty() || attribute.contains(['(', ')', '&', '|', '!']) {
        return None;
    }
    Some((attribute.to_string(), unescape(value)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_special_characters() {
        assert_eq!(escape("a*(b)\\c"), "a\\2a\\28b\\29\\5cc");
        assert_eq!(escape("jdoe"), "jdoe");
    }

    #[test]
    fn person_filter_round_trips_through_parser() {
        let filter = person_filter("sAMAccountName", "j*doe");
        assert_eq!(filter, "(&(objectClass=person)(sAMAccountName=j\\2adoe))");
        assert_eq!(
            parse_conjunction(&filter),
            Some(vec![
                ("objectClass".to_string(), "person".to_string()),
                ("sAMAccountName".to_string(), "j*doe".to_string()),
            ])
        );
    }

    #[test]
    fn parses_single_equality() {
        assert_eq!(
            parse_conjunction("(cn=John)"),
            Some(vec![("cn".to_string(), "John".to_string())])
        );
    }

    #[test]
    fn rejects_unsupported_filters() {
        assert!(parse_conjunction("(|(a=b)(c=d))").is_none());
        assert!(parse_conjunction("a=b").is_none());
        assert!(parse_conjunction("(&(a=b)").is_none());
        assert!(parse_conjunction("(a=\\zz)").is_none());
    }
}
