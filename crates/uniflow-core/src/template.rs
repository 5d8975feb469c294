// ── Request templates ──
//
// Catalog entries are written in the controller node's textual format:
// URLs like `=/api/s/{{ $parameter.siteId }}/stat/sta` and body strings
// like `={{ $parameter.vlan || "" }}`. That text is parsed exactly once,
// when the catalog is built, into the closed types below. Resolving a
// template against parameter values is then a pure structural walk.

use std::fmt;

use serde_json::{Map, Number, Value};
use thiserror::Error;

/// Why a template string could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateError {
    #[error("unclosed placeholder starting at byte {offset}")]
    Unclosed { offset: usize },

    #[error("unsupported placeholder expression: {expr}")]
    Unsupported { expr: String },
}

/// Source of parameter values for one invocation.
///
/// `None` means "unbound"; the resolver then falls back to the
/// placeholder's own default, or to an empty string.
pub trait ParamLookup {
    fn lookup(&self, name: &str) -> Option<Value>;
}

impl<F> ParamLookup for F
where
    F: Fn(&str) -> Option<Value>,
{
    fn lookup(&self, name: &str) -> Option<Value> {
        self(name)
    }
}

// ── Placeholder ─────────────────────────────────────────────────────

/// A reference to parameter `name`, with an optional literal default.
#[derive(Debug, Clone, PartialEq)]
pub struct Placeholder {
    pub name: String,
    pub default: Option<Value>,
}

impl Placeholder {
    /// Parse the inside of `{{ ... }}`:
    /// `$parameter.NAME`, optionally followed by `|| "literal"` or `|| number`.
    pub fn parse_expression(expr: &str) -> Option<Self> {
        let expr = expr.trim();
        let (reference, default) = match expr.split_once("||") {
            Some((reference, default)) => (reference.trim(), Some(parse_default(default.trim())?)),
            None => (expr, None),
        };

        let name = reference.strip_prefix("$parameter.")?;
        if name.is_empty() || !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return None;
        }

        Some(Self {
            name: name.to_owned(),
            default,
        })
    }

    /// Bound value, else the declared default, else `""`.
    pub fn resolve(&self, params: &impl ParamLookup) -> Value {
        params
            .lookup(&self.name)
            .filter(|v| !v.is_null())
            .or_else(|| self.default.clone())
            .unwrap_or_else(|| Value::String(String::new()))
    }
}

/// A default is either a quoted string or a JSON number, never both.
fn parse_default(text: &str) -> Option<Value> {
    for quote in ['"', '\''] {
        if let Some(inner) = text
            .strip_prefix(quote)
            .and_then(|rest| rest.strip_suffix(quote))
        {
            if inner.contains(quote) {
                return None;
            }
            return Some(Value::String(inner.to_owned()));
        }
    }
    serde_json::from_str::<Number>(text).ok().map(Value::Number)
}

/// Render a resolved value for use inside a URL.
pub(crate) fn value_to_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

// ── URL templates ───────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
enum UrlSegment {
    Text(String),
    Param(Placeholder),
}

/// A URL path with `{{ $parameter.NAME }}` placeholders.
#[derive(Debug, Clone, PartialEq)]
pub struct UrlTemplate {
    segments: Vec<UrlSegment>,
}

impl UrlTemplate {
    /// Parse a URL template. A leading `=` expression marker is dropped.
    pub fn parse(template: &str) -> Result<Self, TemplateError> {
        let body = template.strip_prefix('=').unwrap_or(template);
        let offset_base = template.len() - body.len();

        let mut segments = Vec::new();
        let mut rest = body;
        let mut consumed = 0;

        while let Some(start) = rest.find("{{") {
            if start > 0 {
                segments.push(UrlSegment::Text(rest[..start].to_owned()));
            }
            let after = &rest[start + 2..];
            let end = after.find("}}").ok_or(TemplateError::Unclosed {
                offset: offset_base + consumed + start,
            })?;
            let expr = &after[..end];
            let placeholder =
                Placeholder::parse_expression(expr).ok_or_else(|| TemplateError::Unsupported {
                    expr: expr.trim().to_owned(),
                })?;
            segments.push(UrlSegment::Param(placeholder));

            let advance = start + 2 + end + 2;
            consumed += advance;
            rest = &rest[advance..];
        }
        if !rest.is_empty() {
            segments.push(UrlSegment::Text(rest.to_owned()));
        }

        Ok(Self { segments })
    }

    /// Parameters referenced by this template, in order of appearance.
    pub fn parameters(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|s| match s {
            UrlSegment::Param(p) => Some(p.name.as_str()),
            UrlSegment::Text(_) => None,
        })
    }

    /// Substitute every placeholder, coercing values to text.
    pub fn resolve(&self, params: &impl ParamLookup) -> String {
        self.segments
            .iter()
            .map(|s| match s {
                UrlSegment::Text(t) => t.clone(),
                UrlSegment::Param(p) => value_to_text(&p.resolve(params)),
            })
            .collect()
    }
}

/// Compact form with `{NAME}` in place of each placeholder.
impl fmt::Display for UrlTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for segment in &self.segments {
            match segment {
                UrlSegment::Text(t) => f.write_str(t)?,
                UrlSegment::Param(p) => write!(f, "{{{}}}", p.name)?,
            }
        }
        Ok(())
    }
}

// ── Body templates ──────────────────────────────────────────────────

/// A request body tree whose leaves are literals or placeholders.
///
/// Top-level arrays are kept as arrays (batch-style bodies such as
/// `radius/users/batch_add`).
#[derive(Debug, Clone, PartialEq)]
pub enum TemplateValue {
    Literal(Value),
    Param(Placeholder),
    Object(Vec<(String, TemplateValue)>),
    Array(Vec<TemplateValue>),
}

impl TemplateValue {
    /// Walk a JSON tree, turning `={{ ... }}` strings into placeholders.
    ///
    /// A string that carries the marker but is not a recognised expression
    /// stays a literal.
    pub fn parse(value: &Value) -> Self {
        match value {
            Value::Object(map) => Self::Object(
                map.iter()
                    .map(|(k, v)| (k.clone(), Self::parse(v)))
                    .collect(),
            ),
            Value::Array(items) => Self::Array(items.iter().map(Self::parse).collect()),
            Value::String(s) => s
                .strip_prefix("={{")
                .and_then(|rest| rest.strip_suffix("}}"))
                .and_then(Placeholder::parse_expression)
                .map_or_else(|| Self::Literal(value.clone()), Self::Param),
            other => Self::Literal(other.clone()),
        }
    }

    /// Parameters referenced anywhere in this tree.
    pub fn parameters(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.collect_parameters(&mut out);
        out
    }

    fn collect_parameters<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            Self::Literal(_) => {}
            Self::Param(p) => out.push(&p.name),
            Self::Object(fields) => fields.iter().for_each(|(_, v)| v.collect_parameters(out)),
            Self::Array(items) => items.iter().for_each(|v| v.collect_parameters(out)),
        }
    }

    /// Produce a concrete JSON value with the same shape.
    pub fn resolve(&self, params: &impl ParamLookup) -> Value {
        match self {
            Self::Literal(v) => v.clone(),
            Self::Param(p) => p.resolve(params),
            Self::Object(fields) => Value::Object(
                fields
                    .iter()
                    .map(|(k, v)| (k.clone(), v.resolve(params)))
                    .collect::<Map<String, Value>>(),
            ),
            Self::Array(items) => Value::Array(items.iter().map(|v| v.resolve(params)).collect()),
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use std::collections::HashMap;

    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    fn params(pairs: &[(&str, Value)]) -> impl Fn(&str) -> Option<Value> + use<> {
        let map: HashMap<String, Value> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), v.clone()))
            .collect();
        move |name: &str| map.get(name).cloned()
    }

    // ── Expressions ─────────────────────────────────────────────────

    #[test]
    fn parses_plain_reference() {
        let p = Placeholder::parse_expression(" $parameter.siteId ").unwrap();
        assert_eq!(p.name, "siteId");
        assert_eq!(p.default, None);
    }

    #[test]
    fn parses_string_and_number_defaults() {
        let s = Placeholder::parse_expression(r#"$parameter.vlan || "10""#).unwrap();
        assert_eq!(s.default, Some(json!("10")));

        let n = Placeholder::parse_expression("$parameter.tunnelType || 3").unwrap();
        assert_eq!(n.default, Some(json!(3)));

        let e = Placeholder::parse_expression(r#"$parameter.vlan || """#).unwrap();
        assert_eq!(e.default, Some(json!("")));
    }

    #[test]
    fn rejects_other_expressions() {
        assert!(Placeholder::parse_expression("$parameter.splitIntoItems === true").is_none());
        assert!(Placeholder::parse_expression("$json.name").is_none());
        assert!(Placeholder::parse_expression("$parameter.x || bogus").is_none());
        assert!(Placeholder::parse_expression("$parameter.").is_none());
    }

    // ── Fallback chain ──────────────────────────────────────────────

    #[test]
    fn unbound_falls_back_to_default_then_empty() {
        let none = params(&[]);

        let with_str = Placeholder::parse_expression(r#"$parameter.X || "d""#).unwrap();
        assert_eq!(with_str.resolve(&none), json!("d"));

        let with_num = Placeholder::parse_expression("$parameter.X || 5").unwrap();
        assert_eq!(with_num.resolve(&none), json!(5));

        let bare = Placeholder::parse_expression("$parameter.X").unwrap();
        assert_eq!(bare.resolve(&none), json!(""));
    }

    #[test]
    fn null_counts_as_unbound_but_false_does_not() {
        let p = Placeholder::parse_expression("$parameter.X || 5").unwrap();
        assert_eq!(p.resolve(&params(&[("X", Value::Null)])), json!(5));
        assert_eq!(p.resolve(&params(&[("X", json!(0))])), json!(0));

        let b = Placeholder::parse_expression("$parameter.useFixedIp").unwrap();
        assert_eq!(b.resolve(&params(&[("useFixedIp", json!(false))])), json!(false));
    }

    // ── URLs ────────────────────────────────────────────────────────

    #[test]
    fn url_resolution_strips_marker_and_substitutes() {
        let t = UrlTemplate::parse("=/api/s/{{ $parameter.siteId }}/stat/user/{{ $parameter.macAddress }}")
            .unwrap();
        assert_eq!(t.parameters().collect::<Vec<_>>(), ["siteId", "macAddress"]);

        let url = t.resolve(&params(&[
            ("siteId", json!("default")),
            ("macAddress", json!("aa:bb:cc:dd:ee:ff")),
        ]));
        assert_eq!(url, "/api/s/default/stat/user/aa:bb:cc:dd:ee:ff");
        assert_eq!(t.to_string(), "/api/s/{siteId}/stat/user/{macAddress}");
    }

    #[test]
    fn url_unbound_is_empty_and_numbers_are_text() {
        let t = UrlTemplate::parse("=/site/{{ $parameter.siteId }}/x/{{ $parameter.n }}").unwrap();
        assert_eq!(t.resolve(&params(&[("n", json!(42))])), "/site//x/42");
    }

    #[test]
    fn url_without_placeholders_is_verbatim() {
        let t = UrlTemplate::parse("/api/self/sites").unwrap();
        assert_eq!(t.resolve(&params(&[])), "/api/self/sites");
        assert_eq!(t.parameters().count(), 0);
    }

    #[test]
    fn url_parse_errors() {
        assert_eq!(
            UrlTemplate::parse("=/api/s/{{ $parameter.siteId").unwrap_err(),
            TemplateError::Unclosed { offset: 8 }
        );
        assert!(matches!(
            UrlTemplate::parse("/api/{{ $json.site }}"),
            Err(TemplateError::Unsupported { .. })
        ));
    }

    // ── Bodies ──────────────────────────────────────────────────────

    #[test]
    fn body_preserves_shape_and_literals() {
        let t = TemplateValue::parse(&json!({
            "cmd": "restart",
            "mac": "={{ $parameter.macAddress }}",
            "reboot_type": "soft",
            "nested": { "list": [1, "={{ $parameter.n || 7 }}"] },
        }));
        let body = t.resolve(&params(&[("macAddress", json!("aa:bb"))]));
        assert_eq!(
            body,
            json!({
                "cmd": "restart",
                "mac": "aa:bb",
                "reboot_type": "soft",
                "nested": { "list": [1, 7] },
            })
        );
    }

    #[test]
    fn array_body_stays_array() {
        let t = TemplateValue::parse(&json!([{
            "name": "={{ $parameter.name }}",
            "tunnel_type": "={{ $parameter.tunnelType || 3 }}",
        }]));
        assert_eq!(t.parameters(), ["name", "tunnelType"]);
        assert_eq!(
            t.resolve(&params(&[("name", json!("alice"))])),
            json!([{ "name": "alice", "tunnel_type": 3 }])
        );
    }

    #[test]
    fn unrecognised_expression_is_literal() {
        let raw = json!({ "enabled": "={{ $parameter.splitIntoItems === true }}" });
        let t = TemplateValue::parse(&raw);
        assert!(t.parameters().is_empty());
        assert_eq!(t.resolve(&params(&[])), raw);
    }

    #[test]
    fn resolution_is_pure_and_complete() {
        let t = TemplateValue::parse(&json!({
            "name": "={{ $parameter.name }}",
            "x_passphrase": "={{ $parameter.password }}",
        }));
        let p = params(&[("name", json!("guest")), ("password", json!("s3cret"))]);
        let first = t.resolve(&p);
        let second = t.resolve(&p);
        assert_eq!(first, second);

        let text = first.to_string();
        assert!(!text.contains("{{"));
        assert!(!text.contains("$parameter"));
    }
}
