//! Turns a pasted `curl` invocation into an endpoint plus an argument schema.
//!
//! The first bare token is the URL. Unrecognized flags are skipped.

use crate::types::ParameterSchema;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedCurl {
    pub url: String,
    pub method: String,
    pub headers: BTreeMap<String, String>,
    pub parameters: ParameterSchema,
}

pub fn parse_curl_command(command: &str) -> ParsedCurl {
    let mut command = command.trim();
    if let Some(rest) = command.strip_prefix("curl") {
        command = rest.trim();
    }

    let parts = tokenize(command);

    let mut url = String::new();
    let mut method: Option<String> = None;
    let mut headers = BTreeMap::new();
    let mut body = String::new();

    let mut i = 0;
    while i < parts.len() {
        let part = parts[i].as_str();

        if !part.starts_with('-') && url.is_empty() {
            url = strip_quotes(part).to_string();
        } else {
            match part {
                "--url" => {
                    if let Some(value) = next_value(&parts, &mut i) {
                        url = strip_quotes(value).to_string();
                    }
                }
                "-X" | "--request" => {
                    if let Some(value) = next_value(&parts, &mut i) {
                        method = Some(value.to_uppercase());
                    }
                }
                "-H" | "--header" => {
                    if let Some(value) = next_value(&parts, &mut i) {
                        if let Some((key, val)) = strip_quotes(value).split_once(':') {
                            headers.insert(key.trim().to_string(), val.trim().to_string());
                        }
                    }
                }
                "-d" | "--data" | "--data-raw" | "--data-binary" => {
                    if let Some(value) = next_value(&parts, &mut i) {
                        body = strip_quotes(value).to_string();
                    }
                }
                _ => {}
            }
        }

        i += 1;
    }

    let parsed = ParsedCurl {
        url,
        method: method.unwrap_or_else(|| "GET".to_string()),
        headers,
        parameters: infer_parameters(&body),
    };
    tracing::debug!(
        "Parsed curl command: {} {} ({} headers, {} parameters)",
        parsed.method,
        parsed.url,
        parsed.headers.len(),
        parsed.parameters.properties.len()
    );
    parsed
}

/// Shell-style split, or plain whitespace split when quoting is unbalanced.
/// A `#` opening a word is kept as text, never read as a comment.
fn tokenize(command: &str) -> Vec<String> {
    shlex::split(&escape_word_hashes(command))
        .unwrap_or_else(|| command.split_whitespace().map(str::to_string).collect())
}

fn escape_word_hashes(command: &str) -> String {
    let mut out = String::with_capacity(command.len());
    let mut quote: Option<char> = None;
    let mut escaped = false;
    let mut at_word_start = true;

    for c in command.chars() {
        if escaped {
            escaped = false;
            at_word_start = false;
            out.push(c);
            continue;
        }
        match quote {
            Some(q) if c == q => quote = None,
            Some('"') if c == '\\' => escaped = true,
            Some(_) => {}
            None => match c {
                '\'' | '"' => quote = Some(c),
                '\\' => escaped = true,
                '#' if at_word_start => out.push('\\'),
                _ => {}
            },
        }
        at_word_start = quote.is_none() && !escaped && c.is_whitespace();
        out.push(c);
    }
    out
}

fn next_value<'a>(parts: &'a [String], i: &mut usize) -> Option<&'a str> {
    *i += 1;
    parts.get(*i).map(String::as_str)
}

fn strip_quotes(value: &str) -> &str {
    value.trim_matches(|c| c == '\'' || c == '"')
}

/// Every top-level key of a JSON object body becomes a required parameter.
fn infer_parameters(body: &str) -> ParameterSchema {
    let mut schema = ParameterSchema::default();
    if body.is_empty() {
        return schema;
    }

    let Ok(Value::Object(fields)) = serde_json::from_str::<Value>(body) else {
        return schema;
    };

    for (key, value) in fields {
        schema.properties.insert(
            key.clone(),
            json!({
                "type": json_type_name(&value),
                "description": format!("Parámetro {}", key),
            }),
        );
        schema.required.push(key);
    }
    schema
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Bool(_) => "boolean",
        Value::Number(n) if n.is_i64() || n.is_u64() => "integer",
        Value::Number(_) => "number",
        _ => "string",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_post_with_json_body() {
        let parsed = parse_curl_command(
            r#"curl -X POST -H "Content-Type: application/json" -d '{"a":1,"b":true}' https://x/y"#,
        );

        assert_eq!(parsed.method, "POST");
        assert_eq!(parsed.url, "https://x/y");
        assert_eq!(parsed.headers.len(), 1);
        assert_eq!(parsed.headers["Content-Type"], "application/json");

        let params = &parsed.parameters;
        assert_eq!(params.properties["a"]["type"], "integer");
        assert_eq!(params.properties["b"]["type"], "boolean");
        assert_eq!(params.properties["a"]["description"], "Parámetro a");
        assert_eq!(params.required, vec!["a".to_string(), "b".to_string()]);
        assert!(!params.additional_properties);
    }

    #[test]
    fn test_defaults_to_get() {
        let parsed = parse_curl_command("curl https://api.example.com/items");
        assert_eq!(parsed.method, "GET");
        assert_eq!(parsed.url, "https://api.example.com/items");
        assert!(parsed.headers.is_empty());
        assert!(parsed.parameters.properties.is_empty());
    }

    #[test]
    fn test_long_flags_and_explicit_url() {
        let parsed = parse_curl_command(
            "curl --request put --url 'https://api.example.com/v1/x' --header 'Authorization: Bearer abc:def' --data-raw '{\"price\": 9.5, \"name\": \"x\"}'",
        );
        assert_eq!(parsed.method, "PUT");
        assert_eq!(parsed.url, "https://api.example.com/v1/x");
        assert_eq!(parsed.headers["Authorization"], "Bearer abc:def");
        assert_eq!(parsed.parameters.properties["price"]["type"], "number");
        assert_eq!(parsed.parameters.properties["name"]["type"], "string");
    }

    #[test]
    fn test_property_order_follows_body() {
        let parsed = parse_curl_command(r#"curl -d '{"zeta":"a","alpha":2,"mid":null}' http://h"#);
        let keys: Vec<&String> = parsed.parameters.properties.keys().collect();
        assert_eq!(keys, vec!["zeta", "alpha", "mid"]);
        assert_eq!(parsed.parameters.properties["mid"]["type"], "string");
    }

    #[test]
    fn test_unknown_flags_and_trailing_flag() {
        let parsed = parse_curl_command("curl -s --compressed https://h/x -X");
        assert_eq!(parsed.url, "https://h/x");
        assert_eq!(parsed.method, "GET");
    }

    #[test]
    fn test_second_bare_token_ignored() {
        let parsed = parse_curl_command("curl https://first https://second");
        assert_eq!(parsed.url, "https://first");
    }

    #[test]
    fn test_malformed_body_yields_empty_schema() {
        let parsed = parse_curl_command(r#"curl -d '{not json' https://h"#);
        assert!(parsed.parameters.properties.is_empty());
        assert!(parsed.parameters.required.is_empty());

        let parsed = parse_curl_command(r#"curl -d '[1,2]' https://h"#);
        assert!(parsed.parameters.properties.is_empty());
    }

    #[test]
    fn test_header_without_colon_ignored() {
        let parsed = parse_curl_command("curl -H 'NoColonHere' https://h");
        assert!(parsed.headers.is_empty());
    }

    #[test]
    fn test_unbalanced_quotes_fall_back_to_whitespace_split() {
        let parsed = parse_curl_command("curl -X post \"https://h/x");
        assert_eq!(parsed.method, "POST");
        assert_eq!(parsed.url, "https://h/x");
    }

    #[test]
    fn test_hash_is_not_a_comment() {
        let parsed = parse_curl_command(r#"curl #/items -X post -d '{"a":1}'"#);
        assert_eq!(parsed.url, "#/items");
        assert_eq!(parsed.method, "POST");
        assert_eq!(parsed.parameters.required, vec!["a".to_string()]);

        let parsed = parse_curl_command(r##"curl -H 'X-Tag: #1' "https://h/x#top" -d "#raw""##);
        assert_eq!(parsed.headers["X-Tag"], "#1");
        assert_eq!(parsed.url, "https://h/x#top");
    }

    #[test]
    fn test_without_program_name() {
        let parsed = parse_curl_command("-X DELETE https://h/items/1");
        assert_eq!(parsed.method, "DELETE");
        assert_eq!(parsed.url, "https://h/items/1");
    }
}
