use axum::http::HeaderMap;
use serde_json::{Map, Value};

/// Decode a webhook body into a raw payload based on its Content-Type.
///
/// An empty body falls back to the query string, if any, and otherwise to an
/// empty mapping.
pub fn parse_body(content_type: Option<&str>, body: &[u8], query: Option<&str>) -> Result<Value, String> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(match query {
            Some(q) if !q.is_empty() => Value::Object(fold_pairs(form_urlencoded::parse(q.as_bytes()))),
            _ => Value::Object(Map::new()),
        });
    }

    let ct = content_type.unwrap_or("application/json");

    if ct.contains("application/json") {
        serde_json::from_slice(body).map_err(|e| format!("Invalid JSON: {e}"))
    } else if ct.contains("application/x-www-form-urlencoded") {
        parse_form_urlencoded(body)
    } else {
        // Try JSON first, then form-urlencoded
        serde_json::from_slice(body)
            .or_else(|_| parse_form_urlencoded(body))
            .map_err(|e| format!("Unable to parse body: {e}"))
    }
}

fn parse_form_urlencoded(body: &[u8]) -> Result<Value, String> {
    std::str::from_utf8(body).map_err(|e| format!("Invalid UTF-8: {e}"))?;
    Ok(Value::Object(fold_pairs(form_urlencoded::parse(body))))
}

/// Parse multipart form data using multer.
pub async fn parse_multipart(headers: &HeaderMap, body: bytes::Bytes) -> Result<Value, String> {
    let boundary = headers
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .and_then(|ct| multer::parse_boundary(ct).ok())
        .ok_or_else(|| "Missing multipart boundary".to_string())?;

    let stream = futures_util::stream::once(async { Ok::<_, std::io::Error>(body) });
    let mut multipart = multer::Multipart::new(stream, boundary);

    let mut pairs = Vec::new();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| format!("Multipart error: {e}"))?
    {
        let name = field.name().unwrap_or("unknown").to_string();
        let value = field
            .text()
            .await
            .map_err(|e| format!("Field read error: {e}"))?;
        pairs.push((name, value));
    }

    Ok(Value::Object(fold_pairs(pairs)))
}

/// Build a mapping from key/value pairs, nesting `outer[inner]` keys one level
/// deep so that `q6_fecha[year]=2024` becomes `{"q6_fecha": {"year": "2024"}}`.
fn fold_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Map<String, Value>
where
    K: AsRef<str>,
    V: Into<String>,
{
    let mut map = Map::new();
    for (key, value) in pairs {
        let key = key.as_ref();
        let value = Value::String(value.into());

        match split_bracketed(key) {
            Some((outer, inner)) => {
                let slot = map
                    .entry(outer.to_string())
                    .or_insert_with(|| Value::Object(Map::new()));
                if !slot.is_object() {
                    *slot = Value::Object(Map::new());
                }
                if let Value::Object(nested) = slot {
                    nested.insert(inner.to_string(), value);
                }
            }
            None => {
                map.insert(key.to_string(), value);
            }
        }
    }
    map
}

fn split_bracketed(key: &str) -> Option<(&str, &str)> {
    let (outer, rest) = key.split_once('[')?;
    let inner = rest.strip_suffix(']')?;
    if outer.is_empty() || inner.is_empty() || inner.contains(['[', ']']) {
        return None;
    }
    Some((outer, inner))
}
