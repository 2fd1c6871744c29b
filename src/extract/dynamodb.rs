use serde_json::{Map, Number, Value};

use crate::error::{Error, Result};

/// Convert a stream image in DynamoDB attribute-value encoding to plain JSON
pub fn unmarshall_image(image: &Map<String, Value>) -> Result<Map<String, Value>> {
    image
        .iter()
        .map(|(key, attribute)| unmarshall_value(key, attribute).map(|value| (key.clone(), value)))
        .collect()
}

fn unmarshall_value(key: &str, attribute: &Value) -> Result<Value> {
    let (tag, inner) = match attribute.as_object() {
        Some(object) if object.len() == 1 => object.iter().next().ok_or_else(|| malformed(key))?,
        _ => return Err(malformed(key)),
    };

    match (tag.as_str(), inner) {
        ("S", Value::String(_)) | ("B", Value::String(_)) | ("BOOL", Value::Bool(_)) => {
            Ok(inner.clone())
        }
        ("N", Value::String(number)) => parse_number(key, number),
        ("NULL", _) => Ok(Value::Null),
        ("M", Value::Object(map)) => unmarshall_image(map).map(Value::Object),
        ("L", Value::Array(items)) => items
            .iter()
            .map(|item| unmarshall_value(key, item))
            .collect::<Result<Vec<_>>>()
            .map(Value::Array),
        ("SS", Value::Array(items)) | ("BS", Value::Array(items)) => Ok(Value::Array(items.clone())),
        ("NS", Value::Array(items)) => items
            .iter()
            .map(|item| match item {
                Value::String(number) => parse_number(key, number),
                _ => Err(malformed(key)),
            })
            .collect::<Result<Vec<_>>>()
            .map(Value::Array),
        _ => Err(malformed(key)),
    }
}

fn parse_number(key: &str, number: &str) -> Result<Value> {
    if let Ok(integer) = number.parse::<i64>() {
        return Ok(Value::from(integer));
    }
    number
        .parse::<f64>()
        .ok()
        .and_then(Number::from_f64)
        .map(Value::Number)
        .ok_or_else(|| malformed(key))
}

fn malformed(key: &str) -> Error {
    Error::MalformedEnvelope(format!("attribute \"{}\" is not a valid DynamoDB value", key))
}
