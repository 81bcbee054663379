use schemars::{schema_for, JsonSchema};
use serde::de::DeserializeOwned;

/// Trait for types that can be used as Gemini structured output.
///
/// Automatically implemented for any type that implements
/// `JsonSchema + DeserializeOwned`.
pub trait StructuredOutput: JsonSchema + DeserializeOwned {
    /// Generate a Gemini-compatible response schema for this type.
    ///
    /// The `responseSchema` field accepts an OpenAPI 3.0 subset, so the
    /// schemars output needs massaging:
    /// 1. All `$ref` references inlined (Gemini has no `definitions`)
    /// 2. Keywords outside the subset stripped
    ///    (`$schema`, `additionalProperties`, `minimum`, `maximum`)
    /// 3. Integer/number `format` values constrained to the accepted set
    fn gemini_schema() -> serde_json::Value {
        let schema = schema_for!(Self);
        let mut value = serde_json::to_value(schema).unwrap_or_default();

        inline_refs(&mut value);
        strip_unsupported_keywords(&mut value);

        if let serde_json::Value::Object(map) = &mut value {
            map.remove("definitions");
            map.remove("$schema");
        }

        value
    }

    fn type_name() -> String {
        <Self as JsonSchema>::schema_name()
    }
}

impl<T: JsonSchema + DeserializeOwned> StructuredOutput for T {}

fn strip_unsupported_keywords(value: &mut serde_json::Value) {
    match value {
        serde_json::Value::Object(map) => {
            map.remove("additionalProperties");
            map.remove("minimum");
            map.remove("maximum");

            let schema_type = map.get("type").and_then(|t| t.as_str()).map(str::to_string);
            if let Some(serde_json::Value::String(format)) = map.get("format").cloned() {
                let keep = match schema_type.as_deref() {
                    Some("integer") => matches!(format.as_str(), "int32" | "int64"),
                    Some("number") => matches!(format.as_str(), "float" | "double"),
                    _ => false,
                };
                if !keep {
                    map.remove("format");
                }
            }

            for (_, v) in map.iter_mut() {
                strip_unsupported_keywords(v);
            }
        }
        serde_json::Value::Array(arr) => {
            for item in arr.iter_mut() {
                strip_unsupported_keywords(item);
            }
        }
        _ => {}
    }
}

fn inline_refs(value: &mut serde_json::Value) {
    let definitions = if let serde_json::Value::Object(map) = value {
        map.get("definitions").cloned()
    } else {
        None
    };

    if let Some(defs) = definitions {
        inline_refs_recursive(value, &defs);
    }
}

fn inline_refs_recursive(value: &mut serde_json::Value, definitions: &serde_json::Value) {
    match value {
        serde_json::Value::Object(map) => {
            if let Some(serde_json::Value::String(ref_path)) = map.get("$ref").cloned() {
                if ref_path.starts_with("#/definitions/") {
                    let type_name = ref_path.trim_start_matches("#/definitions/");
                    if let Some(def) = definitions.get(type_name) {
                        *value = def.clone();
                        inline_refs_recursive(value, definitions);
                        return;
                    }
                }
            }

            if let Some(serde_json::Value::Array(all_of)) = map.get("allOf").cloned() {
                if all_of.len() == 1 {
                    *value = all_of.into_iter().next().unwrap();
                    inline_refs_recursive(value, definitions);
                    return;
                }
            }

            for (_, v) in map.iter_mut() {
                inline_refs_recursive(v, definitions);
            }
        }
        serde_json::Value::Array(arr) => {
            for item in arr.iter_mut() {
                inline_refs_recursive(item, definitions);
            }
        }
        _ => {}
    }
}
