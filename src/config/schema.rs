use serde_json::{json, Value};
use std::sync::LazyLock;

pub static CONFIG_SCHEMA: LazyLock<Value> = LazyLock::new(|| {
    json!({
        "$schema": "http://json-schema.org/draft-07/schema#",
        "type": "object",
        "properties": {
            "database": {
                "type": "object",
                "properties": {
                    "path": { "type": "string", "minLength": 1 },
                    "host": { "type": "string" },
                    "port": { "type": "integer", "minimum": 1, "maximum": 65535 },
                    "user": { "type": "string" },
                    "password": { "type": "string" },
                    "name": { "type": "string" }
                },
                "additionalProperties": false
            },
            "access": {
                "type": "object",
                "properties": {
                    "authorized_users": { "type": "array", "items": { "type": "integer" } }
                },
                "additionalProperties": false
            },
            "reports": {
                "type": "object",
                "properties": {
                    "output_dir": { "type": "string" },
                    "query_timeout_secs": { "type": "integer", "minimum": 1 }
                },
                "additionalProperties": false
            },
            "backup": {
                "type": "object",
                "properties": {
                    "strategy": { "type": "string", "enum": ["in_process", "external"] },
                    "program": { "type": "string", "minLength": 1 },
                    "args": { "type": "array", "items": { "type": "string" }, "minItems": 1 },
                    "output_dir": { "type": "string" },
                    "timeout_secs": { "type": "integer", "minimum": 1 }
                },
                "additionalProperties": false
            },
            "server": {
                "type": "object",
                "properties": {
                    "host": { "type": "string" },
                    "port": { "type": "integer", "minimum": 1, "maximum": 65535 }
                },
                "additionalProperties": false
            }
        },
        "additionalProperties": false
    })
});
