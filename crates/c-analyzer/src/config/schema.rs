use serde_json::Value;

use crate::config::{
    SETTINGS_SECTION_KEY,
    indexing::{DEFAULT_EXTENSIONS, MAX_CACHE_SIZE, MIN_CACHE_SIZE},
};

/// One entry in the generated configuration schema.
#[derive(Debug, Clone)]
pub struct SchemaField {
    pub key: String,
    pub description: String,
    pub schema_type: SchemaType,
    pub default: Value,
}

/// Subset of JSON Schema types we support.
#[derive(Debug, Clone)]
pub enum SchemaType {
    Bool,
    String,
    Integer {
        minimum: Option<i64>,
        maximum: Option<i64>,
    },
    StringEnum {
        values: Vec<&'static str>,
    },
    StringArray,
}

impl SchemaField {
    pub fn to_schema_value(&self) -> Value {
        let mut obj = serde_json::Map::new();
        obj.insert("markdownDescription".into(), Value::String(self.description.clone()));
        obj.insert("default".into(), self.default.clone());

        match &self.schema_type {
            SchemaType::Bool => {
                obj.insert("type".into(), Value::String("boolean".into()));
            },
            SchemaType::String => {
                obj.insert("type".into(), Value::String("string".into()));
            },
            SchemaType::Integer {
                minimum,
                maximum,
            } => {
                obj.insert("type".into(), Value::String("number".into()));
                if let Some(min) = minimum {
                    obj.insert("minimum".into(), Value::Number((*min).into()));
                }
                if let Some(max) = maximum {
                    obj.insert("maximum".into(), Value::Number((*max).into()));
                }
            },
            SchemaType::StringEnum {
                values,
            } => {
                obj.insert("type".into(), Value::String("string".into()));
                obj.insert("enum".into(), Value::Array(values.iter().map(|v| Value::String(v.to_string())).collect()));
            },
            SchemaType::StringArray => {
                obj.insert("type".into(), Value::String("array".into()));
                let mut items = serde_json::Map::new();
                items.insert("type".into(), Value::String("string".into()));
                obj.insert("items".into(), Value::Object(items));
            },
        }

        Value::Object(obj)
    }

    pub fn to_markdown(&self) -> String {
        format!("- `{SETTINGS_SECTION_KEY}.{}` - {}", self.key, self.description)
    }
}

pub fn schema_fields() -> Vec<SchemaField> {
    vec![
        SchemaField {
            key: "indexing.cacheSize".into(),
            description: "Number of parsed files kept in memory. Files of the current load are never evicted, \
                           so the effective size grows to cover them."
                .into(),
            schema_type: SchemaType::Integer {
                minimum: Some(MIN_CACHE_SIZE as i64),
                maximum: Some(MAX_CACHE_SIZE as i64),
            },
            default: Value::Number(500.into()),
        },
        SchemaField {
            key: "indexing.extensions".into(),
            description: "File extensions that trigger indexing when a document is opened or saved.".into(),
            schema_type: SchemaType::StringArray,
            default: Value::Array(DEFAULT_EXTENSIONS.iter().map(|ext| Value::String(ext.to_string())).collect()),
        },
        SchemaField {
            key: "indexing.loadMatching".into(),
            description: "Also index the file with the same name and another indexed extension \
                           (`foo.c` pulls in `foo.h`)."
                .into(),
            schema_type: SchemaType::Bool,
            default: Value::Bool(true),
        },
        SchemaField {
            key: "indexing.cacheDirectory".into(),
            description: "Directory for persisted parse results. Empty uses `~/.c-analyzer/symbol-cache`.".into(),
            schema_type: SchemaType::String,
            default: Value::String(String::new()),
        },
        SchemaField {
            key: "paths.basePaths".into(),
            description: "Extra directories searched for quoted includes. Workspace folders are always appended."
                .into(),
            schema_type: SchemaType::StringArray,
            default: Value::Array(vec![]),
        },
        SchemaField {
            key: "paths.systemPaths".into(),
            description: "Directories searched first for angle-bracket includes.".into(),
            schema_type: SchemaType::StringArray,
            default: Value::Array(vec![]),
        },
        SchemaField {
            key: "logging.level".into(),
            description: "Runtime logging verbosity for c-analyzer.".into(),
            schema_type: SchemaType::StringEnum {
                values: vec!["error", "warn", "info", "debug", "trace"],
            },
            default: Value::String("info".into()),
        },
    ]
}

/// `"properties"` object for an editor's `contributes.configuration` section.
pub fn generate_package_json_properties() -> Value {
    let mut properties = serde_json::Map::new();

    properties.insert(
        format!("{SETTINGS_SECTION_KEY}.serverPath"),
        serde_json::json!({
            "type": "string",
            "default": "c-analyzer",
            "markdownDescription": "Path to the c-analyzer binary."
        }),
    );

    for field in schema_fields() {
        let full_key = format!("{SETTINGS_SECTION_KEY}.{}", field.key);
        properties.insert(full_key, field.to_schema_value());
    }

    Value::Object(properties)
}

pub fn generate_configuration_markdown() -> String {
    let mut out = String::new();
    let mut current_section = String::new();
    for field in &schema_fields() {
        let section = field.key.split('.').next().unwrap_or("");
        if section != current_section {
            current_section = section.to_string();
            let title = match section {
                "indexing" => "Indexing",
                "paths" => "Paths",
                "logging" => "Logging",
                other => other,
            };
            out.push_str(&format!("\n## {title}\n\n"));
        }
        out.push_str(&field.to_markdown());
        out.push('\n');
    }
    out
}
