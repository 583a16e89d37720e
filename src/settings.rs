use crate::error::Result;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct TemplateSettings {
    /// Directory searched first for `table.html`, `thead.html`, ... overrides.
    pub dir: Option<String>,
}

/// Default values applied to every table unless overridden per table.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct ValueSettings {
    /// Page size; `None` shows every row.
    pub rows_number: Option<u32>,
    /// Upper bound of a page size asked for by the request.
    pub max_rows_number: Option<u32>,
    pub rows_number_selection: bool,
}

impl Default for ValueSettings {
    fn default() -> Self {
        ValueSettings {
            rows_number: Some(20),
            max_rows_number: Some(100),
            rows_number_selection: true,
        }
    }
}

/// Names of the request parameters a table reads and writes.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct FieldSettings {
    pub rows_number: String,
    pub sort_by: String,
    pub sort_dir: String,
    pub search: String,
    pub page: String,
}

impl Default for FieldSettings {
    fn default() -> Self {
        FieldSettings {
            rows_number: "rows".to_string(),
            sort_by: "sort_by".to_string(),
            sort_dir: "sort_dir".to_string(),
            search: "search".to_string(),
            page: "page".to_string(),
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct ClassSettings {
    pub container: String,
    pub table: String,
    pub tr: String,
    pub th: String,
    pub td: String,
    pub results: String,
}

impl Default for ClassSettings {
    fn default() -> Self {
        ClassSettings {
            container: "table-container".to_string(),
            table: "table table-striped table-hover".to_string(),
            tr: String::new(),
            th: "align-middle".to_string(),
            td: "align-middle".to_string(),
            results: "table-result bg-light".to_string(),
        }
    }
}

/// HTML snippets used as icons; rendered unescaped.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct IconSettings {
    pub rows_number: String,
    pub sort: String,
    pub sort_asc: String,
    pub sort_desc: String,
    pub search: String,
    pub info: String,
    pub create: String,
    pub edit: String,
    pub destroy: String,
    pub show: String,
}

impl Default for IconSettings {
    fn default() -> Self {
        IconSettings {
            rows_number: r#"<i class="fas fa-list"></i>"#.to_string(),
            sort: r#"<i class="fas fa-sort fa-fw"></i>"#.to_string(),
            sort_asc: r#"<i class="fas fa-sort-up fa-fw"></i>"#.to_string(),
            sort_desc: r#"<i class="fas fa-sort-down fa-fw"></i>"#.to_string(),
            search: r#"<i class="fas fa-search"></i>"#.to_string(),
            info: r#"<i class="fas fa-info-circle"></i>"#.to_string(),
            create: r#"<i class="fas fa-plus-circle fa-fw"></i>"#.to_string(),
            edit: r#"<i class="fas fa-edit fa-fw"></i>"#.to_string(),
            destroy: r#"<i class="fas fa-trash fa-fw"></i>"#.to_string(),
            show: r#"<i class="fas fa-eye fa-fw"></i>"#.to_string(),
        }
    }
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct TableSettings {
    pub value: ValueSettings,
    pub fields: FieldSettings,
    pub classes: ClassSettings,
    pub icons: IconSettings,
    pub template: TemplateSettings,
    pub other: HashMap<String, String>,
}

impl TableSettings {
    /// Parse settings from a JSON document; missing keys keep their defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        log::info!("Loading table settings from {}", path.display());
        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }
}
