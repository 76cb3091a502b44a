use base64::Engine as _;
use rusqlite::types::ValueRef;
use serde::{ser::SerializeMap, Deserialize, Serialize, Serializer};

pub const TEXT_LIKE_TYPES: [&str; 3] = ["TEXT", "VARCHAR", "CHAR"];

pub const ALL_COLUMNS: &str = "All Columns";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDescriptor {
    pub name: String,
    #[serde(default)]
    pub decl_type: String,
    pub nullable: bool,
    pub primary_key: bool,
}

impl ColumnDescriptor {
    pub fn is_text_like(&self) -> bool {
        TEXT_LIKE_TYPES
            .iter()
            .any(|t| t.eq_ignore_ascii_case(self.decl_type.trim()))
    }

    /// Tree label, e.g. `id: INTEGER (PK)` or `email: TEXT (NOT NULL)`.
    pub fn label(&self) -> String {
        let mut out = format!("{}: {}", self.name, self.decl_type);
        if self.primary_key {
            out.push_str(" (PK)");
        }
        if !self.nullable {
            out.push_str(" (NOT NULL)");
        }
        out
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableDescriptor {
    pub name: String,
    pub columns: Vec<ColumnDescriptor>,
}

impl TableDescriptor {
    pub fn column(&self, name: &str) -> Option<&ColumnDescriptor> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn filter_choices(&self) -> Vec<String> {
        std::iter::once(ALL_COLUMNS.to_string())
            .chain(self.columns.iter().map(|c| c.name.clone()))
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
    Blob(Vec<u8>),
}

impl From<ValueRef<'_>> for Value {
    fn from(v: ValueRef<'_>) -> Self {
        match v {
            ValueRef::Null => Value::Null,
            ValueRef::Integer(x) => Value::Integer(x),
            ValueRef::Real(x) => Value::Real(x),
            ValueRef::Text(t) => Value::Text(String::from_utf8_lossy(t).into_owned()),
            ValueRef::Blob(b) => Value::Blob(b.to_vec()),
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Null => s.serialize_none(),
            Value::Integer(x) => s.serialize_i64(*x),
            Value::Real(x) => s.serialize_f64(*x),
            Value::Text(t) => s.serialize_str(t),
            Value::Blob(b) => {
                let mut m = s.serialize_map(Some(3))?;
                m.serialize_entry("$type", "blob")?;
                m.serialize_entry("base64", &base64::engine::general_purpose::STANDARD.encode(b))?;
                m.serialize_entry("size", &b.len())?;
                m.end()
            }
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct QueryResult {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum FilterTarget {
    #[default]
    AllColumns,
    Column(String),
}

impl FilterTarget {
    // Blank or the sentinel label means all columns.
    pub fn from_choice(choice: Option<&str>) -> Self {
        match choice.map(str::trim) {
            None | Some("") | Some(ALL_COLUMNS) => FilterTarget::AllColumns,
            Some(name) => FilterTarget::Column(name.to_string()),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterSpec {
    text: String,
    target: FilterTarget,
}

impl FilterSpec {
    pub fn new(text: &str, target: FilterTarget) -> Self {
        Self {
            text: text.trim().to_string(),
            target,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn target(&self) -> &FilterTarget {
        &self.target
    }

    pub fn is_active(&self) -> bool {
        !self.text.is_empty()
    }

    pub fn needs_columns(&self) -> bool {
        self.is_active() && self.target == FilterTarget::AllColumns
    }

    pub fn like_pattern(&self) -> String {
        format!("%{}%", self.text)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PaginationInfo {
    pub total_rows: u64,
    pub current_page: u64,
    pub total_pages: u64,
    pub has_previous: bool,
    pub has_next: bool,
}

impl PaginationInfo {
    pub fn page_label(&self) -> String {
        format!("Page {} of {}", self.current_page, self.total_pages)
    }

    pub fn total_label(&self) -> String {
        format!("Total: {} rows", self.total_rows)
    }
}
