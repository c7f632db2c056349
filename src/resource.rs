use std::{fmt, str::FromStr};

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use ts_rs::TS;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::{AdminError, AdminResult};

/// Record
///
/// A row as exchanged with the persistence collaborator: a flat JSON object keyed
/// by column name. The generated `id` and `created_at` columns are present on
/// fetched rows and absent from drafts.
pub type Record = Map<String, Value>;

pub const DATE_FORMAT: &str = "%Y-%m-%d";

// --- Closed label sets ---

pub const SPONSOR_TIERS: &[&str] = &["Title Sponsor", "Premium Partner", "Official Partner"];
pub const BLOG_CATEGORIES: &[&str] = &["Strategy", "Analysis", "Guides", "Interviews"];
pub const NEWS_CATEGORIES: &[&str] = &["Tournament", "Roster", "Feature", "Update"];
pub const VIDEO_CATEGORIES: &[&str] = &["Highlights", "Tournaments", "Behind the Scenes", "Tutorials"];

/// Resource
///
/// The five content tables managed by the back-office. The lowercase name doubles
/// as the route segment (`/admin/players`) and the table name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum Resource {
    Players,
    Blogs,
    News,
    Videos,
    Sponsors,
}

impl Resource {
    pub const ALL: [Resource; 5] = [
        Resource::Players,
        Resource::Blogs,
        Resource::News,
        Resource::Videos,
        Resource::Sponsors,
    ];

    pub fn schema(self) -> &'static ResourceSchema {
        match self {
            Resource::Players => &PLAYERS,
            Resource::Blogs => &BLOGS,
            Resource::News => &NEWS,
            Resource::Videos => &VIDEOS,
            Resource::Sponsors => &SPONSORS,
        }
    }

    pub fn table(self) -> &'static str {
        self.schema().table
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.table())
    }
}

impl FromStr for Resource {
    type Err = AdminError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Resource::ALL
            .into_iter()
            .find(|r| r.table() == s)
            .ok_or_else(|| AdminError::NotFound(format!("unknown resource `{s}`")))
    }
}

// --- Schema description ---

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Integer,
    Boolean,
    /// Calendar date serialized as `YYYY-MM-DD`.
    Date,
    /// Ordered list of trimmed, unique strings.
    TextList,
}

#[derive(Debug, Clone, Copy)]
pub enum FieldDefault {
    Text(&'static str),
    Integer(i64),
    Boolean(bool),
    Today,
    EmptyList,
}

impl FieldDefault {
    fn value(self) -> Value {
        match self {
            FieldDefault::Text(s) => Value::from(s),
            FieldDefault::Integer(n) => Value::from(n),
            FieldDefault::Boolean(b) => Value::from(b),
            FieldDefault::Today => Value::from(Utc::now().date_naive().format(DATE_FORMAT).to_string()),
            FieldDefault::EmptyList => Value::Array(Vec::new()),
        }
    }
}

#[derive(Debug)]
pub struct FieldSpec {
    pub name: &'static str,
    pub kind: FieldKind,
    pub required: bool,
    pub default: FieldDefault,
}

const fn text(name: &'static str, required: bool) -> FieldSpec {
    FieldSpec { name, kind: FieldKind::Text, required, default: FieldDefault::Text("") }
}

const fn text_or(name: &'static str, default: &'static str) -> FieldSpec {
    FieldSpec { name, kind: FieldKind::Text, required: false, default: FieldDefault::Text(default) }
}

const fn integer(name: &'static str, required: bool, default: i64) -> FieldSpec {
    FieldSpec { name, kind: FieldKind::Integer, required, default: FieldDefault::Integer(default) }
}

const fn date(name: &'static str) -> FieldSpec {
    FieldSpec { name, kind: FieldKind::Date, required: true, default: FieldDefault::Today }
}

const fn flag(name: &'static str) -> FieldSpec {
    FieldSpec { name, kind: FieldKind::Boolean, required: false, default: FieldDefault::Boolean(false) }
}

/// LabelSet
///
/// A closed set of labels offered for a field. When `enforced` is false the set
/// is only a suggestion for the form; when true, submit rejects other values.
#[derive(Debug)]
pub struct LabelSet {
    pub field: &'static str,
    pub labels: &'static [&'static str],
    pub enforced: bool,
}

/// ResourceSchema
///
/// Everything the generic controller needs to know about one table.
#[derive(Debug)]
pub struct ResourceSchema {
    pub resource: Resource,
    pub table: &'static str,
    /// Human label for a single row, used in messages.
    pub label: &'static str,
    /// Column the admin list is ordered by, descending.
    pub sort_key: &'static str,
    pub fields: &'static [FieldSpec],
    pub label_sets: &'static [LabelSet],
}

pub static PLAYERS: ResourceSchema = ResourceSchema {
    resource: Resource::Players,
    table: "players",
    label: "player",
    sort_key: "created_at",
    fields: &[
        text("name", true),
        text("real_name", true),
        text("role", true),
        text("country", true),
        integer("age", true, 18),
        text("image", false),
        text("bio", false),
        integer("kills", false, 0),
        text_or("win_rate", "0%"),
        text_or("kd", "0.0"),
        integer("matches", false, 0),
        text("twitter", false),
        text("youtube", false),
        text("twitch", false),
    ],
    label_sets: &[],
};

pub static BLOGS: ResourceSchema = ResourceSchema {
    resource: Resource::Blogs,
    table: "blogs",
    label: "blog post",
    sort_key: "date",
    fields: &[
        text("title", true),
        text("excerpt", true),
        text("content", false),
        text("image", false),
        text("author", true),
        date("date"),
        text_or("read_time", "5 min read"),
        text_or("category", "Strategy"),
        FieldSpec { name: "tags", kind: FieldKind::TextList, required: false, default: FieldDefault::EmptyList },
    ],
    label_sets: &[LabelSet { field: "category", labels: BLOG_CATEGORIES, enforced: false }],
};

pub static NEWS: ResourceSchema = ResourceSchema {
    resource: Resource::News,
    table: "news",
    label: "news article",
    sort_key: "date",
    fields: &[
        text("title", true),
        text("excerpt", true),
        text("image", false),
        date("date"),
        text_or("read_time", "5 min read"),
        text_or("category", "Update"),
        flag("featured"),
    ],
    label_sets: &[LabelSet { field: "category", labels: NEWS_CATEGORIES, enforced: false }],
};

pub static VIDEOS: ResourceSchema = ResourceSchema {
    resource: Resource::Videos,
    table: "videos",
    label: "video",
    sort_key: "created_at",
    fields: &[
        text("title", true),
        text("thumbnail", false),
        text("youtube_id", true),
        text_or("views", "0"),
        text_or("duration", "0:00"),
        text_or("category", "Highlights"),
        flag("featured"),
    ],
    label_sets: &[LabelSet { field: "category", labels: VIDEO_CATEGORIES, enforced: false }],
};

pub static SPONSORS: ResourceSchema = ResourceSchema {
    resource: Resource::Sponsors,
    table: "sponsors",
    label: "sponsor",
    sort_key: "created_at",
    fields: &[
        text("name", true),
        text_or("tier", "Official Partner"),
        text("description", false),
        text("logo", false),
        text("website", false),
    ],
    label_sets: &[LabelSet { field: "tier", labels: SPONSOR_TIERS, enforced: true }],
};

impl ResourceSchema {
    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Columns that may appear in a query: the editable fields plus the generated ones.
    pub fn has_column(&self, name: &str) -> bool {
        matches!(name, "id" | "created_at") || self.field(name).is_some()
    }

    pub fn supports_featured(&self) -> bool {
        self.field("featured").is_some_and(|f| f.kind == FieldKind::Boolean)
    }

    pub fn supports_tags(&self) -> bool {
        self.field("tags").is_some_and(|f| f.kind == FieldKind::TextList)
    }

    pub fn labels_for(&self, field: &str) -> Option<&'static [&'static str]> {
        self.label_sets
            .iter()
            .find(|set| set.field == field)
            .map(|set| set.labels)
    }

    /// The draft used in create mode.
    pub fn empty_template(&self) -> Record {
        self.fields
            .iter()
            .map(|f| (f.name.to_string(), f.default.value()))
            .collect()
    }

    /// Copies the editable fields of a fetched row into a fresh draft. Columns the
    /// row lacks (or holds as null) fall back to the template default.
    pub fn draft_from(&self, record: &Record) -> Record {
        self.fields
            .iter()
            .map(|f| {
                let value = match record.get(f.name) {
                    Some(Value::Null) | None => f.default.value(),
                    Some(v) => v.clone(),
                };
                (f.name.to_string(), value)
            })
            .collect()
    }

    /// validate
    ///
    /// Checks a draft before it is sent anywhere and returns the normalized payload:
    /// only schema fields survive, integers given as numeric strings are converted,
    /// tag lists are trimmed and de-duplicated.
    pub fn validate(&self, draft: &Record) -> AdminResult<Record> {
        let mut out = Record::new();

        for field in self.fields {
            let value = draft.get(field.name).cloned().unwrap_or(Value::Null);
            let normalized = normalize(field, value)?;

            if field.required && is_blank(&normalized) {
                return Err(AdminError::validation(field.name, "is required"));
            }

            if let Some(set) = self.label_sets.iter().find(|s| s.field == field.name && s.enforced) {
                let label = normalized.as_str().unwrap_or_default();
                if !set.labels.contains(&label) {
                    return Err(AdminError::validation(
                        field.name,
                        format!("must be one of: {}", set.labels.join(", ")),
                    ));
                }
            }

            // Absent optional fields are left to the column default.
            if !normalized.is_null() {
                out.insert(field.name.to_string(), normalized);
            }
        }

        Ok(out)
    }
}

fn normalize(field: &FieldSpec, value: Value) -> AdminResult<Value> {
    let mismatch = |expected: &str| AdminError::validation(field.name, format!("must be {expected}"));

    match (field.kind, value) {
        (_, Value::Null) => Ok(Value::Null),
        (FieldKind::Text, Value::String(s)) => Ok(Value::String(s)),
        (FieldKind::Text, _) => Err(mismatch("text")),
        (FieldKind::Integer, Value::Number(n)) => n
            .as_i64()
            .ok_or_else(|| mismatch("a whole number"))
            .and_then(|n| integer_column(field, n)),
        (FieldKind::Integer, Value::String(s)) if s.trim().is_empty() => Ok(Value::Null),
        (FieldKind::Integer, Value::String(s)) => s
            .trim()
            .parse::<i64>()
            .map_err(|_| mismatch("a whole number"))
            .and_then(|n| integer_column(field, n)),
        (FieldKind::Integer, _) => Err(mismatch("a whole number")),
        (FieldKind::Boolean, Value::Bool(b)) => Ok(Value::Bool(b)),
        (FieldKind::Boolean, _) => Err(mismatch("true or false")),
        (FieldKind::Date, Value::String(s)) if s.trim().is_empty() => Ok(Value::String(String::new())),
        (FieldKind::Date, Value::String(s)) => parse_date(&s)
            .map(|d| Value::String(d.format(DATE_FORMAT).to_string()))
            .ok_or_else(|| mismatch("a date (YYYY-MM-DD)")),
        (FieldKind::Date, _) => Err(mismatch("a date (YYYY-MM-DD)")),
        (FieldKind::TextList, Value::Array(items)) => {
            let mut tags: Vec<String> = Vec::with_capacity(items.len());
            for item in items {
                let tag = item.as_str().ok_or_else(|| mismatch("a list of text"))?.trim();
                if !tag.is_empty() && !tags.iter().any(|t| t == tag) {
                    tags.push(tag.to_string());
                }
            }
            Ok(Value::from(tags))
        }
        (FieldKind::TextList, _) => Err(mismatch("a list of text")),
    }
}

/// Integer fields are stored in `integer` (32-bit) columns.
fn integer_column(field: &FieldSpec, n: i64) -> AdminResult<Value> {
    i32::try_from(n).map(Value::from).map_err(|_| {
        AdminError::validation(
            field.name,
            format!("must be between {} and {}", i32::MIN, i32::MAX),
        )
    })
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        _ => false,
    }
}

/// Accepts plain dates as well as full timestamps, keeping only the calendar day.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, DATE_FORMAT)
        .ok()
        .or_else(|| chrono::DateTime::parse_from_rfc3339(raw).ok().map(|dt| dt.date_naive()))
}

pub fn record_id(record: &Record) -> Option<Uuid> {
    record
        .get("id")
        .and_then(Value::as_str)
        .and_then(|s| Uuid::parse_str(s).ok())
}

pub fn record_flag(record: &Record, field: &str) -> bool {
    record.get(field).and_then(Value::as_bool).unwrap_or(false)
}
