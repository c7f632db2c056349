use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use utoipa::ToSchema;
use uuid::Uuid;

// --- Content Schemas (Mapped to Database) ---
//
// The admin layer works on untyped `Record`s driven by `ResourceSchema`; these
// typed views are what the public catalog hands out and what the front end
// imports through the generated TypeScript bindings.

/// Player
///
/// A roster entry from the `players` table. `win_rate` and `kd` are display strings.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default, PartialEq)]
#[serde(default)]
#[ts(export)]
pub struct Player {
    pub id: Uuid,
    pub name: String,
    pub real_name: String,
    pub role: String,
    pub country: String,
    pub age: i32,
    pub image: String,
    pub bio: String,
    pub kills: i32,
    pub win_rate: String,
    pub kd: String,
    pub matches: i32,
    pub twitter: String,
    pub youtube: String,
    pub twitch: String,
    #[ts(type = "string | null")]
    pub created_at: Option<DateTime<Utc>>,
}

/// BlogPost
///
/// A row of the `blogs` table. `date` is the publication day (`YYYY-MM-DD`).
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default, PartialEq)]
#[serde(default)]
#[ts(export)]
pub struct BlogPost {
    pub id: Uuid,
    pub title: String,
    pub excerpt: String,
    pub content: String,
    pub image: String,
    pub author: String,
    pub date: String,
    pub read_time: String,
    pub category: String,
    pub tags: Vec<String>,
    #[ts(type = "string | null")]
    pub created_at: Option<DateTime<Utc>>,
}

/// NewsItem
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default, PartialEq)]
#[serde(default)]
#[ts(export)]
pub struct NewsItem {
    pub id: Uuid,
    pub title: String,
    pub excerpt: String,
    pub image: String,
    pub date: String,
    pub read_time: String,
    pub category: String,
    pub featured: bool,
    #[ts(type = "string | null")]
    pub created_at: Option<DateTime<Utc>>,
}

/// Video
///
/// `views` and `duration` are stored as free text ("1.2M", "12:34").
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default, PartialEq)]
#[serde(default)]
#[ts(export)]
pub struct Video {
    pub id: Uuid,
    pub title: String,
    pub thumbnail: String,
    pub youtube_id: String,
    pub views: String,
    pub duration: String,
    pub category: String,
    pub featured: bool,
    #[ts(type = "string | null")]
    pub created_at: Option<DateTime<Utc>>,
}

/// Sponsor
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default, PartialEq)]
#[serde(default)]
#[ts(export)]
pub struct Sponsor {
    pub id: Uuid,
    pub name: String,
    pub tier: String,
    pub description: String,
    pub logo: String,
    pub website: String,
    #[ts(type = "string | null")]
    pub created_at: Option<DateTime<Utc>>,
}

// --- Identity ---

/// User
///
/// The identity resolved by the authentication collaborator for a session token.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default, PartialEq)]
#[ts(export)]
pub struct User {
    pub id: Uuid,
    pub email: Option<String>,
}

/// SessionInfo
///
/// Output of `GET /session`: who is signed in and what the role check concluded.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct SessionInfo {
    pub user: User,
    /// Role claim from the `profiles` table, when one could be read.
    pub role: Option<String>,
    pub is_admin: bool,
    pub navigation: Vec<NavItem>,
}

/// NavItem
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, PartialEq)]
#[ts(export)]
pub struct NavItem {
    pub href: String,
    pub label: String,
    pub active: bool,
}

/// LogoutResponse
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct LogoutResponse {
    pub redirect: String,
}

// --- Dashboard ---

/// ResourceCounts
///
/// Row count per content table. A table whose count query failed reports 0.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default, PartialEq)]
#[ts(export)]
pub struct ResourceCounts {
    pub players: i64,
    pub blogs: i64,
    pub videos: i64,
    pub news: i64,
    pub sponsors: i64,
}

/// RecentItem
///
/// One entry of the dashboard's "recent content" list.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, PartialEq)]
#[ts(export)]
pub struct RecentItem {
    pub id: String,
    pub title: String,
    pub date: String,
    /// "Blog" or "News".
    #[serde(rename = "type")]
    pub kind: String,
}

/// DashboardSummary
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct DashboardSummary {
    pub counts: ResourceCounts,
    pub recent: Vec<RecentItem>,
}

// --- Public catalog ---

/// TierGroup
///
/// Sponsors sharing one tier, in the canonical tier order.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, PartialEq)]
#[ts(export)]
pub struct TierGroup {
    pub tier: String,
    pub count: usize,
    pub sponsors: Vec<Sponsor>,
}

/// NewsFeed
///
/// The public news page: the first featured article and the remaining matches.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct NewsFeed {
    pub featured: Option<NewsItem>,
    pub articles: Vec<NewsItem>,
}

/// VideoFeed
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct VideoFeed {
    pub featured: Vec<Video>,
    pub videos: Vec<Video>,
}
