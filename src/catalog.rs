use serde::de::DeserializeOwned;

use crate::{
    error::AdminResult,
    models::{BlogPost, NewsFeed, NewsItem, Sponsor, TierGroup, Video, VideoFeed},
    repository::RepositoryState,
    resource::{Record, Resource, SPONSOR_TIERS},
};

/// Label that disables category filtering on the public pages.
pub const ALL_CATEGORIES: &str = "All";

/// Reads a whole table in admin order and decodes it into its typed model.
pub async fn load<T: DeserializeOwned>(repo: &RepositoryState, resource: Resource) -> AdminResult<Vec<T>> {
    let rows = repo
        .list(resource, resource.schema().sort_key, false, None)
        .await?;
    Ok(decode_rows(resource, rows))
}

/// Null columns are dropped first so the model's defaults apply. Rows that still
/// do not decode are skipped with a warning rather than failing the page.
pub fn decode_rows<T: DeserializeOwned>(resource: Resource, rows: Vec<Record>) -> Vec<T> {
    rows.into_iter()
        .filter_map(|mut row| {
            row.retain(|_, value| !value.is_null());
            serde_json::from_value(serde_json::Value::Object(row))
                .inspect_err(|e| tracing::warn!(table = resource.table(), error = %e, "skipping undecodable row"))
                .ok()
        })
        .collect()
}

fn matches_category(category: &str, selected: Option<&str>) -> bool {
    match selected.map(str::trim) {
        None | Some("") | Some(ALL_CATEGORIES) => true,
        Some(selected) => category == selected,
    }
}

fn matches_search(title: &str, search: Option<&str>) -> bool {
    match search.map(str::trim) {
        None | Some("") => true,
        Some(query) => title.to_lowercase().contains(&query.to_lowercase()),
    }
}

pub fn filter_blogs(blogs: Vec<BlogPost>, category: Option<&str>, search: Option<&str>) -> Vec<BlogPost> {
    blogs
        .into_iter()
        .filter(|b| matches_category(&b.category, category) && matches_search(&b.title, search))
        .collect()
}

/// news_feed
///
/// The public news page: the first featured article (taken from the whole list,
/// not the filtered one) is set apart, and the remaining filtered articles exclude
/// every featured one.
pub fn news_feed(news: Vec<NewsItem>, category: Option<&str>, search: Option<&str>) -> NewsFeed {
    let featured = news.iter().find(|n| n.featured).cloned();
    let articles = news
        .into_iter()
        .filter(|n| !n.featured)
        .filter(|n| matches_category(&n.category, category) && matches_search(&n.title, search))
        .collect();
    NewsFeed { featured, articles }
}

/// video_feed
///
/// All featured videos, plus the full list filtered by category.
pub fn video_feed(videos: Vec<Video>, category: Option<&str>) -> VideoFeed {
    let featured = videos.iter().filter(|v| v.featured).cloned().collect();
    let videos = videos
        .into_iter()
        .filter(|v| matches_category(&v.category, category))
        .collect();
    VideoFeed { featured, videos }
}

/// group_by_tier
///
/// Buckets sponsors by tier in canonical tier order, dropping empty tiers.
/// Sponsors carrying a label outside the tier set are not shown.
pub fn group_by_tier(sponsors: Vec<Sponsor>) -> Vec<TierGroup> {
    SPONSOR_TIERS
        .iter()
        .filter_map(|tier| {
            let members: Vec<Sponsor> = sponsors.iter().filter(|s| s.tier == *tier).cloned().collect();
            (!members.is_empty()).then(|| TierGroup {
                tier: tier.to_string(),
                count: members.len(),
                sponsors: members,
            })
        })
        .collect()
}
