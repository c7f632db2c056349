use std::cmp::Ordering;

use serde_json::Value;

use crate::{
    models::{DashboardSummary, RecentItem, ResourceCounts},
    repository::RepositoryState,
    resource::{Record, Resource, parse_date},
};

/// Number of rows read from each "recent content" source.
pub const RECENT_PER_SOURCE: i64 = 3;
/// Length of the merged recent list.
pub const RECENT_LIMIT: usize = 5;

async fn count_or_zero(repo: &RepositoryState, resource: Resource) -> i64 {
    repo.count(resource).await.unwrap_or_else(|e| {
        tracing::warn!(table = resource.table(), error = %e, "count failed, reporting 0");
        0
    })
}

async fn recent(repo: &RepositoryState, resource: Resource, kind: &str) -> Vec<RecentItem> {
    match repo.list(resource, "date", false, Some(RECENT_PER_SOURCE)).await {
        Ok(rows) => rows.iter().map(|row| recent_item(row, kind)).collect(),
        Err(e) => {
            tracing::warn!(table = resource.table(), error = %e, "recent items unavailable");
            Vec::new()
        }
    }
}

fn recent_item(row: &Record, kind: &str) -> RecentItem {
    let text = |field: &str| {
        row.get(field)
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string()
    };
    RecentItem {
        id: text("id"),
        title: text("title"),
        date: text("date"),
        kind: kind.to_string(),
    }
}

/// summary
///
/// Builds the dashboard: every count query is issued at once, then both recent
/// lists at once. A failed count shows as 0 and a failed list contributes nothing;
/// the dashboard itself never fails.
pub async fn summary(repo: &RepositoryState) -> DashboardSummary {
    let (players, blogs, videos, news, sponsors) = tokio::join!(
        count_or_zero(repo, Resource::Players),
        count_or_zero(repo, Resource::Blogs),
        count_or_zero(repo, Resource::Videos),
        count_or_zero(repo, Resource::News),
        count_or_zero(repo, Resource::Sponsors),
    );

    let (recent_blogs, recent_news) = tokio::join!(
        recent(repo, Resource::Blogs, "Blog"),
        recent(repo, Resource::News, "News"),
    );

    DashboardSummary {
        counts: ResourceCounts {
            players,
            blogs,
            videos,
            news,
            sponsors,
        },
        recent: merge_recent(recent_blogs, recent_news),
    }
}

/// merge_recent
///
/// Concatenates blogs then news, sorts by date descending and keeps the first
/// `RECENT_LIMIT`. The sort is stable, so equal dates keep blogs ahead of news.
/// Items whose date does not parse go to the end.
pub fn merge_recent(blogs: Vec<RecentItem>, news: Vec<RecentItem>) -> Vec<RecentItem> {
    let mut items: Vec<RecentItem> = blogs.into_iter().chain(news).collect();
    items.sort_by(|a, b| match (parse_date(&a.date), parse_date(&b.date)) {
        (Some(x), Some(y)) => y.cmp(&x),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });
    items.truncate(RECENT_LIMIT);
    items
}
