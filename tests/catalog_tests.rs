use zero_strikes_admin::{
    catalog::{filter_blogs, group_by_tier, news_feed, video_feed},
    models::{BlogPost, NewsItem, Sponsor, Video},
};

fn blog(title: &str, category: &str) -> BlogPost {
    BlogPost {
        title: title.to_string(),
        category: category.to_string(),
        ..BlogPost::default()
    }
}

fn news(title: &str, category: &str, featured: bool) -> NewsItem {
    NewsItem {
        title: title.to_string(),
        category: category.to_string(),
        featured,
        ..NewsItem::default()
    }
}

fn video(title: &str, category: &str, featured: bool) -> Video {
    Video {
        title: title.to_string(),
        category: category.to_string(),
        featured,
        ..Video::default()
    }
}

fn sponsor(name: &str, tier: &str) -> Sponsor {
    Sponsor {
        name: name.to_string(),
        tier: tier.to_string(),
        ..Sponsor::default()
    }
}

#[test]
fn test_filter_blogs_by_category_and_search() {
    let blogs = vec![
        blog("Mirage smokes", "Strategy"),
        blog("Bootcamp diary", "Team"),
        blog("Inferno retakes", "Strategy"),
    ];

    let all = filter_blogs(blogs.clone(), Some("All"), None);
    assert_eq!(all.len(), 3);

    let strategy = filter_blogs(blogs.clone(), Some("Strategy"), None);
    assert_eq!(strategy.len(), 2);

    let searched = filter_blogs(blogs, Some("Strategy"), Some("  MIRAGE "));
    assert_eq!(searched.len(), 1);
    assert_eq!(searched[0].title, "Mirage smokes");
}

#[test]
fn test_news_feed_picks_featured_before_filtering() {
    let items = vec![
        news("Roster move", "Team", false),
        news("Major win", "Tournament", true),
        news("Patch notes", "Update", false),
    ];

    let feed = news_feed(items, Some("Update"), None);

    assert_eq!(feed.featured.map(|n| n.title), Some("Major win".to_string()));
    let titles: Vec<_> = feed.articles.iter().map(|n| n.title.as_str()).collect();
    assert_eq!(titles, vec!["Patch notes"]);
}

#[test]
fn test_news_feed_without_featured() {
    let feed = news_feed(vec![news("Roster move", "Team", false)], None, Some(""));
    assert!(feed.featured.is_none());
    assert_eq!(feed.articles.len(), 1);
}

#[test]
fn test_video_feed() {
    let videos = vec![
        video("Ace", "Highlights", true),
        video("Vlog", "Behind the Scenes", false),
        video("Clutch", "Highlights", false),
    ];

    let feed = video_feed(videos, Some("Highlights"));

    assert_eq!(feed.featured.len(), 1);
    assert_eq!(feed.videos.len(), 2);
}

#[test]
fn test_group_by_tier_uses_canonical_order_and_skips_empty() {
    let sponsors = vec![
        sponsor("Monster", "Official Partner"),
        sponsor("HyperX", "Title Sponsor"),
        sponsor("Razer", "Official Partner"),
        sponsor("Mystery", "Gold"),
    ];

    let groups = group_by_tier(sponsors);

    let tiers: Vec<_> = groups.iter().map(|g| (g.tier.as_str(), g.count)).collect();
    assert_eq!(tiers, vec![("Title Sponsor", 1), ("Official Partner", 2)]);
}
