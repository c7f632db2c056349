use serde_json::{Value, json};
use zero_strikes_admin::{
    AdminError, Record, Resource,
    catalog::decode_rows,
    models::{BlogPost, Player},
    resource::{SPONSOR_TIERS, parse_date},
};

// --- Test Utilities ---

fn record(value: Value) -> Record {
    match value {
        Value::Object(map) => map,
        other => panic!("expected a JSON object, got {other}"),
    }
}

fn valid_player() -> Record {
    let mut draft = Resource::Players.schema().empty_template();
    draft.extend(record(json!({
        "name": "Viper",
        "real_name": "Jonas Berg",
        "role": "Entry Fragger",
        "country": "Sweden",
        "age": 21
    })));
    draft
}

fn validation_field(err: AdminError) -> String {
    match err {
        AdminError::Validation { field, .. } => field,
        other => panic!("expected a validation error, got {other:?}"),
    }
}

// --- Templates ---

#[test]
fn test_empty_templates_carry_defaults() {
    let player = Resource::Players.schema().empty_template();
    assert_eq!(player["age"], json!(18));
    assert_eq!(player["win_rate"], json!("0%"));
    assert_eq!(player["kd"], json!("0.0"));
    assert_eq!(player["name"], json!(""));

    let blog = Resource::Blogs.schema().empty_template();
    assert_eq!(blog["read_time"], json!("5 min read"));
    assert_eq!(blog["category"], json!("Strategy"));
    assert_eq!(blog["tags"], json!([]));
    // The publication date defaults to today
    assert!(parse_date(blog["date"].as_str().unwrap()).is_some());

    let video = Resource::Videos.schema().empty_template();
    assert_eq!(video["featured"], json!(false));
    assert_eq!(video["category"], json!("Highlights"));

    let sponsor = Resource::Sponsors.schema().empty_template();
    assert_eq!(sponsor["tier"], json!("Official Partner"));
}

#[test]
fn test_draft_from_fills_missing_and_null_columns() {
    let schema = Resource::News.schema();
    let row = record(json!({
        "id": "7f1f6a4e-1d3e-4c55-9d7a-2f0a8c1d2b3c",
        "title": "Roster update",
        "excerpt": "Changes",
        "date": "2025-01-25",
        "category": null,
        "created_at": "2025-01-25T10:00:00+00:00"
    }));

    let draft = schema.draft_from(&row);

    assert_eq!(draft["title"], json!("Roster update"));
    assert_eq!(draft["category"], json!("Update"));
    assert_eq!(draft["featured"], json!(false));
    // Generated columns never enter the draft
    assert!(!draft.contains_key("id"));
    assert!(!draft.contains_key("created_at"));
}

// --- Validation ---

#[test]
fn test_valid_player_passes_validation() {
    let payload = Resource::Players.schema().validate(&valid_player()).unwrap();
    assert_eq!(payload["name"], json!("Viper"));
    assert_eq!(payload["age"], json!(21));
}

#[test]
fn test_empty_required_field_is_rejected() {
    let mut draft = valid_player();
    draft.insert("name".into(), json!("   "));

    let err = Resource::Players.schema().validate(&draft).unwrap_err();
    assert_eq!(validation_field(err), "name");
}

#[test]
fn test_numeric_strings_are_converted() {
    let mut draft = valid_player();
    draft.insert("age".into(), json!("24"));
    draft.insert("kills".into(), json!(" 1500 "));

    let payload = Resource::Players.schema().validate(&draft).unwrap();
    assert_eq!(payload["age"], json!(24));
    assert_eq!(payload["kills"], json!(1500));
}

#[test]
fn test_non_numeric_integer_is_rejected() {
    let mut draft = valid_player();
    draft.insert("age".into(), json!("twenty"));

    let err = Resource::Players.schema().validate(&draft).unwrap_err();
    assert_eq!(validation_field(err), "age");
}

#[test]
fn test_integers_must_fit_the_column() {
    let mut draft = valid_player();
    draft.insert("kills".into(), json!(3_000_000_000i64));
    let err = Resource::Players.schema().validate(&draft).unwrap_err();
    assert_eq!(validation_field(err), "kills");

    draft.insert("kills".into(), json!("2147483648"));
    let err = Resource::Players.schema().validate(&draft).unwrap_err();
    assert_eq!(validation_field(err), "kills");

    draft.insert("kills".into(), json!(i32::MAX));
    assert!(Resource::Players.schema().validate(&draft).is_ok());
}

#[test]
fn test_unknown_keys_are_dropped_from_payload() {
    let mut draft = valid_player();
    draft.insert("id".into(), json!("not-a-column-to-write"));
    draft.insert("is_admin".into(), json!(true));

    let payload = Resource::Players.schema().validate(&draft).unwrap();
    assert!(!payload.contains_key("id"));
    assert!(!payload.contains_key("is_admin"));
}

#[test]
fn test_blog_dates_are_normalized() {
    let mut draft = Resource::Blogs.schema().empty_template();
    draft.extend(record(json!({
        "title": "Smokes on Mirage",
        "excerpt": "Three lineups",
        "author": "Coach K",
        "date": "2025-01-28T18:30:00Z"
    })));

    let payload = Resource::Blogs.schema().validate(&draft).unwrap();
    assert_eq!(payload["date"], json!("2025-01-28"));

    draft.insert("date".into(), json!("28/01/2025"));
    let err = Resource::Blogs.schema().validate(&draft).unwrap_err();
    assert_eq!(validation_field(err), "date");
}

#[test]
fn test_tags_are_trimmed_and_deduplicated() {
    let mut draft = Resource::Blogs.schema().empty_template();
    draft.extend(record(json!({
        "title": "Utility",
        "excerpt": "Grenades",
        "author": "Coach K",
        "tags": [" combat ", "combat", "", "mirage"]
    })));

    let payload = Resource::Blogs.schema().validate(&draft).unwrap();
    assert_eq!(payload["tags"], json!(["combat", "mirage"]));
}

#[test]
fn test_sponsor_tier_must_be_a_known_label() {
    let schema = Resource::Sponsors.schema();
    let mut draft = schema.empty_template();
    draft.insert("name".into(), json!("HyperX"));

    for tier in SPONSOR_TIERS {
        draft.insert("tier".into(), json!(tier));
        assert!(schema.validate(&draft).is_ok(), "tier {tier} should be accepted");
    }

    draft.insert("tier".into(), json!("Gold"));
    let err = schema.validate(&draft).unwrap_err();
    assert_eq!(validation_field(err), "tier");
}

#[test]
fn test_categories_are_advisory() {
    let schema = Resource::Videos.schema();
    let mut draft = schema.empty_template();
    draft.extend(record(json!({
        "title": "Ace clutch",
        "youtube_id": "dQw4w9WgXcQ",
        "category": "Behind the Scenes"
    })));

    assert!(schema.validate(&draft).is_ok());
    assert!(schema.labels_for("category").is_some());
}

// --- Resource Names ---

#[test]
fn test_resource_parsing() {
    assert_eq!("sponsors".parse::<Resource>().unwrap(), Resource::Sponsors);
    assert_eq!(Resource::News.table(), "news");
    assert!("profiles".parse::<Resource>().is_err());
}

// --- Typed Decoding ---

#[test]
fn test_decode_rows_tolerates_null_columns() {
    let rows = vec![record(json!({
        "id": "7f1f6a4e-1d3e-4c55-9d7a-2f0a8c1d2b3c",
        "name": "Viper",
        "real_name": "Jonas Berg",
        "role": "AWPer",
        "country": "Sweden",
        "age": 21,
        "image": null,
        "twitter": null,
        "created_at": "2025-01-20T09:00:00.123456+00:00"
    }))];

    let players: Vec<Player> = decode_rows(Resource::Players, rows);
    assert_eq!(players.len(), 1);
    assert_eq!(players[0].image, "");
    assert!(players[0].created_at.is_some());
}

#[test]
fn test_decode_rows_skips_malformed_rows() {
    let rows = vec![
        record(json!({ "title": "Good", "tags": ["a"] })),
        record(json!({ "title": "Bad", "tags": "not-a-list" })),
    ];

    let blogs: Vec<BlogPost> = decode_rows(Resource::Blogs, rows);
    assert_eq!(blogs.len(), 1);
    assert_eq!(blogs[0].title, "Good");
}
