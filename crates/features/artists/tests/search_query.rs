use atelier_artists::{ArtistSearchFilter, Viewer};
use atelier_domain::vocab::{Country, Language};

// The composed statement is plain text, so the shape of each filter's
// contribution can be asserted without a database.

fn query_for(filter: &ArtistSearchFilter, viewer: Viewer) -> (String, Vec<String>) {
    let query = atelier_artists::search_query(filter, viewer);
    let binds = query.binds().iter().map(|(name, _)| name.clone()).collect();
    (query.build(), binds)
}

#[test]
fn bare_search_filters_visibility_only() {
    let (sql, binds) = query_for(&ArtistSearchFilter::default(), Viewer::Public);

    assert!(sql.contains("FROM artist"));
    assert!(sql.contains("user.locked = false"));
    assert!(sql.contains("moderation = 'approved'"));
    assert!(!sql.contains("search::score"));
    assert!(sql.contains("ORDER BY id DESC"));
    assert!(sql.contains("LIMIT 9"));
    assert!(binds.is_empty());
}

#[test]
fn keyword_adds_relevance_projection_and_order() {
    let filter = ArtistSearchFilter { artist: Some("mural painting".into()), ..Default::default() };
    let (sql, binds) = query_for(&filter, Viewer::Public);

    assert!(sql.contains("search::score(0) AS relevance"));
    assert!(sql.contains("search_text @0@ $artist_text"));
    assert!(sql.contains("ORDER BY exact_hit DESC, relevance DESC, id DESC"));
    assert!(binds.contains(&"artist_text".to_owned()));
    assert!(binds.contains(&"artist_lower".to_owned()));
}

#[test]
fn short_keyword_is_ignored() {
    let filter = ArtistSearchFilter { artist: Some("ab".into()), ..Default::default() };
    let (sql, binds) = query_for(&filter, Viewer::Public);

    assert!(!sql.contains("search::score"));
    assert!(!binds.contains(&"artist_text".to_owned()));
}

#[test]
fn vocab_filters_contribute_their_clauses() {
    let filter = ArtistSearchFilter {
        language: Some(vec![Language::English, Language::Polish]),
        country_residence: Some(vec![Country::Poland]),
        age_from: Some(18),
        ..Default::default()
    };
    let (sql, binds) = query_for(&filter, Viewer::Public);

    assert!(sql.contains("languages CONTAINSALL $languages"));
    assert!(sql.contains("country_residence INSIDE $residence"));
    assert!(sql.contains("birth_day <= $born_before"));
    assert!(binds.contains(&"languages".to_owned()));
    assert!(binds.contains(&"residence".to_owned()));
    assert!(binds.contains(&"born_before".to_owned()));
}

#[test]
fn project_parameters_use_membership_subquery() {
    let filter = ArtistSearchFilter { budget: Some(5000), ..Default::default() };
    let (sql, binds) = query_for(&filter, Viewer::Public);

    assert!(sql.contains("id IN (SELECT VALUE artist FROM project"));
    assert!(sql.contains("budget <= $budget"));
    assert!(binds.contains(&"budget".to_owned()));
}

#[test]
fn include_project_roots_the_query_at_projects() {
    let filter = ArtistSearchFilter {
        include_project: true,
        project: Some("installation".into()),
        ..Default::default()
    };
    let (sql, _) = query_for(&filter, Viewer::Public);

    assert!(sql.contains("FROM project"));
    assert!(sql.contains("artist.moderation = 'approved'"));
    assert!(sql.contains("search::score(0) AS project_relevance"));
    assert!(sql.contains("title AS project_title"));
}

#[test]
fn provider_viewer_sees_contact_fields() {
    let (public_sql, _) = query_for(&ArtistSearchFilter::default(), Viewer::Public);
    let (provider_sql, _) = query_for(&ArtistSearchFilter::default(), Viewer::Provider);
    let (admin_sql, _) = query_for(&ArtistSearchFilter::default(), Viewer::Admin);

    assert!(!public_sql.contains("user.email"));
    assert!(provider_sql.contains("user.email AS email"));
    assert!(!provider_sql.contains("admin_mark"));
    assert!(admin_sql.contains("admin_mark"));
}

#[test]
fn pagination_is_one_based() {
    let filter = ArtistSearchFilter { page: Some(3), ..Default::default() };
    let (sql, _) = query_for(&filter, Viewer::Public);
    assert!(sql.contains("LIMIT 9 START 18"));
}
