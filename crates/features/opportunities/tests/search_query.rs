use atelier_domain::status::OpportunityKind;
use atelier_domain::vocab::{Gender, LegalStatus};
use atelier_opportunities::{InviteRelation, OpportunityFilter, SearchViewer, search_query};

fn query_for(filter: &OpportunityFilter, viewer: &SearchViewer) -> (String, Vec<String>) {
    let query = search_query(filter, viewer);
    let binds = query.binds().iter().map(|(name, _)| name.clone()).collect();
    (query.build(), binds)
}

#[test]
fn public_viewer_sees_open_listings_only() {
    let (sql, binds) = query_for(&OpportunityFilter::default(), &SearchViewer::default());

    assert!(sql.contains("visibility = 'all'"));
    assert!(!sql.contains("invited"));
    assert!(sql.contains("provider.user.locked = false"));
    assert!(sql.contains("banned = false"));
    assert!(sql.contains("application_deadline >= $today"));
    assert!(sql.contains("LIMIT 6"));
    assert!(binds.contains(&"today".to_owned()));
}

#[test]
fn admin_viewer_also_sees_invited_listings() {
    let viewer = SearchViewer { artist_id: None, is_admin: true };
    let (sql, _) = query_for(&OpportunityFilter::default(), &viewer);
    assert!(sql.contains("visibility IN ['all', 'invited']"));
}

#[test]
fn artist_viewer_gets_invite_projection_and_visibility() {
    let viewer = SearchViewer { artist_id: Some("a1".into()), is_admin: false };
    let (sql, binds) = query_for(&OpportunityFilter::default(), &viewer);

    assert!(sql.contains("AS invite_status"));
    assert!(sql.contains("visibility = 'invited'"));
    assert!(binds.contains(&"viewer".to_owned()));
}

#[test]
fn keyword_adds_relevance_ordering() {
    let filter = OpportunityFilter { keyword: Some("residency".into()), ..Default::default() };
    let (sql, _) = query_for(&filter, &SearchViewer::default());

    assert!(sql.contains("search::score(0) AS relevance"));
    assert!(sql.contains("search_text @0@ $keyword"));
    assert!(sql.contains("exact_hit DESC, relevance DESC"));
}

#[test]
fn grant_range_filters_are_null_tolerant() {
    let filter = OpportunityFilter {
        kind: Some(OpportunityKind::Grant),
        grant_from: Some(1000),
        grant_to: Some(5000),
        ..Default::default()
    };
    let (sql, binds) = query_for(&filter, &SearchViewer::default());

    assert!(sql.contains("kind = $kind"));
    assert!(sql.contains("max_grant_amount = NONE OR max_grant_amount >= $grant_from"));
    assert!(sql.contains("min_grant_amount = NONE OR min_grant_amount <= $grant_to"));
    assert!(sql.contains("AS amount_rank"));
    assert!(sql.contains("amount_rank DESC"));
    assert!(binds.contains(&"grant_from".to_owned()));
}

#[test]
fn grant_ranges_are_ignored_for_other_kinds() {
    let filter = OpportunityFilter {
        kind: Some(OpportunityKind::Residency),
        grant_from: Some(1000),
        residency_weeks: Some(6),
        ..Default::default()
    };
    let (sql, binds) = query_for(&filter, &SearchViewer::default());

    assert!(!sql.contains("$grant_from"));
    assert!(sql.contains("min_residency_weeks <= $weeks"));
    assert!(binds.contains(&"weeks".to_owned()));
    assert!(!binds.contains(&"grant_from".to_owned()));
}

#[test]
fn eligibility_filters_treat_empty_as_unrestricted() {
    let filter = OpportunityFilter {
        legal_status: Some(LegalStatus::NonProfit),
        gender: Some(Gender::Female),
        age: Some(30),
        ..Default::default()
    };
    let (sql, _) = query_for(&filter, &SearchViewer::default());

    assert!(sql.contains("legal_statuses = [] OR $legal_status INSIDE legal_statuses"));
    assert!(sql.contains("genders = [] OR $gender INSIDE genders"));
    assert!(sql.contains("min_age = NONE OR min_age <= $age"));
    assert!(sql.contains("max_age = NONE OR max_age >= $age"));

    // Restricted listings rank above unrestricted ones.
    assert!(sql.contains("legal_rank DESC"));
    assert!(sql.contains("age_rank DESC"));
    assert!(sql.contains("gender_rank DESC"));
}

#[test]
fn invite_relation_filters_apply_to_artists_only() {
    let filter = OpportunityFilter { invite: Some(InviteRelation::InProgress), ..Default::default() };

    let (public_sql, _) = query_for(&filter, &SearchViewer::default());
    assert!(!public_sql.contains("status = 'accepted'"));

    let viewer = SearchViewer { artist_id: Some("a1".into()), is_admin: false };
    let (artist_sql, _) = query_for(&filter, &viewer);
    assert!(artist_sql.contains("status = 'accepted'"));

    let pending = OpportunityFilter { invite: Some(InviteRelation::Invites), ..Default::default() };
    let (pending_sql, _) = query_for(&pending, &viewer);
    assert!(pending_sql.contains("status IN ['pending', 'accepted']"));
}

#[test]
fn deadline_window_contributes_bounds() {
    let filter = OpportunityFilter {
        deadline_from: Some("2026-09-01".into()),
        deadline_to: Some("2026-12-31".into()),
        ..Default::default()
    };
    let (sql, binds) = query_for(&filter, &SearchViewer::default());

    assert!(sql.contains("application_deadline >= $deadline_from"));
    assert!(sql.contains("application_deadline <= $deadline_to"));
    assert!(binds.contains(&"deadline_from".to_owned()));
    assert!(binds.contains(&"deadline_to".to_owned()));
}

#[test]
fn count_statement_drops_pagination_and_order() {
    let filter = OpportunityFilter { keyword: Some("mural".into()), ..Default::default() };
    let query = search_query(&filter, &SearchViewer::default());
    let count = query.build_count();

    assert!(count.starts_with("SELECT count() AS total FROM opportunity"));
    assert!(!count.contains("LIMIT"));
    assert!(!count.contains("ORDER BY"));
    assert!(count.contains("GROUP ALL"));
}
