use atelier_applications::{ProviderApplicationsFilter, provider_search_query};
use atelier_domain::status::ApplicationStatus;

fn query_for(
    filter: &ProviderApplicationsFilter,
    blocked: &[String],
) -> (String, Vec<String>) {
    let query = provider_search_query("p1", filter, blocked);
    let binds = query.binds().iter().map(|(name, _)| name.clone()).collect();
    (query.build(), binds)
}

#[test]
fn default_listing_hides_terminal_and_draft_states() {
    let (sql, _) = query_for(&ProviderApplicationsFilter::default(), &[]);

    assert!(sql.contains("opportunity.provider = type::thing('provider', $provider)"));
    assert!(sql.contains("status NOT IN ['new', 'archived', 'rejected', 'archived_by_artist']"));
    assert!(sql.contains("artist.moderation = 'approved'"));
    assert!(sql.contains("artist.user.locked = false"));
}

#[test]
fn explicit_statuses_still_exclude_artist_private_states() {
    let filter = ProviderApplicationsFilter {
        status: Some(vec![ApplicationStatus::Rejected, ApplicationStatus::Archived]),
        ..Default::default()
    };
    let (sql, binds) = query_for(&filter, &[]);

    assert!(sql.contains("status IN $statuses"));
    assert!(sql.contains("status NOT IN ['new', 'archived_by_artist']"));
    assert!(binds.contains(&"statuses".to_owned()));
}

#[test]
fn shortlisted_rows_rank_first() {
    let (sql, _) = query_for(&ProviderApplicationsFilter::default(), &[]);
    assert!(sql.contains("(status = 'shortlisted') AS shortlisted_first"));
    assert!(sql.contains("ORDER BY shortlisted_first DESC, id DESC"));
}

#[test]
fn fuzzy_filters_contribute_lowercased_binds() {
    let filter = ProviderApplicationsFilter {
        applicant: Some("Maja Kowalska".into()),
        message: Some("Mural".into()),
        ..Default::default()
    };
    let query = provider_search_query("p1", &filter, &[]);
    let sql = query.build();

    assert!(sql.contains("string::lowercase(artist.search_text)"));
    assert!(sql.contains("string::lowercase(message)"));

    let applicant_bind = query
        .binds()
        .iter()
        .find(|(name, _)| name == "applicant")
        .map(|(_, value)| value.clone());
    assert_eq!(
        applicant_bind,
        Some(atelier_database::BindValue::Str("maja kowalska".into()))
    );
}

#[test]
fn short_fuzzy_terms_are_ignored() {
    let filter = ProviderApplicationsFilter { applicant: Some("ab".into()), ..Default::default() };
    let (sql, binds) = query_for(&filter, &[]);

    assert!(!sql.contains("$applicant"));
    assert!(!binds.contains(&"applicant".to_owned()));
}

#[test]
fn project_text_filter_requires_an_approved_project() {
    let filter =
        ProviderApplicationsFilter { project: Some("installation".into()), ..Default::default() };
    let (sql, _) = query_for(&filter, &[]);

    assert!(sql.contains("project != NONE"));
    assert!(sql.contains("project.moderation = 'approved'"));

    // Without the filter, project-less applications remain visible.
    let (default_sql, _) = query_for(&ProviderApplicationsFilter::default(), &[]);
    assert!(default_sql.contains("project = NONE OR"));
}

#[test]
fn blocked_artists_are_excluded_unless_requested() {
    let blocked = vec!["a9".to_owned()];

    let (sql, binds) = query_for(&ProviderApplicationsFilter::default(), &blocked);
    assert!(sql.contains("record::id(artist) NOT IN $blocked"));
    assert!(binds.contains(&"blocked".to_owned()));

    let show = ProviderApplicationsFilter { show_blocked: true, ..Default::default() };
    let (sql, binds) = query_for(&show, &blocked);
    assert!(!sql.contains("$blocked"));
    assert!(!binds.contains(&"blocked".to_owned()));

    // No block list, nothing to exclude.
    let (sql, _) = query_for(&ProviderApplicationsFilter::default(), &[]);
    assert!(!sql.contains("$blocked"));
}

#[test]
fn opportunity_scope_narrows_the_search() {
    let filter = ProviderApplicationsFilter {
        opportunity: Some(vec!["o1".into(), "o2".into()]),
        ..Default::default()
    };
    let (sql, binds) = query_for(&filter, &[]);

    assert!(sql.contains("record::id(opportunity) IN $opportunities"));
    assert!(binds.contains(&"opportunities".to_owned()));
}
