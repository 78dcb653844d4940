use atelier_domain::roles::RoleSet;

#[test]
fn role_names_match_flags() {
    let roles = RoleSet::PROVIDER | RoleSet::MODERATOR;
    assert_eq!(roles.names(), vec!["provider", "moderator"]);
    assert_eq!(roles.count(), 2);
}

#[test]
fn parse_from_str() {
    assert_eq!(RoleSet::from("artist"), RoleSet::ARTIST);
    assert_eq!(RoleSet::from("*"), RoleSet::ALL);
    assert_eq!(RoleSet::from("unknown"), RoleSet::empty());
}

#[test]
fn serde_round_trip_as_bits() {
    let roles = RoleSet::ARTIST | RoleSet::CONTENT_MANAGER;
    let json = serde_json::to_string(&roles).unwrap();
    assert_eq!(json, roles.bits().to_string());

    let back: RoleSet = serde_json::from_str(&json).unwrap();
    assert_eq!(back, roles);
}
