use atelier_kernel::security::RecordGuard;

#[test]
fn record_guard_strips_and_validates() {
    assert_eq!(RecordGuard::verify("user:123", "user").unwrap(), "123");

    assert_eq!(RecordGuard::verify("123", "user").unwrap(), "123");

    assert!(RecordGuard::verify("system:123", "user").is_err());
}
