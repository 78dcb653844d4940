use atelier_domain::config::{ApiConfig, DatabaseConfig, SchedulerConfig, ServerConfig, StorageConfig};
use serde_json::json;

#[test]
fn config_defaults_are_sane() {
    let server = ServerConfig::default();
    assert_eq!(server.port, 4710);
    assert!(server.ssl.is_none());

    let db = DatabaseConfig::default();
    assert_eq!(db.url, "mem://");
    assert_eq!(db.namespace, "atelier");
    assert_eq!(db.database, "core");
    assert!(db.credentials.is_some());

    let storage = StorageConfig::default();
    assert_eq!(storage.data_dir, std::path::PathBuf::from("data"));
    assert_eq!(storage.max_upload_mb, 25);

    let scheduler = SchedulerConfig::default();
    assert_eq!(scheduler.deadline_minutes, vec![1440, 10080]);
}

#[test]
fn api_config_deserializes() {
    let raw = json!({
        "server": { "address": "::", "port": 8080 },
        "database": { "url": "mem://", "namespace": "n", "database": "d", "credentials": null },
        "storage": { "data_dir": "/tmp/data", "max_upload_mb": 5 },
        "scheduler": { "token": "t0ken", "deadline_minutes": [60] }
    });

    let cfg: ApiConfig = serde_json::from_value(raw).expect("config deserialize");
    assert_eq!(cfg.server.port, 8080);
    assert_eq!(cfg.database.namespace, "n");
    assert_eq!(cfg.storage.max_upload_mb, 5);
    assert_eq!(cfg.scheduler.token, "t0ken");
    assert!(cfg.mail.admin_emails.is_empty());
}

#[test]
fn link_templates() {
    let cfg = ApiConfig::default();
    assert_eq!(
        cfg.links.artist_invite("abc"),
        "http://localhost:3000/artist/registration/abc"
    );
    assert!(cfg.links.artist_invites_page().ends_with("?invite=invites"));
}
