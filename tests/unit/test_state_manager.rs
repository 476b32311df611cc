use launchpad::core::config::StateLayout;
use launchpad::core::entities::ProjectMeta;
use launchpad::core::StateManager;
use std::fs;
use tempfile::TempDir;

fn linked_meta() -> ProjectMeta {
    let mut meta = ProjectMeta::new("a_123");
    meta.name = Some("demo".to_string());
    meta.alias = Some("demo-app".to_string());
    meta
}

#[test]
fn test_store_then_get_returns_same_meta() {
    let temp_dir = TempDir::new().unwrap();
    let manager = StateManager::initialize(Some(temp_dir.path().to_path_buf()), true).unwrap();

    manager.store_meta(&linked_meta()).unwrap();

    let loaded = manager.get_meta().unwrap();
    assert_eq!(loaded, Some(linked_meta()));
    assert!(manager.is_initialized().unwrap());
}

#[test]
fn test_extra_fields_survive_and_cannot_shadow_identity() {
    let temp_dir = TempDir::new().unwrap();
    let manager = StateManager::initialize(Some(temp_dir.path().to_path_buf()), true).unwrap();
    let mut meta = linked_meta();
    meta.extra.insert("region".to_string(), serde_json::json!("eu"));
    meta.extra.insert("name".to_string(), serde_json::json!("shadow"));

    manager.store_meta(&meta).unwrap();

    let loaded = manager.get_meta().unwrap().unwrap();
    assert_eq!(loaded, meta.canonical());
    assert_eq!(loaded.name.as_deref(), Some("demo"));
    assert_eq!(loaded.extra.get("region"), Some(&serde_json::json!("eu")));
}

#[test]
fn test_missing_meta_is_absence_not_failure() {
    let temp_dir = TempDir::new().unwrap();
    let manager = StateManager::initialize(Some(temp_dir.path().to_path_buf()), false).unwrap();

    assert_eq!(manager.get_meta().unwrap(), None);
    assert!(!manager.is_initialized().unwrap());
    assert!(!manager.state_dir().exists());
}

#[test]
fn test_store_overwrites_previous_meta() {
    let temp_dir = TempDir::new().unwrap();
    let manager = StateManager::initialize(Some(temp_dir.path().to_path_buf()), true).unwrap();

    manager.store_meta(&linked_meta()).unwrap();
    manager.store_meta(&ProjectMeta::new("a_456")).unwrap();

    let loaded = manager.get_meta().unwrap().unwrap();
    assert_eq!(loaded.id, "a_456");
    assert_eq!(loaded.name, None);
}

#[test]
fn test_corrupt_meta_is_an_error() {
    let temp_dir = TempDir::new().unwrap();
    let manager = StateManager::initialize(Some(temp_dir.path().to_path_buf()), true).unwrap();
    fs::write(manager.meta_path(), b"{not json").unwrap();

    let err = manager.get_meta().unwrap_err();
    assert_eq!(err.operation(), Some("decode project meta"));
}

#[test]
fn test_store_meta_writes_readme_notes() {
    let temp_dir = TempDir::new().unwrap();
    let manager = StateManager::initialize(Some(temp_dir.path().to_path_buf()), true).unwrap();

    manager.store_meta(&linked_meta()).unwrap();

    let notes = fs::read_to_string(manager.state_dir().join("README")).unwrap();
    assert!(notes.contains("Don't commit this folder (.launchpad)"));
}

#[test]
fn test_custom_layout_is_respected() {
    let temp_dir = TempDir::new().unwrap();
    let layout = StateLayout {
        dir_name: ".state".to_string(),
        meta_file: "project.json".to_string(),
        readme_file: "NOTES".to_string(),
    };
    let manager =
        StateManager::with_layout(Some(temp_dir.path().to_path_buf()), true, layout).unwrap();

    manager.store_meta(&linked_meta()).unwrap();

    assert!(temp_dir.path().join(".state").join("project.json").exists());
    assert!(temp_dir.path().join(".state").join("NOTES").exists());
}

#[cfg(unix)]
#[test]
fn test_state_files_deny_other_users() {
    use std::os::unix::fs::PermissionsExt;

    let temp_dir = TempDir::new().unwrap();
    let manager = StateManager::initialize(Some(temp_dir.path().to_path_buf()), true).unwrap();
    manager.store_meta(&linked_meta()).unwrap();

    let dir_mode = fs::metadata(manager.state_dir()).unwrap().permissions().mode();
    let file_mode = fs::metadata(manager.meta_path()).unwrap().permissions().mode();
    assert_eq!(dir_mode & 0o007, 0);
    assert_eq!(file_mode & 0o007, 0);
    assert_eq!(file_mode & 0o111, 0);
}

#[test]
fn test_gitignore_created_with_state_dir() {
    let temp_dir = TempDir::new().unwrap();
    let manager = StateManager::initialize(Some(temp_dir.path().to_path_buf()), false).unwrap();

    manager.ensure_gitignored().unwrap();

    let contents = fs::read_to_string(temp_dir.path().join(".gitignore")).unwrap();
    assert_eq!(contents, ".launchpad");
}

#[test]
fn test_gitignore_is_idempotent() {
    let temp_dir = TempDir::new().unwrap();
    let manager = StateManager::initialize(Some(temp_dir.path().to_path_buf()), false).unwrap();

    let gitignore = temp_dir.path().join(".gitignore");

    manager.ensure_gitignored().unwrap();
    let first = fs::read_to_string(&gitignore).unwrap();
    manager.ensure_gitignored().unwrap();

    assert_eq!(fs::read_to_string(&gitignore).unwrap(), first);
}

#[test]
fn test_gitignore_append_is_idempotent() {
    let temp_dir = TempDir::new().unwrap();
    let gitignore = temp_dir.path().join(".gitignore");
    fs::write(&gitignore, "node_modules
target/
").unwrap();
    let manager = StateManager::initialize(Some(temp_dir.path().to_path_buf()), false).unwrap();

    manager.ensure_gitignored().unwrap();
    let first = fs::read_to_string(&gitignore).unwrap();
    manager.ensure_gitignored().unwrap();

    assert_eq!(first, "node_modules\ntarget/\n\n.launchpad");
    assert_eq!(fs::read_to_string(&gitignore).unwrap(), first);
}

#[test]
fn test_gitignore_append_keeps_existing_entries() {
    let temp_dir = TempDir::new().unwrap();
    let gitignore = temp_dir.path().join(".gitignore");
    fs::write(&gitignore, "node_modules").unwrap();
    let manager = StateManager::initialize(Some(temp_dir.path().to_path_buf()), false).unwrap();

    manager.ensure_gitignored().unwrap();

    let contents = fs::read_to_string(&gitignore).unwrap();
    assert_eq!(contents, "node_modules\n.launchpad");
}

#[test]
fn test_gitignore_with_existing_entry_is_untouched() {
    let temp_dir = TempDir::new().unwrap();
    let gitignore = temp_dir.path().join(".gitignore");
    fs::write(&gitignore, "target\n.launchpad/\n").unwrap();
    let manager = StateManager::initialize(Some(temp_dir.path().to_path_buf()), false).unwrap();

    manager.ensure_gitignored().unwrap();

    assert_eq!(fs::read_to_string(&gitignore).unwrap(), "target\n.launchpad/\n");
}

#[test]
fn test_gitignore_prefix_of_longer_name_is_not_a_match() {
    let temp_dir = TempDir::new().unwrap();
    let gitignore = temp_dir.path().join(".gitignore");
    fs::write(&gitignore, ".launchpadrc").unwrap();
    let manager = StateManager::initialize(Some(temp_dir.path().to_path_buf()), false).unwrap();

    manager.ensure_gitignored().unwrap();

    assert_eq!(fs::read_to_string(&gitignore).unwrap(), ".launchpadrc\n.launchpad");
}
