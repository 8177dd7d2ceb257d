//! Unit tests for ServiceContentStore.

use std::fs;

use tempfile::TempDir;

use crate::content::{ContentError, ServiceContentStore};

fn store_with(files: &[(&str, &str)]) -> (TempDir, ServiceContentStore) {
    let dir = TempDir::new().unwrap();
    let services = dir.path().join("services");
    fs::create_dir_all(&services).unwrap();
    for (name, body) in files {
        fs::write(services.join(name), body).unwrap();
    }
    let store = ServiceContentStore::new(dir.path());
    (dir, store)
}

/// **Test: Existing slug returns the markdown verbatim.**
#[test]
fn test_load_existing_service() {
    let (_dir, store) = store_with(&[("apostillas.md", "# Apostillas\n\nTrámite rápido.\n")]);

    let content = store.load("apostillas").unwrap();

    assert_eq!(content, "# Apostillas\n\nTrámite rápido.\n");
}

/// **Test: Missing slug is NotFound (404).**
#[test]
fn test_missing_service_is_not_found() {
    let (_dir, store) = store_with(&[]);

    let err = store.load("traducciones").unwrap_err();

    assert!(matches!(err, ContentError::NotFound(ref s) if s == "traducciones"));
    assert_eq!(err.status_code(), 404);
}

/// **Test: Traversal attempts never leave services/.**
///
/// **Setup:** A file one level above services/.
/// **Expected:** Every escaping slug is NotFound.
#[test]
fn test_traversal_slugs_are_not_found() {
    let (dir, store) = store_with(&[]);
    fs::write(dir.path().join("secret.md"), "no").unwrap();

    for slug in ["../secret", "..", "a/b", "a\\b", ""] {
        let err = store.load(slug).unwrap_err();
        assert_eq!(err.status_code(), 404, "slug {:?}", slug);
    }
}

/// **Test: A read failure other than not-found is Read (500).**
///
/// **Setup:** `services/<slug>.md` is a directory, so reading it fails.
#[test]
fn test_unreadable_service_is_internal_error() {
    let (dir, store) = store_with(&[]);
    fs::create_dir_all(dir.path().join("services").join("broken.md")).unwrap();

    let err = store.load("broken").unwrap_err();

    assert!(matches!(err, ContentError::Read(_)));
    assert_eq!(err.status_code(), 500);
}
