use super::*;
use crate::storage::MemoryStorage;

fn session_with_storage() -> (SessionState, Arc<MemoryStorage>) {
    let storage = Arc::new(MemoryStorage::new());
    let session = SessionState::new(storage.clone());
    (session, storage)
}

fn some(s: &str) -> Option<String> {
    Some(s.to_owned())
}

struct FailingStorage;

impl Storage for FailingStorage {
    fn get_item(&self, _key: &str) -> Result<Option<String>, StorageError> {
        Err(StorageError::Poisoned)
    }

    fn set_item(&self, _key: &str, _value: &str) -> Result<(), StorageError> {
        Err(StorageError::Poisoned)
    }

    fn remove_item(&self, _key: &str) -> Result<(), StorageError> {
        Err(StorageError::Poisoned)
    }
}

// =============================================================
// Defaults
// =============================================================

#[test]
fn new_session_is_empty() {
    let (session, storage) = session_with_storage();
    assert_eq!(session.access_token(), None);
    assert_eq!(session.refresh_token(), None);
    assert_eq!(session.user_id(), None);
    assert_eq!(session.user_info(), UserInfo::default());
    assert!(storage.is_empty());
}

#[test]
fn new_session_ignores_existing_storage() {
    let storage = Arc::new(MemoryStorage::new());
    storage.set_item(ACCESS_TOKEN_KEY, "stale").unwrap();
    let session = SessionState::new(storage);
    assert_eq!(session.access_token(), None);
}

// =============================================================
// Tokens
// =============================================================

#[test]
fn set_tokens_round_trips_memory_and_storage() {
    let (mut session, storage) = session_with_storage();
    session.set_tokens(some("A1"), some("R1"));

    assert_eq!(session.access_token(), Some("A1"));
    assert_eq!(session.refresh_token(), Some("R1"));
    assert_eq!(storage.get_item(ACCESS_TOKEN_KEY).unwrap().as_deref(), Some("A1"));
    assert_eq!(storage.get_item(REFRESH_TOKEN_KEY).unwrap().as_deref(), Some("R1"));
}

#[test]
fn set_tokens_accepts_arbitrary_shapes() {
    let (mut session, storage) = session_with_storage();
    session.set_tokens(some(""), some("not a jwt at all"));
    assert_eq!(session.access_token(), Some(""));
    assert_eq!(storage.get_item(REFRESH_TOKEN_KEY).unwrap().as_deref(), Some("not a jwt at all"));
}

#[test]
fn set_tokens_none_removes_keys() {
    let (mut session, storage) = session_with_storage();
    session.set_tokens(some("A1"), some("R1"));
    session.set_tokens(None, None);

    assert_eq!(session.access_token(), None);
    assert_eq!(storage.get_item(ACCESS_TOKEN_KEY).unwrap(), None);
    assert_eq!(storage.get_item(REFRESH_TOKEN_KEY).unwrap(), None);
}

// =============================================================
// User info
// =============================================================

#[test]
fn set_user_info_round_trips_from_memory() {
    let (mut session, _storage) = session_with_storage();
    session.set_user_info(some("a@b.c"), some("hunter2"), some("Ada"), some("Lovelace"), some("http://img/1"));

    let info = session.user_info();
    assert_eq!(info.email.as_deref(), Some("a@b.c"));
    assert_eq!(info.password.as_deref(), Some("hunter2"));
    assert_eq!(info.name.as_deref(), Some("Ada"));
    assert_eq!(info.surname.as_deref(), Some("Lovelace"));
    assert_eq!(info.img_url.as_deref(), Some("http://img/1"));
}

#[test]
fn user_info_reads_memory_not_storage() {
    let (mut session, storage) = session_with_storage();
    session.set_user_info(some("a@b.c"), None, some("Ada"), None, None);
    storage.set_item(USER_KEY, r#"{"name":"Other","surname":null,"email":null,"imgUrl":null}"#).unwrap();

    assert_eq!(session.user_info().name.as_deref(), Some("Ada"));
}

#[test]
fn set_user_info_persists_record_without_password() {
    let (mut session, storage) = session_with_storage();
    session.set_user_info(some("a@b.c"), some("hunter2"), some("Ada"), some("Lovelace"), some("http://img/1"));

    let raw = storage.get_item(USER_KEY).unwrap().unwrap();
    assert!(!raw.contains("hunter2"));
    assert!(!raw.contains("password"));

    let record: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(record["name"], "Ada");
    assert_eq!(record["surname"], "Lovelace");
    assert_eq!(record["email"], "a@b.c");
    assert_eq!(record["imgUrl"], "http://img/1");
}

#[test]
fn debug_output_redacts_secrets() {
    let (mut session, _storage) = session_with_storage();
    session.set_tokens(some("secret-access"), some("secret-refresh"));
    session.set_user_info(None, some("hunter2"), None, None, None);

    let rendered = format!("{session:?}");
    assert!(!rendered.contains("secret-access"));
    assert!(!rendered.contains("secret-refresh"));
    assert!(!rendered.contains("hunter2"));
}

// =============================================================
// User id
// =============================================================

#[test]
fn set_user_id_writes_through() {
    let (mut session, storage) = session_with_storage();
    session.set_user_id(some("u-42"));
    assert_eq!(session.user_id(), Some("u-42"));
    assert_eq!(storage.get_item(USER_ID_KEY).unwrap().as_deref(), Some("u-42"));
}

// =============================================================
// Clear
// =============================================================

#[test]
fn clear_nulls_tokens_and_user_but_keeps_user_id() {
    let (mut session, storage) = session_with_storage();
    session.set_tokens(some("A1"), some("R1"));
    session.set_user_info(some("a@b.c"), some("pw"), some("Ada"), None, None);
    session.set_user_id(some("u-1"));

    session.clear();

    assert_eq!(session.access_token(), None);
    assert_eq!(session.refresh_token(), None);
    assert_eq!(session.user_info(), UserInfo::default());
    assert_eq!(session.user_id(), Some("u-1"));
    assert_eq!(storage.get_item(ACCESS_TOKEN_KEY).unwrap(), None);
}

// =============================================================
// Hydrate
// =============================================================

#[test]
fn hydrate_restores_persisted_fields() {
    let storage = Arc::new(MemoryStorage::new());
    {
        let mut session = SessionState::new(storage.clone());
        session.set_tokens(some("A1"), some("R1"));
        session.set_user_id(some("u-1"));
        session.set_user_info(some("a@b.c"), some("pw"), some("Ada"), some("Lovelace"), None);
    }

    let restored = SessionState::hydrate(storage).unwrap();
    assert_eq!(restored.access_token(), Some("A1"));
    assert_eq!(restored.refresh_token(), Some("R1"));
    assert_eq!(restored.user_id(), Some("u-1"));

    let info = restored.user_info();
    assert_eq!(info.email.as_deref(), Some("a@b.c"));
    assert_eq!(info.name.as_deref(), Some("Ada"));
    assert_eq!(info.password, None);
}

#[test]
fn hydrate_empty_storage_is_empty_session() {
    let restored = SessionState::hydrate(Arc::new(MemoryStorage::new())).unwrap();
    assert_eq!(restored.access_token(), None);
    assert_eq!(restored.user_info(), UserInfo::default());
}

#[test]
fn hydrate_rejects_corrupt_user_record() {
    let storage = Arc::new(MemoryStorage::new());
    storage.set_item(USER_KEY, "{not json").unwrap();
    let err = SessionState::hydrate(storage).unwrap_err();
    assert!(matches!(err, StorageError::Serde(_)));
}

// =============================================================
// Storage failures
// =============================================================

#[test]
fn setters_are_total_when_storage_fails() {
    let mut session = SessionState::new(Arc::new(FailingStorage));
    session.set_tokens(some("A1"), some("R1"));
    session.set_user_id(some("u-1"));
    session.set_user_info(some("a@b.c"), None, None, None, None);

    assert_eq!(session.access_token(), Some("A1"));
    assert_eq!(session.user_id(), Some("u-1"));
    assert_eq!(session.user_info().email.as_deref(), Some("a@b.c"));
}
