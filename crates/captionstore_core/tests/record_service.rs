use captionstore_core::{
    decode_record_payload, CaptionError, CombinedStore, MemoizedCaptionGenerator,
    MemoryCacheStore, MemoryRecordStore, RecordId, RecordService, RecordStore, ServiceError,
    SummarizeRequest,
};
use std::sync::atomic::{AtomicUsize, Ordering};

type Service = RecordService<CombinedStore<MemoryCacheStore, MemoryRecordStore>>;

fn service() -> Service {
    RecordService::new(CombinedStore::new(
        MemoryCacheStore::default(),
        MemoryRecordStore::new(),
    ))
}

fn captions(values: &[&str]) -> Vec<String> {
    values.iter().map(|value| value.to_string()).collect()
}

#[test]
fn create_then_get_returns_same_record() {
    let service = service();
    let created = service
        .create_record("c1", "http://x", captions(&["a", "b"]))
        .unwrap();

    let loaded = service.get_record("c1", created.id.unwrap()).unwrap();

    assert_eq!(loaded, created);
    assert_eq!(loaded.tenant_id, "c1");
}

#[test]
fn replace_captions_keeps_url_and_reaches_both_tiers() {
    let service = service();
    let created = service
        .create_record("c1", "http://x", captions(&["a", "b"]))
        .unwrap();
    let id = created.id.unwrap();

    let updated = service
        .replace_captions("c1", id, captions(&["b", "a"]))
        .unwrap();

    assert_eq!(updated.url, "http://x");
    assert_eq!(updated.captions, vec!["b", "a"]);
    assert_eq!(service.store().persistent().get("c1", id).unwrap(), updated);
    assert_eq!(service.store().cache().get("c1", id).unwrap(), updated);
}

#[test]
fn replace_captions_of_missing_record_is_not_found() {
    let service = service();
    let err = service
        .replace_captions("c1", RecordId::generate(), captions(&["x"]))
        .unwrap_err();

    assert!(err.is_not_found());
    assert_eq!(err.kind().status_code(), 404);
}

#[test]
fn generated_captions_are_memoized_per_url() {
    let service = service();
    let calls = AtomicUsize::new(0);
    let generator = MemoizedCaptionGenerator::new(|request: &SummarizeRequest| {
        calls.fetch_add(1, Ordering::SeqCst);
        Ok((1..=request.sentence_count)
            .map(|n| format!("sentence {n}"))
            .collect())
    });

    let first = service
        .create_with_generated_captions("c1", "http://x", &generator, 3)
        .unwrap();
    let second = service
        .create_with_generated_captions("c2", "http://x", &generator, 3)
        .unwrap();

    assert_eq!(first.captions, vec!["sentence 1", "sentence 2", "sentence 3"]);
    assert_eq!(second.captions, first.captions);
    assert_ne!(first.id, second.id);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn generator_failure_stores_nothing() {
    let service = service();
    let generator = MemoizedCaptionGenerator::new(|_: &SummarizeRequest| {
        Err(CaptionError::Upstream("timeout".to_string()))
    });

    let err = service
        .create_with_generated_captions("c1", "http://x", &generator, 3)
        .unwrap_err();

    assert!(matches!(err, ServiceError::CaptionGeneration(_)));
    assert_eq!(err.to_string(), "unable to generate captions");
    assert_eq!(err.status_code(), 500);
    assert!(service.store().persistent().is_empty().unwrap());
    assert!(service.store().cache().is_empty());
}

#[test]
fn store_errors_keep_their_status_through_the_service() {
    let service = service();
    let generator = MemoizedCaptionGenerator::new(|_: &SummarizeRequest| Ok(Vec::new()));

    let err = service
        .create_with_generated_captions("", "http://x", &generator, 1)
        .unwrap_err();

    assert!(matches!(err, ServiceError::Store(_)));
    assert_eq!(err.to_string(), "invalid customerID");
    assert_eq!(err.status_code(), 400);
}

#[test]
fn decoded_payload_with_id_is_rejected_on_insert() {
    let service = service();
    let id = RecordId::generate();
    let body = format!(r#"{{"id":"{}","url":"u","captions":[]}}"#, id.to_hex());
    let record = decode_record_payload(&body).unwrap();
    assert_eq!(record.id, Some(id));

    let err = service.store().insert("c1", &record).unwrap_err();
    assert_eq!(err.to_string(), "invalid cannot provide ID");
}
