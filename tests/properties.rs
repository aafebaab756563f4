mod support;

use std::collections::HashMap;

use proptest::prelude::*;
use registry_sync::transport::RemoteResponse;
use registry_sync::{
    normalize_identifier, type_name_from_class, HttpVerb, InMemoryWorkQueue, QueueDeduplicator,
    Record, RecordMeta, SyncJob, WorkQueue,
};
use serde_json::json;
use support::harness::Harness;
use support::records::Firm;

/// Identifiers drawn from a small pool so sequences repeat, with random
/// case and padding.
fn arb_identifier() -> impl Strategy<Value = String> {
    (0..6usize, any::<bool>(), " {0,2}", " {0,2}").prop_map(|(n, upper, lead, trail)| {
        let id = format!("ac{}", n);
        let id = if upper { id.to_uppercase() } else { id };
        format!("{}{}{}", lead, id, trail)
    })
}

proptest! {
    #[test]
    fn normalization_is_idempotent(raw in "[ \\ta-zA-Z0-9]{0,16}") {
        let once = normalize_identifier(&raw);
        prop_assert_eq!(normalize_identifier(&once), once.clone());

        let mut meta = RecordMeta::default();
        meta.set_identifier(raw.as_str());
        match meta.identifier() {
            Some(id) => prop_assert_eq!(normalize_identifier(id), once),
            None => prop_assert!(once.is_empty()),
        }
    }

    #[test]
    fn type_names_are_stable(class in "[A-Z][a-zA-Z0-9]{0,20}") {
        let name = type_name_from_class(&class);
        prop_assert_eq!(type_name_from_class(&name), name.clone());
        prop_assert!(!name.chars().any(char::is_uppercase));
    }

    #[test]
    fn dedup_leaves_last_job_per_identifier(
        jobs in proptest::collection::vec((arb_identifier(), 0..1000u32), 0..40),
    ) {
        let queue = InMemoryWorkQueue::new();
        let mut expected: HashMap<String, SyncJob> = HashMap::new();
        for (id, marker) in &jobs {
            let job = SyncJob::new(id.as_str()).with_change_marker(marker.to_string());
            expected.insert(normalize_identifier(id), job.clone());
            queue.create_item(job).unwrap();
        }

        let report = QueueDeduplicator::new().run(&queue);

        prop_assert_eq!(queue.number_of_items().unwrap(), expected.len());
        prop_assert_eq!(report.requeued, expected.len());
        prop_assert_eq!(queue.claimed_count(), 0);
        for job in queue.jobs() {
            let key = job.dedup_key().unwrap();
            prop_assert_eq!(Some(&job), expected.get(&key));
        }
    }

    #[test]
    fn cached_loads_hit_the_registry_once(id in arb_identifier(), repeats in 1..5usize) {
        let h = Harness::new();
        h.remote.respond(
            HttpVerb::Get,
            "firms",
            RemoteResponse::ok_json(json!({"name": "Acme"})),
        );
        let engine = h.engine::<Firm>("firm");

        let expected = normalize_identifier(&id);
        for _ in 0..repeats {
            let firm = engine.load(&id).unwrap().unwrap();
            prop_assert_eq!(firm.identifier(), Some(expected.as_str()));
        }
        prop_assert_eq!(h.remote.request_count(), 1);

        engine.reset_cache(&[id.as_str()]);
        engine.load(&id).unwrap();
        prop_assert_eq!(h.remote.request_count(), 2);
    }
}
