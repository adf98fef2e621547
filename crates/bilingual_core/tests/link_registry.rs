use bilingual_core::db::open_db_in_memory;
use bilingual_core::{
    Category, ContentRecord, ContentStore, LinkError, LinkRegistry, MemoryContentStore, RecordId,
    RepoError, RepoResult, SqliteContentStore, TRANSLATION_META_KEY,
};
use rusqlite::Connection;
use std::cell::Cell;
use uuid::Uuid;

struct Fixture {
    primary: Vec<RecordId>,
    secondary: Vec<RecordId>,
}

impl Fixture {
    fn seed(store: &impl ContentStore, per_category: usize) -> Self {
        let seed_category = |category: Category| -> Vec<RecordId> {
            (0..per_category)
                .map(|index| {
                    let record =
                        ContentRecord::new(category, format!("Page {index}"), format!("page-{index}"));
                    store.create_record(&record).unwrap()
                })
                .collect()
        };
        let primary = seed_category(Category::Primary);
        let secondary = seed_category(Category::Secondary);
        Self { primary, secondary }
    }

    fn all(&self) -> Vec<RecordId> {
        self.primary.iter().chain(&self.secondary).copied().collect()
    }
}

fn assert_symmetric<S: ContentStore>(registry: &LinkRegistry<S>, ids: &[RecordId]) {
    for &id in ids {
        if let Some(partner) = registry.get_link(id).unwrap() {
            assert_ne!(partner, id, "self link on {id}");
            assert_eq!(
                registry.get_link(partner).unwrap(),
                Some(id),
                "{id} -> {partner} is not mirrored"
            );
        }
    }
}

fn memory_registry() -> (LinkRegistry<MemoryContentStore>, Fixture) {
    let store = MemoryContentStore::new();
    let fixture = Fixture::seed(&store, 3);
    (LinkRegistry::new(store), fixture)
}

#[test]
fn linking_writes_both_directions() {
    let (registry, f) = memory_registry();
    let (a, b) = (f.primary[0], f.secondary[0]);

    let change = registry.set_link(a, Some(b)).unwrap();

    assert_eq!(change.previous, None);
    assert_eq!(change.current, Some(b));
    assert!(change.unlinked.is_empty());
    assert_eq!(registry.get_link(a).unwrap(), Some(b));
    assert_eq!(registry.get_link(b).unwrap(), Some(a));
    assert_eq!(registry.resolve_link(b).unwrap().map(|r| r.id), Some(a));
}

#[test]
fn repeating_a_link_is_a_noop() {
    let (registry, f) = memory_registry();
    let (a, b) = (f.primary[0], f.secondary[0]);

    registry.set_link(a, Some(b)).unwrap();
    let meta_before = registry.store().meta_len();
    let change = registry.set_link(a, Some(b)).unwrap();

    assert!(change.is_noop());
    assert_eq!(registry.store().meta_len(), meta_before);
    assert_eq!(registry.get_link(b).unwrap(), Some(a));
}

#[test]
fn saving_from_the_other_side_keeps_the_pair() {
    let (registry, f) = memory_registry();
    let (a, b) = (f.primary[0], f.secondary[0]);

    registry.set_link(a, Some(b)).unwrap();
    let change = registry.set_link(b, Some(a)).unwrap();

    assert!(change.is_noop());
    assert_eq!(registry.get_link(a).unwrap(), Some(b));
}

#[test]
fn repointing_unlinks_the_old_partner() {
    let (registry, f) = memory_registry();
    let (a, b, c) = (f.primary[0], f.secondary[0], f.secondary[1]);

    registry.set_link(a, Some(b)).unwrap();
    let change = registry.set_link(a, Some(c)).unwrap();

    assert_eq!(change.previous, Some(b));
    assert_eq!(change.unlinked, vec![b]);
    assert_eq!(registry.get_link(a).unwrap(), Some(c));
    assert_eq!(registry.get_link(c).unwrap(), Some(a));
    assert_eq!(registry.get_link(b).unwrap(), None);
}

#[test]
fn clearing_unlinks_both_sides() {
    let (registry, f) = memory_registry();
    let (a, b) = (f.primary[0], f.secondary[0]);

    registry.set_link(a, Some(b)).unwrap();
    let change = registry.set_link(a, None).unwrap();

    assert_eq!(change.unlinked, vec![b]);
    assert_eq!(registry.get_link(a).unwrap(), None);
    assert_eq!(registry.get_link(b).unwrap(), None);
    assert_eq!(registry.store().meta_len(), 0);
}

#[test]
fn clearing_an_unlinked_record_changes_nothing() {
    let (registry, f) = memory_registry();

    let change = registry.set_link(f.primary[0], None).unwrap();

    assert!(change.is_noop());
    assert_eq!(registry.store().meta_len(), 0);
}

#[test]
fn stealing_a_linked_partner_unlinks_its_previous_owner() {
    let (registry, f) = memory_registry();
    let (a, c) = (f.primary[0], f.primary[1]);
    let d = f.secondary[0];

    registry.set_link(c, Some(d)).unwrap();
    let change = registry.set_link(a, Some(d)).unwrap();

    assert_eq!(change.unlinked, vec![c]);
    assert_eq!(registry.get_link(a).unwrap(), Some(d));
    assert_eq!(registry.get_link(d).unwrap(), Some(a));
    assert_eq!(registry.get_link(c).unwrap(), None);
}

#[test]
fn old_partner_pointing_elsewhere_is_left_alone() {
    let (registry, f) = memory_registry();
    let (a, b, c) = (f.primary[0], f.secondary[0], f.secondary[1]);
    let store = registry.store();

    // a -> b written outside the registry; b already points at someone else.
    let other = f.primary[2];
    store
        .set_meta(a, TRANSLATION_META_KEY, &b.to_string())
        .unwrap();
    store
        .set_meta(b, TRANSLATION_META_KEY, &other.to_string())
        .unwrap();

    let change = registry.set_link(a, Some(c)).unwrap();

    assert!(change.unlinked.is_empty());
    assert_eq!(registry.get_link(b).unwrap(), Some(other));
}

#[test]
fn self_link_is_rejected_before_any_write() {
    let (registry, f) = memory_registry();
    let a = f.primary[0];

    let err = registry.set_link(a, Some(a)).unwrap_err();

    assert!(matches!(err, LinkError::SelfLink(id) if id == a));
    assert_eq!(registry.store().meta_len(), 0);
}

#[test]
fn same_category_link_is_rejected_before_any_write() {
    let (registry, f) = memory_registry();
    let (a, b, c) = (f.primary[0], f.secondary[0], f.primary[1]);
    registry.set_link(a, Some(b)).unwrap();

    let err = registry.set_link(a, Some(c)).unwrap_err();

    assert!(matches!(
        err,
        LinkError::SameLanguage {
            category: Category::Primary,
            ..
        }
    ));
    assert_eq!(registry.get_link(a).unwrap(), Some(b));
    assert_eq!(registry.get_link(b).unwrap(), Some(a));
}

#[test]
fn missing_partner_links_but_resolves_to_nothing() {
    let (registry, f) = memory_registry();
    let a = f.primary[0];
    let ghost = Uuid::new_v4();

    registry.set_link(a, Some(ghost)).unwrap();

    assert_eq!(registry.get_link(a).unwrap(), Some(ghost));
    assert_eq!(registry.resolve_link(a).unwrap(), None);
}

#[test]
fn garbage_link_value_is_reported_and_overwritten() {
    let (registry, f) = memory_registry();
    let (a, b) = (f.primary[0], f.secondary[0]);
    registry
        .store()
        .set_meta(a, TRANSLATION_META_KEY, "42")
        .unwrap();

    assert!(matches!(
        registry.get_link(a).unwrap_err(),
        LinkError::InvalidLinkValue { value, .. } if value == "42"
    ));

    registry.set_link(a, Some(b)).unwrap();
    assert_eq!(registry.get_link(a).unwrap(), Some(b));
    assert_eq!(registry.get_link(b).unwrap(), Some(a));
}

/// Deterministic operation stream over a small record set.
struct OpStream(u64);

impl OpStream {
    fn next(&mut self, bound: usize) -> usize {
        self.0 = self
            .0
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);
        ((self.0 >> 33) as usize) % bound
    }
}

fn run_random_sequence<S: ContentStore>(registry: &LinkRegistry<S>, f: &Fixture, seed: u64) {
    let ids = f.all();
    let mut ops = OpStream(seed);

    for _ in 0..200 {
        let id = ids[ops.next(ids.len())];
        let pick = ops.next(ids.len() + 2);
        let partner = ids.get(pick).copied();

        match registry.set_link(id, partner) {
            Ok(change) => {
                assert_eq!(change.current, partner);
                assert_eq!(registry.get_link(id).unwrap(), partner);
            }
            Err(LinkError::SelfLink(_)) | Err(LinkError::SameLanguage { .. }) => {}
            Err(err) => panic!("unexpected error: {err}"),
        }
        assert_symmetric(registry, &ids);

        for &linked in &ids {
            if let Some(other) = registry.resolve_link(linked).unwrap() {
                let this = registry.store().get_record(linked).unwrap().unwrap();
                assert_ne!(this.category, other.category);
            }
        }
    }
}

#[test]
fn symmetry_holds_for_arbitrary_sequences_in_memory() {
    for seed in [1, 7, 42, 1234] {
        let (registry, f) = memory_registry();
        run_random_sequence(&registry, &f, seed);
    }
}

#[test]
fn symmetry_holds_for_arbitrary_sequences_in_sqlite() {
    for seed in [3, 99] {
        let conn = open_db_in_memory().unwrap();
        let store = SqliteContentStore::try_new(&conn).unwrap();
        let f = Fixture::seed(&store, 3);
        let registry = LinkRegistry::new(store);
        run_random_sequence(&registry, &f, seed);
    }
}

#[test]
fn sqlite_failure_mid_relink_leaves_all_links_unchanged() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteContentStore::try_new(&conn).unwrap();
    let f = Fixture::seed(&store, 2);
    let registry = LinkRegistry::new(store);
    let (a, b, c) = (f.primary[0], f.secondary[0], f.secondary[1]);
    registry.set_link(a, Some(b)).unwrap();

    fail_meta_writes_for(&conn, c);
    let err = registry.set_link(a, Some(c)).unwrap_err();

    assert!(matches!(err, LinkError::Repo(RepoError::Db(_))));
    assert!(conn.is_autocommit());
    assert_eq!(registry.get_link(a).unwrap(), Some(b));
    assert_eq!(registry.get_link(b).unwrap(), Some(a));
    assert_eq!(registry.get_link(c).unwrap(), None);
}

fn fail_meta_writes_for(conn: &Connection, id: RecordId) {
    conn.execute_batch(&format!(
        "CREATE TRIGGER fail_meta_write
         BEFORE INSERT ON record_meta
         WHEN NEW.record_uuid = '{id}'
         BEGIN
             SELECT RAISE(ABORT, 'injected failure');
         END;"
    ))
    .unwrap();
}

/// Memory store that fails metadata writes for one record.
struct FailingStore {
    inner: MemoryContentStore,
    fail_for: Cell<Option<RecordId>>,
}

impl ContentStore for FailingStore {
    fn create_record(&self, record: &ContentRecord) -> RepoResult<RecordId> {
        self.inner.create_record(record)
    }

    fn get_record(&self, id: RecordId) -> RepoResult<Option<ContentRecord>> {
        self.inner.get_record(id)
    }

    fn list_records(&self, category: Category) -> RepoResult<Vec<ContentRecord>> {
        self.inner.list_records(category)
    }

    fn get_meta(&self, id: RecordId, key: &str) -> RepoResult<Option<String>> {
        self.inner.get_meta(id, key)
    }

    fn set_meta(&self, id: RecordId, key: &str, value: &str) -> RepoResult<()> {
        if self.fail_for.get() == Some(id) {
            return Err(RepoError::InvalidData("injected failure".to_string()));
        }
        self.inner.set_meta(id, key, value)
    }

    fn delete_meta(&self, id: RecordId, key: &str) -> RepoResult<()> {
        self.inner.delete_meta(id, key)
    }

    fn atomically<T, E, F>(&self, work: F) -> Result<T, E>
    where
        E: From<RepoError>,
        F: FnOnce() -> Result<T, E>,
    {
        self.inner.atomically(work)
    }
}

#[test]
fn memory_failure_mid_relink_leaves_all_links_unchanged() {
    let store = FailingStore {
        inner: MemoryContentStore::new(),
        fail_for: Cell::new(None),
    };
    let f = Fixture::seed(&store, 2);
    let registry = LinkRegistry::new(store);
    let (a, b, c) = (f.primary[0], f.secondary[0], f.secondary[1]);
    let d = f.primary[1];
    registry.set_link(a, Some(b)).unwrap();
    registry.set_link(d, Some(c)).unwrap();

    registry.store().fail_for.set(Some(c));
    assert!(registry.set_link(a, Some(c)).is_err());

    assert_eq!(registry.get_link(a).unwrap(), Some(b));
    assert_eq!(registry.get_link(b).unwrap(), Some(a));
    assert_eq!(registry.get_link(c).unwrap(), Some(d));
    assert_eq!(registry.get_link(d).unwrap(), Some(c));
}
