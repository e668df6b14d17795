use std::sync::Arc;
use std::thread;

use enumerated::prelude::*;

fn types() -> Arc<ModelCatalog> {
    Arc::new(
        ModelCatalog::new()
            .with(ModelInfo::new("Status", "statuses"))
            .with(ModelInfo::new("Author", "authors")),
    )
}

fn booking(foreign_key: &str) -> ModelDefinition {
    ModelDefinition::new(ModelInfo::new("Booking", "bookings"), types())
        .belongs_to("author", AssociationOptions::new())
        .has_enumerated("status", EnumeratedOptions::new().foreign_key(foreign_key))
}

#[test]
fn concurrent_first_reads_agree() {
    let catalog = ReflectionCatalog::new();
    catalog.define(booking("status_id")).unwrap();
    let status = catalog.reflect_on_association("Booking", "status").unwrap();

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let status = Arc::clone(&status);
            thread::spawn(move || {
                (
                    status.foreign_key().to_string(),
                    status.target_table_name().unwrap().to_string(),
                )
            })
        })
        .collect();

    for handle in handles {
        let (fk, table) = handle.join().unwrap();
        assert_eq!(fk, "status_id");
        assert_eq!(table, "statuses");
    }
}

#[test]
fn readers_see_whole_registries_during_redefinition() {
    let catalog = Arc::new(ReflectionCatalog::new());
    catalog.define(booking("status_id")).unwrap();

    let writer = {
        let catalog = Arc::clone(&catalog);
        thread::spawn(move || {
            for i in 0..50 {
                let fk = if i % 2 == 0 { "state_id" } else { "status_id" };
                catalog.define(booking(fk)).unwrap();
            }
        })
    };

    let readers: Vec<_> = (0..4)
        .map(|_| {
            let catalog = Arc::clone(&catalog);
            thread::spawn(move || {
                for _ in 0..200 {
                    let registry = catalog.registry("Booking").unwrap();
                    let all = registry.reflect_on_all_associations(None);
                    assert_eq!(all.len(), 2);
                    assert_eq!(all[0].name(), "status");
                    let fk = all[0].foreign_key();
                    assert!(fk == "status_id" || fk == "state_id");
                    // The same snapshot answers lookups consistently.
                    let again = registry.reflect_on_association("status").unwrap();
                    assert_eq!(again.foreign_key(), fk);
                }
            })
        })
        .collect();

    writer.join().unwrap();
    for reader in readers {
        reader.join().unwrap();
    }
    assert_eq!(catalog.len(), 1);
}

#[test]
fn catalog_is_shareable() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<ReflectionCatalog>();
    assert_send_sync::<EnumerationReflection>();
    assert_send_sync::<EnumeratedReflections<enumerated::ModelReflections>>();
}
