use std::fs;

use pretty_assertions::assert_eq;
use t::model::hash;
use t::{Error, LabelMode, ListOptions, Partition, Store};
use tempfile::TempDir;

fn listing(store: &Store, options: &ListOptions) -> String {
    let mut out = Vec::new();
    t::list_tasks(store, options, &mut out).unwrap();
    String::from_utf8(out).unwrap()
}

#[test]
fn load_save_round_trip_keeps_ids_and_metadata() {
    let dir = TempDir::new().unwrap();
    let store = Store::new(dir.path(), "tasks");
    fs::write(
        dir.path().join("tasks"),
        "call mom | id:abc, due:friday\n# comment\nbuy milk\n",
    )
    .unwrap();
    fs::write(dir.path().join(".tasks.done"), "file taxes | id:f00\n").unwrap();

    let list = store.load().unwrap();
    store.save(&list).unwrap();
    let reloaded = store.load().unwrap();

    for partition in [Partition::Active, Partition::Done] {
        assert_eq!(reloaded.tasks(partition), list.tasks(partition));
    }
    let call = &reloaded.tasks(Partition::Active)["abc"];
    assert_eq!(call.metadata["due"], "friday");
    assert!(
        reloaded
            .tasks(Partition::Active)
            .contains_key(&hash("buy milk"))
    );
}

#[test]
fn ids_sharing_leading_characters_get_longer_labels() {
    let dir = TempDir::new().unwrap();
    let store = Store::new(dir.path(), "tasks");
    fs::write(
        dir.path().join("tasks"),
        "foo | id:0beec7b5\nfoobar | id:0bf3a1c2\nbaz | id:7e1d\n",
    )
    .unwrap();

    assert_eq!(
        listing(&store, &ListOptions::default()),
        "0be - foo\n0bf - foobar\n7   - baz\n"
    );

    t::finish_task(&store, "0bee").unwrap();
    assert_eq!(
        listing(&store, &ListOptions::default()),
        "0 - foobar\n7 - baz\n"
    );
}

#[test]
fn finish_then_list_done() {
    let dir = TempDir::new().unwrap();
    let store = Store::new(dir.path(), "tasks");

    let id = t::add_task(&store, "foo").unwrap();
    t::finish_task(&store, &id[..1]).unwrap();

    assert_eq!(listing(&store, &ListOptions::default()), "");
    let done = ListOptions {
        partition: Partition::Done,
        labels: LabelMode::Full,
        ..Default::default()
    };
    assert_eq!(listing(&store, &done), format!("{id} - foo\n"));
}

#[test]
fn edit_never_changes_the_id() {
    let dir = TempDir::new().unwrap();
    let store = Store::new(dir.path(), "tasks");

    let id = t::add_task(&store, "foo").unwrap();
    let edited = t::edit_task(&store, &id, "something else entirely").unwrap();

    assert_eq!(edited, id);
    let list = store.load().unwrap();
    assert_eq!(list.tasks(Partition::Active)[&id].text, "something else entirely");
}

#[test]
fn reference_errors_leave_files_untouched() {
    let dir = TempDir::new().unwrap();
    let store = Store::new(dir.path(), "tasks");
    fs::write(dir.path().join("tasks"), "a | id:ab1\nb | id:ab2\n").unwrap();

    let err = t::remove_task(&store, "ab").unwrap_err();
    assert!(matches!(
        err.downcast_ref::<Error>(),
        Some(Error::AmbiguousReference(r)) if r == "ab"
    ));

    let err = t::remove_task(&store, "cd").unwrap_err();
    assert!(matches!(
        err.downcast_ref::<Error>(),
        Some(Error::UnknownReference(r)) if r == "cd"
    ));

    assert_eq!(
        fs::read_to_string(dir.path().join("tasks")).unwrap(),
        "a | id:ab1\nb | id:ab2\n"
    );
}

#[test]
fn directory_at_done_path_aborts_before_writing() {
    let dir = TempDir::new().unwrap();
    let store = Store::new(dir.path(), "tasks");
    fs::create_dir(dir.path().join(".tasks.done")).unwrap();

    let err = t::add_task(&store, "foo").unwrap_err();
    assert!(matches!(
        err.downcast_ref::<Error>(),
        Some(Error::InvalidStorageLocation(_))
    ));
    assert!(!dir.path().join("tasks").exists());
}

#[test]
fn delete_if_empty_policy() {
    let dir = TempDir::new().unwrap();
    let keep = Store::new(dir.path(), "tasks");
    let id = t::add_task(&keep, "foo").unwrap();
    t::remove_task(&keep, &id).unwrap();
    assert_eq!(fs::read_to_string(dir.path().join("tasks")).unwrap(), "");
    assert_eq!(
        fs::read_to_string(dir.path().join(".tasks.done")).unwrap(),
        ""
    );

    let delete = Store::new(dir.path(), "tasks").delete_if_empty(true);
    let id = t::add_task(&delete, "foo").unwrap();
    assert!(dir.path().join("tasks").is_file());
    assert!(!dir.path().join(".tasks.done").exists());

    t::remove_task(&delete, &id).unwrap();
    assert!(!dir.path().join("tasks").exists());
}

#[test]
fn update_tracking_orders_recent_first() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("tasks"),
        "older | id:aa, updated:100\nnewer | id:bb, updated:200\n",
    )
    .unwrap();
    let store = Store::new(dir.path(), "tasks").track_updates(true);

    t::edit_task(&store, "aa", "touched").unwrap();

    let options = ListOptions {
        labels: LabelMode::Hidden,
        sort: t::SortKey::Updated,
        ..Default::default()
    };
    assert_eq!(listing(&store, &options), "touched\nnewer\n");
}

#[test]
fn later_line_wins_for_duplicate_ids() {
    let dir = TempDir::new().unwrap();
    let store = Store::new(dir.path(), "tasks");
    fs::write(dir.path().join("tasks"), "first | id:abc\nsecond | id:abc\n").unwrap();

    let list = store.load().unwrap();

    assert_eq!(list.tasks(Partition::Active).len(), 1);
    assert_eq!(list.tasks(Partition::Active)["abc"].text, "second");
}

#[test]
fn id_in_both_files_is_kept_as_finished() {
    let dir = TempDir::new().unwrap();
    let store = Store::new(dir.path(), "tasks");
    fs::write(dir.path().join("tasks"), "pending copy | id:abc\n").unwrap();
    fs::write(dir.path().join(".tasks.done"), "done copy | id:abc\n").unwrap();

    let list = store.load().unwrap();

    assert!(list.tasks(Partition::Active).is_empty());
    assert_eq!(list.tasks(Partition::Done)["abc"].text, "done copy");
}

#[test]
fn text_that_would_not_read_back_is_never_written() {
    let dir = TempDir::new().unwrap();
    let store = Store::new(dir.path(), "tasks");
    let id = t::add_task(&store, "call bank").unwrap();

    for text in ["#1 priority: call bank", "call\nbank"] {
        let err = t::add_task(&store, text).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<Error>(),
            Some(Error::UnstorableText(_))
        ));
        let err = t::edit_task(&store, &id, text).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<Error>(),
            Some(Error::UnstorableText(_))
        ));
    }

    // Whatever was accepted reads back unchanged.
    t::add_task(&store, "call bank #1").unwrap();
    let list = store.load().unwrap();
    store.save(&list).unwrap();
    let reloaded = store.load().unwrap();
    assert_eq!(reloaded.tasks(Partition::Active), list.tasks(Partition::Active));
    assert_eq!(reloaded.tasks(Partition::Active).len(), 2);
    assert_eq!(reloaded.tasks(Partition::Active)[&id].text, "call bank");
}
