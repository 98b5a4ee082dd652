//! Selection session tests.

use std::collections::BTreeSet;
use std::io;
use std::sync::Arc;

use crate::core::catalog::{AudioCategory, Catalog, ModelDescriptor};
use crate::core::limits::Outcome;
use crate::core::plan::{AccessTier, ContentType, decode};

use super::{
    AudioSlots, JsonFileStore, MemoryStore, SelectionChange, SelectionKey, SelectionSession,
    SelectionStore, SessionError, Saved, StoreError, Toggled, Violation, ViolationKind,
};

fn catalog() -> Arc<Catalog> {
    let chat = |id: &str, tier| ModelDescriptor::new(id, tier, ContentType::Chat);
    let audio = |id: &str, tier, cat| {
        ModelDescriptor::new(id, tier, ContentType::Audio).with_audio_category(cat)
    };
    Arc::new(
        Catalog::new(vec![
            chat("c1", AccessTier::Free),
            chat("c2", AccessTier::Free),
            chat("c3", AccessTier::Free),
            chat("c4", AccessTier::Free),
            chat("c5", AccessTier::Free),
            chat("c6", AccessTier::Free),
            chat("haiku", AccessTier::Standard),
            chat("opus", AccessTier::Plus),
            ModelDescriptor::new("sdxl", AccessTier::Free, ContentType::Image),
            ModelDescriptor::new("flux-pro", AccessTier::Plus, ContentType::Image),
            ModelDescriptor::new("luma", AccessTier::Standard, ContentType::Video),
            audio("A", AccessTier::Free, AudioCategory::Tts),
            audio("B", AccessTier::Free, AudioCategory::Tts),
            audio("eleven", AccessTier::Plus, AudioCategory::Tts),
            audio("C", AccessTier::Free, AudioCategory::Stt),
            audio("D", AccessTier::Free, AudioCategory::Stt),
            audio("G", AccessTier::Free, AudioCategory::Ag),
        ])
        .unwrap(),
    )
}

fn session(raw_plan: &str) -> SelectionSession<MemoryStore> {
    SelectionSession::new(decode(raw_plan), catalog(), MemoryStore::new())
}

fn ids(list: &[&str]) -> BTreeSet<String> {
    list.iter().map(|s| s.to_string()).collect()
}

fn select_all(s: &mut SelectionSession<MemoryStore>, list: &[&str]) {
    for id in list {
        let toggled = s.toggle(id).unwrap();
        assert!(
            !matches!(toggled, Toggled::Denied(_)),
            "toggle {} denied: {:?}",
            id,
            toggled
        );
    }
}

/// Store whose writes always fail.
#[derive(Default)]
struct ReadOnlyStore(MemoryStore);

impl SelectionStore for ReadOnlyStore {
    fn get(&self, key: SelectionKey) -> Result<Vec<String>, StoreError> {
        self.0.get(key)
    }

    fn put_many(&mut self, _entries: &[(SelectionKey, Vec<String>)]) -> Result<(), StoreError> {
        Err(StoreError::Io(io::Error::new(
            io::ErrorKind::PermissionDenied,
            "read-only",
        )))
    }

    fn last_audio_category(&self) -> Result<Option<AudioCategory>, StoreError> {
        self.0.last_audio_category()
    }

    fn set_last_audio_category(&mut self, _category: AudioCategory) -> Result<(), StoreError> {
        Ok(())
    }
}

#[test]
fn chat_select_and_save() {
    let mut s = session("free");
    s.open(ContentType::Chat).unwrap();
    assert_eq!(s.editing(), Some(ContentType::Chat));
    assert_eq!(s.max_selectable(), Some(2));
    select_all(&mut s, &["c1", "c2"]);
    assert_eq!(s.save().unwrap(), Saved::Committed(ContentType::Chat));
    assert!(!s.is_editing());
    assert_eq!(s.committed_models(ContentType::Chat).unwrap(), ids(&["c1", "c2"]));
}

#[test]
fn premium_model_denied_with_context() {
    let mut s = session("free");
    s.open(ContentType::Chat).unwrap();
    let toggled = s.toggle("haiku").unwrap();
    let Toggled::Denied(violation) = toggled else {
        panic!("expected denial, got {:?}", toggled);
    };
    assert_eq!(violation.kind(), ViolationKind::Premium);
    assert_eq!(
        violation,
        Violation::Premium {
            model_id: "haiku".to_string(),
            content_type: ContentType::Chat,
            required: AccessTier::Standard,
            effective: AccessTier::Free,
        }
    );
    assert_eq!(violation.affected_models(), vec!["haiku"]);
    assert!(violation.to_string().contains("standard"));
    assert!(s.temp_models().unwrap().is_empty());
}

#[test]
fn limit_denied_on_fourth_standard_model() {
    let mut s = session("standard");
    s.open(ContentType::Chat).unwrap();
    select_all(&mut s, &["c1", "c2", "c3"]);
    assert_eq!(s.evaluate_toggle("c4").unwrap(), Outcome::DenyLimit { cap: 3 });

    let toggled = s.toggle("c4").unwrap();
    let Toggled::Denied(violation) = toggled else {
        panic!("expected denial, got {:?}", toggled);
    };
    assert_eq!(violation.kind(), ViolationKind::Limit);
    match &violation {
        Violation::Limit {
            cap,
            selected,
            deselecting,
            ..
        } => {
            assert_eq!(*cap, 3);
            assert_eq!(selected.len(), 3);
            assert!(!deselecting);
        }
        other => panic!("expected Limit, got {:?}", other),
    }
    assert_eq!(violation.affected_models().len(), 4);
    assert_eq!(s.temp_models().unwrap(), &ids(&["c1", "c2", "c3"]));
}

#[test]
fn composite_plan_gets_plus_cap_but_gated_access() {
    let mut s = session("custom_image_monthly");
    s.open(ContentType::Chat).unwrap();
    assert_eq!(s.max_selectable(), Some(5));
    select_all(&mut s, &["c1", "c2", "c3", "c4", "c5"]);
    assert!(matches!(
        s.toggle("c6").unwrap(),
        Toggled::Denied(Violation::Limit { cap: 5, .. })
    ));
    assert!(matches!(
        s.toggle("haiku").unwrap(),
        Toggled::Denied(Violation::Premium { .. })
    ));
    s.cancel().unwrap();

    s.open(ContentType::Image).unwrap();
    assert!(matches!(
        s.toggle("flux-pro").unwrap(),
        Toggled::Selected(_)
    ));
}

#[test]
fn toggling_twice_restores_temp() {
    let mut s = session("plus");
    s.open(ContentType::Chat).unwrap();
    select_all(&mut s, &["c1", "c2"]);
    let before = s.temp_models().unwrap().clone();

    for id in ["c3", "c1"] {
        s.toggle(id).unwrap();
        s.toggle(id).unwrap();
        assert_eq!(s.temp_models().unwrap(), &before);
    }
}

#[test]
fn save_then_open_round_trips() {
    let mut s = session("plus");
    s.open(ContentType::Chat).unwrap();
    select_all(&mut s, &["c1", "c3", "opus"]);
    s.save().unwrap();

    s.open(ContentType::Chat).unwrap();
    assert_eq!(
        s.temp_models().unwrap(),
        &s.committed_models(ContentType::Chat).unwrap()
    );
}

#[test]
fn save_rejects_too_few_chat_models() {
    let mut s = session("plus");
    s.open(ContentType::Chat).unwrap();
    select_all(&mut s, &["c1"]);
    assert!(!s.is_valid().unwrap());

    let saved = s.save().unwrap();
    assert_eq!(
        saved,
        Saved::Rejected(Violation::TooFewModels {
            content_type: ContentType::Chat,
            audio_category: None,
            required: 2,
            selected: 1,
        })
    );
    assert!(s.is_editing());
    assert!(s.committed_models(ContentType::Chat).unwrap().is_empty());
}

#[test]
fn image_needs_one_model() {
    let mut s = session("free");
    s.open(ContentType::Image).unwrap();
    assert!(!s.is_valid().unwrap());
    select_all(&mut s, &["sdxl"]);
    assert!(s.is_valid().unwrap());
    assert_eq!(s.save().unwrap(), Saved::Committed(ContentType::Image));
}

#[test]
fn cancel_discards_changes() {
    let mut s = session("plus");
    s.open(ContentType::Chat).unwrap();
    select_all(&mut s, &["c1", "c2"]);
    s.save().unwrap();

    s.open(ContentType::Chat).unwrap();
    s.toggle("c1").unwrap();
    s.toggle("c3").unwrap();
    s.cancel().unwrap();
    assert!(!s.is_editing());
    assert_eq!(s.committed_models(ContentType::Chat).unwrap(), ids(&["c1", "c2"]));
}

#[test]
fn remove_all_clears_then_save_is_rejected() {
    let mut s = session("plus");
    s.open(ContentType::Chat).unwrap();
    select_all(&mut s, &["c1", "c2", "c3"]);
    s.remove_all().unwrap();
    assert!(s.temp_models().unwrap().is_empty());
    assert!(matches!(s.save().unwrap(), Saved::Rejected(_)));
}

#[test]
fn remove_all_escapes_a_downgraded_selection() {
    let mut store = MemoryStore::new();
    store
        .put(
            SelectionKey::Models(ContentType::Chat),
            vec!["c1".into(), "c2".into(), "c3".into(), "c4".into()],
        )
        .unwrap();
    let mut s = SelectionSession::new(decode("free"), catalog(), store);
    s.open(ContentType::Chat).unwrap();
    for id in ["c1", "c2", "c3"] {
        let toggled = s.toggle(id).unwrap();
        let Toggled::Denied(violation) = toggled else {
            panic!("expected denial, got {:?}", toggled);
        };
        assert!(matches!(
            violation,
            Violation::Limit {
                cap: 2,
                deselecting: true,
                ..
            }
        ));
        assert_eq!(violation.affected_models(), vec!["c1", "c2", "c3", "c4"]);
        let message = violation.to_string();
        assert!(message.contains("remove all models"), "{}", message);
        assert!(!message.contains("deselect one of"), "{}", message);
    }
    s.remove_all().unwrap();
    select_all(&mut s, &["c5", "c6"]);
    assert_eq!(s.save().unwrap(), Saved::Committed(ContentType::Chat));
    assert_eq!(s.committed_models(ContentType::Chat).unwrap(), ids(&["c5", "c6"]));
}

#[test]
fn audio_replace_switch_and_flush_on_save() {
    let mut store = MemoryStore::new();
    store
        .put(SelectionKey::Audio(AudioCategory::Tts), vec!["A".into()])
        .unwrap();
    let mut s = SelectionSession::new(decode("free"), catalog(), store);

    s.open(ContentType::Audio).unwrap();
    assert_eq!(s.active_audio_category(), Some(AudioCategory::Tts));
    assert_eq!(
        s.toggle("B").unwrap(),
        Toggled::Replaced {
            previous: "A".to_string(),
            current: "B".to_string(),
        }
    );
    assert_eq!(s.temp_audio().unwrap().get(AudioCategory::Tts), Some("B"));

    s.switch_audio_category(AudioCategory::Stt).unwrap();
    assert_eq!(
        s.committed_audio().unwrap().get(AudioCategory::Tts),
        Some("A")
    );
    assert_eq!(s.temp_audio().unwrap().get(AudioCategory::Stt), None);

    assert_eq!(s.toggle("C").unwrap(), Toggled::Selected("C".to_string()));
    assert_eq!(s.save().unwrap(), Saved::Committed(ContentType::Audio));

    let committed = s.committed_audio().unwrap();
    assert_eq!(
        committed,
        AudioSlots {
            tts: Some("B".to_string()),
            stt: Some("C".to_string()),
            ag: None,
        }
    );
}

#[test]
fn audio_never_limited_but_premium_checked() {
    let mut s = session("free");
    s.open(ContentType::Audio).unwrap();
    select_all(&mut s, &["A", "B", "A", "B"]);
    assert!(matches!(
        s.toggle("eleven").unwrap(),
        Toggled::Denied(Violation::Premium {
            required: AccessTier::Plus,
            ..
        })
    ));
    assert_eq!(s.temp_audio().unwrap().get(AudioCategory::Tts), Some("B"));
}

#[test]
fn audio_deselecting_last_model_blocks_save() {
    let mut s = session("free");
    s.open(ContentType::Audio).unwrap();
    s.toggle("A").unwrap();
    assert_eq!(s.toggle("A").unwrap(), Toggled::Deselected("A".to_string()));
    assert!(!s.is_valid().unwrap());
    assert_eq!(
        s.save().unwrap(),
        Saved::Rejected(Violation::TooFewModels {
            content_type: ContentType::Audio,
            audio_category: Some(AudioCategory::Tts),
            required: 1,
            selected: 0,
        })
    );
    assert_eq!(s.committed_audio().unwrap(), AudioSlots::default());
}

#[test]
fn audio_untouched_categories_keep_committed_value() {
    let mut store = MemoryStore::new();
    store
        .put_many(&[
            (SelectionKey::Audio(AudioCategory::Tts), vec!["A".into()]),
            (SelectionKey::Audio(AudioCategory::Ag), vec!["G".into()]),
        ])
        .unwrap();
    let mut s = SelectionSession::new(decode("free"), catalog(), store);
    s.open(ContentType::Audio).unwrap();
    s.switch_audio_category(AudioCategory::Stt).unwrap();
    s.toggle("D").unwrap();
    s.save().unwrap();
    assert_eq!(
        s.committed_audio().unwrap(),
        AudioSlots {
            tts: Some("A".to_string()),
            stt: Some("D".to_string()),
            ag: Some("G".to_string()),
        }
    );
}

#[test]
fn audio_remove_all_persists_cleared_categories() {
    let mut store = MemoryStore::new();
    store
        .put_many(&[
            (SelectionKey::Audio(AudioCategory::Tts), vec!["A".into()]),
            (SelectionKey::Audio(AudioCategory::Stt), vec!["C".into()]),
        ])
        .unwrap();
    let mut s = SelectionSession::new(decode("free"), catalog(), store);
    s.open(ContentType::Audio).unwrap();
    s.remove_all().unwrap();
    assert_eq!(s.toggle("B").unwrap(), Toggled::Selected("B".to_string()));
    assert_eq!(s.save().unwrap(), Saved::Committed(ContentType::Audio));

    let expected = AudioSlots {
        tts: Some("B".to_string()),
        stt: None,
        ag: None,
    };
    assert_eq!(s.committed_audio().unwrap(), expected);
    s.open(ContentType::Audio).unwrap();
    assert_eq!(s.temp_audio().unwrap(), expected);
}

#[test]
fn audio_deselect_in_parked_category_is_committed() {
    let mut store = MemoryStore::new();
    store
        .put_many(&[
            (SelectionKey::Audio(AudioCategory::Tts), vec!["A".into()]),
            (SelectionKey::Audio(AudioCategory::Stt), vec!["C".into()]),
        ])
        .unwrap();
    let mut s = SelectionSession::new(decode("free"), catalog(), store);
    s.open(ContentType::Audio).unwrap();
    s.switch_audio_category(AudioCategory::Stt).unwrap();
    assert_eq!(s.toggle("C").unwrap(), Toggled::Deselected("C".to_string()));
    s.switch_audio_category(AudioCategory::Tts).unwrap();
    s.save().unwrap();
    assert_eq!(
        s.committed_audio().unwrap(),
        AudioSlots {
            tts: Some("A".to_string()),
            stt: None,
            ag: None,
        }
    );
}

#[test]
fn audio_cancel_discards_every_category() {
    let mut s = session("free");
    s.open(ContentType::Audio).unwrap();
    s.toggle("A").unwrap();
    s.switch_audio_category(AudioCategory::Stt).unwrap();
    s.toggle("C").unwrap();
    s.cancel().unwrap();
    assert_eq!(s.committed_audio().unwrap(), AudioSlots::default());

    s.open(ContentType::Audio).unwrap();
    assert_eq!(s.temp_audio().unwrap(), AudioSlots::default());
}

#[test]
fn audio_reopens_on_last_used_tab() {
    let mut s = session("free");
    s.open(ContentType::Audio).unwrap();
    s.switch_audio_category(AudioCategory::Ag).unwrap();
    s.toggle("G").unwrap();
    s.save().unwrap();
    assert_eq!(
        s.store().last_audio_category().unwrap(),
        Some(AudioCategory::Ag)
    );

    s.open(ContentType::Audio).unwrap();
    assert_eq!(s.active_audio_category(), Some(AudioCategory::Ag));
    assert_eq!(s.temp_audio().unwrap().get(AudioCategory::Ag), Some("G"));
}

#[test]
fn audio_remove_all_clears_every_category() {
    let mut s = session("free");
    s.open(ContentType::Audio).unwrap();
    s.toggle("A").unwrap();
    s.switch_audio_category(AudioCategory::Stt).unwrap();
    s.toggle("C").unwrap();
    s.remove_all().unwrap();
    assert_eq!(s.temp_audio().unwrap(), AudioSlots::default());
}

#[test]
fn contract_breaches_are_errors() {
    let mut s = session("plus");
    assert!(matches!(s.toggle("c1"), Err(SessionError::NotEditing)));
    assert!(matches!(s.save(), Err(SessionError::NotEditing)));
    assert!(matches!(s.cancel(), Err(SessionError::NotEditing)));
    assert!(matches!(s.is_valid(), Err(SessionError::NotEditing)));

    s.open(ContentType::Chat).unwrap();
    assert!(matches!(
        s.open(ContentType::Image),
        Err(SessionError::AlreadyEditing(ContentType::Chat))
    ));
    assert!(matches!(
        s.toggle("missing"),
        Err(SessionError::UnknownModel(_))
    ));
    assert!(matches!(
        s.toggle("sdxl"),
        Err(SessionError::WrongContentType {
            expected: ContentType::Chat,
            actual: ContentType::Image,
            ..
        })
    ));
    assert!(matches!(
        s.switch_audio_category(AudioCategory::Stt),
        Err(SessionError::NotAudioSession(ContentType::Chat))
    ));
    s.cancel().unwrap();

    s.open(ContentType::Audio).unwrap();
    assert!(matches!(
        s.toggle("C"),
        Err(SessionError::WrongAudioCategory {
            active: AudioCategory::Tts,
            ..
        })
    ));
}

#[test]
fn notifications_follow_mutations() {
    let mut s = session("free");
    let rx = s.subscribe();
    s.open(ContentType::Chat).unwrap();
    s.toggle("c1").unwrap();
    s.toggle("haiku").unwrap();
    s.toggle("c2").unwrap();
    s.save().unwrap();

    let changes: Vec<SelectionChange> = rx.try_iter().collect();
    assert_eq!(
        changes,
        vec![
            SelectionChange::Opened(ContentType::Chat),
            SelectionChange::TempChanged(ContentType::Chat),
            SelectionChange::TempChanged(ContentType::Chat),
            SelectionChange::Committed(ContentType::Chat),
            SelectionChange::Closed(ContentType::Chat),
        ]
    );
}

#[test]
fn dropped_subscribers_are_pruned() {
    let mut s = session("free");
    drop(s.subscribe());
    let rx = s.subscribe();
    s.open(ContentType::Image).unwrap();
    assert_eq!(rx.try_recv().unwrap(), SelectionChange::Opened(ContentType::Image));
}

#[test]
fn plan_upgrade_applies_to_later_toggles() {
    let mut s = session("free");
    s.open(ContentType::Chat).unwrap();
    assert!(matches!(s.toggle("opus").unwrap(), Toggled::Denied(_)));
    s.set_plan(decode("plus_monthly"));
    assert_eq!(s.toggle("opus").unwrap(), Toggled::Selected("opus".to_string()));
    assert_eq!(s.max_selectable(), Some(5));
}

#[test]
fn store_failure_keeps_session_open() {
    let mut s = SelectionSession::new(decode("plus"), catalog(), ReadOnlyStore::default());
    s.open(ContentType::Chat).unwrap();
    s.toggle("c1").unwrap();
    s.toggle("c2").unwrap();
    assert!(matches!(s.save(), Err(SessionError::Store(_))));
    assert!(s.is_editing());
    assert_eq!(s.temp_models().unwrap(), &ids(&["c1", "c2"]));
}

#[test]
fn json_store_backs_a_session() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("selections.json");

    let mut s = SelectionSession::new(decode("plus"), catalog(), JsonFileStore::new(&path));
    s.open(ContentType::Video).unwrap();
    s.toggle("luma").unwrap();
    s.save().unwrap();

    let reopened = SelectionSession::new(decode("plus"), catalog(), JsonFileStore::new(&path));
    assert_eq!(
        reopened.committed_models(ContentType::Video).unwrap(),
        ids(&["luma"])
    );
}
