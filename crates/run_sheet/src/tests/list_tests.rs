use std::collections::BTreeSet;

use super::*;
use crate::{ids::SequentialIds, template::RunSheetTemplate};

fn list_of(durations: &[(&str, u32)]) -> OrderedItemList<SequentialIds> {
    let mut list = OrderedItemList::with_ids(SequentialIds::new());
    for (title, minutes) in durations {
        list.append(ItemTemplate::new(ItemKind::Worship, *title, *minutes));
    }
    list
}

fn titles<G>(list: &OrderedItemList<G>) -> Vec<&str> {
    list.iter().map(|item| item.title.as_str()).collect()
}

fn id_of<G>(list: &OrderedItemList<G>, title: &str) -> ItemId {
    list.iter()
        .find(|item| item.title == title)
        .map(|item| item.id.clone())
        .expect("title present")
}

#[test]
fn append_uses_default_template_and_goes_last() {
    let mut list = list_of(&[("A", 5)]);
    let created = list.append(ItemTemplate::default()).clone();

    assert_eq!(created.kind, ItemKind::Announcement);
    assert_eq!(created.title, "New Item");
    assert_eq!(created.duration_minutes, 5);
    assert!(created.notes.is_empty());
    assert!(created.media_refs.is_empty());
    assert_eq!(list.position(&created.id), Some(1));
}

#[test]
fn total_duration_tracks_every_append() {
    let durations = [3u32, 0, 17, 45, 5, 12];
    let mut list = OrderedItemList::new();
    for (appended, minutes) in durations.iter().enumerate() {
        list.append(ItemTemplate::with_duration(*minutes));
        let expected: u64 = durations[..=appended].iter().map(|m| u64::from(*m)).sum();
        assert_eq!(list.total_duration(), expected);
        assert_eq!(list.len(), appended + 1);
    }
}

#[test]
fn move_keeps_membership_for_every_target() {
    let base = list_of(&[("A", 1), ("B", 2), ("C", 3), ("D", 4)]);
    let before: BTreeSet<ItemId> = base.ids().into_iter().collect();

    for id in base.ids() {
        for target in -2..7 {
            let mut list = base.clone();
            list.move_to(&id, target);
            let after: BTreeSet<ItemId> = list.ids().into_iter().collect();
            assert_eq!(after, before);
            assert_eq!(list.total_duration(), 10);
        }
    }
}

#[test]
fn move_clamps_out_of_range_indices() {
    let base = list_of(&[("A", 1), ("B", 2), ("C", 3)]);
    let b = id_of(&base, "B");

    let mut low = base.clone();
    low.move_to(&b, -5);
    let mut zero = base.clone();
    zero.move_to(&b, 0);
    assert_eq!(low.ids(), zero.ids());
    assert_eq!(titles(&low), ["B", "A", "C"]);

    let mut high = base.clone();
    high.move_to(&b, 1000);
    let mut last = base.clone();
    last.move_to(&b, base.len() as i64 - 1);
    assert_eq!(high.ids(), last.ids());
    assert_eq!(titles(&high), ["A", "C", "B"]);
}

#[test]
fn move_shifts_intervening_items() {
    let mut list = list_of(&[("A", 1), ("B", 1), ("C", 1), ("D", 1), ("E", 1)]);
    assert!(list.move_to(&id_of(&list, "B"), 3));
    assert_eq!(titles(&list), ["A", "C", "D", "B", "E"]);

    assert!(list.move_to(&id_of(&list, "E"), 1));
    assert_eq!(titles(&list), ["A", "E", "C", "D", "B"]);
}

#[test]
fn move_to_current_position_is_a_no_op() {
    let mut list = list_of(&[("A", 1), ("B", 1), ("C", 1)]);
    let before = list.ids();
    assert!(!list.move_to(&id_of(&list, "B"), 1));
    assert_eq!(list.ids(), before);
}

#[test]
fn operations_on_unknown_ids_do_nothing() {
    let mut list = list_of(&[("A", 5), ("B", 20)]);
    let before = list.ids();
    let missing = ItemId::from("missing");

    assert!(list.remove(&missing).is_none());
    assert!(!list.move_to(&missing, 0));
    assert!(!list.update(&missing, ItemPatch::title("X")));
    assert_eq!(list.ids(), before);
    assert_eq!(list.total_duration(), 25);
}

#[test]
fn remove_subtracts_exactly_the_removed_duration() {
    let mut list = list_of(&[("A", 5), ("B", 20), ("C", 7)]);
    for title in ["B", "A", "C"] {
        let id = id_of(&list, title);
        let before = list.total_duration();
        let removed = list.remove(&id).expect("present");
        assert_eq!(
            list.total_duration(),
            before - u64::from(removed.duration_minutes)
        );
    }
    assert!(list.is_empty());
    assert_eq!(list.total_duration(), 0);
}

#[test]
fn remove_keeps_relative_order_of_the_rest() {
    let mut list = list_of(&[("A", 1), ("B", 1), ("C", 1), ("D", 1)]);
    list.remove(&id_of(&list, "B"));
    assert_eq!(titles(&list), ["A", "C", "D"]);
}

#[test]
fn update_merges_fields_without_reordering() {
    let mut list = list_of(&[("A", 5), ("B", 20), ("C", 5)]);
    let before = list.ids();
    let b = id_of(&list, "B");

    assert!(list.update(
        &b,
        ItemPatch {
            title: Some("X".into()),
            assigned_to: Some("Worship Team".into()),
            ..ItemPatch::default()
        }
    ));

    assert_eq!(list.ids(), before);
    let updated = list.get(&b).expect("b");
    assert_eq!(updated.title, "X");
    assert_eq!(updated.assigned_to, "Worship Team");
    assert_eq!(updated.duration_minutes, 20);
}

#[test]
fn update_duration_changes_the_total() {
    let mut list = list_of(&[("A", 5), ("B", 20)]);
    list.update(&id_of(&list, "B"), ItemPatch::duration(30));
    assert_eq!(list.total_duration(), 35);
}

#[test]
fn reorder_remove_append_scenario() {
    let mut list = list_of(&[("A", 5), ("B", 20), ("C", 5)]);
    let a = id_of(&list, "A");
    let c = id_of(&list, "C");

    list.move_to(&c, 0);
    assert_eq!(titles(&list), ["C", "A", "B"]);
    assert_eq!(list.total_duration(), 30);

    list.remove(&a);
    assert_eq!(titles(&list), ["C", "B"]);
    assert_eq!(list.total_duration(), 25);

    let d = list.append(ItemTemplate::with_duration(10)).id.clone();
    assert_eq!(list.position(&d), Some(2));
    assert_eq!(list.total_duration(), 35);
}

#[test]
fn from_items_rejects_duplicate_ids() {
    let list = list_of(&[("A", 1), ("B", 1)]);
    let mut items = list.into_items();
    items[1].id = items[0].id.clone();

    let err = OrderedItemList::from_items(items, SequentialIds::new()).expect_err("duplicate");
    assert_eq!(err, RunSheetError::DuplicateItemId("1".into()));
}

#[test]
fn append_skips_ids_already_in_the_list() {
    let loaded = list_of(&[("A", 1), ("B", 1), ("C", 1)]).into_items();
    let mut list =
        OrderedItemList::from_items(loaded, SequentialIds::new()).expect("unique ids");

    let fresh = list.append(ItemTemplate::default()).id.clone();
    assert_eq!(fresh, ItemId::from("4"));
    let unique: BTreeSet<ItemId> = list.ids().into_iter().collect();
    assert_eq!(unique.len(), list.len());
}

#[test]
fn timeline_is_contiguous_and_ends_at_total() {
    let list = list_of(&[("A", 5), ("B", 20), ("C", 0), ("D", 30)]);
    let timeline = list.timeline();

    assert_eq!(timeline[0].start_minute, 0);
    for pair in timeline.windows(2) {
        assert_eq!(pair[0].end_minute, pair[1].start_minute);
    }
    assert_eq!(
        timeline.last().map(|entry| entry.end_minute),
        Some(list.total_duration())
    );
}

#[test]
fn duration_by_kind_groups_minutes() {
    let mut list = OrderedItemList::with_ids(SequentialIds::new());
    list.append(ItemTemplate::new(ItemKind::Worship, "Set 1", 20));
    list.append(ItemTemplate::new(ItemKind::Sermon, "Message", 30));
    list.append(ItemTemplate::new(ItemKind::Worship, "Set 2", 15));

    let totals = list.duration_by_kind();
    assert_eq!(totals.get(&ItemKind::Worship), Some(&35));
    assert_eq!(totals.get(&ItemKind::Sermon), Some(&30));
    assert_eq!(totals.get(&ItemKind::Prayer), None);
}

#[test]
fn sunday_template_seeds_slides_and_cues() {
    let list = RunSheetTemplate::SundayMorning.seed(SequentialIds::new());
    assert_eq!(list.len(), 6);
    assert_eq!(list.total_duration(), 80);

    let sermon = list.get(&ItemId::from("4")).expect("sermon");
    assert_eq!(sermon.kind, ItemKind::Sermon);
    assert!(sermon.media_refs.contains("sermon-slides.pptx"));
    let worship = list.get(&ItemId::from("2")).expect("worship set");
    assert!(worship.media_refs.contains("worship-slides-1.pptx"));
    assert!(list.get(&ItemId::from("1")).expect("welcome").media_refs.is_empty());
}
