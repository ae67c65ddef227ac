use super::Document;
use crate::batch::BatchKind;
use crate::node::Node;
use crate::position::Position;
use crate::range::Range;

fn setup() -> (Document, crate::position::RootId) {
	let mut doc = Document::new();
	let main = doc.create_root("main");
	(doc, main)
}

#[test]
fn insert_builds_text_and_logs_history() {
	let (mut doc, main) = setup();
	let (batch, ()) = doc
		.enqueue_change(BatchKind::User, |w| {
			w.insert(Position::new(main, [0]), Node::text("foobar"))
		})
		.expect("insert applies");

	assert_eq!(doc.text_of(main).unwrap(), "foobar");
	assert_eq!(doc.version(), 1);
	assert_eq!(batch.deltas().len(), 1);
	assert_eq!(batch.kind(), BatchKind::User);

	let event = doc.poll_change().expect("one change event");
	assert_eq!(event.batch.id(), batch.id());
	assert!(doc.poll_change().is_none());
}

#[test]
fn removal_moves_content_to_the_graveyard() {
	let (mut doc, main) = setup();
	doc.enqueue_change(BatchKind::User, |w| {
		w.insert(Position::new(main, [0]), Node::text("foobar"))?;
		w.remove(Position::new(main, [0]), 3)
	})
	.expect("edit applies");

	assert_eq!(doc.text_of(main).unwrap(), "bar");
	assert_eq!(doc.text_of(doc.graveyard()).unwrap(), "foo");
}

#[test]
fn later_removals_prepend_to_the_graveyard() {
	let (mut doc, main) = setup();
	doc.enqueue_change(BatchKind::User, |w| {
		w.insert(Position::new(main, [0]), Node::text("abcd"))?;
		w.remove(Position::new(main, [0]), 2)?;
		w.remove(Position::new(main, [0]), 2)
	})
	.expect("edit applies");

	assert_eq!(doc.text_of(main).unwrap(), "");
	assert_eq!(doc.text_of(doc.graveyard()).unwrap(), "cdab");
}

#[test]
fn reinsert_restores_removed_content() {
	let (mut doc, main) = setup();
	doc.enqueue_change(BatchKind::User, |w| {
		w.insert(Position::new(main, [0]), Node::text("abc"))?;
		w.remove(Position::new(main, [1]), 2)
	})
	.expect("edit applies");
	assert_eq!(doc.text_of(main).unwrap(), "a");

	let gy = doc.graveyard();
	doc.enqueue_change(BatchKind::User, |w| {
		w.reinsert(Position::new(gy, [0]), 2, Position::new(main, [1]))
	})
	.expect("reinsert applies");
	assert_eq!(doc.text_of(main).unwrap(), "abc");
	assert_eq!(doc.text_of(gy).unwrap(), "");
}

#[test]
fn reversed_delta_round_trips() {
	let (mut doc, main) = setup();
	doc.enqueue_change(BatchKind::User, |w| {
		w.insert(Position::new(main, [0]), Node::text("foobar"))
	})
	.expect("insert applies");

	let delta = doc.history().entries()[0].delta.clone();
	doc.enqueue_change(BatchKind::User, |w| {
		let reversed = delta.get_reversed();
		let rebased = w.transform_onto_tip(&reversed).expect("rebase survives");
		w.apply_reversion_delta(rebased)
	})
	.expect("reversal applies");

	assert_eq!(doc.text_of(main).unwrap(), "");
	assert_eq!(doc.text_of(doc.graveyard()).unwrap(), "foobar");
}

#[test]
fn move_round_trips_through_its_reverse() {
	let (mut doc, main) = setup();
	doc.enqueue_change(BatchKind::User, |w| {
		w.insert(Position::new(main, [0]), Node::text("foobar"))?;
		w.move_nodes(Position::new(main, [1]), Position::new(main, [4]), 2)
	})
	.expect("edit applies");
	assert_eq!(doc.text_of(main).unwrap(), "fbaroo");

	let delta = doc.history().entries()[1].delta.clone();
	doc.enqueue_change(BatchKind::User, |w| {
		let rebased = w
			.transform_onto_tip(&delta.get_reversed())
			.expect("rebase survives");
		w.apply_reversion_delta(rebased)
	})
	.expect("reversal applies");
	assert_eq!(doc.text_of(main).unwrap(), "foobar");
}

#[test]
fn failed_scope_rolls_everything_back() {
	let (mut doc, main) = setup();
	doc.set_selection(vec![Range::collapsed(Position::new(main, [0]))], false);

	let result = doc.enqueue_change(BatchKind::User, |w| {
		w.insert(Position::new(main, [0]), Node::text("ab"))?;
		// Out of bounds: the whole scope must unwind.
		w.remove(Position::new(main, [5]), 3)
	});

	assert!(result.is_err());
	assert_eq!(doc.text_of(main).unwrap(), "");
	assert_eq!(doc.version(), 0);
	assert!(doc.poll_change().is_none());
	assert_eq!(doc.selection().ranges().len(), 1);
}

#[test]
fn fragment_edits_are_not_versioned() {
	let (mut doc, _) = setup();
	let fragment = doc.create_fragment();
	let (batch, ()) = doc
		.enqueue_change(BatchKind::User, |w| {
			w.insert(Position::new(fragment, [0]), Node::text("xyz"))
		})
		.expect("fragment insert applies");

	assert_eq!(doc.text_of(fragment).unwrap(), "xyz");
	assert_eq!(doc.version(), 0);
	assert!(doc.history().entries().is_empty());
	assert!(!batch.affects_document(&doc));
	// The stream still delivers the batch; recording filters it out.
	assert!(doc.poll_change().is_some());
}

#[test]
fn events_carry_the_selection_from_scope_entry() {
	let (mut doc, main) = setup();
	doc.enqueue_change(BatchKind::User, |w| {
		w.insert(Position::new(main, [0]), Node::text("foobar"))
	})
	.expect("insert applies");
	doc.poll_change();

	let caret = Range::collapsed(Position::new(main, [3]));
	doc.set_selection(vec![caret.clone()], true);
	doc.enqueue_change(BatchKind::User, |w| {
		w.remove(Position::new(main, [0]), 3)?;
		w.set_selection(vec![Range::collapsed(Position::new(main, [0]))], false);
		Ok(())
	})
	.expect("removal applies");

	let event = doc.poll_change().expect("one change event");
	assert_eq!(event.selection_before.ranges, vec![caret]);
	assert!(event.selection_before.is_backward);
	// The live selection kept the value set inside the scope.
	assert!(!doc.selection().is_backward());
}
