//! End-to-end undo/redo behavior over a live document.

use proptest::prelude::*;
use vellum_model::{BatchKind, ChangeWriter, Document, Node, Position, Range, Result, RootId};
use vellum_undo::UndoController;

fn setup() -> (Document, RootId, UndoController) {
	let mut doc = Document::new();
	let main = doc.create_root("main");
	(doc, main, UndoController::new())
}

fn commit(
	doc: &mut Document,
	ctl: &mut UndoController,
	scope: impl FnOnce(&mut ChangeWriter<'_>) -> Result<()>,
) -> vellum_model::Batch {
	let (batch, ()) = doc
		.enqueue_change(BatchKind::User, scope)
		.expect("edit applies");
	ctl.observe(doc, &mut ());
	batch
}

fn caret(root: RootId, offset: usize) -> Range {
	Range::collapsed(Position::new(root, [offset]))
}

fn text(doc: &Document, root: RootId) -> String {
	doc.text_of(root).expect("root exists")
}

#[test]
fn basic_text_round_trip() {
	let (mut doc, main, mut ctl) = setup();
	doc.set_selection(vec![caret(main, 0)], false);

	commit(&mut doc, &mut ctl, |w| {
		w.insert(Position::new(main, [0]), Node::text("foobar"))
	});
	doc.set_selection(vec![caret(main, 6)], false);
	assert_eq!(text(&doc, main), "foobar");
	assert_eq!(ctl.undo_len(), 1);
	assert_eq!(ctl.redo_len(), 0);

	ctl.undo(&mut doc, &mut (), None).expect("undo applies");
	assert_eq!(text(&doc, main), "");
	assert_eq!(ctl.undo_len(), 0);
	assert_eq!(ctl.redo_len(), 1);
	// The selection is back where it stood before the edit.
	assert_eq!(doc.selection().ranges().to_vec(), vec![caret(main, 0)]);

	ctl.redo(&mut doc, &mut (), None).expect("redo applies");
	assert_eq!(text(&doc, main), "foobar");
	assert_eq!(ctl.undo_len(), 1);
	assert_eq!(ctl.redo_len(), 0);
	// And forward again to where it stood before the undo.
	assert_eq!(doc.selection().ranges().to_vec(), vec![caret(main, 6)]);
}

#[test]
fn a_new_edit_clears_the_redo_side() {
	let (mut doc, main, mut ctl) = setup();
	commit(&mut doc, &mut ctl, |w| {
		w.insert(Position::new(main, [0]), Node::text("foobar"))
	});
	ctl.undo(&mut doc, &mut (), None).expect("undo applies");
	ctl.redo(&mut doc, &mut (), None).expect("redo applies");

	commit(&mut doc, &mut ctl, |w| {
		w.insert(Position::new(main, [6]), Node::text("!"))
	});

	assert_eq!(text(&doc, main), "foobar!");
	assert_eq!(ctl.redo_len(), 0);
	assert_eq!(ctl.undo_len(), 2);
}

#[test]
fn one_step_per_recorded_batch() {
	let (mut doc, main, mut ctl) = setup();
	commit(&mut doc, &mut ctl, |w| {
		w.insert(Position::new(main, [0]), Node::text("ab"))
	});
	commit(&mut doc, &mut ctl, |w| {
		w.insert(Position::new(main, [2]), Node::text("cd"))
	});
	assert_eq!(text(&doc, main), "abcd");
	assert_eq!(ctl.undo_len(), 2);

	ctl.undo(&mut doc, &mut (), None).expect("undo applies");
	assert_eq!(text(&doc, main), "ab");
	ctl.undo(&mut doc, &mut (), None).expect("undo applies");
	assert_eq!(text(&doc, main), "");

	ctl.redo(&mut doc, &mut (), None).expect("redo applies");
	assert_eq!(text(&doc, main), "ab");
	ctl.redo(&mut doc, &mut (), None).expect("redo applies");
	assert_eq!(text(&doc, main), "abcd");
}

#[test]
fn undo_restores_the_selection_before_the_change() {
	let (mut doc, main, mut ctl) = setup();
	commit(&mut doc, &mut ctl, |w| {
		w.insert(Position::new(main, [0]), Node::text("foobar"))
	});
	doc.set_selection(vec![caret(main, 3)], true);

	commit(&mut doc, &mut ctl, |w| w.remove(Position::new(main, [0]), 3));
	assert_eq!(text(&doc, main), "bar");

	ctl.undo(&mut doc, &mut (), None).expect("undo applies");
	assert_eq!(text(&doc, main), "foobar");
	assert_eq!(doc.selection().ranges().to_vec(), vec![caret(main, 3)]);
	assert!(doc.selection().is_backward());
}

#[test]
fn symmetric_moves_undo_to_the_original_document() {
	let (mut doc, main, mut ctl) = setup();
	commit(&mut doc, &mut ctl, |w| {
		w.insert(Position::new(main, [0]), Node::text("foobar"))
	});
	// Move "oo" to the end, then "f" to the same spot.
	commit(&mut doc, &mut ctl, |w| {
		w.move_nodes(Position::new(main, [1]), Position::new(main, [4]), 2)
	});
	assert_eq!(text(&doc, main), "fbaroo");
	commit(&mut doc, &mut ctl, |w| {
		w.move_nodes(Position::new(main, [0]), Position::new(main, [4]), 1)
	});
	assert_eq!(text(&doc, main), "barofo");

	ctl.undo(&mut doc, &mut (), None).expect("undo applies");
	assert_eq!(text(&doc, main), "fbaroo");
	ctl.undo(&mut doc, &mut (), None).expect("undo applies");
	assert_eq!(text(&doc, main), "foobar");
}

#[test]
fn undo_of_redo_closes_the_cycle() {
	let (mut doc, main, mut ctl) = setup();
	commit(&mut doc, &mut ctl, |w| {
		w.insert(Position::new(main, [0]), Node::text("ab"))
	});
	ctl.undo(&mut doc, &mut (), None).expect("undo applies");
	ctl.redo(&mut doc, &mut (), None).expect("redo applies");
	assert_eq!(text(&doc, main), "ab");

	ctl.undo(&mut doc, &mut (), None).expect("undo applies");
	assert_eq!(text(&doc, main), "");
	ctl.redo(&mut doc, &mut (), None).expect("redo applies");
	assert_eq!(text(&doc, main), "ab");
}

#[test]
fn selection_fully_in_the_graveyard_is_left_alone() {
	let (mut doc, main, mut ctl) = setup();
	commit(&mut doc, &mut ctl, |w| {
		w.insert(Position::new(main, [0]), Node::text("abc"))
	});
	// Select "b", then bury it under two later edits.
	doc.set_selection(
		vec![Range::new(Position::new(main, [1]), Position::new(main, [2]))],
		false,
	);
	let covered = commit(&mut doc, &mut ctl, |w| {
		w.insert(Position::new(main, [0]), Node::text("x"))
	});
	commit(&mut doc, &mut ctl, |w| w.remove(Position::new(main, [2]), 1));
	assert_eq!(text(&doc, main), "xac");
	doc.set_selection(vec![caret(main, 0)], false);

	ctl.undo(&mut doc, &mut (), Some(covered.id()))
		.expect("targeted undo applies");

	assert_eq!(text(&doc, main), "ac");
	// The saved range died in the graveyard: the selection stays put.
	assert_eq!(doc.selection().ranges().to_vec(), vec![caret(main, 0)]);
}

#[test]
fn targeted_undo_skips_newer_batches() {
	let (mut doc, main, mut ctl) = setup();
	let first = commit(&mut doc, &mut ctl, |w| {
		w.insert(Position::new(main, [0]), Node::text("ab"))
	});
	commit(&mut doc, &mut ctl, |w| {
		w.insert(Position::new(main, [2]), Node::text("cd"))
	});

	ctl.undo(&mut doc, &mut (), Some(first.id()))
		.expect("targeted undo applies");

	assert_eq!(text(&doc, main), "cd");
	assert_eq!(ctl.undo_len(), 1);
	assert_eq!(ctl.redo_len(), 1);
}

#[derive(Debug, Clone)]
enum Edit {
	Insert(usize, String),
	Remove(usize, usize),
}

fn edit_strategy() -> impl Strategy<Value = Edit> {
	prop_oneof![
		(any::<usize>(), "[a-z]{1,4}").prop_map(|(at, text)| Edit::Insert(at, text)),
		(any::<usize>(), 1usize..4).prop_map(|(at, n)| Edit::Remove(at, n)),
	]
}

proptest! {
	#![proptest_config(ProptestConfig::with_cases(64))]

	/// Any flat edit script fully undoes back to the initial document and
	/// fully redoes back to the final one, batch by batch.
	#[test]
	fn undo_redo_round_trips_flat_edit_scripts(
		script in proptest::collection::vec(edit_strategy(), 1..6)
	) {
		let (mut doc, main, mut ctl) = setup();
		let mut states = vec![String::new()];
		for edit in script {
			let len = text(&doc, main).chars().count();
			match edit {
				Edit::Insert(at, content) => {
					let at = at % (len + 1);
					commit(&mut doc, &mut ctl, |w| {
						w.insert(Position::new(main, [at]), Node::text(&content))
					});
				}
				Edit::Remove(at, n) => {
					if len == 0 {
						continue;
					}
					let at = at % len;
					let n = n.min(len - at).max(1);
					commit(&mut doc, &mut ctl, |w| w.remove(Position::new(main, [at]), n));
				}
			}
			states.push(text(&doc, main));
		}

		let steps = states.len() - 1;
		for i in (0..steps).rev() {
			ctl.undo(&mut doc, &mut (), None).expect("undo applies");
			let current = text(&doc, main);
			prop_assert_eq!(current.as_str(), states[i].as_str());
		}
		for i in 0..steps {
			ctl.redo(&mut doc, &mut (), None).expect("redo applies");
			let current = text(&doc, main);
			prop_assert_eq!(current.as_str(), states[i + 1].as_str());
		}
	}
}
