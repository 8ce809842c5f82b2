use egui::Color32;
use rasterboard::history::{History, MAX_ENTRIES};
use rasterboard::input::PointerEvent;
use rasterboard::surface::{PixmapSurface, Surface};
use rasterboard::tool::Tool;
use rasterboard::PaintEditor;

fn test_editor() -> PaintEditor<PixmapSurface> {
    PaintEditor::new(40, 30)
}

// Full pixel grid of the composited display, for state comparisons.
fn display_pixels(editor: &PaintEditor<PixmapSurface>) -> Vec<Color32> {
    let display = editor.display();
    let mut pixels = Vec::with_capacity(display.width() * display.height());
    for y in 0..display.height() {
        for x in 0..display.width() {
            pixels.push(display.pixel(x, y).unwrap());
        }
    }
    pixels
}

fn draw_stroke(editor: &mut PaintEditor<PixmapSurface>, from: (f32, f32), to: (f32, f32)) {
    editor.handle_pointer(PointerEvent::down(from.0, from.1));
    editor.handle_pointer(PointerEvent::moved(to.0, to.1));
    editor.handle_pointer(PointerEvent::up(to.0, to.1));
}

fn tiny_snapshot() -> rasterboard::surface::Snapshot {
    PixmapSurface::with_size(2, 2).export_pixels().unwrap()
}

#[test]
fn undo_redo_restores_each_intermediate_state() {
    let mut editor = test_editor();
    editor.set_tool(Tool::Brush);

    // Record the pixel state after the initial blank and after each stroke.
    let mut states = vec![display_pixels(&editor)];
    editor.set_color_hex("#ff0000");
    draw_stroke(&mut editor, (5.0, 5.0), (30.0, 5.0));
    states.push(display_pixels(&editor));
    editor.set_color_hex("#00ff00");
    draw_stroke(&mut editor, (5.0, 15.0), (30.0, 15.0));
    states.push(display_pixels(&editor));
    editor.set_color_hex("#0000ff");
    draw_stroke(&mut editor, (5.0, 25.0), (30.0, 25.0));
    states.push(display_pixels(&editor));

    assert_eq!(editor.history().len(), 4);

    // Walk back to the blank state, checking every intermediate.
    for expected in states.iter().rev().skip(1) {
        assert!(editor.undo());
        assert_eq!(&display_pixels(&editor), expected);
    }
    assert!(!editor.can_undo());
    assert!(!editor.undo());

    // And forward again.
    for expected in states.iter().skip(1) {
        assert!(editor.redo());
        assert_eq!(&display_pixels(&editor), expected);
    }
    assert!(!editor.can_redo());
    assert!(!editor.redo());
}

#[test]
fn new_edit_after_undo_discards_redo_entries() {
    let mut editor = test_editor();
    draw_stroke(&mut editor, (5.0, 5.0), (20.0, 5.0));
    assert_eq!(editor.history().len(), 2);

    assert!(editor.undo());
    assert!(editor.can_redo());

    // A fresh edit truncates the redo branch.
    draw_stroke(&mut editor, (5.0, 20.0), (20.0, 20.0));
    assert!(!editor.can_redo());
    assert!(!editor.redo());
    assert_eq!(editor.history().len(), 2);
}

#[test]
fn history_is_capped_with_front_eviction() {
    let mut history = History::new();
    for _ in 0..(MAX_ENTRIES + 10) {
        history.record(tiny_snapshot());
    }
    assert_eq!(history.len(), MAX_ENTRIES);
    // Cursor stays on the newest entry and inside bounds.
    assert_eq!(history.cursor(), MAX_ENTRIES - 1);
    assert!(history.can_undo());
    assert!(!history.can_redo());
}

#[test]
fn history_cap_holds_through_the_editor() {
    let mut editor = test_editor();
    for i in 0..60 {
        let y = (i % 20) as f32 + 1.0;
        draw_stroke(&mut editor, (1.0, y), (10.0, y));
    }
    assert_eq!(editor.history().len(), MAX_ENTRIES);
    assert!(editor.can_undo());
}

#[test]
fn undo_and_redo_at_boundaries_are_noops() {
    let mut history = History::new();
    assert!(!history.can_undo());
    assert!(!history.can_redo());
    assert!(history.undo().is_none());
    assert!(history.redo().is_none());

    history.record(tiny_snapshot());
    assert!(!history.can_undo());
    assert!(!history.can_redo());

    history.record(tiny_snapshot());
    assert!(history.can_undo());
    assert!(history.undo().is_some());
    assert!(history.undo().is_none());
    assert!(history.can_redo());
    assert!(history.redo().is_some());
    assert!(history.redo().is_none());
}
