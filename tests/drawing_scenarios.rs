use egui::{Color32, Key, Modifiers};
use rasterboard::input::{EditorAction, KeyInput, PointerEvent};
use rasterboard::surface::PixmapSurface;
use rasterboard::tool::Tool;
use rasterboard::PaintEditor;

fn test_editor() -> PaintEditor<PixmapSurface> {
    PaintEditor::new(64, 48)
}

fn display_pixel(editor: &PaintEditor<PixmapSurface>, x: usize, y: usize) -> Color32 {
    editor.display().pixel(x, y).unwrap()
}

fn ctrl_z() -> KeyInput {
    KeyInput::new(Key::Z, Modifiers::COMMAND)
}

#[test]
fn brush_stroke_paints_a_band_and_records_one_snapshot() {
    let mut editor = test_editor();
    editor.set_tool(Tool::Brush);
    editor.set_color_hex("#ff0000");
    editor.set_size(5.0);

    editor.handle_pointer(PointerEvent::down(10.0, 10.0));
    editor.handle_pointer(PointerEvent::moved(30.0, 10.0));
    editor.handle_pointer(PointerEvent::moved(50.0, 10.0));
    editor.handle_pointer(PointerEvent::up(50.0, 10.0));

    // A horizontal band of roughly the stroke width, spanning the gesture.
    for x in [10, 25, 40, 50] {
        assert_eq!(display_pixel(&editor, x, 10), Color32::RED, "at x={x}");
        assert_eq!(display_pixel(&editor, x, 9), Color32::RED);
        assert_eq!(display_pixel(&editor, x, 11), Color32::RED);
    }
    // Outside the band the layer fill shows through.
    assert_eq!(display_pixel(&editor, 25, 20), Color32::WHITE);
    assert_eq!(display_pixel(&editor, 5, 10), Color32::WHITE);

    // Initial blank plus this stroke.
    assert_eq!(editor.history().len(), 2);
}

#[test]
fn freehand_moves_do_not_snapshot_until_the_stroke_ends() {
    let mut editor = test_editor();
    editor.handle_pointer(PointerEvent::down(5.0, 5.0));
    editor.handle_pointer(PointerEvent::moved(15.0, 5.0));
    editor.handle_pointer(PointerEvent::moved(25.0, 5.0));
    assert_eq!(editor.history().len(), 1);

    // The display still shows the partial stroke.
    assert_eq!(display_pixel(&editor, 15, 5), Color32::BLACK);

    editor.handle_pointer(PointerEvent::up(25.0, 5.0));
    assert_eq!(editor.history().len(), 2);
}

#[test]
fn rectangle_dragged_up_and_left_is_still_filled() {
    let mut editor = test_editor();
    editor.set_tool(Tool::Rectangle);
    editor.set_fill_shape(true);
    editor.set_color_hex("#0000ff");

    editor.handle_pointer(PointerEvent::down(30.0, 30.0));
    editor.handle_pointer(PointerEvent::up(10.0, 10.0));

    // Filled above-and-left of the anchor point.
    assert_eq!(display_pixel(&editor, 20, 20), Color32::BLUE);
    assert_eq!(display_pixel(&editor, 11, 11), Color32::BLUE);
    assert_eq!(display_pixel(&editor, 29, 29), Color32::BLUE);
    assert_eq!(display_pixel(&editor, 35, 35), Color32::WHITE);
    assert_eq!(display_pixel(&editor, 5, 5), Color32::WHITE);
}

#[test]
fn outlined_rectangle_leaves_the_interior_untouched() {
    let mut editor = test_editor();
    editor.set_tool(Tool::Rectangle);
    editor.set_fill_shape(false);
    editor.set_color_hex("#0000ff");
    editor.set_size(2.0);

    editor.handle_pointer(PointerEvent::down(10.0, 10.0));
    editor.handle_pointer(PointerEvent::up(40.0, 40.0));

    assert_eq!(display_pixel(&editor, 25, 10), Color32::BLUE);
    assert_eq!(display_pixel(&editor, 10, 25), Color32::BLUE);
    assert_eq!(display_pixel(&editor, 25, 25), Color32::WHITE);
}

#[test]
fn line_tool_commits_a_single_segment_at_stroke_end() {
    let mut editor = test_editor();
    editor.set_tool(Tool::Line);
    editor.set_color_hex("#ff0000");
    editor.set_size(3.0);

    editor.handle_pointer(PointerEvent::down(5.0, 5.0));
    // Intermediate moves do not paint for shape tools.
    editor.handle_pointer(PointerEvent::moved(20.0, 40.0));
    assert_eq!(display_pixel(&editor, 20, 40), Color32::WHITE);
    assert_eq!(editor.history().len(), 1);

    editor.handle_pointer(PointerEvent::up(45.0, 5.0));
    assert_eq!(display_pixel(&editor, 25, 5), Color32::RED);
    assert_eq!(display_pixel(&editor, 20, 40), Color32::WHITE);
    assert_eq!(editor.history().len(), 2);
}

#[test]
fn circle_radius_comes_from_the_drag_distance() {
    let mut editor = test_editor();
    editor.set_tool(Tool::Circle);
    editor.set_fill_shape(true);
    editor.set_color_hex("#ff0000");

    editor.handle_pointer(PointerEvent::down(30.0, 24.0));
    editor.handle_pointer(PointerEvent::up(40.0, 24.0));

    // Radius 10 around the anchor.
    assert_eq!(display_pixel(&editor, 30, 24), Color32::RED);
    assert_eq!(display_pixel(&editor, 30, 31), Color32::RED);
    assert_eq!(display_pixel(&editor, 22, 24), Color32::RED);
    assert_eq!(display_pixel(&editor, 30, 40), Color32::WHITE);
    assert_eq!(display_pixel(&editor, 45, 24), Color32::WHITE);
}

#[test]
fn config_changes_mid_stroke_do_not_affect_the_stroke() {
    let mut editor = test_editor();
    editor.set_color_hex("#ff0000");
    editor.handle_pointer(PointerEvent::down(5.0, 5.0));
    editor.handle_pointer(PointerEvent::moved(15.0, 5.0));

    // Mutating the live configuration mid-gesture changes nothing captured.
    editor.set_color_hex("#00ff00");
    editor.set_size(20.0);
    editor.set_tool(Tool::Rectangle);
    editor.handle_pointer(PointerEvent::moved(30.0, 5.0));
    editor.handle_pointer(PointerEvent::up(30.0, 5.0));

    assert_eq!(display_pixel(&editor, 25, 5), Color32::RED);
    assert_eq!(display_pixel(&editor, 25, 15), Color32::WHITE);
}

#[test]
fn pointer_leave_finalizes_the_stroke() {
    let mut editor = test_editor();
    editor.set_tool(Tool::Line);
    editor.set_color_hex("#ff0000");
    editor.handle_pointer(PointerEvent::down(5.0, 5.0));
    editor.handle_pointer(PointerEvent::leave(30.0, 5.0));

    // The stroke committed rather than being discarded.
    assert_eq!(display_pixel(&editor, 20, 5), Color32::RED);
    assert_eq!(editor.history().len(), 2);
}

#[test]
fn pointer_positions_clamp_to_the_surface() {
    let mut editor = test_editor();
    editor.set_color_hex("#ff0000");
    editor.handle_pointer(PointerEvent::down(5.0, 5.0));
    editor.handle_pointer(PointerEvent::moved(-50.0, 5.0));
    editor.handle_pointer(PointerEvent::up(-50.0, 5.0));

    assert_eq!(display_pixel(&editor, 0, 5), Color32::RED);
    assert_eq!(editor.history().len(), 2);
}

#[test]
fn text_commit_draws_at_the_requested_point() {
    let mut editor = test_editor();
    editor.set_tool(Tool::Text);
    editor.set_color_hex("#ff0000");
    editor.set_size(5.0);

    editor.handle_pointer(PointerEvent::down(10.0, 30.0));
    assert!(editor.pending_text().is_some());
    // No stroke flow while a text request is open.
    assert_eq!(editor.history().len(), 1);

    editor.commit_text("Hi");
    assert!(editor.pending_text().is_none());
    assert_eq!(editor.history().len(), 2);

    // Some glyph pixels landed above the baseline in the configured color.
    let painted = (10..40)
        .flat_map(|x| (10..30).map(move |y| (x, y)))
        .any(|(x, y)| display_pixel(&editor, x, y) == Color32::RED);
    assert!(painted);
}

#[test]
fn empty_text_input_commits_nothing() {
    let mut editor = test_editor();
    editor.set_tool(Tool::Text);
    editor.handle_pointer(PointerEvent::down(10.0, 30.0));

    editor.commit_text("   ");
    assert!(editor.pending_text().is_none());
    assert_eq!(editor.history().len(), 1);
}

#[test]
fn escape_cancels_a_pending_text_request() {
    let mut editor = test_editor();
    editor.set_tool(Tool::Text);
    editor.handle_pointer(PointerEvent::down(10.0, 30.0));
    assert!(editor.pending_text().is_some());

    let action = editor.handle_key(KeyInput::new(Key::Escape, Modifiers::NONE));
    assert_eq!(action, Some(EditorAction::CancelText));
    assert!(editor.pending_text().is_none());
    assert_eq!(editor.history().len(), 1);
}

#[test]
fn keyboard_chords_map_to_history_actions() {
    assert_eq!(ctrl_z().action(), Some(EditorAction::Undo));
    assert_eq!(
        KeyInput::new(Key::Z, Modifiers::COMMAND | Modifiers::SHIFT).action(),
        Some(EditorAction::Redo)
    );
    assert_eq!(
        KeyInput::new(Key::Y, Modifiers::COMMAND).action(),
        Some(EditorAction::Redo)
    );
    assert_eq!(KeyInput::new(Key::Z, Modifiers::NONE).action(), None);
    assert_eq!(KeyInput::new(Key::A, Modifiers::COMMAND).action(), None);
}

#[test]
fn undo_and_redo_work_through_the_keyboard() {
    let mut editor = test_editor();
    editor.set_color_hex("#ff0000");
    editor.handle_pointer(PointerEvent::down(5.0, 5.0));
    editor.handle_pointer(PointerEvent::moved(20.0, 5.0));
    editor.handle_pointer(PointerEvent::up(20.0, 5.0));
    assert_eq!(display_pixel(&editor, 12, 5), Color32::RED);

    editor.handle_key(ctrl_z());
    assert_eq!(display_pixel(&editor, 12, 5), Color32::WHITE);

    editor.handle_key(KeyInput::new(Key::Z, Modifiers::COMMAND | Modifiers::SHIFT));
    assert_eq!(display_pixel(&editor, 12, 5), Color32::RED);
}

#[test]
fn malformed_colors_fall_back_to_black() {
    let mut editor = test_editor();
    editor.set_color_hex("not-a-color");
    editor.handle_pointer(PointerEvent::down(5.0, 5.0));
    editor.handle_pointer(PointerEvent::moved(20.0, 5.0));
    editor.handle_pointer(PointerEvent::up(20.0, 5.0));
    assert_eq!(display_pixel(&editor, 12, 5), Color32::BLACK);
}

#[test]
fn nonsensical_sizes_are_clamped() {
    let mut editor = test_editor();
    editor.set_size(-3.0);
    assert_eq!(editor.config().size, 1.0);
    editor.set_size(9000.0);
    assert_eq!(editor.config().size, 50.0);
    editor.set_size(f32::NAN);
    assert_eq!(editor.config().size, 50.0);
}
