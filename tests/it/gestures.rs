use egui::{pos2, PointerButton};
use paint_surface::{DrawingMode, Element, Shape, Surface};

use crate::helpers::drag;

fn committed_shapes(surface: &Surface) -> Vec<&Shape> {
    surface
        .elements()
        .iter()
        .filter_map(|e| match e {
            Element::Shape(shape) => Some(shape),
            Element::Image(_) => None,
        })
        .collect()
}

#[test]
fn rectangle_spans_anchor_and_last_move_in_every_direction() {
    let anchor = pos2(50.0, 50.0);
    let targets = [
        pos2(80.0, 90.0),
        pos2(10.0, 90.0),
        pos2(80.0, 5.0),
        pos2(10.0, 5.0),
    ];

    for target in targets {
        let mut surface = Surface::new();
        surface.set_mode(DrawingMode::Rectangle);
        surface.pointer_down(anchor, PointerButton::Primary);
        surface.pointer_move(pos2(70.0, 70.0), true);
        surface.pointer_move(target, true);
        // release position is not applied
        surface.pointer_up(pos2(0.0, 0.0), PointerButton::Primary);

        let shapes = committed_shapes(&surface);
        let [Shape::Rectangle { bounds, .. }] = shapes.as_slice() else {
            panic!("expected one rectangle, got {shapes:?}");
        };
        assert_eq!(bounds.min.x, anchor.x.min(target.x));
        assert_eq!(bounds.min.y, anchor.y.min(target.y));
        assert_eq!(bounds.width(), (anchor.x - target.x).abs());
        assert_eq!(bounds.height(), (anchor.y - target.y).abs());
        assert!(bounds.width() >= 0.0 && bounds.height() >= 0.0);
    }
}

#[test]
fn ellipse_uses_the_same_bounding_box_rule() {
    let mut surface = Surface::new();
    drag(
        &mut surface,
        DrawingMode::Ellipse,
        &[pos2(40.0, 10.0), pos2(15.0, 35.0)],
    );

    let shapes = committed_shapes(&surface);
    let [Shape::Ellipse { bounds, .. }] = shapes.as_slice() else {
        panic!("expected one ellipse, got {shapes:?}");
    };
    assert_eq!(bounds.min, pos2(15.0, 10.0));
    assert_eq!(bounds.max, pos2(40.0, 35.0));
}

#[test]
fn line_runs_from_press_to_last_move() {
    let mut surface = Surface::new();
    surface.set_mode(DrawingMode::Line);
    surface.pointer_down(pos2(3.0, 4.0), PointerButton::Primary);
    surface.pointer_move(pos2(10.0, 10.0), true);
    surface.pointer_move(pos2(-5.0, 22.0), true);
    surface.pointer_up(pos2(99.0, 99.0), PointerButton::Primary);

    let shapes = committed_shapes(&surface);
    let [Shape::Line { start, end, .. }] = shapes.as_slice() else {
        panic!("expected one line, got {shapes:?}");
    };
    assert_eq!(*start, pos2(3.0, 4.0));
    assert_eq!(*end, pos2(-5.0, 22.0));
}

#[test]
fn click_without_drag_yields_degenerate_shapes() {
    let at = pos2(12.0, 34.0);
    for mode in [DrawingMode::Rectangle, DrawingMode::Ellipse, DrawingMode::Line] {
        let mut surface = Surface::new();
        surface.set_mode(mode);
        surface.pointer_down(at, PointerButton::Primary);
        surface.pointer_up(at, PointerButton::Primary);

        match committed_shapes(&surface).as_slice() {
            [Shape::Rectangle { bounds, .. }] | [Shape::Ellipse { bounds, .. }] => {
                assert_eq!(bounds.min, at);
                assert_eq!(bounds.width(), 0.0);
                assert_eq!(bounds.height(), 0.0);
            }
            [Shape::Line { start, end, .. }] => {
                assert_eq!(*start, at);
                assert_eq!(*end, at);
            }
            other => panic!("unexpected content for {mode:?}: {other:?}"),
        }
    }
}

#[test]
fn shapes_keep_insertion_order() {
    let mut surface = Surface::new();
    drag(&mut surface, DrawingMode::Line, &[pos2(0.0, 0.0), pos2(1.0, 1.0)]);
    drag(&mut surface, DrawingMode::Rectangle, &[pos2(0.0, 0.0), pos2(1.0, 1.0)]);
    drag(&mut surface, DrawingMode::Ellipse, &[pos2(0.0, 0.0), pos2(1.0, 1.0)]);

    let shapes = committed_shapes(&surface);
    assert!(matches!(
        shapes.as_slice(),
        [Shape::Line { .. }, Shape::Rectangle { .. }, Shape::Ellipse { .. }]
    ));
}

#[test]
fn move_while_idle_changes_nothing() {
    let mut surface = Surface::new();
    surface.set_mode(DrawingMode::Rectangle);
    surface.pointer_move(pos2(5.0, 5.0), true);
    surface.pointer_up(pos2(5.0, 5.0), PointerButton::Primary);
    assert!(surface.elements().is_empty());
    assert!(surface.ink_strokes().is_empty());
}

#[test]
fn freehand_strokes_do_not_enter_the_element_list() {
    let mut surface = Surface::new();
    drag(
        &mut surface,
        DrawingMode::Freehand,
        &[pos2(1.0, 1.0), pos2(5.0, 5.0), pos2(9.0, 2.0)],
    );
    assert!(surface.elements().is_empty());
    assert_eq!(surface.ink_strokes().len(), 1);
    assert_eq!(surface.ink_strokes()[0].points.len(), 3);
}
