//! End-to-end behaviour of a map as an editor drives it.

use serde_json::json;

use tilegrid_core::commands::{FillRectCommand, ResizeCommand, SetCellCommand};
use tilegrid_core::{GridMap, GridPos, Layer, LayerKind, MapEditor, Marker};

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

#[test]
fn test_collision_marker_survives_resize() {
    init_logging();
    let mut map = GridMap::new(10, 10, 32).unwrap();
    map.set_cell(LayerKind::Collision, 5, 5, "wall");

    let stack = map.cell_content(5, 5);
    for (kind, marker) in stack.iter() {
        if kind == LayerKind::Collision {
            assert_eq!(marker.as_str(), Some("wall"));
        } else {
            assert!(marker.is_empty(), "{kind} should be empty");
        }
    }

    map.resize(20, 20).unwrap();
    assert_eq!(map.cell_content(5, 5), stack);
}

#[test]
fn test_fill_rect_from_off_map_corner() {
    let mut layer = Layer::new(LayerKind::Background, 10, 10, Marker::EMPTY).unwrap();
    layer.fill_rect(-5, -5, 2, 2, "x");
    assert_eq!(layer.occupied_count(), 9);
    assert_eq!(layer.get(2, 2).as_str(), Some("x"));
    assert!(layer.get(3, 2).is_empty());
    assert!(layer.get(2, 3).is_empty());
}

#[test]
fn test_brush_stroke_past_edge_and_undo() {
    init_logging();
    let mut editor = MapEditor::new(GridMap::new(4, 4, 16).unwrap());
    for x in -2..6 {
        editor.execute(Box::new(SetCellCommand::new(LayerKind::Sprite, x, 1, "coin")));
    }
    assert_eq!(editor.map().layer(LayerKind::Sprite).occupied_count(), 4);

    while editor.undo() {}
    assert_eq!(editor.map().layer(LayerKind::Sprite).occupied_count(), 0);
}

#[test]
fn test_resize_shrink_then_undo_restores_cropped_cells() {
    let mut editor = MapEditor::new(GridMap::new(8, 8, 16).unwrap());
    editor.execute(Box::new(FillRectCommand::new(LayerKind::Event, 6, 6, 7, 7, "exit")));
    editor.execute(Box::new(ResizeCommand::new(4, 4).unwrap()));
    assert!(editor.map().cell(LayerKind::Event, 6, 6).is_empty());

    editor.undo();
    assert_eq!(editor.map().width(), 8);
    assert_eq!(editor.map().cell(LayerKind::Event, 7, 7).as_str(), Some("exit"));
}

#[test]
fn test_roundtrip_through_json_text() {
    init_logging();
    let mut map = GridMap::new(12, 9, 24).unwrap();
    map.properties.name = "Cave".to_string();
    map.properties.extra.insert("music".to_string(), json!("drip.ogg"));
    map.layer_mut(LayerKind::Background).fill_rect(0, 0, 11, 8, "stone");
    map.layer_mut(LayerKind::Collision).fill_rect(0, 0, 11, 0, "wall");
    map.set_cell(LayerKind::Event, 6, 4, "npc:hermit");
    map.layer_mut(LayerKind::Event).set_property("locked", json!(true));

    let text = map.to_json().unwrap();
    let value: serde_json::Value = serde_json::from_str(&text).unwrap();

    let mut fresh = GridMap::new(3, 40, 8).unwrap();
    assert!(fresh.import_data(&value));
    for y in 0..9 {
        for x in 0..12 {
            assert_eq!(fresh.cell_content(x, y), map.cell_content(x, y), "cell ({x}, {y})");
        }
    }
    assert_eq!(fresh.properties.extra.get("music"), Some(&json!("drip.ogg")));
    assert_eq!(fresh.layer(LayerKind::Event).property("locked"), Some(json!(true)));
}

#[test]
fn test_coordinate_inverse_scenario() {
    let map = GridMap::new(10, 10, 32).unwrap();
    let p = map.grid_to_screen(3, 4);
    assert_eq!(map.screen_to_grid(p.x, p.y), GridPos::new(3, 4));
}
