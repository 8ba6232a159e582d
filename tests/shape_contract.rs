//! Shape contract properties exercised through the public API.

use glam::dvec2;
use shapewright::ports::{self, ConnectionStyle, PortRole};
use shapewright::shape::{LayerRole, RenderContext};
use shapewright::{Registry, ResizeOptions, Shape, ShapeOverrides};

fn registry() -> Registry {
    Registry::with_builtins()
}

fn make(registry: &Registry, ty: &str, x: f64, y: f64, w: f64, h: f64) -> Shape {
    registry
        .create(ty, &ShapeOverrides::at(x, y).with_size(w, h))
        .unwrap()
}

// =============================================================================
// Outlines
// =============================================================================

#[test]
fn rectangle_outline() {
    let r = registry();
    let shape = make(&r, "rectangle", 0.0, 0.0, 120.0, 80.0);
    insta::assert_snapshot!(shape.path().to_string(), @"M0,0 L120,0 L120,80 L0,80 Z");
}

#[test]
fn rounded_rectangle_outline() {
    let r = registry();
    let shape = make(&r, "rounded-rectangle", 0.0, 0.0, 120.0, 80.0);
    insta::assert_snapshot!(
        shape.path().to_string(),
        @"M10,0 L110,0 A10,10 0 0 1 120,10 L120,70 A10,10 0 0 1 110,80 L10,80 A10,10 0 0 1 0,70 L0,10 A10,10 0 0 1 10,0 Z"
    );
}

#[test]
fn corner_radius_comes_from_the_data_bag() {
    let r = registry();
    let mut overrides = ShapeOverrides::at(0.0, 0.0).with_size(40.0, 20.0);
    overrides.data.insert("cornerRadius".to_string(), 50.into());
    let shape = r.create("rounded-rectangle", &overrides).unwrap();
    // Clamped to half the shorter side
    insta::assert_snapshot!(
        shape.path().to_string(),
        @"M10,0 L30,0 A10,10 0 0 1 40,10 L40,10 A10,10 0 0 1 30,20 L10,20 A10,10 0 0 1 0,10 L0,10 A10,10 0 0 1 10,0 Z"
    );
}

#[test]
fn diamond_outline() {
    let r = registry();
    let shape = make(&r, "diamond", 0.0, 0.0, 100.0, 60.0);
    insta::assert_snapshot!(shape.path().to_string(), @"M50,0 L100,30 L50,60 L0,30 Z");
}

#[test]
fn circle_outline() {
    let r = registry();
    let shape = make(&r, "circle", 0.0, 0.0, 100.0, 100.0);
    insta::assert_snapshot!(shape.path().to_string(), @"M0,50 A50,50 0 0 1 100,50 A50,50 0 0 1 0,50 Z");
}

#[test]
fn triangle_orientations() {
    let r = registry();
    let mut shape = make(&r, "triangle", 0.0, 0.0, 100.0, 100.0);
    insta::assert_snapshot!(shape.path().to_string(), @"M50,0 L100,100 L0,100 Z");
    shape.set_data("orientation", "right");
    insta::assert_snapshot!(shape.path().to_string(), @"M0,0 L100,50 L0,100 Z");
}

#[test]
fn document_outline_has_a_wave() {
    let r = registry();
    let shape = make(&r, "document", 0.0, 0.0, 100.0, 120.0);
    insta::assert_snapshot!(
        shape.path().to_string(),
        @"M0,0 L100,0 L100,108 Q75,96 50,108 Q25,120 0,108 Z"
    );
}

#[test]
fn every_builtin_outline_starts_with_a_move() {
    let r = registry();
    for ty in r.type_ids() {
        let shape = r.create(&ty, &ShapeOverrides::default()).unwrap();
        let path = shape.path();
        assert!(
            matches!(path.segments().first(), Some(shapewright::Segment::MoveTo { .. })),
            "{ty}: {path}"
        );
        assert!(path.is_finite(), "{ty}");
    }
}

// =============================================================================
// Bounds, hit testing, serialization
// =============================================================================

#[test]
fn bounds_match_configured_geometry() {
    let r = registry();
    for ty in r.type_ids() {
        let shape = r
            .create(&ty, &ShapeOverrides::at(7.0, 9.0).with_size(120.0, 120.0))
            .unwrap();
        let b = shape.bounds();
        assert_eq!((b.x, b.y, b.width, b.height), (7.0, 9.0, shape.width(), shape.height()));
        assert_eq!(b.left, b.x);
        assert_eq!(b.top, b.y);
        assert_eq!(b.right, b.x + b.width);
        assert_eq!(b.bottom, b.y + b.height);
        assert_eq!(b.center_x, b.x + b.width / 2.0);
        assert_eq!(b.center_y, b.y + b.height / 2.0);
    }
}

#[test]
fn diamond_hit_test() {
    let r = registry();
    // Centered at (50, 50)
    let shape = make(&r, "diamond", 0.0, 20.0, 100.0, 60.0);
    assert!(shape.contains_point(dvec2(50.0, 50.0)));
    assert!(shape.contains_point(dvec2(50.0, 20.0)));
    assert!(shape.contains_point(dvec2(0.0, 50.0)));
    assert!(!shape.contains_point(dvec2(0.0, 20.0)));
    assert!(!shape.contains_point(dvec2(90.0, 25.0)));
}

#[test]
fn circle_and_ellipse_hit_tests_are_precise() {
    let r = registry();
    let circle = make(&r, "circle", 0.0, 0.0, 100.0, 100.0);
    assert!(circle.contains_point(dvec2(50.0, 1.0)));
    assert!(!circle.contains_point(dvec2(5.0, 5.0)));

    let ellipse = make(&r, "ellipse", 0.0, 0.0, 200.0, 100.0);
    assert!(ellipse.contains_point(dvec2(190.0, 50.0)));
    assert!(!ellipse.contains_point(dvec2(190.0, 10.0)));
}

#[test]
fn star_hit_test_excludes_the_notches() {
    let r = registry();
    let star = make(&r, "star", 0.0, 0.0, 100.0, 100.0);
    assert!(star.contains_point(dvec2(50.0, 50.0)));
    assert!(star.contains_point(dvec2(50.0, 5.0)));
    assert!(!star.contains_point(dvec2(20.0, 20.0)));
}

#[test]
fn serialize_round_trips() {
    let r = registry();
    for ty in r.type_ids() {
        let mut shape = r.create(&ty, &ShapeOverrides::at(3.0, 4.0)).unwrap();
        shape.set_label("hello");
        shape.set_rotation(30.0);
        shape.set_data("note", "kept");

        let once = shape.serialize();
        let json = shape.to_json().unwrap();
        let restored = Shape::from_json(&json, shape.behavior().clone()).unwrap();
        assert_eq!(restored.serialize(), once, "{ty}");
    }
}

#[test]
fn wire_format_field_names() {
    let r = registry();
    let shape = make(&r, "rectangle", 0.0, 0.0, 100.0, 100.0);
    let v: serde_json::Value = serde_json::from_str(&shape.to_json().unwrap()).unwrap();
    for field in [
        "id", "type", "name", "category", "x", "y", "width", "height", "rotation", "style", "label", "textStyle",
        "ports", "portsEnabled", "handles", "handlesEnabled", "constraints", "features", "locked", "visible", "data",
    ] {
        assert!(v.get(field).is_some(), "missing {field}");
    }
    assert_eq!(v["ports"][0]["type"], "both");
    assert!(v["constraints"].get("aspectRatio").is_some());
}

// =============================================================================
// Sizing and resize
// =============================================================================

#[test]
fn aspect_ratio_survives_any_set_size_sequence() {
    let r = registry();
    let mut overrides = ShapeOverrides::default();
    overrides.constraints.aspect_ratio = Some(Some(1.5));
    let mut shape = r.create("ellipse", &overrides).unwrap();
    for (w, h) in [(300.0, 10.0), (1.0, 1.0), (99_999.0, 3.0), (42.0, 420.0), (10.0, 10_000.0)] {
        shape.set_size(w, h);
        assert!((shape.width() / shape.height() - 1.5).abs() < 1e-2, "{w}x{h}");
    }
}

#[test]
fn resize_through_handles() {
    let r = registry();
    let mut shape = make(&r, "rectangle", 0.0, 0.0, 100.0, 100.0);
    let opts = ResizeOptions::default();
    assert!(shape.resize_with_handle("se", 10.0, 10.0, &opts));
    assert_eq!(shape.bounds().width, 110.0);

    assert!(!shape.resize_with_handle("middle", 10.0, 10.0, &opts));
    assert_eq!(shape.bounds().width, 110.0);

    assert!(shape.resize_with_handle("nw", 10.0, 10.0, &opts));
    let b = shape.bounds();
    assert_eq!((b.x, b.y, b.width, b.height), (10.0, 10.0, 100.0, 100.0));
}

#[test]
fn non_resizable_shapes_refuse_handles() {
    let r = registry();
    let mut overrides = ShapeOverrides::default();
    overrides.features.resizable = Some(false);
    let mut shape = r.create("rectangle", &overrides).unwrap();
    assert!(!shape.resize_with_handle("e", 20.0, 0.0, &ResizeOptions::default()));
}

// =============================================================================
// Ports and connections
// =============================================================================

#[test]
fn orthogonal_route_between_facing_sides() {
    let r = registry();
    let a = make(&r, "rectangle", 0.0, 0.0, 100.0, 100.0);
    let b = make(&r, "rectangle", 200.0, 100.0, 100.0, 100.0);
    let out = ports::find_nearest_port(&a, dvec2(100.0, 50.0), 10.0).unwrap();
    let inp = ports::find_nearest_port(&b, dvec2(200.0, 150.0), 10.0).unwrap();
    assert_eq!((out.port_id.as_str(), inp.port_id.as_str()), ("right", "left"));
    assert!(ports::can_connect(&out, &inp));

    let path = ports::connection_path(&out, &inp, ConnectionStyle::Orthogonal);
    insta::assert_snapshot!(path.to_string(), @"M100,50 L150,50 L150,150 L200,150");
    let straight = ports::connection_path(&out, &inp, ConnectionStyle::Straight);
    insta::assert_snapshot!(straight.to_string(), @"M100,50 L200,150");
}

#[test]
fn optimal_port_faces_the_target() {
    let r = registry();
    let a = make(&r, "rectangle", 0.0, 0.0, 100.0, 100.0);
    let below = make(&r, "rectangle", 0.0, 300.0, 100.0, 100.0);
    let port = ports::optimal_port(&a, &below, PortRole::Output).unwrap();
    assert_eq!(port.port_id, "bottom");
}

#[test]
fn arrow_ports_are_directional() {
    let r = registry();
    let arrow = make(&r, "arrow", 0.0, 0.0, 120.0, 30.0);
    let positions = arrow.port_positions();
    assert_eq!(positions.len(), 2);
    assert!(!ports::can_connect(&positions[0], &positions[1]));
    assert!(ports::can_connect(&positions[1], &positions[0]));
}

#[test]
fn disabled_ports_have_no_positions() {
    let r = registry();
    let mut overrides = ShapeOverrides::default();
    overrides.ports_enabled = Some(false);
    let shape = r.create("rectangle", &overrides).unwrap();
    assert!(shape.port_positions().is_empty());
    assert!(ports::find_nearest_port(&shape, dvec2(50.0, 0.0), 100.0).is_none());
}

// =============================================================================
// Rendering
// =============================================================================

#[test]
fn render_layers_follow_interaction_state() {
    let r = registry();
    let mut shape = make(&r, "rectangle", 0.0, 0.0, 100.0, 100.0);
    shape.set_label("Start");
    let ctx = RenderContext::default();

    let plain = shape.render(&ctx);
    assert_eq!(plain.layers.len(), 1);
    assert_eq!(plain.layers[0].fill.as_deref(), Some("#ffffff"));
    assert_eq!(plain.label.as_ref().map(|l| (l.x, l.y)), Some((50.0, 50.0)));

    shape.set_selected(true);
    let selected = shape.render(&ctx);
    assert_eq!(selected.layers_with_role(LayerRole::Handle).count(), 8);

    let with_ports = shape.render(&RenderContext {
        show_ports: true,
        show_handles: false,
    });
    assert_eq!(with_ports.layers_with_role(LayerRole::Port).count(), 4);
    assert_eq!(with_ports.layers_with_role(LayerRole::Handle).count(), 0);

    shape.set_visible(false);
    assert!(shape.render(&ctx).layers.is_empty());
}

#[test]
fn arrow_renders_shaft_and_heads() {
    let r = registry();
    let mut arrow = make(&r, "arrow", 0.0, 0.0, 120.0, 30.0);
    let drawable = arrow.render(&RenderContext::default());
    let shaft: Vec<_> = drawable.layers_with_role(LayerRole::Body).collect();
    assert_eq!(shaft.len(), 1);
    assert!(shaft[0].fill.is_none());
    insta::assert_snapshot!(shaft[0].path.to_string(), @"M0,15 L120,15");
    insta::assert_snapshot!(
        drawable.layers_with_role(LayerRole::Decoration).next().unwrap().path.to_string(),
        @"M120,15 L108,19 L108,11 Z"
    );

    arrow.set_data("arrow", "double");
    let double = arrow.render(&RenderContext::default());
    let heads = double.layers_with_role(LayerRole::Decoration).next().unwrap();
    assert_eq!(heads.path.segments().iter().filter(|s| **s == shapewright::Segment::Close).count(), 2);
}
