use super::*;

fn config() -> GenerationConfig {
    GenerationConfig::with_font("default")
}

fn fixed(mut c: GenerationConfig, w: u32, h: u32) -> GenerationConfig {
    c.canvas_width = Dimension::Fixed(w);
    c.canvas_height = Dimension::Fixed(h);
    c
}

fn with_center(mut c: GenerationConfig, mode: CenterMode) -> GenerationConfig {
    c.center_mode = mode;
    c
}

#[test]
fn symmetric_ink_gives_same_anchor_in_both_modes() {
    let m = TextMetrics {
        advance: Rect::new(0.0, 0.0, 20.0, 40.0),
        ink: Some(Rect::new(5.0, 10.0, 15.0, 30.0)),
    };
    let base = fixed(config(), 100, 100);
    let g = plan_canvas(&m, &with_center(base.clone(), CenterMode::Geometry)).unwrap();
    let v = plan_canvas(&m, &with_center(base, CenterMode::Visual)).unwrap();
    assert_eq!(g.offset, v.offset);
    assert_eq!(g.offset, Vec2::new(40.0, 30.0));
}

#[test]
fn lower_stroke_glyph_differs_between_modes() {
    let m = TextMetrics {
        advance: Rect::new(0.0, 0.0, 20.0, 40.0),
        ink: Some(Rect::new(2.0, 30.0, 18.0, 36.0)),
    };
    let base = fixed(config(), 100, 100);
    let g = plan_canvas(&m, &with_center(base.clone(), CenterMode::Geometry)).unwrap();
    let v = plan_canvas(&m, &with_center(base, CenterMode::Visual)).unwrap();
    assert_eq!(g.offset, Vec2::new(40.0, 30.0));
    assert_eq!(v.offset, Vec2::new(40.0, 17.0));
    assert_ne!(g.offset, v.offset);
    // Visual placement puts the ink center exactly on the anchor.
    let ink_center = m.ink.unwrap().center() + v.offset;
    assert_eq!(ink_center, Point::new(50.0, 50.0));
}

#[test]
fn auto_width_visual_is_ink_plus_padding() {
    let m = TextMetrics {
        advance: Rect::new(0.0, 0.0, 20.0, 40.0),
        ink: Some(Rect::new(5.0, 10.0, 15.0, 30.0)),
    };
    let mut c = config();
    c.padding = 3;
    let plan = plan_canvas(&m, &c).unwrap();
    assert_eq!(plan.width, 16);
    assert_eq!(plan.height, 46);
    let ink = m.ink.unwrap();
    assert_eq!(ink.x0 + plan.offset.x, 3.0);
    assert_eq!(ink.x1 + plan.offset.x, 13.0);
}

#[test]
fn auto_width_geometry_covers_overhanging_ink() {
    let m = TextMetrics {
        advance: Rect::new(0.0, 0.0, 20.0, 40.0),
        ink: Some(Rect::new(-3.0, 5.0, 18.0, 30.0)),
    };
    let plan = plan_canvas(&m, &with_center(config(), CenterMode::Geometry)).unwrap();
    assert_eq!(plan.width, 23);
    let ink = m.ink.unwrap();
    assert!(ink.x0 + plan.offset.x >= 0.0);
    assert!(ink.x1 + plan.offset.x <= f64::from(plan.width));
}

#[test]
fn auto_width_wraps_content_at_any_ratio() {
    let m = TextMetrics {
        advance: Rect::new(0.0, 0.0, 10.0, 40.0),
        ink: Some(Rect::new(0.0, 0.0, 10.0, 40.0)),
    };
    for ratio in [0.0, 0.25, 0.75, 1.0] {
        let mut c = config();
        c.x_offset_ratio = ratio;
        let plan = plan_canvas(&m, &c).unwrap();
        assert_eq!(plan.width, 10, "ratio {ratio}");
        assert_eq!(plan.offset.x, 0.0, "ratio {ratio}");
    }
}

fn assert_inside(m: &TextMetrics, plan: &CanvasPlan, label: &str) {
    let ink = m.ink.unwrap() + plan.offset;
    assert!(ink.x0 >= 0.0, "{label}: ink starts at {}", ink.x0);
    assert!(ink.y0 >= 0.0, "{label}: ink starts at {}", ink.y0);
    assert!(ink.x1 <= f64::from(plan.width), "{label}: {} > {}", ink.x1, plan.width);
    assert!(ink.y1 <= f64::from(plan.height), "{label}: {} > {}", ink.y1, plan.height);
}

#[test]
fn auto_canvas_never_clips_at_extreme_ratios() {
    let m = TextMetrics {
        advance: Rect::new(0.0, 0.0, 37.5, 40.0),
        ink: Some(Rect::new(-1.25, 6.5, 38.75, 47.5)),
    };
    for mode in [CenterMode::Visual, CenterMode::Geometry] {
        for (rx, ry) in [(0.0, 0.0), (1.0, 1.0), (0.0001, 0.9999), (1.0, 0.0)] {
            let mut c = with_center(config(), mode);
            c.padding = 2;
            c.x_offset_ratio = rx;
            c.y_offset_ratio = ry;
            let plan = plan_canvas(&m, &c).unwrap();
            assert_inside(&m, &plan, &format!("{mode:?} at ({rx}, {ry})"));
            let ink = m.ink.unwrap() + plan.offset;
            assert!(ink.x0 >= 2.0 && ink.x1 <= f64::from(plan.width) - 2.0);
        }
    }
}

#[test]
fn auto_canvas_size_does_not_depend_on_ratio() {
    let m = TextMetrics {
        advance: Rect::new(0.0, 0.0, 30.0, 40.0),
        ink: Some(Rect::new(2.0, 8.0, 28.0, 36.0)),
    };
    let centered = plan_canvas(&m, &config()).unwrap();
    let mut edge = config();
    edge.x_offset_ratio = 0.0;
    edge.y_offset_ratio = 1.0;
    let shifted = plan_canvas(&m, &edge).unwrap();
    assert_eq!(
        (centered.width, centered.height),
        (shifted.width, shifted.height)
    );
    // Vertical slack from the line box is distributed by the ratio.
    assert!(shifted.offset.y > centered.offset.y);
}

#[test]
fn fixed_width_still_uses_anchor_with_auto_height() {
    let m = TextMetrics {
        advance: Rect::new(0.0, 0.0, 20.0, 40.0),
        ink: Some(Rect::new(5.0, 10.0, 15.0, 30.0)),
    };
    let mut c = config();
    c.canvas_width = Dimension::Fixed(100);
    c.x_offset_ratio = 0.25;
    let plan = plan_canvas(&m, &c).unwrap();
    assert_eq!(plan.width, 100);
    assert_eq!(plan.anchor.x, 25.0);
    assert_eq!(plan.offset.x, 15.0);
}

#[test]
fn dpi_scales_padding_and_explicit_dimensions() {
    let m = TextMetrics {
        advance: Rect::new(0.0, 0.0, 20.0, 40.0),
        ink: None,
    };
    let mut c = fixed(config(), 50, 30);
    c.dpi = 144;
    c.padding = 2;
    let plan = plan_canvas(&m, &c).unwrap();
    assert_eq!((plan.width, plan.height), (100, 60));
    assert_eq!(plan.anchor, Point::new(50.0, 30.0));
}

#[test]
fn explicit_canvas_without_drawable_area_is_render_error() {
    let m = TextMetrics {
        advance: Rect::new(0.0, 0.0, 20.0, 40.0),
        ink: None,
    };
    let mut c = fixed(config(), 10, 10);
    c.padding = 5;
    assert!(matches!(
        plan_canvas(&m, &c).unwrap_err(),
        TextToolError::Render { .. }
    ));
}

#[test]
fn oversized_canvas_is_render_error() {
    let m = TextMetrics {
        advance: Rect::new(0.0, 0.0, 20.0, 40.0),
        ink: None,
    };
    let c = fixed(config(), 70_000, 10);
    assert!(plan_canvas(&m, &c).is_err());
}

#[test]
fn explicit_canvas_smaller_than_text_clips_without_error() {
    let m = TextMetrics {
        advance: Rect::new(0.0, 0.0, 200.0, 40.0),
        ink: Some(Rect::new(0.0, 5.0, 200.0, 35.0)),
    };
    let plan = plan_canvas(&m, &fixed(config(), 20, 20)).unwrap();
    assert_eq!((plan.width, plan.height), (20, 20));
}

#[test]
fn blank_text_yields_minimal_canvas() {
    let m = TextMetrics {
        advance: Rect::new(0.0, 0.0, 0.0, 40.0),
        ink: None,
    };
    let plan = plan_canvas(&m, &config()).unwrap();
    assert_eq!((plan.width, plan.height), (1, 40));

    let mut padded = config();
    padded.padding = 4;
    let plan = plan_canvas(&m, &padded).unwrap();
    assert_eq!((plan.width, plan.height), (8, 48));
}
