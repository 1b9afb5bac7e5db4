//! 几何内核的整体性质测试

use proptest::prelude::*;
use std::f64::consts::PI;
use zdraft_core::geometry::DEFAULT_SEGMENTS_PER_SPAN;
use zdraft_core::prelude::*;

const TOLERANCE: f64 = 1e-6;

fn coord() -> impl Strategy<Value = f64> {
    -1000.0..1000.0f64
}

fn point() -> impl Strategy<Value = Point2> {
    (coord(), coord()).prop_map(|(x, y)| Point2::new(x, y))
}

fn points(min: usize, max: usize) -> impl Strategy<Value = Vec<Point2>> {
    prop::collection::vec(point(), min..max)
}

fn length() -> impl Strategy<Value = f64> {
    0.1..100.0f64
}

fn angle() -> impl Strategy<Value = f64> {
    -10.0..10.0f64
}

fn block_reference(insert: Point2, rotation: f64, scale: f64) -> BlockReference {
    let mut ids = IdAllocator::new();
    let mut definition = BlockDefinition::new("part", Point2::new(1.0, 2.0));
    definition.add_geometry(&mut ids, Line::new(Point2::new(0.0, 0.0), Point2::new(4.0, 0.0)));
    definition.add_geometry(&mut ids, Circle::new(Point2::new(2.0, 2.0), 1.5));
    BlockReference::new(definition.into_handle(), insert, rotation, scale)
}

/// 覆盖每一种几何变体
fn geometry() -> impl Strategy<Value = Geometry> {
    prop_oneof![
        (point(), point()).prop_map(|(a, b)| Geometry::Line(Line::new(a, b))),
        (point(), length()).prop_map(|(c, r)| Geometry::Circle(Circle::new(c, r))),
        (point(), length(), angle(), angle())
            .prop_map(|(c, r, s, e)| Geometry::Arc(Arc::new(c, r, s, e))),
        (point(), point()).prop_map(|(a, b)| Geometry::Rectangle(Rectangle::new(a, b))),
        (points(2, 8), any::<bool>())
            .prop_map(|(p, closed)| Geometry::Polyline(Polyline::new(p, closed))),
        (points(2, 8), any::<bool>())
            .prop_map(|(p, closed)| Geometry::Spline(Spline::new(p, closed))),
        (point(), length(), length(), angle())
            .prop_map(|(c, a, b, r)| Geometry::Ellipse(Ellipse::new(c, a, b, r))),
        (point(), "[a-z中文]{1,8}", length(), angle())
            .prop_map(|(p, s, h, r)| Geometry::Text(Text::new(p, s, h).with_rotation(r))),
        (points(3, 7), angle(), length()).prop_map(|(ring, a, s)| {
            Geometry::Hatch(Hatch::pattern(vec![ring], "ANSI31", a, s))
        }),
        (point(), angle(), 0.1..5.0f64)
            .prop_map(|(p, r, s)| Geometry::BlockReference(block_reference(p, r, s))),
        (point(), point(), point())
            .prop_map(|(a, b, l)| Geometry::LinearDimension(LinearDimension::new(a, b, l))),
        (point(), point(), any::<bool>()).prop_map(|(c, p, diameter)| {
            Geometry::RadialDimension(if diameter {
                RadialDimension::diameter(c, p)
            } else {
                RadialDimension::radius(c, p)
            })
        }),
        (point(), point(), point(), point()).prop_map(|(v, a, b, l)| {
            Geometry::AngularDimension(AngularDimension::new(v, a, b, l))
        }),
        (points(2, 5), "[A-Z]{1,6}").prop_map(|(v, t)| Geometry::Leader(Leader::new(v, t))),
    ]
}

proptest! {
    #[test]
    fn translate_round_trip(g in geometry(), dx in coord(), dy in coord()) {
        let mut moved = g.clone();
        let offset = Vector2::new(dx, dy);
        moved.translate(&offset);
        moved.translate(&-offset);
        prop_assert!(moved.approx_eq(&g, TOLERANCE), "{:?} vs {:?}", moved, g);
    }

    #[test]
    fn mirror_twice_is_identity(g in geometry(), a in point(), b in point()) {
        prop_assume!((b - a).norm() > 1.0);
        let mut mirrored = g.clone();
        prop_assert!(mirrored.mirror(&a, &b));
        prop_assert!(mirrored.mirror(&a, &b));
        prop_assert!(mirrored.approx_eq(&g, TOLERANCE), "{:?} vs {:?}", mirrored, g);
    }

    #[test]
    fn duplicate_keeps_everything_but_identity(g in geometry(), width in 0.0..2.0f64) {
        let mut ids = IdAllocator::new();
        let properties = Properties::on_layer("标注")
            .with_color(Color::from_rgb(10, 20, 30))
            .with_line_width(width)
            .with_line_type(LineType::Dashed);
        let original = Entity::new(&mut ids, g).with_properties(properties);
        let copy = original.duplicate(&mut ids);
        prop_assert_ne!(copy.id, original.id);
        prop_assert_eq!(&copy.properties, &original.properties);
        prop_assert_eq!(&copy.geometry, &original.geometry);
    }

    #[test]
    fn rectangle_corners_are_ordered(a in point(), b in point()) {
        let [bl, br, tr, tl] = Rectangle::new(a, b).corners();
        prop_assert!(bl.x <= br.x && bl.y <= tl.y);
        prop_assert_eq!(bl.y, br.y);
        prop_assert_eq!(tr.x, br.x);
        prop_assert_eq!(tl.x, bl.x);
        prop_assert_eq!(tr.y, tl.y);
    }

    #[test]
    fn open_spline_ends_on_last_sample(control in points(4, 10), segments in 1usize..32) {
        let spline = Spline::new(control, false);
        let curve = spline.evaluate(segments);
        prop_assert_eq!(curve.len(), spline.span_count() * segments + 1);
        let coarse = spline.evaluate(1);
        let (Some(last), Some(coarse_last)) = (curve.last(), coarse.last()) else {
            return Err(TestCaseError::fail("empty curve"));
        };
        prop_assert!((last - coarse_last).norm() < TOLERANCE);
    }

    #[test]
    fn closed_spline_returns_to_start(control in points(3, 10)) {
        let curve = Spline::new(control, true).evaluate(DEFAULT_SEGMENTS_PER_SPAN);
        let (Some(first), Some(last)) = (curve.first(), curve.last()) else {
            return Err(TestCaseError::fail("empty curve"));
        };
        prop_assert!((first - last).norm() < TOLERANCE);
    }

    #[test]
    fn angles_stay_normalized(
        c in point(),
        r in length(),
        s in angle(),
        e in angle(),
        turn in angle(),
    ) {
        let mut arc = Arc::new(c, r, s, e);
        arc.rotate(&Point2::origin(), turn);
        arc.scale(&Point2::origin(), -1.5);
        for value in [arc.start_angle(), arc.end_angle()] {
            prop_assert!((0.0..2.0 * PI).contains(&value));
        }
    }
}

#[test]
fn arc_wrapping_through_zero() {
    let arc = Arc::new(Point2::origin(), 1.0, 350f64.to_radians(), 10f64.to_radians());
    assert!(arc.contains_angle(0.0));
    assert!(arc.contains_angle(5f64.to_radians()));
    assert!(arc.contains_angle(355f64.to_radians()));
    assert!(!arc.contains_angle(PI));
    assert!((arc.sweep_angle() - 20f64.to_radians()).abs() < 1e-12);
}

#[test]
fn block_definition_edits_reach_every_reference() {
    let mut drawing = Drawing::new();
    let block = drawing.define_block("frame", Point2::origin());
    let a = drawing.insert_block("frame", Point2::new(0.0, 0.0), 0.0, 1.0).unwrap();
    let b = drawing.insert_block("frame", Point2::new(100.0, 0.0), 0.0, 1.0).unwrap();
    assert!(drawing.hit_test(&Point2::new(100.0, 5.0)).is_empty());

    let ids = drawing.ids_mut();
    block
        .borrow_mut()
        .add_geometry(ids, Line::new(Point2::new(0.0, 0.0), Point2::new(0.0, 10.0)));

    let hits = drawing.hit_test(&Point2::new(100.0, 5.0));
    assert_eq!(hits, vec![b.borrow().id]);
    assert_eq!(drawing.hit_test(&Point2::new(0.0, 5.0)), vec![a.borrow().id]);
}

#[test]
fn constraint_session_round_trip() {
    let mut drawing = Drawing::new();
    let base = drawing.add(Line::new(Point2::new(0.0, 0.0), Point2::new(10.0, 0.0)));
    drawing.add(Text::new(Point2::new(0.0, 5.0), "未约束", 2.5));
    let wheel = drawing.add(Circle::new(Point2::new(5.0, 5.0), 2.0));
    let (base_id, wheel_id) = (base.borrow().id, wheel.borrow().id);

    let mut system = ConstraintSystem::new();
    system.add_constraint(zdraft_core::parametric::constraints::tangent(
        GeometryRef::line(base_id, 0),
        GeometryRef::circle(wheel_id, 0),
    ));

    let mut table = ParameterTable::build_from_entities(drawing.entities(), &system);
    assert_eq!(table.len(), 4 + 3);

    // 求解器的结果：圆半径改为 5 并与底线相切
    let Ok(ParamIndex::Direct(i)) = table.parameter_index(&GeometryRef::circle(wheel_id, 0)) else {
        panic!("circle must map directly");
    };
    table.set_value(i + 2, 5.0);
    assert_eq!(table.apply_to_entities(drawing.entities()), 2);

    let points = drawing.intersections(base_id, wheel_id).unwrap();
    assert_eq!(points.len(), 1);
    assert!((points[0] - Point2::new(5.0, 0.0)).norm() < 1e-9);
}
