use proptest::prelude::*;
use shape_region::{BBox, FillRule, Point, Region, Scalar};

fn shape() -> impl Strategy<Value = Region> {
    prop_oneof![
        (0.0..10.0, 0.0..10.0, 0.5..5.0, 0.5..5.0).prop_map(|(x, y, w, h): (Scalar, Scalar, Scalar, Scalar)| {
            Region::rect(BBox::new((x, y), (x + w, y + h)))
        }),
        (0.0..10.0, 0.0..10.0, 0.5..4.0)
            .prop_map(|(x, y, r): (Scalar, Scalar, Scalar)| Region::circle((x, y), r)),
        (2.0..8.0, 2.0..8.0, 1.0..3.0, 0.0..1.0).prop_map(
            |(x, y, r, phase): (Scalar, Scalar, Scalar, Scalar)| star((x, y), r, phase)
        ),
    ]
}

/// Five pointed star with inner radius of half of the outer one
fn star(center: (Scalar, Scalar), radius: Scalar, phase: Scalar) -> Region {
    let center = Point::from(center);
    Region::polygon((0..10).map(|index| {
        let angle = phase + index as Scalar * std::f64::consts::PI / 5.0;
        let r = if index % 2 == 0 { radius } else { radius / 2.0 };
        center + r * Point::new(angle.cos(), angle.sin())
    }))
}

/// Regions cover the same area up to a relative tolerance
fn same_area(r0: &Region, r1: &Region) -> bool {
    let difference = r0.symmetric_difference(r1).area();
    difference <= 1e-6 * (r0.area() + r1.area()).max(1.0)
}

fn universe() -> Region {
    Region::rect(BBox::new((-5.0, -5.0), (20.0, 20.0)))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn area_is_additive(a in shape(), b in shape()) {
        let union = a.union(&b).area();
        let intersection = a.intersection(&b).area();
        let expected = a.area() + b.area();
        prop_assert!((union + intersection - expected).abs() <= 1e-6 * expected);

        let xor = a.symmetric_difference(&b).area();
        prop_assert!((xor + 2.0 * intersection - expected).abs() <= 1e-6 * expected);
    }

    #[test]
    fn operations_commute(a in shape(), b in shape()) {
        prop_assert!(same_area(&a.union(&b), &b.union(&a)));
        prop_assert!(same_area(&a.intersection(&b), &b.intersection(&a)));
        prop_assert!(same_area(&a.symmetric_difference(&b), &b.symmetric_difference(&a)));
    }

    #[test]
    fn de_morgan_laws(a in shape(), b in shape()) {
        let u = universe();
        let left = u.subtracting(&a.union(&b));
        let right = u.subtracting(&a).intersection(&u.subtracting(&b));
        prop_assert!(same_area(&left, &right));

        let left = u.subtracting(&a.intersection(&b));
        let right = u.subtracting(&a).union(&u.subtracting(&b));
        prop_assert!(same_area(&left, &right));
    }

    #[test]
    fn operations_are_idempotent(a in shape(), b in shape()) {
        let region = a.union(&b);
        prop_assert!(same_area(&region.union(&region), &region));
        prop_assert!(same_area(&region.intersection(&region), &region));
        prop_assert!(region.subtracting(&region).is_empty());
        prop_assert!(region.symmetric_difference(&region).is_empty());
    }

    #[test]
    fn path_round_trip(a in shape(), b in shape(), c in shape()) {
        let region = a.union(&b).subtracting(&c);
        let path = region.to_path();
        prop_assert!(same_area(&Region::from_path(&path, FillRule::NonZero), &region));
        prop_assert!(same_area(&Region::from_path(&path, FillRule::EvenOdd), &region));
    }

    #[test]
    fn solids_are_disjoint(a in shape(), b in shape(), c in shape()) {
        let region = a.union(&b).symmetric_difference(&c);
        let solids = region.solids();
        for (index, s0) in solids.iter().enumerate() {
            for s1 in &solids[index + 1..] {
                let common = Region::from(s0.clone()).intersection(&Region::from(s1.clone()));
                prop_assert!(common.area() <= 1e-6 * region.area().max(1.0));
            }
        }
    }
}
