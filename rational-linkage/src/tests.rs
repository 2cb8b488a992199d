use crate::{mech::*, scalar::int, *};
use approx::assert_abs_diff_eq;
use proptest::prelude::*;
use std::f64::consts::{FRAC_PI_2, PI};

fn dq(v: [i64; 8]) -> DualQuaternion<Rational> {
    DualQuaternion::from_array(v.map(int))
}

fn dq_f64(v: [i64; 8]) -> DualQuaternion {
    DualQuaternion::from_array(v.map(|x| x as f64))
}

fn scenario_poses() -> [DualQuaternion<Rational>; 4] {
    [
        dq([1, 0, 0, 0, 0, 0, 0, 0]),
        dq([0, 0, 0, 1, 1, 0, 1, 0]),
        dq([1, 2, 0, 0, -2, 1, 0, 0]),
        dq([3, 0, 1, 0, 1, 0, -3, 0]),
    ]
}

// Planar 4-bar with pivots at x = 0, 1, 3, 4, the links at the heights
// z = 0 (base), 2, 1 and `tool_z`
fn four_bar(tool_z: f64) -> RationalMechanism {
    let f0 = MotionFactorization::new(vec![
        dq_f64([0, 0, 0, 1, 0, 0, 0, 0]),
        dq_f64([0, 0, 0, -2, 0, 0, -2, 0]),
    ])
    .unwrap()
    .with_connection_points(vec![[[0., 0., 0.], [0., 0., 2.]], [[1., 0., 2.], [1., 0., tool_z]]])
    .unwrap();
    let f1 = MotionFactorization::new(vec![
        dq_f64([0, 0, 0, -2, 0, 0, -6, 0]),
        dq_f64([0, 0, 0, 1, 0, 0, 4, 0]),
    ])
    .unwrap()
    .with_connection_points(vec![[[3., 0., 0.], [3., 0., 1.]], [[4., 0., 1.], [4., 0., tool_z]]])
    .unwrap();
    RationalMechanism::new([f0, f1], None).unwrap()
}

proptest! {
    #[test]
    fn matrix_round_trip(
        point in prop::array::uniform3(-5f64..5.),
        dir in prop::array::uniform3(-1f64..1.),
        angle in -PI..=PI,
        shift in prop::array::uniform3(-5f64..5.),
    ) {
        prop_assume!(dir.iter().map(|x| x * x).sum::<f64>() > 1e-2);
        let rot = DualQuaternion::rotation(point, dir, angle);
        let pose = &DualQuaternion::translation(shift) * &rot;
        let back = DualQuaternion::matrix2dq(&pose.dq2matrix());
        prop_assert!(back.eq_projective(&pose), "{back:?} != {pose:?}");
        prop_assert!(back.satisfies_study());
    }
}

#[test]
fn four_poses_exact_cubic() {
    let poses = scenario_poses();
    let res = syn::interpolate(&poses).unwrap();
    assert_eq!(res.params, [1, -1, -3].map(int::<Rational>));
    for (i, pose) in poses.iter().enumerate() {
        assert!(res.pose(i).unwrap().eq_projective(pose), "pose {i}");
    }
    assert!(res.curve.is_monic());
    assert!(res.curve.is_motion());
    #[rustfmt::skip]
    let reference = [
        [7, 1, -11, 3],
        [0, -4, -8, 12],
        [0, -6, 0, 6],
        [0, 2, 8, 6],
        [0, 0, 16, 0],
        [0, -2, -4, 6],
        [0, 20, 8, -12],
        [0, 0, 0, 0],
    ]
    .map(|r| r.map(|v| Rational::new(v.into(), 7.into())).to_vec());
    assert_eq!(res.curve.coeffs(), reference.to_vec());
}

#[test]
fn four_poses_mechanism() {
    let res = syn::interpolate(&scenario_poses()).unwrap();
    let curve = res.curve.to_f64();
    let [f0, f1] = factorize(&curve, &NumericOracle).unwrap();
    assert_eq!(f0.joint_num(), 3);
    assert_eq!(f1.joint_num(), 3);
    for h in f0.axes().iter().chain(f1.axes()) {
        assert_eq!(h.dq_type(), DqType::Rotation);
    }
    // The link poses end at the motion
    let t = 0.3;
    let links = f1.direct_kinematics(t);
    assert!(links[2].eq_projective(&curve.pose_at(t)));
    let mech = RationalMechanism::new([f0, f1], None).unwrap();
    for t in [-2., -0.5, 0., 1.5, 10.] {
        assert!(mech.is_closed(t), "open at {t}");
    }
    assert_eq!(mech.segments().unwrap().len(), 12);
    assert!(mech.dh_chain_closes().unwrap());
}

#[test]
fn scaled_poses() {
    let poses = scenario_poses().map(|p| p.to_f64());
    let unit = syn::interpolate(&poses).unwrap();
    for s in [1e-6, 1e4] {
        let scaled = poses.clone().map(|p| p.scale(&s));
        let res = syn::interpolate(&scaled).unwrap();
        for (t, e) in res.params.iter().zip([1., -1., -3.]) {
            assert_abs_diff_eq!(*t, e, epsilon = 1e-9);
        }
        for (i, pose) in scaled.iter().enumerate() {
            assert!(res.pose(i).unwrap().eq_projective(pose), "pose {i} at {s}");
        }
        assert!(res.curve.eq_projective(&unit.curve));
        let res = syn::interpolate(&scaled[..3]).unwrap();
        assert!(res.curve.is_motion());
        assert!(res.pose(2).unwrap().eq_projective(&scaled[2]));
    }
    let tiny = unit.curve.scale(&1e-12);
    assert!(tiny.is_motion());
    let [f0, f1] = factorize(&tiny, &NumericOracle).unwrap();
    assert_eq!(f0.joint_num() + f1.joint_num(), 6);
}

#[test]
fn exact_curve_to_mechanism() {
    let res = syn::interpolate(&scenario_poses()).unwrap();
    let mech = RationalMechanism::from_curve(&res.curve, &NumericOracle).unwrap();
    assert_eq!(mech.factorizations()[0].joint_num(), 3);
    assert_eq!(mech.factorizations()[1].joint_num(), 3);
    for t in [-1., 0.25, 4.] {
        assert!(mech.is_closed(t), "open at {t}");
    }
}

#[test]
fn cubic_failures() {
    let [p0, p1, p2, p3] = scenario_poses();
    let res = syn::interpolate(&[p1.clone(), p0.clone(), p2.clone(), p3]);
    assert!(matches!(res, Err(Error::InvalidInput(_))));
    // The nodes are roots of 11 x² + 6 x - 1
    let p3 = dq([1, 0, 1, 0, 1, 0, -1, 0]);
    assert!(p3.satisfies_study());
    let poses = [p0, p1, p2, p3];
    assert!(matches!(syn::interpolate(&poses), Err(Error::Interpolation(_))));
    let poses = poses.map(|p| p.to_f64());
    let res = syn::interpolate(&poses).unwrap();
    assert!(res.curve.is_motion());
    for (i, pose) in poses.iter().enumerate() {
        assert!(res.pose(i).unwrap().eq_projective(pose), "pose {i}");
    }
}

#[test]
fn quadratic_incompatible_poses() {
    let [p0, p1, ..] = scenario_poses();
    // No primal overlap with the identity
    let p2 = dq([1, 0, 0, 0, 0, 1, 0, 0]);
    assert!(matches!(syn::interpolate(&[p0, p1, p2]), Err(Error::Interpolation(_))));
}

#[test]
fn three_poses_quadratic() {
    let [p0, p1, p2, _] = scenario_poses();
    let poses = [p0, p1, p2];
    let res = syn::interpolate(&poses).unwrap();
    assert_eq!(res.curve.degree(), 2);
    assert!(res.curve.is_motion());
    for (i, pose) in poses.iter().enumerate() {
        assert!(res.pose(i).unwrap().eq_projective(pose), "pose {i}");
    }
    assert!(matches!(syn::interpolate(&poses[..1]), Err(Error::InvalidInput(_))));
}

#[test]
fn two_poses_shortest_motion() {
    let _ = env_logger::builder().is_test(true).try_init();
    let (s, c) = (FRAC_PI_2 / 2.).sin_cos();
    let rot = Quaternion::from_array([c, 0., 0., s]);
    let poses = [
        DualQuaternion::identity(),
        DualQuaternion::from_rotation_translation(rot, [1., 0.5, 2.]),
    ];
    let cfg = syn::TwoPoseCfg::default().gen(10).pop(20).seed(1);
    let res = syn::interpolate_two(&poses, &cfg).unwrap();
    assert_eq!(res.curve.degree(), 2);
    assert!(res.curve.is_motion());
    assert!(res.pose(0).unwrap().is_identity());
    assert!(res.pose(1).unwrap().eq_projective(&poses[1]));
}

#[test]
fn five_and_seven_points() {
    let h = [
        dq_f64([0, 0, 0, 1, 0, 0, 0, 0]),
        dq_f64([1, 1, 0, 0, 0, 0, -1, 0]),
        dq_f64([0, 0, 1, 0, 0, 1, 0, 0]),
    ];
    let q0 = [1., 2., 3.];
    for n in [2, 3] {
        let curve = RationalCurve::from_factors(&h[..n]);
        let points = std::iter::once(q0)
            .chain((0..2 * n).map(|i| curve.pose_at(i as f64).transform_point(q0)))
            .collect::<Vec<_>>();
        let res = syn::interpolate_points(&points).unwrap();
        assert_eq!(res.curve.degree(), n);
        assert!(res.curve.eq_projective(&curve));
        for (t, p) in res.params.iter().zip(&points[1..]) {
            let q = res.curve.pose_at(*t).transform_point(q0);
            for (a, b) in q.iter().zip(p) {
                assert_abs_diff_eq!(a, b, epsilon = 1e-9);
            }
        }
    }
    assert!(syn::interpolate_points(&[q0; 6]).is_err());
}

#[test]
fn four_bar_is_collision_free() {
    let mech = four_bar(3.);
    for t in [-3., 0., 0.7, 2.] {
        assert!(mech.is_closed(t));
    }
    let segs = mech.segments().unwrap();
    assert_eq!(segs.len(), 8);
    let serial = mech.collision_check(&CollisionCfg::default().parallel(false)).unwrap();
    assert!(serial.is_empty(), "{serial:?}");
    let parallel = mech.collision_check(&CollisionCfg::default()).unwrap();
    assert_eq!(parallel, serial);
}

#[test]
fn tool_over_base_collides() {
    let mech = four_bar(0.);
    let segs = mech.segments().unwrap();
    let tool = segs.len() - 1;
    assert_eq!(segs[tool].kind, SegmentKind::Tool);
    let hits = mech.collision_check(&CollisionCfg::default().parallel(false)).unwrap();
    assert!(hits.iter().any(|c| c.pair == [0, tool] && c.t.is_infinite()));
    let first = mech.collision_check(&CollisionCfg::default().first_conflict(true)).unwrap();
    assert_eq!(first.len(), 1);
    // The home configuration sits in the middle of the inverse half
    let intervals = proximity_intervals(&segs[0], &segs[tool], 4);
    assert!(intervals.len() <= 2 * 16);
    assert!(intervals
        .iter()
        .any(|p| p.half == 1 && p.interval[0] <= 0.5 && 0.5 <= p.interval[1]));
}

#[test]
fn four_bar_kinematics() {
    let mech = four_bar(3.);
    assert_eq!(mech.direct_kinematics(0.).unwrap(), DualQuaternion::identity());
    for angle in [0.4, 2., 4.5] {
        let pose = mech.direct_kinematics(angle).unwrap();
        let angles = mech.inverse_kinematics(&pose).unwrap();
        assert!(angles.iter().any(|a| (a - angle).abs() < 1e-6), "{angles:?}");
        let t = mech.joint_angle_to_t_param(angle).unwrap();
        assert_abs_diff_eq!(mech.t_param_to_joint_angle(t).unwrap(), angle, epsilon = 1e-12);
    }
    let deg = mech.direct_kinematics_in(90., AngleUnit::Deg).unwrap();
    assert!(deg.eq_projective(&mech.direct_kinematics(FRAC_PI_2).unwrap()));
    assert_eq!("deg".parse::<AngleUnit>().unwrap(), AngleUnit::Deg);
    assert!(matches!("turn".parse::<AngleUnit>(), Err(Error::InvalidInput(_))));
}

#[test]
fn four_bar_dh_and_links() {
    let mech = four_bar(3.);
    let dh = mech.get_dh_params().unwrap();
    assert_eq!(dh.len(), 4);
    for (p, a) in dh.iter().zip([1., 3., 1., 3.]) {
        assert_abs_diff_eq!(p.a, a, epsilon = 1e-9);
        assert_abs_diff_eq!(p.d, 0., epsilon = 1e-9);
        assert_abs_diff_eq!(p.alpha.abs(), PI, epsilon = 1e-9);
    }
    assert!(chain_closes(&dh));
    let dirs = mech.axis_directions().unwrap();
    for (d, z) in dirs.iter().zip([1., -1., 1., -1.]) {
        assert_abs_diff_eq!(d[2], z, epsilon = 1e-12);
    }
    let lengths = mech.link_lengths().unwrap();
    for (l, e) in lengths.iter().zip([3., 1., 1., 3.]) {
        assert_abs_diff_eq!(l, &e, epsilon = 1e-12);
    }
    let mass = mech.mass_points().unwrap();
    assert_eq!(mass[0], [1.5, 0., 0.]);
    assert_eq!(mass[3], [2.5, 0., 3.]);
}

#[test]
fn mismatched_branches() {
    let f0 = MotionFactorization::new(vec![dq_f64([0, 0, 0, 1, 0, 0, 0, 0])]).unwrap();
    let f1 = MotionFactorization::new(vec![dq_f64([0, 0, 0, 1, 0, 0, 2, 0])]).unwrap();
    assert!(matches!(RationalMechanism::new([f0.clone(), f1], None), Err(Error::Mismatch(_))));
    let f2 = MotionFactorization::new(vec![dq_f64([0, 0, 0, 1, 0, 0, 0, 0]); 2]).unwrap();
    assert!(matches!(RationalMechanism::new([f0, f2], None), Err(Error::Mismatch(_))));
}

#[test]
fn bezier_split_is_idempotent() {
    let curve = RationalCurve::from_factors(&[
        dq_f64([0, 0, 0, 1, 0, 0, 0, 0]),
        dq_f64([1, 1, 0, 0, 0, 0, -1, 0]),
    ]);
    for b in curve.bezier_segments() {
        let seg = BezierSegment::new(b.clone());
        let [l, r] = seg.split_de_casteljau(0.5);
        let [ll, lr] = l.split_de_casteljau(0.5);
        for (s, u) in [(&l, 0.), (&l, 0.5), (&r, 0.5), (&r, 1.), (&ll, 0.25), (&lr, 0.5)] {
            let a = s.bezier.evaluate(s.local(u));
            let c = b.evaluate(u);
            for i in 0..8 {
                assert_abs_diff_eq!(a[i], c[i], epsilon = 1e-10);
            }
        }
    }
}

#[cfg(feature = "serde")]
#[test]
fn saved_mechanism() {
    let mech = four_bar(3.);
    let s = mech.to_ron().unwrap();
    let back = RationalMechanism::from_ron(&s).unwrap();
    assert_eq!(back, mech);
    assert!(RationalMechanism::from_ron("()").is_err());
}
