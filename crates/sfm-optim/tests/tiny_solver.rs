use nalgebra::DVector;
use sfm_core::models::Pinhole;
use sfm_core::{CameraModel, Rigid3, Vec2, Vec3};
use sfm_optim::factors::{ReprojErrorConstantPointCost, ReprojErrorConstantPoseCost};
use sfm_optim::solver::{
    add_functor, add_functor_with_isotropic_noise, set_quaternion_manifold, solve,
    TinySolveOptions,
};
use sfm_optim::test_utils::{pose_blocks, pose_from};
use std::collections::HashMap;
use tiny_solver::problem::Problem;

const CAMERA: [f64; 4] = [600.0, 600.0, 320.0, 240.0];

fn observe(pose: &Rigid3, point: &Vec3) -> Vec2 {
    let pc = pose.rotation * point + pose.translation;
    let (u, v) = Pinhole::img_from_cam(&CAMERA, pc.x, pc.y, pc.z);
    Vec2::new(u, v)
}

fn views() -> Vec<Rigid3> {
    vec![
        pose_from([0.0, 0.0, 0.0], [0.0, 0.0, 0.0]),
        pose_from([0.0, -0.15, 0.0], [1.0, 0.0, 0.1]),
        pose_from([0.1, 0.1, 0.0], [-0.5, 0.8, 0.0]),
        pose_from([-0.05, 0.2, 0.05], [-1.2, -0.3, 0.2]),
    ]
}

fn triangulation_problem(point: &Vec3, stddev: Option<f64>) -> Problem {
    let mut problem = Problem::new();
    for pose in views() {
        let functor = ReprojErrorConstantPoseCost::<Pinhole>::new(pose, observe(&pose, point));
        match stddev {
            Some(s) => {
                add_functor_with_isotropic_noise(&mut problem, functor, s, &["point", "camera"])
                    .unwrap()
            }
            None => add_functor(&mut problem, functor, &["point", "camera"]).unwrap(),
        }
    }
    for idx in 0..CAMERA.len() {
        problem.fix_variable("camera", idx);
    }
    problem
}

fn initial_guess(point: &Vec3) -> HashMap<String, DVector<f64>> {
    let mut initial = HashMap::new();
    initial.insert(
        "point".to_string(),
        DVector::from_row_slice(&[point.x + 0.3, point.y - 0.2, point.z + 0.5]),
    );
    initial.insert("camera".to_string(), DVector::from_row_slice(&CAMERA));
    initial
}

#[test]
fn lm_triangulates_point_from_fixed_poses() {
    let truth = Vec3::new(0.2, -0.1, 5.0);
    let problem = triangulation_problem(&truth, None);
    let solution = solve(&problem, &initial_guess(&truth), &TinySolveOptions::default()).unwrap();

    let point = &solution["point"];
    let err = (Vec3::new(point[0], point[1], point[2]) - truth).norm();
    assert!(err < 1e-4, "triangulation error {err}");

    let camera = &solution["camera"];
    for (i, &expected) in CAMERA.iter().enumerate() {
        assert!((camera[i] - expected).abs() < 1e-9, "fixed intrinsic {i} moved");
    }
}

#[test]
fn isotropic_weighting_does_not_move_the_minimum() {
    let truth = Vec3::new(-0.4, 0.3, 6.0);
    let problem = triangulation_problem(&truth, Some(2.0));
    let solution = solve(&problem, &initial_guess(&truth), &TinySolveOptions::default()).unwrap();

    let point = &solution["point"];
    let err = (Vec3::new(point[0], point[1], point[2]) - truth).norm();
    assert!(err < 1e-4, "triangulation error {err}");
}

#[test]
fn lm_refines_pose_on_quaternion_manifold() {
    let truth = pose_from([0.05, -0.1, 0.02], [0.2, -0.1, 0.4]);
    let landmarks = [
        Vec3::new(0.0, 0.0, 5.0),
        Vec3::new(1.0, 0.5, 6.0),
        Vec3::new(-0.8, 0.7, 4.5),
        Vec3::new(0.6, -0.9, 5.5),
        Vec3::new(-1.1, -0.4, 7.0),
        Vec3::new(0.3, 1.2, 4.0),
    ];

    let mut problem = Problem::new();
    for landmark in &landmarks {
        let functor =
            ReprojErrorConstantPointCost::<Pinhole>::new(observe(&truth, landmark), *landmark);
        add_functor(&mut problem, functor, &["q", "t", "camera"]).unwrap();
    }
    set_quaternion_manifold(&mut problem, "q");
    for idx in 0..CAMERA.len() {
        problem.fix_variable("camera", idx);
    }

    let start = pose_from([0.08, -0.06, 0.0], [0.25, -0.05, 0.3]);
    let (q0, t0) = pose_blocks(&start);
    let mut initial = HashMap::new();
    initial.insert("q".to_string(), DVector::from_row_slice(&q0));
    initial.insert("t".to_string(), DVector::from_row_slice(&t0));
    initial.insert("camera".to_string(), DVector::from_row_slice(&CAMERA));

    let solution = solve(&problem, &initial, &TinySolveOptions::default()).unwrap();

    let q = &solution["q"];
    assert!((q.norm() - 1.0).abs() < 1e-6, "quaternion left the unit sphere: {}", q.norm());
    let (q_true, t_true) = pose_blocks(&truth);
    // q and -q encode the same rotation
    let sign = if q[3] * q_true[3] < 0.0 { -1.0 } else { 1.0 };
    for i in 0..4 {
        assert!((sign * q[i] - q_true[i]).abs() < 1e-4, "q[{i}] = {}", q[i]);
    }
    let t = &solution["t"];
    for i in 0..3 {
        assert!((t[i] - t_true[i]).abs() < 1e-4, "t[{i}] = {}", t[i]);
    }
}
