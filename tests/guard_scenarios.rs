use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;

use globe_guard::{
    constraint::outside_bounding_box, frame::FrameTime, BoundsGuard, Cartographic, Ellipsoid,
    FrameOutcome, FreeCamera, GlobeCamera, HeadingPitchRoll, Pose, Viewer,
};
use ultraviolet::DVec3;

const STEP: Duration = Duration::from_millis(16);

fn pose_at(lon: f64, lat: f64, height: f64, heading: f64) -> Pose {
    Pose::new(
        Ellipsoid::WGS84.cartographic_to_cartesian(&Cartographic::from_degrees(lon, lat, height)),
        HeadingPitchRoll::from_degrees(heading, -35.0, 0.0),
    )
}

fn viewer_with(pose: Pose) -> Viewer<FreeCamera> {
    Viewer::new(FreeCamera::new(pose.position, pose.orientation))
}

#[test]
fn every_pose_inside_the_box_is_in_bounds() {
    for lon_step in 0..=10 {
        for lat_step in 0..=10 {
            for height in [-100.0, 0.0, 5_000.0, 10_000.0] {
                let camera = Cartographic::from_degrees(
                    -80.0 + f64::from(lon_step),
                    30.0 + f64::from(lat_step),
                    height,
                );
                assert!(
                    !outside_bounding_box(&camera, -80.0, 30.0, -70.0, 40.0, 10_000.0),
                    "{:?} should be inside",
                    camera
                );
            }
        }
    }
}

#[test]
fn poses_past_any_edge_are_out_of_bounds() {
    let outside = [
        (-80.001, 35.0, 5_000.0),
        (-69.999, 35.0, 5_000.0),
        (-75.0, 29.999, 5_000.0),
        (-75.0, 40.001, 5_000.0),
        (-75.0, 35.0, 10_000.5),
    ];
    for (lon, lat, height) in outside {
        let camera = Cartographic::from_degrees(lon, lat, height);
        assert!(
            outside_bounding_box(&camera, -80.0, 30.0, -70.0, 40.0, 10_000.0),
            "{:?} should be outside",
            camera
        );
    }
}

#[test]
fn bounding_box_scenario() {
    let mut viewer = viewer_with(pose_at(-75.0, 35.0, 5_000.0, 0.0));
    let mut guard = BoundsGuard::new(&viewer);
    guard
        .constrain_to_bounding_box(-80.0, 30.0, -70.0, 40.0, 10_000.0)
        .unwrap();

    viewer.render_frame_after(STEP);
    assert_eq!(guard.last_outcome(), Some(FrameOutcome::InBounds));

    viewer.camera.set_pose(&pose_at(-69.0, 35.0, 5_000.0, 0.0));
    viewer.render_frame_after(STEP);
    assert_eq!(guard.last_outcome(), Some(FrameOutcome::Reverted));
    assert_eq!(viewer.camera.pose(), pose_at(-75.0, 35.0, 5_000.0, 0.0));
}

#[test]
fn entity_distance_scenario() {
    let ellipsoid = Ellipsoid::WGS84;
    let entity = ellipsoid.cartographic_to_cartesian(&Cartographic::new(0.0, 0.0, 0.0));
    let near = Cartographic::new(400.0 / ellipsoid.semi_major(), 0.0, 50.0);
    let far = Cartographic::new(600.0 / ellipsoid.semi_major(), 0.0, 50.0);

    let mut viewer = Viewer::new(FreeCamera::at_cartographic(
        &ellipsoid,
        &near,
        HeadingPitchRoll::default(),
    ));
    let mut guard = BoundsGuard::new(&viewer);
    guard
        .constrain_to_entity_distance(entity, 500.0, 100.0)
        .unwrap();
    viewer.render_frame_after(STEP);
    assert_eq!(guard.last_outcome(), Some(FrameOutcome::InBounds));

    viewer.camera.set_cartographic(&ellipsoid, &far);
    viewer.render_frame_after(STEP);
    assert_eq!(guard.last_outcome(), Some(FrameOutcome::Reverted));
    assert_eq!(
        viewer.camera.position,
        ellipsoid.cartographic_to_cartesian(&near)
    );
}

#[test]
fn three_frame_sequence_reverts_to_the_second_pose() {
    let p1 = pose_at(-75.0, 35.0, 5_000.0, 0.0);
    let p2 = pose_at(-74.0, 36.0, 6_000.0, 45.0);
    let p3 = pose_at(-74.0, 36.0, 12_000.0, 90.0);

    let mut viewer = viewer_with(p1);
    let mut guard = BoundsGuard::new(&viewer);
    let blocked = Rc::new(Cell::new(0));
    let counter = Rc::clone(&blocked);
    let _listener = guard.on_blocked(move || counter.set(counter.get() + 1));
    guard
        .constrain_to_bounding_box(-80.0, 30.0, -70.0, 40.0, 10_000.0)
        .unwrap();

    viewer.render_frame_after(STEP);
    assert_eq!(blocked.get(), 0);

    viewer.camera.set_pose(&p2);
    viewer.render_frame_after(STEP);
    assert_eq!(blocked.get(), 0);
    assert_eq!(guard.last_valid_pose(), Some(p2));

    viewer.camera.set_pose(&p3);
    viewer.render_frame_after(STEP);
    assert_eq!(viewer.camera.pose(), p2);
    assert_eq!(blocked.get(), 1);
    assert_eq!(guard.blocked_count(), 1);
}

#[test]
fn replaced_constraint_is_never_evaluated_again() {
    let mut viewer = viewer_with(pose_at(0.0, 0.0, 50.0, 0.0));
    let mut guard = BoundsGuard::new(&viewer);

    let first_calls = Rc::new(Cell::new(0));
    let counter = Rc::clone(&first_calls);
    let entity = viewer.camera.position;
    guard
        .constrain_to_entity_distance(
            move |_: FrameTime| {
                counter.set(counter.get() + 1);
                Some(entity)
            },
            500.0,
            100.0,
        )
        .unwrap();
    viewer.render_frame_after(STEP);
    assert_eq!(first_calls.get(), 1);

    let second_calls = Rc::new(Cell::new(0));
    let counter = Rc::clone(&second_calls);
    guard
        .constrain_to_entity_distance(
            move |_: FrameTime| {
                counter.set(counter.get() + 1);
                Some(entity)
            },
            5_000.0,
            1_000.0,
        )
        .unwrap();
    for _ in 0..3 {
        viewer.render_frame_after(STEP);
    }

    assert_eq!(first_calls.get(), 1);
    assert_eq!(second_calls.get(), 3);
    assert_eq!(viewer.pre_render().listener_count(), 1);
}

#[test]
fn camera_pushing_against_the_wall_stays_put() {
    let mut viewer = viewer_with(pose_at(-70.5, 35.0, 5_000.0, 0.0));
    let mut guard = BoundsGuard::new(&viewer);
    guard
        .constrain_to_bounding_box(-80.0, 30.0, -70.0, 40.0, 10_000.0)
        .unwrap();

    // Keep nudging east, 100 m per frame
    let mut last_inside = viewer.camera.pose();
    for _ in 0..1_000 {
        let eastward = tangent_east(viewer.camera.position) * 100.0;
        viewer.camera.move_by(eastward);
        viewer.render_frame_after(STEP);
        if guard.last_outcome() == Some(FrameOutcome::InBounds) {
            last_inside = viewer.camera.pose();
        }
    }

    let end = Ellipsoid::WGS84
        .cartesian_to_cartographic(viewer.camera.position)
        .unwrap();
    assert!(end.longitude_degrees() <= -70.0);
    assert_eq!(viewer.camera.pose(), last_inside);
    assert!(guard.blocked_count() > 0);
}

fn tangent_east(position: DVec3) -> DVec3 {
    DVec3::new(-position.y, position.x, 0.0).normalized()
}
