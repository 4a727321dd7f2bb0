use crate::geom::{
    Triangle, Vec3, fit_plane, segment_plane_crossing, segment_triangle_intersection,
};

const EPS_PLANE: f64 = 1e-2;
const EPS_POLYGON: f64 = 1e-2;

fn xy_triangle() -> Triangle {
    Triangle::new(
        Vec3::new(-2.0, -2.0, 0.0),
        Vec3::new(2.0, -2.0, 0.0),
        Vec3::new(0.0, 2.0, 0.0),
    )
}

#[test]
fn vertical_segment_pierces_triangle() {
    let tri = xy_triangle();
    let hit = segment_triangle_intersection(
        Vec3::new(0.0, 0.0, 1.0),
        Vec3::new(0.0, 0.0, -1.0),
        &tri,
        EPS_PLANE,
        EPS_POLYGON,
    )
    .expect("segment through the centre must hit");
    assert!(hit.distance_to(Vec3::new(0.0, 0.0, 0.0)) < 1e-9);
}

#[test]
fn parallel_segment_misses() {
    let tri = xy_triangle();
    let hit = segment_triangle_intersection(
        Vec3::new(-1.0, 0.0, 1.0),
        Vec3::new(1.0, 0.0, 1.0),
        &tri,
        EPS_PLANE,
        EPS_POLYGON,
    );
    assert!(hit.is_none());
}

#[test]
fn segment_outside_barycentric_bounds_misses() {
    let tri = xy_triangle();
    let hit = segment_triangle_intersection(
        Vec3::new(5.0, 5.0, 1.0),
        Vec3::new(5.0, 5.0, -1.0),
        &tri,
        EPS_PLANE,
        EPS_POLYGON,
    );
    assert!(hit.is_none());
}

#[test]
fn endpoint_grazing_is_not_a_piercing() {
    let tri = xy_triangle();
    // The segment stops exactly on the triangle plane.
    let hit = segment_triangle_intersection(
        Vec3::new(0.0, 0.0, 1.0),
        Vec3::new(0.0, 0.0, 0.0),
        &tri,
        EPS_PLANE,
        EPS_POLYGON,
    );
    assert!(hit.is_none());
}

#[test]
fn triangle_area() {
    let tri = Triangle::new(
        Vec3::new(0.0, 0.0, 0.0),
        Vec3::new(2.0, 0.0, 0.0),
        Vec3::new(0.0, 2.0, 0.0),
    );
    assert!((tri.area() - 2.0).abs() < 1e-12);
}

#[test]
fn plane_crossing_finds_the_interpolated_point() {
    let plane = fit_plane(
        &[
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(1.0, 1.0, 0.0),
            Vec3::new(0.0, 1.0, 0.0),
        ],
        1e-6,
    );
    assert!(plane.valid);

    let hit = segment_plane_crossing(
        Vec3::new(0.25, 0.25, 2.0),
        Vec3::new(0.25, 0.25, -2.0),
        &plane,
        EPS_PLANE,
    )
    .expect("straddling segment must cross");
    assert!(hit.distance_to(Vec3::new(0.25, 0.25, 0.0)) < 1e-9);
}

#[test]
fn plane_crossing_rejects_grazing_endpoints() {
    let plane = fit_plane(
        &[
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(1.0, 1.0, 0.0),
            Vec3::new(0.0, 1.0, 0.0),
        ],
        1e-6,
    );

    // One endpoint within eps_plane of the plane.
    assert!(
        segment_plane_crossing(
            Vec3::new(0.5, 0.5, 0.005),
            Vec3::new(0.5, 0.5, -2.0),
            &plane,
            EPS_PLANE,
        )
        .is_none()
    );
    // Both endpoints on the same side.
    assert!(
        segment_plane_crossing(
            Vec3::new(0.5, 0.5, 1.0),
            Vec3::new(0.5, 0.5, 2.0),
            &plane,
            EPS_PLANE,
        )
        .is_none()
    );
}

#[test]
fn nan_endpoints_never_intersect() {
    let tri = xy_triangle();
    assert!(
        segment_triangle_intersection(
            Vec3::NAN,
            Vec3::new(0.0, 0.0, -1.0),
            &tri,
            EPS_PLANE,
            EPS_POLYGON,
        )
        .is_none()
    );
}
