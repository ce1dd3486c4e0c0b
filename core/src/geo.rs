//! Ellipsoidal distance and bearing between two coordinates.
//!
//! Both helpers run the Vincenty inverse solution on the WGS-84 ellipsoid, the
//! same computation the mobile platforms use for their own location distance
//! calls, so the numbers shown by the core match the numbers a native widget
//! would show.

use crate::models::GeoPoint;

/// WGS-84 semi-major axis, metres.
const WGS84_A: f64 = 6_378_137.0;
/// WGS-84 semi-minor axis, metres.
const WGS84_B: f64 = 6_356_752.3142;
const MAX_ITERATIONS: usize = 20;
const CONVERGENCE: f64 = 1.0e-12;

#[derive(Debug, Clone, Copy, PartialEq)]
struct Inverse {
    distance_m: f64,
    initial_bearing_deg: f64,
}

fn vincenty_inverse(from: GeoPoint, to: GeoPoint) -> Inverse {
    let f = (WGS84_A - WGS84_B) / WGS84_A;
    let a_sq_minus_b_sq_over_b_sq =
        (WGS84_A * WGS84_A - WGS84_B * WGS84_B) / (WGS84_B * WGS84_B);

    let lat1 = from.latitude.to_radians();
    let lat2 = to.latitude.to_radians();
    let l = (to.longitude - from.longitude).to_radians();

    let u1 = ((1.0 - f) * lat1.tan()).atan();
    let u2 = ((1.0 - f) * lat2.tan()).atan();
    let (sin_u1, cos_u1) = u1.sin_cos();
    let (sin_u2, cos_u2) = u2.sin_cos();
    let cos_u1_cos_u2 = cos_u1 * cos_u2;
    let sin_u1_sin_u2 = sin_u1 * sin_u2;

    let mut a_coef = 0.0;
    let mut sigma = 0.0;
    let mut delta_sigma = 0.0;
    let mut lambda = l;
    let mut sin_lambda = lambda.sin();
    let mut cos_lambda = lambda.cos();

    for _ in 0..MAX_ITERATIONS {
        let lambda_prev = lambda;
        sin_lambda = lambda.sin();
        cos_lambda = lambda.cos();

        let t1 = cos_u2 * sin_lambda;
        let t2 = cos_u1 * sin_u2 - sin_u1 * cos_u2 * cos_lambda;
        let sin_sigma = (t1 * t1 + t2 * t2).sqrt();
        let cos_sigma = sin_u1_sin_u2 + cos_u1_cos_u2 * cos_lambda;
        sigma = sin_sigma.atan2(cos_sigma);

        let sin_alpha = if sin_sigma == 0.0 {
            0.0
        } else {
            cos_u1_cos_u2 * sin_lambda / sin_sigma
        };
        let cos_sq_alpha = 1.0 - sin_alpha * sin_alpha;
        let cos_2sm = if cos_sq_alpha == 0.0 {
            0.0
        } else {
            cos_sigma - 2.0 * sin_u1_sin_u2 / cos_sq_alpha
        };

        let u_sq = cos_sq_alpha * a_sq_minus_b_sq_over_b_sq;
        a_coef =
            1.0 + (u_sq / 16384.0) * (4096.0 + u_sq * (-768.0 + u_sq * (320.0 - 175.0 * u_sq)));
        let b_coef = (u_sq / 1024.0) * (256.0 + u_sq * (-128.0 + u_sq * (74.0 - 47.0 * u_sq)));
        let c_coef = (f / 16.0) * cos_sq_alpha * (4.0 + f * (4.0 - 3.0 * cos_sq_alpha));
        let cos_2sm_sq = cos_2sm * cos_2sm;

        delta_sigma = b_coef
            * sin_sigma
            * (cos_2sm
                + (b_coef / 4.0)
                    * (cos_sigma * (-1.0 + 2.0 * cos_2sm_sq)
                        - (b_coef / 6.0)
                            * cos_2sm
                            * (-3.0 + 4.0 * sin_sigma * sin_sigma)
                            * (-3.0 + 4.0 * cos_2sm_sq)));

        let correction =
            sigma + c_coef * sin_sigma * (cos_2sm + c_coef * cos_sigma * (-1.0 + 2.0 * cos_2sm_sq));
        lambda = l + (1.0 - c_coef) * f * sin_alpha * correction;

        // Same meridian: lambda stays at zero.
        if lambda == 0.0 || ((lambda - lambda_prev) / lambda).abs() < CONVERGENCE {
            sin_lambda = lambda.sin();
            cos_lambda = lambda.cos();
            break;
        }
    }

    let distance_m = WGS84_B * a_coef * (sigma - delta_sigma);
    let initial_bearing = (cos_u2 * sin_lambda)
        .atan2(cos_u1 * sin_u2 - sin_u1 * cos_u2 * cos_lambda)
        .to_degrees();

    Inverse {
        distance_m,
        initial_bearing_deg: normalize_degrees(initial_bearing),
    }
}

/// Distance in metres between two coordinates.
pub fn distance_meters(from: GeoPoint, to: GeoPoint) -> f64 {
    vincenty_inverse(from, to).distance_m
}

/// Initial bearing from `from` towards `to`: degrees clockwise from north in `[0, 360)`.
pub fn bearing_degrees(from: GeoPoint, to: GeoPoint) -> f64 {
    vincenty_inverse(from, to).initial_bearing_deg
}

/// Wrap an angle in degrees into `[0, 360)`.
pub fn normalize_degrees(degrees: f64) -> f64 {
    let wrapped = degrees.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360 for tiny negative inputs
    if wrapped >= 360.0 {
        0.0
    } else {
        wrapped
    }
}
