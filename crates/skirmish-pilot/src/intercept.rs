//! Closed-form lead (intercept) prediction.
//!
//! Solves for the time `t` at which a projectile launched now from a
//! stationary shooter meets a target moving at constant velocity:
//! `|r + v·t| = speed·t`, i.e. `(|v|² − speed²)·t² + 2(v·r)·t + |r|² = 0`.

use glam::DVec3;
use skirmish_core::constants::INTERCEPT_EPSILON;

/// Predicted meeting point and the flight time to reach it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InterceptSolution {
    pub point: DVec3,
    pub time: f64,
}

/// Solve the lead quadratic. `None` when no forward-time solution exists.
pub fn solve_with_time(
    shooter: DVec3,
    target_position: DVec3,
    target_velocity: DVec3,
    projectile_speed: f64,
) -> Option<InterceptSolution> {
    let r = target_position - shooter;
    let a = target_velocity.length_squared() - projectile_speed * projectile_speed;
    let b = 2.0 * target_velocity.dot(r);
    let c = r.length_squared();

    // Target as fast as the projectile: linear case not attempted.
    if a.abs() < INTERCEPT_EPSILON {
        return None;
    }

    let discriminant = b * b - 4.0 * a * c;
    if discriminant < 0.0 {
        return None;
    }

    let sqrt_disc = discriminant.sqrt();
    let t1 = (-b + sqrt_disc) / (2.0 * a);
    let t2 = (-b - sqrt_disc) / (2.0 * a);
    let time = t1.max(t2);
    if time <= INTERCEPT_EPSILON || !time.is_finite() {
        return None;
    }

    Some(InterceptSolution {
        point: target_position + target_velocity * time,
        time,
    })
}

/// Lead point for aiming, falling back to the target's current position.
pub fn solve(
    shooter: DVec3,
    target_position: DVec3,
    target_velocity: DVec3,
    projectile_speed: f64,
) -> DVec3 {
    solve_with_time(shooter, target_position, target_velocity, projectile_speed)
        .map(|s| s.point)
        .unwrap_or(target_position)
}
