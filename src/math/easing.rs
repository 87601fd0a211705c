// Easing curves for camera interpolation, all mapping [0,1] -> [0,1].
// `ease_in` is intentionally left unclamped: the per-frame driver feeds it a
// raw blend parameter that can briefly exceed 1 on the final frame.

/// Cubic ease-in: `(t-1)^3 + 1`.
pub fn ease_in(t: f32) -> f32 {
    let t = t - 1.0;
    t * t * t + 1.0
}

/// Quintic ease-out: `1 + (t-1)^5`.
pub fn ease_out(t: f32) -> f32 {
    let t = t - 1.0;
    1.0 + t * t * t * t * t
}

/// `t^5`
pub fn ease_in_quint(t: f32) -> f32 {
    t * t * t * t * t
}

/// `1 - (1-t)^5`
pub fn ease_out_quint(t: f32) -> f32 {
    let t = 1.0 - t;
    1.0 - t * t * t * t * t
}

/// `sin(t·π/2)`, the fast-start/slow-end weight used for orientation blending.
pub fn ease_out_sine(t: f32) -> f32 {
    (t * std::f32::consts::FRAC_PI_2).sin()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn curves_hit_endpoints() {
        for f in [ease_in, ease_out, ease_in_quint, ease_out_quint, ease_out_sine] {
            assert!(f(0.0).abs() < 1e-6);
            assert!((f(1.0) - 1.0).abs() < 1e-6);
        }
    }

    #[test]
    fn curves_are_monotonic_on_unit_interval() {
        for f in [ease_in, ease_out, ease_in_quint, ease_out_quint, ease_out_sine] {
            let mut prev = f(0.0);
            for i in 1..=100 {
                let v = f(i as f32 / 100.0);
                assert!(v >= prev - 1e-6);
                prev = v;
            }
        }
    }
}
