//! Numerical helpers shared by the parcel routines.

/// Bisection algorithm for finding the root of an equation given values bracketing a root.
///
/// Stops once the bracket is narrower than `tolerance`. Returns `None` if the values do not
/// bracket a root, if the function produces a NaN, or if `max_iterations` runs out first. It never
/// loops more than `max_iterations` times.
pub(crate) fn find_root<F>(
    f: F,
    mut low_val: f64,
    mut high_val: f64,
    tolerance: f64,
    max_iterations: usize,
) -> Option<f64>
where
    F: Fn(f64) -> f64,
{
    debug_assert!(tolerance > 0.0);

    if low_val > high_val {
        std::mem::swap(&mut low_val, &mut high_val);
    }

    let mut f_low = f(low_val);
    let f_high = f(high_val);

    if f_low.is_nan() || f_high.is_nan() {
        return None;
    }
    if f_low == 0.0 {
        return Some(low_val);
    }
    if f_high == 0.0 {
        return Some(high_val);
    }
    if f_low.signum() == f_high.signum() {
        return None;
    }

    for _ in 0..max_iterations {
        let mid_val = (high_val - low_val) / 2.0 + low_val;

        if (high_val - low_val) < tolerance {
            return Some(mid_val);
        }

        let f_mid = f(mid_val);
        if f_mid.is_nan() {
            return None;
        }
        if f_mid == 0.0 {
            return Some(mid_val);
        }

        if f_mid.signum() == f_low.signum() {
            low_val = mid_val;
            f_low = f_mid;
        } else {
            high_val = mid_val;
        }
    }

    None
}
