use super::*;

#[test]
fn lerp_endpoints_are_exact() {
    let (a, b) = (0.1 + 0.2, 1234.567_f64);
    assert_eq!(lerp(a, b, 0.0), a);
    assert_eq!(lerp(a, b, 1.0), b);
    assert!((lerp(0.0, 10.0, 0.25) - 2.5).abs() < 1e-12);
}

#[test]
fn lerp_of_equal_endpoints_does_not_drift() {
    for t in [0.0, 0.1, 0.3, 0.7, 0.99, 1.0] {
        assert_eq!(lerp(0.1, 0.1, t), 0.1);
    }
}

#[test]
fn clamp_unit_handles_nan_and_range() {
    assert_eq!(clamp_unit(f64::NAN), 0.0);
    assert_eq!(clamp_unit(-1.0), 0.0);
    assert_eq!(clamp_unit(3.0), 1.0);
    assert_eq!(clamp_unit(0.5), 0.5);
}

#[test]
fn mul_div255_rounds() {
    assert_eq!(mul_div255_u16(255, 255), 255);
    assert_eq!(mul_div255_u16(128, 255), 128);
    assert_eq!(mul_div255_u16(0, 200), 0);
}

#[test]
fn decimal_digits_counts() {
    assert_eq!(decimal_digits(0), 1);
    assert_eq!(decimal_digits(9), 1);
    assert_eq!(decimal_digits(10), 2);
    assert_eq!(decimal_digits(104), 3);
}
