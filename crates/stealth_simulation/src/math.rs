//! Мелкие геометрические helpers (inverse lerp, slerp направлений, проекция на плоскость)
//!
//! Все функции устойчивы к вырожденным входам: нулевые векторы не дают NaN,
//! а возвращают "нет направления" (Vec3::ZERO) или исходный вектор.

use bevy::prelude::*;

/// Порог длины, ниже которого вектор считаем нулевым
pub const EPSILON: f32 = 1e-5;

/// Обратная линейная интерполяция: где `value` лежит между `a` и `b`
///
/// Результат зажат в [0, 1]. При `a == b` возвращает 0.
pub fn inverse_lerp(a: f32, b: f32, value: f32) -> f32 {
    if (b - a).abs() < f32::EPSILON {
        return 0.0;
    }
    ((value - a) / (b - a)).clamp(0.0, 1.0)
}

/// Сферическая интерполяция направлений (t зажат в [0, 1])
///
/// Входы нормализуются. Если один из векторов вырожден: возвращается
/// другой (нормализованный), если оба: Vec3::ZERO.
pub fn slerp_direction(from: Vec3, to: Vec3, t: f32) -> Vec3 {
    let from = from.normalize_or_zero();
    let to = to.normalize_or_zero();

    if from == Vec3::ZERO {
        return to;
    }
    if to == Vec3::ZERO {
        return from;
    }

    let t = t.clamp(0.0, 1.0);
    // from_rotation_arc сам выбирает ось для антипараллельных векторов
    let arc = Quat::from_rotation_arc(from, to);
    let rotated = Quat::IDENTITY.slerp(arc, t) * from;

    rotated.normalize_or_zero()
}

/// Проекция вектора на плоскость с нормалью `normal`
pub fn project_on_plane(vector: Vec3, normal: Vec3) -> Vec3 {
    let normal = normal.normalize_or_zero();
    if normal == Vec3::ZERO {
        return vector;
    }
    vector - normal * vector.dot(normal)
}

/// Поворот направления на yaw/pitch (градусы) относительно локального базиса
///
/// Порядок: сначала pitch вокруг X, затем yaw вокруг Y (intrinsic Y-X).
pub fn rotate_yaw_pitch(direction: Vec3, yaw_degrees: f32, pitch_degrees: f32) -> Vec3 {
    let rotation = Quat::from_euler(
        EulerRot::YXZ,
        yaw_degrees.to_radians(),
        pitch_degrees.to_radians(),
        0.0,
    );
    (rotation * direction).normalize_or_zero()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inverse_lerp_bounds() {
        assert_eq!(inverse_lerp(0.5, 2.5, 0.5), 0.0);
        assert_eq!(inverse_lerp(0.5, 2.5, 2.5), 1.0);
        assert_eq!(inverse_lerp(0.5, 2.5, 1.5), 0.5);

        // Reverse range (как в vision: range → 0)
        assert_eq!(inverse_lerp(10.0, 0.0, 0.0), 1.0);
        assert_eq!(inverse_lerp(10.0, 0.0, 10.0), 0.0);

        // Вне диапазона: clamp
        assert_eq!(inverse_lerp(0.0, 1.0, 5.0), 1.0);
        assert_eq!(inverse_lerp(0.0, 1.0, -5.0), 0.0);
    }

    #[test]
    fn test_inverse_lerp_degenerate_range() {
        assert_eq!(inverse_lerp(1.0, 1.0, 3.0), 0.0);
    }

    #[test]
    fn test_slerp_direction_endpoints() {
        let a = Vec3::X;
        let b = Vec3::Z;

        assert!(slerp_direction(a, b, 0.0).abs_diff_eq(a, 1e-5));
        assert!(slerp_direction(a, b, 1.0).abs_diff_eq(b, 1e-5));

        let mid = slerp_direction(a, b, 0.5);
        assert!((mid.length() - 1.0).abs() < 1e-5);
        assert!((mid.angle_between(a) - mid.angle_between(b)).abs() < 1e-4);
    }

    #[test]
    fn test_slerp_direction_degenerate() {
        assert_eq!(slerp_direction(Vec3::ZERO, Vec3::ZERO, 0.5), Vec3::ZERO);
        assert!(slerp_direction(Vec3::ZERO, Vec3::Y, 0.5).abs_diff_eq(Vec3::Y, 1e-6));

        // Антипараллельные: не NaN
        let flipped = slerp_direction(Vec3::X, Vec3::NEG_X, 0.5);
        assert!(flipped.is_finite());
        assert!((flipped.length() - 1.0).abs() < 1e-4);
    }

    #[test]
    fn test_project_on_plane_slides_along_wall() {
        // Идём в стену (-Z нормаль смотрит на нас), скользим вдоль X
        let forward = Vec3::new(1.0, 0.0, 1.0).normalize();
        let slide = project_on_plane(forward, Vec3::NEG_Z);
        assert!(slide.z.abs() < 1e-6);
        assert!(slide.x > 0.0);
    }

    #[test]
    fn test_rotate_yaw_pitch_zero_is_identity() {
        let dir = Vec3::new(0.3, 0.1, -0.9).normalize();
        assert!(rotate_yaw_pitch(dir, 0.0, 0.0).abs_diff_eq(dir, 1e-5));

        let yawed = rotate_yaw_pitch(Vec3::NEG_Z, 90.0, 0.0);
        assert!(yawed.abs_diff_eq(Vec3::NEG_X, 1e-5));
    }
}
