//! Tests for vision cones + occlusion.

#[cfg(test)]
mod tests {
    use bevy::prelude::*;
    use crate::perception::{evaluate_vision, PerceptionConfig, Sightline, VisionCone};
    use crate::physics::{NoGeometry, ObstacleField, ObstacleShape};

    const OBSERVER: Entity = Entity::PLACEHOLDER;

    fn target() -> Entity {
        Entity::from_raw(7)
    }

    /// Наблюдатель в origin, смотрит в -Z
    fn sight_to(position: Vec3) -> Sightline {
        Sightline {
            eye: Vec3::ZERO,
            forward: Dir3::NEG_Z,
            target_position: position,
            target: target(),
            observer: Some(OBSERVER),
        }
    }

    fn is_target(entity: Entity) -> bool {
        entity == target()
    }

    /// Точка на дистанции `distance` под углом `degrees` от взгляда (в горизонтальной плоскости)
    fn at_angle(degrees: f32, distance: f32) -> Vec3 {
        let rotation = Quat::from_rotation_y(degrees.to_radians());
        rotation * Vec3::NEG_Z * distance
    }

    #[test]
    fn test_primary_cone_straight_ahead() {
        let config = PerceptionConfig::default();
        let sample = evaluate_vision(&config, &sight_to(Vec3::new(0.0, 0.0, -10.0)), &NoGeometry, &is_target)
            .expect("target ahead must be visible");

        assert_eq!(sample.cone, VisionCone::Primary);
        assert!((sample.distance - 10.0).abs() < 1e-4);
        // lerp(0.5, 1.0, 0.6) = 0.8
        assert!((sample.factor - 0.8).abs() < 1e-4);
    }

    #[test]
    fn test_primary_wins_over_peripheral() {
        // 5м прямо по курсу: подходит под оба конуса
        let config = PerceptionConfig::default();
        let sample = evaluate_vision(&config, &sight_to(at_angle(0.0, 5.0)), &NoGeometry, &is_target)
            .expect("visible");
        assert_eq!(sample.cone, VisionCone::Primary);
    }

    #[test]
    fn test_peripheral_cone_is_slower_than_primary() {
        let config = PerceptionConfig::default();
        let sample = evaluate_vision(&config, &sight_to(at_angle(45.0, 8.0)), &NoGeometry, &is_target)
            .expect("peripheral sighting");

        assert_eq!(sample.cone, VisionCone::Peripheral);
        // 0.4 * inverse_lerp(12, 0, 8) = 0.4 / 3
        assert!((sample.factor - 0.4 / 3.0).abs() < 1e-4);
    }

    #[test]
    fn test_peripheral_factor_never_exceeds_cap() {
        let config = PerceptionConfig::default();
        let sample = evaluate_vision(&config, &sight_to(at_angle(50.0, 0.05)), &NoGeometry, &is_target)
            .expect("point-blank peripheral sighting");

        assert_eq!(sample.cone, VisionCone::Peripheral);
        assert!(sample.factor <= 0.4);
    }

    #[test]
    fn test_primary_factor_floor_at_max_range() {
        let config = PerceptionConfig::default();
        let sample = evaluate_vision(&config, &sight_to(at_angle(0.0, 25.0)), &NoGeometry, &is_target)
            .expect("edge of primary range");
        assert!((sample.factor - 0.5).abs() < 1e-4);
    }

    #[test]
    fn test_rejects_out_of_range_and_behind() {
        let config = PerceptionConfig::default();

        // Peripheral угол, но дальше peripheral дистанции
        assert!(evaluate_vision(&config, &sight_to(at_angle(45.0, 20.0)), &NoGeometry, &is_target).is_none());
        // По курсу, но дальше primary дистанции
        assert!(evaluate_vision(&config, &sight_to(at_angle(0.0, 30.0)), &NoGeometry, &is_target).is_none());
        // За спиной
        assert!(evaluate_vision(&config, &sight_to(at_angle(180.0, 3.0)), &NoGeometry, &is_target).is_none());
        // Вне peripheral половинного угла (60°)
        assert!(evaluate_vision(&config, &sight_to(at_angle(75.0, 3.0)), &NoGeometry, &is_target).is_none());
    }

    #[test]
    fn test_rejects_outside_height_tolerance() {
        let config = PerceptionConfig::default();
        assert!(evaluate_vision(&config, &sight_to(Vec3::new(0.0, 3.0, -5.0)), &NoGeometry, &is_target).is_none());
        assert!(evaluate_vision(&config, &sight_to(Vec3::new(0.0, -1.5, -5.0)), &NoGeometry, &is_target).is_some());
    }

    #[test]
    fn test_coincident_positions_are_not_visible() {
        let config = PerceptionConfig::default();
        assert!(evaluate_vision(&config, &sight_to(Vec3::ZERO), &NoGeometry, &is_target).is_none());
    }

    #[test]
    fn test_occluded_by_wall() {
        let config = PerceptionConfig::default();
        let walls = ObstacleField::new().with_cuboid(Vec3::new(0.0, 0.0, -5.0), Vec3::new(2.0, 2.0, 0.2));

        assert!(evaluate_vision(&config, &sight_to(Vec3::new(0.0, 0.0, -10.0)), &walls, &is_target).is_none());
        // Стена позади цели не мешает
        assert!(evaluate_vision(&config, &sight_to(Vec3::new(0.0, 0.0, -3.0)), &walls, &is_target).is_some());
    }

    #[test]
    fn test_hitting_target_collider_is_not_occlusion() {
        let config = PerceptionConfig::default();
        let mut field = ObstacleField::new();
        field.add(
            ObstacleShape::Sphere {
                center: Vec3::new(0.0, 0.0, -10.0),
                radius: 0.5,
            },
            Some(target()),
        );

        assert!(evaluate_vision(&config, &sight_to(Vec3::new(0.0, 0.0, -10.0)), &field, &is_target).is_some());
    }

    #[test]
    fn test_hitting_target_descendant_is_not_occlusion() {
        let config = PerceptionConfig::default();
        let shield = Entity::from_raw(8);
        let mut field = ObstacleField::new();
        field.add(
            ObstacleShape::Sphere {
                center: Vec3::new(0.0, 0.0, -9.0),
                radius: 0.5,
            },
            Some(shield),
        );

        let belongs = |entity: Entity| entity == target() || entity == shield;
        assert!(evaluate_vision(&config, &sight_to(Vec3::new(0.0, 0.0, -10.0)), &field, &belongs).is_some());
        // Чужой коллайдер в той же точке блокирует
        assert!(evaluate_vision(&config, &sight_to(Vec3::new(0.0, 0.0, -10.0)), &field, &is_target).is_none());
    }

    #[test]
    fn test_observer_own_collider_is_excluded() {
        let config = PerceptionConfig::default();
        let mut field = ObstacleField::new();
        field.add(
            ObstacleShape::Sphere {
                center: Vec3::new(0.0, 0.0, -2.0),
                radius: 0.5,
            },
            Some(OBSERVER),
        );

        assert!(evaluate_vision(&config, &sight_to(Vec3::new(0.0, 0.0, -10.0)), &field, &is_target).is_some());
    }
}
