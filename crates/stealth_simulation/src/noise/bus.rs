//! Noise bus: publish/subscribe канал звуковых событий
//!
//! Явно создаваемый resource (не static): один bus на App.
//! Хранит только упорядоченный список подписчиков; события не буферизуются.

use bevy::prelude::*;

/// Звуковое событие (живёт только на время dispatch)
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct NoiseEvent {
    /// Точка источника звука (world space)
    pub position: Vec3,
    /// Радиус громкости (метры), добавляется к hearing radius слушателя
    pub loudness: f32,
    /// Кто шумел (опционально)
    pub source: Option<Entity>,
}

impl NoiseEvent {
    pub fn new(position: Vec3, loudness: f32, source: Option<Entity>) -> Self {
        Self {
            position,
            loudness,
            source,
        }
    }
}

/// Noise bus resource
///
/// Инварианты:
/// - подписчик встречается в списке не более одного раза
/// - порядок dispatch = порядок подписки
#[derive(Resource, Debug, Default, Clone)]
pub struct NoiseBus {
    subscribers: Vec<Entity>,
}

impl NoiseBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Подписать слушателя. Повторная подписка: no-op (возвращает false)
    pub fn subscribe(&mut self, listener: Entity) -> bool {
        if self.subscribers.contains(&listener) {
            return false;
        }
        self.subscribers.push(listener);
        true
    }

    /// Отписать слушателя. Отписка неподписанного: no-op (возвращает false)
    pub fn unsubscribe(&mut self, listener: Entity) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|&e| e != listener);
        self.subscribers.len() != before
    }

    pub fn is_subscribed(&self, listener: Entity) -> bool {
        self.subscribers.contains(&listener)
    }

    pub fn subscribers(&self) -> &[Entity] {
        &self.subscribers
    }

    pub fn len(&self) -> usize {
        self.subscribers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subscribers.is_empty()
    }

    /// Teardown: сбросить всех подписчиков
    pub fn clear(&mut self) {
        self.subscribers.clear();
    }

    /// Синхронный fan-out события всем подписчикам (в порядке подписки)
    ///
    /// Handler получает только событие: доступа к bus у него нет,
    /// поэтому повторный emit изнутри handler невозможен.
    /// Возвращает количество уведомлённых подписчиков.
    pub fn emit(&self, event: &NoiseEvent, mut handler: impl FnMut(Entity, &NoiseEvent)) -> usize {
        for &listener in &self.subscribers {
            handler(listener, event);
        }
        self.subscribers.len()
    }
}
