//! Анимация появления графиков: кривые сглаживания и покадровый прогресс.

use std::f64::consts::PI;
use std::time::Duration;

const BAR_ENTRANCE: Duration = Duration::from_millis(1500);
const SCATTER_ENTRANCE: Duration = Duration::from_millis(2000);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Easing {
    /// `1 - (1 - t)^3`.
    CubicOut,
    /// Упругое затухание с перелётом за 1.0 в начале.
    ElasticOut,
}

impl Easing {
    pub fn apply(self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Self::CubicOut => 1.0 - (1.0 - t).powi(3),
            Self::ElasticOut => {
                if t >= 1.0 {
                    1.0
                } else if t <= 0.0 {
                    0.0
                } else {
                    let c4 = (2.0 * PI) / 3.0;
                    1.0 - 2f64.powf(-10.0 * t) * (t.mul_add(10.0, -0.75) * c4).cos()
                }
            }
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum State {
    Running,
    Finished,
    Cancelled,
}

/// Проигрыватель анимации: выдаёт сглаженный прогресс на каждый кадр.
#[derive(Clone, Debug)]
pub struct Animation {
    easing: Easing,
    duration: Duration,
    elapsed: Duration,
    state: State,
}

impl Animation {
    pub const fn new(easing: Easing, duration: Duration) -> Self {
        Self {
            easing,
            duration,
            elapsed: Duration::ZERO,
            state: State::Running,
        }
    }

    pub const fn bar_entrance() -> Self {
        Self::new(Easing::CubicOut, BAR_ENTRANCE)
    }

    pub const fn scatter_entrance() -> Self {
        Self::new(Easing::ElasticOut, SCATTER_ENTRANCE)
    }

    /// Сглаженный прогресс для произвольного момента времени.
    pub fn progress_at(&self, elapsed: Duration) -> f64 {
        if self.duration.is_zero() {
            return 1.0;
        }
        let raw = elapsed.as_secs_f64() / self.duration.as_secs_f64();
        self.easing.apply(raw.min(1.0))
    }

    /// Отдаёт прогресс текущего кадра и сдвигает время на `frame`.
    /// После последнего кадра (прогресс 1.0) или отмены возвращает `None`.
    pub fn tick(&mut self, frame: Duration) -> Option<f64> {
        if self.state != State::Running {
            return None;
        }
        let progress = self.progress_at(self.elapsed);
        if self.elapsed >= self.duration {
            self.state = State::Finished;
        } else {
            self.elapsed = (self.elapsed + frame).min(self.duration);
        }
        Some(progress)
    }

    pub fn cancel(&mut self) {
        if self.state == State::Running {
            self.state = State::Cancelled;
        }
    }

    /// Запускает анимацию заново (при смене данных).
    pub const fn restart(&mut self) {
        self.elapsed = Duration::ZERO;
        self.state = State::Running;
    }
}
