//! Простая описательная статистика для графиков: экстремумы, МНК и корреляция Пирсона.

use itertools::Itertools;

/// Минимум, максимум и среднее ряда.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Extent {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
}

impl Extent {
    pub fn of(values: &[f64]) -> Option<Self> {
        let (min, max) = values.iter().copied().minmax().into_option()?;
        let mean = values.iter().sum::<f64>() / values.len() as f64;
        Some(Self { min, max, mean })
    }

    /// Диапазон для масштабирования оси; нулевой диапазон заменяется единицей.
    pub fn span(&self) -> f64 {
        let span = self.max - self.min;
        if span.abs() > f64::EPSILON { span } else { 1.0 }
    }
}

/// Прямая `y = slope * x + intercept`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LinearFit {
    pub slope: f64,
    pub intercept: f64,
}

impl LinearFit {
    pub fn at(&self, x: f64) -> f64 {
        self.slope.mul_add(x, self.intercept)
    }
}

/// Центрированные моменты пары рядов (два прохода: средние, затем отклонения).
struct Moments {
    mean_x: f64,
    mean_y: f64,
    var_x: f64,
    var_y: f64,
    cov: f64,
}

impl Moments {
    fn of(points: &[(f64, f64)]) -> Option<Self> {
        if points.len() < 2 {
            return None;
        }
        let n = points.len() as f64;
        let mean_x = points.iter().map(|&(x, _)| x).sum::<f64>() / n;
        let mean_y = points.iter().map(|&(_, y)| y).sum::<f64>() / n;
        let (var_x, var_y, cov) =
            points
                .iter()
                .fold((0.0, 0.0, 0.0), |(var_x, var_y, cov), &(x, y)| {
                    let dx = x - mean_x;
                    let dy = y - mean_y;
                    (dx.mul_add(dx, var_x), dy.mul_add(dy, var_y), dx.mul_add(dy, cov))
                });
        Some(Self {
            mean_x,
            mean_y,
            var_x,
            var_y,
            cov,
        })
    }
}

/// Разброс меньше этой доли от квадрата масштаба ряда считается нулевым.
const RELATIVE_EPSILON: f64 = 1e-12;

fn is_degenerate(variance: f64, mean: f64, n: usize) -> bool {
    let scale = mean.mul_add(mean, 1.0) * n as f64;
    !variance.is_finite() || variance <= RELATIVE_EPSILON * scale
}

/// Регрессия методом наименьших квадратов; `None`, если точек меньше двух или x постоянен.
pub fn linear_regression(points: &[(f64, f64)]) -> Option<LinearFit> {
    let moments = Moments::of(points)?;
    if is_degenerate(moments.var_x, moments.mean_x, points.len()) {
        return None;
    }
    let slope = moments.cov / moments.var_x;
    let intercept = slope.mul_add(-moments.mean_x, moments.mean_y);
    Some(LinearFit { slope, intercept })
}

/// Коэффициент корреляции Пирсона. Для вырожденных данных возвращает 0, а не NaN.
pub fn pearson(points: &[(f64, f64)]) -> f64 {
    let Some(moments) = Moments::of(points) else {
        return 0.0;
    };
    let n = points.len();
    if is_degenerate(moments.var_x, moments.mean_x, n)
        || is_degenerate(moments.var_y, moments.mean_y, n)
    {
        return 0.0;
    }
    let r = moments.cov / (moments.var_x * moments.var_y).sqrt();
    if r.is_finite() { r.clamp(-1.0, 1.0) } else { 0.0 }
}

/// Сводка по ряду прогноза для заголовка графика.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SeriesSummary {
    pub total: f64,
    pub average: f64,
    pub max: f64,
    /// Изменение от первого значения к последнему, в процентах.
    pub trend_percent: f64,
}

impl SeriesSummary {
    pub fn of(values: &[f64]) -> Option<Self> {
        let extent = Extent::of(values)?;
        let first = values[0];
        let last = values[values.len() - 1];
        let trend_percent = if values.len() > 1 && first.abs() > f64::EPSILON {
            (last - first) / first * 100.0
        } else {
            0.0
        };
        Some(Self {
            total: values.iter().sum(),
            average: extent.mean,
            max: extent.max,
            trend_percent,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOLERANCE: f64 = 1e-9;

    #[test]
    fn extent_handles_empty_and_flat_series() {
        assert!(Extent::of(&[]).is_none());
        let flat = Extent::of(&[4.0, 4.0]).unwrap();
        assert!((flat.span() - 1.0).abs() < TOLERANCE);
        let extent = Extent::of(&[3.0, 1.0, 2.0]).unwrap();
        assert!((extent.min - 1.0).abs() < TOLERANCE);
        assert!((extent.max - 3.0).abs() < TOLERANCE);
        assert!((extent.mean - 2.0).abs() < TOLERANCE);
    }

    #[test]
    fn regression_recovers_generating_line() {
        let points: Vec<(f64, f64)> = (0..=20)
            .map(|step| {
                let cloud = f64::from(step) * 5.0;
                (cloud, -0.012 * cloud + 1.4)
            })
            .collect();
        let fit = linear_regression(&points).unwrap();
        assert!((fit.slope + 0.012).abs() < TOLERANCE);
        assert!((fit.intercept - 1.4).abs() < TOLERANCE);
        assert!((fit.at(50.0) - 0.8).abs() < TOLERANCE);
    }

    #[test]
    fn regression_rejects_degenerate_input() {
        assert!(linear_regression(&[(1.0, 2.0)]).is_none());
        assert!(linear_regression(&[(3.0, 1.0), (3.0, 2.0), (3.0, 5.0)]).is_none());
    }

    #[test]
    fn pearson_is_zero_without_variance() {
        let flat_x = [(50.0, 1.0), (50.0, 2.0), (50.0, 3.0)];
        let flat_y = [(10.0, 1.0), (20.0, 1.0), (30.0, 1.0)];
        assert!(pearson(&flat_x).abs() < TOLERANCE);
        assert!(pearson(&flat_y).abs() < TOLERANCE);
        assert!(pearson(&[]).abs() < TOLERANCE);
        assert!(!pearson(&flat_x).is_nan());
    }

    fn constant_cloud(cloud: f64, n: u32) -> Vec<(f64, f64)> {
        (0..n)
            .map(|step| (cloud, f64::from(step).sin() + 2.0))
            .collect()
    }

    #[test]
    fn constant_fractional_x_has_no_trend() {
        for (cloud, n) in [(83.21, 24), (47.3, 100), (66.7, 1000), (83.21, 1000)] {
            let points = constant_cloud(cloud, n);
            assert!(linear_regression(&points).is_none(), "{cloud} x {n}");
            assert!(pearson(&points).abs() < f64::EPSILON, "{cloud} x {n}");
        }
    }

    #[test]
    fn small_spread_around_large_mean_is_kept() {
        let points: Vec<(f64, f64)> = (0..50)
            .map(|step| {
                let cloud = f64::from(step).mul_add(0.01, 83.21);
                (cloud, 0.5f64.mul_add(-cloud, 50.0))
            })
            .collect();
        let fit = linear_regression(&points).unwrap();
        assert!((fit.slope + 0.5).abs() < 1e-6);
        assert!((pearson(&points) + 1.0).abs() < 1e-9);
    }

    #[test]
    fn pearson_detects_perfect_negative_correlation() {
        let points = [(0.0, 3.0), (50.0, 2.0), (100.0, 1.0)];
        assert!((pearson(&points) + 1.0).abs() < 1e-12);
    }

    #[test]
    fn summary_reports_trend_from_first_to_last() {
        let summary = SeriesSummary::of(&[10.0, 12.0, 15.0]).unwrap();
        assert!((summary.total - 37.0).abs() < TOLERANCE);
        assert!((summary.trend_percent - 50.0).abs() < TOLERANCE);
        assert!((summary.max - 15.0).abs() < TOLERANCE);
        let zero_start = SeriesSummary::of(&[0.0, 5.0]).unwrap();
        assert!(zero_start.trend_percent.abs() < TOLERANCE);
    }
}
