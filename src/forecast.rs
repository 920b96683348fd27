//! Fixed-horizon weekday forecasting

use crate::data::{CallDataset, WEEKDAYS};
use crate::error::{ForecastError, Result};
use crate::models::TrainedWeekdayModel;
use chrono::{Datelike, NaiveDate};

/// Number of future weekdays predicted per forecast
pub const FORECAST_DAYS: usize = 5;

/// A single predicted observation
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastPoint {
    /// Future calendar date
    pub date: NaiveDate,
    /// Predicted call count for that date
    pub calls: f64,
}

/// Forecast for a requested future week: five weekday predictions
#[derive(Debug, Clone)]
pub struct WeekForecast {
    /// The requested week number
    pub week: u32,
    /// Predicted (date, calls) pairs, one per future weekday
    pub points: Vec<ForecastPoint>,
}

impl WeekForecast {
    /// Total predicted calls, rounded to an integer
    pub fn total(&self) -> i64 {
        self.points.iter().map(|p| p.calls).sum::<f64>().round() as i64
    }
}

/// Predict call volumes for the next five weekdays after the last observed date
///
/// The requested week must be strictly beyond the latest observed week. Dates
/// are generated by walking the calendar day-by-day, keeping weekdays that are
/// not already present in the dataset, until five qualify. Each date is
/// predicted from its own weekday index.
pub fn forecast_week<M: TrainedWeekdayModel>(
    model: &M,
    data: &CallDataset,
    week: u32,
) -> Result<WeekForecast> {
    let max_week = data
        .max_week()
        .ok_or_else(|| ForecastError::DataError("Dataset is empty".to_string()))?;
    if week <= max_week {
        return Err(ForecastError::ValidationError(format!(
            "Week {} is not after the last observed week {}",
            week, max_week
        )));
    }

    let last_date = data
        .last_date()
        .ok_or_else(|| ForecastError::DataError("Dataset is empty".to_string()))?;

    let mut points = Vec::with_capacity(FORECAST_DAYS);
    let mut date = last_date;
    while points.len() < FORECAST_DAYS {
        date = date
            .succ_opt()
            .ok_or_else(|| ForecastError::DataError("Date overflow".to_string()))?;
        let weekday = date.weekday().num_days_from_monday();
        if weekday < WEEKDAYS && !data.contains_date(date) {
            points.push(ForecastPoint {
                date,
                calls: model.predict(weekday),
            });
        }
    }

    Ok(WeekForecast { week, points })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::gradient_boost::GradientBoost;
    use crate::models::{TrainedWeekdayModel, WeekdayModel};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    /// Three full ISO weeks starting Monday 2024-01-01
    fn sample_dataset() -> CallDataset {
        let start = date(2024, 1, 1);
        let mut pairs = Vec::new();
        for week in 0..3u32 {
            for day in 0..5u32 {
                let d = start + chrono::Duration::days((week * 7 + day) as i64);
                pairs.push((d, 100.0 + day as f64 * 10.0));
            }
        }
        CallDataset::from_records(pairs).unwrap()
    }

    #[test]
    fn past_weeks_are_rejected() {
        let data = sample_dataset();
        let model = GradientBoost::new().train(&data).unwrap();

        // max observed ISO week is 3
        assert!(forecast_week(&model, &data, 3).is_err());
        assert!(forecast_week(&model, &data, 1).is_err());
        assert!(forecast_week(&model, &data, 4).is_ok());
    }

    #[test]
    fn forecast_covers_exactly_five_future_weekdays() {
        let data = sample_dataset();
        let model = GradientBoost::new().train(&data).unwrap();

        let forecast = forecast_week(&model, &data, 4).unwrap();
        assert_eq!(forecast.points.len(), FORECAST_DAYS);

        let last = data.last_date().unwrap();
        for point in &forecast.points {
            assert!(point.date > last);
            assert!(point.date.weekday().num_days_from_monday() < WEEKDAYS);
            assert!(!data.contains_date(point.date));
        }
    }

    #[test]
    fn forecast_dates_follow_the_calendar() {
        let data = sample_dataset();
        let model = GradientBoost::new().train(&data).unwrap();

        // Last observed date is Friday 2024-01-19; the next five weekdays
        // are Monday through Friday of the following week.
        let forecast = forecast_week(&model, &data, 4).unwrap();
        let dates: Vec<NaiveDate> = forecast.points.iter().map(|p| p.date).collect();
        assert_eq!(
            dates,
            vec![
                date(2024, 1, 22),
                date(2024, 1, 23),
                date(2024, 1, 24),
                date(2024, 1, 25),
                date(2024, 1, 26),
            ]
        );
    }

    #[test]
    fn predictions_match_each_dates_weekday() {
        // End the dataset mid-week so predicted dates wrap over a weekend
        let pairs = vec![
            (date(2024, 1, 1), 100.0),
            (date(2024, 1, 2), 110.0),
            (date(2024, 1, 3), 120.0),
            (date(2024, 1, 8), 100.0),
            (date(2024, 1, 9), 110.0),
            (date(2024, 1, 10), 120.0), // Wednesday, last observed
        ];
        let data = CallDataset::from_records(pairs).unwrap();
        let model = GradientBoost::new().train(&data).unwrap();

        let forecast = forecast_week(&model, &data, 3).unwrap();
        for point in &forecast.points {
            let weekday = point.date.weekday().num_days_from_monday();
            assert_eq!(point.calls, model.predict(weekday));
        }

        // Thursday and Friday come first, then Monday through Wednesday
        let weekdays: Vec<u32> = forecast
            .points
            .iter()
            .map(|p| p.date.weekday().num_days_from_monday())
            .collect();
        assert_eq!(weekdays, vec![3, 4, 0, 1, 2]);
    }

    #[test]
    fn total_is_the_rounded_sum() {
        let data = sample_dataset();
        let model = GradientBoost::new().train(&data).unwrap();

        let forecast = forecast_week(&model, &data, 4).unwrap();
        let sum: f64 = forecast.points.iter().map(|p| p.calls).sum();
        assert_eq!(forecast.total(), sum.round() as i64);
    }
}
