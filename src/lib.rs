//! # Call Forecast
//!
//! A desktop tool for forecasting weekday call volumes from historical call data.
//!
//! ## Features
//!
//! - Call-volume dataset loading from CSV and Excel files (`Date`, `Calls Offered`)
//! - Cleaning: fixed day-month-year date parsing, weekend filtering, ISO week derivation
//! - Gradient-boosted regression keyed on the weekday index (Monday = 0 .. Friday = 4)
//! - Fixed-horizon prediction: the next five weekdays after the last observed date
//! - egui chart of actual volumes (last three weeks) against the five predicted points
//!
//! ## Quick Start
//!
//! ```no_run
//! use call_forecast::data::CallDataset;
//! use call_forecast::forecast::forecast_week;
//! use call_forecast::models::gradient_boost::GradientBoost;
//! use call_forecast::models::WeekdayModel;
//!
//! # fn main() -> call_forecast::error::Result<()> {
//! // Load and clean the dataset
//! let data = CallDataset::from_path("calls.csv")?;
//!
//! // Fit the weekday regression model
//! let model = GradientBoost::new().train(&data)?;
//!
//! // Predict the first week after the observed range
//! let week = data.max_week().unwrap_or(0) + 1;
//! let forecast = forecast_week(&model, &data, week)?;
//! println!("predicted total for week {}: {}", forecast.week, forecast.total());
//! # Ok(())
//! # }
//! ```

pub mod app;
pub mod data;
pub mod error;
pub mod forecast;
pub mod models;

// Re-export commonly used types
pub use crate::data::{CallDataset, CallRecord};
pub use crate::error::ForecastError;
pub use crate::forecast::{forecast_week, ForecastPoint, WeekForecast};
pub use crate::models::{TrainedWeekdayModel, WeekdayModel};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
