//! Regression models keyed on weekday

use crate::data::CallDataset;
use crate::error::Result;
use std::fmt::Debug;

/// Model that can be trained on a call-volume dataset
pub trait WeekdayModel: Debug + Clone {
    /// The type of trained model produced
    type Trained: TrainedWeekdayModel;

    /// Train the model on the dataset
    fn train(&self, data: &CallDataset) -> Result<Self::Trained>;

    /// Get the name of the model
    fn name(&self) -> &str;
}

/// Trained model mapping a weekday index to a predicted call count
pub trait TrainedWeekdayModel: Debug {
    /// Predict the call count for a weekday index (0 = Monday .. 4 = Friday)
    fn predict(&self, weekday: u32) -> f64;

    /// Name of the model
    fn name(&self) -> &str;
}

pub mod gradient_boost;
