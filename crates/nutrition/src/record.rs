use crate::error::{Error, Result};

use serde::{Deserialize, Serialize};

/// Nutrition facts per 100g of a food, keyed by the classifier's label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NutritionRecord {
	pub name: String,
	/// kcal
	pub calories: f64,
	/// grams
	pub protein: f64,
	/// grams
	pub carbs: f64,
	/// grams
	pub fat: f64,
}

impl NutritionRecord {
	pub fn new(name: impl Into<String>, calories: f64, protein: f64, carbs: f64, fat: f64) -> Self {
		Self {
			name: name.into(),
			calories,
			protein,
			carbs,
			fat,
		}
	}

	/// Names must be non empty and every amount a finite, non negative number.
	pub fn validate(&self) -> Result<()> {
		let invalid = |reason| Error::InvalidRecord {
			name: self.name.clone(),
			reason,
		};

		if self.name.trim().is_empty() {
			return Err(invalid("name is empty"));
		}

		for (amount, reason) in [
			(self.calories, "calories must be a non negative number"),
			(self.protein, "protein must be a non negative number"),
			(self.carbs, "carbs must be a non negative number"),
			(self.fat, "fat must be a non negative number"),
		] {
			if !amount.is_finite() || amount < 0.0 {
				return Err(invalid(reason));
			}
		}

		Ok(())
	}
}
