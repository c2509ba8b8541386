use nc_ai::Prediction;
use nc_nutrition::NutritionRecord;

use std::{fmt, path::PathBuf};

use serde::Serialize;

const RULE: &str = "--------------------------------------------------";

/// Everything one analysis produced, printable for humans or serializable as JSON.
#[derive(Debug, Serialize)]
pub struct Report {
	pub image: PathBuf,
	pub custom_model: bool,
	pub predictions: Vec<Prediction>,
	pub best_label: String,
	pub nutrition: Option<NutritionRecord>,
}

impl fmt::Display for Report {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		writeln!(f)?;
		writeln!(f, " Analyzing image: {}", self.image.display())?;
		writeln!(f, "{RULE}")?;

		writeln!(f)?;
		writeln!(f, " Top predictions:")?;
		for (rank, prediction) in self.predictions.iter().enumerate() {
			writeln!(
				f,
				"  {}. {}: {:.2}%",
				rank + 1,
				prediction.label,
				f64::from(prediction.confidence) * 100.0
			)?;
		}

		writeln!(f)?;
		writeln!(f, "  Most likely food: {}", self.best_label)?;

		writeln!(f)?;
		writeln!(f, "   Searching database for nutritional information...")?;

		match &self.nutrition {
			Some(record) => {
				writeln!(f)?;
				writeln!(f, "   Nutritional Information Found:")?;
				writeln!(f, "{RULE}")?;
				writeln!(f, "  Food: {}", record.name)?;
				writeln!(f, "  Calories: {} kcal", record.calories)?;
				writeln!(f, "  Protein: {}g", record.protein)?;
				writeln!(f, "  Carbs: {}g", record.carbs)?;
				writeln!(f, "  Fat: {}g", record.fat)?;
				writeln!(f, "{RULE}")
			}
			None => {
				writeln!(f)?;
				writeln!(
					f,
					"   No nutritional data found for '{}' in the database.",
					self.best_label
				)?;
				writeln!(
					f,
					"   The food was recognized but not in our nutrition database."
				)?;
				writeln!(f, "   Consider adding it with `nutricheck seed`.")
			}
		}
	}
}
