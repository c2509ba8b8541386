use crate::{error::Error, record::NutritionRecord, store::NutritionStore};

use tracing::{info, warn};

/// Per 100g facts for the foods the pretrained ImageNet model can recognize, named exactly as
/// its labels so they can be looked up with the classifier's best label.
#[rustfmt::skip]
const DEFAULT_FOODS: [(&str, f64, f64, f64, f64); 25] = [
	// name, calories, protein, carbs, fat
	("pizza",            266.0, 11.0, 33.0,  10.0),
	("cheeseburger",     303.0, 15.0, 30.0,  14.0),
	("hotdog",           290.0, 10.0,  2.0,  26.0),
	("Granny_Smith",      52.0,  0.3, 14.0,   0.2),
	("strawberry",        32.0,  0.7,  7.7,   0.3),
	("orange",            47.0,  0.9, 12.0,   0.1),
	("banana",            89.0,  1.1, 23.0,   0.3),
	("bagel",            250.0, 10.0, 49.0,   1.5),
	("pretzel",          380.0,  9.0, 80.0,   3.0),
	("mashed_potato",     88.0,  1.7, 15.0,   2.8),
	("broccoli",          34.0,  2.8,  7.0,   0.4),
	("cauliflower",       25.0,  1.9,  5.0,   0.3),
	("zucchini",          17.0,  1.2,  3.1,   0.3),
	("spaghetti_squash",  31.0,  0.6,  7.0,   0.6),
	("acorn_squash",      40.0,  0.8, 10.0,   0.1),
	("cucumber",          15.0,  0.7,  3.6,   0.1),
	("bell_pepper",       20.0,  0.9,  4.6,   0.2),
	("mushroom",          22.0,  3.1,  3.3,   0.3),
	("corn",              86.0,  3.2, 19.0,   1.2),
	("espresso",           9.0,  0.1,  1.7,   0.2),
	("ice_cream",        207.0,  3.5, 24.0,  11.0),
	("chocolate_sauce",  541.0,  2.0, 55.0,  35.0),
	("carbonara",        580.0, 20.0, 45.0,  35.0),
	("guacamole",        160.0,  2.0,  9.0,  15.0),
	("French_loaf",      289.0, 12.0, 56.0,   1.7),
];

#[must_use]
pub fn default_foods() -> Vec<NutritionRecord> {
	DEFAULT_FOODS
		.iter()
		.map(|&(name, calories, protein, carbs, fat)| {
			NutritionRecord::new(name, calories, protein, carbs, fat)
		})
		.collect()
}

#[derive(Debug)]
pub enum SeedOutcome {
	Inserted,
	/// A record with this name was already there
	Skipped,
	Failed(Error),
}

/// Inserts every food the store doesn't know yet, one at a time. A failure on one food doesn't
/// stop the others.
pub async fn seed(
	store: &dyn NutritionStore,
	foods: impl IntoIterator<Item = NutritionRecord> + Send,
) -> Vec<(String, SeedOutcome)> {
	let mut outcomes = Vec::new();

	for food in foods {
		let name = food.name.clone();

		let outcome = match store.lookup(&name).await {
			Ok(Some(_)) => SeedOutcome::Skipped,
			Ok(None) => match store.insert(food).await {
				Ok(()) => SeedOutcome::Inserted,
				Err(e) => SeedOutcome::Failed(e),
			},
			Err(e) => SeedOutcome::Failed(e),
		};

		match &outcome {
			SeedOutcome::Inserted => info!("Seeded food <name='{name}'>"),
			SeedOutcome::Skipped => info!("Food already present <name='{name}'>"),
			SeedOutcome::Failed(e) => warn!("Failed to seed food <name='{name}'>: {e:#}"),
		}

		outcomes.push((name, outcome));
	}

	outcomes
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::MemoryStore;

	use std::collections::HashSet;

	use tracing_test::traced_test;

	#[test]
	fn default_foods_are_valid_and_unique() {
		let foods = default_foods();

		assert_eq!(foods.len(), 25);
		assert!(foods.iter().all(|food| food.validate().is_ok()));
		assert_eq!(
			foods
				.iter()
				.map(|food| food.name.as_str())
				.collect::<HashSet<_>>()
				.len(),
			25
		);
	}

	#[tokio::test]
	#[traced_test]
	async fn seeding_twice_skips_everything_the_second_time() {
		let store = MemoryStore::new();

		let first = seed(&store, default_foods()).await;
		assert!(first
			.iter()
			.all(|(_, outcome)| matches!(outcome, SeedOutcome::Inserted)));
		assert_eq!(store.len().await, 25);

		let second = seed(&store, default_foods()).await;
		assert!(second
			.iter()
			.all(|(_, outcome)| matches!(outcome, SeedOutcome::Skipped)));

		assert!(logs_contain("Food already present <name='pizza'>"));
	}

	#[tokio::test]
	async fn failures_do_not_stop_the_run() {
		let store = MemoryStore::new();

		let outcomes = seed(
			&store,
			[
				NutritionRecord::new("pizza", 266.0, 11.0, 33.0, 10.0),
				NutritionRecord::new("mystery", -5.0, 0.0, 0.0, 0.0),
				NutritionRecord::new("banana", 89.0, 1.1, 23.0, 0.3),
			],
		)
		.await;

		assert!(matches!(outcomes[0].1, SeedOutcome::Inserted));
		assert!(matches!(
			outcomes[1].1,
			SeedOutcome::Failed(Error::InvalidRecord { .. })
		));
		assert!(matches!(outcomes[2].1, SeedOutcome::Inserted));
		assert_eq!(store.len().await, 2);
	}
}
