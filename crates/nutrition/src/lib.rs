//! Nutrition facts for the foods the classifier recognizes.

mod error;
mod memory;
mod record;
pub mod seed;
mod store;
mod supabase;

pub use error::{Error, Result};
pub use memory::MemoryStore;
pub use record::NutritionRecord;
pub use store::NutritionStore;
pub use supabase::{SupabaseConfig, SupabaseStore, FOODS_TABLE, SUPABASE_KEY_ENV, SUPABASE_URL_ENV};
