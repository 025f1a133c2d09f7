mod category;

pub use category::{Category, CategoryTranslation};
