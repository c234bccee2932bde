//! Feature schema, encoding and alignment

mod align;
mod builder;
mod encoding;
mod schema;
mod vector;

pub use align::{align, Alignment, FeatureAligner};
pub use builder::SchemaBuilder;
pub use encoding::{categorical_level, numeric_value, one_hot_column};
pub use schema::FeatureSchema;
pub use vector::{FeatureEntry, FeatureVector};
