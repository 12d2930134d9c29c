pub mod product;
pub mod record;
pub mod row;
pub mod types;
pub mod variant;
