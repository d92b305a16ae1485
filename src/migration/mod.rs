pub mod parser;
pub mod store;

pub use parser::split_sections;
pub use store::{list_migrations, list_seeds, read_script};
