pub mod issue;
pub mod series;
