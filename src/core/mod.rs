pub mod balance;
pub mod goal;
pub mod milestone;
pub mod mood;
pub mod note;
pub mod ordering;
pub mod priority;
pub mod project;
pub mod record;
pub mod todo;
