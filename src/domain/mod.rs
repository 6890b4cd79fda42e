pub mod changes;
pub mod listing;
pub mod weekly;
