pub mod catalog;
pub mod certificates;
pub mod engine;
pub mod filters;
pub mod font;
pub mod overlay;
pub mod programs;
pub mod tables;
pub mod wait;

pub use crate::domain::model::JobSummary;
pub use crate::domain::ports::{Browser, Job, Storage};
pub use crate::utils::error::Result;
