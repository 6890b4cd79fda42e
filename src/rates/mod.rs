pub(crate) mod cache;
pub(crate) mod fred;
mod models;
pub(crate) mod resample;
mod service;

pub use cache::{RateCache, DEFAULT_TTL_SECS};
pub use fred::FredClient;
pub use models::{Granularity, RateObservation, RateSeries};
pub use resample::{align_to_periods, AlignedPoint};
pub use service::RateService;
