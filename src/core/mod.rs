pub mod catalog;
pub mod emit;
pub mod etl;
pub mod geocode;
pub mod normalizer;
pub mod validator;

pub use crate::domain::model::{ContractorRecord, Record, TransformResult};
pub use crate::domain::ports::{ConfigProvider, Geocoder, Pipeline, Storage};
pub use crate::utils::error::Result;
