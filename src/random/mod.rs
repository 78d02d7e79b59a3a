mod errors;
pub mod source;

pub use errors::RandomSourceError;
pub use source::{
    parse_fraction, LocalRandomSource, RandomOrgSource, RandomSource, RANDOM_ORG_URL,
};
