mod environment;

pub use environment::{Environment, DEFAULT_REGION, LOCAL_DYNAMODB_ENDPOINT};
