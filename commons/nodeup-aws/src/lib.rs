//! Production collaborators that talk to AWS.

pub mod cli;
pub mod imds;
pub mod region;

pub use cli::AwsCli;
pub use imds::Imds;
