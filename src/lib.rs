//! carvewrap drives an external PhotoRec-style file carver against a batch of
//! input images, waits for each run to finish, and harvests the recovered
//! files into pipeline output records with provenance back to their inputs.

pub mod cli;
pub mod config;
pub mod envelope;
pub mod harvest;
pub mod logging;
pub mod manifest;
pub mod outputs;
pub mod pipeline;
pub mod recovery;
pub mod util;
pub mod workspace;
