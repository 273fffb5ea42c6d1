pub mod bedrock;
pub mod java;
