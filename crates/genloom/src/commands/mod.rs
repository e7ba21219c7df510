pub mod config;
pub mod edit;
pub mod export;
pub mod import;
pub mod run;
pub mod tree;
