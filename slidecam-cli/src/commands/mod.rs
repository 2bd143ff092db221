//! CLI command implementations

mod config;
mod devices;
mod resolve;
mod run;

pub use config::{ConfigArgs, config};
pub use devices::{DevicesArgs, devices};
pub use resolve::{ResolveArgs, resolve};
pub use run::{RunArgs, run};
