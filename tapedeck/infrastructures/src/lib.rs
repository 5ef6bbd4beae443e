pub mod boundaries;
pub mod gateways {
    pub mod classifiers;
    pub mod commands;
    pub mod downloaders;
    pub mod inspectors;
    pub mod probes;
    pub mod repositories;
}
pub(crate) mod utils;
