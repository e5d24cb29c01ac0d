pub mod config;
pub mod config_loader;
pub mod records;
pub mod traits;

pub use config::{
    AnalysisConfig, AppConfig, CacheConfig, MarketConfig, MarketProviderConfig, MarketProviderKind,
    NasaConfig, ServerConfig,
};
pub use config_loader::ConfigLoader;
pub use records::{date_key, ComposedRecord, DateRange, FlareRecord, MarketRecord, DATE_FORMAT};
pub use traits::{FlareSource, MarketSource};
