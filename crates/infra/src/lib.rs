//! Infrastructure layer: persistence adapters, the stock ledger service, config.

pub mod catalog;
pub mod config;
pub mod db;
pub mod ledger;
pub mod stock_store;


pub use catalog::{Catalog, CatalogError, InMemoryCatalog, PostgresCatalog};
pub use config::{AppConfig, ConfigError, LogFormat, StoreBackend};
pub use ledger::{PartStock, StockLedger};
pub use stock_store::{InMemoryStockStore, PostgresStockStore, StockStore};
