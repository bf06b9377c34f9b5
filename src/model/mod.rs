//! Domain keys and value tables shared by every stage.

pub mod application;
pub mod consumption;
pub mod region;
pub mod sector;
pub mod series;

pub use application::Application;
pub use consumption::{
    AdjustedConsumption, AnnualConsumption, AnnualTable, ConsumptionByApplication, ConsumptionKey,
};
pub use region::{Region, State};
pub use sector::{EnergyCarrier, Sector, SectorKind};
pub use series::{SeriesKey, TimeSeries};
