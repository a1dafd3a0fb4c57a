pub mod arbitrage;
pub mod ats;
pub mod data;
pub mod line_selection;
pub mod odds;
pub mod season;
