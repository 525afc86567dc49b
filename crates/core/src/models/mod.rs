pub mod chart;
pub mod request;
pub mod selection;
pub mod series;
pub mod settings;
pub mod symbol;
pub mod view;
