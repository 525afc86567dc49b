pub mod catalog_service;
pub mod request_service;
pub mod search_service;
pub mod selection_service;
pub mod series_service;
pub mod view_service;
