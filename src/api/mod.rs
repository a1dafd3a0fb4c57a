pub mod game_results_api;

pub use game_results_api::GameResultsApiClient;
