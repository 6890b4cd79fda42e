mod utils;

mod listings_tests;
mod rates_tests;
