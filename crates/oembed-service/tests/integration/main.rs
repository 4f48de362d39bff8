mod lookups;
mod utils;
