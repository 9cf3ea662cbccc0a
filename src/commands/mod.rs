pub mod fill;
pub mod presets;
pub mod run;
pub mod utils;
