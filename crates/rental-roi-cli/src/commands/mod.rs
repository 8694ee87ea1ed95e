pub mod analysis;
pub mod financing;
pub mod income;
