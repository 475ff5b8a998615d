pub mod distance;
pub mod grouping_engine;
pub mod observation;
pub mod ordering;
