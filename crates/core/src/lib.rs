pub mod detection;
pub mod grouping;
pub mod imaging;
pub mod output;
pub mod pipeline;
pub mod shared;
