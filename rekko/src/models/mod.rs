mod activity;
mod product;
mod score;
mod similarity;

pub use activity::*;
pub use product::*;
pub use score::*;
pub use similarity::*;
