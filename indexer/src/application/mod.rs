pub mod sync;

pub use sync::ChainSync;
