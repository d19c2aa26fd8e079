pub mod dispatch;

pub use dispatch::{Dispatcher, DispatcherConfig, DispatcherHandle, RaceArbiter};
