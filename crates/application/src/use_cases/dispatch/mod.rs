mod dispatcher;
mod handle;
mod race;

pub use dispatcher::{Dispatcher, DispatcherConfig};
pub use handle::DispatcherHandle;
pub use race::RaceArbiter;
