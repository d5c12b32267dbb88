pub mod progress;

pub use progress::{ProgressObserver, NoopObserver, FnObserver, ProgressBarObserver};
