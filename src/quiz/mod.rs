//! Consumers of the auth and storage core: the quiz and builder
//! controllers, and background device status polling.

mod builder;
mod controller;
mod devices;

pub use builder::BuilderController;
pub use controller::QuizController;
pub use devices::{DEFAULT_POLL_INTERVAL, DevicePoller, DeviceStatus, check_devices};
