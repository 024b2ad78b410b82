mod controller;
mod view;

pub use controller::DeviceCard;
pub use view::{DeviceCardView, SliderView, OFFLINE_NOTICE};
