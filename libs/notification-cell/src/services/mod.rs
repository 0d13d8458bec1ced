pub mod notification;
pub mod worker;

pub use notification::NotificationService;
pub use worker::BroadcastDeliveryWorker;
