pub mod appointment;
pub mod bill;
pub mod doctor;
pub mod enums;
pub mod notification;
pub mod patient;
pub mod prescription;
pub mod report;
pub mod user;

pub use appointment::Appointment;
pub use bill::Bill;
pub use doctor::{DayAvailability, Doctor, WeeklyAvailability};
pub use enums::*;
pub use notification::{Notification, NotificationPreferences};
pub use patient::Patient;
pub use prescription::{Medicine, Prescription};
pub use report::MedicalReport;
pub use user::User;
