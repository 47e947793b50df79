pub use super::announcements::Entity as Announcements;
pub use super::app_settings::Entity as AppSettings;
pub use super::password_reset_codes::Entity as PasswordResetCodes;
pub use super::users::Entity as Users;
