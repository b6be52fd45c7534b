/*!
Accessibility vocabulary: element roles and notifications.
*/

mod notification;
mod role;

pub use notification::Notification;
pub use role::Role;
