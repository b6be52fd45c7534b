/*!
Selection change decoding and handling.
*/

mod change;
mod handler;
mod info;

pub use change::{
  decode_rich_change, Direction, Edit, Granularity, Navigation, SelectionChange, SelectionIndex,
};
pub use handler::{ChangeListener, SelectionChangeHandler};
pub use info::{keys, InfoValue, NotificationInfo};
